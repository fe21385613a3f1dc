//! Device seam for fixed-length captures.

use std::time::Duration;
use thiserror::Error;

/// Per-capture device failures. None of them are fatal: the caller keeps the
/// previous buffer and carries on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaptureError {
    #[error("failed to open input device: {0}")]
    DeviceOpen(String),
    #[error("failed to prepare input stream: {0}")]
    DevicePrepare(String),
    #[error("failed to start input stream: {0}")]
    DeviceStart(String),
    #[error("no samples captured: {0}")]
    NoSamples(String),
}

impl CaptureError {
    pub fn label(&self) -> &'static str {
        match self {
            CaptureError::DeviceOpen(_) => "device_open",
            CaptureError::DevicePrepare(_) => "device_prepare",
            CaptureError::DeviceStart(_) => "device_start",
            CaptureError::NoSamples(_) => "no_samples",
        }
    }
}

/// Something that can fill a PCM slice by blocking for `duration`.
///
/// Implementations must release the underlying device before returning, on
/// success and failure alike. `out` may be partially written on failure; the
/// session only commits it to the shared buffer after `Ok`.
pub trait CaptureDevice: Send {
    fn fill(&mut self, out: &mut [i16], duration: Duration) -> Result<(), CaptureError>;

    fn name(&self) -> String {
        "input device".to_string()
    }
}

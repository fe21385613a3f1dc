//! Fixed-format microphone capture for spoken commands.
//!
//! Every capture yields exactly one second of 16 kHz mono 16-bit PCM. Devices
//! are opened through CPAL in their native format, then downmixed, resampled,
//! and quantized to that fixed layout.

/// Sample rate the classifier was trained on.
pub const SAMPLE_RATE: u32 = 16_000;

/// Channel count of every capture.
pub const CHANNELS: u16 = 1;

/// Bit depth of stored samples.
pub const BITS_PER_SAMPLE: u16 = 16;

/// Default length of one capture.
pub const CAPTURE_MS: u64 = 1_000;

mod buffer;
mod capture;
mod dispatch;
mod meter;
mod recorder;
mod resample;
#[cfg(test)]
mod tests;
mod wav;

pub use buffer::{samples_for_duration, AudioBuffer};
pub use capture::{CaptureDevice, CaptureError};
pub use meter::rms_db;
pub use recorder::{list_input_devices, CpalDevice};
pub use wav::write_wav;

use super::SAMPLE_RATE;
use std::time::Duration;

/// Number of mono samples covering `duration` at the fixed sample rate.
pub fn samples_for_duration(duration: Duration) -> usize {
    (duration.as_millis() as u64 * u64::from(SAMPLE_RATE) / 1_000) as usize
}

/// Fixed-length PCM buffer, overwritten in place by each successful capture.
///
/// A failed capture never touches it, so callers keep working with the
/// previous (stale) contents.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AudioBuffer {
    samples: Vec<i16>,
}

impl AudioBuffer {
    /// Zero-filled buffer of `len` samples.
    pub fn new(len: usize) -> Self {
        Self {
            samples: vec![0; len],
        }
    }

    pub fn for_duration(duration: Duration) -> Self {
        Self::new(samples_for_duration(duration))
    }

    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Replace the contents with `source`, zero-padding or truncating so the
    /// length never changes.
    pub fn overwrite(&mut self, source: &[i16]) {
        let copied = source.len().min(self.samples.len());
        self.samples[..copied].copy_from_slice(&source[..copied]);
        self.samples[copied..].fill(0);
    }
}

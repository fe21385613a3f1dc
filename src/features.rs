//! Power spectrogram features fed to the command classifier.
//!
//! Mirrors the transform the model was trained with: periodic Hann window of
//! 256 samples, hop of 32, 256-point FFT, centred frames with reflection
//! padding, one-sided power divided by the window length.

use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use std::f32::consts::PI;
use std::sync::Arc;

pub const WINDOW_LEN: usize = 256;
pub const HOP_LEN: usize = WINDOW_LEN / 8;
pub const FFT_LEN: usize = 256;
pub const NUM_BINS: usize = FFT_LEN / 2 + 1;

/// Fixed normalization tied to the window length.
pub const POWER_SCALE: f32 = WINDOW_LEN as f32;

/// Batch-wrapped power spectrogram.
///
/// Stored bin-major (`[1, bins, frames]`), which is the layout the model consumes.
#[derive(Clone, Debug, PartialEq)]
pub struct FeatureTensor {
    bins: usize,
    frames: usize,
    data: Vec<f32>,
}

impl FeatureTensor {
    pub fn bins(&self) -> usize {
        self.bins
    }

    pub fn frames(&self) -> usize {
        self.frames
    }

    /// Shape including the leading batch axis.
    pub fn shape(&self) -> [usize; 3] {
        [1, self.bins, self.frames]
    }

    pub fn power(&self, frame: usize, bin: usize) -> f32 {
        self.data[bin * self.frames + frame]
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }
}

/// Number of centred frames produced for `len` samples.
pub fn frame_count(len: usize) -> usize {
    1 + len / HOP_LEN
}

/// Map an index of the padded signal onto the source by mirroring at both
/// edges without repeating the edge sample.
fn reflect_index(index: isize, len: usize) -> usize {
    if len <= 1 {
        return 0;
    }
    let period = 2 * (len as isize - 1);
    let folded = index.rem_euclid(period);
    if folded < len as isize {
        folded as usize
    } else {
        (period - folded) as usize
    }
}

fn periodic_hann(len: usize) -> Vec<f32> {
    (0..len)
        .map(|n| 0.5 - 0.5 * (2.0 * PI * n as f32 / len as f32).cos())
        .collect()
}

/// Stateless apart from the cached FFT plan and window; `extract` is pure.
pub struct FeatureExtractor {
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
}

impl FeatureExtractor {
    pub fn new() -> Self {
        let mut planner = FftPlanner::new();
        Self {
            fft: planner.plan_fft_forward(FFT_LEN),
            window: periodic_hann(WINDOW_LEN),
        }
    }

    pub fn extract(&self, samples: &[i16]) -> FeatureTensor {
        let len = samples.len();
        let frames = frame_count(len);
        let pad = (FFT_LEN / 2) as isize;
        let mut data = vec![0.0f32; NUM_BINS * frames];
        let mut spectrum = vec![Complex::new(0.0f32, 0.0); FFT_LEN];

        for frame in 0..frames {
            let start = (frame * HOP_LEN) as isize - pad;
            for (offset, (slot, weight)) in spectrum.iter_mut().zip(&self.window).enumerate() {
                let sample = if len == 0 {
                    0.0
                } else {
                    f32::from(samples[reflect_index(start + offset as isize, len)])
                };
                *slot = Complex::new(sample * weight, 0.0);
            }
            self.fft.process(&mut spectrum);
            for (bin, value) in spectrum.iter().take(NUM_BINS).enumerate() {
                data[bin * frames + frame] = value.norm_sqr() / POWER_SCALE;
            }
        }

        FeatureTensor {
            bins: NUM_BINS,
            frames,
            data,
        }
    }
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self::new()
    }
}

//! Device-rate to 16 kHz conversion for captured speech.

use super::SAMPLE_RATE;
#[cfg(feature = "high-quality-audio")]
use crate::log_debug;
#[cfg(feature = "high-quality-audio")]
use anyhow::{anyhow, Result};
#[cfg(feature = "high-quality-audio")]
use rubato::{InterpolationParameters, InterpolationType, Resampler, SincFixedIn, WindowFunction};
use std::f32::consts::PI;
#[cfg(feature = "high-quality-audio")]
use std::sync::atomic::{AtomicBool, Ordering};

// Practical device range around the 16 kHz target (~0.01x .. 8x).
pub(super) const MIN_DEVICE_RATE: u32 = 2_000;
pub(super) const MAX_DEVICE_RATE: u32 = 1_600_000;
const MIN_RATIO: f64 = SAMPLE_RATE as f64 / MAX_DEVICE_RATE as f64;
const MAX_RATIO: f64 = SAMPLE_RATE as f64 / MIN_DEVICE_RATE as f64;
const MAX_DOWNSAMPLING_TAPS: usize = 129;
#[cfg(feature = "high-quality-audio")]
const SINC_CHUNK: usize = 256;

#[cfg(feature = "high-quality-audio")]
static SINC_FALLBACK_LOGGED: AtomicBool = AtomicBool::new(false);

/// Convert mono samples recorded at `device_rate` to the fixed sample rate.
pub(super) fn resample_to_target_rate(input: &[f32], device_rate: u32) -> Vec<f32> {
    if device_rate == 0 || input.is_empty() || device_rate == SAMPLE_RATE {
        return input.to_vec();
    }

    #[cfg(feature = "high-quality-audio")]
    {
        match resample_with_sinc(input, device_rate) {
            Ok(output) => output,
            Err(err) => {
                if !SINC_FALLBACK_LOGGED.swap(true, Ordering::AcqRel) {
                    log_debug(&format!(
                        "sinc resampler failed ({err}); using linear resampling"
                    ));
                }
                basic_resample(input, device_rate)
            }
        }
    }

    #[cfg(not(feature = "high-quality-audio"))]
    {
        basic_resample(input, device_rate)
    }
}

#[cfg(feature = "high-quality-audio")]
pub(super) fn resample_with_sinc(input: &[f32], device_rate: u32) -> Result<Vec<f32>> {
    if !(MIN_DEVICE_RATE..=MAX_DEVICE_RATE).contains(&device_rate) {
        return Err(anyhow!(
            "unsupported device sample rate {device_rate}Hz for resampling"
        ));
    }
    let ratio = SAMPLE_RATE as f64 / device_rate as f64;
    let params = InterpolationParameters {
        sinc_len: 64,
        f_cutoff: 0.90,
        interpolation: InterpolationType::Cubic,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };
    let mut resampler = SincFixedIn::<f32>::new(ratio, 2.0, params, SINC_CHUNK, 1)
        .map_err(|e| anyhow!("failed to construct sinc resampler: {e:?}"))?;

    let expected = ((input.len() as f64) * ratio).round() as usize;
    let mut out = Vec::with_capacity(expected + SINC_CHUNK);
    let mut chunk = vec![0.0f32; SINC_CHUNK];
    for block in input.chunks(SINC_CHUNK) {
        // Short final block is padded with its last sample to avoid a click.
        let pad = block.last().copied().unwrap_or(0.0);
        chunk.fill(pad);
        chunk[..block.len()].copy_from_slice(block);
        let produced = resampler
            .process(std::slice::from_ref(&chunk), None)
            .map_err(|e| anyhow!("resampler process failed: {e:?}"))?;
        out.extend_from_slice(&produced[0]);
    }
    out.resize(expected, out.last().copied().unwrap_or(0.0));
    Ok(out)
}

/// FIR low-pass (when decimating) followed by linear interpolation.
pub(super) fn basic_resample(input: &[f32], device_rate: u32) -> Vec<f32> {
    if device_rate == 0 || input.is_empty() {
        return input.to_vec();
    }
    if !(MIN_DEVICE_RATE..=MAX_DEVICE_RATE).contains(&device_rate) {
        return input.to_vec();
    }

    let ratio = (SAMPLE_RATE as f64 / device_rate as f64).clamp(MIN_RATIO, MAX_RATIO) as f32;
    let filtered = if device_rate > SAMPLE_RATE {
        low_pass_fir(input, device_rate, downsampling_tap_count(device_rate))
    } else {
        input.to_vec()
    };
    resample_linear(&filtered, ratio)
}

pub(super) fn resample_linear(input: &[f32], ratio: f32) -> Vec<f32> {
    let output_len = (input.len() as f32 * ratio).round() as usize;
    let last = input.last().copied().unwrap_or(0.0);
    (0..output_len)
        .map(|i| {
            let src = i as f32 / ratio;
            let idx = src.floor() as usize;
            let frac = src - idx as f32;
            if idx + 1 < input.len() {
                input[idx] * (1.0 - frac) + input[idx + 1] * frac
            } else {
                last
            }
        })
        .collect()
}

/// Longer filters for steeper decimation, always odd so the filter is centred.
pub(super) fn downsampling_tap_count(device_rate: u32) -> usize {
    let decimation = device_rate as f32 / SAMPLE_RATE as f32;
    let mut taps = (decimation * 4.0).ceil().max(11.0) as usize;
    if taps % 2 == 0 {
        taps += 1;
    }
    taps.min(MAX_DOWNSAMPLING_TAPS)
}

pub(super) fn low_pass_fir(input: &[f32], device_rate: u32, taps: usize) -> Vec<f32> {
    if input.is_empty() || taps <= 1 {
        return input.to_vec();
    }
    let cutoff = (SAMPLE_RATE as f32 * 0.5 / device_rate as f32).min(0.499);
    let coeffs = design_low_pass(cutoff, taps);
    let half = taps / 2;

    (0..input.len())
        .map(|n| {
            coeffs
                .iter()
                .enumerate()
                .filter_map(|(k, coeff)| {
                    (n + k)
                        .checked_sub(half)
                        .and_then(|idx| input.get(idx))
                        .map(|sample| sample * coeff)
                })
                .sum()
        })
        .collect()
}

/// Hamming-windowed sinc taps normalized to unity gain.
pub(super) fn design_low_pass(normalized_cutoff: f32, taps: usize) -> Vec<f32> {
    let m = (taps.max(2) - 1) as f32;
    let mut coeffs: Vec<f32> = (0..taps)
        .map(|n| {
            let centred = n as f32 - m / 2.0;
            let x = 2.0 * PI * normalized_cutoff * centred;
            let sinc = if centred == 0.0 {
                2.0 * normalized_cutoff
            } else {
                (2.0 * normalized_cutoff * x.sin()) / x
            };
            let window = 0.54 - 0.46 * ((2.0 * PI * n as f32) / m).cos();
            sinc * window
        })
        .collect();

    let sum: f32 = coeffs.iter().sum();
    if sum != 0.0 {
        coeffs.iter_mut().for_each(|c| *c /= sum);
    }
    coeffs
}

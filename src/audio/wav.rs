use super::{AudioBuffer, BITS_PER_SAMPLE, CHANNELS, SAMPLE_RATE};
use anyhow::{Context, Result};
use std::path::Path;

/// Write the buffer as a canonical 44-byte-header PCM WAVE file (mono, 16 kHz, 16-bit).
pub fn write_wav(path: &Path, buffer: &AudioBuffer) -> Result<()> {
    let spec = hound::WavSpec {
        channels: CHANNELS,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: BITS_PER_SAMPLE,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec)
        .with_context(|| format!("failed to create {}", path.display()))?;
    for &sample in buffer.samples() {
        writer
            .write_sample(sample)
            .with_context(|| format!("failed to write samples to {}", path.display()))?;
    }
    writer
        .finalize()
        .with_context(|| format!("failed to finalize {}", path.display()))?;
    Ok(())
}

const FLOOR_DB: f32 = -60.0;

/// RMS level of a PCM capture in dBFS, floored at -60 dB for silence.
pub fn rms_db(samples: &[i16]) -> f32 {
    if samples.is_empty() {
        return FLOOR_DB;
    }
    let energy: f32 = samples
        .iter()
        .map(|&s| {
            let v = f32::from(s) / 32_768.0;
            v * v
        })
        .sum::<f32>()
        / samples.len() as f32;
    let rms = energy.sqrt().max(1e-6);
    (20.0 * rms.log10()).max(FLOOR_DB)
}

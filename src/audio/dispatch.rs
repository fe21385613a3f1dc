/// Downmix interleaved multi-channel input to mono, converting each sample to
/// f32 first, so the rest of the capture path only ever sees one channel.
pub(super) fn append_downmixed_samples<T, F>(
    buf: &mut Vec<f32>,
    data: &[T],
    channels: usize,
    mut convert: F,
) where
    T: Copy,
    F: FnMut(T) -> f32,
{
    if channels <= 1 {
        buf.extend(data.iter().copied().map(&mut convert));
        return;
    }

    let mut acc = 0.0f32;
    let mut count = 0usize;
    for sample in data.iter().copied() {
        acc += convert(sample);
        count += 1;
        if count == channels {
            buf.push(acc / channels as f32);
            acc = 0.0;
            count = 0;
        }
    }
    // A trailing partial frame is averaged over what arrived.
    if count > 0 {
        buf.push(acc / count as f32);
    }
}

/// Quantize normalized [-1, 1] samples into `out`, zero-filling any shortfall.
pub(super) fn quantize_into(out: &mut [i16], samples: &[f32]) {
    let mut source = samples.iter().copied();
    for slot in out.iter_mut() {
        *slot = match source.next() {
            Some(sample) => (sample.clamp(-1.0, 1.0) * f32::from(i16::MAX)).round() as i16,
            None => 0,
        };
    }
}

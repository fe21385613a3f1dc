use super::dispatch::{append_downmixed_samples, quantize_into};
use super::resample::{
    basic_resample, design_low_pass, downsampling_tap_count, low_pass_fir, resample_linear,
    resample_to_target_rate, MAX_DEVICE_RATE, MIN_DEVICE_RATE,
};
use super::{samples_for_duration, write_wav, AudioBuffer, SAMPLE_RATE};
use std::f32::consts::PI;
use std::fs;
use std::time::Duration;

#[test]
fn downmixes_multi_channel_audio() {
    let mut buf = Vec::new();
    let samples = [1.0f32, -1.0, 0.5, 0.5];
    append_downmixed_samples(&mut buf, &samples, 2, |sample| sample);
    assert_eq!(buf, vec![0.0, 0.5]);
}

#[test]
fn preserves_single_channel_audio() {
    let mut buf = Vec::new();
    let samples = [0.1f32, 0.2, 0.3];
    append_downmixed_samples(&mut buf, &samples, 1, |sample| sample);
    assert_eq!(buf, samples);
}

#[test]
fn downmix_averages_trailing_partial_frame() {
    let mut buf = Vec::new();
    append_downmixed_samples(&mut buf, &[0.2f32, 0.4, 0.6, 1.0], 3, |s| s);
    assert_eq!(buf.len(), 2);
    assert!((buf[1] - 1.0).abs() < 1e-6);
}

#[test]
fn quantize_clamps_and_zero_fills() {
    let mut out = [7i16; 5];
    quantize_into(&mut out, &[1.0, -1.0, 2.0]);
    assert_eq!(out, [i16::MAX, -i16::MAX, i16::MAX, 0, 0]);
}

#[test]
fn one_second_is_sixteen_thousand_samples() {
    assert_eq!(samples_for_duration(Duration::from_secs(1)), 16_000);
    assert_eq!(AudioBuffer::for_duration(Duration::from_millis(250)).len(), 4_000);
}

#[test]
fn overwrite_keeps_length_fixed() {
    let mut buffer = AudioBuffer::new(4);
    buffer.overwrite(&[1, 2, 3, 4, 5, 6]);
    assert_eq!(buffer.samples(), &[1, 2, 3, 4]);
    buffer.overwrite(&[9]);
    assert_eq!(buffer.samples(), &[9, 0, 0, 0]);
}

#[test]
fn resample_to_target_rate_returns_input_when_rate_matches() {
    let input = vec![0.1f32, 0.2, 0.3];
    assert_eq!(resample_to_target_rate(&input, SAMPLE_RATE), input);
}

#[test]
fn resample_to_target_rate_returns_empty_for_empty_input() {
    assert!(resample_to_target_rate(&[], 48_000).is_empty());
}

#[test]
fn resample_from_48k_reaches_one_second() {
    let input: Vec<f32> = (0..48_000).map(|i| (i as f32 * 0.01).sin()).collect();
    let output = resample_to_target_rate(&input, 48_000);
    let diff = (output.len() as isize - 16_000).abs();
    assert!(diff <= 10, "got {} samples", output.len());
}

#[test]
fn basic_resample_scales_length() {
    let input: Vec<f32> = (0..4_410).map(|i| (i as f32 * 0.02).sin()).collect();
    let output = basic_resample(&input, 44_100);
    assert_eq!(output.len(), 1_600);
}

#[test]
fn basic_resample_passes_out_of_range_rates_through() {
    let input = vec![0.5f32; 10];
    assert_eq!(basic_resample(&input, MIN_DEVICE_RATE - 1), input);
    assert_eq!(basic_resample(&input, MAX_DEVICE_RATE + 1), input);
}

#[test]
fn resample_linear_scales_length() {
    let input = vec![0.0f32, 1.0, 2.0, 3.0];
    let result = resample_linear(&input, 0.5);
    assert_eq!(result.len(), 2);
    assert!(result[0].abs() < 1e-6);
}

#[test]
fn tap_count_is_odd_and_bounded() {
    for rate in [16_000, 22_050, 44_100, 48_000, 96_000, 1_600_000] {
        let taps = downsampling_tap_count(rate);
        assert_eq!(taps % 2, 1, "rate {rate}");
        assert!((11..=129).contains(&taps), "rate {rate}");
    }
}

#[test]
fn low_pass_has_unity_dc_gain() {
    let coeffs = design_low_pass(0.15, 21);
    let sum: f32 = coeffs.iter().sum();
    assert!((sum - 1.0).abs() < 1e-5);
}

#[test]
fn low_pass_attenuates_above_target_nyquist() {
    let rate = 48_000u32;
    let tone: Vec<f32> = (0..4_800)
        .map(|n| (2.0 * PI * 12_000.0 * n as f32 / rate as f32).sin())
        .collect();
    let filtered = low_pass_fir(&tone, rate, downsampling_tap_count(rate));
    let energy = |s: &[f32]| s[200..4_600].iter().map(|v| v * v).sum::<f32>();
    assert!(energy(&filtered) < 0.1 * energy(&tone));
}

#[test]
fn wav_dump_has_canonical_header() {
    let path = std::env::temp_dir().join(format!("voxsnake_dump_{}.wav", std::process::id()));
    let mut buffer = AudioBuffer::new(16_000);
    buffer.overwrite(&[1, -2, 300]);
    write_wav(&path, &buffer).expect("write wav");
    let bytes = fs::read(&path).expect("read wav");
    let _ = fs::remove_file(&path);

    let u32_at = |at: usize| u32::from_le_bytes(bytes[at..at + 4].try_into().unwrap());
    let u16_at = |at: usize| u16::from_le_bytes(bytes[at..at + 2].try_into().unwrap());
    let data_len = 16_000 * 2;

    assert_eq!(bytes.len(), 44 + data_len);
    assert_eq!(&bytes[0..4], b"RIFF");
    assert_eq!(u32_at(4) as usize, 36 + data_len);
    assert_eq!(&bytes[8..12], b"WAVE");
    assert_eq!(&bytes[12..16], b"fmt ");
    assert_eq!(u32_at(16), 16);
    assert_eq!(u16_at(20), 1);
    assert_eq!(u16_at(22), 1);
    assert_eq!(u32_at(24), SAMPLE_RATE);
    assert_eq!(u32_at(28), SAMPLE_RATE * 2);
    assert_eq!(u16_at(32), 2);
    assert_eq!(u16_at(34), 16);
    assert_eq!(&bytes[36..40], b"data");
    assert_eq!(u32_at(40) as usize, data_len);
    assert_eq!(i16::from_le_bytes([bytes[44], bytes[45]]), 1);
    assert_eq!(i16::from_le_bytes([bytes[46], bytes[47]]), -2);
    assert_eq!(i16::from_le_bytes([bytes[48], bytes[49]]), 300);
}

//! Default-microphone capture via CPAL.
//!
//! The device is opened, recorded from for the requested duration, and
//! released again on every call, so no handle outlives a capture.

use super::capture::{CaptureDevice, CaptureError};
use super::dispatch::{append_downmixed_samples, quantize_into};
use super::resample::resample_to_target_rate;
use crate::{lock_or_recover, log_debug};
use anyhow::{Context, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, StreamConfig};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

/// List input device names for `--list-input-devices`.
pub fn list_input_devices() -> Result<Vec<String>> {
    let host = cpal::default_host();
    let devices = host.input_devices().context("no input devices available")?;
    Ok(devices.filter_map(|device| device.name().ok()).collect())
}

/// The system default input device. Holds no handle between captures.
#[derive(Debug, Default)]
pub struct CpalDevice;

impl CpalDevice {
    pub fn new() -> Self {
        Self
    }
}

impl CaptureDevice for CpalDevice {
    fn fill(&mut self, out: &mut [i16], duration: Duration) -> Result<(), CaptureError> {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or_else(|| CaptureError::DeviceOpen("no default input device".to_string()))?;
        let default_config = device
            .default_input_config()
            .map_err(|err| CaptureError::DeviceOpen(err.to_string()))?;
        let format = default_config.sample_format();
        let config: StreamConfig = default_config.into();
        let device_rate = config.sample_rate.0;
        let channels = usize::from(config.channels.max(1));

        log_debug(&format!(
            "capture config: format={format:?} sample_rate={device_rate}Hz channels={channels}"
        ));

        // CPAL delivers samples on its own callback thread; collect them here
        // and take ownership once the stream is gone.
        let expected = (duration.as_secs_f64() * f64::from(device_rate)).ceil() as usize;
        let shared = Arc::new(Mutex::new(Vec::<f32>::with_capacity(expected)));
        let err_fn = |err| log_debug(&format!("audio_stream_error: {err}"));

        let stream = match format {
            SampleFormat::F32 => {
                let sink = shared.clone();
                device.build_input_stream(
                    &config,
                    move |data: &[f32], _| {
                        if let Ok(mut buf) = sink.lock() {
                            append_downmixed_samples(&mut buf, data, channels, |s| s);
                        }
                    },
                    err_fn,
                    None,
                )
            }
            SampleFormat::I16 => {
                let sink = shared.clone();
                device.build_input_stream(
                    &config,
                    move |data: &[i16], _| {
                        if let Ok(mut buf) = sink.lock() {
                            append_downmixed_samples(&mut buf, data, channels, |s| {
                                f32::from(s) / 32_768.0
                            });
                        }
                    },
                    err_fn,
                    None,
                )
            }
            SampleFormat::U16 => {
                let sink = shared.clone();
                device.build_input_stream(
                    &config,
                    move |data: &[u16], _| {
                        if let Ok(mut buf) = sink.lock() {
                            append_downmixed_samples(&mut buf, data, channels, |s| {
                                (f32::from(s) - 32_768.0) / 32_768.0
                            });
                        }
                    },
                    err_fn,
                    None,
                )
            }
            other => {
                return Err(CaptureError::DevicePrepare(format!(
                    "unsupported sample format: {other:?}"
                )))
            }
        }
        .map_err(|err| CaptureError::DevicePrepare(err.to_string()))?;

        // Dropping `stream` on the early return below releases the device.
        stream
            .play()
            .map_err(|err| CaptureError::DeviceStart(err.to_string()))?;
        thread::sleep(duration);
        if let Err(err) = stream.pause() {
            log_debug(&format!("failed to pause audio stream: {err}"));
        }
        drop(stream);

        let captured = std::mem::take(&mut *lock_or_recover(&shared, "capture buffer"));
        if captured.is_empty() {
            return Err(CaptureError::NoSamples(mic_permission_hint().to_string()));
        }

        let resampled = resample_to_target_rate(&captured, device_rate);
        quantize_into(out, &resampled);
        Ok(())
    }

    fn name(&self) -> String {
        cpal::default_host()
            .default_input_device()
            .and_then(|device| device.name().ok())
            .unwrap_or_else(|| "no input device".to_string())
    }
}

fn mic_permission_hint() -> &'static str {
    #[cfg(target_os = "macos")]
    {
        "check System Settings > Privacy & Security > Microphone for your terminal"
    }
    #[cfg(target_os = "linux")]
    {
        "check PipeWire/PulseAudio permissions and that the device is not muted"
    }
    #[cfg(target_os = "windows")]
    {
        "check Settings > Privacy & Security > Microphone for your terminal"
    }
    #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
    {
        "check OS microphone permissions"
    }
}

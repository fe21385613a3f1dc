use crate::audio::CAPTURE_MS;
use crate::game::TICK_INTERVAL;
use std::env;
use std::path::PathBuf;

pub const DEFAULT_TICK_MS: u64 = TICK_INTERVAL.as_millis() as u64;
pub const DEFAULT_CAPTURE_MS: u64 = CAPTURE_MS;
pub const DEFAULT_TARGET_FPS: u32 = 60;
pub const DEFAULT_GAME_OVER_MS: u64 = 1_500;
pub const DEFAULT_DUMP_PATH: &str = "recording.wav";

pub(super) const MIN_TICK_MS: u64 = 20;
pub(super) const MAX_TICK_MS: u64 = 2_000;
pub(super) const MIN_CAPTURE_MS: u64 = 100;
pub(super) const MAX_CAPTURE_MS: u64 = 5_000;
pub(super) const MIN_TARGET_FPS: u32 = 1;
pub(super) const MAX_TARGET_FPS: u32 = 240;
pub(super) const MAX_GAME_OVER_MS: u64 = 10_000;

pub(super) fn default_trace_log() -> PathBuf {
    env::temp_dir().join("voxsnake_trace.jsonl")
}

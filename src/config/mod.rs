//! Command-line parsing and validation helpers.

mod defaults;
mod validation;

use crate::classifier::DEFAULT_MODEL_FILE;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

use defaults::default_trace_log;
pub use defaults::{
    DEFAULT_CAPTURE_MS, DEFAULT_DUMP_PATH, DEFAULT_GAME_OVER_MS, DEFAULT_TARGET_FPS,
    DEFAULT_TICK_MS,
};

/// CLI options for VoxSnake. Every flag defaults to the fixed game constants.
#[derive(Debug, Parser, Clone)]
#[command(about = "VoxSnake: steer a snake with spoken commands", author, version)]
pub struct AppConfig {
    /// Classifier model (ONNX), resolved against the working directory
    #[arg(long = "model-path", default_value = DEFAULT_MODEL_FILE)]
    pub model_path: PathBuf,

    /// Simulation tick interval (milliseconds)
    #[arg(long = "tick-ms", default_value_t = DEFAULT_TICK_MS)]
    pub tick_ms: u64,

    /// Length of each voice capture (milliseconds)
    #[arg(long = "capture-ms", default_value_t = DEFAULT_CAPTURE_MS)]
    pub capture_ms: u64,

    /// Render/input poll rate (frames per second)
    #[arg(long = "target-fps", default_value_t = DEFAULT_TARGET_FPS)]
    pub target_fps: u32,

    /// Where `r` writes the last capture
    #[arg(long = "dump-path", default_value = DEFAULT_DUMP_PATH)]
    pub dump_path: PathBuf,

    /// Run capture on a listener thread or inline with rendering
    #[arg(long = "capture-mode", value_enum, default_value_t = CaptureMode::Threaded)]
    pub capture_mode: CaptureMode,

    /// Seed for food placement (random when omitted)
    #[arg(long)]
    pub seed: Option<u64>,

    /// How long the game-over frame stays up (milliseconds)
    #[arg(long = "game-over-ms", default_value_t = DEFAULT_GAME_OVER_MS)]
    pub game_over_ms: u64,

    /// Print detected audio input devices and exit
    #[arg(long = "list-input-devices", default_value_t = false)]
    pub list_input_devices: bool,

    /// Enable file logging (debug)
    #[arg(long = "logs", default_value_t = false)]
    pub logs: bool,

    /// Disable all file logging (overrides --logs and --log-timings)
    #[arg(long = "no-logs", default_value_t = false)]
    pub no_logs: bool,

    /// Log per-capture timings (implies --logs)
    #[arg(long)]
    pub log_timings: bool,

    /// Structured JSON trace output
    #[arg(long = "trace-log", default_value_os_t = default_trace_log())]
    pub trace_log: PathBuf,
}

impl AppConfig {
    pub fn logging_enabled(&self) -> bool {
        !self.no_logs && (self.logs || self.log_timings)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn capture_duration(&self) -> Duration {
        Duration::from_millis(self.capture_ms)
    }

    /// Upper bound on one render frame.
    pub fn frame_budget(&self) -> Duration {
        Duration::from_secs(1) / self.target_fps.max(1)
    }

    pub fn game_over_hold(&self) -> Duration {
        Duration::from_millis(self.game_over_ms)
    }
}

/// Where capture runs relative to the render loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CaptureMode {
    /// Listener thread feeding a latest-wins slot; rendering never blocks.
    Threaded,
    /// One blocking capture per frame.
    Inline,
}

impl CaptureMode {
    pub fn label(self) -> &'static str {
        match self {
            CaptureMode::Threaded => "threaded",
            CaptureMode::Inline => "inline",
        }
    }
}

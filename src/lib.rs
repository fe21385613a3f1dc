//! Voice-steered snake: capture a second of speech, classify it into a
//! direction, and feed that into a tick-driven grid simulation.

mod app;
pub mod audio;
pub mod classifier;
pub mod command;
pub mod config;
pub mod features;
pub mod game;
mod lock;
pub mod orchestrator;
pub mod session;
mod telemetry;
pub mod terminal_restore;

pub use app::{crash_log_path, init_logging, log_debug, log_file_path, log_panic};
pub(crate) use lock::lock_or_recover;
pub use telemetry::init_tracing;

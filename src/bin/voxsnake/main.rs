mod event_loop;
mod input;
mod render;

use anyhow::Result;
use event_loop::{run_game_loop, LoopSettings};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use voxsnake::audio::{list_input_devices, samples_for_duration, CaptureDevice, CpalDevice};
use voxsnake::classifier::Classifier;
use voxsnake::config::AppConfig;
use voxsnake::features::frame_count;
use voxsnake::game::{GameState, Grid};
use voxsnake::orchestrator::Orchestrator;
use voxsnake::session::{CommandSource, VoiceSession};
use voxsnake::terminal_restore::TerminalRestoreGuard;
use voxsnake::{crash_log_path, init_logging, init_tracing, log_debug, log_file_path};

fn main() -> Result<()> {
    let config = AppConfig::parse_args()?;

    if config.list_input_devices {
        match list_input_devices() {
            Ok(devices) => print!("{}", format_device_list(&devices)),
            Err(err) => eprintln!("Failed to list audio input devices: {err:#}"),
        }
        return Ok(());
    }

    init_logging(&config);
    init_tracing(&config);
    log_debug("=== VoxSnake started ===");
    log_debug(&format!("Log file: {}", log_file_path().display()));
    log_debug(&format!("Crash log: {}", crash_log_path().display()));
    tracing::info!(
        mode = config.capture_mode.label(),
        tick_ms = config.tick_ms,
        capture_ms = config.capture_ms,
        "voxsnake starting"
    );

    let result = run(&config);

    log_debug("=== VoxSnake exiting ===");
    if let Err(ref err) = result {
        log_debug(&format!("Exit with error: {err:#}"));
    }
    result
}

fn run(config: &AppConfig) -> Result<()> {
    let capture_duration = config.capture_duration();
    let frames = frame_count(samples_for_duration(capture_duration));
    let classifier = Classifier::load(&config.model_path, frames);

    let device = CpalDevice::new();
    let device_name = device.name();
    log_debug(&format!("Input device: {device_name}"));
    tracing::info!(device = %device_name, "using default input device");

    let session = VoiceSession::new(Box::new(device), classifier, capture_duration)
        .with_timing_logs(config.log_timings);
    let model_loaded = session.classifier().is_loaded();
    let mut orch = Orchestrator::new(
        GameState::new(Grid::default(), config.seed),
        config.tick_interval(),
    );
    let settings = LoopSettings {
        frame_budget: config.frame_budget(),
        game_over_hold: config.game_over_hold(),
        dump_path: &config.dump_path,
        mode: config.capture_mode,
        model_loaded,
    };

    let terminal_guard = TerminalRestoreGuard::new();
    terminal_guard.enable_raw_mode()?;
    let mut stdout = io::stdout();
    terminal_guard.enter_alt_screen(&mut stdout)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    let mut source = CommandSource::start(session, config.capture_mode);
    let result = run_game_loop(&mut terminal, &mut orch, &mut source, &settings);

    drop(terminal);
    drop(terminal_guard);
    source.shutdown();

    let game = orch.game();
    log_debug(&format!(
        "final score {} after {} ticks",
        game.score(),
        orch.ticks()
    ));
    if result.is_ok() {
        println!("Score: {}", game.score());
    }
    result
}

fn format_device_list(devices: &[String]) -> String {
    let mut output = String::new();
    if devices.is_empty() {
        output.push_str("No audio input devices detected.\n");
    } else {
        output.push_str("Available audio input devices:\n");
        for name in devices {
            output.push_str(&format!("  - {name}\n"));
        }
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_list_names_each_device() {
        let output = format_device_list(&["Mic A".to_string(), "Mic B".to_string()]);
        assert!(output.contains("Available audio input devices:"));
        assert!(output.contains("  - Mic A\n"));
        assert!(output.contains("  - Mic B\n"));
    }

    #[test]
    fn empty_device_list_says_so() {
        assert_eq!(format_device_list(&[]), "No audio input devices detected.\n");
    }
}

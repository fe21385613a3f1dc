//! Frame loop: advance time, draw, take the latest command, handle keys.

use crate::input::{action_for, Action};
use crate::render::{draw, StatusView};
use anyhow::Result;
use crossterm::event::{self, Event};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::path::Path;
use std::time::{Duration, Instant};
use voxsnake::config::CaptureMode;
use voxsnake::log_debug;
use voxsnake::orchestrator::{LoopState, Orchestrator};
use voxsnake::session::CommandSource;

pub(crate) struct LoopSettings<'a> {
    pub(crate) frame_budget: Duration,
    pub(crate) game_over_hold: Duration,
    pub(crate) dump_path: &'a Path,
    pub(crate) mode: CaptureMode,
    pub(crate) model_loaded: bool,
}

pub(crate) fn run_game_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    orch: &mut Orchestrator,
    source: &mut CommandSource,
    settings: &LoopSettings<'_>,
) -> Result<()> {
    let mut notice: Option<String> = None;
    let mut last_frame = Instant::now();

    loop {
        let now = Instant::now();
        orch.on_frame(now.duration_since(last_frame));
        last_frame = now;

        let view = StatusView {
            mode: settings.mode,
            model_loaded: settings.model_loaded,
            notice: notice.as_deref(),
        };
        terminal.draw(|frame| draw(frame, orch, &view))?;

        match orch.state() {
            LoopState::Closed => break,
            LoopState::Dead => {
                // The dead frame is up; leave it there, still honouring quit.
                hold_game_over(orch, settings.game_over_hold)?;
                orch.finish_dead_frame();
                break;
            }
            LoopState::Running => {}
        }

        if let Some(heard) = source.poll() {
            orch.on_heard(heard);
        }

        if event::poll(settings.frame_budget)? {
            if let Event::Key(key) = event::read()? {
                match action_for(key) {
                    Some(Action::Quit) => orch.request_close(),
                    Some(Action::DumpCapture) => {
                        notice = Some(dump_capture(orch, settings.dump_path));
                    }
                    None => {}
                }
            }
        }
    }
    Ok(())
}

fn hold_game_over(orch: &mut Orchestrator, hold: Duration) -> Result<()> {
    let deadline = Instant::now() + hold;
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Ok(());
        }
        if event::poll(remaining)? {
            if let Event::Key(key) = event::read()? {
                if action_for(key) == Some(Action::Quit) {
                    orch.request_close();
                    return Ok(());
                }
            }
        }
    }
}

fn dump_capture(orch: &Orchestrator, path: &Path) -> String {
    match orch.dump_last_capture(path) {
        Ok(true) => format!("saved {}", path.display()),
        Ok(false) => "nothing captured yet".to_string(),
        Err(err) => {
            log_debug(&format!("wav dump failed: {err:#}"));
            "dump failed (see log)".to_string()
        }
    }
}

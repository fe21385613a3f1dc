//! Loop state machine tying the voice pipeline to the simulation.
//!
//! The front-end feeds it frame deltas and heard commands; it decides when the
//! simulation advances and when the session ends. Rendering stays outside.

use crate::audio::{self, AudioBuffer};
use crate::command::{CommandLabel, CommandMapper, Direction};
use crate::game::{GameState, GameStatus, TickClock};
use crate::log_debug;
use crate::session::Heard;
use anyhow::Result;
use std::path::Path;
use std::time::Duration;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LoopState {
    Running,
    /// Creature died; one more frame is drawn before closing.
    Dead,
    Closed,
}

/// Latest result from the voice pipeline, kept for the status line.
#[derive(Clone, Debug, PartialEq)]
pub struct LastHeard {
    pub label: CommandLabel,
    pub level_db: f32,
    pub capture_failed: bool,
    /// Wall-clock length of the capture that produced this label.
    pub capture_ms: u64,
}

pub struct Orchestrator {
    game: GameState,
    clock: TickClock,
    state: LoopState,
    last_heard: Option<LastHeard>,
    last_capture: Option<AudioBuffer>,
    ticks: u64,
}

impl Orchestrator {
    pub fn new(game: GameState, tick_interval: Duration) -> Self {
        Self {
            game,
            clock: TickClock::new(tick_interval),
            state: LoopState::Running,
            last_heard: None,
            last_capture: None,
            ticks: 0,
        }
    }

    pub fn game(&self) -> &GameState {
        &self.game
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn last_heard(&self) -> Option<&LastHeard> {
        self.last_heard.as_ref()
    }

    pub fn last_capture(&self) -> Option<&AudioBuffer> {
        self.last_capture.as_ref()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Accumulate one frame's delta and advance the simulation if a tick is due.
    /// Returns whether a tick ran.
    pub fn on_frame(&mut self, frame_delta: Duration) -> bool {
        if self.state != LoopState::Running || !self.clock.advance(frame_delta) {
            return false;
        }
        let outcome = self.game.step();
        self.ticks += 1;
        if outcome.ate {
            log_debug(&format!("ate food; score={}", self.game.score()));
            tracing::info!(score = self.game.score(), tick = self.ticks, "food eaten");
        }
        if outcome.status == GameStatus::Dead {
            self.state = LoopState::Dead;
            log_debug(&format!("game over after {} ticks", self.ticks));
            tracing::info!(score = self.game.score(), tick = self.ticks, "game over");
        }
        true
    }

    /// Apply a heard command to the pending direction, refusing any heading that
    /// points back along the last move. Returns the direction the next tick will use.
    pub fn on_heard(&mut self, heard: Heard) -> Direction {
        self.last_heard = Some(LastHeard {
            label: heard.label,
            level_db: heard.level_db,
            capture_failed: heard.capture_error.is_some(),
            capture_ms: heard.timings.capture_ms,
        });
        self.last_capture = Some(heard.snapshot);

        let current = self.game.direction();
        if self.state != LoopState::Running {
            return current;
        }
        let next = CommandMapper::map_pending(heard.label, current, self.game.last_moved());
        if next != current {
            tracing::debug!(
                label = heard.label.label(),
                from = current.label(),
                to = next.label(),
                "direction changed"
            );
        }
        self.game.steer(next);
        next
    }

    pub fn request_close(&mut self) {
        if self.state != LoopState::Closed {
            log_debug("close requested");
        }
        self.state = LoopState::Closed;
    }

    /// Called once the terminal Dead frame has been shown.
    pub fn finish_dead_frame(&mut self) {
        if self.state == LoopState::Dead {
            self.state = LoopState::Closed;
        }
    }

    /// Persist the most recent capture as a WAV file. Returns false when
    /// nothing has been captured yet.
    pub fn dump_last_capture(&self, path: &Path) -> Result<bool> {
        let Some(buffer) = self.last_capture.as_ref() else {
            return Ok(false);
        };
        audio::write_wav(path, buffer)?;
        log_debug(&format!("wrote {} samples to {}", buffer.len(), path.display()));
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{CaptureDevice, CaptureError};
    use crate::classifier::{Classifier, ClassifierError, CommandModel};
    use crate::features::FeatureTensor;
    use crate::game::{Cell, Food, Grid, Snake};
    use crate::session::{ListenTimings, VoiceSession};
    use std::collections::VecDeque;
    use std::sync::Mutex;

    const FRAME: Duration = Duration::from_millis(16);

    fn heard(label: CommandLabel) -> Heard {
        Heard {
            label,
            capture_error: None,
            level_db: -60.0,
            snapshot: AudioBuffer::new(16),
            timings: ListenTimings::default(),
        }
    }

    fn orchestrator_at(segments: Vec<Cell>, direction: Direction, food: Cell) -> Orchestrator {
        let grid = Grid::default();
        let snake = Snake::from_segments(segments, direction).expect("non-empty snake");
        let game = GameState::from_parts(grid, snake, Food::at(food), 7);
        Orchestrator::new(game, Duration::from_millis(200))
    }

    #[test]
    fn ticks_follow_accumulated_time_not_frame_count() {
        let mut orch = orchestrator_at(
            vec![Cell::new(0, 0)],
            Direction::Right,
            Cell::new(780, 780),
        );
        let ticked: Vec<bool> = (0..13).map(|_| orch.on_frame(FRAME)).collect();
        assert_eq!(ticked.iter().filter(|&&t| t).count(), 1);
        assert!(ticked[12]);
        assert_eq!(orch.game().snake().head(), Cell::new(20, 0));

        // A single long frame still yields one tick.
        assert!(orch.on_frame(Duration::from_secs(1)));
        assert_eq!(orch.ticks(), 2);
    }

    #[test]
    fn reversal_is_rejected_and_turn_is_applied() {
        let mut orch = orchestrator_at(
            vec![Cell::new(400, 400)],
            Direction::Right,
            Cell::new(0, 0),
        );
        assert_eq!(orch.on_heard(heard(CommandLabel::Left)), Direction::Right);
        assert_eq!(orch.on_heard(heard(CommandLabel::Up)), Direction::Up);
        assert_eq!(orch.on_heard(heard(CommandLabel::Unknown)), Direction::Up);
        orch.on_frame(Duration::from_millis(200));
        assert_eq!(orch.game().snake().head(), Cell::new(400, 380));
    }

    #[test]
    fn two_commands_between_ticks_cannot_reverse_into_the_neck() {
        let mut orch = orchestrator_at(
            vec![Cell::new(400, 400), Cell::new(380, 400), Cell::new(360, 400)],
            Direction::Right,
            Cell::new(0, 0),
        );
        assert_eq!(orch.on_heard(heard(CommandLabel::Up)), Direction::Up);
        assert_eq!(orch.on_heard(heard(CommandLabel::Left)), Direction::Up);
        assert!(orch.on_frame(Duration::from_millis(200)));
        assert_eq!(orch.state(), LoopState::Running);
        assert_eq!(orch.game().snake().head(), Cell::new(400, 380));

        // After the upward move, Left is a legal turn.
        assert_eq!(orch.on_heard(heard(CommandLabel::Left)), Direction::Left);
        assert!(orch.on_frame(Duration::from_millis(200)));
        assert_eq!(orch.game().snake().head(), Cell::new(380, 380));
        assert_eq!(orch.state(), LoopState::Running);
    }

    struct SilentMic;

    impl CaptureDevice for SilentMic {
        fn fill(&mut self, out: &mut [i16], _: Duration) -> Result<(), CaptureError> {
            out.fill(0);
            Ok(())
        }
    }

    /// Answers each forward pass with the next scripted class, and insists on
    /// the all-zero spectrogram that silence produces.
    struct ScriptedClasses(Mutex<VecDeque<usize>>);

    impl CommandModel for ScriptedClasses {
        fn forward(&self, features: &FeatureTensor) -> Result<Vec<f32>, ClassifierError> {
            if features.as_slice().iter().any(|&p| p != 0.0) {
                return Err(ClassifierError::Inference("expected silence".into()));
            }
            let class = self
                .0
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| ClassifierError::Inference("script exhausted".into()))?;
            let mut scores = vec![0.0; 4];
            scores[class] = 5.0;
            Ok(scores)
        }
    }

    #[test]
    fn silent_capture_drives_direction_through_the_whole_pipeline() {
        // Classes: left (reversal of right), then up.
        let model = ScriptedClasses(Mutex::new(VecDeque::from([2, 0])));
        let mut session = VoiceSession::new(
            Box::new(SilentMic),
            Classifier::with_model(Box::new(model)),
            Duration::from_millis(1_000),
        );
        let mut orch = orchestrator_at(
            vec![Cell::new(400, 400), Cell::new(380, 400)],
            Direction::Right,
            Cell::new(0, 0),
        );

        let heard = session.listen();
        assert!(heard.snapshot.samples().iter().all(|&s| s == 0));
        assert_eq!(heard.label, CommandLabel::Left);
        assert_eq!(orch.on_heard(heard), Direction::Right);

        let heard = session.listen();
        assert_eq!(heard.label, CommandLabel::Up);
        assert_eq!(orch.on_heard(heard), Direction::Up);

        assert!(orch.on_frame(Duration::from_millis(200)));
        assert_eq!(orch.game().snake().head(), Cell::new(400, 380));
        assert_eq!(orch.state(), LoopState::Running);

        // Script exhausted: the failure surfaces only as Unknown, heading kept.
        let heard = session.listen();
        assert_eq!(heard.label, CommandLabel::Unknown);
        assert_eq!(orch.on_heard(heard), Direction::Up);
    }

    #[test]
    fn wall_hit_moves_to_dead_then_closed() {
        let mut orch = orchestrator_at(
            vec![Cell::new(780, 0)],
            Direction::Right,
            Cell::new(0, 400),
        );
        assert!(orch.on_frame(Duration::from_millis(200)));
        assert_eq!(orch.state(), LoopState::Dead);

        // Dead games ignore time and commands.
        assert!(!orch.on_frame(Duration::from_millis(200)));
        assert_eq!(orch.on_heard(heard(CommandLabel::Down)), Direction::Right);
        assert_eq!(orch.ticks(), 1);

        orch.finish_dead_frame();
        assert_eq!(orch.state(), LoopState::Closed);
    }

    #[test]
    fn close_request_ends_running_loop() {
        let mut orch = orchestrator_at(vec![Cell::new(0, 0)], Direction::Down, Cell::new(0, 400));
        orch.finish_dead_frame();
        assert_eq!(orch.state(), LoopState::Running);
        orch.request_close();
        assert_eq!(orch.state(), LoopState::Closed);
        assert!(!orch.on_frame(Duration::from_secs(1)));
    }

    #[test]
    fn last_heard_tracks_capture_failures() {
        let mut orch = orchestrator_at(vec![Cell::new(0, 0)], Direction::Down, Cell::new(0, 400));
        assert!(orch.last_heard().is_none());
        let mut failed = heard(CommandLabel::Unknown);
        failed.capture_error = Some(CaptureError::DeviceOpen("gone".into()));
        failed.timings.capture_ms = 1_002;
        orch.on_heard(failed);
        let last = orch.last_heard().expect("recorded");
        assert!(last.capture_failed);
        assert_eq!(last.label, CommandLabel::Unknown);
        assert_eq!(last.capture_ms, 1_002);
    }

    #[test]
    fn dump_without_capture_is_a_no_op() {
        let orch = orchestrator_at(vec![Cell::new(0, 0)], Direction::Down, Cell::new(0, 400));
        let path = std::env::temp_dir().join("voxsnake_never_written.wav");
        assert!(!orch.dump_last_capture(&path).expect("no error"));
    }

    #[test]
    fn dump_writes_last_snapshot() {
        let mut orch = orchestrator_at(vec![Cell::new(0, 0)], Direction::Down, Cell::new(0, 400));
        orch.on_heard(heard(CommandLabel::Down));
        let path = std::env::temp_dir().join(format!("voxsnake_orch_{}.wav", std::process::id()));
        assert!(orch.dump_last_capture(&path).expect("dump"));
        let len = std::fs::metadata(&path).expect("written").len();
        let _ = std::fs::remove_file(&path);
        assert_eq!(len, 44 + 16 * 2);
    }
}

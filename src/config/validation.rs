use super::defaults::{
    MAX_CAPTURE_MS, MAX_GAME_OVER_MS, MAX_TARGET_FPS, MAX_TICK_MS, MIN_CAPTURE_MS,
    MIN_TARGET_FPS, MIN_TICK_MS,
};
use super::AppConfig;
use anyhow::{bail, Context, Result};
use clap::Parser;
use std::env;
use std::path::{Path, PathBuf};

impl AppConfig {
    /// Parse CLI arguments and validate them right away.
    pub fn parse_args() -> Result<Self> {
        let mut config = Self::parse();
        config.validate()?;
        Ok(config)
    }

    /// Check CLI values and normalize paths.
    pub fn validate(&mut self) -> Result<()> {
        if !(MIN_TICK_MS..=MAX_TICK_MS).contains(&self.tick_ms) {
            bail!(
                "--tick-ms must be between {MIN_TICK_MS} and {MAX_TICK_MS}, got {}",
                self.tick_ms
            );
        }
        if !(MIN_CAPTURE_MS..=MAX_CAPTURE_MS).contains(&self.capture_ms) {
            bail!(
                "--capture-ms must be between {MIN_CAPTURE_MS} and {MAX_CAPTURE_MS}, got {}",
                self.capture_ms
            );
        }
        if !(MIN_TARGET_FPS..=MAX_TARGET_FPS).contains(&self.target_fps) {
            bail!(
                "--target-fps must be between {MIN_TARGET_FPS} and {MAX_TARGET_FPS}, got {}",
                self.target_fps
            );
        }
        if self.game_over_ms > MAX_GAME_OVER_MS {
            bail!(
                "--game-over-ms must be at most {MAX_GAME_OVER_MS}, got {}",
                self.game_over_ms
            );
        }
        if self.dump_path.as_os_str().is_empty() {
            bail!("--dump-path cannot be empty");
        }
        if self.model_path.as_os_str().is_empty() {
            bail!("--model-path cannot be empty");
        }

        let cwd = env::current_dir().context("failed to read the working directory")?;
        self.model_path = resolve_against(&cwd, &self.model_path);
        self.dump_path = resolve_against(&cwd, &self.dump_path);
        Ok(())
    }
}

/// Join relative paths onto `base`; absolute paths pass through.
pub(super) fn resolve_against(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

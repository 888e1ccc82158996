//! Full-screen TUI for the deck walkthrough player.

pub mod effects;
pub mod events;
pub mod modules;
pub mod render;
pub mod runtime;
pub mod state;
pub mod terminal;
pub mod update;

use std::io::{IsTerminal, stderr};

use anyhow::Result;
use deck_engine::config::Config;
pub use runtime::TuiRuntime;

use crate::modules::curriculum;

/// Runs the interactive walkthrough.
///
/// `start_module` selects the initial module by id; `speed` overrides the
/// configured default speed multiplier.
pub async fn run_walkthrough(
    config: &Config,
    start_module: Option<&str>,
    speed: Option<f64>,
) -> Result<()> {
    // The walkthrough requires a terminal to render the TUI
    if !stderr().is_terminal() {
        anyhow::bail!(
            "The walkthrough requires a terminal.\n\
             Use `deck modules` to list modules non-interactively."
        );
    }

    let modules = curriculum();
    let start_index = match start_module {
        Some(id) => modules
            .iter()
            .position(|m| m.id == id)
            .ok_or_else(|| anyhow::anyhow!("Unknown module: {id}"))?,
        None => 0,
    };

    let mut config = config.clone();
    if let Some(speed) = speed {
        anyhow::ensure!(
            speed.is_finite() && speed > 0.0,
            "Speed must be a positive number, got {speed}"
        );
        config.playback.default_speed = speed;
    }

    let mut runtime = TuiRuntime::new(config, modules, start_index)?;
    runtime.run()?;

    Ok(())
}

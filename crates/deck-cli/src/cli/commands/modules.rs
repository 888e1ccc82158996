//! Modules command handler.

use anyhow::Result;
use deck_tui::modules::{ModuleKind, curriculum};

pub fn list() -> Result<()> {
    for module in curriculum() {
        let detail = match &module.kind {
            ModuleKind::Outline { steps } => format!("{} slides", steps.len()),
            ModuleKind::Simulation { script } => format!("simulation, {} steps", script.len()),
        };
        println!("{:<18} {} ({detail})", module.id, module.title);
    }
    Ok(())
}

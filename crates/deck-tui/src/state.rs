//! Application state composition.
//!
//! `AppState` owns everything the reducer touches: the navigation state, the
//! curriculum, and the view of the active module. The sequencer for a
//! simulation module lives inside the view so it is torn down (and its
//! pending timer cancelled) when the module changes.

use deck_engine::config::Config;
use deck_engine::{NavState, Sequencer, SequencerEvent, StepperClaim};
use tokio::sync::mpsc::UnboundedSender;

use crate::modules::{Module, ModuleKind};

/// Discrete speed notches for the +/- transport keys.
pub const SPEED_STEPS: &[f64] = &[0.25, 0.5, 1.0, 1.5, 2.0, 4.0];

/// View of the active module.
pub enum ModuleView {
    /// Slide content rendered from the outline, driven by `NavState`.
    Outline,
    /// A scripted session played back by the sequencer.
    ///
    /// The claim is held for the lifetime of the view; dropping the view
    /// drops the sequencer, which cancels any pending timer.
    Simulation {
        sequencer: Sequencer,
        claim: StepperClaim,
    },
}

/// TUI application state.
pub struct AppState {
    /// Flag indicating the app should quit.
    pub should_quit: bool,
    /// Loaded configuration.
    pub config: Config,
    /// Viewer position (module, step, variants, fullscreen, text scale).
    pub nav: NavState,
    /// The curriculum, in presentation order.
    pub modules: Vec<Module>,
    /// Index of the active module in `modules`.
    pub module_index: usize,
    /// View of the active module.
    pub view: ModuleView,
    /// Index into `SPEED_STEPS` for the playback speed.
    pub speed_idx: usize,
    /// Transient status-line message with remaining ticks to live.
    pub status: Option<(String, u8)>,
}

impl AppState {
    pub fn new(config: Config, modules: Vec<Module>) -> Self {
        let speed_idx = nearest_speed_idx(config.playback.default_speed);
        let nav = NavState::new(config.ui.font_scale);
        Self {
            should_quit: false,
            config,
            nav,
            modules,
            module_index: 0,
            view: ModuleView::Outline,
            speed_idx,
            status: None,
        }
    }

    pub fn active_module(&self) -> &Module {
        &self.modules[self.module_index]
    }

    pub fn speed(&self) -> f64 {
        SPEED_STEPS[self.speed_idx]
    }

    /// Shows a status-line message for a few ticks.
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status = Some((message.into(), 30));
    }

    /// Switches to the module at `index`, tearing down the previous view.
    ///
    /// For simulations a fresh sequencer is built, wired to `playback_tx`,
    /// and registered as the navigation delegate. Dropping the old view
    /// cancels any pending playback timer.
    pub fn activate_module(&mut self, index: usize, playback_tx: &UnboundedSender<SequencerEvent>) {
        if self.modules.get(index).is_none() {
            return;
        }
        // Tear down the old view first so its claim is released while still
        // current; dropping the sequencer cancels any pending timer.
        if let ModuleView::Simulation { claim, .. } =
            std::mem::replace(&mut self.view, ModuleView::Outline)
        {
            self.nav.release_stepper(claim);
        }
        let module = &self.modules[index];
        self.module_index = index;
        self.nav.set_module(module.id, module.total_steps());

        self.view = match &module.kind {
            ModuleKind::Outline { .. } => ModuleView::Outline,
            ModuleKind::Simulation { script } => {
                let sequencer = Sequencer::new(
                    script.clone(),
                    self.config.playback.min_step_delay(),
                    self.speed(),
                    playback_tx.clone(),
                );
                let claim = self.nav.register_stepper();
                ModuleView::Simulation { sequencer, claim }
            }
        };
        self.sync_queries();
    }

    /// Re-registers the variant count for the current outline step.
    ///
    /// Called after every step change so the variant cursor always reflects
    /// the slide on screen.
    pub fn sync_queries(&mut self) {
        let count = match &self.active_module().kind {
            ModuleKind::Outline { steps } => steps
                .get(self.nav.step().saturating_sub(1))
                .map_or(0, |s| s.queries.len()),
            ModuleKind::Simulation { .. } => 0,
        };
        self.nav.register_queries(count);
    }
}

fn nearest_speed_idx(speed: f64) -> usize {
    SPEED_STEPS
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| {
            let da = (*a - speed).abs();
            let db = (*b - speed).abs();
            da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
        })
        .map_or(2, |(i, _)| i)
}

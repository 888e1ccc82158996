//! TUI runtime - owns terminal, runs event loop, executes effects.
//!
//! This is the "Elm runtime" boundary: all side effects happen here.
//! The reducer stays pure and produces effects; this module executes them.
//!
//! ## Playback Channel
//!
//! Sequencers send `SequencerEvent`s to a dedicated channel owned by the
//! runtime. Each frame the runtime drains the channel, wraps the events in
//! `UiEvent::Playback`, and feeds them through the reducer. Timer wakeups
//! come back out as `TransportCmd::TimerElapsed` effects, which the runtime
//! routes into the active sequencer (rescheduling spawns a sleep task, so it
//! must happen here).

use std::io::Stdout;

use anyhow::{Context, Result};
use crossterm::event;
use deck_engine::SequencerEvent;
use deck_engine::config::Config;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tokio::sync::mpsc;

use crate::effects::{TransportCmd, UiEffect};
use crate::events::UiEvent;
use crate::modules::Module;
use crate::state::{AppState, ModuleView, SPEED_STEPS};
use crate::{render, terminal, update};

/// Target frame rate during playback (60fps = ~16ms per frame).
pub const FRAME_DURATION: std::time::Duration = std::time::Duration::from_millis(16);

/// Poll duration when idle (nothing playing, no recent input).
/// Longer timeout reduces CPU usage when nothing is happening.
pub const IDLE_POLL_DURATION: std::time::Duration = std::time::Duration::from_millis(100);

/// Full-screen TUI runtime.
///
/// Owns the terminal and state. Runs the event loop and executes effects.
/// Terminal state is guaranteed to be restored on drop or panic.
pub struct TuiRuntime {
    /// Terminal instance.
    terminal: Terminal<CrosstermBackend<Stdout>>,
    /// Application state.
    pub state: AppState,
    /// Playback sender - cloned into every sequencer.
    playback_tx: mpsc::UnboundedSender<SequencerEvent>,
    /// Playback receiver - runtime drains this each frame.
    playback_rx: mpsc::UnboundedReceiver<SequencerEvent>,
    /// Last time a Tick event was emitted.
    last_tick: std::time::Instant,
    /// Last time a terminal event was received (for fast tick during interaction).
    last_terminal_event: std::time::Instant,
}

impl TuiRuntime {
    /// Creates a new TUI runtime and activates the starting module.
    pub fn new(config: Config, modules: Vec<Module>, start_index: usize) -> Result<Self> {
        // Set up panic hook BEFORE entering alternate screen
        terminal::install_panic_hook();

        let terminal = terminal::setup_terminal().context("Failed to setup terminal")?;

        let (playback_tx, playback_rx) = mpsc::unbounded_channel();
        let mut state = AppState::new(config, modules);
        state.activate_module(start_index, &playback_tx);

        let now = std::time::Instant::now();
        Ok(Self {
            terminal,
            state,
            playback_tx,
            playback_rx,
            last_tick: now,
            last_terminal_event: now,
        })
    }

    /// Runs the main event loop.
    pub fn run(&mut self) -> Result<()> {
        let mut dirty = true; // Start dirty to ensure initial render

        while !self.state.should_quit {
            let events = self.collect_events()?;

            for event in events {
                // Track terminal activity for fast tick mode
                if matches!(&event, UiEvent::Terminal(_)) {
                    self.last_terminal_event = std::time::Instant::now();
                }

                // Every event can change what's on screen (steps arrive via
                // playback, keys move cursors), so mark dirty unconditionally.
                dirty = true;

                let effects = update::update(&mut self.state, event);
                self.execute_effects(effects);
            }

            if dirty {
                self.terminal.draw(|frame| {
                    render::render(&self.state, frame);
                })?;
                dirty = false;
            }
        }

        Ok(())
    }

    /// Collects events from all sources (terminal, playback channel).
    fn collect_events(&mut self) -> Result<Vec<UiEvent>> {
        let mut events = Vec::new();

        // Fast polling while a sequencer is playing or the user is actively
        // interacting; slow polling otherwise to save CPU.
        let playing = matches!(
            &self.state.view,
            ModuleView::Simulation { sequencer, .. } if sequencer.is_playing()
        );
        let recent_terminal_activity = self.last_terminal_event.elapsed() < IDLE_POLL_DURATION;
        let tick_interval = if playing || recent_terminal_activity {
            FRAME_DURATION
        } else {
            IDLE_POLL_DURATION
        };

        // Drain playback events (step changes, completion, timer wakeups)
        while let Ok(ev) = self.playback_rx.try_recv() {
            events.push(UiEvent::Playback(ev));
        }

        let time_until_tick = tick_interval.saturating_sub(self.last_tick.elapsed());

        // Poll terminal events:
        // - If we already have events to process, do non-blocking poll
        // - Otherwise, block until next tick is due
        let poll_duration = if events.is_empty() {
            time_until_tick
        } else {
            std::time::Duration::ZERO
        };

        if event::poll(poll_duration)? {
            events.push(UiEvent::Terminal(event::read()?));
            // Drain any remaining buffered events (non-blocking)
            while event::poll(std::time::Duration::ZERO)? {
                events.push(UiEvent::Terminal(event::read()?));
            }
        }

        if self.last_tick.elapsed() >= tick_interval {
            events.push(UiEvent::Tick);
            self.last_tick = std::time::Instant::now();
        }

        Ok(events)
    }

    /// Executes effects returned by the reducer.
    fn execute_effects(&mut self, effects: Vec<UiEffect>) {
        for effect in effects {
            self.execute_effect(effect);
        }
    }

    /// Executes a single effect.
    fn execute_effect(&mut self, effect: UiEffect) {
        match effect {
            UiEffect::Quit => {
                self.state.should_quit = true;
            }
            UiEffect::ActivateModule { index } => {
                tracing::debug!(index, "activating module");
                self.state.activate_module(index, &self.playback_tx);
            }
            UiEffect::Transport(cmd) => self.execute_transport(cmd),
        }
    }

    fn execute_transport(&mut self, cmd: TransportCmd) {
        let ModuleView::Simulation { sequencer, .. } = &mut self.state.view else {
            return;
        };
        match cmd {
            TransportCmd::TogglePlay => {
                if sequencer.is_playing() {
                    sequencer.pause();
                } else {
                    sequencer.play();
                }
            }
            TransportCmd::Reset => sequencer.reset(),
            TransportCmd::SpeedUp => {
                let idx = (self.state.speed_idx + 1).min(SPEED_STEPS.len() - 1);
                self.state.speed_idx = idx;
                sequencer.set_speed(SPEED_STEPS[idx]);
            }
            TransportCmd::SpeedDown => {
                let idx = self.state.speed_idx.saturating_sub(1);
                self.state.speed_idx = idx;
                sequencer.set_speed(SPEED_STEPS[idx]);
            }
            TransportCmd::TimerElapsed { epoch } => sequencer.on_timer_elapsed(epoch),
        }
    }
}

impl Drop for TuiRuntime {
    fn drop(&mut self) {
        let _ = terminal::restore_terminal();
    }
}

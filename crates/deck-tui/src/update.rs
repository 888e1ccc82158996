//! TUI reducer (update function).
//!
//! All state mutations happen here. The runtime calls `update(app, event)`
//! and executes the returned effects. Effects exist because play/resume and
//! timer wakeups spawn tasks, which the reducer must not do.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use deck_engine::{Direction, NavOutcome, SequencerEvent, Stepper};

use crate::effects::{TransportCmd, UiEffect};
use crate::events::UiEvent;
use crate::state::{AppState, ModuleView};

/// The main reducer function.
pub fn update(app: &mut AppState, event: UiEvent) -> Vec<UiEffect> {
    match event {
        UiEvent::Tick => {
            // Age out the transient status message.
            if let Some((_, ticks)) = &mut app.status {
                *ticks = ticks.saturating_sub(1);
                if *ticks == 0 {
                    app.status = None;
                }
            }
            vec![]
        }
        UiEvent::Terminal(term_event) => handle_terminal_event(app, &term_event),
        UiEvent::Playback(playback) => handle_playback_event(app, &playback),
    }
}

fn handle_playback_event(app: &mut AppState, event: &SequencerEvent) -> Vec<UiEffect> {
    match event {
        // Wakeups go back to the runtime: routing them into the sequencer
        // may schedule the next sleep.
        SequencerEvent::TimerElapsed { epoch } => {
            vec![UiEffect::Transport(TransportCmd::TimerElapsed {
                epoch: *epoch,
            })]
        }
        SequencerEvent::Completed => {
            app.set_status("Playback complete");
            vec![]
        }
        SequencerEvent::DidReset => {
            app.set_status("Rewound");
            vec![]
        }
        // The transcript renders straight from the sequencer; nothing to do.
        SequencerEvent::StepChanged { .. } => vec![],
    }
}

fn handle_terminal_event(app: &mut AppState, event: &Event) -> Vec<UiEffect> {
    match event {
        Event::Key(key) if key.kind != KeyEventKind::Release => handle_key(app, key),
        _ => vec![],
    }
}

fn handle_key(app: &mut AppState, key: &KeyEvent) -> Vec<UiEffect> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return vec![UiEffect::Quit];
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => vec![UiEffect::Quit],

        KeyCode::Right | KeyCode::Down | KeyCode::Char('l' | 'j' | 'n') => {
            handle_directional(app, Direction::Next)
        }
        KeyCode::Left | KeyCode::Up | KeyCode::Char('h' | 'k' | 'p') => {
            handle_directional(app, Direction::Prev)
        }

        KeyCode::Char(' ') => vec![UiEffect::Transport(TransportCmd::TogglePlay)],
        KeyCode::Char('r') => vec![UiEffect::Transport(TransportCmd::Reset)],
        KeyCode::Char('+' | '=') => vec![UiEffect::Transport(TransportCmd::SpeedUp)],
        KeyCode::Char('-' | '_') => vec![UiEffect::Transport(TransportCmd::SpeedDown)],

        KeyCode::Char('f') => {
            app.nav.toggle_fullscreen();
            vec![]
        }
        KeyCode::Char('>') => {
            app.nav.increase_font_scale();
            vec![]
        }
        KeyCode::Char('<') => {
            app.nav.decrease_font_scale();
            vec![]
        }

        KeyCode::Tab => {
            let next = (app.module_index + 1) % app.modules.len();
            vec![UiEffect::ActivateModule { index: next }]
        }
        KeyCode::Char(c @ '1'..='9') => {
            let index = (c as usize) - ('1' as usize);
            if index < app.modules.len() && index != app.module_index {
                vec![UiEffect::ActivateModule { index }]
            } else {
                vec![]
            }
        }

        _ => vec![],
    }
}

/// Routes a directional press through the navigation state.
///
/// The active simulation's sequencer is resolved here and passed as the
/// delegate; an `Edge` outcome outside fullscreen becomes a module switch.
fn handle_directional(app: &mut AppState, direction: Direction) -> Vec<UiEffect> {
    let delegate: Option<&mut dyn Stepper> = match &mut app.view {
        ModuleView::Simulation { sequencer, .. } => Some(sequencer),
        ModuleView::Outline => None,
    };

    let outcome = app.nav.dispatch(direction, delegate);
    match outcome {
        NavOutcome::Step => {
            app.sync_queries();
            vec![]
        }
        NavOutcome::ExitedFullscreen => vec![],
        NavOutcome::BoundaryArmed => {
            app.set_status("Press again to leave fullscreen");
            vec![]
        }
        NavOutcome::Edge => {
            let index = match direction {
                Direction::Next if app.module_index + 1 < app.modules.len() => {
                    Some(app.module_index + 1)
                }
                Direction::Prev if app.module_index > 0 => Some(app.module_index - 1),
                _ => None,
            };
            match index {
                Some(index) => vec![UiEffect::ActivateModule { index }],
                None => vec![],
            }
        }
        NavOutcome::Delegated | NavOutcome::Variant => vec![],
    }
}

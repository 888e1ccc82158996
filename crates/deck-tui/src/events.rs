//! UI event types.
//!
//! All external inputs (terminal, playback timers) are converted to `UiEvent`
//! before being processed by the reducer.
//!
//! Playback events arrive on a dedicated channel: the sequencer sends
//! `SequencerEvent`s to the runtime, which wraps them in `UiEvent::Playback`
//! and feeds them through the reducer like any other input.

use crossterm::event::Event as CrosstermEvent;
use deck_engine::SequencerEvent;

/// Unified event enum for the TUI.
///
/// All inputs to the TUI are converted to this type before processing.
/// The reducer (`update`) pattern-matches on these events to update state.
#[derive(Debug)]
pub enum UiEvent {
    /// Timer tick (render cadence, status message expiry).
    Tick,

    /// Terminal input event (key, resize).
    Terminal(CrosstermEvent),

    /// Playback event from the active sequencer.
    Playback(SequencerEvent),
}

//! UI effect types.
//!
//! Effects are commands returned by the reducer that the runtime executes.
//! Anything that spawns a timer task goes through an effect: the reducer
//! only mutates state, the runtime owns the side effects.

/// Transport commands for the active sequencer.
///
/// Executed by the runtime because play/resume and timer rescheduling spawn
/// sleep tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportCmd {
    /// Toggle between playing and paused.
    TogglePlay,
    /// Stop playback and rewind to before the first step.
    Reset,
    /// Bump the speed multiplier up one notch.
    SpeedUp,
    /// Bump the speed multiplier down one notch.
    SpeedDown,
    /// A playback timer fired; route it to the sequencer.
    TimerElapsed { epoch: u64 },
}

/// Effects returned by the reducer for the runtime to execute.
#[derive(Debug, PartialEq, Eq)]
pub enum UiEffect {
    /// Quit the application.
    Quit,

    /// Switch to the module at the given curriculum index.
    ///
    /// Module activation builds a sequencer wired to the runtime's playback
    /// channel, so it lives here rather than in the reducer.
    ActivateModule { index: usize },

    /// Drive the active module's sequencer.
    Transport(TransportCmd),
}

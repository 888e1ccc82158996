//! Playback-and-navigation core for deck.
//!
//! Three pieces:
//! - [`sequencer`] - plays an ordered sequence of timed steps, automatically
//!   (one pending timer, cancellable) or manually.
//! - [`navigation`] - single source of truth for where the viewer is:
//!   module, outline step, variant cursor, fullscreen mode, text scale.
//! - [`stepper`] - the delegation capability a widget registers to take over
//!   directional-key navigation from the outline.

pub mod config;
pub mod navigation;
pub mod sequencer;
pub mod stepper;

pub use config::Config;
pub use navigation::{Direction, FontScale, NavOutcome, NavState, StepperClaim};
pub use sequencer::{Sequencer, SequencerEvent};
pub use stepper::Stepper;

//! Stepper delegation capability.

/// A directional-navigation delegate.
///
/// A widget that owns sub-navigable content (a simulation, a set of worked
/// examples) implements this and claims the stepper slot on the navigation
/// state. While the claim is held, directional input is offered to the
/// delegate before the variant cursor and the outline.
pub trait Stepper {
    /// Moves forward one position. Returns whether it actually moved.
    fn advance(&mut self) -> bool;

    /// Moves backward one position. Returns whether it actually moved.
    fn retreat(&mut self) -> bool;
}

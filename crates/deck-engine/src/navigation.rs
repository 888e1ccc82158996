//! Navigation state - single source of truth for viewer position.
//!
//! One `NavState` instance is constructed by the application and injected
//! into every consumer; there is no ambient global. All mutations are
//! discrete method calls from a single thread.
//!
//! Directional input goes through [`NavState::dispatch`], which applies the
//! delegation precedence: registered stepper first, then the variant cursor,
//! then outline step navigation with the fullscreen boundary warning.

use serde::{Deserialize, Serialize};

use crate::stepper::Stepper;

/// Directional-navigation intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    Prev,
}

/// Fixed ascending set of text scale levels, clamped at the ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontScale {
    Xs,
    Sm,
    #[default]
    Md,
    Lg,
    Xl,
}

impl FontScale {
    pub fn up(self) -> Self {
        match self {
            FontScale::Xs => FontScale::Sm,
            FontScale::Sm => FontScale::Md,
            FontScale::Md => FontScale::Lg,
            FontScale::Lg | FontScale::Xl => FontScale::Xl,
        }
    }

    pub fn down(self) -> Self {
        match self {
            FontScale::Xs | FontScale::Sm => FontScale::Xs,
            FontScale::Md => FontScale::Sm,
            FontScale::Lg => FontScale::Md,
            FontScale::Xl => FontScale::Lg,
        }
    }
}

/// Release handle for the stepper slot.
///
/// Returned by [`NavState::register_stepper`]; the owning module passes it
/// back to [`NavState::release_stepper`] on teardown. A stale handle (the
/// slot was re-claimed or reset since) is rejected, so a late release can
/// never clobber a newer owner.
#[derive(Debug, PartialEq, Eq)]
pub struct StepperClaim(u64);

/// What a directional dispatch did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavOutcome {
    /// The registered delegate consumed the input.
    Delegated,
    /// The variant cursor moved.
    Variant,
    /// The outline step moved.
    Step,
    /// Fullscreen edge: armed the one-press warning instead of exiting.
    BoundaryArmed,
    /// Second press at an armed edge; fullscreen was exited.
    ExitedFullscreen,
    /// Outline exhausted outside fullscreen; the host may switch modules.
    Edge,
}

/// Where the viewer currently is.
pub struct NavState {
    module: Option<String>,
    /// 1-based outline step, bounded by `total_steps`.
    step: usize,
    total_steps: usize,
    fullscreen: bool,
    font_scale: FontScale,
    /// 0-based variant cursor; always `< query_count` when `query_count > 0`.
    query_index: usize,
    query_count: usize,
    /// Armed boundary warning, remembering the direction of the first press.
    boundary: Option<Direction>,
    /// Current stepper claim id, if a delegate is registered.
    claim: Option<u64>,
    claim_seq: u64,
}

impl NavState {
    pub fn new(font_scale: FontScale) -> Self {
        Self {
            module: None,
            step: 1,
            total_steps: 0,
            fullscreen: false,
            font_scale,
            query_index: 0,
            query_count: 0,
            boundary: None,
            claim: None,
            claim_seq: 0,
        }
    }

    /// Switches the active module, resetting every per-module cursor:
    /// step back to 1, variant cursor to 0, delegate and boundary cleared,
    /// fullscreen off.
    pub fn set_module(&mut self, id: impl Into<String>, total_steps: usize) {
        self.module = Some(id.into());
        self.total_steps = total_steps;
        self.step = 1;
        self.query_index = 0;
        self.query_count = 0;
        self.fullscreen = false;
        self.boundary = None;
        self.claim = None;
    }

    pub fn module(&self) -> Option<&str> {
        self.module.as_deref()
    }

    pub fn step(&self) -> usize {
        self.step
    }

    pub fn total_steps(&self) -> usize {
        self.total_steps
    }

    /// Jumps to `step`; out-of-range requests are no-ops.
    pub fn set_step(&mut self, step: usize) {
        if (1..=self.total_steps).contains(&step) {
            self.step = step;
        }
    }

    pub fn next_step(&mut self) -> bool {
        if self.step < self.total_steps {
            self.step += 1;
            true
        } else {
            false
        }
    }

    pub fn prev_step(&mut self) -> bool {
        if self.step > 1 {
            self.step -= 1;
            true
        } else {
            false
        }
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    /// Flips fullscreen; always disarms the boundary warning.
    pub fn toggle_fullscreen(&mut self) {
        self.fullscreen = !self.fullscreen;
        self.boundary = None;
    }

    pub fn set_fullscreen(&mut self, fullscreen: bool) {
        self.fullscreen = fullscreen;
        self.boundary = None;
    }

    pub fn font_scale(&self) -> FontScale {
        self.font_scale
    }

    pub fn increase_font_scale(&mut self) {
        self.font_scale = self.font_scale.up();
    }

    pub fn decrease_font_scale(&mut self) {
        self.font_scale = self.font_scale.down();
    }

    /// Declares how many selectable sub-variants the current step offers.
    /// Resets the variant cursor; `0` clears sub-navigation entirely.
    pub fn register_queries(&mut self, count: usize) {
        self.query_count = count;
        self.query_index = 0;
        self.boundary = None;
    }

    pub fn query_index(&self) -> usize {
        self.query_index
    }

    pub fn query_count(&self) -> usize {
        self.query_count
    }

    /// Jumps the variant cursor; out-of-range requests are no-ops.
    pub fn set_query_index(&mut self, index: usize) {
        if index < self.query_count {
            self.query_index = index;
        }
    }

    pub fn next_query(&mut self) -> bool {
        if self.query_count > 0 && self.query_index + 1 < self.query_count {
            self.query_index += 1;
            true
        } else {
            false
        }
    }

    pub fn prev_query(&mut self) -> bool {
        if self.query_index > 0 {
            self.query_index -= 1;
            true
        } else {
            false
        }
    }

    /// Whether the first press of the one-step fullscreen exit warning has
    /// been consumed.
    pub fn fullscreen_boundary_reached(&self) -> bool {
        self.boundary.is_some()
    }

    /// Claims the stepper slot, overwriting any previous claim.
    #[must_use]
    pub fn register_stepper(&mut self) -> StepperClaim {
        self.claim_seq += 1;
        self.claim = Some(self.claim_seq);
        StepperClaim(self.claim_seq)
    }

    /// Releases the stepper slot. Returns whether the handle was current;
    /// a stale handle leaves the slot untouched.
    pub fn release_stepper(&mut self, claim: StepperClaim) -> bool {
        if self.claim == Some(claim.0) {
            self.claim = None;
            true
        } else {
            tracing::warn!(claim = claim.0, "stale stepper release ignored");
            false
        }
    }

    pub fn has_stepper(&self) -> bool {
        self.claim.is_some()
    }

    /// Routes one directional press.
    ///
    /// Precedence: the registered delegate (resolved by the caller to a
    /// concrete `&mut dyn Stepper` - the registry stores the claim, never a
    /// borrow), then the variant cursor, then outline steps. At an outline
    /// edge in fullscreen the first press arms the boundary warning and the
    /// second press in the same direction exits fullscreen; outside
    /// fullscreen the edge is reported for the host to handle.
    pub fn dispatch(
        &mut self,
        direction: Direction,
        delegate: Option<&mut dyn Stepper>,
    ) -> NavOutcome {
        if self.claim.is_some()
            && let Some(stepper) = delegate
        {
            let moved = match direction {
                Direction::Next => stepper.advance(),
                Direction::Prev => stepper.retreat(),
            };
            if moved {
                self.boundary = None;
                return NavOutcome::Delegated;
            }
        }

        let moved = match direction {
            Direction::Next => self.next_query(),
            Direction::Prev => self.prev_query(),
        };
        if moved {
            self.boundary = None;
            return NavOutcome::Variant;
        }

        let moved = match direction {
            Direction::Next => self.next_step(),
            Direction::Prev => self.prev_step(),
        };
        if moved {
            self.boundary = None;
            return NavOutcome::Step;
        }

        if !self.fullscreen {
            return NavOutcome::Edge;
        }
        if self.boundary == Some(direction) {
            self.fullscreen = false;
            self.boundary = None;
            NavOutcome::ExitedFullscreen
        } else {
            self.boundary = Some(direction);
            NavOutcome::BoundaryArmed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct AlwaysMoves;

    impl Stepper for AlwaysMoves {
        fn advance(&mut self) -> bool {
            true
        }

        fn retreat(&mut self) -> bool {
            true
        }
    }

    struct NeverMoves;

    impl Stepper for NeverMoves {
        fn advance(&mut self) -> bool {
            false
        }

        fn retreat(&mut self) -> bool {
            false
        }
    }

    fn nav(total_steps: usize) -> NavState {
        let mut nav = NavState::new(FontScale::default());
        nav.set_module("m1", total_steps);
        nav
    }

    #[test]
    fn set_module_resets_all_per_module_cursors() {
        let mut nav = nav(5);
        nav.set_step(3);
        nav.register_queries(4);
        nav.set_query_index(2);
        nav.set_fullscreen(true);
        let _claim = nav.register_stepper();

        nav.set_module("m2", 2);
        assert_eq!(nav.module(), Some("m2"));
        assert_eq!(nav.step(), 1);
        assert_eq!(nav.query_index(), 0);
        assert_eq!(nav.query_count(), 0);
        assert!(!nav.is_fullscreen());
        assert!(!nav.has_stepper());
        assert!(!nav.fullscreen_boundary_reached());
    }

    #[test]
    fn step_cursor_is_bounded() {
        let mut nav = nav(3);
        nav.set_step(0);
        assert_eq!(nav.step(), 1);
        nav.set_step(4);
        assert_eq!(nav.step(), 1);
        assert!(nav.next_step());
        assert!(nav.next_step());
        assert!(!nav.next_step());
        assert_eq!(nav.step(), 3);
        assert!(nav.prev_step());
        nav.set_step(1);
        assert!(!nav.prev_step());
    }

    #[test]
    fn query_cursor_reports_exhaustion() {
        // Scenario: three variants, three forward presses.
        let mut nav = nav(3);
        nav.register_queries(3);
        assert!(nav.next_query());
        assert!(nav.next_query());
        assert!(!nav.next_query());
        assert_eq!(nav.query_index(), 2);

        assert!(nav.prev_query());
        assert!(nav.prev_query());
        assert!(!nav.prev_query());
        assert_eq!(nav.query_index(), 0);
    }

    #[test]
    fn register_queries_zero_clears_sub_navigation() {
        let mut nav = nav(3);
        nav.register_queries(3);
        nav.set_query_index(2);
        nav.register_queries(0);
        assert_eq!(nav.query_count(), 0);
        assert!(!nav.next_query());
        assert!(!nav.prev_query());
    }

    #[test]
    fn delegate_consumes_directional_input_until_released() {
        let mut nav = nav(5);
        nav.set_fullscreen(true);
        let claim = nav.register_stepper();

        for _ in 0..10 {
            let outcome = nav.dispatch(Direction::Next, Some(&mut AlwaysMoves));
            assert_eq!(outcome, NavOutcome::Delegated);
            assert_eq!(nav.step(), 1);
        }

        assert!(nav.release_stepper(claim));
        assert_eq!(nav.dispatch(Direction::Next, None), NavOutcome::Step);
        assert_eq!(nav.step(), 2);
    }

    #[test]
    fn precedence_falls_through_delegate_then_variants_then_outline() {
        let mut nav = nav(5);
        let _claim = nav.register_stepper();
        nav.register_queries(2);

        // Exhausted delegate falls to the variant cursor.
        assert_eq!(
            nav.dispatch(Direction::Next, Some(&mut NeverMoves)),
            NavOutcome::Variant
        );
        // Exhausted variants fall to the outline.
        assert_eq!(
            nav.dispatch(Direction::Next, Some(&mut NeverMoves)),
            NavOutcome::Step
        );
        assert_eq!(nav.step(), 2);
    }

    #[test]
    fn fullscreen_exit_takes_two_presses() {
        let mut nav = nav(3);
        nav.set_step(3);
        nav.set_fullscreen(true);

        assert_eq!(nav.dispatch(Direction::Next, None), NavOutcome::BoundaryArmed);
        assert!(nav.fullscreen_boundary_reached());
        assert!(nav.is_fullscreen());

        assert_eq!(
            nav.dispatch(Direction::Next, None),
            NavOutcome::ExitedFullscreen
        );
        assert!(!nav.fullscreen_boundary_reached());
        assert!(!nav.is_fullscreen());
    }

    #[test]
    fn boundary_arms_per_direction() {
        let mut nav = nav(3);
        nav.set_step(3);
        nav.set_fullscreen(true);

        assert_eq!(nav.dispatch(Direction::Next, None), NavOutcome::BoundaryArmed);
        // A press in the other direction moves normally and disarms.
        assert_eq!(nav.dispatch(Direction::Prev, None), NavOutcome::Step);
        assert!(!nav.fullscreen_boundary_reached());
        assert!(nav.is_fullscreen());
    }

    #[test]
    fn boundary_armed_at_first_step_too() {
        let mut nav = nav(3);
        nav.set_fullscreen(true);
        assert_eq!(nav.dispatch(Direction::Prev, None), NavOutcome::BoundaryArmed);
        assert_eq!(
            nav.dispatch(Direction::Prev, None),
            NavOutcome::ExitedFullscreen
        );
    }

    #[test]
    fn toggle_fullscreen_disarms_boundary() {
        let mut nav = nav(2);
        nav.set_step(2);
        nav.set_fullscreen(true);
        assert_eq!(nav.dispatch(Direction::Next, None), NavOutcome::BoundaryArmed);
        nav.toggle_fullscreen();
        assert!(!nav.fullscreen_boundary_reached());
    }

    #[test]
    fn edge_reported_outside_fullscreen() {
        let mut nav = nav(2);
        nav.set_step(2);
        assert_eq!(nav.dispatch(Direction::Next, None), NavOutcome::Edge);
        assert_eq!(nav.step(), 2);
        assert!(!nav.fullscreen_boundary_reached());
    }

    #[test]
    fn stale_stepper_release_is_rejected() {
        let mut nav = nav(2);
        let first = nav.register_stepper();
        let second = nav.register_stepper(); // overwrites

        assert!(!nav.release_stepper(first));
        assert!(nav.has_stepper());
        assert!(nav.release_stepper(second));
        assert!(!nav.has_stepper());
    }

    #[test]
    fn font_scale_clamps_at_both_ends() {
        let mut nav = NavState::new(FontScale::Md);
        nav.increase_font_scale();
        nav.increase_font_scale();
        nav.increase_font_scale();
        assert_eq!(nav.font_scale(), FontScale::Xl);
        for _ in 0..6 {
            nav.decrease_font_scale();
        }
        assert_eq!(nav.font_scale(), FontScale::Xs);
    }
}

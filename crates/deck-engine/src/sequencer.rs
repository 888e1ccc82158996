//! Step sequencer - plays a scripted sequence automatically or manually.
//!
//! ## Timer model
//!
//! At most one timer is pending per sequencer. Auto-play schedules a
//! `tokio::time::sleep` guarded by a `CancellationToken`; when it fires, a
//! [`SequencerEvent::TimerElapsed`] wakeup lands on the host channel and the
//! host routes it back into [`Sequencer::on_timer_elapsed`], which advances
//! one step and schedules the next sleep.
//!
//! Cancellation guards both halves of the stale-timer hazard:
//! - `pause`/`reset`/drop cancel the token before any state change, so an
//!   in-flight sleep task never sends its wakeup;
//! - a wakeup that was already queued when the cancel happened carries a
//!   stale epoch (or finds `playing == false`) and is ignored.

use std::time::Duration;

use deck_types::Step;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::stepper::Stepper;

/// Events pushed by a [`Sequencer`] onto its host channel.
///
/// `TimerElapsed` is a wakeup the host must route back into
/// [`Sequencer::on_timer_elapsed`]; the others are observer notifications.
#[derive(Debug, Clone)]
pub enum SequencerEvent {
    /// The active step changed (auto-play or manual).
    StepChanged { index: usize, step: Step },
    /// The last step was reached. Fires on each arrival at the last index.
    Completed,
    /// The sequencer was reset to the nothing-shown state.
    DidReset,
    /// Auto-play timer wakeup. Stale epochs are ignored.
    TimerElapsed { epoch: u64 },
}

/// Plays a fixed sequence of steps, timer-driven or manually.
///
/// Owned exclusively by one view; dropping it cancels any pending timer, so
/// a discarded sequencer can never fire another callback.
pub struct Sequencer {
    steps: Vec<Step>,
    /// `None` = nothing shown yet.
    cursor: Option<usize>,
    playing: bool,
    speed: f64,
    /// Floor for effective delays, preventing a zero-delay spin.
    min_step_delay: Duration,
    /// Bumped on every schedule; wakeups with an older epoch are stale.
    epoch: u64,
    /// Token for the single pending timer, if any.
    pending: Option<CancellationToken>,
    events: mpsc::UnboundedSender<SequencerEvent>,
}

impl Sequencer {
    /// Creates a sequencer over `steps`. The sequence is supplied whole and
    /// never modified during playback.
    pub fn new(
        steps: Vec<Step>,
        min_step_delay: Duration,
        speed: f64,
        events: mpsc::UnboundedSender<SequencerEvent>,
    ) -> Self {
        Self {
            steps,
            cursor: None,
            playing: false,
            speed: if speed.is_finite() && speed > 0.0 {
                speed
            } else {
                1.0
            },
            min_step_delay,
            epoch: 0,
            pending: None,
            events,
        }
    }

    /// Starts (or resumes) auto-play. No-op when already complete, already
    /// scheduled, or the sequence is empty. Safe to call repeatedly.
    pub fn play(&mut self) {
        if self.steps.is_empty() || self.is_complete() {
            return;
        }
        if self.playing && self.pending.is_some() {
            return;
        }
        self.playing = true;
        self.schedule_next();
    }

    /// Stops auto-play and cancels the pending timer. Idempotent.
    pub fn pause(&mut self) {
        self.cancel_pending();
        self.playing = false;
    }

    /// Pauses and returns to the nothing-shown state. Does not replay.
    pub fn reset(&mut self) {
        self.pause();
        self.cursor = None;
        let _ = self.events.send(SequencerEvent::DidReset);
    }

    /// Advances one step manually. Returns whether it moved.
    ///
    /// Reaching the last index stops auto-play and announces completion.
    /// Does not touch the pending timer; a timer that fires afterwards finds
    /// `playing == false` and is dropped.
    pub fn next_step(&mut self) -> bool {
        let next = self.cursor.map_or(0, |i| i + 1);
        if next >= self.steps.len() {
            return false;
        }
        self.cursor = Some(next);
        let _ = self.events.send(SequencerEvent::StepChanged {
            index: next,
            step: self.steps[next].clone(),
        });
        if next + 1 == self.steps.len() {
            self.playing = false;
            let _ = self.events.send(SequencerEvent::Completed);
        }
        true
    }

    /// Moves back one step manually. Returns whether it moved.
    ///
    /// No-op at or before the first step; never affects the play state.
    pub fn prev_step(&mut self) -> bool {
        match self.cursor {
            Some(i) if i > 0 => {
                self.cursor = Some(i - 1);
                let _ = self.events.send(SequencerEvent::StepChanged {
                    index: i - 1,
                    step: self.steps[i - 1].clone(),
                });
                true
            }
            _ => false,
        }
    }

    /// Replaces the speed multiplier for future delay calculations.
    ///
    /// A timer already scheduled under the previous speed is not altered.
    /// Non-positive or non-finite multipliers are ignored.
    pub fn set_speed(&mut self, speed: f64) {
        if speed.is_finite() && speed > 0.0 {
            self.speed = speed;
        }
    }

    /// Handles an auto-play timer wakeup routed back by the host.
    pub fn on_timer_elapsed(&mut self, epoch: u64) {
        if epoch != self.epoch {
            // Cancelled or rescheduled since this wakeup was queued.
            return;
        }
        self.pending = None;
        if !self.playing {
            return;
        }
        self.next_step();
        if self.playing && !self.is_complete() {
            self.schedule_next();
        }
    }

    /// Effective delay for a step: `delay_ms / speed`, floored.
    pub fn effective_delay(&self, delay_ms: u64) -> Duration {
        let scaled = Duration::from_secs_f64(delay_ms as f64 / self.speed / 1000.0);
        scaled.max(self.min_step_delay)
    }

    pub fn current_index(&self) -> Option<usize> {
        self.cursor
    }

    pub fn current_step(&self) -> Option<&Step> {
        self.cursor.and_then(|i| self.steps.get(i))
    }

    /// Steps shown so far, in order. Empty when nothing is shown yet.
    pub fn visible_steps(&self) -> &[Step] {
        match self.cursor {
            Some(i) => &self.steps[..=i],
            None => &[],
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn is_complete(&self) -> bool {
        !self.steps.is_empty() && self.cursor == Some(self.steps.len() - 1)
    }

    pub fn total_steps(&self) -> usize {
        self.steps.len()
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    fn schedule_next(&mut self) {
        self.cancel_pending();
        let next = self.cursor.map_or(0, |i| i + 1);
        let Some(step) = self.steps.get(next) else {
            return;
        };
        let delay = self.effective_delay(step.delay_ms);
        self.epoch = self.epoch.wrapping_add(1);
        let epoch = self.epoch;
        let token = CancellationToken::new();
        self.pending = Some(token.clone());
        let tx = self.events.clone();
        tokio::spawn(async move {
            tokio::select! {
                () = token.cancelled() => {}
                () = tokio::time::sleep(delay) => {
                    let _ = tx.send(SequencerEvent::TimerElapsed { epoch });
                }
            }
        });
    }

    fn cancel_pending(&mut self) {
        if let Some(token) = self.pending.take() {
            token.cancel();
        }
    }
}

impl Stepper for Sequencer {
    fn advance(&mut self) -> bool {
        self.next_step()
    }

    fn retreat(&mut self) -> bool {
        self.prev_step()
    }
}

impl Drop for Sequencer {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}

#[cfg(test)]
mod tests {
    use deck_types::StepKind;
    use tokio::sync::mpsc::UnboundedReceiver;

    use super::*;

    fn steps(delays: &[u64]) -> Vec<Step> {
        delays
            .iter()
            .enumerate()
            .map(|(i, d)| {
                Step::new(
                    format!("s{i}"),
                    StepKind::AgentMessage,
                    "agent",
                    format!("step {i}"),
                    *d,
                )
            })
            .collect()
    }

    fn sequencer(delays: &[u64]) -> (Sequencer, UnboundedReceiver<SequencerEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let seq = Sequencer::new(steps(delays), Duration::from_millis(10), 1.0, tx);
        (seq, rx)
    }

    /// Drives the host side of auto-play: routes timer wakeups back into the
    /// sequencer, collects everything else.
    async fn drive_until_complete(
        seq: &mut Sequencer,
        rx: &mut UnboundedReceiver<SequencerEvent>,
    ) -> Vec<SequencerEvent> {
        let mut seen = Vec::new();
        while !seq.is_complete() {
            let Some(event) = rx.recv().await else { break };
            match event {
                SequencerEvent::TimerElapsed { epoch } => seq.on_timer_elapsed(epoch),
                other => seen.push(other),
            }
        }
        while let Ok(event) = rx.try_recv() {
            if !matches!(event, SequencerEvent::TimerElapsed { .. }) {
                seen.push(event);
            }
        }
        seen
    }

    #[tokio::test(start_paused = true)]
    async fn auto_play_runs_to_completion_in_order() {
        let (mut seq, mut rx) = sequencer(&[100, 200, 50]);
        seq.play();
        let events = drive_until_complete(&mut seq, &mut rx).await;

        let indexes: Vec<usize> = events
            .iter()
            .filter_map(|e| match e {
                SequencerEvent::StepChanged { index, .. } => Some(*index),
                _ => None,
            })
            .collect();
        assert_eq!(indexes, vec![0, 1, 2]);

        let completions = events
            .iter()
            .filter(|e| matches!(e, SequencerEvent::Completed))
            .count();
        assert_eq!(completions, 1);

        assert!(seq.is_complete());
        assert!(!seq.is_playing());
        assert_eq!(seq.current_index(), Some(2));
        let visible: Vec<&str> = seq.visible_steps().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(visible, vec!["s0", "s1", "s2"]);
    }

    #[tokio::test(start_paused = true)]
    async fn pause_holds_position_and_resume_completes() {
        let (mut seq, mut rx) = sequencer(&[100, 200, 50]);
        seq.play();

        // Drive until the first step is shown.
        while seq.current_index().is_none() {
            match rx.recv().await.unwrap() {
                SequencerEvent::TimerElapsed { epoch } => seq.on_timer_elapsed(epoch),
                _ => {}
            }
        }
        assert_eq!(seq.current_index(), Some(0));

        seq.pause();
        assert!(!seq.is_playing());
        tokio::time::advance(Duration::from_millis(1000)).await;
        while let Ok(event) = rx.try_recv() {
            assert!(
                !matches!(event, SequencerEvent::StepChanged { .. }),
                "step changed while paused"
            );
        }
        assert_eq!(seq.current_index(), Some(0));

        seq.play();
        let events = drive_until_complete(&mut seq, &mut rx).await;
        assert!(seq.is_complete());
        assert!(events.iter().any(|e| matches!(e, SequencerEvent::Completed)));
    }

    #[tokio::test(start_paused = true)]
    async fn pause_is_idempotent() {
        let (mut seq, _rx) = sequencer(&[100]);
        seq.play();
        seq.pause();
        seq.pause();
        assert!(!seq.is_playing());
        assert!(seq.pending.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn play_when_complete_is_noop() {
        let (mut seq, _rx) = sequencer(&[10]);
        assert!(seq.next_step());
        assert!(seq.is_complete());
        seq.play();
        assert!(!seq.is_playing());
        assert!(seq.pending.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn play_twice_schedules_once() {
        let (mut seq, _rx) = sequencer(&[100, 100]);
        seq.play();
        seq.play();
        assert_eq!(seq.epoch, 1);
        assert!(seq.pending.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn play_on_empty_sequence_is_noop() {
        let (mut seq, _rx) = sequencer(&[]);
        seq.play();
        assert!(!seq.is_playing());
        assert!(seq.pending.is_none());
        assert!(!seq.is_complete());
    }

    #[tokio::test(start_paused = true)]
    async fn stale_wakeup_after_pause_is_ignored() {
        let (mut seq, _rx) = sequencer(&[100, 100]);
        seq.play();
        let epoch = seq.epoch;
        seq.pause();
        // Even if the wakeup was already queued before the cancel, it must
        // not advance a paused engine.
        seq.on_timer_elapsed(epoch);
        assert_eq!(seq.current_index(), None);
    }

    #[test]
    fn manual_steps_move_by_exactly_one() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut seq = Sequencer::new(steps(&[0, 0, 0]), Duration::from_millis(10), 1.0, tx);

        assert!(!seq.prev_step()); // nothing shown yet
        assert!(seq.next_step());
        assert_eq!(seq.current_index(), Some(0));
        assert!(!seq.prev_step()); // at the first step
        assert!(seq.next_step());
        assert!(seq.prev_step());
        assert_eq!(seq.current_index(), Some(0));
        assert!(seq.next_step());
        assert!(seq.next_step());
        assert!(seq.is_complete());
        assert!(!seq.next_step()); // no-op at the end
        assert_eq!(seq.current_index(), Some(2));
    }

    #[test]
    fn completion_announced_on_manual_arrival() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut seq = Sequencer::new(steps(&[0, 0]), Duration::from_millis(10), 1.0, tx);
        seq.next_step();
        seq.next_step();
        let mut completions = 0;
        while let Ok(event) = rx.try_recv() {
            if matches!(event, SequencerEvent::Completed) {
                completions += 1;
            }
        }
        assert_eq!(completions, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn reset_is_idempotent() {
        let (mut seq, mut rx) = sequencer(&[100, 100]);
        seq.play();
        while seq.current_index().is_none() {
            match rx.recv().await.unwrap() {
                SequencerEvent::TimerElapsed { epoch } => seq.on_timer_elapsed(epoch),
                _ => {}
            }
        }

        seq.reset();
        assert_eq!(seq.current_index(), None);
        assert!(!seq.is_playing());
        assert!(seq.visible_steps().is_empty());

        seq.reset();
        assert_eq!(seq.current_index(), None);
        assert!(!seq.is_playing());
        assert!(seq.visible_steps().is_empty());
    }

    #[test]
    fn effective_delay_scales_and_floors() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut seq = Sequencer::new(steps(&[0]), Duration::from_millis(10), 1.0, tx);

        assert_eq!(seq.effective_delay(100), Duration::from_millis(100));
        let at_1x = seq.effective_delay(100);
        seq.set_speed(2.0);
        let at_2x = seq.effective_delay(100);
        assert_eq!(at_2x, Duration::from_millis(50));
        assert!(at_2x <= at_1x); // doubling speed never produces a larger delay
        seq.set_speed(4.0);
        assert!(seq.effective_delay(100) <= at_2x);

        // The floor catches degenerate zero/short delays.
        assert_eq!(seq.effective_delay(0), Duration::from_millis(10));
        assert_eq!(seq.effective_delay(1), Duration::from_millis(10));
    }

    #[test]
    fn set_speed_ignores_invalid_multipliers() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut seq = Sequencer::new(steps(&[0]), Duration::from_millis(10), 1.5, tx);
        seq.set_speed(0.0);
        seq.set_speed(-2.0);
        seq.set_speed(f64::NAN);
        assert_eq!(seq.speed(), 1.5);
    }

    #[tokio::test(start_paused = true)]
    async fn drop_cancels_pending_timer() {
        let (mut seq, mut rx) = sequencer(&[500]);
        seq.play();
        drop(seq);

        // The sleep task is cancelled and every sender is gone; no wakeup or
        // step change can ever be delivered.
        assert!(rx.recv().await.is_none());
    }
}

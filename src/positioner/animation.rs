// SPDX-License-Identifier: GPL-3.0-only

//! Slide animation of the keyboard's vertical position.
//!
//! The animation is an explicit state machine rather than an object living on
//! its own timer: the owner calls [`KeyboardAnimation::tick`] on every frame
//! and applies the returned [`AnimationEvent`]s.
//!
//! Only one run drives the keyboard at a time. Starting a new run while one is
//! in flight detaches the old run from its target; the detached run keeps its
//! clock and still reports [`AnimationEvent::Finished`] when it would have
//! ended, but it no longer writes frames.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::scene::ItemId;

/// Easing curves available for the slide animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    /// Constant speed.
    Linear,
    /// Fast start, smooth deceleration: `1 - (1 - t)^3`.
    #[default]
    OutCubic,
}

impl Easing {
    /// Maps linear progress in `[0, 1]` onto the curve.
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::OutCubic => 1.0 - (1.0 - t).powi(3),
        }
    }
}

/// One animated transition of the keyboard's `y`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationRun {
    /// Item receiving the frames, `None` once detached.
    pub target: Option<ItemId>,
    /// Value at the start of the run.
    pub from: f64,
    /// Value at the end of the run.
    pub to: f64,
    /// When the run started.
    pub start_time: Instant,
}

impl AnimationRun {
    /// Linear progress in `[0, 1]` at `now`.
    pub fn progress(&self, now: Instant, duration: Duration) -> f64 {
        if duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(self.start_time);
        (elapsed.as_secs_f64() / duration.as_secs_f64()).min(1.0)
    }

    /// Interpolated value at `now`.
    pub fn value_at(&self, now: Instant, duration: Duration, easing: Easing) -> f64 {
        let eased = easing.apply(self.progress(now, duration));
        self.from + (self.to - self.from) * eased
    }
}

/// Lifecycle of the live run.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum AnimationState {
    /// Nothing has been started yet.
    #[default]
    Idle,
    /// A run is driving its target.
    Running(AnimationRun),
    /// The last run reached its end value.
    Finished,
}

/// Output of [`KeyboardAnimation::tick`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnimationEvent {
    /// Write `value` to the target's `y`.
    Frame { target: ItemId, value: f64 },
    /// A run (live or detached) reached its end.
    Finished,
}

/// Animator for the keyboard's vertical position.
#[derive(Debug, Clone)]
pub struct KeyboardAnimation {
    state: AnimationState,
    detached: Vec<AnimationRun>,
    duration: Duration,
    easing: Easing,
}

impl KeyboardAnimation {
    /// Creates an idle animator with an ease-out-cubic curve.
    pub fn new(duration: Duration) -> Self {
        Self::with_easing(duration, Easing::OutCubic)
    }

    /// Creates an idle animator with the given curve.
    pub fn with_easing(duration: Duration, easing: Easing) -> Self {
        Self {
            state: AnimationState::Idle,
            detached: Vec::new(),
            duration,
            easing,
        }
    }

    /// Starts a run from `from` to `to` on `target`.
    ///
    /// The caller is expected to write `from` to the target right away. A run
    /// already in flight is detached and keeps ticking without a target.
    pub fn start(&mut self, target: ItemId, from: f64, to: f64, now: Instant) {
        if let AnimationState::Running(mut previous) = self.state {
            tracing::trace!("Retargeting keyboard animation ({} -> {})", previous.to, to);
            previous.target = None;
            self.detached.push(previous);
        }

        self.state = AnimationState::Running(AnimationRun {
            target: Some(target),
            from,
            to,
            start_time: now,
        });
    }

    /// Moves the end value of the live run without restarting it.
    ///
    /// Returns `false` when no run is live.
    pub fn retarget_end(&mut self, to: f64) -> bool {
        match &mut self.state {
            AnimationState::Running(run) => {
                run.to = to;
                true
            }
            _ => false,
        }
    }

    /// Drops the target of the live run, e.g. because the item was destroyed.
    pub fn detach_target(&mut self, item: ItemId) {
        if let AnimationState::Running(run) = &mut self.state {
            if run.target == Some(item) {
                run.target = None;
            }
        }
    }

    /// Stops the live run and returns it, marking the animator finished.
    pub fn stop(&mut self) -> Option<AnimationRun> {
        match std::mem::take(&mut self.state) {
            AnimationState::Running(run) => {
                self.state = AnimationState::Finished;
                Some(run)
            }
            other => {
                self.state = other;
                None
            }
        }
    }

    /// Advances all runs to `now`.
    pub fn tick(&mut self, now: Instant) -> Vec<AnimationEvent> {
        let mut events = Vec::new();

        let duration = self.duration;
        let before = self.detached.len();
        self.detached.retain(|run| run.progress(now, duration) < 1.0);
        events.extend((self.detached.len()..before).map(|_| AnimationEvent::Finished));

        if let AnimationState::Running(run) = self.state {
            let value = run.value_at(now, self.duration, self.easing);
            if let Some(target) = run.target {
                events.push(AnimationEvent::Frame { target, value });
            }
            if run.progress(now, self.duration) >= 1.0 {
                self.state = AnimationState::Finished;
                events.push(AnimationEvent::Finished);
            }
        }

        events
    }

    /// Returns `true` while a run drives its target.
    pub fn is_running(&self) -> bool {
        matches!(self.state, AnimationState::Running(_))
    }

    /// Returns `true` while any run, live or detached, still has to finish.
    pub fn has_pending_runs(&self) -> bool {
        self.is_running() || !self.detached.is_empty()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> AnimationState {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEYBOARD: ItemId = ItemId(1);

    fn frames(events: &[AnimationEvent]) -> Vec<f64> {
        events
            .iter()
            .filter_map(|e| match e {
                AnimationEvent::Frame { value, .. } => Some(*value),
                AnimationEvent::Finished => None,
            })
            .collect()
    }

    fn finished_count(events: &[AnimationEvent]) -> usize {
        events
            .iter()
            .filter(|e| matches!(e, AnimationEvent::Finished))
            .count()
    }

    #[test]
    fn test_out_cubic_curve() {
        assert_eq!(Easing::OutCubic.apply(0.0), 0.0);
        assert_eq!(Easing::OutCubic.apply(1.0), 1.0);
        assert!((Easing::OutCubic.apply(0.5) - 0.875).abs() < 1e-12);
        // Clamped outside the unit interval
        assert_eq!(Easing::OutCubic.apply(2.0), 1.0);
        assert_eq!(Easing::Linear.apply(0.25), 0.25);
    }

    /// A run interpolates along the curve and finishes exactly once.
    #[test]
    fn test_run_to_completion() {
        let start = Instant::now();
        let mut animation = KeyboardAnimation::new(Duration::from_millis(200));
        assert_eq!(animation.state(), AnimationState::Idle);

        animation.start(KEYBOARD, 800.0, 400.0, start);
        assert!(matches!(animation.state(), AnimationState::Running(run) if run.to == 400.0));

        let mid = animation.tick(start + Duration::from_millis(100));
        assert_eq!(finished_count(&mid), 0);
        let value = frames(&mid)[0];
        assert!((value - (800.0 - 400.0 * 0.875)).abs() < 1e-9, "got {}", value);

        let end = animation.tick(start + Duration::from_millis(250));
        assert_eq!(frames(&end), vec![400.0]);
        assert_eq!(finished_count(&end), 1);
        assert_eq!(animation.state(), AnimationState::Finished);

        let after = animation.tick(start + Duration::from_millis(300));
        assert!(after.is_empty());
    }

    /// Restarting mid-flight leaves one live run; the old one finishes silently.
    #[test]
    fn test_retarget_detaches_previous_run() {
        let start = Instant::now();
        let mut animation = KeyboardAnimation::new(Duration::from_millis(200));

        animation.start(KEYBOARD, 800.0, 400.0, start);
        animation.start(KEYBOARD, 500.0, 800.0, start + Duration::from_millis(100));
        assert!(animation.has_pending_runs());

        // The detached run ends at 200ms, the live one continues
        let events = animation.tick(start + Duration::from_millis(200));
        assert_eq!(finished_count(&events), 1);
        assert_eq!(frames(&events).len(), 1, "only the live run writes frames");
        assert!(animation.is_running());

        let events = animation.tick(start + Duration::from_millis(300));
        assert_eq!(frames(&events), vec![800.0]);
        assert_eq!(finished_count(&events), 1);
        assert!(!animation.has_pending_runs());
    }

    #[test]
    fn test_retarget_end_keeps_clock() {
        let start = Instant::now();
        let mut animation = KeyboardAnimation::new(Duration::from_millis(100));

        assert!(!animation.retarget_end(10.0));
        animation.start(KEYBOARD, 0.0, 100.0, start);
        assert!(animation.retarget_end(200.0));

        let events = animation.tick(start + Duration::from_millis(100));
        assert_eq!(frames(&events), vec![200.0]);
    }

    #[test]
    fn test_stop_returns_live_run() {
        let start = Instant::now();
        let mut animation = KeyboardAnimation::new(Duration::from_millis(100));
        assert!(animation.stop().is_none());

        animation.start(KEYBOARD, 0.0, 50.0, start);
        let run = animation.stop().unwrap();
        assert_eq!(run.to, 50.0);
        assert_eq!(animation.state(), AnimationState::Finished);
        assert!(!animation.is_running());
    }

    #[test]
    fn test_detached_target_writes_no_frames() {
        let start = Instant::now();
        let mut animation = KeyboardAnimation::new(Duration::from_millis(100));
        animation.start(KEYBOARD, 0.0, 50.0, start);
        animation.detach_target(KEYBOARD);

        let events = animation.tick(start + Duration::from_millis(100));
        assert!(frames(&events).is_empty());
        assert_eq!(finished_count(&events), 1);
    }

    #[test]
    fn test_zero_duration_finishes_on_first_tick() {
        let start = Instant::now();
        let mut animation = KeyboardAnimation::new(Duration::ZERO);
        animation.start(KEYBOARD, 0.0, 50.0, start);

        let events = animation.tick(start);
        assert_eq!(frames(&events), vec![50.0]);
        assert_eq!(finished_count(&events), 1);
    }
}

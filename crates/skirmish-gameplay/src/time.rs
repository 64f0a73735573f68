//! Simulation clock and timed-action primitives.
//!
//! This module provides:
//! - A fixed-step game clock driven by the host's frame deltas
//! - Cooldowns expressed as "ready at" timestamps
//! - Pending timed actions (suspension points) resumed by the tick functions
//!
//! All timestamps are seconds since the start of the simulation.

use serde::{Deserialize, Serialize};

/// Default fixed simulation step (50 Hz, the usual physics rate).
pub const DEFAULT_FIXED_DT: f32 = 0.02;
/// Maximum frame delta accepted before clamping.
const MAX_FRAME_DT: f32 = 0.25;
/// Maximum fixed steps run for a single frame.
const MAX_STEPS_PER_FRAME: u32 = 10;

/// Fixed-step game clock.
///
/// Frame deltas are accumulated and converted into whole simulation steps.
/// Simulation time is derived from the step count so it never drifts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameClock {
    /// Fixed step length in seconds
    fixed_dt: f32,
    /// Unconsumed frame time
    accumulator: f32,
    /// Number of simulation steps completed
    steps: u64,
    /// Number of frames completed
    frames: u64,
}

impl Default for GameClock {
    fn default() -> Self {
        Self::new(DEFAULT_FIXED_DT)
    }
}

impl GameClock {
    /// Create a clock with the given fixed step.
    #[must_use]
    pub fn new(fixed_dt: f32) -> Self {
        Self {
            fixed_dt: fixed_dt.max(0.001),
            accumulator: 0.0,
            steps: 0,
            frames: 0,
        }
    }

    /// Current simulation time in seconds.
    #[must_use]
    pub fn now(&self) -> f32 {
        (self.steps as f64 * f64::from(self.fixed_dt)) as f32
    }

    /// Fixed step length in seconds.
    #[must_use]
    pub fn fixed_dt(&self) -> f32 {
        self.fixed_dt
    }

    /// Number of simulation steps completed.
    #[must_use]
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Number of frames completed.
    #[must_use]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Accumulate a frame delta.
    /// Returns the number of fixed steps that should run this frame.
    pub fn accumulate(&mut self, frame_dt: f32) -> u32 {
        self.accumulator += frame_dt.clamp(0.0, MAX_FRAME_DT);
        let mut count = 0;

        while self.accumulator >= self.fixed_dt && count < MAX_STEPS_PER_FRAME {
            self.accumulator -= self.fixed_dt;
            count += 1;
        }

        // Still behind after the cap: drop the backlog
        if self.accumulator > self.fixed_dt * 2.0 {
            self.accumulator = 0.0;
        }

        count
    }

    /// Mark one simulation step as completed.
    pub fn complete_step(&mut self) {
        self.steps += 1;
    }

    /// Mark one frame as completed.
    pub fn complete_frame(&mut self) {
        self.frames += 1;
    }
}

/// A cooldown gate expressed as the earliest time the action may run again.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Cooldown {
    ready_at: f32,
}

impl Cooldown {
    /// A cooldown that is ready immediately.
    #[must_use]
    pub const fn ready() -> Self {
        Self { ready_at: 0.0 }
    }

    /// Checks if the gated action may run at `now`.
    #[must_use]
    pub fn is_ready(&self, now: f32) -> bool {
        now >= self.ready_at
    }

    /// Restart the cooldown: the action becomes ready again `duration` seconds after `now`.
    pub fn restart(&mut self, now: f32, duration: f32) {
        self.ready_at = now + duration.max(0.0);
    }

    /// Seconds remaining until ready (0 when ready).
    #[must_use]
    pub fn remaining(&self, now: f32) -> f32 {
        (self.ready_at - now).max(0.0)
    }

    /// Timestamp at which the cooldown expires.
    #[must_use]
    pub fn ready_at(&self) -> f32 {
        self.ready_at
    }
}

/// A timed action suspended until `resume_at`.
///
/// `kind` names the action and `step` is the resumption point within it, so a
/// multi-stage sequence (windup, then recovery) is a single record that is
/// rescheduled in place.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PendingAction<K> {
    /// What is pending
    pub kind: K,
    /// Resumption timestamp
    pub resume_at: f32,
    /// Index of the next stage to run on resumption
    pub step: u8,
}

impl<K: Copy> PendingAction<K> {
    /// Suspend `kind` for `delay` seconds starting at `now`.
    #[must_use]
    pub fn after(kind: K, now: f32, delay: f32) -> Self {
        Self {
            kind,
            resume_at: now + delay.max(0.0),
            step: 0,
        }
    }

    /// Checks if the action may resume at `now`.
    #[must_use]
    pub fn is_due(&self, now: f32) -> bool {
        now >= self.resume_at
    }

    /// Advance to the next stage and suspend again for `delay` seconds.
    pub fn reschedule(&mut self, now: f32, delay: f32) {
        self.resume_at = now + delay.max(0.0);
        self.step = self.step.saturating_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_accumulates_fixed_steps() {
        let mut clock = GameClock::new(0.02);
        assert_eq!(clock.accumulate(0.05), 2);
        assert_eq!(clock.accumulate(0.015), 1);
        assert_eq!(clock.accumulate(0.0), 0);
    }

    #[test]
    fn test_clock_clamps_long_frames() {
        let mut clock = GameClock::new(0.02);
        let steps = clock.accumulate(5.0);
        assert_eq!(steps, 10);
        assert!(clock.accumulator <= clock.fixed_dt * 2.0);
    }

    #[test]
    fn test_clock_time_follows_steps() {
        let mut clock = GameClock::new(0.02);
        for _ in 0..50 {
            clock.complete_step();
        }
        assert!((clock.now() - 1.0).abs() < 1e-5);
        assert_eq!(clock.steps(), 50);
    }

    #[test]
    fn test_cooldown_gate() {
        let mut cooldown = Cooldown::ready();
        assert!(cooldown.is_ready(0.0));

        cooldown.restart(1.0, 3.0);
        assert!(!cooldown.is_ready(2.9));
        assert!((cooldown.remaining(2.0) - 2.0).abs() < 1e-6);
        assert!(cooldown.is_ready(4.0));
    }

    #[test]
    fn test_pending_action_reschedule() {
        let mut pending = PendingAction::after('a', 0.0, 0.1);
        assert!(!pending.is_due(0.05));
        assert!(pending.is_due(0.1));

        pending.reschedule(0.1, 0.5);
        assert_eq!(pending.step, 1);
        assert!(!pending.is_due(0.5));
        assert!(pending.is_due(0.61));
    }
}

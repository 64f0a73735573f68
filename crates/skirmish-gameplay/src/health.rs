//! Actor hit points, damage application and the death sequence.
//!
//! A [`HealthModel`] starts full, only ever loses health through
//! [`Damageable::apply_damage`], and flips to dead exactly once. After death
//! it drives a timed blink window; when the window closes the owner is
//! deactivated by the host.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::HealthTuning;
use crate::time::PendingAction;

/// Maximum health used when a non-positive value is configured.
pub const DEFAULT_MAX_HEALTH: f32 = 10.0;
/// Blink intervals shorter than this disable blinking.
const MIN_BLINK_INTERVAL: f32 = 0.01;

/// Result of a single damage application.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DamageOutcome {
    /// Amount was negative or not finite; health untouched
    Rejected,
    /// Target was already dead
    Ignored,
    /// Target survived
    Damaged {
        /// Health left after the hit
        remaining: f32,
    },
    /// This hit killed the target
    Killed,
}

impl DamageOutcome {
    /// Checks if this hit caused the death transition.
    #[must_use]
    pub const fn is_kill(&self) -> bool {
        matches!(self, Self::Killed)
    }

    /// Checks if the hit changed the target's health state.
    #[must_use]
    pub const fn landed(&self) -> bool {
        matches!(self, Self::Damaged { .. } | Self::Killed)
    }
}

/// Capability of anything that can take damage.
pub trait Damageable {
    /// Apply `amount` damage at simulation time `now`.
    fn apply_damage(&mut self, amount: f32, now: f32) -> DamageOutcome;

    /// Checks if the owner is dead.
    fn is_dead(&self) -> bool;
}

/// A step emitted while the death sequence runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathStep {
    /// Toggle between the normal (`visible`) and tinted look
    Blink {
        /// Normal look restored
        visible: bool,
    },
    /// Window closed; the owner should be deactivated
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
enum DeathPhase {
    Blinking,
    Finished,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct DeathSequence {
    pending: PendingAction<DeathPhase>,
    started_at: f32,
    ends_at: f32,
    interval: Option<f32>,
    blinks: u32,
    tinted: bool,
}

impl DeathSequence {
    fn start(now: f32, disappear_delay: f32, blink_interval: f32) -> Self {
        let ends_at = now + disappear_delay;
        let interval = (blink_interval >= MIN_BLINK_INTERVAL).then_some(blink_interval);
        // Without blinking the first resumption is the end of the window
        let first = if interval.is_some() { 0.0 } else { disappear_delay };
        Self {
            pending: PendingAction::after(DeathPhase::Blinking, now, first),
            started_at: now,
            ends_at,
            interval,
            blinks: 0,
            tinted: false,
        }
    }

    fn advance(&mut self, now: f32, steps: &mut Vec<DeathStep>) {
        while self.pending.kind == DeathPhase::Blinking && self.pending.is_due(now) {
            let at = self.pending.resume_at;
            match self.interval {
                Some(interval) if at < self.ends_at => {
                    self.tinted = !self.tinted;
                    steps.push(DeathStep::Blink {
                        visible: !self.tinted,
                    });
                    self.blinks = self.blinks.saturating_add(1);
                    // Blink times come from the start; once an interval is
                    // below f32 resolution the window just closes
                    let next = self.started_at + self.blinks as f32 * interval;
                    self.pending.resume_at = if next > at {
                        next.min(self.ends_at)
                    } else {
                        self.ends_at
                    };
                },
                _ => {
                    if self.tinted {
                        self.tinted = false;
                        steps.push(DeathStep::Blink { visible: true });
                    }
                    self.pending.kind = DeathPhase::Finished;
                    steps.push(DeathStep::Finished);
                },
            }
        }
    }
}

/// Per-actor hit points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthModel {
    current: f32,
    max: f32,
    dead: bool,
    disappear_delay: f32,
    blink_interval: f32,
    death: Option<DeathSequence>,
}

impl Default for HealthModel {
    fn default() -> Self {
        Self::from_tuning(&HealthTuning::default())
    }
}

impl HealthModel {
    /// Creates a full health model with default death timing.
    #[must_use]
    pub fn new(max_health: f32) -> Self {
        Self::from_tuning(&HealthTuning {
            max_health,
            ..HealthTuning::default()
        })
    }

    /// Creates a full health model from tuning.
    ///
    /// A non-positive maximum falls back to [`DEFAULT_MAX_HEALTH`].
    #[must_use]
    pub fn from_tuning(tuning: &HealthTuning) -> Self {
        let max = if tuning.max_health.is_finite() && tuning.max_health > 0.0 {
            tuning.max_health
        } else {
            warn!(
                "Invalid max health {}, using {}",
                tuning.max_health, DEFAULT_MAX_HEALTH
            );
            DEFAULT_MAX_HEALTH
        };
        let disappear_delay = if tuning.disappear_delay.is_finite() {
            tuning.disappear_delay.max(0.0)
        } else {
            HealthTuning::default().disappear_delay
        };

        Self {
            current: max,
            max,
            dead: false,
            disappear_delay,
            blink_interval: tuning.blink_interval,
            death: None,
        }
    }

    /// Current health.
    #[must_use]
    pub fn current_health(&self) -> f32 {
        self.current
    }

    /// Maximum health.
    #[must_use]
    pub fn max_health(&self) -> f32 {
        self.max
    }

    /// Health as a fraction of the maximum (0.0 - 1.0).
    #[must_use]
    pub fn health_fraction(&self) -> f32 {
        (self.current / self.max).clamp(0.0, 1.0)
    }

    /// Checks if the death sequence is still running.
    #[must_use]
    pub fn is_dying(&self) -> bool {
        self.death
            .as_ref()
            .is_some_and(|seq| seq.pending.kind == DeathPhase::Blinking)
    }

    /// Checks if the death sequence has completed.
    #[must_use]
    pub fn is_removed(&self) -> bool {
        self.death
            .as_ref()
            .is_some_and(|seq| seq.pending.kind == DeathPhase::Finished)
    }

    /// Checks if the owner currently shows its normal look.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.death.as_ref().map_or(true, |seq| !seq.tinted)
    }

    /// Advance the death sequence to `now`.
    ///
    /// Returns every step that became due, in order. Empty while alive or
    /// after the sequence finished.
    pub fn advance_death(&mut self, now: f32) -> Vec<DeathStep> {
        let mut steps = Vec::new();
        if let Some(seq) = self.death.as_mut() {
            seq.advance(now, &mut steps);
        }
        steps
    }
}

impl Damageable for HealthModel {
    fn apply_damage(&mut self, amount: f32, now: f32) -> DamageOutcome {
        if !amount.is_finite() || amount < 0.0 {
            warn!("Rejected damage amount {}", amount);
            return DamageOutcome::Rejected;
        }
        if self.dead {
            return DamageOutcome::Ignored;
        }

        self.current -= amount;
        if self.current <= 0.0 {
            self.current = 0.0;
            self.dead = true;
            self.death = Some(DeathSequence::start(
                now,
                self.disappear_delay,
                self.blink_interval,
            ));
            debug!("Health depleted at t={:.2}", now);
            DamageOutcome::Killed
        } else {
            DamageOutcome::Damaged {
                remaining: self.current,
            }
        }
    }

    fn is_dead(&self) -> bool {
        self.dead
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_damage_sequence_example() {
        let mut health = HealthModel::new(10.0);
        let mut seen = Vec::new();

        for amount in [3.0, 4.0, 5.0] {
            let outcome = health.apply_damage(amount, 0.0);
            seen.push(health.current_health());
            if seen.len() < 3 {
                assert!(!health.is_dead());
                assert!(matches!(outcome, DamageOutcome::Damaged { .. }));
            } else {
                assert_eq!(outcome, DamageOutcome::Killed);
            }
        }

        assert_eq!(seen, vec![7.0, 3.0, 0.0]);
        assert!(health.is_dead());
    }

    #[test]
    fn test_damage_after_death_is_ignored() {
        let mut health = HealthModel::new(5.0);
        assert_eq!(health.apply_damage(10.0, 0.0), DamageOutcome::Killed);
        assert_eq!(health.apply_damage(10.0, 0.1), DamageOutcome::Ignored);
        assert_eq!(health.current_health(), 0.0);
    }

    #[test]
    fn test_negative_damage_rejected() {
        let mut health = HealthModel::new(10.0);
        assert_eq!(health.apply_damage(-3.0, 0.0), DamageOutcome::Rejected);
        assert_eq!(health.apply_damage(f32::NAN, 0.0), DamageOutcome::Rejected);
        assert_eq!(health.current_health(), 10.0);
    }

    #[test]
    fn test_zero_damage_still_reports_hit() {
        let mut health = HealthModel::new(10.0);
        assert_eq!(
            health.apply_damage(0.0, 0.0),
            DamageOutcome::Damaged { remaining: 10.0 }
        );
    }

    #[test]
    fn test_invalid_max_health_falls_back() {
        let health = HealthModel::new(-1.0);
        assert_eq!(health.max_health(), DEFAULT_MAX_HEALTH);
        assert_eq!(health.health_fraction(), 1.0);
    }

    #[test]
    fn test_death_sequence_blinks_then_finishes() {
        let mut health = HealthModel::from_tuning(&HealthTuning {
            max_health: 1.0,
            disappear_delay: 0.35,
            blink_interval: 0.1,
        });
        assert!(health.advance_death(0.0).is_empty());

        health.apply_damage(1.0, 1.0);
        assert!(health.is_dying());

        assert_eq!(
            health.advance_death(1.0),
            vec![DeathStep::Blink { visible: false }]
        );
        assert!(!health.is_visible());
        assert!(health.advance_death(1.05).is_empty());

        let rest = health.advance_death(2.0);
        assert_eq!(rest.last(), Some(&DeathStep::Finished));
        assert!(health.is_removed());
        assert!(health.is_visible());
        assert!(health.advance_death(3.0).is_empty());
    }

    #[test]
    fn test_death_sequence_without_blink() {
        let mut health = HealthModel::from_tuning(&HealthTuning {
            max_health: 1.0,
            disappear_delay: 2.0,
            blink_interval: 0.0,
        });
        health.apply_damage(5.0, 0.0);

        assert!(health.advance_death(1.9).is_empty());
        assert_eq!(health.advance_death(2.1), vec![DeathStep::Finished]);
    }

    #[test]
    fn test_zero_delay_finishes_immediately() {
        let mut health = HealthModel::from_tuning(&HealthTuning {
            max_health: 1.0,
            disappear_delay: 0.0,
            blink_interval: 0.1,
        });
        health.apply_damage(1.0, 0.5);
        assert_eq!(health.advance_death(0.5), vec![DeathStep::Finished]);
    }

    #[test]
    fn test_death_sequence_terminates_late_in_a_run() {
        let mut health = HealthModel::from_tuning(&HealthTuning {
            max_health: 1.0,
            disappear_delay: 2.0,
            blink_interval: MIN_BLINK_INTERVAL,
        });
        let now = 300_000.0;
        health.apply_damage(1.0, now);

        let first = health.advance_death(now);
        assert!(!first.is_empty());
        assert!(first.len() < 1000);

        let rest = health.advance_death(now + 3.0);
        assert_eq!(rest.last(), Some(&DeathStep::Finished));
        assert!(health.is_removed());
        assert!(health.is_visible());
    }

    proptest! {
        #[test]
        fn prop_health_stays_in_bounds(
            max in 0.5f32..100.0,
            hits in proptest::collection::vec(0.0f32..20.0, 0..40),
        ) {
            let mut health = HealthModel::new(max);
            let mut kills = 0;
            let mut total = 0.0f32;

            for amount in hits {
                let was_dead = health.is_dead();
                total += amount;
                let outcome = health.apply_damage(amount, 0.0);

                prop_assert!(health.current_health() >= 0.0);
                prop_assert!(health.current_health() <= max);
                if outcome.is_kill() {
                    kills += 1;
                    prop_assert!(!was_dead);
                    prop_assert!(total >= max - 1e-2);
                }
                if was_dead {
                    prop_assert_eq!(outcome, DamageOutcome::Ignored);
                    prop_assert!(health.is_dead());
                }
            }

            prop_assert!(kills <= 1);
        }
    }
}

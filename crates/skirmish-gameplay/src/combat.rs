//! Area damage resolution shared by melee swings and other hit checks.

use serde::{Deserialize, Serialize};
use skirmish_common::{ActorId, LayerMask, Vec3};
use tracing::{debug, warn};

use crate::health::DamageOutcome;

/// Combat collaborator supplied by the host.
pub trait CombatHost {
    /// All active actors whose bodies overlap the sphere and whose layer is in `filter`.
    fn query_overlap(&self, origin: Vec3, radius: f32, filter: LayerMask) -> Vec<ActorId>;

    /// Forward damage from `source` to `target`'s health.
    ///
    /// Returns `None` when the target has no health.
    fn damage_actor(&mut self, source: ActorId, target: ActorId, amount: f32)
        -> Option<DamageOutcome>;
}

/// A single sphere-shaped hit check.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AreaAttack {
    /// Sphere center
    pub origin: Vec3,
    /// Sphere radius
    pub radius: f32,
    /// Damage applied to every target hit
    pub damage: f32,
    /// Layers that may be hit
    pub filter: LayerMask,
}

impl AreaAttack {
    /// Creates an area attack.
    #[must_use]
    pub const fn new(origin: Vec3, radius: f32, damage: f32, filter: LayerMask) -> Self {
        Self {
            origin,
            radius,
            damage,
            filter,
        }
    }
}

/// Diagnostics from one area damage resolution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AreaDamageReport {
    /// Distinct actors returned by the overlap query (excluding the attacker)
    pub candidates: usize,
    /// Actors that own health, with what happened to them
    pub hits: Vec<(ActorId, DamageOutcome)>,
}

impl AreaDamageReport {
    /// Actors killed by this resolution.
    pub fn kills(&self) -> impl Iterator<Item = ActorId> + '_ {
        self.hits
            .iter()
            .filter(|(_, outcome)| outcome.is_kill())
            .map(|(actor, _)| *actor)
    }

    /// Number of targets whose health actually changed.
    #[must_use]
    pub fn landed(&self) -> usize {
        self.hits.iter().filter(|(_, outcome)| outcome.landed()).count()
    }

    /// Checks if nothing was hit.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }
}

/// Applies area attacks through a [`CombatHost`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CombatResolver;

impl CombatResolver {
    /// Damage every filtered actor overlapping the attack sphere.
    ///
    /// Each actor is hit at most once and the attacker never hits itself.
    /// Zero matches is a no-op.
    pub fn resolve_area_damage<H: CombatHost + ?Sized>(
        host: &mut H,
        source: ActorId,
        attack: &AreaAttack,
    ) -> AreaDamageReport {
        let mut report = AreaDamageReport::default();

        if !attack.radius.is_finite() || attack.radius <= 0.0 {
            warn!("{} attack with invalid radius {}", source, attack.radius);
            return report;
        }
        if !attack.damage.is_finite() || attack.damage < 0.0 {
            warn!("{} attack with invalid damage {}", source, attack.damage);
            return report;
        }

        let mut targets = host.query_overlap(attack.origin, attack.radius, attack.filter);
        targets.retain(|target| *target != source);
        targets.sort_unstable();
        targets.dedup();
        report.candidates = targets.len();

        for target in targets {
            if let Some(outcome) = host.damage_actor(source, target, attack.damage) {
                report.hits.push((target, outcome));
            }
        }

        if !report.is_empty() {
            debug!(
                "{} hit {} of {} targets for {}",
                source,
                report.landed(),
                report.candidates,
                attack.damage
            );
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::HealthModel;
    use crate::test_support::TestHost;
    use skirmish_common::Layer;

    fn enemy_filter() -> LayerMask {
        Layer::ENEMY.mask()
    }

    #[test]
    fn test_zero_matches_is_noop() {
        let mut host = TestHost::new();
        let attacker = host.add_actor(Vec3::ZERO, Layer::PLAYER, None);

        let attack = AreaAttack::new(Vec3::new(50.0, 0.0, 0.0), 1.0, 2.0, enemy_filter());
        let report = CombatResolver::resolve_area_damage(&mut host, attacker, &attack);

        assert!(report.is_empty());
        assert_eq!(report.candidates, 0);
    }

    #[test]
    fn test_hits_only_filtered_layers() {
        let mut host = TestHost::new();
        let attacker = host.add_actor(Vec3::ZERO, Layer::PLAYER, Some(HealthModel::new(10.0)));
        let enemy = host.add_actor(Vec3::new(0.5, 0.0, 0.0), Layer::ENEMY, Some(HealthModel::new(10.0)));
        let ally = host.add_actor(Vec3::new(0.4, 0.0, 0.0), Layer::PLAYER, Some(HealthModel::new(10.0)));

        let attack = AreaAttack::new(Vec3::ZERO, 1.0, 2.5, enemy_filter());
        let report = CombatResolver::resolve_area_damage(&mut host, attacker, &attack);

        assert_eq!(report.hits, vec![(enemy, DamageOutcome::Damaged { remaining: 7.5 })]);
        assert_eq!(host.health_of(ally), Some(10.0));
    }

    #[test]
    fn test_attacker_excluded_and_targets_deduplicated() {
        let mut host = TestHost::new();
        let attacker = host.add_actor(Vec3::ZERO, Layer::ENEMY, Some(HealthModel::new(10.0)));
        let other = host.add_actor(Vec3::new(0.3, 0.0, 0.0), Layer::ENEMY, Some(HealthModel::new(10.0)));
        host.duplicate_overlaps = true;

        let attack = AreaAttack::new(Vec3::ZERO, 1.0, 1.0, enemy_filter());
        let report = CombatResolver::resolve_area_damage(&mut host, attacker, &attack);

        assert_eq!(report.candidates, 1);
        assert_eq!(host.health_of(attacker), Some(10.0));
        assert_eq!(host.health_of(other), Some(9.0));
    }

    #[test]
    fn test_targets_without_health_are_skipped() {
        let mut host = TestHost::new();
        let attacker = host.add_actor(Vec3::ZERO, Layer::PLAYER, None);
        host.add_actor(Vec3::new(0.2, 0.0, 0.0), Layer::ENEMY, None);

        let attack = AreaAttack::new(Vec3::ZERO, 1.0, 1.0, enemy_filter());
        let report = CombatResolver::resolve_area_damage(&mut host, attacker, &attack);

        assert_eq!(report.candidates, 1);
        assert!(report.is_empty());
    }

    #[test]
    fn test_kills_reported() {
        let mut host = TestHost::new();
        let attacker = host.add_actor(Vec3::ZERO, Layer::PLAYER, None);
        let weak = host.add_actor(Vec3::new(0.5, 0.0, 0.0), Layer::ENEMY, Some(HealthModel::new(1.0)));

        let attack = AreaAttack::new(Vec3::ZERO, 1.0, 2.5, enemy_filter());
        let report = CombatResolver::resolve_area_damage(&mut host, attacker, &attack);

        assert_eq!(report.kills().collect::<Vec<_>>(), vec![weak]);
    }

    #[test]
    fn test_invalid_radius_or_damage_does_nothing() {
        let mut host = TestHost::new();
        let attacker = host.add_actor(Vec3::ZERO, Layer::PLAYER, None);
        let enemy = host.add_actor(Vec3::ZERO, Layer::ENEMY, Some(HealthModel::new(10.0)));

        let zero_radius = AreaAttack::new(Vec3::ZERO, 0.0, 1.0, enemy_filter());
        assert!(CombatResolver::resolve_area_damage(&mut host, attacker, &zero_radius).is_empty());

        let negative = AreaAttack::new(Vec3::ZERO, 1.0, -4.0, enemy_filter());
        assert!(CombatResolver::resolve_area_damage(&mut host, attacker, &negative).is_empty());

        assert_eq!(host.health_of(enemy), Some(10.0));
    }
}

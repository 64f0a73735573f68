//! In-memory host for unit tests. Positions only change when a test moves them.

use std::collections::BTreeMap;

use skirmish_common::{ActorId, Layer, LayerMask, Vec3};

use crate::combat::CombatHost;
use crate::events::Cue;
use crate::health::{DamageOutcome, Damageable, HealthModel};
use crate::physics::{Body, MotionHost};
use crate::projectile::{ProjectileHost, ProjectileSpawn};

#[derive(Debug, Default)]
pub(crate) struct TestHost {
    pub now: f32,
    pub bodies: BTreeMap<ActorId, Body>,
    pub health: BTreeMap<ActorId, HealthModel>,
    pub cues: Vec<(ActorId, Cue)>,
    pub spawned: Vec<(ActorId, ProjectileSpawn)>,
    /// Report every overlap twice
    pub duplicate_overlaps: bool,
}

impl TestHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_actor(&mut self, position: Vec3, layer: Layer, health: Option<HealthModel>) -> ActorId {
        let id = ActorId::new();
        self.bodies.insert(id, Body::new(position, 0.5, layer));
        if let Some(health) = health {
            self.health.insert(id, health);
        }
        id
    }

    pub fn set_position(&mut self, actor: ActorId, position: Vec3) {
        if let Some(body) = self.bodies.get_mut(&actor) {
            body.position = position;
        }
    }

    pub fn deactivate(&mut self, actor: ActorId) {
        if let Some(body) = self.bodies.get_mut(&actor) {
            body.active = false;
        }
    }

    pub fn health_of(&self, actor: ActorId) -> Option<f32> {
        self.health.get(&actor).map(HealthModel::current_health)
    }

    pub fn cues_for(&self, actor: ActorId) -> Vec<Cue> {
        self.cues
            .iter()
            .filter(|(id, _)| *id == actor)
            .map(|(_, cue)| *cue)
            .collect()
    }

    pub fn count_cue(&self, actor: ActorId, cue: Cue) -> usize {
        self.cues_for(actor).into_iter().filter(|c| *c == cue).count()
    }

    pub fn horizontal_velocity(&self, actor: ActorId) -> Vec3 {
        self.bodies
            .get(&actor)
            .map_or(Vec3::ZERO, |body| Vec3::new(body.velocity.x, 0.0, body.velocity.z))
    }
}

impl MotionHost for TestHost {
    fn position(&self, actor: ActorId) -> Option<Vec3> {
        self.bodies
            .get(&actor)
            .filter(|body| body.active)
            .map(|body| body.position)
    }

    fn velocity(&self, actor: ActorId) -> Option<Vec3> {
        self.bodies
            .get(&actor)
            .filter(|body| body.active)
            .map(|body| body.velocity)
    }

    fn apply_velocity(&mut self, actor: ActorId, velocity: Vec3) {
        if let Some(body) = self.bodies.get_mut(&actor) {
            body.velocity = velocity;
        }
    }

    fn play_cue(&mut self, actor: ActorId, cue: Cue) {
        self.cues.push((actor, cue));
    }
}

impl CombatHost for TestHost {
    fn query_overlap(&self, origin: Vec3, radius: f32, filter: LayerMask) -> Vec<ActorId> {
        let mut found: Vec<ActorId> = self
            .bodies
            .iter()
            .filter(|(_, body)| body.active && filter.contains(body.layer))
            .filter(|(_, body)| body.overlaps_sphere(origin, radius))
            .map(|(id, _)| *id)
            .collect();
        if self.duplicate_overlaps {
            found.extend(found.clone());
        }
        found
    }

    fn damage_actor(&mut self, _source: ActorId, target: ActorId, amount: f32) -> Option<DamageOutcome> {
        let now = self.now;
        self.health
            .get_mut(&target)
            .map(|health| health.apply_damage(amount, now))
    }
}

impl ProjectileHost for TestHost {
    fn spawn_projectile(&mut self, spawn: ProjectileSpawn) -> ActorId {
        let id = ActorId::new();
        self.spawned.push((id, spawn));
        id
    }
}

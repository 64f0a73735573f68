//! In-memory arena implementing every collaborator the actors need.
//!
//! The arena owns bodies, health, state machines and projectiles, and acts
//! as the scheduler: [`Arena::tick`] converts a frame delta into fixed
//! simulation steps followed by one frame step.
//!
//! Simulation step order:
//! 1. Detection membership diffed, enter/exit dispatched
//! 2. Player, then enemies, run their simulation step
//! 3. Bodies integrated (gravity, ground clamp)
//! 4. Projectile contacts and expiry resolved
//!
//! Frame step order: player input, enemy look directions, death sequences.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use skirmish_common::{ActorId, Layer, LayerMask, Vec3};
use tracing::{debug, info};

use crate::ai::EnemyBehaviorStateMachine;
use crate::combat::CombatHost;
use crate::config::{ArenaConfig, EnemySpawn, PlayerSpawn};
use crate::events::{Cue, EventBus, GameEvent};
use crate::health::{DamageOutcome, Damageable, DeathStep, HealthModel};
use crate::input::PlayerInput;
use crate::physics::{Body, MotionHost, GROUND_LEVEL};
use crate::player::PlayerActionStateMachine;
use crate::projectile::{ContactOutcome, Projectile, ProjectileHost, ProjectileSpawn};
use crate::time::GameClock;

/// Body radius of player and enemy actors.
pub const ACTOR_RADIUS: f32 = 0.5;

/// Which kind of actor a summary describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActorRole {
    /// The player
    Player,
    /// An AI enemy
    Enemy,
}

/// Snapshot of one actor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorSummary {
    /// Actor handle
    pub id: ActorId,
    /// Display name
    pub name: String,
    /// Player or enemy
    pub role: ActorRole,
    /// State machine status
    pub status: String,
    /// Current health
    pub health: f32,
    /// Maximum health
    pub max_health: f32,
    /// Whether the actor died
    pub dead: bool,
    /// Whether the body is still in the world
    pub active: bool,
    /// Last position
    pub position: Vec3,
}

/// Snapshot of the whole arena.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArenaSummary {
    /// Simulation time (seconds)
    pub time: f32,
    /// Simulation steps run
    pub steps: u64,
    /// Frames run
    pub frames: u64,
    /// Projectiles still in flight
    pub projectiles: usize,
    /// Per-actor state
    pub actors: Vec<ActorSummary>,
}

/// Borrowed view of the arena handed to state machines.
struct ArenaHost<'a> {
    now: f32,
    bodies: &'a mut BTreeMap<ActorId, Body>,
    health: &'a mut BTreeMap<ActorId, HealthModel>,
    projectiles: &'a mut BTreeMap<ActorId, Projectile>,
    events: &'a EventBus,
    kills: Vec<ActorId>,
}

impl ArenaHost<'_> {
    fn is_dead(&self, actor: ActorId) -> bool {
        self.health.get(&actor).is_some_and(Damageable::is_dead)
    }
}

impl MotionHost for ArenaHost<'_> {
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
        if let Some(body) = self.bodies.get_mut(&actor).filter(|body| body.active) {
            body.velocity = velocity;
        }
    }

    fn play_cue(&mut self, actor: ActorId, cue: Cue) {
        self.events.publish(GameEvent::CuePlayed { actor, cue });
    }
}

impl CombatHost for ArenaHost<'_> {
    fn query_overlap(&self, origin: Vec3, radius: f32, filter: LayerMask) -> Vec<ActorId> {
        self.bodies
            .iter()
            .filter(|(_, body)| body.active && filter.contains(body.layer))
            .filter(|(_, body)| body.overlaps_sphere(origin, radius))
            .map(|(id, _)| *id)
            .collect()
    }

    fn damage_actor(
        &mut self,
        source: ActorId,
        target: ActorId,
        amount: f32,
    ) -> Option<DamageOutcome> {
        let outcome = self.health.get_mut(&target)?.apply_damage(amount, self.now);

        match outcome {
            DamageOutcome::Damaged { remaining } => {
                self.events.publish(GameEvent::ActorDamaged {
                    target,
                    source,
                    amount,
                    remaining,
                });
                self.play_cue(target, Cue::Damage);
            },
            DamageOutcome::Killed => {
                self.events.publish(GameEvent::ActorKilled { target, source });
                self.play_cue(target, Cue::Die);
                self.kills.push(target);
            },
            DamageOutcome::Rejected | DamageOutcome::Ignored => {},
        }
        Some(outcome)
    }
}

impl ProjectileHost for ArenaHost<'_> {
    fn spawn_projectile(&mut self, spawn: ProjectileSpawn) -> ActorId {
        let id = ActorId::new();
        let body = Body::new(spawn.origin, spawn.radius, Layer::PROJECTILE)
            .with_gravity(false)
            .with_velocity(spawn.velocity);

        self.bodies.insert(id, body);
        self.projectiles.insert(id, Projectile::new(&spawn, self.now));
        self.events.publish(GameEvent::ProjectileFired {
            owner: spawn.owner,
            projectile: id,
        });
        id
    }
}

/// A self-contained combat arena.
#[derive(Debug)]
pub struct Arena {
    clock: GameClock,
    gravity: f32,
    bodies: BTreeMap<ActorId, Body>,
    health: BTreeMap<ActorId, HealthModel>,
    names: BTreeMap<ActorId, String>,
    enemies: BTreeMap<ActorId, EnemyBehaviorStateMachine>,
    player: Option<PlayerActionStateMachine>,
    projectiles: BTreeMap<ActorId, Projectile>,
    detected: BTreeMap<ActorId, BTreeSet<ActorId>>,
    events: EventBus,
}

impl Default for Arena {
    fn default() -> Self {
        let config = ArenaConfig::default();
        Self::new(config.fixed_dt, config.gravity)
    }
}

impl Arena {
    /// Creates an empty arena.
    #[must_use]
    pub fn new(fixed_dt: f32, gravity: f32) -> Self {
        Self {
            clock: GameClock::new(fixed_dt),
            gravity,
            bodies: BTreeMap::new(),
            health: BTreeMap::new(),
            names: BTreeMap::new(),
            enemies: BTreeMap::new(),
            player: None,
            projectiles: BTreeMap::new(),
            detected: BTreeMap::new(),
            events: EventBus::default(),
        }
    }

    /// Creates an arena and spawns every actor in the scenario.
    #[must_use]
    pub fn from_config(config: &ArenaConfig) -> Self {
        let mut arena = Self::new(config.fixed_dt, config.gravity);
        if let Some(player) = &config.player {
            arena.spawn_player(player);
        }
        for enemy in &config.enemies {
            arena.spawn_enemy(enemy);
        }
        info!(
            "Arena ready: {} bodies, fixed step {}s",
            arena.bodies.len(),
            arena.clock.fixed_dt()
        );
        arena
    }

    /// Spawn the player, replacing any existing one.
    pub fn spawn_player(&mut self, spawn: &PlayerSpawn) -> ActorId {
        let actor = ActorId::new();
        let machine = PlayerActionStateMachine::new(actor, spawn.tuning.clone());
        let defects: Vec<String> = machine.defects().iter().map(ToString::to_string).collect();

        if let Some(previous) = self.player.replace(machine) {
            info!("Replacing player {}", previous.actor());
            self.deactivate(previous.actor());
        }
        self.insert_actor(actor, "player", spawn.position, Layer::PLAYER, HealthModel::from_tuning(&spawn.health));
        self.publish_defects(actor, defects);
        actor
    }

    /// Spawn an enemy.
    pub fn spawn_enemy(&mut self, spawn: &EnemySpawn) -> ActorId {
        let actor = ActorId::new();
        let machine =
            EnemyBehaviorStateMachine::new(actor, spawn.tuning.clone(), spawn.route.clone());
        let defects: Vec<String> = machine.defects().iter().map(ToString::to_string).collect();

        self.enemies.insert(actor, machine);
        self.detected.insert(actor, BTreeSet::new());
        self.insert_actor(actor, &spawn.name, spawn.position, Layer::ENEMY, HealthModel::from_tuning(&spawn.health));
        self.publish_defects(actor, defects);
        actor
    }

    fn insert_actor(&mut self, actor: ActorId, name: &str, position: Vec3, layer: Layer, health: HealthModel) {
        self.bodies.insert(actor, Body::new(position, ACTOR_RADIUS, layer));
        self.health.insert(actor, health);
        self.names.insert(actor, name.to_string());
        self.events.publish(GameEvent::ActorSpawned { actor });
        debug!("Spawned {} as {} at {}", name, actor, position);
    }

    fn publish_defects(&self, actor: ActorId, defects: Vec<String>) {
        for defect in defects {
            self.events.publish(GameEvent::ConfigDefect { actor, defect });
        }
    }

    /// Advance by one host frame.
    ///
    /// Returns the number of fixed simulation steps run.
    pub fn tick(&mut self, frame_dt: f32, input: &PlayerInput) -> u32 {
        let steps = self.clock.accumulate(frame_dt);
        for _ in 0..steps {
            self.simulation_step();
        }
        self.frame_step(input);
        steps
    }

    /// Run one fixed simulation step.
    pub fn simulation_step(&mut self) {
        let now = self.clock.now();
        self.update_detection();

        let kills = {
            let (mut host, enemies, player) = self.split();
            if let Some(player) = player.as_mut() {
                player.on_simulation_step(&mut host, now);
            }
            for (id, enemy) in enemies.iter_mut() {
                if host.is_dead(*id) {
                    continue;
                }
                enemy.on_simulation_step(&mut host, now);
            }
            host.kills
        };
        self.handle_kills(kills);

        let dt = self.clock.fixed_dt();
        for body in self.bodies.values_mut() {
            body.integrate(dt, self.gravity);
        }

        self.resolve_projectiles(now);
        self.clock.complete_step();
    }

    /// Run one frame step.
    pub fn frame_step(&mut self, input: &PlayerInput) {
        let now = self.clock.now();

        let kills = {
            let (mut host, enemies, player) = self.split();
            if let Some(player) = player.as_mut() {
                player.on_frame_step(&mut host, input, now);
            }
            for enemy in enemies.values_mut() {
                enemy.on_frame_step(&host, now);
            }
            host.kills
        };
        self.handle_kills(kills);

        self.advance_deaths(now);
        self.clock.complete_frame();
    }

    fn split(
        &mut self,
    ) -> (
        ArenaHost<'_>,
        &mut BTreeMap<ActorId, EnemyBehaviorStateMachine>,
        &mut Option<PlayerActionStateMachine>,
    ) {
        let host = ArenaHost {
            now: self.clock.now(),
            bodies: &mut self.bodies,
            health: &mut self.health,
            projectiles: &mut self.projectiles,
            events: &self.events,
            kills: Vec::new(),
        };
        (host, &mut self.enemies, &mut self.player)
    }

    fn update_detection(&mut self) {
        for (enemy_id, machine) in &mut self.enemies {
            let previous = self.detected.entry(*enemy_id).or_default();

            let inside: BTreeSet<ActorId> = match self.bodies.get(enemy_id).filter(|b| b.active) {
                Some(center) => {
                    let radius = machine.tuning().detection_radius;
                    self.bodies
                        .iter()
                        .filter(|(id, body)| {
                            *id != enemy_id && body.active && body.layer != Layer::PROJECTILE
                        })
                        .filter(|(_, body)| body.overlaps_sphere(center.position, radius))
                        .map(|(id, _)| *id)
                        .collect()
                },
                None => BTreeSet::new(),
            };

            for exited in previous.difference(&inside) {
                if machine.on_exit_detection(*exited) {
                    self.events.publish(GameEvent::TargetLost {
                        enemy: *enemy_id,
                        target: *exited,
                    });
                }
            }
            for entered in inside.difference(previous) {
                let Some(layer) = self.bodies.get(entered).map(|body| body.layer) else {
                    continue;
                };
                if machine.on_enter_detection(*entered, layer) {
                    self.events.publish(GameEvent::TargetAcquired {
                        enemy: *enemy_id,
                        target: *entered,
                    });
                }
            }

            *previous = inside;
        }
    }

    fn resolve_projectiles(&mut self, now: f32) {
        let mut hits = Vec::new();
        let mut removed = Vec::new();

        for (id, projectile) in &mut self.projectiles {
            let Some(body) = self.bodies.get(id) else {
                removed.push(*id);
                continue;
            };
            if projectile.is_expired(now) {
                removed.push(*id);
                continue;
            }

            let mut outcome = ContactOutcome::Ignored;
            for (other, other_body) in &self.bodies {
                if other == id
                    || !other_body.active
                    || !other_body.overlaps_sphere(body.position, body.radius)
                {
                    continue;
                }
                let is_trigger = other_body.layer == Layer::PROJECTILE;
                outcome = projectile.on_contact(*other, other_body.layer, is_trigger);
                if outcome != ContactOutcome::Ignored {
                    break;
                }
            }
            if outcome == ContactOutcome::Ignored && body.position.y <= GROUND_LEVEL {
                outcome = projectile.on_terrain();
            }

            match outcome {
                ContactOutcome::Hit(target) => {
                    hits.push((*id, projectile.owner(), target, projectile.damage()));
                    removed.push(*id);
                },
                ContactOutcome::Blocked => removed.push(*id),
                ContactOutcome::Ignored => {},
            }
        }

        if !hits.is_empty() {
            let kills = {
                let (mut host, _, _) = self.split();
                for (projectile, owner, target, damage) in hits {
                    host.events
                        .publish(GameEvent::ProjectileHit { projectile, target });
                    host.damage_actor(owner, target, damage);
                }
                host.kills
            };
            self.handle_kills(kills);
        }

        for id in removed {
            self.projectiles.remove(&id);
            if self.bodies.remove(&id).is_some() {
                self.events.publish(GameEvent::ActorDeactivated { actor: id });
            }
        }
    }

    fn handle_kills(&mut self, kills: Vec<ActorId>) {
        for actor in kills {
            if let Some(enemy) = self.enemies.get_mut(&actor) {
                enemy.disable();
            }
            if let Some(player) = self.player.as_mut().filter(|p| p.actor() == actor) {
                player.disable();
            }
            if let Some(body) = self.bodies.get_mut(&actor) {
                body.halt();
            }
            info!("{} ({}) died", self.display_name(actor), actor);
        }
    }

    fn advance_deaths(&mut self, now: f32) {
        let mut finished = Vec::new();
        for (actor, health) in &mut self.health {
            for step in health.advance_death(now) {
                match step {
                    DeathStep::Blink { visible } => self.events.publish(GameEvent::CuePlayed {
                        actor: *actor,
                        cue: Cue::Blink(visible),
                    }),
                    DeathStep::Finished => finished.push(*actor),
                }
            }
        }
        for actor in finished {
            self.deactivate(actor);
        }
    }

    /// Remove an actor's body from the world.
    ///
    /// It no longer shows up in overlap queries, detection or lookups.
    pub fn deactivate(&mut self, actor: ActorId) {
        let Some(body) = self.bodies.get_mut(&actor) else {
            return;
        };
        if !body.active {
            return;
        }
        body.active = false;
        body.halt();
        self.events.publish(GameEvent::ActorDeactivated { actor });
        info!("{} ({}) deactivated", self.display_name(actor), actor);
    }

    fn display_name(&self, actor: ActorId) -> &str {
        self.names.get(&actor).map_or("projectile", String::as_str)
    }

    // === Queries ===

    /// Current simulation time.
    #[must_use]
    pub fn now(&self) -> f32 {
        self.clock.now()
    }

    /// The scheduler clock.
    #[must_use]
    pub fn clock(&self) -> &GameClock {
        &self.clock
    }

    /// The player controller.
    #[must_use]
    pub fn player(&self) -> Option<&PlayerActionStateMachine> {
        self.player.as_ref()
    }

    /// The player actor.
    #[must_use]
    pub fn player_id(&self) -> Option<ActorId> {
        self.player.as_ref().map(PlayerActionStateMachine::actor)
    }

    /// An enemy's AI.
    #[must_use]
    pub fn enemy(&self, actor: ActorId) -> Option<&EnemyBehaviorStateMachine> {
        self.enemies.get(&actor)
    }

    /// All enemy AIs, ordered by actor.
    pub fn enemies(&self) -> impl Iterator<Item = &EnemyBehaviorStateMachine> {
        self.enemies.values()
    }

    /// An actor's health.
    #[must_use]
    pub fn health(&self, actor: ActorId) -> Option<&HealthModel> {
        self.health.get(&actor)
    }

    /// An actor's body.
    #[must_use]
    pub fn body(&self, actor: ActorId) -> Option<&Body> {
        self.bodies.get(&actor)
    }

    /// Checks if an actor's body is still in the world.
    #[must_use]
    pub fn is_active(&self, actor: ActorId) -> bool {
        self.bodies.get(&actor).is_some_and(|body| body.active)
    }

    /// An actor's display name.
    #[must_use]
    pub fn name(&self, actor: ActorId) -> Option<&str> {
        self.names.get(&actor).map(String::as_str)
    }

    /// Projectiles in flight.
    #[must_use]
    pub fn projectile_count(&self) -> usize {
        self.projectiles.len()
    }

    /// The event bus.
    #[must_use]
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Drain all pending events.
    pub fn drain_events(&self) -> Vec<GameEvent> {
        self.events.drain()
    }

    /// Snapshot every player and enemy.
    #[must_use]
    pub fn summary(&self) -> ArenaSummary {
        let mut actors = Vec::new();

        if let Some(player) = &self.player {
            actors.push(self.actor_summary(player.actor(), ActorRole::Player, player.status().to_string()));
        }
        for (id, enemy) in &self.enemies {
            let status = if enemy.is_enabled() {
                enemy.state().to_string()
            } else {
                "disabled".to_string()
            };
            actors.push(self.actor_summary(*id, ActorRole::Enemy, status));
        }

        ArenaSummary {
            time: self.clock.now(),
            steps: self.clock.steps(),
            frames: self.clock.frames(),
            projectiles: self.projectiles.len(),
            actors,
        }
    }

    fn actor_summary(&self, id: ActorId, role: ActorRole, status: String) -> ActorSummary {
        let health = self.health.get(&id);
        ActorSummary {
            id,
            name: self.display_name(id).to_string(),
            role,
            status,
            health: health.map_or(0.0, HealthModel::current_health),
            max_health: health.map_or(0.0, HealthModel::max_health),
            dead: health.is_some_and(Damageable::is_dead),
            active: self.is_active(id),
            position: self.bodies.get(&id).map_or(Vec3::ZERO, |body| body.position),
        }
    }
}

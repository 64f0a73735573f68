//! Enemy behavior state machine.
//!
//! Each enemy runs a small state machine selected by its [`BehaviorType`]:
//! - Stationary: idles until a target is detected, then chases and swings
//! - Patrol: walks a waypoint route, pausing at each point, then chases and swings
//! - Ranged: idles until a target is detected, then keeps its distance and shoots
//!
//! The host calls [`EnemyBehaviorStateMachine::on_simulation_step`] once per
//! fixed step and [`EnemyBehaviorStateMachine::on_frame_step`] once per frame.

use std::fmt;

use serde::{Deserialize, Serialize};
use skirmish_common::{
    planar_direction, planar_distance, to_look, ActorId, Layer, Vec2, Vec3,
};
use tracing::{debug, warn};

use crate::combat::{AreaAttack, CombatResolver};
use crate::config::{ConfigDefect, EnemyTuning};
use crate::events::Cue;
use crate::host::ActorHost;
use crate::physics::{halt_horizontal, set_horizontal_velocity, MotionHost};
use crate::projectile::ProjectileSpawn;
use crate::time::{Cooldown, PendingAction};

/// Static AI style of an enemy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BehaviorType {
    /// Stands still until a target shows up
    Stationary,
    /// Walks a waypoint route
    #[default]
    Patrol,
    /// Fights from a distance with projectiles
    Ranged,
}

/// Current AI state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AiState {
    /// Standing still
    Idle,
    /// Walking the patrol route
    Patrolling,
    /// Moving toward the target
    Chasing,
    /// In melee range, swinging on cooldown
    Attacking,
    /// Keeping distance and shooting on cooldown
    RangedAttacking,
}

impl fmt::Display for AiState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Patrolling => "patrolling",
            Self::Chasing => "chasing",
            Self::Attacking => "attacking",
            Self::RangedAttacking => "ranged_attacking",
        };
        f.write_str(name)
    }
}

/// Timed actions an enemy can have in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyAction {
    /// Pausing at the current waypoint
    PatrolWait,
}

/// Default look direction (facing the camera).
pub const DEFAULT_LOOK: Vec2 = Vec2::new(0.0, -1.0);

/// Per-enemy AI.
#[derive(Debug, Clone)]
pub struct EnemyBehaviorStateMachine {
    actor: ActorId,
    tuning: EnemyTuning,
    route: Vec<Vec3>,
    state: AiState,
    waypoint_index: usize,
    pending: Option<PendingAction<EnemyAction>>,
    melee_cooldown: Cooldown,
    ranged_cooldown: Cooldown,
    target: Option<ActorId>,
    look_direction: Vec2,
    enabled: bool,
    defects: Vec<ConfigDefect>,
}

impl EnemyBehaviorStateMachine {
    /// Creates the AI for `actor`.
    ///
    /// Configuration defects are logged and kept; the initial state is
    /// `Patrolling` only for a Patrol enemy with a non-empty route.
    #[must_use]
    pub fn new(actor: ActorId, tuning: EnemyTuning, route: Vec<Vec3>) -> Self {
        let defects = tuning.validate(route.len());
        for defect in &defects {
            warn!("{} ({:?}): {}", actor, tuning.behavior, defect);
        }

        let mut machine = Self {
            actor,
            tuning,
            route,
            state: AiState::Idle,
            waypoint_index: 0,
            pending: None,
            melee_cooldown: Cooldown::ready(),
            ranged_cooldown: Cooldown::ready(),
            target: None,
            look_direction: DEFAULT_LOOK,
            enabled: true,
            defects,
        };
        machine.state = machine.default_state();
        machine
    }

    /// Owning actor.
    #[must_use]
    pub fn actor(&self) -> ActorId {
        self.actor
    }

    /// Tunables.
    #[must_use]
    pub fn tuning(&self) -> &EnemyTuning {
        &self.tuning
    }

    /// Behavior type.
    #[must_use]
    pub fn behavior(&self) -> BehaviorType {
        self.tuning.behavior
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> AiState {
        self.state
    }

    /// Patrol route.
    #[must_use]
    pub fn route(&self) -> &[Vec3] {
        &self.route
    }

    /// Index of the waypoint currently walked to.
    #[must_use]
    pub fn waypoint_index(&self) -> usize {
        self.waypoint_index
    }

    /// Checks if a patrol wait is in flight.
    #[must_use]
    pub fn is_waiting(&self) -> bool {
        self.pending.is_some()
    }

    /// Current chase target.
    #[must_use]
    pub fn target(&self) -> Option<ActorId> {
        self.target
    }

    /// Planar look direction `(x, z)`.
    #[must_use]
    pub fn look_direction(&self) -> Vec2 {
        self.look_direction
    }

    /// Checks if the AI is still running.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Configuration defects found at construction.
    #[must_use]
    pub fn defects(&self) -> &[ConfigDefect] {
        &self.defects
    }

    /// Stop the AI permanently (used on death).
    pub fn disable(&mut self) {
        self.enabled = false;
        self.pending = None;
        self.target = None;
    }

    /// State to fall back to when there is nothing to chase.
    fn default_state(&self) -> AiState {
        if self.tuning.behavior == BehaviorType::Patrol && !self.route.is_empty() {
            AiState::Patrolling
        } else {
            AiState::Idle
        }
    }

    fn set_state(&mut self, state: AiState) {
        if self.state != state {
            debug!("{}: {} -> {}", self.actor, self.state, state);
            self.state = state;
        }
    }

    /// An actor entered the detection region.
    ///
    /// Returns `true` if it became the chase target. Any patrol wait is abandoned.
    pub fn on_enter_detection(&mut self, other: ActorId, layer: Layer) -> bool {
        if !self.enabled || other == self.actor || !self.tuning.target_layers.contains(layer) {
            return false;
        }

        self.target = Some(other);
        self.pending = None;
        self.set_state(AiState::Chasing);
        true
    }

    /// An actor left the detection region.
    ///
    /// Returns `true` if it was the chase target.
    pub fn on_exit_detection(&mut self, other: ActorId) -> bool {
        if !self.enabled || self.target != Some(other) {
            return false;
        }

        self.target = None;
        let state = self.default_state();
        self.set_state(state);
        true
    }

    /// Target position, or fall back to the default state if the target is gone.
    fn resolve_target<H: MotionHost + ?Sized>(&mut self, host: &H) -> Option<Vec3> {
        match self.target.map(|target| (target, host.position(target))) {
            Some((_, Some(position))) => Some(position),
            lost => {
                if let Some((target, _)) = lost {
                    debug!("{}: lost target {}", self.actor, target);
                }
                self.target = None;
                let state = self.default_state();
                self.set_state(state);
                None
            },
        }
    }

    /// Run one fixed simulation step.
    pub fn on_simulation_step<H: ActorHost + ?Sized>(&mut self, host: &mut H, now: f32) {
        if !self.enabled {
            return;
        }

        if let Some(pending) = self.pending {
            if !pending.is_due(now) {
                return;
            }
            match pending.kind {
                EnemyAction::PatrolWait => {
                    self.pending = None;
                    if !self.route.is_empty() {
                        self.waypoint_index = (self.waypoint_index + 1) % self.route.len();
                    }
                },
            }
        }

        let Some(position) = host.position(self.actor) else {
            return;
        };

        match self.state {
            AiState::Idle => halt_horizontal(host, self.actor),
            AiState::Patrolling => self.patrol(host, position, now),
            AiState::Chasing => self.chase(host, position),
            AiState::Attacking => self.melee(host, position, now),
            AiState::RangedAttacking => self.ranged(host, position, now),
        }
    }

    /// Run one frame step: refresh the look direction toward the target.
    pub fn on_frame_step<H: MotionHost + ?Sized>(&mut self, host: &H, _now: f32) {
        if !self.enabled {
            return;
        }
        let (Some(target), Some(position)) = (self.target, host.position(self.actor)) else {
            return;
        };
        if let Some(direction) = host
            .position(target)
            .and_then(|target_position| planar_direction(position, target_position))
        {
            self.look_direction = to_look(direction);
        }
    }

    fn patrol<H: ActorHost + ?Sized>(&mut self, host: &mut H, position: Vec3, now: f32) {
        if self.route.is_empty() {
            self.set_state(AiState::Idle);
            halt_horizontal(host, self.actor);
            return;
        }

        let waypoint = self.route[self.waypoint_index % self.route.len()];
        if planar_distance(position, waypoint) < self.tuning.patrol_point_threshold {
            halt_horizontal(host, self.actor);
            self.pending = Some(PendingAction::after(
                EnemyAction::PatrolWait,
                now,
                self.tuning.patrol_wait_time,
            ));
            debug!("{}: reached waypoint {}", self.actor, self.waypoint_index);
            return;
        }

        let direction = planar_direction(position, waypoint).unwrap_or(Vec3::ZERO);
        set_horizontal_velocity(host, self.actor, direction * self.tuning.patrol_speed);
    }

    fn chase<H: ActorHost + ?Sized>(&mut self, host: &mut H, position: Vec3) {
        let Some(target_position) = self.resolve_target(host) else {
            return;
        };

        let direction = planar_direction(position, target_position).unwrap_or(Vec3::ZERO);
        set_horizontal_velocity(host, self.actor, direction * self.tuning.chase_speed);

        let distance = position.distance(target_position);
        match self.tuning.behavior {
            BehaviorType::Ranged => {
                if distance <= self.tuning.ranged_attack_distance {
                    self.set_state(AiState::RangedAttacking);
                }
            },
            BehaviorType::Stationary | BehaviorType::Patrol => {
                if distance <= self.tuning.stopping_distance {
                    self.set_state(AiState::Attacking);
                }
            },
        }
    }

    fn melee<H: ActorHost + ?Sized>(&mut self, host: &mut H, position: Vec3, now: f32) {
        halt_horizontal(host, self.actor);

        let Some(target_position) = self.resolve_target(host) else {
            return;
        };
        if position.distance(target_position) > self.tuning.stopping_distance {
            self.set_state(AiState::Chasing);
            return;
        }

        if self.melee_cooldown.is_ready(now) {
            self.melee_cooldown.restart(now, self.tuning.attack_rate);
            host.play_cue(self.actor, Cue::Attack);

            let Some(offset) = self.tuning.attack_point_offset else {
                warn!("{}: melee attack skipped, no attack point", self.actor);
                return;
            };
            let attack = AreaAttack::new(
                position + offset,
                self.tuning.attack_range,
                self.tuning.attack_damage,
                self.tuning.target_layers,
            );
            CombatResolver::resolve_area_damage(host, self.actor, &attack);
        }
    }

    fn ranged<H: ActorHost + ?Sized>(&mut self, host: &mut H, position: Vec3, now: f32) {
        let Some(target_position) = self.resolve_target(host) else {
            return;
        };
        let distance = position.distance(target_position);

        if distance < self.tuning.retreat_distance {
            let away = planar_direction(target_position, position).unwrap_or(Vec3::ZERO);
            set_horizontal_velocity(host, self.actor, away * self.tuning.chase_speed);
        } else if distance > self.tuning.ranged_attack_distance {
            self.set_state(AiState::Chasing);
        } else if distance > self.tuning.ranged_stopping_distance {
            let toward = planar_direction(position, target_position).unwrap_or(Vec3::ZERO);
            set_horizontal_velocity(host, self.actor, toward * self.tuning.chase_speed);
        } else {
            halt_horizontal(host, self.actor);
            if self.ranged_cooldown.is_ready(now) {
                self.ranged_cooldown.restart(now, self.tuning.ranged_attack_rate);
                self.fire(host, position, target_position);
            }
        }
    }

    fn fire<H: ActorHost + ?Sized>(&mut self, host: &mut H, position: Vec3, target_position: Vec3) {
        host.play_cue(self.actor, Cue::Attack);

        let Some(offset) = self.tuning.fire_point_offset else {
            warn!("{}: shot skipped, no fire point", self.actor);
            return;
        };
        let origin = position + offset;
        // Shots fly level
        let direction = planar_direction(origin, target_position)
            .unwrap_or_else(|| Vec3::new(self.look_direction.x, 0.0, self.look_direction.y));

        let projectile = host.spawn_projectile(ProjectileSpawn {
            owner: self.actor,
            origin,
            velocity: direction * self.tuning.projectile_speed,
            damage: self.tuning.projectile.damage,
            target_filter: self.tuning.target_layers,
            lifetime: self.tuning.projectile.lifetime,
            radius: self.tuning.projectile.radius,
        });
        debug!("{}: fired {}", self.actor, projectile);
    }
}

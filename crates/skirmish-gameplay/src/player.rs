//! Player action state machine.
//!
//! Walking, sprint dashes and melee attacks are mutually exclusive. Sprint
//! and attack are timed actions kept as a single pending record:
//!
//! ```text
//! Sprint:  impulse --(sprint_duration)--> stop --(sprint_cooldown)--> can sprint
//! Attack:  cue --(attack_windup)--> hit check --(attack_animation_duration)--> can move
//! ```

use serde::{Deserialize, Serialize};
use skirmish_common::{from_look, ActorId, Vec2, Vec3};
use tracing::{debug, warn};

use crate::combat::{AreaAttack, CombatResolver};
use crate::config::{ConfigDefect, PlayerTuning};
use crate::events::Cue;
use crate::host::ActorHost;
use crate::input::PlayerInput;
use crate::physics::{halt_horizontal, set_horizontal_velocity, MotionHost};
use crate::time::{Cooldown, PendingAction};

/// Timed actions the player can have in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerAction {
    /// Dash in progress
    Sprint,
    /// Attack windup (step 0) or recovery (step 1)
    Attack,
}

const ATTACK_WINDUP: u8 = 0;

/// Player action controller.
#[derive(Debug, Clone)]
pub struct PlayerActionStateMachine {
    actor: ActorId,
    tuning: PlayerTuning,
    raw_input: Vec2,
    move_input: Vec2,
    facing_sign: f32,
    pending: Option<PendingAction<PlayerAction>>,
    sprint_cooldown: Cooldown,
    enabled: bool,
    defects: Vec<ConfigDefect>,
}

impl PlayerActionStateMachine {
    /// Creates the controller for `actor`, facing right.
    #[must_use]
    pub fn new(actor: ActorId, tuning: PlayerTuning) -> Self {
        let defects = tuning.validate();
        for defect in &defects {
            warn!("{} (player): {}", actor, defect);
        }

        Self {
            actor,
            tuning,
            raw_input: Vec2::ZERO,
            move_input: Vec2::ZERO,
            facing_sign: 1.0,
            pending: None,
            sprint_cooldown: Cooldown::ready(),
            enabled: true,
            defects,
        }
    }

    /// Owning actor.
    #[must_use]
    pub fn actor(&self) -> ActorId {
        self.actor
    }

    /// Tunables.
    #[must_use]
    pub fn tuning(&self) -> &PlayerTuning {
        &self.tuning
    }

    /// Last sampled raw axes.
    #[must_use]
    pub fn raw_input(&self) -> Vec2 {
        self.raw_input
    }

    /// Last processed movement vector.
    #[must_use]
    pub fn move_input(&self) -> Vec2 {
        self.move_input
    }

    /// Facing along X: `1.0` right, `-1.0` left.
    #[must_use]
    pub fn facing_sign(&self) -> f32 {
        self.facing_sign
    }

    /// Checks if a dash is in progress.
    #[must_use]
    pub fn is_sprinting(&self) -> bool {
        self.pending
            .is_some_and(|pending| pending.kind == PlayerAction::Sprint)
    }

    /// Checks if an attack (windup or recovery) is in progress.
    #[must_use]
    pub fn is_attacking(&self) -> bool {
        self.pending
            .is_some_and(|pending| pending.kind == PlayerAction::Attack)
    }

    /// Checks if a dash could start at `now`.
    #[must_use]
    pub fn can_sprint(&self, now: f32) -> bool {
        !self.is_sprinting() && self.sprint_cooldown.is_ready(now)
    }

    /// The timed action in flight, if any.
    #[must_use]
    pub fn pending(&self) -> Option<PendingAction<PlayerAction>> {
        self.pending
    }

    /// Checks if the controller is still running.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Configuration defects found at construction.
    #[must_use]
    pub fn defects(&self) -> &[ConfigDefect] {
        &self.defects
    }

    /// Short label of what the player is doing.
    #[must_use]
    pub fn status(&self) -> &'static str {
        if !self.enabled {
            "disabled"
        } else if self.is_attacking() {
            "attacking"
        } else if self.is_sprinting() {
            "sprinting"
        } else if self.move_input.length_squared() > 0.0 {
            "moving"
        } else {
            "idle"
        }
    }

    /// Stop the controller permanently (used on death).
    pub fn disable(&mut self) {
        self.enabled = false;
        self.pending = None;
        self.raw_input = Vec2::ZERO;
        self.move_input = Vec2::ZERO;
    }

    /// Run one frame step: sample input and start actions.
    pub fn on_frame_step<H: ActorHost + ?Sized>(&mut self, host: &mut H, input: &PlayerInput, now: f32) {
        if !self.enabled {
            return;
        }
        self.advance_pending(host, now);

        if !self.is_attacking() {
            if self.is_sprinting() {
                self.raw_input = Vec2::ZERO;
                self.move_input = Vec2::ZERO;
            } else {
                self.raw_input = input.raw_axes();
                self.move_input = input.move_vector();
            }

            if input.sprint_pressed {
                self.try_start_sprint(host, now);
            }
            if input.attack_pressed {
                self.try_start_attack(host, now);
            }
        }

        if !self.is_sprinting() && !self.is_attacking() && input.turns_facing() {
            self.facing_sign = input.raw_axes().x.signum();
        }
    }

    /// Run one fixed simulation step: resume timed actions and apply walking.
    pub fn on_simulation_step<H: ActorHost + ?Sized>(&mut self, host: &mut H, now: f32) {
        if !self.enabled {
            return;
        }
        self.advance_pending(host, now);

        if self.is_attacking() {
            halt_horizontal(host, self.actor);
        } else if !self.is_sprinting() {
            let velocity = from_look(self.move_input) * self.tuning.move_speed;
            set_horizontal_velocity(host, self.actor, velocity);
        }
    }

    /// Start a dash. No-op (returns `false`) while attacking, sprinting or cooling down.
    pub fn try_start_sprint<H: MotionHost + ?Sized>(&mut self, host: &mut H, now: f32) -> bool {
        if !self.enabled || self.is_attacking() || !self.can_sprint(now) {
            return false;
        }

        let direction = if self.move_input.length_squared() > 0.0 {
            from_look(self.move_input.normalize_or_zero())
        } else {
            Vec3::X * self.facing_sign
        };
        set_horizontal_velocity(host, self.actor, direction * self.tuning.sprint_force);
        host.play_cue(self.actor, Cue::Sprint(true));

        self.pending = Some(PendingAction::after(
            PlayerAction::Sprint,
            now,
            self.tuning.sprint_duration,
        ));
        debug!("{}: sprint started", self.actor);
        true
    }

    /// Start an attack. No-op (returns `false`) while sprinting or attacking.
    pub fn try_start_attack<H: MotionHost + ?Sized>(&mut self, host: &mut H, now: f32) -> bool {
        if !self.enabled || self.is_sprinting() || self.is_attacking() {
            return false;
        }

        host.play_cue(self.actor, Cue::Attack);
        self.pending = Some(PendingAction::after(
            PlayerAction::Attack,
            now,
            self.tuning.attack_windup,
        ));
        debug!("{}: attack started", self.actor);
        true
    }

    /// Resume every timed action stage that is due at `now`.
    fn advance_pending<H: ActorHost + ?Sized>(&mut self, host: &mut H, now: f32) {
        while let Some(mut pending) = self.pending {
            if !pending.is_due(now) {
                break;
            }

            match pending.kind {
                PlayerAction::Sprint => {
                    halt_horizontal(host, self.actor);
                    host.play_cue(self.actor, Cue::Sprint(false));
                    self.sprint_cooldown.restart(now, self.tuning.sprint_cooldown);
                    self.pending = None;
                    debug!("{}: sprint ended", self.actor);
                },
                PlayerAction::Attack if pending.step == ATTACK_WINDUP => {
                    self.strike(host);
                    pending.reschedule(now, self.tuning.attack_animation_duration);
                    self.pending = Some(pending);
                },
                PlayerAction::Attack => {
                    self.pending = None;
                },
            }
        }
    }

    fn strike<H: ActorHost + ?Sized>(&mut self, host: &mut H) {
        let Some(offset) = self.tuning.attack_point_offset else {
            warn!("{}: attack skipped, no attack point", self.actor);
            return;
        };
        let Some(position) = host.position(self.actor) else {
            return;
        };

        let mirrored = Vec3::new(offset.x * self.facing_sign, offset.y, offset.z);
        let attack = AreaAttack::new(
            position + mirrored,
            self.tuning.attack_range,
            self.tuning.attack_damage,
            self.tuning.enemy_layers,
        );
        CombatResolver::resolve_area_damage(host, self.actor, &attack);
    }
}

//! Projectiles fired by ranged actors.

use serde::{Deserialize, Serialize};
use skirmish_common::{ActorId, Layer, LayerMask, Vec3};

/// Parameters for launching a projectile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectileSpawn {
    /// Shooter
    pub owner: ActorId,
    /// Launch position
    pub origin: Vec3,
    /// Initial velocity
    pub velocity: Vec3,
    /// Damage on hit
    pub damage: f32,
    /// Layers the projectile damages
    pub target_filter: LayerMask,
    /// Seconds until the projectile is removed
    pub lifetime: f32,
    /// Contact radius
    pub radius: f32,
}

/// Object lifecycle collaborator supplied by the host.
pub trait ProjectileHost {
    /// Create a projectile actor and return its handle.
    ///
    /// The host removes it after `spawn.lifetime` seconds if it has not hit anything.
    fn spawn_projectile(&mut self, spawn: ProjectileSpawn) -> ActorId;
}

/// What a contact did to a projectile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContactOutcome {
    /// Struck a target; damage should be applied and the projectile removed
    Hit(ActorId),
    /// Stopped by a solid body; removed without damage
    Blocked,
    /// Passed through
    Ignored,
}

/// Runtime state of a projectile in flight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    owner: ActorId,
    damage: f32,
    target_filter: LayerMask,
    expires_at: f32,
    spent: bool,
}

impl Projectile {
    /// Creates projectile state for a spawn made at `now`.
    #[must_use]
    pub fn new(spawn: &ProjectileSpawn, now: f32) -> Self {
        Self {
            owner: spawn.owner,
            damage: spawn.damage.max(0.0),
            target_filter: spawn.target_filter,
            expires_at: now + spawn.lifetime.max(0.0),
            spent: false,
        }
    }

    /// Shooter.
    #[must_use]
    pub fn owner(&self) -> ActorId {
        self.owner
    }

    /// Damage on hit.
    #[must_use]
    pub fn damage(&self) -> f32 {
        self.damage
    }

    /// Checks if the lifetime has run out.
    #[must_use]
    pub fn is_expired(&self, now: f32) -> bool {
        now >= self.expires_at
    }

    /// Checks if the projectile already hit or was blocked.
    #[must_use]
    pub fn is_spent(&self) -> bool {
        self.spent
    }

    /// Resolve contact with another body.
    ///
    /// Triggers and the owner are passed through. A spent projectile ignores
    /// everything, so a target is damaged at most once.
    pub fn on_contact(&mut self, other: ActorId, layer: Layer, is_trigger: bool) -> ContactOutcome {
        if self.spent || other == self.owner {
            return ContactOutcome::Ignored;
        }
        if self.target_filter.contains(layer) {
            self.spent = true;
            ContactOutcome::Hit(other)
        } else if !is_trigger {
            self.spent = true;
            ContactOutcome::Blocked
        } else {
            ContactOutcome::Ignored
        }
    }

    /// Resolve contact with the terrain.
    pub fn on_terrain(&mut self) -> ContactOutcome {
        if self.spent {
            return ContactOutcome::Ignored;
        }
        self.spent = true;
        ContactOutcome::Blocked
    }
}

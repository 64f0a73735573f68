//! Bodies and the motion collaborator interface.
//!
//! The state machines only ever write horizontal velocity through
//! [`MotionHost`]; the host integrator owns the vertical axis.

use serde::{Deserialize, Serialize};
use skirmish_common::{planar, with_vertical, ActorId, Layer, Vec3};

use crate::events::Cue;

/// Height of the ground plane.
pub const GROUND_LEVEL: f32 = 0.0;

/// Motion and presentation collaborator supplied by the host.
///
/// Lookups return `None` for unknown or deactivated actors, which is how
/// the state machines detect a lost reference.
pub trait MotionHost {
    /// Current position of an active actor.
    fn position(&self, actor: ActorId) -> Option<Vec3>;

    /// Current velocity of an active actor.
    fn velocity(&self, actor: ActorId) -> Option<Vec3>;

    /// Replace the actor's velocity.
    fn apply_velocity(&mut self, actor: ActorId, velocity: Vec3);

    /// Trigger an animation/audio cue on the actor.
    fn play_cue(&mut self, actor: ActorId, cue: Cue);
}

/// Set the horizontal velocity, keeping the current vertical component.
pub fn set_horizontal_velocity<H: MotionHost + ?Sized>(host: &mut H, actor: ActorId, horizontal: Vec3) {
    let vertical = host.velocity(actor).map_or(0.0, |v| v.y);
    host.apply_velocity(actor, with_vertical(horizontal, vertical));
}

/// Zero the horizontal velocity, keeping the current vertical component.
pub fn halt_horizontal<H: MotionHost + ?Sized>(host: &mut H, actor: ActorId) {
    set_horizontal_velocity(host, actor, Vec3::ZERO);
}

/// A simple sphere body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Body {
    /// Center position
    pub position: Vec3,
    /// Current velocity
    pub velocity: Vec3,
    /// Sphere radius
    pub radius: f32,
    /// Collision layer
    pub layer: Layer,
    /// Whether gravity applies
    pub gravity: bool,
    /// Inactive bodies are invisible to queries and lookups
    pub active: bool,
}

impl Body {
    /// Creates an active, gravity-affected body at rest.
    #[must_use]
    pub fn new(position: Vec3, radius: f32, layer: Layer) -> Self {
        Self {
            position,
            velocity: Vec3::ZERO,
            radius: radius.max(0.0),
            layer,
            gravity: true,
            active: true,
        }
    }

    /// Sets whether gravity applies.
    #[must_use]
    pub fn with_gravity(mut self, gravity: bool) -> Self {
        self.gravity = gravity;
        self
    }

    /// Sets the initial velocity.
    #[must_use]
    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.velocity = velocity;
        self
    }

    /// Checks if this body overlaps a sphere.
    #[must_use]
    pub fn overlaps_sphere(&self, center: Vec3, radius: f32) -> bool {
        self.position.distance(center) <= self.radius + radius
    }

    /// Horizontal speed.
    #[must_use]
    pub fn planar_speed(&self) -> f32 {
        planar(self.velocity).length()
    }

    /// Advance one fixed step.
    ///
    /// Gravity bodies are kept on or above the ground plane.
    pub fn integrate(&mut self, dt: f32, gravity: f32) {
        if !self.active {
            return;
        }
        if self.gravity {
            self.velocity.y -= gravity * dt;
        }
        self.position += self.velocity * dt;

        if self.gravity && self.position.y <= GROUND_LEVEL {
            self.position.y = GROUND_LEVEL;
            self.velocity.y = self.velocity.y.max(0.0);
        }
    }

    /// Stop all motion.
    pub fn halt(&mut self) {
        self.velocity = Vec3::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::TestHost;

    #[test]
    fn test_gravity_clamps_to_ground() {
        let mut body = Body::new(Vec3::new(0.0, 1.0, 0.0), 0.5, Layer::PLAYER);
        for _ in 0..200 {
            body.integrate(0.02, 9.81);
        }
        assert_eq!(body.position.y, GROUND_LEVEL);
        assert_eq!(body.velocity.y, 0.0);
    }

    #[test]
    fn test_weightless_body_keeps_velocity() {
        let mut body = Body::new(Vec3::new(0.0, 0.5, 0.0), 0.2, Layer::PROJECTILE)
            .with_gravity(false)
            .with_velocity(Vec3::new(10.0, 0.0, 0.0));
        body.integrate(0.1, 9.81);

        assert!((body.position.x - 1.0).abs() < 1e-5);
        assert_eq!(body.position.y, 0.5);
    }

    #[test]
    fn test_inactive_body_does_not_move() {
        let mut body = Body::new(Vec3::ZERO, 0.5, Layer::ENEMY).with_velocity(Vec3::X);
        body.active = false;
        body.integrate(1.0, 9.81);
        assert_eq!(body.position, Vec3::ZERO);
    }

    #[test]
    fn test_overlap_uses_both_radii() {
        let body = Body::new(Vec3::new(1.4, 0.0, 0.0), 0.5, Layer::ENEMY);
        assert!(body.overlaps_sphere(Vec3::ZERO, 1.0));
        assert!(!body.overlaps_sphere(Vec3::ZERO, 0.8));
    }

    #[test]
    fn test_horizontal_velocity_preserves_vertical() {
        let mut host = TestHost::new();
        let actor = host.add_actor(Vec3::ZERO, Layer::PLAYER, None);
        host.apply_velocity(actor, Vec3::new(0.0, -3.0, 0.0));

        set_horizontal_velocity(&mut host, actor, Vec3::new(2.0, 99.0, 1.0));
        assert_eq!(host.velocity(actor), Some(Vec3::new(2.0, -3.0, 1.0)));

        halt_horizontal(&mut host, actor);
        assert_eq!(host.velocity(actor), Some(Vec3::new(0.0, -3.0, 0.0)));
    }
}

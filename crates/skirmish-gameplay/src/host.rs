//! The combined collaborator interface the state machines run against.

use crate::combat::CombatHost;
use crate::physics::MotionHost;
use crate::projectile::ProjectileHost;

/// Everything an actor state machine needs from its host.
///
/// Implemented automatically for any type providing the three capabilities.
pub trait ActorHost: MotionHost + CombatHost + ProjectileHost {}

impl<T: MotionHost + CombatHost + ProjectileHost + ?Sized> ActorHost for T {}

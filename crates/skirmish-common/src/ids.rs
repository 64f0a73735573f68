//! ID types for actors and collision layers.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Global counter for actor IDs.
static ACTOR_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique handle for an actor (player, enemy, projectile).
///
/// Handles are lookup keys only. Holding one does not keep the actor alive;
/// hosts report a stale handle by returning `None` from their lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ActorId(u64);

impl ActorId {
    /// Creates a new unique actor ID.
    #[must_use]
    pub fn new() -> Self {
        Self(ACTOR_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for ActorId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ActorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "actor#{}", self.0)
    }
}

/// A collision layer (0..32).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Layer(u8);

impl Layer {
    /// The player character.
    pub const PLAYER: Self = Self(8);
    /// Hostile actors.
    pub const ENEMY: Self = Self(9);
    /// Projectiles in flight.
    pub const PROJECTILE: Self = Self(10);

    /// Returns a mask containing only this layer.
    #[must_use]
    pub const fn mask(self) -> LayerMask {
        LayerMask(1u32.wrapping_shl(self.0 as u32))
    }
}

/// Set of collision layers used as a target filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerMask(u32);

impl LayerMask {
    /// Matches nothing.
    pub const NONE: Self = Self(0);

    /// Membership test.
    #[must_use]
    pub const fn contains(self, layer: Layer) -> bool {
        self.0 & layer.mask().0 != 0
    }

    /// Checks if no layer is set.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_actor_ids_are_unique() {
        let a = ActorId::new();
        let b = ActorId::new();
        assert_ne!(a, b);
        assert!(a < b);
        assert_eq!(a.to_string(), format!("actor#{}", a.0));
    }

    #[test]
    fn test_layer_mask_membership() {
        let mask = Layer::PLAYER.mask();
        assert!(mask.contains(Layer::PLAYER));
        assert!(!mask.contains(Layer::ENEMY));
        assert!(!mask.is_empty());
        assert!(LayerMask::NONE.is_empty());
        assert!(!LayerMask::NONE.contains(Layer::PROJECTILE));
    }
}

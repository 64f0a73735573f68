//! # Skirmish Common
//!
//! Common types, utilities, and shared abstractions for Skirmish.
//!
//! This crate provides foundational types used across all Skirmish crates:
//! - Actor handles and collision layers
//! - Planar vector helpers (XZ play field, Y up)
//! - Common error types
//! - Prelude for convenient imports

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod error;
pub mod ids;
pub mod space;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::*;
    pub use crate::ids::*;
    pub use crate::space::*;
}

pub use prelude::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prelude_exposes_core_types() {
        let id = ActorId::new();
        let mask = Layer::PLAYER.mask();
        let look = to_look(Vec3::new(1.0, 2.0, 3.0));

        assert_ne!(id, ActorId::new());
        assert!(mask.contains(Layer::PLAYER));
        assert_eq!(look, Vec2::new(1.0, 3.0));
    }
}

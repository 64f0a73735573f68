//! # Skirmish Gameplay
//!
//! Actor combat and AI for Skirmish.
//!
//! This crate provides:
//! - Health model with a one-shot death transition and timed death sequence
//! - Area damage resolution shared by melee attacks
//! - Enemy behavior state machine (stationary, patrol, ranged)
//! - Player action state machine (walk, sprint dash, attack)
//! - Projectiles, tuning/config loading, cues and the event bus
//! - An in-memory [`Arena`] host that schedules and connects everything
//!
//! The state machines never own their collaborators; they are driven through
//! `on_simulation_step` / `on_frame_step` and talk to the world through the
//! [`ActorHost`] traits.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod ai;
pub mod arena;
pub mod combat;
pub mod config;
pub mod events;
pub mod health;
pub mod host;
pub mod input;
pub mod physics;
pub mod player;
pub mod projectile;
pub mod time;

#[cfg(test)]
mod test_support;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::ai::*;
    pub use crate::arena::*;
    pub use crate::combat::*;
    pub use crate::config::*;
    pub use crate::events::*;
    pub use crate::health::*;
    pub use crate::host::*;
    pub use crate::input::*;
    pub use crate::physics::*;
    pub use crate::player::*;
    pub use crate::projectile::*;
    pub use crate::time::*;
}

pub use prelude::*;

#[cfg(test)]
mod tests {
    use super::*;
    use skirmish_common::Vec3;

    #[test]
    fn test_scenario_round_trip_through_arena() {
        let text = r#"
            [player]
            position = [0.0, 0.0, 0.0]

            [[enemies]]
            name = "sentry"
            position = [0.0, 0.0, 2.0]

            [enemies.tuning]
            behavior = "Stationary"
        "#;
        let config = ArenaConfig::from_toml_str(text).expect("scenario parses");
        let mut arena = Arena::from_config(&config);

        for _ in 0..120 {
            arena.tick(1.0 / 60.0, &PlayerInput::idle());
        }

        let summary = arena.summary();
        let sentry = summary
            .actors
            .iter()
            .find(|actor| actor.name == "sentry")
            .expect("sentry present");
        assert_eq!(sentry.status, AiState::Attacking.to_string());
        assert!(sentry.position.distance(Vec3::ZERO) <= 0.8);
    }
}

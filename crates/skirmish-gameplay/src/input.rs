//! Per-frame player input sample.
//!
//! Device polling and key bindings belong to the host; the core only sees
//! two directional axes and two action presses.

use serde::{Deserialize, Serialize};
use skirmish_common::Vec2;

/// Horizontal input magnitude below which facing does not change.
pub const FACING_DEADZONE: f32 = 0.01;

/// Input state for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PlayerInput {
    /// Left/right axis (-1 to 1)
    pub horizontal: f32,
    /// Back/forward axis (-1 to 1)
    pub vertical: f32,
    /// Sprint pressed this frame
    pub sprint_pressed: bool,
    /// Attack pressed this frame
    pub attack_pressed: bool,
}

impl PlayerInput {
    /// No input.
    #[must_use]
    pub fn idle() -> Self {
        Self::default()
    }

    /// Directional input only.
    #[must_use]
    pub fn moving(horizontal: f32, vertical: f32) -> Self {
        Self {
            horizontal,
            vertical,
            ..Self::default()
        }
    }

    /// Adds a sprint press.
    #[must_use]
    pub fn with_sprint(mut self) -> Self {
        self.sprint_pressed = true;
        self
    }

    /// Adds an attack press.
    #[must_use]
    pub fn with_attack(mut self) -> Self {
        self.attack_pressed = true;
        self
    }

    /// Raw axes clamped to [-1, 1]. Non-finite components read as zero.
    #[must_use]
    pub fn raw_axes(&self) -> Vec2 {
        let axis = |v: f32| if v.is_finite() { v.clamp(-1.0, 1.0) } else { 0.0 };
        Vec2::new(axis(self.horizontal), axis(self.vertical))
    }

    /// Movement vector: the raw axes, scaled down to unit length when longer.
    #[must_use]
    pub fn move_vector(&self) -> Vec2 {
        self.raw_axes().clamp_length_max(1.0)
    }

    /// Checks if the horizontal axis is strong enough to change facing.
    #[must_use]
    pub fn turns_facing(&self) -> bool {
        self.raw_axes().x.abs() > FACING_DEADZONE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_diagonal_is_normalized() {
        let input = PlayerInput::moving(1.0, 1.0);
        let v = input.move_vector();
        assert!((v.length() - 1.0).abs() < 1e-5);
        assert!((v.x - v.y).abs() < 1e-6);
    }

    #[test]
    fn test_partial_input_kept() {
        let input = PlayerInput::moving(0.3, -0.4);
        assert_eq!(input.move_vector(), Vec2::new(0.3, -0.4));
    }

    #[test]
    fn test_axes_clamped() {
        let input = PlayerInput::moving(5.0, f32::NAN);
        assert_eq!(input.raw_axes(), Vec2::new(1.0, 0.0));
    }

    #[test]
    fn test_facing_deadzone() {
        assert!(!PlayerInput::moving(0.005, 1.0).turns_facing());
        assert!(PlayerInput::moving(-0.5, 0.0).turns_facing());
    }

    #[test]
    fn test_builders() {
        let input = PlayerInput::idle().with_sprint().with_attack();
        assert!(input.sprint_pressed && input.attack_pressed);
        assert_eq!(input.move_vector(), Vec2::ZERO);
    }

    proptest! {
        #[test]
        fn prop_move_vector_within_unit(h in -3.0f32..3.0, v in -3.0f32..3.0) {
            let input = PlayerInput::moving(h, v);
            let raw = input.raw_axes();
            let moved = input.move_vector();

            prop_assert!(raw.x.abs() <= 1.0 && raw.y.abs() <= 1.0);
            prop_assert!(moved.length() <= 1.0 + 1e-5);
            if raw.length() <= 1.0 {
                prop_assert!((moved - raw).length() < 1e-5);
            }
        }
    }
}

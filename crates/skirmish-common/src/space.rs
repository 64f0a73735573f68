//! Planar helpers over `glam` vectors.
//!
//! The play field is the horizontal XZ plane; Y is the vertical axis, owned by
//! the host's gravity integration. Look directions are 2D vectors `(x, z)`.

pub use glam::{Vec2, Vec3};

/// Below this length a planar vector is treated as zero.
pub const PLANAR_EPSILON: f32 = 1.0e-4;

/// Projects a position onto the horizontal plane (drops Y).
#[must_use]
pub fn planar(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}

/// Distance between two points measured on the horizontal plane.
#[must_use]
pub fn planar_distance(a: Vec3, b: Vec3) -> f32 {
    planar(a).distance(planar(b))
}

/// Unit planar direction from `from` to `to`, or `None` when they coincide on
/// the plane.
#[must_use]
pub fn planar_direction(from: Vec3, to: Vec3) -> Option<Vec3> {
    let delta = planar(to - from);
    let length = delta.length();
    (length > PLANAR_EPSILON).then(|| delta / length)
}

/// Converts a planar vector into a 2D look vector `(x, z)`.
#[must_use]
pub fn to_look(v: Vec3) -> Vec2 {
    Vec2::new(v.x, v.z)
}

/// Converts a 2D look vector back into a planar 3D vector.
#[must_use]
pub fn from_look(look: Vec2) -> Vec3 {
    Vec3::new(look.x, 0.0, look.y)
}

/// Builds a velocity from a horizontal component and an untouched vertical one.
#[must_use]
pub fn with_vertical(horizontal: Vec3, vertical: f32) -> Vec3 {
    Vec3::new(horizontal.x, vertical, horizontal.z)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_planar_distance_ignores_height() {
        let a = Vec3::new(0.0, 0.0, 0.0);
        let b = Vec3::new(3.0, 50.0, 4.0);
        assert!((planar_distance(a, b) - 5.0).abs() < 1e-5);
    }

    #[test]
    fn test_planar_direction_degenerate() {
        let a = Vec3::new(1.0, 0.0, 1.0);
        let above = Vec3::new(1.0, 9.0, 1.0);
        assert!(planar_direction(a, above).is_none());
    }

    #[test]
    fn test_with_vertical_preserves_y() {
        let v = with_vertical(Vec3::new(2.0, 99.0, -1.0), -4.5);
        assert_eq!(v, Vec3::new(2.0, -4.5, -1.0));
    }

    proptest! {
        #[test]
        fn prop_planar_direction_is_unit_and_flat(
            fx in -100.0f32..100.0, fz in -100.0f32..100.0,
            tx in -100.0f32..100.0, tz in -100.0f32..100.0,
            fy in -10.0f32..10.0, ty in -10.0f32..10.0,
        ) {
            let from = Vec3::new(fx, fy, fz);
            let to = Vec3::new(tx, ty, tz);
            if let Some(dir) = planar_direction(from, to) {
                prop_assert!((dir.length() - 1.0).abs() < 1e-3);
                prop_assert_eq!(dir.y, 0.0);
            }
        }
    }
}

// Math utilities for the XZ ground plane

use glam::{Vec2, Vec3};

/// Movement input below this magnitude on an axis is treated as zero
pub const INPUT_DEAD_ZONE: f32 = 0.1;

/// Project a world-space vector onto the XZ ground plane
pub fn flatten_xz(v: Vec3) -> Vec2 {
    Vec2::new(v.x, v.z)
}

/// Lift a ground-plane direction back into world space (y = 0)
pub fn lift_xz(v: Vec2) -> Vec3 {
    Vec3::new(v.x, 0.0, v.y)
}

/// Unsigned angle in degrees between two ground-plane directions.
///
/// A zero-length input yields 0, so an attacker standing exactly on top of
/// the defender counts as "in front".
pub fn angle_between_deg(a: Vec2, b: Vec2) -> f32 {
    let denom = (a.length_squared() * b.length_squared()).sqrt();
    if denom < 1e-12 {
        return 0.0;
    }
    let cos = (a.dot(b) / denom).clamp(-1.0, 1.0);
    cos.acos().to_degrees()
}

/// Apply the movement dead zone and normalize inputs longer than 1
pub fn clamp_move_input(input: Vec2) -> Vec2 {
    if input.length() > 1.0 {
        return input.normalize();
    }
    let x = if input.x.abs() < INPUT_DEAD_ZONE { 0.0 } else { input.x };
    let y = if input.y.abs() < INPUT_DEAD_ZONE { 0.0 } else { input.y };
    Vec2::new(x, y)
}

/// Check if two f32 values are approximately equal
pub fn approx_equal(a: f32, b: f32, epsilon: f32) -> bool {
    (a - b).abs() < epsilon
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_angle_between_same_direction() {
        assert_relative_eq!(angle_between_deg(Vec2::X, Vec2::X * 3.0), 0.0);
    }

    #[test]
    fn test_angle_between_perpendicular_and_opposite() {
        assert_relative_eq!(angle_between_deg(Vec2::X, Vec2::Y), 90.0, epsilon = 1e-3);
        assert_relative_eq!(angle_between_deg(Vec2::X, -Vec2::X), 180.0, epsilon = 1e-3);
    }

    #[test]
    fn test_angle_with_zero_vector() {
        assert_eq!(angle_between_deg(Vec2::ZERO, Vec2::Y), 0.0);
    }

    #[test]
    fn test_flatten_and_lift() {
        let v = Vec3::new(1.0, 5.0, -2.0);
        assert_eq!(flatten_xz(v), Vec2::new(1.0, -2.0));
        assert_eq!(lift_xz(flatten_xz(v)), Vec3::new(1.0, 0.0, -2.0));
    }

    #[test]
    fn test_clamp_move_input_dead_zone() {
        let clamped = clamp_move_input(Vec2::new(0.05, 0.5));
        assert_eq!(clamped, Vec2::new(0.0, 0.5));
    }

    #[test]
    fn test_clamp_move_input_normalizes() {
        let clamped = clamp_move_input(Vec2::new(1.0, 1.0));
        assert_relative_eq!(clamped.length(), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_approx_equal() {
        assert!(approx_equal(1.0, 1.00001, 0.0001));
        assert!(!approx_equal(1.0, 1.1, 0.01));
    }
}

// Motor seam: grounding, gravity and planar movement
//
// The combat core never integrates physics itself. It asks a motor whether
// the character is grounded, requests impulses and planar movement, and reads
// the facing direction for block geometry.

use glam::Vec3;

use crate::core::math::approx_equal;

/// Physical body driving a character
pub trait Motor: std::fmt::Debug {
    /// Whether the body is standing on ground this tick
    fn is_grounded(&self) -> bool;

    /// Apply an instantaneous upward velocity change
    fn apply_vertical_impulse(&mut self, impulse: f32);

    /// Request planar movement for this tick. The last request before
    /// `apply_movement` wins.
    fn move_in_direction(&mut self, direction: Vec3, speed: f32);

    /// Rotate the body to face a ground-plane direction
    fn face_towards(&mut self, direction: Vec3);

    /// Normalized facing direction on the ground plane
    fn facing_direction(&self) -> Vec3;

    /// World position of the body's feet
    fn position(&self) -> Vec3;

    /// Gravity and ground detection, run first every tick
    fn update_grounding(&mut self, dt: f32);

    /// Integrate the requested movement, run last every tick
    fn apply_movement(&mut self, dt: f32);

    /// Downward speed of the most recent landing, reported once
    fn take_landing_speed(&mut self) -> Option<f32>;
}

/// Default gravity for the kinematic motor (units/second²)
pub const DEFAULT_GRAVITY: f32 = -20.0;

/// Minimal motor over a flat floor at a fixed height.
///
/// Good enough for headless simulation and tests: no collision between
/// bodies, only gravity against an optional floor.
#[derive(Debug, Clone)]
pub struct KinematicMotor {
    position: Vec3,
    facing: Vec3,
    vertical_speed: f32,
    planar_velocity: Vec3,
    gravity: f32,
    floor: Option<f32>,
    grounded: bool,
    landing_speed: Option<f32>,
}

impl KinematicMotor {
    /// Create a motor standing on a floor at y = 0
    pub fn new(position: Vec3) -> Self {
        let floor = Some(0.0);
        Self {
            grounded: floor.is_some_and(|h| approx_equal(position.y, h, 1e-4)),
            position,
            facing: Vec3::Z,
            vertical_speed: 0.0,
            planar_velocity: Vec3::ZERO,
            gravity: DEFAULT_GRAVITY,
            floor,
            landing_speed: None,
        }
    }

    /// Set the floor height, or remove the floor entirely (walked off a ledge)
    pub fn with_floor(mut self, floor: Option<f32>) -> Self {
        self.floor = floor;
        self
    }

    /// Override gravity
    pub fn with_gravity(mut self, gravity: f32) -> Self {
        self.gravity = gravity;
        self
    }

    /// Set the initial facing direction
    pub fn with_facing(mut self, facing: Vec3) -> Self {
        self.face_towards(facing);
        self
    }

    /// Current vertical speed (positive = up)
    pub fn vertical_speed(&self) -> f32 {
        self.vertical_speed
    }
}

impl Motor for KinematicMotor {
    fn is_grounded(&self) -> bool {
        self.grounded
    }

    fn apply_vertical_impulse(&mut self, impulse: f32) {
        self.vertical_speed += impulse;
        if impulse > 0.0 {
            self.grounded = false;
        }
    }

    fn move_in_direction(&mut self, direction: Vec3, speed: f32) {
        let planar = Vec3::new(direction.x, 0.0, direction.z);
        self.planar_velocity = planar.normalize_or_zero() * speed;
    }

    fn face_towards(&mut self, direction: Vec3) {
        let planar = Vec3::new(direction.x, 0.0, direction.z);
        if planar.length_squared() > 1e-8 {
            self.facing = planar.normalize();
        }
    }

    fn facing_direction(&self) -> Vec3 {
        self.facing
    }

    fn position(&self) -> Vec3 {
        self.position
    }

    fn update_grounding(&mut self, dt: f32) {
        if self.grounded {
            return;
        }
        self.vertical_speed += self.gravity * dt;
    }

    fn apply_movement(&mut self, dt: f32) {
        self.position += self.planar_velocity * dt;
        self.planar_velocity = Vec3::ZERO;

        if self.grounded {
            if self.floor.is_none() {
                // Floor vanished under us
                self.grounded = false;
            }
            return;
        }

        self.position.y += self.vertical_speed * dt;
        if let Some(floor) = self.floor {
            if self.position.y <= floor && self.vertical_speed <= 0.0 {
                self.landing_speed = Some(self.vertical_speed.abs());
                self.position.y = floor;
                self.vertical_speed = 0.0;
                self.grounded = true;
            }
        }
    }

    fn take_landing_speed(&mut self) -> Option<f32> {
        self.landing_speed.take()
    }
}

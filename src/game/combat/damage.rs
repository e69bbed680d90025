// Damage payloads and formulas

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::attack::TargetEffect;
use crate::core::math::{angle_between_deg, flatten_xz};
use crate::engine::spatial::EntityId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DamageType {
    #[default]
    Physical,
    Magic,
    Fire,
    Lightning,
    Dark,
}

/// One hit delivered to a damageable target
#[derive(Debug, Clone, PartialEq)]
pub struct DamageData {
    /// None for environmental damage (falls)
    pub attacker: Option<EntityId>,
    /// Raw damage before the target's defense
    pub amount: f32,
    pub damage_type: DamageType,
    pub poise_damage: f32,
    pub hit_point: Vec3,
    /// Direction the hit travels (attacker towards target)
    pub hit_direction: Vec3,
    /// Attacker position, used by the block angle check
    pub attacker_position: Option<Vec3>,
    pub effects: Vec<TargetEffect>,
}

impl DamageData {
    /// Plain physical hit with no source position
    pub fn new(amount: f32) -> Self {
        Self {
            attacker: None,
            amount,
            damage_type: DamageType::Physical,
            poise_damage: 0.0,
            hit_point: Vec3::ZERO,
            hit_direction: Vec3::ZERO,
            attacker_position: None,
            effects: Vec::new(),
        }
    }

    pub fn from_attacker(mut self, attacker: EntityId, position: Vec3) -> Self {
        self.attacker = Some(attacker);
        self.attacker_position = Some(position);
        self
    }

    pub fn with_type(mut self, damage_type: DamageType) -> Self {
        self.damage_type = damage_type;
        self
    }

    pub fn with_poise_damage(mut self, poise_damage: f32) -> Self {
        self.poise_damage = poise_damage;
        self
    }

    pub fn with_hit(mut self, point: Vec3, direction: Vec3) -> Self {
        self.hit_point = point;
        self.hit_direction = direction;
        self
    }

    pub fn with_effects(mut self, effects: Vec<TargetEffect>) -> Self {
        self.effects = effects;
        self
    }

    /// Direction from the victim towards whoever dealt the hit, if known
    pub fn direction_to_source(&self, victim_position: Vec3) -> Option<Vec3> {
        if let Some(position) = self.attacker_position {
            return Some(position - victim_position);
        }
        if self.hit_direction.length_squared() > 0.0 {
            return Some(-self.hit_direction);
        }
        None
    }
}

/// Damage after defense, never below 1
pub fn final_damage(raw: f32, defense: f32) -> f32 {
    (raw - defense.max(0.0)).max(1.0)
}

/// Damage for landing at `fall_speed`, or None below the threshold
pub fn fall_damage(fall_speed: f32, multiplier: f32, min_speed: f32) -> Option<f32> {
    if fall_speed > min_speed {
        Some((fall_speed * multiplier).ceil())
    } else {
        None
    }
}

/// Whether an attack arriving from `to_attacker` is inside the block arc
/// around `facing`. Only the ground-plane angle matters. An unknown
/// direction counts as blocked.
pub fn block_angle_ok(facing: Vec3, to_attacker: Vec3, max_angle_deg: f32) -> bool {
    let to_attacker = flatten_xz(to_attacker);
    if to_attacker.length_squared() < 1e-8 {
        return true;
    }
    angle_between_deg(flatten_xz(facing), to_attacker) < max_angle_deg
}

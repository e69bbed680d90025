// AI combat brain: distance keeping, strafing, defense and attack choice
//
// The brain only produces an `InputFrame`, exactly like a player device
// would. All gating (cooldowns, stamina, state legality) stays in the
// character.

use glam::Vec2;
use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::attack::AttackKind;
use crate::core::math::flatten_xz;
use crate::engine::input::InputFrame;
use crate::game::characters::character::TargetInfo;
use crate::game::characters::state::StateId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// Targets farther than this are ignored
    pub detection_range: f32,
    /// Back off when closer than this
    pub min_distance: f32,
    /// Approach when farther than this; also the attack range
    pub max_distance: f32,
    pub ideal_distance: f32,
    /// Distance correction stops once within this of the ideal distance
    pub distance_threshold: f32,
    /// Beyond `ideal_distance + dash_threshold` the brain picks a dash attack
    pub dash_threshold: f32,
    /// Percent chance of a light (vs heavy) attack against an open target
    pub light_attack_chance: u32,
    /// Percent chance of a light (vs heavy) attack against a blocking target
    pub blocking_light_chance: u32,
    /// Sideways input while circling the target
    pub strafe_speed: f32,
    /// Forward/backward input while correcting distance
    pub approach_speed: f32,
    /// Seconds between strafe direction rolls
    pub strafe_interval: f32,
    /// Chance of reacting to an incoming attack at all
    pub defend_chance: f32,
    /// Share of defensive reactions that dodge instead of block
    pub dodge_chance: f32,
    /// Minimum seconds between defensive reactions
    pub defense_delay: f32,
    /// How long a defensive block is held
    pub block_duration: f32,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            detection_range: 10.0,
            min_distance: 1.5,
            max_distance: 3.5,
            ideal_distance: 2.5,
            distance_threshold: 0.3,
            dash_threshold: 4.0,
            light_attack_chance: 70,
            blocking_light_chance: 30,
            strafe_speed: 0.4,
            approach_speed: 0.5,
            strafe_interval: 2.0,
            defend_chance: 0.5,
            dodge_chance: 0.35,
            defense_delay: 1.5,
            block_duration: 1.0,
        }
    }
}

/// What the brain knows about its own character this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Perception {
    pub state: Option<StateId>,
    pub target: Option<TargetInfo>,
    /// The character's attack cooldown gate would accept an attack now
    pub attack_ready: bool,
}

/// Per-character AI controller
#[derive(Debug, Clone)]
pub struct AiCombatBrain {
    config: AiConfig,
    rng: StdRng,
    strafe_direction: f32,
    strafe_timer: f32,
    adjusting_distance: bool,
    since_defense: f32,
    block_remaining: f32,
}

impl AiCombatBrain {
    pub fn new(config: AiConfig, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let strafe_direction = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
        Self {
            since_defense: config.defense_delay,
            config,
            rng,
            strafe_direction,
            strafe_timer: 0.0,
            adjusting_distance: false,
            block_remaining: 0.0,
        }
    }

    pub fn config(&self) -> &AiConfig {
        &self.config
    }

    pub fn strafe_direction(&self) -> f32 {
        self.strafe_direction
    }

    /// Pick the kind of attack to use against a target at `distance`
    pub fn choose_attack(&mut self, distance: f32, target_blocking: bool) -> AttackKind {
        if target_blocking {
            let roll = self.rng.gen_range(0..100);
            return if roll < self.config.blocking_light_chance {
                AttackKind::Light
            } else {
                AttackKind::Heavy
            };
        }
        if distance > self.config.ideal_distance + self.config.dash_threshold {
            return AttackKind::Dash;
        }
        let roll = self.rng.gen_range(0..100);
        if roll < self.config.light_attack_chance {
            AttackKind::Light
        } else {
            AttackKind::Heavy
        }
    }

    /// Decide this tick's input
    pub fn think(&mut self, dt: f32, perception: &Perception) -> InputFrame {
        self.since_defense += dt;
        self.block_remaining = (self.block_remaining - dt).max(0.0);
        self.update_strafe(dt);

        if perception.state.is_some_and(|state| !state.accepts_input()) {
            return InputFrame::idle();
        }
        let Some(target) = perception.target else {
            self.block_remaining = 0.0;
            return InputFrame::idle();
        };
        if target.distance > self.config.detection_range {
            return InputFrame::idle();
        }

        let forward = flatten_xz(target.direction).normalize_or_zero();
        let local = self.adjust_distance(target.distance);
        let mut frame = InputFrame::idle().with_move(to_world(local, forward));

        if let Some(reaction) = self.defend(&target, forward) {
            return reaction;
        }
        if self.block_remaining > 0.0 {
            frame.block_held = true;
            return frame;
        }

        let in_range = target.distance < self.config.max_distance;
        let dash_range = target.distance > self.config.ideal_distance + self.config.dash_threshold;
        if perception.attack_ready && (in_range || dash_range) {
            let kind = self.choose_attack(target.distance, target.is_blocking);
            debug!("AI chose {:?} at distance {:.2}", kind, target.distance);
            frame = match kind {
                AttackKind::Light => frame.with_attack(),
                AttackKind::Heavy => frame.with_heavy_attack(),
                AttackKind::Dash => frame.with_dash_attack(),
            };
        }
        frame
    }

    fn update_strafe(&mut self, dt: f32) {
        self.strafe_timer += dt;
        if self.strafe_timer >= self.config.strafe_interval {
            self.strafe_timer = 0.0;
            self.strafe_direction = if self.rng.gen_bool(0.5) { 1.0 } else { -1.0 };
        }
    }

    /// Local (strafe, forward) input that keeps the target near the ideal
    /// distance. Once a correction starts it continues until the ideal
    /// distance is reached.
    fn adjust_distance(&mut self, distance: f32) -> Vec2 {
        let strafe = self.strafe_direction * self.config.strafe_speed;
        let off_ideal = (distance - self.config.ideal_distance).abs();

        if self.adjusting_distance && off_ideal < self.config.distance_threshold {
            self.adjusting_distance = false;
        }
        if !self.adjusting_distance {
            if distance > self.config.max_distance || distance < self.config.min_distance {
                self.adjusting_distance = true;
            } else {
                return Vec2::new(strafe, 0.0);
            }
        }

        let forward = if distance > self.config.ideal_distance {
            self.config.approach_speed
        } else {
            -self.config.approach_speed
        };
        Vec2::new(strafe, forward)
    }

    /// React to an incoming attack with a dodge or a block
    fn defend(&mut self, target: &TargetInfo, forward: Vec2) -> Option<InputFrame> {
        if !target.is_attacking
            || target.distance > self.config.max_distance
            || self.since_defense < self.config.defense_delay
        {
            return None;
        }
        self.since_defense = 0.0;
        if !self.rng.gen_bool(self.config.defend_chance.clamp(0.0, 1.0) as f64) {
            return None;
        }

        if self.rng.gen_bool(self.config.dodge_chance.clamp(0.0, 1.0) as f64) {
            debug!("AI dodging away from target {}", target.id);
            Some(InputFrame::idle().with_move(-forward).with_dodge())
        } else {
            debug!("AI blocking target {}", target.id);
            self.block_remaining = self.config.block_duration;
            Some(InputFrame::idle().with_block())
        }
    }
}

/// Rotate a local (strafe, forward) input into the world ground plane
fn to_world(local: Vec2, forward: Vec2) -> Vec2 {
    if forward == Vec2::ZERO {
        return Vec2::ZERO;
    }
    let right = -forward.perp();
    right * local.x + forward * local.y
}

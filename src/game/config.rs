// Character configuration loaded from TOML
//
// Every field has a default, so a config file only needs to list the values
// it changes.

use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use crate::game::characters::state_machine::StateMachineConfig;
use crate::game::combat::ai::AiConfig;
use crate::game::combat::attack::AttackTable;
use crate::game::combat::combo::ComboOverflowPolicy;
use crate::game::error::ConfigError;

/// Attribute maxima and growth
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsConfig {
    pub max_health: f32,
    pub max_stamina: f32,
    pub max_poise: f32,
    pub defense: f32,
    pub attack_power: f32,
    pub level: u32,
    /// Stamina regained per second once regeneration is running
    pub stamina_regen_rate: f32,
    /// Seconds without stamina use before regeneration starts
    pub stamina_regen_delay: f32,
    /// Seconds without poise damage before poise refills
    pub poise_recovery_delay: f32,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            max_health: 100.0,
            max_stamina: 100.0,
            max_poise: 30.0,
            defense: 5.0,
            attack_power: 10.0,
            level: 1,
            stamina_regen_rate: 10.0,
            stamina_regen_delay: 1.0,
            poise_recovery_delay: 3.0,
        }
    }
}

/// Locomotion, dodge, jump and fall parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    pub move_speed: f32,
    /// Speed multiplier while blocking, expected in `(0, 1)`
    pub blocking_move_multiplier: f32,
    pub jump_impulse: f32,
    /// Grace period after leaving the ground during which a jump is honored
    pub coyote_time: f32,
    pub dodge_duration: f32,
    pub dodge_speed: f32,
    pub dodge_stamina_cost: f32,
    pub fall_damage_multiplier: f32,
    /// Landing speeds at or below this deal no damage
    pub min_fall_damage_speed: f32,
    /// Collision radius used by hit detection
    pub body_radius: f32,
    pub input_buffer_window: f32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            move_speed: 4.0,
            blocking_move_multiplier: 0.5,
            jump_impulse: 7.0,
            coyote_time: 0.12,
            dodge_duration: 0.5,
            dodge_speed: 8.0,
            dodge_stamina_cost: 20.0,
            fall_damage_multiplier: 2.0,
            min_fall_damage_speed: 12.0,
            body_radius: 0.5,
            input_buffer_window: 0.15,
        }
    }
}

/// Attack gating, combos, blocking and stagger tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    /// Time after starting an attack before a fresh attack is accepted from
    /// Default or Blocking
    pub attack_cooldown: f32,
    /// Shorter cooldown honored when counter-attacking an attacking target
    pub minimal_attack_cooldown: f32,
    /// Maximum target distance for the counter exception
    pub counter_range: f32,
    /// Maximum time between attack starts for the combo count to grow
    pub combo_window: f32,
    pub max_combo: u32,
    pub combo_overflow: ComboOverflowPolicy,
    /// Damage multiplier per combo step; the last entry covers longer combos
    pub combo_multipliers: Vec<f32>,
    /// Length of the ComboEnding recovery
    pub combo_end_duration: f32,
    /// Widest angle (degrees) between facing and attacker that still blocks
    pub max_block_angle: f32,
    pub block_stamina_cost: f32,
    /// Fraction of the raw hit applied to health when a block breaks
    pub block_break_damage_fraction: f32,
    pub block_break_stagger: f32,
    /// Invulnerability granted after an unblocked hit (0 disables)
    pub hit_invulnerability: f32,
    pub base_stagger_duration: f32,
    pub stagger_per_poise: f32,
    /// Health restored by revive, as a fraction of max
    pub revive_health_fraction: f32,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            attack_cooldown: 0.0,
            minimal_attack_cooldown: 0.0,
            counter_range: 3.5,
            combo_window: 1.0,
            max_combo: 3,
            combo_overflow: ComboOverflowPolicy::Wrap,
            combo_multipliers: vec![1.0, 1.2, 1.5],
            combo_end_duration: 0.3,
            max_block_angle: 60.0,
            block_stamina_cost: 10.0,
            block_break_damage_fraction: 0.25,
            block_break_stagger: 1.0,
            hit_invulnerability: 0.0,
            base_stagger_duration: 0.4,
            stagger_per_poise: 0.02,
            revive_health_fraction: 1.0,
        }
    }
}

/// Everything needed to build one character
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterConfig {
    pub stats: StatsConfig,
    pub movement: MovementConfig,
    pub combat: CombatConfig,
    pub attacks: AttackTable,
    /// Explicit state set and transition table; the standard table when absent
    pub states: Option<StateMachineConfig>,
    /// Present for AI-driven characters
    pub ai: Option<AiConfig>,
}

impl CharacterConfig {
    /// Player preset: standard tuning, no AI
    pub fn player() -> Self {
        Self::default()
    }

    /// Enemy preset: slower to act, AI-driven
    pub fn enemy() -> Self {
        Self {
            stats: StatsConfig {
                max_health: 80.0,
                max_poise: 20.0,
                defense: 2.0,
                attack_power: 8.0,
                ..StatsConfig::default()
            },
            combat: CombatConfig {
                attack_cooldown: 3.0,
                minimal_attack_cooldown: 0.5,
                ..CombatConfig::default()
            },
            ai: Some(AiConfig::default()),
            ..Self::default()
        }
    }

    /// Parse a TOML document
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    /// Read and parse a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|error| ConfigError::Io {
            path: path.to_path_buf(),
            error,
        })?;
        let config = Self::from_toml_str(&source)?;
        info!("Loaded character config from {}", path.display());
        Ok(config)
    }

    /// State machine configuration in effect
    pub fn state_machine(&self) -> StateMachineConfig {
        self.states.clone().unwrap_or_else(StateMachineConfig::standard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::characters::state::StateId;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = CharacterConfig::from_toml_str("").expect("empty config parses");
        assert_eq!(config, CharacterConfig::default());
        assert!(config.ai.is_none());
    }

    #[test]
    fn test_partial_override() {
        let config = CharacterConfig::from_toml_str(
            r#"
            [stats]
            max_health = 250.0

            [combat]
            combo_overflow = "Clamp"
            hit_invulnerability = 0.2
            "#,
        )
        .expect("config parses");

        assert_eq!(config.stats.max_health, 250.0);
        assert_eq!(config.stats.max_stamina, 100.0);
        assert_eq!(config.combat.combo_overflow, ComboOverflowPolicy::Clamp);
        assert_eq!(config.combat.hit_invulnerability, 0.2);
    }

    #[test]
    fn test_explicit_state_table() {
        let config = CharacterConfig::from_toml_str(
            r#"
            [states]
            default_state = "Default"
            states = ["Default", "Dodging", "Dead"]
            transitions = [
                { from = "Default", to = "Dodging", condition = "DodgeRequested" },
                { from = "Dodging", to = "Default", condition = "DodgeFinished" },
            ]
            "#,
        )
        .expect("config parses");

        let machine = config.state_machine();
        assert_eq!(machine.states.len(), 3);
        assert_eq!(machine.transitions.len(), 2);
        assert_eq!(machine.validate().ok(), Some(StateId::Default));
    }

    #[test]
    fn test_parse_error_reported() {
        let result = CharacterConfig::from_toml_str("[stats]\nmax_health = \"lots\"");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_missing_file_reported() {
        let result = CharacterConfig::load("/definitely/not/here.toml");
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn test_presets_differ() {
        let player = CharacterConfig::player();
        let enemy = CharacterConfig::enemy();
        assert!(player.ai.is_none());
        assert!(enemy.ai.is_some());
        assert!(enemy.combat.attack_cooldown > player.combat.attack_cooldown);
    }
}

// Attack data and the combo table

use serde::{Deserialize, Serialize};

use super::damage::DamageType;
use crate::game::attributes::StatusKind;
use crate::game::error::ConfigError;

/// Broad attack category, used for input mapping and AI selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttackKind {
    /// Fast, cheap, chains into combos
    Light,
    /// Slow, expensive, resets the combo
    Heavy,
    /// Gap-closing lunge
    Dash,
}

/// Extra effect applied to a target that takes an unblocked hit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TargetEffect {
    /// Force a stagger regardless of poise
    Stagger { duration: f32 },
    /// Remove stamina from the target
    DrainStamina { amount: f32 },
    /// Apply a timed status flag
    Status { status: StatusKind, duration: f32 },
}

/// One entry of the attack table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttackData {
    pub name: String,
    pub kind: AttackKind,
    /// Flat damage before scaling
    pub damage: f32,
    /// Multiplier applied to the attacker's attack power and added to `damage`
    pub power_scaling: f32,
    pub damage_type: DamageType,
    pub stamina_cost: f32,
    pub poise_damage: f32,
    /// Time from swing start until the hitbox opens
    pub windup: f32,
    /// How long the hitbox stays open
    pub active: f32,
    /// Time after the hitbox closes before the swing ends
    pub recovery: f32,
    /// Time after the swing ends during which a follow-up input continues the combo
    pub combo_window: f32,
    /// Distance in front of the attacker where the hit volume is centered
    pub reach: f32,
    pub radius: f32,
    /// Attack used when a light input continues the combo from this one
    pub follow_up: Option<usize>,
    /// Allow the same target to be hit more than once per swing
    pub multi_hit: bool,
    /// Forward movement speed during the windup
    pub lunge_speed: f32,
    pub animation_trigger: String,
    pub effects: Vec<TargetEffect>,
}

impl Default for AttackData {
    fn default() -> Self {
        Self {
            name: "Attack".to_string(),
            kind: AttackKind::Light,
            damage: 10.0,
            power_scaling: 0.0,
            damage_type: DamageType::Physical,
            stamina_cost: 15.0,
            poise_damage: 10.0,
            windup: 0.15,
            active: 0.15,
            recovery: 0.25,
            combo_window: 0.4,
            reach: 1.0,
            radius: 1.0,
            follow_up: None,
            multi_hit: false,
            lunge_speed: 0.0,
            animation_trigger: "Attack".to_string(),
            effects: Vec::new(),
        }
    }
}

impl AttackData {
    /// Total swing length: windup + active + recovery
    pub fn duration(&self) -> f32 {
        self.windup + self.active + self.recovery
    }

    /// Time at which the hitbox closes
    pub fn active_end(&self) -> f32 {
        self.windup + self.active
    }

    /// Raw damage for an attacker with `attack_power`, before combo bonus and defense
    pub fn raw_damage(&self, attack_power: f32) -> f32 {
        (self.damage + self.power_scaling * attack_power).max(0.0)
    }
}

/// Ordered list of attacks; indices are stable attack ids
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttackTable {
    pub attacks: Vec<AttackData>,
}

impl AttackTable {
    pub fn new(attacks: Vec<AttackData>) -> Self {
        Self { attacks }
    }

    /// Three-hit light chain, a heavy and a dash attack
    pub fn standard() -> Self {
        let light = |name: &str, follow_up: Option<usize>, damage: f32| AttackData {
            name: name.to_string(),
            kind: AttackKind::Light,
            damage,
            power_scaling: 1.0,
            follow_up,
            ..AttackData::default()
        };

        Self::new(vec![
            light("Light 1", Some(1), 10.0),
            light("Light 2", Some(2), 12.0),
            AttackData {
                recovery: 0.4,
                ..light("Light 3", None, 16.0)
            },
            AttackData {
                name: "Heavy".to_string(),
                kind: AttackKind::Heavy,
                damage: 15.0,
                power_scaling: 2.5,
                stamina_cost: 30.0,
                poise_damage: 25.0,
                windup: 0.45,
                active: 0.2,
                recovery: 0.45,
                combo_window: 0.0,
                reach: 1.2,
                radius: 1.5,
                animation_trigger: "HeavyAttack".to_string(),
                ..AttackData::default()
            },
            AttackData {
                name: "Dash".to_string(),
                kind: AttackKind::Dash,
                damage: 12.0,
                power_scaling: 1.5,
                stamina_cost: 25.0,
                poise_damage: 15.0,
                windup: 0.3,
                active: 0.2,
                recovery: 0.35,
                combo_window: 0.0,
                lunge_speed: 10.0,
                animation_trigger: "DashAttack".to_string(),
                ..AttackData::default()
            },
        ])
    }

    pub fn get(&self, index: usize) -> Option<&AttackData> {
        self.attacks.get(index)
    }

    pub fn len(&self) -> usize {
        self.attacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attacks.is_empty()
    }

    /// Index of the first attack of `kind`
    pub fn first_of_kind(&self, kind: AttackKind) -> Option<usize> {
        self.attacks.iter().position(|attack| attack.kind == kind)
    }

    /// Attack that follows `current` when `requested` continues the combo.
    ///
    /// Light inputs advance along the follow-up chain; anything else (or the
    /// end of the chain) starts the requested attack fresh.
    pub fn next_in_combo(&self, current: usize, requested: usize) -> usize {
        let requested_is_light = self
            .get(requested)
            .is_some_and(|attack| attack.kind == AttackKind::Light);
        if !requested_is_light {
            return requested;
        }
        self.get(current)
            .and_then(|attack| attack.follow_up)
            .unwrap_or(requested)
    }

    /// Reject empty tables and dangling follow-ups
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.attacks.is_empty() {
            return Err(ConfigError::EmptyAttackTable);
        }
        for (index, attack) in self.attacks.iter().enumerate() {
            if let Some(follow_up) = attack.follow_up {
                if follow_up >= self.attacks.len() {
                    return Err(ConfigError::InvalidFollowUp {
                        attack: index,
                        follow_up,
                    });
                }
            }
        }
        Ok(())
    }
}

impl Default for AttackTable {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_table_is_valid() {
        let table = AttackTable::standard();
        assert!(table.validate().is_ok());
        assert_eq!(table.first_of_kind(AttackKind::Light), Some(0));
        assert_eq!(table.first_of_kind(AttackKind::Heavy), Some(3));
        assert_eq!(table.first_of_kind(AttackKind::Dash), Some(4));
    }

    #[test]
    fn test_light_chain_follows_up() {
        let table = AttackTable::standard();
        assert_eq!(table.next_in_combo(0, 0), 1);
        assert_eq!(table.next_in_combo(1, 0), 2);
        // End of chain loops back to the requested opener
        assert_eq!(table.next_in_combo(2, 0), 0);
    }

    #[test]
    fn test_heavy_breaks_chain() {
        let table = AttackTable::standard();
        assert_eq!(table.next_in_combo(1, 3), 3);
    }

    #[test]
    fn test_empty_table_rejected() {
        let table = AttackTable::new(Vec::new());
        assert!(matches!(table.validate(), Err(ConfigError::EmptyAttackTable)));
    }

    #[test]
    fn test_dangling_follow_up_rejected() {
        let table = AttackTable::new(vec![AttackData {
            follow_up: Some(4),
            ..AttackData::default()
        }]);
        assert!(matches!(
            table.validate(),
            Err(ConfigError::InvalidFollowUp {
                attack: 0,
                follow_up: 4
            })
        ));
    }

    #[test]
    fn test_timing_helpers() {
        let attack = AttackData {
            windup: 0.2,
            active: 0.1,
            recovery: 0.3,
            ..AttackData::default()
        };
        assert!((attack.duration() - 0.6).abs() < 1e-6);
        assert!((attack.active_end() - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_raw_damage_scales_with_power() {
        let attack = AttackData {
            damage: 10.0,
            power_scaling: 2.0,
            ..AttackData::default()
        };
        assert_eq!(attack.raw_damage(5.0), 20.0);
    }

    #[test]
    fn test_effects_parse_from_toml() {
        let attack: AttackData = toml::from_str(
            r#"
            name = "Shield Bash"
            kind = "Heavy"
            effects = [
                { type = "Stagger", duration = 0.8 },
                { type = "Status", status = "BlockBroken", duration = 1.0 },
            ]
            "#,
        )
        .expect("attack parses");
        assert_eq!(attack.kind, AttackKind::Heavy);
        assert_eq!(attack.effects.len(), 2);
        assert_eq!(attack.effects[0], TargetEffect::Stagger { duration: 0.8 });
        // Unspecified fields fall back to defaults
        assert_eq!(attack.stamina_cost, AttackData::default().stamina_cost);
    }
}

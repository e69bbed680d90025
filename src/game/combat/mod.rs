// Combat rules
//
// - attack: attack data and the attack table
// - combo: consecutive-hit counter
// - damage: damage payloads and the damage formulas
// - hitbox: swing windows and hostility layers
// - resolver: applying a hit to a character
// - events: notifications raised while fighting
// - ai: enemy combat brain

pub mod ai;
pub mod attack;
pub mod combo;
pub mod damage;
pub mod events;
pub mod hitbox;
pub mod resolver;

pub use ai::{AiCombatBrain, AiConfig, Perception};
pub use attack::{AttackData, AttackKind, AttackTable, TargetEffect};
pub use combo::{ComboCounter, ComboOverflowPolicy};
pub use damage::{block_angle_ok, fall_damage, final_damage, DamageData, DamageType};
pub use events::CombatEvent;
pub use hitbox::{HitWindow, Hitbox, Layers, Team};
pub use resolver::{DamageOutcome, IgnoreReason};

//! Engine-independent souls-like combat core.
//!
//! Characters run a table-driven state machine (attack, combo, block, dodge,
//! jump, stagger, death) on top of health, stamina and poise. The host engine
//! plugs in through the [`engine::Motor`], [`engine::Animator`] and
//! [`engine::SpatialQuery`] seams and drives everything with fixed ticks.

pub mod core;
pub mod engine;
pub mod game;

pub use game::characters::{Character, CharacterId, CharacterManager, StateId};
pub use game::combat::{CombatEvent, DamageData, DamageOutcome, Team};
pub use game::config::CharacterConfig;
pub use game::error::{CombatError, ConfigError, StateMachineError};

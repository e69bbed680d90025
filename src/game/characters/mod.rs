// Character system
//
// This module contains everything related to combatants:
// - Character entity, requests and per-tick simulation
// - Table-driven state machine and the per-state behaviors
// - Character management and hit resolution between characters

pub mod behavior;
pub mod character;
pub mod manager;
pub mod state;
pub mod state_machine;

// Re-export commonly used types
pub use character::{
    Character, CharacterContext, CharacterEvents, CharacterId, Controller, Intent, TargetInfo,
};
pub use manager::CharacterManager;
pub use state::StateId;
pub use state_machine::{Condition, StateHooks, StateMachine, StateMachineConfig, Transition};

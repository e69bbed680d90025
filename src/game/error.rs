// Error types for configuration, state machine requests and combat actions

use std::path::PathBuf;

use thiserror::Error;

use crate::game::characters::state::StateId;
use crate::game::combat::attack::AttackKind;

/// Problems detected while loading or validating character configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("state machine has no states configured")]
    EmptyStateSet,

    #[error("default state {0:?} is not in the configured state set")]
    DefaultStateMissing(StateId),

    #[error("transition {from:?} -> {to:?} references a state outside the configured set")]
    UnknownTransitionState { from: StateId, to: StateId },

    #[error("transition {from:?} -> {to:?} leaves the terminal state")]
    TransitionFromTerminal { from: StateId, to: StateId },

    #[error("attack table is empty")]
    EmptyAttackTable,

    #[error("attack {attack} has follow-up {follow_up} which is out of range")]
    InvalidFollowUp { attack: usize, follow_up: usize },

    #[error("failed to read config file {path}: {error}")]
    Io {
        path: PathBuf,
        #[source]
        error: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Rejected direct state requests
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum StateMachineError {
    #[error("state {0:?} is not in the configured state set")]
    UnknownState(StateId),

    #[error("state machine is in terminal state {0:?}")]
    TerminalState(StateId),

    #[error("state machine has no configured states")]
    Uninitialized,
}

/// Reasons a requested combat action was refused
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum CombatError {
    #[error("character is dead")]
    Dead,

    #[error("no attack with index {0}")]
    UnknownAttack(usize),

    #[error("no {0:?} attack configured")]
    MissingAttackKind(AttackKind),

    #[error("action not allowed in state {0:?}")]
    InvalidState(Option<StateId>),

    #[error("not enough stamina: need {required}, have {available}")]
    InsufficientStamina { required: f32, available: f32 },

    #[error("attack on cooldown for another {remaining:.2}s")]
    OnCooldown { remaining: f32 },

    #[error("not grounded")]
    NotGrounded,
}

impl CombatError {
    /// Whether the same request might succeed on a later tick without any
    /// change in input (used by the press buffer)
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::InvalidState(_)
                | Self::OnCooldown { .. }
                | Self::InsufficientStamina { .. }
                | Self::NotGrounded
        )
    }
}

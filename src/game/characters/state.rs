// Character state identifiers

use serde::{Deserialize, Serialize};

/// The closed set of character states.
///
/// States carry no data of their own; per-state behavior lives in the
/// behavior dispatch and the only per-state storage is the machine's
/// time-in-state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StateId {
    /// Idle or moving on the ground
    Default,
    /// Swinging an attack
    Attacking,
    /// Recovering after a swing, waiting for a follow-up input
    Comboing,
    /// Recovery after the combo window lapsed
    ComboEnding,
    /// Holding block
    Blocking,
    /// Invulnerable dodge burst
    Dodging,
    /// In the air after a jump
    Jumping,
    /// Hit reaction, no input accepted
    Staggered,
    /// Terminal until revived
    Dead,
}

impl StateId {
    pub const ALL: [StateId; 9] = [
        StateId::Default,
        StateId::Attacking,
        StateId::Comboing,
        StateId::ComboEnding,
        StateId::Blocking,
        StateId::Dodging,
        StateId::Jumping,
        StateId::Staggered,
        StateId::Dead,
    ];

    /// Part of an attack sequence
    pub fn is_attacking(&self) -> bool {
        matches!(self, Self::Attacking | Self::Comboing | Self::ComboEnding)
    }

    /// Whether controller input may drive transitions out of this state
    pub fn accepts_input(&self) -> bool {
        !matches!(self, Self::Staggered | Self::Dead)
    }

    /// Whether locomotion input moves the character
    pub fn can_move(&self) -> bool {
        matches!(self, Self::Default | Self::Blocking | Self::Jumping)
    }

    /// No table transition leaves this state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Dead)
    }

    /// Animator trigger fired on entering the state
    pub fn animation_trigger(&self) -> &'static str {
        match self {
            Self::Default => "Idle",
            Self::Attacking => "Attack",
            Self::Comboing => "Combo",
            Self::ComboEnding => "ComboEnd",
            Self::Blocking => "Block",
            Self::Dodging => "Dodge",
            Self::Jumping => "Jump",
            Self::Staggered => "Stagger",
            Self::Dead => "Die",
        }
    }
}

impl Default for StateId {
    fn default() -> Self {
        Self::Default
    }
}

// Combat action definitions

/// Discrete press actions a controller can issue in a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Light attack, continues a combo
    Attack,
    /// Heavy attack, resets the combo
    HeavyAttack,
    /// Gap-closing lunge attack
    DashAttack,
    Dodge,
    Jump,
}

impl Action {
    /// Every press action, in the order buffered presses are retried
    pub const ALL: [Action; 5] = [
        Action::Dodge,
        Action::Jump,
        Action::Attack,
        Action::HeavyAttack,
        Action::DashAttack,
    ];

    /// Whether this action starts an attack
    pub fn is_attack(&self) -> bool {
        matches!(self, Self::Attack | Self::HeavyAttack | Self::DashAttack)
    }
}

// Combat notifications raised by a character

use crate::engine::spatial::EntityId;
use crate::game::characters::state::StateId;

/// Something that happened to a character in combat, delivered to its
/// combat observers in the order it happened
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CombatEvent {
    /// A hit was blocked without health loss
    BlockHit {
        attacker: Option<EntityId>,
        stamina_spent: f32,
    },
    /// Stamina ran out mid-block
    BlockBroken {
        attacker: Option<EntityId>,
        health_lost: f32,
    },
    TookDamage {
        attacker: Option<EntityId>,
        amount: f32,
        remaining: f32,
    },
    Staggered { duration: f32 },
    Died { killer: Option<EntityId> },
    Revived { health: f32 },
    /// Touched the ground after falling
    Landed { fall_speed: f32, damage: f32 },
    /// A state change, for presentation layers that track it
    StateChanged { from: Option<StateId>, to: StateId },
}

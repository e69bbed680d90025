// Per-tick polled controller input

use glam::Vec2;

use super::action::Action;

/// Input polled once per tick, from a player device or an AI brain.
///
/// The core treats these values as opaque; it never owns their source.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InputFrame {
    /// Ground-plane movement axis (x = right, y = forward)
    pub move_axis: Vec2,
    pub attack_pressed: bool,
    pub heavy_attack_pressed: bool,
    pub dash_attack_pressed: bool,
    pub block_held: bool,
    pub dodge_pressed: bool,
    pub jump_pressed: bool,
}

impl InputFrame {
    /// No movement, nothing pressed
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn with_move(mut self, axis: Vec2) -> Self {
        self.move_axis = axis;
        self
    }

    pub fn with_attack(mut self) -> Self {
        self.attack_pressed = true;
        self
    }

    pub fn with_heavy_attack(mut self) -> Self {
        self.heavy_attack_pressed = true;
        self
    }

    pub fn with_dash_attack(mut self) -> Self {
        self.dash_attack_pressed = true;
        self
    }

    pub fn with_block(mut self) -> Self {
        self.block_held = true;
        self
    }

    pub fn with_dodge(mut self) -> Self {
        self.dodge_pressed = true;
        self
    }

    pub fn with_jump(mut self) -> Self {
        self.jump_pressed = true;
        self
    }

    /// Press actions set in this frame
    pub fn pressed_actions(&self) -> Vec<Action> {
        let mut actions = Vec::new();
        if self.attack_pressed {
            actions.push(Action::Attack);
        }
        if self.heavy_attack_pressed {
            actions.push(Action::HeavyAttack);
        }
        if self.dash_attack_pressed {
            actions.push(Action::DashAttack);
        }
        if self.dodge_pressed {
            actions.push(Action::Dodge);
        }
        if self.jump_pressed {
            actions.push(Action::Jump);
        }
        actions
    }

    /// Drop one-shot presses, keep held/continuous values
    pub fn clear_presses(&mut self) {
        self.attack_pressed = false;
        self.heavy_attack_pressed = false;
        self.dash_attack_pressed = false;
        self.dodge_pressed = false;
        self.jump_pressed = false;
    }
}

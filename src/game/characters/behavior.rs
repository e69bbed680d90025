// Per-state behavior and transition conditions
//
// Dispatch is a match over `StateId`, one arm per state for each hook.

use glam::Vec3;
use log::{debug, warn};

use super::character::CharacterContext;
use super::state::StateId;
use super::state_machine::{Condition, StateHooks};
use crate::core::math::lift_xz;
use crate::engine::animator::AnimParam;
use crate::game::attributes::StatusFlags;
use crate::game::combat::attack::AttackKind;
use crate::game::combat::hitbox::HitWindow;

impl StateHooks for CharacterContext {
    fn on_enter(&mut self, state: StateId) {
        match state {
            StateId::Attacking => self.enter_attacking(),
            StateId::Comboing => {
                self.animator.play_trigger(state.animation_trigger());
            }
            StateId::ComboEnding => {
                self.intent.queued_follow_up = None;
                self.current_attack = None;
                self.animator.play_trigger(state.animation_trigger());
            }
            StateId::Blocking => {
                self.status.add(StatusFlags::BLOCKING);
                self.animator.set_parameter("Blocking", AnimParam::Bool(true));
            }
            StateId::Dodging => self.enter_dodging(),
            StateId::Jumping => self.enter_jumping(),
            StateId::Staggered => {
                self.status.add(StatusFlags::STAGGERED);
                self.cancel_attack();
                self.intent = Default::default();
                self.animator.play_trigger(state.animation_trigger());
            }
            StateId::Dead => {
                self.clear_for_death();
                self.animator.play_trigger(state.animation_trigger());
            }
            StateId::Default => {
                self.current_attack = None;
                self.animator.play_trigger(state.animation_trigger());
            }
        }
    }

    fn on_update(&mut self, state: StateId, state_time: f32, _dt: f32) {
        match state {
            StateId::Default => self.locomotion(1.0),
            StateId::Blocking => self.locomotion(self.movement.blocking_move_multiplier),
            StateId::Jumping => self.locomotion(1.0),
            StateId::Attacking => self.update_attacking(state_time),
            StateId::Dodging => {
                if let Some(direction) = self.dodge_direction {
                    let speed = self.movement.dodge_speed;
                    if let Some(motor) = self.motor_mut() {
                        motor.move_in_direction(direction, speed);
                    }
                }
            }
            StateId::Comboing | StateId::ComboEnding | StateId::Staggered | StateId::Dead => {}
        }
    }

    fn on_exit(&mut self, state: StateId) {
        match state {
            StateId::Attacking => {
                self.hitbox.deactivate();
            }
            StateId::Blocking => {
                self.status.remove(StatusFlags::BLOCKING);
                self.animator.set_parameter("Blocking", AnimParam::Bool(false));
            }
            StateId::Dodging => {
                self.status.remove(StatusFlags::IFRAMES);
                self.dodge_direction = None;
            }
            StateId::Staggered => {
                self.status
                    .remove(StatusFlags::STAGGERED | StatusFlags::BLOCK_BROKEN);
                self.attributes.poise.restore_full();
            }
            _ => {}
        }
    }

    fn check(&self, condition: Condition, _state: StateId, state_time: f32) -> bool {
        match condition {
            Condition::AttackRequested => self.intent.pending_attack.is_some(),
            Condition::BlockHeld => self.intent.block_held,
            Condition::BlockReleased => !self.intent.block_held,
            Condition::DodgeRequested => self.intent.dodge.is_some(),
            Condition::JumpRequested => self.intent.jump,
            // No motor means nothing will ever report landing
            Condition::Landed => {
                self.motor.is_none() || (state_time > 0.0 && self.is_grounded())
            }
            Condition::AttackFinished => self
                .current_attack
                .and_then(|index| self.attacks.get(index))
                .map_or(true, |attack| state_time >= attack.duration()),
            Condition::ComboContinued => self.intent.queued_follow_up.is_some_and(|next| {
                state_time <= self.combo_window()
                    && self
                        .attacks
                        .get(next)
                        .is_some_and(|attack| self.attributes.has_stamina(attack.stamina_cost))
            }),
            Condition::ComboWindowExpired => state_time > self.combo_window(),
            Condition::ComboEndFinished => state_time >= self.combat.combo_end_duration,
            Condition::DodgeFinished => {
                self.dodge_direction.is_none() || state_time >= self.movement.dodge_duration
            }
            Condition::StaggerFinished => state_time >= self.stagger_duration,
        }
    }
}

impl CharacterContext {
    /// Combo window of the attack that just finished
    fn combo_window(&self) -> f32 {
        self.current_attack
            .and_then(|index| self.attacks.get(index))
            .map_or(0.0, |attack| attack.combo_window)
    }

    fn enter_attacking(&mut self) {
        let follow_up = self.intent.queued_follow_up.take();
        let requested = follow_up.or(self.intent.pending_attack.take());
        self.swing_opened = false;
        self.current_attack = None;

        let Some(index) = requested else {
            warn!("Character {} entered Attacking without an attack", self.id);
            return;
        };
        let Some(attack) = self.attacks.get(index) else {
            warn!("Character {} requested unknown attack {}", self.id, index);
            return;
        };
        let cost = attack.stamina_cost;
        let kind = attack.kind;
        let trigger = attack.animation_trigger.clone();

        if !self.attributes.use_stamina(cost) {
            debug!("Character {} too tired to swing attack {}", self.id, index);
            return;
        }

        if kind == AttackKind::Heavy {
            self.combo.reset();
        } else if follow_up.is_some() {
            // The state machine already judged the combo window
            self.combo.continue_chain(self.clock);
        } else {
            self.combo.register_attack(self.clock);
        }
        self.current_attack = Some(index);
        self.since_attack_start = 0.0;

        if let Some(target) = self.target.filter(|target| !target.is_dead) {
            if let Some(motor) = self.motor_mut() {
                motor.face_towards(target.direction);
            }
        }

        self.animator.play_trigger(&trigger);
        self.animator
            .set_parameter("ComboCount", AnimParam::Int(self.combo.count() as i32));
    }

    fn update_attacking(&mut self, state_time: f32) {
        let Some(index) = self.current_attack else {
            return;
        };
        let Some(attack) = self.attacks.get(index) else {
            return;
        };
        let (windup, active_end, lunge) = (attack.windup, attack.active_end(), attack.lunge_speed);

        if state_time < windup && lunge > 0.0 {
            let facing = self.facing();
            if let Some(motor) = self.motor_mut() {
                motor.move_in_direction(facing, lunge);
            }
        }

        if !self.swing_opened && state_time >= windup && state_time < active_end {
            self.open_hitbox(index);
        }
        if self.hitbox.is_active() && state_time >= active_end {
            self.hitbox.deactivate();
        }
    }

    /// Open the hitbox for `index` with damage scaled by attack power and
    /// the current combo step
    pub(crate) fn open_hitbox(&mut self, index: usize) {
        let Some(attack) = self.attacks.get(index) else {
            return;
        };
        let multiplier = self.combo.damage_multiplier(&self.combat.combo_multipliers);
        let damage = attack.raw_damage(self.attributes.attack_power()) * multiplier;
        let window = HitWindow::for_attack(index, attack, damage);
        debug!(
            "Character {} hitbox open: {} for {:.1}",
            self.id, attack.name, window.damage
        );
        self.hitbox.activate(window, self.team.hostile_layers());
        self.swing_opened = true;
    }

    /// Interrupt any swing in progress and forget queued follow-ups
    pub(crate) fn cancel_attack(&mut self) {
        self.hitbox.deactivate();
        self.current_attack = None;
        self.swing_opened = false;
        self.intent.queued_follow_up = None;
    }

    /// Drop every transient condition on death
    pub(crate) fn clear_for_death(&mut self) {
        self.cancel_attack();
        self.status.clear();
        self.combo.reset();
        self.intent = Default::default();
        self.dodge_direction = None;
    }

    fn enter_dodging(&mut self) {
        let requested = self.intent.dodge.take().unwrap_or(Vec3::ZERO);
        let planar = Vec3::new(requested.x, 0.0, requested.z);
        let direction = if planar.length_squared() > 1e-6 {
            planar.normalize()
        } else {
            -self.facing()
        };

        if !self.attributes.use_stamina(self.movement.dodge_stamina_cost) {
            debug!("Character {} too tired to dodge", self.id);
            self.dodge_direction = None;
            return;
        }
        self.dodge_direction = Some(direction);
        self.status.add(StatusFlags::IFRAMES);
        self.animator.play_trigger(StateId::Dodging.animation_trigger());
    }

    fn enter_jumping(&mut self) {
        self.intent.jump = false;
        if !self.can_jump() {
            debug!("Character {} lost its footing before jumping", self.id);
            return;
        }
        let impulse = self.movement.jump_impulse;
        if let Some(motor) = self.motor_mut() {
            motor.apply_vertical_impulse(impulse);
        }
        self.jump_available = false;
        self.animator.play_trigger(StateId::Jumping.animation_trigger());
    }

    /// Move by the intent axis at `multiplier` times the move speed, facing
    /// the target when one is locked
    fn locomotion(&mut self, multiplier: f32) {
        let axis = self.intent.move_axis;
        let direction = lift_xz(axis);
        let speed = self.movement.move_speed * axis.length().min(1.0) * multiplier;
        let facing = self
            .target
            .filter(|target| !target.is_dead)
            .map(|target| target.direction)
            .unwrap_or(direction);

        let Some(motor) = self.motor_mut() else {
            return;
        };
        motor.move_in_direction(direction, speed);
        motor.face_towards(facing);
        self.animator.set_parameter("Speed", AnimParam::Float(speed));
    }
}

// Character entity: state machine, attributes, combat state and controller

use glam::{Vec2, Vec3};
use log::{debug, info, warn};

use super::state::StateId;
use super::state_machine::StateMachine;
use crate::core::math::{clamp_move_input, lift_xz};
use crate::engine::animator::{Animator, NullAnimator};
use crate::engine::input::{Action, InputBuffer, InputFrame};
use crate::engine::motor::Motor;
use crate::engine::spatial::EntityId;
use crate::game::attributes::{CharacterAttributes, Status, StatusFlags, ValueChange};
use crate::game::combat::ai::{AiCombatBrain, Perception};
use crate::game::combat::attack::{AttackKind, AttackTable};
use crate::game::combat::combo::ComboCounter;
use crate::game::combat::damage::fall_damage;
use crate::game::combat::events::CombatEvent;
use crate::game::combat::hitbox::{Hitbox, Team};
use crate::game::config::{CharacterConfig, CombatConfig, MovementConfig};
use crate::game::error::{CombatError, StateMachineError};
use crate::game::observer::{ObserverId, ObserverList};

/// Unique identifier for a character
pub type CharacterId = EntityId;

/// Snapshot of the character this one is fighting, refreshed every tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetInfo {
    pub id: CharacterId,
    pub position: Vec3,
    pub distance: f32,
    /// Unit ground-plane direction from this character to the target
    pub direction: Vec3,
    pub is_attacking: bool,
    pub is_blocking: bool,
    pub is_dead: bool,
}

/// Requests gathered from input for the state machine to act on.
///
/// One-shot requests are cleared after every tick whether or not a
/// transition used them.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Intent {
    /// Ground-plane movement with dead zone applied
    pub move_axis: Vec2,
    pub block_held: bool,
    pub pending_attack: Option<usize>,
    /// Follow-up attack queued during a swing or combo window
    pub queued_follow_up: Option<usize>,
    pub dodge: Option<Vec3>,
    pub jump: bool,
}

impl Intent {
    fn clear_requests(&mut self) {
        self.pending_attack = None;
        self.dodge = None;
        self.jump = false;
    }
}

/// Subscribers to character-level events
#[derive(Debug, Default)]
pub struct CharacterEvents {
    /// Receives the killer, if any
    pub death: ObserverList<Option<CharacterId>>,
    /// Receives the health restored
    pub revive: ObserverList<f32>,
    pub combat: ObserverList<CombatEvent>,
}

/// Everything the state behaviors read and write.
///
/// Kept apart from the `StateMachine` so the machine can drive hooks on it
/// without aliasing itself.
#[derive(Debug)]
pub struct CharacterContext {
    pub id: CharacterId,
    pub team: Team,
    pub movement: MovementConfig,
    pub combat: CombatConfig,
    pub attacks: AttackTable,
    pub attributes: CharacterAttributes,
    pub status: Status,
    pub combo: ComboCounter,
    pub hitbox: Hitbox,
    pub intent: Intent,
    pub target: Option<TargetInfo>,
    pub events: CharacterEvents,
    pub(crate) motor: Option<Box<dyn Motor>>,
    pub(crate) animator: Box<dyn Animator>,

    /// Attack being swung in Attacking, and the one whose combo window
    /// Comboing is waiting on
    pub(crate) current_attack: Option<usize>,
    pub(crate) swing_opened: bool,
    /// Direction of the dodge in progress; None when it could not be paid for
    pub(crate) dodge_direction: Option<Vec3>,
    pub(crate) stagger_duration: f32,
    pub(crate) clock: f32,
    pub(crate) since_attack_start: f32,
    pub(crate) air_time: f32,
    pub(crate) jump_available: bool,
    pub(crate) dead: bool,
    motor_warned: bool,
}

impl CharacterContext {
    fn new(
        id: CharacterId,
        team: Team,
        config: &CharacterConfig,
        motor: Option<Box<dyn Motor>>,
    ) -> Self {
        let combat = config.combat.clone();
        Self {
            id,
            team,
            movement: config.movement.clone(),
            combo: ComboCounter::new(combat.combo_window, combat.max_combo, combat.combo_overflow),
            combat,
            attacks: config.attacks.clone(),
            attributes: CharacterAttributes::from_config(&config.stats),
            status: Status::new(),
            hitbox: Hitbox::new(id),
            intent: Intent::default(),
            target: None,
            events: CharacterEvents::default(),
            motor,
            animator: Box::new(NullAnimator),
            current_attack: None,
            swing_opened: false,
            dodge_direction: None,
            stagger_duration: 0.0,
            clock: 0.0,
            // No attack yet, so no cooldown is pending
            since_attack_start: f32::MAX,
            air_time: 0.0,
            jump_available: true,
            dead: false,
            motor_warned: false,
        }
    }

    /// The motor, warning once if the character has none
    pub(crate) fn motor_mut(&mut self) -> Option<&mut (dyn Motor + 'static)> {
        if self.motor.is_none() {
            if !self.motor_warned {
                warn!("Character {} has no motor; movement is skipped", self.id);
                self.motor_warned = true;
            }
            return None;
        }
        self.motor.as_deref_mut()
    }

    pub fn is_grounded(&self) -> bool {
        self.motor.as_ref().is_some_and(|motor| motor.is_grounded())
    }

    pub fn position(&self) -> Vec3 {
        self.motor
            .as_ref()
            .map_or(Vec3::ZERO, |motor| motor.position())
    }

    pub fn facing(&self) -> Vec3 {
        self.motor
            .as_ref()
            .map_or(Vec3::Z, |motor| motor.facing_direction())
    }

    /// Grounded, or airborne for less than the coyote time without having
    /// jumped
    pub fn can_jump(&self) -> bool {
        if self.motor.is_none() {
            return false;
        }
        self.is_grounded()
            || (self.jump_available && self.air_time <= self.movement.coyote_time)
    }

    /// Seconds until a fresh attack is accepted, None when ready.
    ///
    /// The shorter minimal cooldown applies when the target is attacking and
    /// within counter range.
    pub fn cooldown_remaining(&self) -> Option<f32> {
        let since = self.since_attack_start;
        if since >= self.combat.attack_cooldown {
            return None;
        }
        let counter = self.target.is_some_and(|target| {
            target.is_attacking && !target.is_dead && target.distance <= self.combat.counter_range
        });
        if counter && since >= self.combat.minimal_attack_cooldown {
            return None;
        }
        Some(self.combat.attack_cooldown - since)
    }

    pub(crate) fn emit(&mut self, event: CombatEvent) {
        self.events.combat.notify(&event);
    }
}

/// Source of a character's per-tick input
#[derive(Debug)]
pub enum Controller {
    /// Driven by a device; holds the latest polled frame
    Player(InputFrame),
    Ai(Box<AiCombatBrain>),
    /// Only acts on direct requests
    Passive,
}

/// A player- or AI-controlled combatant
#[derive(Debug)]
pub struct Character {
    /// Unique identifier
    pub id: CharacterId,
    /// Character name (for display)
    pub name: String,
    pub(crate) machine: StateMachine,
    pub(crate) ctx: CharacterContext,
    controller: Controller,
    input_buffer: InputBuffer,
}

impl Character {
    /// Create a character. An invalid state table leaves the character with
    /// an inert state machine rather than failing.
    pub fn new(
        id: CharacterId,
        name: &str,
        team: Team,
        config: &CharacterConfig,
        motor: Option<Box<dyn Motor>>,
    ) -> Self {
        let machine = StateMachine::new_or_inert(config.state_machine());
        if let Err(err) = config.attacks.validate() {
            warn!("Character {} has an unusable attack table: {}", name, err);
        }

        let controller = match &config.ai {
            Some(ai) => Controller::Ai(Box::new(AiCombatBrain::new(ai.clone(), u64::from(id)))),
            None => Controller::Passive,
        };

        info!("Spawned character {} ({:?}) with id {}", name, team, id);
        Self {
            id,
            name: name.to_string(),
            machine,
            ctx: CharacterContext::new(id, team, config, motor),
            controller,
            input_buffer: InputBuffer::with_window(config.movement.input_buffer_window),
        }
    }

    /// Replace the animator collaborator
    pub fn with_animator(mut self, animator: Box<dyn Animator>) -> Self {
        self.ctx.animator = animator;
        self
    }

    pub fn with_controller(mut self, controller: Controller) -> Self {
        self.controller = controller;
        self
    }

    pub fn team(&self) -> Team {
        self.ctx.team
    }

    pub fn context(&self) -> &CharacterContext {
        &self.ctx
    }

    pub fn attributes(&self) -> &CharacterAttributes {
        &self.ctx.attributes
    }

    pub fn attributes_mut(&mut self) -> &mut CharacterAttributes {
        &mut self.ctx.attributes
    }

    pub fn status(&self) -> &Status {
        &self.ctx.status
    }

    pub fn hitbox(&self) -> &Hitbox {
        &self.ctx.hitbox
    }

    pub fn combo(&self) -> &ComboCounter {
        &self.ctx.combo
    }

    pub fn state_machine(&self) -> &StateMachine {
        &self.machine
    }

    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    pub fn motor(&self) -> Option<&dyn Motor> {
        self.ctx.motor.as_deref()
    }

    pub fn position(&self) -> Vec3 {
        self.ctx.position()
    }

    pub fn facing(&self) -> Vec3 {
        self.ctx.facing()
    }

    pub fn target(&self) -> Option<TargetInfo> {
        self.ctx.target
    }

    pub fn set_target(&mut self, target: Option<TargetInfo>) {
        self.ctx.target = target;
    }

    /// Feed this tick's device input. Switches the character to player
    /// control.
    pub fn set_input(&mut self, frame: InputFrame) {
        self.controller = Controller::Player(frame);
    }

    // ----- State queries -----

    pub fn get_current_state_id(&self) -> Option<StateId> {
        self.machine.current_state()
    }

    pub fn is_in_state(&self, state: StateId) -> bool {
        self.machine.is_in_state(state)
    }

    pub fn is_in_any_state(&self, states: &[StateId]) -> bool {
        self.machine.is_in_any_state(states)
    }

    pub fn state_time(&self) -> f32 {
        self.machine.state_time()
    }

    pub fn is_dead(&self) -> bool {
        self.ctx.dead
    }

    pub fn is_alive(&self) -> bool {
        !self.ctx.dead
    }

    pub fn is_attacking(&self) -> bool {
        self.machine
            .current_state()
            .is_some_and(|state| state.is_attacking())
    }

    pub fn is_blocking(&self) -> bool {
        self.is_in_state(StateId::Blocking) && self.ctx.status.has(StatusFlags::BLOCKING)
    }

    pub fn is_invulnerable(&self) -> bool {
        self.ctx.status.has(StatusFlags::IFRAMES)
    }

    pub fn can_jump(&self) -> bool {
        self.ctx.can_jump()
    }

    // ----- Requests -----

    /// Request the attack at `index` in the attack table.
    ///
    /// From Default or Blocking this starts a new swing, subject to the
    /// attack cooldown. During a swing (after its windup) or inside the combo
    /// window it queues the follow-up instead.
    pub fn request_attack(&mut self, index: usize) -> Result<(), CombatError> {
        if self.ctx.dead {
            return Err(CombatError::Dead);
        }
        let attack = self
            .ctx
            .attacks
            .get(index)
            .ok_or(CombatError::UnknownAttack(index))?;
        let cost = attack.stamina_cost;
        let state = self.machine.current_state();

        match state {
            Some(StateId::Default | StateId::Blocking) => {
                if let Some(remaining) = self.ctx.cooldown_remaining() {
                    return Err(CombatError::OnCooldown { remaining });
                }
                self.check_stamina(cost)?;
                self.ctx.intent.pending_attack = Some(index);
                Ok(())
            }
            Some(StateId::Attacking | StateId::Comboing) => {
                let current = self.ctx.current_attack.unwrap_or(index);
                let in_windup = state == Some(StateId::Attacking)
                    && self
                        .ctx
                        .attacks
                        .get(current)
                        .is_some_and(|swing| self.machine.state_time() < swing.windup);
                if in_windup {
                    return Err(CombatError::InvalidState(state));
                }
                // Past the window the chain is about to end; keep the press
                // buffered for Default instead
                let window_closed = state == Some(StateId::Comboing)
                    && self
                        .ctx
                        .attacks
                        .get(current)
                        .map_or(true, |swing| self.machine.state_time() > swing.combo_window);
                if window_closed {
                    return Err(CombatError::InvalidState(state));
                }

                let follow_up = self.ctx.attacks.next_in_combo(current, index);
                let follow_up_cost = self
                    .ctx
                    .attacks
                    .get(follow_up)
                    .map_or(cost, |attack| attack.stamina_cost);
                self.check_stamina(follow_up_cost)?;
                self.ctx.intent.queued_follow_up = Some(follow_up);
                Ok(())
            }
            _ => Err(CombatError::InvalidState(state)),
        }
    }

    /// Request the first attack of `kind` in the attack table
    pub fn request_attack_kind(&mut self, kind: AttackKind) -> Result<(), CombatError> {
        let index = self
            .ctx
            .attacks
            .first_of_kind(kind)
            .ok_or(CombatError::MissingAttackKind(kind))?;
        self.request_attack(index)
    }

    /// Hold or release block
    pub fn request_block(&mut self, held: bool) {
        self.ctx.intent.block_held = held && !self.ctx.dead;
    }

    /// Request a dodge towards `direction`; a zero direction dodges backwards
    pub fn request_dodge(&mut self, direction: Vec3) -> Result<(), CombatError> {
        if self.ctx.dead {
            return Err(CombatError::Dead);
        }
        let state = self.machine.current_state();
        let allowed = matches!(
            state,
            Some(StateId::Default | StateId::Blocking | StateId::Comboing | StateId::ComboEnding)
        );
        if !allowed {
            return Err(CombatError::InvalidState(state));
        }
        self.check_stamina(self.ctx.movement.dodge_stamina_cost)?;
        self.ctx.intent.dodge = Some(direction);
        Ok(())
    }

    /// Request a jump. Honored while grounded or within the coyote time
    /// after walking off a ledge.
    pub fn request_jump(&mut self) -> Result<(), CombatError> {
        if self.ctx.dead {
            return Err(CombatError::Dead);
        }
        let state = self.machine.current_state();
        if state != Some(StateId::Default) {
            return Err(CombatError::InvalidState(state));
        }
        if !self.ctx.can_jump() {
            return Err(CombatError::NotGrounded);
        }
        self.ctx.intent.jump = true;
        Ok(())
    }

    /// Switch state directly, bypassing the transition table
    pub fn request_state(&mut self, state: StateId) -> Result<(), StateMachineError> {
        let from = self.machine.current_state();
        self.machine.request_state(state, &mut self.ctx)?;
        self.ctx.emit(CombatEvent::StateChanged { from, to: state });
        Ok(())
    }

    fn check_stamina(&self, cost: f32) -> Result<(), CombatError> {
        if self.ctx.attributes.has_stamina(cost) {
            Ok(())
        } else {
            Err(CombatError::InsufficientStamina {
                required: cost,
                available: self.ctx.attributes.stamina.value(),
            })
        }
    }

    // ----- Lifecycle -----

    /// Enter the Dead state. Death observers run once per life.
    pub fn die(&mut self, killer: Option<CharacterId>) {
        if self.ctx.dead {
            return;
        }
        self.ctx.dead = true;
        info!("{} died", self.name);

        if self.machine.has_state(StateId::Dead) {
            if let Err(err) = self.request_state(StateId::Dead) {
                warn!("{} could not enter Dead: {}", self.name, err);
            }
        } else {
            self.ctx.clear_for_death();
        }

        self.ctx.emit(CombatEvent::Died { killer });
        self.ctx.events.death.notify(&killer);
    }

    /// Bring a dead character back with a fraction of max health and full
    /// stamina. Returns false when the character is not dead.
    pub fn revive(&mut self) -> bool {
        if !self.ctx.dead {
            return false;
        }
        self.ctx.dead = false;

        let fraction = self.ctx.combat.revive_health_fraction.clamp(0.0, 1.0);
        let health = (self.ctx.attributes.health.max() * fraction).max(1.0);
        info!("{} revived with {:.0} health", self.name, health);

        let from = self.machine.current_state();
        match self.machine.reset(&mut self.ctx) {
            Ok(()) => {
                if let Some(to) = self.machine.current_state() {
                    self.ctx.emit(CombatEvent::StateChanged { from, to });
                }
            }
            Err(err) => warn!("{} revived without a state machine: {}", self.name, err),
        }
        self.ctx.status.clear();
        self.ctx.combo.reset();
        self.input_buffer.clear();

        self.ctx.events.revive.notify(&health);
        self.ctx.emit(CombatEvent::Revived { health });
        self.ctx.attributes.health.set_value(health);
        self.ctx.attributes.stamina.restore_full();
        true
    }

    /// Restore health; ignored when dead
    pub fn heal(&mut self, amount: f32) -> Option<ValueChange> {
        if self.ctx.dead {
            return None;
        }
        self.ctx.attributes.heal(amount)
    }

    pub fn level_up(&mut self) {
        self.ctx.attributes.level_up();
    }

    /// Open this character's hitbox for `attack` immediately
    pub fn activate_hitbox(&mut self, attack: usize) -> Result<(), CombatError> {
        if self.ctx.attacks.get(attack).is_none() {
            return Err(CombatError::UnknownAttack(attack));
        }
        self.ctx.open_hitbox(attack);
        Ok(())
    }

    pub fn deactivate_hitbox(&mut self) -> bool {
        self.ctx.hitbox.deactivate()
    }

    /// Record that the open hitbox hit `target`; false if it may not
    pub(crate) fn register_hit(&mut self, target: CharacterId, team: Team, dead: bool) -> bool {
        self.ctx.hitbox.register_hit(target, team.layer(), dead)
    }

    // ----- Subscriptions -----

    pub fn on_health_changed<F>(&mut self, callback: F) -> ObserverId
    where
        F: FnMut(&ValueChange) + 'static,
    {
        self.ctx.attributes.health.observe(callback)
    }

    pub fn on_stamina_changed<F>(&mut self, callback: F) -> ObserverId
    where
        F: FnMut(&ValueChange) + 'static,
    {
        self.ctx.attributes.stamina.observe(callback)
    }

    pub fn on_death<F>(&mut self, callback: F) -> ObserverId
    where
        F: FnMut(&Option<CharacterId>) + 'static,
    {
        self.ctx.events.death.observe(callback)
    }

    pub fn on_revive<F>(&mut self, callback: F) -> ObserverId
    where
        F: FnMut(&f32) + 'static,
    {
        self.ctx.events.revive.observe(callback)
    }

    pub fn on_combat_event<F>(&mut self, callback: F) -> ObserverId
    where
        F: FnMut(&CombatEvent) + 'static,
    {
        self.ctx.events.combat.observe(callback)
    }

    /// Remove a subscription made through any of the `on_*` methods.
    /// Unknown or already removed ids are ignored.
    pub fn remove_observer(&mut self, id: ObserverId) -> bool {
        let events = &mut self.ctx.events;
        let attributes = &mut self.ctx.attributes;
        attributes.health.unobserve(id)
            || attributes.stamina.unobserve(id)
            || attributes.poise.unobserve(id)
            || events.death.unobserve(id)
            || events.revive.unobserve(id)
            || events.combat.unobserve(id)
    }

    // ----- Simulation -----

    /// Advance one simulation tick: timers, grounding, controller input,
    /// state machine, then movement
    pub fn tick(&mut self, dt: f32) {
        let dt = dt.max(0.0);
        self.update_timers(dt);
        self.update_grounding(dt);

        if !self.ctx.dead {
            self.poll_controller(dt);
        }

        let from = self.machine.current_state();
        if let Some(to) = self.machine.tick(dt, &mut self.ctx) {
            self.ctx.emit(CombatEvent::StateChanged { from, to });
        }
        self.ctx.intent.clear_requests();

        if let Some(motor) = self.ctx.motor_mut() {
            motor.apply_movement(dt);
        }
    }

    fn update_timers(&mut self, dt: f32) {
        // A swing or open combo window keeps the chain alive
        let chaining = self
            .machine
            .current_state()
            .is_some_and(|state| matches!(state, StateId::Attacking | StateId::Comboing));
        let ctx = &mut self.ctx;
        ctx.clock += dt;
        ctx.since_attack_start += dt;

        let expired = ctx.status.tick(dt);
        if !expired.is_empty() {
            debug!("Character {} status expired: {:?}", ctx.id, expired);
        }
        ctx.attributes.tick(dt, !ctx.dead);
        if !chaining && ctx.combo.expire(ctx.clock) {
            debug!("Character {} combo dropped", ctx.id);
        }
        self.input_buffer.update(dt);
    }

    fn update_grounding(&mut self, dt: f32) {
        let Some(motor) = self.ctx.motor_mut() else {
            return;
        };
        motor.update_grounding(dt);
        let landing = motor.take_landing_speed();
        let grounded = motor.is_grounded();

        if grounded {
            self.ctx.air_time = 0.0;
            self.ctx.jump_available = true;
        } else {
            self.ctx.air_time += dt;
        }

        if let Some(speed) = landing {
            self.land(speed);
        }
    }

    fn land(&mut self, fall_speed: f32) {
        let movement = &self.ctx.movement;
        let damage = fall_damage(
            fall_speed,
            movement.fall_damage_multiplier,
            movement.min_fall_damage_speed,
        );
        let dealt = match damage {
            Some(amount) if !self.ctx.dead => self.apply_fall_damage(amount),
            _ => 0.0,
        };
        self.ctx.emit(CombatEvent::Landed {
            fall_speed,
            damage: dealt,
        });
    }

    fn poll_controller(&mut self, dt: f32) {
        let frame = match &mut self.controller {
            Controller::Player(frame) => {
                let polled = *frame;
                frame.clear_presses();
                polled
            }
            Controller::Ai(brain) => {
                let perception = Perception {
                    state: self.machine.current_state(),
                    target: self.ctx.target,
                    attack_ready: self.ctx.cooldown_remaining().is_none(),
                };
                brain.think(dt, &perception)
            }
            Controller::Passive => return,
        };
        self.apply_input(&frame);
    }

    /// Route one frame of input through the press buffer into requests
    pub fn apply_input(&mut self, frame: &InputFrame) {
        self.ctx.intent.move_axis = clamp_move_input(frame.move_axis);
        self.request_block(frame.block_held);
        for action in frame.pressed_actions() {
            self.input_buffer.push(action);
        }

        for action in self.input_buffer.pending() {
            let result = match action {
                Action::Attack => self.request_attack_kind(AttackKind::Light),
                Action::HeavyAttack => self.request_attack_kind(AttackKind::Heavy),
                Action::DashAttack => self.request_attack_kind(AttackKind::Dash),
                Action::Dodge => self.request_dodge(lift_xz(self.ctx.intent.move_axis)),
                Action::Jump => self.request_jump(),
            };
            match result {
                Ok(()) => {
                    self.input_buffer.consume(action);
                }
                Err(err) if err.is_transient() => {}
                Err(err) => {
                    debug!("Character {} dropped {:?}: {}", self.id, action, err);
                    self.input_buffer.consume(action);
                }
            }
        }
    }
}

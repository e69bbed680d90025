// Table-driven character state machine
//
// The machine owns only the current state, the time spent in it and the
// transition table. Everything a state does happens through `StateHooks`,
// implemented by the character context, so the machine and the data its
// hooks mutate can be borrowed separately.

use log::{debug, error, warn};
use serde::{Deserialize, Serialize};

use super::state::StateId;
use crate::game::error::{ConfigError, StateMachineError};

/// Predicate evaluated against the character context to decide a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Condition {
    /// An attack request is pending
    AttackRequested,
    BlockHeld,
    BlockReleased,
    DodgeRequested,
    JumpRequested,
    /// Back on the ground after having left it
    Landed,
    /// The current swing has played out
    AttackFinished,
    /// A follow-up attack arrived inside the combo window
    ComboContinued,
    ComboWindowExpired,
    ComboEndFinished,
    DodgeFinished,
    StaggerFinished,
}

/// One row of the transition table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub from: StateId,
    pub to: StateId,
    pub condition: Condition,
}

impl Transition {
    pub const fn new(from: StateId, to: StateId, condition: Condition) -> Self {
        Self {
            from,
            to,
            condition,
        }
    }
}

/// State set and ordered transition table.
///
/// Transitions are scanned in order every tick; the first one whose source
/// matches the current state and whose condition holds is taken.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StateMachineConfig {
    pub default_state: Option<StateId>,
    pub states: Vec<StateId>,
    pub transitions: Vec<Transition>,
}

impl StateMachineConfig {
    /// The souls-like table used when a character config does not supply one
    pub fn standard() -> Self {
        use Condition::*;
        use StateId::*;

        Self {
            default_state: Some(Default),
            states: StateId::ALL.to_vec(),
            transitions: vec![
                Transition::new(Default, Attacking, AttackRequested),
                Transition::new(Default, Dodging, DodgeRequested),
                Transition::new(Default, Jumping, JumpRequested),
                Transition::new(Default, Blocking, BlockHeld),
                Transition::new(Blocking, Attacking, AttackRequested),
                Transition::new(Blocking, Dodging, DodgeRequested),
                Transition::new(Blocking, Default, BlockReleased),
                Transition::new(Attacking, Comboing, AttackFinished),
                Transition::new(Comboing, Attacking, ComboContinued),
                Transition::new(Comboing, Dodging, DodgeRequested),
                Transition::new(Comboing, ComboEnding, ComboWindowExpired),
                Transition::new(ComboEnding, Dodging, DodgeRequested),
                Transition::new(ComboEnding, Default, ComboEndFinished),
                Transition::new(Dodging, Default, DodgeFinished),
                Transition::new(Jumping, Default, Landed),
                Transition::new(Staggered, Default, StaggerFinished),
            ],
        }
    }

    /// Check the configuration and return the initial state.
    ///
    /// A missing default falls back to the first configured state.
    pub fn validate(&self) -> Result<StateId, ConfigError> {
        let Some(&first) = self.states.first() else {
            return Err(ConfigError::EmptyStateSet);
        };

        let initial = match self.default_state {
            Some(state) if self.states.contains(&state) => state,
            Some(state) => return Err(ConfigError::DefaultStateMissing(state)),
            None => {
                warn!("No default state configured, using {:?}", first);
                first
            }
        };

        for transition in &self.transitions {
            if !self.states.contains(&transition.from) || !self.states.contains(&transition.to) {
                return Err(ConfigError::UnknownTransitionState {
                    from: transition.from,
                    to: transition.to,
                });
            }
            if transition.from.is_terminal() {
                return Err(ConfigError::TransitionFromTerminal {
                    from: transition.from,
                    to: transition.to,
                });
            }
        }

        Ok(initial)
    }
}

impl Default for StateMachineConfig {
    fn default() -> Self {
        Self::standard()
    }
}

/// Per-state behavior and condition evaluation, supplied by the owner
pub trait StateHooks {
    fn on_enter(&mut self, state: StateId);
    fn on_update(&mut self, state: StateId, state_time: f32, dt: f32);
    fn on_exit(&mut self, state: StateId);
    fn check(&self, condition: Condition, state: StateId, state_time: f32) -> bool;
}

/// Finite state machine with a configured state set
#[derive(Debug, Clone)]
pub struct StateMachine {
    states: Vec<StateId>,
    transitions: Vec<Transition>,
    initial: Option<StateId>,
    current: Option<StateId>,
    previous: Option<StateId>,
    state_time: f32,
    started: bool,
}

impl StateMachine {
    /// Build a machine from validated configuration. The initial state's
    /// enter hook runs on `start` or the first `tick`.
    pub fn new(config: StateMachineConfig) -> Result<Self, ConfigError> {
        let initial = config.validate()?;
        Ok(Self {
            states: config.states,
            transitions: config.transitions,
            initial: Some(initial),
            current: Some(initial),
            previous: None,
            state_time: 0.0,
            started: false,
        })
    }

    /// Build a machine, degrading to an inert one when the configuration is
    /// invalid
    pub fn new_or_inert(config: StateMachineConfig) -> Self {
        Self::new(config).unwrap_or_else(|err| {
            error!("Invalid state machine configuration: {}", err);
            Self::inert()
        })
    }

    /// A machine with no states. Ticks and requests do nothing.
    pub fn inert() -> Self {
        Self {
            states: Vec::new(),
            transitions: Vec::new(),
            initial: None,
            current: None,
            previous: None,
            state_time: 0.0,
            started: false,
        }
    }

    pub fn is_inert(&self) -> bool {
        self.current.is_none()
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Run the initial state's enter hook. Does nothing if already started.
    pub fn start<H: StateHooks>(&mut self, hooks: &mut H) {
        if self.started {
            return;
        }
        if let Some(state) = self.current {
            self.started = true;
            hooks.on_enter(state);
        }
    }

    /// Advance one tick: take at most one table transition, then advance the
    /// time in state and run the current state's update hook. Returns the new
    /// state when a transition fired.
    pub fn tick<H: StateHooks>(&mut self, dt: f32, hooks: &mut H) -> Option<StateId> {
        let current = self.current?;
        self.start(hooks);

        let next = self
            .transitions
            .iter()
            .find(|t| t.from == current && hooks.check(t.condition, current, self.state_time))
            .map(|t| t.to);

        if let Some(next) = next {
            self.change_state(next, hooks);
        }

        let state = self.current?;
        self.state_time += dt.max(0.0);
        hooks.on_update(state, self.state_time, dt);
        next
    }

    /// Switch directly to `target`, running exit and enter hooks. Requesting
    /// the current state re-enters it. Unknown states and requests made from
    /// the terminal state are rejected and leave the machine unchanged.
    pub fn request_state<H: StateHooks>(
        &mut self,
        target: StateId,
        hooks: &mut H,
    ) -> Result<(), StateMachineError> {
        let Some(current) = self.current else {
            warn!("State {:?} requested on an inert state machine", target);
            return Err(StateMachineError::Uninitialized);
        };
        if !self.states.contains(&target) {
            warn!("Requested state {:?} is not configured", target);
            return Err(StateMachineError::UnknownState(target));
        }
        if current.is_terminal() {
            debug!("Ignoring request for {:?} while {:?}", target, current);
            return Err(StateMachineError::TerminalState(current));
        }

        self.start(hooks);
        self.change_state(target, hooks);
        Ok(())
    }

    /// Out-of-band return to the initial state, allowed from any state
    /// including the terminal one
    pub fn reset<H: StateHooks>(&mut self, hooks: &mut H) -> Result<(), StateMachineError> {
        let initial = self.initial.ok_or(StateMachineError::Uninitialized)?;
        if self.started {
            self.change_state(initial, hooks);
        } else {
            self.current = Some(initial);
            self.state_time = 0.0;
            self.start(hooks);
        }
        Ok(())
    }

    fn change_state<H: StateHooks>(&mut self, next: StateId, hooks: &mut H) {
        if let Some(current) = self.current {
            hooks.on_exit(current);
        }
        self.previous = self.current;
        self.current = Some(next);
        self.state_time = 0.0;
        debug!("State {:?} -> {:?}", self.previous, next);
        hooks.on_enter(next);
    }

    /// Current state, None only for an inert machine
    pub fn current_state(&self) -> Option<StateId> {
        self.current
    }

    pub fn previous_state(&self) -> Option<StateId> {
        self.previous
    }

    pub fn initial_state(&self) -> Option<StateId> {
        self.initial
    }

    /// Time spent in the current state
    pub fn state_time(&self) -> f32 {
        self.state_time
    }

    /// Check if state just changed (no time has passed in it yet)
    pub fn state_just_changed(&self) -> bool {
        self.state_time == 0.0
    }

    pub fn is_in_state(&self, state: StateId) -> bool {
        self.current == Some(state)
    }

    pub fn is_in_any_state(&self, states: &[StateId]) -> bool {
        self.current.is_some_and(|current| states.contains(&current))
    }

    pub fn has_state(&self, state: StateId) -> bool {
        self.states.contains(&state)
    }

    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    /// Hooks that record calls and report a fixed set of conditions as true
    #[derive(Default)]
    struct Recorder {
        calls: Vec<String>,
        active: HashSet<Condition>,
    }

    impl StateHooks for Recorder {
        fn on_enter(&mut self, state: StateId) {
            self.calls.push(format!("enter {:?}", state));
        }

        fn on_update(&mut self, state: StateId, _state_time: f32, _dt: f32) {
            self.calls.push(format!("update {:?}", state));
        }

        fn on_exit(&mut self, state: StateId) {
            self.calls.push(format!("exit {:?}", state));
        }

        fn check(&self, condition: Condition, _state: StateId, _state_time: f32) -> bool {
            self.active.contains(&condition)
        }
    }

    fn machine() -> StateMachine {
        StateMachine::new(StateMachineConfig::standard()).expect("standard config is valid")
    }

    #[test]
    fn test_initial_state() {
        let sm = machine();
        assert_eq!(sm.current_state(), Some(StateId::Default));
        assert!(sm.is_in_state(StateId::Default));
        assert!(!sm.is_started());
    }

    #[test]
    fn test_first_tick_enters_initial_state() {
        let mut sm = machine();
        let mut hooks = Recorder::default();
        sm.tick(0.1, &mut hooks);
        assert_eq!(hooks.calls, vec!["enter Default", "update Default"]);
    }

    #[test]
    fn test_transition_hook_order() {
        let mut sm = machine();
        let mut hooks = Recorder::default();
        sm.start(&mut hooks);
        hooks.calls.clear();

        hooks.active.insert(Condition::DodgeRequested);
        let changed = sm.tick(0.1, &mut hooks);

        assert_eq!(changed, Some(StateId::Dodging));
        assert_eq!(
            hooks.calls,
            vec!["exit Default", "enter Dodging", "update Dodging"]
        );
        assert_eq!(sm.previous_state(), Some(StateId::Default));
    }

    #[test]
    fn test_first_match_wins() {
        let mut sm = machine();
        let mut hooks = Recorder::default();
        // Both hold; Attacking is listed first for Default
        hooks.active.insert(Condition::BlockHeld);
        hooks.active.insert(Condition::AttackRequested);
        sm.tick(0.1, &mut hooks);
        assert!(sm.is_in_state(StateId::Attacking));
    }

    #[test]
    fn test_one_transition_per_tick() {
        let mut sm = machine();
        let mut hooks = Recorder::default();
        // Default -> Attacking and Attacking -> Comboing both hold
        hooks.active.insert(Condition::AttackRequested);
        hooks.active.insert(Condition::AttackFinished);
        sm.tick(0.1, &mut hooks);
        assert!(sm.is_in_state(StateId::Attacking));
        sm.tick(0.1, &mut hooks);
        assert!(sm.is_in_state(StateId::Comboing));
    }

    #[test]
    fn test_state_time_resets_on_change() {
        let mut sm = machine();
        let mut hooks = Recorder::default();
        sm.tick(0.25, &mut hooks);
        sm.tick(0.25, &mut hooks);
        assert!((sm.state_time() - 0.5).abs() < 1e-6);

        sm.request_state(StateId::Blocking, &mut hooks)
            .expect("blocking is configured");
        assert!(sm.state_just_changed());
        sm.tick(0.1, &mut hooks);
        assert!((sm.state_time() - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_unknown_state_request_is_noop() {
        let mut sm = StateMachine::new(StateMachineConfig {
            default_state: Some(StateId::Default),
            states: vec![StateId::Default, StateId::Dead],
            transitions: Vec::new(),
        })
        .expect("config is valid");
        let mut hooks = Recorder::default();
        sm.tick(0.5, &mut hooks);
        hooks.calls.clear();

        let result = sm.request_state(StateId::Jumping, &mut hooks);
        assert_eq!(result, Err(StateMachineError::UnknownState(StateId::Jumping)));
        assert!(sm.is_in_state(StateId::Default));
        assert!((sm.state_time() - 0.5).abs() < 1e-6);
        assert!(hooks.calls.is_empty());
    }

    #[test]
    fn test_dead_is_terminal() {
        let mut sm = machine();
        let mut hooks = Recorder::default();
        sm.request_state(StateId::Dead, &mut hooks)
            .expect("dead is configured");

        let result = sm.request_state(StateId::Default, &mut hooks);
        assert_eq!(result, Err(StateMachineError::TerminalState(StateId::Dead)));

        hooks.active.extend([
            Condition::AttackRequested,
            Condition::DodgeRequested,
            Condition::StaggerFinished,
        ]);
        sm.tick(0.1, &mut hooks);
        assert!(sm.is_in_state(StateId::Dead));
    }

    #[test]
    fn test_reset_leaves_dead() {
        let mut sm = machine();
        let mut hooks = Recorder::default();
        sm.request_state(StateId::Dead, &mut hooks)
            .expect("dead is configured");
        hooks.calls.clear();

        sm.reset(&mut hooks).expect("machine has an initial state");
        assert!(sm.is_in_state(StateId::Default));
        assert_eq!(hooks.calls, vec!["exit Dead", "enter Default"]);
    }

    #[test]
    fn test_request_same_state_reenters() {
        let mut sm = machine();
        let mut hooks = Recorder::default();
        sm.request_state(StateId::Staggered, &mut hooks)
            .expect("staggered is configured");
        sm.tick(0.3, &mut hooks);
        hooks.calls.clear();

        sm.request_state(StateId::Staggered, &mut hooks)
            .expect("re-entering is allowed");
        assert_eq!(hooks.calls, vec!["exit Staggered", "enter Staggered"]);
        assert!(sm.state_just_changed());
    }

    #[test]
    fn test_is_in_any_state() {
        let sm = machine();
        assert!(sm.is_in_any_state(&[StateId::Blocking, StateId::Default]));
        assert!(!sm.is_in_any_state(&[StateId::Blocking, StateId::Dead]));
        assert!(!sm.is_in_any_state(&[]));
    }

    #[test]
    fn test_empty_config_rejected() {
        let config = StateMachineConfig {
            default_state: None,
            states: Vec::new(),
            transitions: Vec::new(),
        };
        assert!(matches!(
            StateMachine::new(config),
            Err(ConfigError::EmptyStateSet)
        ));
    }

    #[test]
    fn test_default_missing_from_set() {
        let config = StateMachineConfig {
            default_state: Some(StateId::Blocking),
            states: vec![StateId::Default],
            transitions: Vec::new(),
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::DefaultStateMissing(StateId::Blocking))
        ));
    }

    #[test]
    fn test_missing_default_uses_first_state() {
        let config = StateMachineConfig {
            default_state: None,
            states: vec![StateId::Blocking, StateId::Default],
            transitions: Vec::new(),
        };
        assert_eq!(config.validate().ok(), Some(StateId::Blocking));
    }

    #[test]
    fn test_transition_to_unknown_state_rejected() {
        let config = StateMachineConfig {
            default_state: Some(StateId::Default),
            states: vec![StateId::Default],
            transitions: vec![Transition::new(
                StateId::Default,
                StateId::Dodging,
                Condition::DodgeRequested,
            )],
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::UnknownTransitionState { .. })
        ));
    }

    #[test]
    fn test_transition_out_of_dead_rejected() {
        let mut config = StateMachineConfig::standard();
        config.transitions.push(Transition::new(
            StateId::Dead,
            StateId::Default,
            Condition::StaggerFinished,
        ));
        assert!(matches!(
            config.validate(),
            Err(ConfigError::TransitionFromTerminal { .. })
        ));
    }

    #[test]
    fn test_inert_machine_is_noop() {
        let mut sm = StateMachine::new_or_inert(StateMachineConfig {
            default_state: None,
            states: Vec::new(),
            transitions: Vec::new(),
        });
        let mut hooks = Recorder::default();
        assert!(sm.is_inert());
        assert_eq!(sm.tick(0.1, &mut hooks), None);
        assert_eq!(
            sm.request_state(StateId::Default, &mut hooks),
            Err(StateMachineError::Uninitialized)
        );
        assert!(sm.reset(&mut hooks).is_err());
        assert!(hooks.calls.is_empty());
        assert_eq!(sm.current_state(), None);
    }
}

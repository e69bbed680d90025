// Animator seam: fire-and-forget presentation calls

use std::cell::RefCell;
use std::rc::Rc;

/// Value written to an animator parameter
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnimParam {
    Float(f32),
    Int(i32),
    Bool(bool),
}

/// Presentation layer driven by the state machine.
///
/// Nothing the animator does feeds back into combat logic.
pub trait Animator: std::fmt::Debug {
    fn play_trigger(&mut self, name: &str);
    fn set_parameter(&mut self, name: &str, value: AnimParam);
}

/// Animator that ignores every call
#[derive(Debug, Default, Clone, Copy)]
pub struct NullAnimator;

impl Animator for NullAnimator {
    fn play_trigger(&mut self, _name: &str) {}
    fn set_parameter(&mut self, _name: &str, _value: AnimParam) {}
}

/// A single recorded animator call
#[derive(Debug, Clone, PartialEq)]
pub enum AnimatorCall {
    Trigger(String),
    Parameter(String, AnimParam),
}

/// Animator that records calls into a shared log.
///
/// Clones share the same log, so a test can keep one clone while the
/// character owns the other.
#[derive(Debug, Default, Clone)]
pub struct RecordingAnimator {
    calls: Rc<RefCell<Vec<AnimatorCall>>>,
}

impl RecordingAnimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// All calls recorded so far
    pub fn calls(&self) -> Vec<AnimatorCall> {
        self.calls.borrow().clone()
    }

    /// Names of the triggers fired so far, in order
    pub fn triggers(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|call| match call {
                AnimatorCall::Trigger(name) => Some(name.clone()),
                AnimatorCall::Parameter(..) => None,
            })
            .collect()
    }

    /// Latest value written to a parameter
    pub fn last_parameter(&self, name: &str) -> Option<AnimParam> {
        self.calls.borrow().iter().rev().find_map(|call| match call {
            AnimatorCall::Parameter(param, value) if param == name => Some(*value),
            _ => None,
        })
    }

    pub fn clear(&self) {
        self.calls.borrow_mut().clear();
    }
}

impl Animator for RecordingAnimator {
    fn play_trigger(&mut self, name: &str) {
        self.calls
            .borrow_mut()
            .push(AnimatorCall::Trigger(name.to_string()));
    }

    fn set_parameter(&mut self, name: &str, value: AnimParam) {
        self.calls
            .borrow_mut()
            .push(AnimatorCall::Parameter(name.to_string(), value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_animator_shares_log() {
        let recorder = RecordingAnimator::new();
        let mut owned: Box<dyn Animator> = Box::new(recorder.clone());

        owned.play_trigger("Attack");
        owned.set_parameter("combo_count", AnimParam::Int(2));
        owned.set_parameter("combo_count", AnimParam::Int(3));

        assert_eq!(recorder.triggers(), vec!["Attack".to_string()]);
        assert_eq!(recorder.last_parameter("combo_count"), Some(AnimParam::Int(3)));
        assert_eq!(recorder.calls().len(), 3);
    }

    #[test]
    fn test_recording_animator_clear() {
        let mut recorder = RecordingAnimator::new();
        recorder.play_trigger("Dodge");
        recorder.clear();
        assert!(recorder.calls().is_empty());
    }

    #[test]
    fn test_null_animator_accepts_calls() {
        let mut animator = NullAnimator;
        animator.play_trigger("Die");
        animator.set_parameter("blocking", AnimParam::Bool(true));
    }
}

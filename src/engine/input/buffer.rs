// Input buffering so early presses are not lost

use super::action::Action;
use std::collections::VecDeque;

/// Maximum number of buffered presses to store
const MAX_BUFFER_SIZE: usize = 8;

/// Default time a press stays buffered (seconds)
pub const DEFAULT_BUFFER_WINDOW: f32 = 0.15;

/// A press waiting to be accepted by the character
#[derive(Debug, Clone, Copy)]
pub struct BufferedInput {
    pub action: Action,
    pub time_remaining: f32,
}

impl BufferedInput {
    pub fn new(action: Action, window: f32) -> Self {
        Self {
            action,
            time_remaining: window,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.time_remaining <= 0.0
    }
}

/// Press buffer for a single character.
///
/// A press made slightly before the character can act on it (during attack
/// recovery, for example) stays here until it is accepted or ages out.
#[derive(Debug)]
pub struct InputBuffer {
    buffer: VecDeque<BufferedInput>,
    window: f32,
}

impl InputBuffer {
    pub fn new() -> Self {
        Self::with_window(DEFAULT_BUFFER_WINDOW)
    }

    /// Create a buffer that keeps presses for `window` seconds
    pub fn with_window(window: f32) -> Self {
        Self {
            buffer: VecDeque::with_capacity(MAX_BUFFER_SIZE),
            window: window.max(0.0),
        }
    }

    /// Buffer a press. Pressing an already-buffered action refreshes it.
    pub fn push(&mut self, action: Action) {
        if let Some(existing) = self.buffer.iter_mut().find(|input| input.action == action) {
            existing.time_remaining = self.window;
            return;
        }

        self.buffer.push_back(BufferedInput::new(action, self.window));
        if self.buffer.len() > MAX_BUFFER_SIZE {
            self.buffer.pop_front();
        }
    }

    pub fn has(&self, action: Action) -> bool {
        self.buffer.iter().any(|input| input.action == action)
    }

    /// Snapshot of buffered actions, oldest first
    pub fn pending(&self) -> Vec<Action> {
        self.buffer.iter().map(|input| input.action).collect()
    }

    /// Remove an action from the buffer. Returns true if it was buffered.
    pub fn consume(&mut self, action: Action) -> bool {
        if let Some(pos) = self.buffer.iter().position(|input| input.action == action) {
            self.buffer.remove(pos);
            true
        } else {
            false
        }
    }

    /// Age every press by `dt` and drop the expired ones
    pub fn update(&mut self, dt: f32) {
        for input in &mut self.buffer {
            input.time_remaining -= dt;
        }
        self.buffer.retain(|input| !input.is_expired());
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

impl Default for InputBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_push_and_has() {
        let mut buffer = InputBuffer::new();
        buffer.push(Action::Jump);
        assert_eq!(buffer.len(), 1);
        assert!(buffer.has(Action::Jump));
        assert!(!buffer.has(Action::Attack));
    }

    #[test]
    fn test_buffer_no_duplicates() {
        let mut buffer = InputBuffer::new();
        buffer.push(Action::Attack);
        buffer.push(Action::Attack);
        assert_eq!(buffer.len(), 1, "Buffer should not contain duplicates");
    }

    #[test]
    fn test_repress_refreshes_window() {
        let mut buffer = InputBuffer::with_window(0.1);
        buffer.push(Action::Attack);
        buffer.update(0.08);
        buffer.push(Action::Attack);
        buffer.update(0.08);
        assert!(buffer.has(Action::Attack));
    }

    #[test]
    fn test_buffer_consume() {
        let mut buffer = InputBuffer::new();
        buffer.push(Action::Dodge);
        assert!(buffer.consume(Action::Dodge));
        assert!(!buffer.consume(Action::Dodge));
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_buffer_expires() {
        let mut buffer = InputBuffer::with_window(0.1);
        buffer.push(Action::Jump);
        buffer.update(0.05);
        assert!(buffer.has(Action::Jump));
        buffer.update(0.06);
        assert!(buffer.is_empty(), "Expired inputs should be removed");
    }

    #[test]
    fn test_pending_order() {
        let mut buffer = InputBuffer::new();
        buffer.push(Action::Attack);
        buffer.push(Action::Dodge);
        assert_eq!(buffer.pending(), vec![Action::Attack, Action::Dodge]);
    }

    #[test]
    fn test_buffer_clear() {
        let mut buffer = InputBuffer::new();
        buffer.push(Action::Jump);
        buffer.push(Action::HeavyAttack);
        buffer.clear();
        assert!(buffer.is_empty());
    }
}

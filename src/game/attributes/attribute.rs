// Clamped numeric attribute with change notification

use crate::game::observer::{ObserverId, ObserverList};

/// Old and new value of an attribute mutation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueChange {
    pub old: f32,
    pub new: f32,
}

impl ValueChange {
    /// Signed change (negative = loss)
    pub fn delta(&self) -> f32 {
        self.new - self.old
    }
}

/// A named quantity such as health, stamina or poise.
///
/// `0 <= value <= max` holds after every mutation. Out-of-range writes are
/// clamped, never rejected.
#[derive(Debug)]
pub struct Attribute {
    name: &'static str,
    value: f32,
    max: f32,
    listeners: ObserverList<ValueChange>,
}

impl Attribute {
    /// Create a full attribute
    pub fn new(name: &'static str, max: f32) -> Self {
        let max = sanitize_max(max);
        Self {
            name,
            value: max,
            max,
            listeners: ObserverList::new(),
        }
    }

    /// Create an attribute with an explicit starting value
    pub fn with_value(name: &'static str, value: f32, max: f32) -> Self {
        let mut attribute = Self::new(name, max);
        attribute.value = clamp_value(value, attribute.value, attribute.max);
        attribute
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn max(&self) -> f32 {
        self.max
    }

    /// Fill ratio in `[0, 1]` (0 when max is 0)
    pub fn ratio(&self) -> f32 {
        if self.max > 0.0 {
            self.value / self.max
        } else {
            0.0
        }
    }

    pub fn is_depleted(&self) -> bool {
        self.value <= 0.0
    }

    pub fn is_full(&self) -> bool {
        self.value >= self.max
    }

    /// Store a new value, clamped to `[0, max]`. Listeners run only when the
    /// stored value actually changes. Returns the change, if any.
    pub fn set_value(&mut self, value: f32) -> Option<ValueChange> {
        let old = self.value;
        let new = clamp_value(value, old, self.max);
        if new == old {
            return None;
        }

        self.value = new;
        let change = ValueChange { old, new };
        self.listeners.notify(&change);
        Some(change)
    }

    /// Add a signed amount (negative to subtract)
    pub fn add(&mut self, delta: f32) -> Option<ValueChange> {
        self.set_value(self.value + delta)
    }

    /// Refill to max
    pub fn restore_full(&mut self) -> Option<ValueChange> {
        self.set_value(self.max)
    }

    /// Raise (or lower, with a negative delta) the ceiling, then re-clamp
    pub fn increase_max(&mut self, delta: f32) -> Option<ValueChange> {
        self.max = sanitize_max(self.max + delta);
        self.set_value(self.value)
    }

    /// Subscribe to value changes
    pub fn observe<F>(&mut self, callback: F) -> ObserverId
    where
        F: FnMut(&ValueChange) + 'static,
    {
        self.listeners.observe(callback)
    }

    /// Unsubscribe. Safe to call more than once.
    pub fn unobserve(&mut self, id: ObserverId) -> bool {
        self.listeners.unobserve(id)
    }
}

fn sanitize_max(max: f32) -> f32 {
    if max.is_finite() {
        max.max(0.0)
    } else {
        0.0
    }
}

fn clamp_value(value: f32, current: f32, max: f32) -> f32 {
    if value.is_nan() {
        current.clamp(0.0, max)
    } else {
        value.clamp(0.0, max)
    }
}

// Combo counting

use serde::{Deserialize, Serialize};

/// What happens when the combo count would exceed the configured maximum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ComboOverflowPolicy {
    /// Start over at 1 and keep chaining
    #[default]
    Wrap,
    /// Stay at the maximum
    Clamp,
}

/// Counts consecutive attacks started within the combo window of each other
#[derive(Debug, Clone)]
pub struct ComboCounter {
    count: u32,
    last_attack_time: Option<f32>,
    window: f32,
    max: u32,
    policy: ComboOverflowPolicy,
}

impl ComboCounter {
    pub fn new(window: f32, max: u32, policy: ComboOverflowPolicy) -> Self {
        Self {
            count: 0,
            last_attack_time: None,
            window: window.max(0.0),
            max: max.max(1),
            policy,
        }
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    pub fn window(&self) -> f32 {
        self.window
    }

    pub fn policy(&self) -> ComboOverflowPolicy {
        self.policy
    }

    pub fn last_attack_time(&self) -> Option<f32> {
        self.last_attack_time
    }

    /// Register an attack starting at time `now` and return the new count
    pub fn register_attack(&mut self, now: f32) -> u32 {
        let chained = self
            .last_attack_time
            .is_some_and(|last| self.count > 0 && now - last <= self.window);

        if !chained {
            self.count = 0;
        }
        self.continue_chain(now)
    }

    /// Register a follow-up that the caller already knows extends the chain,
    /// whatever the time since the last attack
    pub fn continue_chain(&mut self, now: f32) -> u32 {
        self.count = if self.count >= self.max {
            match self.policy {
                ComboOverflowPolicy::Wrap => 1,
                ComboOverflowPolicy::Clamp => self.max,
            }
        } else {
            self.count + 1
        };
        self.last_attack_time = Some(now);
        self.count
    }

    /// Drop the count to 0 once the window has lapsed with no new attack.
    /// Returns true when the combo was dropped by this call.
    pub fn expire(&mut self, now: f32) -> bool {
        match self.last_attack_time {
            Some(last) if self.count > 0 && now - last > self.window => {
                self.count = 0;
                true
            }
            _ => false,
        }
    }

    pub fn reset(&mut self) {
        self.count = 0;
        self.last_attack_time = None;
    }

    /// Damage multiplier for the current combo step. Steps past the end of
    /// `multipliers` reuse the last entry.
    pub fn damage_multiplier(&self, multipliers: &[f32]) -> f32 {
        if self.count == 0 {
            return 1.0;
        }
        let step = (self.count - 1) as usize;
        multipliers
            .get(step)
            .or_else(|| multipliers.last())
            .copied()
            .unwrap_or(1.0)
    }
}

impl Default for ComboCounter {
    fn default() -> Self {
        Self::new(1.0, 3, ComboOverflowPolicy::Wrap)
    }
}

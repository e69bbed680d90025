// Per-character attribute set: health, stamina, poise and derived stats

use log::{debug, info};

use super::attribute::{Attribute, ValueChange};
use crate::game::config::StatsConfig;

/// Max health gained per level
pub const LEVEL_HEALTH_BONUS: f32 = 10.0;
/// Max stamina gained per level
pub const LEVEL_STAMINA_BONUS: f32 = 10.0;
/// Attack power gained per level
pub const LEVEL_ATTACK_BONUS: f32 = 2.0;
/// Defense gained per level
pub const LEVEL_DEFENSE_BONUS: f32 = 1.0;

/// All numeric resources of one character.
///
/// Health never regenerates on its own. Stamina regenerates at a fixed rate
/// once `stamina_regen_delay` seconds pass without any expenditure; every
/// spend restarts that delay. Poise refills in one step after
/// `poise_recovery_delay` seconds without poise damage.
#[derive(Debug)]
pub struct CharacterAttributes {
    pub health: Attribute,
    pub stamina: Attribute,
    pub poise: Attribute,
    attack_power: f32,
    defense: f32,
    level: u32,

    stamina_regen_rate: f32,
    stamina_regen_delay: f32,
    since_stamina_use: f32,

    poise_recovery_delay: f32,
    since_poise_hit: f32,
}

impl CharacterAttributes {
    pub fn from_config(stats: &StatsConfig) -> Self {
        Self {
            health: Attribute::new("health", stats.max_health),
            stamina: Attribute::new("stamina", stats.max_stamina),
            poise: Attribute::new("poise", stats.max_poise),
            attack_power: stats.attack_power.max(0.0),
            defense: stats.defense.max(0.0),
            level: stats.level.max(1),
            stamina_regen_rate: stats.stamina_regen_rate.max(0.0),
            stamina_regen_delay: stats.stamina_regen_delay.max(0.0),
            // Start as if stamina had not been used for a long time
            since_stamina_use: stats.stamina_regen_delay.max(0.0),
            poise_recovery_delay: stats.poise_recovery_delay.max(0.0),
            since_poise_hit: stats.poise_recovery_delay.max(0.0),
        }
    }

    pub fn attack_power(&self) -> f32 {
        self.attack_power
    }

    pub fn defense(&self) -> f32 {
        self.defense
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn is_alive(&self) -> bool {
        !self.health.is_depleted()
    }

    pub fn has_stamina(&self, cost: f32) -> bool {
        self.stamina.value() >= cost
    }

    /// Spend `cost` stamina. Refuses, spending nothing, when the current
    /// stamina is below the cost.
    pub fn use_stamina(&mut self, cost: f32) -> bool {
        if cost <= 0.0 {
            return true;
        }
        if !self.has_stamina(cost) {
            return false;
        }
        self.stamina.add(-cost);
        self.since_stamina_use = 0.0;
        true
    }

    /// Remove stamina unconditionally, bottoming out at zero (blocked hits,
    /// drain effects)
    pub fn drain_stamina(&mut self, amount: f32) -> Option<ValueChange> {
        if amount <= 0.0 {
            return None;
        }
        self.since_stamina_use = 0.0;
        self.stamina.add(-amount)
    }

    /// Whether stamina would regenerate on the next tick
    pub fn is_regenerating_stamina(&self) -> bool {
        self.since_stamina_use >= self.stamina_regen_delay && !self.stamina.is_full()
    }

    /// Advance regeneration timers. Dead characters regenerate nothing.
    pub fn tick(&mut self, dt: f32, alive: bool) {
        self.since_stamina_use += dt;
        self.since_poise_hit += dt;
        if !alive {
            return;
        }

        if self.is_regenerating_stamina() && self.stamina_regen_rate > 0.0 {
            self.stamina.add(self.stamina_regen_rate * dt);
        }

        if self.since_poise_hit >= self.poise_recovery_delay && !self.poise.is_full() {
            self.poise.restore_full();
        }
    }

    /// Apply poise damage. Returns true when poise is broken by this hit,
    /// which takes damage exceeding the poise left; landing exactly on zero
    /// does not break it.
    pub fn damage_poise(&mut self, amount: f32) -> bool {
        if amount <= 0.0 {
            return false;
        }
        self.since_poise_hit = 0.0;
        let before = self.poise.value();
        self.poise.add(-amount);
        amount > before
    }

    /// Restore health. Ignored when dead: only revive brings health back
    /// from zero.
    pub fn heal(&mut self, amount: f32) -> Option<ValueChange> {
        if !self.is_alive() || amount <= 0.0 {
            return None;
        }
        self.health.add(amount)
    }

    pub fn increase_attack_power(&mut self, delta: f32) {
        self.attack_power = (self.attack_power + delta).max(0.0);
        debug!("Attack power now {:.1}", self.attack_power);
    }

    pub fn increase_defense(&mut self, delta: f32) {
        self.defense = (self.defense + delta).max(0.0);
        debug!("Defense now {:.1}", self.defense);
    }

    /// Raise the level and grant the per-level bonuses, then refill health
    /// and stamina
    pub fn level_up(&mut self) {
        self.level += 1;
        self.health.increase_max(LEVEL_HEALTH_BONUS);
        self.stamina.increase_max(LEVEL_STAMINA_BONUS);
        self.attack_power += LEVEL_ATTACK_BONUS;
        self.defense += LEVEL_DEFENSE_BONUS;
        self.health.restore_full();
        self.stamina.restore_full();
        info!(
            "Reached level {} (health {:.0}, stamina {:.0})",
            self.level,
            self.health.max(),
            self.stamina.max()
        );
    }
}

impl Default for CharacterAttributes {
    fn default() -> Self {
        Self::from_config(&StatsConfig::default())
    }
}

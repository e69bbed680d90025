// Damage resolution on the receiving character
//
// Order of checks: dead, invulnerable, successful block, plain hit.

use log::{debug, info};

use super::attack::TargetEffect;
use super::damage::{block_angle_ok, final_damage, DamageData};
use super::events::CombatEvent;
use crate::game::attributes::StatusFlags;
use crate::game::characters::character::Character;
use crate::game::characters::state::StateId;

/// Why a hit was ignored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    Dead,
    Invulnerable,
}

/// What a hit did to its recipient
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DamageOutcome {
    Ignored(IgnoreReason),
    /// Absorbed by a block; only stamina was lost
    Blocked { stamina_spent: f32 },
    /// The block ran out of stamina; part of the hit went through
    BlockBroken { health_lost: f32, killed: bool },
    Damaged {
        health_lost: f32,
        killed: bool,
        staggered: bool,
    },
}

impl DamageOutcome {
    pub fn health_lost(&self) -> f32 {
        match self {
            Self::BlockBroken { health_lost, .. } | Self::Damaged { health_lost, .. } => {
                *health_lost
            }
            Self::Ignored(_) | Self::Blocked { .. } => 0.0,
        }
    }

    pub fn killed(&self) -> bool {
        matches!(
            self,
            Self::BlockBroken { killed: true, .. } | Self::Damaged { killed: true, .. }
        )
    }
}

impl Character {
    /// Resolve an incoming hit against this character
    pub fn take_damage(&mut self, damage: &DamageData) -> DamageOutcome {
        if self.is_dead() {
            return DamageOutcome::Ignored(IgnoreReason::Dead);
        }
        if self.is_invulnerable() {
            debug!("{} ignored a hit during i-frames", self.name);
            return DamageOutcome::Ignored(IgnoreReason::Invulnerable);
        }
        if self.is_blocking() && self.block_holds(damage) {
            return self.resolve_blocked_hit(damage);
        }
        self.resolve_hit(damage)
    }

    /// Whether the attacker is inside the block arc
    fn block_holds(&self, damage: &DamageData) -> bool {
        match damage.direction_to_source(self.position()) {
            Some(to_attacker) => {
                block_angle_ok(self.facing(), to_attacker, self.ctx.combat.max_block_angle)
            }
            None => true,
        }
    }

    fn resolve_blocked_hit(&mut self, damage: &DamageData) -> DamageOutcome {
        let cost = self.ctx.combat.block_stamina_cost;
        let spent = self
            .ctx
            .attributes
            .drain_stamina(cost)
            .map_or(0.0, |change| -change.delta());

        if !self.ctx.attributes.stamina.is_depleted() {
            debug!("{} blocked a hit for {:.1} stamina", self.name, spent);
            self.ctx.emit(CombatEvent::BlockHit {
                attacker: damage.attacker,
                stamina_spent: spent,
            });
            return DamageOutcome::Blocked {
                stamina_spent: spent,
            };
        }

        let through = damage.amount.max(0.0) * self.ctx.combat.block_break_damage_fraction;
        let health_lost = self.lose_health(through);
        info!("{}'s guard broke ({:.1} damage)", self.name, health_lost);
        self.ctx.status.add(StatusFlags::BLOCK_BROKEN);
        self.ctx.emit(CombatEvent::BlockBroken {
            attacker: damage.attacker,
            health_lost,
        });

        if self.ctx.attributes.health.is_depleted() {
            self.die(damage.attacker);
            return DamageOutcome::BlockBroken {
                health_lost,
                killed: true,
            };
        }

        let duration = self.ctx.combat.block_break_stagger;
        self.stagger(duration);
        self.grant_hit_invulnerability();
        DamageOutcome::BlockBroken {
            health_lost,
            killed: false,
        }
    }

    fn resolve_hit(&mut self, damage: &DamageData) -> DamageOutcome {
        let amount = final_damage(damage.amount, self.ctx.attributes.defense());
        let health_lost = self.lose_health(amount);
        let remaining = self.ctx.attributes.health.value();
        debug!(
            "{} took {:.1} damage ({:.1} left)",
            self.name, health_lost, remaining
        );

        if self.ctx.attributes.health.is_depleted() {
            self.ctx.emit(CombatEvent::TookDamage {
                attacker: damage.attacker,
                amount: health_lost,
                remaining,
            });
            self.die(damage.attacker);
            return DamageOutcome::Damaged {
                health_lost,
                killed: true,
                staggered: false,
            };
        }

        let mut stagger = self.apply_effects(&damage.effects);
        if self.ctx.attributes.damage_poise(damage.poise_damage) {
            let combat = &self.ctx.combat;
            let duration =
                combat.base_stagger_duration + damage.poise_damage * combat.stagger_per_poise;
            stagger = Some(stagger.map_or(duration, |forced| forced.max(duration)));
        }

        self.ctx.emit(CombatEvent::TookDamage {
            attacker: damage.attacker,
            amount: health_lost,
            remaining,
        });

        let staggered = stagger.is_some_and(|duration| self.stagger(duration));
        self.grant_hit_invulnerability();
        DamageOutcome::Damaged {
            health_lost,
            killed: false,
            staggered,
        }
    }

    /// Apply attack side effects. Returns a forced stagger duration, if any.
    fn apply_effects(&mut self, effects: &[TargetEffect]) -> Option<f32> {
        let mut stagger: Option<f32> = None;
        for effect in effects {
            match *effect {
                TargetEffect::Stagger { duration } => {
                    stagger = Some(stagger.map_or(duration, |current| current.max(duration)));
                }
                TargetEffect::DrainStamina { amount } => {
                    self.ctx.attributes.drain_stamina(amount);
                }
                TargetEffect::Status { status, duration } => {
                    self.ctx.status.add_timed(status.flag(), duration);
                }
            }
        }
        stagger
    }

    /// Landing damage; bypasses defense, blocking and i-frames
    pub(crate) fn apply_fall_damage(&mut self, amount: f32) -> f32 {
        let health_lost = self.lose_health(amount);
        info!("{} took {:.0} fall damage", self.name, health_lost);
        if self.ctx.attributes.health.is_depleted() {
            self.die(None);
        }
        health_lost
    }

    /// Force a stagger reaction of `duration` seconds. Returns false when the
    /// character cannot be staggered (dead, or no Staggered state).
    pub fn stagger(&mut self, duration: f32) -> bool {
        if self.is_dead() {
            return false;
        }
        self.ctx.stagger_duration = duration.max(0.0);
        match self.request_state(StateId::Staggered) {
            Ok(()) => {
                debug!("{} staggered for {:.2}s", self.name, duration);
                self.ctx.emit(CombatEvent::Staggered { duration });
                true
            }
            Err(err) => {
                debug!("{} could not be staggered: {}", self.name, err);
                false
            }
        }
    }

    fn lose_health(&mut self, amount: f32) -> f32 {
        self.ctx
            .attributes
            .health
            .add(-amount.max(0.0))
            .map_or(0.0, |change| -change.delta())
    }

    fn grant_hit_invulnerability(&mut self) {
        let duration = self.ctx.combat.hit_invulnerability;
        if duration > 0.0 {
            self.ctx.status.add_timed(StatusFlags::IFRAMES, duration);
        }
    }

    /// Build the damage this character's open hitbox deals to a target at
    /// `target_position`
    pub fn outgoing_damage(&self, target_position: glam::Vec3) -> Option<DamageData> {
        let window = self.ctx.hitbox.window()?;
        let origin = self.position();
        let direction = (target_position - origin).normalize_or_zero();
        Some(
            DamageData::new(window.damage)
                .from_attacker(self.id, origin)
                .with_type(window.damage_type)
                .with_poise_damage(window.poise_damage)
                .with_hit(target_position, direction)
                .with_effects(window.effects.clone()),
        )
    }
}

// Attack hitboxes and per-swing hit registration

use std::collections::HashSet;

use bitflags::bitflags;
use glam::Vec3;

use super::attack::{AttackData, TargetEffect};
use super::damage::DamageType;
use crate::engine::spatial::{EntityId, HitVolume};

bitflags! {
    /// Collision layers a hitbox may damage
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct Layers: u8 {
        const PLAYER = 1 << 0;
        const ENEMY  = 1 << 1;
    }
}

/// Side a character fights for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Team {
    Player,
    Enemy,
}

impl Team {
    pub fn layer(self) -> Layers {
        match self {
            Self::Player => Layers::PLAYER,
            Self::Enemy => Layers::ENEMY,
        }
    }

    /// Layers this team's attacks are allowed to hit
    pub fn hostile_layers(self) -> Layers {
        match self {
            Self::Player => Layers::ENEMY,
            Self::Enemy => Layers::PLAYER,
        }
    }

    pub fn is_hostile_to(self, other: Team) -> bool {
        self.hostile_layers().intersects(other.layer())
    }
}

/// What an open hitbox deals, plus the targets it already hit
#[derive(Debug, Clone, PartialEq)]
pub struct HitWindow {
    pub attack: Option<usize>,
    pub damage: f32,
    pub damage_type: DamageType,
    pub poise_damage: f32,
    pub reach: f32,
    pub radius: f32,
    pub multi_hit: bool,
    pub effects: Vec<TargetEffect>,
    hit_targets: HashSet<EntityId>,
}

impl HitWindow {
    pub fn new(damage: f32, damage_type: DamageType) -> Self {
        Self {
            attack: None,
            damage,
            damage_type,
            poise_damage: 0.0,
            reach: 1.0,
            radius: 1.0,
            multi_hit: false,
            effects: Vec::new(),
            hit_targets: HashSet::new(),
        }
    }

    /// Window for the swing of `attack` (table index `index`) dealing `damage`
    pub fn for_attack(index: usize, attack: &AttackData, damage: f32) -> Self {
        Self {
            attack: Some(index),
            poise_damage: attack.poise_damage,
            reach: attack.reach,
            radius: attack.radius,
            multi_hit: attack.multi_hit,
            effects: attack.effects.clone(),
            ..Self::new(damage, attack.damage_type)
        }
    }

    pub fn hit_targets(&self) -> &HashSet<EntityId> {
        &self.hit_targets
    }
}

/// A character's weapon hitbox. Closed until an attack opens it.
#[derive(Debug, Clone)]
pub struct Hitbox {
    owner: EntityId,
    target_layers: Layers,
    window: Option<HitWindow>,
}

impl Hitbox {
    pub fn new(owner: EntityId) -> Self {
        Self {
            owner,
            target_layers: Layers::empty(),
            window: None,
        }
    }

    pub fn owner(&self) -> EntityId {
        self.owner
    }

    pub fn is_active(&self) -> bool {
        self.window.is_some()
    }

    pub fn window(&self) -> Option<&HitWindow> {
        self.window.as_ref()
    }

    pub fn target_layers(&self) -> Layers {
        self.target_layers
    }

    /// Open a new hit window. Reopening replaces the old window and forgets
    /// its hit targets.
    pub fn activate(&mut self, mut window: HitWindow, target_layers: Layers) {
        window.hit_targets.clear();
        self.target_layers = target_layers;
        self.window = Some(window);
    }

    /// Close the window and clear its hit set. Returns whether it was open.
    pub fn deactivate(&mut self) -> bool {
        self.window.take().is_some()
    }

    /// Sphere in front of `position` along `facing` where the swing connects
    pub fn volume(&self, position: Vec3, facing: Vec3) -> Option<HitVolume> {
        let window = self.window.as_ref()?;
        let forward = Vec3::new(facing.x, 0.0, facing.z).normalize_or_zero();
        Some(HitVolume::new(position + forward * window.reach, window.radius))
    }

    /// Whether `target` may be hit right now
    pub fn can_hit(&self, target: EntityId, target_layer: Layers, target_dead: bool) -> bool {
        let Some(window) = &self.window else {
            return false;
        };
        target != self.owner
            && !target_dead
            && self.target_layers.intersects(target_layer)
            && (window.multi_hit || !window.hit_targets.contains(&target))
    }

    /// Record a hit on `target`. Returns false (and records nothing) when the
    /// hit is not allowed.
    pub fn register_hit(
        &mut self,
        target: EntityId,
        target_layer: Layers,
        target_dead: bool,
    ) -> bool {
        if !self.can_hit(target, target_layer, target_dead) {
            return false;
        }
        if let Some(window) = &mut self.window {
            window.hit_targets.insert(target);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_hitbox(multi_hit: bool) -> Hitbox {
        let mut hitbox = Hitbox::new(1);
        let window = HitWindow {
            multi_hit,
            ..HitWindow::new(10.0, DamageType::Physical)
        };
        hitbox.activate(window, Layers::ENEMY);
        hitbox
    }

    #[test]
    fn test_closed_hitbox_hits_nothing() {
        let mut hitbox = Hitbox::new(1);
        assert!(!hitbox.register_hit(2, Layers::ENEMY, false));
        assert!(hitbox.volume(Vec3::ZERO, Vec3::Z).is_none());
    }

    #[test]
    fn test_single_hit_per_window() {
        let mut hitbox = open_hitbox(false);
        assert!(hitbox.register_hit(2, Layers::ENEMY, false));
        assert!(!hitbox.register_hit(2, Layers::ENEMY, false));
        assert!(hitbox.register_hit(3, Layers::ENEMY, false));
    }

    #[test]
    fn test_multi_hit_allows_repeats() {
        let mut hitbox = open_hitbox(true);
        assert!(hitbox.register_hit(2, Layers::ENEMY, false));
        assert!(hitbox.register_hit(2, Layers::ENEMY, false));
    }

    #[test]
    fn test_rejects_owner_dead_and_friendly() {
        let mut hitbox = open_hitbox(false);
        assert!(!hitbox.register_hit(1, Layers::ENEMY, false));
        assert!(!hitbox.register_hit(2, Layers::ENEMY, true));
        assert!(!hitbox.register_hit(2, Layers::PLAYER, false));
    }

    #[test]
    fn test_deactivate_clears_hit_set() {
        let mut hitbox = open_hitbox(false);
        hitbox.register_hit(2, Layers::ENEMY, false);
        assert!(hitbox.deactivate());
        assert!(!hitbox.deactivate());

        hitbox.activate(HitWindow::new(10.0, DamageType::Physical), Layers::ENEMY);
        assert!(hitbox.register_hit(2, Layers::ENEMY, false));
    }

    #[test]
    fn test_volume_in_front() {
        let hitbox = open_hitbox(false);
        let volume = hitbox
            .volume(Vec3::new(1.0, 0.0, 1.0), Vec3::new(0.0, 0.0, 2.0))
            .expect("open hitbox has a volume");
        assert_eq!(volume.center, Vec3::new(1.0, 0.0, 2.0));
    }

    #[test]
    fn test_window_for_attack_copies_swing_data() {
        let attack = AttackData {
            reach: 1.5,
            radius: 0.75,
            poise_damage: 12.0,
            multi_hit: true,
            damage_type: DamageType::Fire,
            effects: vec![TargetEffect::DrainStamina { amount: 5.0 }],
            ..AttackData::default()
        };
        let window = HitWindow::for_attack(2, &attack, 18.0);
        assert_eq!(window.attack, Some(2));
        assert_eq!(window.damage, 18.0);
        assert_eq!(window.damage_type, DamageType::Fire);
        assert_eq!(window.poise_damage, 12.0);
        assert_eq!((window.reach, window.radius), (1.5, 0.75));
        assert!(window.multi_hit);
        assert_eq!(window.effects, attack.effects);
        assert!(window.hit_targets().is_empty());
    }

    #[test]
    fn test_team_hostility() {
        assert!(Team::Player.is_hostile_to(Team::Enemy));
        assert!(!Team::Enemy.is_hostile_to(Team::Enemy));
    }
}

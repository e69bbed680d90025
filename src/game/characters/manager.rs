// Character management and hit resolution between characters

use glam::Vec3;
use log::{debug, info};

use super::character::{Character, CharacterId, TargetInfo};
use crate::core::math::{flatten_xz, lift_xz};
use crate::engine::input::InputFrame;
use crate::engine::motor::Motor;
use crate::engine::spatial::{EntityId, HitVolume, SpatialQuery};
use crate::game::combat::hitbox::Team;
use crate::game::combat::resolver::DamageOutcome;
use crate::game::config::CharacterConfig;

/// A hit found during overlap testing, applied after every swing was checked
#[derive(Debug, Clone, Copy)]
struct PendingHit {
    attacker: CharacterId,
    target: CharacterId,
    target_team: Team,
    target_position: Vec3,
}

/// Owns every character and runs them in spawn order
#[derive(Debug, Default)]
pub struct CharacterManager {
    characters: Vec<Character>,
    next_id: CharacterId,
}

impl CharacterManager {
    pub fn new() -> Self {
        Self {
            characters: Vec::new(),
            next_id: 0,
        }
    }

    /// Spawn a new character
    pub fn spawn_character(
        &mut self,
        name: &str,
        team: Team,
        config: &CharacterConfig,
        motor: Option<Box<dyn Motor>>,
    ) -> CharacterId {
        let id = self.next_id;
        self.next_id += 1;

        let character = Character::new(id, name, team, config, motor);
        self.characters.push(character);

        id
    }

    /// Add an already built character. Its id must be unused.
    pub fn insert(&mut self, character: Character) -> Option<CharacterId> {
        if self.get(character.id).is_some() {
            return None;
        }
        let id = character.id;
        self.next_id = self.next_id.max(id + 1);
        self.characters.push(character);
        Some(id)
    }

    /// Get a character by ID
    pub fn get(&self, id: CharacterId) -> Option<&Character> {
        self.characters.iter().find(|c| c.id == id)
    }

    /// Get a mutable character by ID
    pub fn get_mut(&mut self, id: CharacterId) -> Option<&mut Character> {
        self.characters.iter_mut().find(|c| c.id == id)
    }

    /// Get all characters
    pub fn all(&self) -> &[Character] {
        &self.characters
    }

    /// Get all characters mutably
    pub fn all_mut(&mut self) -> &mut [Character] {
        &mut self.characters
    }

    /// Remove a character by ID
    pub fn remove(&mut self, id: CharacterId) -> Option<Character> {
        let pos = self.characters.iter().position(|c| c.id == id)?;
        Some(self.characters.remove(pos))
    }

    /// Get the number of characters
    pub fn count(&self) -> usize {
        self.characters.len()
    }

    /// Get the number of alive characters
    pub fn alive_count(&self) -> usize {
        self.characters.iter().filter(|c| c.is_alive()).count()
    }

    /// Number of living characters on `team`
    pub fn alive_on_team(&self, team: Team) -> usize {
        self.characters
            .iter()
            .filter(|c| c.is_alive() && c.team() == team)
            .count()
    }

    /// Feed a frame of device input to a character
    pub fn set_input(&mut self, id: CharacterId, frame: InputFrame) -> bool {
        match self.get_mut(id) {
            Some(character) => {
                character.set_input(frame);
                true
            }
            None => false,
        }
    }

    /// Update all characters: targets, then each character's tick, then hits
    pub fn tick(&mut self, dt: f32) -> Vec<(CharacterId, DamageOutcome)> {
        self.refresh_targets();
        for character in &mut self.characters {
            character.tick(dt);
        }
        self.resolve_hits()
    }

    /// Point every character at its nearest living hostile
    pub fn refresh_targets(&mut self) {
        let targets: Vec<Option<TargetInfo>> = self
            .characters
            .iter()
            .map(|character| self.nearest_hostile(character))
            .collect();

        for (character, target) in self.characters.iter_mut().zip(targets) {
            let previous = character.target().map(|t| t.id);
            if previous != target.map(|t| t.id) {
                debug!(
                    "{} now targets {:?}",
                    character.name,
                    target.map(|t| t.id)
                );
            }
            character.set_target(target);
        }
    }

    fn nearest_hostile(&self, from: &Character) -> Option<TargetInfo> {
        let origin = from.position();
        self.characters
            .iter()
            .filter(|other| other.is_alive() && from.team().is_hostile_to(other.team()))
            .map(|other| describe_target(origin, other))
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }

    /// Test every open hitbox against the other characters and apply the
    /// resulting damage. Returns the outcome for each target hit.
    pub fn resolve_hits(&mut self) -> Vec<(CharacterId, DamageOutcome)> {
        let mut pending = Vec::new();
        for attacker in &self.characters {
            if attacker.is_dead() {
                continue;
            }
            let Some(volume) = attacker
                .hitbox()
                .volume(attacker.position(), attacker.facing())
            else {
                continue;
            };
            for id in self.find_candidate_targets(&volume) {
                let Some(target) = self.get(id) else {
                    continue;
                };
                if attacker
                    .hitbox()
                    .can_hit(id, target.team().layer(), target.is_dead())
                {
                    pending.push(PendingHit {
                        attacker: attacker.id,
                        target: id,
                        target_team: target.team(),
                        target_position: target.position(),
                    });
                }
            }
        }

        let mut outcomes = Vec::with_capacity(pending.len());
        for hit in pending {
            let target_dead = self.get(hit.target).map_or(true, |t| t.is_dead());
            let Some(attacker) = self.get_mut(hit.attacker) else {
                continue;
            };
            // An earlier hit this tick may have interrupted the swing
            if !attacker.register_hit(hit.target, hit.target_team, target_dead) {
                continue;
            }
            let Some(damage) = attacker.outgoing_damage(hit.target_position) else {
                continue;
            };
            let attacker_name = attacker.name.clone();

            let Some(target) = self.get_mut(hit.target) else {
                continue;
            };
            let outcome = target.take_damage(&damage);
            debug!("{} hit {}: {:?}", attacker_name, target.name, outcome);
            if outcome.killed() {
                info!("{} was slain by {}", target.name, attacker_name);
            }
            outcomes.push((hit.target, outcome));
        }
        outcomes
    }
}

impl SpatialQuery for CharacterManager {
    fn find_candidate_targets(&self, volume: &HitVolume) -> Vec<EntityId> {
        self.characters
            .iter()
            .filter(|c| volume.overlaps(c.position(), c.context().movement.body_radius))
            .map(|c| c.id)
            .collect()
    }
}

fn describe_target(origin: Vec3, other: &Character) -> TargetInfo {
    let position = other.position();
    let offset = flatten_xz(position - origin);
    TargetInfo {
        id: other.id,
        position,
        distance: offset.length(),
        direction: lift_xz(offset.normalize_or_zero()),
        is_attacking: other.is_attacking(),
        is_blocking: other.is_blocking(),
        is_dead: other.is_dead(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::motor::KinematicMotor;
    use crate::game::characters::state::StateId;
    use crate::game::config::StatsConfig;

    const DT: f32 = 1.0 / 60.0;

    fn config() -> CharacterConfig {
        CharacterConfig {
            stats: StatsConfig {
                defense: 0.0,
                max_poise: 1000.0,
                ..StatsConfig::default()
            },
            ..CharacterConfig::default()
        }
    }

    fn spawn(manager: &mut CharacterManager, name: &str, team: Team, at: Vec3) -> CharacterId {
        let motor = KinematicMotor::new(at).with_facing(Vec3::Z);
        manager.spawn_character(name, team, &config(), Some(Box::new(motor)))
    }

    fn run(manager: &mut CharacterManager, seconds: f32) -> Vec<(CharacterId, DamageOutcome)> {
        let ticks = (seconds / DT).round() as usize;
        let mut outcomes = Vec::new();
        for _ in 0..ticks {
            outcomes.extend(manager.tick(DT));
        }
        outcomes
    }

    #[test]
    fn test_character_manager_new() {
        let manager = CharacterManager::new();
        assert_eq!(manager.count(), 0);
        assert_eq!(manager.alive_count(), 0);
    }

    #[test]
    fn test_spawn_get_remove() {
        let mut manager = CharacterManager::new();
        let a = spawn(&mut manager, "A", Team::Player, Vec3::ZERO);
        let b = spawn(&mut manager, "B", Team::Enemy, Vec3::Z);
        assert_ne!(a, b);
        assert_eq!(manager.count(), 2);
        assert_eq!(manager.get(b).map(|c| c.name.as_str()), Some("B"));

        assert!(manager.remove(a).is_some());
        assert!(manager.remove(a).is_none());
        assert!(manager.get(a).is_none());
        assert_eq!(manager.count(), 1);
    }

    #[test]
    fn test_insert_rejects_duplicate_id() {
        let mut manager = CharacterManager::new();
        let id = spawn(&mut manager, "A", Team::Player, Vec3::ZERO);
        let clash = Character::new(id, "Clash", Team::Enemy, &config(), None);
        assert_eq!(manager.insert(clash), None);

        let fresh = Character::new(10, "Fresh", Team::Enemy, &config(), None);
        assert_eq!(manager.insert(fresh), Some(10));
        let next = spawn(&mut manager, "Next", Team::Enemy, Vec3::ZERO);
        assert_eq!(next, 11);
    }

    #[test]
    fn test_targets_nearest_hostile() {
        let mut manager = CharacterManager::new();
        let hero = spawn(&mut manager, "Hero", Team::Player, Vec3::ZERO);
        let ally = spawn(&mut manager, "Ally", Team::Player, Vec3::new(0.5, 0.0, 0.0));
        let near = spawn(&mut manager, "Near", Team::Enemy, Vec3::new(0.0, 0.0, 3.0));
        spawn(&mut manager, "Far", Team::Enemy, Vec3::new(0.0, 0.0, -8.0));

        manager.refresh_targets();
        let target = manager.get(hero).and_then(|c| c.target()).expect("target");
        assert_eq!(target.id, near);
        assert!((target.distance - 3.0).abs() < 1e-5);
        assert!((target.direction - Vec3::Z).length() < 1e-5);

        let enemy_target = manager.get(near).and_then(|c| c.target()).expect("target");
        assert_eq!(enemy_target.id, hero);
        assert_ne!(enemy_target.id, ally);
    }

    #[test]
    fn test_swing_hits_once() {
        let mut manager = CharacterManager::new();
        let hero = spawn(&mut manager, "Hero", Team::Player, Vec3::ZERO);
        let foe = spawn(&mut manager, "Foe", Team::Enemy, Vec3::new(0.0, 0.0, 1.5));
        manager.tick(DT);

        manager
            .get_mut(hero)
            .expect("hero")
            .request_attack(0)
            .expect("attack accepted");
        let outcomes = run(&mut manager, 0.6);

        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].0, foe);
        assert_eq!(outcomes[0].1.health_lost(), 20.0);
        assert_eq!(
            manager.get(foe).expect("foe").attributes().health.value(),
            80.0
        );
    }

    #[test]
    fn test_out_of_reach_misses() {
        let mut manager = CharacterManager::new();
        let hero = spawn(&mut manager, "Hero", Team::Player, Vec3::ZERO);
        let foe = spawn(&mut manager, "Foe", Team::Enemy, Vec3::new(0.0, 0.0, 4.0));
        manager.tick(DT);

        manager
            .get_mut(hero)
            .expect("hero")
            .request_attack(0)
            .expect("attack accepted");
        assert!(run(&mut manager, 0.6).is_empty());
        assert!(manager.get(foe).expect("foe").attributes().health.is_full());
    }

    #[test]
    fn test_no_friendly_fire() {
        let mut manager = CharacterManager::new();
        let hero = spawn(&mut manager, "Hero", Team::Player, Vec3::ZERO);
        let ally = spawn(&mut manager, "Ally", Team::Player, Vec3::new(0.0, 0.0, 1.0));
        manager.tick(DT);

        manager
            .get_mut(hero)
            .expect("hero")
            .request_attack(0)
            .expect("attack accepted");
        assert!(run(&mut manager, 0.6).is_empty());
        assert!(manager.get(ally).expect("ally").attributes().health.is_full());
    }

    #[test]
    fn test_kill_and_alive_counts() {
        let mut manager = CharacterManager::new();
        let hero = spawn(&mut manager, "Hero", Team::Player, Vec3::ZERO);
        let foe = spawn(&mut manager, "Foe", Team::Enemy, Vec3::new(0.0, 0.0, 1.5));
        manager.tick(DT);
        manager
            .get_mut(foe)
            .expect("foe")
            .attributes_mut()
            .health
            .set_value(5.0);

        manager
            .get_mut(hero)
            .expect("hero")
            .request_attack(0)
            .expect("attack accepted");
        let outcomes = run(&mut manager, 0.6);
        assert!(outcomes[0].1.killed());

        let foe = manager.get(foe).expect("foe");
        assert!(foe.is_dead());
        assert!(foe.is_in_state(StateId::Dead));
        assert_eq!(manager.alive_count(), 1);
        assert_eq!(manager.alive_on_team(Team::Enemy), 0);

        manager.refresh_targets();
        assert!(manager.get(hero).expect("hero").target().is_none());
    }

    #[test]
    fn test_spatial_query_uses_body_radius() {
        let mut manager = CharacterManager::new();
        let near = spawn(&mut manager, "Near", Team::Enemy, Vec3::new(1.4, 0.0, 0.0));
        spawn(&mut manager, "Far", Team::Enemy, Vec3::new(1.6, 0.0, 0.0));

        let found = manager.find_candidate_targets(&HitVolume::new(Vec3::ZERO, 1.0));
        assert_eq!(found, vec![near]);
    }

    #[test]
    fn test_set_input_unknown_id() {
        let mut manager = CharacterManager::new();
        assert!(!manager.set_input(3, InputFrame::default()));
    }
}

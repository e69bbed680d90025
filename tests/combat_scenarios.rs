// End-to-end combat scenarios driven through the public character API

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec3;
use rusted_souls::engine::KinematicMotor;
use rusted_souls::game::attributes::{StatusFlags, ValueChange};
use rusted_souls::game::characters::{Character, CharacterManager, StateId};
use rusted_souls::game::combat::{
    ComboCounter, ComboOverflowPolicy, DamageData, DamageOutcome, IgnoreReason, Team,
};
use rusted_souls::game::config::{CharacterConfig, StatsConfig};
use rusted_souls::game::error::CombatError;

const DT: f32 = 1.0 / 60.0;

fn config(defense: f32) -> CharacterConfig {
    CharacterConfig {
        stats: StatsConfig {
            defense,
            max_poise: 1000.0,
            ..StatsConfig::default()
        },
        ..CharacterConfig::default()
    }
}

fn character_with(config: &CharacterConfig, motor: KinematicMotor) -> Character {
    let mut character = Character::new(1, "Subject", Team::Player, config, Some(Box::new(motor)));
    character.tick(DT);
    character
}

fn character(defense: f32) -> Character {
    character_with(
        &config(defense),
        KinematicMotor::new(Vec3::ZERO).with_facing(Vec3::Z),
    )
}

fn run(character: &mut Character, ticks: usize) {
    for _ in 0..ticks {
        character.tick(DT);
    }
}

#[test]
fn damage_then_death_fires_once() {
    let mut subject = character(0.0);
    let changes: Rc<RefCell<Vec<ValueChange>>> = Rc::default();
    let deaths = Rc::new(RefCell::new(0));

    let sink = Rc::clone(&changes);
    subject.on_health_changed(move |change| sink.borrow_mut().push(*change));
    let counter = Rc::clone(&deaths);
    subject.on_death(move |_| *counter.borrow_mut() += 1);

    subject.take_damage(&DamageData::new(30.0));
    assert_eq!(subject.attributes().health.value(), 70.0);
    {
        let changes = changes.borrow();
        assert_eq!(changes.len(), 1);
        assert_eq!((changes[0].old, changes[0].new), (100.0, 70.0));
    }

    let outcome = subject.take_damage(&DamageData::new(100.0));
    assert!(outcome.killed());
    assert_eq!(subject.attributes().health.value(), 0.0);
    assert!(subject.is_in_state(StateId::Dead));

    let late = subject.take_damage(&DamageData::new(50.0));
    assert_eq!(late, DamageOutcome::Ignored(IgnoreReason::Dead));
    assert_eq!(*deaths.borrow(), 1);
    assert_eq!(changes.borrow().len(), 2);
}

#[test]
fn damage_never_below_one() {
    let mut subject = character(5.0);
    let outcome = subject.take_damage(&DamageData::new(2.0));
    assert_eq!(outcome.health_lost(), 1.0);
    assert_eq!(subject.attributes().health.value(), 99.0);
}

#[test]
fn block_spends_stamina_then_breaks() {
    let mut cheap = config(0.0);
    cheap.combat.block_stamina_cost = 10.0;
    let mut subject = character_with(&cheap, KinematicMotor::new(Vec3::ZERO));
    subject.request_block(true);
    run(&mut subject, 1);
    assert!(subject.is_blocking());

    let hit = DamageData::new(40.0).from_attacker(7, Vec3::new(0.0, 0.0, 2.0));
    let outcome = subject.take_damage(&hit);
    assert_eq!(outcome, DamageOutcome::Blocked { stamina_spent: 10.0 });
    assert_eq!(subject.attributes().stamina.value(), 90.0);
    assert_eq!(subject.attributes().health.value(), 100.0);

    let mut costly = config(0.0);
    costly.combat.block_stamina_cost = 95.0;
    let mut subject = character_with(&costly, KinematicMotor::new(Vec3::ZERO));
    subject.request_block(true);
    run(&mut subject, 1);

    let first = subject.take_damage(&hit);
    assert_eq!(first, DamageOutcome::Blocked { stamina_spent: 95.0 });
    assert_eq!(subject.attributes().health.value(), 100.0);

    let second = subject.take_damage(&hit);
    assert_eq!(
        second,
        DamageOutcome::BlockBroken {
            health_lost: 10.0,
            killed: false
        }
    );
    assert!(subject.attributes().stamina.value() <= 0.0);
    assert_eq!(subject.attributes().health.value(), 90.0);
    assert!(subject.is_in_state(StateId::Staggered));
    assert!(subject.status().has(StatusFlags::BLOCK_BROKEN));
}

#[test]
fn coyote_time_honors_late_jump() {
    let ledge = || KinematicMotor::new(Vec3::ZERO).with_floor(None);

    // First tick walks off the ledge; each further tick is airborne time
    let mut late_but_fine = character_with(&config(0.0), ledge());
    run(&mut late_but_fine, (0.05 / DT).round() as usize);
    assert!(late_but_fine.can_jump());
    assert_eq!(late_but_fine.request_jump(), Ok(()));
    run(&mut late_but_fine, 1);
    assert!(late_but_fine.is_in_state(StateId::Jumping));

    let mut too_late = character_with(&config(0.0), ledge());
    run(&mut too_late, (0.2 / DT).round() as usize);
    assert_eq!(too_late.request_jump(), Err(CombatError::NotGrounded));
    assert!(too_late.is_in_state(StateId::Default));
}

#[test]
fn combo_window_chains_or_resets() {
    let mut counter = ComboCounter::new(1.0, 3, ComboOverflowPolicy::Wrap);
    assert_eq!(counter.register_attack(0.0), 1);
    assert_eq!(counter.register_attack(0.9), 2);

    let mut counter = ComboCounter::new(1.0, 3, ComboOverflowPolicy::Wrap);
    assert_eq!(counter.register_attack(0.0), 1);
    assert_eq!(counter.register_attack(1.1), 1);
}

#[test]
fn late_follow_up_keeps_combo_count() {
    let mut hollow = CharacterConfig::from_toml_str(include_str!("../data/enemy.toml"))
        .expect("enemy.toml parses");
    hollow.ai = None;
    let mut subject = character_with(&hollow, KinematicMotor::new(Vec3::ZERO));

    subject.request_attack(0).expect("slash accepted");
    run(&mut subject, 1);
    assert!(subject.is_in_state(StateId::Attacking));
    assert_eq!(subject.combo().count(), 1);

    // Late in the combo window, more than a second after the slash started
    run(&mut subject, 63);
    assert!(subject.is_in_state(StateId::Comboing));
    assert_eq!(subject.request_attack(0), Ok(()));
    run(&mut subject, 1);
    assert!(subject.is_in_state(StateId::Attacking));
    assert_eq!(subject.combo().count(), 2);

    // Second step of the chain uses the second multiplier: (10 + 8) * 1.25
    run(&mut subject, 15);
    let damage = subject.hitbox().window().map(|window| window.damage);
    assert!(damage.is_some_and(|damage| (damage - 22.5).abs() < 1e-4));
}

#[test]
fn dodge_iframes_ignore_hits() {
    let mut subject = character(0.0);
    subject.request_dodge(Vec3::X).expect("dodge accepted");
    run(&mut subject, 1);
    assert!(subject.is_in_state(StateId::Dodging));

    let outcome = subject.take_damage(&DamageData::new(30.0));
    assert_eq!(outcome, DamageOutcome::Ignored(IgnoreReason::Invulnerable));
    assert!(subject.position().x > 0.0);

    run(&mut subject, 40);
    assert!(subject.is_in_state(StateId::Default));
    assert!(!subject.is_invulnerable());
}

#[test]
fn dead_characters_ignore_requests_until_revived() {
    let mut subject = character(0.0);
    subject.take_damage(&DamageData::new(500.0));
    assert_eq!(subject.request_attack(0), Err(CombatError::Dead));
    assert_eq!(subject.request_dodge(Vec3::X), Err(CombatError::Dead));
    run(&mut subject, 10);
    assert!(subject.is_in_state(StateId::Dead));

    assert!(subject.revive());
    assert!(subject.is_in_state(StateId::Default));
    assert!(subject.attributes().health.is_full());
    assert_eq!(subject.request_attack(0), Ok(()));
}

#[test]
fn swing_lands_once_per_window() {
    let mut manager = CharacterManager::new();
    let config = config(0.0);
    let hero = manager.spawn_character(
        "Hero",
        Team::Player,
        &config,
        Some(Box::new(KinematicMotor::new(Vec3::ZERO))),
    );
    let foe = manager.spawn_character(
        "Foe",
        Team::Enemy,
        &config,
        Some(Box::new(KinematicMotor::new(Vec3::new(0.0, 0.0, 1.2)))),
    );
    manager.tick(DT);

    let hits = Rc::new(RefCell::new(0));
    let counter = Rc::clone(&hits);
    manager
        .get_mut(foe)
        .expect("foe")
        .on_health_changed(move |_| *counter.borrow_mut() += 1);

    manager
        .get_mut(hero)
        .expect("hero")
        .request_attack(0)
        .expect("attack accepted");
    for _ in 0..40 {
        manager.tick(DT);
    }
    assert_eq!(*hits.borrow(), 1);
}

use std::path::Path;

use anyhow::{Context, Result};
use glam::Vec3;
use log::{info, warn};

use rusted_souls::core::math::flatten_xz;
use rusted_souls::engine::input::InputFrame;
use rusted_souls::engine::{GameLoop, KinematicMotor};
use rusted_souls::game::characters::{Character, CharacterManager};
use rusted_souls::game::combat::{CombatEvent, Team};
use rusted_souls::game::config::CharacterConfig;

/// Longest duel the demo will simulate (seconds)
const DUEL_LIMIT: f32 = 60.0;

/// Preferred distance for the scripted player
const PLAYER_REACH: f32 = 1.6;

fn main() -> Result<()> {
    // Initialize logger
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    info!("Starting Rusted Souls duel...");

    let mut args = std::env::args().skip(1);
    let player_path = args.next().unwrap_or_else(|| "data/player.toml".to_string());
    let enemy_path = args.next().unwrap_or_else(|| "data/enemy.toml".to_string());

    let player_config = load_or(&player_path, CharacterConfig::player)?;
    let enemy_config = load_or(&enemy_path, CharacterConfig::enemy)?;

    let mut manager = CharacterManager::new();
    let player = manager.spawn_character(
        "Knight",
        Team::Player,
        &player_config,
        Some(Box::new(KinematicMotor::new(Vec3::ZERO))),
    );
    let enemy = manager.spawn_character(
        "Hollow",
        Team::Enemy,
        &enemy_config,
        Some(Box::new(KinematicMotor::new(Vec3::new(0.0, 0.0, 6.0)))),
    );

    for id in [player, enemy] {
        if let Some(character) = manager.get_mut(id) {
            let name = character.name.clone();
            character.on_combat_event(move |event| log_event(&name, event));
        }
    }

    // Host frames arrive at an uneven rate; the loop turns them into ticks
    let mut game_loop = GameLoop::new();
    let frame_times = [0.016, 0.017, 0.018, 0.015];
    let mut frame = 0;

    while game_loop.simulated_time() < DUEL_LIMIT && manager.alive_count() > 1 {
        let steps = game_loop.advance(frame_times[frame % frame_times.len()]);
        frame += 1;

        for _ in 0..steps {
            if let Some(character) = manager.get(player) {
                let input = scripted_player(character);
                manager.set_input(player, input);
            }
            manager.tick(game_loop.timestep());
        }
    }

    info!(
        "Duel ended after {:.1}s ({} ticks)",
        game_loop.simulated_time(),
        game_loop.update_count()
    );
    for character in manager.all() {
        let attributes = character.attributes();
        info!(
            "{}: {} with {:.0}/{:.0} health",
            character.name,
            if character.is_alive() { "standing" } else { "fallen" },
            attributes.health.value(),
            attributes.health.max()
        );
    }
    Ok(())
}

/// Load a character file, falling back to the preset when it does not exist
fn load_or(path: &str, preset: fn() -> CharacterConfig) -> Result<CharacterConfig> {
    if !Path::new(path).exists() {
        warn!("{} not found, using the built-in preset", path);
        return Ok(preset());
    }
    CharacterConfig::load(path).with_context(|| format!("Failed to load {}", path))
}

/// Walk up to the target, block its swings, attack otherwise
fn scripted_player(character: &Character) -> InputFrame {
    let Some(target) = character.target().filter(|target| !target.is_dead) else {
        return InputFrame::idle();
    };
    if target.distance > PLAYER_REACH {
        return InputFrame::idle().with_move(flatten_xz(target.direction));
    }
    if target.is_attacking {
        return InputFrame::idle().with_block();
    }
    InputFrame::idle().with_attack()
}

fn log_event(name: &str, event: &CombatEvent) {
    match event {
        CombatEvent::TookDamage {
            amount, remaining, ..
        } => info!("{} took {:.0} damage ({:.0} left)", name, amount, remaining),
        CombatEvent::BlockHit { stamina_spent, .. } => {
            info!("{} blocked ({:.0} stamina)", name, stamina_spent)
        }
        CombatEvent::BlockBroken { health_lost, .. } => {
            info!("{}'s guard broke ({:.0} damage)", name, health_lost)
        }
        CombatEvent::Staggered { duration } => info!("{} staggered for {:.2}s", name, duration),
        CombatEvent::Died { .. } => info!("{} has fallen", name),
        _ => {}
    }
}

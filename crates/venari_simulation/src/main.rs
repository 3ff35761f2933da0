//! Headless симуляция Venari
//!
//! Agile персонаж цепляется за hook point, делает dash и бьёт врага.
//! Первый аргумент — опциональный путь к `.ron` с tuning.

use bevy::prelude::*;
use venari_simulation::combat::enemy_bundle;
use venari_simulation::*;

fn main() {
    let seed = 42;
    let tuning = std::env::args()
        .nth(1)
        .map(AbilityTuning::load_or_default)
        .unwrap_or_default();

    let mut app = create_headless_app(seed);
    app.insert_resource(tuning.clone())
        .add_plugins((SimulationPlugin, HeadlessAnimatorPlugin));

    logger::log_info(&format!("🚀 Starting Venari headless simulation (seed: {})", seed));

    let player = app
        .world_mut()
        .spawn((
            player_character(&tuning, Vec3::ZERO, Archetype::Agile),
            agile_abilities(&tuning),
            Player,
        ))
        .id();

    // Hook point прямо перед камерой, платформа на 300 выше
    app.world_mut().spawn((
        HookPoint::new(HookType::Grapplable).with_landing_offset(Vec3::new(0.0, 0.0, 300.0)),
        Transform::from_xyz(400.0, 0.0, 100.0),
        GlobalTransform::from_translation(Vec3::new(400.0, 0.0, 100.0)),
    ));

    let enemy = app
        .world_mut()
        .spawn(enemy_bundle(tuning.enemy.clone(), Vec3::new(2500.0, 0.0, 0.0)))
        .id();

    for tick in 0..400 {
        match tick {
            2 => {
                app.world_mut()
                    .send_event(ActionInput::pressed(player, InputAction::Hook));
            }
            120 => {
                app.world_mut().send_event(MoveInput {
                    entity: player,
                    forward: 1.0,
                    right: 0.0,
                });
                app.world_mut()
                    .send_event(ActionInput::pressed(player, InputAction::Dash));
            }
            220 => {
                app.world_mut().send_event(ApplyDamage::new(enemy, 40.0).from(player));
            }
            _ => {}
        }

        app.update();

        if tick % 50 == 0 {
            let world = app.world();
            let position = world.get::<Transform>(player).map(|t| t.translation);
            let lock = world.get::<AbilityLock>(player).and_then(|lock| lock.holder());
            logger::log_info(&format!(
                "Tick {}: player at {:?}, ability {:?}",
                tick, position, lock
            ));
        }
    }

    let enemy_health = app.world().get::<Health>(enemy).map(|health| health.current);
    logger::log_info(&format!("✅ Simulation complete! Enemy health: {:?}", enemy_health));
}

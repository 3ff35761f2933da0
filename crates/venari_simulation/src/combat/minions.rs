//! Giant enemy: призыв миньонов
//!
//! `MinionSpawnIntent` → summon клип → notify `SpawnMinions` →
//! случайное количество миньонов в [min, max] (DeterministicRng).

use bevy::prelude::*;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::enemy::{enemy_bundle, Enemy};
use crate::animation::{AnimNotify, Clip, MontagePlayer, Notify};
use crate::components::Health;
use crate::config::AbilityTuning;
use crate::logger;
use crate::DeterministicRng;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MinionSpawnerConfig {
    pub min_minions: u32,
    pub max_minions: u32,
    /// Точка спавна относительно giant'а (голова)
    pub spawn_offset: Vec3,
    pub clip: Clip,
}

impl Default for MinionSpawnerConfig {
    fn default() -> Self {
        Self {
            min_minions: 1,
            max_minions: 3,
            spawn_offset: Vec3::new(0.0, 0.0, 300.0),
            clip: Clip::new("giant_summon"),
        }
    }
}

impl MinionSpawnerConfig {
    /// Количество миньонов; перепутанные границы меняются местами
    pub fn roll_count<R: Rng>(&self, rng: &mut R) -> u32 {
        let low = self.min_minions.min(self.max_minions);
        let high = self.min_minions.max(self.max_minions);
        rng.gen_range(low..=high)
    }
}

#[derive(Component, Debug, Clone, Default, PartialEq)]
#[require(Enemy)]
pub struct MinionSpawner {
    pub config: MinionSpawnerConfig,
}

/// Event: AI giant'а хочет призвать миньонов
#[derive(Event, Debug, Clone, Copy)]
pub struct MinionSpawnIntent {
    pub spawner: Entity,
}

/// Event: миньоны появились
#[derive(Event, Debug, Clone, PartialEq)]
pub struct MinionsSpawned {
    pub spawner: Entity,
    pub minions: Vec<Entity>,
}

/// Система: intent → summon клип
pub fn handle_minion_spawn_intents(
    mut intents: EventReader<MinionSpawnIntent>,
    mut spawners: Query<(&MinionSpawner, &mut MontagePlayer, &Health)>,
) {
    for intent in intents.read() {
        let Ok((spawner, mut montage, health)) = spawners.get_mut(intent.spawner) else {
            continue;
        };
        if health.is_dead() || montage.is_playing(&spawner.config.clip) {
            continue;
        }
        montage.play(&spawner.config.clip);
    }
}

/// Система: notify SpawnMinions → спавн
pub fn spawn_minions(
    mut commands: Commands,
    mut notifies: EventReader<AnimNotify>,
    spawners: Query<(&MinionSpawner, &Transform, &Health)>,
    tuning: Res<AbilityTuning>,
    mut rng: ResMut<DeterministicRng>,
    mut spawned_events: EventWriter<MinionsSpawned>,
) {
    for event in notifies.read() {
        if event.notify != Notify::SpawnMinions {
            continue;
        }
        let Ok((spawner, transform, health)) = spawners.get(event.entity) else {
            continue;
        };
        if health.is_dead() {
            continue;
        }

        let count = spawner.config.roll_count(&mut rng.rng);
        let origin = transform.transform_point(spawner.config.spawn_offset);

        let minions: Vec<Entity> = (0..count)
            .map(|_| {
                commands
                    .spawn(enemy_bundle(tuning.enemy.clone(), origin))
                    .insert(Transform::from_translation(origin).with_rotation(transform.rotation))
                    .id()
            })
            .collect();

        logger::log_info(&format!(
            "👹 ECS: giant {:?} spawned {} minions",
            event.entity,
            minions.len()
        ));
        spawned_events.write(MinionsSpawned {
            spawner: event.entity,
            minions,
        });
    }
}

//! Venari Simulation Core
//!
//! ECS-симуляция способностей игрока и врагов на Bevy 0.16 (strategic layer).
//!
//! HYBRID ARCHITECTURE:
//! - ECS = strategic layer (ability state machines, cooldowns, combat rules)
//! - Engine = tactical layer (montage playback, physics bodies, overlaps, raycasts)
//!
//! Engine → ECS: `AnimNotify`, overlap events, `ActionInput`/`MoveInput`.
//! ECS → Engine: `MontagePlayer`, `RopeVisual`, `CharacterMovement`, rapier force/impulse components.

use std::time::Duration;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use bevy::transform::TransformPlugin;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// Публичные модули
pub mod abilities;
pub mod animation;
pub mod character;
pub mod combat;
pub mod components;
pub mod config;
pub mod input;
pub mod interaction;
pub mod logger;
pub mod physics;
pub mod shared;

// Re-export базовых типов для удобства
pub use abilities::{AbilitiesPlugin, AbilityInterrupt, AbilityKind, AbilityLock, InterruptReason};
pub use animation::{AnimNotify, Clip, HeadlessAnimatorPlugin, MontageLibrary, MontagePlayer, Notify};
pub use character::{agile_abilities, berserker_abilities, player_character};
pub use combat::{ApplyDamage, CombatPlugin, DamageDealt, EntityDied};
pub use components::*;
pub use config::{AbilityTuning, ConfigError};
pub use input::{ActionInput, ButtonState, InputAction, InputPlugin, JumpIntent, MoveInput};
pub use interaction::{InteractableRegistry, InteractionPlugin};
pub use logger::{LogLevel, LogPrinter, LOGGER_LEVEL};
pub use physics::SpatialQueries;
pub use shared::{CameraView, FORWARD, UP};

/// Длительность одного headless кадра (64Hz, точно представимо в f32)
pub const HEADLESS_FRAME: Duration = Duration::from_micros(15_625);

/// Порядок фаз кадра.
///
/// Все gameplay системы живут в `Update` (один вызов на отрисованный кадр,
/// переменный delta). Фазы выполняются строго последовательно.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimulationSet {
    /// Move/jump/UI input gating
    Input,
    /// Overlap events → ApplyDamage
    Hits,
    /// ApplyDamage → Health, DamageDealt, EntityDied, AbilityInterrupt
    Damage,
    /// AbilityInterrupt → reset всех способностей
    Interrupts,
    /// Выбор hook point под прицелом камеры
    Targeting,
    /// Ability input → trigger/queue
    Triggers,
    /// AnimNotify callbacks
    Notifies,
    /// Per-frame движение, таймеры, cooldowns
    Tick,
    /// Headless аниматор (в движке заменяется реальным montage player)
    Animation,
}

/// Главный plugin симуляции (объединяет все подсистемы)
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        // Seed может быть уже задан через create_headless_app
        if !app.world().contains_resource::<DeterministicRng>() {
            app.insert_resource(DeterministicRng::new(42));
        }
        if !app.world().contains_resource::<AbilityTuning>() {
            app.insert_resource(AbilityTuning::default());
        }

        app.configure_sets(
            Update,
            (
                SimulationSet::Input,
                SimulationSet::Hits,
                SimulationSet::Damage,
                SimulationSet::Interrupts,
                SimulationSet::Targeting,
                SimulationSet::Triggers,
                SimulationSet::Notifies,
                SimulationSet::Tick,
                SimulationSet::Animation,
            )
                .chain(),
        )
        .init_resource::<SpatialQueries>()
        .add_plugins((InputPlugin, CombatPlugin, AbilitiesPlugin, InteractionPlugin));
    }
}

/// Детерминистичный RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Создаёт minimal Bevy App для headless симуляции
///
/// Время шагает ровно на [`HEADLESS_FRAME`] за каждый `app.update()`
/// (первый update — нулевой delta, как и в Bevy).
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    logger::init_logger();
    app.add_plugins((MinimalPlugins, TransformPlugin))
        .insert_resource(DeterministicRng::new(seed))
        .insert_resource(TimeUpdateStrategy::ManualDuration(HEADLESS_FRAME));

    app
}

/// Snapshot мира для сравнения детерминизма
pub fn world_snapshot<T: Component>(world: &mut World) -> Vec<u8>
where
    T: std::fmt::Debug,
{
    let mut snapshot = Vec::new();

    let mut query = world.query::<(Entity, &T)>();
    let mut entities: Vec<_> = query.iter(world).collect();

    // Сортируем по Entity ID для детерминизма
    entities.sort_by_key(|(entity, _)| entity.index());

    for (entity, component) in entities {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.extend_from_slice(format!("{:?}", component).as_bytes());
    }

    snapshot
}

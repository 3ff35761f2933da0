//! Combat module
//!
//! ECS ответственность:
//! - Health changes (только через `ApplyDamage`)
//! - Enemy attacks, knockback, minion spawning, projectiles, destructibles
//! - Events: DamageDealt, EntityDied, MinionsSpawned, ProjectileExploded
//!
//! Engine ответственность:
//! - Hitbox/trigger overlaps → `EnemyMeleeOverlap`, `ProjectileOverlap`
//! - Rigid bodies, читающие `ExternalImpulse`

use bevy::prelude::*;

pub mod damage;
pub mod destructible;
pub mod enemy;
pub mod minions;
pub mod projectile;


// Re-export основных типов
pub use damage::{apply_damage, pick_death_clip, ApplyDamage, DamageDealt, EntityDied};
pub use destructible::{Breakable, Destructible, DestructibleRegistry, Destruction};
pub use enemy::{enemy_bundle, Enemy, EnemyAttackIntent, EnemyConfig, EnemyMeleeOverlap, Knockback};
pub use minions::{MinionSpawnIntent, MinionSpawner, MinionSpawnerConfig, MinionsSpawned};
pub use projectile::{
    launched_projectile, Projectile, ProjectileExploded, ProjectileOverlap,
};

use crate::animation::AnimNotify;
use crate::SimulationSet;

/// Combat Plugin
///
/// Порядок выполнения (по `SimulationSet`):
/// 1. Hits — enemy melee и projectile overlaps → ApplyDamage
/// 2. Damage — apply_damage, затем knockback impulses
/// 3. Triggers — AI intents (атака, призыв)
/// 4. Notifies — enemy hitbox окна, SpawnMinions
/// 5. Tick — cooldowns, fuse timers
pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        // Регистрация событий
        app.add_event::<ApplyDamage>()
            .add_event::<DamageDealt>()
            .add_event::<EntityDied>()
            .add_event::<EnemyAttackIntent>()
            .add_event::<EnemyMeleeOverlap>()
            .add_event::<Knockback>()
            .add_event::<MinionSpawnIntent>()
            .add_event::<MinionsSpawned>()
            .add_event::<ProjectileOverlap>()
            .add_event::<ProjectileExploded>()
            .add_event::<AnimNotify>()
            .init_resource::<DestructibleRegistry>();

        app.add_systems(
            Update,
            (
                destructible::forget_despawned_destructibles,
                enemy::process_enemy_melee_hits,
                projectile::process_projectile_hits,
            )
                .chain()
                .in_set(SimulationSet::Hits),
        )
        .add_systems(
            Update,
            (damage::apply_damage, enemy::apply_knockback)
                .chain()
                .in_set(SimulationSet::Damage),
        )
        .add_systems(
            Update,
            (
                enemy::handle_enemy_attack_intents,
                minions::handle_minion_spawn_intents,
            )
                .chain()
                .in_set(SimulationSet::Triggers),
        )
        .add_systems(
            Update,
            (enemy::on_enemy_notifies, minions::spawn_minions)
                .chain()
                .in_set(SimulationSet::Notifies),
        )
        .add_systems(
            Update,
            (enemy::tick_enemy_cooldowns, projectile::tick_projectiles)
                .chain()
                .in_set(SimulationSet::Tick),
        );
    }
}

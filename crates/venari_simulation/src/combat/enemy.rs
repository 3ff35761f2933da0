//! Враги: melee атака через hitbox окно, урон, knockback
//!
//! AI (движок или behaviour tree) шлёт `EnemyAttackIntent`, ECS решает,
//! готов ли cooldown, и запускает attack клип. Hitbox открывается notifies
//! клипа; движок шлёт `EnemyMeleeOverlap`.

use bevy::prelude::*;
use bevy_rapier3d::prelude::ExternalImpulse;
use serde::{Deserialize, Serialize};

use super::damage::ApplyDamage;
use crate::abilities::Cooldown;
use crate::animation::{AnimNotify, Clip, MontagePlayer, Notify};
use crate::components::{Actor, Dead, Health, Player};
use crate::logger;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyConfig {
    pub max_health: f32,
    pub melee_damage: f32,
    pub melee_cooldown: f32,
    pub attack_clip: Option<Clip>,
    pub damage_clip: Option<Clip>,
    pub death_clips: Vec<Clip>,
}

impl Default for EnemyConfig {
    fn default() -> Self {
        Self {
            max_health: 100.0,
            melee_damage: 10.0,
            melee_cooldown: 2.0,
            attack_clip: Some(Clip::new("enemy_attack")),
            damage_clip: Some(Clip::new("enemy_damage")),
            death_clips: vec![Clip::new("enemy_death_1"), Clip::new("enemy_death_2")],
        }
    }
}

/// Враг
#[derive(Component, Debug, Clone, PartialEq)]
#[require(Actor, MontagePlayer)]
pub struct Enemy {
    pub config: EnemyConfig,
    pub attack_cooldown: Cooldown,
    hitbox_enabled: bool,
    /// Кого уже ударил за текущий замах
    struck: Vec<Entity>,
}

impl Default for Enemy {
    fn default() -> Self {
        Self::new(EnemyConfig::default())
    }
}

impl Enemy {
    pub fn new(config: EnemyConfig) -> Self {
        Self {
            attack_cooldown: Cooldown::new(config.melee_cooldown),
            config,
            hitbox_enabled: false,
            struck: Vec::new(),
        }
    }

    pub fn hitbox_enabled(&self) -> bool {
        self.hitbox_enabled
    }

    /// Замах: клип для проигрывания, если cooldown готов
    pub fn begin_attack(&mut self) -> Option<&Clip> {
        if !self.attack_cooldown.is_ready() {
            return None;
        }
        let clip = self.config.attack_clip.as_ref()?;
        self.attack_cooldown.start();
        self.struck.clear();
        Some(clip)
    }

    pub fn set_hitbox(&mut self, enabled: bool) {
        self.hitbox_enabled = enabled;
    }

    /// Hit-react или смерть вытеснили attack клип: MeleeHitboxEnd уже не придёт
    pub fn interrupt_swing(&mut self) {
        self.hitbox_enabled = false;
        self.struck.clear();
    }

    pub fn try_strike(&mut self, target: Entity) -> bool {
        if !self.hitbox_enabled || self.struck.contains(&target) {
            return false;
        }
        self.struck.push(target);
        true
    }
}

/// Bundle врага с physics компонентами для knockback
pub fn enemy_bundle(config: EnemyConfig, position: Vec3) -> impl Bundle {
    (
        Health::new(config.max_health),
        Enemy::new(config),
        Transform::from_translation(position),
        ExternalImpulse::default(),
    )
}

/// Event: AI хочет ударить (AI → ECS)
#[derive(Event, Debug, Clone, Copy)]
pub struct EnemyAttackIntent {
    pub enemy: Entity,
}

/// Event: melee hitbox врага пересёк коллайдер (Engine → ECS)
#[derive(Event, Debug, Clone, Copy)]
pub struct EnemyMeleeOverlap {
    pub enemy: Entity,
    pub other: Entity,
}

/// Event: отбросить тело импульсом
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct Knockback {
    pub target: Entity,
    pub impulse: Vec3,
}

/// Система: EnemyAttackIntent → attack клип
pub fn handle_enemy_attack_intents(
    mut intents: EventReader<EnemyAttackIntent>,
    mut enemies: Query<(&mut Enemy, &mut MontagePlayer, &Health)>,
) {
    for intent in intents.read() {
        let Ok((mut enemy, mut montage, health)) = enemies.get_mut(intent.enemy) else {
            continue;
        };
        if health.is_dead() {
            continue;
        }

        if enemy.config.attack_clip.is_none() {
            logger::log_warning(&format!(
                "👹 Missing melee attack clip on enemy {:?}",
                intent.enemy
            ));
            continue;
        }

        if let Some(clip) = enemy.begin_attack() {
            montage.play(clip);
            logger::log(&format!("👹 ECS: enemy {:?} attacks", intent.enemy));
        }
    }
}

/// Система: MeleeHitbox notifies на врагах
pub fn on_enemy_notifies(
    mut notifies: EventReader<AnimNotify>,
    mut enemies: Query<&mut Enemy, Without<Dead>>,
) {
    for event in notifies.read() {
        let Ok(mut enemy) = enemies.get_mut(event.entity) else {
            continue;
        };
        match event.notify {
            Notify::MeleeHitboxBegin => enemy.set_hitbox(true),
            Notify::MeleeHitboxEnd => enemy.set_hitbox(false),
            _ => {}
        }
    }
}

/// Система: EnemyMeleeOverlap → урон игроку
pub fn process_enemy_melee_hits(
    mut overlaps: EventReader<EnemyMeleeOverlap>,
    mut enemies: Query<(&mut Enemy, &Health)>,
    players: Query<(), With<Player>>,
    mut damage_events: EventWriter<ApplyDamage>,
) {
    for overlap in overlaps.read() {
        let Ok((mut enemy, health)) = enemies.get_mut(overlap.enemy) else {
            continue;
        };
        if health.is_dead() || players.get(overlap.other).is_err() {
            continue;
        }
        if !enemy.try_strike(overlap.other) {
            continue;
        }

        damage_events.write(ApplyDamage::new(overlap.other, enemy.config.melee_damage).from(overlap.enemy));
    }
}

/// Система: Knockback → ExternalImpulse
pub fn apply_knockback(
    mut commands: Commands,
    mut knockbacks: EventReader<Knockback>,
    mut impulses: Query<&mut ExternalImpulse>,
) {
    for knockback in knockbacks.read() {
        match impulses.get_mut(knockback.target) {
            Ok(mut impulse) => impulse.impulse += knockback.impulse,
            Err(_) => {
                if let Ok(mut entity) = commands.get_entity(knockback.target) {
                    entity.insert(ExternalImpulse {
                        impulse: knockback.impulse,
                        ..default()
                    });
                }
            }
        }
    }
}

/// Система: cooldown атаки врагов
pub fn tick_enemy_cooldowns(time: Res<Time>, mut enemies: Query<&mut Enemy>) {
    let delta = time.delta_secs();
    for mut enemy in enemies.iter_mut() {
        enemy.attack_cooldown.tick(delta);
    }
}

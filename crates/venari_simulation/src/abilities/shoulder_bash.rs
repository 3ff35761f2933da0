//! Shoulder-bash (berserker): рывок плечом с уроном и отбрасыванием
//!
//! Idle → Queued → Animating → Moving (notify BashMovementBegin) →
//! Recovering (end клип) → Idle + cooldown (notify BashEnd).
//! Damage volume активен только между BashHitboxBegin и BashHitboxEnd.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::context::{AbilityCtx, BodyData};
use super::cooldown::Cooldown;
use super::{AbilityKind, Boosts};
use crate::animation::{AnimNotify, Clip, Notify};
use crate::combat::{ApplyDamage, DestructibleRegistry, Enemy, Knockback};
use crate::components::{Dead, Health};
use crate::logger;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShoulderBashConfig {
    pub distance: f32,
    pub speed: f32,
    pub acceleration: f32,
    pub damage: f32,
    pub knockback_force: f32,
    /// Knockback только пока оставшаяся дистанция > fraction · distance
    pub knockback_fraction: f32,
    /// Первое попадание сразу обрывает движение
    pub finish_on_impact: bool,
    pub cooldown: f32,
    pub movement_clip: Clip,
    pub end_clip: Clip,
}

impl Default for ShoulderBashConfig {
    fn default() -> Self {
        Self {
            distance: 250.0,
            speed: 1700.0,
            acceleration: 20000.0,
            damage: 45.0,
            knockback_force: 100.0,
            knockback_fraction: 0.0,
            finish_on_impact: false,
            cooldown: 2.0,
            movement_clip: Clip::new("bash_movement"),
            end_clip: Clip::new("bash_end"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum BashState {
    #[default]
    Idle,
    Queued,
    Animating {
        direction: Vec3,
    },
    Moving {
        direction: Vec3,
        remaining: f32,
    },
    Recovering,
}

#[derive(Component, Debug, Clone, PartialEq)]
pub struct ShoulderBash {
    pub config: ShoulderBashConfig,
    pub cooldown: Cooldown,
    state: BashState,
    hitbox_enabled: bool,
    struck: Vec<Entity>,
}

impl Default for ShoulderBash {
    fn default() -> Self {
        Self::new(ShoulderBashConfig::default())
    }
}

impl ShoulderBash {
    pub fn new(config: ShoulderBashConfig) -> Self {
        Self {
            cooldown: Cooldown::new(config.cooldown),
            config,
            state: BashState::Idle,
            hitbox_enabled: false,
            struck: Vec::new(),
        }
    }

    pub fn state(&self) -> BashState {
        self.state
    }

    /// Всё кроме Idle и Queued
    pub fn is_active(&self) -> bool {
        !matches!(self.state, BashState::Idle | BashState::Queued)
    }

    pub fn hitbox_enabled(&self) -> bool {
        self.hitbox_enabled
    }

    pub fn remaining_distance(&self) -> f32 {
        match self.state {
            BashState::Animating { .. } => self.config.distance,
            BashState::Moving { remaining, .. } => remaining.max(0.0),
            _ => 0.0,
        }
    }

    pub fn should_knockback(&self) -> bool {
        self.remaining_distance() > self.config.knockback_fraction * self.config.distance
    }

    pub fn queue(&mut self, ctx: &mut AbilityCtx) -> bool {
        if self.state != BashState::Idle || !self.cooldown.is_ready() {
            return false;
        }
        if ctx.movement.is_falling() || ctx.attack_blocks_queue() {
            return false;
        }

        self.state = BashState::Queued;
        ctx.queue_special();
        true
    }

    pub fn begin(&mut self, ctx: &mut AbilityCtx) -> bool {
        if self.state != BashState::Queued || ctx.attack_animation_playing() {
            return false;
        }
        if !ctx.lock.try_claim(AbilityKind::ShoulderBash) {
            return false;
        }

        self.struck.clear();
        ctx.play(&self.config.movement_clip);
        self.state = BashState::Animating {
            direction: ctx.forward(),
        };
        true
    }

    /// Notify BashMovementBegin
    pub fn start_movement(&mut self, ctx: &mut AbilityCtx) -> bool {
        let BashState::Animating { direction } = self.state else {
            return false;
        };

        ctx.movement.max_walk_speed = self.config.speed;
        ctx.movement.max_acceleration = self.config.acceleration;
        self.state = BashState::Moving {
            direction,
            remaining: self.config.distance,
        };
        true
    }

    pub fn tick(&mut self, ctx: &mut AbilityCtx, delta: f32) {
        let BashState::Moving {
            direction,
            remaining,
        } = self.state
        else {
            if self.state == BashState::Idle {
                self.cooldown.tick(delta);
            }
            return;
        };

        let speed = ctx.movement.max_walk_speed;
        let step = speed * delta;
        ctx.movement.velocity = direction * speed;
        ctx.transform.translation += direction * step;

        let remaining = remaining - step;
        self.state = BashState::Moving {
            direction,
            remaining,
        };
        if remaining <= 0.0 {
            self.end_movement(ctx);
        }
    }

    /// Движение закончено: hitbox off, movement defaults, end клип
    pub fn end_movement(&mut self, ctx: &mut AbilityCtx) {
        if !matches!(self.state, BashState::Moving { .. }) {
            return;
        }

        self.hitbox_enabled = false;
        ctx.restore_movement();
        ctx.movement.stop_immediately();
        ctx.play(&self.config.end_clip);
        self.state = BashState::Recovering;
    }

    pub fn set_hitbox(&mut self, enabled: bool) {
        // Вне Animating/Moving hitbox не включается
        self.hitbox_enabled = enabled
            && matches!(
                self.state,
                BashState::Animating { .. } | BashState::Moving { .. }
            );
    }

    /// Первое попадание по `target` (враг или destructible) за этот bash
    pub fn try_strike(&mut self, target: Entity) -> bool {
        if !self.hitbox_enabled || self.struck.contains(&target) {
            return false;
        }
        self.struck.push(target);
        true
    }

    /// Notify BashEnd / interrupt. No-op если Idle.
    pub fn reset(&mut self, ctx: &mut AbilityCtx) {
        match self.state {
            BashState::Idle => return,
            BashState::Queued => {
                self.state = BashState::Idle;
                ctx.clear_queued_special();
                return;
            }
            _ => {}
        }

        self.hitbox_enabled = false;
        self.state = BashState::Idle;
        self.cooldown.start();
        ctx.restore_movement();
        ctx.lock.release(AbilityKind::ShoulderBash);
        ctx.clear_queued_special();
        ctx.end_attack_animation();
    }
}

/// Event: bash volume пересёк коллайдер (Engine → ECS)
#[derive(Event, Debug, Clone, Copy)]
pub struct BashOverlap {
    pub basher: Entity,
    pub other: Entity,
}

/// Система: Queued → Animating
pub fn begin_queued_bashes(mut characters: Query<(Entity, BodyData, &mut ShoulderBash)>) {
    for (entity, mut body, mut bash) in characters.iter_mut() {
        if bash.state() != BashState::Queued {
            continue;
        }
        let mut ctx = AbilityCtx::from_body(&mut body);
        if bash.begin(&mut ctx) {
            logger::log(&format!("🛡️ ECS: {:?} shoulder bash started", entity));
        }
    }
}

/// Система: hitbox / movement / end notifies
pub fn on_bash_notifies(
    mut notifies: EventReader<AnimNotify>,
    mut characters: Query<(BodyData, &mut ShoulderBash)>,
) {
    for event in notifies.read() {
        let Ok((mut body, mut bash)) = characters.get_mut(event.entity) else {
            continue;
        };
        let mut ctx = AbilityCtx::from_body(&mut body);

        match event.notify {
            Notify::BashHitboxBegin => bash.set_hitbox(true),
            Notify::BashHitboxEnd => bash.set_hitbox(false),
            Notify::BashMovementBegin => {
                bash.start_movement(&mut ctx);
            }
            Notify::BashEnd => bash.reset(&mut ctx),
            _ => {}
        }
    }
}

/// Система: движение bash + cooldown
pub fn tick_bash(time: Res<Time>, mut characters: Query<(BodyData, &mut ShoulderBash)>) {
    let delta = time.delta_secs();
    for (mut body, mut bash) in characters.iter_mut() {
        let mut ctx = AbilityCtx::from_body(&mut body);
        bash.tick(&mut ctx, delta);
    }
}

/// Система: BashOverlap → урон врагам, knockback, destructibles
pub fn process_bash_overlaps(
    mut overlaps: EventReader<BashOverlap>,
    mut characters: Query<(BodyData, &mut ShoulderBash, &mut Health, Option<&Boosts>)>,
    enemies: Query<(), (With<Enemy>, Without<Dead>)>,
    mut destructibles: ResMut<DestructibleRegistry>,
    mut commands: Commands,
    mut damage_events: EventWriter<ApplyDamage>,
    mut knockback_events: EventWriter<Knockback>,
) {
    for overlap in overlaps.read() {
        let Ok((mut body, mut bash, mut health, boosts)) = characters.get_mut(overlap.basher) else {
            continue;
        };
        if health.is_dead() || !bash.hitbox_enabled() {
            continue;
        }
        let mut ctx = AbilityCtx::from_body(&mut body);

        if enemies.get(overlap.other).is_ok() {
            if !bash.try_strike(overlap.other) {
                continue;
            }

            let damage = bash.config.damage;
            damage_events.write(ApplyDamage::new(overlap.other, damage).from(overlap.basher));
            ctx.register_hit();

            if bash.should_knockback() {
                let direction = match bash.state() {
                    BashState::Animating { direction } | BashState::Moving { direction, .. } => {
                        direction
                    }
                    _ => ctx.forward(),
                };
                knockback_events.write(Knockback {
                    target: overlap.other,
                    impulse: direction * bash.config.knockback_force,
                });
            }

            if let Some(heal) = boosts.and_then(|boosts| boosts.life_steal_heal(damage)) {
                health.heal(heal);
            }

            logger::log(&format!(
                "🛡️ ECS: {:?} bashed {:?} for {}",
                overlap.basher, overlap.other, damage
            ));
        } else if destructibles.contains(overlap.other) {
            if !bash.try_strike(overlap.other) {
                continue;
            }
            if destructibles.destroy(overlap.other, overlap.basher) {
                commands.entity(overlap.other).despawn();
            }
        } else {
            continue;
        }

        if bash.config.finish_on_impact {
            bash.end_movement(&mut ctx);
        }
    }
}

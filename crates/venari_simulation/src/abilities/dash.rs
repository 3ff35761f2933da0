//! Dash: рывок на фиксированную дистанцию
//!
//! Idle → Dashing → Idle + cooldown. Dash отменяет melee, grapple,
//! grapple-attack и pull. Каждый кадр бюджет дистанции уменьшается на
//! пройденный путь; при бюджете ≤ 0 dash заканчивается в тот же кадр.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::context::{AbilityCtx, BodyData};
use super::cooldown::Cooldown;
use super::AbilityKind;
use crate::animation::Clip;
use crate::shared::CameraView;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashConfig {
    pub distance: f32,
    pub speed: f32,
    pub acceleration: f32,
    pub cooldown: f32,
    /// Множитель скорости при выходе из dash в воздухе
    pub air_velocity_retention: f32,
    pub ground_velocity_retention: f32,
    pub clip: Clip,
}

impl Default for DashConfig {
    fn default() -> Self {
        Self {
            distance: 1500.0,
            speed: 2000.0,
            acceleration: 20000.0,
            cooldown: 2.0,
            air_velocity_retention: 1.0,
            ground_velocity_retention: 1.0,
            clip: Clip::new("dash"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DashState {
    #[default]
    Idle,
    Dashing {
        remaining: f32,
        direction: Vec3,
    },
}

/// Результат кадра dash
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashTick {
    Idle,
    Moving,
    Finished,
}

#[derive(Component, Debug, Clone, PartialEq)]
pub struct Dash {
    pub config: DashConfig,
    pub cooldown: Cooldown,
    state: DashState,
    /// Знаки последнего move input (forward, right)
    stored_input: Vec2,
}

impl Default for Dash {
    fn default() -> Self {
        Self::new(DashConfig::default())
    }
}

impl Dash {
    pub fn new(config: DashConfig) -> Self {
        Self {
            cooldown: Cooldown::new(config.cooldown),
            config,
            state: DashState::Idle,
            stored_input: Vec2::ZERO,
        }
    }

    pub fn state(&self) -> DashState {
        self.state
    }

    pub fn is_dashing(&self) -> bool {
        self.state != DashState::Idle
    }

    pub fn stored_input(&self) -> Vec2 {
        self.stored_input
    }

    /// Запоминает знаки осей (0 остаётся 0)
    pub fn store_input(&mut self, forward: f32, right: f32) {
        let sign = |value: f32| if value == 0.0 { 0.0 } else { value.signum() };
        self.stored_input = Vec2::new(sign(forward), sign(right));
    }

    /// Направление по stored input на горизонтальном базисе камеры
    pub fn direction(&self, camera: &CameraView, fallback: Vec3) -> Vec3 {
        let input = if self.stored_input.length() < 0.1 {
            Vec2::X
        } else {
            self.stored_input
        };
        (camera.flat_forward() * input.x + camera.flat_right() * input.y)
            .try_normalize()
            .unwrap_or(fallback)
    }

    /// Старт dash. Отмена других способностей — до вызова (лок должен быть свободен).
    pub fn trigger(&mut self, ctx: &mut AbilityCtx, camera: &CameraView) -> bool {
        if self.is_dashing() || !self.cooldown.is_ready() {
            return false;
        }
        if !ctx.lock.try_claim(AbilityKind::Dash) {
            return false;
        }

        let direction = self.direction(camera, ctx.forward());
        ctx.movement.max_walk_speed = self.config.speed;
        ctx.movement.max_acceleration = self.config.acceleration;
        ctx.movement.gravity_scale = 0.0;
        ctx.play(&self.config.clip);

        self.state = DashState::Dashing {
            remaining: self.config.distance,
            direction,
        };
        true
    }

    pub fn tick(&mut self, ctx: &mut AbilityCtx, delta: f32) -> DashTick {
        let DashState::Dashing {
            remaining,
            direction,
        } = self.state
        else {
            self.cooldown.tick(delta);
            return DashTick::Idle;
        };

        let speed = ctx.movement.max_walk_speed;
        let step = speed * delta;
        ctx.movement.velocity = direction * speed;
        ctx.transform.translation += direction * step;

        let remaining = remaining - step;
        if remaining <= 0.0 {
            self.stop(ctx);
            return DashTick::Finished;
        }

        self.state = DashState::Dashing {
            remaining,
            direction,
        };
        DashTick::Moving
    }

    /// Конец/отмена dash: movement defaults, retention скорости, cooldown. No-op если Idle.
    pub fn stop(&mut self, ctx: &mut AbilityCtx) {
        if !self.is_dashing() {
            return;
        }

        self.state = DashState::Idle;
        ctx.restore_movement();
        let retention = if ctx.movement.is_falling() {
            self.config.air_velocity_retention
        } else {
            self.config.ground_velocity_retention
        };
        ctx.movement.velocity *= retention;
        ctx.montage.stop_clip(&self.config.clip);
        self.cooldown.start();
        ctx.lock.release(AbilityKind::Dash);
    }
}

/// Система: движение dash + cooldown
pub fn tick_dash(time: Res<Time>, mut characters: Query<(Entity, BodyData, &mut Dash)>) {
    let delta = time.delta_secs();

    for (entity, mut body, mut dash) in characters.iter_mut() {
        let mut ctx = AbilityCtx::from_body(&mut body);
        if dash.tick(&mut ctx, delta) == DashTick::Finished {
            crate::logger::log(&format!("💨 ECS: {:?} dash finished", entity));
        }
    }
}

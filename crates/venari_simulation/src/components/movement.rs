//! Movement компоненты: character movement, cached defaults, rig offsets
//!
//! Архитектура:
//! - ECS пишет лимиты (max speed, acceleration, gravity scale) и velocity override
//! - Движок (CharacterBody / rapier controller) применяет их к физике
//! - `MovementDefaults` хранит значения до любой способности; reset восстанавливает их

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::shared::FORWARD;

/// Режим движения (grounded vs airborne)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
pub enum MovementMode {
    #[default]
    Walking,
    Falling,
}

/// Movement state персонажа
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct CharacterMovement {
    pub max_walk_speed: f32,
    pub max_acceleration: f32,
    pub gravity_scale: f32,
    pub velocity: Vec3,
    pub mode: MovementMode,
    /// Locomotion intent (forward, right) в [-1, 1], обнуляется при блокировке
    pub input: Vec2,
}

impl Default for CharacterMovement {
    fn default() -> Self {
        Self::from_tuning(&MovementTuning::default())
    }
}

impl CharacterMovement {
    pub fn from_tuning(tuning: &MovementTuning) -> Self {
        Self {
            max_walk_speed: tuning.max_walk_speed,
            max_acceleration: tuning.max_acceleration,
            gravity_scale: tuning.gravity_scale,
            velocity: Vec3::ZERO,
            mode: MovementMode::Walking,
            input: Vec2::ZERO,
        }
    }

    pub fn is_falling(&self) -> bool {
        self.mode == MovementMode::Falling
    }

    pub fn stop_immediately(&mut self) {
        self.velocity = Vec3::ZERO;
    }
}

/// Значения movement до любой способности
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct MovementDefaults {
    pub max_walk_speed: f32,
    pub max_acceleration: f32,
    pub gravity_scale: f32,
}

impl Default for MovementDefaults {
    fn default() -> Self {
        Self::from_movement(&CharacterMovement::default())
    }
}

impl MovementDefaults {
    pub fn from_movement(movement: &CharacterMovement) -> Self {
        Self {
            max_walk_speed: movement.max_walk_speed,
            max_acceleration: movement.max_acceleration,
            gravity_scale: movement.gravity_scale,
        }
    }

    pub fn restore(&self, movement: &mut CharacterMovement) {
        movement.max_walk_speed = self.max_walk_speed;
        movement.max_acceleration = self.max_acceleration;
        movement.gravity_scale = self.gravity_scale;
    }

    pub fn matches(&self, movement: &CharacterMovement) -> bool {
        *self == Self::from_movement(movement)
    }
}

/// Локальные смещения точек персонажа (рука, из которой летит трос)
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct CharacterRig {
    pub hand_offset: Vec3,
}

impl Default for CharacterRig {
    fn default() -> Self {
        Self {
            hand_offset: Vec3::new(20.0, 30.0, 60.0),
        }
    }
}

impl CharacterRig {
    pub fn hand_position(&self, transform: &Transform) -> Vec3 {
        transform.transform_point(self.hand_offset)
    }
}

/// Forward персонажа (по yaw)
pub fn character_forward(transform: &Transform) -> Vec3 {
    (transform.rotation * FORWARD).normalize_or_zero()
}

/// Базовые параметры locomotion
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementTuning {
    pub max_walk_speed: f32,
    pub max_acceleration: f32,
    pub gravity_scale: f32,
    pub max_health: f32,
}

impl Default for MovementTuning {
    fn default() -> Self {
        Self {
            max_walk_speed: 600.0,
            max_acceleration: 2048.0,
            gravity_scale: 2.2,
            max_health: 100.0,
        }
    }
}

//! Camera view component
//!
//! Позиция и направление камеры игрока. Пишется движком каждый кадр
//! (или possession-системой во время перехода), читается targeting'ом,
//! dash'ем и pull throw.

use bevy::prelude::*;

use super::axes::{flatten, UP};

/// View камеры, привязанной к персонажу
///
/// `rig_offset` — смещение камеры от персонажа в локальных координатах,
/// используется для reset после possession.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct CameraView {
    pub position: Vec3,
    pub forward: Vec3,
    pub rig_offset: Vec3,
}

impl Default for CameraView {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            forward: Vec3::X,
            rig_offset: Vec3::new(-300.0, 0.0, 120.0),
        }
    }
}

impl CameraView {
    pub fn new(position: Vec3, forward: Vec3) -> Self {
        Self {
            position,
            forward: forward.normalize_or_zero(),
            ..default()
        }
    }

    /// Right-handed: forward × up
    pub fn right(&self) -> Vec3 {
        self.forward.cross(UP).normalize_or_zero()
    }

    pub fn flat_forward(&self) -> Vec3 {
        flatten(self.forward).normalize_or_zero()
    }

    pub fn flat_right(&self) -> Vec3 {
        flatten(self.right()).normalize_or_zero()
    }

    /// Камера на rig offset позади персонажа, смотрит вдоль его forward
    pub fn reset_to_rig(&mut self, character: &Transform) {
        self.position = character.transform_point(self.rig_offset);
        self.forward = (character.rotation * super::axes::FORWARD).normalize_or_zero();
    }
}

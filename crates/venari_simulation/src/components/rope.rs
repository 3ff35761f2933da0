//! Визуал троса (grapple, grapple-attack, pull)

use bevy::prelude::*;

/// Трос из руки персонажа к anchor'у
///
/// ECS пишет длину и конец, движок рисует cable.
#[derive(Component, Debug, Clone, Copy, PartialEq, Default)]
pub struct RopeVisual {
    pub visible: bool,
    pub length: f32,
    pub end: Vec3,
}

impl RopeVisual {
    pub fn hide(&mut self) {
        self.visible = false;
    }
}

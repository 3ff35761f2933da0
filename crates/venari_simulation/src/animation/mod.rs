//! Animation interface: montage player + notify events
//!
//! ECS говорит *что* играть (`MontagePlayer::play`), движок играет клип и
//! присылает `AnimNotify` в размеченные моменты. Без движка те же notify
//! генерирует headless аниматор (`HeadlessAnimatorPlugin`).

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::components::RopeVisual;

pub mod library;

pub use library::{advance_montages, ClipTimeline, HeadlessAnimatorPlugin, MontageLibrary};

/// Имя animation montage
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Clip(pub String);

impl Clip {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Clip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Текущий montage персонажа/врага
///
/// Один активный клип за раз: `play` заменяет предыдущий.
/// `progress` нормализован в [0, 1], пишется аниматором.
#[derive(Component, Debug, Clone, Default, PartialEq)]
pub struct MontagePlayer {
    active: Option<Clip>,
    progress: f32,
}

impl MontagePlayer {
    pub fn play(&mut self, clip: &Clip) {
        self.active = Some(clip.clone());
        self.progress = 0.0;
    }

    /// Stop all montages
    pub fn stop(&mut self) {
        self.active = None;
        self.progress = 0.0;
    }

    /// Останавливает только если играет именно этот клип
    pub fn stop_clip(&mut self, clip: &Clip) {
        if self.is_playing(clip) {
            self.stop();
        }
    }

    pub fn is_playing(&self, clip: &Clip) -> bool {
        self.active.as_ref() == Some(clip)
    }

    pub fn active(&self) -> Option<&Clip> {
        self.active.as_ref()
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    /// Прогресс клипа; 1.0 если клип уже закончился или заменён
    pub fn progress_of(&self, clip: &Clip) -> f32 {
        if self.is_playing(clip) {
            self.progress
        } else {
            1.0
        }
    }

    pub fn set_progress(&mut self, progress: f32) {
        self.progress = progress.clamp(0.0, 1.0);
    }
}

/// Размеченные моменты внутри клипов
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Notify {
    RopeVisible(bool),
    GrappleMovementStart,
    GrappleEnd,
    GrappleAttackMovementStart,
    GrappleAttackDamage,
    GrappleAttackEnd,
    MeleeHitboxBegin,
    MeleeHitboxEnd,
    ComboWindow(bool),
    AttackAnimationEnd,
    BashHitboxBegin,
    BashHitboxEnd,
    BashMovementBegin,
    BashEnd,
    SpawnMinions,
}

/// Event: notify из клипа на entity (Engine → ECS)
#[derive(Event, Debug, Clone, Copy)]
pub struct AnimNotify {
    pub entity: Entity,
    pub notify: Notify,
}

impl AnimNotify {
    pub fn new(entity: Entity, notify: Notify) -> Self {
        Self { entity, notify }
    }
}

/// Система: RopeVisible notify → RopeVisual.visible
pub fn apply_rope_notifies(
    mut notifies: EventReader<AnimNotify>,
    mut ropes: Query<&mut RopeVisual>,
) {
    for event in notifies.read() {
        let Notify::RopeVisible(visible) = event.notify else {
            continue;
        };
        if let Ok(mut rope) = ropes.get_mut(event.entity) {
            rope.visible = visible;
        }
    }
}

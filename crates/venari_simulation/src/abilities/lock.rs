//! Exclusive ability arbiter
//!
//! Grapple, pull, grapple-attack, dash и shoulder-bash перехватывают
//! locomotion. `AbilityLock` держит не более одной такой способности, так что
//! "две способности одновременно" непредставимо.

use bevy::prelude::*;

/// Способности, перехватывающие locomotion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub enum AbilityKind {
    Grapple,
    Pull,
    GrappleAttack,
    Dash,
    ShoulderBash,
}

#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub struct AbilityLock {
    holder: Option<AbilityKind>,
}

impl AbilityLock {
    pub fn holder(&self) -> Option<AbilityKind> {
        self.holder
    }

    pub fn is_free(&self) -> bool {
        self.holder.is_none()
    }

    pub fn is_held_by(&self, kind: AbilityKind) -> bool {
        self.holder == Some(kind)
    }

    /// Захват: успех если свободно или уже держит та же способность
    pub fn try_claim(&mut self, kind: AbilityKind) -> bool {
        match self.holder {
            None => {
                self.holder = Some(kind);
                true
            }
            Some(current) => current == kind,
        }
    }

    /// Освобождает только если держит `kind`
    pub fn release(&mut self, kind: AbilityKind) {
        if self.holder == Some(kind) {
            self.holder = None;
        }
    }
}

/// Причина принудительного сброса способностей
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterruptReason {
    Damaged,
    Died,
    Possession,
    BlockingUi,
}

/// Event: сбросить все способности персонажа
#[derive(Event, Debug, Clone, Copy)]
pub struct AbilityInterrupt {
    pub entity: Entity,
    pub reason: InterruptReason,
}

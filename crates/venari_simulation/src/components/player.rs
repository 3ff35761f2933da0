//! Player control marker и archetype персонажа

use bevy::prelude::*;

use crate::abilities::{AbilityLock, MeleeCombo, Possession};
use crate::animation::MontagePlayer;
use crate::components::{
    Actor, CharacterMovement, CharacterRig, MovementDefaults, RopeVisual, UiState,
};
use crate::interaction::InteractionFocus;
use crate::shared::CameraView;

/// Marker component для player-controlled entity
///
/// Input systems используют `With<Player>` filter. Possession переносит
/// marker на другого персонажа:
/// ```ignore
/// commands.entity(old_actor).remove::<Player>();
/// commands.entity(new_actor).insert(Player);
/// ```
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Player;

/// Набор способностей персонажа
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
pub enum Archetype {
    /// Grapple, pull, grapple-attack, dash
    #[default]
    Agile,
    /// Shoulder-bash, life-steal/berserk boosts
    Berserker,
}

/// Играбельный персонаж (possessable)
///
/// Тянет за собой всё, что нужно любой способности.
#[derive(Component, Debug, Clone, Copy, Default)]
#[require(
    Actor,
    CharacterMovement,
    MovementDefaults,
    CharacterRig,
    RopeVisual,
    AbilityLock,
    MontagePlayer,
    CameraView,
    UiState,
    MeleeCombo,
    Possession,
    InteractionFocus
)]
pub struct PlayerCharacter {
    pub archetype: Archetype,
}

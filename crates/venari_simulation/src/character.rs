//! Сборка играбельных персонажей из tuning
//!
//! Общая база (`player_character`) + набор способностей архетипа:
//! - Agile: grapple, pull, grapple-attack, dash
//! - Berserker: shoulder-bash, boosts
//!
//! ```ignore
//! commands.spawn((
//!     player_character(&tuning, Vec3::ZERO, Archetype::Agile),
//!     agile_abilities(&tuning),
//!     Player,
//! ));
//! ```

use bevy::prelude::*;

use crate::abilities::{
    Boosts, Dash, Grapple, GrappleAttack, HookTargeting, MeleeCombo, Possession, Pull,
    ShoulderBash,
};
use crate::components::{Archetype, CharacterMovement, Health, MovementDefaults, PlayerCharacter};
use crate::config::AbilityTuning;
use crate::shared::CameraView;

/// База любого играбельного персонажа
pub fn player_character(tuning: &AbilityTuning, position: Vec3, archetype: Archetype) -> impl Bundle {
    let transform = Transform::from_translation(position);
    let movement = CharacterMovement::from_tuning(&tuning.movement);
    let mut camera = CameraView::default();
    camera.reset_to_rig(&transform);

    (
        PlayerCharacter { archetype },
        transform,
        Health::new(tuning.movement.max_health),
        MovementDefaults::from_movement(&movement),
        movement,
        MeleeCombo::new(tuning.melee.clone()),
        Possession::new(tuning.possession),
        camera,
    )
}

pub fn agile_abilities(tuning: &AbilityTuning) -> impl Bundle {
    (
        HookTargeting::new(tuning.targeting),
        Grapple::new(tuning.grapple.clone()),
        Pull::new(tuning.pull.clone()),
        GrappleAttack::new(tuning.grapple_attack.clone()),
        Dash::new(tuning.dash.clone()),
    )
}

pub fn berserker_abilities(tuning: &AbilityTuning) -> impl Bundle {
    (
        ShoulderBash::new(tuning.shoulder_bash.clone()),
        Boosts::new(tuning.boosts),
    )
}

/// Способности по архетипу (для spawn'а из данных)
pub fn spawn_abilities(commands: &mut EntityCommands, tuning: &AbilityTuning, archetype: Archetype) {
    match archetype {
        Archetype::Agile => commands.insert(agile_abilities(tuning)),
        Archetype::Berserker => commands.insert(berserker_abilities(tuning)),
    };
}

//! Interaction domain
//!
//! Interactables (записки, рычаги, другие персонажи) регистрируют callbacks
//! в `InteractableRegistry`. Движок шлёт proximity события из interaction
//! trigger; ECS держит ближайший interactable в фокусе.
//!
//! Системы идут после input gating, чтобы possession interrupt сработал
//! в том же кадре.

use bevy::prelude::*;

pub mod registry;
pub mod systems;

pub use registry::{Interactable, InteractableRegistry, InteractionOutcome, Possessable};
pub use systems::{InteractionFocus, InteractionProximity};

use crate::input::handle_jump_input;
use crate::SimulationSet;

pub struct InteractionPlugin;

impl Plugin for InteractionPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<InteractionProximity>()
            .init_resource::<InteractableRegistry>()
            .add_systems(
                Update,
                (
                    systems::register_possessables,
                    systems::forget_despawned_interactables,
                    systems::update_interaction_focus,
                    systems::handle_interact_input,
                )
                    .chain()
                    .after(handle_jump_input)
                    .in_set(SimulationSet::Input),
            );
    }
}

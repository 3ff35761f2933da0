//! Locomotion и UI input gating

use bevy::prelude::*;

use super::events::{ActionInput, InputAction, JumpIntent, MoveInput};
use crate::abilities::{AbilityInterrupt, AbilityLock, Dash, InterruptReason, MeleeCombo, Possession};
use crate::components::{CharacterMovement, Health, Player, UiState};
use crate::logger;

/// Система: MoveInput → CharacterMovement.input
///
/// Пока способность держит `AbilityLock`, input игнорируется целиком
/// (и не запоминается для dash).
pub fn apply_move_input(
    mut inputs: EventReader<MoveInput>,
    mut characters: Query<
        (
            &mut CharacterMovement,
            &AbilityLock,
            &Health,
            &UiState,
            &Possession,
            Option<&mut Dash>,
        ),
        With<Player>,
    >,
) {
    for input in inputs.read() {
        let Ok((mut movement, lock, health, ui, possession, dash)) =
            characters.get_mut(input.entity)
        else {
            continue;
        };

        if !lock.is_free() {
            continue;
        }

        if let Some(mut dash) = dash {
            dash.store_input(input.forward, input.right);
        }

        movement.input = if health.is_dead() || ui.blocks_abilities() || possession.is_possessing() {
            Vec2::ZERO
        } else {
            Vec2::new(input.forward, input.right)
        };
    }
}

/// Система: Jump pressed → JumpIntent
pub fn handle_jump_input(
    mut inputs: EventReader<ActionInput>,
    characters: Query<(&AbilityLock, &Health, &UiState, &Possession, Option<&MeleeCombo>), With<Player>>,
    mut jump_events: EventWriter<JumpIntent>,
) {
    for input in inputs.read() {
        if !input.is_pressed(InputAction::Jump) {
            continue;
        }
        let Ok((lock, health, ui, possession, melee)) = characters.get(input.entity) else {
            continue;
        };

        let attacking = melee.is_some_and(|melee| melee.in_attack_animation());
        if !lock.is_free()
            || health.is_dead()
            || ui.blocks_abilities()
            || possession.is_possessing()
            || attacking
        {
            continue;
        }

        jump_events.write(JumpIntent {
            entity: input.entity,
        });
    }
}

/// Система: inventory (hold) и notebook (toggle on release)
///
/// Открытие блокнота прерывает все способности.
pub fn handle_ui_input(
    mut inputs: EventReader<ActionInput>,
    mut characters: Query<(&mut UiState, &Health), With<Player>>,
    mut interrupts: EventWriter<AbilityInterrupt>,
) {
    for input in inputs.read() {
        let Ok((mut ui, health)) = characters.get_mut(input.entity) else {
            continue;
        };

        if input.is_pressed(InputAction::Inventory) {
            ui.inventory_open = health.is_alive();
        } else if input.is_released(InputAction::Inventory) {
            ui.inventory_open = false;
        } else if input.is_released(InputAction::Notebook) {
            if health.is_dead() {
                continue;
            }
            ui.notebook_open = !ui.notebook_open;
            if ui.notebook_open {
                interrupts.write(AbilityInterrupt {
                    entity: input.entity,
                    reason: InterruptReason::BlockingUi,
                });
            }
            logger::log(&format!(
                "📓 ECS: {:?} notebook {}",
                input.entity,
                if ui.notebook_open { "opened" } else { "closed" }
            ));
        }
    }
}

//! Interaction focus и interact input

use bevy::prelude::*;

use super::registry::{InteractableRegistry, InteractionOutcome, Possessable};
use crate::abilities::{AbilityInterrupt, InterruptReason, MeleeCombo, Possession};
use crate::components::{Health, Player, PlayerCharacter, UiState};
use crate::input::{ActionInput, InputAction};
use crate::logger;

/// Interactables в радиусе и текущий (ближайший) из них
#[derive(Component, Debug, Clone, Default, PartialEq)]
pub struct InteractionFocus {
    current: Option<Entity>,
    in_range: Vec<Entity>,
}

impl InteractionFocus {
    pub fn current(&self) -> Option<Entity> {
        self.current
    }

    pub fn in_range(&self) -> &[Entity] {
        &self.in_range
    }

    fn forget(&mut self, entity: Entity) {
        self.in_range.retain(|other| *other != entity);
        if self.current == Some(entity) {
            self.current = None;
        }
    }
}

/// Event: interactable вошёл/вышел из interaction trigger (Engine → ECS)
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct InteractionProximity {
    pub interactor: Entity,
    pub interactable: Entity,
    pub entered: bool,
}

/// Ближайший к `origin` из `candidates`
fn closest(origin: Vec3, candidates: &[Entity], positions: &Query<&GlobalTransform>) -> Option<Entity> {
    candidates
        .iter()
        .filter_map(|entity| {
            positions
                .get(*entity)
                .ok()
                .map(|global| (*entity, global.translation().distance_squared(origin)))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(entity, _)| entity)
}

fn refocus(
    focus: &mut InteractionFocus,
    origin: Vec3,
    positions: &Query<&GlobalTransform>,
    registry: &mut InteractableRegistry,
) {
    let next = closest(origin, &focus.in_range, positions);
    if next == focus.current {
        return;
    }
    if let Some(previous) = focus.current {
        registry.disable(previous);
    }
    // Recheck: on_disable мог удалить запись
    focus.current = next.filter(|entity| registry.contains(*entity));
    if let Some(current) = focus.current {
        registry.enable(current);
    }
}

/// Система: играбельные персонажи регистрируются как possessable
pub fn register_possessables(
    added: Query<Entity, Added<PlayerCharacter>>,
    mut removed: RemovedComponents<PlayerCharacter>,
    mut registry: ResMut<InteractableRegistry>,
) {
    for entity in added.iter() {
        registry.register(entity, Possessable);
    }
    for entity in removed.read() {
        registry.unregister(entity);
    }
}

/// Система: interactables, despawn'нутые извне, уходят из registry и фокуса
pub fn forget_despawned_interactables(
    mut removed: RemovedComponents<Transform>,
    alive: Query<()>,
    mut focuses: Query<&mut InteractionFocus>,
    mut registry: ResMut<InteractableRegistry>,
) {
    for entity in removed.read() {
        if alive.get(entity).is_ok() {
            continue;
        }
        if registry.unregister(entity) {
            logger::log(&format!("🤚 ECS: interactable {:?} despawned, unregistered", entity));
        }
        for mut focus in focuses.iter_mut() {
            if focus.current == Some(entity) || focus.in_range.contains(&entity) {
                focus.forget(entity);
            }
        }
    }
}

/// Система: proximity enter/exit → ближайший interactable в фокусе
pub fn update_interaction_focus(
    mut proximity: EventReader<InteractionProximity>,
    mut players: Query<(&mut InteractionFocus, &Possession), With<Player>>,
    positions: Query<&GlobalTransform>,
    mut registry: ResMut<InteractableRegistry>,
) {
    for event in proximity.read() {
        if event.interactor == event.interactable {
            continue;
        }
        let Ok((mut focus, possession)) = players.get_mut(event.interactor) else {
            continue;
        };
        if possession.is_possessing() {
            continue;
        }

        if event.entered {
            if !registry.contains(event.interactable) || focus.in_range.contains(&event.interactable) {
                continue;
            }
            focus.in_range.push(event.interactable);
        } else {
            if focus.current == Some(event.interactable) {
                registry.disable(event.interactable);
                focus.current = None;
            }
            focus.forget(event.interactable);
        }

        let origin = positions
            .get(event.interactor)
            .map(|global| global.translation())
            .unwrap_or(Vec3::ZERO);
        refocus(&mut focus, origin, &positions, &mut registry);
    }
}

/// Система: Interact pressed → callback текущего interactable
pub fn handle_interact_input(
    mut commands: Commands,
    mut inputs: EventReader<ActionInput>,
    mut players: Query<
        (
            &mut InteractionFocus,
            &mut Possession,
            &Health,
            &UiState,
            Option<&MeleeCombo>,
        ),
        With<Player>,
    >,
    possessable: Query<(), (With<PlayerCharacter>, Without<Player>)>,
    positions: Query<&GlobalTransform>,
    mut registry: ResMut<InteractableRegistry>,
    mut interrupts: EventWriter<AbilityInterrupt>,
) {
    for input in inputs.read() {
        if !input.is_pressed(InputAction::Interact) {
            continue;
        }
        let Ok((mut focus, mut possession, health, ui, melee)) = players.get_mut(input.entity) else {
            continue;
        };

        let attacking = melee.is_some_and(|melee| melee.in_attack_animation());
        if health.is_dead() || possession.is_possessing() || ui.blocks_abilities() || attacking {
            continue;
        }

        let Some(target) = focus.current else {
            continue;
        };

        match registry.interact(target, input.entity) {
            None => {
                // Запись исчезла без нашего участия
                focus.forget(target);
            }
            Some(InteractionOutcome::Handled) => {}
            Some(InteractionOutcome::Destroyed) => {
                focus.forget(target);
                if let Ok(mut entity) = commands.get_entity(target) {
                    entity.despawn();
                }
                logger::log(&format!(
                    "🤚 ECS: {:?} consumed interactable {:?}",
                    input.entity, target
                ));
                let origin = positions
                    .get(input.entity)
                    .map(|global| global.translation())
                    .unwrap_or(Vec3::ZERO);
                refocus(&mut focus, origin, &positions, &mut registry);
            }
            Some(InteractionOutcome::RequestPossession) => {
                if possessable.get(target).is_err() || !possession.start(target) {
                    continue;
                }
                focus.current = None;
                focus.in_range.clear();
                interrupts.write(AbilityInterrupt {
                    entity: input.entity,
                    reason: InterruptReason::Possession,
                });
                logger::log_info(&format!(
                    "🎭 ECS: {:?} started possessing {:?}",
                    input.entity, target
                ));
            }
        }
    }
}

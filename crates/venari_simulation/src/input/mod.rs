//! Input domain
//!
//! Движок переводит устройства ввода в `ActionInput`/`MoveInput` для
//! player-controlled entity. Ability input читают системы `abilities`;
//! здесь только locomotion, jump и UI флаги.

use bevy::prelude::*;

pub mod events;
pub mod systems;

pub use events::*;
pub use systems::{apply_move_input, handle_jump_input, handle_ui_input};

use crate::SimulationSet;

pub struct InputPlugin;

impl Plugin for InputPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<ActionInput>()
            .add_event::<MoveInput>()
            .add_event::<JumpIntent>()
            .add_systems(
                Update,
                (handle_ui_input, apply_move_input, handle_jump_input)
                    .chain()
                    .in_set(SimulationSet::Input),
            );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abilities::{AbilityInterrupt, AbilityKind, AbilityLock, Dash};
    use crate::components::{CharacterMovement, Player, PlayerCharacter, UiState};
    use crate::{create_headless_app, SimulationPlugin};

    fn player_app() -> (App, Entity) {
        let mut app = create_headless_app(42);
        app.add_plugins(SimulationPlugin);
        let player = app
            .world_mut()
            .spawn((PlayerCharacter::default(), Player, Dash::default()))
            .id();
        (app, player)
    }

    #[test]
    fn test_move_input_is_ignored_while_lock_held() {
        let (mut app, player) = player_app();

        app.world_mut().send_event(MoveInput {
            entity: player,
            forward: 1.0,
            right: -0.5,
        });
        app.update();
        assert_eq!(
            app.world().get::<CharacterMovement>(player).unwrap().input,
            Vec2::new(1.0, -0.5)
        );
        assert_eq!(
            app.world().get::<Dash>(player).unwrap().stored_input(),
            Vec2::new(1.0, -1.0)
        );

        app.world_mut()
            .get_mut::<AbilityLock>(player)
            .unwrap()
            .try_claim(AbilityKind::Grapple);
        app.world_mut().send_event(MoveInput {
            entity: player,
            forward: -1.0,
            right: 0.0,
        });
        app.update();
        assert_eq!(
            app.world().get::<Dash>(player).unwrap().stored_input(),
            Vec2::new(1.0, -1.0),
            "Locked character keeps previous dash input"
        );
    }

    #[test]
    fn test_notebook_toggles_on_release_and_interrupts() {
        let (mut app, player) = player_app();

        app.world_mut()
            .send_event(ActionInput::pressed(player, InputAction::Notebook));
        app.update();
        assert!(!app.world().get::<UiState>(player).unwrap().notebook_open);

        app.world_mut()
            .send_event(ActionInput::released(player, InputAction::Notebook));
        app.update();
        assert!(app.world().get::<UiState>(player).unwrap().notebook_open);

        let interrupts: Vec<_> = app
            .world_mut()
            .resource_mut::<Events<AbilityInterrupt>>()
            .drain()
            .collect();
        assert_eq!(interrupts.len(), 1);

        // Jump заблокирован, пока блокнот открыт
        app.world_mut()
            .send_event(ActionInput::pressed(player, InputAction::Jump));
        app.update();
        let jumps = app
            .world_mut()
            .resource_mut::<Events<JumpIntent>>()
            .drain()
            .count();
        assert_eq!(jumps, 0);
    }

    #[test]
    fn test_inventory_follows_button() {
        let (mut app, player) = player_app();

        app.world_mut()
            .send_event(ActionInput::pressed(player, InputAction::Inventory));
        app.update();
        assert!(app.world().get::<UiState>(player).unwrap().inventory_open);

        app.world_mut()
            .send_event(ActionInput::released(player, InputAction::Inventory));
        app.update();
        assert!(!app.world().get::<UiState>(player).unwrap().inventory_open);
    }
}

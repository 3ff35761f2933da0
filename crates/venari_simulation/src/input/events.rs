//! Input events (Engine → ECS) и intents (ECS → Engine)

use bevy::prelude::*;

/// Кнопки gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAction {
    Jump,
    MeleeAttack,
    Interact,
    Hook,
    Dash,
    ShoulderBash,
    LifeStealBoost,
    BerserkBoost,
    Inventory,
    Notebook,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonState {
    Pressed,
    Released,
}

/// Event: нажатие/отпускание кнопки для entity
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct ActionInput {
    pub entity: Entity,
    pub action: InputAction,
    pub state: ButtonState,
}

impl ActionInput {
    pub fn pressed(entity: Entity, action: InputAction) -> Self {
        Self {
            entity,
            action,
            state: ButtonState::Pressed,
        }
    }

    pub fn released(entity: Entity, action: InputAction) -> Self {
        Self {
            entity,
            action,
            state: ButtonState::Released,
        }
    }

    pub fn is_pressed(&self, action: InputAction) -> bool {
        self.action == action && self.state == ButtonState::Pressed
    }

    pub fn is_released(&self, action: InputAction) -> bool {
        self.action == action && self.state == ButtonState::Released
    }
}

/// Event: оси движения за кадр (-1..1)
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct MoveInput {
    pub entity: Entity,
    pub forward: f32,
    pub right: f32,
}

/// Event: намерение прыгнуть (jump intent)
///
/// Движок проверяет, стоит ли персонаж на земле, и применяет jump velocity.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct JumpIntent {
    pub entity: Entity,
}

//! UI blocking flags

use bevy::prelude::*;

/// Открытые окна, блокирующие gameplay
///
/// Сами виджеты живут в движке; ECS знает только флаги.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UiState {
    /// Открыт пока зажата кнопка инвентаря
    pub inventory_open: bool,
    /// Toggle на release кнопки блокнота; блокирует способности
    pub notebook_open: bool,
}

impl UiState {
    pub fn blocks_abilities(&self) -> bool {
        self.notebook_open
    }
}

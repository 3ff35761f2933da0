//! Hook points: точки, за которые цепляется трос
//!
//! Pullable hook point — child (`ChildOf`) физического тела с `PullableBody`.
//! Enemy hook point — child entity с `Enemy`.

use bevy::prelude::*;

/// Что делает трос при попадании в hook point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
pub enum HookType {
    /// Персонаж перелетает к точке
    #[default]
    Grapplable,
    /// Тело притягивается к персонажу и бросается
    Pullable,
    /// Grapple-attack к врагу
    Enemy,
    /// Отключённая точка
    None,
}

/// Hook point в мире
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
#[require(Transform)]
pub struct HookPoint {
    pub kind: HookType,
    /// Predicate "можно использовать прямо сейчас" (пишется движком/скриптами)
    pub usable: bool,
    /// Точка приземления относительно hook point
    pub landing_offset: Vec3,
    /// Подсвечен ли как текущая цель
    pub focused: bool,
    pub uses: u32,
}

impl Default for HookPoint {
    fn default() -> Self {
        Self::new(HookType::Grapplable)
    }
}

impl HookPoint {
    pub fn new(kind: HookType) -> Self {
        Self {
            kind,
            usable: true,
            landing_offset: Vec3::ZERO,
            focused: false,
            uses: 0,
        }
    }

    pub fn with_landing_offset(mut self, offset: Vec3) -> Self {
        self.landing_offset = offset;
        self
    }

    pub fn landing_point(&self, hook_position: Vec3) -> Vec3 {
        hook_position + self.landing_offset
    }

    pub fn activate(&mut self) {
        self.focused = true;
    }

    pub fn deactivate(&mut self) {
        self.focused = false;
    }

    pub fn mark_used(&mut self) {
        self.uses += 1;
    }
}

/// Физическое тело, которое можно притянуть и бросить
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct PullableBody {
    pub mass: f32,
}

impl Default for PullableBody {
    fn default() -> Self {
        Self { mass: 1.0 }
    }
}

/// Точка, в которую автоматически наводится бросок
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct ThrowTarget;

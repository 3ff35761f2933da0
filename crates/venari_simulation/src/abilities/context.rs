//! Общий mutable доступ к персонажу для state machines способностей
//!
//! Каждая способность получает `AbilityCtx` и меняет через него
//! movement/animation/rope. Системы собирают контекст из `BodyData` query.

use bevy::prelude::*;

use super::{AbilityLock, MeleeCombo};
use crate::animation::{Clip, MontagePlayer};
use crate::components::{
    character_forward, CharacterMovement, CharacterRig, MovementDefaults, MovementMode, RopeVisual,
};
use crate::shared::yaw_towards;

/// Query data персонажа, нужная любой способности
pub type BodyData = (
    &'static mut Transform,
    &'static mut CharacterMovement,
    &'static MovementDefaults,
    &'static CharacterRig,
    &'static mut AbilityLock,
    &'static mut MontagePlayer,
    Option<&'static mut RopeVisual>,
    Option<&'static mut MeleeCombo>,
);

/// Item от `BodyData`
pub type BodyItem<'w> = (
    Mut<'w, Transform>,
    Mut<'w, CharacterMovement>,
    &'w MovementDefaults,
    &'w CharacterRig,
    Mut<'w, AbilityLock>,
    Mut<'w, MontagePlayer>,
    Option<Mut<'w, RopeVisual>>,
    Option<Mut<'w, MeleeCombo>>,
);

pub struct AbilityCtx<'a> {
    pub transform: &'a mut Transform,
    pub movement: &'a mut CharacterMovement,
    pub defaults: &'a MovementDefaults,
    pub rig: &'a CharacterRig,
    pub lock: &'a mut AbilityLock,
    pub montage: &'a mut MontagePlayer,
    pub rope: Option<&'a mut RopeVisual>,
    pub melee: Option<&'a mut MeleeCombo>,
}

impl<'a> AbilityCtx<'a> {
    pub fn from_body<'w: 'a>(body: &'a mut BodyItem<'w>) -> Self {
        let (transform, movement, defaults, rig, lock, montage, rope, melee) = body;
        Self {
            transform: &mut **transform,
            movement: &mut **movement,
            defaults: *defaults,
            rig: *rig,
            lock: &mut **lock,
            montage: &mut **montage,
            rope: rope.as_deref_mut(),
            melee: melee.as_deref_mut(),
        }
    }

    pub fn position(&self) -> Vec3 {
        self.transform.translation
    }

    pub fn forward(&self) -> Vec3 {
        character_forward(self.transform)
    }

    pub fn hand(&self) -> Vec3 {
        self.rig.hand_position(self.transform)
    }

    /// Yaw-only поворот к точке
    pub fn face_towards(&mut self, target: Vec3) {
        if let Some(rotation) = yaw_towards(self.transform.translation, target) {
            self.transform.rotation = rotation;
        }
    }

    pub fn play(&mut self, clip: &Clip) {
        self.montage.play(clip);
    }

    /// Walk speed, acceleration и gravity scale из `MovementDefaults`
    pub fn restore_movement(&mut self) {
        self.defaults.restore(self.movement);
    }

    /// Movement override для полёта по тросу: без гравитации, без инерции
    pub fn suspend_gravity(&mut self) {
        self.movement.gravity_scale = 0.0;
        self.movement.stop_immediately();
        self.movement.mode = MovementMode::Falling;
    }

    pub fn set_rope_visible(&mut self, visible: bool) {
        if let Some(rope) = self.rope.as_deref_mut() {
            rope.visible = visible;
        }
    }

    pub fn set_rope(&mut self, length: f32, end: Vec3) {
        if let Some(rope) = self.rope.as_deref_mut() {
            rope.length = length;
            rope.end = end;
        }
    }

    /// Melee: идёт ли атака без открытого combo window
    pub fn attack_blocks_queue(&self) -> bool {
        self.melee
            .as_deref()
            .is_some_and(|melee| melee.in_attack_animation() && !melee.window_open())
    }

    pub fn attack_animation_playing(&self) -> bool {
        self.melee
            .as_deref()
            .is_some_and(|melee| melee.in_attack_animation())
    }

    pub fn queue_special(&mut self) {
        if let Some(melee) = self.melee.as_deref_mut() {
            melee.queue_special();
        }
    }

    pub fn clear_queued_special(&mut self) {
        if let Some(melee) = self.melee.as_deref_mut() {
            melee.clear_queued_special();
        }
    }

    pub fn end_attack_animation(&mut self) {
        if let Some(melee) = self.melee.as_deref_mut() {
            melee.end_attack_animation(self.montage);
        }
    }

    pub fn stop_combo(&mut self) {
        if let Some(melee) = self.melee.as_deref_mut() {
            melee.stop_combo(self.montage);
        }
    }

    pub fn register_hit(&mut self) {
        if let Some(melee) = self.melee.as_deref_mut() {
            melee.register_hit();
        }
    }
}

/// Тестовое тело персонажа без ECS
#[cfg(test)]
pub(crate) mod test_body {
    use super::*;

    pub struct TestBody {
        pub transform: Transform,
        pub movement: CharacterMovement,
        pub defaults: MovementDefaults,
        pub rig: CharacterRig,
        pub lock: AbilityLock,
        pub montage: MontagePlayer,
        pub rope: RopeVisual,
        pub melee: MeleeCombo,
    }

    impl Default for TestBody {
        fn default() -> Self {
            let movement = CharacterMovement::default();
            Self {
                transform: Transform::default(),
                defaults: MovementDefaults::from_movement(&movement),
                movement,
                rig: CharacterRig::default(),
                lock: AbilityLock::default(),
                montage: MontagePlayer::default(),
                rope: RopeVisual::default(),
                melee: MeleeCombo::default(),
            }
        }
    }

    impl TestBody {
        pub fn at(position: Vec3) -> Self {
            Self {
                transform: Transform::from_translation(position),
                ..Default::default()
            }
        }

        pub fn ctx(&mut self) -> AbilityCtx<'_> {
            AbilityCtx {
                transform: &mut self.transform,
                movement: &mut self.movement,
                defaults: &self.defaults,
                rig: &self.rig,
                lock: &mut self.lock,
                montage: &mut self.montage,
                rope: Some(&mut self.rope),
                melee: Some(&mut self.melee),
            }
        }
    }
}

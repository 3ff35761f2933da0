//! Grapple: перелёт персонажа к hook point по тросу
//!
//! Idle → Animating (клип бросает трос) → Moving (notify GrappleMovementStart)
//! → Idle (notify GrappleEnd или interrupt).
//! Во время Moving позиция целиком задаётся кривыми от прогресса клипа.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::context::{AbilityCtx, BodyData};
use super::curve::{LaunchVariant, TravelProfile};
use super::AbilityKind;
use crate::animation::{AnimNotify, Clip, Notify};
use crate::logger;
use crate::shared::UP;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrappleConfig {
    /// Максимальная дистанция персонаж → hook point
    pub throw_distance: f32,
    /// Подъём точки приземления над landing point
    pub landing_offset: f32,
    pub ground_clip: Clip,
    pub air_clip: Clip,
    pub curves: TravelProfile,
}

impl Default for GrappleConfig {
    fn default() -> Self {
        Self {
            throw_distance: 500.0,
            landing_offset: 50.0,
            ground_clip: Clip::new("grapple_ground"),
            air_clip: Clip::new("grapple_air"),
            curves: TravelProfile::default(),
        }
    }
}

impl GrappleConfig {
    pub fn clip(&self, variant: LaunchVariant) -> &Clip {
        match variant {
            LaunchVariant::Ground => &self.ground_clip,
            LaunchVariant::Air => &self.air_clip,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum GrappleState {
    #[default]
    Idle,
    /// Клип играет, трос летит; персонаж ещё на месте
    Animating {
        variant: LaunchVariant,
        anchor: Vec3,
        destination: Vec3,
        rope_base: f32,
    },
    /// Movement override: позиция по кривым
    Moving {
        variant: LaunchVariant,
        anchor: Vec3,
        start: Vec3,
        destination: Vec3,
        rope_base: f32,
    },
}

#[derive(Component, Debug, Clone, Default, PartialEq)]
pub struct Grapple {
    pub config: GrappleConfig,
    state: GrappleState,
}

impl Grapple {
    pub fn new(config: GrappleConfig) -> Self {
        Self {
            config,
            state: GrappleState::Idle,
        }
    }

    pub fn state(&self) -> GrappleState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state != GrappleState::Idle
    }

    pub fn is_moving(&self) -> bool {
        matches!(self.state, GrappleState::Moving { .. })
    }

    /// Точка, куда прилетит персонаж
    pub fn destination_for(&self, landing_point: Vec3) -> Vec3 {
        landing_point + UP * self.config.landing_offset
    }

    /// Старт grapple. `anchor` — позиция hook point, `landing_point` — куда лететь.
    pub fn trigger(&mut self, ctx: &mut AbilityCtx, anchor: Vec3, landing_point: Vec3) -> bool {
        if self.is_active() || !ctx.lock.try_claim(AbilityKind::Grapple) {
            return false;
        }

        let destination = self.destination_for(landing_point);
        let variant = LaunchVariant::of(ctx.movement);

        ctx.face_towards(destination);
        let rope_base = destination.distance(ctx.position());
        ctx.play(self.config.clip(variant));

        self.state = GrappleState::Animating {
            variant,
            anchor,
            destination,
            rope_base,
        };
        true
    }

    /// Notify GrappleMovementStart
    pub fn start_movement(&mut self, ctx: &mut AbilityCtx) -> bool {
        let GrappleState::Animating {
            variant,
            anchor,
            destination,
            rope_base,
        } = self.state
        else {
            return false;
        };

        ctx.suspend_gravity();
        self.state = GrappleState::Moving {
            variant,
            anchor,
            start: ctx.position(),
            destination,
            rope_base,
        };
        true
    }

    pub fn tick(&mut self, ctx: &mut AbilityCtx) {
        let (variant, anchor, rope_base) = match self.state {
            GrappleState::Idle => return,
            GrappleState::Animating {
                variant,
                anchor,
                rope_base,
                ..
            } => (variant, anchor, rope_base),
            GrappleState::Moving {
                variant,
                anchor,
                start,
                destination,
                rope_base,
            } => {
                let progress = ctx.montage.progress_of(self.config.clip(variant));
                let curves = self.config.curves.curves(variant);
                ctx.transform.translation = start.lerp(destination, curves.speed.sample(progress))
                    + UP * curves.height.sample(progress);
                (variant, anchor, rope_base)
            }
        };

        let progress = ctx.montage.progress_of(self.config.clip(variant));
        let curves = self.config.curves.curves(variant);
        let hand = ctx.hand();
        ctx.set_rope(
            rope_base * curves.rope_length.sample(progress),
            hand.lerp(anchor, curves.rope_position.sample(progress)),
        );
    }

    /// Notify GrappleEnd / interrupt / dash. No-op если Idle.
    pub fn reset(&mut self, ctx: &mut AbilityCtx) {
        if !self.is_active() {
            return;
        }
        self.state = GrappleState::Idle;
        ctx.restore_movement();
        ctx.set_rope_visible(false);
        ctx.lock.release(AbilityKind::Grapple);
    }
}

/// Система: GrappleMovementStart / GrappleEnd notifies
pub fn on_grapple_notifies(
    mut notifies: EventReader<AnimNotify>,
    mut characters: Query<(BodyData, &mut Grapple)>,
) {
    for event in notifies.read() {
        let Ok((mut body, mut grapple)) = characters.get_mut(event.entity) else {
            continue;
        };
        let mut ctx = AbilityCtx::from_body(&mut body);

        match event.notify {
            Notify::GrappleMovementStart => {
                if grapple.start_movement(&mut ctx) {
                    logger::log(&format!("🪝 ECS: {:?} grapple movement started", event.entity));
                }
            }
            Notify::GrappleEnd => {
                grapple.reset(&mut ctx);
            }
            _ => {}
        }
    }
}

/// Система: движение по кривым + трос
pub fn tick_grapple(mut characters: Query<(BodyData, &mut Grapple)>) {
    for (mut body, mut grapple) in characters.iter_mut() {
        if !grapple.is_active() {
            continue;
        }
        let mut ctx = AbilityCtx::from_body(&mut body);
        grapple.tick(&mut ctx);
    }
}

//! Pull: трос цепляется за физическое тело, тянет его к персонажу и бросает
//!
//! Idle → RopeTravelling (трос летит по кривым) → Pulling (ExternalForce на теле)
//! → release: бросок импульсом или отмена → Idle.

use bevy::prelude::*;
use bevy_rapier3d::prelude::{ExternalForce, ExternalImpulse, Velocity};
use serde::{Deserialize, Serialize};

use super::context::{AbilityCtx, BodyData};
use super::curve::{LaunchVariant, TravelProfile};
use super::targeting::{find_throw_target, TargetingConfig};
use super::AbilityKind;
use crate::animation::Clip;
use crate::components::{HookPoint, PullableBody, ThrowTarget};
use crate::logger;
use crate::physics::{force_at_point, halt};
use crate::shared::{CameraView, UP};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PullConfig {
    pub throw_distance: f32,
    pub can_pull_while_falling: bool,
    /// Модуль силы притягивания
    pub pull_speed: f32,
    /// Дистанция рука ↔ hook, на которой тело отпускается
    pub pull_min_distance: f32,
    pub throw_force: f32,
    /// Смещение точки притягивания вдоль взгляда камеры
    pub forward_offset: f32,
    /// Минимальный dot(скорость тела, направление броска)
    pub throw_alignment_threshold: f32,
    /// Подъём прицела броска (доля дистанции до throw target)
    pub throw_offset: f32,
    /// Тело медленнее этого не бросается
    pub stillness_threshold: f32,
    /// Вклад текущей скорости тела в бросок без throw target
    pub velocity_effect: f32,
    pub ground_clip: Clip,
    pub air_clip: Clip,
    pub curves: TravelProfile,
}

impl Default for PullConfig {
    fn default() -> Self {
        Self {
            throw_distance: 500.0,
            can_pull_while_falling: false,
            pull_speed: 1000.0,
            pull_min_distance: 150.0,
            throw_force: 1500.0,
            forward_offset: 100.0,
            throw_alignment_threshold: -1.0,
            throw_offset: 0.0,
            stillness_threshold: 0.1,
            velocity_effect: 0.0,
            ground_clip: Clip::new("pull_ground"),
            air_clip: Clip::new("pull_air"),
            curves: TravelProfile::default(),
        }
    }
}

impl PullConfig {
    pub fn clip(&self, variant: LaunchVariant) -> &Clip {
        match variant {
            LaunchVariant::Ground => &self.ground_clip,
            LaunchVariant::Air => &self.air_clip,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum PullState {
    #[default]
    Idle,
    RopeTravelling {
        variant: LaunchVariant,
        hook: Entity,
        body: Entity,
        rope_base: f32,
    },
    Pulling {
        hook: Entity,
        body: Entity,
    },
}

#[derive(Component, Debug, Clone, Default, PartialEq)]
pub struct Pull {
    pub config: PullConfig,
    state: PullState,
}

impl Pull {
    pub fn new(config: PullConfig) -> Self {
        Self {
            config,
            state: PullState::Idle,
        }
    }

    pub fn state(&self) -> PullState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state != PullState::Idle
    }

    pub fn is_pulling(&self) -> bool {
        matches!(self.state, PullState::Pulling { .. })
    }

    pub fn hook(&self) -> Option<Entity> {
        match self.state {
            PullState::Idle => None,
            PullState::RopeTravelling { hook, .. } | PullState::Pulling { hook, .. } => Some(hook),
        }
    }

    pub fn body(&self) -> Option<Entity> {
        match self.state {
            PullState::Idle => None,
            PullState::RopeTravelling { body, .. } | PullState::Pulling { body, .. } => Some(body),
        }
    }

    pub fn trigger(&mut self, ctx: &mut AbilityCtx, hook: Entity, body: Entity, anchor: Vec3) -> bool {
        if self.is_active() {
            return false;
        }
        if !self.config.can_pull_while_falling && ctx.movement.is_falling() {
            return false;
        }
        if !ctx.lock.try_claim(AbilityKind::Pull) {
            return false;
        }

        let variant = LaunchVariant::of(ctx.movement);
        ctx.face_towards(anchor);
        let rope_base = anchor.distance(ctx.position());
        ctx.play(self.config.clip(variant));

        self.state = PullState::RopeTravelling {
            variant,
            hook,
            body,
            rope_base,
        };
        true
    }

    /// Трос летит к anchor. Возвращает true, когда началось притягивание.
    pub fn tick_rope(&mut self, ctx: &mut AbilityCtx, anchor: Vec3, delta: f32) -> bool {
        let PullState::RopeTravelling {
            variant,
            hook,
            body,
            rope_base,
        } = self.state
        else {
            return false;
        };

        let progress = ctx.montage.progress_of(self.config.clip(variant));
        let curves = self.config.curves.curves(variant);
        let hand = ctx.hand();
        let end = hand.lerp(anchor, curves.rope_position.sample(progress));
        ctx.set_rope(rope_base * curves.rope_length.sample(progress), end);

        // Остаток пути меньше одного кадра притягивания
        if anchor.distance(end) < self.config.pull_speed * delta {
            self.state = PullState::Pulling { hook, body };
            return true;
        }
        false
    }

    /// Сила на теле: от anchor к руке, смещённой вдоль взгляда камеры
    pub fn pull_force(&self, hand: Vec3, anchor: Vec3, camera_forward: Vec3) -> Vec3 {
        (hand - anchor + camera_forward * self.config.forward_offset).normalize_or_zero()
            * self.config.pull_speed
    }

    pub fn should_release(&self, hand: Vec3, anchor: Vec3) -> bool {
        hand.distance(anchor) < self.config.pull_min_distance
    }

    /// Конец pull без броска. Возвращает тело, с которого надо снять силу.
    pub fn end(&mut self, ctx: &mut AbilityCtx) -> Option<Entity> {
        let body = self.body()?;
        self.state = PullState::Idle;
        ctx.montage.stop();
        ctx.set_rope_visible(false);
        ctx.lock.release(AbilityKind::Pull);
        Some(body)
    }
}

/// Входные данные броска
#[derive(Debug, Clone, Copy)]
pub struct ThrowSetup {
    pub body_velocity: Vec3,
    pub body_position: Vec3,
    pub character_position: Vec3,
    pub camera_forward: Vec3,
}

/// Направление броска или None (тело стоит / камера не довернулась)
///
/// `throw_target` вызывается только если обе проверки пройдены.
pub fn throw_direction(
    config: &PullConfig,
    setup: &ThrowSetup,
    throw_target: impl FnOnce() -> Option<Vec3>,
) -> Option<Vec3> {
    let speed = setup.body_velocity.length();
    if speed <= config.stillness_threshold {
        return None;
    }
    let velocity_direction = setup.body_velocity / speed;

    let toward_character = (setup.character_position - setup.body_position).normalize_or_zero();
    let aim = (setup.camera_forward * 3.0 + toward_character).normalize_or_zero();
    if velocity_direction.dot(aim) < config.throw_alignment_threshold {
        return None;
    }

    let direction = match throw_target() {
        Some(target) => {
            let lift = UP * target.distance(setup.body_position) * config.throw_offset;
            (target + lift - setup.body_position) + setup.camera_forward
        }
        None => aim + velocity_direction * config.velocity_effect,
    };

    direction.try_normalize()
}

/// Event: тело брошено (ECS → Engine, для звука/VFX)
#[derive(Event, Debug, Clone, Copy)]
pub struct ObjectThrown {
    pub thrower: Entity,
    pub body: Entity,
    pub impulse: Vec3,
}

pub(crate) type PulledBodies<'w, 's> = Query<
    'w,
    's,
    (
        &'static GlobalTransform,
        &'static PullableBody,
        &'static mut Velocity,
        &'static mut ExternalForce,
        &'static mut ExternalImpulse,
    ),
>;

/// Отпускание тела: бросок если возможно, затем конец pull
pub(crate) fn release_pull(
    thrower: Entity,
    pull: &mut Pull,
    ctx: &mut AbilityCtx,
    camera: &CameraView,
    targeting: &TargetingConfig,
    bodies: &mut PulledBodies,
    throw_targets: &Query<&GlobalTransform, With<ThrowTarget>>,
    thrown_events: &mut EventWriter<ObjectThrown>,
) {
    if !pull.is_active() {
        return;
    }
    let was_pulling = pull.is_pulling();
    let Some(body) = pull.end(ctx) else {
        return;
    };

    let Ok((global, pullable, mut velocity, mut force, mut impulse)) = bodies.get_mut(body) else {
        return;
    };
    *force = ExternalForce::default();

    if !was_pulling {
        return;
    }

    let origin = ctx.position();
    let setup = ThrowSetup {
        body_velocity: velocity.linvel,
        body_position: global.translation(),
        character_position: origin,
        camera_forward: camera.forward,
    };
    let direction = throw_direction(&pull.config, &setup, || {
        find_throw_target(
            origin,
            camera,
            targeting,
            throw_targets.iter().map(|target| target.translation()),
        )
    });

    let Some(direction) = direction else {
        logger::log(&format!("🪢 ECS: {:?} released {:?} without throw", thrower, body));
        return;
    };

    halt(&mut velocity);
    let throw = direction * pull.config.throw_force * pullable.mass;
    impulse.impulse += throw;
    thrown_events.write(ObjectThrown {
        thrower,
        body,
        impulse: throw,
    });
    logger::log_info(&format!("🪢 ECS: {:?} threw {:?} (impulse {:?})", thrower, body, throw));
}

/// Система: полёт троса и притягивание тела
pub fn tick_pull(
    time: Res<Time>,
    mut characters: Query<(
        Entity,
        BodyData,
        &mut Pull,
        &CameraView,
        &super::HookTargeting,
    )>,
    hooks: Query<&GlobalTransform, With<HookPoint>>,
    mut bodies: PulledBodies,
    throw_targets: Query<&GlobalTransform, With<ThrowTarget>>,
    mut thrown_events: EventWriter<ObjectThrown>,
) {
    let delta = time.delta_secs();

    for (entity, mut body, mut pull, camera, targeting) in characters.iter_mut() {
        let Some(hook) = pull.hook() else {
            continue;
        };
        let mut ctx = AbilityCtx::from_body(&mut body);

        // Hook point исчез вместе с телом
        let Ok(anchor) = hooks.get(hook).map(|global| global.translation()) else {
            if let Some(pulled) = pull.end(&mut ctx) {
                if let Ok((_, _, _, mut force, _)) = bodies.get_mut(pulled) {
                    *force = ExternalForce::default();
                }
            }
            continue;
        };

        if !pull.is_pulling() {
            if pull.tick_rope(&mut ctx, anchor, delta) {
                logger::log(&format!("🪢 ECS: {:?} rope reached pull target", entity));
            }
            continue;
        }

        let hand = ctx.hand();
        ctx.set_rope(anchor.distance(ctx.position()), anchor);

        if pull.should_release(hand, anchor) {
            release_pull(
                entity,
                &mut pull,
                &mut ctx,
                camera,
                &targeting.config,
                &mut bodies,
                &throw_targets,
                &mut thrown_events,
            );
            continue;
        }

        let Some(pulled) = pull.body() else {
            continue;
        };
        if let Ok((global, _, _, mut force, _)) = bodies.get_mut(pulled) {
            let pull_force = pull.pull_force(hand, anchor, camera.forward);
            *force = force_at_point(pull_force, anchor, global.translation());
        }
    }
}

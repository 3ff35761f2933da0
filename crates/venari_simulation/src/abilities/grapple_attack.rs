//! Grapple-attack: рывок по тросу к врагу с ударом
//!
//! Idle → Queued (input, ждём конца текущего melee клипа) → Animating →
//! Moving (notify GrappleAttackMovementStart) → Idle + cooldown.
//! Точка назначения следит за живым врагом каждый кадр.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::context::{AbilityCtx, BodyData};
use super::cooldown::Cooldown;
use super::curve::{LaunchVariant, TravelProfile};
use super::targeting::AttackTarget;
use super::{AbilityKind, Dash};
use crate::animation::{AnimNotify, Clip, Notify};
use crate::combat::ApplyDamage;
use crate::logger;
use crate::shared::UP;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrappleAttackConfig {
    pub throw_distance: f32,
    pub damage: f32,
    /// Остановка перед врагом вдоль forward персонажа
    pub forward_offset: f32,
    pub cooldown: f32,
    pub ground_clip: Clip,
    pub air_clip: Clip,
    pub curves: TravelProfile,
}

impl Default for GrappleAttackConfig {
    fn default() -> Self {
        Self {
            throw_distance: 500.0,
            damage: 35.0,
            forward_offset: 50.0,
            cooldown: 1.0,
            ground_clip: Clip::new("grapple_attack_ground"),
            air_clip: Clip::new("grapple_attack_air"),
            curves: TravelProfile::default(),
        }
    }
}

impl GrappleAttackConfig {
    pub fn clip(&self, variant: LaunchVariant) -> &Clip {
        match variant {
            LaunchVariant::Ground => &self.ground_clip,
            LaunchVariant::Air => &self.air_clip,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum GrappleAttackState {
    #[default]
    Idle,
    Queued {
        target: AttackTarget,
    },
    Animating {
        target: AttackTarget,
        variant: LaunchVariant,
        rope_base: f32,
    },
    Moving {
        target: AttackTarget,
        variant: LaunchVariant,
        start: Vec3,
        rope_base: f32,
    },
}

#[derive(Component, Debug, Clone, PartialEq)]
pub struct GrappleAttack {
    pub config: GrappleAttackConfig,
    pub cooldown: Cooldown,
    state: GrappleAttackState,
}

impl Default for GrappleAttack {
    fn default() -> Self {
        Self::new(GrappleAttackConfig::default())
    }
}

impl GrappleAttack {
    pub fn new(config: GrappleAttackConfig) -> Self {
        Self {
            cooldown: Cooldown::new(config.cooldown),
            config,
            state: GrappleAttackState::Idle,
        }
    }

    pub fn state(&self) -> GrappleAttackState {
        self.state
    }

    pub fn is_queued(&self) -> bool {
        matches!(self.state, GrappleAttackState::Queued { .. })
    }

    /// Animating или Moving (очередь не считается)
    pub fn is_active(&self) -> bool {
        matches!(
            self.state,
            GrappleAttackState::Animating { .. } | GrappleAttackState::Moving { .. }
        )
    }

    pub fn target(&self) -> Option<AttackTarget> {
        match self.state {
            GrappleAttackState::Idle => None,
            GrappleAttackState::Queued { target }
            | GrappleAttackState::Animating { target, .. }
            | GrappleAttackState::Moving { target, .. } => Some(target),
        }
    }

    /// Точка удара: враг + offset попадания, с отступом назад вдоль `forward`
    pub fn destination(&self, target_position: Vec3, offset: Vec3, forward: Vec3) -> Vec3 {
        target_position + offset - forward * self.config.forward_offset
    }

    pub fn queue(&mut self, ctx: &mut AbilityCtx, target: AttackTarget) -> bool {
        if self.state != GrappleAttackState::Idle || !self.cooldown.is_ready() {
            return false;
        }
        if ctx.attack_blocks_queue() {
            return false;
        }

        self.state = GrappleAttackState::Queued { target };
        ctx.queue_special();
        true
    }

    /// Queued → Animating, как только не играет melee клип
    pub fn begin(&mut self, ctx: &mut AbilityCtx, target_position: Vec3) -> bool {
        let GrappleAttackState::Queued { target } = self.state else {
            return false;
        };
        if ctx.attack_animation_playing() || !ctx.lock.try_claim(AbilityKind::GrappleAttack) {
            return false;
        }

        let variant = LaunchVariant::of(ctx.movement);
        ctx.face_towards(target_position);
        let destination = self.destination(target_position, target.offset, ctx.forward());
        let rope_base = destination.distance(ctx.position());
        ctx.play(self.config.clip(variant));

        self.state = GrappleAttackState::Animating {
            target,
            variant,
            rope_base,
        };
        true
    }

    /// Notify GrappleAttackMovementStart
    pub fn start_movement(&mut self, ctx: &mut AbilityCtx) -> bool {
        let GrappleAttackState::Animating {
            target,
            variant,
            rope_base,
        } = self.state
        else {
            return false;
        };

        ctx.suspend_gravity();
        self.state = GrappleAttackState::Moving {
            target,
            variant,
            start: ctx.position(),
            rope_base,
        };
        true
    }

    pub fn tick(&mut self, ctx: &mut AbilityCtx, target_position: Vec3, delta: f32) {
        let (target, variant, rope_base) = match self.state {
            GrappleAttackState::Idle => {
                self.cooldown.tick(delta);
                return;
            }
            GrappleAttackState::Queued { .. } => return,
            GrappleAttackState::Animating {
                target,
                variant,
                rope_base,
            } => (target, variant, rope_base),
            GrappleAttackState::Moving {
                target,
                variant,
                start,
                rope_base,
            } => {
                let progress = ctx.montage.progress_of(self.config.clip(variant));
                let curves = self.config.curves.curves(variant);
                let destination = self.destination(target_position, target.offset, ctx.forward());
                ctx.transform.translation = start.lerp(destination, curves.speed.sample(progress))
                    + UP * curves.height.sample(progress);
                (target, variant, rope_base)
            }
        };

        let destination = self.destination(target_position, target.offset, ctx.forward());
        let progress = ctx.montage.progress_of(self.config.clip(variant));
        let curves = self.config.curves.curves(variant);
        let hand = ctx.hand();
        ctx.set_rope(
            rope_base * curves.rope_length.sample(progress),
            hand.lerp(destination, curves.rope_position.sample(progress)),
        );
    }

    /// Notify GrappleAttackDamage: (цель, урон) если атака идёт
    pub fn deal_damage(&mut self, ctx: &mut AbilityCtx) -> Option<(Entity, f32)> {
        if !self.is_active() {
            return None;
        }
        let target = self.target()?;
        ctx.register_hit();
        Some((target.target, self.config.damage))
    }

    /// Notify GrappleAttackEnd / interrupt / dash. Начатая атака всегда уходит в cooldown.
    pub fn reset(&mut self, ctx: &mut AbilityCtx) {
        match self.state {
            GrappleAttackState::Idle => return,
            GrappleAttackState::Queued { .. } => {
                self.state = GrappleAttackState::Idle;
                ctx.clear_queued_special();
                return;
            }
            GrappleAttackState::Animating { .. } | GrappleAttackState::Moving { .. } => {}
        }

        self.state = GrappleAttackState::Idle;
        self.cooldown.start();
        ctx.restore_movement();
        ctx.set_rope_visible(false);
        ctx.lock.release(AbilityKind::GrappleAttack);
        ctx.clear_queued_special();
        ctx.end_attack_animation();
    }
}

/// Система: Queued → Animating
pub fn begin_queued_grapple_attacks(
    mut characters: Query<(Entity, BodyData, &mut GrappleAttack, Option<&mut Dash>)>,
    positions: Query<&GlobalTransform>,
) {
    for (entity, mut body, mut attack, mut dash) in characters.iter_mut() {
        let Some(target) = attack.target().filter(|_| attack.is_queued()) else {
            continue;
        };
        let mut ctx = AbilityCtx::from_body(&mut body);

        let Ok(target_position) = positions.get(target.target).map(|g| g.translation()) else {
            attack.reset(&mut ctx);
            continue;
        };

        // Dash уступает место, как только melee клип отыграл
        if !ctx.attack_animation_playing() {
            if let Some(dash) = dash.as_deref_mut() {
                dash.stop(&mut ctx);
            }
        }

        if attack.begin(&mut ctx, target_position) {
            logger::log(&format!(
                "🪝 ECS: {:?} grapple-attack → {:?}",
                entity, target.target
            ));
        }
    }
}

/// Система: movement start / damage / end notifies
pub fn on_grapple_attack_notifies(
    mut notifies: EventReader<AnimNotify>,
    mut characters: Query<(BodyData, &mut GrappleAttack)>,
    mut damage_events: EventWriter<ApplyDamage>,
) {
    for event in notifies.read() {
        let Ok((mut body, mut attack)) = characters.get_mut(event.entity) else {
            continue;
        };
        let mut ctx = AbilityCtx::from_body(&mut body);

        match event.notify {
            Notify::GrappleAttackMovementStart => {
                attack.start_movement(&mut ctx);
            }
            Notify::GrappleAttackDamage => {
                if let Some((target, damage)) = attack.deal_damage(&mut ctx) {
                    damage_events.write(ApplyDamage::new(target, damage).from(event.entity));
                }
            }
            Notify::GrappleAttackEnd => {
                attack.reset(&mut ctx);
            }
            _ => {}
        }
    }
}

/// Система: cooldown + движение к живой цели
pub fn tick_grapple_attack(
    time: Res<Time>,
    mut characters: Query<(BodyData, &mut GrappleAttack)>,
    positions: Query<&GlobalTransform>,
) {
    let delta = time.delta_secs();

    for (mut body, mut attack) in characters.iter_mut() {
        let mut ctx = AbilityCtx::from_body(&mut body);

        let Some(target) = attack.target().filter(|_| attack.is_active()) else {
            attack.tick(&mut ctx, Vec3::ZERO, delta);
            continue;
        };

        // Цель исчезла посреди атаки
        let Ok(target_position) = positions.get(target.target).map(|g| g.translation()) else {
            attack.reset(&mut ctx);
            continue;
        };

        attack.tick(&mut ctx, target_position, delta);
    }
}

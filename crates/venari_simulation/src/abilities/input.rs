//! Ability input: hook (grapple / pull / grapple-attack), dash, shoulder-bash
//!
//! Все handlers проверяют общие блокировки (смерть, possession, блокнот)
//! и работают только с `Player` entity.

use bevy::prelude::*;
use bevy_rapier3d::prelude::ExternalForce;

use super::context::{AbilityCtx, BodyData};
use super::pull::{release_pull, ObjectThrown, PulledBodies};
use super::targeting::HookTargeting;
use super::{Dash, Grapple, GrappleAttack, Possession, Pull, ShoulderBash};
use crate::components::{Health, HookPoint, HookType, Player, ThrowTarget, UiState};
use crate::input::{ActionInput, ButtonState, InputAction};
use crate::logger;
use crate::shared::CameraView;

/// Event: трос зацепился за hook point
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct HookPointUsed {
    pub user: Entity,
    pub hook: Entity,
    pub kind: HookType,
}

/// Общая блокировка способностей
pub fn abilities_blocked(health: &Health, ui: &UiState, possession: &Possession) -> bool {
    health.is_dead() || ui.blocks_abilities() || possession.is_possessing()
}

/// Rope montage заменяет клип атаки, AttackAnimationEnd уже не придёт.
/// Комбо закрываем только если способность реально сможет захватить lock.
fn end_melee_for_rope(ctx: &mut AbilityCtx) {
    if !ctx.lock.is_free() {
        return;
    }
    ctx.stop_combo();
    ctx.end_attack_animation();
}

/// Система: Hook pressed → grapple / pull / grapple-attack по типу цели,
/// Hook released → отпустить pull
pub fn handle_hook_input(
    mut inputs: EventReader<ActionInput>,
    mut characters: Query<
        (
            BodyData,
            &HookTargeting,
            &CameraView,
            &Health,
            &UiState,
            &Possession,
            Option<&mut Grapple>,
            Option<&mut Pull>,
            Option<&mut GrappleAttack>,
            Option<&mut Dash>,
        ),
        With<Player>,
    >,
    mut hooks: Query<(&GlobalTransform, &mut HookPoint)>,
    mut bodies: PulledBodies,
    throw_targets: Query<&GlobalTransform, With<ThrowTarget>>,
    mut used_events: EventWriter<HookPointUsed>,
    mut thrown_events: EventWriter<ObjectThrown>,
) {
    for input in inputs.read() {
        if input.action != InputAction::Hook {
            continue;
        }

        let Ok((
            mut body,
            targeting,
            camera,
            health,
            ui,
            possession,
            mut grapple,
            mut pull,
            mut grapple_attack,
            mut dash,
        )) = characters.get_mut(input.entity)
        else {
            continue;
        };
        let mut ctx = AbilityCtx::from_body(&mut body);

        if input.state == ButtonState::Released {
            if let Some(pull) = pull.as_deref_mut() {
                release_pull(
                    input.entity,
                    pull,
                    &mut ctx,
                    camera,
                    &targeting.config,
                    &mut bodies,
                    &throw_targets,
                    &mut thrown_events,
                );
            }
            continue;
        }

        if abilities_blocked(health, ui, possession) {
            continue;
        }

        let Some(hook_entity) = targeting.current() else {
            continue;
        };
        let Ok((global, mut hook)) = hooks.get_mut(hook_entity) else {
            continue;
        };
        let anchor = global.translation();
        let distance = anchor.distance(ctx.position());

        let used = match hook.kind {
            HookType::Grapplable => match grapple.as_deref_mut() {
                Some(grapple) if !grapple.is_active() && distance <= grapple.config.throw_distance => {
                    if let Some(dash) = dash.as_deref_mut() {
                        dash.stop(&mut ctx);
                    }
                    end_melee_for_rope(&mut ctx);
                    grapple.trigger(&mut ctx, anchor, hook.landing_point(anchor))
                }
                _ => false,
            },
            HookType::Pullable => match (pull.as_deref_mut(), targeting.pull_body()) {
                (Some(pull), Some(pulled))
                    if !pull.is_active()
                        && distance <= pull.config.throw_distance
                        && (pull.config.can_pull_while_falling || !ctx.movement.is_falling()) =>
                {
                    if let Some(dash) = dash.as_deref_mut() {
                        dash.stop(&mut ctx);
                    }
                    end_melee_for_rope(&mut ctx);
                    pull.trigger(&mut ctx, hook_entity, pulled, anchor)
                }
                _ => false,
            },
            HookType::Enemy => match (grapple_attack.as_deref_mut(), targeting.attack_target()) {
                (Some(attack), Some(target)) if distance <= attack.config.throw_distance => {
                    attack.queue(&mut ctx, target)
                }
                _ => false,
            },
            HookType::None => false,
        };

        if used {
            hook.mark_used();
            used_events.write(HookPointUsed {
                user: input.entity,
                hook: hook_entity,
                kind: hook.kind,
            });
            logger::log(&format!(
                "🪝 ECS: {:?} used {:?} hook point {:?} ({:.0} away)",
                input.entity, hook.kind, hook_entity, distance
            ));
        }
    }
}

/// Система: Dash pressed → отменить всё остальное и рвануть
pub fn handle_dash_input(
    mut inputs: EventReader<ActionInput>,
    mut characters: Query<
        (
            BodyData,
            &mut Dash,
            &CameraView,
            &Health,
            &UiState,
            &Possession,
            Option<&mut Grapple>,
            Option<&mut Pull>,
            Option<&mut GrappleAttack>,
        ),
        With<Player>,
    >,
    mut forces: Query<&mut ExternalForce>,
) {
    for input in inputs.read() {
        if !input.is_pressed(InputAction::Dash) {
            continue;
        }

        let Ok((mut body, mut dash, camera, health, ui, possession, grapple, pull, grapple_attack)) =
            characters.get_mut(input.entity)
        else {
            continue;
        };

        if abilities_blocked(health, ui, possession) || dash.is_dashing() || !dash.cooldown.is_ready()
        {
            continue;
        }

        let mut ctx = AbilityCtx::from_body(&mut body);

        ctx.stop_combo();
        ctx.end_attack_animation();
        if let Some(mut grapple) = grapple {
            grapple.reset(&mut ctx);
        }
        if let Some(mut grapple_attack) = grapple_attack {
            grapple_attack.reset(&mut ctx);
        }
        if let Some(mut pull) = pull {
            if let Some(pulled) = pull.end(&mut ctx) {
                if let Ok(mut force) = forces.get_mut(pulled) {
                    *force = ExternalForce::default();
                }
            }
        }

        if dash.trigger(&mut ctx, camera) {
            logger::log(&format!("💨 ECS: {:?} dash", input.entity));
        }
    }
}

/// Система: ShoulderBash pressed → в очередь
pub fn handle_bash_input(
    mut inputs: EventReader<ActionInput>,
    mut characters: Query<(BodyData, &mut ShoulderBash, &Health, &UiState, &Possession), With<Player>>,
) {
    for input in inputs.read() {
        if !input.is_pressed(InputAction::ShoulderBash) {
            continue;
        }

        let Ok((mut body, mut bash, health, ui, possession)) = characters.get_mut(input.entity) else {
            continue;
        };
        if abilities_blocked(health, ui, possession) {
            continue;
        }

        let mut ctx = AbilityCtx::from_body(&mut body);
        if bash.queue(&mut ctx) {
            logger::log(&format!("🛡️ ECS: {:?} shoulder bash queued", input.entity));
        }
    }
}

//! Hook point targeting
//!
//! Каждый кадр выбирает hook point, на который смотрит камера: ближе всего
//! к направлению взгляда, в радиусе обнаружения, с прямой видимостью.
//! Результат кэшируется в `HookTargeting` и читается grapple/pull/grapple-attack.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::abilities::{Grapple, GrappleAttack, Possession, Pull};
use crate::components::{Health, HookPoint, HookType, PullableBody, UiState};
use crate::physics::SpatialQueries;
use crate::shared::CameraView;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetingConfig {
    /// Радиус поиска hook points вокруг персонажа
    pub detection_radius: f32,
    /// Минимальный dot(camera forward, направление на кандидата)
    pub min_alignment: f32,
    pub throw_target_radius: f32,
    pub min_throw_alignment: f32,
}

impl Default for TargetingConfig {
    fn default() -> Self {
        Self {
            detection_radius: 2000.0,
            min_alignment: 0.7,
            throw_target_radius: 2000.0,
            min_throw_alignment: 0.7,
        }
    }
}

/// Цель grapple-attack: враг + точка попадания относительно него
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttackTarget {
    pub target: Entity,
    pub offset: Vec3,
}

/// Текущая цель троса
#[derive(Component, Debug, Clone, Default, PartialEq)]
pub struct HookTargeting {
    pub config: TargetingConfig,
    current: Option<Entity>,
    pull_body: Option<Entity>,
    attack: Option<AttackTarget>,
}

impl HookTargeting {
    pub fn new(config: TargetingConfig) -> Self {
        Self {
            config,
            ..default()
        }
    }

    pub fn current(&self) -> Option<Entity> {
        self.current
    }

    pub fn pull_body(&self) -> Option<Entity> {
        self.pull_body
    }

    pub fn attack_target(&self) -> Option<AttackTarget> {
        self.attack
    }
}

/// Event: hook point подсвечен/погашен как цель
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct HookPointFocusChanged {
    pub owner: Entity,
    pub hook: Entity,
    pub focused: bool,
}

/// Кандидат с максимальным dot строго выше `min_dot`
///
/// При равенстве остаётся первый по порядку перечисления.
pub fn most_aligned<T, I>(eye: Vec3, forward: Vec3, min_dot: f32, candidates: I) -> Option<(T, f32)>
where
    T: Copy,
    I: IntoIterator<Item = (T, Vec3)>,
{
    let forward = forward.normalize_or_zero();
    let mut best = None;
    let mut highest = min_dot;

    for (candidate, position) in candidates {
        let Some(direction) = (position - eye).try_normalize() else {
            continue;
        };
        let dot = forward.dot(direction);
        if dot > highest {
            highest = dot;
            best = Some((candidate, dot));
        }
    }

    best
}

/// Throw target под прицелом камеры (в радиусе от персонажа)
pub fn find_throw_target<I>(
    origin: Vec3,
    camera: &CameraView,
    config: &TargetingConfig,
    targets: I,
) -> Option<Vec3>
where
    I: IntoIterator<Item = Vec3>,
{
    let in_range = targets
        .into_iter()
        .filter(|position| position.distance(origin) <= config.throw_target_radius)
        .map(|position| (position, position));

    most_aligned(camera.position, camera.forward, config.min_throw_alignment, in_range)
        .map(|(position, _)| position)
}

type HookQuery<'w, 's> = Query<
    'w,
    's,
    (
        Entity,
        &'static GlobalTransform,
        &'static mut HookPoint,
        Option<&'static ChildOf>,
    ),
>;

/// Снимает фокус со старой цели и ставит на новую
fn set_focus(
    owner: Entity,
    targeting: &mut HookTargeting,
    next: Option<Entity>,
    hooks: &mut HookQuery,
    focus_events: &mut EventWriter<HookPointFocusChanged>,
) {
    if targeting.current == next {
        return;
    }

    if let Some(previous) = targeting.current.take() {
        if let Ok((_, _, mut hook, _)) = hooks.get_mut(previous) {
            hook.deactivate();
        }
        focus_events.write(HookPointFocusChanged {
            owner,
            hook: previous,
            focused: false,
        });
    }

    if let Some(next) = next {
        if let Ok((_, _, mut hook, _)) = hooks.get_mut(next) {
            hook.activate();
        }
        focus_events.write(HookPointFocusChanged {
            owner,
            hook: next,
            focused: true,
        });
    }

    targeting.current = next;
}

fn clear_target(
    owner: Entity,
    targeting: &mut HookTargeting,
    hooks: &mut HookQuery,
    focus_events: &mut EventWriter<HookPointFocusChanged>,
) {
    targeting.pull_body = None;
    targeting.attack = None;
    set_focus(owner, targeting, None, hooks, focus_events);
}

/// Система: выбор hook point под прицелом
pub fn update_hook_targets(
    mut characters: Query<(
        Entity,
        &Transform,
        &CameraView,
        &Health,
        &UiState,
        &Possession,
        &mut HookTargeting,
        Option<&Grapple>,
        Option<&Pull>,
        Option<&GrappleAttack>,
    )>,
    mut hooks: HookQuery,
    positions: Query<&GlobalTransform, Without<HookPoint>>,
    children: Query<&Children>,
    pullable: Query<(), With<PullableBody>>,
    spatial: Res<SpatialQueries>,
    mut focus_events: EventWriter<HookPointFocusChanged>,
) {
    for (
        owner,
        transform,
        camera,
        health,
        ui,
        possession,
        mut targeting,
        grapple,
        pull,
        grapple_attack,
    ) in characters.iter_mut()
    {
        if health.is_dead() || ui.blocks_abilities() || possession.is_possessing() {
            clear_target(owner, &mut targeting, &mut hooks, &mut focus_events);
            continue;
        }

        // Во время полёта/притягивания цель не меняется
        let busy = grapple.is_some_and(|g| g.is_active())
            || pull.is_some_and(|p| p.is_active())
            || grapple_attack.is_some_and(|a| a.is_active());
        if busy {
            continue;
        }

        let origin = transform.translation;
        let radius = targeting.config.detection_radius;
        let candidates = hooks
            .iter()
            .map(|(entity, global, _, _)| (entity, global.translation()))
            .filter(|(_, position)| position.distance(origin) <= radius);

        let Some((candidate, _)) = most_aligned(
            camera.position,
            camera.forward,
            targeting.config.min_alignment,
            candidates,
        ) else {
            clear_target(owner, &mut targeting, &mut hooks, &mut focus_events);
            continue;
        };

        let Ok((_, global, hook, child_of)) = hooks.get(candidate) else {
            continue;
        };
        let position = global.translation();
        let kind = hook.kind;
        let parent = child_of.map(|child_of| child_of.parent());

        let attack_cooling = grapple_attack.is_some_and(|a| !a.cooldown.is_ready());
        let rejected = !hook.usable
            || kind == HookType::None
            || (kind == HookType::Enemy && attack_cooling);
        if rejected {
            clear_target(owner, &mut targeting, &mut hooks, &mut focus_events);
            continue;
        }

        // Прямая видимость: луч должен упереться в сам hook point или его владельца
        let Some(hit) = spatial.line_of_sight(camera.position, position, candidate) else {
            clear_target(owner, &mut targeting, &mut hooks, &mut focus_events);
            continue;
        };
        let owns_candidate = children
            .get(hit.entity)
            .is_ok_and(|children| children.contains(&candidate));
        if hit.entity != candidate && !owns_candidate {
            clear_target(owner, &mut targeting, &mut hooks, &mut focus_events);
            continue;
        }

        targeting.attack = (kind == HookType::Enemy).then(|| {
            let target = parent.unwrap_or(hit.entity);
            let target_position = positions
                .get(target)
                .map(|global| global.translation())
                .unwrap_or(hit.point);
            AttackTarget {
                target,
                offset: hit.point - target_position,
            }
        });

        targeting.pull_body = match kind {
            HookType::Pullable => parent.filter(|parent| pullable.get(*parent).is_ok()),
            _ => None,
        };

        set_focus(
            owner,
            &mut targeting,
            Some(candidate),
            &mut hooks,
            &mut focus_events,
        );
    }
}

/// Система: hook points и pullable тела, despawn'нутые извне, не остаются целью
///
/// Пока способность активна, `update_hook_targets` цель не трогает.
pub fn forget_despawned_targets(
    mut removed_hooks: RemovedComponents<HookPoint>,
    mut removed_bodies: RemovedComponents<PullableBody>,
    mut characters: Query<&mut HookTargeting>,
) {
    for hook in removed_hooks.read() {
        for mut targeting in characters.iter_mut() {
            if targeting.current == Some(hook) {
                targeting.current = None;
                targeting.pull_body = None;
                targeting.attack = None;
            }
        }
    }
    for body in removed_bodies.read() {
        for mut targeting in characters.iter_mut() {
            if targeting.pull_body == Some(body) {
                targeting.pull_body = None;
            }
        }
    }
}

//! Ability integration tests
//!
//! Полный App (SimulationPlugin + HeadlessAnimatorPlugin), input через события,
//! montages продвигает headless аниматор.
//!
//! Проверяем:
//! - Grapple/pull/grapple-attack от нажатия до конца
//! - Не больше одной способности одновременно
//! - Смерть сбрасывает всё в том же кадре
//! - Life-steal, interactables

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use bevy::prelude::*;
use bevy_rapier3d::prelude::{ExternalForce, ExternalImpulse, Velocity};
use venari_simulation::abilities::{
    Boosts, ComboPhase, Dash, Grapple, GrappleAttack, GrappleState, HookPointUsed, HookTargeting,
    MeleeCombo, MeleeOverlap, ObjectThrown, Possession, PossessionCompleted, Pull,
};
use venari_simulation::combat::{enemy_bundle, EnemyConfig};
use venari_simulation::interaction::{
    Interactable, InteractionFocus, InteractionOutcome, InteractionProximity,
};
use venari_simulation::physics::{pullable_body, SphereOccluders};
use venari_simulation::*;

fn create_ability_app() -> App {
    let mut app = create_headless_app(42);
    app.add_plugins((SimulationPlugin, HeadlessAnimatorPlugin));
    app
}

fn spawn_player(app: &mut App, archetype: Archetype) -> Entity {
    let tuning = AbilityTuning::default();
    let mut entity = app
        .world_mut()
        .spawn((player_character(&tuning, Vec3::ZERO, archetype), Player));
    match archetype {
        Archetype::Agile => entity.insert(agile_abilities(&tuning)),
        Archetype::Berserker => entity.insert(berserker_abilities(&tuning)),
    };
    entity.id()
}

fn spawn_hook(app: &mut App, kind: HookType, position: Vec3) -> Entity {
    app.world_mut()
        .spawn((
            HookPoint::new(kind),
            Transform::from_translation(position),
            GlobalTransform::from_translation(position),
        ))
        .id()
}

fn press(app: &mut App, entity: Entity, action: InputAction) {
    app.world_mut().send_event(ActionInput::pressed(entity, action));
}

fn drain<E: Event>(app: &mut App) -> Vec<E> {
    app.world_mut().resource_mut::<Events<E>>().drain().collect()
}

/// Сколько способностей, перехватывающих locomotion, сейчас активно
fn active_abilities(app: &App, entity: Entity) -> usize {
    let world = app.world();
    [
        world.get::<Grapple>(entity).is_some_and(|g| g.is_active()),
        world.get::<Pull>(entity).is_some_and(|p| p.is_active()),
        world.get::<GrappleAttack>(entity).is_some_and(|a| a.is_active()),
        world.get::<Dash>(entity).is_some_and(|d| d.is_dashing()),
    ]
    .into_iter()
    .filter(|active| *active)
    .count()
}

fn lock_holder(app: &App, entity: Entity) -> Option<AbilityKind> {
    app.world().get::<AbilityLock>(entity).unwrap().holder()
}

#[test]
fn test_grapple_flight_lands_above_landing_point() {
    let mut app = create_ability_app();
    let player = spawn_player(&mut app, Archetype::Agile);
    let hook = spawn_hook(&mut app, HookType::Grapplable, Vec3::new(300.0, 0.0, 100.0));
    app.update();

    assert_eq!(
        app.world().get::<HookTargeting>(player).unwrap().current(),
        Some(hook)
    );
    assert!(app.world().get::<HookPoint>(hook).unwrap().focused);

    press(&mut app, player, InputAction::Hook);
    app.update();

    assert_eq!(lock_holder(&app, player), Some(AbilityKind::Grapple));
    assert_eq!(app.world().get::<HookPoint>(hook).unwrap().uses, 1);
    let used = drain::<HookPointUsed>(&mut app);
    assert_eq!(used.len(), 1);
    assert_eq!(used[0].kind, HookType::Grapplable);

    let destination = Vec3::new(300.0, 0.0, 150.0);
    match app.world().get::<Grapple>(player).unwrap().state() {
        GrappleState::Animating { destination: d, .. } => assert_eq!(d, destination),
        other => panic!("Expected Animating, got {:?}", other),
    }

    let mut rope_seen = false;
    for _ in 0..200 {
        app.update();
        rope_seen |= app.world().get::<RopeVisual>(player).unwrap().visible;
        assert!(active_abilities(&app, player) <= 1);
        if !app.world().get::<Grapple>(player).unwrap().is_active() {
            break;
        }
    }

    let world = app.world();
    assert!(!world.get::<Grapple>(player).unwrap().is_active(), "Grapple never ended");
    assert!(rope_seen, "Rope shown during flight");
    assert!(!world.get::<RopeVisual>(player).unwrap().visible);
    assert!(world.get::<AbilityLock>(player).unwrap().is_free());

    let position = world.get::<Transform>(player).unwrap().translation;
    assert!((position - destination).length() < 1e-2, "Landed at {:?}", position);

    let defaults = world.get::<MovementDefaults>(player).unwrap();
    assert!(defaults.matches(world.get::<CharacterMovement>(player).unwrap()));
}

#[test]
fn test_dash_cancels_grapple_and_takes_the_lock() {
    let mut app = create_ability_app();
    let player = spawn_player(&mut app, Archetype::Agile);
    spawn_hook(&mut app, HookType::Grapplable, Vec3::new(300.0, 0.0, 100.0));
    app.update();

    press(&mut app, player, InputAction::Hook);
    for _ in 0..30 {
        app.update();
    }
    assert!(app.world().get::<Grapple>(player).unwrap().is_moving());

    press(&mut app, player, InputAction::Dash);
    app.update();

    let world = app.world();
    assert!(!world.get::<Grapple>(player).unwrap().is_active());
    assert!(world.get::<Dash>(player).unwrap().is_dashing());
    assert_eq!(lock_holder(&app, player), Some(AbilityKind::Dash));
    assert_eq!(active_abilities(&app, player), 1);

    // Hook во время dash: dash обрывается, grapple стартует
    press(&mut app, player, InputAction::Hook);
    app.update();
    assert_eq!(active_abilities(&app, player), 1);
}

#[test]
fn test_grapple_mid_swing_ends_the_combo() {
    let mut app = create_ability_app();
    let player = spawn_player(&mut app, Archetype::Agile);
    spawn_hook(&mut app, HookType::Grapplable, Vec3::new(300.0, 0.0, 100.0));
    app.update();

    press(&mut app, player, InputAction::MeleeAttack);
    for _ in 0..5 {
        app.update();
    }
    assert_eq!(
        app.world().get::<MeleeCombo>(player).unwrap().phase(),
        ComboPhase::Attacking
    );

    // Hook посреди замаха: rope montage вытесняет клип атаки
    press(&mut app, player, InputAction::Hook);
    app.update();
    assert_eq!(lock_holder(&app, player), Some(AbilityKind::Grapple));
    assert_eq!(
        app.world().get::<MeleeCombo>(player).unwrap().phase(),
        ComboPhase::Idle
    );

    for _ in 0..200 {
        app.update();
        if !app.world().get::<Grapple>(player).unwrap().is_active() {
            break;
        }
    }
    assert!(lock_holder(&app, player).is_none());

    // Движок приземлил персонажа
    app.world_mut()
        .get_mut::<CharacterMovement>(player)
        .unwrap()
        .mode = MovementMode::Walking;
    drain::<JumpIntent>(&mut app);

    press(&mut app, player, InputAction::Jump);
    app.update();
    assert_eq!(drain::<JumpIntent>(&mut app).len(), 1);

    press(&mut app, player, InputAction::MeleeAttack);
    app.update();
    let world = app.world();
    assert_eq!(world.get::<MeleeCombo>(player).unwrap().phase(), ComboPhase::Attacking);
    assert!(world
        .get::<MontagePlayer>(player)
        .unwrap()
        .is_playing(&Clip::new("attack_1")));
}

#[test]
fn test_lethal_damage_mid_grapple_resets_everything_in_same_frame() {
    let mut app = create_ability_app();
    let player = spawn_player(&mut app, Archetype::Agile);
    spawn_hook(&mut app, HookType::Grapplable, Vec3::new(300.0, 0.0, 100.0));
    app.update();

    press(&mut app, player, InputAction::Hook);
    for _ in 0..30 {
        app.update();
    }
    assert!(app.world().get::<Grapple>(player).unwrap().is_moving());
    assert_eq!(app.world().get::<CharacterMovement>(player).unwrap().gravity_scale, 0.0);

    app.world_mut().send_event(ApplyDamage::new(player, 500.0));
    app.update();

    let world = app.world();
    assert!(world.get::<Dead>(player).is_some());
    assert_eq!(world.get::<Grapple>(player).unwrap().state(), GrappleState::Idle);
    assert!(world.get::<AbilityLock>(player).unwrap().is_free());
    assert!(!world.get::<RopeVisual>(player).unwrap().visible);
    assert!(world.get::<MontagePlayer>(player).unwrap().active().is_none());
    let defaults = world.get::<MovementDefaults>(player).unwrap();
    assert!(defaults.matches(world.get::<CharacterMovement>(player).unwrap()));

    // Мёртвый игрок ничего не триггерит
    press(&mut app, player, InputAction::Hook);
    press(&mut app, player, InputAction::Dash);
    app.update();
    assert_eq!(active_abilities(&app, player), 0);
    assert_eq!(app.world().get::<HookTargeting>(player).unwrap().current(), None);
}

#[test]
fn test_targeting_prefers_alignment_and_requires_line_of_sight() {
    let mut app = create_ability_app();
    let player = spawn_player(&mut app, Archetype::Agile);
    let ahead = spawn_hook(&mut app, HookType::Grapplable, Vec3::new(1000.0, 0.0, 0.0));
    spawn_hook(&mut app, HookType::Grapplable, Vec3::new(1000.0, 300.0, 0.0));
    app.update();

    assert_eq!(
        app.world().get::<HookTargeting>(player).unwrap().current(),
        Some(ahead)
    );
    // Вне throw distance: нажатие ничего не делает
    press(&mut app, player, InputAction::Hook);
    app.update();
    assert!(lock_holder(&app, player).is_none());

    // Стена между камерой и целью
    let wall = app.world_mut().spawn_empty().id();
    app.insert_resource(SpatialQueries::new(
        SphereOccluders::default().with(wall, Vec3::new(500.0, 0.0, 46.0), 50.0),
    ));
    app.update();

    assert_eq!(app.world().get::<HookTargeting>(player).unwrap().current(), None);
    assert!(!app.world().get::<HookPoint>(ahead).unwrap().focused);
}

#[test]
fn test_pull_then_throw_on_release() {
    let mut app = create_ability_app();
    let player = spawn_player(&mut app, Archetype::Agile);

    let crate_position = Vec3::new(300.0, 0.0, 30.0);
    let body = app
        .world_mut()
        .spawn((
            pullable_body(2.0),
            Transform::from_translation(crate_position),
            GlobalTransform::from_translation(crate_position),
        ))
        .id();
    app.world_mut().spawn((
        HookPoint::new(HookType::Pullable),
        Transform::from_xyz(0.0, 0.0, 20.0),
        GlobalTransform::from_translation(crate_position + Vec3::Z * 20.0),
        ChildOf(body),
    ));
    app.update();

    press(&mut app, player, InputAction::Hook);
    for _ in 0..40 {
        app.update();
    }

    assert!(app.world().get::<Pull>(player).unwrap().is_pulling());
    let force = app.world().get::<ExternalForce>(body).unwrap().force;
    assert!(force.x < 0.0, "Body pulled toward the player, got {:?}", force);

    // Тело летит к игроку
    app.world_mut().get_mut::<Velocity>(body).unwrap().linvel = Vec3::new(-300.0, 0.0, 0.0);
    app.world_mut()
        .send_event(ActionInput::released(player, InputAction::Hook));
    app.update();

    let world = app.world();
    assert!(!world.get::<Pull>(player).unwrap().is_active());
    assert!(world.get::<AbilityLock>(player).unwrap().is_free());
    assert_eq!(world.get::<ExternalForce>(body).unwrap().force, Vec3::ZERO);
    assert_eq!(world.get::<Velocity>(body).unwrap().linvel, Vec3::ZERO, "Halted before throw");

    let impulse = world.get::<ExternalImpulse>(body).unwrap().impulse;
    assert!(impulse.x > 0.0, "Thrown along the camera, got {:?}", impulse);

    let thrown = drain::<ObjectThrown>(&mut app);
    assert_eq!(thrown.len(), 1);
    assert_eq!(thrown[0].body, body);
}

#[test]
fn test_grapple_attack_cools_down_after_interrupt() {
    let mut app = create_ability_app();
    let player = spawn_player(&mut app, Archetype::Agile);
    let enemy = app
        .world_mut()
        .spawn(enemy_bundle(EnemyConfig::default(), Vec3::new(400.0, 0.0, 0.0)))
        .id();
    let hook = app
        .world_mut()
        .spawn((
            HookPoint::new(HookType::Enemy),
            Transform::from_xyz(0.0, 0.0, 50.0),
            GlobalTransform::from_translation(Vec3::new(400.0, 0.0, 50.0)),
            ChildOf(enemy),
        ))
        .id();
    // Второй кадр: GlobalTransform врага уже propagated
    app.update();
    app.update();

    let targeting = app.world().get::<HookTargeting>(player).unwrap();
    assert_eq!(targeting.current(), Some(hook));
    let target = targeting.attack_target().unwrap();
    assert_eq!(target.target, enemy);
    assert!((target.offset - Vec3::new(0.0, 0.0, 50.0)).length() < 1e-3);

    press(&mut app, player, InputAction::Hook);
    app.update();
    assert!(app.world().get::<GrappleAttack>(player).unwrap().is_active());
    assert_eq!(lock_holder(&app, player), Some(AbilityKind::GrappleAttack));

    app.world_mut().send_event(ApplyDamage::new(player, 10.0).from(enemy));
    app.update();

    let attack = app.world().get::<GrappleAttack>(player).unwrap();
    assert!(!attack.is_active());
    assert!(!attack.cooldown.is_ready(), "Interrupted attack still cools down");
    assert!(lock_holder(&app, player).is_none());

    app.update();
    assert_eq!(
        app.world().get::<HookTargeting>(player).unwrap().current(),
        None,
        "Enemy hook rejected while cooling down"
    );

    for _ in 0..80 {
        app.update();
    }
    assert!(app.world().get::<GrappleAttack>(player).unwrap().cooldown.is_ready());
    assert_eq!(
        app.world().get::<HookTargeting>(player).unwrap().current(),
        Some(hook)
    );
}

#[test]
fn test_grapple_attack_stops_active_dash() {
    let mut app = create_ability_app();
    let player = spawn_player(&mut app, Archetype::Agile);
    let enemy = app
        .world_mut()
        .spawn(enemy_bundle(EnemyConfig::default(), Vec3::new(400.0, 0.0, 0.0)))
        .id();
    app.world_mut().spawn((
        HookPoint::new(HookType::Enemy),
        Transform::from_xyz(0.0, 0.0, 50.0),
        GlobalTransform::from_translation(Vec3::new(400.0, 0.0, 50.0)),
        ChildOf(enemy),
    ));
    app.update();
    app.update();

    press(&mut app, player, InputAction::Dash);
    app.update();
    assert_eq!(lock_holder(&app, player), Some(AbilityKind::Dash));

    press(&mut app, player, InputAction::Hook);
    app.update();

    let world = app.world();
    assert!(world.get::<GrappleAttack>(player).unwrap().is_active());
    let dash = world.get::<Dash>(player).unwrap();
    assert!(!dash.is_dashing());
    assert!(!dash.cooldown.is_ready(), "Stopped dash still cools down");
    assert_eq!(lock_holder(&app, player), Some(AbilityKind::GrappleAttack));
    assert_eq!(active_abilities(&app, player), 1);
}

#[test]
fn test_life_steal_heals_half_of_melee_damage() {
    let mut app = create_ability_app();
    let player = spawn_player(&mut app, Archetype::Berserker);
    let enemy = app
        .world_mut()
        .spawn(enemy_bundle(EnemyConfig::default(), Vec3::new(100.0, 0.0, 0.0)))
        .id();
    app.world_mut().get_mut::<Health>(player).unwrap().current = 50.0;

    press(&mut app, player, InputAction::LifeStealBoost);
    app.update();
    assert!(app.world().get::<Boosts>(player).unwrap().life_steal.is_active());

    app.world_mut()
        .get_mut::<MeleeCombo>(player)
        .unwrap()
        .set_hitbox(true);
    app.world_mut().send_event(MeleeOverlap {
        attacker: player,
        other: enemy,
    });
    app.update();

    assert_eq!(app.world().get::<Health>(enemy).unwrap().current, 75.0);
    assert_eq!(app.world().get::<Health>(player).unwrap().current, 62.5);

    // Berserk поверх life-steal: +10 к урону удара
    press(&mut app, player, InputAction::BerserkBoost);
    app.update();
    assert!(app.world().get::<Boosts>(player).unwrap().berserk.is_active());
    assert_eq!(app.world().get::<MeleeCombo>(player).unwrap().damage, 35.0);
}

/// Записка: исчезает после прочтения
struct Note {
    reads: Arc<AtomicU32>,
}

impl Interactable for Note {
    fn on_interact(&mut self, _entity: Entity, _interactor: Entity) -> InteractionOutcome {
        self.reads.fetch_add(1, Ordering::SeqCst);
        InteractionOutcome::Destroyed
    }
}

#[test]
fn test_destroyed_interactable_is_never_touched_again() {
    let mut app = create_ability_app();
    let player = spawn_player(&mut app, Archetype::Agile);
    let note = app
        .world_mut()
        .spawn((
            Transform::from_xyz(50.0, 0.0, 0.0),
            GlobalTransform::from_translation(Vec3::new(50.0, 0.0, 0.0)),
        ))
        .id();
    let reads = Arc::new(AtomicU32::new(0));
    app.world_mut()
        .resource_mut::<InteractableRegistry>()
        .register(note, Note { reads: reads.clone() });

    app.world_mut().send_event(InteractionProximity {
        interactor: player,
        interactable: note,
        entered: true,
    });
    app.update();
    assert_eq!(
        app.world().get::<InteractionFocus>(player).unwrap().current(),
        Some(note)
    );

    press(&mut app, player, InputAction::Interact);
    app.update();

    assert!(app.world().get_entity(note).is_err(), "Note despawned");
    assert!(!app.world().resource::<InteractableRegistry>().contains(note));
    assert_eq!(app.world().get::<InteractionFocus>(player).unwrap().current(), None);

    press(&mut app, player, InputAction::Interact);
    app.update();
    assert_eq!(reads.load(Ordering::SeqCst), 1);
}

#[test]
fn test_possession_interrupts_and_hands_over_control() {
    let mut app = create_ability_app();
    let player = spawn_player(&mut app, Archetype::Agile);
    let tuning = AbilityTuning::default();
    let body = app
        .world_mut()
        .spawn((
            player_character(&tuning, Vec3::new(100.0, 0.0, 0.0), Archetype::Agile),
            agile_abilities(&tuning),
        ))
        .id();
    spawn_hook(&mut app, HookType::Grapplable, Vec3::new(300.0, 0.0, 100.0));
    app.update();
    assert!(app.world().resource::<InteractableRegistry>().contains(body));

    press(&mut app, player, InputAction::Hook);
    app.update();
    assert!(app.world().get::<Grapple>(player).unwrap().is_active());
    drain::<AbilityInterrupt>(&mut app);

    app.world_mut().send_event(InteractionProximity {
        interactor: player,
        interactable: body,
        entered: true,
    });
    press(&mut app, player, InputAction::Interact);
    app.update();

    let world = app.world();
    assert_eq!(world.get::<Possession>(player).unwrap().target(), Some(body));
    assert!(!world.get::<Grapple>(player).unwrap().is_active());
    assert!(world.get::<AbilityLock>(player).unwrap().is_free());
    let interrupts = drain::<AbilityInterrupt>(&mut app);
    assert!(interrupts
        .iter()
        .any(|i| i.entity == player && i.reason == InterruptReason::Possession));

    // Заблокированные способности во время переезда камеры
    press(&mut app, player, InputAction::Dash);
    app.update();
    assert!(!app.world().get::<Dash>(player).unwrap().is_dashing());

    let mut completed = Vec::new();
    for _ in 0..200 {
        app.update();
        completed.extend(drain::<PossessionCompleted>(&mut app));
        if !completed.is_empty() {
            break;
        }
    }

    assert_eq!(completed.len(), 1, "Possession never completed");
    assert_eq!(completed[0].from, player);
    assert_eq!(completed[0].to, body);

    app.update();
    let world = app.world();
    assert!(world.get::<Player>(player).is_none());
    assert!(world.get::<Player>(body).is_some());
    assert!(!world.get::<Possession>(player).unwrap().is_possessing());

    let transform = world.get::<Transform>(player).unwrap();
    let camera = world.get::<CameraView>(player).unwrap();
    let rig_position = transform.transform_point(camera.rig_offset);
    assert!((camera.position - rig_position).length() < 1e-3);
}

#[test]
fn test_interactable_despawned_elsewhere_is_unregistered() {
    let mut app = create_ability_app();
    let player = spawn_player(&mut app, Archetype::Agile);
    let lever = app
        .world_mut()
        .spawn((
            Transform::from_xyz(50.0, 0.0, 0.0),
            GlobalTransform::from_translation(Vec3::new(50.0, 0.0, 0.0)),
        ))
        .id();
    let reads = Arc::new(AtomicU32::new(0));
    app.world_mut()
        .resource_mut::<InteractableRegistry>()
        .register(lever, Note { reads: reads.clone() });
    app.world_mut().send_event(InteractionProximity {
        interactor: player,
        interactable: lever,
        entered: true,
    });
    app.update();
    assert_eq!(
        app.world().get::<InteractionFocus>(player).unwrap().current(),
        Some(lever)
    );

    app.world_mut().despawn(lever);
    app.update();

    assert!(!app.world().resource::<InteractableRegistry>().contains(lever));
    let focus = app.world().get::<InteractionFocus>(player).unwrap();
    assert_eq!(focus.current(), None);
    assert!(focus.in_range().is_empty());

    press(&mut app, player, InputAction::Interact);
    app.update();
    assert_eq!(reads.load(Ordering::SeqCst), 0);
}

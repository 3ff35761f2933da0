//! Tests for shoulder bash.

#[cfg(test)]
mod tests {
    use bevy::prelude::*;

    use super::super::context::test_body::TestBody;
    use super::super::shoulder_bash::{BashOverlap, BashState, ShoulderBash, ShoulderBashConfig};
    use super::super::{AbilityKind, AbilityLock};
    use crate::animation::{AnimNotify, Clip, Notify};
    use crate::character::{berserker_abilities, player_character};
    use crate::combat::{enemy_bundle, Breakable, DestructibleRegistry, EnemyConfig};
    use crate::components::{Archetype, Health, MovementMode, Player};
    use crate::config::AbilityTuning;
    use crate::input::{ActionInput, InputAction};
    use crate::{create_headless_app, SimulationPlugin};

    /// App с berserker'ом, у которого bash уже в фазе Moving с hitbox
    fn moving_bash_app(finish_on_impact: bool) -> (App, Entity) {
        let mut app = create_headless_app(42);
        app.add_plugins(SimulationPlugin);
        let tuning = AbilityTuning::default();
        let player = app
            .world_mut()
            .spawn((
                player_character(&tuning, Vec3::ZERO, Archetype::Berserker),
                berserker_abilities(&tuning),
                Player,
            ))
            .id();
        app.world_mut()
            .get_mut::<ShoulderBash>(player)
            .unwrap()
            .config
            .finish_on_impact = finish_on_impact;
        app.update();

        app.world_mut()
            .send_event(ActionInput::pressed(player, InputAction::ShoulderBash));
        app.update();
        app.world_mut()
            .send_event(AnimNotify::new(player, Notify::BashHitboxBegin));
        app.world_mut()
            .send_event(AnimNotify::new(player, Notify::BashMovementBegin));
        app.update();

        let bash = app.world().get::<ShoulderBash>(player).unwrap();
        assert!(matches!(bash.state(), BashState::Moving { .. }));
        assert!(bash.hitbox_enabled());
        (app, player)
    }

    fn overlap(app: &mut App, basher: Entity, other: Entity) {
        app.world_mut().send_event(BashOverlap { basher, other });
    }

    fn started_bash(body: &mut TestBody) -> ShoulderBash {
        let mut bash = ShoulderBash::default();
        assert!(bash.queue(&mut body.ctx()));
        assert!(bash.begin(&mut body.ctx()));
        bash
    }

    #[test]
    fn test_queue_blocked_while_falling() {
        let mut body = TestBody::default();
        body.movement.mode = MovementMode::Falling;
        let mut bash = ShoulderBash::default();

        assert!(!bash.queue(&mut body.ctx()));
        assert_eq!(bash.state(), BashState::Idle);
    }

    #[test]
    fn test_begin_claims_lock_and_plays_movement_clip() {
        let mut body = TestBody::default();
        let bash = started_bash(&mut body);

        assert_eq!(bash.state(), BashState::Animating { direction: Vec3::X });
        assert_eq!(body.lock.holder(), Some(AbilityKind::ShoulderBash));
        assert!(body.montage.is_playing(&Clip::new("bash_movement")));
    }

    #[test]
    fn test_hitbox_only_while_animating_or_moving() {
        let mut body = TestBody::default();
        let mut bash = ShoulderBash::default();

        bash.set_hitbox(true);
        assert!(!bash.hitbox_enabled(), "Idle bash has no hitbox");

        bash.queue(&mut body.ctx());
        bash.begin(&mut body.ctx());
        bash.set_hitbox(true);
        assert!(bash.hitbox_enabled());

        let enemy = Entity::from_raw(3);
        assert!(bash.try_strike(enemy));
        assert!(!bash.try_strike(enemy), "One hit per target per bash");
    }

    #[test]
    fn test_movement_runs_full_distance_then_recovers() {
        let mut body = TestBody::default();
        let mut bash = started_bash(&mut body);
        bash.set_hitbox(true);

        assert!(bash.start_movement(&mut body.ctx()));
        assert_eq!(body.movement.max_walk_speed, 1700.0);

        // 1700 · 0.1 = 170 за тик, 250 → два тика
        bash.tick(&mut body.ctx(), 0.1);
        assert!((bash.remaining_distance() - 80.0).abs() < 1e-3);
        bash.tick(&mut body.ctx(), 0.1);

        assert_eq!(bash.state(), BashState::Recovering);
        assert!(!bash.hitbox_enabled());
        assert!(body.montage.is_playing(&Clip::new("bash_end")));
        assert_eq!(body.movement.velocity, Vec3::ZERO);
        assert!(body.defaults.matches(&body.movement));
    }

    #[test]
    fn test_knockback_only_early_in_bash() {
        let mut body = TestBody::default();
        let mut bash = ShoulderBash::new(ShoulderBashConfig {
            knockback_fraction: 0.5,
            ..Default::default()
        });
        bash.queue(&mut body.ctx());
        bash.begin(&mut body.ctx());
        assert!(bash.should_knockback(), "Full distance remaining");

        bash.start_movement(&mut body.ctx());
        bash.tick(&mut body.ctx(), 0.1);
        // remaining 80 < 0.5 · 250
        assert!(!bash.should_knockback());
    }

    #[test]
    fn test_reset_starts_cooldown_and_releases_lock() {
        let mut body = TestBody::default();
        let mut bash = started_bash(&mut body);
        bash.start_movement(&mut body.ctx());

        bash.reset(&mut body.ctx());
        assert_eq!(bash.state(), BashState::Idle);
        assert!(body.lock.is_free());
        assert!(!bash.cooldown.is_ready());
        assert!(!bash.queue(&mut body.ctx()));

        bash.tick(&mut body.ctx(), 2.0);
        assert!(bash.queue(&mut body.ctx()));
    }

    #[test]
    fn test_finish_on_impact_ends_movement_at_first_hit() {
        let (mut app, player) = moving_bash_app(true);
        let enemy = app
            .world_mut()
            .spawn(enemy_bundle(EnemyConfig::default(), Vec3::new(100.0, 0.0, 0.0)))
            .id();

        overlap(&mut app, player, enemy);
        app.update();

        let world = app.world();
        let bash = world.get::<ShoulderBash>(player).unwrap();
        assert_eq!(bash.state(), BashState::Recovering);
        assert!(!bash.hitbox_enabled());
        assert_eq!(world.get::<Health>(enemy).unwrap().current, 55.0);
        assert_eq!(
            world.get::<AbilityLock>(player).unwrap().holder(),
            Some(AbilityKind::ShoulderBash),
            "Lock held until BashEnd"
        );
    }

    #[test]
    fn test_without_finish_on_impact_bash_keeps_moving() {
        let (mut app, player) = moving_bash_app(false);
        let enemy = app
            .world_mut()
            .spawn(enemy_bundle(EnemyConfig::default(), Vec3::new(100.0, 0.0, 0.0)))
            .id();

        overlap(&mut app, player, enemy);
        app.update();

        let bash = app.world().get::<ShoulderBash>(player).unwrap();
        assert!(matches!(bash.state(), BashState::Moving { .. }));
        assert_eq!(app.world().get::<Health>(enemy).unwrap().current, 55.0);
    }

    #[test]
    fn test_breakable_takes_one_hit_per_bash() {
        let (mut app, player) = moving_bash_app(false);
        let wall = app.world_mut().spawn(Transform::from_xyz(100.0, 0.0, 0.0)).id();
        app.world_mut()
            .resource_mut::<DestructibleRegistry>()
            .register(wall, Breakable { hits: 2 });

        overlap(&mut app, player, wall);
        overlap(&mut app, player, wall);
        app.update();
        overlap(&mut app, player, wall);
        app.update();

        assert!(app.world().resource::<DestructibleRegistry>().contains(wall));
        assert!(app.world().get_entity(wall).is_ok());
    }

    #[test]
    fn test_despawned_destructible_is_unregistered() {
        let mut app = create_headless_app(42);
        app.add_plugins(SimulationPlugin);
        let crate_entity = app.world_mut().spawn(Transform::default()).id();
        app.world_mut()
            .resource_mut::<DestructibleRegistry>()
            .register(crate_entity, Breakable { hits: 3 });
        app.update();

        app.world_mut().despawn(crate_entity);
        app.update();

        assert!(!app.world().resource::<DestructibleRegistry>().contains(crate_entity));
    }
}

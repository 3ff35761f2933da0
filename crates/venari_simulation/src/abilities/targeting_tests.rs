//! Tests for hook point selection.

#[cfg(test)]
mod tests {
    use bevy::prelude::*;

    use super::super::targeting::{find_throw_target, most_aligned, HookTargeting, TargetingConfig};
    use super::super::Grapple;
    use crate::character::{agile_abilities, player_character};
    use crate::components::{Archetype, HookPoint, HookType, Player};
    use crate::config::AbilityTuning;
    use crate::input::{ActionInput, InputAction};
    use crate::shared::CameraView;
    use crate::{create_headless_app, SimulationPlugin};

    fn targeting_app() -> (App, Entity) {
        let mut app = create_headless_app(42);
        app.add_plugins(SimulationPlugin);
        let tuning = AbilityTuning::default();
        let player = app
            .world_mut()
            .spawn((
                player_character(&tuning, Vec3::ZERO, Archetype::Agile),
                agile_abilities(&tuning),
                Player,
            ))
            .id();
        (app, player)
    }

    fn spawn_hook(app: &mut App, hook: HookPoint, position: Vec3) -> Entity {
        app.world_mut()
            .spawn((
                hook,
                Transform::from_translation(position),
                GlobalTransform::from_translation(position),
            ))
            .id()
    }

    fn current(app: &App, player: Entity) -> Option<Entity> {
        app.world().get::<HookTargeting>(player).unwrap().current()
    }

    #[test]
    fn test_picks_highest_dot_above_threshold() {
        let candidates = [
            (1, Vec3::new(100.0, 50.0, 0.0)),
            (2, Vec3::new(100.0, 5.0, 0.0)),
            (3, Vec3::new(100.0, -20.0, 0.0)),
        ];

        let (picked, dot) = most_aligned(Vec3::ZERO, Vec3::X, 0.7, candidates).unwrap();
        assert_eq!(picked, 2);
        assert!(dot > 0.99);
    }

    #[test]
    fn test_nothing_above_threshold() {
        // dot = cos(60°) = 0.5 < 0.7
        let candidates = [(1, Vec3::new(50.0, 86.6, 0.0)), (2, Vec3::new(-100.0, 0.0, 0.0))];
        assert!(most_aligned(Vec3::ZERO, Vec3::X, 0.7, candidates).is_none());
    }

    #[test]
    fn test_threshold_is_strict() {
        let at_threshold = Vec3::new(0.7, (1.0f32 - 0.49).sqrt(), 0.0) * 100.0;
        let dot = Vec3::X.dot(at_threshold.normalize());
        assert!(most_aligned(Vec3::ZERO, Vec3::X, dot, [(1, at_threshold)]).is_none());
    }

    #[test]
    fn test_ties_keep_enumeration_order() {
        let candidates = [
            (1, Vec3::new(100.0, 10.0, 0.0)),
            (2, Vec3::new(100.0, -10.0, 0.0)),
        ];
        let (picked, _) = most_aligned(Vec3::ZERO, Vec3::X, 0.7, candidates).unwrap();
        assert_eq!(picked, 1);
    }

    #[test]
    fn test_candidate_at_eye_is_skipped() {
        let candidates = [(1, Vec3::ZERO), (2, Vec3::new(10.0, 0.0, 0.0))];
        let (picked, _) = most_aligned(Vec3::ZERO, Vec3::X, 0.7, candidates).unwrap();
        assert_eq!(picked, 2);
    }

    #[test]
    fn test_throw_target_respects_radius() {
        let camera = CameraView::new(Vec3::ZERO, Vec3::X);
        let config = TargetingConfig::default();

        let far = Vec3::new(5000.0, 0.0, 0.0);
        let near = Vec3::new(1000.0, 100.0, 0.0);
        assert_eq!(find_throw_target(Vec3::ZERO, &camera, &config, [far, near]), Some(near));
        assert_eq!(find_throw_target(Vec3::ZERO, &camera, &config, [far]), None);
    }

    #[test]
    fn test_unusable_hook_is_rejected_and_target_cleared() {
        let (mut app, player) = targeting_app();
        let hook = spawn_hook(&mut app, HookPoint::new(HookType::Grapplable), Vec3::new(300.0, 0.0, 100.0));
        app.update();
        assert_eq!(current(&app, player), Some(hook));

        app.world_mut().get_mut::<HookPoint>(hook).unwrap().usable = false;
        app.update();

        assert_eq!(current(&app, player), None);
        assert!(!app.world().get::<HookPoint>(hook).unwrap().focused);
    }

    #[test]
    fn test_disabled_hook_type_is_never_targeted() {
        let (mut app, player) = targeting_app();
        let hook = spawn_hook(&mut app, HookPoint::new(HookType::None), Vec3::new(300.0, 0.0, 100.0));
        app.update();

        assert_eq!(current(&app, player), None);
        assert!(!app.world().get::<HookPoint>(hook).unwrap().focused);
    }

    #[test]
    fn test_best_candidate_rejected_hides_worse_one() {
        // Отказ по лучшему кандидату очищает цель, следующий не выбирается
        let (mut app, player) = targeting_app();
        let mut disabled = HookPoint::new(HookType::Grapplable);
        disabled.usable = false;
        spawn_hook(&mut app, disabled, Vec3::new(300.0, 0.0, 100.0));
        spawn_hook(&mut app, HookPoint::new(HookType::Grapplable), Vec3::new(300.0, 60.0, 100.0));
        app.update();

        assert_eq!(current(&app, player), None);
    }

    #[test]
    fn test_despawned_hook_is_forgotten_mid_grapple() {
        let (mut app, player) = targeting_app();
        let hook = spawn_hook(&mut app, HookPoint::new(HookType::Grapplable), Vec3::new(300.0, 0.0, 100.0));
        app.update();
        app.world_mut()
            .send_event(ActionInput::pressed(player, InputAction::Hook));
        app.update();
        assert!(app.world().get::<Grapple>(player).unwrap().is_active());

        app.world_mut().despawn(hook);
        app.update();

        assert!(app.world().get::<Grapple>(player).unwrap().is_active());
        assert_eq!(current(&app, player), None);
    }
}

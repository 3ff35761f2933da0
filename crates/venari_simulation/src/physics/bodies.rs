//! Rapier компоненты на бросаемых телах и врагах

use bevy::prelude::*;
use bevy_rapier3d::prelude::{ExternalForce, ExternalImpulse, Velocity};

use crate::components::PullableBody;

/// Bundle бросаемого физического тела
///
/// Rigid body и collider добавляет движок; ECS пишет force/impulse/velocity.
pub fn pullable_body(mass: f32) -> impl Bundle {
    (
        PullableBody { mass },
        Velocity::zero(),
        ExternalForce::default(),
        ExternalImpulse::default(),
    )
}

/// Непрерывная сила, приложенная в точке тела
pub fn force_at_point(force: Vec3, point: Vec3, center_of_mass: Vec3) -> ExternalForce {
    ExternalForce::at_point(force, point, center_of_mass)
}

/// Сбрасывает скорость тела перед броском
pub fn halt(velocity: &mut Velocity) {
    velocity.linvel = Vec3::ZERO;
    velocity.angvel = Vec3::ZERO;
}

//! Конвенция осей мира.
//!
//! Z — вверх, X — forward персонажа при нулевом yaw. Landing offset'ы,
//! height-кривые и сплющивание векторов камеры опираются на это.

use bevy::prelude::*;

pub const UP: Vec3 = Vec3::Z;
pub const FORWARD: Vec3 = Vec3::X;

/// Проекция вектора на горизонтальную плоскость (без нормализации)
pub fn flatten(v: Vec3) -> Vec3 {
    Vec3::new(v.x, v.y, 0.0)
}

/// Yaw-only поворот от `from` к `to`.
///
/// None если точки совпадают по горизонтали (yaw не определён).
pub fn yaw_towards(from: Vec3, to: Vec3) -> Option<Quat> {
    let direction = flatten(to - from);
    if direction.length_squared() <= f32::EPSILON {
        return None;
    }
    Some(Quat::from_rotation_z(direction.y.atan2(direction.x)))
}

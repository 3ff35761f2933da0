//! Physics interface
//!
//! Симуляция не делает raycast'ы сама: движок ставит реализацию
//! `LineOfSight` в resource `SpatialQueries`. Физические тела (бросаемые
//! объекты, враги) несут rapier компоненты, которые ECS пишет, а rapier
//! (или движок) применяет.

use bevy::prelude::*;

pub mod bodies;

pub use bodies::*;

/// Результат line-of-sight трассировки
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub entity: Entity,
    pub point: Vec3,
    pub normal: Vec3,
}

/// Line trace от `from` к `to`
///
/// Возвращает первое пересечение или None, если луч свободен.
/// `target` — entity, к которой целимся (реализация может её игнорировать).
pub trait LineOfSight: Send + Sync + 'static {
    fn cast(&self, from: Vec3, to: Vec3, target: Entity) -> Option<RayHit>;
}

/// Пустой мир: ничего не перекрывает, луч "попадает" в саму цель
pub struct Unobstructed;

impl LineOfSight for Unobstructed {
    fn cast(&self, _from: Vec3, to: Vec3, target: Entity) -> Option<RayHit> {
        Some(RayHit {
            entity: target,
            point: to,
            normal: Vec3::ZERO,
        })
    }
}

/// Сферические окклюдеры (headless стенд для тестов)
#[derive(Default)]
pub struct SphereOccluders {
    pub spheres: Vec<(Entity, Vec3, f32)>,
}

impl SphereOccluders {
    pub fn with(mut self, entity: Entity, center: Vec3, radius: f32) -> Self {
        self.spheres.push((entity, center, radius));
        self
    }
}

impl LineOfSight for SphereOccluders {
    fn cast(&self, from: Vec3, to: Vec3, target: Entity) -> Option<RayHit> {
        let segment = to - from;
        let length = segment.length();
        let Some(direction) = segment.try_normalize() else {
            return Unobstructed.cast(from, to, target);
        };

        let mut nearest: Option<(f32, RayHit)> = None;
        for &(entity, center, radius) in &self.spheres {
            // Ближайшее пересечение луча со сферой
            let offset = from - center;
            let b = offset.dot(direction);
            let c = offset.length_squared() - radius * radius;
            let discriminant = b * b - c;
            if discriminant < 0.0 {
                continue;
            }
            let t = -b - discriminant.sqrt();
            if t < 0.0 || t > length {
                continue;
            }
            if nearest.as_ref().is_some_and(|(best, _)| *best <= t) {
                continue;
            }
            let point = from + direction * t;
            nearest = Some((
                t,
                RayHit {
                    entity,
                    point,
                    normal: (point - center).normalize_or_zero(),
                },
            ));
        }

        match nearest {
            Some((_, hit)) => Some(hit),
            None => Unobstructed.cast(from, to, target),
        }
    }
}

/// Resource с реализацией spatial queries
#[derive(Resource)]
pub struct SpatialQueries {
    line_of_sight: Box<dyn LineOfSight>,
}

impl Default for SpatialQueries {
    fn default() -> Self {
        Self::new(Unobstructed)
    }
}

impl SpatialQueries {
    pub fn new(line_of_sight: impl LineOfSight) -> Self {
        Self {
            line_of_sight: Box::new(line_of_sight),
        }
    }

    pub fn line_of_sight(&self, from: Vec3, to: Vec3, target: Entity) -> Option<RayHit> {
        self.line_of_sight.cast(from, to, target)
    }
}

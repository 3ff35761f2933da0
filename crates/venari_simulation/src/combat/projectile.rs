//! Вражеские снаряды: fuse timer, урон игроку, взрыв
//!
//! Полёт и коллизии — у движка. ECS держит таймер и решает, что взрывается.

use bevy::prelude::*;
use bevy_rapier3d::prelude::{ExternalImpulse, Velocity};

use super::damage::ApplyDamage;
use crate::components::Player;
use crate::logger;

#[derive(Component, Debug, Clone, Copy, PartialEq)]
#[require(Transform)]
pub struct Projectile {
    pub damage: f32,
    /// Секунды до самоподрыва
    pub fuse: f32,
}

impl Projectile {
    pub fn new(damage: f32, fuse: f32) -> Self {
        Self { damage, fuse }
    }

    /// Возвращает true, когда fuse истёк
    pub fn tick(&mut self, delta: f32) -> bool {
        if self.fuse > 0.0 {
            self.fuse -= delta;
            return false;
        }
        true
    }
}

/// Bundle снаряда с импульсом запуска
pub fn launched_projectile(
    projectile: Projectile,
    position: Vec3,
    direction: Vec3,
    launch_impulse: f32,
) -> impl Bundle {
    (
        projectile,
        Transform::from_translation(position),
        Velocity::zero(),
        ExternalImpulse {
            impulse: direction.normalize_or_zero() * launch_impulse,
            ..default()
        },
    )
}

/// Event: trigger снаряда пересёк коллайдер (Engine → ECS)
#[derive(Event, Debug, Clone, Copy)]
pub struct ProjectileOverlap {
    pub projectile: Entity,
    pub other: Entity,
}

/// Event: снаряд взорвался (для VFX)
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct ProjectileExploded {
    pub projectile: Entity,
    pub position: Vec3,
}

fn explode(
    commands: &mut Commands,
    entity: Entity,
    position: Vec3,
    exploded_events: &mut EventWriter<ProjectileExploded>,
) {
    exploded_events.write(ProjectileExploded {
        projectile: entity,
        position,
    });
    commands.entity(entity).despawn();
}

/// Система: попадания снарядов в игрока
pub fn process_projectile_hits(
    mut commands: Commands,
    mut overlaps: EventReader<ProjectileOverlap>,
    projectiles: Query<(&Projectile, &Transform)>,
    players: Query<(), With<Player>>,
    mut damage_events: EventWriter<ApplyDamage>,
    mut exploded_events: EventWriter<ProjectileExploded>,
    mut exploded: Local<Vec<Entity>>,
) {
    exploded.clear();

    for overlap in overlaps.read() {
        if exploded.contains(&overlap.projectile) || players.get(overlap.other).is_err() {
            continue;
        }
        let Ok((projectile, transform)) = projectiles.get(overlap.projectile) else {
            continue;
        };

        damage_events.write(ApplyDamage::new(overlap.other, projectile.damage).from(overlap.projectile));
        explode(
            &mut commands,
            overlap.projectile,
            transform.translation,
            &mut exploded_events,
        );
        exploded.push(overlap.projectile);
        logger::log(&format!(
            "💣 ECS: projectile {:?} hit {:?}",
            overlap.projectile, overlap.other
        ));
    }
}

/// Система: fuse timers
pub fn tick_projectiles(
    time: Res<Time>,
    mut commands: Commands,
    mut projectiles: Query<(Entity, &mut Projectile, &Transform)>,
    mut exploded_events: EventWriter<ProjectileExploded>,
) {
    let delta = time.delta_secs();
    for (entity, mut projectile, transform) in projectiles.iter_mut() {
        if projectile.tick(delta) {
            explode(&mut commands, entity, transform.translation, &mut exploded_events);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fuse_counts_down_then_fires() {
        let mut projectile = Projectile::new(20.0, 0.5);
        assert!(!projectile.tick(0.25));
        assert!(!projectile.tick(0.25));
        assert!(projectile.tick(0.25), "Fires on the frame after fuse reaches zero");
    }
}

//! Possession: переключение управления на другого персонажа
//!
//! Камера плавно переезжает к view цели; по прибытии marker `Player`
//! переходит на цель, а камера сбрасывается на rig offset.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::components::Player;
use crate::logger;
use crate::shared::CameraView;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PossessionConfig {
    pub location_speed: f32,
    pub rotation_speed: f32,
    pub location_threshold: f32,
    pub rotation_threshold: f32,
}

impl Default for PossessionConfig {
    fn default() -> Self {
        Self {
            location_speed: 25.0,
            rotation_speed: 25.0,
            location_threshold: 0.01,
            rotation_threshold: 0.01,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PossessionState {
    #[default]
    Idle,
    Transitioning {
        target: Entity,
    },
}

#[derive(Component, Debug, Clone, Copy, Default, PartialEq)]
pub struct Possession {
    pub config: PossessionConfig,
    state: PossessionState,
}

impl Possession {
    pub fn new(config: PossessionConfig) -> Self {
        Self {
            config,
            state: PossessionState::Idle,
        }
    }

    pub fn state(&self) -> PossessionState {
        self.state
    }

    pub fn is_possessing(&self) -> bool {
        self.state != PossessionState::Idle
    }

    pub fn target(&self) -> Option<Entity> {
        match self.state {
            PossessionState::Idle => None,
            PossessionState::Transitioning { target } => Some(target),
        }
    }

    pub fn start(&mut self, target: Entity) -> bool {
        if self.is_possessing() {
            return false;
        }
        self.state = PossessionState::Transitioning { target };
        true
    }

    pub fn finish(&mut self) {
        self.state = PossessionState::Idle;
    }

    /// Шаг камеры к `goal`. Возвращает true, когда обе оси в пределах порогов.
    pub fn step_camera(&self, camera: &mut CameraView, goal: &CameraView, delta: f32) -> bool {
        let location_alpha = (self.config.location_speed * delta).min(1.0);
        let rotation_alpha = (self.config.rotation_speed * delta).min(1.0);

        camera.position = camera.position.lerp(goal.position, location_alpha);
        camera.forward = camera
            .forward
            .lerp(goal.forward, rotation_alpha)
            .try_normalize()
            .unwrap_or(goal.forward);

        camera.position.distance(goal.position) <= self.config.location_threshold
            && camera.forward.distance(goal.forward) <= self.config.rotation_threshold
    }
}

/// Event: possession завершён, `Player` теперь на `to`
#[derive(Event, Debug, Clone, Copy)]
pub struct PossessionCompleted {
    pub from: Entity,
    pub to: Entity,
}

/// Система: переезд камеры и передача `Player`
pub fn tick_possession(
    time: Res<Time>,
    mut commands: Commands,
    mut characters: Query<(Entity, &Transform, &mut Possession, &mut CameraView)>,
    mut completed: EventWriter<PossessionCompleted>,
) {
    let delta = time.delta_secs();

    let transitions: Vec<(Entity, Entity)> = characters
        .iter()
        .filter_map(|(entity, _, possession, _)| possession.target().map(|target| (entity, target)))
        .collect();

    for (from, to) in transitions {
        let Ok((_, _, _, goal)) = characters.get(to).map(|(e, t, p, c)| (e, *t, *p, *c)) else {
            // Цель исчезла
            if let Ok((_, _, mut possession, _)) = characters.get_mut(from) {
                possession.finish();
            }
            continue;
        };

        let Ok((_, transform, mut possession, mut camera)) = characters.get_mut(from) else {
            continue;
        };

        if !possession.step_camera(&mut camera, &goal, delta) {
            continue;
        }

        possession.finish();
        camera.reset_to_rig(transform);
        commands.entity(from).remove::<Player>();
        commands.entity(to).insert(Player);
        completed.write(PossessionCompleted { from, to });
        logger::log_info(&format!("🎭 ECS: possession {:?} → {:?}", from, to));
    }
}

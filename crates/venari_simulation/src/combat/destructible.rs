//! Destructible registry
//!
//! Объекты, разрушаемые shoulder-bash'ем, регистрируют callback по entity.
//! Callback может разрушить сам объект: registry перепроверяет запись после
//! вызова и не трогает её, если объект исчез.

use std::collections::HashMap;

use bevy::prelude::*;

use crate::logger;

/// Результат удара по разрушаемому объекту
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destruction {
    Destroyed,
    Intact,
}

pub trait Destructible: Send + Sync + 'static {
    fn on_destruction(&mut self, entity: Entity, by: Entity) -> Destruction;
}

/// Ломается после `hits` ударов
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Breakable {
    pub hits: u32,
}

impl Destructible for Breakable {
    fn on_destruction(&mut self, _entity: Entity, _by: Entity) -> Destruction {
        self.hits = self.hits.saturating_sub(1);
        if self.hits == 0 {
            Destruction::Destroyed
        } else {
            Destruction::Intact
        }
    }
}

#[derive(Resource, Default)]
pub struct DestructibleRegistry {
    entries: HashMap<Entity, Box<dyn Destructible>>,
}

impl DestructibleRegistry {
    pub fn register(&mut self, entity: Entity, destructible: impl Destructible) {
        self.entries.insert(entity, Box::new(destructible));
    }

    pub fn unregister(&mut self, entity: Entity) -> bool {
        self.entries.remove(&entity).is_some()
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.entries.contains_key(&entity)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Вызывает callback. true — объект разрушен и удалён из registry.
    pub fn destroy(&mut self, entity: Entity, by: Entity) -> bool {
        let Some(mut destructible) = self.entries.remove(&entity) else {
            return false;
        };

        match destructible.on_destruction(entity, by) {
            Destruction::Destroyed => {
                logger::log(&format!("🧱 ECS: {:?} destroyed by {:?}", entity, by));
                true
            }
            Destruction::Intact => {
                self.entries.insert(entity, destructible);
                false
            }
        }
    }
}

/// Система: destructibles, despawn'нутые извне, уходят из registry
pub fn forget_despawned_destructibles(
    mut removed: RemovedComponents<Transform>,
    alive: Query<()>,
    mut registry: ResMut<DestructibleRegistry>,
) {
    for entity in removed.read() {
        if alive.get(entity).is_ok() {
            continue;
        }
        if registry.unregister(entity) {
            logger::log(&format!("🧱 ECS: destructible {:?} despawned, unregistered", entity));
        }
    }
}

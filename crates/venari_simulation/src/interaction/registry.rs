//! Interactable registry: callbacks по entity
//!
//! Callback может уничтожить свой объект (`InteractionOutcome::Destroyed`).
//! Registry вынимает запись на время вызова и возвращает её только если
//! объект пережил callback, так что уничтоженный объект больше не вызывается.

use std::collections::HashMap;

use bevy::prelude::*;

/// Результат взаимодействия
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionOutcome {
    Handled,
    /// Объект уничтожил себя
    Destroyed,
    /// Игрок должен вселиться в этого персонажа
    RequestPossession,
}

pub trait Interactable: Send + Sync + 'static {
    /// Показать visual cue
    fn on_enable(&mut self, _entity: Entity) {}

    /// Спрятать visual cue
    fn on_disable(&mut self, _entity: Entity) {}

    fn on_interact(&mut self, entity: Entity, interactor: Entity) -> InteractionOutcome;
}

/// Персонаж, в которого можно вселиться
#[derive(Debug, Clone, Copy, Default)]
pub struct Possessable;

impl Interactable for Possessable {
    fn on_interact(&mut self, _entity: Entity, _interactor: Entity) -> InteractionOutcome {
        InteractionOutcome::RequestPossession
    }
}

#[derive(Resource, Default)]
pub struct InteractableRegistry {
    entries: HashMap<Entity, Box<dyn Interactable>>,
}

impl InteractableRegistry {
    pub fn register(&mut self, entity: Entity, interactable: impl Interactable) {
        self.entries.insert(entity, Box::new(interactable));
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

    pub fn enable(&mut self, entity: Entity) {
        if let Some(interactable) = self.entries.get_mut(&entity) {
            interactable.on_enable(entity);
        }
    }

    pub fn disable(&mut self, entity: Entity) {
        if let Some(interactable) = self.entries.get_mut(&entity) {
            interactable.on_disable(entity);
        }
    }

    /// Disable + on_interact. None если entity не зарегистрирован.
    pub fn interact(&mut self, entity: Entity, interactor: Entity) -> Option<InteractionOutcome> {
        let mut interactable = self.entries.remove(&entity)?;

        interactable.on_disable(entity);
        let outcome = interactable.on_interact(entity, interactor);

        if outcome != InteractionOutcome::Destroyed {
            self.entries.insert(entity, interactable);
        }
        Some(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

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
    fn test_destroyed_interactable_is_never_called_again() {
        let reads = Arc::new(AtomicU32::new(0));
        let mut registry = InteractableRegistry::default();
        let note = Entity::from_raw(3);
        let player = Entity::from_raw(1);
        registry.register(
            note,
            Note {
                reads: reads.clone(),
            },
        );

        assert_eq!(registry.interact(note, player), Some(InteractionOutcome::Destroyed));
        assert!(!registry.contains(note));
        assert_eq!(registry.interact(note, player), None);
        registry.enable(note);
        assert_eq!(reads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_possessable_survives_interaction() {
        let mut registry = InteractableRegistry::default();
        let body = Entity::from_raw(5);
        registry.register(body, Possessable);

        assert_eq!(
            registry.interact(body, Entity::from_raw(1)),
            Some(InteractionOutcome::RequestPossession)
        );
        assert!(registry.contains(body));
    }
}

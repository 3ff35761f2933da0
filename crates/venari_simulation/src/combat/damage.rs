//! Damage pipeline
//!
//! Hit logic (melee, bash, grapple-attack, enemy, projectile) шлёт `ApplyDamage`.
//! `apply_damage` — единственное место, где меняется `Health`:
//! - berserk смягчает входящий урон
//! - игрок: AbilityInterrupt (Damaged/Died), UI закрывается при смерти
//! - враг: damage клип или случайный death клип
//! - смерть: marker `Dead` + `EntityDied`

use bevy::prelude::*;
use rand::Rng;

use super::enemy::Enemy;
use crate::abilities::{AbilityInterrupt, AbilityLock, Boosts, InterruptReason};
use crate::animation::{Clip, MontagePlayer};
use crate::components::{Dead, Health, UiState};
use crate::logger;
use crate::DeterministicRng;

/// Запрос урона
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct ApplyDamage {
    pub source: Option<Entity>,
    pub target: Entity,
    pub amount: f32,
}

impl ApplyDamage {
    pub fn new(target: Entity, amount: f32) -> Self {
        Self {
            source: None,
            target,
            amount,
        }
    }

    pub fn from(mut self, source: Entity) -> Self {
        self.source = Some(source);
        self
    }
}

/// Событие: урон нанесен
///
/// `amount` — фактически снятое здоровье (после damping и clamp).
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct DamageDealt {
    pub source: Option<Entity>,
    pub target: Entity,
    pub amount: f32,
    pub target_died: bool,
}

/// Событие: entity умер (health <= 0)
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct EntityDied {
    pub entity: Entity,
    pub killer: Option<Entity>,
}

/// Случайный death клип; None если список пуст
pub fn pick_death_clip<'a, R: Rng>(clips: &'a [Clip], rng: &mut R) -> Option<&'a Clip> {
    if clips.is_empty() {
        return None;
    }
    clips.get(rng.gen_range(0..clips.len()))
}

/// Система: ApplyDamage → Health
pub fn apply_damage(
    mut commands: Commands,
    mut requests: EventReader<ApplyDamage>,
    mut targets: Query<(
        &mut Health,
        Option<&Boosts>,
        Option<&mut UiState>,
        Option<&mut MontagePlayer>,
        Option<&mut Enemy>,
        Has<AbilityLock>,
    )>,
    mut rng: ResMut<DeterministicRng>,
    mut dealt_events: EventWriter<DamageDealt>,
    mut died_events: EventWriter<EntityDied>,
    mut interrupts: EventWriter<AbilityInterrupt>,
) {
    for request in requests.read() {
        let Ok((mut health, boosts, ui, montage, enemy, has_abilities)) =
            targets.get_mut(request.target)
        else {
            logger::log_warning(&format!(
                "💥 ApplyDamage: target {:?} has no Health component",
                request.target
            ));
            continue;
        };

        // По мёртвым не бьём
        if health.is_dead() {
            continue;
        }

        let amount = boosts.map_or(request.amount, |boosts| boosts.incoming_damage(request.amount));
        let removed = health.take_damage(amount);
        let died = health.is_dead();

        dealt_events.write(DamageDealt {
            source: request.source,
            target: request.target,
            amount: removed,
            target_died: died,
        });

        if has_abilities {
            interrupts.write(AbilityInterrupt {
                entity: request.target,
                reason: if died {
                    InterruptReason::Died
                } else {
                    InterruptReason::Damaged
                },
            });
        }

        if let (Some(mut enemy), Some(mut montage)) = (enemy, montage) {
            let clip = if died {
                let clip = pick_death_clip(&enemy.config.death_clips, &mut rng.rng).cloned();
                if clip.is_none() {
                    logger::log_warning(&format!(
                        "💀 Enemy {:?} has no death clips configured",
                        request.target
                    ));
                }
                clip
            } else {
                enemy.config.damage_clip.clone()
            };
            if let Some(clip) = clip {
                enemy.interrupt_swing();
                montage.play(&clip);
            }
        }

        if !died {
            continue;
        }

        if let Some(mut ui) = ui {
            ui.inventory_open = false;
            ui.notebook_open = false;
        }

        commands.entity(request.target).insert(Dead);
        died_events.write(EntityDied {
            entity: request.target,
            killer: request.source,
        });
        logger::log_info(&format!(
            "💀 Entity {:?} killed by {:?}",
            request.target, request.source
        ));
    }
}

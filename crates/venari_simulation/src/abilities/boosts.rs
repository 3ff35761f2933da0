//! Berserker boosts: life-steal и berserk
//!
//! Два независимых таймера Ready → Active → Cooling → Ready.
//! Berserk временно повышает `MeleeCombo::damage` и смягчает входящий урон.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::abilities::{MeleeCombo, Possession};
use crate::components::{Health, Player, UiState};
use crate::input::{ActionInput, InputAction};
use crate::logger;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoostConfig {
    pub life_steal_percent: f32,
    pub life_steal_duration: f32,
    pub life_steal_cooldown: f32,
    pub damage_bonus: f32,
    /// Множитель входящего урона во время berserk
    pub damage_damping: f32,
    pub berserk_duration: f32,
    pub berserk_cooldown: f32,
}

impl Default for BoostConfig {
    fn default() -> Self {
        Self {
            life_steal_percent: 0.5,
            life_steal_duration: 2.0,
            life_steal_cooldown: 2.0,
            damage_bonus: 10.0,
            damage_damping: 0.5,
            berserk_duration: 2.0,
            berserk_cooldown: 2.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoostKind {
    LifeSteal,
    Berserk,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BoostPhase {
    Ready,
    Active { remaining: f32 },
    Cooling { remaining: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoostTimer {
    pub duration: f32,
    pub cooldown: f32,
    phase: BoostPhase,
}

impl BoostTimer {
    pub fn new(duration: f32, cooldown: f32) -> Self {
        Self {
            duration,
            cooldown,
            phase: BoostPhase::Ready,
        }
    }

    pub fn phase(&self) -> BoostPhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        matches!(self.phase, BoostPhase::Active { .. })
    }

    pub fn activate(&mut self) -> bool {
        if self.phase != BoostPhase::Ready {
            return false;
        }
        self.phase = BoostPhase::Active {
            remaining: self.duration,
        };
        true
    }

    /// Возвращает true в кадр, когда Active истёк
    pub fn tick(&mut self, delta: f32) -> bool {
        match self.phase {
            BoostPhase::Ready => false,
            BoostPhase::Active { remaining } => {
                let remaining = remaining - delta;
                if remaining > 0.0 {
                    self.phase = BoostPhase::Active { remaining };
                    return false;
                }
                self.phase = BoostPhase::Cooling {
                    remaining: self.cooldown,
                };
                true
            }
            BoostPhase::Cooling { remaining } => {
                let remaining = remaining - delta;
                self.phase = if remaining > 0.0 {
                    BoostPhase::Cooling { remaining }
                } else {
                    BoostPhase::Ready
                };
                false
            }
        }
    }
}

#[derive(Component, Debug, Clone, PartialEq)]
pub struct Boosts {
    pub config: BoostConfig,
    pub life_steal: BoostTimer,
    pub berserk: BoostTimer,
    /// Урон до berserk, восстанавливается при истечении
    cached_damage: Option<f32>,
}

impl Default for Boosts {
    fn default() -> Self {
        Self::new(BoostConfig::default())
    }
}

impl Boosts {
    pub fn new(config: BoostConfig) -> Self {
        Self {
            life_steal: BoostTimer::new(config.life_steal_duration, config.life_steal_cooldown),
            berserk: BoostTimer::new(config.berserk_duration, config.berserk_cooldown),
            config,
            cached_damage: None,
        }
    }

    pub fn activate(&mut self, kind: BoostKind, melee: &mut MeleeCombo) -> bool {
        match kind {
            BoostKind::LifeSteal => self.life_steal.activate(),
            BoostKind::Berserk => {
                if !self.berserk.activate() {
                    return false;
                }
                self.cached_damage = Some(melee.damage);
                melee.damage += self.config.damage_bonus;
                true
            }
        }
    }

    pub fn tick(&mut self, delta: f32, melee: &mut MeleeCombo) {
        self.life_steal.tick(delta);
        if self.berserk.tick(delta) {
            if let Some(original) = self.cached_damage.take() {
                melee.damage = original;
            }
        }
    }

    /// Heal за нанесённый урон, если life-steal активен
    pub fn life_steal_heal(&self, damage_dealt: f32) -> Option<f32> {
        self.life_steal
            .is_active()
            .then(|| damage_dealt * self.config.life_steal_percent)
    }

    pub fn incoming_damage(&self, amount: f32) -> f32 {
        if self.berserk.is_active() {
            amount * self.config.damage_damping
        } else {
            amount
        }
    }
}

/// Система: boost input → activate
pub fn handle_boost_input(
    mut inputs: EventReader<ActionInput>,
    mut characters: Query<(&mut Boosts, &mut MeleeCombo, &Health, &UiState, &Possession), With<Player>>,
) {
    for input in inputs.read() {
        let kind = if input.is_pressed(InputAction::LifeStealBoost) {
            BoostKind::LifeSteal
        } else if input.is_pressed(InputAction::BerserkBoost) {
            BoostKind::Berserk
        } else {
            continue;
        };

        let Ok((mut boosts, mut melee, health, ui, possession)) = characters.get_mut(input.entity)
        else {
            continue;
        };

        if health.is_dead() || ui.blocks_abilities() || possession.is_possessing() {
            continue;
        }

        if boosts.activate(kind, &mut melee) {
            logger::log_info(&format!("🔥 ECS: {:?} activated {:?} boost", input.entity, kind));
        }
    }
}

/// Система: boost таймеры (заморожены у мёртвых)
pub fn tick_boosts(time: Res<Time>, mut characters: Query<(&mut Boosts, &mut MeleeCombo, &Health)>) {
    let delta = time.delta_secs();
    for (mut boosts, mut melee, health) in characters.iter_mut() {
        if health.is_dead() {
            continue;
        }
        boosts.tick(delta, &mut melee);
    }
}

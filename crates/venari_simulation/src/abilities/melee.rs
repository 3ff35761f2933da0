//! Melee combo state machine
//!
//! Архитектура:
//! - ECS: combo index, window/continue/queued-special флаги, attack string
//! - Engine: проигрывает clip, шлёт ComboWindow/MeleeHitbox/AttackAnimationEnd notifies
//! - Engine → ECS: MeleeOverlap (hitbox пересёк коллайдер)

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::abilities::{AbilityLock, Boosts, Possession};
use crate::animation::{AnimNotify, Clip, MontagePlayer, Notify};
use crate::combat::{ApplyDamage, Enemy};
use crate::components::{CharacterMovement, Dead, Health, Player, UiState};
use crate::input::{ActionInput, InputAction};
use crate::logger;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeleeConfig {
    /// Клипы атак по порядку комбо
    pub clips: Vec<Clip>,
    /// Комбо обрывается на последнем клипе (без wrap)
    pub limited_combo: bool,
    pub damage: f32,
    /// Через сколько секунд без комбо attack string обнуляется
    pub streak_timeout: f32,
}

impl Default for MeleeConfig {
    fn default() -> Self {
        Self {
            clips: vec![
                Clip::new("attack_1"),
                Clip::new("attack_2"),
                Clip::new("attack_3"),
            ],
            limited_combo: false,
            damage: 25.0,
            streak_timeout: 1.0,
        }
    }
}

// ============================================================================
// Combo state
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ComboPhase {
    #[default]
    Idle,
    /// Клип `index` играет
    Attacking,
    /// Атака закончилась, ждём начала queued special (dash/bash/grapple-attack)
    AwaitingSpecial,
}

#[derive(Component, Debug, Clone, PartialEq)]
pub struct MeleeCombo {
    pub config: MeleeConfig,
    phase: ComboPhase,
    index: usize,
    combo_count: u32,
    window_open: bool,
    continue_requested: bool,
    queued_special: bool,
    hitbox_enabled: bool,
    /// Подряд нанесённые удары (melee + special)
    attack_string: u32,
    streak_timer: f32,
    /// Текущий урон удара (berserk временно повышает)
    pub damage: f32,
    /// Entities, уже получившие урон за текущий клип
    struck: Vec<Entity>,
}

impl Default for MeleeCombo {
    fn default() -> Self {
        Self::new(MeleeConfig::default())
    }
}

impl MeleeCombo {
    pub fn new(config: MeleeConfig) -> Self {
        Self {
            damage: config.damage,
            config,
            phase: ComboPhase::Idle,
            index: 0,
            combo_count: 0,
            window_open: false,
            continue_requested: false,
            queued_special: false,
            hitbox_enabled: false,
            attack_string: 0,
            streak_timer: 0.0,
            struck: Vec::new(),
        }
    }

    pub fn phase(&self) -> ComboPhase {
        self.phase
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn combo_count(&self) -> u32 {
        self.combo_count
    }

    pub fn in_attack_animation(&self) -> bool {
        self.phase == ComboPhase::Attacking
    }

    pub fn in_combo(&self) -> bool {
        self.phase != ComboPhase::Idle
    }

    pub fn window_open(&self) -> bool {
        self.window_open
    }

    pub fn continue_requested(&self) -> bool {
        self.continue_requested
    }

    pub fn queued_special(&self) -> bool {
        self.queued_special
    }

    pub fn hitbox_enabled(&self) -> bool {
        self.hitbox_enabled
    }

    pub fn attack_string(&self) -> u32 {
        self.attack_string
    }

    fn current_clip(&self) -> Option<&Clip> {
        self.config.clips.get(self.index)
    }

    /// Нажатие атаки. Возвращает true если input принят.
    pub fn attack_input(&mut self, montage: &mut MontagePlayer, falling: bool) -> bool {
        if self.config.clips.is_empty() {
            logger::log_warning("⚔️ Melee attack requested but no attack clips configured");
            return false;
        }

        let attacking = self.in_attack_animation();
        if attacking && !self.window_open {
            return false;
        }

        if self.window_open {
            self.continue_requested = true;
        }

        if self.queued_special || falling {
            return false;
        }

        if !attacking {
            self.phase = ComboPhase::Attacking;
            self.index = 0;
            self.combo_count = 0;
            self.attack_string = 0;
            self.continue_requested = false;
            self.play_current(montage);
        }

        true
    }

    /// Конец клипа атаки (notify или reset special способности)
    pub fn end_attack_animation(&mut self, montage: &mut MontagePlayer) {
        if self.phase == ComboPhase::Idle {
            self.window_open = false;
            return;
        }

        self.window_open = false;
        self.hitbox_enabled = false;

        if self.config.limited_combo && self.index + 1 >= self.config.clips.len() {
            self.continue_requested = false;
            self.attack_string = 0;
        }

        if self.queued_special {
            self.phase = ComboPhase::AwaitingSpecial;
            return;
        }

        if self.continue_requested {
            self.continue_combo(montage);
            return;
        }

        self.stop_combo(montage);
    }

    fn continue_combo(&mut self, montage: &mut MontagePlayer) {
        if self.config.clips.is_empty() {
            self.stop_combo(montage);
            return;
        }
        self.index = (self.index + 1) % self.config.clips.len();
        self.combo_count += 1;
        self.continue_requested = false;
        self.phase = ComboPhase::Attacking;
        self.play_current(montage);
    }

    fn play_current(&mut self, montage: &mut MontagePlayer) {
        self.struck.clear();
        if let Some(clip) = self.current_clip() {
            montage.play(clip);
        }
    }

    pub fn stop_combo(&mut self, montage: &mut MontagePlayer) {
        if let Some(clip) = self.current_clip() {
            montage.stop_clip(clip);
        }
        self.phase = ComboPhase::Idle;
        self.index = 0;
        self.combo_count = 0;
        self.continue_requested = false;
        self.window_open = false;
        self.hitbox_enabled = false;
    }

    /// Dash/bash/grapple-attack заняли следующий слот комбо
    pub fn queue_special(&mut self) {
        self.queued_special = true;
        self.continue_requested = false;
        self.window_open = false;
    }

    pub fn clear_queued_special(&mut self) {
        self.queued_special = false;
        if self.phase == ComboPhase::AwaitingSpecial {
            self.phase = ComboPhase::Idle;
            self.index = 0;
            self.combo_count = 0;
        }
    }

    /// Урон/смерть/possession: комбо обрывается полностью
    pub fn interrupt(&mut self, montage: &mut MontagePlayer) {
        self.stop_combo(montage);
        self.queued_special = false;
    }

    pub fn set_window(&mut self, open: bool) {
        self.window_open = open;
    }

    pub fn set_hitbox(&mut self, enabled: bool) {
        self.hitbox_enabled = enabled;
    }

    /// Успешный удар (melee или special)
    pub fn register_hit(&mut self) {
        self.attack_string += 1;
        self.streak_timer = self.config.streak_timeout;
    }

    /// Попадание по `target` за текущий клип; false если уже бил
    pub fn try_strike(&mut self, target: Entity) -> bool {
        if self.struck.contains(&target) {
            return false;
        }
        self.struck.push(target);
        true
    }

    /// Attack string обнуляется через `streak_timeout` вне комбо
    pub fn tick_streak(&mut self, delta: f32) {
        if self.attack_string == 0 || self.in_combo() {
            return;
        }
        if self.streak_timer > 0.0 {
            self.streak_timer -= delta;
            return;
        }
        self.attack_string = 0;
    }
}

// ============================================================================
// Events
// ============================================================================

/// Event: melee hitbox атакующего пересёк коллайдер (Engine → ECS)
#[derive(Event, Debug, Clone, Copy)]
pub struct MeleeOverlap {
    pub attacker: Entity,
    pub other: Entity,
}

// ============================================================================
// Systems
// ============================================================================

/// Система: MeleeAttack input → начать/продолжить комбо
pub fn handle_melee_input(
    mut inputs: EventReader<ActionInput>,
    mut characters: Query<
        (
            &mut MeleeCombo,
            &mut MontagePlayer,
            &CharacterMovement,
            &AbilityLock,
            &Health,
            &UiState,
            &Possession,
        ),
        With<Player>,
    >,
) {
    for input in inputs.read() {
        if !input.is_pressed(InputAction::MeleeAttack) {
            continue;
        }

        let Ok((mut melee, mut montage, movement, lock, health, ui, possession)) =
            characters.get_mut(input.entity)
        else {
            continue;
        };

        if health.is_dead() || ui.blocks_abilities() || possession.is_possessing() || !lock.is_free()
        {
            continue;
        }

        if melee.attack_input(&mut montage, movement.is_falling()) {
            logger::log(&format!(
                "⚔️ ECS: {:?} melee input (combo index {})",
                input.entity,
                melee.index()
            ));
        }
    }
}

/// Система: ComboWindow / MeleeHitbox / AttackAnimationEnd notifies
pub fn on_melee_notifies(
    mut notifies: EventReader<AnimNotify>,
    mut characters: Query<(&mut MeleeCombo, &mut MontagePlayer)>,
) {
    for event in notifies.read() {
        let Ok((mut melee, mut montage)) = characters.get_mut(event.entity) else {
            continue;
        };

        match event.notify {
            Notify::ComboWindow(open) => {
                // Queued special уже занял следующий слот
                if !melee.queued_special() {
                    melee.set_window(open);
                }
            }
            Notify::MeleeHitboxBegin => melee.set_hitbox(true),
            Notify::MeleeHitboxEnd => melee.set_hitbox(false),
            Notify::AttackAnimationEnd => melee.end_attack_animation(&mut montage),
            _ => {}
        }
    }
}

/// Система: MeleeOverlap → ApplyDamage (+ life-steal)
pub fn process_melee_hits(
    mut overlaps: EventReader<MeleeOverlap>,
    mut attackers: Query<(&mut MeleeCombo, &mut Health, Option<&Boosts>), Without<Enemy>>,
    enemies: Query<(), (With<Enemy>, Without<Dead>)>,
    mut damage_events: EventWriter<ApplyDamage>,
) {
    for overlap in overlaps.read() {
        let Ok((mut melee, mut health, boosts)) = attackers.get_mut(overlap.attacker) else {
            continue;
        };

        if health.is_dead() || !melee.hitbox_enabled() || enemies.get(overlap.other).is_err() {
            continue;
        }

        if !melee.try_strike(overlap.other) {
            continue;
        }

        let damage = melee.damage;
        damage_events.write(ApplyDamage::new(overlap.other, damage).from(overlap.attacker));
        melee.register_hit();

        if let Some(heal) = boosts.and_then(|boosts| boosts.life_steal_heal(damage)) {
            health.heal(heal);
        }

        logger::log(&format!(
            "⚔️ ECS: {:?} melee hit {:?} for {} (string {})",
            overlap.attacker,
            overlap.other,
            damage,
            melee.attack_string()
        ));
    }
}

/// Система: затухание attack string
pub fn tick_attack_streak(time: Res<Time>, mut combos: Query<&mut MeleeCombo>) {
    let delta = time.delta_secs();
    for mut melee in combos.iter_mut() {
        melee.tick_streak(delta);
    }
}

//! Ability state machines (player + berserker)
//!
//! ECS ответственность:
//! - State machines: grapple, pull, grapple-attack, dash, shoulder-bash, melee combo
//! - Cooldowns, boosts, hook point targeting, possession
//! - Mutual exclusion через `AbilityLock`
//!
//! Engine ответственность:
//! - Montage playback (или `HeadlessAnimatorPlugin` в тестах) → `AnimNotify`
//! - Overlap volumes → `MeleeOverlap` / `BashOverlap`
//! - Raycasts → `SpatialQueries`

use bevy::prelude::*;

pub mod boosts;
pub mod context;
pub mod cooldown;
pub mod curve;
pub mod dash;
pub mod grapple;
pub mod grapple_attack;
pub mod input;
pub mod interrupt;
pub mod lock;
pub mod melee;
pub mod possession;
pub mod pull;
pub mod shoulder_bash;
pub mod targeting;

// Tests (separate files with _tests suffix)
#[cfg(test)]
mod boosts_tests;
#[cfg(test)]
mod shoulder_bash_tests;
#[cfg(test)]
mod targeting_tests;

// Re-export основных типов
pub use boosts::{BoostConfig, BoostKind, BoostPhase, BoostTimer, Boosts};
pub use context::{AbilityCtx, BodyData};
pub use cooldown::Cooldown;
pub use curve::{FloatCurve, LaunchVariant, TravelCurves, TravelProfile};
pub use dash::{Dash, DashConfig, DashState};
pub use grapple::{Grapple, GrappleConfig, GrappleState};
pub use grapple_attack::{GrappleAttack, GrappleAttackConfig, GrappleAttackState};
pub use input::{abilities_blocked, HookPointUsed};
pub use lock::{AbilityInterrupt, AbilityKind, AbilityLock, InterruptReason};
pub use melee::{ComboPhase, MeleeCombo, MeleeConfig, MeleeOverlap};
pub use possession::{Possession, PossessionCompleted, PossessionConfig, PossessionState};
pub use pull::{throw_direction, ObjectThrown, Pull, PullConfig, PullState, ThrowSetup};
pub use shoulder_bash::{BashOverlap, BashState, ShoulderBash, ShoulderBashConfig};
pub use targeting::{AttackTarget, HookPointFocusChanged, HookTargeting, TargetingConfig};

use crate::animation::{apply_rope_notifies, AnimNotify};
use crate::SimulationSet;

/// Abilities Plugin
///
/// Порядок внутри кадра задаётся `SimulationSet`:
/// 1. Hits — overlap events → ApplyDamage (+ life-steal)
/// 2. Interrupts — AbilityInterrupt → сброс всех способностей
/// 3. Targeting — выбор hook point
/// 4. Triggers — ability input
/// 5. Notifies — AnimNotify callbacks
/// 6. Tick — очереди, движение, cooldowns, boosts, possession
pub struct AbilitiesPlugin;

impl Plugin for AbilitiesPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<AnimNotify>()
            .add_event::<AbilityInterrupt>()
            .add_event::<HookPointFocusChanged>()
            .add_event::<HookPointUsed>()
            .add_event::<ObjectThrown>()
            .add_event::<MeleeOverlap>()
            .add_event::<BashOverlap>()
            .add_event::<PossessionCompleted>();

        app.add_systems(
            Update,
            (melee::process_melee_hits, shoulder_bash::process_bash_overlaps)
                .chain()
                .in_set(SimulationSet::Hits),
        )
        .add_systems(
            Update,
            interrupt::interrupt_abilities.in_set(SimulationSet::Interrupts),
        )
        .add_systems(
            Update,
            (targeting::forget_despawned_targets, targeting::update_hook_targets)
                .chain()
                .in_set(SimulationSet::Targeting),
        )
        .add_systems(
            Update,
            (
                melee::handle_melee_input,
                input::handle_hook_input,
                input::handle_dash_input,
                input::handle_bash_input,
                boosts::handle_boost_input,
            )
                .chain()
                .in_set(SimulationSet::Triggers),
        )
        .add_systems(
            Update,
            (
                apply_rope_notifies,
                grapple::on_grapple_notifies,
                grapple_attack::on_grapple_attack_notifies,
                melee::on_melee_notifies,
                shoulder_bash::on_bash_notifies,
            )
                .chain()
                .in_set(SimulationSet::Notifies),
        )
        .add_systems(
            Update,
            (
                // Фаза 1: queued specials стартуют после конца melee клипа
                grapple_attack::begin_queued_grapple_attacks,
                shoulder_bash::begin_queued_bashes,
                // Фаза 2: движение
                grapple::tick_grapple,
                grapple_attack::tick_grapple_attack,
                pull::tick_pull,
                dash::tick_dash,
                shoulder_bash::tick_bash,
                // Фаза 3: таймеры
                melee::tick_attack_streak,
                boosts::tick_boosts,
                possession::tick_possession,
            )
                .chain()
                .in_set(SimulationSet::Tick),
        );
    }
}

//! Headless montage library
//!
//! Длительности клипов и notify-таймлайны. В движке эту роль играют
//! реальные montage assets; здесь они нужны, чтобы state machines работали
//! в тестах и headless симуляции.

use bevy::prelude::*;
use std::collections::HashMap;

use super::{AnimNotify, Clip, MontagePlayer, Notify};
use crate::config::AbilityTuning;
use crate::logger;
use crate::SimulationSet;

/// Длительность клипа + notifies на нормализованном времени (0, 1]
#[derive(Debug, Clone, PartialEq)]
pub struct ClipTimeline {
    pub duration: f32,
    pub notifies: Vec<(f32, Notify)>,
}

impl ClipTimeline {
    pub fn new(duration: f32) -> Self {
        Self {
            duration,
            notifies: Vec::new(),
        }
    }

    pub fn with_notify(mut self, at: f32, notify: Notify) -> Self {
        self.notifies.push((at, notify));
        self
    }

    /// Notifies, попавшие в полуинтервал (before, after]
    pub fn crossed(&self, before: f32, after: f32) -> impl Iterator<Item = Notify> + '_ {
        self.notifies
            .iter()
            .filter(move |(at, _)| *at > before && *at <= after)
            .map(|(_, notify)| *notify)
    }
}

#[derive(Resource, Debug, Clone, Default)]
pub struct MontageLibrary {
    clips: HashMap<Clip, ClipTimeline>,
}

impl MontageLibrary {
    pub fn insert(&mut self, clip: Clip, timeline: ClipTimeline) {
        self.clips.insert(clip, timeline);
    }

    pub fn get(&self, clip: &Clip) -> Option<&ClipTimeline> {
        self.clips.get(clip)
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    /// Таймлайны для всех клипов из tuning
    pub fn standard(tuning: &AbilityTuning) -> Self {
        let mut library = Self::default();

        for clip in [&tuning.grapple.ground_clip, &tuning.grapple.air_clip] {
            library.insert(
                clip.clone(),
                ClipTimeline::new(1.0)
                    .with_notify(0.1, Notify::RopeVisible(true))
                    .with_notify(0.3, Notify::GrappleMovementStart)
                    .with_notify(1.0, Notify::GrappleEnd),
            );
        }

        for clip in [&tuning.pull.ground_clip, &tuning.pull.air_clip] {
            library.insert(
                clip.clone(),
                ClipTimeline::new(0.6).with_notify(0.05, Notify::RopeVisible(true)),
            );
        }

        for clip in [&tuning.grapple_attack.ground_clip, &tuning.grapple_attack.air_clip] {
            library.insert(
                clip.clone(),
                ClipTimeline::new(0.9)
                    .with_notify(0.05, Notify::RopeVisible(true))
                    .with_notify(0.25, Notify::GrappleAttackMovementStart)
                    .with_notify(0.7, Notify::GrappleAttackDamage)
                    .with_notify(1.0, Notify::GrappleAttackEnd),
            );
        }

        library.insert(tuning.dash.clip.clone(), ClipTimeline::new(0.75));

        library.insert(
            tuning.shoulder_bash.movement_clip.clone(),
            ClipTimeline::new(0.8)
                .with_notify(0.2, Notify::BashHitboxBegin)
                .with_notify(0.25, Notify::BashMovementBegin)
                .with_notify(0.9, Notify::BashHitboxEnd),
        );
        library.insert(
            tuning.shoulder_bash.end_clip.clone(),
            ClipTimeline::new(0.5).with_notify(1.0, Notify::BashEnd),
        );

        for clip in &tuning.melee.clips {
            library.insert(
                clip.clone(),
                ClipTimeline::new(0.6)
                    .with_notify(0.15, Notify::MeleeHitboxBegin)
                    .with_notify(0.35, Notify::MeleeHitboxEnd)
                    .with_notify(0.4, Notify::ComboWindow(true))
                    .with_notify(0.9, Notify::ComboWindow(false))
                    .with_notify(1.0, Notify::AttackAnimationEnd),
            );
        }

        if let Some(clip) = &tuning.enemy.attack_clip {
            library.insert(
                clip.clone(),
                ClipTimeline::new(1.0)
                    .with_notify(0.4, Notify::MeleeHitboxBegin)
                    .with_notify(0.6, Notify::MeleeHitboxEnd),
            );
        }
        if let Some(clip) = &tuning.enemy.damage_clip {
            library.insert(clip.clone(), ClipTimeline::new(0.4));
        }
        for clip in &tuning.enemy.death_clips {
            library.insert(clip.clone(), ClipTimeline::new(1.5));
        }

        library.insert(
            tuning.minion_spawner.clip.clone(),
            ClipTimeline::new(1.2).with_notify(0.5, Notify::SpawnMinions),
        );

        library
    }
}

/// Система: продвигает активные montages и шлёт пересечённые notifies
///
/// Клип без таймлайна останавливается с warning.
pub fn advance_montages(
    time: Res<Time>,
    library: Res<MontageLibrary>,
    mut players: Query<(Entity, &mut MontagePlayer)>,
    mut notify_events: EventWriter<AnimNotify>,
) {
    let delta = time.delta_secs();

    for (entity, mut player) in players.iter_mut() {
        let Some(clip) = player.active().cloned() else {
            continue;
        };

        let Some(timeline) = library.get(&clip) else {
            logger::log_warning(&format!(
                "🎞️ Montage '{}' missing in library (entity {:?}), stopping",
                clip, entity
            ));
            player.stop();
            continue;
        };

        let before = player.progress();
        let after = if timeline.duration <= 0.0 {
            1.0
        } else {
            (before + delta / timeline.duration).min(1.0)
        };

        for notify in timeline.crossed(before, after) {
            notify_events.write(AnimNotify::new(entity, notify));
        }

        if after >= 1.0 {
            player.stop();
        } else {
            player.set_progress(after);
        }
    }
}

/// Headless аниматор (для тестов и headless main)
///
/// Строит `MontageLibrary` из `AbilityTuning`, если библиотека не вставлена заранее.
pub struct HeadlessAnimatorPlugin;

impl Plugin for HeadlessAnimatorPlugin {
    fn build(&self, app: &mut App) {
        if !app.world().contains_resource::<MontageLibrary>() {
            let library = app
                .world()
                .get_resource::<AbilityTuning>()
                .map(MontageLibrary::standard)
                .unwrap_or_else(|| MontageLibrary::standard(&AbilityTuning::default()));
            app.insert_resource(library);
        }

        app.add_event::<AnimNotify>()
            .add_systems(Update, advance_montages.in_set(SimulationSet::Animation));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crossed_is_half_open() {
        let timeline = ClipTimeline::new(1.0)
            .with_notify(0.3, Notify::GrappleMovementStart)
            .with_notify(1.0, Notify::GrappleEnd);

        assert_eq!(timeline.crossed(0.0, 0.29).count(), 0);
        assert_eq!(
            timeline.crossed(0.29, 0.3).collect::<Vec<_>>(),
            vec![Notify::GrappleMovementStart]
        );
        // Уже пересечённый notify не повторяется
        assert_eq!(timeline.crossed(0.3, 0.5).count(), 0);
        assert_eq!(timeline.crossed(0.9, 1.0).collect::<Vec<_>>(), vec![Notify::GrappleEnd]);
    }

    #[test]
    fn test_standard_library_covers_tuning_clips() {
        let tuning = AbilityTuning::default();
        let library = MontageLibrary::standard(&tuning);

        assert!(library.get(&tuning.grapple.ground_clip).is_some());
        assert!(library.get(&tuning.dash.clip).is_some());
        for clip in &tuning.melee.clips {
            assert!(library.get(clip).is_some(), "Missing timeline for {}", clip);
        }
        assert!(library.get(&Clip::new("does_not_exist")).is_none());
    }
}

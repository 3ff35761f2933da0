//! Float curves: кусочно-линейные профили, сэмплируемые по прогрессу клипа

use bevy_math::curve::{Curve, UnevenSampleAutoCurve};
use serde::{Deserialize, Serialize};

use crate::components::CharacterMovement;

/// Кусочно-линейная кривая по ключам (time, value)
///
/// Интерполяция через `UnevenSampleAutoCurve`; за пределами ключей clamp к
/// крайним значениям. Один ключ даёт константу, без ключей кривая возвращает 0.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "Vec<(f32, f32)>", into = "Vec<(f32, f32)>")]
pub struct FloatCurve {
    keys: Vec<(f32, f32)>,
    /// None, если различных времён меньше двух
    sampler: Option<UnevenSampleAutoCurve<f32>>,
}

impl PartialEq for FloatCurve {
    fn eq(&self, other: &Self) -> bool {
        self.keys == other.keys
    }
}

impl From<Vec<(f32, f32)>> for FloatCurve {
    fn from(keys: Vec<(f32, f32)>) -> Self {
        Self::new(keys)
    }
}

impl From<FloatCurve> for Vec<(f32, f32)> {
    fn from(curve: FloatCurve) -> Self {
        curve.keys
    }
}

impl FloatCurve {
    pub fn new(mut keys: Vec<(f32, f32)>) -> Self {
        keys.sort_by(|a, b| a.0.total_cmp(&b.0));
        let sampler = UnevenSampleAutoCurve::new(keys.iter().copied()).ok();
        Self { keys, sampler }
    }

    pub fn constant(value: f32) -> Self {
        Self::new(vec![(0.0, value)])
    }

    pub fn linear(from: f32, to: f32) -> Self {
        Self::new(vec![(0.0, from), (1.0, to)])
    }

    pub fn keys(&self) -> &[(f32, f32)] {
        &self.keys
    }

    pub fn sample(&self, time: f32) -> f32 {
        match &self.sampler {
            Some(sampler) => sampler.sample_clamped(time),
            None => self.keys.first().map_or(0.0, |(_, value)| *value),
        }
    }
}

/// Ground vs air вариант клипа/кривых (по режиму движения на старте)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchVariant {
    Ground,
    Air,
}

impl LaunchVariant {
    pub fn of(movement: &CharacterMovement) -> Self {
        if movement.is_falling() {
            Self::Air
        } else {
            Self::Ground
        }
    }
}

/// Набор кривых полёта по тросу
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TravelCurves {
    /// Доля пути start → destination
    pub speed: FloatCurve,
    /// Вертикальная добавка (дуга)
    pub height: FloatCurve,
    /// Множитель базовой длины троса
    pub rope_length: FloatCurve,
    /// Доля пути конца троса hand → anchor
    pub rope_position: FloatCurve,
}

impl Default for TravelCurves {
    fn default() -> Self {
        Self {
            speed: FloatCurve::new(vec![(0.3, 0.0), (0.85, 1.0)]),
            height: FloatCurve::new(vec![(0.3, 0.0), (0.55, 80.0), (0.85, 0.0)]),
            rope_length: FloatCurve::new(vec![(0.0, 1.0), (0.85, 0.1)]),
            rope_position: FloatCurve::new(vec![(0.0, 0.0), (0.25, 1.0)]),
        }
    }
}

/// Ground и air наборы кривых
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TravelProfile {
    pub ground: TravelCurves,
    pub air: TravelCurves,
}

impl Default for TravelProfile {
    fn default() -> Self {
        let ground = TravelCurves::default();
        // В воздухе дуга ниже
        let air = TravelCurves {
            height: FloatCurve::new(vec![(0.3, 0.0), (0.55, 30.0), (0.85, 0.0)]),
            ..ground.clone()
        };
        Self { ground, air }
    }
}

impl TravelProfile {
    pub fn curves(&self, variant: LaunchVariant) -> &TravelCurves {
        match variant {
            LaunchVariant::Ground => &self.ground,
            LaunchVariant::Air => &self.air,
        }
    }
}

//! Ability tuning: все числовые параметры способностей в одном resource
//!
//! Дефолты соответствуют базовому балансу игры. Файл `.ron` может задавать
//! только часть полей, остальное берётся из `Default` (`#[serde(default)]`).
//!
//! ```ron
//! (
//!     dash: (distance: 1200.0, cooldown: 1.5),
//!     melee: (damage: 30.0),
//! )
//! ```

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::abilities::{
    BoostConfig, DashConfig, GrappleAttackConfig, GrappleConfig, MeleeConfig, PossessionConfig,
    PullConfig, ShoulderBashConfig, TargetingConfig,
};
use crate::combat::{EnemyConfig, MinionSpawnerConfig};
use crate::components::MovementTuning;
use crate::logger;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read tuning file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse tuning file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },

    #[error("Failed to serialize tuning: {0}")]
    Serialize(#[from] ron::Error),
}

#[derive(Resource, Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AbilityTuning {
    pub movement: MovementTuning,
    pub targeting: TargetingConfig,
    pub grapple: GrappleConfig,
    pub pull: PullConfig,
    pub grapple_attack: GrappleAttackConfig,
    pub dash: DashConfig,
    pub shoulder_bash: ShoulderBashConfig,
    pub melee: MeleeConfig,
    pub boosts: BoostConfig,
    pub possession: PossessionConfig,
    pub enemy: EnemyConfig,
    pub minion_spawner: MinionSpawnerConfig,
}

impl AbilityTuning {
    pub fn from_ron(contents: &str, path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        ron::from_str(contents).map_err(|source| ConfigError::Parse {
            path: path.into(),
            source,
        })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let tuning = Self::from_ron(&contents, path)?;
        logger::log_info(&format!("⚙️ Loaded ability tuning from {:?}", path));
        Ok(tuning)
    }

    /// Как `load`, но при ошибке — дефолты + warning
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path) {
            Ok(tuning) => tuning,
            Err(err) => {
                logger::log_warning(&format!("⚙️ {}, using default tuning", err));
                Self::default()
            }
        }
    }

    pub fn to_ron(&self) -> Result<String, ConfigError> {
        Ok(ron::ser::to_string_pretty(
            self,
            ron::ser::PrettyConfig::default(),
        )?)
    }
}

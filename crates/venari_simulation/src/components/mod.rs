//! ECS Components для игровых entity
//!
//! Организация по доменам:
//! - actor: базовые характеристики (health, death marker)
//! - movement: character movement + cached defaults + rig offsets
//! - player: player control marker, archetype
//! - hook_point: hook points, pullable bodies, throw targets
//! - rope: визуал троса (читается движком)
//! - ui: UI blocking flags

pub mod actor;
pub mod hook_point;
pub mod movement;
pub mod player;
pub mod rope;
pub mod ui;

// Re-exports для удобного импорта
pub use actor::*;
pub use hook_point::*;
pub use movement::*;
pub use player::*;
pub use rope::*;
pub use ui::*;

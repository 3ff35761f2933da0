//! Shared domain — cross-cutting типы
//!
//! - axes: конвенция осей (Z-up, X-forward)
//! - camera: CameraView (позиция и направление камеры игрока)

pub mod axes;
pub mod camera;

pub use axes::*;
pub use camera::*;

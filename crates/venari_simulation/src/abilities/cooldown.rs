//! Cooldown timer, общий для всех способностей с перезарядкой

use bevy::prelude::*;

/// Перезарядка: готово когда `remaining <= 0`
#[derive(Debug, Clone, Copy, PartialEq, Default, Reflect)]
pub struct Cooldown {
    /// Полная длительность (секунды)
    pub duration: f32,

    /// Оставшееся время (уменьшается до 0)
    pub remaining: f32,
}

impl Cooldown {
    pub fn new(duration: f32) -> Self {
        Self {
            duration,
            remaining: 0.0,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.remaining <= 0.0
    }

    pub fn start(&mut self) {
        self.remaining = self.duration;
    }

    pub fn tick(&mut self, delta: f32) {
        if self.remaining > 0.0 {
            self.remaining = (self.remaining - delta).max(0.0);
        }
    }

    pub fn clear(&mut self) {
        self.remaining = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cooldown_cycle() {
        let mut cooldown = Cooldown::new(1.0);
        assert!(cooldown.is_ready());

        cooldown.start();
        assert!(!cooldown.is_ready());
        assert_eq!(cooldown.remaining, 1.0);

        cooldown.tick(0.5);
        assert_eq!(cooldown.remaining, 0.5);
        assert!(!cooldown.is_ready());

        cooldown.tick(0.6);
        assert_eq!(cooldown.remaining, 0.0, "Clamped to zero");
        assert!(cooldown.is_ready());
    }

    #[test]
    fn test_restart_resets_to_full_duration() {
        let mut cooldown = Cooldown::new(2.0);
        cooldown.start();
        cooldown.tick(1.5);
        cooldown.start();
        assert_eq!(cooldown.remaining, 2.0);
    }
}

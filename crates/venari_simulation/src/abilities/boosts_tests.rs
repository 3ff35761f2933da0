//! Tests for berserker boosts.

#[cfg(test)]
mod tests {
    use super::super::boosts::{BoostKind, BoostPhase, BoostTimer, Boosts};
    use super::super::melee::MeleeCombo;

    #[test]
    fn test_boost_timer_cycle() {
        let mut timer = BoostTimer::new(2.0, 2.0);
        assert!(timer.activate());
        assert!(!timer.activate(), "Cannot re-activate while active");

        assert!(!timer.tick(1.0));
        assert!(timer.is_active());
        assert!(timer.tick(1.0), "Expires exactly at duration");
        assert!(matches!(timer.phase(), BoostPhase::Cooling { .. }));
        assert!(!timer.activate());

        timer.tick(2.0);
        assert_eq!(timer.phase(), BoostPhase::Ready);
    }

    #[test]
    fn test_life_steal_heals_half_of_damage() {
        let mut boosts = Boosts::default();
        let mut melee = MeleeCombo::default();

        assert_eq!(boosts.life_steal_heal(25.0), None);
        boosts.activate(BoostKind::LifeSteal, &mut melee);
        assert_eq!(boosts.life_steal_heal(25.0), Some(12.5));
    }

    #[test]
    fn test_berserk_restores_exact_damage() {
        let mut boosts = Boosts::default();
        let mut melee = MeleeCombo::default();
        melee.damage = 27.5;

        assert!(boosts.activate(BoostKind::Berserk, &mut melee));
        assert_eq!(melee.damage, 37.5);
        assert_eq!(boosts.incoming_damage(20.0), 10.0);

        boosts.tick(1.0, &mut melee);
        assert_eq!(melee.damage, 37.5);
        boosts.tick(1.0, &mut melee);
        assert_eq!(melee.damage, 27.5, "Original damage restored bit-exact");
        assert_eq!(boosts.incoming_damage(20.0), 20.0);
    }

    #[test]
    fn test_boosts_are_independent() {
        let mut boosts = Boosts::default();
        let mut melee = MeleeCombo::default();

        boosts.activate(BoostKind::Berserk, &mut melee);
        assert!(boosts.activate(BoostKind::LifeSteal, &mut melee));
        assert!(boosts.berserk.is_active());
        assert!(boosts.life_steal.is_active());
    }
}

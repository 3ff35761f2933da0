//! Принудительный сброс всех способностей персонажа
//!
//! Урон, смерть, possession и блокирующий UI шлют `AbilityInterrupt`.
//! Pull при interrupt отпускает тело без броска.

use bevy::prelude::*;
use bevy_rapier3d::prelude::ExternalForce;

use super::context::{AbilityCtx, BodyData};
use super::{AbilityInterrupt, Dash, Grapple, GrappleAttack, Pull, ShoulderBash};
use crate::logger;

/// Сброс в фиксированном порядке: dash, grapple, pull, grapple-attack, bash, melee
pub fn interrupt_all(
    ctx: &mut AbilityCtx,
    dash: Option<&mut Dash>,
    grapple: Option<&mut Grapple>,
    pull: Option<&mut Pull>,
    grapple_attack: Option<&mut GrappleAttack>,
    bash: Option<&mut ShoulderBash>,
) -> Option<Entity> {
    if let Some(dash) = dash {
        dash.stop(ctx);
    }
    if let Some(grapple) = grapple {
        grapple.reset(ctx);
    }
    let released = pull.and_then(|pull| pull.end(ctx));
    if let Some(grapple_attack) = grapple_attack {
        grapple_attack.reset(ctx);
    }
    if let Some(bash) = bash {
        bash.reset(ctx);
    }

    if let Some(melee) = ctx.melee.as_deref_mut() {
        melee.interrupt(ctx.montage);
    }
    ctx.montage.stop();
    ctx.set_rope_visible(false);

    released
}

/// Система: AbilityInterrupt → reset
pub fn interrupt_abilities(
    mut interrupts: EventReader<AbilityInterrupt>,
    mut characters: Query<(
        BodyData,
        Option<&mut Dash>,
        Option<&mut Grapple>,
        Option<&mut Pull>,
        Option<&mut GrappleAttack>,
        Option<&mut ShoulderBash>,
    )>,
    mut forces: Query<&mut ExternalForce>,
) {
    for interrupt in interrupts.read() {
        let Ok((mut body, mut dash, mut grapple, mut pull, mut grapple_attack, mut bash)) =
            characters.get_mut(interrupt.entity)
        else {
            continue;
        };
        let mut ctx = AbilityCtx::from_body(&mut body);

        let released = interrupt_all(
            &mut ctx,
            dash.as_deref_mut(),
            grapple.as_deref_mut(),
            pull.as_deref_mut(),
            grapple_attack.as_deref_mut(),
            bash.as_deref_mut(),
        );

        if let Some(pulled) = released {
            if let Ok(mut force) = forces.get_mut(pulled) {
                *force = ExternalForce::default();
            }
        }

        logger::log(&format!(
            "⛔ ECS: {:?} abilities interrupted ({:?})",
            interrupt.entity, interrupt.reason
        ));
    }
}

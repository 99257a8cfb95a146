//! Подбор оружия: PendingPickup → оружие в руке.

use bevy::prelude::*;

use crate::ai::AiController;
use crate::combat::{equip_weapon, CombatFx, EquippedWeapon, PendingPickup, SoundCue, Weapon, WorldItem};
use crate::components::{CharacterBody, CombatWorldState, Vitality};

/// System: дождаться момента анимации подбора и взять предмет
///
/// Если за время анимации предмет схватил кто-то другой (или в нём
/// кончились патроны), подбор просто отменяется.
pub fn complete_pickups(
    mut commands: Commands,
    state: Res<CombatWorldState>,
    mut pickers: Query<(
        Entity,
        &mut PendingPickup,
        &mut EquippedWeapon,
        &mut CharacterBody,
        &Vitality,
        Option<&mut AiController>,
    )>,
    mut weapons: Query<(&Weapon, &mut WorldItem)>,
    mut fx: EventWriter<CombatFx>,
) {
    for (entity, mut pending, mut equipped, mut body, vitality, ai) in pickers.iter_mut() {
        pending.remaining -= state.delta;
        if pending.remaining > 0.0 {
            continue;
        }
        commands.entity(entity).remove::<PendingPickup>();

        if !vitality.is_alive() || equipped.weapon.is_some() {
            continue;
        }
        let Ok((weapon, mut item)) = weapons.get_mut(pending.target) else {
            continue;
        };
        if item.is_wielded() || !weapon.has_rounds_left() {
            crate::logger::log(&format!("🤷 {:?}: {:?} уже недоступно", entity, pending.target));
            continue;
        }

        equip_weapon(entity, pending.target, weapon, &mut equipped, &mut item, &mut body);
        fx.write(CombatFx::Sound { cue: SoundCue::Pickup, position: item.position, volume: 1.0 });

        if let Some(mut ai) = ai {
            ai.item_target = None;
            ai.wants_pickup_weapon = false;
            ai.intents.interact.value = false;
        }

        crate::logger::log(&format!("🔫 {:?} подобрал {} ({:?})", entity, weapon.name, pending.target));
    }
}

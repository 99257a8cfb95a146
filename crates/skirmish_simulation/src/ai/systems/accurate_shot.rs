//! Accurate shot: старт, тик sequence, снятие блокировки auto-dodge.

use bevy::prelude::*;
use thiserror::Error;

use super::targeting::CombatantView;
use crate::ai::{AccurateShot, AiController, AutoDodgeLockRelease};
use crate::combat::{EquippedWeapon, Weapon};
use crate::components::{AnimationState, CharacterFlags, CombatWorldState, Vitality};
use crate::config::ACCURATE_SHOT_COOLDOWN;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum AccurateShotError {
    #[error("цели {0:?} нет в мире")]
    MissingTarget(Option<Entity>),
    #[error("цель {0:?} мертва")]
    TargetDead(Entity),
    #[error("у стрелка {0:?} нет оружия")]
    Unarmed(Entity),
}

/// Запустить accurate shot по `target`
///
/// Ok(None) = глобальный cooldown ещё идёт (не ошибка, просто не сейчас).
pub fn start_accurate_shot(
    shooter: Entity,
    ai: &mut AiController,
    flags: &mut CharacterFlags,
    weapon: Option<&Weapon>,
    target: Option<&CombatantView>,
    state: &mut CombatWorldState,
) -> Result<Option<AccurateShot>, AccurateShotError> {
    let target = target.ok_or(AccurateShotError::MissingTarget(ai.kill_target))?;
    if !target.alive {
        return Err(AccurateShotError::TargetDead(target.entity));
    }
    if weapon.is_none() {
        return Err(AccurateShotError::Unarmed(shooter));
    }
    if state.seconds_since_accurate_shot() < ACCURATE_SHOT_COOLDOWN {
        return Ok(None);
    }

    state.last_accurate_shot_time = state.elapsed;
    ai.is_doing_accurate_shot = true;
    ai.intents.iron_sight.value = true;
    flags.attacks_cannot_be_auto_dodged = true;

    crate::logger::log_info(&format!("🎯 {:?} начинает accurate shot по {:?}", shooter, target.entity));
    Ok(Some(AccurateShot::new(shooter, target.entity)))
}

/// System: вести sequences, стрелять по истечении, обрывать при смерти
pub fn tick_accurate_shots(
    mut commands: Commands,
    state: Res<CombatWorldState>,
    mut sequences: Query<(Entity, &mut AccurateShot)>,
    mut shooters: Query<(&mut AiController, &mut CharacterFlags, &Vitality, &AnimationState, &EquippedWeapon)>,
    targets: Query<(&Vitality, &AnimationState)>,
    mut weapons: Query<&mut Weapon>,
) {
    for (sequence_entity, mut sequence) in sequences.iter_mut() {
        sequence.time += state.delta;

        let target_ok = targets
            .get(sequence.target)
            .is_ok_and(|(vitality, anim)| vitality.is_alive() && !anim.has_been_ragdolled);

        let Ok((mut ai, mut flags, vitality, anim, equipped)) = shooters.get_mut(sequence.shooter) else {
            commands.entity(sequence_entity).despawn();
            continue;
        };

        let shooter_ok = vitality.is_alive() && !anim.has_been_ragdolled && equipped.weapon.is_some();
        if !shooter_ok || !target_ok {
            crate::logger::log(&format!("❎ accurate shot {:?} → {:?} оборван", sequence.shooter, sequence.target));
            finish(&mut commands, sequence_entity, sequence.shooter, &mut ai);
            continue;
        }

        ai.intents.iron_sight.value = true;
        flags.attacks_cannot_be_auto_dodged = true;

        if !sequence.is_expired() {
            continue;
        }

        if let Some(mut weapon) = equipped.weapon.and_then(|w| weapons.get_mut(w).ok()) {
            weapon.is_firing = true;
        }
        crate::logger::log(&format!("💥 accurate shot {:?} → {:?}", sequence.shooter, sequence.target));
        finish(&mut commands, sequence_entity, sequence.shooter, &mut ai);
    }
}

fn finish(commands: &mut Commands, sequence: Entity, shooter: Entity, ai: &mut AiController) {
    ai.is_doing_accurate_shot = false;
    commands.entity(shooter).insert(AutoDodgeLockRelease::default());
    commands.entity(sequence).despawn();
}

/// System: через 0.05 сек после конца sequence пули стрелка снова можно auto-dodge'нуть
pub fn release_auto_dodge_locks(
    mut commands: Commands,
    state: Res<CombatWorldState>,
    mut locked: Query<(Entity, &mut AutoDodgeLockRelease, &mut CharacterFlags)>,
) {
    for (entity, mut release, mut flags) in locked.iter_mut() {
        release.remaining -= state.delta;
        if release.remaining > 0.0 {
            continue;
        }
        flags.attacks_cannot_be_auto_dodged = false;
        commands.entity(entity).remove::<AutoDodgeLockRelease>();
    }
}

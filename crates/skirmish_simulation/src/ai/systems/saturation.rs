//! Pass 1: сколько бойцов атакуют одну цель.

use bevy::prelude::*;

use crate::ai::AiController;
use crate::components::{Engagement, Vitality};
use crate::config::LevelSettings;

/// System: пересчитать attacker count целей и флаг `too_busy_to_attack`
///
/// Счётчики обнулены в Prepare (`reset_attacker_counts`). Кто первым
/// занял слот, тот и атакует; остальные держат безопасную дистанцию.
pub fn account_attacker_saturation(
    level: Res<LevelSettings>,
    mut controllers: Query<(Entity, &mut AiController, &Vitality)>,
    mut engagements: Query<&mut Engagement>,
) {
    for (entity, mut ai, vitality) in controllers.iter_mut() {
        if !ai.has_kill_target || !vitality.is_alive() {
            continue;
        }
        let Some(target) = ai.kill_target else {
            continue;
        };
        let Ok(mut engagement) = engagements.get_mut(target) else {
            continue;
        };

        if engagement.attacker_count >= level.max_simultaneous_attackers {
            if !ai.too_busy_to_attack {
                crate::logger::log(&format!(
                    "⏸️ AI {:?}: {:?} уже атакуют {} бойцов, держим дистанцию",
                    entity, target, engagement.attacker_count
                ));
            }
            ai.too_busy_to_attack = true;
        } else {
            engagement.attacker_count += 1;
            ai.too_busy_to_attack = false;
        }
    }
}

//! Dodge meter и счётчик атакующих.

use bevy::prelude::*;

use crate::components::{CombatStats, CombatWorldState, DodgeMeter, Engagement, Vitality};

/// System: обнулить attacker count (AI пересчитает его в этом же тике)
pub fn reset_attacker_counts(mut engagements: Query<&mut Engagement>) {
    for mut engagement in engagements.iter_mut() {
        engagement.attacker_count = 0;
    }
}

/// System: регенерация dodge meter
///
/// Максимум берётся из `CombatStats::dodge_ability`. После drain'а
/// регенерация ждёт cooldown, потом идёт с постоянной скоростью.
pub fn regenerate_dodge(
    state: Res<CombatWorldState>,
    mut fighters: Query<(&mut DodgeMeter, &CombatStats, &Vitality)>,
) {
    for (mut dodge, stats, vitality) in fighters.iter_mut() {
        dodge.max = stats.dodge_ability;
        if !vitality.is_alive() {
            continue;
        }
        dodge.regenerate(state.delta);
    }
}

//! Боевые часы: fixed timestep × slow-motion.

use bevy::prelude::*;

use crate::components::CombatWorldState;

/// System: продвинуть `CombatWorldState` на один тик
///
/// Шаг берётся из настроенного timestep (не из накопленного реального времени),
/// поэтому одинаковое число тиков даёт одинаковое состояние.
pub fn advance_combat_clock(mut state: ResMut<CombatWorldState>, fixed: Res<Time<Fixed>>) {
    if state.paused {
        state.delta = 0.0;
        return;
    }

    let step = fixed.timestep().as_secs_f32() * state.time_dilation.scale;
    state.advance(step);
}

/// Run condition: бой не на паузе
pub fn combat_running(state: Res<CombatWorldState>) -> bool {
    !state.paused
}

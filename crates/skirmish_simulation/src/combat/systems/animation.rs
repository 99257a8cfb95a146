//! Headless проигрывание анимаций (только таймеры и ограничения).

use bevy::prelude::*;

use crate::components::{AnimationState, CombatWorldState};

/// System: тик таймеров анимаций
pub fn tick_animations(state: Res<CombatWorldState>, mut animations: Query<&mut AnimationState>) {
    for mut animation in animations.iter_mut() {
        animation.tick(state.delta);
    }
}

//! Movement: wander без цели + интеграция ходьбы по полу.

use bevy::prelude::*;
use rand::Rng;

use super::attack::{walk_band, TacticalContext};
use super::targeting::CombatantView;
use crate::ai::AiController;
use crate::components::{AnimationConstraint, AnimationState, CharacterBody, CombatWorldState, Vitality};
use crate::config::LevelSettings;
use crate::DeterministicRng;

/// Сколько секунд держится одна wander цель (диапазон)
const WANDER_DURATION: std::ops::Range<f32> = 2.0..20.0;
/// Дальше этого смотрим туда, куда идём
const WANDER_LOOK_DISTANCE: f32 = 400.0;
const WANDER_MAX_DISTANCE: f32 = 1000.0;

/// Без цели: идём за союзным игроком или к случайной точке пола
pub fn wander(
    ai: &mut AiController,
    body: &CharacterBody,
    ally: Option<&CombatantView>,
    rng: &mut DeterministicRng,
    ctx: &TacticalContext,
) {
    if let Some(ally) = ally {
        ai.wander_remaining = rng.rng.gen_range(WANDER_DURATION);
        ai.wander_target_x = ally.center.x;
    } else if ai.wander_remaining <= 0.0 {
        ai.wander_remaining = rng.rng.gen_range(WANDER_DURATION);
        ai.wander_target_x = random_floor_x(ctx.level, rng);
    }
    ai.wander_remaining -= ctx.delta;

    let offset = ai.wander_target_x - body.center.x;
    if offset.abs() > WANDER_LOOK_DISTANCE {
        ai.aiming_position = body.head_position() + Vec2::new(offset.signum() * 1000.0, 0.0);
    }

    let target_x = ai.wander_target_x;
    walk_band(ai, body, target_x, 0.0, WANDER_MAX_DISTANCE, ctx);
}

fn random_floor_x(level: &LevelSettings, rng: &mut DeterministicRng) -> f32 {
    if level.floor_max_x > level.floor_min_x {
        rng.rng.gen_range(level.floor_min_x..level.floor_max_x)
    } else {
        level.floor_min_x
    }
}

/// System: walk_acceleration → сдвиг по x (пол плоский, края уровня = стены)
pub fn integrate_walking(
    state: Res<CombatWorldState>,
    level: Res<LevelSettings>,
    mut bodies: Query<(&mut CharacterBody, &AnimationState, &Vitality)>,
) {
    let delta = state.delta;

    for (mut body, anim, vitality) in bodies.iter_mut() {
        if !vitality.is_alive() || !body.allow_walking || anim.constrains_any(AnimationConstraint::PREVENT_WALKING) {
            continue;
        }
        let step = body.walk_acceleration.x * delta;
        if step == 0.0 {
            continue;
        }
        body.center.x = (body.center.x + step).clamp(level.floor_min_x, level.floor_max_x);
    }
}

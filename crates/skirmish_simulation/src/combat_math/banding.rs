//! WalkTowards: удержание дистанции до цели по оси x.

use super::noise::{sway3, value3};

/// Результат WalkTowards: максимум один флаг выставлен
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkDecision {
    pub walk_left: bool,
    pub walk_right: bool,
}

impl WalkDecision {
    pub const IDLE: Self = Self { walk_left: false, walk_right: false };
    pub const LEFT: Self = Self { walk_left: true, walk_right: false };
    pub const RIGHT: Self = Self { walk_left: false, walk_right: true };

    /// Шаг в сторону `target_x` от `position_x`
    fn towards(position_x: f32, target_x: f32) -> Self {
        if target_x < position_x {
            Self::LEFT
        } else {
            Self::RIGHT
        }
    }

    /// Шаг прочь от `target_x`
    fn away(position_x: f32, target_x: f32) -> Self {
        if target_x > position_x {
            Self::LEFT
        } else {
            Self::RIGHT
        }
    }
}

/// Держит дистанцию до `target_x` в полосе `[min_distance, max_distance]`.
///
/// - ближе `min_distance` (и не у края уровня) → отходим от цели
/// - дальше `max_distance` → идём к цели
/// - внутри полосы → иногда покачиваемся влево/вправо (шум по времени и seed)
pub fn walk_towards(
    position_x: f32,
    target_x: f32,
    min_distance: f32,
    max_distance: f32,
    near_edge: bool,
    time: f32,
    seed: f32,
) -> WalkDecision {
    let distance = (position_x - target_x).abs();

    if distance < min_distance && !near_edge {
        WalkDecision::away(position_x, target_x)
    } else if distance > max_distance {
        WalkDecision::towards(position_x, target_x)
    } else if sway3(-1439.234, time * 0.05, seed) > 0.2 {
        if value3(0.0, time * 0.25, seed) > 0.0 {
            WalkDecision::RIGHT
        } else {
            WalkDecision::LEFT
        }
    } else {
        WalkDecision::IDLE
    }
}

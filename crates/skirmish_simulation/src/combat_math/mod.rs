//! Чистые функции боевой математики.
//!
//! Всё здесь детерминировано: никакого RNG, только координаты (время, seed).
//! Тесты фиксируют время/seed и проверяют точные ветки решений.

pub mod banding;
pub mod falloff;
pub mod noise;

#[cfg(test)]
mod math_tests;

pub use banding::{walk_towards, WalkDecision};
pub use falloff::{bullet_hole_size, damage_at_distance};
pub use noise::{noise2d, roll, sway3, time_safe_random, value3};

/// Экспоненциальное сближение `current` → `target` со скоростью `speed`
pub fn smooth_approach(current: f32, target: f32, speed: f32, dt: f32) -> f32 {
    current + (target - current) * (1.0 - (-speed * dt).exp())
}

/// Линейный remap с clamp входа
pub fn map_range_clamped(from_min: f32, from_max: f32, to_min: f32, to_max: f32, value: f32) -> f32 {
    let t = ((value - from_min) / (from_max - from_min)).clamp(0.0, 1.0);
    to_min + (to_max - to_min) * t
}

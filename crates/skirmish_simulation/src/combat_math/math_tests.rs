//! Tests for noise, banding, falloff.

use super::*;
use proptest::prelude::*;

#[test]
fn test_noise_is_deterministic() {
    let a = value3(12.5, -3.25, 7.0);
    let b = value3(12.5, -3.25, 7.0);
    assert_eq!(a, b);
    assert_ne!(value3(12.5, -3.25, 7.0), value3(12.6, -3.25, 7.0));
}

#[test]
fn test_time_safe_random_unit_range() {
    for i in 0..500 {
        let t = i as f32 * 0.137;
        let r = time_safe_random(t, -42.23 + i as f32);
        assert!((0.0..=1.0).contains(&r), "out of range: {}", r);
    }
}

#[test]
fn test_roll_never_reaches_one() {
    for i in 0..1000 {
        let r = roll(i as f32 * 0.016, 3.0, i % 8, 1.5);
        assert!(r < 1.0 && r >= 0.0);
    }
}

/// Scenario A: x=0, цель на 1000, полоса 250..700 → идём вправо
#[test]
fn test_walk_towards_far_target_walks_right() {
    let decision = walk_towards(0.0, 1000.0, 250.0, 700.0, false, 0.0, 1.0);
    assert!(decision.walk_right);
    assert!(!decision.walk_left);
}

#[test]
fn test_walk_towards_too_close_backs_off() {
    // цель справа на 100 при min 250 → отходим влево
    let decision = walk_towards(0.0, 100.0, 250.0, 700.0, false, 0.0, 1.0);
    assert_eq!(decision, WalkDecision::LEFT);

    // но у края уровня не пятимся
    let at_edge = walk_towards(0.0, 100.0, 250.0, 700.0, true, 0.0, 1.0);
    assert!(!(at_edge.walk_left && at_edge.walk_right));
}

#[test]
fn test_wander_band_always_closes() {
    // Band (0, 1000): дальше 1000 всегда шагаем к цели
    assert_eq!(walk_towards(0.0, -5000.0, 0.0, 1000.0, false, 3.0, 7.0), WalkDecision::LEFT);
    assert_eq!(walk_towards(0.0, 5000.0, 0.0, 1000.0, false, 3.0, 7.0), WalkDecision::RIGHT);
}

#[test]
fn test_falloff_never_below_base() {
    assert_eq!(damage_at_distance(1.0, 0.0), 2.0);
    let far = damage_at_distance(1.0, 1.0e12);
    assert!((far - 1.0).abs() < 1e-6);
    assert!(damage_at_distance(1.0, 500.0) > 1.0);
}

#[test]
fn test_hole_size_shrinks_for_clusters() {
    let single = bullet_hole_size(100.0, 1.0, 1);
    let pellet = bullet_hole_size(100.0, 1.0, 8);
    // lerp(8, 1, 0.55) = 4.15, дробь всё равно больше одиночной, но не в 8 раз
    assert!(pellet > single);
    assert!(pellet < single * 8.0);
}

#[test]
fn test_map_range_clamped() {
    assert_eq!(map_range_clamped(0.0, 10.0, 1.0, 8.0, -5.0), 1.0);
    assert_eq!(map_range_clamped(0.0, 10.0, 1.0, 8.0, 50.0), 8.0);
    assert!((map_range_clamped(0.0, 10.0, 1.0, 8.0, 5.0) - 4.5).abs() < 1e-6);
}

proptest! {
    #[test]
    fn prop_noise_in_unit_interval(x in -1.0e4f32..1.0e4, y in -1.0e4f32..1.0e4, z in -1.0e4f32..1.0e4) {
        let v = value3(x, y, z);
        prop_assert!((-1.0..=1.0).contains(&v));
        let s = sway3(x, y, z);
        prop_assert!((-1.0..=1.0).contains(&s));
    }

    #[test]
    fn prop_walk_towards_band(
        pos in -5000.0f32..5000.0,
        target in -5000.0f32..5000.0,
        min in 0.0f32..2000.0,
        extra in 0.0f32..2000.0,
        time in 0.0f32..600.0,
        seed in -500.0f32..500.0,
    ) {
        let max = min + extra;
        let decision = walk_towards(pos, target, min, max, false, time, seed);
        let distance = (pos - target).abs();

        // никогда оба флага сразу
        prop_assert!(!(decision.walk_left && decision.walk_right));

        if distance > max {
            // дальше полосы: строго к цели
            prop_assert_eq!(decision.walk_right, target > pos);
            prop_assert_eq!(decision.walk_left, target < pos);
        } else if distance < min {
            // ближе полосы: восстанавливаем дистанцию, отходя от цели
            prop_assert!(decision.walk_left || decision.walk_right);
            prop_assert_eq!(decision.walk_left, target > pos);
        }
    }
}

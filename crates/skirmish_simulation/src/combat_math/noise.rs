//! Value noise в [-1, 1].
//!
//! Решётка целых координат хэшируется в псевдослучайные значения,
//! между узлами — trilinear интерполяция со smoothstep. Одинаковые координаты
//! всегда дают одинаковый результат на любой платформе (только f32 арифметика
//! и u32 хэш).

use bevy::math::Vec2;

/// Базовое значение шума в точке (x, y, z), диапазон [-1, 1]
pub fn value3(x: f32, y: f32, z: f32) -> f32 {
    sample(x, y, z, 0)
}

/// Второе, декоррелированное поле шума (idle sway в WalkTowards)
pub fn sway3(x: f32, y: f32, z: f32) -> f32 {
    sample(x * 0.5 + 17.31, y * 0.5 - 4.77, z * 0.5 + 9.12, 0x9E37_79B9)
}

/// Случайное число [0, 1], стабильное в пределах одного момента времени
pub fn time_safe_random(time: f32, seed: f32) -> f32 {
    value3(time * 31.32486, seed, -seed * 34.459) * 0.5 + 0.5
}

/// 2D смещение [-1, 1]² для разброса прицела
pub fn noise2d(time: f32, seed: f32) -> Vec2 {
    Vec2::new(value3(time, seed, 0.0), value3(time, seed, 100.0))
}

/// Бросок кубика [0, 1) для ballistics (строго меньше 1, чтобы шанс 1.0 всегда проходил)
pub fn roll(elapsed: f32, seed: f32, iteration: u32, salt: f32) -> f32 {
    let v = value3(
        elapsed * 13.37 + salt,
        seed * 0.731 + iteration as f32 * 17.1,
        salt * 3.3 - seed * 0.113,
    ) * 0.5
        + 0.5;
    v.clamp(0.0, 0.999_999)
}

fn sample(x: f32, y: f32, z: f32, salt: u32) -> f32 {
    let (x0, y0, z0) = (x.floor(), y.floor(), z.floor());
    let (fx, fy, fz) = (smoothstep(x - x0), smoothstep(y - y0), smoothstep(z - z0));
    let (ix, iy, iz) = (x0 as i32, y0 as i32, z0 as i32);

    let corner = |dx: i32, dy: i32, dz: i32| lattice(ix.wrapping_add(dx), iy.wrapping_add(dy), iz.wrapping_add(dz), salt);

    let x00 = lerp(corner(0, 0, 0), corner(1, 0, 0), fx);
    let x10 = lerp(corner(0, 1, 0), corner(1, 1, 0), fx);
    let x01 = lerp(corner(0, 0, 1), corner(1, 0, 1), fx);
    let x11 = lerp(corner(0, 1, 1), corner(1, 1, 1), fx);

    let y0v = lerp(x00, x10, fy);
    let y1v = lerp(x01, x11, fy);

    lerp(y0v, y1v, fz)
}

fn lattice(x: i32, y: i32, z: i32, salt: u32) -> f32 {
    let mut h = (x as u32).wrapping_mul(0x8DA6_B343)
        ^ (y as u32).wrapping_mul(0xD816_3841)
        ^ (z as u32).wrapping_mul(0xCB1A_B31F)
        ^ salt;
    // avalanche (murmur3 finalizer)
    h ^= h >> 16;
    h = h.wrapping_mul(0x85EB_CA6B);
    h ^= h >> 13;
    h = h.wrapping_mul(0xC2B2_AE35);
    h ^= h >> 16;

    (h as f64 / u32::MAX as f64 * 2.0 - 1.0) as f32
}

#[inline]
fn smoothstep(t: f32) -> f32 {
    t * t * (3.0 - 2.0 * t)
}

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

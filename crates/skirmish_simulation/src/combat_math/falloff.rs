//! Damage falloff и размер пулевых отверстий.

/// Урон на дистанции: вблизи почти удвоен, к бесконечности стремится к базовому
pub fn damage_at_distance(damage: f32, distance: f32) -> f32 {
    let distance = distance.max(1.0);
    (2.0 * damage / distance.powf(0.1)).max(damage)
}

/// Размер отверстия (до масштабирования по iteration/exit/scale)
pub fn bullet_hole_size(distance: f32, damage: f32, cluster_size: u32) -> f32 {
    let cluster = cluster_size.max(1) as f32;
    // lerp(cluster, 1, 0.55): дробь от дробовика меньше одиночной пули
    let cluster_factor = cluster + (1.0 - cluster) * 0.55;
    (0.1 + damage_at_distance(damage, distance) * 0.07) * cluster_factor
}

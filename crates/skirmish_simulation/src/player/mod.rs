//! Player control marker + статистика убийств игрока

use bevy::prelude::*;

/// Marker component для player-controlled бойца
///
/// Бойцы БЕЗ этого компонента управляются AI (если на них есть `AiController`).
/// Ballistics смотрит на этот marker для god mode, near-miss звука и kill stats.
/// Dodge cost модификаторы (спина, point blank, дистанция) для игрока не применяются.
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct Player;

/// Статистика убийств игрока за уровень
#[derive(Resource, Debug, Clone, Default, Reflect)]
#[reflect(Resource)]
pub struct PlayerKillStats {
    pub kills: u32,
    pub shots_fired: u32,
}

impl PlayerKillStats {
    pub fn increment_kills(&mut self) {
        self.kills += 1;
    }
}

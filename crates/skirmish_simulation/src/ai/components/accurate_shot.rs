//! Accurate shot: прицельный выстрел с предупреждением.

use bevy::prelude::*;

use crate::config::ACCURATE_SHOT_WARNING_DURATION;

/// Отдельная entity на время прицеливания
///
/// Пока живёт: стрелок держит iron sight, его пули нельзя auto-dodge'нуть.
/// По истечении `lifespan` оружие стреляет, sequence удаляется.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct AccurateShot {
    pub shooter: Entity,
    pub target: Entity,
    pub time: f32,
    pub lifespan: f32,
}

impl AccurateShot {
    pub fn new(shooter: Entity, target: Entity) -> Self {
        Self { shooter, target, time: 0.0, lifespan: ACCURATE_SHOT_WARNING_DURATION }
    }

    pub fn is_expired(&self) -> bool {
        self.time >= self.lifespan
    }
}

/// Снимает `attacks_cannot_be_auto_dodged` со стрелка после конца sequence
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct AutoDodgeLockRelease {
    pub remaining: f32,
}

impl Default for AutoDodgeLockRelease {
    fn default() -> Self {
        Self { remaining: Self::DELAY }
    }
}

impl AutoDodgeLockRelease {
    pub const DELAY: f32 = 0.05;
}

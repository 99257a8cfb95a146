//! Глобальное состояние боя: часы симуляции, kill-switch'и, замедление времени.

use bevy::prelude::*;

use crate::combat_math::smooth_approach;

/// Общее изменяемое состояние, которое читают decision loop и ballistics
///
/// Все process-wide флаги (dev console) живут здесь, а не в static'ах.
#[derive(Resource, Debug, Clone, Reflect)]
#[reflect(Resource)]
pub struct CombatWorldState {
    /// Секунды симуляции с начала сцены
    pub elapsed: f32,
    /// Длительность текущего тика
    pub delta: f32,
    /// Когда стартовал последний accurate shot (глобальный cooldown)
    pub last_accurate_shot_time: f32,
    pub ai_disabled: bool,
    pub auto_spawn: bool,
    pub paused: bool,
    /// God mode для игрока: пули по игроку просто пропадают
    pub god_mode: bool,
    pub time_dilation: TimeDilation,
    /// Счётчик выстрелов (seed для бросков ballistics)
    pub shots_fired: u32,
}

impl Default for CombatWorldState {
    fn default() -> Self {
        Self {
            elapsed: 0.0,
            delta: 0.0,
            last_accurate_shot_time: f32::NEG_INFINITY,
            ai_disabled: false,
            auto_spawn: false,
            paused: false,
            god_mode: false,
            time_dilation: TimeDilation::default(),
            shots_fired: 0,
        }
    }
}

impl CombatWorldState {
    pub fn advance(&mut self, delta: f32) {
        self.delta = delta;
        self.elapsed += delta;
        self.time_dilation.update(delta);
    }

    pub fn seconds_since_accurate_shot(&self) -> f32 {
        self.elapsed - self.last_accurate_shot_time
    }

    pub fn next_shot_seed(&mut self) -> f32 {
        self.shots_fired = self.shots_fired.wrapping_add(1);
        (self.shots_fired % 10_007) as f32 * 1.618
    }

    /// Сцена уничтожается: никаких висящих эффектов
    pub fn teardown(&mut self) {
        self.time_dilation.cancel();
    }
}

/// Slow-motion от perfect deflect
///
/// Через 0.05 сек scale падает до 0.2, потом плавно возвращается к 1,
/// через 0.5 сек жёстко выставляется в 1.
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct TimeDilation {
    pub scale: f32,
    /// Сколько прошло с момента trigger (None = эффект не активен)
    pub running_for: Option<f32>,
    ramped: bool,
}

impl Default for TimeDilation {
    fn default() -> Self {
        Self { scale: 1.0, running_for: None, ramped: false }
    }
}

impl TimeDilation {
    pub const RAMP_DELAY: f32 = 0.05;
    pub const SLOW_SCALE: f32 = 0.2;
    pub const DURATION: f32 = 0.5;

    pub fn trigger(&mut self) {
        self.running_for = Some(0.0);
        self.ramped = false;
    }

    pub fn is_active(&self) -> bool {
        self.running_for.is_some()
    }

    pub fn update(&mut self, delta: f32) {
        let Some(t) = self.running_for else {
            return;
        };
        let t = t + delta;

        if t >= Self::DURATION {
            self.cancel();
            return;
        }

        if t >= Self::RAMP_DELAY && !self.ramped {
            self.scale = Self::SLOW_SCALE;
            self.ramped = true;
        } else {
            self.scale = smooth_approach(self.scale, 1.0, 1.0, delta);
        }
        self.running_for = Some(t);
    }

    pub fn cancel(&mut self) {
        self.scale = 1.0;
        self.running_for = None;
        self.ramped = false;
    }
}

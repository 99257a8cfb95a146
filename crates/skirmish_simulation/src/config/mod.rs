//! Tunables боевой системы (convars) и параметры уровня.
//!
//! `CombatConVars` грузится из TOML, любые отсутствующие поля берутся из Default.
//! Невалидный файл не валит симуляцию: `load_or_default` логирует warning и
//! возвращает значения по умолчанию.

use std::path::Path;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Максимальная дистанция "руки" персонажа от visual center (до scale)
pub const MAX_HAND_RANGE: f32 = 280.0;
/// Глобальный cooldown между accurate shot'ами (секунды)
pub const ACCURATE_SHOT_COOLDOWN: f32 = 5.0;
/// Длительность telegraph'а accurate shot'а (секунды)
pub const ACCURATE_SHOT_WARNING_DURATION: f32 = 2.0;
/// Пауза регенерации dodge после любого drain (секунды)
pub const DODGE_REGENERATION_COOLDOWN: f32 = 0.8;
/// Скорость регенерации dodge (единиц в секунду)
pub const DODGE_REGENERATION_RATE: f32 = 0.6;
/// Сколько AI контроллеров обрабатывается за тик
pub const MAX_AI_COUNT: usize = 128;
/// Лимит сегментов одной пули (рикошеты, dodge, deflect)
pub const MAX_SHOT_ITERATIONS: u32 = 8;
/// Дроп оружия: сколько секунд его нельзя подобрать
pub const DROPPED_WEAPON_GRACE: f32 = 1.0;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Дистанционная полоса (min..max) для WalkTowards
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Reflect)]
pub struct DistanceBand {
    pub min: f32,
    pub max: f32,
}

impl DistanceBand {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }
}

/// Боевые convars
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize, Reflect)]
#[reflect(Resource)]
#[serde(default)]
pub struct CombatConVars {
    /// Panic за каждую пулю, от которой враг ещё может увернуться
    pub panic_multiplier: f32,
    pub dodge_from_behind_cost_multiplier: f32,
    pub dodge_point_blank_cost_multiplier: f32,
    pub point_blank_distance: f32,
    /// Цена deflect'а оружием, умножается на damage пули
    pub deflect_dodge_cost: f32,
    pub jump_dodge_chance: f32,
    /// Dodge cost делится на 1..8 между этими дистанциями
    pub dodge_curve_min_distance: f32,
    pub dodge_curve_max_distance: f32,
    pub enemy_melee_distance: DistanceBand,
    pub enemy_gun_distance: DistanceBand,
    pub enemy_safe_distance_from_player: f32,
    pub enemy_weapon_search_range: f32,
    /// Радиус, в котором firearm AI вообще думает о выстреле
    pub firearm_engagement_radius: f32,
    /// Множитель шанса выстрела для "too busy" AI
    pub too_busy_shoot_chance_factor: f32,
    /// Damage-at-distance ниже этого делает продолжение пули косметическим
    pub cosmetic_damage_threshold: f32,
    /// Drain dodge у врага, который уже в i-frames (анимация уклонения)
    pub passive_dodge_drain: f32,
}

impl Default for CombatConVars {
    fn default() -> Self {
        Self {
            panic_multiplier: 0.15,
            dodge_from_behind_cost_multiplier: 1.2,
            dodge_point_blank_cost_multiplier: 50.0,
            point_blank_distance: 250.0,
            deflect_dodge_cost: 0.1,
            jump_dodge_chance: 0.1,
            dodge_curve_min_distance: 1600.0,
            dodge_curve_max_distance: 2500.0,
            enemy_melee_distance: DistanceBand::new(250.0, 700.0),
            enemy_gun_distance: DistanceBand::new(1000.0, 2000.0),
            enemy_safe_distance_from_player: 1000.0,
            enemy_weapon_search_range: 500.0,
            firearm_engagement_radius: 1800.0,
            too_busy_shoot_chance_factor: 0.75,
            cosmetic_damage_threshold: 0.4,
            passive_dodge_drain: 0.005,
        }
    }
}

impl CombatConVars {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let convars: CombatConVars = toml::from_str(source)?;
        convars.validate()?;
        Ok(convars)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    /// Грузит convars, при любой ошибке откатывается на Default
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path) {
            Ok(convars) => convars,
            Err(e) => {
                crate::logger::log_warning(&format!("⚠️ CombatConVars: {}, using defaults", e));
                Self::default()
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_band("enemy_melee_distance", self.enemy_melee_distance)?;
        check_band("enemy_gun_distance", self.enemy_gun_distance)?;

        if self.dodge_curve_min_distance >= self.dodge_curve_max_distance {
            return Err(ConfigError::Invalid {
                field: "dodge_curve_min_distance",
                reason: format!(
                    "must be below dodge_curve_max_distance ({} >= {})",
                    self.dodge_curve_min_distance, self.dodge_curve_max_distance
                ),
            });
        }

        if !(0.0..=1.0).contains(&self.jump_dodge_chance) {
            return Err(ConfigError::Invalid {
                field: "jump_dodge_chance",
                reason: format!("{} is not a probability", self.jump_dodge_chance),
            });
        }

        if self.cosmetic_damage_threshold < 0.0 {
            return Err(ConfigError::Invalid {
                field: "cosmetic_damage_threshold",
                reason: "negative threshold".to_string(),
            });
        }

        Ok(())
    }
}

fn check_band(field: &'static str, band: DistanceBand) -> Result<(), ConfigError> {
    if band.min < 0.0 || band.min > band.max {
        return Err(ConfigError::Invalid {
            field,
            reason: format!("band {}..{} is inverted or negative", band.min, band.max),
        });
    }
    Ok(())
}

/// Параметры текущего уровня
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize, Reflect)]
#[reflect(Resource)]
#[serde(default)]
pub struct LevelSettings {
    /// Сколько врагов одновременно атакуют одну цель
    pub max_simultaneous_attackers: u32,
    /// Крайние точки пола (wander выбирает x внутри)
    pub floor_min_x: f32,
    pub floor_max_x: f32,
    /// Ширина уровня (верхняя граница "safe distance" полосы)
    pub level_width: f32,
    /// Запас от края, ближе которого AI не пятится
    pub edge_margin: f32,
    /// Auto-spawn: интервал между врагами (секунды)
    pub auto_spawn_interval: f32,
    /// Auto-spawn: лимит живых AI
    pub auto_spawn_max_alive: u32,
    /// Auto-spawn: фракция новых врагов
    pub auto_spawn_faction: u64,
}

impl Default for LevelSettings {
    fn default() -> Self {
        Self {
            max_simultaneous_attackers: 2,
            floor_min_x: -3000.0,
            floor_max_x: 3000.0,
            level_width: 6000.0,
            edge_margin: 1000.0,
            auto_spawn_interval: 4.0,
            auto_spawn_max_alive: 6,
            auto_spawn_faction: 2,
        }
    }
}

impl LevelSettings {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let settings: LevelSettings = toml::from_str(source)?;
        if settings.max_simultaneous_attackers == 0 {
            return Err(ConfigError::Invalid {
                field: "max_simultaneous_attackers",
                reason: "at least one attacker must be allowed".to_string(),
            });
        }
        if settings.floor_min_x > settings.floor_max_x {
            return Err(ConfigError::Invalid {
                field: "floor_min_x",
                reason: "floor extent is inverted".to_string(),
            });
        }
        Ok(settings)
    }

    pub fn is_close_to_edge(&self, x: f32) -> bool {
        x < self.floor_min_x + self.edge_margin || x > self.floor_max_x - self.edge_margin
    }
}

#[cfg(test)]
mod config_tests;

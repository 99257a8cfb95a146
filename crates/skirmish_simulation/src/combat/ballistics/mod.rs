//! Ballistic Resolution Pipeline
//!
//! Один выстрел = цепочка сегментов. Каждый сегмент: raycast → классификация
//! попадания (промах / стена / dodge / deflect / урон / exit wound) → максимум
//! одно продолжение. Глубина ограничена `MAX_SHOT_ITERATIONS`.
//!
//! Ядро ничего не рисует: эффекты собираются в `ShotReport` и публикуются
//! событиями (`CombatFx`, `AnimationRequest`, `CombatantDied`).

mod resolver;

#[cfg(test)]
mod resolver_tests;

use bevy::prelude::*;

use super::events::{AnimationRequest, CombatFx, CombatantDied, ShotFired};
use crate::logger;
use crate::physics::{CollisionWorld, WorldQuery, ALL_CHARACTER_LAYERS};

pub use resolver::resolve;

/// Параметры одного сегмента пули
#[derive(Debug, Clone, PartialEq)]
pub struct ShotParams {
    pub origin: Vec2,
    pub direction: Vec2,
    pub damage: f32,
    /// Сколько дробин в выстреле (1 = одиночная пуля)
    pub cluster_size: u32,
    /// Косметическая пуля: рисуется, но урона/dodge/deflect не вызывает
    pub is_cosmetic: bool,
    /// Слои, по которым бьёт пуля (стены добавляются всегда)
    pub enemy_mask: u32,
    /// Коллайдеры, сквозь которые пуля проходит (части тела стрелка)
    pub ignore: Vec<Entity>,
    pub origin_character: Option<Entity>,
    pub origin_weapon: Option<Entity>,
    pub can_be_deflected: bool,
    pub can_be_auto_dodged: bool,
    /// Seed для бросков этого выстрела
    pub seed: f32,
}

impl ShotParams {
    pub fn new(origin: Vec2, direction: Vec2, damage: f32) -> Self {
        Self {
            origin,
            direction: direction.try_normalize().unwrap_or(Vec2::X),
            damage,
            cluster_size: 1,
            is_cosmetic: false,
            enemy_mask: ALL_CHARACTER_LAYERS,
            ignore: Vec::new(),
            origin_character: None,
            origin_weapon: None,
            can_be_deflected: true,
            can_be_auto_dodged: true,
            seed: 0.0,
        }
    }

    /// Продолжение из точки `origin` (направление, маска и флаги сохраняются)
    pub fn continue_from(&self, origin: Vec2) -> Self {
        Self { origin, ..self.clone() }
    }
}

/// Что случилось с сегментом
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShotOutcome {
    /// Улетела в никуда
    Missed,
    /// Остановлена стеной или тем, что не реагирует на пули
    Blocked { entity: Entity },
    /// God mode: пуля в игрока исчезает
    Aborted,
    Dodged { victim: Entity },
    Deflected { victim: Entity, perfect: bool },
    Damaged { victim: Entity, part: Entity, damage: f32, killed: bool },
    /// Вышла из той же части тела, в которой была
    ExitWound { part: Entity },
    /// Косметический сегмент прошёл через часть тела
    Cosmetic { part: Entity },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SegmentRecord {
    pub iteration: u32,
    pub origin: Vec2,
    pub direction: Vec2,
    pub cosmetic: bool,
    pub outcome: ShotOutcome,
}

/// Всё, что произошло за один выстрел
#[derive(Debug, Clone, Default)]
pub struct ShotReport {
    pub segments: Vec<SegmentRecord>,
    pub fx: Vec<CombatFx>,
    pub animations: Vec<AnimationRequest>,
    pub deaths: Vec<CombatantDied>,
}

impl ShotReport {
    pub fn outcomes(&self) -> Vec<ShotOutcome> {
        self.segments.iter().map(|s| s.outcome).collect()
    }

    /// Отправить собранные эффекты событиями
    pub fn publish(self, world: &mut World) {
        if let Some(mut events) = world.get_resource_mut::<Events<CombatFx>>() {
            events.send_batch(self.fx);
        }
        if let Some(mut events) = world.get_resource_mut::<Events<AnimationRequest>>() {
            events.send_batch(self.animations);
        }
        if let Some(mut events) = world.get_resource_mut::<Events<CombatantDied>>() {
            events.send_batch(self.deaths);
        }
    }
}

/// Разрешить выстрел через `CollisionWorld` мира
pub fn fire_shot(world: &mut World, shot: ShotParams) -> ShotReport {
    if !world.contains_resource::<CollisionWorld>() {
        logger::log_warning("⚠️ fire_shot: CollisionWorld не зарегистрирован, выстрел пропущен");
        return ShotReport::default();
    }

    world.resource_scope(|world, collision: Mut<CollisionWorld>| fire_shot_with(world, &*collision, shot))
}

/// Разрешить выстрел через произвольный `WorldQuery`
pub fn fire_shot_with(world: &mut World, query: &dyn WorldQuery, shot: ShotParams) -> ShotReport {
    resolve(world, query, shot, 0.0, 0)
}

/// Exclusive система: все `ShotFired` за тик → resolve → события эффектов
pub fn resolve_fired_shots(world: &mut World) {
    let shots: Vec<ShotFired> = match world.get_resource_mut::<Events<ShotFired>>() {
        Some(mut events) => events.drain().collect(),
        None => return,
    };

    for fired in shots {
        let report = fire_shot(world, fired.shot);
        report.publish(world);
    }
}

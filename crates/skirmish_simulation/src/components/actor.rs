//! Базовые компоненты бойцов: Actor, Vitality, DodgeMeter, Engagement

use bevy::prelude::*;

use crate::config::{DODGE_REGENERATION_COOLDOWN, DODGE_REGENERATION_RATE};

/// Боец (игрок или AI) — базовый компонент для живых существ
///
/// Автоматически добавляет всё, что читают decision loop и ballistics, через Required Components.
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
#[require(
    Vitality,
    DodgeMeter,
    Engagement,
    crate::components::CombatStats,
    crate::components::CharacterFlags,
    crate::components::CharacterBody,
    crate::components::AnimationState,
    crate::components::Armour,
    crate::combat::EquippedWeapon
)]
pub struct Actor {
    /// ID фракции. 0 = нейтрал (ни с кем не враждует)
    pub faction_id: u64,
}

impl Actor {
    pub fn new(faction_id: u64) -> Self {
        Self { faction_id }
    }

    pub fn is_hostile_to(&self, other: &Actor) -> bool {
        self.faction_id != 0 && other.faction_id != 0 && self.faction_id != other.faction_id
    }

    pub fn is_allied_to(&self, other: &Actor) -> bool {
        self.faction_id == other.faction_id
    }
}

/// Здоровье одной части тела
///
/// Инвариант: current ≤ max (отрицательное значение = часть уничтожена)
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct Health {
    pub current: f32,
    pub max: f32,
}

impl Default for Health {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl Health {
    pub fn new(max: f32) -> Self {
        Self { current: max, max }
    }

    pub fn damage(&mut self, amount: f32) {
        self.current = (self.current - amount).min(self.max);
    }

    pub fn is_depleted(&self) -> bool {
        self.current <= f32::EPSILON
    }
}

/// Какая часть тела
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub enum BodyPartKind {
    Head,
    Body,
}

/// Здоровье бойца: голова + тело, смерть если любая часть опустела
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Vitality {
    pub head: Health,
    pub body: Health,
    pub alive: bool,
}

impl Default for Vitality {
    fn default() -> Self {
        Self::new(1.0, 1.0)
    }
}

impl Vitality {
    pub fn new(head_max: f32, body_max: f32) -> Self {
        Self {
            head: Health::new(head_max),
            body: Health::new(body_max),
            alive: true,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn part(&self, kind: BodyPartKind) -> &Health {
        match kind {
            BodyPartKind::Head => &self.head,
            BodyPartKind::Body => &self.body,
        }
    }

    /// Урон части тела; возвращает true если этот удар убил
    pub fn apply_damage(&mut self, kind: BodyPartKind, amount: f32) -> bool {
        match kind {
            BodyPartKind::Head => self.head.damage(amount),
            BodyPartKind::Body => self.body.damage(amount),
        }

        let was_alive = self.alive;
        if self.head.is_depleted() || self.body.is_depleted() {
            self.alive = false;
        }
        was_alive && !self.alive
    }
}

/// Dodge meter — ресурс уклонений и deflect'ов
///
/// Инвариант: читается через `value()` в пределах [0, max].
/// `current` может стать отрицательным только через `punish()` (perfect deflect),
/// регенерация сама подтягивает его к 0 после своего cooldown.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct DodgeMeter {
    pub current: f32,
    pub max: f32,
    pub regen_rate: f32,
    pub regen_cooldown: f32,
}

impl Default for DodgeMeter {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl DodgeMeter {
    pub fn new(max: f32) -> Self {
        Self {
            current: max,
            max,
            regen_rate: DODGE_REGENERATION_RATE,
            regen_cooldown: 0.0,
        }
    }

    pub fn value(&self) -> f32 {
        self.current.clamp(0.0, self.max.max(0.0))
    }

    /// Хватает ли на уклонение (минимум 1%)
    pub fn has_dodge(&self) -> bool {
        (self.current * 100.0) as i32 >= 1
    }

    pub fn drain(&mut self, amount: f32) {
        self.current = (self.current - amount).max(0.0);
        self.regen_cooldown = DODGE_REGENERATION_COOLDOWN;
    }

    /// Наказание за отражённый perfect deflect'ом выстрел
    pub fn punish(&mut self, value: f32, cooldown: f32) {
        self.current = value;
        self.regen_cooldown = cooldown;
    }

    pub fn restore_full(&mut self) {
        self.current = self.max;
    }

    pub fn regenerate(&mut self, delta: f32) {
        self.current = self.current.min(self.max);

        if self.regen_cooldown <= f32::EPSILON && self.max > f32::EPSILON {
            self.current = (self.current + self.regen_rate * delta).min(self.max);
        } else {
            self.regen_cooldown -= delta;
        }
    }
}

/// Сколько врагов атакуют этого бойца в текущем тике (пересчитывается каждый тик)
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct Engagement {
    pub attacker_count: u32,
}

//! Части тела как отдельные entity (коллайдеры для пуль).

use bevy::prelude::*;

use super::BodyPartKind;

/// Ссылки бойца на его части тела
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct BodyParts {
    pub head: Entity,
    pub body: Entity,
}

impl BodyParts {
    pub fn contains(&self, entity: Entity) -> bool {
        self.head == entity || self.body == entity
    }

    pub fn as_vec(&self) -> Vec<Entity> {
        vec![self.head, self.body]
    }
}

/// Часть тела: владелец + вид. Живёт на entity-коллайдере
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
#[require(WoundMarks, ImpactOffset)]
pub struct BodyPart {
    pub owner: Entity,
    pub kind: BodyPartKind,
}

/// Одна отметина на части тела (локальные координаты, размер)
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct Wound {
    pub local_point: Vec2,
    pub size: f32,
    /// Inner cutout (сквозная дыра поверх обычной)
    pub inner: bool,
}

/// Накопленные раны части тела
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
pub struct WoundMarks {
    pub wounds: Vec<Wound>,
}

impl WoundMarks {
    /// Максимум ран на одну часть (старые отметины остаются, новые игнорируются)
    pub const CAPACITY: usize = 64;

    /// Добавляет рану, возвращает фактически применённый размер (0 если места нет)
    pub fn add(&mut self, local_point: Vec2, size: f32) -> f32 {
        self.push(Wound { local_point, size, inner: false })
    }

    pub fn add_inner_cutout(&mut self, local_point: Vec2, size: f32) -> f32 {
        self.push(Wound { local_point, size, inner: true })
    }

    fn push(&mut self, wound: Wound) -> f32 {
        if self.wounds.len() >= Self::CAPACITY || wound.size <= 0.0 {
            return 0.0;
        }
        let size = wound.size;
        self.wounds.push(wound);
        size
    }

    pub fn total_size(&self) -> f32 {
        self.wounds.iter().map(|w| w.size).sum()
    }
}

/// Отдача от попадания (рендер сам гасит её со временем)
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct ImpactOffset {
    pub rotation: f32,
    pub translation: Vec2,
}

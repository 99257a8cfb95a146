//! Weapon компоненты: данные оружия, состояние предмета в мире, экипировка.
//!
//! Architecture Decision:
//! - `WeaponKind` — tagged variant (Firearm / Melee), без наследования
//! - Различия поведения собраны в одной таблице `KindBehaviour`
//! - Оружие — отдельная entity (`Weapon` + `WorldItem`), персонаж держит ссылку в `EquippedWeapon`

use bevy::prelude::*;

use crate::components::CharacterBody;

/// Тип оружия
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub enum WeaponKind {
    Firearm,
    Melee,
}

/// Что тип оружия делает иначе
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindBehaviour {
    /// `is_firing` превращается в ShotFired
    pub fires_bullets: bool,
    /// Iron sight поднимает точку руки (firearm держат у глаз)
    pub raises_hands_when_aiming: bool,
    /// "Iron sight" у этого оружия означает блок
    pub iron_sight_is_block: bool,
}

impl WeaponKind {
    pub const fn behaviour(self) -> KindBehaviour {
        match self {
            WeaponKind::Firearm => KindBehaviour {
                fires_bullets: true,
                raises_hands_when_aiming: true,
                iron_sight_is_block: false,
            },
            WeaponKind::Melee => KindBehaviour {
                fires_bullets: false,
                raises_hands_when_aiming: false,
                iron_sight_is_block: true,
            },
        }
    }
}

/// Данные и состояние оружия
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
#[require(WorldItem)]
pub struct Weapon {
    pub name: String,
    pub kind: WeaponKind,

    pub rounds_left: u32,
    pub infinite_ammo: bool,

    /// Дальность (для melee — дистанция удара)
    pub range: f32,
    pub damage: f32,

    /// Этим оружием можно отбивать пули (мечи)
    pub can_deflect_bullets: bool,
    /// Пули этого оружия можно отбить
    pub can_bullets_be_deflected: bool,

    pub recoil: f32,
    /// 1 = одноручное, 2 = двуручное
    pub hold_points: u8,
    pub automatic: bool,
    pub bullets_per_shot: u32,
    /// Разброс дроби (радианы, полный конус)
    pub spread: f32,
    /// Пауза между выстрелами (секунды)
    pub fire_interval: f32,
    pub cooldown: f32,

    /// Выставляется AI/вводом, сбрасывается после обработки
    pub is_firing: bool,

    /// Длина ствола от руки
    pub barrel_length: f32,
    /// Вертикальное смещение ствола от visual center
    pub barrel_height: f32,
    pub max_hand_range_multiplier: f32,
}

impl Default for Weapon {
    fn default() -> Self {
        Self::pistol()
    }
}

impl Weapon {
    pub fn pistol() -> Self {
        Self {
            name: "pistol".to_string(),
            kind: WeaponKind::Firearm,
            rounds_left: 12,
            infinite_ammo: false,
            range: 2000.0,
            damage: 0.6,
            can_deflect_bullets: false,
            can_bullets_be_deflected: true,
            recoil: 1.0,
            hold_points: 1,
            automatic: false,
            bullets_per_shot: 1,
            spread: 0.0,
            fire_interval: 0.2,
            cooldown: 0.0,
            is_firing: false,
            barrel_length: 60.0,
            barrel_height: 20.0,
            max_hand_range_multiplier: 1.0,
        }
    }

    pub fn rifle() -> Self {
        Self {
            name: "rifle".to_string(),
            rounds_left: 30,
            damage: 0.5,
            hold_points: 2,
            automatic: true,
            fire_interval: 0.1,
            barrel_length: 120.0,
            max_hand_range_multiplier: 1.1,
            ..Self::pistol()
        }
    }

    pub fn shotgun() -> Self {
        Self {
            name: "shotgun".to_string(),
            rounds_left: 6,
            damage: 0.3,
            hold_points: 2,
            bullets_per_shot: 8,
            spread: 0.35,
            fire_interval: 0.7,
            barrel_length: 110.0,
            can_bullets_be_deflected: false,
            ..Self::pistol()
        }
    }

    pub fn sword() -> Self {
        Self {
            name: "sword".to_string(),
            kind: WeaponKind::Melee,
            rounds_left: 0,
            infinite_ammo: true,
            range: 300.0,
            damage: 1.0,
            can_deflect_bullets: true,
            can_bullets_be_deflected: false,
            recoil: 0.0,
            hold_points: 1,
            automatic: false,
            bullets_per_shot: 0,
            spread: 0.0,
            fire_interval: 0.5,
            cooldown: 0.0,
            is_firing: false,
            barrel_length: 0.0,
            barrel_height: 0.0,
            max_hand_range_multiplier: 1.2,
        }
    }

    pub fn has_rounds_left(&self) -> bool {
        self.infinite_ammo || self.rounds_left > 0
    }

    pub fn behaviour(&self) -> KindBehaviour {
        self.kind.behaviour()
    }

    /// Начало и направление ствола, когда оружие в руке `body`
    pub fn barrel(&self, body: &CharacterBody) -> (Vec2, Vec2) {
        let hand = body.hand_position();
        let fallback = Vec2::new(body.flip_scaling(), 0.0);
        let direction = (body.aim_target - hand).try_normalize().unwrap_or(fallback);
        (hand + direction * self.barrel_length * body.scale, direction)
    }

    /// Длина ствола в мире; у melee ствола нет
    pub fn barrel_distance(&self, body: &CharacterBody) -> f32 {
        match self.kind {
            WeaponKind::Melee => 0.0,
            WeaponKind::Firearm => self.barrel_length * body.scale,
        }
    }
}

/// Состояние оружия как предмета в мире
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
pub struct WorldItem {
    pub position: Vec2,
    pub velocity: Vec2,
    pub wielder: Option<Entity>,
    /// Застряло в теле/стене
    pub stuck: bool,
    pub attached_to_wall: bool,
    /// Брошено как снаряд (летит)
    pub thrown: bool,
    /// Сколько секунд лежит после дропа (None = положено на уровень изначально)
    pub dropped_for: Option<f32>,
}

impl WorldItem {
    pub fn lying_at(position: Vec2) -> Self {
        Self { position, ..Default::default() }
    }

    pub fn is_wielded(&self) -> bool {
        self.wielder.is_some()
    }
}

/// Что персонаж держит в руках
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct EquippedWeapon {
    pub weapon: Option<Entity>,
}

/// Персонаж в процессе подбора оружия (ждём конца анимации)
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct PendingPickup {
    pub target: Entity,
    pub remaining: f32,
}

impl PendingPickup {
    /// Момент анимации подбора, когда предмет оказывается в руке
    pub const DELAY: f32 = 0.15;

    pub fn new(target: Entity) -> Self {
        Self { target, remaining: Self::DELAY }
    }
}

//! Персонаж: статы, флаги, позиционирование, броня.

use bevy::prelude::*;

use crate::config::MAX_HAND_RANGE;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Reflect)]
pub enum AgilitySkillLevel {
    #[default]
    None,
    Adept,
    Master,
}

/// Боевые статы персонажа
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct CombatStats {
    /// Максимум dodge meter
    pub dodge_ability: f32,
    /// Шанс (0..1), сравнивается с shoot chance для эскалации в accurate shot
    pub accurate_shot_chance: f32,
    /// Разброс прицела (доля дистанции)
    pub aiming_randomness: f32,
    /// Сколько секунд в attack mode прежде чем стрелять
    pub shooting_timeout: f32,
    pub can_deflect: bool,
    /// Уклоняется даже с пустым dodge meter
    pub dodge_oversaturate: bool,
    pub agility: AgilitySkillLevel,
    pub panic_intensity: f32,
    pub scale: f32,
}

impl Default for CombatStats {
    fn default() -> Self {
        Self {
            dodge_ability: 1.0,
            accurate_shot_chance: 0.0,
            aiming_randomness: 0.1,
            shooting_timeout: 0.5,
            can_deflect: false,
            dodge_oversaturate: false,
            agility: AgilitySkillLevel::None,
            panic_intensity: 1.0,
            scale: 1.0,
        }
    }
}

/// Флаги поведения персонажа
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct CharacterFlags {
    pub invincible: bool,
    /// Пули вообще что-то делают с этим персонажем
    pub responds_to_bullets: bool,
    pub stun_on_non_fatal_attack: bool,
    /// Выставляется на время accurate shot'а (+0.05 сек после)
    pub attacks_cannot_be_auto_dodged: bool,
}

impl Default for CharacterFlags {
    fn default() -> Self {
        Self {
            invincible: false,
            responds_to_bullets: true,
            stun_on_non_fatal_attack: false,
            attacks_cannot_be_auto_dodged: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Reflect)]
pub enum HandPose {
    #[default]
    None,
    OneHand,
    TwoHands,
}

/// Позиционирование персонажа в 2D (x вправо, y вверх, пиксели уровня)
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct CharacterBody {
    /// Global center (точка, по которой считаются дистанции)
    pub center: Vec2,
    pub head_offset: Vec2,
    pub body_offset: Vec2,
    pub head_radius: f32,
    pub body_radius: f32,
    /// true = смотрит влево
    pub is_flipped: bool,
    pub scale: f32,
    pub is_flying: bool,
    pub hand_pose: HandPose,
    /// Позиция руки относительно visual center (уже обрезанная по reach)
    pub hand_target: Vec2,
    pub aim_target: Vec2,
    pub relative_aim_target: Vec2,
    pub is_iron_sighting: bool,
    pub iron_sight_progress: f32,
    pub is_melee_blocking: bool,
    /// 0..1, пока < 1 блок считается "свежим" (perfect deflect)
    pub melee_block_progress: f32,
    pub melee_block_impact: f32,
    pub recoil: f32,
    pub top_walk_speed: f32,
    pub walk_acceleration: Vec2,
    pub allow_walking: bool,
    pub hand_pickup_range: f32,
}

impl Default for CharacterBody {
    fn default() -> Self {
        Self {
            center: Vec2::ZERO,
            head_offset: Vec2::new(0.0, 180.0),
            body_offset: Vec2::new(0.0, 60.0),
            head_radius: 45.0,
            body_radius: 70.0,
            is_flipped: false,
            scale: 1.0,
            is_flying: false,
            hand_pose: HandPose::None,
            hand_target: Vec2::ZERO,
            aim_target: Vec2::ZERO,
            relative_aim_target: Vec2::ZERO,
            is_iron_sighting: false,
            iron_sight_progress: 0.0,
            is_melee_blocking: false,
            melee_block_progress: 0.0,
            melee_block_impact: 0.0,
            recoil: 0.0,
            top_walk_speed: 300.0,
            walk_acceleration: Vec2::ZERO,
            allow_walking: true,
            hand_pickup_range: 150.0,
        }
    }
}

impl CharacterBody {
    pub fn at(center: Vec2) -> Self {
        Self { center, ..Default::default() }
    }

    pub fn head_position(&self) -> Vec2 {
        self.center + self.head_offset * self.scale
    }

    /// Visual center тела (отсюда растут руки)
    pub fn body_center(&self) -> Vec2 {
        self.center + self.body_offset * self.scale
    }

    /// -1 если смотрит влево
    pub fn flip_scaling(&self) -> f32 {
        if self.is_flipped {
            -1.0
        } else {
            1.0
        }
    }

    pub fn max_hand_range(&self, weapon_multiplier: f32) -> f32 {
        MAX_HAND_RANGE * weapon_multiplier * self.scale
    }

    /// Мировая позиция руки
    pub fn hand_position(&self) -> Vec2 {
        self.body_center() + self.hand_target
    }

    pub fn move_to(&mut self, center: Vec2) {
        self.center = center;
    }
}

/// Одна деталь брони
#[derive(Debug, Clone, PartialEq, Reflect)]
pub struct ArmourPiece {
    pub name: String,
    pub deflection_chance: f32,
    /// Во что превращается при поломке (None = не ломается)
    pub broken: Option<BrokenArmour>,
}

#[derive(Debug, Clone, PartialEq, Reflect)]
pub struct BrokenArmour {
    pub name: String,
    pub deflection_chance: f32,
}

impl ArmourPiece {
    pub fn new(name: impl Into<String>, deflection_chance: f32) -> Self {
        Self { name: name.into(), deflection_chance, broken: None }
    }

    pub fn breakable_into(mut self, name: impl Into<String>, deflection_chance: f32) -> Self {
        self.broken = Some(BrokenArmour { name: name.into(), deflection_chance });
        self
    }

    /// Ломает деталь; false если ломать нечего
    pub fn break_piece(&mut self) -> bool {
        match self.broken.take() {
            Some(broken) => {
                self.name = broken.name;
                self.deflection_chance = broken.deflection_chance;
                true
            }
            None => false,
        }
    }
}

/// Броня персонажа (голова и тело роллятся независимо)
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
pub struct Armour {
    pub head: Option<ArmourPiece>,
    pub body: Option<ArmourPiece>,
    /// Косметическая броня не отражает пули
    pub cosmetic: bool,
}

impl Armour {
    pub fn head_deflection_chance(&self) -> f32 {
        self.head.as_ref().map_or(0.0, |p| p.deflection_chance)
    }

    pub fn body_deflection_chance(&self) -> f32 {
        self.body.as_ref().map_or(0.0, |p| p.deflection_chance)
    }
}

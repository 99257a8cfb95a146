//! AI controller: цели, намерения, паника.

use bevy::prelude::*;

/// Значение + значение на прошлом тике (для "стало true в этом тике")
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Reflect)]
pub struct BoolPrev {
    pub value: bool,
    pub previous: bool,
}

impl BoolPrev {
    pub fn became_true(&self) -> bool {
        self.value && !self.previous
    }

    pub fn sync(&mut self) {
        self.previous = self.value;
    }
}

/// Намерения AI на тик
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Reflect)]
pub struct Intents {
    pub walk_left: BoolPrev,
    pub walk_right: BoolPrev,
    pub shoot: BoolPrev,
    pub accurate_shot: BoolPrev,
    pub iron_sight: BoolPrev,
    pub interact: BoolPrev,
}

impl Intents {
    pub fn sync(&mut self) {
        self.walk_left.sync();
        self.walk_right.sync();
        self.shoot.sync();
        self.accurate_shot.sync();
        self.iron_sight.sync();
        self.interact.sync();
    }

    /// Сбросить желания перед новым решением. Iron sight держится, пока идёт accurate shot.
    pub fn clear(&mut self, hold_iron_sight: bool) {
        self.walk_left.value = false;
        self.walk_right.value = false;
        self.shoot.value = false;
        self.accurate_shot.value = false;
        self.interact.value = false;
        self.iron_sight.value = hold_iron_sight;
    }
}

/// AI-управляемый боец
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct AiController {
    /// Декорреляция шума между бойцами
    pub seed: f32,

    /// Ссылка на цель живёт дольше флага `has_kill_target`:
    /// после потери цели ссылка остаётся до следующего захвата
    pub kill_target: Option<Entity>,
    pub has_kill_target: bool,
    pub item_target: Option<Entity>,
    pub wants_pickup_weapon: bool,

    pub is_docile: bool,
    /// Цель уже атакуют максимум бойцов
    pub too_busy_to_attack: bool,
    pub attack_mode_duration: f32,

    pub wander_target_x: f32,
    pub wander_remaining: f32,

    /// Куда AI хочет целиться (руки догоняют с clamp по reach)
    pub aiming_position: Vec2,
    pub is_doing_accurate_shot: bool,

    /// 0..1
    pub panic: f32,
    pub intents: Intents,
}

impl Default for AiController {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl AiController {
    pub fn new(seed: f32) -> Self {
        Self {
            seed,
            kill_target: None,
            has_kill_target: false,
            item_target: None,
            wants_pickup_weapon: false,
            is_docile: false,
            too_busy_to_attack: false,
            attack_mode_duration: 0.0,
            wander_target_x: 0.0,
            wander_remaining: 0.0,
            aiming_position: Vec2::ZERO,
            is_doing_accurate_shot: false,
            panic: 0.0,
            intents: Intents::default(),
        }
    }

    pub fn docile(seed: f32) -> Self {
        Self { is_docile: true, ..Self::new(seed) }
    }
}

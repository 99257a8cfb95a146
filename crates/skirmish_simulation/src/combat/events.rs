//! Combat events.
//!
//! Ядро решает только *что* и *где* случилось. Рендер, звук и анимация —
//! внешние потребители этих событий.

use bevy::prelude::*;

use super::ballistics::ShotParams;
use crate::components::AnimationGroup;

/// Event: оружие выстрелило одной пулей (дробовик = несколько событий)
#[derive(Event, Debug, Clone)]
pub struct ShotFired {
    pub shot: ShotParams,
}

/// Event: AI/игрок замахивается melee (сам удар разрешает внешняя melee система)
#[derive(Event, Debug, Clone, Copy)]
pub struct MeleeAttackRequested {
    pub attacker: Entity,
    /// None = кулаки
    pub weapon: Option<Entity>,
}

/// Event: боец умер
#[derive(Event, Debug, Clone, Copy)]
pub struct CombatantDied {
    pub victim: Entity,
    pub killer: Option<Entity>,
}

/// Event: запрос на проигрывание анимации
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct AnimationRequest {
    pub entity: Entity,
    pub group: AnimationGroup,
    /// Для stun: удар спереди (true) или в спину
    pub forwards: bool,
    pub speed: f32,
}

impl AnimationRequest {
    pub fn new(entity: Entity, group: AnimationGroup) -> Self {
        Self { entity, group, forwards: true, speed: 1.0 }
    }

    pub fn stun(entity: Entity, forwards: bool) -> Self {
        Self { entity, group: AnimationGroup::Stun, forwards, speed: 1.2 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundCue {
    DryFire,
    NearMiss,
    Splatter,
    BulletDeflection,
    PerfectDeflect,
    Pickup,
    AccurateShotWarning,
}

/// Event: косметический эффект
#[derive(Event, Debug, Clone, PartialEq)]
pub enum CombatFx {
    Tracer { from: Vec2, to: Vec2 },
    BulletHole { position: Vec2, angle: f32, size: f32 },
    DeflectionSpark { position: Vec2, angle: f32 },
    BloodSpurt { position: Vec2, angle: f32, size: f32 },
    BloodSplat { position: Vec2, angle: f32, size: f32 },
    Sound { cue: SoundCue, position: Vec2, volume: f32 },
    ArmourBroken { entity: Entity, piece: String },
    RagdollImpulse { part: Entity, impulse: Vec2 },
    CameraShake { intensity: f32 },
    SlowMotion { scale: f32 },
    AccurateShotWarning { shooter: Entity, target: Entity },
}

/// Угол вектора в градусах (как у декалей рендера)
pub fn vector_angle(v: Vec2) -> f32 {
    v.y.atan2(v.x).to_degrees()
}

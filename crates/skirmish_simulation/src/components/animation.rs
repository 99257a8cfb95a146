//! Состояние анимации, видимое боевой логике.
//!
//! Сама state machine анимаций живёт снаружи. Здесь только то, что читают
//! decision loop и ballistics: какие действия сейчас запрещены и какая группа играет.

use bevy::prelude::*;
use bitflags::bitflags;

bitflags! {
    /// Ограничения, которые накладывает текущая анимация
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct AnimationConstraint: u32 {
        const PREVENT_BEING_SHOT = 1 << 0;
        const PREVENT_BLOCK = 1 << 1;
        const PREVENT_FLIP = 1 << 2;
        const PREVENT_WALKING = 1 << 3;
        const PREVENT_WORLD_INTERACTION = 1 << 4;
        const PREVENT_AIMING = 1 << 5;
        const FACE_FORWARDS = 1 << 6;
        const PREVENT_SHOOTING = 1 << 7;
        const PREVENT_MELEE = 1 << 8;
        const PREVENT_ALL_ATTACKING = Self::PREVENT_SHOOTING.bits() | Self::PREVENT_MELEE.bits();
    }
}

/// Группа проигрываемой анимации
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub enum AnimationGroup {
    Dodge,
    JumpDodge,
    Melee,
    Stun,
    Pickup,
    Death,
}

impl AnimationGroup {
    /// Ограничения и длительность по умолчанию для headless проигрывания
    pub fn preset(self) -> (AnimationConstraint, f32) {
        use AnimationConstraint as C;
        match self {
            AnimationGroup::Dodge => (C::PREVENT_BEING_SHOT | C::PREVENT_BLOCK, 0.35),
            AnimationGroup::JumpDodge => (
                C::PREVENT_BEING_SHOT | C::PREVENT_BLOCK | C::PREVENT_WALKING | C::PREVENT_ALL_ATTACKING,
                0.6,
            ),
            AnimationGroup::Melee => (C::PREVENT_FLIP | C::PREVENT_BLOCK | C::PREVENT_WALKING, 0.4),
            AnimationGroup::Stun => (
                C::PREVENT_BLOCK | C::PREVENT_WALKING | C::PREVENT_ALL_ATTACKING | C::PREVENT_AIMING,
                0.5,
            ),
            AnimationGroup::Pickup => (C::PREVENT_WORLD_INTERACTION | C::PREVENT_WALKING, 0.3),
            AnimationGroup::Death => (C::all(), f32::INFINITY),
        }
    }
}

#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
pub struct AnimationState {
    #[reflect(ignore)]
    pub constraints: AnimationConstraint,
    /// Ограничения от других компонентов (абилки и т.п.), не от анимации
    #[reflect(ignore)]
    pub additional: AnimationConstraint,
    pub playing: Option<AnimationGroup>,
    pub remaining: f32,
    pub has_been_ragdolled: bool,
}

impl AnimationState {
    fn active(&self) -> AnimationConstraint {
        self.constraints | self.additional
    }

    pub fn constrains_any(&self, flags: AnimationConstraint) -> bool {
        self.active().intersects(flags)
    }

    pub fn constrains_all(&self, flags: AnimationConstraint) -> bool {
        self.active().contains(flags)
    }

    pub fn is_playing(&self) -> bool {
        self.playing.is_some()
    }

    pub fn is_playing_group(&self, group: AnimationGroup) -> bool {
        self.playing == Some(group)
    }

    pub fn play(&mut self, group: AnimationGroup, speed: f32) {
        let (constraints, duration) = group.preset();
        self.playing = Some(group);
        self.constraints = constraints;
        self.remaining = duration / speed.max(0.01);
    }

    pub fn tick(&mut self, delta: f32) {
        if self.playing.is_none() {
            return;
        }
        self.remaining -= delta;
        if self.remaining <= 0.0 {
            self.playing = None;
            self.constraints = AnimationConstraint::empty();
            self.remaining = 0.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dodge_window_expires() {
        let mut state = AnimationState::default();
        state.play(AnimationGroup::Dodge, 1.0);
        assert!(state.constrains_any(AnimationConstraint::PREVENT_BEING_SHOT));

        state.tick(0.2);
        assert!(state.is_playing_group(AnimationGroup::Dodge));

        state.tick(0.2);
        assert!(!state.is_playing());
        assert!(!state.constrains_any(AnimationConstraint::PREVENT_BEING_SHOT));
    }

    #[test]
    fn test_constrains_all_needs_every_flag() {
        let mut state = AnimationState::default();
        state.constraints = AnimationConstraint::PREVENT_SHOOTING;
        assert!(state.constrains_any(AnimationConstraint::PREVENT_ALL_ATTACKING));
        assert!(!state.constrains_all(AnimationConstraint::PREVENT_ALL_ATTACKING));

        state.additional = AnimationConstraint::PREVENT_MELEE;
        assert!(state.constrains_all(AnimationConstraint::PREVENT_ALL_ATTACKING));
    }
}

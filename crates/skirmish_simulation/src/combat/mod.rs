//! Combat module: оружие, стрельба, ballistic resolution, dodge.
//!
//! ECS ответственность:
//! - Game state: Vitality, DodgeMeter, Weapon, WorldItem
//! - Combat rules: ballistic pipeline (dodge / deflect / урон / exit wounds)
//! - Events: ShotFired → CombatFx / AnimationRequest / CombatantDied
//!
//! Снаружи (рендер, звук, melee hit detection) только потребители событий.

use bevy::prelude::*;

pub mod ballistics;
pub mod components;
pub mod events;
pub mod systems;

// Re-export основных типов
pub use ballistics::{fire_shot, fire_shot_with, resolve, SegmentRecord, ShotOutcome, ShotParams, ShotReport};
pub use components::*;
pub use events::*;
pub use systems::{equip_weapon, release_weapon};

use crate::components::CombatWorldState;
use crate::config::{CombatConVars, LevelSettings};
use crate::physics::{sync_body_colliders, CollisionWorld};
use crate::player::PlayerKillStats;

/// Фазы боевого тика в FixedUpdate
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CombatSet {
    /// Часы, dodge regen, таймеры анимаций и оружия
    Prepare,
    /// AI решения (AIPlugin)
    Decide,
    /// Позиции → коллайдеры → `is_firing` в ShotFired
    Fire,
    /// ShotFired → ballistics → эффекты
    Resolve,
}

/// Combat Plugin
///
/// Порядок выполнения (FixedUpdate, 60Hz):
/// 1. Prepare: advance_combat_clock → reset_attacker_counts → regenerate_dodge
///    → tick_animations → tick_weapon_timers
/// 2. Decide: AIPlugin
/// 3. Fire: sync_wielded_weapons → sync_body_colliders → fire_weapons
/// 4. Resolve: resolve_fired_shots (exclusive, рекурсивный resolver)
pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        // Регистрация событий
        app.add_event::<ShotFired>()
            .add_event::<MeleeAttackRequested>()
            .add_event::<CombatantDied>()
            .add_event::<AnimationRequest>()
            .add_event::<CombatFx>();

        app.init_resource::<CombatWorldState>()
            .init_resource::<CombatConVars>()
            .init_resource::<LevelSettings>()
            .init_resource::<CollisionWorld>()
            .init_resource::<PlayerKillStats>();

        app.configure_sets(
            FixedUpdate,
            (CombatSet::Prepare, CombatSet::Decide, CombatSet::Fire, CombatSet::Resolve).chain(),
        );

        app.add_systems(
            FixedUpdate,
            (
                systems::advance_combat_clock,
                (
                    systems::reset_attacker_counts,
                    systems::regenerate_dodge,
                    systems::tick_animations,
                    systems::tick_weapon_timers,
                )
                    .chain()
                    .run_if(systems::combat_running),
            )
                .chain()
                .in_set(CombatSet::Prepare),
        );

        app.add_systems(
            FixedUpdate,
            (systems::sync_wielded_weapons, sync_body_colliders, systems::fire_weapons)
                .chain()
                .in_set(CombatSet::Fire)
                .run_if(systems::combat_running),
        );

        app.add_systems(
            FixedUpdate,
            ballistics::resolve_fired_shots
                .in_set(CombatSet::Resolve)
                .run_if(systems::combat_running),
        );
    }
}

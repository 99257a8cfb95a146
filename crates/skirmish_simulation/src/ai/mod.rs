//! Tactical Decision Loop
//!
//! Каждый fixed тик, два прохода по AI бойцам:
//! 1. saturation: кто из атакующих влезает в лимит на одну цель
//! 2. decision: цели → исполнение намерений прошлого тика → новые намерения
//!
//! Дальше accurate shot sequences, подбор оружия и ходьба.
//! Все решения детерминированы: шум от (время симуляции, seed бойца),
//! случайные числа только из `DeterministicRng`.

use bevy::prelude::*;

pub mod components;
pub mod systems;

// Re-export основных типов
pub use components::*;
pub use systems::{
    account_attacker_saturation, ai_decision_pass, despawn_combatant, spawn_combatant, spawn_combatant_now,
    AccurateShotError, CombatantSpawn, CombatantView, Control,
};

use crate::combat::CombatSet;
use crate::combat::systems::combat_running;
use crate::components::CombatWorldState;

/// Run condition: AI не выключен из dev console
pub fn ai_enabled(state: Res<CombatWorldState>) -> bool {
    !state.ai_disabled
}

/// AI Plugin
///
/// Порядок выполнения (FixedUpdate, внутри `CombatSet::Decide`):
/// 1. account_attacker_saturation
/// 2. ai_decision_pass
/// 3. tick_accurate_shots → release_auto_dodge_locks
/// 4. complete_pickups → integrate_walking
/// 5. auto_spawn_system
pub struct AIPlugin;

impl Plugin for AIPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            FixedUpdate,
            (
                (systems::account_attacker_saturation, systems::ai_decision_pass)
                    .chain()
                    .run_if(ai_enabled),
                systems::tick_accurate_shots,
                systems::release_auto_dodge_locks,
                systems::complete_pickups,
                systems::integrate_walking,
                systems::auto_spawn_system,
            )
                .chain() // Последовательное выполнение для детерминизма
                .in_set(CombatSet::Decide)
                .run_if(combat_running),
        );
    }
}

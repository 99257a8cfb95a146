//! Атака: огнестрел, melee, кулаки, поход за оружием.
//!
//! Всё здесь пишет только намерения следующего тика (`Intents`), сами
//! выстрелы и замахи исполняет decision pass на следующем тике.

use bevy::prelude::*;

use super::targeting::{find_item_target, CombatantView, ItemView};
use crate::ai::AiController;
use crate::combat::{Weapon, WeaponKind};
use crate::combat_math::{time_safe_random, value3, walk_towards};
use crate::components::{AnimationConstraint, AnimationState, CharacterBody, CombatStats};
use crate::config::{CombatConVars, LevelSettings, ACCURATE_SHOT_WARNING_DURATION, MAX_HAND_RANGE};
use crate::physics::{WorldQuery, LINE_OF_SIGHT_MASK};

/// Общий контекст решений одного бойца
pub struct TacticalContext<'a> {
    pub time: f32,
    pub delta: f32,
    pub convars: &'a CombatConVars,
    pub level: &'a LevelSettings,
    pub query: &'a dyn WorldQuery,
    /// Глобально: сколько прошло с последнего accurate shot любого бойца
    pub seconds_since_accurate_shot: f32,
}

/// Держать дистанцию до `target_x` в полосе `[min, max]`
pub fn walk_band(ai: &mut AiController, body: &CharacterBody, target_x: f32, min: f32, max: f32, ctx: &TacticalContext) {
    let near_edge = ctx.level.is_close_to_edge(body.center.x);
    let decision = walk_towards(body.center.x, target_x, min, max, near_edge, ctx.time, ai.seed);
    ai.intents.walk_left.value = decision.walk_left;
    ai.intents.walk_right.value = decision.walk_right;
}

/// Безопасная полоса, когда цель уже атакуют другие
fn walk_safe_band(ai: &mut AiController, body: &CharacterBody, ctx: &TacticalContext) {
    let target_x = ai.aiming_position.x;
    walk_band(ai, body, target_x, ctx.convars.enemy_safe_distance_from_player, ctx.level.level_width, ctx);
}

/// Огнестрел или холодное: стрелять/бить + держать дистанцию
#[allow(clippy::too_many_arguments)]
pub fn process_attacking(
    ai: &mut AiController,
    body: &CharacterBody,
    stats: &CombatStats,
    anim: &AnimationState,
    weapon: &Weapon,
    own_parts: &[Entity],
    kill: &CombatantView,
    ctx: &TacticalContext,
) {
    match weapon.kind {
        WeaponKind::Firearm => process_firearm(ai, body, stats, anim, weapon, own_parts, kill, ctx),
        WeaponKind::Melee => process_melee(ai, body, weapon, ctx),
    }
}

#[allow(clippy::too_many_arguments)]
fn process_firearm(
    ai: &mut AiController,
    body: &CharacterBody,
    stats: &CombatStats,
    anim: &AnimationState,
    weapon: &Weapon,
    own_parts: &[Entity],
    kill: &CombatantView,
    ctx: &TacticalContext,
) {
    let too_busy = ai.too_busy_to_attack;

    if !anim.constrains_any(AnimationConstraint::PREVENT_SHOOTING)
        && ai.attack_mode_duration > stats.shooting_timeout
        && (too_busy || (ai.aiming_position.x - body.center.x).abs() < ctx.convars.firearm_engagement_radius)
    {
        let (origin, direction) = weapon.barrel(body);
        let line_of_sight = ctx.query.raycast(origin, direction, LINE_OF_SIGHT_MASK, own_parts);
        let sees_target = line_of_sight.is_some_and(|hit| too_busy || kill.parts.contains(&hit.entity));

        if sees_target {
            let mut chance = value3(ai.seed, ctx.time * 3.412, 0.0) * 0.5 + 0.5;
            if too_busy {
                chance *= ctx.convars.too_busy_shoot_chance_factor;
            }
            chance *= 0.9;

            let warning_elapsed = ctx.seconds_since_accurate_shot > ACCURATE_SHOT_WARNING_DURATION;
            if !too_busy && warning_elapsed && stats.accurate_shot_chance > chance * 1.5 {
                ai.intents.accurate_shot.value = true;
            } else {
                ai.intents.shoot.value = chance > 0.5;
            }
        }
    }

    if too_busy {
        walk_safe_band(ai, body, ctx);
    } else {
        // Не подходить ближе, чем достаёт ствол противника
        let reach = kill.barrel_distance;
        let band = ctx.convars.enemy_gun_distance;
        let target_x = ai.aiming_position.x;
        walk_band(ai, body, target_x, reach.max(band.min), reach.max(band.max), ctx);
    }
}

fn process_melee(ai: &mut AiController, body: &CharacterBody, weapon: &Weapon, ctx: &TacticalContext) {
    let target_x = ai.aiming_position.x;
    let distance = (target_x - body.center.x).abs();
    ai.intents.shoot.value = value3(ai.seed, 512.534, ctx.time * 0.4) > 0.0 && distance < weapon.range + 200.0;

    if ai.too_busy_to_attack {
        walk_safe_band(ai, body, ctx);
    } else {
        let band = ctx.convars.enemy_melee_distance;
        walk_band(ai, body, target_x, weapon.range, band.max, ctx);
    }
}

/// Без оружия: кулаки или поиск ствола
pub fn process_unarmed(
    ai: &mut AiController,
    body: &CharacterBody,
    anim: &AnimationState,
    items: &[ItemView],
    ctx: &TacticalContext,
) {
    ai.attack_mode_duration = 0.0;

    let Some(item_target) = ai.item_target else {
        if ai.wants_pickup_weapon {
            ai.item_target = find_item_target(body.center, items, ctx.convars.enemy_weapon_search_range);
            if ai.item_target.is_none() {
                ai.wants_pickup_weapon = false;
            }
        } else if ai.has_kill_target && time_safe_random(ctx.time, ai.seed * 0.932) > 0.1 {
            let target_x = ai.aiming_position.x;
            if ai.too_busy_to_attack {
                ai.intents.shoot.value = false;
                walk_safe_band(ai, body, ctx);
            } else {
                ai.intents.shoot.value = (body.center.x - target_x).abs() < MAX_HAND_RANGE * 2.0;
                let band = ctx.convars.enemy_melee_distance;
                walk_band(ai, body, target_x, band.min, band.max, ctx);
            }
        } else {
            ai.wants_pickup_weapon = true;
        }
        return;
    };

    let blocked = AnimationConstraint::PREVENT_WALKING | AnimationConstraint::PREVENT_WORLD_INTERACTION;
    if !anim.constrains_any(blocked) {
        if let Some(item) = items.iter().find(|item| item.entity == item_target) {
            walk_to_item(ai, body, item);
        }
    }
}

/// Идти к предмету, взяться за него, когда дотянемся
pub fn walk_to_item(ai: &mut AiController, body: &CharacterBody, item: &ItemView) {
    let to_right = item.position.x > body.center.x;
    ai.intents.walk_right.value = to_right;
    ai.intents.walk_left.value = !to_right;
    ai.intents.interact.value = item.position.distance(body.center) < body.hand_pickup_range * 2.0;
    ai.aiming_position = item.position;
}

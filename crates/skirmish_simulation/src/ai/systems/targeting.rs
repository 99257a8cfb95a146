//! Выбор целей: враг, оружие на полу, союзный игрок.
//!
//! Decision pass строит снимок ростера один раз за тик и дальше
//! работает только с ним (никаких запросов к World внутри цикла).

use bevy::prelude::*;

use crate::components::Actor;
use crate::config::DROPPED_WEAPON_GRACE;

/// Снимок бойца на начало decision pass
#[derive(Debug, Clone)]
pub struct CombatantView {
    pub entity: Entity,
    pub actor: Actor,
    pub alive: bool,
    pub is_player: bool,
    pub center: Vec2,
    pub head: Vec2,
    pub is_flying: bool,
    /// Коллайдеры частей тела (для line of sight)
    pub parts: Vec<Entity>,
    pub holds_melee_weapon: bool,
    /// Длина ствола в руках (0 без оружия или с melee)
    pub barrel_distance: f32,
    /// Сейчас замахивается (играет Melee)
    pub is_swinging: bool,
}

/// Снимок оружия в мире
#[derive(Debug, Clone, Copy)]
pub struct ItemView {
    pub entity: Entity,
    pub position: Vec2,
    pub velocity: Vec2,
    pub wielded: bool,
    pub has_rounds: bool,
    pub stuck: bool,
    pub attached_to_wall: bool,
    pub thrown: bool,
    pub dropped_for: Option<f32>,
}

/// Скорость (в квадрате), выше которой предмет ещё летит и его не поймать
const MAX_PICKUP_SPEED_SQUARED: f32 = 625.0;

impl ItemView {
    /// Свободно, заряжено, не застряло
    fn is_free(&self) -> bool {
        !self.wielded && self.has_rounds && !self.stuck && !self.attached_to_wall
    }

    fn is_flying(&self) -> bool {
        self.velocity.length_squared() > MAX_PICKUP_SPEED_SQUARED
    }

    /// Стоит ли идти за этим предметом
    pub fn is_worth_seeking(&self) -> bool {
        self.is_free()
            && !self.thrown
            && !self.is_flying()
            && self.dropped_for.is_none_or(|dropped| dropped >= DROPPED_WEAPON_GRACE)
    }
}

/// Ближайший живой враг (строгое < по квадрату дистанции: при равенстве первый в ростере)
pub fn find_kill_target<'a>(
    me: Entity,
    actor: &Actor,
    position: Vec2,
    roster: &'a [CombatantView],
) -> Option<&'a CombatantView> {
    let mut nearest: Option<(&CombatantView, f32)> = None;

    for other in roster {
        if other.entity == me || !other.alive || !actor.is_hostile_to(&other.actor) {
            continue;
        }
        let distance = other.center.distance_squared(position);
        if nearest.is_none_or(|(_, best)| distance < best) {
            nearest = Some((other, distance));
        }
    }

    nearest.map(|(view, _)| view)
}

/// Ближайшее оружие в радиусе поиска, за которым стоит идти
///
/// Только что выброшенное (меньше `DROPPED_WEAPON_GRACE`), летящее и брошенное пропускаем.
pub fn find_item_target(position: Vec2, items: &[ItemView], search_range: f32) -> Option<Entity> {
    let range_squared = search_range * search_range;

    items
        .iter()
        .filter(|item| item.is_worth_seeking())
        .map(|item| (item, item.position.distance_squared(position)))
        .filter(|(_, distance)| *distance < range_squared)
        .fold(None, |best: Option<(&ItemView, f32)>, (item, distance)| match best {
            Some((_, best_distance)) if best_distance <= distance => best,
            _ => Some((item, distance)),
        })
        .map(|(item, _)| item.entity)
}

/// Что можно схватить прямо сейчас (`pickup_range_squared` уже в квадрате)
pub fn find_pickup_candidate(position: Vec2, items: &[ItemView], pickup_range_squared: f32) -> Option<Entity> {
    let mut nearest: Option<(Entity, f32)> = None;

    for item in items {
        if !item.is_free() || item.is_flying() {
            continue;
        }
        let distance = item.position.distance_squared(position);
        if distance > pickup_range_squared {
            continue;
        }
        if nearest.is_none_or(|(_, best)| distance < best) {
            nearest = Some((item.entity, distance));
        }
    }

    nearest.map(|(entity, _)| entity)
}

/// Игрок из той же фракции (AI без цели ходит за ним)
pub fn find_allied_player<'a>(me: Entity, actor: &Actor, roster: &'a [CombatantView]) -> Option<&'a CombatantView> {
    roster
        .iter()
        .find(|other| other.is_player && other.entity != me && actor.is_allied_to(&other.actor))
}

/// Цель уже под прицелом чьего-то accurate shot (пары shooter → target)
pub fn is_targeted_by_accurate_shot(target: Option<Entity>, sequences: &[(Entity, Entity)]) -> bool {
    target.is_some_and(|target| sequences.iter().any(|(_, aimed_at)| *aimed_at == target))
}

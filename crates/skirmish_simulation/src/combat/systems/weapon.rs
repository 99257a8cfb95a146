//! Weapon systems: таймеры, предметы в мире, стрельба.

use bevy::prelude::*;

use crate::combat::ballistics::ShotParams;
use crate::combat::events::{CombatFx, ShotFired, SoundCue};
use crate::combat::{EquippedWeapon, Weapon, WorldItem};
use crate::combat_math::roll;
use crate::components::{Actor, BodyParts, CharacterBody, CharacterFlags, CombatWorldState, HandPose};
use crate::physics::enemy_mask;
use crate::player::{Player, PlayerKillStats};

/// Скорость, с которой выброшенное оружие отлетает от владельца
const DROP_VELOCITY: f32 = 120.0;
const PELLET_JITTER_SALT: f32 = 91.0;

/// System: cooldown стрельбы + сколько лежит выброшенное оружие
pub fn tick_weapon_timers(state: Res<CombatWorldState>, mut weapons: Query<(&mut Weapon, &mut WorldItem)>) {
    let delta = state.delta;

    for (mut weapon, mut item) in weapons.iter_mut() {
        if weapon.cooldown > 0.0 {
            weapon.cooldown = (weapon.cooldown - delta).max(0.0);
        }

        if item.is_wielded() {
            continue;
        }
        if let Some(dropped_for) = item.dropped_for.as_mut() {
            *dropped_for += delta;
        }
        let velocity = item.velocity;
        item.position += velocity * delta;
        item.velocity = velocity * (1.0 - 4.0 * delta).max(0.0);
    }
}

/// System: оружие в руке следует за рукой владельца
pub fn sync_wielded_weapons(mut items: Query<&mut WorldItem, With<Weapon>>, owners: Query<&CharacterBody>) {
    for mut item in items.iter_mut() {
        let Some(wielder) = item.wielder else {
            continue;
        };
        let Ok(body) = owners.get(wielder) else {
            // Владельца больше нет: оружие падает на месте
            item.wielder = None;
            item.dropped_for = Some(0.0);
            continue;
        };
        item.position = body.hand_position();
        item.velocity = Vec2::ZERO;
    }
}

/// Выбросить оружие из рук
pub fn release_weapon(equipped: &mut EquippedWeapon, item: &mut WorldItem, body: &mut CharacterBody) {
    equipped.weapon = None;
    body.hand_pose = HandPose::None;
    item.wielder = None;
    item.dropped_for = Some(0.0);
    item.velocity = Vec2::new(-body.flip_scaling() * DROP_VELOCITY, 0.0);
}

/// Взять оружие в руки
pub fn equip_weapon(
    wielder: Entity,
    weapon_entity: Entity,
    weapon: &Weapon,
    equipped: &mut EquippedWeapon,
    item: &mut WorldItem,
    body: &mut CharacterBody,
) {
    equipped.weapon = Some(weapon_entity);
    item.wielder = Some(wielder);
    item.dropped_for = None;
    item.velocity = Vec2::ZERO;
    item.thrown = false;
    body.hand_pose = if weapon.hold_points >= 2 { HandPose::TwoHands } else { HandPose::OneHand };
}

/// System: `Weapon::is_firing` → `ShotFired` (по событию на дробину)
///
/// Флаг потребляется всегда, даже если выстрела не было (cooldown, пусто, melee).
pub fn fire_weapons(
    mut state: ResMut<CombatWorldState>,
    mut weapons: Query<(Entity, &mut Weapon, &WorldItem)>,
    mut shooters: Query<(&Actor, &mut CharacterBody, &CharacterFlags, Option<&BodyParts>, Has<Player>)>,
    mut shots: EventWriter<ShotFired>,
    mut fx: EventWriter<CombatFx>,
    mut kill_stats: Option<ResMut<PlayerKillStats>>,
) {
    for (weapon_entity, mut weapon, item) in weapons.iter_mut() {
        if !weapon.is_firing {
            continue;
        }
        weapon.is_firing = false;

        if !weapon.behaviour().fires_bullets || weapon.cooldown > 0.0 {
            continue;
        }
        let Some(wielder) = item.wielder else {
            continue;
        };
        let Ok((actor, mut body, flags, parts, is_player)) = shooters.get_mut(wielder) else {
            continue;
        };

        let (origin, direction) = weapon.barrel(&body);

        if !weapon.has_rounds_left() {
            fx.write(CombatFx::Sound { cue: SoundCue::DryFire, position: origin, volume: 1.0 });
            continue;
        }

        if !weapon.infinite_ammo {
            weapon.rounds_left -= 1;
        }
        weapon.cooldown = weapon.fire_interval;
        body.recoil += weapon.recoil;

        let pellets = weapon.bullets_per_shot.max(1);
        let seed = state.next_shot_seed();
        for pellet in 0..pellets {
            let angle = if pellets > 1 {
                let fan = pellet as f32 / (pellets - 1) as f32 - 0.5;
                let jitter = roll(state.elapsed, seed, pellet, PELLET_JITTER_SALT) - 0.5;
                weapon.spread * (fan + jitter / pellets as f32)
            } else {
                0.0
            };

            let mut shot = ShotParams::new(origin, Vec2::from_angle(angle).rotate(direction), weapon.damage);
            shot.cluster_size = pellets;
            shot.enemy_mask = enemy_mask(actor.faction_id);
            shot.ignore = parts.map(BodyParts::as_vec).unwrap_or_default();
            shot.origin_character = Some(wielder);
            shot.origin_weapon = Some(weapon_entity);
            shot.can_be_deflected = weapon.can_bullets_be_deflected;
            shot.can_be_auto_dodged = !flags.attacks_cannot_be_auto_dodged;
            shot.seed = seed + pellet as f32 * 7.31;
            shots.write(ShotFired { shot });
        }

        if is_player {
            if let Some(stats) = kill_stats.as_mut() {
                stats.shots_fired += 1;
            }
        }

        crate::logger::log(&format!(
            "🔫 {:?} стреляет из {} ({} пуль, осталось {})",
            wielder, weapon.name, pellets, weapon.rounds_left
        ));
    }
}

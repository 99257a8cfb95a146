//! Pass 2: решение каждого AI бойца на тик.
//!
//! Порядок внутри тика важен: сначала исполняются намерения, принятые на
//! прошлом тике (стрельба, блок, ходьба), потом `Intents` сбрасываются и
//! принимаются решения на следующий тик.

use bevy::prelude::*;

use super::accurate_shot::start_accurate_shot;
use super::attack::{process_attacking, process_unarmed, walk_to_item, TacticalContext};
use super::movement::wander;
use super::targeting::{
    find_allied_player, find_item_target, find_kill_target, find_pickup_candidate, is_targeted_by_accurate_shot,
    CombatantView, ItemView,
};
use crate::ai::{AccurateShot, AiController};
use crate::combat::{
    release_weapon, AnimationRequest, CombatFx, EquippedWeapon, MeleeAttackRequested, PendingPickup, SoundCue, Weapon,
    WeaponKind, WorldItem,
};
use crate::combat_math::{noise2d, smooth_approach, time_safe_random, value3};
use crate::components::{
    Actor, AnimationConstraint, AnimationGroup, AnimationState, BodyParts, CharacterBody, CharacterFlags, CombatStats,
    CombatWorldState, DodgeMeter, HandPose, Vitality,
};
use crate::config::{CombatConVars, LevelSettings, ACCURATE_SHOT_COOLDOWN, MAX_AI_COUNT};
use crate::physics::CollisionWorld;
use crate::player::Player;
use crate::DeterministicRng;

/// Скорость подъёма iron sight (в единицах прогресса за секунду)
const IRON_SIGHT_SPEED: f32 = 8.0;
/// Скорость подъёма melee блока
const BLOCK_RAISE_SPEED: f32 = 6.0;
/// Iron sight поднимает точку прицеливания огнестрела
const IRON_SIGHT_LIFT: f32 = 100.0;
const FACE_FORWARDS_DISTANCE: f32 = 10_000.0;

type RosterQuery<'w, 's> = Query<
    'w,
    's,
    (
        Entity,
        &'static Actor,
        &'static Vitality,
        &'static CharacterBody,
        &'static EquippedWeapon,
        &'static AnimationState,
        Option<&'static BodyParts>,
        Has<Player>,
    ),
>;

type ControllerQuery<'w, 's> = Query<
    'w,
    's,
    (
        Entity,
        &'static mut AiController,
        &'static Actor,
        &'static Vitality,
        &'static mut CharacterBody,
        &'static mut AnimationState,
        &'static mut EquippedWeapon,
        &'static CombatStats,
        &'static mut CharacterFlags,
        &'static DodgeMeter,
        Has<PendingPickup>,
        Option<&'static BodyParts>,
    ),
>;

/// Всё, что decision pass хочет сделать с миром после цикла
#[derive(Default)]
struct PassOutput {
    sequences: Vec<AccurateShot>,
    pickups: Vec<(Entity, Entity)>,
    melee: Vec<MeleeAttackRequested>,
    animations: Vec<AnimationRequest>,
    fx: Vec<CombatFx>,
}

/// System: tactical decision loop (pass 2)
///
/// Один проход по всем AI: валидация целей, исполнение намерений прошлого
/// тика, решения на следующий. Ошибка одного бойца (например, accurate shot
/// по уже мёртвой цели) логируется и не мешает остальным.
#[allow(clippy::too_many_arguments)]
pub fn ai_decision_pass(
    mut commands: Commands,
    mut state: ResMut<CombatWorldState>,
    convars: Res<CombatConVars>,
    level: Res<LevelSettings>,
    collision: Res<CollisionWorld>,
    mut rng: ResMut<DeterministicRng>,
    mut fighters: ParamSet<(RosterQuery, ControllerQuery)>,
    mut weapons: Query<(Entity, &mut Weapon, &mut WorldItem)>,
    sequences: Query<&AccurateShot>,
    mut melee_events: EventWriter<MeleeAttackRequested>,
    mut animation_events: EventWriter<AnimationRequest>,
    mut fx_events: EventWriter<CombatFx>,
) {
    let time = state.elapsed;
    let delta = state.delta;

    let roster: Vec<CombatantView> = fighters
        .p0()
        .iter()
        .map(|(entity, actor, vitality, body, equipped, anim, parts, is_player)| {
            let held = equipped.weapon.and_then(|w| weapons.get(w).ok()).map(|(_, weapon, _)| weapon);
            CombatantView {
                entity,
                actor: actor.clone(),
                alive: vitality.is_alive(),
                is_player,
                center: body.center,
                head: body.head_position(),
                is_flying: body.is_flying,
                parts: parts.map(BodyParts::as_vec).unwrap_or_default(),
                holds_melee_weapon: held.is_some_and(|weapon| weapon.kind == WeaponKind::Melee),
                barrel_distance: held.map_or(0.0, |weapon| weapon.barrel_distance(body)),
                is_swinging: anim.is_playing_group(AnimationGroup::Melee),
            }
        })
        .collect();

    let items: Vec<ItemView> = weapons
        .iter()
        .map(|(entity, weapon, item)| ItemView {
            entity,
            position: item.position,
            velocity: item.velocity,
            wielded: item.is_wielded(),
            has_rounds: weapon.has_rounds_left(),
            stuck: item.stuck,
            attached_to_wall: item.attached_to_wall,
            thrown: item.thrown,
            dropped_for: item.dropped_for,
        })
        .collect();

    let mut targeted: Vec<(Entity, Entity)> = sequences.iter().map(|s| (s.shooter, s.target)).collect();
    let find = |entity: Entity| roster.iter().find(|view| view.entity == entity);

    let mut out = PassOutput::default();
    let mut processed = 0usize;
    let mut controllers = fighters.p1();

    for (entity, mut ai, actor, vitality, mut body, mut anim, mut equipped, stats, mut flags, dodge, pickup_pending, parts) in
        controllers.iter_mut()
    {
        if processed == MAX_AI_COUNT {
            crate::logger::log_warning(&format!("⚠️ Больше {} AI бойцов, остальные ждут", MAX_AI_COUNT));
            break;
        }
        processed += 1;

        // === Мёртвые: один раз в ragdoll ===
        if !vitality.is_alive() {
            if !anim.has_been_ragdolled {
                anim.has_been_ragdolled = true;
                if !anim.is_playing_group(AnimationGroup::Death) {
                    anim.play(AnimationGroup::Death, 1.0);
                    out.animations.push(AnimationRequest::new(entity, AnimationGroup::Death));
                }
            }
            continue;
        }

        let own_parts = parts.map(BodyParts::as_vec).unwrap_or_default();

        // === Валидация целей ===
        // kill view берётся ДО проверки: после потери цели ссылка на неё остаётся
        let mut kill_view = ai.kill_target.and_then(find);
        if ai.has_kill_target && (ai.is_docile || kill_view.is_none_or(|k| !k.alive)) {
            ai.has_kill_target = false;
            crate::logger::log(&format!("🎯 AI {:?}: цель {:?} потеряна", entity, ai.kill_target));
        }

        if let Some(item_target) = ai.item_target {
            let available = items
                .iter()
                .find(|item| item.entity == item_target)
                .is_some_and(|item| !item.wielded && item.has_rounds);
            if !available {
                ai.item_target = None;
            }
        }

        if !ai.is_docile && !ai.has_kill_target {
            ai.attack_mode_duration = 0.0;
            if let Some(found) = find_kill_target(entity, actor, body.center, &roster) {
                ai.kill_target = Some(found.entity);
                ai.has_kill_target = true;
                crate::logger::log(&format!("🎯 AI {:?}: новая цель {:?}", entity, found.entity));
            }
        } else {
            ai.attack_mode_duration += delta;
        }

        if kill_view.is_none() {
            kill_view = ai.kill_target.and_then(find);
        }

        // === Оружие, iron sight, поиск ствола получше ===
        let weapon: Option<Weapon> =
            equipped.weapon.and_then(|w| weapons.get(w).ok()).map(|(_, weapon, _)| weapon.clone());
        if equipped.weapon.is_some() && weapon.is_none() {
            equipped.weapon = None;
        }

        body.is_iron_sighting = weapon.is_some() && ai.intents.iron_sight.value;
        let iron_goal = if body.is_iron_sighting { 1.0 } else { 0.0 };
        body.iron_sight_progress = smooth_approach(body.iron_sight_progress, iron_goal, IRON_SIGHT_SPEED, delta);

        let body_center = body.body_center();
        let mut aim_origin = body_center;
        match &weapon {
            Some(held) => {
                if held.behaviour().raises_hands_when_aiming {
                    aim_origin.y += IRON_SIGHT_LIFT * body.iron_sight_progress;
                }
                if held.kind == WeaponKind::Melee && time_safe_random(time, ai.seed - 42.23) > 0.2 {
                    ai.item_target = find_item_target(body.center, &items, convars.enemy_weapon_search_range);
                }
            }
            None => {
                if time_safe_random(time, ai.seed + 2239.0) > 0.6 && ai.item_target.is_none() {
                    ai.item_target = find_item_target(body.center, &items, convars.enemy_weapon_search_range);
                }
            }
        }

        // === Руки тянутся к точке прицеливания ===
        let reach_multiplier = weapon.as_ref().map_or(1.0, |held| held.max_hand_range_multiplier);
        let hand = (ai.aiming_position - aim_origin).clamp_length_max(body.max_hand_range(reach_multiplier));
        body.hand_target = aim_origin - body_center + hand;
        body.aim_target = ai.aiming_position;

        // === Патроны кончились: выбросить ===
        match (&weapon, equipped.weapon) {
            (Some(held), Some(weapon_entity)) if !ai.is_docile => {
                if !held.has_rounds_left() {
                    if let Ok((_, _, mut item)) = weapons.get_mut(weapon_entity) {
                        release_weapon(&mut equipped, &mut item, &mut body);
                    }
                    crate::logger::log(&format!("🗑️ AI {:?}: {} пуст, выбрасываем", entity, held.name));
                    continue;
                }
                body.hand_pose = if held.hold_points > 1 { HandPose::TwoHands } else { HandPose::OneHand };
            }
            _ => body.hand_pose = HandPose::None,
        }

        // === Подбор ===
        if ai.intents.interact.value
            && !anim.constrains_any(AnimationConstraint::PREVENT_WORLD_INTERACTION)
            && !pickup_pending
            && equipped.weapon.is_none()
        {
            let range = body.hand_pickup_range * body.hand_pickup_range * stats.scale + 150.0;
            if let Some(item) = find_pickup_candidate(body.center, &items, range) {
                out.pickups.push((entity, item));
                anim.play(AnimationGroup::Pickup, 1.0);
                out.animations.push(AnimationRequest::new(entity, AnimationGroup::Pickup));
                ai.wants_pickup_weapon = false;
            }
        }

        let targeted_by_other = is_targeted_by_accurate_shot(ai.kill_target, &targeted);

        // === Огнестрел: исполнение намерений ===
        if let (Some(held), Some(weapon_entity)) = (weapon.as_ref(), equipped.weapon) {
            if held.kind == WeaponKind::Firearm && !ai.is_docile && !ai.is_doing_accurate_shot && !targeted_by_other {
                if ai.intents.shoot.became_true() && !held.has_rounds_left() {
                    out.fx.push(CombatFx::Sound { cue: SoundCue::DryFire, position: body.hand_position(), volume: 1.0 });
                }

                if ai.intents.accurate_shot.became_true()
                    && ai.panic < 0.1
                    && state.seconds_since_accurate_shot() > ACCURATE_SHOT_COOLDOWN
                    && kill_view.is_some()
                {
                    match start_accurate_shot(entity, &mut ai, &mut flags, Some(held), kill_view, &mut state) {
                        Ok(Some(sequence)) => {
                            targeted.push((sequence.shooter, sequence.target));
                            out.fx.push(CombatFx::AccurateShotWarning { shooter: entity, target: sequence.target });
                            out.fx.push(CombatFx::Sound {
                                cue: SoundCue::AccurateShotWarning,
                                position: body.head_position(),
                                volume: 1.0,
                            });
                            out.sequences.push(sequence);
                        }
                        Ok(None) => {}
                        Err(err) => {
                            crate::logger::log_error(&format!("❌ AI {:?}: accurate shot не начат: {}", entity, err));
                            continue;
                        }
                    }
                } else if !anim.constrains_any(AnimationConstraint::PREVENT_SHOOTING) {
                    let pull = if held.automatic {
                        ai.intents.shoot.value
                    } else {
                        ai.intents.shoot.became_true()
                    };
                    if pull {
                        if let Ok((_, mut firing, _)) = weapons.get_mut(weapon_entity) {
                            firing.is_firing = true;
                        }
                    }
                }
            }
        }

        // === Melee: блок и замах ===
        let aim_right = body.aim_target.x > body.center.x;
        body.is_melee_blocking = false;
        let melee_capable = weapon.as_ref().is_none_or(|held| held.kind == WeaponKind::Melee);

        if !ai.is_docile && !ai.too_busy_to_attack && melee_capable {
            if !anim.constrains_any(AnimationConstraint::PREVENT_BLOCK) {
                let blocks = weapon.as_ref().is_some_and(|held| held.behaviour().iron_sight_is_block);
                body.is_melee_blocking = blocks && body.is_iron_sighting;
            }

            let wants_swing = !body.is_melee_blocking
                && ai.intents.shoot.value
                && !ai.is_doing_accurate_shot
                && !targeted_by_other
                && ai.has_kill_target
                && kill_view.is_some_and(|k| !k.is_flying);
            if wants_swing
                && !anim.constrains_any(AnimationConstraint::PREVENT_MELEE)
                && !anim.is_playing_group(AnimationGroup::Melee)
            {
                out.melee.push(MeleeAttackRequested { attacker: entity, weapon: equipped.weapon });
                anim.play(AnimationGroup::Melee, 1.0);
                out.animations.push(AnimationRequest::new(entity, AnimationGroup::Melee));
            }

            if !anim.constrains_any(AnimationConstraint::PREVENT_FLIP) {
                body.is_flipped = !aim_right;
            }
        }

        body.melee_block_progress = if body.is_melee_blocking {
            (body.melee_block_progress + BLOCK_RAISE_SPEED * delta).min(1.0)
        } else {
            0.0
        };

        if !anim.is_playing() {
            body.is_flipped = !aim_right;
        }

        // === Ходьба ===
        body.walk_acceleration = Vec2::ZERO;
        let (walk_left, walk_right) = (ai.intents.walk_left.value, ai.intents.walk_right.value);
        if !(walk_left && walk_right) && body.allow_walking {
            let can_flip = !anim.constrains_any(AnimationConstraint::PREVENT_FLIP);
            let mut multiplier = if body.is_iron_sighting { 0.5 } else { 1.0 };

            if walk_right {
                if can_flip {
                    body.is_flipped = !aim_right;
                }
                // Спиной вперёд вдвое медленнее
                if body.is_flipped {
                    multiplier *= 0.5;
                }
                body.walk_acceleration = Vec2::new(body.top_walk_speed * multiplier, 0.0);
            }
            if walk_left {
                if can_flip {
                    body.is_flipped = !aim_right;
                }
                if !body.is_flipped {
                    multiplier *= 0.5;
                }
                body.walk_acceleration = Vec2::new(-body.top_walk_speed * multiplier, 0.0);
            }
        }

        ai.panic = (ai.panic - delta).clamp(0.0, 1.0);

        // === Решения на следующий тик ===
        ai.intents.sync();
        let holding_accurate = ai.is_doing_accurate_shot;
        ai.intents.clear(holding_accurate);

        let ctx = TacticalContext {
            time,
            delta,
            convars: &convars,
            level: &level,
            query: &*collision,
            seconds_since_accurate_shot: state.seconds_since_accurate_shot(),
        };

        match kill_view.filter(|_| ai.has_kill_target) {
            Some(kill) => {
                if anim.constrains_any(AnimationConstraint::FACE_FORWARDS) {
                    ai.aiming_position =
                        body.head_position() + Vec2::new(body.flip_scaling() * FACE_FORWARDS_DISTANCE, 0.0);
                } else if !anim.constrains_any(AnimationConstraint::PREVENT_AIMING) {
                    let mut aim = kill.head;
                    if weapon.is_some() {
                        let spread = stats.aiming_randomness / 2.0 * aim.distance(body.center);
                        aim += noise2d(time * 0.343, ai.seed) * spread;
                    }
                    ai.aiming_position = aim;
                    body.relative_aim_target = aim - aim_origin;
                } else {
                    ai.aiming_position = aim_origin + body.relative_aim_target;
                }

                if !anim.constrains_any(AnimationConstraint::PREVENT_BLOCK) {
                    match &weapon {
                        Some(held) => {
                            if !ai.is_doing_accurate_shot && stats.can_deflect {
                                ai.intents.iron_sight.value = if kill.holds_melee_weapon {
                                    value3(ai.seed * 23.323, 1.0, time * 0.2) < 0.5 && kill.is_swinging
                                } else {
                                    let nervous = ai.panic > 0.0 || dodge.current < stats.dodge_ability;
                                    value3(ai.seed * -23.323, ai.seed, time * 0.2) < 0.5
                                        && nervous
                                        && held.can_deflect_bullets
                                };
                            }
                        }
                        None => ai.intents.iron_sight.value = kill.is_swinging,
                    }
                }

                if !anim.constrains_all(AnimationConstraint::PREVENT_ALL_ATTACKING) {
                    match &weapon {
                        Some(held) => {
                            process_attacking(&mut ai, &body, stats, &anim, held, &own_parts, kill, &ctx);
                        }
                        None => {
                            if !anim.constrains_any(AnimationConstraint::PREVENT_MELEE) {
                                process_unarmed(&mut ai, &body, &anim, &items, &ctx);
                            }
                        }
                    }
                }
            }
            None => match ai.item_target.filter(|_| weapon.is_none()) {
                Some(item_target) => {
                    if let Some(item) = items.iter().find(|item| item.entity == item_target) {
                        walk_to_item(&mut ai, &body, item);
                    }
                }
                None => {
                    let ally = find_allied_player(entity, actor, &roster);
                    wander(&mut ai, &body, ally, &mut rng, &ctx);
                }
            },
        }
    }

    // === Применить отложенное ===
    for (picker, item) in out.pickups {
        commands.entity(picker).insert(PendingPickup::new(item));
    }
    for sequence in out.sequences {
        commands.spawn(sequence);
    }
    melee_events.write_batch(out.melee);
    animation_events.write_batch(out.animations);
    fx_events.write_batch(out.fx);
}

//! Unit tests для ballistic resolver

use bevy::ecs::system::RunSystemOnce;
use bevy::prelude::*;

use super::*;
use crate::combat::{EquippedWeapon, Weapon};
use crate::components::*;
use crate::physics::{faction_layer, sync_body_colliders, ColliderShape, RayHit, LAYER_BLOCK_BULLETS, LAYER_DECAL_ZONE};
use crate::player::Player;

fn spawn_fighter(world: &mut World, faction: u64, center: Vec2) -> Entity {
    let fighter = world.spawn((Actor::new(faction), CharacterBody::at(center))).id();
    let head = world.spawn(BodyPart { owner: fighter, kind: BodyPartKind::Head }).id();
    let body = world.spawn(BodyPart { owner: fighter, kind: BodyPartKind::Body }).id();
    world.entity_mut(fighter).insert(BodyParts { head, body });
    fighter
}

fn sync_colliders(world: &mut World) {
    world.init_resource::<CollisionWorld>();
    world.run_system_once(sync_body_colliders).expect("sync colliders");
}

fn face_left(world: &mut World, entity: Entity) {
    world.get_mut::<CharacterBody>(entity).unwrap().is_flipped = true;
}

fn arm_with(world: &mut World, entity: Entity, weapon: Weapon) -> Entity {
    let weapon = world.spawn(weapon).id();
    world.get_mut::<EquippedWeapon>(entity).unwrap().weapon = Some(weapon);
    weapon
}

/// Выстрел вправо на высоте центра тела
fn shot_right(damage: f32) -> ShotParams {
    ShotParams::new(Vec2::new(0.0, 60.0), Vec2::X, damage)
}

#[test]
fn test_miss_draws_long_tracer() {
    let mut world = World::new();
    sync_colliders(&mut world);

    let report = fire_shot(&mut world, shot_right(1.0));

    assert_eq!(report.outcomes(), vec![ShotOutcome::Missed]);
    assert!(matches!(report.fx[0], CombatFx::Tracer { to, .. } if (to.x - 10_000.0).abs() < 1e-2));
}

#[test]
fn test_blocking_sword_deflects_single_bullet() {
    let mut world = World::new();
    let victim = spawn_fighter(&mut world, 2, Vec2::new(500.0, 0.0));
    face_left(&mut world, victim);
    arm_with(&mut world, victim, Weapon::sword());
    world.get_mut::<CharacterBody>(victim).unwrap().is_melee_blocking = true;
    sync_colliders(&mut world);

    let report = fire_shot(&mut world, shot_right(1.0));

    assert_eq!(
        report.outcomes(),
        vec![ShotOutcome::Deflected { victim, perfect: false }, ShotOutcome::Missed]
    );

    // Отражённый сегмент летит обратно
    let reflected = &report.segments[1];
    assert!(reflected.direction.x < 0.0);
    assert!((reflected.origin.x - 430.0).abs() < 1e-2);

    let vitality = world.get::<Vitality>(victim).unwrap();
    assert_eq!(vitality.body.current, 1.0);
    assert_eq!(vitality.head.current, 1.0);

    let dodge = world.get::<DodgeMeter>(victim).unwrap();
    assert!((dodge.current - 0.9).abs() < 1e-5);
}

#[test]
fn test_cluster_shot_never_deflects() {
    let mut world = World::new();
    let victim = spawn_fighter(&mut world, 2, Vec2::new(500.0, 0.0));
    face_left(&mut world, victim);
    arm_with(&mut world, victim, Weapon::sword());
    world.get_mut::<CharacterBody>(victim).unwrap().is_melee_blocking = true;
    world.get_mut::<Armour>(victim).unwrap().body = Some(ArmourPiece::new("plate", 1.0));
    sync_colliders(&mut world);

    let shot = ShotParams { cluster_size: 8, ..shot_right(1.0) };
    let report = fire_shot(&mut world, shot);

    assert!(!report.outcomes().iter().any(|o| matches!(o, ShotOutcome::Deflected { .. })));
    assert!(matches!(report.outcomes()[0], ShotOutcome::Damaged { victim: v, .. } if v == victim));
}

#[test]
fn test_full_armour_deflects_from_front_only() {
    let mut world = World::new();
    let victim = spawn_fighter(&mut world, 2, Vec2::new(500.0, 0.0));
    world.get_mut::<Armour>(victim).unwrap().body = Some(ArmourPiece::new("plate", 1.0));
    sync_colliders(&mut world);

    // Спиной к стрелку: броня не работает, уходит в passive dodge
    let report = fire_shot(&mut world, shot_right(1.0));
    assert!(matches!(report.outcomes()[0], ShotOutcome::Dodged { .. }));

    face_left(&mut world, victim);
    world.get_mut::<DodgeMeter>(victim).unwrap().restore_full();
    world.get_mut::<AnimationState>(victim).unwrap().tick(10.0);

    let report = fire_shot(&mut world, shot_right(1.0));
    assert_eq!(report.outcomes()[0], ShotOutcome::Deflected { victim, perfect: false });
}

#[test]
fn test_perfect_deflect_punishes_shooter() {
    let mut world = World::new();
    world.init_resource::<CombatWorldState>();
    let shooter = spawn_fighter(&mut world, 1, Vec2::ZERO);
    let victim = spawn_fighter(&mut world, 2, Vec2::new(500.0, 0.0));
    face_left(&mut world, victim);
    arm_with(&mut world, victim, Weapon::sword());
    {
        let mut body = world.get_mut::<CharacterBody>(victim).unwrap();
        body.is_melee_blocking = true;
        body.melee_block_progress = 0.5;
    }
    world.get_mut::<DodgeMeter>(victim).unwrap().current = 0.5;
    sync_colliders(&mut world);

    let body_parts = *world.get::<BodyParts>(shooter).unwrap();
    let shot = ShotParams {
        origin_character: Some(shooter),
        ignore: body_parts.as_vec(),
        enemy_mask: crate::physics::enemy_mask(1),
        can_be_auto_dodged: false,
        ..shot_right(1.0)
    };
    let report = fire_shot(&mut world, shot);

    assert_eq!(report.outcomes()[0], ShotOutcome::Deflected { victim, perfect: true });

    let shooter_dodge = world.get::<DodgeMeter>(shooter).unwrap();
    assert_eq!(shooter_dodge.current, -1.0);
    assert_eq!(shooter_dodge.regen_cooldown, 10.0);

    assert_eq!(world.get::<DodgeMeter>(victim).unwrap().current, 1.0);
    assert_eq!(world.get::<CharacterBody>(victim).unwrap().melee_block_progress, 1.0);
    assert!(world.resource::<CombatWorldState>().time_dilation.is_active());
    assert!(report.fx.iter().any(|fx| matches!(fx, CombatFx::SlowMotion { .. })));

    // Пуля вернулась в стрелка, у которого больше нет dodge
    assert!(report
        .outcomes()
        .iter()
        .any(|o| matches!(o, ShotOutcome::Damaged { victim: v, .. } if *v == shooter)));
}

#[test]
fn test_auto_dodgeable_bullet_is_not_perfect_deflected() {
    let mut world = World::new();
    let victim = spawn_fighter(&mut world, 2, Vec2::new(500.0, 0.0));
    face_left(&mut world, victim);
    arm_with(&mut world, victim, Weapon::sword());
    world.get_mut::<CharacterBody>(victim).unwrap().is_melee_blocking = true;
    sync_colliders(&mut world);

    let report = fire_shot(&mut world, shot_right(1.0));
    assert_eq!(report.outcomes()[0], ShotOutcome::Deflected { victim, perfect: false });
    assert_eq!(world.get::<CharacterBody>(victim).unwrap().melee_block_progress, 0.0);
}

#[test]
fn test_passive_dodge_cost_and_continuation() {
    let mut world = World::new();
    let victim = spawn_fighter(&mut world, 2, Vec2::new(500.0, 0.0));
    face_left(&mut world, victim);
    sync_colliders(&mut world);

    let report = fire_shot(&mut world, shot_right(1.0));

    assert_eq!(report.outcomes(), vec![ShotOutcome::Dodged { victim }, ShotOutcome::Missed]);
    assert!(report.segments[1].origin.x > 400.0);

    // max(1.0, 0.4) / 1.5, ближе начала кривой дистанции делитель = 1
    let dodge = world.get::<DodgeMeter>(victim).unwrap();
    assert!((dodge.current - (1.0 - 1.0 / 1.5)).abs() < 1e-5);

    let animation = world.get::<AnimationState>(victim).unwrap();
    assert!(animation.is_playing_group(AnimationGroup::Dodge));
    assert!(report.animations.iter().any(|a| a.entity == victim && a.group == AnimationGroup::Dodge));
}

#[test]
fn test_dodge_from_behind_costs_more() {
    let mut world = World::new();
    let victim = spawn_fighter(&mut world, 2, Vec2::new(500.0, 0.0));
    sync_colliders(&mut world);

    fire_shot(&mut world, shot_right(0.3));

    let expected = 1.0 - 0.4 / 1.5 * 1.2;
    assert!((world.get::<DodgeMeter>(victim).unwrap().current - expected).abs() < 1e-5);
}

#[test]
fn test_point_blank_dodge_is_ruinous() {
    let mut world = World::new();
    let victim = spawn_fighter(&mut world, 2, Vec2::new(150.0, 0.0));
    face_left(&mut world, victim);
    sync_colliders(&mut world);

    let report = fire_shot(&mut world, shot_right(1.0));

    assert!(matches!(report.outcomes()[0], ShotOutcome::Damaged { .. }));
    assert_eq!(world.get::<DodgeMeter>(victim).unwrap().current, 0.0);
}

#[test]
fn test_mid_dodge_victim_is_passed_through() {
    let mut world = World::new();
    let victim = spawn_fighter(&mut world, 2, Vec2::new(500.0, 0.0));
    world.get_mut::<AnimationState>(victim).unwrap().play(AnimationGroup::Dodge, 1.0);
    sync_colliders(&mut world);

    let report = fire_shot(&mut world, shot_right(1.0));

    assert_eq!(report.outcomes()[0], ShotOutcome::Dodged { victim });
    assert!((world.get::<DodgeMeter>(victim).unwrap().current - 0.995).abs() < 1e-5);
}

#[test]
fn test_god_mode_aborts_shot_at_player() {
    let mut world = World::new();
    world.insert_resource(CombatWorldState { god_mode: true, ..Default::default() });
    let player = spawn_fighter(&mut world, 1, Vec2::new(500.0, 0.0));
    world.entity_mut(player).insert(Player);
    sync_colliders(&mut world);

    let report = fire_shot(&mut world, shot_right(5.0));

    assert_eq!(report.outcomes(), vec![ShotOutcome::Aborted]);
    assert!(world.get::<Vitality>(player).unwrap().is_alive());
}

#[test]
fn test_corpse_turns_weak_bullet_cosmetic() {
    let mut world = World::new();
    let corpse = spawn_fighter(&mut world, 2, Vec2::new(500.0, 0.0));
    world.get_mut::<Vitality>(corpse).unwrap().alive = false;
    let living = spawn_fighter(&mut world, 2, Vec2::new(1000.0, 0.0));
    sync_colliders(&mut world);

    let report = fire_shot(&mut world, shot_right(0.1));
    let outcomes = report.outcomes();

    assert!(matches!(outcomes[0], ShotOutcome::Damaged { victim, .. } if victim == corpse));
    assert!(report.segments[1].cosmetic);

    let corpse_body = world.get::<BodyParts>(corpse).unwrap().body;
    assert!(!world.get::<WoundMarks>(corpse_body).unwrap().wounds.is_empty());

    // Живой: только косметическая рана, ни урона, ни dodge
    let living_body = world.get::<BodyParts>(living).unwrap().body;
    assert!(outcomes.contains(&ShotOutcome::Cosmetic { part: living_body }));
    assert!(!world.get::<WoundMarks>(living_body).unwrap().wounds.is_empty());
    assert_eq!(world.get::<Vitality>(living).unwrap().body.current, 1.0);
    assert_eq!(world.get::<DodgeMeter>(living).unwrap().current, 1.0);
    assert!(report.deaths.is_empty());
}

#[test]
fn test_bullet_exits_same_part() {
    let mut world = World::new();
    let corpse = spawn_fighter(&mut world, 2, Vec2::new(500.0, 0.0));
    world.get_mut::<Vitality>(corpse).unwrap().alive = false;
    sync_colliders(&mut world);

    let report = fire_shot(&mut world, shot_right(0.1));
    let body = world.get::<BodyParts>(corpse).unwrap().body;

    assert_eq!(report.outcomes()[1], ShotOutcome::ExitWound { part: body });
    assert!((report.segments[2].origin.x - 570.0).abs() < 1e-1);
    // Входное + выходное
    assert!(world.get::<WoundMarks>(body).unwrap().wounds.len() >= 2);
}

#[test]
fn test_lethal_hit_emits_death_and_kill_stat() {
    let mut world = World::new();
    world.init_resource::<crate::player::PlayerKillStats>();
    let shooter = spawn_fighter(&mut world, 1, Vec2::ZERO);
    world.entity_mut(shooter).insert(Player);
    let victim = spawn_fighter(&mut world, 2, Vec2::new(500.0, 0.0));
    world.get_mut::<DodgeMeter>(victim).unwrap().current = 0.0;
    sync_colliders(&mut world);

    let parts = world.get::<BodyParts>(shooter).unwrap().as_vec();
    let shot = ShotParams { origin_character: Some(shooter), ignore: parts, ..shot_right(2.0) };
    let report = fire_shot(&mut world, shot);

    assert!(!world.get::<Vitality>(victim).unwrap().is_alive());
    assert_eq!(report.deaths.len(), 1);
    assert_eq!(report.deaths[0].killer, Some(shooter));
    assert_eq!(world.resource::<crate::player::PlayerKillStats>().kills, 1);
    assert!(world.get::<AnimationState>(victim).unwrap().is_playing_group(AnimationGroup::Death));
}

#[test]
fn test_wall_stops_bullet_and_leaves_decal() {
    let mut world = World::new();
    let wall = world.spawn_empty().id();
    let zone = world.spawn_empty().id();
    let victim = spawn_fighter(&mut world, 2, Vec2::new(500.0, 0.0));
    sync_colliders(&mut world);
    {
        let mut collision = world.resource_mut::<CollisionWorld>();
        collision.add_static(
            wall,
            ColliderShape::Segment { a: Vec2::new(300.0, -1000.0), b: Vec2::new(300.0, 1000.0) },
            LAYER_BLOCK_BULLETS,
        );
        collision.add_static(
            zone,
            ColliderShape::Rect { min: Vec2::new(0.0, -1000.0), max: Vec2::new(1000.0, 1000.0) },
            LAYER_DECAL_ZONE,
        );
    }

    let report = fire_shot(&mut world, shot_right(1.0));

    assert_eq!(report.outcomes(), vec![ShotOutcome::Blocked { entity: wall }]);
    assert!(report.fx.iter().any(|fx| matches!(fx, CombatFx::BulletHole { size, .. } if *size == 50.0)));
    assert_eq!(world.get::<DodgeMeter>(victim).unwrap().current, 1.0);
}

/// Мир, в котором каждый луч попадает в одну и ту же часть через 10 пикселей
struct EndlessCorridor {
    part: Entity,
}

impl WorldQuery for EndlessCorridor {
    fn raycast(&self, origin: Vec2, direction: Vec2, _mask: u32, _ignore: &[Entity]) -> Option<RayHit> {
        Some(RayHit {
            entity: self.part,
            position: origin + direction * 10.0,
            normal: -direction,
            distance: 10.0,
            layers: faction_layer(2),
        })
    }

    fn query_point(&self, _point: Vec2, _mask: u32, _ignore: &[Entity]) -> usize {
        0
    }

    fn first_containing(&self, _point: Vec2, _mask: u32, _ignore: &[Entity]) -> Option<Entity> {
        None
    }
}

#[test]
fn test_recursion_capped_at_eight_segments() {
    let mut world = World::new();
    let corpse = spawn_fighter(&mut world, 2, Vec2::new(500.0, 0.0));
    world.get_mut::<Vitality>(corpse).unwrap().alive = false;
    let part = world.get::<BodyParts>(corpse).unwrap().body;

    let report = fire_shot_with(&mut world, &EndlessCorridor { part }, shot_right(50.0));

    assert_eq!(report.segments.len(), crate::config::MAX_SHOT_ITERATIONS as usize);
    assert_eq!(report.segments.last().unwrap().iteration, crate::config::MAX_SHOT_ITERATIONS - 1);
}

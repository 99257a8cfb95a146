//! Tests for decision pass и saturation.

use bevy::ecs::system::RunSystemOnce;
use bevy::prelude::*;

use super::*;
use crate::ai::{AccurateShot, AiController};
use crate::combat::{AnimationRequest, CombatFx, EquippedWeapon, MeleeAttackRequested, Weapon, WorldItem};
use crate::components::*;
use crate::config::{CombatConVars, LevelSettings};
use crate::physics::CollisionWorld;
use crate::DeterministicRng;

fn combat_world() -> World {
    let mut world = World::new();
    world.insert_resource(CombatWorldState { elapsed: 10.0, delta: 1.0 / 60.0, ..Default::default() });
    world.init_resource::<CombatConVars>();
    world.init_resource::<LevelSettings>();
    world.init_resource::<CollisionWorld>();
    world.insert_resource(DeterministicRng::new(7));
    world.init_resource::<Events<MeleeAttackRequested>>();
    world.init_resource::<Events<AnimationRequest>>();
    world.init_resource::<Events<CombatFx>>();
    world
}

fn run_pass(world: &mut World) {
    world.run_system_once(ai_decision_pass).unwrap();
}

fn ai(world: &World, entity: Entity) -> &AiController {
    world.get::<AiController>(entity).unwrap()
}

fn hunting(world: &mut World, hunter: Entity, target: Entity) {
    let mut controller = world.get_mut::<AiController>(hunter).unwrap();
    controller.kill_target = Some(target);
    controller.has_kill_target = true;
}

fn accurate_shots(world: &mut World) -> usize {
    world.query::<&AccurateShot>().iter(world).count()
}

#[test]
fn test_acquires_nearest_enemy_and_aims_at_head() {
    let mut world = combat_world();
    let hunter = spawn_combatant_now(&mut world, CombatantSpawn::ai(2, Vec2::ZERO, 1.0));
    let near = spawn_combatant_now(&mut world, CombatantSpawn::dummy(1, Vec2::new(800.0, 0.0)));
    spawn_combatant_now(&mut world, CombatantSpawn::dummy(1, Vec2::new(-1500.0, 0.0)));
    spawn_combatant_now(&mut world, CombatantSpawn::dummy(2, Vec2::new(100.0, 0.0)));

    run_pass(&mut world);

    let controller = ai(&world, hunter);
    assert_eq!(controller.kill_target, Some(near));
    assert!(controller.has_kill_target);
    // Без оружия прицел без шума
    assert_eq!(controller.aiming_position, Vec2::new(800.0, 180.0));
}

#[test]
fn test_dead_target_reference_survives() {
    let mut world = combat_world();
    let hunter = spawn_combatant_now(&mut world, CombatantSpawn::ai(2, Vec2::ZERO, 1.0));
    let victim = spawn_combatant_now(&mut world, CombatantSpawn::dummy(1, Vec2::new(800.0, 0.0)));
    hunting(&mut world, hunter, victim);
    world.get_mut::<Vitality>(victim).unwrap().alive = false;

    run_pass(&mut world);

    let controller = ai(&world, hunter);
    assert!(!controller.has_kill_target);
    assert_eq!(controller.kill_target, Some(victim));
}

#[test]
fn test_docile_drops_target_flag() {
    let mut world = combat_world();
    let spawn = CombatantSpawn { control: Control::Ai { seed: 1.0, docile: true }, ..CombatantSpawn::ai(2, Vec2::ZERO, 1.0) };
    let hunter = spawn_combatant_now(&mut world, spawn);
    let victim = spawn_combatant_now(&mut world, CombatantSpawn::dummy(1, Vec2::new(800.0, 0.0)));
    hunting(&mut world, hunter, victim);

    run_pass(&mut world);

    let controller = ai(&world, hunter);
    assert!(!controller.has_kill_target);
    assert_eq!(controller.kill_target, Some(victim));
}

#[test]
fn test_panicked_shooter_never_starts_accurate_shot() {
    let mut world = combat_world();
    let shooter = spawn_combatant_now(&mut world, CombatantSpawn::ai(2, Vec2::ZERO, 1.0).with_weapon(Weapon::pistol()));
    let victim = spawn_combatant_now(&mut world, CombatantSpawn::dummy(1, Vec2::new(1200.0, 0.0)));
    hunting(&mut world, shooter, victim);
    {
        let mut controller = world.get_mut::<AiController>(shooter).unwrap();
        controller.panic = 0.2;
        controller.intents.accurate_shot.value = true;
    }

    run_pass(&mut world);

    assert_eq!(accurate_shots(&mut world), 0);
    assert!(!ai(&world, shooter).is_doing_accurate_shot);
}

#[test]
fn test_calm_shooter_starts_accurate_shot() {
    let mut world = combat_world();
    let shooter = spawn_combatant_now(&mut world, CombatantSpawn::ai(2, Vec2::ZERO, 1.0).with_weapon(Weapon::pistol()));
    let victim = spawn_combatant_now(&mut world, CombatantSpawn::dummy(1, Vec2::new(1200.0, 0.0)));
    hunting(&mut world, shooter, victim);
    world.get_mut::<AiController>(shooter).unwrap().intents.accurate_shot.value = true;

    run_pass(&mut world);

    assert_eq!(accurate_shots(&mut world), 1);
    assert!(ai(&world, shooter).is_doing_accurate_shot);
    assert!(ai(&world, shooter).intents.iron_sight.value);
    assert!(world.get::<CharacterFlags>(shooter).unwrap().attacks_cannot_be_auto_dodged);
    assert_eq!(world.resource::<CombatWorldState>().last_accurate_shot_time, 10.0);
}

#[test]
fn test_accurate_shot_failure_only_skips_that_fighter() {
    let mut world = combat_world();
    let shooter = spawn_combatant_now(&mut world, CombatantSpawn::ai(2, Vec2::ZERO, 1.0).with_weapon(Weapon::pistol()));
    let brawler = spawn_combatant_now(&mut world, CombatantSpawn::ai(2, Vec2::new(-300.0, 0.0), 2.0));
    let corpse = spawn_combatant_now(&mut world, CombatantSpawn::dummy(1, Vec2::new(900.0, 0.0)));
    let survivor = spawn_combatant_now(&mut world, CombatantSpawn::dummy(1, Vec2::new(-2000.0, 0.0)));

    hunting(&mut world, shooter, corpse);
    world.get_mut::<AiController>(shooter).unwrap().intents.accurate_shot.value = true;
    // Цель умерла в том же тике, когда AI решил стрелять
    world.get_mut::<Vitality>(corpse).unwrap().alive = false;

    run_pass(&mut world);

    assert_eq!(accurate_shots(&mut world), 0);
    // Стрелок прерван до сброса намерений
    assert!(ai(&world, shooter).intents.accurate_shot.value);
    assert!(!ai(&world, shooter).is_doing_accurate_shot);
    // Остальные обработаны как обычно
    assert_eq!(ai(&world, brawler).kill_target, Some(survivor));
}

#[test]
fn test_empty_weapon_is_dropped() {
    let mut world = combat_world();
    let mut pistol = Weapon::pistol();
    pistol.rounds_left = 0;
    let shooter = spawn_combatant_now(&mut world, CombatantSpawn::ai(2, Vec2::ZERO, 1.0).with_weapon(pistol));
    let weapon = world.get::<EquippedWeapon>(shooter).unwrap().weapon.unwrap();

    run_pass(&mut world);

    assert!(world.get::<EquippedWeapon>(shooter).unwrap().weapon.is_none());
    let item = world.get::<WorldItem>(weapon).unwrap();
    assert!(!item.is_wielded());
    assert_eq!(item.dropped_for, Some(0.0));
}

#[test]
fn test_semi_auto_fires_only_on_trigger_edge() {
    let mut world = combat_world();
    let shooter = spawn_combatant_now(&mut world, CombatantSpawn::ai(2, Vec2::ZERO, 1.0).with_weapon(Weapon::pistol()));
    let victim = spawn_combatant_now(&mut world, CombatantSpawn::dummy(1, Vec2::new(1200.0, 0.0)));
    let weapon = world.get::<EquippedWeapon>(shooter).unwrap().weapon.unwrap();
    hunting(&mut world, shooter, victim);

    // Курок зажат с прошлого тика: полуавтомат молчит
    {
        let mut controller = world.get_mut::<AiController>(shooter).unwrap();
        controller.intents.shoot = crate::ai::BoolPrev { value: true, previous: true };
    }
    run_pass(&mut world);
    assert!(!world.get::<Weapon>(weapon).unwrap().is_firing);

    {
        let mut controller = world.get_mut::<AiController>(shooter).unwrap();
        controller.intents.shoot = crate::ai::BoolPrev { value: true, previous: false };
    }
    run_pass(&mut world);
    assert!(world.get::<Weapon>(weapon).unwrap().is_firing);
}

#[test]
fn test_unarmed_swing_requests_melee() {
    let mut world = combat_world();
    let brawler = spawn_combatant_now(&mut world, CombatantSpawn::ai(2, Vec2::ZERO, 1.0));
    let victim = spawn_combatant_now(&mut world, CombatantSpawn::dummy(1, Vec2::new(300.0, 0.0)));
    hunting(&mut world, brawler, victim);
    world.get_mut::<AiController>(brawler).unwrap().intents.shoot.value = true;

    run_pass(&mut world);

    let requests: Vec<MeleeAttackRequested> = world
        .resource::<Events<MeleeAttackRequested>>()
        .iter_current_update_events()
        .copied()
        .collect();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].attacker, brawler);
    assert_eq!(requests[0].weapon, None);
    assert!(world.get::<AnimationState>(brawler).unwrap().is_playing_group(AnimationGroup::Melee));
}

fn iron_sight_with(weapon: Weapon) -> CharacterBody {
    let mut world = combat_world();
    let fighter = spawn_combatant_now(&mut world, CombatantSpawn::ai(2, Vec2::ZERO, 1.0).with_weapon(weapon));
    let victim = spawn_combatant_now(&mut world, CombatantSpawn::dummy(1, Vec2::new(600.0, 0.0)));
    hunting(&mut world, fighter, victim);
    world.get_mut::<AiController>(fighter).unwrap().intents.iron_sight.value = true;

    run_pass(&mut world);
    world.get::<CharacterBody>(fighter).unwrap().clone()
}

#[test]
fn test_iron_sight_means_block_only_for_melee() {
    let sword = iron_sight_with(Weapon::sword());
    assert!(sword.is_iron_sighting);
    assert!(sword.is_melee_blocking);
    assert!(sword.melee_block_progress > 0.0);

    let pistol = iron_sight_with(Weapon::pistol());
    assert!(pistol.is_iron_sighting);
    assert!(!pistol.is_melee_blocking);
    assert_eq!(pistol.melee_block_progress, 0.0);
}

#[test]
fn test_walking_backwards_is_half_speed() {
    let mut world = combat_world();
    let walker = spawn_combatant_now(&mut world, CombatantSpawn::ai(2, Vec2::ZERO, 1.0));
    {
        let mut controller = world.get_mut::<AiController>(walker).unwrap();
        controller.aiming_position = Vec2::new(-500.0, 0.0);
        controller.intents.walk_right.value = true;
    }

    run_pass(&mut world);

    let body = world.get::<CharacterBody>(walker).unwrap();
    assert!(body.is_flipped);
    assert_eq!(body.walk_acceleration, Vec2::new(body.top_walk_speed * 0.5, 0.0));
}

#[test]
fn test_dead_controller_ragdolls_once() {
    let mut world = combat_world();
    let fighter = spawn_combatant_now(&mut world, CombatantSpawn::ai(2, Vec2::ZERO, 1.0));
    world.get_mut::<Vitality>(fighter).unwrap().alive = false;

    run_pass(&mut world);
    run_pass(&mut world);

    assert!(world.get::<AnimationState>(fighter).unwrap().has_been_ragdolled);
    let deaths = world
        .resource::<Events<AnimationRequest>>()
        .iter_current_update_events()
        .filter(|r| r.entity == fighter && r.group == AnimationGroup::Death)
        .count();
    assert_eq!(deaths, 1);
}

#[test]
fn test_saturation_limits_attackers() {
    let mut world = combat_world();
    world.insert_resource(LevelSettings { max_simultaneous_attackers: 2, ..Default::default() });
    let victim = spawn_combatant_now(&mut world, CombatantSpawn::dummy(1, Vec2::ZERO));
    let hunters: Vec<Entity> = (0..3)
        .map(|i| spawn_combatant_now(&mut world, CombatantSpawn::ai(2, Vec2::new(500.0 + i as f32, 0.0), i as f32)))
        .collect();
    for hunter in &hunters {
        hunting(&mut world, *hunter, victim);
    }

    world.run_system_once(account_attacker_saturation).unwrap();

    let busy = hunters.iter().filter(|h| ai(&world, **h).too_busy_to_attack).count();
    assert_eq!(busy, 1);
    assert_eq!(world.get::<Engagement>(victim).unwrap().attacker_count, 2);
}

#[test]
fn test_dead_attacker_does_not_take_a_slot() {
    let mut world = combat_world();
    world.insert_resource(LevelSettings { max_simultaneous_attackers: 1, ..Default::default() });
    let victim = spawn_combatant_now(&mut world, CombatantSpawn::dummy(1, Vec2::ZERO));
    let dead = spawn_combatant_now(&mut world, CombatantSpawn::ai(2, Vec2::new(400.0, 0.0), 1.0));
    let alive = spawn_combatant_now(&mut world, CombatantSpawn::ai(2, Vec2::new(600.0, 0.0), 2.0));
    hunting(&mut world, dead, victim);
    hunting(&mut world, alive, victim);
    world.get_mut::<Vitality>(dead).unwrap().alive = false;

    world.run_system_once(account_attacker_saturation).unwrap();

    assert!(!ai(&world, alive).too_busy_to_attack);
    assert_eq!(world.get::<Engagement>(victim).unwrap().attacker_count, 1);
}

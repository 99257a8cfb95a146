//! Headless демо SKIRMISH
//!
//! Игрок с мечом против нескольких стрелков: прогоняем 20 секунд боя
//! и печатаем, кто выжил.

use bevy::prelude::*;
use skirmish_simulation::ai::spawn_combatant_now;
use skirmish_simulation::combat::Weapon;
use skirmish_simulation::physics::{ColliderShape, LAYER_BLOCK_BULLETS, LAYER_DECAL_ZONE};
use skirmish_simulation::{
    create_headless_app, end_scene, step_fixed, CollisionWorld, CombatConVars, CombatStats, CombatantSpawn,
    PlayerKillStats, Vitality,
};

const CONVARS_PATH: &str = "skirmish.toml";
const DEMO_TICKS: usize = 20 * 60;

fn main() {
    let seed = 42;
    println!("Starting SKIRMISH headless simulation (seed: {})", seed);

    let mut app = create_headless_app(seed);
    let world = app.world_mut();
    world.insert_resource(CombatConVars::load_or_default(CONVARS_PATH));

    // Стена справа: пули оставляют на ней дырки
    let wall = world.spawn_empty().id();
    let mut collision = world.resource_mut::<CollisionWorld>();
    collision.add_static(
        wall,
        ColliderShape::Segment { a: Vec2::new(2800.0, -100.0), b: Vec2::new(2800.0, 1000.0) },
        LAYER_BLOCK_BULLETS,
    );
    collision.add_static(
        wall,
        ColliderShape::Rect { min: Vec2::new(2700.0, -100.0), max: Vec2::new(2900.0, 1000.0) },
        LAYER_DECAL_ZONE,
    );

    let player_stats = CombatStats { can_deflect: true, dodge_ability: 2.0, ..Default::default() };
    spawn_combatant_now(world, CombatantSpawn::player(1, Vec2::ZERO).with_weapon(Weapon::sword()).with_stats(player_stats));

    for (i, x) in [1200.0, 1600.0, -1400.0].into_iter().enumerate() {
        let shooter_stats = CombatStats { accurate_shot_chance: 0.6, ..Default::default() };
        let mut spawn = CombatantSpawn::ai(2, Vec2::new(x, 0.0), i as f32 * 17.3)
            .with_weapon(Weapon::pistol())
            .with_stats(shooter_stats);
        if x > 0.0 {
            spawn = spawn.facing_left();
        }
        spawn_combatant_now(world, spawn);
    }
    spawn_combatant_now(world, CombatantSpawn::ai(2, Vec2::new(-600.0, 0.0), 99.0));

    for second in 0..DEMO_TICKS / 60 {
        step_fixed(&mut app, 60);

        let world = app.world_mut();
        let alive = world.query::<&Vitality>().iter(world).filter(|v| v.is_alive()).count();
        println!("t={:>2}s: {} бойцов живы", second + 1, alive);
    }

    let stats = app.world().resource::<PlayerKillStats>();
    println!("Simulation complete! kills: {}, player shots: {}", stats.kills, stats.shots_fired);

    end_scene(app.world_mut());
}

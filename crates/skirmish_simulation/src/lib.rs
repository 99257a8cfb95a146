//! SKIRMISH Simulation Core
//!
//! Боевой "мозг" 2D экшена на Bevy 0.16 (headless ECS):
//! - ai: Tactical Decision Loop (цели, намерения, accurate shot, подбор оружия)
//! - combat: Ballistic Resolution Pipeline (dodge / deflect / урон / exit wounds)
//!
//! Рендер, звук, анимации и ввод игрока живут снаружи и общаются с ядром
//! через компоненты (`CharacterBody`, `AnimationState`) и события (`CombatFx`, `AnimationRequest`).

use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// Публичные модули
pub mod ai;
pub mod combat;
pub mod combat_math;
pub mod components;
pub mod config;
pub mod logger;
pub mod physics;
pub mod player;

// Re-export базовых типов для удобства
pub use ai::{AIPlugin, AiController, CombatantSpawn};
pub use combat::{fire_shot, CombatPlugin, CombatSet, ShotOutcome, ShotParams, ShotReport};
pub use components::*;
pub use config::{CombatConVars, ConfigError, LevelSettings};
pub use logger::{init_logger, log, log_error, log_info, log_warning, set_log_level, set_logger, LogLevel, LogPrinter};
pub use physics::{CollisionWorld, WorldQuery};
pub use player::{Player, PlayerKillStats};

/// Fixed timestep симуляции
pub const SIMULATION_HZ: f64 = 60.0;

/// Главный plugin симуляции (объединяет все подсистемы)
pub struct SimulationPlugin {
    pub seed: u64,
}

impl Default for SimulationPlugin {
    fn default() -> Self {
        Self { seed: 42 }
    }
}

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app
            // Fixed timestep 60Hz: combat delta считается от timestep, не от реального времени
            .insert_resource(Time::<Fixed>::from_hz(SIMULATION_HZ))
            .insert_resource(DeterministicRng::new(self.seed))
            .add_plugins((CombatPlugin, AIPlugin));
    }
}

/// Детерминистичный RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self { rng: ChaCha8Rng::seed_from_u64(seed), seed }
    }
}

/// Minimal Bevy App со всей симуляцией (без рендера)
pub fn create_headless_app(seed: u64) -> App {
    init_logger();

    let mut app = App::new();
    app.add_plugins(MinimalPlugins).add_plugins(SimulationPlugin { seed });
    app
}

/// Прогнать `ticks` fixed тиков напрямую (без ожидания реального времени)
pub fn step_fixed(app: &mut App, ticks: usize) {
    for _ in 0..ticks {
        app.world_mut().run_schedule(FixedUpdate);
    }
}

/// Конец сцены: бойцы, оружие и accurate shot'ы удаляются, коллизии
/// сбрасываются, висящее замедление времени снимается.
pub fn end_scene(world: &mut World) {
    let doomed: Vec<Entity> = world
        .query_filtered::<Entity, Or<(With<Actor>, With<BodyPart>, With<combat::Weapon>, With<ai::AccurateShot>)>>()
        .iter(world)
        .collect();
    let count = doomed.len();
    for entity in doomed {
        world.despawn(entity);
    }

    world.insert_resource(CollisionWorld::default());
    world.resource_mut::<CombatWorldState>().teardown();
    log(&format!("🧹 Сцена закрыта, удалено {} entity", count));
}

/// Snapshot компонента `T` у всех entity (для сравнения детерминизма)
///
/// Entity сортируются по index, компонент пишется через Debug.
pub fn world_snapshot<T>(world: &mut World) -> Vec<u8>
where
    T: Component + std::fmt::Debug,
{
    let mut query = world.query::<(Entity, &T)>();
    let mut entries: Vec<_> = query.iter(world).collect();
    entries.sort_by_key(|(entity, _)| entity.index());

    let mut snapshot = Vec::new();
    for (entity, component) in entries {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.extend_from_slice(format!("{:?}", component).as_bytes());
    }
    snapshot
}

/// Snapshot всего, что меняет бой: позиции, здоровье, dodge, патроны
pub fn combat_snapshot(world: &mut World) -> Vec<u8> {
    let mut snapshot = world_snapshot::<CharacterBody>(world);
    snapshot.extend(world_snapshot::<Vitality>(world));
    snapshot.extend(world_snapshot::<DodgeMeter>(world));
    snapshot.extend(world_snapshot::<combat::Weapon>(world));
    snapshot.extend(world_snapshot::<AiController>(world));
    snapshot
}

//! Spawn/despawn бойцов (части тела, оружие в руке, AI/Player).

use bevy::prelude::*;
use rand::Rng;

use crate::ai::AiController;
use crate::combat::{EquippedWeapon, Weapon, WorldItem};
use crate::components::{
    Actor, Armour, BodyPart, BodyPartKind, BodyParts, CharacterBody, CharacterFlags, CombatStats, CombatWorldState,
    DodgeMeter, HandPose, Vitality,
};
use crate::config::LevelSettings;
use crate::player::Player;
use crate::DeterministicRng;

/// Кто управляет бойцом
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Control {
    Player,
    Ai { seed: f32, docile: bool },
    /// Манекен: ни игрок, ни AI
    Dummy,
}

/// Описание нового бойца
#[derive(Debug, Clone)]
pub struct CombatantSpawn {
    pub faction: u64,
    pub position: Vec2,
    pub flipped: bool,
    pub control: Control,
    pub stats: CombatStats,
    pub armour: Armour,
    pub flags: CharacterFlags,
    pub weapon: Option<Weapon>,
}

impl CombatantSpawn {
    pub fn ai(faction: u64, position: Vec2, seed: f32) -> Self {
        Self::new(faction, position, Control::Ai { seed, docile: false })
    }

    pub fn player(faction: u64, position: Vec2) -> Self {
        Self::new(faction, position, Control::Player)
    }

    pub fn dummy(faction: u64, position: Vec2) -> Self {
        Self::new(faction, position, Control::Dummy)
    }

    fn new(faction: u64, position: Vec2, control: Control) -> Self {
        Self {
            faction,
            position,
            flipped: false,
            control,
            stats: CombatStats::default(),
            armour: Armour::default(),
            flags: CharacterFlags::default(),
            weapon: None,
        }
    }

    pub fn with_weapon(mut self, weapon: Weapon) -> Self {
        self.weapon = Some(weapon);
        self
    }

    pub fn with_stats(mut self, stats: CombatStats) -> Self {
        self.stats = stats;
        self
    }

    pub fn with_armour(mut self, armour: Armour) -> Self {
        self.armour = armour;
        self
    }

    pub fn facing_left(mut self) -> Self {
        self.flipped = true;
        self
    }
}

/// Создать бойца со всеми частями тела (команды применятся на ближайшем sync point)
pub fn spawn_combatant(commands: &mut Commands, spawn: CombatantSpawn) -> Entity {
    let mut body = CharacterBody::at(spawn.position);
    body.scale = spawn.stats.scale;
    body.is_flipped = spawn.flipped;
    body.hand_pose = match &spawn.weapon {
        Some(weapon) if weapon.hold_points >= 2 => HandPose::TwoHands,
        Some(_) => HandPose::OneHand,
        None => HandPose::None,
    };
    let look_ahead = body.head_position() + Vec2::new(body.flip_scaling() * 1000.0, 0.0);

    let entity = commands
        .spawn((
            Actor::new(spawn.faction),
            body,
            DodgeMeter::new(spawn.stats.dodge_ability),
            spawn.stats,
            spawn.armour,
            spawn.flags,
        ))
        .id();

    let head = commands.spawn(BodyPart { owner: entity, kind: BodyPartKind::Head }).id();
    let torso = commands.spawn(BodyPart { owner: entity, kind: BodyPartKind::Body }).id();
    commands.entity(entity).insert(BodyParts { head, body: torso });

    match spawn.control {
        Control::Player => {
            commands.entity(entity).insert(Player);
        }
        Control::Ai { seed, docile } => {
            let mut ai = if docile { AiController::docile(seed) } else { AiController::new(seed) };
            ai.aiming_position = look_ahead;
            commands.entity(entity).insert(ai);
        }
        Control::Dummy => {}
    }

    if let Some(weapon) = spawn.weapon {
        let item = WorldItem { position: spawn.position, wielder: Some(entity), ..Default::default() };
        let weapon_entity = commands.spawn((weapon, item)).id();
        commands.entity(entity).insert(EquippedWeapon { weapon: Some(weapon_entity) });
    }

    crate::logger::log(&format!(
        "✨ Spawn {:?}: фракция {}, {:?} в ({:.0}, {:.0})",
        entity, spawn.faction, spawn.control, spawn.position.x, spawn.position.y
    ));
    entity
}

/// То же, но сразу в World (тесты, setup сцены)
pub fn spawn_combatant_now(world: &mut World, spawn: CombatantSpawn) -> Entity {
    let entity = spawn_combatant(&mut world.commands(), spawn);
    world.flush();
    entity
}

/// Убрать бойца вместе с частями тела. Оружие из руки упадёт само
/// (`sync_wielded_weapons` видит, что владельца больше нет).
pub fn despawn_combatant(commands: &mut Commands, entity: Entity, parts: Option<&BodyParts>) {
    if let Some(parts) = parts {
        commands.entity(parts.head).despawn();
        commands.entity(parts.body).despawn();
    }
    commands.entity(entity).despawn();
    crate::logger::log(&format!("🗑️ Despawn {:?}", entity));
}

/// System: dev-режим auto spawn (враги выходят с краёв пола)
pub fn auto_spawn_system(
    mut commands: Commands,
    state: Res<CombatWorldState>,
    level: Res<LevelSettings>,
    mut rng: ResMut<DeterministicRng>,
    mut timer: Local<f32>,
    fighters: Query<(&Actor, &Vitality), With<AiController>>,
) {
    if !state.auto_spawn {
        *timer = 0.0;
        return;
    }

    *timer += state.delta;
    if *timer < level.auto_spawn_interval {
        return;
    }

    let alive = fighters
        .iter()
        .filter(|(actor, vitality)| actor.faction_id == level.auto_spawn_faction && vitality.is_alive())
        .count();
    if alive >= level.auto_spawn_max_alive as usize {
        return;
    }
    *timer = 0.0;

    let from_left = rng.rng.gen_bool(0.5);
    let x = if from_left { level.floor_min_x } else { level.floor_max_x };
    let seed = rng.rng.gen_range(0.0..1000.0);
    let weapon = match rng.rng.gen_range(0..4) {
        0 => Some(Weapon::pistol()),
        1 => Some(Weapon::sword()),
        2 => Some(Weapon::shotgun()),
        _ => None,
    };

    let mut spawn = CombatantSpawn::ai(level.auto_spawn_faction, Vec2::new(x, 0.0), seed);
    spawn.flipped = !from_left;
    spawn.weapon = weapon;
    spawn_combatant(&mut commands, spawn);
}

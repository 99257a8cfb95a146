//! ECS Components для бойцов
//!
//! Организация по доменам:
//! - actor: фракция, здоровье частей тела, dodge meter, attacker count
//! - character: статы, флаги, позиционирование, броня
//! - animation: ограничения от внешней анимации (AnimationConstraint)
//! - body: части тела как коллайдеры, раны, отдача
//! - world: CombatWorldState (часы, kill-switch'и, slow-motion)

pub mod actor;
pub mod animation;
pub mod body;
pub mod character;
pub mod world;

pub use actor::*;
pub use animation::*;
pub use body::*;
pub use character::*;
pub use world::*;

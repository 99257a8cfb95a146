//! World Query Surface
//!
//! Ballistics и AI спрашивают мир только через trait `WorldQuery`:
//! "ближайшее попадание луча" и "сколько коллайдеров содержат точку".
//! `CollisionWorld` — in-process реализация на окружностях/отрезках/прямоугольниках,
//! которую держит headless симуляция. Движок с настоящей физикой подставляет свою.

pub mod collision_world;
pub mod layers;


use bevy::prelude::*;

pub use collision_world::{sync_body_colliders, Collider, ColliderShape, CollisionWorld};
pub use layers::*;

/// Дальность "бесконечного" луча
pub const RAY_MAX_DISTANCE: f32 = 100_000.0;

/// Результат raycast'а
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub entity: Entity,
    pub position: Vec2,
    pub normal: Vec2,
    pub distance: f32,
    /// Слои коллайдера, в который попали
    pub layers: u32,
}

/// Запросы к коллизиям мира
pub trait WorldQuery {
    /// Ближайшее попадание луча по коллайдерам из `mask`, кроме `ignore`
    fn raycast(&self, origin: Vec2, direction: Vec2, mask: u32, ignore: &[Entity]) -> Option<RayHit>;

    /// Сколько коллайдеров из `mask` (кроме `ignore`) содержат точку
    fn query_point(&self, point: Vec2, mask: u32, ignore: &[Entity]) -> usize;

    /// Первый коллайдер из `mask`, содержащий точку
    fn first_containing(&self, point: Vec2, mask: u32, ignore: &[Entity]) -> Option<Entity>;
}

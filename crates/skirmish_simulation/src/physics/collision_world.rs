//! In-process коллизии: окружности (части тела), отрезки (стены), прямоугольники (зоны).

use bevy::prelude::*;

use super::{faction_layer, RayHit, WorldQuery, RAY_MAX_DISTANCE};
use crate::components::{Actor, BodyPart, BodyPartKind, CharacterBody};

/// Точка считается "внутри" окружности с этим допуском (луч из точки на
/// поверхности должен выходить наружу, а не попадать в ту же часть тела)
const SURFACE_EPSILON: f32 = 0.01;

/// Луч, уже выходящий из окружности на её поверхности, её не задевает
const EXIT_MIN_DISTANCE: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColliderShape {
    Circle { center: Vec2, radius: f32 },
    Segment { a: Vec2, b: Vec2 },
    Rect { min: Vec2, max: Vec2 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Collider {
    pub entity: Entity,
    pub shape: ColliderShape,
    pub layers: u32,
}

/// Коллизии уровня: статика (стены, зоны) + тела бойцов (пересобираются каждый тик)
#[derive(Resource, Debug, Clone, Default)]
pub struct CollisionWorld {
    statics: Vec<Collider>,
    bodies: Vec<Collider>,
}

impl CollisionWorld {
    pub fn add_static(&mut self, entity: Entity, shape: ColliderShape, layers: u32) {
        self.statics.push(Collider { entity, shape, layers });
    }

    pub fn remove_static(&mut self, entity: Entity) {
        self.statics.retain(|c| c.entity != entity);
    }

    pub fn set_bodies(&mut self, bodies: Vec<Collider>) {
        self.bodies = bodies;
    }

    pub fn colliders(&self) -> impl Iterator<Item = &Collider> {
        self.statics.iter().chain(self.bodies.iter())
    }

    fn candidates<'a>(&'a self, mask: u32, ignore: &'a [Entity]) -> impl Iterator<Item = &'a Collider> {
        self.colliders()
            .filter(move |c| c.layers & mask != 0 && !ignore.contains(&c.entity))
    }
}

impl WorldQuery for CollisionWorld {
    fn raycast(&self, origin: Vec2, direction: Vec2, mask: u32, ignore: &[Entity]) -> Option<RayHit> {
        let direction = direction.try_normalize()?;

        let mut nearest: Option<RayHit> = None;
        for collider in self.candidates(mask, ignore) {
            let Some((distance, normal)) = intersect(&collider.shape, origin, direction) else {
                continue;
            };
            if distance > RAY_MAX_DISTANCE {
                continue;
            }
            // Строгое <: при равенстве остаётся первый найденный
            if nearest.is_none_or(|n| distance < n.distance) {
                nearest = Some(RayHit {
                    entity: collider.entity,
                    position: origin + direction * distance,
                    normal,
                    distance,
                    layers: collider.layers,
                });
            }
        }
        nearest
    }

    fn query_point(&self, point: Vec2, mask: u32, ignore: &[Entity]) -> usize {
        self.candidates(mask, ignore)
            .filter(|c| contains(&c.shape, point))
            .count()
    }

    fn first_containing(&self, point: Vec2, mask: u32, ignore: &[Entity]) -> Option<Entity> {
        self.candidates(mask, ignore)
            .find(|c| contains(&c.shape, point))
            .map(|c| c.entity)
    }
}

fn contains(shape: &ColliderShape, point: Vec2) -> bool {
    match *shape {
        ColliderShape::Circle { center, radius } => point.distance_squared(center) < radius * radius,
        ColliderShape::Rect { min, max } => {
            point.x >= min.x && point.x <= max.x && point.y >= min.y && point.y <= max.y
        }
        ColliderShape::Segment { .. } => false,
    }
}

/// (distance, normal) первого пересечения луча с формой
fn intersect(shape: &ColliderShape, origin: Vec2, dir: Vec2) -> Option<(f32, Vec2)> {
    match *shape {
        ColliderShape::Circle { center, radius } => intersect_circle(center, radius, origin, dir),
        ColliderShape::Segment { a, b } => intersect_segment(a, b, origin, dir),
        ColliderShape::Rect { min, max } => intersect_rect(min, max, origin, dir),
    }
}

fn intersect_circle(center: Vec2, radius: f32, origin: Vec2, dir: Vec2) -> Option<(f32, Vec2)> {
    let m = origin - center;
    let b = m.dot(dir);
    let c = m.length_squared() - radius * radius;
    let inside = m.length() < radius + SURFACE_EPSILON;

    if !inside && b > 0.0 {
        return None;
    }

    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return None;
    }
    let root = discriminant.sqrt();

    // Луч изнутри выходит через дальнюю точку (exit wound)
    let t = if inside { -b + root } else { -b - root };
    if t < 0.0 || (inside && t < EXIT_MIN_DISTANCE) {
        return None;
    }

    let point = origin + dir * t;
    let normal = (point - center).try_normalize().unwrap_or(-dir);
    Some((t, normal))
}

fn intersect_segment(a: Vec2, b: Vec2, origin: Vec2, dir: Vec2) -> Option<(f32, Vec2)> {
    let edge = b - a;
    let denom = dir.perp_dot(edge);
    if denom.abs() < 1e-6 {
        return None;
    }

    let to_a = a - origin;
    let t = to_a.perp_dot(edge) / denom;
    let s = to_a.perp_dot(dir) / denom;
    if t < 0.0 || !(0.0..=1.0).contains(&s) {
        return None;
    }

    let mut normal = edge.perp().try_normalize()?;
    if normal.dot(dir) > 0.0 {
        normal = -normal;
    }
    Some((t, normal))
}

fn intersect_rect(min: Vec2, max: Vec2, origin: Vec2, dir: Vec2) -> Option<(f32, Vec2)> {
    let mut t_near = f32::NEG_INFINITY;
    let mut t_far = f32::INFINITY;
    let mut near_normal = Vec2::ZERO;
    let mut far_normal = Vec2::ZERO;

    for axis in 0..2 {
        let (o, d, lo, hi) = match axis {
            0 => (origin.x, dir.x, min.x, max.x),
            _ => (origin.y, dir.y, min.y, max.y),
        };
        let unit = if axis == 0 { Vec2::X } else { Vec2::Y };

        if d.abs() < 1e-8 {
            if o < lo || o > hi {
                return None;
            }
            continue;
        }

        let (mut t1, mut t2) = ((lo - o) / d, (hi - o) / d);
        let (mut n1, mut n2) = (-unit, unit);
        if t1 > t2 {
            std::mem::swap(&mut t1, &mut t2);
            std::mem::swap(&mut n1, &mut n2);
        }
        if t1 > t_near {
            t_near = t1;
            near_normal = n1;
        }
        if t2 < t_far {
            t_far = t2;
            far_normal = n2;
        }
        if t_near > t_far {
            return None;
        }
    }

    if t_far < 0.0 {
        return None;
    }
    if t_near >= 0.0 {
        Some((t_near, near_normal))
    } else {
        Some((t_far, far_normal))
    }
}

/// Система: пересобрать коллайдеры частей тела из позиций бойцов
///
/// Трупы остаются коллайдерами (пуля проходит сквозь них косметически).
pub fn sync_body_colliders(
    mut collision: ResMut<CollisionWorld>,
    parts: Query<(Entity, &BodyPart)>,
    owners: Query<(&Actor, &CharacterBody)>,
) {
    let mut bodies = Vec::new();

    for (entity, part) in parts.iter() {
        let Ok((actor, body)) = owners.get(part.owner) else {
            continue;
        };

        let (center, radius) = match part.kind {
            BodyPartKind::Head => (body.head_position(), body.head_radius * body.scale),
            BodyPartKind::Body => (body.body_center(), body.body_radius * body.scale),
        };

        bodies.push(Collider {
            entity,
            shape: ColliderShape::Circle { center, radius },
            layers: faction_layer(actor.faction_id),
        });
    }

    collision.set_bodies(bodies);
}

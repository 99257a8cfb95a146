//! Tests for weapon components.

use bevy::prelude::*;

use super::*;
use crate::components::CharacterBody;

#[test]
fn test_kind_behaviour_table() {
    assert!(WeaponKind::Firearm.behaviour().fires_bullets);
    assert!(!WeaponKind::Melee.behaviour().fires_bullets);
    assert!(WeaponKind::Melee.behaviour().iron_sight_is_block);
}

#[test]
fn test_rounds_left() {
    let mut pistol = Weapon::pistol();
    assert!(pistol.has_rounds_left());
    pistol.rounds_left = 0;
    assert!(!pistol.has_rounds_left());

    // Меч не расходует патроны
    assert!(Weapon::sword().has_rounds_left());
}

#[test]
fn test_barrel_points_at_aim_target() {
    let mut body = CharacterBody::at(Vec2::ZERO);
    body.aim_target = Vec2::new(1000.0, body.body_center().y);

    let pistol = Weapon::pistol();
    let (origin, direction) = pistol.barrel(&body);

    assert!((direction - Vec2::X).length() < 1e-4);
    assert!((origin.x - pistol.barrel_length).abs() < 1e-3);
}

#[test]
fn test_barrel_falls_back_to_facing() {
    let mut body = CharacterBody::at(Vec2::ZERO);
    body.is_flipped = true;
    body.aim_target = body.hand_position();

    let (_, direction) = Weapon::pistol().barrel(&body);
    assert_eq!(direction, Vec2::NEG_X);
}

#[test]
fn test_shotgun_is_clustered() {
    let shotgun = Weapon::shotgun();
    assert!(shotgun.bullets_per_shot > 1);
    assert!(!shotgun.can_bullets_be_deflected);
}

#[test]
fn test_barrel_distance_zero_for_melee() {
    let mut body = CharacterBody::at(Vec2::ZERO);
    body.scale = 2.0;

    let pistol = Weapon::pistol();
    assert_eq!(pistol.barrel_distance(&body), pistol.barrel_length * 2.0);
    assert_eq!(Weapon::sword().barrel_distance(&body), 0.0);
}

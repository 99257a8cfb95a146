//! Combat components

pub mod weapon;

#[cfg(test)]
mod weapon_tests;

pub use weapon::*;

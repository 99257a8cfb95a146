//! AI components

pub mod accurate_shot;
pub mod controller;

// Re-export all components
pub use accurate_shot::*;
pub use controller::*;

//! AI systems (порядок выполнения задаёт AIPlugin)

pub mod accurate_shot;
pub mod attack;
pub mod decision;
pub mod movement;
pub mod pickup;
pub mod saturation;
pub mod spawn;
pub mod targeting;

// Tests (separate files with _tests suffix)
#[cfg(test)]
mod decision_tests;

pub use accurate_shot::*;
pub use attack::*;
pub use decision::*;
pub use movement::*;
pub use pickup::*;
pub use saturation::*;
pub use spawn::*;
pub use targeting::*;

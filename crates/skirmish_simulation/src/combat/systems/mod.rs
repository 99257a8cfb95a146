//! Combat systems (порядок выполнения задаёт CombatPlugin)

pub mod animation;
pub mod dodge;
pub mod time;
pub mod weapon;


pub use animation::*;
pub use dodge::*;
pub use time::*;
pub use weapon::*;

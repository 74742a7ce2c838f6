//! Permission value types.

pub mod right;
pub mod tier;

pub use right::{Right, RightSet};
pub use tier::Tier;

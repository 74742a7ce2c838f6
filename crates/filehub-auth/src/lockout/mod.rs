//! Failed-login lockout with exponential backoff.

pub mod policy;
pub mod tracker;

pub use policy::LockoutPolicy;
pub use tracker::LockoutTracker;

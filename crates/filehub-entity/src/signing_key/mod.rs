//! Token signing keys.

pub mod model;

pub use model::SigningKey;

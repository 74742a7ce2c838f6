//! # filehub-entity
//!
//! Identity entity models for FileHub. Every struct in this crate
//! represents a database table row or a domain value object. All entities
//! derive `Debug`, `Clone`, `Serialize`, `Deserialize`, and database
//! entities additionally derive `sqlx::FromRow`.

pub mod permission;
pub mod signing_key;
pub mod user;

//! # filehub-database
//!
//! The identity store port, its PostgreSQL implementation (connection
//! management, migrations, repositories), and an in-memory implementation.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use memory::MemoryIdentityStore;
pub use store::{IdentityStore, PgIdentityStore};

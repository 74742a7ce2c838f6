//! # filehub-core
//!
//! Core crate for the FileHub identity subsystem. Contains configuration
//! schemas, typed identifiers, the clock abstraction, and the unified
//! error system.
//!
//! This crate has **no** internal dependencies on other FileHub crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;

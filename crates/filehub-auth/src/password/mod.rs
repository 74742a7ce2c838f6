//! Versioned password hashing and policy enforcement.

pub mod registry;
pub mod validator;
pub mod version;

pub use registry::PasswordHashingRegistry;
pub use validator::PasswordValidator;
pub use version::{HashVersion, HashedPassword};

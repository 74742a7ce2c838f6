//! # filehub-auth
//!
//! Identity and access control for FileHub.
//!
//! ## Modules
//!
//! - `password`: versioned password hashing and policy enforcement
//! - `jwt`: signing key pool and bearer token issuance/verification
//! - `lockout`: failed-login tracking with exponential backoff
//! - `permission`: permission notation and effective rights resolution
//! - `authenticator`: register, login, and token authentication flows
//! - `context`: startup assembly of the above

pub mod authenticator;
pub mod context;
pub mod jwt;
pub mod lockout;
pub mod password;
pub mod permission;

pub use authenticator::{Authenticator, LoginResult};
pub use context::AuthContext;
pub use jwt::{Claims, SigningKeyPool, TokenService};
pub use lockout::{LockoutPolicy, LockoutTracker};
pub use password::{HashVersion, PasswordHashingRegistry, PasswordValidator};
pub use permission::{
    Actor, Operation, PermissionResolver, PermissionTable, Principal, Resource, Transfer,
};

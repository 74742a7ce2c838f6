//! Bearer tokens signed by a rotating pool of symmetric keys.

pub mod claims;
pub mod keys;
pub mod service;

pub use claims::Claims;
pub use keys::SigningKeyPool;
pub use service::TokenService;

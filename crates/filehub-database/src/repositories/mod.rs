//! PostgreSQL repository implementations for identity entities.

pub mod login_attempt;
pub mod signing_key;
pub mod user;

pub use login_attempt::LoginAttemptRepository;
pub use signing_key::SigningKeyRepository;
pub use user::UserRepository;

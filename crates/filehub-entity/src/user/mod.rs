//! User domain entities.

pub mod login_attempt;
pub mod model;

pub use login_attempt::FailedLoginAttempts;
pub use model::{NewUser, User, home_directory};

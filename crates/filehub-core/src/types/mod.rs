//! Shared value types.

pub mod id;

pub use id::{OwnerId, SigningKeyId};

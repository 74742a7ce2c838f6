//! Permission tiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The level at which rights are granted for a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// The authenticated owner of the resource.
    Owner,
    /// Any authenticated actor who is not the owner.
    User,
    /// Unauthenticated actors.
    Public,
}

impl Tier {
    /// Tiers in notation order.
    pub const ALL: [Tier; 3] = [Tier::Owner, Tier::User, Tier::Public];

    /// Position of this tier's group in the notation.
    pub fn index(&self) -> usize {
        match self {
            Self::Owner => 0,
            Self::User => 1,
            Self::Public => 2,
        }
    }

    /// Return the tier as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::User => "user",
            Self::Public => "public",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

//! Who is asking, and about what.

use serde::{Deserialize, Serialize};

use filehub_core::types::OwnerId;
use filehub_entity::user::User;

/// An authenticated identity, as resolved from a bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Login name.
    pub username: String,
    /// Identity anchor stored on owned resources.
    pub owner_id: OwnerId,
    /// Administrators receive every right.
    pub admin: bool,
}

impl From<&User> for Principal {
    fn from(user: &User) -> Self {
        Self {
            username: user.username.clone(),
            owner_id: user.owner_id,
            admin: user.admin,
        }
    }
}

/// The caller of a file operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Actor {
    /// No valid token.
    Anonymous,
    /// A verified user.
    Authenticated(Principal),
}

impl Actor {
    /// The principal, if authenticated.
    pub fn principal(&self) -> Option<&Principal> {
        match self {
            Self::Anonymous => None,
            Self::Authenticated(principal) => Some(principal),
        }
    }

    /// Whether the actor is an administrator.
    pub fn is_admin(&self) -> bool {
        self.principal().is_some_and(|p| p.admin)
    }
}

impl From<Principal> for Actor {
    fn from(principal: Principal) -> Self {
        Self::Authenticated(principal)
    }
}

impl From<&User> for Actor {
    fn from(user: &User) -> Self {
        Self::Authenticated(Principal::from(user))
    }
}

/// State of the resource at the requested path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Resource {
    /// Nothing exists at the path yet.
    Absent,
    /// The resource exists; `owner` is its stored owner, if any.
    Present {
        /// Owner recorded on the resource.
        owner: Option<OwnerId>,
    },
}

impl Resource {
    /// An existing resource owned by `owner`.
    pub fn owned_by(owner: OwnerId) -> Self {
        Self::Present { owner: Some(owner) }
    }

    /// Whether the resource exists.
    pub fn exists(&self) -> bool {
        matches!(self, Self::Present { .. })
    }

    /// The stored owner of an existing resource.
    pub fn owner(&self) -> Option<OwnerId> {
        match self {
            Self::Absent => None,
            Self::Present { owner } => *owner,
        }
    }
}

//! File operations and the rights they require.

use std::fmt;

use serde::{Deserialize, Serialize};

use filehub_entity::permission::{Right, RightSet};

/// A single-path operation as seen by the permission check.
///
/// Copy and move are checked as two operations, one per side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// Create or overwrite content.
    Save,
    /// Source side of a copy.
    CopySource,
    /// Target side of a copy.
    CopyTarget,
    /// Source side of a move.
    MoveSource,
    /// Target side of a move.
    MoveTarget,
    /// Set metadata.
    Meta,
    /// Remove a resource.
    Delete,
    /// Read content.
    Read,
    /// List a directory.
    List,
}

impl Operation {
    /// Rights needed for this operation, depending on whether the resource
    /// already exists.
    ///
    /// | operation | exists | required |
    /// |---|---|---|
    /// | save, copy/move target | no | create |
    /// | save, copy/move target | yes | update |
    /// | move source | any | read + delete |
    /// | meta | any | update |
    /// | delete | any | delete |
    /// | read, list, copy source | any | read |
    pub fn required_rights(&self, exists: bool) -> RightSet {
        let rights: &[Right] = match self {
            Self::Save | Self::CopyTarget | Self::MoveTarget if exists => &[Right::Update],
            Self::Save | Self::CopyTarget | Self::MoveTarget => &[Right::Create],
            Self::MoveSource => &[Right::Read, Right::Delete],
            Self::Meta => &[Right::Update],
            Self::Delete => &[Right::Delete],
            Self::Read | Self::List | Self::CopySource => &[Right::Read],
        };
        rights.iter().copied().collect()
    }

    /// Whether the operation acts on a directory level: listing, or bringing
    /// a resource into existence.
    pub fn is_directory_level(&self, exists: bool) -> bool {
        matches!(self, Self::List) || !exists
    }

    /// Return the operation as a snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Save => "save",
            Self::CopySource => "copy_source",
            Self::CopyTarget => "copy_target",
            Self::MoveSource => "move_source",
            Self::MoveTarget => "move_target",
            Self::Meta => "meta",
            Self::Delete => "delete",
            Self::Read => "read",
            Self::List => "list",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A two-sided operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transfer {
    /// Source stays in place.
    Copy,
    /// Source is removed.
    Move,
}

impl Transfer {
    /// The (source, target) operations to check.
    pub fn sides(&self) -> (Operation, Operation) {
        match self {
            Self::Copy => (Operation::CopySource, Operation::CopyTarget),
            Self::Move => (Operation::MoveSource, Operation::MoveTarget),
        }
    }
}

/// First non-empty segment of a slash-separated path.
///
/// Returns `""` for the root.
pub fn first_segment(path: &str) -> &str {
    path.split('/').find(|s| !s.is_empty()).unwrap_or("")
}

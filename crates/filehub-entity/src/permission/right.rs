//! Rights and right sets.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the four operations a permission can grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Right {
    /// Create a new resource.
    Create,
    /// Read or list a resource.
    Read,
    /// Modify an existing resource or its metadata.
    Update,
    /// Remove a resource.
    Delete,
}

impl Right {
    /// All rights in notation order.
    pub const ALL: [Right; 4] = [Right::Create, Right::Read, Right::Update, Right::Delete];

    /// Bit of this right within a tier nibble, create being the MSB.
    pub fn bit(&self) -> u8 {
        match self {
            Self::Create => 0b1000,
            Self::Read => 0b0100,
            Self::Update => 0b0010,
            Self::Delete => 0b0001,
        }
    }

    /// Letter used for this right in the 12-character notation.
    pub fn letter(&self) -> char {
        match self {
            Self::Create => 'c',
            Self::Read => 'r',
            Self::Update => 'u',
            Self::Delete => 'd',
        }
    }

    /// Return the right as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Read => "read",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for Right {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Right {
    type Err = filehub_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "create" => Ok(Self::Create),
            "read" => Ok(Self::Read),
            "update" => Ok(Self::Update),
            "delete" => Ok(Self::Delete),
            _ => Err(filehub_core::AppError::validation(format!(
                "Invalid right: '{s}'. Expected one of: create, read, update, delete"
            ))),
        }
    }
}

/// A set of rights packed into the low nibble of a byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RightSet(u8);

impl RightSet {
    /// No rights.
    pub const NONE: RightSet = RightSet(0);
    /// Every right.
    pub const ALL: RightSet = RightSet(0b1111);

    /// Builds a set from a tier nibble; bits above the nibble are ignored.
    pub fn from_bits(bits: u8) -> Self {
        Self(bits & 0b1111)
    }

    /// The set as a nibble.
    pub fn bits(&self) -> u8 {
        self.0
    }

    /// Whether `right` is in the set.
    pub fn contains(&self, right: Right) -> bool {
        self.0 & right.bit() != 0
    }

    /// Returns the set with `right` added.
    pub fn with(self, right: Right) -> Self {
        Self(self.0 | right.bit())
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Rights in the set, in notation order.
    pub fn iter(&self) -> impl Iterator<Item = Right> + '_ {
        Right::ALL.into_iter().filter(|r| self.contains(*r))
    }

    /// First right of `required` that this set lacks.
    pub fn first_missing(&self, required: RightSet) -> Option<Right> {
        required.iter().find(|r| !self.contains(*r))
    }
}

impl FromIterator<Right> for RightSet {
    fn from_iter<I: IntoIterator<Item = Right>>(iter: I) -> Self {
        iter.into_iter().fold(RightSet::NONE, RightSet::with)
    }
}

impl fmt::Display for RightSet {
    /// Renders the 4-letter group, e.g. `c-u-`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for right in Right::ALL {
            let c = if self.contains(right) { right.letter() } else { '-' };
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bits_follow_notation_order() {
        let set: RightSet = [Right::Create, Right::Delete].into_iter().collect();
        assert_eq!(set.bits(), 0b1001);
        assert_eq!(set.to_string(), "c--d");
        assert_eq!(RightSet::ALL.to_string(), "crud");
        assert_eq!(RightSet::NONE.to_string(), "----");
    }

    #[test]
    fn test_first_missing() {
        let granted = RightSet::NONE.with(Right::Update);
        let required = RightSet::NONE.with(Right::Read).with(Right::Delete);
        assert_eq!(granted.first_missing(required), Some(Right::Read));
        assert_eq!(RightSet::ALL.first_missing(required), None);
    }

    #[test]
    fn test_from_bits_masks_high_bits() {
        assert_eq!(RightSet::from_bits(0xF4), RightSet::from_bits(0x4));
        assert!(RightSet::from_bits(0x4).contains(Right::Read));
    }

    #[test]
    fn test_from_str() {
        assert_eq!("DELETE".parse::<Right>().unwrap(), Right::Delete);
        assert!("list".parse::<Right>().is_err());
    }
}

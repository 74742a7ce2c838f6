//! Permission notation parsing.
//!
//! Two encodings describe the same three-tier matrix:
//!
//! - letter form, 12 characters: one `crud` group per tier, `-` for a
//!   missing right (`"crud-r---r--"`)
//! - hex form, 3 digits: one nibble per tier, create in the MSB (`"f44"`)
//!
//! The encoding is chosen by exact length and character class only.

use std::fmt;
use std::str::FromStr;

use filehub_core::error::AppError;
use filehub_entity::permission::{Right, RightSet, Tier};

const LETTER_LEN: usize = 12;
const HEX_LEN: usize = 3;

/// Rights per tier, indexed by [`Tier::index`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PermissionMatrix {
    tiers: [RightSet; 3],
}

impl PermissionMatrix {
    /// A matrix granting nothing to anyone.
    pub const NONE: PermissionMatrix = PermissionMatrix {
        tiers: [RightSet::NONE; 3],
    };

    /// Builds a matrix from per-tier sets in owner, user, public order.
    pub fn new(owner: RightSet, user: RightSet, public: RightSet) -> Self {
        Self {
            tiers: [owner, user, public],
        }
    }

    /// Parses either encoding.
    pub fn parse(notation: &str) -> Result<Self, AppError> {
        if !notation.is_ascii() {
            return Err(invalid(notation));
        }
        match notation.len() {
            LETTER_LEN => Self::parse_letters(notation),
            HEX_LEN => Self::parse_hex(notation),
            _ => Err(invalid(notation)),
        }
    }

    fn parse_letters(notation: &str) -> Result<Self, AppError> {
        let mut tiers = [RightSet::NONE; 3];
        for (i, c) in notation.chars().enumerate() {
            let right = Right::ALL[i % 4];
            if c == right.letter() {
                tiers[i / 4] = tiers[i / 4].with(right);
            } else if c != '-' {
                return Err(invalid(notation));
            }
        }
        Ok(Self { tiers })
    }

    fn parse_hex(notation: &str) -> Result<Self, AppError> {
        let mut tiers = [RightSet::NONE; 3];
        for (i, c) in notation.chars().enumerate() {
            let digit = c.to_digit(16).ok_or_else(|| invalid(notation))?;
            // to_digit(16) is at most 15
            tiers[i] = RightSet::from_bits(digit as u8);
        }
        Ok(Self { tiers })
    }

    /// Rights granted to `tier`.
    pub fn rights(&self, tier: Tier) -> RightSet {
        self.tiers[tier.index()]
    }

    /// The 12-character letter form.
    pub fn to_letters(&self) -> String {
        self.tiers.iter().map(RightSet::to_string).collect()
    }

    /// The 3-digit lowercase hex form.
    pub fn to_hex(&self) -> String {
        self.tiers.iter().map(|t| format!("{:x}", t.bits())).collect()
    }
}

fn invalid(notation: &str) -> AppError {
    AppError::validation(format!(
        "Invalid permission notation '{notation}': expected 12 letters (crud/-) or 3 hex digits"
    ))
}

impl FromStr for PermissionMatrix {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for PermissionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_letters())
    }
}

//! Position of an asset within a pool's balance vector.

use core::fmt;

use crate::error::ClpError;

/// Index of an asset in the ordered balance vector.
///
/// Two-asset curves accept [`First`](TokenIndex::First) and
/// [`Second`](TokenIndex::Second); the three-asset curve also accepts
/// [`Third`](TokenIndex::Third).
///
/// # Examples
///
/// ```
/// use clp_math::domain::TokenIndex;
///
/// assert_eq!(TokenIndex::Second.as_usize(), 1);
/// assert_eq!(TokenIndex::from_asset_in_is_first(true), (TokenIndex::First, TokenIndex::Second));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TokenIndex {
    /// Asset 0.
    First,
    /// Asset 1.
    Second,
    /// Asset 2 (three-asset pools only).
    Third,
}

impl TokenIndex {
    /// Zero-based position.
    #[must_use]
    pub const fn as_usize(&self) -> usize {
        match self {
            Self::First => 0,
            Self::Second => 1,
            Self::Third => 2,
        }
    }

    /// Converts a zero-based position.
    ///
    /// # Errors
    ///
    /// Returns [`ClpError::InvalidBalances`] for positions above 2.
    pub const fn from_usize(index: usize) -> Result<Self, ClpError> {
        match index {
            0 => Ok(Self::First),
            1 => Ok(Self::Second),
            2 => Ok(Self::Third),
            _ => Err(ClpError::InvalidBalances("token index out of range")),
        }
    }

    /// `(token_in, token_out)` for a two-asset trade given the direction
    /// flag used on the external interface.
    #[must_use]
    pub const fn from_asset_in_is_first(asset_in_is_first: bool) -> (Self, Self) {
        if asset_in_is_first {
            (Self::First, Self::Second)
        } else {
            (Self::Second, Self::First)
        }
    }
}

impl fmt::Display for TokenIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "asset{}", self.as_usize())
    }
}

/// Whether the caller fixes the input or the output amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SwapKind {
    /// Amount in is known; solve for amount out.
    GivenIn,
    /// Amount out is known; solve for amount in.
    GivenOut,
}

impl SwapKind {
    /// Rounding for the solved amount: down when paying out, up when
    /// charging.
    #[must_use]
    pub const fn solved_rounding(&self) -> super::Rounding {
        match self {
            Self::GivenIn => super::Rounding::Down,
            Self::GivenOut => super::Rounding::Up,
        }
    }
}

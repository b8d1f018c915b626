//! Ordered reserve balances of a pool.

use core::fmt;

use super::TokenIndex;
use crate::error::ClpError;
use crate::math::{Fixed, Np};

/// Reserve balances of a two- or three-asset pool.
///
/// # Invariants
///
/// - Holds exactly 2 or 3 entries.
/// - Every entry is non-negative.
///
/// Balances are plain inputs: curves never mutate them, they only return
/// amounts from which the caller builds the next `Balances`.
///
/// # Examples
///
/// ```
/// use clp_math::domain::{Balances, TokenIndex};
///
/// let b = Balances::from_decimals(&["100", "200"]).expect("valid balances");
/// assert_eq!(b.len(), 2);
/// assert_eq!(b.get(TokenIndex::Second).expect("present").to_string(), "200");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(try_from = "Vec<Fixed<Np>>", into = "Vec<Fixed<Np>>")
)]
pub struct Balances {
    values: Vec<Fixed<Np>>,
}

impl Balances {
    /// Creates a validated balance vector.
    ///
    /// # Errors
    ///
    /// Returns [`ClpError::InvalidBalances`] if the arity is not 2 or 3 or
    /// an entry is negative.
    pub fn new(values: Vec<Fixed<Np>>) -> Result<Self, ClpError> {
        if !(2..=3).contains(&values.len()) {
            return Err(ClpError::InvalidBalances("expected 2 or 3 balances"));
        }
        if values.iter().any(Fixed::is_negative) {
            return Err(ClpError::InvalidBalances("balances must be non-negative"));
        }
        Ok(Self { values })
    }

    /// Two-asset balances.
    ///
    /// # Errors
    ///
    /// See [`Balances::new`].
    pub fn pair(x: Fixed<Np>, y: Fixed<Np>) -> Result<Self, ClpError> {
        Self::new(vec![x, y])
    }

    /// Three-asset balances.
    ///
    /// # Errors
    ///
    /// See [`Balances::new`].
    pub fn triple(x: Fixed<Np>, y: Fixed<Np>, z: Fixed<Np>) -> Result<Self, ClpError> {
        Self::new(vec![x, y, z])
    }

    /// Parses balances from decimal strings.
    ///
    /// # Errors
    ///
    /// Returns [`ClpError::ParameterValidation`] for malformed strings and
    /// the errors of [`Balances::new`].
    pub fn from_decimals(values: &[&str]) -> Result<Self, ClpError> {
        let parsed = values
            .iter()
            .map(|v| v.parse::<Fixed<Np>>())
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(parsed)
    }

    /// Number of assets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always `false`: a valid vector holds at least two entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Balance of the given asset.
    ///
    /// # Errors
    ///
    /// Returns [`ClpError::InvalidBalances`] if the pool has no such asset.
    pub fn get(&self, index: TokenIndex) -> Result<&Fixed<Np>, ClpError> {
        self.values
            .get(index.as_usize())
            .ok_or(ClpError::InvalidBalances("token index not in pool"))
    }

    /// All balances in order.
    #[must_use]
    pub fn as_slice(&self) -> &[Fixed<Np>] {
        &self.values
    }

    /// Sum of all balances.
    ///
    /// # Errors
    ///
    /// Returns [`ClpError::ArithmeticOverflow`] if the sum leaves the range.
    pub fn sum(&self) -> Result<Fixed<Np>, ClpError> {
        self.values
            .iter()
            .try_fold(Fixed::zero(), |acc, v| acc.checked_add(v))
    }

    /// Index and value of the largest balance (first one on ties).
    ///
    /// # Errors
    ///
    /// Returns [`ClpError::InvalidBalances`] if the vector is empty, which a
    /// validated `Balances` never is.
    pub fn largest(&self) -> Result<(TokenIndex, &Fixed<Np>), ClpError> {
        let mut best: Option<(usize, &Fixed<Np>)> = None;
        for (i, v) in self.values.iter().enumerate() {
            if best.map_or(true, |(_, current)| v > current) {
                best = Some((i, v));
            }
        }
        let (i, v) = best.ok_or(ClpError::InvalidBalances("empty balances"))?;
        Ok((TokenIndex::from_usize(i)?, v))
    }

    /// Checks that the pool has exactly `n` assets.
    ///
    /// # Errors
    ///
    /// Returns [`ClpError::InvalidBalances`] otherwise.
    pub fn expect_len(&self, n: usize) -> Result<(), ClpError> {
        if self.values.len() == n {
            Ok(())
        } else {
            Err(ClpError::InvalidBalances("wrong number of balances for curve"))
        }
    }
}

impl TryFrom<Vec<Fixed<Np>>> for Balances {
    type Error = ClpError;

    fn try_from(values: Vec<Fixed<Np>>) -> Result<Self, Self::Error> {
        Self::new(values)
    }
}

impl From<Balances> for Vec<Fixed<Np>> {
    fn from(balances: Balances) -> Self {
        balances.values
    }
}

impl fmt::Display for Balances {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, v) in self.values.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{v}")?;
        }
        write!(f, "]")
    }
}

//! How an iterative solver terminated.

use core::fmt;

/// Termination state of the cubic Newton solver.
///
/// Only [`Converged`](NewtonOutcome::Converged) certifies the per-asset
/// reconstruction tolerance.  The other two states still come with a
/// usable root, flagged as reduced-confidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NewtonOutcome {
    /// Every balance re-derived from the root is within tolerance.
    Converged {
        /// Newton steps taken.
        iterations: u32,
    },
    /// The step vanished or the function went negative after the first
    /// step; the loop stopped with the best root available.
    EarlyExit {
        /// Newton steps taken.
        iterations: u32,
    },
    /// The fixed iteration budget ran out.
    BudgetExhausted {
        /// Newton steps taken (equal to the budget).
        iterations: u32,
    },
}

impl NewtonOutcome {
    /// Steps taken before termination.
    #[must_use]
    pub const fn iterations(&self) -> u32 {
        match self {
            Self::Converged { iterations }
            | Self::EarlyExit { iterations }
            | Self::BudgetExhausted { iterations } => *iterations,
        }
    }

    /// Returns `true` if the tolerance was met.
    #[must_use]
    pub const fn is_converged(&self) -> bool {
        matches!(self, Self::Converged { .. })
    }

    /// Returns `true` for the early-exit and budget states.
    #[must_use]
    pub const fn is_reduced_confidence(&self) -> bool {
        !self.is_converged()
    }
}

impl fmt::Display for NewtonOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Converged { iterations } => write!(f, "converged after {iterations} steps"),
            Self::EarlyExit { iterations } => write!(f, "early exit after {iterations} steps"),
            Self::BudgetExhausted { iterations } => {
                write!(f, "budget exhausted after {iterations} steps")
            }
        }
    }
}

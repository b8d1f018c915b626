//! Explicit rounding direction for fixed-point operations.

/// Rounding direction of a single multiplication, division or square root.
///
/// Directions act on the magnitude: `Down` truncates toward zero and `Up`
/// rounds away from zero, so the same direction is conservative for both
/// signs of an intermediate term.
///
/// # Examples
///
/// ```
/// use clp_math::domain::Rounding;
///
/// assert_eq!(Rounding::Up.reverse(), Rounding::Down);
/// assert_eq!(Rounding::for_payment(true), Rounding::Up);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Rounding {
    /// Round away from zero.
    Up,
    /// Round toward zero.
    Down,
}

impl Rounding {
    /// Returns `true` if this is [`Rounding::Down`].
    #[must_use]
    pub const fn is_down(&self) -> bool {
        matches!(self, Self::Down)
    }

    /// Returns the opposite direction.
    ///
    /// Used where a term enters a formula with a negative sign, e.g. a
    /// denominator that must round down for the quotient to round up.
    #[must_use]
    pub const fn reverse(&self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
        }
    }

    /// Direction that favors the pool: amounts the pool receives round up,
    /// amounts it pays round down.
    #[must_use]
    pub const fn for_payment(pool_receives: bool) -> Self {
        if pool_receives {
            Self::Up
        } else {
            Self::Down
        }
    }
}

impl core::fmt::Display for Rounding {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Up => write!(f, "up"),
            Self::Down => write!(f, "down"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reverse_is_involution() {
        for r in [Rounding::Up, Rounding::Down] {
            assert_ne!(r.reverse(), r);
            assert_eq!(r.reverse().reverse(), r);
        }
    }

    #[test]
    fn payments_favor_the_pool() {
        assert_eq!(Rounding::for_payment(true), Rounding::Up);
        assert!(Rounding::for_payment(false).is_down());
    }

    #[test]
    fn display() {
        assert_eq!(Rounding::Up.to_string(), "up");
        assert_eq!(Rounding::Down.to_string(), "down");
    }
}

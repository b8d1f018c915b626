//! Two-component fixed-point vector.

use core::fmt;

use crate::math::{Fixed, Scale};

/// A point `(x, y)` at scale `S`.
///
/// Used for the ellipse boundary vectors `tauAlpha` / `tauBeta` (at Xp)
/// and for virtual offsets (at Np).
#[derive(Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(bound = ""))]
pub struct Vector2<S: Scale> {
    x: Fixed<S>,
    y: Fixed<S>,
}

impl<S: Scale> Vector2<S> {
    /// Creates a vector from its components.
    #[must_use]
    pub const fn new(x: Fixed<S>, y: Fixed<S>) -> Self {
        Self { x, y }
    }

    /// First component.
    #[must_use]
    pub const fn x(&self) -> &Fixed<S> {
        &self.x
    }

    /// Second component.
    #[must_use]
    pub const fn y(&self) -> &Fixed<S> {
        &self.y
    }

    /// Returns the components with their roles exchanged.
    #[must_use]
    pub fn swapped(&self) -> Self {
        Self::new(self.y.clone(), self.x.clone())
    }
}

impl<S: Scale> fmt::Debug for Vector2<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:?}, {:?})", self.x, self.y)
    }
}

impl<S: Scale> fmt::Display for Vector2<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

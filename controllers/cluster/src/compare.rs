//! Equality comparator
//!
//! Decides whether an actual state already satisfies an expected state.
//! Only the fields a state exposes through [`Comparable::comparison_key`]
//! take part; provider ids and cache bookkeeping never do.

/// A state that can be compared for convergence
pub trait Comparable {
    /// Projection of the compared fields
    type Key<'a>: PartialEq
    where
        Self: 'a;

    fn comparison_key(&self) -> Self::Key<'_>;
}

/// Whether `actual` already satisfies `expected`
pub fn is_equal<T: Comparable>(actual: &T, expected: &T) -> bool {
    actual.comparison_key() == expected.comparison_key()
}

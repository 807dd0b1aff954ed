//! Shared scalar types for the symbolic engine.
//!
//! All program integers are arbitrary precision, and inputs are addressed by
//! an index into the owning state's arena rather than by reference.

use std::fmt;

use num_bigint::BigInt;

/// Exact program integer.
pub type Int = BigInt;

/// Handle to an [`InputValue`][crate::domain::InputValue] owned by a [`State`][crate::state::State].
///
/// Handles are stable across [`State::fork`][crate::state::State::fork]: a fork clones the
/// arena in place, so the same handle addresses the copied input in the forked state.
///
/// # Invariants
///
/// - A handle is only meaningful for the state that allocated it (or a fork of it).
/// - Handles are allocated in increasing order, so ordering follows allocation time.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct InputId(usize);

impl InputId {
    /// Creates a handle from a raw arena index.
    pub fn new(index: usize) -> Self {
        InputId(index)
    }

    /// Returns the raw arena index.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for InputId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "i{}", self.0)
    }
}

impl From<InputId> for usize {
    fn from(id: InputId) -> Self {
        id.index()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_id_order() {
        let a = InputId::new(0);
        let b = InputId::new(3);
        assert!(a < b);
        assert_eq!(b.index(), 3);
        assert_eq!(usize::from(b), 3);
        assert_eq!(b.to_string(), "i3");
    }
}

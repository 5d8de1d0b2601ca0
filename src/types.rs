//! Type-safe wrapper for decision variables.
//!
//! A variable's ID doubles as its position in the variable ordering: a node
//! labelled with `x3` sits above every node labelled with `x4` or higher.
use std::fmt;

/// A variable identifier (1-indexed).
///
/// # Invariants
///
/// - Variable IDs must be >= 1 (0 is reserved)
/// - Smaller IDs are closer to the root
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Var(u32);

impl Var {
    /// Creates a new variable with the given ID.
    ///
    /// # Panics
    ///
    /// Panics if `id == 0`. Variables must be 1-indexed.
    pub fn new(id: u32) -> Self {
        assert_ne!(id, 0, "Variable IDs must be >= 1");
        Var(id)
    }

    /// Returns the raw variable ID as a `u32`.
    pub fn id(self) -> u32 {
        self.0
    }

    /// Creates the ordering `x1, x2, ..., xn`.
    pub fn range(n: u32) -> Vec<Var> {
        (1..=n).map(Var).collect()
    }
}

impl fmt::Display for Var {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x{}", self.0)
    }
}

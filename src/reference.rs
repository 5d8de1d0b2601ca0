use std::fmt::{Display, Formatter};

/// A reference to an MTBDD node.
///
/// MTBDDs here carry no complement edges, so a `Ref` is a plain index into
/// the node storage of an [`Mtbdd`][crate::mtbdd::Mtbdd].
///
/// `Ref::ZERO` is the canonical zero terminal. Every diagram that evaluates
/// to `0.0` somewhere reaches exactly this node there.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct Ref(u32);

impl Ref {
    /// The zero terminal.
    pub const ZERO: Ref = Ref(0);

    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Return the index of the reference.
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl Display for Ref {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.is_zero() {
            write!(f, "⊥")
        } else {
            write!(f, "@{}", self.0)
        }
    }
}

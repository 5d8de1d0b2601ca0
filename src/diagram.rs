//! Read-only views of the structures walked during export.
//!
//! The exporter never builds or modifies a diagram. It only needs to ask a
//! handful of questions about nodes of a decision diagram and of the offset
//! index laid over it, which are captured by the two traits below.
//! [`Mtbdd`][crate::mtbdd::Mtbdd] and [`Odd`][crate::odd::Odd] are the
//! in-crate implementations.

use std::collections::HashMap;
use std::hash::Hash;

use num_bigint::BigUint;

use crate::types::Var;

/// A multi-terminal decision diagram, seen through its node handles.
pub trait DecisionDiagram {
    type Node: Copy;

    /// Is `node` the canonical zero terminal?
    fn is_zero(&self, node: Self::Node) -> bool;

    /// Position of `node` in the variable ordering.
    ///
    /// Terminals must report `u32::MAX`, so that a terminal reached above the
    /// last level is treated as independent of every remaining variable.
    fn variable(&self, node: Self::Node) -> u32;

    /// Low (else) cofactor of a decision node.
    fn low(&self, node: Self::Node) -> Self::Node;

    /// High (then) cofactor of a decision node.
    fn high(&self, node: Self::Node) -> Self::Node;

    /// Value of a terminal node, `None` for decision nodes.
    fn value(&self, node: Self::Node) -> Option<f64>;
}

/// An offset index ("ODD") that maps paths through a diagram to dense positions.
///
/// Each index node covers one level of the variable ordering. Going low keeps
/// the current base position; going high adds [`high_offset`][Self::high_offset].
pub trait OffsetIndex {
    type Node: Copy;

    fn low(&self, node: Self::Node) -> Self::Node;
    fn high(&self, node: Self::Node) -> Self::Node;

    /// Number of positions reachable through the low branch.
    fn low_count(&self, node: Self::Node) -> u64;

    /// Number of positions reachable through the high branch.
    fn high_count(&self, node: Self::Node) -> u64;

    /// Amount added to the base position when descending through the high branch.
    ///
    /// All low positions precede all high positions, so this is the low count.
    fn high_offset(&self, node: Self::Node) -> u64 {
        self.low_count(node)
    }

    /// Total number of positions spanned by `node`.
    fn num_positions(&self, node: Self::Node) -> u64 {
        self.low_count(node) + self.high_count(node)
    }
}

/// Counts the assignments to `vars` for which the diagram is non-zero.
///
/// Variables the diagram skips on a path double the count below them.
/// The result is exact, but may exceed the number of positions an offset index
/// assigns when that index covers only part of the state space.
pub fn count_nonzero<D>(dd: &D, root: D::Node, vars: &[Var]) -> BigUint
where
    D: DecisionDiagram,
    D::Node: Eq + Hash,
{
    let mut cache = HashMap::new();
    count_nonzero_rec(dd, root, vars, 0, &mut cache)
}

fn count_nonzero_rec<D>(
    dd: &D,
    node: D::Node,
    vars: &[Var],
    level: usize,
    cache: &mut HashMap<(D::Node, usize), BigUint>,
) -> BigUint
where
    D: DecisionDiagram,
    D::Node: Eq + Hash,
{
    if dd.is_zero(node) {
        return BigUint::ZERO;
    }
    if level == vars.len() {
        return BigUint::from(1u32);
    }
    if let Some(count) = cache.get(&(node, level)) {
        return count.clone();
    }

    let count = if dd.variable(node) > vars[level].id() {
        count_nonzero_rec(dd, node, vars, level + 1, cache) << 1
    } else {
        let low = count_nonzero_rec(dd, dd.low(node), vars, level + 1, cache);
        let high = count_nonzero_rec(dd, dd.high(node), vars, level + 1, cache);
        low + high
    };

    cache.insert((node, level), count.clone());
    count
}

//! Offset-labelled decision diagrams (ODDs).
//!
//! An ODD assigns dense positions `0..n` to the states of a reachability set,
//! in lexicographic order of their assignments. It mirrors the reachability
//! diagram level by level: each [`OddNode`] records how many states lie below
//! its low and high branches, so that a path's position is the sum of the
//! low counts at every level where the path goes high.
//!
//! Index nodes are shared per (diagram node, level). Where the reachability
//! diagram skips a variable, the index node for that level has both branches
//! pointing at the same child.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use log::debug;

use crate::diagram::{DecisionDiagram, OffsetIndex};
use crate::types::Var;

/// Handle of a node inside an [`Odd`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct OddId(u32);

impl OddId {
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for OddId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct OddNode {
    pub low: OddId,
    pub high: OddId,
    /// Number of states below the low branch.
    pub low_count: u64,
    /// Number of states below the high branch.
    pub high_count: u64,
}

/// Offset index over the states of a reachability set.
#[derive(Debug, Clone)]
pub struct Odd {
    nodes: Vec<OddNode>,
    root: OddId,
}

impl Odd {
    /// Builds the index over the states where `reach` is non-zero.
    ///
    /// # Panics
    ///
    /// Panics if the number of states does not fit in a `u64`.
    pub fn build<D>(dd: &D, reach: D::Node, vars: &[Var]) -> Self
    where
        D: DecisionDiagram,
        D::Node: Eq + Hash,
    {
        let mut builder = OddBuilder {
            dd,
            vars,
            nodes: Vec::new(),
            cache: HashMap::new(),
        };
        let root = builder.build(reach, 0);
        let odd = Odd {
            nodes: builder.nodes,
            root,
        };
        debug!(
            "Built offset index with {} nodes over {} variables, spanning {} positions",
            odd.size(),
            vars.len(),
            odd.num_positions()
        );
        odd
    }

    /// Index over the full state space of `num_vars` variables, where the
    /// position of an assignment is the number its bits spell.
    ///
    /// # Panics
    ///
    /// Panics if `num_vars >= 64`.
    pub fn full(num_vars: usize) -> Self {
        assert!(num_vars < 64, "At most 63 variables are supported");

        // One node per level, built from the terminal level upwards.
        let mut nodes = Vec::with_capacity(num_vars + 1);
        nodes.push(OddNode {
            low: OddId(0),
            high: OddId(0),
            low_count: 0,
            high_count: 1,
        });
        for depth in 1..=num_vars {
            let child = OddId((depth - 1) as u32);
            let half = 1u64 << (depth - 1);
            nodes.push(OddNode {
                low: child,
                high: child,
                low_count: half,
                high_count: half,
            });
        }

        Odd {
            nodes,
            root: OddId(num_vars as u32),
        }
    }

    pub fn root(&self) -> OddId {
        self.root
    }

    pub fn node(&self, id: OddId) -> &OddNode {
        &self.nodes[id.index()]
    }

    /// Number of index nodes.
    pub fn size(&self) -> usize {
        self.nodes.len()
    }

    /// Total number of positions, i.e. states in the reachability set.
    pub fn num_positions(&self) -> u64 {
        OffsetIndex::num_positions(self, self.root)
    }
}

impl OffsetIndex for Odd {
    type Node = OddId;

    fn low(&self, node: OddId) -> OddId {
        self.node(node).low
    }

    fn high(&self, node: OddId) -> OddId {
        self.node(node).high
    }

    fn low_count(&self, node: OddId) -> u64 {
        self.node(node).low_count
    }

    fn high_count(&self, node: OddId) -> u64 {
        self.node(node).high_count
    }
}

struct OddBuilder<'a, D: DecisionDiagram> {
    dd: &'a D,
    vars: &'a [Var],
    nodes: Vec<OddNode>,
    cache: HashMap<(D::Node, usize), OddId>,
}

impl<D> OddBuilder<'_, D>
where
    D: DecisionDiagram,
    D::Node: Eq + Hash,
{
    fn alloc(&mut self, node: OddNode) -> OddId {
        let id = OddId(u32::try_from(self.nodes.len()).unwrap_or_else(|_| panic!("Offset index is full")));
        self.nodes.push(node);
        id
    }

    fn build(&mut self, node: D::Node, level: usize) -> OddId {
        if let Some(&id) = self.cache.get(&(node, level)) {
            return id;
        }

        let id = if level == self.vars.len() {
            // Terminal level: the node's children are never followed.
            let high_count = if self.dd.is_zero(node) { 0 } else { 1 };
            let id = OddId(self.nodes.len() as u32);
            self.alloc(OddNode {
                low: id,
                high: id,
                low_count: 0,
                high_count,
            })
        } else {
            let (low, high) = if self.dd.variable(node) > self.vars[level].id() {
                (node, node)
            } else {
                (self.dd.low(node), self.dd.high(node))
            };
            let low = self.build(low, level + 1);
            let high = self.build(high, level + 1);
            let low_count = self.span(low);
            let high_count = self.span(high);
            self.alloc(OddNode {
                low,
                high,
                low_count,
                high_count,
            })
        };

        self.cache.insert((node, level), id);
        id
    }

    fn span(&self, id: OddId) -> u64 {
        let node = &self.nodes[id.index()];
        node.low_count
            .checked_add(node.high_count)
            .unwrap_or_else(|| panic!("Offset index span overflows u64"))
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::mtbdd::Mtbdd;
    use crate::reference::Ref;

    #[test]
    fn test_full_index() {
        let odd = Odd::full(3);
        assert_eq!(odd.num_positions(), 8);
        assert_eq!(odd.size(), 4);

        let root = odd.root();
        assert_eq!(odd.low_count(root), 4);
        assert_eq!(odd.high_offset(root), 4);
        let child = odd.high(root);
        assert_eq!(odd.low(root), child);
        assert_eq!(OffsetIndex::num_positions(&odd, child), 4);
    }

    #[test]
    fn test_full_index_no_vars() {
        let odd = Odd::full(0);
        assert_eq!(odd.num_positions(), 1);
    }

    #[test]
    fn test_build_from_constant_one_matches_full() {
        let dd = Mtbdd::new();
        let vars = Var::range(4);
        let built = Odd::build(&dd, dd.one(), &vars);
        let full = Odd::full(4);

        assert_eq!(built.num_positions(), full.num_positions());
        let (mut a, mut b) = (built.root(), full.root());
        for _ in 0..vars.len() {
            assert_eq!(built.low_count(a), full.low_count(b));
            assert_eq!(built.high_count(a), full.high_count(b));
            a = built.high(a);
            b = full.high(b);
        }
    }

    #[test]
    fn test_build_partial_reach() {
        let dd = Mtbdd::new();
        let vars = Var::range(2);
        // Reachable: 00, 10, 11
        let reach = dd.from_entries(&vars, &[(0b00, 1.0), (0b10, 1.0), (0b11, 1.0)]);
        let odd = Odd::build(&dd, reach, &vars);

        assert_eq!(odd.num_positions(), 3);
        let root = odd.root();
        assert_eq!(odd.low_count(root), 1);
        assert_eq!(odd.high_count(root), 2);

        let low = odd.low(root);
        assert_eq!(odd.low_count(low), 1);
        assert_eq!(odd.high_count(low), 0);
    }

    #[test]
    fn test_build_empty_reach() {
        let dd = Mtbdd::new();
        let odd = Odd::build(&dd, Ref::ZERO, &Var::range(5));
        assert_eq!(odd.num_positions(), 0);
        // One shared node per level.
        assert_eq!(odd.size(), 6);
    }

    #[test]
    fn test_build_shares_nodes() {
        let dd = Mtbdd::new();
        let vars = Var::range(10);
        let odd = Odd::build(&dd, dd.one(), &vars);
        assert_eq!(odd.size(), 11);
        assert_eq!(odd.num_positions(), 1024);
    }
}

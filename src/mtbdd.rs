//! Multi-terminal binary decision diagrams (MTBDDs).
//!
//! An MTBDD represents a function from assignments of boolean variables to
//! real values. Read as a vector, it has one entry per assignment: the entry
//! for the assignment whose bits spell the number `p` (first variable most
//! significant) sits at position `p`.
//!
//! The [`Mtbdd`] store keeps nodes reduced and shared: identical nodes are
//! hash-consed, and a decision whose children coincide is replaced by that
//! child. Reduction is what makes *level-skipping* appear: a path may jump
//! from a node on `x1` straight to a node on `x3`, meaning the function does
//! not depend on `x2` there.
//!
//! # Example
//!
//! ```
//! use mtbdd_export::mtbdd::Mtbdd;
//! use mtbdd_export::types::Var;
//!
//! let dd = Mtbdd::new();
//! let vars = Var::range(2);
//!
//! // Vector [0, 0, 3.5, 0]
//! let f = dd.from_entries(&vars, &[(0b10, 3.5)]);
//! assert_eq!(dd.eval(f, &vars, 0b10), 3.5);
//! assert_eq!(dd.eval(f, &vars, 0b01), 0.0);
//! ```

use std::cell::RefCell;
use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};
use std::fmt::Debug;

use log::debug;
use num_bigint::BigUint;

use crate::diagram::{count_nonzero, DecisionDiagram};
use crate::node::{Node, NodeKey};
use crate::reference::Ref;
use crate::types::Var;

/// Node store for MTBDDs.
///
/// Slot 0 always holds the zero terminal, so [`Ref::ZERO`] is valid in every
/// store. Nodes are never freed.
pub struct Mtbdd {
    nodes: RefCell<Vec<Node>>,
    unique: RefCell<HashMap<NodeKey, Ref>>,
}

impl Mtbdd {
    pub fn new() -> Self {
        Self::with_capacity(1024)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let mut nodes = Vec::with_capacity(capacity.max(1));
        let mut unique = HashMap::with_capacity(capacity.max(1));

        let zero = Node::Terminal(0.0);
        nodes.push(zero);
        unique.insert(zero.key(), Ref::ZERO);

        Self {
            nodes: RefCell::new(nodes),
            unique: RefCell::new(unique),
        }
    }
}

impl Default for Mtbdd {
    fn default() -> Self {
        Mtbdd::new()
    }
}

impl Debug for Mtbdd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mtbdd").field("nodes", &self.num_nodes()).finish()
    }
}

impl Mtbdd {
    pub fn node(&self, node: Ref) -> Node {
        self.nodes.borrow()[node.index()]
    }

    /// Number of nodes allocated in the store, including the zero terminal.
    pub fn num_nodes(&self) -> usize {
        self.nodes.borrow().len()
    }

    pub fn is_terminal(&self, node: Ref) -> bool {
        self.node(node).is_terminal()
    }

    /// Value of a terminal node.
    pub fn value(&self, node: Ref) -> Option<f64> {
        match self.node(node) {
            Node::Terminal(value) => Some(value),
            Node::Decision { .. } => None,
        }
    }

    /// Decision variable of a node, `None` for terminals.
    pub fn variable(&self, node: Ref) -> Option<Var> {
        match self.node(node) {
            Node::Terminal(_) => None,
            Node::Decision { var, .. } => Some(var),
        }
    }

    /// Low child of a decision node. A terminal is its own cofactor.
    pub fn low(&self, node: Ref) -> Ref {
        match self.node(node) {
            Node::Terminal(_) => node,
            Node::Decision { low, .. } => low,
        }
    }

    /// High child of a decision node. A terminal is its own cofactor.
    pub fn high(&self, node: Ref) -> Ref {
        match self.node(node) {
            Node::Terminal(_) => node,
            Node::Decision { high, .. } => high,
        }
    }

    fn intern(&self, node: Node) -> Ref {
        let key = node.key();
        if let Some(&existing) = self.unique.borrow().get(&key) {
            return existing;
        }

        let mut nodes = self.nodes.borrow_mut();
        let index = u32::try_from(nodes.len()).unwrap_or_else(|_| panic!("MTBDD store is full"));
        let r = Ref::new(index);
        nodes.push(node);
        self.unique.borrow_mut().insert(key, r);
        r
    }

    /// Returns the canonical terminal for `value`.
    ///
    /// Both `0.0` and `-0.0` map to [`Ref::ZERO`].
    ///
    /// # Panics
    ///
    /// Panics if `value` is NaN.
    pub fn terminal(&self, value: f64) -> Ref {
        assert!(!value.is_nan(), "Terminal value must not be NaN");
        if value == 0.0 {
            return Ref::ZERO;
        }
        self.intern(Node::Terminal(value))
    }

    pub fn one(&self) -> Ref {
        self.terminal(1.0)
    }

    /// Creates (or reuses) the node `var ? high : low`.
    ///
    /// # Panics
    ///
    /// Panics if a child is a decision on a variable not strictly below `var`.
    pub fn mk_node(&self, var: Var, low: Ref, high: Ref) -> Ref {
        debug!("mk(v = {}, low = {}, high = {})", var, low, high);

        if low == high {
            debug!("mk: duplicates {} == {}", low, high);
            return low;
        }

        for child in [low, high] {
            let position = self.node(child).position();
            assert!(
                position > var.id(),
                "Child {} (variable position {}) must lie below {}",
                child,
                position,
                var
            );
        }

        self.intern(Node::Decision { var, low, high })
    }

    /// Indicator function of `var`: `1.0` where `var` is true, `0.0` elsewhere.
    pub fn mk_var(&self, var: Var) -> Ref {
        self.mk_node(var, Ref::ZERO, self.one())
    }

    /// Single-path diagram that takes `value` when all literals hold and `0.0` otherwise.
    ///
    /// Literals follow the DIMACS convention: `3` means `x3` true, `-3` means `x3` false.
    /// A cube containing both `x` and `-x` is empty, i.e. the zero vector.
    pub fn mk_cube(&self, literals: impl IntoIterator<Item = i32>, value: f64) -> Ref {
        let mut literals: Vec<i32> = literals.into_iter().collect();
        literals.sort_by_key(|&lit| (Reverse(lit.unsigned_abs()), lit));
        literals.dedup();
        if literals.windows(2).any(|w| w[0].unsigned_abs() == w[1].unsigned_abs()) {
            debug!("mk_cube: contradictory literals {:?}", literals);
            return Ref::ZERO;
        }

        let mut current = self.terminal(value);
        for lit in literals {
            let var = Var::new(lit.unsigned_abs());
            current = if lit > 0 {
                self.mk_node(var, Ref::ZERO, current)
            } else {
                self.mk_node(var, current, Ref::ZERO)
            };
        }
        current
    }

    /// Builds the diagram of the vector over `vars` with the given non-zero entries.
    ///
    /// An entry `(p, v)` sets the value at the assignment whose bits spell `p`,
    /// with `vars[0]` as the most significant bit. Later duplicates win.
    ///
    /// # Panics
    ///
    /// Panics if `vars` is not strictly increasing, if there are 64 or more
    /// variables, or if a position does not fit in `vars.len()` bits.
    pub fn from_entries(&self, vars: &[Var], entries: &[(u64, f64)]) -> Ref {
        assert!(vars.len() < 64, "At most 63 variables are supported");
        assert!(
            vars.windows(2).all(|w| w[0] < w[1]),
            "Variables must be strictly increasing"
        );

        let mut sorted: Vec<(u64, f64)> = Vec::with_capacity(entries.len());
        for &(position, value) in entries {
            assert!(
                position >> vars.len() == 0,
                "Position {} does not fit in {} variables",
                position,
                vars.len()
            );
            sorted.push((position, value));
        }
        // Stable sort keeps duplicates in input order, so the last one wins below.
        sorted.sort_by_key(|&(position, _)| position);
        let mut deduped: Vec<(u64, f64)> = Vec::with_capacity(sorted.len());
        for (position, value) in sorted {
            match deduped.last_mut() {
                Some(last) if last.0 == position => last.1 = value,
                _ => deduped.push((position, value)),
            }
        }

        self.from_sorted_entries(vars, 0, &deduped)
    }

    fn from_sorted_entries(&self, vars: &[Var], level: usize, entries: &[(u64, f64)]) -> Ref {
        if entries.is_empty() {
            return Ref::ZERO;
        }
        if level == vars.len() {
            return self.terminal(entries[0].1);
        }

        let bit = 1u64 << (vars.len() - level - 1);
        let split = entries.partition_point(|&(position, _)| position & bit == 0);
        let low = self.from_sorted_entries(vars, level + 1, &entries[..split]);
        let high = self.from_sorted_entries(vars, level + 1, &entries[split..]);
        self.mk_node(vars[level], low, high)
    }

    /// Evaluates the function at the assignment whose bits spell `bits`
    /// (`vars[0]` most significant).
    ///
    /// # Panics
    ///
    /// Panics if the diagram tests a variable missing from `vars`.
    pub fn eval(&self, node: Ref, vars: &[Var], bits: u64) -> f64 {
        let mut current = node;
        loop {
            match self.node(current) {
                Node::Terminal(value) => return value,
                Node::Decision { var, low, high } => {
                    let level = vars
                        .iter()
                        .position(|&v| v == var)
                        .unwrap_or_else(|| panic!("Variable {} is not in the ordering", var));
                    let bit = (bits >> (vars.len() - level - 1)) & 1;
                    current = if bit == 1 { high } else { low };
                }
            }
        }
    }

    /// Number of assignments to `vars` with a non-zero value.
    pub fn nonzero_count(&self, node: Ref, vars: &[Var]) -> BigUint {
        count_nonzero(self, node, vars)
    }

    /// Returns the set of all nodes reachable from the given roots.
    pub fn descendants(&self, nodes: impl IntoIterator<Item = Ref>) -> HashSet<Ref> {
        let mut visited = HashSet::new();
        let mut stack: Vec<Ref> = nodes.into_iter().collect();

        while let Some(node) = stack.pop() {
            if !visited.insert(node) {
                continue;
            }
            if let Node::Decision { low, high, .. } = self.node(node) {
                stack.push(low);
                stack.push(high);
            }
        }

        visited
    }

    /// Number of distinct nodes reachable from `node`, terminals included.
    pub fn size(&self, node: Ref) -> usize {
        self.descendants([node]).len()
    }
}

impl DecisionDiagram for Mtbdd {
    type Node = Ref;

    fn is_zero(&self, node: Ref) -> bool {
        node.is_zero()
    }

    fn variable(&self, node: Ref) -> u32 {
        self.node(node).position()
    }

    fn low(&self, node: Ref) -> Ref {
        Mtbdd::low(self, node)
    }

    fn high(&self, node: Ref) -> Ref {
        Mtbdd::high(self, node)
    }

    fn value(&self, node: Ref) -> Option<f64> {
        Mtbdd::value(self, node)
    }
}

use crate::reference::Ref;
use crate::types::Var;

/// An MTBDD node: either a terminal carrying a value, or a decision on a
/// variable with `low` (variable false) and `high` (variable true) children.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Node {
    Terminal(f64),
    Decision { var: Var, low: Ref, high: Ref },
}

impl Default for Node {
    fn default() -> Self {
        Node::Terminal(0.0)
    }
}

/// Hashable identity of a [`Node`], used by the unique table.
///
/// Terminal values are compared bitwise; the store never interns `-0.0` or
/// NaN, so bitwise equality coincides with numeric equality.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum NodeKey {
    Terminal(u64),
    Decision(Var, Ref, Ref),
}

impl Node {
    pub fn key(&self) -> NodeKey {
        match *self {
            Node::Terminal(value) => NodeKey::Terminal(value.to_bits()),
            Node::Decision { var, low, high } => NodeKey::Decision(var, low, high),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Node::Terminal(_))
    }

    /// Position of the node in the variable ordering.
    /// Terminals sit below every variable.
    pub fn position(&self) -> u32 {
        match self {
            Node::Terminal(_) => u32::MAX,
            Node::Decision { var, .. } => var.id(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_keys() {
        let a = Node::Terminal(1.5);
        let b = Node::Terminal(1.5);
        let c = Node::Terminal(2.5);
        assert_eq!(a.key(), b.key());
        assert_ne!(a.key(), c.key());

        let d = Node::Decision {
            var: Var::new(1),
            low: Ref::ZERO,
            high: Ref::new(1),
        };
        assert_eq!(d.key(), NodeKey::Decision(Var::new(1), Ref::ZERO, Ref::new(1)));
    }

    #[test]
    fn test_position() {
        assert_eq!(Node::Terminal(3.0).position(), u32::MAX);
        let d = Node::Decision {
            var: Var::new(4),
            low: Ref::ZERO,
            high: Ref::new(1),
        };
        assert_eq!(d.position(), 4);
        assert!(!d.is_terminal());
    }
}

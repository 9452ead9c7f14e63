//! Expression tree for boolean expressions

use std::fmt;

/// Binary operators. All share one precedence level and associate to the right.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    /// AND (&)
    And,
    /// OR (|)
    Or,
    /// XOR (^)
    Xor,
}

impl BinaryOperator {
    /// Map an operator character to its operator
    #[inline]
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '&' => Some(BinaryOperator::And),
            '|' => Some(BinaryOperator::Or),
            '^' => Some(BinaryOperator::Xor),
            _ => None,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            BinaryOperator::And => '&',
            BinaryOperator::Or => '|',
            BinaryOperator::Xor => '^',
        }
    }

    #[inline]
    pub fn apply(self, left: bool, right: bool) -> bool {
        match self {
            BinaryOperator::And => left && right,
            BinaryOperator::Or => left || right,
            BinaryOperator::Xor => left ^ right,
        }
    }
}

/// AST node. Variables are referenced by their slot in the owning expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Variable(usize),
    Not(Box<Node>),
    And(Box<Node>, Box<Node>),
    Or(Box<Node>, Box<Node>),
    Xor(Box<Node>, Box<Node>),
}

impl Node {
    pub fn not(operand: Node) -> Node {
        Node::Not(Box::new(operand))
    }

    /// Build a binary node for the given operator
    pub fn binary(operator: BinaryOperator, left: Node, right: Node) -> Node {
        let (left, right) = (Box::new(left), Box::new(right));
        match operator {
            BinaryOperator::And => Node::And(left, right),
            BinaryOperator::Or => Node::Or(left, right),
            BinaryOperator::Xor => Node::Xor(left, right),
        }
    }

    /// Split a binary node into its operator and operands
    pub fn as_binary(&self) -> Option<(BinaryOperator, &Node, &Node)> {
        match self {
            Node::And(l, r) => Some((BinaryOperator::And, l, r)),
            Node::Or(l, r) => Some((BinaryOperator::Or, l, r)),
            Node::Xor(l, r) => Some((BinaryOperator::Xor, l, r)),
            _ => None,
        }
    }

    /// Largest variable slot referenced by this tree
    pub fn max_slot(&self) -> usize {
        let mut max = 0;
        self.walk(|node| {
            if let Node::Variable(slot) = node {
                max = max.max(*slot);
            }
        });
        max
    }

    /// Number of nodes in the tree
    pub fn size(&self) -> usize {
        let mut count = 0;
        self.walk(|_| count += 1);
        count
    }

    /// Visit every node without recursion
    fn walk<'a>(&'a self, mut visit: impl FnMut(&'a Node)) {
        let mut pending = vec![self];
        while let Some(node) = pending.pop() {
            visit(node);
            match node {
                Node::Variable(_) => {}
                Node::Not(inner) => pending.push(inner),
                Node::And(l, r) | Node::Or(l, r) | Node::Xor(l, r) => {
                    pending.push(r);
                    pending.push(l);
                }
            }
        }
    }

    /// Render the tree fully parenthesized, naming slots through `names`
    pub fn display<'a>(&'a self, names: &'a [String]) -> NodeDisplay<'a> {
        NodeDisplay { node: self, names }
    }
}

/// Fully parenthesized rendering of a [`Node`]
pub struct NodeDisplay<'a> {
    node: &'a Node,
    names: &'a [String],
}

impl NodeDisplay<'_> {
    fn binary(
        &self,
        f: &mut fmt::Formatter<'_>,
        op: BinaryOperator,
        left: &Node,
        right: &Node,
    ) -> fmt::Result {
        write!(
            f,
            "({} {} {})",
            left.display(self.names),
            op.symbol(),
            right.display(self.names)
        )
    }
}

impl fmt::Display for NodeDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.node {
            Node::Variable(slot) => match self.names.get(*slot) {
                Some(name) => write!(f, "{}", name),
                None => write!(f, "${}", slot),
            },
            Node::Not(inner) => write!(f, "!{}", inner.display(self.names)),
            Node::And(l, r) => self.binary(f, BinaryOperator::And, l, r),
            Node::Or(l, r) => self.binary(f, BinaryOperator::Or, l, r),
            Node::Xor(l, r) => self.binary(f, BinaryOperator::Xor, l, r),
        }
    }
}

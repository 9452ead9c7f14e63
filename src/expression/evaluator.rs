//! Expression evaluation: direct tree walking and compiled closures

use crate::expression::ast::{BinaryOperator, Node};
use crate::expression::variable::Variable;
use std::fmt;
use std::sync::Arc;

/// Evaluate a tree against the current variable values.
///
/// Operator chains are walked along their right spine in a loop, so only
/// parentheses and negations add recursion.
///
/// # Panics
///
/// Panics if the tree references a slot outside `variables`.
pub fn check(node: &Node, variables: &[Variable]) -> bool {
    // result = flip ^ value(node); XOR operands fold into `flip`
    let mut flip = false;
    let mut node = node;

    loop {
        match node {
            Node::Variable(slot) => return flip ^ variables[*slot].value,
            Node::Not(inner) => return flip ^ !check(inner, variables),
            Node::And(left, right) => {
                if !check(left, variables) {
                    return flip;
                }
                node = right;
            }
            Node::Or(left, right) => {
                if check(left, variables) {
                    return !flip;
                }
                node = right;
            }
            Node::Xor(left, right) => {
                flip ^= check(left, variables);
                node = right;
            }
        }
    }
}

type Predicate = dyn Fn(&[Variable]) -> bool + Send + Sync;

/// A tree lowered once into nested closures over variable slots
#[derive(Clone)]
pub struct CompiledExpression {
    predicate: Arc<Predicate>,
}

impl CompiledExpression {
    /// # Panics
    ///
    /// Panics if `variables` is shorter than the variable list the tree was
    /// parsed with.
    #[inline]
    pub fn evaluate(&self, variables: &[Variable]) -> bool {
        (self.predicate)(variables)
    }
}

impl fmt::Debug for CompiledExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledExpression").finish_non_exhaustive()
    }
}

/// Compile a tree into a reusable evaluator
pub fn compile(node: &Node) -> CompiledExpression {
    CompiledExpression {
        predicate: Arc::from(lower(node)),
    }
}

fn lower(node: &Node) -> Box<Predicate> {
    match node {
        Node::Variable(slot) => {
            let slot = *slot;
            Box::new(move |vars: &[Variable]| vars[slot].value)
        }
        // skip one closure hop for the common `!x`
        Node::Not(inner) => match inner.as_ref() {
            Node::Variable(slot) => {
                let slot = *slot;
                Box::new(move |vars: &[Variable]| !vars[slot].value)
            }
            inner => {
                let inner = lower(inner);
                Box::new(move |vars: &[Variable]| !inner(vars))
            }
        },
        Node::And(..) | Node::Or(..) | Node::Xor(..) => {
            let mut links: Vec<(BinaryOperator, Box<Predicate>)> = Vec::new();
            let mut node = node;
            while let Some((op, left, right)) = node.as_binary() {
                links.push((op, lower(left)));
                node = right;
            }
            let tail = lower(node);

            Box::new(move |vars: &[Variable]| {
                let mut flip = false;
                for (op, left) in &links {
                    match op {
                        BinaryOperator::And => {
                            if !left(vars) {
                                return flip;
                            }
                        }
                        BinaryOperator::Or => {
                            if left(vars) {
                                return !flip;
                            }
                        }
                        BinaryOperator::Xor => flip ^= left(vars),
                    }
                }
                flip ^ tail(vars)
            })
        }
    }
}

//! Public boolean expression type

use crate::error::{ExpressionError, Result};
use crate::expression::ast::Node;
use crate::expression::cache;
use crate::expression::evaluator::{compile, CompiledExpression};
use crate::expression::parser::{self, ParseOptions, ParsedExpression};
use crate::expression::variable::{IdentifierComparer, Variable, VariableSet};
use std::fmt;
use std::ops::{Index, IndexMut};

/// A parsed boolean expression over named variables.
///
/// Expression text combines alphanumeric identifiers with `&` (AND), `|` (OR),
/// `^` (XOR), prefix `!` or `~` (NOT) and parentheses. Every distinct
/// identifier becomes one [`Variable`], initially `false`; set values and call
/// [`evaluate`](Self::evaluate) as often as needed.
///
/// # Operator grouping
///
/// AND, OR and XOR have **equal precedence and group to the right**.
/// `a & b | c` means `a & (b | c)`, not `(a & b) | c`. Parenthesize when
/// conventional precedence is intended.
///
/// # Panics
///
/// Indexing (`expr["name"]`, read or write) panics with "key not found" when
/// the identifier does not occur in the expression. Use
/// [`try_get_variable`](Self::try_get_variable) or
/// [`variable`](Self::variable) to probe without panicking.
///
/// # Example
///
/// ```
/// use gemstone_common::BooleanExpression;
///
/// let mut expr = BooleanExpression::new("Breaker & !(Alarm | Manual)").unwrap();
/// expr["breaker"].value = true;
/// assert!(expr.evaluate());
///
/// expr["ALARM"].value = true;
/// assert!(!expr.evaluate());
/// ```
#[derive(Debug, Clone)]
pub struct BooleanExpression {
    text: String,
    tree: Node,
    variables: VariableSet,
    compiled: CompiledExpression,
}

impl BooleanExpression {
    /// Parse `text` matching identifiers case-insensitively
    pub fn new(text: &str) -> Result<Self> {
        Self::with_options(text, ParseOptions::default())
    }

    pub fn with_comparer(text: &str, comparer: IdentifierComparer) -> Result<Self> {
        Self::with_options(text, ParseOptions::with_comparer(comparer))
    }

    pub fn with_options(text: &str, options: ParseOptions) -> Result<Self> {
        let parsed = parser::parse(text, options)?;
        Ok(Self::from_parsed(text, parsed))
    }

    /// Like [`with_options`](Self::with_options), reusing structure parsed
    /// earlier for the same text and options. Variables are always fresh.
    pub fn cached(text: &str, options: ParseOptions) -> Result<Self> {
        let parsed = cache::get_or_parse(text, options)?;
        Ok(Self::from_parsed(text, ParsedExpression::clone(&parsed)))
    }

    fn from_parsed(text: &str, parsed: ParsedExpression) -> Self {
        debug_assert!(parsed.tree.max_slot() < parsed.variables.len());
        let compiled = compile(&parsed.tree);
        Self {
            text: text.to_string(),
            tree: parsed.tree,
            variables: parsed.variables,
            compiled,
        }
    }

    /// Evaluate against the current variable values
    #[inline]
    pub fn evaluate(&self) -> bool {
        self.compiled.evaluate(self.variables.as_slice())
    }

    /// All variables in the order their identifiers first appear
    pub fn variables(&self) -> &[Variable] {
        self.variables.as_slice()
    }

    /// Identifiers paired with their mutable values, in variable order
    pub fn values_mut(&mut self) -> impl Iterator<Item = (&str, &mut bool)> {
        self.variables
            .as_mut_slice()
            .iter_mut()
            .map(|v| (v.identifier.as_str(), &mut v.value))
    }

    pub fn try_get_variable(&self, identifier: &str) -> Option<&Variable> {
        self.variables.get(identifier)
    }

    pub fn try_get_variable_mut(&mut self, identifier: &str) -> Option<&mut Variable> {
        self.variables.get_mut(identifier)
    }

    /// Look up a variable, failing with [`ExpressionError::UnknownIdentifier`]
    pub fn variable(&self, identifier: &str) -> Result<&Variable> {
        self.try_get_variable(identifier)
            .ok_or_else(|| ExpressionError::UnknownIdentifier(identifier.to_string()))
    }

    pub fn variable_mut(&mut self, identifier: &str) -> Result<&mut Variable> {
        self.variables
            .get_mut(identifier)
            .ok_or_else(|| ExpressionError::UnknownIdentifier(identifier.to_string()))
    }

    pub fn set(&mut self, identifier: &str, value: bool) -> Result<()> {
        self.variable_mut(identifier)?.value = value;
        Ok(())
    }

    /// Set several values. Stops at the first unknown identifier; values set
    /// before it stay set.
    pub fn assign<I, S>(&mut self, values: I) -> Result<()>
    where
        I: IntoIterator<Item = (S, bool)>,
        S: AsRef<str>,
    {
        for (identifier, value) in values {
            self.set(identifier.as_ref(), value)?;
        }
        Ok(())
    }

    /// Set every variable back to `false`
    pub fn reset(&mut self) {
        for variable in self.variables.as_mut_slice() {
            variable.value = false;
        }
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.variables.slot(identifier).is_some()
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Source text as given at construction
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn comparer(&self) -> IdentifierComparer {
        self.variables.comparer()
    }

    pub fn tree(&self) -> &Node {
        &self.tree
    }

    /// Fully parenthesized rendering showing the grouping actually used
    pub fn grouped(&self) -> String {
        let names = self.variables.identifiers();
        self.tree.display(&names).to_string()
    }

    /// Variables as a JSON array of `{identifier, value}`
    pub fn snapshot_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self.variables())?)
    }
}

impl Index<&str> for BooleanExpression {
    type Output = Variable;

    fn index(&self, identifier: &str) -> &Variable {
        self.try_get_variable(identifier).expect("key not found")
    }
}

impl IndexMut<&str> for BooleanExpression {
    fn index_mut(&mut self, identifier: &str) -> &mut Variable {
        self.try_get_variable_mut(identifier).expect("key not found")
    }
}

impl fmt::Display for BooleanExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl std::str::FromStr for BooleanExpression {
    type Err = ExpressionError;

    fn from_str(text: &str) -> Result<Self> {
        Self::new(text)
    }
}

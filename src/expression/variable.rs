//! Named boolean variables and identifier matching

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::borrow::Cow;

/// A named boolean bound to every occurrence of its identifier in an expression
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    pub(crate) identifier: String,
    /// Current value, read by every evaluation
    pub value: bool,
}

impl Variable {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            value: false,
        }
    }

    /// Identifier as spelled at its first occurrence
    pub fn identifier(&self) -> &str {
        &self.identifier
    }
}

/// Equality strategy for identifiers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentifierComparer {
    /// `X` and `x` name the same variable
    #[default]
    IgnoreCase,
    /// `X` and `x` are distinct variables
    CaseSensitive,
}

impl IdentifierComparer {
    /// Normalized map key for an identifier.
    ///
    /// `IgnoreCase` maps each character to its single-character uppercase
    /// form, leaving characters whose uppercase expands (`ß` -> `SS`) as they
    /// are, so matching is per character and never changes identifier length.
    #[inline]
    pub fn key<'a>(&self, identifier: &'a str) -> Cow<'a, str> {
        match self {
            IdentifierComparer::CaseSensitive => Cow::Borrowed(identifier),
            IdentifierComparer::IgnoreCase => {
                if identifier.chars().all(|c| simple_uppercase(c) == c) {
                    Cow::Borrowed(identifier)
                } else {
                    Cow::Owned(identifier.chars().map(simple_uppercase).collect())
                }
            }
        }
    }

    pub fn matches(&self, a: &str, b: &str) -> bool {
        self.key(a) == self.key(b)
    }
}

#[inline]
fn simple_uppercase(c: char) -> char {
    let mut upper = c.to_uppercase();
    match (upper.next(), upper.next()) {
        (Some(u), None) => u,
        _ => c,
    }
}

/// Variables of one expression, in first-encounter order, with lookup by identifier
#[derive(Debug, Clone, Default)]
pub struct VariableSet {
    comparer: IdentifierComparer,
    variables: SmallVec<[Variable; 8]>,
    slots: AHashMap<String, usize>,
}

impl VariableSet {
    pub fn new(comparer: IdentifierComparer) -> Self {
        Self {
            comparer,
            variables: SmallVec::new(),
            slots: AHashMap::new(),
        }
    }

    /// Return the slot for `identifier`, creating its variable on first sight
    pub fn bind(&mut self, identifier: &str) -> usize {
        if let Some(&slot) = self.slots.get(self.comparer.key(identifier).as_ref()) {
            return slot;
        }

        let slot = self.variables.len();
        self.variables.push(Variable::new(identifier));
        self.slots
            .insert(self.comparer.key(identifier).into_owned(), slot);
        slot
    }

    #[inline]
    pub fn slot(&self, identifier: &str) -> Option<usize> {
        self.slots.get(self.comparer.key(identifier).as_ref()).copied()
    }

    pub fn get(&self, identifier: &str) -> Option<&Variable> {
        self.slot(identifier).map(|slot| &self.variables[slot])
    }

    pub fn get_mut(&mut self, identifier: &str) -> Option<&mut Variable> {
        let slot = self.slot(identifier)?;
        Some(&mut self.variables[slot])
    }

    #[inline]
    pub fn as_slice(&self) -> &[Variable] {
        &self.variables
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [Variable] {
        &mut self.variables
    }

    pub fn comparer(&self) -> IdentifierComparer {
        self.comparer
    }

    pub fn identifiers(&self) -> Vec<String> {
        self.variables
            .iter()
            .map(|v| v.identifier.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}

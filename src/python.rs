//! Python bindings via PyO3

use crate::expression::{BooleanExpression, IdentifierComparer};
use pyo3::exceptions::PyKeyError;
use pyo3::prelude::*;
use std::collections::HashMap;

/// Boolean expression exposed to Python as `BooleanExpression`
#[pyclass(name = "BooleanExpression")]
struct PyBooleanExpression {
    inner: BooleanExpression,
}

fn comparer(case_sensitive: bool) -> IdentifierComparer {
    if case_sensitive {
        IdentifierComparer::CaseSensitive
    } else {
        IdentifierComparer::IgnoreCase
    }
}

#[pymethods]
impl PyBooleanExpression {
    /// Parse expression text
    ///
    /// # Raises
    /// ValueError if the text is malformed
    #[new]
    #[pyo3(signature = (text, case_sensitive=false))]
    fn new(text: &str, case_sensitive: bool) -> PyResult<Self> {
        let inner = BooleanExpression::with_comparer(text, comparer(case_sensitive))?;
        Ok(Self { inner })
    }

    fn evaluate(&self) -> bool {
        self.inner.evaluate()
    }

    /// List of (identifier, value) in first-encounter order
    fn variables(&self) -> Vec<(String, bool)> {
        self.inner
            .variables()
            .iter()
            .map(|v| (v.identifier().to_string(), v.value))
            .collect()
    }

    fn try_get_variable(&self, identifier: &str) -> Option<bool> {
        self.inner.try_get_variable(identifier).map(|v| v.value)
    }

    fn __getitem__(&self, identifier: &str) -> PyResult<bool> {
        self.inner
            .try_get_variable(identifier)
            .map(|v| v.value)
            .ok_or_else(|| PyKeyError::new_err(identifier.to_string()))
    }

    fn __setitem__(&mut self, identifier: &str, value: bool) -> PyResult<()> {
        Ok(self.inner.set(identifier, value)?)
    }

    fn __contains__(&self, identifier: &str) -> bool {
        self.inner.contains(identifier)
    }

    fn __len__(&self) -> usize {
        self.inner.len()
    }

    fn __str__(&self) -> String {
        self.inner.text().to_string()
    }

    fn __repr__(&self) -> String {
        format!("BooleanExpression({:?})", self.inner.text())
    }
}

/// Parse and evaluate in one call, using the parse cache
///
/// # Raises
/// ValueError if the text is malformed, KeyError for an unknown identifier
#[pyfunction]
#[pyo3(signature = (text, values, case_sensitive=false))]
fn evaluate(text: &str, values: HashMap<String, bool>, case_sensitive: bool) -> PyResult<bool> {
    let options = crate::expression::ParseOptions::with_comparer(comparer(case_sensitive));
    let mut expression = BooleanExpression::cached(text, options)?;
    expression.assign(values)?;
    Ok(expression.evaluate())
}

/// Python module definition
#[pymodule]
fn gemstone_common(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(evaluate, m)?)?;
    m.add_class::<PyBooleanExpression>()?;
    Ok(())
}

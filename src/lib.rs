//! Gemstone Common - boolean expression engine
//!
//! Parses textual boolean expressions over named variables and evaluates
//! them on demand against the variables' current values, with optional
//! Python bindings via PyO3 (feature `python`).
//!
//! ```
//! use gemstone_common::BooleanExpression;
//!
//! // AND, OR and XOR share one precedence level and group to the right
//! let mut expr = BooleanExpression::new("a & b | c").unwrap();
//! expr.assign([("a", false), ("b", true), ("c", true)]).unwrap();
//! assert!(!expr.evaluate()); // a & (b | c)
//! ```

pub mod config;
pub mod error;
pub mod expression;

#[cfg(feature = "python")]
mod python;

pub use config::ExpressionConfig;
pub use error::{ExpressionError, Result};
pub use expression::{BooleanExpression, IdentifierComparer, ParseOptions, Variable};

//! Boolean expression parsing and evaluation
//!
//! This module parses expression strings like "Breaker & !(Alarm | Manual)"
//! into a tree over named variables and evaluates it against their current
//! values.

mod ast;
pub mod cache;
mod engine;
mod evaluator;
pub mod parser;
mod variable;


pub use ast::*;
pub use engine::*;
pub use evaluator::*;
pub use parser::{parse, ParseOptions, ParsedExpression, DEFAULT_MAX_DEPTH};
pub use variable::*;

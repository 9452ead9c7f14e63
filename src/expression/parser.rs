//! Boolean expression parser
//!
//! Grammar:
//!
//! ```text
//! Expr  := Sub (BinOp Expr)?
//! Sub   := '(' Expr ')' | ('!' | '~') Sub | Identifier
//! BinOp := '&' | '|' | '^'
//! ```
//!
//! The three binary operators share a single precedence level and the right
//! operand is parsed as a whole expression, so chains group to the right:
//! `a & b | c` is `a & (b | c)`. Use parentheses to group otherwise.

use crate::error::{Expected, ExpressionError, Result};
use crate::expression::ast::{BinaryOperator, Node};
use crate::expression::variable::{IdentifierComparer, VariableSet};
use log::debug;

/// Default limit on sub-expression nesting
pub const DEFAULT_MAX_DEPTH: usize = 1024;

/// Options controlling how expression text is parsed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParseOptions {
    pub comparer: IdentifierComparer,
    /// Maximum nesting of parentheses and negations
    pub max_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            comparer: IdentifierComparer::default(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ParseOptions {
    pub fn with_comparer(comparer: IdentifierComparer) -> Self {
        Self {
            comparer,
            ..Self::default()
        }
    }
}

/// Parsed structure: the tree plus the variables it references, all unset
#[derive(Debug, Clone)]
pub struct ParsedExpression {
    pub tree: Node,
    pub variables: VariableSet,
}

/// Parse expression text with the given options
pub fn parse(text: &str, options: ParseOptions) -> Result<ParsedExpression> {
    let mut parser = Parser::new(text, options);

    match parser.parse_root() {
        Ok(tree) => {
            debug!(
                "parsed boolean expression {:?} ({} variables)",
                text,
                parser.variables.len()
            );
            Ok(ParsedExpression {
                tree,
                variables: parser.variables,
            })
        }
        Err(err) => {
            debug!("failed to parse boolean expression {:?}: {}", text, err);
            Err(err)
        }
    }
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
    depth: usize,
    max_depth: usize,
    variables: VariableSet,
}

impl Parser {
    fn new(text: &str, options: ParseOptions) -> Self {
        Self {
            chars: text.chars().collect(),
            pos: 0,
            depth: 0,
            max_depth: options.max_depth,
            variables: VariableSet::new(options.comparer),
        }
    }

    #[inline]
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    #[inline]
    fn advance(&mut self) {
        self.pos += 1;
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.advance();
        }
    }

    fn enter(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(ExpressionError::NestingTooDeep {
                limit: self.max_depth,
                position: self.pos,
            });
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn parse_root(&mut self) -> Result<Node> {
        let tree = self.parse_expression()?;

        self.skip_whitespace();
        if let Some(found) = self.peek() {
            return Err(ExpressionError::TrailingInput {
                found,
                position: self.pos,
            });
        }

        Ok(tree)
    }

    /// Parse `Sub (BinOp Sub)*` in a loop and fold it to the right, so a long
    /// operator chain costs no recursion and no nesting depth.
    fn parse_expression(&mut self) -> Result<Node> {
        let mut links: Vec<(Node, BinaryOperator)> = Vec::new();
        let mut last = self.parse_sub()?;

        loop {
            self.skip_whitespace();
            let Some(op) = self.peek().and_then(BinaryOperator::from_char) else {
                break;
            };
            self.advance();
            let next = self.parse_sub()?;
            links.push((std::mem::replace(&mut last, next), op));
        }

        Ok(links
            .into_iter()
            .rev()
            .fold(last, |right, (left, op)| Node::binary(op, left, right)))
    }

    fn parse_sub(&mut self) -> Result<Node> {
        self.skip_whitespace();
        let position = self.pos;

        match self.peek() {
            None => Err(ExpressionError::UnexpectedEnd {
                position,
                expected: Expected::Operand,
            }),
            Some('(') => {
                self.advance();
                self.enter()?;
                let inner = self.parse_expression()?;
                self.expect_close_paren()?;
                self.leave();
                Ok(inner)
            }
            Some('!') | Some('~') => {
                self.advance();
                self.enter()?;
                let operand = self.parse_sub()?;
                self.leave();
                Ok(Node::not(operand))
            }
            Some(c) if c.is_alphanumeric() => Ok(self.parse_identifier()),
            Some(found) => Err(ExpressionError::UnexpectedCharacter {
                found,
                position,
                expected: Expected::Operand,
            }),
        }
    }

    fn expect_close_paren(&mut self) -> Result<()> {
        self.skip_whitespace();
        match self.peek() {
            Some(')') => {
                self.advance();
                Ok(())
            }
            Some(found) => Err(ExpressionError::UnexpectedCharacter {
                found,
                position: self.pos,
                expected: Expected::CloseParenOrOperator,
            }),
            None => Err(ExpressionError::UnexpectedEnd {
                position: self.pos,
                expected: Expected::CloseParen,
            }),
        }
    }

    fn parse_identifier(&mut self) -> Node {
        let start = self.pos;
        while self.peek().is_some_and(char::is_alphanumeric) {
            self.advance();
        }

        let identifier: String = self.chars[start..self.pos].iter().collect();
        Node::Variable(self.variables.bind(&identifier))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_default(text: &str) -> Result<ParsedExpression> {
        parse(text, ParseOptions::default())
    }

    fn render(text: &str) -> String {
        let parsed = parse_default(text).unwrap();
        let names = parsed.variables.identifiers();
        parsed.tree.display(&names).to_string()
    }

    #[test]
    fn test_parse_single_identifier() {
        let parsed = parse_default("alarm").unwrap();
        assert_eq!(parsed.tree, Node::Variable(0));
        assert_eq!(parsed.variables.identifiers(), vec!["alarm"]);
    }

    #[test]
    fn test_parse_is_right_associative() {
        assert_eq!(render("a & b | c"), "(a & (b | c))");
        assert_eq!(render("a ^ b & c | d"), "(a ^ (b & (c | d)))");
    }

    #[test]
    fn test_parentheses_override_grouping() {
        assert_eq!(render("(a & b) | c"), "((a & b) | c)");
        assert_eq!(render("((a))"), "a");
    }

    #[test]
    fn test_negation_binds_to_sub_expression() {
        assert_eq!(render("!a & b"), "(!a & b)");
        assert_eq!(render("~(a | b)"), "!(a | b)");
        assert_eq!(render("!!a"), "!!a");
    }

    #[test]
    fn test_whitespace_is_insignificant() {
        assert_eq!(render("  a&b  "), render("a & b"));
        assert_eq!(render("\t( a\n|b )"), "(a | b)");
    }

    #[test]
    fn test_identifiers_are_alphanumeric_runs() {
        let parsed = parse_default("Pump1 & 2ndStage").unwrap();
        assert_eq!(parsed.variables.identifiers(), vec!["Pump1", "2ndStage"]);
    }

    #[test]
    fn test_repeated_identifier_shares_slot() {
        let parsed = parse_default("X & x | X").unwrap();
        assert_eq!(parsed.variables.len(), 1);
        assert_eq!(parsed.tree.max_slot(), 0);
    }

    #[test]
    fn test_case_sensitive_option() {
        let options = ParseOptions::with_comparer(IdentifierComparer::CaseSensitive);
        let parsed = parse("X & x", options).unwrap();
        assert_eq!(parsed.variables.identifiers(), vec!["X", "x"]);
    }

    #[test]
    fn test_empty_text_fails() {
        for text in ["", "   "] {
            match parse_default(text) {
                Err(ExpressionError::UnexpectedEnd { expected, .. }) => {
                    assert_eq!(expected, Expected::Operand)
                }
                other => panic!("Expected UnexpectedEnd for {:?}, got {:?}", text, other),
            }
        }
    }

    #[test]
    fn test_trailing_operator_fails() {
        match parse_default("a &") {
            Err(ExpressionError::UnexpectedEnd { position, expected }) => {
                assert_eq!(position, 3);
                assert_eq!(expected, Expected::Operand);
            }
            other => panic!("Expected UnexpectedEnd, got {:?}", other),
        }
    }

    #[test]
    fn test_unbalanced_parenthesis_fails() {
        match parse_default("(a & b") {
            Err(ExpressionError::UnexpectedEnd { expected, .. }) => {
                assert_eq!(expected, Expected::CloseParen)
            }
            other => panic!("Expected UnexpectedEnd, got {:?}", other),
        }
    }

    #[test]
    fn test_stray_close_paren_is_trailing_input() {
        match parse_default("a & b)") {
            Err(ExpressionError::TrailingInput { found, position }) => {
                assert_eq!(found, ')');
                assert_eq!(position, 5);
            }
            other => panic!("Expected TrailingInput, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_operator_is_trailing_input() {
        assert!(matches!(
            parse_default("a b"),
            Err(ExpressionError::TrailingInput { found: 'b', position: 2 })
        ));
    }

    #[test]
    fn test_unexpected_character_names_expectation() {
        match parse_default("a & %") {
            Err(ExpressionError::UnexpectedCharacter {
                found,
                position,
                expected,
            }) => {
                assert_eq!(found, '%');
                assert_eq!(position, 4);
                assert_eq!(expected, Expected::Operand);
            }
            other => panic!("Expected UnexpectedCharacter, got {:?}", other),
        }

        match parse_default("(a b)") {
            Err(ExpressionError::UnexpectedCharacter {
                found, expected, ..
            }) => {
                assert_eq!(found, 'b');
                assert_eq!(expected, Expected::CloseParenOrOperator);
            }
            other => panic!("Expected UnexpectedCharacter, got {:?}", other),
        }

        assert!(matches!(
            parse_default("& a"),
            Err(ExpressionError::UnexpectedCharacter { found: '&', position: 0, .. })
        ));
        assert!(matches!(
            parse_default("()"),
            Err(ExpressionError::UnexpectedCharacter { found: ')', position: 1, .. })
        ));
    }

    #[test]
    fn test_positions_count_characters() {
        // 'é' is two bytes but one character
        assert!(matches!(
            parse_default("é & )"),
            Err(ExpressionError::UnexpectedCharacter { found: ')', position: 4, .. })
        ));
    }

    #[test]
    fn test_nesting_limit() {
        let options = ParseOptions {
            max_depth: 8,
            ..ParseOptions::default()
        };
        let deep = format!("{}a{}", "(".repeat(20), ")".repeat(20));
        assert!(matches!(
            parse(&deep, options),
            Err(ExpressionError::NestingTooDeep { limit: 8, .. })
        ));
        assert!(parse(&deep, ParseOptions::default()).is_ok());

        let negations = format!("{}a", "!".repeat(20));
        assert!(matches!(
            parse(&negations, options),
            Err(ExpressionError::NestingTooDeep { .. })
        ));
    }

    #[test]
    fn test_long_operator_chain_is_not_nesting() {
        let chain = (0..2500)
            .map(|i| format!("v{}", i))
            .collect::<Vec<_>>()
            .join(" | ");
        let parsed = parse_default(&chain).unwrap();
        assert_eq!(parsed.variables.len(), 2500);

        // still right-associative: v0 | (v1 | (...))
        match &parsed.tree {
            Node::Or(left, right) => {
                assert_eq!(**left, Node::Variable(0));
                assert!(matches!(**right, Node::Or(_, _)));
            }
            other => panic!("Expected OR at the root, got {:?}", other),
        }

        // a chain inside one pair of parentheses needs a single level
        let options = ParseOptions {
            max_depth: 1,
            ..ParseOptions::default()
        };
        assert!(parse(&format!("({})", chain), options).is_ok());
        assert!(parse("((a))", options).is_err());
    }
}

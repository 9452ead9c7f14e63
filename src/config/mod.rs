//! Configuration module for expression definitions
//!
//! Expressions usually come from configuration files. This module handles
//! deserializing expression text, identifier matching and initial values
//! from JSON.

use crate::error::{ExpressionError, Result};
use crate::expression::{BooleanExpression, IdentifierComparer, ParseOptions, DEFAULT_MAX_DEPTH};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// One configured boolean expression
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpressionConfig {
    /// Expression text, e.g. "Breaker & !Alarm"
    pub expression: String,
    /// Identifier matching, "ignore_case" (default) or "case_sensitive"
    #[serde(default)]
    pub comparer: IdentifierComparer,
    /// Nesting limit, defaults to the parser's limit
    #[serde(default)]
    pub max_depth: Option<usize>,
    /// Initial variable values
    #[serde(default)]
    pub values: BTreeMap<String, bool>,
}

impl ExpressionConfig {
    pub fn new(expression: impl Into<String>) -> Self {
        Self {
            expression: expression.into(),
            comparer: IdentifierComparer::default(),
            max_depth: None,
            values: BTreeMap::new(),
        }
    }

    /// Deserialize a single expression config from JSON.
    /// A bare JSON string is accepted as the expression text.
    pub fn from_json(json: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        match value {
            serde_json::Value::String(expression) => Ok(Self::new(expression)),
            value @ serde_json::Value::Object(_) => Ok(serde_json::from_value(value)?),
            other => Err(ExpressionError::InvalidConfig(format!(
                "expected string or object, found {}",
                other
            ))),
        }
    }

    pub fn options(&self) -> Result<ParseOptions> {
        let max_depth = self.max_depth.unwrap_or(DEFAULT_MAX_DEPTH);
        if max_depth == 0 {
            return Err(ExpressionError::InvalidConfig(
                "max_depth must be at least 1".to_string(),
            ));
        }
        Ok(ParseOptions {
            comparer: self.comparer,
            max_depth,
        })
    }

    /// Parse the expression and apply the initial values.
    /// A value for an identifier the expression does not use is an error.
    pub fn build(&self) -> Result<BooleanExpression> {
        let mut expression = BooleanExpression::with_options(&self.expression, self.options()?)?;
        expression.assign(self.values.iter().map(|(k, v)| (k.as_str(), *v)))?;
        Ok(expression)
    }
}

/// Deserialize named expressions
/// Expected format: {"name": "a & b" | ExpressionConfig, ...}
pub fn deserialize_expressions(json: &str) -> Result<HashMap<String, ExpressionConfig>> {
    let raw: HashMap<String, serde_json::Value> = serde_json::from_str(json)?;
    let mut configs = HashMap::with_capacity(raw.len());

    for (name, value) in raw {
        let config = match value {
            serde_json::Value::String(expression) => ExpressionConfig::new(expression),
            value @ serde_json::Value::Object(_) => serde_json::from_value(value)?,
            other => {
                return Err(ExpressionError::InvalidConfig(format!(
                    "expression '{}': expected string or object, found {}",
                    name, other
                )))
            }
        };
        configs.insert(name, config);
    }

    Ok(configs)
}

/// Deserialize and build named expressions, failing on the first invalid one
pub fn load_expressions(json: &str) -> Result<HashMap<String, BooleanExpression>> {
    deserialize_expressions(json)?
        .into_iter()
        .map(|(name, config)| config.build().map(|expression| (name, expression)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json_object() {
        let config = ExpressionConfig::from_json(
            r#"{"expression": "Run & !Fault", "values": {"run": true}}"#,
        )
        .unwrap();
        assert_eq!(config.comparer, IdentifierComparer::IgnoreCase);
        assert_eq!(config.max_depth, None);

        let expression = config.build().unwrap();
        assert!(expression.evaluate());
        assert!(expression["RUN"].value);
    }

    #[test]
    fn test_from_json_bare_string() {
        let config = ExpressionConfig::from_json(r#""a ^ b""#).unwrap();
        assert_eq!(config, ExpressionConfig::new("a ^ b"));
    }

    #[test]
    fn test_case_sensitive_comparer() {
        let config = ExpressionConfig::from_json(
            r#"{"expression": "X | x", "comparer": "case_sensitive", "values": {"x": true}}"#,
        )
        .unwrap();
        let expression = config.build().unwrap();
        assert_eq!(expression.len(), 2);
        assert!(!expression["X"].value);
        assert!(expression.evaluate());
    }

    #[test]
    fn test_unknown_value_is_rejected() {
        let config = ExpressionConfig::from_json(
            r#"{"expression": "a & b", "values": {"c": true}}"#,
        )
        .unwrap();
        assert!(matches!(
            config.build(),
            Err(ExpressionError::UnknownIdentifier(id)) if id == "c"
        ));
    }

    #[test]
    fn test_malformed_expression_is_rejected() {
        let err = ExpressionConfig::new("(a & b").build().unwrap_err();
        assert!(err.is_parse_error());
    }

    #[test]
    fn test_invalid_json_shapes() {
        assert!(matches!(
            ExpressionConfig::from_json("42"),
            Err(ExpressionError::InvalidConfig(_))
        ));
        assert!(matches!(
            ExpressionConfig::from_json("{not json"),
            Err(ExpressionError::Deserialization(_))
        ));
        assert!(matches!(
            ExpressionConfig::from_json(r#"{"values": {}}"#),
            Err(ExpressionError::Deserialization(_))
        ));
    }

    #[test]
    fn test_zero_max_depth_is_invalid() {
        let mut config = ExpressionConfig::new("a");
        config.max_depth = Some(0);
        assert!(matches!(config.build(), Err(ExpressionError::InvalidConfig(_))));

        config.max_depth = Some(1);
        assert!(config.build().is_ok());
    }

    #[test]
    fn test_load_expressions() {
        let json = r#"{
            "trip": "Overcurrent | Undervoltage",
            "ready": {"expression": "Breaker & !Trip", "values": {"breaker": true}}
        }"#;
        let expressions = load_expressions(json).unwrap();
        assert_eq!(expressions.len(), 2);
        assert!(!expressions["trip"].evaluate());
        assert!(expressions["ready"].evaluate());
    }

    #[test]
    fn test_load_expressions_fails_on_any_invalid() {
        let json = r#"{"good": "a", "bad": "a &"}"#;
        assert!(load_expressions(json).is_err());

        let json = r#"{"odd": true}"#;
        assert!(matches!(
            deserialize_expressions(json),
            Err(ExpressionError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_config_round_trips_through_serde() {
        let mut config = ExpressionConfig::new("a | b");
        config.values.insert("a".to_string(), true);
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(ExpressionConfig::from_json(&json).unwrap(), config);
    }
}

//! Formula-valued numeric fields.
//!
//! A [`Formula`] is data only: an arithmetic expression plus the variable
//! paths it is allowed to reference. Evaluation lives in `sw-formula`.

use serde::{Deserialize, Serialize};

/// An arithmetic expression over named character-state variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Formula {
    /// Expression text, e.g. `10 + abilities.dex.modifier + abilities.con.modifier`.
    pub expression: String,
    /// Variable paths the expression may reference.
    #[serde(default)]
    pub variables: Vec<String>,
}

impl Formula {
    /// Create a formula from an expression and its declared variables.
    pub fn new<S: Into<String>>(
        expression: impl Into<String>,
        variables: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            expression: expression.into(),
            variables: variables.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns true if `path` is one of the declared variables.
    pub fn declares(&self, path: &str) -> bool {
        self.variables.iter().any(|v| v == path)
    }
}

/// A numeric effect field: either a literal or a formula.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumericValue {
    /// A fixed number.
    Literal(i32),
    /// A number computed from character state.
    Formula(Formula),
}

impl NumericValue {
    /// The formula, if this value is not a literal.
    pub fn formula(&self) -> Option<&Formula> {
        match self {
            Self::Literal(_) => None,
            Self::Formula(f) => Some(f),
        }
    }
}

impl Default for NumericValue {
    fn default() -> Self {
        Self::Literal(0)
    }
}

impl From<i32> for NumericValue {
    fn from(n: i32) -> Self {
        Self::Literal(n)
    }
}

impl From<Formula> for NumericValue {
    fn from(f: Formula) -> Self {
        Self::Formula(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_value_deserializes_literal_or_formula() {
        let lit: NumericValue = serde_json::from_str("2").unwrap();
        assert_eq!(lit, NumericValue::Literal(2));

        let f: NumericValue = serde_json::from_str(
            r#"{"expression": "10 + abilities.dex.modifier", "variables": ["abilities.dex.modifier"]}"#,
        )
        .unwrap();
        let formula = f.formula().unwrap();
        assert!(formula.declares("abilities.dex.modifier"));
        assert!(!formula.declares("level"));
    }

    #[test]
    fn variables_default_to_empty() {
        let f: Formula = serde_json::from_str(r#"{"expression": "1 + 1"}"#).unwrap();
        assert!(f.variables.is_empty());
    }
}

// Rule-expression parsing

use serde::{Deserialize, Serialize};

/// One parsed `(name, parameters)` pair.
///
/// Parameters stay strings at parse time; each check coerces the ones
/// it needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleInstruction {
    pub name: String,
    #[serde(default)]
    pub params: Vec<String>,
}

impl RuleInstruction {
    /// Instruction with no parameters.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
        }
    }

    /// Instruction with an explicit parameter list.
    pub fn with_params(name: impl Into<String>, params: Vec<String>) -> Self {
        Self {
            name: name.into(),
            params,
        }
    }

    /// Parse a single `name:p1,p2` item. Only the first `:` separates
    /// the name, so later colons survive inside the first parameter.
    fn from_item(item: &str) -> Self {
        match item.split_once(':') {
            Some((name, blob)) if !blob.is_empty() => Self {
                name: name.to_string(),
                params: blob.split(',').map(str::to_string).collect(),
            },
            Some((name, _)) => Self::new(name),
            None => Self::new(item),
        }
    }
}

/// How the rules for one field can be declared.
///
/// Deserializes untagged, so a rule table loaded from JSON may mix all
/// three shapes freely.
///
/// There is no escaping in the string forms: a literal `|` or `,`
/// inside a parameter is not representable. Use [`RuleSpec::Parsed`]
/// when a parameter needs those characters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleSpec {
    /// Pipe syntax: `"required|length:2,10"`.
    Expr(String),
    /// Pre-split items, each still in `name:params` form.
    List(Vec<String>),
    /// Fully parsed instructions, bypassing string parsing.
    Parsed(Vec<RuleInstruction>),
}

impl RuleSpec {
    /// Expand into the ordered instruction sequence.
    ///
    /// An empty expression yields no instructions: the field is never
    /// checked, never enters the valid subset, and never errors.
    pub fn instructions(&self) -> Vec<RuleInstruction> {
        match self {
            Self::Expr(expr) => {
                if expr.is_empty() {
                    return Vec::new();
                }
                expr.split('|').map(RuleInstruction::from_item).collect()
            }
            Self::List(items) => items
                .iter()
                .map(|item| RuleInstruction::from_item(item))
                .collect(),
            Self::Parsed(instructions) => instructions.clone(),
        }
    }
}

impl From<&str> for RuleSpec {
    fn from(expr: &str) -> Self {
        Self::Expr(expr.to_string())
    }
}

impl From<String> for RuleSpec {
    fn from(expr: String) -> Self {
        Self::Expr(expr)
    }
}

impl From<Vec<RuleInstruction>> for RuleSpec {
    fn from(instructions: Vec<RuleInstruction>) -> Self {
        Self::Parsed(instructions)
    }
}

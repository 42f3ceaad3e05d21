// Rule registry and the check outcome model

use crate::errors::RuleError;
use crate::rules;
use log::warn;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

static NULL: Value = Value::Null;

/// Everything a check may inspect while evaluating one instruction.
pub struct RuleContext<'a> {
    /// Field under validation.
    pub field: &'a str,
    /// The field's value; `Null` when absent from the data bag.
    pub value: &'a Value,
    /// Raw string parameters from the rule instruction.
    pub params: &'a [String],
    /// The whole input bag, for cross-field checks.
    pub data: &'a Value,
}

impl<'a> RuleContext<'a> {
    /// Positional parameter, if present.
    pub fn param(&self, index: usize) -> Option<&str> {
        self.params.get(index).map(|p| p.as_str())
    }

    /// Numeric parameter; `None` when missing or unparseable, which a
    /// check treats as an absent constraint.
    pub fn numeric_param(&self, index: usize) -> Option<f64> {
        self.param(index).and_then(|p| p.trim().parse().ok())
    }

    /// Value of another field in the data bag; `Null` when absent.
    pub fn lookup(&self, key: &str) -> &'a Value {
        self.data.get(key).unwrap_or(&NULL)
    }
}

/// Outcome of one check over one field value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// The value satisfies the rule; the field enters the valid subset.
    Pass,
    /// The rule does not apply (absent value). Silent: neither valid
    /// nor an error.
    Skip,
    /// The value violates the rule.
    Fail(Failure),
}

impl Verdict {
    pub fn passed(&self) -> bool {
        matches!(self, Verdict::Pass)
    }
}

/// Details of a failed check, consumed by message resolution.
///
/// Checks never format final messages themselves; they hand over the
/// interpolation arguments and let the session pick the override,
/// explicit text, or catalog template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Failure {
    args: Vec<(String, String)>,
    message: Option<String>,
    rule_hint: Option<String>,
}

impl Failure {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an interpolation argument for the default template.
    pub fn arg(mut self, key: impl Into<String>, value: impl fmt::Display) -> Self {
        self.args.push((key.into(), value.to_string()));
        self
    }

    /// Set an explicit message, bypassing catalog templates. Override
    /// messages from the session still win.
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Report under another rule's message key. Used when a check
    /// delegates to another built-in, e.g. `isset` failing its inner
    /// array check.
    pub fn as_rule(mut self, name: impl Into<String>) -> Self {
        self.rule_hint = Some(name.into());
        self
    }

    pub fn args(&self) -> &[(String, String)] {
        &self.args
    }

    pub fn explicit_message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn rule_hint(&self) -> Option<&str> {
        self.rule_hint.as_deref()
    }
}

/// A named validation check.
///
/// The calling convention is uniform: every check receives the full
/// [`RuleContext`] and decides which parameters it needs. Checks are
/// mode-agnostic; they report a [`Verdict`] and the session decides
/// whether to abort or accumulate. Configuration problems (a pattern
/// that does not compile) travel in the `Err` channel instead.
pub trait Rule: Send + Sync {
    /// Name the check registers under.
    fn name(&self) -> &str;

    /// Evaluate the check against one field.
    fn check(&self, ctx: &RuleContext<'_>) -> Result<Verdict, RuleError>;
}

struct FnRule<F> {
    name: String,
    check: F,
}

impl<F> Rule for FnRule<F>
where
    F: Fn(&RuleContext<'_>) -> Result<Verdict, RuleError> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Result<Verdict, RuleError> {
        (self.check)(ctx)
    }
}

/// Maps rule names to executable checks.
///
/// Resolution is by exact name match; no fuzzy or case-insensitive
/// lookup. Consumers may register additional checks (or replace
/// built-ins) before a run.
#[derive(Clone)]
pub struct RuleRegistry {
    rules: HashMap<String, Arc<dyn Rule>>,
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleRegistry {
    /// Registry seeded with the built-in checks.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        for rule in rules::builtins() {
            registry.rules.insert(rule.name().to_string(), rule);
        }
        registry
    }

    /// Registry with no checks at all.
    pub fn empty() -> Self {
        Self {
            rules: HashMap::new(),
        }
    }

    /// Register a check under its own name.
    pub fn register(&mut self, rule: impl Rule + 'static) {
        let name = rule.name().to_string();
        self.insert(name, Arc::new(rule));
    }

    /// Register a check under an explicit name.
    pub fn register_with_name(&mut self, name: impl Into<String>, rule: impl Rule + 'static) {
        self.insert(name.into(), Arc::new(rule));
    }

    /// Register a closure as a check.
    pub fn register_fn<F>(&mut self, name: impl Into<String>, check: F)
    where
        F: Fn(&RuleContext<'_>) -> Result<Verdict, RuleError> + Send + Sync + 'static,
    {
        let name = name.into();
        self.insert(
            name.clone(),
            Arc::new(FnRule { name, check }),
        );
    }

    fn insert(&mut self, name: String, rule: Arc<dyn Rule>) {
        if self.rules.contains_key(&name) {
            warn!("rule '{}' re-registered, replacing the previous check", name);
        }
        self.rules.insert(name, rule);
    }

    /// Resolve a rule name to its check; exact match only.
    pub fn resolve(&self, name: &str) -> Result<&Arc<dyn Rule>, RuleError> {
        self.rules.get(name).ok_or_else(|| RuleError::UnknownRule {
            name: name.to_string(),
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.rules.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

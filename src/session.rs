// Validation sessions and the engine that runs them

use crate::errors::{ErrorBag, RuleError, ValidateError};
use crate::messages::MessageCatalog;
use crate::parser::{RuleInstruction, RuleSpec};
use crate::registry::{Failure, Rule, RuleContext, RuleRegistry, Verdict};
use log::{debug, trace};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;

static NULL: Value = Value::Null;

/// Immutable configuration for one validation run.
///
/// Everything is fixed before any rule executes: the data bag, the
/// per-field rule specs (in declaration order), the message overrides,
/// and the mode flag. Running a session never mutates it, so the same
/// session can be run again and yields the same result.
#[derive(Debug, Clone)]
pub struct Session {
    data: Value,
    rules: Vec<(String, RuleSpec)>,
    messages: HashMap<String, String>,
    fail_fast: bool,
}

impl Session {
    /// Start a session over an input bag, normally a JSON object.
    ///
    /// Fields absent from the bag (or any field of a non-object bag)
    /// read as `null`.
    pub fn new(data: Value) -> Self {
        Self {
            data,
            rules: Vec::new(),
            messages: HashMap::new(),
            fail_fast: false,
        }
    }

    /// Declare rules for a field. Fields run in declaration order.
    pub fn rule(mut self, field: impl Into<String>, spec: impl Into<RuleSpec>) -> Self {
        self.rules.push((field.into(), spec.into()));
        self
    }

    /// Declare rules for several fields at once, in iteration order.
    pub fn rules<I, K, S>(mut self, rules: I) -> Self
    where
        I: IntoIterator<Item = (K, S)>,
        K: Into<String>,
        S: Into<RuleSpec>,
    {
        for (field, spec) in rules {
            self.rules.push((field.into(), spec.into()));
        }
        self
    }

    /// Override the message for one failure, keyed `"<field>.<rule>"`.
    pub fn message(mut self, key: impl Into<String>, text: impl Into<String>) -> Self {
        self.messages.insert(key.into(), text.into());
        self
    }

    /// Override several messages at once.
    pub fn messages<I, K, T>(mut self, messages: I) -> Self
    where
        I: IntoIterator<Item = (K, T)>,
        K: Into<String>,
        T: Into<String>,
    {
        for (key, text) in messages {
            self.messages.insert(key.into(), text.into());
        }
        self
    }

    /// Abort on the first failure instead of collecting all of them.
    pub fn fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    /// The input bag.
    pub fn data(&self) -> &Value {
        &self.data
    }

    pub fn is_fail_fast(&self) -> bool {
        self.fail_fast
    }

    fn field_value(&self, field: &str) -> &Value {
        self.data.get(field).unwrap_or(&NULL)
    }
}

/// Result of a completed run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Report {
    valid: Map<String, Value>,
    errors: ErrorBag,
}

impl Report {
    /// Fields with at least one passing rule, with their input values.
    ///
    /// A field stays here even when another of its rules failed later;
    /// one pass is enough to mark it. Callers that need an
    /// all-rules-passed view must check [`Report::fails`] first. This
    /// mirrors the long-standing behavior of existing rule tables and
    /// is deliberately kept as-is rather than tightened.
    pub fn valid(&self) -> &Map<String, Value> {
        &self.valid
    }

    /// All failure messages, in the order the checks ran.
    pub fn errors(&self) -> &ErrorBag {
        &self.errors
    }

    pub fn fails(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn passes(&self) -> bool {
        self.errors.is_empty()
    }

    /// The failure messages as a slice, oldest first.
    pub fn failed(&self) -> &[String] {
        self.errors.all()
    }

    /// Consume the report, keeping only the valid subset.
    pub fn into_valid(self) -> Map<String, Value> {
        self.valid
    }
}

/// One field's resolved work: its instructions paired with the checks
/// they dispatch to.
struct CompiledField {
    field: String,
    checks: Vec<(RuleInstruction, Arc<dyn Rule>)>,
}

/// The validation engine: a registry of checks plus a message catalog.
///
/// One engine serves any number of sessions; [`Validator::run`] never
/// mutates it, so a configured engine can be shared across threads.
#[derive(Clone)]
pub struct Validator {
    registry: RuleRegistry,
    catalog: MessageCatalog,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator {
    /// Engine with the built-in checks and default messages.
    pub fn new() -> Self {
        Self {
            registry: RuleRegistry::new(),
            catalog: MessageCatalog::new(),
        }
    }

    /// Engine over a custom registry.
    pub fn with_registry(registry: RuleRegistry) -> Self {
        Self {
            registry,
            catalog: MessageCatalog::new(),
        }
    }

    /// Swap the message catalog.
    pub fn with_catalog(mut self, catalog: MessageCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Register an additional named check.
    pub fn register(&mut self, rule: impl Rule + 'static) {
        self.registry.register(rule);
    }

    /// Register a closure as a check.
    pub fn register_fn<F>(&mut self, name: impl Into<String>, check: F)
    where
        F: Fn(&RuleContext<'_>) -> Result<Verdict, RuleError> + Send + Sync + 'static,
    {
        self.registry.register_fn(name, check);
    }

    /// Replace the default message template for one rule.
    pub fn set_template(&mut self, rule: impl Into<String>, template: impl Into<String>) {
        self.catalog.set(rule, template);
    }

    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    pub fn catalog(&self) -> &MessageCatalog {
        &self.catalog
    }

    /// Parse every spec and resolve every rule name up front, before
    /// any check executes. A misconfigured later field therefore stops
    /// the run before earlier fields do any visible work.
    fn compile(&self, session: &Session) -> Result<Vec<CompiledField>, RuleError> {
        let mut compiled = Vec::with_capacity(session.rules.len());
        for (field, spec) in &session.rules {
            let mut checks = Vec::new();
            for instruction in spec.instructions() {
                let rule = self.registry.resolve(&instruction.name)?.clone();
                checks.push((instruction, rule));
            }
            compiled.push(CompiledField {
                field: field.clone(),
                checks,
            });
        }
        Ok(compiled)
    }

    /// Run a session to completion.
    ///
    /// In collect mode (the default) every instruction across every
    /// field runs and the returned [`Report`] holds all failures, in
    /// order. In fail-fast mode the first failing check returns
    /// [`ValidateError::Failed`] with code 603 and nothing further
    /// runs. Configuration errors (unknown rule names, invalid
    /// patterns) abort the run in both modes as
    /// [`ValidateError::Config`].
    pub fn run(&self, session: &Session) -> Result<Report, ValidateError> {
        let compiled = self.compile(session)?;
        debug!("validation run over {} field(s)", compiled.len());

        let mut report = Report::default();
        for entry in &compiled {
            self.run_field(session, entry, &mut report)?;
        }

        debug!("validation run finished with {} error(s)", report.errors.len());
        Ok(report)
    }

    fn run_field(
        &self,
        session: &Session,
        entry: &CompiledField,
        report: &mut Report,
    ) -> Result<(), ValidateError> {
        let value = session.field_value(&entry.field);
        for (instruction, rule) in &entry.checks {
            trace!("checking {}.{}", entry.field, instruction.name);
            let ctx = RuleContext {
                field: &entry.field,
                value,
                params: &instruction.params,
                data: &session.data,
            };
            match rule.check(&ctx)? {
                Verdict::Pass => {
                    report.valid.insert(entry.field.clone(), value.clone());
                }
                Verdict::Skip => {}
                Verdict::Fail(failure) => {
                    let message =
                        self.resolve_message(session, &entry.field, &instruction.name, &failure);
                    if session.fail_fast {
                        return Err(ValidateError::failed(message));
                    }
                    report.errors.push(message);
                }
            }
        }
        Ok(())
    }

    /// Message precedence: session override, then the failure's
    /// explicit text, then the catalog template for the rule.
    fn resolve_message(
        &self,
        session: &Session,
        field: &str,
        rule_name: &str,
        failure: &Failure,
    ) -> String {
        let rule_name = failure.rule_hint().unwrap_or(rule_name);
        if let Some(text) = session.messages.get(&format!("{}.{}", field, rule_name)) {
            return text.clone();
        }
        if let Some(text) = failure.explicit_message() {
            return text.to_string();
        }
        self.catalog.render(rule_name, field, failure.args())
    }

    /// Run the per-field checks concurrently.
    ///
    /// Collect mode only: results are merged back in field declaration
    /// order, so the output (valid subset and error order) is
    /// identical to [`Validator::run`]. Fail-fast sessions delegate to
    /// the sequential run, which already gives first-failure-wins.
    pub async fn run_parallel(&self, session: &Session) -> Result<Report, ValidateError> {
        use tokio::task::JoinSet;

        if session.fail_fast {
            return self.run(session);
        }

        let compiled = self.compile(session)?;
        let field_count = compiled.len();
        debug!("parallel validation run over {} field(s)", field_count);

        let mut set = JoinSet::new();
        for (index, entry) in compiled.into_iter().enumerate() {
            let engine = self.clone();
            let task_session = Session {
                data: session.data.clone(),
                rules: Vec::new(),
                messages: session.messages.clone(),
                fail_fast: false,
            };
            set.spawn(async move {
                let mut report = Report::default();
                let outcome = engine.run_field(&task_session, &entry, &mut report);
                (index, entry.field, outcome.map(|()| report))
            });
        }

        let mut slots: Vec<Option<Report>> = (0..field_count).map(|_| None).collect();
        while let Some(joined) = set.join_next().await {
            let (index, field, result) = joined.map_err(|e| RuleError::Task {
                field: "unknown".to_string(),
                reason: e.to_string(),
            })?;
            let partial = result.map_err(|err| match err {
                ValidateError::Config(RuleError::Task { reason, .. }) => {
                    ValidateError::Config(RuleError::Task { field, reason })
                }
                other => other,
            })?;
            slots[index] = Some(partial);
        }

        // Merge in declaration order so error ordering stays
        // deterministic and identical to the sequential run.
        let mut report = Report::default();
        for partial in slots.into_iter().flatten() {
            for (field, value) in partial.valid {
                report.valid.insert(field, value);
            }
            for message in partial.errors.into_vec() {
                report.errors.push(message);
            }
        }

        debug!("parallel validation run finished with {} error(s)", report.errors.len());
        Ok(report)
    }
}

/// Validate a data bag in collect mode with the built-in checks.
///
/// Shorthand for a default [`Validator`] over a [`Session`] built from
/// the given rule table.
pub fn validate<I, K, S>(data: Value, rules: I) -> Result<Report, ValidateError>
where
    I: IntoIterator<Item = (K, S)>,
    K: Into<String>,
    S: Into<RuleSpec>,
{
    Validator::new().run(&Session::new(data).rules(rules))
}

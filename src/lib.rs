//! Declarative data validation
//!
//! Validates a bag of input values against per-field rule expressions,
//! producing a valid subset and an ordered list of failure messages.
//! Rules use a compact pipe syntax (`|` between rules, `:` before the
//! parameter list, `,` between parameters) or can be supplied
//! pre-parsed. Checks are synchronous pure functions; the engine
//! either collects every failure or aborts on the first one.
//!
//! # Examples
//!
//! ## Basic Validation
//!
//! ```
//! use vetter::{Session, Validator};
//! use serde_json::json;
//!
//! let session = Session::new(json!({
//!     "name": "ada",
//!     "email": "ada@example.com",
//! }))
//! .rule("name", "required|min:2")
//! .rule("email", "required|email");
//!
//! let report = Validator::new().run(&session).unwrap();
//! assert!(report.passes());
//! assert_eq!(report.valid()["name"], json!("ada"));
//! ```
//!
//! ## Collecting Failures
//!
//! ```
//! use vetter::{Session, Validator};
//! use serde_json::json;
//!
//! let session = Session::new(json!({"name": "", "age": "x"}))
//!     .rule("name", "required")
//!     .rule("age", "integer")
//!     .message("age.integer", "age must be a whole number");
//!
//! let report = Validator::new().run(&session).unwrap();
//! assert!(report.fails());
//! assert_eq!(report.failed(), ["name is required", "age must be a whole number"]);
//! ```
//!
//! ## Fail-Fast Mode
//!
//! ```
//! use vetter::{Session, Validator};
//! use serde_json::json;
//!
//! let session = Session::new(json!({"name": ""}))
//!     .rule("name", "required")
//!     .fail_fast(true);
//!
//! let err = Validator::new().run(&session).unwrap_err();
//! assert_eq!(err.code(), Some(603));
//! assert_eq!(err.to_string(), "name is required");
//! ```
//!
//! ## Custom Checks
//!
//! ```
//! use vetter::{Failure, Session, Validator, Verdict};
//! use serde_json::json;
//!
//! let mut engine = Validator::new();
//! engine.register_fn("even", |ctx| {
//!     Ok(match ctx.value.as_i64() {
//!         None => Verdict::Skip,
//!         Some(n) if n % 2 == 0 => Verdict::Pass,
//!         Some(_) => Verdict::Fail(Failure::new().message("must be even")),
//!     })
//! });
//!
//! let report = engine
//!     .run(&Session::new(json!({"n": 3})).rule("n", "even"))
//!     .unwrap();
//! assert_eq!(report.failed(), ["must be even"]);
//! ```

mod errors;
mod messages;
mod parser;
mod registry;
mod rules;
mod session;
mod value;

pub use errors::{ErrorBag, RuleError, VALIDATION_FAILED_CODE, ValidateError};
pub use messages::MessageCatalog;
pub use parser::{RuleInstruction, RuleSpec};
pub use registry::{Failure, Rule, RuleContext, RuleRegistry, Verdict};
pub use rules::{
    Confirm, HasKeys, In, IsArray, IsBool, IsEmail, IsInteger, IsNumeric, Length, Matches, Max,
    Min, Required,
};
pub use session::{Report, Session, Validator, validate};
pub use value::{char_count, is_empty_value, loose_eq, numeric_of, text_of};

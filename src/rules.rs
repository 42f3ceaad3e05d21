// Built-in checks

use crate::errors::RuleError;
use crate::registry::{Failure, Rule, RuleContext, Verdict};
use crate::value::{char_count, is_empty_value, loose_eq, text_of};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::sync::Arc;

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$").unwrap()
});

/// All built-in checks, used to seed [`RuleRegistry::new`].
///
/// [`RuleRegistry::new`]: crate::RuleRegistry::new
pub(crate) fn builtins() -> Vec<Arc<dyn Rule>> {
    vec![
        Arc::new(Required),
        Arc::new(Max),
        Arc::new(Min),
        Arc::new(Length),
        Arc::new(IsBool),
        Arc::new(In),
        Arc::new(Matches),
        Arc::new(Confirm),
        Arc::new(IsInteger),
        Arc::new(IsNumeric),
        Arc::new(IsArray),
        Arc::new(HasKeys),
        Arc::new(IsEmail),
    ]
}

/// Text form of the value, or the silent skip for values that have
/// none (`null` and containers).
fn text_or_skip(value: &Value) -> Result<String, Verdict> {
    text_of(value).ok_or(Verdict::Skip)
}

/// `required` — fails when the value is empty: `null`, `false`, `0`,
/// `""`, `"0"`, or an empty container. The one check for which absence
/// is itself the failure.
pub struct Required;

impl Rule for Required {
    fn name(&self) -> &str {
        "required"
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Result<Verdict, RuleError> {
        if is_empty_value(ctx.value) {
            return Ok(Verdict::Fail(Failure::new()));
        }
        Ok(Verdict::Pass)
    }
}

/// `max:N` — character count of the text form must not exceed `N`.
/// Skips absent values; without a usable bound the check passes.
pub struct Max;

impl Rule for Max {
    fn name(&self) -> &str {
        "max"
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Result<Verdict, RuleError> {
        let text = match text_or_skip(ctx.value) {
            Ok(text) => text,
            Err(skip) => return Ok(skip),
        };
        let Some(max) = ctx.numeric_param(0) else {
            return Ok(Verdict::Pass);
        };
        if char_count(&text) as f64 <= max {
            Ok(Verdict::Pass)
        } else {
            Ok(Verdict::Fail(Failure::new().arg("max", max)))
        }
    }
}

/// `min:N` — character count of the text form must be at least `N`.
pub struct Min;

impl Rule for Min {
    fn name(&self) -> &str {
        "min"
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Result<Verdict, RuleError> {
        let text = match text_or_skip(ctx.value) {
            Ok(text) => text,
            Err(skip) => return Ok(skip),
        };
        let Some(min) = ctx.numeric_param(0) else {
            return Ok(Verdict::Pass);
        };
        if char_count(&text) as f64 >= min {
            Ok(Verdict::Pass)
        } else {
            Ok(Verdict::Fail(Failure::new().arg("min", min)))
        }
    }
}

/// `length:MIN,MAX` — character count strictly between the bounds,
/// swapped first when given in reverse order.
///
/// The range is exclusive on both ends: a count equal to either bound
/// fails, and `length:3,3` admits nothing. Existing rule tables depend
/// on this, so it is kept as observed rather than widened to an
/// inclusive range. Both bounds are needed for the check to constrain
/// anything.
pub struct Length;

impl Rule for Length {
    fn name(&self) -> &str {
        "length"
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Result<Verdict, RuleError> {
        let text = match text_or_skip(ctx.value) {
            Ok(text) => text,
            Err(skip) => return Ok(skip),
        };
        let (Some(a), Some(b)) = (ctx.numeric_param(0), ctx.numeric_param(1)) else {
            return Ok(Verdict::Pass);
        };
        let (min, max) = if a <= b { (a, b) } else { (b, a) };
        let count = char_count(&text) as f64;
        if min < count && count < max {
            Ok(Verdict::Pass)
        } else {
            Ok(Verdict::Fail(Failure::new().arg("min", min).arg("max", max)))
        }
    }
}

/// `bool` — a boolean, or a string reading as one:
/// `on`/`yes`/`true`/`1`/`off`/`no`/`false`/`0`, case-insensitive.
pub struct IsBool;

const BOOL_WORDS: [&str; 8] = ["on", "yes", "true", "1", "off", "no", "false", "0"];

impl Rule for IsBool {
    fn name(&self) -> &str {
        "bool"
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Result<Verdict, RuleError> {
        if ctx.value.is_boolean() {
            return Ok(Verdict::Pass);
        }
        let text = match text_or_skip(ctx.value) {
            Ok(text) => text,
            Err(skip) => return Ok(skip),
        };
        if BOOL_WORDS.contains(&text.to_lowercase().as_str()) {
            Ok(Verdict::Pass)
        } else {
            Ok(Verdict::Fail(Failure::new()))
        }
    }
}

/// `in:a,b,c` — the value must be loosely equal to one of the options.
/// An empty option set matches nothing and fails.
pub struct In;

impl Rule for In {
    fn name(&self) -> &str {
        "in"
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Result<Verdict, RuleError> {
        if ctx.value.is_null() {
            return Ok(Verdict::Skip);
        }
        let matched = ctx
            .params
            .iter()
            .any(|option| loose_eq(ctx.value, &Value::String(option.clone())));
        if matched {
            Ok(Verdict::Pass)
        } else {
            Ok(Verdict::Fail(
                Failure::new().arg("options", ctx.params.join(", ")),
            ))
        }
    }
}

/// `regex:PATTERN` — the first match of the pattern must equal the
/// whole text form. An invalid pattern is a configuration error, not a
/// validation failure.
pub struct Matches;

impl Rule for Matches {
    fn name(&self) -> &str {
        "regex"
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Result<Verdict, RuleError> {
        let text = match text_or_skip(ctx.value) {
            Ok(text) => text,
            Err(skip) => return Ok(skip),
        };
        let Some(pattern) = ctx.param(0) else {
            return Ok(Verdict::Pass);
        };
        let re = Regex::new(pattern).map_err(|source| RuleError::Pattern {
            field: ctx.field.to_string(),
            pattern: pattern.to_string(),
            source,
        })?;
        match re.find(&text) {
            Some(found) if found.as_str() == text => Ok(Verdict::Pass),
            _ => Ok(Verdict::Fail(Failure::new())),
        }
    }
}

/// `confirm:other` — the value must loosely equal the named other
/// field. No null guard: two absent fields confirm each other.
pub struct Confirm;

impl Rule for Confirm {
    fn name(&self) -> &str {
        "confirm"
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Result<Verdict, RuleError> {
        let other = ctx.param(0).unwrap_or("");
        if loose_eq(ctx.value, ctx.lookup(other)) {
            Ok(Verdict::Pass)
        } else {
            Ok(Verdict::Fail(Failure::new().arg("other", other)))
        }
    }
}

/// `integer` — a native integer. Numeric strings fail; use `numeric`
/// for those.
pub struct IsInteger;

impl Rule for IsInteger {
    fn name(&self) -> &str {
        "integer"
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Result<Verdict, RuleError> {
        Ok(match ctx.value {
            Value::Null => Verdict::Skip,
            Value::Number(n) if n.is_i64() || n.is_u64() => Verdict::Pass,
            _ => Verdict::Fail(Failure::new()),
        })
    }
}

/// `numeric` — a number, or a string parsing as a finite float.
pub struct IsNumeric;

impl Rule for IsNumeric {
    fn name(&self) -> &str {
        "numeric"
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Result<Verdict, RuleError> {
        Ok(match ctx.value {
            Value::Null => Verdict::Skip,
            Value::Number(_) => Verdict::Pass,
            Value::String(s) if s.trim().parse::<f64>().map(|f| f.is_finite()).unwrap_or(false) => {
                Verdict::Pass
            }
            _ => Verdict::Fail(Failure::new()),
        })
    }
}

/// `array` — a container value: JSON array or object.
pub struct IsArray;

impl Rule for IsArray {
    fn name(&self) -> &str {
        "array"
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Result<Verdict, RuleError> {
        Ok(match ctx.value {
            Value::Null => Verdict::Skip,
            Value::Array(_) | Value::Object(_) => Verdict::Pass,
            _ => Verdict::Fail(Failure::new()),
        })
    }
}

/// `isset:k1,k2` — delegates to the array check, then requires every
/// listed key to exist in the container: object keys by name, array
/// elements by in-bounds index. Fails naming the first missing key.
pub struct HasKeys;

impl Rule for HasKeys {
    fn name(&self) -> &str {
        "isset"
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Result<Verdict, RuleError> {
        match IsArray.check(ctx)? {
            Verdict::Pass => {}
            Verdict::Skip => return Ok(Verdict::Skip),
            // Reported under the array check's message key, matching
            // how the delegate itself would have reported.
            Verdict::Fail(failure) => return Ok(Verdict::Fail(failure.as_rule("array"))),
        }
        for key in ctx.params {
            let present = match ctx.value {
                Value::Object(map) => map.contains_key(key),
                Value::Array(items) => key
                    .parse::<usize>()
                    .map(|index| index < items.len())
                    .unwrap_or(false),
                _ => false,
            };
            if !present {
                return Ok(Verdict::Fail(Failure::new().arg("key", key)));
            }
        }
        Ok(Verdict::Pass)
    }
}

/// `email` — the text form must match the email grammar in full.
pub struct IsEmail;

impl Rule for IsEmail {
    fn name(&self) -> &str {
        "email"
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Result<Verdict, RuleError> {
        let text = match text_or_skip(ctx.value) {
            Ok(text) => text,
            Err(skip) => return Ok(skip),
        };
        if EMAIL_REGEX.is_match(&text) {
            Ok(Verdict::Pass)
        } else {
            Ok(Verdict::Fail(Failure::new()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn run_rule(rule: &dyn Rule, data: &Value, field: &str, params: &[&str]) -> Verdict {
        let params: Vec<String> = params.iter().map(|p| p.to_string()).collect();
        let null = Value::Null;
        let value = data.get(field).unwrap_or(&null);
        let ctx = RuleContext {
            field,
            value,
            params: &params,
            data,
        };
        rule.check(&ctx).unwrap()
    }

    fn verdict(rule: &dyn Rule, value: Value, params: &[&str]) -> Verdict {
        run_rule(rule, &json!({ "f": value }), "f", params)
    }

    fn passes(rule: &dyn Rule, value: Value, params: &[&str]) -> bool {
        verdict(rule, value, params).passed()
    }

    #[test]
    fn test_required_rejects_empty_values() {
        for empty in [json!(null), json!(""), json!("0"), json!(0), json!(false), json!([]), json!({})] {
            assert!(
                matches!(verdict(&Required, empty.clone(), &[]), Verdict::Fail(_)),
                "expected {} to fail required",
                empty
            );
        }
    }

    #[test]
    fn test_required_accepts_content() {
        assert!(passes(&Required, json!("x"), &[]));
        assert!(passes(&Required, json!(1), &[]));
        assert!(passes(&Required, json!(true), &[]));
        assert!(passes(&Required, json!([0]), &[]));
    }

    #[test]
    fn test_max_bounds_character_count() {
        assert!(passes(&Max, json!("abc"), &["3"]));
        assert!(matches!(verdict(&Max, json!("abcd"), &["3"]), Verdict::Fail(_)));
        // numbers are measured through their display form
        assert!(passes(&Max, json!(123), &["3"]));
        assert!(matches!(verdict(&Max, json!(1234), &["3"]), Verdict::Fail(_)));
    }

    #[test]
    fn test_max_counts_chars_not_bytes() {
        assert!(passes(&Max, json!("日本語"), &["3"]));
    }

    #[test]
    fn test_min_bounds_character_count() {
        assert!(passes(&Min, json!("abc"), &["3"]));
        assert!(matches!(verdict(&Min, json!("ab"), &["3"]), Verdict::Fail(_)));
    }

    #[test]
    fn test_min_max_skip_null_silently() {
        assert_eq!(verdict(&Min, json!(null), &["3"]), Verdict::Skip);
        assert_eq!(verdict(&Max, json!(null), &["3"]), Verdict::Skip);
    }

    #[test]
    fn test_missing_bound_disables_the_constraint() {
        assert!(passes(&Max, json!("anything at all"), &[]));
        assert!(passes(&Min, json!(""), &["not-a-number"]));
    }

    #[test]
    fn test_length_is_exclusive_on_both_ends() {
        assert!(passes(&Length, json!("abcd"), &["3", "5"]));
        assert!(matches!(verdict(&Length, json!("abc"), &["3", "5"]), Verdict::Fail(_)));
        assert!(matches!(verdict(&Length, json!("abcde"), &["3", "5"]), Verdict::Fail(_)));
    }

    #[test]
    fn test_length_equal_bounds_admit_nothing() {
        for text in ["", "ab", "abc", "abcd"] {
            assert!(
                matches!(verdict(&Length, json!(text), &["3", "3"]), Verdict::Fail(_)),
                "length:3,3 should reject {:?}",
                text
            );
        }
    }

    #[test]
    fn test_length_swaps_reversed_bounds() {
        assert!(passes(&Length, json!("abcd"), &["5", "3"]));
        assert!(matches!(verdict(&Length, json!("abc"), &["5", "3"]), Verdict::Fail(_)));
    }

    #[test]
    fn test_bool_accepts_booleans_and_words() {
        assert!(passes(&IsBool, json!(true), &[]));
        assert!(passes(&IsBool, json!(false), &[]));
        for word in ["on", "YES", "true", "1", "off", "no", "False", "0"] {
            assert!(passes(&IsBool, json!(word), &[]), "{:?} should read as bool", word);
        }
        assert!(matches!(verdict(&IsBool, json!("maybe"), &[]), Verdict::Fail(_)));
        assert!(matches!(verdict(&IsBool, json!(2), &[]), Verdict::Fail(_)));
    }

    #[test]
    fn test_in_uses_loose_equality() {
        assert!(passes(&In, json!("b"), &["a", "b", "c"]));
        assert!(passes(&In, json!(2), &["1", "2", "3"]));
        assert!(matches!(verdict(&In, json!("d"), &["a", "b", "c"]), Verdict::Fail(_)));
    }

    #[test]
    fn test_in_failure_lists_the_options() {
        let Verdict::Fail(failure) = verdict(&In, json!("d"), &["a", "b", "c"]) else {
            panic!("expected failure");
        };
        assert_eq!(failure.args(), [("options".to_string(), "a, b, c".to_string())]);
    }

    #[test]
    fn test_in_with_no_options_fails() {
        assert!(matches!(verdict(&In, json!("a"), &[]), Verdict::Fail(_)));
    }

    #[test]
    fn test_regex_requires_a_full_match() {
        assert!(passes(&Matches, json!("123"), &[r"\d+"]));
        // partial match is not enough
        assert!(matches!(verdict(&Matches, json!("123abc"), &[r"\d+"]), Verdict::Fail(_)));
    }

    #[test]
    fn test_regex_invalid_pattern_is_a_config_error() {
        let data = json!({"f": "x"});
        let params = vec!["(unclosed".to_string()];
        let ctx = RuleContext {
            field: "f",
            value: &data["f"],
            params: &params,
            data: &data,
        };
        assert!(matches!(
            Matches.check(&ctx),
            Err(RuleError::Pattern { ref field, .. }) if field == "f"
        ));
    }

    #[test]
    fn test_confirm_compares_against_other_field() {
        let data = json!({"password": "s3cret", "password_confirm": "s3cret"});
        assert!(run_rule(&Confirm, &data, "password", &["password_confirm"]).passed());

        let data = json!({"password": "s3cret", "password_confirm": "typo"});
        assert!(matches!(
            run_rule(&Confirm, &data, "password", &["password_confirm"]),
            Verdict::Fail(_)
        ));
    }

    #[test]
    fn test_confirm_has_no_null_guard() {
        // both fields absent: Null == Null confirms
        assert!(run_rule(&Confirm, &json!({}), "a", &["b"]).passed());
        // value present, target absent: fails rather than skipping
        assert!(matches!(
            run_rule(&Confirm, &json!({"a": "x"}), "a", &["b"]),
            Verdict::Fail(_)
        ));
    }

    #[test]
    fn test_integer_rejects_numeric_strings() {
        assert!(passes(&IsInteger, json!(5), &[]));
        assert!(passes(&IsInteger, json!(-5), &[]));
        assert!(matches!(verdict(&IsInteger, json!("5"), &[]), Verdict::Fail(_)));
        assert!(matches!(verdict(&IsInteger, json!(5.5), &[]), Verdict::Fail(_)));
    }

    #[test]
    fn test_numeric_accepts_numeric_strings() {
        assert!(passes(&IsNumeric, json!(5), &[]));
        assert!(passes(&IsNumeric, json!(5.5), &[]));
        assert!(passes(&IsNumeric, json!("5"), &[]));
        assert!(passes(&IsNumeric, json!("-1.5"), &[]));
        assert!(matches!(verdict(&IsNumeric, json!("x"), &[]), Verdict::Fail(_)));
        assert!(matches!(verdict(&IsNumeric, json!(true), &[]), Verdict::Fail(_)));
    }

    #[test]
    fn test_array_accepts_containers() {
        assert!(passes(&IsArray, json!([1, 2]), &[]));
        assert!(passes(&IsArray, json!({"k": 1}), &[]));
        assert!(matches!(verdict(&IsArray, json!("nope"), &[]), Verdict::Fail(_)));
        assert_eq!(verdict(&IsArray, json!(null), &[]), Verdict::Skip);
    }

    #[test]
    fn test_isset_checks_object_keys() {
        assert!(passes(&HasKeys, json!({"a": 1, "b": null}), &["a", "b"]));
        let Verdict::Fail(failure) = verdict(&HasKeys, json!({"a": 1}), &["a", "c"]) else {
            panic!("expected failure");
        };
        assert_eq!(failure.args(), [("key".to_string(), "c".to_string())]);
    }

    #[test]
    fn test_isset_checks_array_indices() {
        assert!(passes(&HasKeys, json!(["x", "y"]), &["0", "1"]));
        assert!(matches!(verdict(&HasKeys, json!(["x"]), &["1"]), Verdict::Fail(_)));
    }

    #[test]
    fn test_isset_on_scalar_reports_as_array_failure() {
        let Verdict::Fail(failure) = verdict(&HasKeys, json!("nope"), &["a"]) else {
            panic!("expected failure");
        };
        assert_eq!(failure.rule_hint(), Some("array"));
    }

    #[test]
    fn test_email() {
        assert!(passes(&IsEmail, json!("user@example.com"), &[]));
        assert!(passes(&IsEmail, json!("user+tag@example.co.uk"), &[]));
        assert!(matches!(verdict(&IsEmail, json!("invalid"), &[]), Verdict::Fail(_)));
        assert!(matches!(verdict(&IsEmail, json!("@example.com"), &[]), Verdict::Fail(_)));
        assert_eq!(verdict(&IsEmail, json!(null), &[]), Verdict::Skip);
    }

    #[test]
    fn test_null_skip_set_never_reports() {
        let null = json!(null);
        for rule in builtins() {
            if rule.name() == "required" || rule.name() == "confirm" {
                continue;
            }
            assert_eq!(
                verdict(rule.as_ref(), null.clone(), &[]),
                Verdict::Skip,
                "'{}' should skip null silently",
                rule.name()
            );
        }
    }
}

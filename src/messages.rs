// Default failure texts

use std::collections::HashMap;

/// Template used for rules without an entry of their own.
const FALLBACK_TEMPLATE: &str = "{field} failed validation";

/// Default failure texts, one template per rule.
///
/// Templates are data, not control flow: swap the whole catalog (or a
/// single entry) to change wording or language without touching the
/// checks. Placeholders are `{field}` plus whatever arguments the
/// failing check supplied, e.g. `{min}`, `{max}`, `{options}`.
#[derive(Debug, Clone)]
pub struct MessageCatalog {
    templates: HashMap<String, String>,
}

impl MessageCatalog {
    /// Catalog seeded with one template per built-in rule.
    pub fn new() -> Self {
        let mut catalog = Self::empty();
        catalog.set("required", "{field} is required");
        catalog.set("max", "{field} must be at most {max} characters");
        catalog.set("min", "{field} must be at least {min} characters");
        catalog.set("length", "{field} must be between {min} and {max} characters");
        catalog.set("bool", "{field} must be a boolean value");
        catalog.set("in", "{field} must be one of: {options}");
        catalog.set("regex", "{field} does not match the required pattern");
        catalog.set("confirm", "{field} must match {other}");
        catalog.set("integer", "{field} must be an integer");
        catalog.set("numeric", "{field} must be numeric");
        catalog.set("array", "{field} must be an array");
        catalog.set("isset", "{field} is missing key {key}");
        catalog.set("email", "{field} must be a valid email address");
        catalog
    }

    /// Catalog holding only the generic fallback.
    pub fn empty() -> Self {
        Self {
            templates: HashMap::new(),
        }
    }

    /// Replace or add the template for a rule.
    pub fn set(&mut self, rule: impl Into<String>, template: impl Into<String>) {
        self.templates.insert(rule.into(), template.into());
    }

    /// The raw template for a rule, if one is registered.
    pub fn template(&self, rule: &str) -> Option<&str> {
        self.templates.get(rule).map(|t| t.as_str())
    }

    /// Render the default message for a failed rule.
    pub fn render(&self, rule: &str, field: &str, args: &[(String, String)]) -> String {
        let template = self
            .templates
            .get(rule)
            .map(|t| t.as_str())
            .unwrap_or(FALLBACK_TEMPLATE);
        let mut message = template.replace("{field}", field);
        for (key, value) in args {
            message = message.replace(&format!("{{{}}}", key), value);
        }
        message
    }
}

impl Default for MessageCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_render_interpolates_field_and_args() {
        let catalog = MessageCatalog::new();
        assert_eq!(
            catalog.render("length", "code", &args(&[("min", "3"), ("max", "5")])),
            "code must be between 3 and 5 characters"
        );
    }

    #[test]
    fn test_unknown_rule_falls_back_to_generic_text() {
        let catalog = MessageCatalog::new();
        assert_eq!(catalog.render("custom", "age", &[]), "age failed validation");
    }

    #[test]
    fn test_set_replaces_a_template() {
        let mut catalog = MessageCatalog::new();
        catalog.set("required", "{field} darf nicht leer sein");
        assert_eq!(
            catalog.render("required", "name", &[]),
            "name darf nicht leer sein"
        );
    }

    #[test]
    fn test_empty_catalog_only_has_the_fallback() {
        let catalog = MessageCatalog::empty();
        assert_eq!(catalog.template("required"), None);
        assert_eq!(catalog.render("required", "name", &[]), "name failed validation");
    }
}

//! Placeholder resolution for command templates.
//!
//! Templates embed variables as `{{name}}`, where `name` matches `\w+`.
//! Resolution is a pure string substitution: every occurrence of a declared
//! variable's placeholder is replaced by its supplied value. A declared
//! variable with no supplied value substitutes the empty string — this is an
//! explicit policy, not an error, so callers can preview partially filled
//! commands.

use std::collections::HashMap;

use indexmap::IndexSet;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::command_specs::Variable;

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{(\w+)\}\}").expect("valid placeholder regex"));

/// Resolves a template against the declared variables and supplied values.
///
/// Only declared variables are substituted; a `{{name}}` with no matching
/// declaration is left as-is in the output. Missing values resolve to the
/// empty string.
///
/// Pure and side-effect free; safe to call concurrently.
pub fn resolve(
    template: &str,
    variables: &[Variable],
    values: &HashMap<String, String>,
) -> String {
    let mut resolved = template.to_string();

    for variable in variables {
        let placeholder = format!("{{{{{}}}}}", variable.name);
        let value = values
            .get(&variable.name)
            .map(String::as_str)
            .unwrap_or_default();
        resolved = resolved.replace(&placeholder, value);
    }

    resolved
}

/// Extracts every placeholder identifier in the template, in order of first
/// appearance.
pub fn extract_placeholders(template: &str) -> IndexSet<String> {
    let mut placeholders = IndexSet::new();

    for capture in PLACEHOLDER.captures_iter(template) {
        let _ = placeholders.insert(capture[1].to_string());
    }

    placeholders
}

/// Returns synthesized text variables for placeholders the template uses but
/// no declared variable covers. Editors use this to auto-populate variable
/// lists when a template is typed in.
pub fn synthesize_variables(template: &str, declared: &[Variable]) -> Vec<Variable> {
    extract_placeholders(template)
        .iter()
        .filter(|name| !declared.iter().any(|variable| &variable.name == *name))
        .map(|name| Variable::synthesized(name))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command_specs::VariableKind;

    fn text_variable(name: &str) -> Variable {
        Variable {
            name: name.to_string(),
            label: name.to_string(),
            kind: VariableKind::Text,
        }
    }

    #[test]
    fn test_resolve_replaces_declared_placeholder() {
        let variables = vec![text_variable("msg")];
        let mut values = HashMap::new();
        values.insert("msg".to_string(), "hi".to_string());

        assert_eq!(resolve("echo {{msg}}", &variables, &values), "echo hi");
    }

    #[test]
    fn test_resolve_replaces_every_occurrence() {
        let variables = vec![text_variable("dir")];
        let mut values = HashMap::new();
        values.insert("dir".to_string(), "/tmp".to_string());

        assert_eq!(
            resolve("mkdir -p {{dir}} && cd {{dir}}", &variables, &values),
            "mkdir -p /tmp && cd /tmp"
        );
    }

    #[test]
    fn test_resolve_missing_value_substitutes_empty_string() {
        let variables = vec![text_variable("flags")];
        let values = HashMap::new();

        assert_eq!(resolve("ls {{flags}}", &variables, &values), "ls ");
    }

    #[test]
    fn test_resolve_leaves_undeclared_placeholder_literal() {
        let mut values = HashMap::new();
        values.insert("ghost".to_string(), "boo".to_string());

        // No declaration for `ghost`, so even a supplied value is ignored.
        assert_eq!(resolve("echo {{ghost}}", &[], &values), "echo {{ghost}}");
    }

    #[test]
    fn test_resolve_multiple_variables() {
        let variables = vec![text_variable("user"), text_variable("host")];
        let mut values = HashMap::new();
        values.insert("user".to_string(), "deploy".to_string());
        values.insert("host".to_string(), "web-1".to_string());

        assert_eq!(
            resolve("ssh {{user}}@{{host}}", &variables, &values),
            "ssh deploy@web-1"
        );
    }

    #[test]
    fn test_extract_placeholders_in_first_appearance_order() {
        let placeholders = extract_placeholders("ssh {{user}}@{{host}} -p {{port}} # {{user}}");
        let ordered: Vec<&String> = placeholders.iter().collect();

        assert_eq!(ordered, ["user", "host", "port"]);
    }

    #[test]
    fn test_extract_placeholders_ignores_malformed_braces() {
        let placeholders = extract_placeholders("echo {msg} {{ok}} {{bad name}}");

        assert_eq!(placeholders.len(), 1);
        assert!(placeholders.contains("ok"));
    }

    #[test]
    fn test_synthesize_variables_for_undeclared_placeholders() {
        let declared = vec![text_variable("user")];
        let synthesized = synthesize_variables("ssh {{user}}@{{host}}", &declared);

        assert_eq!(synthesized.len(), 1);
        assert_eq!(synthesized[0].name, "host");
        assert_eq!(synthesized[0].label, "Host");
        assert_eq!(synthesized[0].kind, VariableKind::Text);
    }

    #[test]
    fn test_synthesize_variables_empty_when_all_declared() {
        let declared = vec![text_variable("msg")];
        assert!(synthesize_variables("echo {{msg}}", &declared).is_empty());
    }
}

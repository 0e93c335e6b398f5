//! Destructive-command classification.
//!
//! A resolved command is matched against a fixed list of signatures for
//! operations that destroy data or take the host down. The result only gates
//! a confirmation prompt; it never blocks execution on its own.

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};

use crate::command_specs::Category;

fn signature(pattern: &str) -> Regex {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .expect("valid danger signature")
}

static SOURCE_CONTROL_SIGNATURES: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        signature(r"git\s+push\s+.*(--force\b|-f\b)"),
        signature(r"git\s+reset\s+--hard"),
        signature(r"git\s+clean\s+-\w*[fd]"),
        signature(r"git\s+branch\s+(-D|--delete\s+--force)"),
        signature(r"git\s+checkout\s+--\s+\."),
        signature(r"git\s+stash\s+(drop|clear)"),
    ]
});

static SYSTEM_SIGNATURES: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        signature(r"rm\s+(-\w*[rf]\w*\s+)+"),
        signature(r"\bmkfs(\.\w+)?\b"),
        signature(r"\bdd\s+.*of=/dev/"),
        signature(r"\bdiskutil\s+erase"),
        signature(r"\b(shutdown|reboot|halt|poweroff)\b"),
        signature(r"chmod\s+-R\s+777\s+/"),
        signature(r">\s*/dev/sd[a-z]"),
    ]
});

static PROJECT_SIGNATURES: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        signature(r"\bdrop\s+(database|table)\b"),
        signature(r"migrate\s+.*\b(fresh|reset)\b"),
        signature(r"docker\s+system\s+prune\s+.*(-f\b|--force)"),
        signature(r"docker\s+(rm|rmi)\s+.*(-f\b|--force)"),
        signature(r"kubectl\s+delete\s+(namespace|ns)\b"),
        signature(r"terraform\s+destroy"),
    ]
});

fn signatures_for(category: Category) -> &'static [Regex] {
    match category {
        Category::SourceControl => &SOURCE_CONTROL_SIGNATURES,
        Category::System => &SYSTEM_SIGNATURES,
        Category::Project => &PROJECT_SIGNATURES,
        // Free-text prompts carry no domain of their own; they are checked
        // against every list via `is_dangerous`.
        Category::Prompt => &[],
    }
}

/// Whether the resolved command matches a destructive signature within the
/// given domain. Returns true on the first match.
pub fn is_dangerous_in(category: Category, resolved_command: &str) -> bool {
    signatures_for(category)
        .iter()
        .any(|signature| signature.is_match(resolved_command))
}

/// Whether the resolved command matches any destructive signature of any
/// domain. Used when the command's domain is unknown or user-typed.
pub fn is_dangerous(resolved_command: &str) -> bool {
    Category::ALL
        .iter()
        .any(|category| is_dangerous_in(*category, resolved_command))
}

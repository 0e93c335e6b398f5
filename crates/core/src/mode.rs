//! Execution-mode selection.
//!
//! Some commands never terminate on their own (development servers, file
//! watchers). Those must run in the background with lifecycle tracking so
//! they stay killable while other commands run. The heuristic here is
//! advisory: callers may force either mode for a given surface.

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};

fn keyword(pattern: &str) -> Regex {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .expect("valid continuous-command pattern")
}

static CONTINUOUS_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        keyword(r"\b(npm|yarn|pnpm|bun)\s+(run\s+)?(dev|start|serve|watch)\b"),
        keyword(r"\b(vite|next|nuxt|astro|ng|expo)\s+(dev|start|serve)\b"),
        keyword(r"\bcargo\s+watch\b"),
        keyword(r"\bnodemon\b"),
        keyword(r"\bwatchman\b"),
        keyword(r"--watch\b"),
        keyword(r"\bpython3?\s+-m\s+http\.server\b"),
        keyword(r"\bphp\s+-S\b"),
        keyword(r"\bflask\s+run\b"),
        keyword(r"\brails\s+s(erver)?\b"),
        keyword(r"\btail\s+-[fF]\b"),
        keyword(r"\bserve\b"),
    ]
});

// `docker compose up` stays attached unless detached with -d/--detach, so
// it needs its own check rather than a plain keyword match.
static COMPOSE_UP: Lazy<Regex> = Lazy::new(|| keyword(r"\bdocker(-|\s+)compose\s+up\b"));
static COMPOSE_DETACHED: Lazy<Regex> = Lazy::new(|| keyword(r"(\s-d\b|--detach\b)"));

/// Whether the resolved command looks like a process that runs until killed.
/// True means background execution with lifecycle tracking; false means
/// synchronous, bounded execution.
pub fn is_continuous(resolved_command: &str) -> bool {
    if COMPOSE_UP.is_match(resolved_command) && !COMPOSE_DETACHED.is_match(resolved_command) {
        return true;
    }

    CONTINUOUS_PATTERNS
        .iter()
        .any(|pattern| pattern.is_match(resolved_command))
}

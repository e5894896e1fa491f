//! Detection of the `Estimate: X days` annotation in issue bodies.
//!
//! The accepted form is the label `Estimate:` (any case), optional
//! whitespace, a non-negative decimal number such as `2` or `2.5`, optional
//! whitespace and the unit `day` or `days`. The whole match must sit on word
//! boundaries, so `Estimate: 2 daysoff` does not count.
//!
//! Digits, whitespace and word boundaries are ASCII only: a non-breaking
//! space does not separate the parts, and an accented letter next to the
//! annotation does not glue onto it.
//!
//! Values are never parsed into a duration; only presence is detected. If the
//! annotation grows beyond label, number and unit it should move to a small
//! explicit grammar instead of a wider pattern.

use regex::Regex;
use std::sync::LazyLock;

static ESTIMATE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?-u:\b)Estimate:[\t\n\f\r ]*[0-9]+(?:\.[0-9]+)?[\t\n\f\r ]*days?(?-u:\b)")
        .expect("estimate pattern is a valid regex")
});

/// Returns `true` if `body` contains a conforming estimate annotation.
///
/// Empty and whitespace-only bodies short-circuit to `false`.
pub fn has_estimate(body: &str) -> bool {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return false;
    }

    ESTIMATE_PATTERN.is_match(trimmed)
}

#[cfg(test)]
#[path = "estimate_tests.rs"]
mod tests;

//! Denylist pattern inspection and input sanitization.
//!
//! A small rule table of compiled regular expressions classifies submitted
//! text as a known attack category. The rules are checked in order and the
//! first match wins, so an XSS payload wrapped in SQL noise reports as XSS.

use clubgate_core::{AppError, AppResult};
use clubgate_domain::AttackType;
use regex::Regex;

/// Fixed upper bound on any single submitted field.
pub const MAX_INPUT_LENGTH: usize = 1000;

/// A denylist hit: which category fired and the offending fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternMatch {
    /// Category of the matched rule.
    pub attack_type: AttackType,
    /// The matched input fragment.
    pub matched: String,
}

/// Compiled denylist rules plus the sanitizer used on echoed output.
pub struct InputInspector {
    rules: Vec<(AttackType, Regex)>,
    strip_chars: Regex,
    strip_handlers: Regex,
}

impl InputInspector {
    /// Compiles the rule table.
    pub fn new() -> AppResult<Self> {
        let patterns: &[(AttackType, &str)] = &[
            (
                AttackType::Xss,
                r"(?i)(<script|javascript:|vbscript:|on\w+\s*=|<iframe|<object|<embed)",
            ),
            (
                AttackType::SqlInjection,
                r"(?i)(union\s+select|insert\s+into|delete\s+from|drop\s+table|update\s+\w+\s+set)",
            ),
            (AttackType::SqlInjection, r"(?i)\b(or|and)\b\s+\d+\s*=\s*\d+"),
            (AttackType::SqlInjection, r"(--\s|--$|#\s|;\s*--)"),
            (
                AttackType::CommandInjection,
                r"(?i)(\b(exec|eval|system|wget|curl|netcat)\b|/bin/sh|/bin/bash|\$\(|`)",
            ),
            (
                AttackType::PathTraversal,
                r"(?i)(\.\./|\.\.\\|%2e%2e%2f|%2e%2e%5c)",
            ),
        ];

        let rules = patterns
            .iter()
            .map(|(attack_type, pattern)| {
                Regex::new(pattern)
                    .map(|rule| (*attack_type, rule))
                    .map_err(|error| {
                        AppError::Internal(format!("invalid denylist pattern '{pattern}': {error}"))
                    })
            })
            .collect::<AppResult<Vec<_>>>()?;

        let strip_chars = Regex::new(r#"[<>"'&]"#)
            .map_err(|error| AppError::Internal(format!("invalid sanitizer pattern: {error}")))?;
        let strip_handlers = Regex::new(r"(?i)(javascript:|vbscript:|on\w+\s*=)")
            .map_err(|error| AppError::Internal(format!("invalid sanitizer pattern: {error}")))?;

        Ok(Self {
            rules,
            strip_chars,
            strip_handlers,
        })
    }

    /// Returns the first denylist rule matching `input`, if any.
    #[must_use]
    pub fn classify(&self, input: &str) -> Option<PatternMatch> {
        self.rules.iter().find_map(|(attack_type, rule)| {
            rule.find(input).map(|hit| PatternMatch {
                attack_type: *attack_type,
                matched: hit.as_str().to_owned(),
            })
        })
    }

    /// Strips markup characters and script-handler fragments from `input`.
    ///
    /// Used on the success path before echoing submitted values back to the
    /// caller, never as a substitute for rejection.
    #[must_use]
    pub fn sanitize(&self, input: &str) -> String {
        let without_handlers = self.strip_handlers.replace_all(input, "");
        let without_chars = self.strip_chars.replace_all(&without_handlers, "");
        without_chars.trim().to_owned()
    }
}

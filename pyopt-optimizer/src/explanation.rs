//! Explanation log
//!
//! Append-only record of every rewrite or removal, in the order the passes
//! discovered them. One log is threaded through all passes of a run.

use crate::rules::Rule;
use log::debug;
use pyopt_core::ast::Span;
use serde::Serialize;
use std::fmt;

/// A single applied change
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Explanation {
    /// Rule that fired
    pub rule: Rule,
    /// Human-readable description
    pub message: String,
    /// Location of the node that was replaced, if the parser tracked one
    pub span: Option<Span>,
}

impl Explanation {
    /// Create a new explanation
    pub fn new(rule: Rule, message: impl Into<String>, span: Option<Span>) -> Self {
        Self {
            rule,
            message: message.into(),
            span,
        }
    }
}

impl fmt::Display for Explanation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Ordered narrative of one optimizer run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExplanationLog {
    entries: Vec<Explanation>,
}

impl ExplanationLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry
    pub fn push(&mut self, explanation: Explanation) {
        match explanation.span {
            Some(span) => debug!("[{}] {} (at {})", explanation.rule, explanation.message, span),
            None => debug!("[{}] {}", explanation.rule, explanation.message),
        }
        self.entries.push(explanation);
    }

    /// Number of recorded changes
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing was changed
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in append order
    pub fn iter(&self) -> std::slice::Iter<'_, Explanation> {
        self.entries.iter()
    }

    /// Message texts in append order
    pub fn messages(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|e| e.message.as_str())
    }

    /// Number of entries produced by `rule`
    pub fn count(&self, rule: Rule) -> usize {
        self.entries.iter().filter(|e| e.rule == rule).count()
    }

    /// All messages, one per line
    pub fn joined(&self) -> String {
        self.messages().collect::<Vec<_>>().join("\n")
    }

    /// Consume the log, keeping only the message texts
    pub fn into_messages(self) -> Vec<String> {
        self.entries.into_iter().map(|e| e.message).collect()
    }
}

impl IntoIterator for ExplanationLog {
    type Item = Explanation;
    type IntoIter = std::vec::IntoIter<Explanation>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a ExplanationLog {
    type Item = &'a Explanation;
    type IntoIter = std::slice::Iter<'a, Explanation>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_order_is_preserved() {
        let mut log = ExplanationLog::new();
        log.push(Explanation::new(Rule::ConstantFolding, "first", None));
        log.push(Explanation::new(Rule::SelfAssignment, "second", Some(Span::line(2))));
        log.push(Explanation::new(Rule::UnusedVariable, "third", None));

        assert_eq!(log.len(), 3);
        assert_eq!(log.messages().collect::<Vec<_>>(), vec!["first", "second", "third"]);
        assert_eq!(log.joined(), "first\nsecond\nthird");
    }

    #[test]
    fn test_empty_log() {
        let log = ExplanationLog::new();
        assert!(log.is_empty());
        assert_eq!(log.joined(), "");
        assert!(log.into_messages().is_empty());
    }

    #[test]
    fn test_count_by_rule() {
        let mut log = ExplanationLog::new();
        log.push(Explanation::new(Rule::UnusedVariable, "a", None));
        log.push(Explanation::new(Rule::ConstantFolding, "b", None));
        log.push(Explanation::new(Rule::UnusedVariable, "c", None));

        assert_eq!(log.count(Rule::UnusedVariable), 2);
        assert_eq!(log.count(Rule::LengthCheck), 0);
    }

    #[test]
    fn test_display_is_message() {
        let explanation = Explanation::new(
            Rule::DoubleNegation,
            "Removed double negation: not(not x) → x.",
            None,
        );
        assert_eq!(explanation.to_string(), "Removed double negation: not(not x) → x.");
    }
}

//! Rewrite rule catalogue
//!
//! Each rule is a pure function over one node kind: it takes ownership of a
//! node whose children are already rewritten and either hands it back
//! unchanged or returns a replacement together with an explanation. Rules
//! never look at siblings and never recurse into their own output.

pub mod arithmetic;
pub mod assignment;
pub mod boolean;
pub mod compare;
pub mod conditional;
pub mod fold;
pub mod loops;

use crate::explanation::{Explanation, ExplanationLog};
use pyopt_core::ast::{Block, Expr, ExprKind, Stmt, StmtKind};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Identifies a rewrite rule (or the unused-variable pass)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Rule {
    /// Evaluate a binary operation over two literals
    ConstantFolding,
    /// `x + 0` and `0 + x` become `x`
    AdditiveIdentity,
    /// `x * 1` becomes `x`, `x * 0` becomes `0`
    MultiplicativeIdentity,
    /// `not (not x)` becomes `x`
    DoubleNegation,
    /// Drop literal `True` operands of `and`
    RedundantTrue,
    /// `len(x) == 0` becomes `not x`
    LengthCheck,
    /// `if True`/`if False` is replaced by the taken branch
    ConstantCondition,
    /// `if c: t = True else: t = False` becomes `t = c`
    BooleanAssignment,
    /// A loop that only appends becomes a list comprehension
    LoopToComprehension,
    /// `x = x` is removed
    SelfAssignment,
    /// Assignments to names never read are removed
    UnusedVariable,
}

impl Rule {
    /// Every rule, in catalogue order
    pub const ALL: [Rule; 11] = [
        Rule::ConstantFolding,
        Rule::AdditiveIdentity,
        Rule::MultiplicativeIdentity,
        Rule::DoubleNegation,
        Rule::RedundantTrue,
        Rule::LengthCheck,
        Rule::ConstantCondition,
        Rule::BooleanAssignment,
        Rule::LoopToComprehension,
        Rule::SelfAssignment,
        Rule::UnusedVariable,
    ];

    /// Stable kebab-case name, as used in configuration files
    pub fn name(self) -> &'static str {
        match self {
            Rule::ConstantFolding => "constant-folding",
            Rule::AdditiveIdentity => "additive-identity",
            Rule::MultiplicativeIdentity => "multiplicative-identity",
            Rule::DoubleNegation => "double-negation",
            Rule::RedundantTrue => "redundant-true",
            Rule::LengthCheck => "length-check",
            Rule::ConstantCondition => "constant-condition",
            Rule::BooleanAssignment => "boolean-assignment",
            Rule::LoopToComprehension => "loop-to-comprehension",
            Rule::SelfAssignment => "self-assignment",
            Rule::UnusedVariable => "unused-variable",
        }
    }

    /// One-line summary of the rewrite
    pub fn description(self) -> &'static str {
        match self {
            Rule::ConstantFolding => "evaluate binary operations over two literals",
            Rule::AdditiveIdentity => "x + 0 -> x, 0 + x -> x",
            Rule::MultiplicativeIdentity => "x * 1 -> x, x * 0 -> 0",
            Rule::DoubleNegation => "not (not x) -> x",
            Rule::RedundantTrue => "drop literal True operands of 'and'",
            Rule::LengthCheck => "len(x) == 0 -> not x",
            Rule::ConstantCondition => "if True/if False -> taken branch",
            Rule::BooleanAssignment => "if c: t = True else: t = False -> t = c",
            Rule::LoopToComprehension => "append-only for loop -> list comprehension",
            Rule::SelfAssignment => "remove x = x",
            Rule::UnusedVariable => "remove assignments to names never read",
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Rule name that matches nothing in the catalogue
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown rule '{0}'")]
pub struct UnknownRule(pub String);

impl FromStr for Rule {
    type Err = UnknownRule;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Rule::ALL
            .into_iter()
            .find(|rule| rule.name() == s)
            .ok_or_else(|| UnknownRule(s.to_string()))
    }
}

/// The enabled subset of the catalogue
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    disabled: FxHashSet<Rule>,
}

impl RuleSet {
    /// Every rule enabled
    pub fn all() -> Self {
        Self::default()
    }

    /// Every rule except `disabled`
    pub fn without(disabled: impl IntoIterator<Item = Rule>) -> Self {
        Self {
            disabled: disabled.into_iter().collect(),
        }
    }

    /// Whether `rule` may fire
    pub fn is_enabled(&self, rule: Rule) -> bool {
        !self.disabled.contains(&rule)
    }

    /// Offer `node` to `rewrite` if `rule` is enabled
    pub fn apply<T, R>(
        &self,
        rule: Rule,
        node: T,
        rewrite: impl FnOnce(T) -> Outcome<T, R>,
    ) -> Outcome<T, R> {
        if self.is_enabled(rule) {
            rewrite(node)
        } else {
            Outcome::Unchanged(node)
        }
    }
}

/// Result of offering a node to a rule
#[derive(Debug, PartialEq)]
pub enum Outcome<T, R = T> {
    /// The pattern did not match; the node is handed back untouched
    Unchanged(T),
    /// The node was replaced
    Rewritten(R, Explanation),
}

impl<T, R> Outcome<T, R> {
    /// Try another rule if this one did not match
    pub fn or_else(self, next: impl FnOnce(T) -> Outcome<T, R>) -> Self {
        match self {
            Outcome::Unchanged(node) => next(node),
            rewritten => rewritten,
        }
    }

    /// True if a rule fired
    pub fn is_rewritten(&self) -> bool {
        matches!(self, Outcome::Rewritten(..))
    }

    /// Append the explanation (if any) to `log` and return the resulting
    /// node, converting an unchanged node with `keep`
    pub fn record(self, log: &mut ExplanationLog, keep: impl FnOnce(T) -> R) -> R {
        match self {
            Outcome::Unchanged(node) => keep(node),
            Outcome::Rewritten(replacement, explanation) => {
                log.push(explanation);
                replacement
            }
        }
    }
}

/// Build a rewritten outcome
pub(crate) fn rewritten<T, R>(
    replacement: R,
    rule: Rule,
    message: impl Into<String>,
    span: Option<pyopt_core::Span>,
) -> Outcome<T, R> {
    Outcome::Rewritten(replacement, Explanation::new(rule, message, span))
}

/// Dispatch an expression whose children are already rewritten to the
/// rules for its kind
pub fn rewrite_expr(expr: Expr, rules: &RuleSet) -> Outcome<Expr> {
    let span = expr.span;
    match expr.kind {
        kind @ ExprKind::BinOp { .. } => rules
            .apply(Rule::ConstantFolding, Expr { kind, span }, arithmetic::fold_constants)
            .or_else(|e| rules.apply(Rule::AdditiveIdentity, e, arithmetic::additive_identity))
            .or_else(|e| {
                rules.apply(
                    Rule::MultiplicativeIdentity,
                    e,
                    arithmetic::multiplicative_identity,
                )
            }),
        kind @ ExprKind::UnaryOp { .. } => {
            rules.apply(Rule::DoubleNegation, Expr { kind, span }, boolean::double_negation)
        }
        kind @ ExprKind::BoolOp { .. } => {
            rules.apply(Rule::RedundantTrue, Expr { kind, span }, boolean::redundant_true)
        }
        kind @ ExprKind::Compare { .. } => {
            rules.apply(Rule::LengthCheck, Expr { kind, span }, compare::length_check)
        }
        kind => Outcome::Unchanged(Expr { kind, span }),
    }
}

/// Dispatch a statement whose children are already rewritten to the rules
/// for its kind. A statement may be replaced by zero or more statements.
pub fn rewrite_stmt(stmt: Stmt, rules: &RuleSet) -> Outcome<Stmt, Block> {
    let span = stmt.span;
    match stmt.kind {
        kind @ StmtKind::Assign { .. } => {
            rules.apply(Rule::SelfAssignment, Stmt { kind, span }, assignment::self_assignment)
        }
        kind @ StmtKind::If { .. } => rules
            .apply(
                Rule::ConstantCondition,
                Stmt { kind, span },
                conditional::constant_condition,
            )
            .or_else(|s| rules.apply(Rule::BooleanAssignment, s, conditional::boolean_assignment)),
        kind @ StmtKind::For { .. } => rules.apply(
            Rule::LoopToComprehension,
            Stmt { kind, span },
            loops::loop_to_comprehension,
        ),
        kind => Outcome::Unchanged(Stmt { kind, span }),
    }
}

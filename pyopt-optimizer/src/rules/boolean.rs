//! Boolean rules: double negation and redundant `True` in `and` chains

use super::{rewritten, Outcome, Rule};
use pyopt_core::ast::{BoolOperator, Expr, ExprKind, UnaryOperator};

/// `not (not x) -> x`
pub fn double_negation(expr: Expr) -> Outcome<Expr> {
    let span = expr.span;
    match expr.kind {
        ExprKind::UnaryOp {
            op: UnaryOperator::Not,
            operand,
        } => {
            let operand = *operand;
            match operand.kind {
                ExprKind::UnaryOp {
                    op: UnaryOperator::Not,
                    operand: inner,
                } => rewritten(
                    *inner,
                    Rule::DoubleNegation,
                    "Removed double negation: not(not x) → x.",
                    span,
                ),
                kind => Outcome::Unchanged(
                    Expr::not(Expr {
                        kind,
                        span: operand.span,
                    })
                    .with_span(span),
                ),
            }
        }
        kind => Outcome::Unchanged(Expr { kind, span }),
    }
}

/// Drop every literal `True` operand of an `and` chain.
///
/// One remaining operand replaces the chain; none leaves `True`.
pub fn redundant_true(expr: Expr) -> Outcome<Expr> {
    let span = expr.span;
    match expr.kind {
        ExprKind::BoolOp {
            op: BoolOperator::And,
            values,
        } if values.iter().any(Expr::is_true) => {
            let mut kept: Vec<Expr> = values.into_iter().filter(|v| !v.is_true()).collect();
            let replacement = if kept.len() > 1 {
                Expr::bool_op(BoolOperator::And, kept).with_span(span)
            } else {
                kept.pop()
                    .unwrap_or_else(|| Expr::bool(true).with_span(span))
            };
            rewritten(
                replacement,
                Rule::RedundantTrue,
                "Simplified boolean AND by removing redundant 'True' values.",
                span,
            )
        }
        kind => Outcome::Unchanged(Expr { kind, span }),
    }
}

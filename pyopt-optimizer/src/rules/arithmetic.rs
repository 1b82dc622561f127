//! Binary operation rules: constant folding and arithmetic identities

use super::{fold, rewritten, Outcome, Rule};
use log::trace;
use pyopt_core::ast::{Expr, ExprKind, Operator};

/// Replace `a op b` over two literals with its value.
///
/// Evaluation failures (type mismatch, division by zero, overflow) leave
/// the node untouched and log nothing.
pub fn fold_constants(expr: Expr) -> Outcome<Expr> {
    let span = expr.span;
    match expr.kind {
        ExprKind::BinOp { left, op, right } => {
            let folded = match (left.as_constant(), right.as_constant()) {
                (Some(a), Some(b)) => {
                    let value = fold::evaluate(op, a, b);
                    if value.is_none() {
                        trace!("not folding {} {} {}: evaluation failed", a, op.symbol(), b);
                    }
                    value
                }
                _ => None,
            };

            match folded {
                Some(value) => {
                    let message = format!(
                        "Applied constant folding: replaced expression with value {value}."
                    );
                    rewritten(
                        Expr::constant(value).with_span(span),
                        Rule::ConstantFolding,
                        message,
                        span,
                    )
                }
                None => Outcome::Unchanged(Expr {
                    kind: ExprKind::BinOp { left, op, right },
                    span,
                }),
            }
        }
        kind => Outcome::Unchanged(Expr { kind, span }),
    }
}

/// `x + 0 -> x` and `0 + x -> x`
pub fn additive_identity(expr: Expr) -> Outcome<Expr> {
    let span = expr.span;
    match expr.kind {
        ExprKind::BinOp {
            left,
            op: Operator::Add,
            right,
        } if right.is_int(0) => rewritten(
            *left,
            Rule::AdditiveIdentity,
            "Simplified addition: x + 0 → x.",
            span,
        ),
        ExprKind::BinOp {
            left,
            op: Operator::Add,
            right,
        } if left.is_int(0) => rewritten(
            *right,
            Rule::AdditiveIdentity,
            "Simplified addition: 0 + x → x.",
            span,
        ),
        kind => Outcome::Unchanged(Expr { kind, span }),
    }
}

/// `x * 1 -> x`, `1 * x -> x`, `x * 0 -> 0`, `0 * x -> 0`
///
/// The right operand is inspected first, so `0 * 1` keeps the left zero.
pub fn multiplicative_identity(expr: Expr) -> Outcome<Expr> {
    let span = expr.span;
    let zero = || Expr::int(0).with_span(span);

    match expr.kind {
        ExprKind::BinOp {
            left,
            op: Operator::Mult,
            right,
        } => {
            let simplified = |replacement: Expr, message: &str| -> Outcome<Expr> {
                rewritten(replacement, Rule::MultiplicativeIdentity, message, span)
            };
            if right.is_int(1) {
                simplified(*left, "Simplified multiplication: x × 1 → x.")
            } else if right.is_int(0) {
                simplified(zero(), "Simplified multiplication: x × 0 → 0.")
            } else if left.is_int(1) {
                simplified(*right, "Simplified multiplication: 1 × x → x.")
            } else if left.is_int(0) {
                simplified(zero(), "Simplified multiplication: 0 × x → 0.")
            } else {
                Outcome::Unchanged(Expr {
                    kind: ExprKind::BinOp {
                        left,
                        op: Operator::Mult,
                        right,
                    },
                    span,
                })
            }
        }
        kind => Outcome::Unchanged(Expr { kind, span }),
    }
}

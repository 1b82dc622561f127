//! `if` statement rules

use super::{rewritten, Outcome, Rule};
use pyopt_core::ast::{Block, Expr, Stmt, StmtKind};

/// Replace `if True`/`if False` with the branch that is always taken.
///
/// An empty taken branch (a missing `else`) leaves a single `pass`.
pub fn constant_condition(stmt: Stmt) -> Outcome<Stmt, Block> {
    let span = stmt.span;
    match stmt.kind {
        StmtKind::If { test, body, orelse } if test.is_true() || test.is_false() => {
            let (branch, message) = if test.is_true() {
                (body, "Removed if-condition with constant True.")
            } else {
                (orelse, "Removed if-condition with constant False.")
            };
            let replacement = if branch.is_empty() {
                vec![Stmt::pass().with_span(span)]
            } else {
                branch
            };
            rewritten(replacement, Rule::ConstantCondition, message, span)
        }
        kind => Outcome::Unchanged(Stmt { kind, span }),
    }
}

/// `if c: t = True else: t = False` becomes `t = c`.
///
/// Both branches must hold exactly one single-target assignment, and the
/// two targets must be the same expression.
pub fn boolean_assignment(stmt: Stmt) -> Outcome<Stmt, Block> {
    let span = stmt.span;
    match stmt.kind {
        StmtKind::If { test, body, orelse } => match boolean_target(&body, &orelse) {
            Some(target) => rewritten(
                vec![Stmt::assign(target, test).with_span(span)],
                Rule::BooleanAssignment,
                "Reduced if-else assignment to direct boolean assignment.",
                span,
            ),
            None => Outcome::Unchanged(Stmt {
                kind: StmtKind::If { test, body, orelse },
                span,
            }),
        },
        kind => Outcome::Unchanged(Stmt { kind, span }),
    }
}

/// Target and value of a block consisting of one single-target assignment
fn single_assignment(block: &Block) -> Option<(&Expr, &Expr)> {
    match block.as_slice() {
        [Stmt {
            kind: StmtKind::Assign { targets, value },
            ..
        }] => match targets.as_slice() {
            [target] => Some((target, value)),
            _ => None,
        },
        _ => None,
    }
}

fn boolean_target(body: &Block, orelse: &Block) -> Option<Expr> {
    let (then_target, then_value) = single_assignment(body)?;
    let (else_target, else_value) = single_assignment(orelse)?;
    (then_value.is_true() && else_value.is_false() && then_target.same_shape(else_target))
        .then(|| then_target.clone())
}

//! Comparison rules

use super::{rewritten, Outcome, Rule};
use pyopt_core::ast::{CmpOp, Expr, ExprKind};

const LENGTH_BUILTIN: &str = "len";

/// `len(x) == 0 -> not x`
///
/// Only a single `==` against the integer literal `0` matches; chained
/// comparisons and `len` calls with any other arity are left alone.
pub fn length_check(expr: Expr) -> Outcome<Expr> {
    let span = expr.span;
    match expr.kind {
        ExprKind::Compare { left, comparisons }
            if matches!(comparisons.as_slice(), [(CmpOp::Eq, right)] if right.is_int(0)) =>
        {
            match len_argument(*left) {
                Ok(arg) => rewritten(
                    Expr::not(arg).with_span(span),
                    Rule::LengthCheck,
                    "Replaced len(x) == 0 with not x for clarity and efficiency.",
                    span,
                ),
                Err(left) => Outcome::Unchanged(Expr {
                    kind: ExprKind::Compare {
                        left: Box::new(left),
                        comparisons,
                    },
                    span,
                }),
            }
        }
        kind => Outcome::Unchanged(Expr { kind, span }),
    }
}

/// The sole argument of a `len(...)` call, or the expression back
fn len_argument(expr: Expr) -> Result<Expr, Expr> {
    let span = expr.span;
    match expr.kind {
        ExprKind::Call { func, mut args }
            if func.as_name() == Some(LENGTH_BUILTIN) && args.len() == 1 =>
        {
            Ok(args.remove(0))
        }
        kind => Err(Expr { kind, span }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pyopt_core::ast::Span;

    fn len_of(arg: Expr) -> Expr {
        Expr::call(Expr::name("len"), vec![arg])
    }

    #[test]
    fn test_len_equals_zero() {
        let span = Some(Span::new(3, 7, 3, 22));
        let expr = Expr::compare(len_of(Expr::name("items")), vec![(CmpOp::Eq, Expr::int(0))])
            .with_span(span);

        match length_check(expr) {
            Outcome::Rewritten(result, explanation) => {
                assert_eq!(result, Expr::not(Expr::name("items")).with_span(span));
                assert_eq!(
                    explanation.message,
                    "Replaced len(x) == 0 with not x for clarity and efficiency."
                );
                assert_eq!(explanation.span, span);
            }
            other => panic!("expected rewrite, got {other:?}"),
        }
    }

    #[test]
    fn test_other_operators_untouched() {
        for op in [CmpOp::NotEq, CmpOp::Gt, CmpOp::Is] {
            let expr = Expr::compare(len_of(Expr::name("items")), vec![(op, Expr::int(0))]);
            assert_eq!(length_check(expr.clone()), Outcome::Unchanged(expr));
        }
    }

    #[test]
    fn test_nonzero_or_non_int_right_side_untouched() {
        for right in [Expr::int(1), Expr::float(0.0), Expr::bool(false), Expr::name("n")] {
            let expr = Expr::compare(len_of(Expr::name("items")), vec![(CmpOp::Eq, right)]);
            assert_eq!(length_check(expr.clone()), Outcome::Unchanged(expr));
        }
    }

    #[test]
    fn test_chained_comparison_untouched() {
        let expr = Expr::compare(
            len_of(Expr::name("items")),
            vec![(CmpOp::Eq, Expr::int(0)), (CmpOp::Eq, Expr::int(0))],
        );
        assert_eq!(length_check(expr.clone()), Outcome::Unchanged(expr));
    }

    #[test]
    fn test_not_a_len_call_untouched() {
        let cases = [
            Expr::call(Expr::name("size"), vec![Expr::name("items")]),
            Expr::call(Expr::name("len"), vec![Expr::name("a"), Expr::name("b")]),
            Expr::call(Expr::attribute(Expr::name("obj"), "len"), vec![Expr::name("items")]),
            Expr::name("len"),
        ];
        for left in cases {
            let expr = Expr::compare(left, vec![(CmpOp::Eq, Expr::int(0))]);
            assert_eq!(length_check(expr.clone()), Outcome::Unchanged(expr));
        }
    }
}

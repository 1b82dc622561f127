//! Loop rules

use super::{rewritten, Outcome, Rule};
use pyopt_core::ast::{Block, Comprehension, Expr, ExprKind, Stmt, StmtKind};

const APPEND_METHOD: &str = "append";

/// Rewrite
///
/// ```text
/// for x in xs:
///     out.append(f(x))
/// ```
///
/// into `out = [f(x) for x in xs]`.
///
/// The loop body must be exactly one `append` call with one argument.
pub fn loop_to_comprehension(stmt: Stmt) -> Outcome<Stmt, Block> {
    let span = stmt.span;
    match stmt.kind {
        StmtKind::For { target, iter, body } => match append_call(&body) {
            Some((list, item)) => {
                let comprehension = Expr::list_comp(
                    item,
                    vec![Comprehension {
                        target,
                        iter,
                        ifs: Vec::new(),
                    }],
                );
                rewritten(
                    vec![Stmt::assign(list, comprehension).with_span(span)],
                    Rule::LoopToComprehension,
                    "Converted loop-based append to list comprehension.",
                    span,
                )
            }
            None => Outcome::Unchanged(Stmt {
                kind: StmtKind::For { target, iter, body },
                span,
            }),
        },
        kind => Outcome::Unchanged(Stmt { kind, span }),
    }
}

/// `(receiver, argument)` of a body that is a lone `receiver.append(argument)`
fn append_call(body: &Block) -> Option<(Expr, Expr)> {
    let [Stmt {
        kind: StmtKind::Expr(call),
        ..
    }] = body.as_slice()
    else {
        return None;
    };
    let ExprKind::Call { func, args } = &call.kind else {
        return None;
    };
    let ExprKind::Attribute { value, attr, .. } = &func.kind else {
        return None;
    };
    match args.as_slice() {
        [item] if attr == APPEND_METHOD => Some(((**value).clone(), item.clone())),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pyopt_core::ast::{Operator, Span};

    fn append(list: &str, item: Expr) -> Stmt {
        Stmt::expr(Expr::call(Expr::attribute(Expr::name(list), "append"), vec![item]))
    }

    #[test]
    fn test_append_loop_becomes_comprehension() {
        let span = Some(Span::new(2, 0, 3, 30));
        let doubled = Expr::binop(Expr::name("x"), Operator::Mult, Expr::int(2));
        let stmt = Stmt::for_loop(
            Expr::name("x"),
            Expr::name("values"),
            vec![append("result", doubled.clone())],
        )
        .with_span(span);

        let expected = Stmt::assign(
            Expr::store("result"),
            Expr::list_comp(
                doubled,
                vec![Comprehension {
                    target: Expr::store("x"),
                    iter: Expr::name("values"),
                    ifs: vec![],
                }],
            ),
        )
        .with_span(span);

        match loop_to_comprehension(stmt) {
            Outcome::Rewritten(block, explanation) => {
                assert_eq!(block, vec![expected]);
                assert_eq!(
                    explanation.message,
                    "Converted loop-based append to list comprehension."
                );
                assert_eq!(explanation.span, span);
            }
            other => panic!("expected rewrite, got {other:?}"),
        }
    }

    #[test]
    fn test_attribute_receiver() {
        let receiver = Expr::attribute(Expr::name("self"), "items");
        let stmt = Stmt::for_loop(
            Expr::name("x"),
            Expr::name("xs"),
            vec![Stmt::expr(Expr::call(
                Expr::attribute(receiver.clone(), "append"),
                vec![Expr::name("x")],
            ))],
        );
        match loop_to_comprehension(stmt) {
            Outcome::Rewritten(block, _) => match &block[0].kind {
                StmtKind::Assign { targets, .. } => assert!(targets[0].same_shape(&receiver)),
                other => panic!("expected assignment, got {other:?}"),
            },
            other => panic!("expected rewrite, got {other:?}"),
        }
    }

    #[test]
    fn test_longer_body_untouched() {
        let stmt = Stmt::for_loop(
            Expr::name("x"),
            Expr::name("xs"),
            vec![append("out", Expr::name("x")), append("out", Expr::name("x"))],
        );
        assert_eq!(loop_to_comprehension(stmt.clone()), Outcome::Unchanged(stmt));
    }

    #[test]
    fn test_other_calls_untouched() {
        let bodies = [
            Stmt::expr(Expr::call(
                Expr::attribute(Expr::name("out"), "extend"),
                vec![Expr::name("x")],
            )),
            Stmt::expr(Expr::call(
                Expr::attribute(Expr::name("out"), "append"),
                vec![Expr::name("x"), Expr::name("y")],
            )),
            Stmt::expr(Expr::call(Expr::name("append"), vec![Expr::name("x")])),
            Stmt::assign(Expr::name("y"), Expr::name("x")),
        ];
        for body in bodies {
            let stmt = Stmt::for_loop(Expr::name("x"), Expr::name("xs"), vec![body]);
            assert_eq!(loop_to_comprehension(stmt.clone()), Outcome::Unchanged(stmt));
        }
    }
}

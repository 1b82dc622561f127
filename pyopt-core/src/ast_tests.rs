#[cfg(test)]
mod tests {
    use crate::ast::*;

    // ===== Constant Tests =====

    #[test]
    fn test_constant_display() {
        assert_eq!(Constant::Int(5).to_string(), "5");
        assert_eq!(Constant::Float(2.5).to_string(), "2.5");
        assert_eq!(Constant::Float(6.0).to_string(), "6.0");
        assert_eq!(Constant::Bool(true).to_string(), "True");
        assert_eq!(Constant::Bool(false).to_string(), "False");
        assert_eq!(Constant::Str("ab".to_string()).to_string(), "ab");
        assert_eq!(Constant::None.to_string(), "None");
    }

    #[test]
    fn test_format_float_scientific() {
        assert_eq!(format_float(1e16), "1e+16");
        assert_eq!(format_float(1.5e-5), "1.5e-05");
        assert_eq!(format_float(0.0001), "0.0001");
        assert_eq!(format_float(-0.0), "-0.0");
        assert_eq!(format_float(f64::INFINITY), "inf");
        assert_eq!(format_float(f64::NAN), "nan");
    }

    #[test]
    fn test_constant_predicates() {
        assert!(Constant::Bool(true).is_true());
        assert!(!Constant::Int(1).is_true());
        assert!(Constant::Bool(false).is_false());
        assert!(Constant::Int(0).is_int(0));
        // Booleans and floats are never the integer literal
        assert!(!Constant::Bool(false).is_int(0));
        assert!(!Constant::Float(0.0).is_int(0));
    }

    // ===== Expression Tests =====

    #[test]
    fn test_name_contexts() {
        assert_eq!(
            Expr::name("x").kind,
            ExprKind::Name {
                id: "x".to_string(),
                ctx: ExprContext::Load
            }
        );
        assert_eq!(
            Expr::store("x").kind,
            ExprKind::Name {
                id: "x".to_string(),
                ctx: ExprContext::Store
            }
        );
        assert_eq!(Expr::name("x").as_name(), Some("x"));
        assert_eq!(Expr::int(1).as_name(), None);
    }

    #[test]
    fn test_with_ctx_only_touches_outer_node() {
        let target = Expr::attribute(Expr::name("obj"), "field").with_ctx(ExprContext::Store);
        match target.kind {
            ExprKind::Attribute { value, ctx, .. } => {
                assert_eq!(ctx, ExprContext::Store);
                assert_eq!(
                    value.kind,
                    ExprKind::Name {
                        id: "obj".to_string(),
                        ctx: ExprContext::Load
                    }
                );
            }
            other => panic!("expected attribute, got {other:?}"),
        }
    }

    #[test]
    fn test_with_ctx_propagates_into_list_targets() {
        let target =
            Expr::list(vec![Expr::name("a"), Expr::name("b")]).with_ctx(ExprContext::Store);
        match target.kind {
            ExprKind::List { elts, ctx } => {
                assert_eq!(ctx, ExprContext::Store);
                assert!(elts.iter().all(|e| matches!(
                    e.kind,
                    ExprKind::Name {
                        ctx: ExprContext::Store,
                        ..
                    }
                )));
            }
            other => panic!("expected list, got {other:?}"),
        }
    }

    #[test]
    fn test_same_shape_ignores_span_and_ctx() {
        let a = Expr::name("flag").with_span(Some(Span::line(1)));
        let b = Expr::store("flag").with_span(Some(Span::line(7)));
        assert!(a.same_shape(&b));
        assert_ne!(a, b);

        let c = Expr::attribute(Expr::name("self"), "ready");
        let d = Expr::attribute(Expr::name("self"), "done");
        assert!(!c.same_shape(&d));
    }

    #[test]
    fn test_same_shape_nested() {
        let build = |n| {
            Expr::compare(
                Expr::call(Expr::name("len"), vec![Expr::name("xs")]),
                vec![(CmpOp::Gt, Expr::int(n))],
            )
        };
        assert!(build(3).same_shape(&build(3)));
        assert!(!build(3).same_shape(&build(4)));
    }

    // ===== Statement Tests =====

    #[test]
    fn test_assign_sets_store_context() {
        let stmt = Stmt::assign(Expr::name("x"), Expr::int(1));
        match stmt.kind {
            StmtKind::Assign { targets, .. } => {
                assert_eq!(targets.len(), 1);
                assert!(matches!(
                    targets[0].kind,
                    ExprKind::Name {
                        ctx: ExprContext::Store,
                        ..
                    }
                ));
            }
            other => panic!("expected assignment, got {other:?}"),
        }
    }

    #[test]
    fn test_pass() {
        assert!(Stmt::pass().is_pass());
        assert!(!Stmt::expr(Expr::name("x")).is_pass());
    }

    // ===== Serialization Tests =====

    #[test]
    fn test_json_round_trip_keeps_spans() {
        let module = Module::new(vec![Stmt::assign(
            Expr::name("x"),
            Expr::binop(Expr::int(2), Operator::Add, Expr::int(3))
                .with_span(Some(Span::new(1, 4, 1, 9))),
        )
        .with_span(Some(Span::line(1)))]);

        let json = module.to_json().unwrap();
        let restored = Module::from_json(&json).unwrap();
        assert_eq!(restored, module);
    }

    #[test]
    fn test_json_spans_are_optional() {
        let json = r#"{"body": [{"kind": "Pass"}]}"#;
        let module = Module::from_json(json).unwrap();
        assert_eq!(module.body, vec![Stmt::pass()]);
    }

    #[test]
    fn test_json_rejects_unknown_kind() {
        let json = r#"{"body": [{"kind": "Yield"}]}"#;
        assert!(matches!(
            Module::from_json(json),
            Err(crate::Error::Json(_))
        ));
    }
}

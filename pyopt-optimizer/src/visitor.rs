//! Read-only traversal infrastructure
//!
//! A [`Visitor`] overrides the hooks it cares about; the `walk_*` functions
//! visit every child of a node in source order and can be called from an
//! override to keep descending.

use pyopt_core::ast::{Expr, ExprContext, ExprKind, Module, Span, Stmt, StmtKind};

/// Trait for visiting tree nodes without modifying them
pub trait Visitor {
    /// Visit a whole program
    fn visit_module(&mut self, module: &Module) {
        walk_block(self, &module.body);
    }

    /// Visit a statement
    fn visit_stmt(&mut self, stmt: &Stmt) {
        walk_stmt(self, stmt);
    }

    /// Visit an expression
    fn visit_expr(&mut self, expr: &Expr) {
        walk_expr(self, expr);
    }

    /// Visit an identifier use
    fn visit_name(&mut self, _id: &str, _ctx: ExprContext, _span: Option<Span>) {}
}

/// Visit each statement of a block in order
pub fn walk_block<V: Visitor + ?Sized>(visitor: &mut V, block: &[Stmt]) {
    for stmt in block {
        visitor.visit_stmt(stmt);
    }
}

/// Visit the children of a statement
pub fn walk_stmt<V: Visitor + ?Sized>(visitor: &mut V, stmt: &Stmt) {
    match &stmt.kind {
        StmtKind::Assign { targets, value } => {
            for target in targets {
                visitor.visit_expr(target);
            }
            visitor.visit_expr(value);
        }
        StmtKind::If { test, body, orelse } => {
            visitor.visit_expr(test);
            walk_block(visitor, body);
            walk_block(visitor, orelse);
        }
        StmtKind::For { target, iter, body } => {
            visitor.visit_expr(target);
            visitor.visit_expr(iter);
            walk_block(visitor, body);
        }
        StmtKind::While { test, body } => {
            visitor.visit_expr(test);
            walk_block(visitor, body);
        }
        StmtKind::FunctionDef { body, .. } => walk_block(visitor, body),
        StmtKind::Return(Some(value)) | StmtKind::Expr(value) => visitor.visit_expr(value),
        StmtKind::Return(None) | StmtKind::Pass => {}
    }
}

/// Visit the children of an expression
pub fn walk_expr<V: Visitor + ?Sized>(visitor: &mut V, expr: &Expr) {
    match &expr.kind {
        ExprKind::Constant(_) => {}
        ExprKind::Name { id, ctx } => visitor.visit_name(id, *ctx, expr.span),
        ExprKind::BinOp { left, right, .. } => {
            visitor.visit_expr(left);
            visitor.visit_expr(right);
        }
        ExprKind::UnaryOp { operand, .. } => visitor.visit_expr(operand),
        ExprKind::BoolOp { values, .. } => {
            for value in values {
                visitor.visit_expr(value);
            }
        }
        ExprKind::Compare { left, comparisons } => {
            visitor.visit_expr(left);
            for (_, right) in comparisons {
                visitor.visit_expr(right);
            }
        }
        ExprKind::Call { func, args } => {
            visitor.visit_expr(func);
            for arg in args {
                visitor.visit_expr(arg);
            }
        }
        ExprKind::Attribute { value, .. } => visitor.visit_expr(value),
        ExprKind::Subscript { value, index, .. } => {
            visitor.visit_expr(value);
            visitor.visit_expr(index);
        }
        ExprKind::List { elts, .. } => {
            for elt in elts {
                visitor.visit_expr(elt);
            }
        }
        ExprKind::ListComp { elt, generators } => {
            visitor.visit_expr(elt);
            for generator in generators {
                visitor.visit_expr(&generator.target);
                visitor.visit_expr(&generator.iter);
                for condition in &generator.ifs {
                    visitor.visit_expr(condition);
                }
            }
        }
    }
}

/// Counts statements and expressions
#[derive(Debug, Default)]
pub struct NodeCounter {
    /// Nodes seen so far
    pub count: usize,
}

impl Visitor for NodeCounter {
    fn visit_stmt(&mut self, stmt: &Stmt) {
        self.count += 1;
        walk_stmt(self, stmt);
    }

    fn visit_expr(&mut self, expr: &Expr) {
        self.count += 1;
        walk_expr(self, expr);
    }
}

/// Total number of statement and expression nodes in `module`
pub fn count_nodes(module: &Module) -> usize {
    let mut counter = NodeCounter::default();
    counter.visit_module(module);
    counter.count
}

#[cfg(test)]
mod tests {
    use super::*;
    use pyopt_core::ast::{Comprehension, Operator};

    #[derive(Default)]
    struct NameRecorder {
        names: Vec<(String, ExprContext)>,
    }

    impl Visitor for NameRecorder {
        fn visit_name(&mut self, id: &str, ctx: ExprContext, _span: Option<Span>) {
            self.names.push((id.to_string(), ctx));
        }
    }

    #[test]
    fn test_names_in_source_order() {
        let module = Module::new(vec![
            Stmt::assign(
                Expr::name("total"),
                Expr::binop(Expr::name("a"), Operator::Add, Expr::name("b")),
            ),
            Stmt::for_loop(
                Expr::name("i"),
                Expr::name("items"),
                vec![Stmt::expr(Expr::call(Expr::name("show"), vec![Expr::name("i")]))],
            ),
        ]);

        let mut recorder = NameRecorder::default();
        recorder.visit_module(&module);

        let names: Vec<_> = recorder.names.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(names, vec!["total", "a", "b", "i", "items", "show", "i"]);
        assert_eq!(recorder.names[0].1, ExprContext::Store);
        assert_eq!(recorder.names[1].1, ExprContext::Load);
        assert_eq!(recorder.names[3].1, ExprContext::Store);
    }

    #[test]
    fn test_comprehension_and_function_bodies_are_walked() {
        let comp = Expr::list_comp(
            Expr::name("x"),
            vec![Comprehension {
                target: Expr::store("x"),
                iter: Expr::name("xs"),
                ifs: vec![Expr::name("keep")],
            }],
        );
        let module = Module::new(vec![Stmt::function_def(
            "f",
            vec!["xs".to_string()],
            vec![Stmt::ret(Some(comp))],
        )]);

        let mut recorder = NameRecorder::default();
        recorder.visit_module(&module);

        let names: Vec<_> = recorder.names.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(names, vec!["x", "x", "xs", "keep"]);
    }

    #[test]
    fn test_count_nodes() {
        // x = 1 + 2  ->  Assign, Name, BinOp, Constant, Constant
        let module = Module::new(vec![Stmt::assign(
            Expr::name("x"),
            Expr::binop(Expr::int(1), Operator::Add, Expr::int(2)),
        )]);
        assert_eq!(count_nodes(&module), 5);
        assert_eq!(count_nodes(&Module::default()), 0);
    }
}

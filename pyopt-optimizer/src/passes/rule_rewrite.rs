//! Bottom-up rule rewriting pass

use crate::explanation::ExplanationLog;
use crate::passes::{rebuild_block, OptimizationPass};
use crate::rules::{self, RuleSet};
use anyhow::Result;
use log::trace;
use pyopt_core::ast::{Block, Comprehension, Expr, ExprKind, Module, Stmt, StmtKind};

/// Applies the rule catalogue in one post-order traversal.
///
/// Every child of a node is rewritten before the node itself is offered to
/// the rules, and a replacement is never revisited within the same run.
pub struct RuleRewritePass {
    rules: RuleSet,
    rewrites: usize,
}

impl RuleRewritePass {
    /// Create a pass applying the enabled subset of the catalogue
    pub fn new(rules: RuleSet) -> Self {
        Self { rules, rewrites: 0 }
    }

    /// Number of rewrites applied by the last run
    pub fn rewrites(&self) -> usize {
        self.rewrites
    }

    fn rewrite_block(&mut self, block: Block, required: bool, log: &mut ExplanationLog) -> Block {
        rebuild_block(block, required, |stmt| self.rewrite_stmt(stmt, log))
    }

    fn rewrite_stmt(&mut self, stmt: Stmt, log: &mut ExplanationLog) -> Block {
        let kind = match stmt.kind {
            StmtKind::Assign { targets, value } => StmtKind::Assign {
                targets: self.rewrite_exprs(targets, log),
                value: self.rewrite_expr(value, log),
            },
            StmtKind::If { test, body, orelse } => StmtKind::If {
                test: self.rewrite_expr(test, log),
                body: self.rewrite_block(body, true, log),
                orelse: self.rewrite_block(orelse, false, log),
            },
            StmtKind::For { target, iter, body } => StmtKind::For {
                target: self.rewrite_expr(target, log),
                iter: self.rewrite_expr(iter, log),
                body: self.rewrite_block(body, true, log),
            },
            StmtKind::While { test, body } => StmtKind::While {
                test: self.rewrite_expr(test, log),
                body: self.rewrite_block(body, true, log),
            },
            StmtKind::FunctionDef { name, params, body } => StmtKind::FunctionDef {
                name,
                params,
                body: self.rewrite_block(body, true, log),
            },
            StmtKind::Return(value) => StmtKind::Return(value.map(|v| self.rewrite_expr(v, log))),
            StmtKind::Expr(value) => StmtKind::Expr(self.rewrite_expr(value, log)),
            StmtKind::Pass => StmtKind::Pass,
        };

        let outcome = rules::rewrite_stmt(Stmt { kind, span: stmt.span }, &self.rules);
        if outcome.is_rewritten() {
            self.rewrites += 1;
        }
        outcome.record(log, |stmt| vec![stmt])
    }

    fn rewrite_exprs(&mut self, exprs: Vec<Expr>, log: &mut ExplanationLog) -> Vec<Expr> {
        exprs
            .into_iter()
            .map(|expr| self.rewrite_expr(expr, log))
            .collect()
    }

    fn rewrite_boxed(&mut self, expr: Box<Expr>, log: &mut ExplanationLog) -> Box<Expr> {
        Box::new(self.rewrite_expr(*expr, log))
    }

    fn rewrite_expr(&mut self, expr: Expr, log: &mut ExplanationLog) -> Expr {
        let kind = match expr.kind {
            kind @ (ExprKind::Constant(_) | ExprKind::Name { .. }) => kind,
            ExprKind::BinOp { left, op, right } => ExprKind::BinOp {
                left: self.rewrite_boxed(left, log),
                op,
                right: self.rewrite_boxed(right, log),
            },
            ExprKind::UnaryOp { op, operand } => ExprKind::UnaryOp {
                op,
                operand: self.rewrite_boxed(operand, log),
            },
            ExprKind::BoolOp { op, values } => ExprKind::BoolOp {
                op,
                values: self.rewrite_exprs(values, log),
            },
            ExprKind::Compare { left, comparisons } => ExprKind::Compare {
                left: self.rewrite_boxed(left, log),
                comparisons: comparisons
                    .into_iter()
                    .map(|(op, right)| (op, self.rewrite_expr(right, log)))
                    .collect(),
            },
            ExprKind::Call { func, args } => ExprKind::Call {
                func: self.rewrite_boxed(func, log),
                args: self.rewrite_exprs(args, log),
            },
            ExprKind::Attribute { value, attr, ctx } => ExprKind::Attribute {
                value: self.rewrite_boxed(value, log),
                attr,
                ctx,
            },
            ExprKind::Subscript { value, index, ctx } => ExprKind::Subscript {
                value: self.rewrite_boxed(value, log),
                index: self.rewrite_boxed(index, log),
                ctx,
            },
            ExprKind::List { elts, ctx } => ExprKind::List {
                elts: self.rewrite_exprs(elts, log),
                ctx,
            },
            ExprKind::ListComp { elt, generators } => ExprKind::ListComp {
                elt: self.rewrite_boxed(elt, log),
                generators: generators
                    .into_iter()
                    .map(|generator| Comprehension {
                        target: self.rewrite_expr(generator.target, log),
                        iter: self.rewrite_expr(generator.iter, log),
                        ifs: self.rewrite_exprs(generator.ifs, log),
                    })
                    .collect(),
            },
        };

        let outcome = rules::rewrite_expr(Expr { kind, span: expr.span }, &self.rules);
        if outcome.is_rewritten() {
            self.rewrites += 1;
        }
        outcome.record(log, |expr| expr)
    }
}

impl Default for RuleRewritePass {
    fn default() -> Self {
        Self::new(RuleSet::all())
    }
}

impl OptimizationPass for RuleRewritePass {
    fn name(&self) -> &str {
        "Rule Rewrite"
    }

    fn run(&mut self, module: Module, log: &mut ExplanationLog) -> Result<Module> {
        self.rewrites = 0;
        trace!("{}: rewriting {} top-level statements", self.name(), module.body.len());

        let body = self.rewrite_block(module.body, true, log);

        trace!("{}: {} rewrites", self.name(), self.rewrites);
        Ok(Module::new(body))
    }

    fn stats(&self) -> String {
        format!("{} pass: {} rewrites applied", self.name(), self.rewrites)
    }
}

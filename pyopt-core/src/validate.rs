//! Structural validation of trees handed over by a parser
//!
//! A tree that fails validation is an upstream bug. It is reported as
//! [`Error::MalformedInput`] and never repaired.

use crate::ast::{Block, Expr, ExprKind, Module, Span, Stmt, StmtKind};
use crate::error::{Error, Result};

impl Module {
    /// Check every structural invariant of the tree.
    ///
    /// Required bodies (`if`, `for`, `while`, `def`) must be non-empty;
    /// boolean operators need two operands; comparisons, assignments and
    /// comprehensions need at least one comparison, target or generator.
    pub fn validate(&self) -> Result<()> {
        validate_block(&self.body)
    }
}

fn malformed(what: &str, span: Option<Span>, problem: &str) -> Error {
    match span {
        Some(span) => Error::MalformedInput(format!("{what} at {span} {problem}")),
        None => Error::MalformedInput(format!("{what} {problem}")),
    }
}

fn validate_block(block: &Block) -> Result<()> {
    block.iter().try_for_each(validate_stmt)
}

fn require_body(what: &str, stmt: &Stmt, body: &Block) -> Result<()> {
    if body.is_empty() {
        return Err(malformed(what, stmt.span, "has an empty body"));
    }
    validate_block(body)
}

fn validate_stmt(stmt: &Stmt) -> Result<()> {
    match &stmt.kind {
        StmtKind::Assign { targets, value } => {
            if targets.is_empty() {
                return Err(malformed("Assignment", stmt.span, "has no targets"));
            }
            targets.iter().try_for_each(validate_expr)?;
            validate_expr(value)
        }
        StmtKind::If { test, body, orelse } => {
            validate_expr(test)?;
            require_body("If", stmt, body)?;
            validate_block(orelse)
        }
        StmtKind::For { target, iter, body } => {
            validate_expr(target)?;
            validate_expr(iter)?;
            require_body("For loop", stmt, body)
        }
        StmtKind::While { test, body } => {
            validate_expr(test)?;
            require_body("While loop", stmt, body)
        }
        StmtKind::FunctionDef { name, body, .. } => {
            require_body(&format!("Function '{name}'"), stmt, body)
        }
        StmtKind::Return(value) => value.iter().try_for_each(validate_expr),
        StmtKind::Expr(value) => validate_expr(value),
        StmtKind::Pass => Ok(()),
    }
}

fn validate_expr(expr: &Expr) -> Result<()> {
    match &expr.kind {
        ExprKind::Constant(_) | ExprKind::Name { .. } => Ok(()),
        ExprKind::BinOp { left, right, .. } => {
            validate_expr(left)?;
            validate_expr(right)
        }
        ExprKind::UnaryOp { operand, .. } => validate_expr(operand),
        ExprKind::BoolOp { op, values } => {
            if values.len() < 2 {
                return Err(malformed(
                    &format!("Boolean '{}'", op.keyword()),
                    expr.span,
                    &format!("has {} operand(s), expected at least 2", values.len()),
                ));
            }
            values.iter().try_for_each(validate_expr)
        }
        ExprKind::Compare { left, comparisons } => {
            if comparisons.is_empty() {
                return Err(malformed("Comparison", expr.span, "has no operators"));
            }
            validate_expr(left)?;
            comparisons.iter().try_for_each(|(_, right)| validate_expr(right))
        }
        ExprKind::Call { func, args } => {
            validate_expr(func)?;
            args.iter().try_for_each(validate_expr)
        }
        ExprKind::Attribute { value, .. } => validate_expr(value),
        ExprKind::Subscript { value, index, .. } => {
            validate_expr(value)?;
            validate_expr(index)
        }
        ExprKind::List { elts, .. } => elts.iter().try_for_each(validate_expr),
        ExprKind::ListComp { elt, generators } => {
            if generators.is_empty() {
                return Err(malformed("List comprehension", expr.span, "has no generators"));
            }
            validate_expr(elt)?;
            generators.iter().try_for_each(|generator| {
                validate_expr(&generator.target)?;
                validate_expr(&generator.iter)?;
                generator.ifs.iter().try_for_each(validate_expr)
            })
        }
    }
}

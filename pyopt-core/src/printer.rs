//! Source printer
//!
//! Renders a tree back to source text with the minimal parentheses the
//! operator precedences require.

use crate::ast::{
    format_float, Block, BoolOperator, Comprehension, Constant, Expr, ExprKind, Module,
    Operator, Stmt, StmtKind, UnaryOperator,
};

const INDENT: &str = "    ";

// Binding strength, weakest first.
const TEST: u8 = 0;
const OR: u8 = 1;
const AND: u8 = 2;
const NOT: u8 = 3;
const CMP: u8 = 4;
const BIT_OR: u8 = 5;
const BIT_XOR: u8 = 6;
const BIT_AND: u8 = 7;
const SHIFT: u8 = 8;
const ARITH: u8 = 9;
const TERM: u8 = 10;
const FACTOR: u8 = 11;
const POWER: u8 = 12;
const ATOM: u8 = 13;

/// Render a whole program. Statements are separated by newlines with no
/// trailing newline; an empty program renders as the empty string.
pub fn unparse(module: &Module) -> String {
    let mut printer = Printer::default();
    printer.block(&module.body);
    printer.finish()
}

/// Render a single expression
pub fn unparse_expr(expr: &Expr) -> String {
    let mut printer = Printer::default();
    printer.expr(expr, TEST);
    printer.out
}

#[derive(Default)]
struct Printer {
    out: String,
    indent: usize,
}

impl Printer {
    fn finish(mut self) -> String {
        while self.out.ends_with('\n') {
            self.out.pop();
        }
        self.out
    }

    fn line_start(&mut self) {
        for _ in 0..self.indent {
            self.out.push_str(INDENT);
        }
    }

    fn block(&mut self, block: &Block) {
        for stmt in block {
            self.stmt(stmt);
        }
    }

    fn nested(&mut self, block: &Block) {
        self.indent += 1;
        if block.is_empty() {
            // Only reachable for hand-built trees that skipped validation.
            self.line_start();
            self.out.push_str("pass\n");
        } else {
            self.block(block);
        }
        self.indent -= 1;
    }

    fn stmt(&mut self, stmt: &Stmt) {
        self.line_start();
        match &stmt.kind {
            StmtKind::Assign { targets, value } => {
                for target in targets {
                    self.expr(target, TEST);
                    self.out.push_str(" = ");
                }
                self.expr(value, TEST);
                self.out.push('\n');
            }
            StmtKind::If { test, body, orelse } => {
                self.out.push_str("if ");
                self.if_chain(test, body, orelse);
            }
            StmtKind::For { target, iter, body } => {
                self.out.push_str("for ");
                self.expr(target, TEST);
                self.out.push_str(" in ");
                self.expr(iter, TEST);
                self.out.push_str(":\n");
                self.nested(body);
            }
            StmtKind::While { test, body } => {
                self.out.push_str("while ");
                self.expr(test, TEST);
                self.out.push_str(":\n");
                self.nested(body);
            }
            StmtKind::FunctionDef { name, params, body } => {
                self.out.push_str(&format!("def {}({}):\n", name, params.join(", ")));
                self.nested(body);
            }
            StmtKind::Return(value) => {
                self.out.push_str("return");
                if let Some(value) = value {
                    self.out.push(' ');
                    self.expr(value, TEST);
                }
                self.out.push('\n');
            }
            StmtKind::Expr(value) => {
                self.expr(value, TEST);
                self.out.push('\n');
            }
            StmtKind::Pass => self.out.push_str("pass\n"),
        }
    }

    fn if_chain(&mut self, test: &Expr, body: &Block, orelse: &Block) {
        self.expr(test, TEST);
        self.out.push_str(":\n");
        self.nested(body);

        match orelse.as_slice() {
            [] => {}
            [Stmt {
                kind:
                    StmtKind::If {
                        test,
                        body,
                        orelse,
                    },
                ..
            }] => {
                self.line_start();
                self.out.push_str("elif ");
                self.if_chain(test, body, orelse);
            }
            _ => {
                self.line_start();
                self.out.push_str("else:\n");
                self.nested(orelse);
            }
        }
    }

    fn expr(&mut self, expr: &Expr, min_prec: u8) {
        let wrap = precedence(expr) < min_prec;
        if wrap {
            self.out.push('(');
        }

        match &expr.kind {
            ExprKind::Constant(value) => self.constant(value),
            ExprKind::Name { id, .. } => self.out.push_str(id),
            ExprKind::BinOp { left, op, right } => {
                let prec = operator_precedence(*op);
                let (left_min, right_min) = if *op == Operator::Pow {
                    (prec + 1, FACTOR)
                } else {
                    (prec, prec + 1)
                };
                self.expr(left, left_min);
                self.out.push_str(&format!(" {} ", op.symbol()));
                self.expr(right, right_min);
            }
            ExprKind::UnaryOp { op, operand } => {
                self.out.push_str(op.symbol());
                let prec = if *op == UnaryOperator::Not { NOT } else { FACTOR };
                self.expr(operand, prec);
            }
            ExprKind::BoolOp { op, values } => {
                let prec = if *op == BoolOperator::And { AND } else { OR };
                let separator = format!(" {} ", op.keyword());
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        self.out.push_str(&separator);
                    }
                    self.expr(value, prec + 1);
                }
            }
            ExprKind::Compare { left, comparisons } => {
                self.expr(left, CMP + 1);
                for (op, right) in comparisons {
                    self.out.push_str(&format!(" {} ", op.symbol()));
                    self.expr(right, CMP + 1);
                }
            }
            ExprKind::Call { func, args } => {
                self.expr(func, ATOM);
                self.out.push('(');
                self.comma_separated(args);
                self.out.push(')');
            }
            ExprKind::Attribute { value, attr, .. } => {
                self.expr(value, ATOM);
                self.out.push('.');
                self.out.push_str(attr);
            }
            ExprKind::Subscript { value, index, .. } => {
                self.expr(value, ATOM);
                self.out.push('[');
                self.expr(index, TEST);
                self.out.push(']');
            }
            ExprKind::List { elts, .. } => {
                self.out.push('[');
                self.comma_separated(elts);
                self.out.push(']');
            }
            ExprKind::ListComp { elt, generators } => {
                self.out.push('[');
                self.expr(elt, TEST);
                for generator in generators {
                    self.comprehension(generator);
                }
                self.out.push(']');
            }
        }

        if wrap {
            self.out.push(')');
        }
    }

    fn comprehension(&mut self, generator: &Comprehension) {
        self.out.push_str(" for ");
        self.expr(&generator.target, TEST);
        self.out.push_str(" in ");
        self.expr(&generator.iter, OR);
        for condition in &generator.ifs {
            self.out.push_str(" if ");
            self.expr(condition, OR);
        }
    }

    fn comma_separated(&mut self, items: &[Expr]) {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.out.push_str(", ");
            }
            self.expr(item, TEST);
        }
    }

    fn constant(&mut self, value: &Constant) {
        match value {
            Constant::Str(s) => self.out.push_str(&repr_str(s)),
            Constant::Float(f) if f.is_infinite() => {
                self.out.push_str(if *f > 0.0 { "1e309" } else { "-1e309" })
            }
            Constant::Float(f) if f.is_nan() => self.out.push_str("float('nan')"),
            Constant::Float(f) => self.out.push_str(&format_float(*f)),
            other => self.out.push_str(&other.to_string()),
        }
    }
}

fn operator_precedence(op: Operator) -> u8 {
    match op {
        Operator::Add | Operator::Sub => ARITH,
        Operator::Mult
        | Operator::MatMult
        | Operator::Div
        | Operator::Mod
        | Operator::FloorDiv => TERM,
        Operator::Pow => POWER,
        Operator::LShift | Operator::RShift => SHIFT,
        Operator::BitOr => BIT_OR,
        Operator::BitXor => BIT_XOR,
        Operator::BitAnd => BIT_AND,
    }
}

fn precedence(expr: &Expr) -> u8 {
    match &expr.kind {
        ExprKind::Constant(Constant::Int(i)) if *i < 0 => FACTOR,
        ExprKind::Constant(Constant::Float(f)) if f.is_sign_negative() => FACTOR,
        ExprKind::BinOp { op, .. } => operator_precedence(*op),
        ExprKind::UnaryOp {
            op: UnaryOperator::Not,
            ..
        } => NOT,
        ExprKind::UnaryOp { .. } => FACTOR,
        ExprKind::BoolOp {
            op: BoolOperator::And,
            ..
        } => AND,
        ExprKind::BoolOp { .. } => OR,
        ExprKind::Compare { .. } => CMP,
        _ => ATOM,
    }
}

/// Quote a string the way `repr()` does
fn repr_str(s: &str) -> String {
    let quote = if s.contains('\'') && !s.contains('"') {
        '"'
    } else {
        '\''
    };

    let mut out = String::with_capacity(s.len() + 2);
    out.push(quote);
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if c.is_control() => out.push_str(&format!("\\x{:02x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

#[cfg(test)]
#[path = "printer_tests.rs"]
mod tests;

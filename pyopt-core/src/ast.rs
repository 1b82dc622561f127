//! Tree representation of programs
//!
//! Every node owns its children exclusively: there are no back-references
//! and no sharing between subtrees. Rewrites replace nodes wholesale, so a
//! tree can be handed between passes by value.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A statement sequence (body of a module, branch or loop)
pub type Block = Vec<Stmt>;

/// Source location of a node, as reported by the parser
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    /// 1-based start line
    pub line: u32,
    /// 0-based start column
    pub column: u32,
    /// 1-based end line
    pub end_line: u32,
    /// 0-based end column
    pub end_column: u32,
}

impl Span {
    pub fn new(line: u32, column: u32, end_line: u32, end_column: u32) -> Self {
        Self {
            line,
            column,
            end_line,
            end_column,
        }
    }

    /// Span covering a single line
    pub fn line(line: u32) -> Self {
        Self::new(line, 0, line, 0)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Role of a name (or attribute/subscript) at its use site
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExprContext {
    /// Value is read
    #[default]
    Load,
    /// Value is written
    Store,
    /// Value is deleted
    Del,
}

/// Literal values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Constant {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
    None,
}

impl Constant {
    /// Literal `True`
    pub fn is_true(&self) -> bool {
        matches!(self, Constant::Bool(true))
    }

    /// Literal `False`
    pub fn is_false(&self) -> bool {
        matches!(self, Constant::Bool(false))
    }

    /// Integer literal equal to `n`. Booleans and floats never match.
    pub fn is_int(&self, n: i64) -> bool {
        matches!(self, Constant::Int(value) if *value == n)
    }
}

/// Renders the value the way `str()` would; used in explanations.
impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constant::Int(i) => write!(f, "{i}"),
            Constant::Float(fl) => write!(f, "{}", format_float(*fl)),
            Constant::Bool(true) => write!(f, "True"),
            Constant::Bool(false) => write!(f, "False"),
            Constant::Str(s) => write!(f, "{s}"),
            Constant::None => write!(f, "None"),
        }
    }
}

/// Shortest round-trip float text with a mandatory fractional part and
/// scientific notation outside `[1e-4, 1e16)`.
pub fn format_float(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let magnitude = value.abs();
    if magnitude != 0.0 && !(1e-4..1e16).contains(&magnitude) {
        let formatted = format!("{value:e}");
        return match formatted.split_once('e') {
            Some((mantissa, exponent)) => {
                let exponent: i32 = exponent.parse().unwrap_or(0);
                let sign = if exponent < 0 { '-' } else { '+' };
                format!("{mantissa}e{sign}{:02}", exponent.abs())
            }
            None => formatted,
        };
    }

    let formatted = format!("{value}");
    if formatted.contains('.') {
        formatted
    } else {
        format!("{formatted}.0")
    }
}

/// Binary arithmetic operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    Add,
    Sub,
    Mult,
    MatMult,
    Div,
    Mod,
    Pow,
    LShift,
    RShift,
    BitOr,
    BitXor,
    BitAnd,
    FloorDiv,
}

impl Operator {
    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Sub => "-",
            Operator::Mult => "*",
            Operator::MatMult => "@",
            Operator::Div => "/",
            Operator::Mod => "%",
            Operator::Pow => "**",
            Operator::LShift => "<<",
            Operator::RShift => ">>",
            Operator::BitOr => "|",
            Operator::BitXor => "^",
            Operator::BitAnd => "&",
            Operator::FloorDiv => "//",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOperator {
    Not,
    Invert,
    UAdd,
    USub,
}

impl UnaryOperator {
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOperator::Not => "not ",
            UnaryOperator::Invert => "~",
            UnaryOperator::UAdd => "+",
            UnaryOperator::USub => "-",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BoolOperator {
    And,
    Or,
}

impl BoolOperator {
    pub fn keyword(self) -> &'static str {
        match self {
            BoolOperator::And => "and",
            BoolOperator::Or => "or",
        }
    }
}

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CmpOp {
    Eq,
    NotEq,
    Lt,
    LtE,
    Gt,
    GtE,
    Is,
    IsNot,
    In,
    NotIn,
}

impl CmpOp {
    pub fn symbol(self) -> &'static str {
        match self {
            CmpOp::Eq => "==",
            CmpOp::NotEq => "!=",
            CmpOp::Lt => "<",
            CmpOp::LtE => "<=",
            CmpOp::Gt => ">",
            CmpOp::GtE => ">=",
            CmpOp::Is => "is",
            CmpOp::IsNot => "is not",
            CmpOp::In => "in",
            CmpOp::NotIn => "not in",
        }
    }
}

/// Expression node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expr {
    pub kind: ExprKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span: Option<Span>,
}

/// Expression kinds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExprKind {
    Constant(Constant),
    Name {
        id: String,
        ctx: ExprContext,
    },
    BinOp {
        left: Box<Expr>,
        op: Operator,
        right: Box<Expr>,
    },
    UnaryOp {
        op: UnaryOperator,
        operand: Box<Expr>,
    },
    /// Short-circuit chain; always carries at least two operands
    BoolOp {
        op: BoolOperator,
        values: Vec<Expr>,
    },
    /// `left op1 right1 op2 right2 ...`
    Compare {
        left: Box<Expr>,
        comparisons: Vec<(CmpOp, Expr)>,
    },
    Call {
        func: Box<Expr>,
        args: Vec<Expr>,
    },
    Attribute {
        value: Box<Expr>,
        attr: String,
        ctx: ExprContext,
    },
    Subscript {
        value: Box<Expr>,
        index: Box<Expr>,
        ctx: ExprContext,
    },
    List {
        elts: Vec<Expr>,
        ctx: ExprContext,
    },
    ListComp {
        elt: Box<Expr>,
        generators: Vec<Comprehension>,
    },
}

/// One `for target in iter if cond...` clause of a comprehension
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comprehension {
    pub target: Expr,
    pub iter: Expr,
    pub ifs: Vec<Expr>,
}

impl Expr {
    pub fn new(kind: ExprKind) -> Self {
        Self { kind, span: None }
    }

    /// Attach a source location
    pub fn with_span(mut self, span: Option<Span>) -> Self {
        self.span = span;
        self
    }

    pub fn constant(value: Constant) -> Self {
        Self::new(ExprKind::Constant(value))
    }

    pub fn int(value: i64) -> Self {
        Self::constant(Constant::Int(value))
    }

    pub fn float(value: f64) -> Self {
        Self::constant(Constant::Float(value))
    }

    pub fn bool(value: bool) -> Self {
        Self::constant(Constant::Bool(value))
    }

    pub fn str(value: impl Into<String>) -> Self {
        Self::constant(Constant::Str(value.into()))
    }

    pub fn none() -> Self {
        Self::constant(Constant::None)
    }

    /// Name in read position
    pub fn name(id: impl Into<String>) -> Self {
        Self::new(ExprKind::Name {
            id: id.into(),
            ctx: ExprContext::Load,
        })
    }

    /// Name in write position
    pub fn store(id: impl Into<String>) -> Self {
        Self::new(ExprKind::Name {
            id: id.into(),
            ctx: ExprContext::Store,
        })
    }

    pub fn binop(left: Expr, op: Operator, right: Expr) -> Self {
        Self::new(ExprKind::BinOp {
            left: Box::new(left),
            op,
            right: Box::new(right),
        })
    }

    pub fn unary(op: UnaryOperator, operand: Expr) -> Self {
        Self::new(ExprKind::UnaryOp {
            op,
            operand: Box::new(operand),
        })
    }

    pub fn not(operand: Expr) -> Self {
        Self::unary(UnaryOperator::Not, operand)
    }

    pub fn bool_op(op: BoolOperator, values: Vec<Expr>) -> Self {
        Self::new(ExprKind::BoolOp { op, values })
    }

    pub fn compare(left: Expr, comparisons: Vec<(CmpOp, Expr)>) -> Self {
        Self::new(ExprKind::Compare {
            left: Box::new(left),
            comparisons,
        })
    }

    pub fn call(func: Expr, args: Vec<Expr>) -> Self {
        Self::new(ExprKind::Call {
            func: Box::new(func),
            args,
        })
    }

    /// Attribute access in read position
    pub fn attribute(value: Expr, attr: impl Into<String>) -> Self {
        Self::new(ExprKind::Attribute {
            value: Box::new(value),
            attr: attr.into(),
            ctx: ExprContext::Load,
        })
    }

    /// Subscript in read position
    pub fn subscript(value: Expr, index: Expr) -> Self {
        Self::new(ExprKind::Subscript {
            value: Box::new(value),
            index: Box::new(index),
            ctx: ExprContext::Load,
        })
    }

    pub fn list(elts: Vec<Expr>) -> Self {
        Self::new(ExprKind::List {
            elts,
            ctx: ExprContext::Load,
        })
    }

    pub fn list_comp(elt: Expr, generators: Vec<Comprehension>) -> Self {
        Self::new(ExprKind::ListComp {
            elt: Box::new(elt),
            generators,
        })
    }

    pub fn as_constant(&self) -> Option<&Constant> {
        match &self.kind {
            ExprKind::Constant(value) => Some(value),
            _ => None,
        }
    }

    /// Identifier of a bare name, regardless of its context
    pub fn as_name(&self) -> Option<&str> {
        match &self.kind {
            ExprKind::Name { id, .. } => Some(id),
            _ => None,
        }
    }

    pub fn is_true(&self) -> bool {
        self.as_constant().is_some_and(Constant::is_true)
    }

    pub fn is_false(&self) -> bool {
        self.as_constant().is_some_and(Constant::is_false)
    }

    pub fn is_int(&self, n: i64) -> bool {
        self.as_constant().is_some_and(|value| value.is_int(n))
    }

    /// Re-role an assignable expression. Only the outermost node changes:
    /// the object of `a.b` stays a read of `a` whatever role `a.b` plays.
    pub fn with_ctx(mut self, new_ctx: ExprContext) -> Self {
        match &mut self.kind {
            ExprKind::Name { ctx, .. }
            | ExprKind::Attribute { ctx, .. }
            | ExprKind::Subscript { ctx, .. } => *ctx = new_ctx,
            ExprKind::List { elts, ctx } => {
                *ctx = new_ctx;
                let items = std::mem::take(elts);
                *elts = items.into_iter().map(|e| e.with_ctx(new_ctx)).collect();
            }
            _ => {}
        }
        self
    }

    /// Structural equality ignoring spans and contexts
    pub fn same_shape(&self, other: &Expr) -> bool {
        use ExprKind as K;

        match (&self.kind, &other.kind) {
            (K::Constant(a), K::Constant(b)) => a == b,
            (K::Name { id: a, .. }, K::Name { id: b, .. }) => a == b,
            (
                K::BinOp { left: l1, op: o1, right: r1 },
                K::BinOp { left: l2, op: o2, right: r2 },
            ) => o1 == o2 && l1.same_shape(l2) && r1.same_shape(r2),
            (K::UnaryOp { op: o1, operand: a }, K::UnaryOp { op: o2, operand: b }) => {
                o1 == o2 && a.same_shape(b)
            }
            (K::BoolOp { op: o1, values: a }, K::BoolOp { op: o2, values: b }) => {
                o1 == o2 && all_same_shape(a, b)
            }
            (
                K::Compare { left: l1, comparisons: c1 },
                K::Compare { left: l2, comparisons: c2 },
            ) => {
                l1.same_shape(l2)
                    && c1.len() == c2.len()
                    && c1
                        .iter()
                        .zip(c2)
                        .all(|((o1, a), (o2, b))| o1 == o2 && a.same_shape(b))
            }
            (K::Call { func: f1, args: a1 }, K::Call { func: f2, args: a2 }) => {
                f1.same_shape(f2) && all_same_shape(a1, a2)
            }
            (
                K::Attribute { value: v1, attr: a1, .. },
                K::Attribute { value: v2, attr: a2, .. },
            ) => a1 == a2 && v1.same_shape(v2),
            (
                K::Subscript { value: v1, index: i1, .. },
                K::Subscript { value: v2, index: i2, .. },
            ) => v1.same_shape(v2) && i1.same_shape(i2),
            (K::List { elts: a, .. }, K::List { elts: b, .. }) => all_same_shape(a, b),
            (
                K::ListComp { elt: e1, generators: g1 },
                K::ListComp { elt: e2, generators: g2 },
            ) => {
                e1.same_shape(e2)
                    && g1.len() == g2.len()
                    && g1.iter().zip(g2).all(|(a, b)| {
                        a.target.same_shape(&b.target)
                            && a.iter.same_shape(&b.iter)
                            && all_same_shape(&a.ifs, &b.ifs)
                    })
            }
            _ => false,
        }
    }
}

fn all_same_shape(a: &[Expr], b: &[Expr]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.same_shape(y))
}

/// Statement node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stmt {
    pub kind: StmtKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span: Option<Span>,
}

/// Statement kinds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StmtKind {
    Assign {
        targets: Vec<Expr>,
        value: Expr,
    },
    If {
        test: Expr,
        body: Block,
        orelse: Block,
    },
    For {
        target: Expr,
        iter: Expr,
        body: Block,
    },
    While {
        test: Expr,
        body: Block,
    },
    FunctionDef {
        name: String,
        params: Vec<String>,
        body: Block,
    },
    Return(Option<Expr>),
    /// Expression evaluated for its side effects
    Expr(Expr),
    Pass,
}

impl Stmt {
    pub fn new(kind: StmtKind) -> Self {
        Self { kind, span: None }
    }

    pub fn with_span(mut self, span: Option<Span>) -> Self {
        self.span = span;
        self
    }

    /// Single-target assignment; the target is re-roled as a store
    pub fn assign(target: Expr, value: Expr) -> Self {
        Self::new(StmtKind::Assign {
            targets: vec![target.with_ctx(ExprContext::Store)],
            value,
        })
    }

    pub fn if_else(test: Expr, body: Block, orelse: Block) -> Self {
        Self::new(StmtKind::If { test, body, orelse })
    }

    pub fn for_loop(target: Expr, iter: Expr, body: Block) -> Self {
        Self::new(StmtKind::For {
            target: target.with_ctx(ExprContext::Store),
            iter,
            body,
        })
    }

    pub fn while_loop(test: Expr, body: Block) -> Self {
        Self::new(StmtKind::While { test, body })
    }

    pub fn function_def(name: impl Into<String>, params: Vec<String>, body: Block) -> Self {
        Self::new(StmtKind::FunctionDef {
            name: name.into(),
            params,
            body,
        })
    }

    pub fn ret(value: Option<Expr>) -> Self {
        Self::new(StmtKind::Return(value))
    }

    pub fn expr(value: Expr) -> Self {
        Self::new(StmtKind::Expr(value))
    }

    pub fn pass() -> Self {
        Self::new(StmtKind::Pass)
    }

    pub fn is_pass(&self) -> bool {
        matches!(self.kind, StmtKind::Pass)
    }
}

/// A whole program
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Module {
    pub body: Block,
}

impl Module {
    pub fn new(body: Block) -> Self {
        Self { body }
    }

    /// Load a tree serialized by an external parser
    pub fn from_json(text: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
#[path = "ast_tests.rs"]
mod tests;

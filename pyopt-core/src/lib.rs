//! Core types for pyopt
//!
//! This crate provides the building blocks shared by the optimizer and its
//! front ends:
//! - Tree representation of statements and expressions
//! - Structural validation of trees handed over by a parser
//! - Source printer
//! - Error types

pub mod ast;
pub mod error;
pub mod printer;
pub mod validate;

pub use ast::{Expr, ExprKind, Module, Span, Stmt, StmtKind};
pub use error::{Error, Result};
pub use printer::unparse;

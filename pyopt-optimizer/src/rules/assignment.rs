//! Assignment rules

use super::{rewritten, Outcome, Rule};
use pyopt_core::ast::{Block, Stmt, StmtKind};

/// Remove `x = x`
pub fn self_assignment(stmt: Stmt) -> Outcome<Stmt, Block> {
    let span = stmt.span;
    let name = match &stmt.kind {
        StmtKind::Assign { targets, value } => match (targets.as_slice(), value.as_name()) {
            ([target], Some(source)) if target.as_name() == Some(source) => {
                Some(source.to_string())
            }
            _ => None,
        },
        _ => None,
    };

    match name {
        Some(name) => rewritten(
            Vec::new(),
            Rule::SelfAssignment,
            format!("Removed redundant self-assignment: {name} = {name}."),
            span,
        ),
        None => Outcome::Unchanged(stmt),
    }
}

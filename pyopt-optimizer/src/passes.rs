//! Individual optimization passes

pub mod rule_rewrite;
pub mod unused_variables;

use crate::explanation::ExplanationLog;
use anyhow::Result;
use pyopt_core::ast::{Block, Module, Stmt};

/// Trait for optimization passes
pub trait OptimizationPass: Send + Sync {
    /// Name of the optimization pass
    fn name(&self) -> &str;

    /// Run the optimization pass, appending one entry to `log` per change
    fn run(&mut self, module: Module, log: &mut ExplanationLog) -> Result<Module>;

    /// Check if the pass is applicable
    fn is_applicable(&self, module: &Module) -> bool {
        !module.body.is_empty()
    }

    /// Get statistics about the pass
    fn stats(&self) -> String {
        format!("{} pass completed", self.name())
    }
}

/// Rebuild a block statement by statement.
///
/// A `required` block that had statements and lost all of them becomes a
/// single `pass` located at the first statement that was removed.
pub(crate) fn rebuild_block(
    block: Block,
    required: bool,
    rewrite: impl FnMut(Stmt) -> Block,
) -> Block {
    let first_span = block.first().and_then(|stmt| stmt.span);
    let was_empty = block.is_empty();

    let rebuilt: Block = block.into_iter().flat_map(rewrite).collect();
    if rebuilt.is_empty() && required && !was_empty {
        vec![Stmt::pass().with_span(first_span)]
    } else {
        rebuilt
    }
}

#[cfg(test)]
#[path = "passes_tests.rs"]
mod passes_tests;

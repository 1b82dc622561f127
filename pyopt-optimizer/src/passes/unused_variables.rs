//! Unused variable elimination pass
//!
//! Liveness here is flat and whole-program: a name read anywhere in the
//! module, in any scope and on any path, keeps every assignment to that name
//! alive. Shadowing and reachability are deliberately not modelled.

use crate::explanation::{Explanation, ExplanationLog};
use crate::passes::{rebuild_block, OptimizationPass};
use crate::rules::Rule;
use crate::visitor::Visitor;
use anyhow::Result;
use log::trace;
use pyopt_core::ast::{Block, ExprContext, Module, Span, Stmt, StmtKind};
use rustc_hash::FxHashSet;

/// Collects every identifier that appears in a read position
#[derive(Debug, Default)]
pub struct ReadCollector {
    /// Names read so far
    pub reads: FxHashSet<String>,
}

impl Visitor for ReadCollector {
    fn visit_name(&mut self, id: &str, ctx: ExprContext, _span: Option<Span>) {
        if ctx == ExprContext::Load && !self.reads.contains(id) {
            self.reads.insert(id.to_string());
        }
    }
}

/// Every identifier read anywhere in `module`
pub fn collect_reads(module: &Module) -> FxHashSet<String> {
    let mut collector = ReadCollector::default();
    collector.visit_module(module);
    collector.reads
}

/// Removes single-name assignments whose name is never read
pub struct UnusedVariablePass {
    removed: usize,
}

impl UnusedVariablePass {
    /// Create new unused variable pass
    pub fn new() -> Self {
        Self { removed: 0 }
    }

    /// Number of assignments removed by the last run
    pub fn removed(&self) -> usize {
        self.removed
    }

    fn prune_block(
        &mut self,
        block: Block,
        required: bool,
        reads: &FxHashSet<String>,
        log: &mut ExplanationLog,
    ) -> Block {
        rebuild_block(block, required, |stmt| self.prune_stmt(stmt, reads, log))
    }

    fn prune_stmt(
        &mut self,
        stmt: Stmt,
        reads: &FxHashSet<String>,
        log: &mut ExplanationLog,
    ) -> Block {
        let span = stmt.span;
        let kind = match stmt.kind {
            StmtKind::Assign { targets, value } => {
                if let [target] = targets.as_slice() {
                    if let Some(name) = target.as_name().filter(|name| !reads.contains(*name)) {
                        log.push(Explanation::new(
                            Rule::UnusedVariable,
                            format!("Removed unused variable assignment: '{name}'"),
                            span,
                        ));
                        self.removed += 1;
                        return Vec::new();
                    }
                }
                StmtKind::Assign { targets, value }
            }
            StmtKind::If { test, body, orelse } => StmtKind::If {
                test,
                body: self.prune_block(body, true, reads, log),
                orelse: self.prune_block(orelse, false, reads, log),
            },
            StmtKind::For { target, iter, body } => StmtKind::For {
                target,
                iter,
                body: self.prune_block(body, true, reads, log),
            },
            StmtKind::While { test, body } => StmtKind::While {
                test,
                body: self.prune_block(body, true, reads, log),
            },
            StmtKind::FunctionDef { name, params, body } => StmtKind::FunctionDef {
                name,
                params,
                body: self.prune_block(body, true, reads, log),
            },
            kind => kind,
        };
        vec![Stmt { kind, span }]
    }
}

impl Default for UnusedVariablePass {
    fn default() -> Self {
        Self::new()
    }
}

impl OptimizationPass for UnusedVariablePass {
    fn name(&self) -> &str {
        "Unused Variable Elimination"
    }

    fn run(&mut self, module: Module, log: &mut ExplanationLog) -> Result<Module> {
        self.removed = 0;
        let reads = collect_reads(&module);
        trace!("{}: {} names read", self.name(), reads.len());

        let body = self.prune_block(module.body, true, &reads, log);
        Ok(Module::new(body))
    }

    fn stats(&self) -> String {
        format!("{} pass: {} assignments removed", self.name(), self.removed)
    }
}

//! Optimization statistics tracking

use crate::explanation::ExplanationLog;
use crate::rules::Rule;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Statistics about one pipeline run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OptimizationStats {
    /// Number of rule rewrites applied
    pub rewrites_applied: usize,
    /// Number of unused assignments removed
    pub assignments_removed: usize,
    /// Number of times the pass sequence ran
    pub iterations: usize,
    /// Number of nodes before optimization
    pub nodes_before: usize,
    /// Number of nodes after optimization
    pub nodes_after: usize,
    /// Time spent optimizing (microseconds)
    pub optimization_time_us: u64,
}

impl OptimizationStats {
    /// Create new statistics tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Count the entries of `log` by kind
    pub fn record(&mut self, log: &ExplanationLog) {
        let removed = log.count(Rule::UnusedVariable);
        self.assignments_removed += removed;
        self.rewrites_applied += log.len() - removed;
    }

    /// Calculate reduction percentage; negative when the tree grew
    pub fn reduction_percentage(&self) -> f64 {
        if self.nodes_before == 0 {
            0.0
        } else {
            (self.nodes_before as f64 - self.nodes_after as f64) / self.nodes_before as f64 * 100.0
        }
    }

    /// Get total optimizations performed
    pub fn total_optimizations(&self) -> usize {
        self.rewrites_applied + self.assignments_removed
    }
}

impl fmt::Display for OptimizationStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Optimization Statistics:")?;
        writeln!(
            f,
            "  Nodes: {} -> {} ({:.1}% reduction)",
            self.nodes_before,
            self.nodes_after,
            self.reduction_percentage()
        )?;
        writeln!(f, "  Rewrites applied: {}", self.rewrites_applied)?;
        writeln!(f, "  Assignments removed: {}", self.assignments_removed)?;
        writeln!(f, "  Iterations: {}", self.iterations)?;
        writeln!(f, "  Total optimizations: {}", self.total_optimizations())?;
        writeln!(f, "  Time: {:.3}ms", self.optimization_time_us as f64 / 1000.0)?;
        Ok(())
    }
}

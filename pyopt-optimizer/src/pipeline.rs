//! Optimization pipeline management

use crate::explanation::ExplanationLog;
use crate::passes::OptimizationPass;
use crate::rules::{Rule, RuleSet};
use crate::stats::OptimizationStats;
use crate::visitor::count_nodes;
use anyhow::Result;
use log::{debug, info};
use pyopt_core::ast::Module;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Optimization level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptimizationLevel {
    /// No optimizations
    None,
    /// Rewrite rules only (O1)
    Basic,
    /// Rewrite rules and unused variable removal, one run (O2)
    Standard,
    /// Standard, repeated until a run changes nothing (O3)
    Aggressive,
}

impl OptimizationLevel {
    /// Level for a numeric `-O` flag; anything above 3 is aggressive
    pub fn from_number(level: u8) -> Self {
        match level {
            0 => OptimizationLevel::None,
            1 => OptimizationLevel::Basic,
            2 => OptimizationLevel::Standard,
            _ => OptimizationLevel::Aggressive,
        }
    }
}

/// Optimization configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizationConfig {
    /// Optimization level
    pub level: OptimizationLevel,
    /// Run the rule rewrite pass
    pub rewrite_rules: bool,
    /// Run the unused variable pass
    pub remove_unused_variables: bool,
    /// Rules that never fire
    pub disabled_rules: Vec<Rule>,
    /// Maximum number of times the pass sequence runs
    pub max_iterations: usize,
}

impl OptimizationConfig {
    /// Create config for optimization level
    pub fn for_level(level: OptimizationLevel) -> Self {
        match level {
            OptimizationLevel::None => Self {
                level,
                rewrite_rules: false,
                remove_unused_variables: false,
                disabled_rules: Vec::new(),
                max_iterations: 0,
            },
            OptimizationLevel::Basic => Self {
                level,
                rewrite_rules: true,
                remove_unused_variables: false,
                disabled_rules: Vec::new(),
                max_iterations: 1,
            },
            OptimizationLevel::Standard => Self {
                level,
                rewrite_rules: true,
                remove_unused_variables: true,
                disabled_rules: Vec::new(),
                max_iterations: 1,
            },
            OptimizationLevel::Aggressive => Self {
                level,
                rewrite_rules: true,
                remove_unused_variables: true,
                disabled_rules: Vec::new(),
                max_iterations: 8,
            },
        }
    }

    /// Enabled subset of the rule catalogue
    pub fn rule_set(&self) -> RuleSet {
        RuleSet::without(self.disabled_rules.iter().copied())
    }
}

impl Default for OptimizationConfig {
    fn default() -> Self {
        Self::for_level(OptimizationLevel::Standard)
    }
}

/// Output of one pipeline run
#[derive(Debug, Clone, PartialEq)]
pub struct Optimized {
    /// The rewritten program
    pub module: Module,
    /// Every change, in the order it was made
    pub explanations: ExplanationLog,
    /// Counters for the run
    pub stats: OptimizationStats,
}

/// Optimization pipeline
pub struct OptimizationPipeline {
    config: OptimizationConfig,
    stats: OptimizationStats,
    passes: Vec<Box<dyn OptimizationPass>>,
}

impl OptimizationPipeline {
    /// Create new optimization pipeline
    pub fn new(config: OptimizationConfig) -> Self {
        let mut pipeline = Self {
            config,
            stats: OptimizationStats::new(),
            passes: Vec::new(),
        };

        pipeline.configure_passes();

        pipeline
    }

    /// Configure passes based on config
    fn configure_passes(&mut self) {
        use crate::passes::*;

        self.passes.clear();

        if self.config.level == OptimizationLevel::None {
            return;
        }

        if self.config.rewrite_rules {
            self.passes
                .push(Box::new(rule_rewrite::RuleRewritePass::new(self.config.rule_set())));
        }

        if self.config.remove_unused_variables
            && !self.config.disabled_rules.contains(&Rule::UnusedVariable)
        {
            self.passes.push(Box::new(unused_variables::UnusedVariablePass::new()));
        }
    }

    /// Active configuration
    pub fn config(&self) -> &OptimizationConfig {
        &self.config
    }

    /// Run optimization pipeline.
    ///
    /// Fails only if `module` is structurally malformed; every pass shares one
    /// explanation log. The pass sequence is repeated up to
    /// `max_iterations` times and stops early after a run that changed nothing.
    pub fn optimize(&mut self, module: Module) -> Result<Optimized> {
        let start = Instant::now();
        self.stats = OptimizationStats::new();

        module.validate()?;
        self.stats.nodes_before = count_nodes(&module);

        let mut module = module;
        let mut log = ExplanationLog::new();

        for iteration in 0..self.config.max_iterations {
            let before = log.len();

            for pass in &mut self.passes {
                if pass.is_applicable(&module) {
                    module = pass.run(module, &mut log)?;
                    debug!("{}", pass.stats());
                }
            }

            self.stats.iterations += 1;

            if log.len() == before {
                debug!("no changes in iteration {}, stopping", iteration + 1);
                break;
            }
        }

        self.stats.record(&log);
        self.stats.nodes_after = count_nodes(&module);
        self.stats.optimization_time_us = start.elapsed().as_micros() as u64;

        info!(
            "optimized at {:?}: {} changes in {} iteration(s), {} -> {} nodes",
            self.config.level,
            log.len(),
            self.stats.iterations,
            self.stats.nodes_before,
            self.stats.nodes_after
        );

        Ok(Optimized {
            module,
            explanations: log,
            stats: self.stats.clone(),
        })
    }

    /// Get optimization statistics
    pub fn stats(&self) -> &OptimizationStats {
        &self.stats
    }

    /// Add custom pass
    pub fn add_pass(&mut self, pass: Box<dyn OptimizationPass>) {
        self.passes.push(pass);
    }

    /// Remove all passes
    pub fn clear_passes(&mut self) {
        self.passes.clear();
    }

    /// Names of the configured passes, in run order
    pub fn pass_names(&self) -> Vec<&str> {
        self.passes.iter().map(|pass| pass.name()).collect()
    }
}

impl Default for OptimizationPipeline {
    fn default() -> Self {
        Self::new(OptimizationConfig::default())
    }
}

/// Optimize `module` with the default configuration: one rewrite pass
/// followed by one unused variable pass.
pub fn optimize(module: Module) -> Result<Optimized> {
    OptimizationPipeline::default().optimize(module)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_presets() {
        let none = OptimizationConfig::for_level(OptimizationLevel::None);
        assert_eq!(none.max_iterations, 0);
        assert!(OptimizationPipeline::new(none).pass_names().is_empty());

        let basic =
            OptimizationPipeline::new(OptimizationConfig::for_level(OptimizationLevel::Basic));
        assert_eq!(basic.pass_names(), vec!["Rule Rewrite"]);

        let standard = OptimizationPipeline::default();
        assert_eq!(standard.config().level, OptimizationLevel::Standard);
        assert_eq!(standard.config().max_iterations, 1);
        assert_eq!(
            standard.pass_names(),
            vec!["Rule Rewrite", "Unused Variable Elimination"]
        );

        let aggressive = OptimizationConfig::for_level(OptimizationLevel::Aggressive);
        assert_eq!(aggressive.max_iterations, 8);
    }

    #[test]
    fn test_from_number() {
        assert_eq!(OptimizationLevel::from_number(0), OptimizationLevel::None);
        assert_eq!(OptimizationLevel::from_number(1), OptimizationLevel::Basic);
        assert_eq!(OptimizationLevel::from_number(2), OptimizationLevel::Standard);
        assert_eq!(OptimizationLevel::from_number(3), OptimizationLevel::Aggressive);
        assert_eq!(OptimizationLevel::from_number(9), OptimizationLevel::Aggressive);
    }

    #[test]
    fn test_disabling_unused_variable_drops_the_pass() {
        let config = OptimizationConfig {
            disabled_rules: vec![Rule::UnusedVariable],
            ..OptimizationConfig::default()
        };
        assert_eq!(OptimizationPipeline::new(config).pass_names(), vec!["Rule Rewrite"]);
    }

    #[test]
    fn test_config_deserializes_with_defaults() {
        let config: OptimizationConfig = serde_json::from_str(
            r#"{"level": "basic", "disabled_rules": ["constant-folding"]}"#,
        )
        .unwrap();
        assert_eq!(config.level, OptimizationLevel::Basic);
        assert_eq!(config.disabled_rules, vec![Rule::ConstantFolding]);
        assert!(config.remove_unused_variables);
        assert!(!config.rule_set().is_enabled(Rule::ConstantFolding));
    }
}

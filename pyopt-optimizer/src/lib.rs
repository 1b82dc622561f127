//! pyopt rule-based optimizer
//!
//! This crate rewrites program trees with a fixed catalogue of
//! semantics-preserving simplifications and records a human-readable
//! explanation for every change:
//! - One bottom-up rewrite pass applying the rule catalogue
//! - A whole-program unused-variable pass
//! - A pipeline tying both together under a configuration
//! - A request boundary turning any failure into a response

#![warn(missing_docs)]

pub mod explanation;
pub mod passes;
pub mod pipeline;
pub mod rules;
pub mod service;
pub mod stats;
pub mod visitor;

pub use explanation::{Explanation, ExplanationLog};
pub use pipeline::{
    optimize, OptimizationConfig, OptimizationLevel, OptimizationPipeline, Optimized,
};
pub use rules::{Outcome, Rule, RuleSet};
pub use service::{OptimizeRequest, OptimizeResponse, OptimizeService};
pub use stats::OptimizationStats;

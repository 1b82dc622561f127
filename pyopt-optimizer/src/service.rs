//! Request boundary
//!
//! Wraps the pipeline behind a request/response pair. Parsing source text
//! into a tree and printing a tree back are delegated to [`SourceParser`] and
//! [`SourcePrinter`] implementations. [`OptimizeService::handle`] never fails
//! and never unwinds: every error, including a panic inside the engine,
//! becomes a response with empty `optimized_code`.

use crate::pipeline::{OptimizationConfig, OptimizationPipeline};
use anyhow::{Context, Result};
use log::warn;
use pyopt_core::ast::Module;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

const NOT_AVAILABLE: &str = "N/A";
const IMPROVED: &str = "Improved";

/// Request to optimize one program
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptimizeRequest {
    /// Program to optimize, in the form the configured parser accepts
    pub code: String,
}

/// Result of handling an [`OptimizeRequest`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptimizeResponse {
    /// Rewritten program, empty on failure
    pub optimized_code: String,
    /// One explanation per line, or the failure message
    pub explanation: String,
    /// Descriptive label, not a computed metric
    pub complexity_before: String,
    /// Descriptive label, not a computed metric
    pub complexity_after: String,
}

impl OptimizeResponse {
    /// Response reporting that a request could not be handled
    pub fn failure(message: impl std::fmt::Display) -> Self {
        Self {
            optimized_code: String::new(),
            explanation: format!("Level 1 optimization failed: {message}"),
            complexity_before: NOT_AVAILABLE.to_string(),
            complexity_after: NOT_AVAILABLE.to_string(),
        }
    }

    /// True when the request failed
    pub fn is_failure(&self) -> bool {
        self.complexity_after == NOT_AVAILABLE
    }
}

/// Turns request text into a tree
pub trait SourceParser: Send + Sync {
    /// Parse `source`, failing on text that is not a valid program
    fn parse(&self, source: &str) -> Result<Module>;
}

/// Turns a tree back into text
pub trait SourcePrinter: Send + Sync {
    /// Render `module`
    fn print(&self, module: &Module) -> String;
}

/// Reads the JSON tree format of [`Module::from_json`]; blank input is an
/// empty program
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonTreeParser;

impl SourceParser for JsonTreeParser {
    fn parse(&self, source: &str) -> Result<Module> {
        if source.trim().is_empty() {
            return Ok(Module::default());
        }
        Module::from_json(source).context("invalid program tree")
    }
}

/// Renders trees as source text
#[derive(Debug, Clone, Copy, Default)]
pub struct SourceTextPrinter;

impl SourcePrinter for SourceTextPrinter {
    fn print(&self, module: &Module) -> String {
        pyopt_core::unparse(module)
    }
}

/// Stateless request handler; each request gets its own pipeline
pub struct OptimizeService {
    config: OptimizationConfig,
    parser: Box<dyn SourceParser>,
    printer: Box<dyn SourcePrinter>,
}

impl OptimizeService {
    /// Create a service with the given pipeline configuration
    pub fn new(config: OptimizationConfig) -> Self {
        Self {
            config,
            parser: Box::new(JsonTreeParser),
            printer: Box::new(SourceTextPrinter),
        }
    }

    /// Replace the parser
    pub fn with_parser(mut self, parser: Box<dyn SourceParser>) -> Self {
        self.parser = parser;
        self
    }

    /// Replace the printer
    pub fn with_printer(mut self, printer: Box<dyn SourcePrinter>) -> Self {
        self.printer = printer;
        self
    }

    /// Handle one request
    pub fn handle(&self, request: &OptimizeRequest) -> OptimizeResponse {
        match panic::catch_unwind(AssertUnwindSafe(|| self.try_handle(&request.code))) {
            Ok(Ok(response)) => response,
            Ok(Err(err)) => {
                warn!("optimization failed: {err:#}");
                OptimizeResponse::failure(format!("{err:#}"))
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                warn!("optimizer panicked: {message}");
                OptimizeResponse::failure(message)
            }
        }
    }

    fn try_handle(&self, code: &str) -> Result<OptimizeResponse> {
        let module = self.parser.parse(code)?;
        let optimized = OptimizationPipeline::new(self.config.clone()).optimize(module)?;

        Ok(OptimizeResponse {
            optimized_code: self.printer.print(&optimized.module),
            explanation: optimized.explanations.joined(),
            complexity_before: NOT_AVAILABLE.to_string(),
            complexity_after: IMPROVED.to_string(),
        })
    }
}

impl Default for OptimizeService {
    fn default() -> Self {
        Self::new(OptimizationConfig::default())
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unexpected panic".to_string()
    }
}

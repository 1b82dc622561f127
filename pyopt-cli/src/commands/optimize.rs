//! Optimize command implementation

use crate::config::{OutputConfig, OutputFormat};
use anyhow::{bail, Context, Result};
use pyopt_core::unparse;
use pyopt_optimizer::service::{JsonTreeParser, SourceParser};
use pyopt_optimizer::{
    OptimizationConfig, OptimizationPipeline, OptimizeRequest, OptimizeResponse, OptimizeService,
    Optimized,
};
use rayon::prelude::*;
use serde::Serialize;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

#[derive(Debug, Serialize)]
struct FileResponse {
    file: String,
    #[serde(flatten)]
    response: OptimizeResponse,
}

/// Optimize every file, each on its own pipeline
pub fn optimize_files(
    files: &[PathBuf],
    config: &OptimizationConfig,
    output: &OutputConfig,
) -> Result<()> {
    info!("optimizing {} file(s) at {:?}", files.len(), config.level);

    match output.format {
        OutputFormat::Text => optimize_text(files, config, output),
        OutputFormat::Json => optimize_json(files, config),
    }
}

fn optimize_text(
    files: &[PathBuf],
    config: &OptimizationConfig,
    output: &OutputConfig,
) -> Result<()> {
    let results: Vec<Result<Optimized>> = files
        .par_iter()
        .map(|path| optimize_file(path, config))
        .collect();

    let mut failures = 0;
    for (path, result) in files.iter().zip(results) {
        match result {
            Ok(optimized) => print!("{}", render_text(path, &optimized, output)),
            Err(err) => {
                error!("{}: {err:#}", path.display());
                failures += 1;
            }
        }
    }

    if failures > 0 {
        bail!("{failures} of {} file(s) failed", files.len());
    }
    Ok(())
}

fn optimize_json(files: &[PathBuf], config: &OptimizationConfig) -> Result<()> {
    let service = OptimizeService::new(config.clone());

    let responses: Vec<FileResponse> = files
        .par_iter()
        .map(|path| {
            let response = match std::fs::read_to_string(path) {
                Ok(code) => service.handle(&OptimizeRequest { code }),
                Err(err) => {
                    OptimizeResponse::failure(format!("failed to read {}: {err}", path.display()))
                }
            };
            if response.is_failure() {
                error!("{}: {}", path.display(), response.explanation);
            }
            FileResponse {
                file: path.display().to_string(),
                response,
            }
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&responses)?);

    let failures = responses
        .iter()
        .filter(|file| file.response.is_failure())
        .count();
    if failures > 0 {
        bail!("{failures} of {} file(s) failed", files.len());
    }
    Ok(())
}

/// Load one tree and run the pipeline over it
pub fn optimize_file(path: &Path, config: &OptimizationConfig) -> Result<Optimized> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let module = JsonTreeParser
        .parse(&source)
        .with_context(|| format!("failed to load {}", path.display()))?;

    let optimized = OptimizationPipeline::new(config.clone())
        .optimize(module)
        .with_context(|| format!("failed to optimize {}", path.display()))?;
    debug!("{}: {} change(s)", path.display(), optimized.explanations.len());
    Ok(optimized)
}

fn render_text(path: &Path, optimized: &Optimized, output: &OutputConfig) -> String {
    let mut text = String::new();
    let _ = writeln!(text, "# {}", path.display());

    let code = unparse(&optimized.module);
    if !code.is_empty() {
        let _ = writeln!(text, "{code}");
    }

    if output.show_explanations {
        if optimized.explanations.is_empty() {
            let _ = writeln!(text, "\nNo optimizations applied.");
        } else {
            let _ = writeln!(text, "\nExplanations:");
            for explanation in &optimized.explanations {
                let _ = writeln!(text, "  - {explanation}");
            }
        }
    }

    if output.show_stats {
        let _ = write!(text, "\n{}", optimized.stats);
    }

    text.push('\n');
    text
}

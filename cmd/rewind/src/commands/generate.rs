//! Generate command implementation.

use anyhow::{Context, Result};
use rewind_emit::EmitOptions;
use rewind_vopr::{build_case, FuzzConfig, Manifest};
use std::fs;
use tracing::info;

/// Arguments for the generate command.
pub struct GenerateArgs<'a> {
    pub seed: u64,
    pub iteration: u64,
    pub budget: usize,
    pub output: &'a str,
    pub manifest: Option<&'a str>,
    pub tree: Option<&'a str>,
    pub trace_calls: bool,
}

/// Emits the program for one iteration.
pub fn run(args: &GenerateArgs<'_>) -> Result<()> {
    let config = FuzzConfig::default()
        .with_seed(args.seed)
        .with_budget(args.budget)
        .with_emit_options(EmitOptions {
            trace_calls: args.trace_calls,
        });

    let case = build_case(&config, args.iteration).with_context(|| {
        format!(
            "Failed to build iteration {} of seed {}",
            args.iteration, args.seed
        )
    })?;

    fs::write(args.output, &case.source)
        .with_context(|| format!("Failed to write program: {}", args.output))?;
    info!(
        "Program written to: {} ({} steps, {} faults)",
        args.output, case.oracle.steps, case.oracle.faults
    );

    if let Some(path) = args.tree {
        let json = rewind_tree::to_json(&case.program).with_context(|| "Failed to serialize tree")?;
        fs::write(path, json).with_context(|| format!("Failed to write tree: {path}"))?;
        info!("Tree written to: {}", path);
    }

    if let Some(path) = args.manifest {
        Manifest::new(&case, &config)
            .with_timestamp()
            .save(path)
            .with_context(|| format!("Failed to write manifest: {path}"))?;
        info!("Manifest written to: {}", path);
    }

    Ok(())
}

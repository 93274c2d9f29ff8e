//! Run command implementation.

use anyhow::{Context, Result};
use rewind_emit::EmitOptions;
use rewind_vopr::{Backend, FuzzConfig, Fuzzer, ReportFormat};
use tracing::info;

/// Arguments for the run command.
pub struct RunArgs<'a> {
    pub seed: u64,
    pub iterations: Option<u64>,
    pub budget: usize,
    pub backend: Backend,
    pub repro_dir: Option<String>,
    pub report: &'a str,
    pub trace_calls: bool,
}

/// Runs the fuzz loop and prints the report.
pub async fn run(args: RunArgs<'_>) -> Result<()> {
    let format = match args.report.to_lowercase().as_str() {
        "json" => ReportFormat::Json,
        "yaml" | "yml" => ReportFormat::Yaml,
        _ => {
            anyhow::bail!("Unknown report format: {}. Use 'json' or 'yaml'.", args.report);
        }
    };

    let mut config = FuzzConfig::default()
        .with_seed(args.seed)
        .with_budget(args.budget)
        .with_backend(args.backend)
        .with_emit_options(EmitOptions {
            trace_calls: args.trace_calls,
        });
    config = match args.iterations {
        Some(n) => config.with_iterations(n),
        None => config.unbounded(),
    };
    if let Some(dir) = args.repro_dir {
        config = config.with_repro_dir(dir);
    }

    info!(
        "Running seed {} with budget {} on {}",
        args.seed,
        args.budget,
        config.backend.name()
    );

    let report = Fuzzer::new(config)
        .run()
        .await
        .with_context(|| format!("Run with seed {} failed", args.seed))?;

    info!("{report}");
    println!(
        "{}",
        report
            .render(format)
            .with_context(|| "Failed to render report")?
    );
    Ok(())
}

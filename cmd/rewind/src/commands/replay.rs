//! Replay command implementation.

use anyhow::{Context, Result};
use rewind_vopr::{Backend, FuzzConfig, Fuzzer, Manifest};
use tracing::info;

/// Re-executes the iteration a manifest describes.
pub async fn run(manifest_path: &str, backend: Backend) -> Result<()> {
    let manifest = Manifest::load(manifest_path)
        .with_context(|| format!("Failed to read manifest: {manifest_path}"))?;

    if let Some(failure) = &manifest.failure {
        info!("Recorded failure: {}", failure);
    }

    let fuzzer = Fuzzer::new(FuzzConfig::default().with_backend(backend));
    let execution = fuzzer.replay(&manifest).await.with_context(|| {
        format!(
            "Replay of seed {} iteration {} failed",
            manifest.seed, manifest.iteration
        )
    })?;

    match execution.observed {
        Some(observed) => info!(
            "Replay passed: {} steps, {} panics, {} recoveries in {:?}",
            observed.steps, observed.panics, observed.recoveries, execution.elapsed
        ),
        None => info!("Replay passed in {:?}", execution.elapsed),
    }
    Ok(())
}

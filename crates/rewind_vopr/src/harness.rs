//! Deterministic fuzz harness.
//!
//! Every iteration draws from its own `ChaCha8Rng`, seeded from the run seed
//! and the iteration index, so a single failing iteration can be rebuilt
//! without replaying the ones before it.

use crate::backend::{Backend, Execution};
use crate::error::{Error, Result};
use crate::manifest::Manifest;
use crate::report::{CampaignReport, IterationRecord};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rewind_emit::{EmitOptions, Emitter};
use rewind_oracle::{simulate_program, Generator, GeneratorConfig, KindWeights, Oracle};
use rewind_tree::Program;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, error, info};

/// Configuration for a fuzz run.
#[derive(Debug, Clone)]
pub struct FuzzConfig {
    /// Master seed.
    pub seed: u64,
    /// Iterations to run; `None` runs until the first failure.
    pub iterations: Option<u64>,
    /// Tree generator settings.
    pub generator: GeneratorConfig,
    /// Emitter settings.
    pub emit: EmitOptions,
    /// Where programs execute.
    pub backend: Backend,
    /// Directory for reproduction files of failing iterations.
    pub repro_dir: Option<PathBuf>,
}

impl Default for FuzzConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            iterations: Some(100),
            generator: GeneratorConfig::default(),
            emit: EmitOptions::default(),
            backend: Backend::default(),
            repro_dir: None,
        }
    }
}

impl FuzzConfig {
    /// Sets the master seed.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Sets the number of iterations.
    #[must_use]
    pub const fn with_iterations(mut self, iterations: u64) -> Self {
        self.iterations = Some(iterations);
        self
    }

    /// Runs until the first failure.
    #[must_use]
    pub const fn unbounded(mut self) -> Self {
        self.iterations = None;
        self
    }

    /// Sets the per-program budget.
    #[must_use]
    pub const fn with_budget(mut self, budget: usize) -> Self {
        self.generator.budget = budget;
        self
    }

    /// Sets the generator kind weights.
    #[must_use]
    pub const fn with_weights(mut self, weights: KindWeights) -> Self {
        self.generator.weights = weights;
        self
    }

    /// Replaces the generator settings.
    #[must_use]
    pub const fn with_generator(mut self, generator: GeneratorConfig) -> Self {
        self.generator = generator;
        self
    }

    /// Sets the emitter options.
    #[must_use]
    pub const fn with_emit_options(mut self, emit: EmitOptions) -> Self {
        self.emit = emit;
        self
    }

    /// Sets the backend.
    #[must_use]
    pub fn with_backend(mut self, backend: Backend) -> Self {
        self.backend = backend;
        self
    }

    /// Writes reproduction files for failures into `dir`.
    #[must_use]
    pub fn with_repro_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.repro_dir = Some(dir.into());
        self
    }
}

/// Returns the RNG for one iteration of a run.
pub fn iteration_rng(seed: u64, iteration: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed.wrapping_add(iteration))
}

/// One generated, simulated and emitted test case.
#[derive(Debug, Clone)]
pub struct Case {
    /// Run seed.
    pub seed: u64,
    /// Iteration index.
    pub iteration: u64,
    /// Stamped tree.
    pub program: Program,
    /// Oracle summary.
    pub oracle: Oracle,
    /// Emitted Go source.
    pub source: String,
}

/// Builds the case for `iteration` of a run.
///
/// # Errors
///
/// Returns an oracle or emitter error; both mean this crate's core is
/// defective, never the generated program.
pub fn build_case(config: &FuzzConfig, iteration: u64) -> Result<Case> {
    let rng = iteration_rng(config.seed, iteration);
    let mut program = Generator::new(rng, &config.generator)?.generate()?;
    let oracle = simulate_program(&mut program)?;
    let source = Emitter::with_options(config.emit).emit_program(&program)?;

    debug!(
        iteration,
        steps = oracle.steps,
        faults = oracle.faults,
        escaped = oracle.escaped,
        "built case"
    );
    Ok(Case {
        seed: config.seed,
        iteration,
        program,
        oracle,
        source,
    })
}

/// Runs the generate → simulate → emit → execute loop.
pub struct Fuzzer {
    config: FuzzConfig,
}

impl Fuzzer {
    /// Creates a fuzzer.
    #[must_use]
    pub const fn new(config: FuzzConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &FuzzConfig {
        &self.config
    }

    /// Runs iterations until the configured count or the first failure.
    ///
    /// # Errors
    ///
    /// Returns the first failure as [`Error::Iteration`]; there is no
    /// continue-past-failure mode.
    pub async fn run(&self) -> Result<CampaignReport> {
        let start = Instant::now();
        let mut report = CampaignReport::new(self.config.seed, self.config.backend.name());

        let mut iteration = 0;
        loop {
            if matches!(self.config.iterations, Some(limit) if iteration >= limit) {
                break;
            }
            info!(iteration, "iteration");
            let record = self.run_iteration(iteration).await?;
            report.record(&record);
            iteration += 1;
        }

        report.finish(start.elapsed());
        info!(
            iterations = report.iterations,
            steps = report.total_steps,
            faults = report.total_faults,
            "run complete"
        );
        Ok(report)
    }

    /// Builds and executes a single iteration.
    ///
    /// # Errors
    ///
    /// Returns the failure tagged with `iteration`.
    pub async fn run_iteration(&self, iteration: u64) -> Result<IterationRecord> {
        let case = build_case(&self.config, iteration).map_err(|e| e.at(iteration))?;

        match self.config.backend.execute(&case).await {
            Ok(execution) => Ok(IterationRecord::new(&case, &execution)),
            Err(err) => {
                error!(iteration, error = %err, "iteration failed");
                if let Some(dir) = &self.config.repro_dir {
                    let manifest = Manifest::new(&case, &self.config)
                        .with_timestamp()
                        .with_failure(err.to_string());
                    match manifest.write_repro(dir, &case) {
                        Ok(path) => info!(path = %path.display(), "wrote reproduction"),
                        Err(e) => error!(error = %e, "could not write reproduction"),
                    }
                }
                Err(err.at(iteration))
            }
        }
    }

    /// Rebuilds the iteration a manifest describes and executes it again.
    ///
    /// Seed, generator settings and emitter options come from the manifest;
    /// only the backend is taken from this fuzzer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::HashMismatch`] if the rebuilt program differs from
    /// the recorded one, otherwise whatever the execution returns. Every
    /// failure is tagged with the manifest's iteration.
    pub async fn replay(&self, manifest: &Manifest) -> Result<Execution> {
        let config = self
            .config
            .clone()
            .with_seed(manifest.seed)
            .with_generator(manifest.generator())
            .with_emit_options(manifest.emit);
        let case =
            build_case(&config, manifest.iteration).map_err(|e| e.at(manifest.iteration))?;

        if !manifest.verify_source(&case.source) {
            let err = Error::HashMismatch {
                expected: manifest.program_hash.clone(),
                found: Manifest::new(&case, &config).program_hash,
            };
            return Err(err.at(manifest.iteration));
        }
        info!(
            seed = manifest.seed,
            iteration = manifest.iteration,
            "replaying"
        );
        config
            .backend
            .execute(&case)
            .await
            .map_err(|e| e.at(manifest.iteration))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cases_are_reproducible() {
        let config = FuzzConfig::default().with_seed(9);
        let a = build_case(&config, 5).unwrap();
        let b = build_case(&config, 5).unwrap();

        assert_eq!(a.program, b.program);
        assert_eq!(a.source, b.source);
    }

    #[test]
    fn iterations_differ() {
        let config = FuzzConfig::default();
        let a = build_case(&config, 0).unwrap();
        let b = build_case(&config, 1).unwrap();
        assert_ne!(a.source, b.source);
    }

    fn interpreted() -> FuzzConfig {
        FuzzConfig::default().with_backend(Backend::Interpret)
    }

    #[test]
    fn toolchain_is_the_default_backend() {
        assert_eq!(FuzzConfig::default().backend.name(), "go");
    }

    #[tokio::test]
    async fn interpreted_run_completes() {
        let fuzzer = Fuzzer::new(interpreted().with_seed(7).with_iterations(50));
        let report = fuzzer.run().await.unwrap();

        assert_eq!(report.iterations, 50);
        assert!(report.total_steps > 0);
    }

    #[tokio::test]
    async fn replay_matches_manifest() {
        let config = interpreted().with_seed(11).with_budget(40);
        let case = build_case(&config, 3).unwrap();
        let manifest = Manifest::new(&case, &config);

        let execution = Fuzzer::new(interpreted()).replay(&manifest).await.unwrap();
        assert_eq!(execution.observed.unwrap().steps, case.oracle.steps);
    }

    #[tokio::test]
    async fn replay_uses_recorded_emit_options_and_weights() {
        let config = interpreted()
            .with_seed(3)
            .with_weights(KindWeights {
                scope: 2,
                interception: 3,
                step: 4,
                signal: 1,
            })
            .with_emit_options(EmitOptions { trace_calls: false });
        let case = build_case(&config, 0).unwrap();
        let manifest = Manifest::new(&case, &config);

        // The replaying fuzzer keeps its defaults; the manifest must win.
        let execution = Fuzzer::new(interpreted()).replay(&manifest).await.unwrap();
        assert_eq!(execution.observed.unwrap().steps, case.oracle.steps);
    }

    #[tokio::test]
    async fn replay_detects_tampered_hash() {
        let config = interpreted();
        let case = build_case(&config, 4).unwrap();
        let mut manifest = Manifest::new(&case, &config);
        manifest.program_hash = "0000000000000000".to_string();

        let err = Fuzzer::new(interpreted()).replay(&manifest).await.unwrap_err();
        assert_eq!(err.iteration(), Some(4));
        assert!(
            matches!(&err, Error::Iteration { source, .. } if matches!(**source, Error::HashMismatch { .. })),
            "{err}"
        );
    }

    #[tokio::test]
    async fn toolchain_failure_reports_iteration_and_writes_repro() {
        let dir = std::env::temp_dir().join("rewind_harness_repro");
        let backend = Backend::Toolchain(
            crate::backend::ToolchainConfig::default()
                .with_go("/nonexistent/rewind/go")
                .with_source(dir.join("test.go")),
        );
        std::fs::create_dir_all(&dir).unwrap();
        let fuzzer = Fuzzer::new(
            FuzzConfig::default()
                .with_seed(5)
                .with_backend(backend)
                .with_repro_dir(&dir),
        );

        let err = fuzzer.run().await.unwrap_err();
        assert_eq!(err.iteration(), Some(0));

        let manifest = Manifest::load(dir.join("seed-5-iter-0.json")).unwrap();
        assert_eq!(manifest.seed, 5);
        assert!(manifest.failure.is_some());
    }
}

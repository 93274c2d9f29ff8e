//! Reproduction manifests.
//!
//! A manifest names the seed, iteration and budget that produced a program,
//! plus a hash of the emitted text, so the exact program can be rebuilt and
//! checked later. It contains:
//! - The generation inputs (seed, iteration, budget, kind weights, emit options)
//! - Oracle counters
//! - A hash of the emitted source
//! - The failure that prompted it, if any

use crate::error::Result;
use crate::harness::{Case, FuzzConfig};
use rewind_emit::EmitOptions;
use rewind_oracle::{GeneratorConfig, KindWeights};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use xxhash_rust::xxh64::xxh64;

/// Seed for xxhash to ensure deterministic hashing.
const HASH_SEED: u64 = 0x5245_5749_4E44; // "REWIND" in hex

/// Current manifest format version.
const FORMAT_VERSION: u32 = 1;

/// A reproduction manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Format version.
    pub version: u32,
    /// Run seed.
    pub seed: u64,
    /// Iteration index within the run.
    pub iteration: u64,
    /// Generator budget.
    pub budget: usize,
    /// Generator kind weights.
    #[serde(default)]
    pub weights: KindWeights,
    /// Emitter options the program was rendered with.
    #[serde(default)]
    pub emit: EmitOptions,
    /// Steps the oracle predicted.
    pub steps: u64,
    /// Faults the oracle predicted.
    pub faults: u64,
    /// Hash of the emitted program.
    pub program_hash: String,
    /// Failure message, if this manifest records a failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
    /// Creation time (RFC 3339).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl Manifest {
    /// Creates a manifest for a case built with `config`.
    #[must_use]
    pub fn new(case: &Case, config: &FuzzConfig) -> Self {
        Self {
            version: FORMAT_VERSION,
            seed: case.seed,
            iteration: case.iteration,
            budget: config.generator.budget,
            weights: config.generator.weights,
            emit: config.emit,
            steps: case.oracle.steps,
            faults: case.oracle.faults,
            program_hash: hash_content(&case.source),
            failure: None,
            created_at: None,
        }
    }

    /// Stamps the manifest with the current time.
    #[must_use]
    pub fn with_timestamp(mut self) -> Self {
        self.created_at = Some(chrono::Utc::now().to_rfc3339());
        self
    }

    /// Records a failure message.
    #[must_use]
    pub fn with_failure(mut self, failure: impl Into<String>) -> Self {
        self.failure = Some(failure.into());
        self
    }

    /// Returns the generator settings the program was built with.
    #[must_use]
    pub const fn generator(&self) -> GeneratorConfig {
        GeneratorConfig {
            budget: self.budget,
            weights: self.weights,
        }
    }

    /// Returns `true` if `source` hashes to the recorded program hash.
    #[must_use]
    pub fn verify_source(&self, source: &str) -> bool {
        self.program_hash == hash_content(source)
    }

    /// Loads a manifest from a path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Saves the manifest to a path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), content)?;
        Ok(())
    }

    /// Writes the manifest, the emitted source and the stamped tree into
    /// `dir`, returning the manifest path.
    ///
    /// # Errors
    ///
    /// Returns an error if any file cannot be written.
    pub fn write_repro(&self, dir: impl AsRef<Path>, case: &Case) -> Result<PathBuf> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;

        let stem = format!("seed-{}-iter-{}", self.seed, self.iteration);
        std::fs::write(dir.join(format!("{stem}.go")), &case.source)?;
        std::fs::write(
            dir.join(format!("{stem}.tree.json")),
            rewind_tree::to_json(&case.program)?,
        )?;

        let path = dir.join(format!("{stem}.json"));
        self.save(&path)?;
        Ok(path)
    }
}

/// Computes a deterministic hash of content.
fn hash_content(content: &str) -> String {
    let hash = xxh64(content.as_bytes(), HASH_SEED);
    format!("{hash:016x}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harness::{build_case, FuzzConfig};

    #[test]
    fn hash_is_deterministic() {
        assert_eq!(hash_content("step(1)"), hash_content("step(1)"));
        assert_ne!(hash_content("step(1)"), hash_content("step(2)"));
        assert_eq!(hash_content("").len(), 16);
    }

    #[test]
    fn manifest_verifies_its_source() {
        let config = FuzzConfig::default();
        let case = build_case(&config, 2).unwrap();
        let manifest = Manifest::new(&case, &config);

        assert!(manifest.verify_source(&case.source));
        assert!(!manifest.verify_source("package main"));
        assert_eq!(manifest.steps, case.oracle.steps);
    }

    #[test]
    fn repro_files_roundtrip() {
        let dir = std::env::temp_dir().join("rewind_manifest_repro");
        let config = FuzzConfig::default().with_seed(3);
        let case = build_case(&config, 4).unwrap();
        let manifest = Manifest::new(&case, &config).with_timestamp().with_failure("boom");

        let path = manifest.write_repro(&dir, &case).unwrap();
        let loaded = Manifest::load(&path).unwrap();
        assert_eq!(loaded, manifest);

        let tree = std::fs::read_to_string(dir.join("seed-3-iter-4.tree.json")).unwrap();
        assert_eq!(rewind_tree::from_json(&tree).unwrap(), case.program);
        assert_eq!(
            std::fs::read_to_string(dir.join("seed-3-iter-4.go")).unwrap(),
            case.source
        );
    }

    #[test]
    fn optional_fields_are_omitted() {
        let config = FuzzConfig::default();
        let case = build_case(&config, 0).unwrap();
        let json = serde_json::to_string(&Manifest::new(&case, &config)).unwrap();
        assert!(!json.contains("failure"));
        assert!(!json.contains("created_at"));
    }

    #[test]
    fn manifest_records_generation_settings() {
        let weights = KindWeights {
            scope: 1,
            interception: 1,
            step: 5,
            signal: 1,
        };
        let mut config = FuzzConfig::default()
            .with_budget(30)
            .with_emit_options(EmitOptions { trace_calls: false });
        config.generator.weights = weights;
        let case = build_case(&config, 1).unwrap();

        let manifest = Manifest::new(&case, &config);
        assert_eq!(manifest.generator(), config.generator);
        assert!(!manifest.emit.trace_calls);
    }

    #[test]
    fn older_manifests_default_their_settings() {
        let json = r#"{"version":1,"seed":1,"iteration":0,"budget":100,"steps":0,"faults":0,"program_hash":"0"}"#;
        let manifest: Manifest = serde_json::from_str(json).unwrap();
        assert_eq!(manifest.weights, KindWeights::default());
        assert_eq!(manifest.emit, EmitOptions::default());
    }
}

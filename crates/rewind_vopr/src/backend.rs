//! Execution backends.
//!
//! A backend takes one stamped, emitted case and decides whether the
//! program behaves the way the oracle predicted.

use crate::error::{Error, Result};
use crate::harness::Case;
use crate::interpreter::{Interpreter, Observed};
use rewind_emit::AssertionMismatch;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tracing::{debug, warn};

/// How to invoke the Go toolchain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolchainConfig {
    /// Path to the `go` binary.
    pub go: PathBuf,
    /// Where the emitted program is written before `go run`.
    pub source: PathBuf,
    /// Limit for one compile-and-run.
    pub timeout: Duration,
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            go: PathBuf::from("go"),
            source: PathBuf::from("test.go"),
            timeout: Duration::from_secs(60),
        }
    }
}

impl ToolchainConfig {
    /// Sets the `go` binary.
    #[must_use]
    pub fn with_go(mut self, go: impl Into<PathBuf>) -> Self {
        self.go = go.into();
        self
    }

    /// Sets where the program is written.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<PathBuf>) -> Self {
        self.source = source.into();
        self
    }

    /// Sets the timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Where emitted programs run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Backend {
    /// In-process interpreter. It shares the oracle's model of defer and
    /// recover, so it only exercises stamping and the contract checks.
    Interpret,
    /// `go run` on the written program (default).
    Toolchain(ToolchainConfig),
}

impl Default for Backend {
    fn default() -> Self {
        Self::Toolchain(ToolchainConfig::default())
    }
}

/// Outcome of a successful execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Execution {
    /// Counters seen by the interpreter; `None` for the toolchain.
    pub observed: Option<Observed>,
    /// Wall time spent executing.
    pub elapsed: Duration,
}

impl Backend {
    /// Returns a short name for logs and reports.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Interpret => "interpret",
            Self::Toolchain(_) => "go",
        }
    }

    /// Executes a case.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Mismatch`] when a runtime check fails, and a
    /// backend-specific error when the program cannot be run at all.
    pub async fn execute(&self, case: &Case) -> Result<Execution> {
        let start = Instant::now();
        let observed = match self {
            Self::Interpret => Some(Interpreter::new().run_program(&case.program)?),
            Self::Toolchain(config) => {
                run_toolchain(config, &case.source).await?;
                None
            }
        };
        Ok(Execution {
            observed,
            elapsed: start.elapsed(),
        })
    }
}

async fn run_toolchain(config: &ToolchainConfig, source: &str) -> Result<()> {
    tokio::fs::write(&config.source, source).await?;

    let child = Command::new(&config.go)
        .arg("run")
        .arg(&config.source)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output();

    let output = tokio::time::timeout(config.timeout, child)
        .await
        .map_err(|_| Error::Timeout {
            secs: config.timeout.as_secs(),
        })??;

    debug!(
        status = %output.status,
        stderr_bytes = output.stderr.len(),
        "toolchain finished"
    );
    if output.status.success() {
        return Ok(());
    }

    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
    if let Some(mismatch) = AssertionMismatch::parse_log(&stderr) {
        return Err(mismatch.into());
    }
    warn!(status = %output.status, "toolchain failed without an assertion message");
    Err(Error::Toolchain {
        status: output.status.to_string(),
        stderr,
    })
}

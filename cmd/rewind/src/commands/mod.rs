//! Command implementations.

pub mod generate;
pub mod replay;
pub mod run;

use anyhow::Result;
use rewind_vopr::{Backend, ToolchainConfig};
use std::time::Duration;

/// Maps the `--backend` flag and its toolchain options to a [`Backend`].
pub fn parse_backend(name: &str, go: &str, output: &str, timeout_secs: u64) -> Result<Backend> {
    match name.to_lowercase().as_str() {
        "interpret" | "interp" => Ok(Backend::Interpret),
        "go" | "toolchain" => Ok(Backend::Toolchain(
            ToolchainConfig::default()
                .with_go(go)
                .with_source(output)
                .with_timeout(Duration::from_secs(timeout_secs)),
        )),
        _ => anyhow::bail!("Unknown backend: {name}. Use 'interpret' or 'go'."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_flag_parses() {
        assert_eq!(
            parse_backend("interpret", "go", "test.go", 60).unwrap(),
            Backend::Interpret
        );
        let go = parse_backend("GO", "/usr/bin/go", "out.go", 5).unwrap();
        assert_eq!(
            go,
            Backend::Toolchain(
                ToolchainConfig::default()
                    .with_go("/usr/bin/go")
                    .with_source("out.go")
                    .with_timeout(Duration::from_secs(5))
            )
        );
        assert!(parse_backend("python", "go", "test.go", 60).is_err());
    }
}

//! Rewind CLI - randomized defer/panic/recover program generator.
//!
//! Commands:
//! - `rewind run` - Generate, simulate, emit and execute programs in a loop
//! - `rewind generate` - Emit a single program for a seed and iteration
//! - `rewind replay` - Rebuild and re-execute the program a manifest names

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "rewind")]
#[command(about = "Randomized defer/panic/recover program generator with a built-in oracle")]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the generate/simulate/emit/execute loop
    Run {
        /// Master seed
        #[arg(short, long, env = "REWIND_SEED", default_value_t = 42)]
        seed: u64,

        /// Number of iterations (runs until the first failure if omitted)
        #[arg(short = 'n', long)]
        iterations: Option<u64>,

        /// Leaf budget per program
        #[arg(short, long, default_value_t = 100)]
        budget: usize,

        /// Where the go backend writes each program
        #[arg(short, long, default_value = "test.go")]
        output: String,

        /// Execution backend (go, or interpret to skip the toolchain)
        #[arg(long, env = "REWIND_BACKEND", default_value = "go")]
        backend: String,

        /// Path to the go binary
        #[arg(long, env = "REWIND_GO", default_value = "go")]
        go: String,

        /// Timeout for one go run, in seconds
        #[arg(long, default_value_t = 60)]
        timeout_secs: u64,

        /// Directory for reproduction files of a failing iteration
        #[arg(long)]
        repro_dir: Option<String>,

        /// Report format (json or yaml)
        #[arg(long, default_value = "json")]
        report: String,

        /// Omit the println trace from emitted programs
        #[arg(long)]
        quiet_program: bool,
    },

    /// Emit the program for one iteration of a run
    Generate {
        /// Master seed
        #[arg(short, long, env = "REWIND_SEED", default_value_t = 42)]
        seed: u64,

        /// Iteration index
        #[arg(short, long, default_value_t = 0)]
        iteration: u64,

        /// Leaf budget
        #[arg(short, long, default_value_t = 100)]
        budget: usize,

        /// Output path for the program
        #[arg(short, long, default_value = "test.go")]
        output: String,

        /// Also write a reproduction manifest
        #[arg(short, long)]
        manifest: Option<String>,

        /// Also write the stamped tree as JSON
        #[arg(long)]
        tree: Option<String>,

        /// Omit the println trace from the program
        #[arg(long)]
        quiet_program: bool,
    },

    /// Rebuild and re-execute the program a manifest describes
    Replay {
        /// Path to the manifest
        #[arg(short, long)]
        manifest: String,

        /// Execution backend (go, or interpret to skip the toolchain)
        #[arg(long, env = "REWIND_BACKEND", default_value = "go")]
        backend: String,

        /// Path to the go binary
        #[arg(long, env = "REWIND_GO", default_value = "go")]
        go: String,

        /// Where the go backend writes the program
        #[arg(short, long, default_value = "test.go")]
        output: String,

        /// Timeout for the go run, in seconds
        #[arg(long, default_value_t = 60)]
        timeout_secs: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Run {
            seed,
            iterations,
            budget,
            output,
            backend,
            go,
            timeout_secs,
            repro_dir,
            report,
            quiet_program,
        } => {
            let backend = commands::parse_backend(&backend, &go, &output, timeout_secs)?;
            commands::run::run(commands::run::RunArgs {
                seed,
                iterations,
                budget,
                backend,
                repro_dir,
                report: &report,
                trace_calls: !quiet_program,
            })
            .await
        }
        Commands::Generate {
            seed,
            iteration,
            budget,
            output,
            manifest,
            tree,
            quiet_program,
        } => commands::generate::run(&commands::generate::GenerateArgs {
            seed,
            iteration,
            budget,
            output: &output,
            manifest: manifest.as_deref(),
            tree: tree.as_deref(),
            trace_calls: !quiet_program,
        }),
        Commands::Replay {
            manifest,
            backend,
            go,
            output,
            timeout_secs,
        } => {
            let backend = commands::parse_backend(&backend, &go, &output, timeout_secs)?;
            commands::replay::run(&manifest, backend).await
        }
    }
}

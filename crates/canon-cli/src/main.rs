use std::error::Error;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use commands::{
    check::{self, CheckArgs},
    export::{self, ExportArgs},
    graph::{self, GraphArgs},
    resolve::{self, ResolveArgs},
    validate::{self, ValidateArgs},
};

mod commands;

#[derive(Parser, Debug)]
#[command(name = "canon", about = "Formula and parameter registry pipeline")]
struct Cli {
    /// Raise the default log level to debug.
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run every consistency check and list findings; exits 2 on blocking findings.
    Check(CheckArgs),
    /// Compare computed values against references and bounds.
    Validate(ValidateArgs),
    /// Print resolved graph edges and the topological order of formulas.
    Graph(GraphArgs),
    /// Run the full pipeline and atomically publish the export document.
    Export(ExportArgs),
    /// Resolve addresses against a published document.
    Resolve(ResolveArgs),
}

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = if verbose { "debug" } else { "info" };
        EnvFilter::new(format!(
            "warn,canon_core={level},canon_registry={level},canon_graph={level},\
             canon_validate={level},canon_audit={level},canon_export={level},canon={level}"
        ))
    });
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match cli.command {
        Command::Check(args) => check::run(&args),
        Command::Validate(args) => validate::run(&args),
        Command::Graph(args) => graph::run(&args),
        Command::Export(args) => export::run(&args),
        Command::Resolve(args) => resolve::run(&args),
    }
}

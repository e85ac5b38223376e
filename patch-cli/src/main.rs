mod commands;
mod output;

use clap::{Parser, Subcommand};
use color_eyre::Result;
use tracing_subscriber::EnvFilter;

use commands::include::IncludeArgs;
use commands::validate::ValidateArgs;
use patch_service::SelectorConfig;

/// Expand a patch selection into every task it needs
#[derive(Parser, Debug)]
#[command(name = "patchsel", version, about)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compute the dependency closure of a selection
    Include(IncludeArgs),

    /// Validate a project definition file
    Validate(ValidateArgs),
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = SelectorConfig::load()?;

    match cli.command {
        Commands::Include(args) => commands::include::execute(args, &config),
        Commands::Validate(args) => commands::validate::execute(args, &config),
    }
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

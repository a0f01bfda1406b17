//! TABDRAW CLI - Command-line interface
//!
//! Commands:
//! - draw: Generate a draw from a JSON request
//! - options: List the options a generator accepts
//! - flags: Describe the flags a draw can carry

mod draw_cmd;
mod options_cmd;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use draw_cmd::DrawArgs;
use options_cmd::OptionsArgs;

#[derive(Parser)]
#[command(name = "tabdraw")]
#[command(about = "Draw generator for debating tournaments")]
struct Cli {
    /// Log at debug level (overrides RUST_LOG)
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a draw from a JSON request
    Draw(DrawArgs),
    /// List the options a generator accepts
    Options(OptionsArgs),
    /// Describe every draw flag
    Flags,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Draw(args) => draw_cmd::run(args),
        Commands::Options(args) => options_cmd::run(args),
        Commands::Flags => {
            options_cmd::print_flags();
            Ok(())
        }
    }
}

/// Logs go to stderr so JSON output on stdout stays clean
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

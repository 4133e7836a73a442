mod cmd;
mod output;

use clap::{Parser, Subcommand};
use cmd::run_executable::RunExecutableArgs;

#[derive(Parser)]
#[command(
    name = "rs-mule",
    about = "Run RightScripts and recipes on cloud instances selected by tag",
    version,
    propagate_version = true
)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    /// Log progress at info level (RUST_LOG still applies)
    #[arg(long, global = true, short = 'v')]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Runs a specified recipe or RightScript on instances targeted by tag
    #[command(name = "run-executable", alias = "run_executable")]
    RunExecutable(RunExecutableArgs),
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose {
        tracing::Level::INFO
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::RunExecutable(args) => cmd::run_executable::run(args, cli.json),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
use commands::correlate::CorrelateArgs;

#[derive(Parser)]
#[command(name = "crosscheck")]
#[command(about = "Correlate security findings across independent scanners")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest scanner reports, merge duplicates, and emit a unified report
    Correlate(CorrelateArgs),

    /// List the supported scanners
    Tools,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Correlate(args) => commands::correlate::execute(args),
        Commands::Tools => commands::tools::execute(),
    }
}

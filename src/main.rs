use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use sectorscope::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for sectorscope::AppCommand {
    fn from(cmd: Commands) -> sectorscope::AppCommand {
        match cmd {
            Commands::Analyze { days, label, json } => sectorscope::AppCommand::Analyze {
                lookback_days: days,
                label,
                json,
            },
            Commands::Run { json } => sectorscope::AppCommand::Run { json },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Rank instruments over a single lookback window
    Analyze {
        /// Lookback in trading days
        #[arg(short, long, default_value_t = 21)]
        days: u32,
        /// Label shown for the window
        #[arg(short, long)]
        label: Option<String>,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Rank instruments across every configured timeframe
    Run {
        /// Print the full run as JSON instead of tables
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => sectorscope::cli::setup::setup(),
        Some(cmd) => sectorscope::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}

mod platform;

use std::path::PathBuf;

use clap::Parser;
use eventdex_core::UserId;

use platform::logging::{self, LogDestination};

/// Tracks event shiny listings posted as text pages.
#[derive(Debug, Parser)]
#[command(name = "eventdex", version)]
pub(crate) struct Cli {
    /// More log output; repeat for more detail.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Where log output goes.
    #[arg(long, value_enum, default_value_t = LogDestination::Terminal, global = true)]
    log: LogDestination,

    /// RON configuration file.
    #[arg(long, default_value = platform::CONFIG_FILENAME, global = true)]
    config: PathBuf,

    /// Inventory file; overrides the configured one.
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// Event species list; overrides the configured one.
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Directory holding `<id>.txt` pages; overrides the configured one.
    #[arg(long, global = true)]
    pages: Option<PathBuf>,

    /// Owner of the inventory being changed.
    #[arg(short, long, default_value_t = 0, global = true)]
    user: UserId,

    #[command(subcommand)]
    command: platform::Command,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::initialize(cli.log, eventdex_logging::level_for_verbosity(cli.verbose));
    platform::run(cli).await
}

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Subcommand;
use eventdex_core::{parse_identifiers, SourceId, SourceMode, UserId};
use eventdex_engine::{DirectorySources, EditBus, SourceFetcher, StaticCatalog, Tracker};
use eventdex_logging::{dex_info, dex_warn};
use tokio_util::sync::CancellationToken;

use super::config::load_config;
use super::persistence::RonInventoryStore;
use super::reporter::StdoutReporter;
use super::watch::FileEditFeed;
use crate::Cli;

#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// Track listing pages. Named ids are read once; `--reply` watches one page for edits.
    Track {
        ids: Vec<String>,
        /// Page to keep watching until the session times out.
        #[arg(long)]
        reply: Option<SourceId>,
        /// How often the watched page is re-read.
        #[arg(long, default_value_t = 1000)]
        poll_ms: u64,
    },
    /// Add every listing on one page.
    AddPage { id: SourceId },
    /// Remove identifiers from the inventory.
    Remove {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Remove every identifier listed on one page.
    RemovePage { id: SourceId },
    /// Drop the whole inventory.
    Clear {
        /// Confirm the inventory really should go.
        #[arg(long)]
        yes: bool,
    },
    /// Print every tracked record.
    List,
    /// Print collection statistics.
    Stats,
}

impl Command {
    fn needs_catalog(&self) -> bool {
        matches!(
            self,
            Command::Track { .. } | Command::AddPage { .. } | Command::Stats
        )
    }
}

pub(crate) async fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli.config);
    let store_path = cli.store.unwrap_or_else(|| config.store_path.clone());
    let pages_dir = cli.pages.unwrap_or_else(|| config.pages_dir.clone());
    let catalog = if cli.command.needs_catalog() {
        load_catalog(&cli.catalog.unwrap_or_else(|| config.catalog_path.clone()))?
    } else {
        StaticCatalog::new()
    };

    let store = RonInventoryStore::open(store_path.clone())
        .with_context(|| format!("opening inventory {}", store_path.display()))?;
    let sources: Arc<dyn SourceFetcher> = Arc::new(DirectorySources::new(pages_dir));
    let tracker = Tracker::new(
        Arc::new(store),
        Arc::new(catalog),
        sources.clone(),
        Arc::new(StdoutReporter),
        config.tracker_settings(),
    );
    let user = cli.user;

    match cli.command {
        Command::Track {
            ids,
            reply,
            poll_ms,
        } => {
            let ids = parse_identifiers(&ids.join(" "))?;
            let Some(mode) = SourceMode::from_command(&ids, reply) else {
                bail!("name the pages to read, or --reply to a page to watch");
            };
            track(&tracker, sources, user, mode, Duration::from_millis(poll_ms)).await?;
        }
        Command::AddPage { id } => {
            let snapshot = sources.fetch(id).await?;
            tracker.add_from_page(user, &snapshot).await?;
        }
        Command::Remove { ids } => {
            let ids = parse_identifiers(&ids.join(" "))?;
            println!("{}", tracker.remove_ids(user, &ids).await?);
        }
        Command::RemovePage { id } => {
            let snapshot = sources.fetch(id).await?;
            let Some(text) = snapshot.text() else {
                bail!("page {id} is empty");
            };
            println!("{}", tracker.remove_listed(user, text).await?);
        }
        Command::Clear { yes } => {
            if !yes {
                bail!("clearing the inventory cannot be undone; pass --yes to confirm");
            }
            println!("Cleared {} event shinies.", tracker.clear(user).await?);
        }
        Command::List => {
            let records = tracker.inventory(user).await?;
            if records.is_empty() {
                println!("No event shinies tracked yet.");
            }
            for record in records {
                println!(
                    "`{}` {} ({}) Lvl. {} • {:.2}%",
                    record.identifier(),
                    record.species_name(),
                    record.gender(),
                    record.level(),
                    record.iv_percent()
                );
            }
        }
        Command::Stats => match tracker.stats(user).await? {
            Some(stats) => println!("{stats}"),
            None => println!("No event shinies tracked yet."),
        },
    }
    Ok(())
}

async fn track(
    tracker: &Tracker,
    sources: Arc<dyn SourceFetcher>,
    user: UserId,
    mode: SourceMode,
    poll: Duration,
) -> Result<()> {
    let bus = EditBus::default();
    let cancel = CancellationToken::new();
    let watcher = match mode.monitored() {
        Some(source_id) => {
            // Read before the session subscribes: a change after this read is
            // either published or already part of the session's own first fetch.
            let mut feed = FileEditFeed::new(sources.clone(), source_id, poll);
            match sources.fetch(source_id).await {
                Ok(snapshot) => feed = feed.with_baseline(snapshot),
                Err(err) => dex_warn!("no baseline for watched source: {}", err),
            }
            Some(tokio::spawn(feed.run(bus.clone(), cancel.clone())))
        }
        None => None,
    };
    let interrupt = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                dex_info!("interrupt received, stopping");
                cancel.cancel();
            }
        })
    };

    let result = tracker.track(user, mode, &bus, &cancel).await;
    cancel.cancel();
    interrupt.abort();
    if let Some(watcher) = watcher {
        if let Err(err) = watcher.await {
            dex_warn!("page watcher ended abnormally: {}", err);
        }
    }
    result?;
    Ok(())
}

fn load_catalog(path: &Path) -> Result<StaticCatalog> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading event species list {}", path.display()))?;
    let catalog = StaticCatalog::parse(&text);
    if catalog.is_empty() {
        dex_warn!("event species list {:?} names no species", path);
    }
    Ok(catalog)
}

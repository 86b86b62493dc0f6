use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use client_core::{config::load_settings, CatalogClient, SpellbookSession, WorkerHandles};
use tracing_subscriber::EnvFilter;

mod app;
mod console;
mod render;

use app::App;
use console::{Console, Terminal};

#[derive(Parser, Debug)]
#[command(name = "spellbook", about = "Search, bookmark and build D&D 5e spells")]
struct Args {
    /// Overrides the catalog base URL from the config file
    #[arg(long)]
    catalog_url: Option<String>,
    #[arg(long, default_value = "spellbook.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr at warn so they stay out of the menus.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let mut settings = load_settings(&args.config)?;
    if let Some(catalog_url) = args.catalog_url {
        settings.catalog_url = catalog_url;
    }

    let catalog = CatalogClient::new(&settings.catalog_url)
        .with_context(|| format!("cannot use catalog url '{}'", settings.catalog_url))?;
    let session = SpellbookSession::new(WorkerHandles::tcp(&settings));
    let console = Console::new(Terminal::new()?, std::io::stdout());

    App::new(console, catalog, session).run().await?;
    Ok(())
}

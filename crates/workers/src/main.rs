use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use shared::protocol::ServiceKind;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;
use workers::{
    config::load_settings, serve, BookmarkWorker, DiceWorker, SortWorker, SpellBuilderWorker,
};

#[derive(Parser, Debug)]
#[command(name = "spellbook-worker", about = "Runs one spellbook worker service")]
struct Args {
    /// Worker to run: sort, bookmark, builder or dice
    service: ServiceKind,
    /// Overrides the configured listen address
    #[arg(long)]
    bind: Option<String>,
    #[arg(long, default_value = "workers.toml")]
    config: PathBuf,
    /// Seeds the dice worker's random source
    #[arg(long)]
    seed: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let settings = load_settings(&args.config)?;
    let bind = args
        .bind
        .unwrap_or_else(|| settings.bind_addr(args.service).to_string());
    let listener = TcpListener::bind(&bind)
        .await
        .with_context(|| format!("failed to bind {} worker to {bind}", args.service))?;

    match args.service {
        ServiceKind::Sort => serve(listener, SortWorker).await?,
        ServiceKind::Bookmark => serve(listener, BookmarkWorker).await?,
        ServiceKind::SpellBuilder => serve(listener, SpellBuilderWorker).await?,
        ServiceKind::Dice => {
            let worker = match args.seed {
                Some(seed) => DiceWorker::seeded(seed),
                None => DiceWorker::from_entropy(),
            };
            serve(listener, worker).await?
        }
    }

    info!(service = %args.service, "worker stopped");
    Ok(())
}

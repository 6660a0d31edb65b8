use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use realty_lens::{create_router, AppState, Config, FileDatasetStore};

/// Realty Lens: ask questions about an uploaded market spreadsheet.
#[derive(Parser, Debug)]
#[command(name = "realty-lens")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to listen on (overrides server.bind)
    #[arg(short, long)]
    bind: Option<String>,

    /// Directory for the stored upload (overrides storage.data_dir)
    #[arg(short, long)]
    data_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let mut config = Config::load(args.config.as_deref()).context("loading configuration")?;
    if let Some(bind) = args.bind {
        config.server.bind = bind;
    }
    if let Some(dir) = args.data_dir {
        config.storage.data_dir = dir;
    }

    let store = FileDatasetStore::new(&config.storage.data_dir)
        .with_context(|| format!("opening data dir {}", config.storage.data_dir.display()))?;
    let state = Arc::new(AppState::new(&config, Arc::new(store))?);
    let app = create_router(state, &config.server);

    let listener = tokio::net::TcpListener::bind(&config.server.bind)
        .await
        .with_context(|| format!("binding {}", config.server.bind))?;
    log::info!(
        "{} listening on http://{}",
        config.server.service_name,
        listener.local_addr()?
    );
    axum::serve(listener, app).await?;

    Ok(())
}

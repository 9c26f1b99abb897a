use loadscout_browser::{Scraper, TimeoutConfig};
use loadscout_core::SiteConfig;
use loadscout_server::{AppContext, serve};
use loadscout_storage::JsonFileStorage;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("loadscout=info")),
        )
        .init();

    let config = SiteConfig::from_env();
    let port = config.port;
    info!(data_dir = %config.data_dir.display(), port, "starting loadscout");

    let storage = Arc::new(JsonFileStorage::new(config.data_dir.clone()));
    let runner = Arc::new(Scraper::new(config, TimeoutConfig::default(), storage));
    let ctx = Arc::new(AppContext { runner });

    serve(ctx, port).await
}

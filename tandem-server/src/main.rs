use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{Level, info};

use tandem_server::{Matchmaker, RelayService, ServerConfig, router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    info!("Initializing pairing relay...");

    let config = ServerConfig::from_env()?;

    let (matchmaker_tx, matchmaker_rx) = mpsc::channel(100);
    let partners = Arc::new(DashMap::new());

    let service = RelayService::new(matchmaker_tx, partners.clone(), config.ice_servers.clone());

    let matchmaker = Matchmaker::new(matchmaker_rx, partners, Arc::new(service.clone()));
    tokio::spawn(matchmaker.run());

    let app = router(service);

    info!("Signaling relay listening on http://{}", config.listen_addr);

    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

use std::{net::SocketAddr, sync::Arc};

use anyhow::Result as AnyResult;
use chantier_gateway::{AppState, build_router};
use chantier_platform::{PgDevisStore, PgPlanningStore, ServiceConfig, connect_database};
use tracing::info;

#[tokio::main]
async fn main() -> AnyResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "chantier_gateway=info,chantier_platform=info".to_string()),
        )
        .init();

    let config = ServiceConfig::from_env("0.0.0.0:8080")?;
    let pool = connect_database(&config.database_url, config.database_max_connections).await?;

    let state = AppState::new(
        Arc::new(PgPlanningStore::new(pool.clone())),
        Arc::new(PgDevisStore::new(pool)),
    );
    let router = build_router(state);

    let addr: SocketAddr = config.http_addr.parse()?;
    info!("gateway listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}

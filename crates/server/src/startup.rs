use std::net::SocketAddr;

use configs::AppConfig;
use common::types::ServiceInfo;
use common::utils::logging::init_logging_from_env;
use dotenvy::dotenv;
use tracing::info;

use crate::errors::StartupError;
use crate::routes::{build_router, ServerState};

pub const SERVICE_NAME: &str = "Service B";

/// Connect the database (migrating when enabled) and assemble the router state.
pub async fn build_state(cfg: &AppConfig) -> anyhow::Result<ServerState> {
    let db = if cfg.database.auto_migrate {
        models::db::connect_and_migrate(&cfg.database).await?
    } else {
        models::db::connect_with_config(&cfg.database).await?
    };
    let service = cfg.service.clone().with_defaults(SERVICE_NAME, env!("CARGO_PKG_VERSION"));
    Ok(ServerState { db, info: ServiceInfo { name_service: service.name, version: service.version } })
}

/// Public entry: load configuration, build the app and run the HTTP server
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();
    init_logging_from_env();
    let cfg = AppConfig::load().map_err(|e| StartupError::InvalidConfig(e.to_string()))?;
    run_with_config(cfg).await
}

pub async fn run_with_config(cfg: AppConfig) -> anyhow::Result<()> {
    let state = build_state(&cfg).await?;
    let app = build_router(state);

    let addr: SocketAddr = format!("{}:{}", cfg.server.host, cfg.server.port).parse()?;
    info!(service = "service_b", %addr, "starting library service");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

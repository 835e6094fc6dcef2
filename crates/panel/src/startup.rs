use std::net::SocketAddr;

use axum::Router;
use configs::AppConfig;
use common::types::ServiceInfo;
use common::utils::logging::init_logging_from_env;
use dotenvy::dotenv;
use tracing::info;

use server::errors::StartupError;

use crate::routes::{build_router, PanelState};
use crate::views::build_admin_site;

pub const SERVICE_NAME: &str = "Service A";

/// Connect the database, register the admin views and assemble the full router.
pub async fn build_app(cfg: &AppConfig) -> anyhow::Result<Router> {
    let db = if cfg.database.auto_migrate {
        models::db::connect_and_migrate(&cfg.database).await?
    } else {
        models::db::connect_with_config(&cfg.database).await?
    };
    let service = cfg.service.clone().with_defaults(SERVICE_NAME, env!("CARGO_PKG_VERSION"));
    let site = build_admin_site(&cfg.admin, db.clone())?;
    let state = PanelState { db, info: ServiceInfo { name_service: service.name, version: service.version } };
    Ok(build_router(state, site.router()))
}

pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();
    init_logging_from_env();
    let cfg = AppConfig::load().map_err(|e| StartupError::InvalidConfig(e.to_string()))?;
    run_with_config(cfg).await
}

pub async fn run_with_config(cfg: AppConfig) -> anyhow::Result<()> {
    let app = build_app(&cfg).await?;
    let addr: SocketAddr = format!("{}:{}", cfg.server.host, cfg.server.port).parse()?;
    info!(service = "service_a", %addr, admin = crate::views::ADMIN_PATH, "starting admin service");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

//! Settings manager HTTP server

mod config;

use anyhow::{Context, Result};
use axum::{routing::get, Json, Router};
use clap::Parser;
use config::AppConfig;
use sea_orm::Database;
use settings_manager::{AllowAll, BearerToken, RequestAuthorizer, SettingsManagerModule};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use utoipa::OpenApi;

#[derive(Debug, Parser)]
#[command(name = "settings-manager-server", version, about = "Scoped settings over HTTP")]
struct Cli {
    /// YAML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = AppConfig::load(cli.config.as_deref())?;

    init_logging(&cfg.logging);

    let db = Database::connect(&cfg.database.url)
        .await
        .with_context(|| format!("failed to connect to database {}", cfg.database.url))?;
    let db = Arc::new(db);

    let module = SettingsManagerModule::default();
    module.migrate(&db).await?;
    module.init(cfg.settings.clone(), db).await?;

    let authorizer: Arc<dyn RequestAuthorizer> = match &cfg.auth.token {
        Some(token) => Arc::new(BearerToken::new(token.clone())),
        None => Arc::new(AllowAll),
    };

    let router = Router::new().route("/openapi.json", get(openapi_json));
    let app = module.register_rest(router, authorizer)?;

    let listener = tokio::net::TcpListener::bind(cfg.server.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", cfg.server.bind_addr))?;
    tracing::info!(addr = %cfg.server.bind_addr, "Starting settings manager server");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("Settings manager server stopped");
    Ok(())
}

fn init_logging(cfg: &config::LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cfg.level));
    let registry = tracing_subscriber::registry().with(filter);

    if cfg.json {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(settings_manager::api::rest::openapi::ApiDoc::openapi())
}

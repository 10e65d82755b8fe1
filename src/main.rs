use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use salon::config::AppConfig;
use salon::db;
use salon::routes;
use salon::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();

    let mut conn = db::init_db(&config.database_url)?;
    if config.seed_catalog {
        db::seed::seed_catalog(&mut conn)?;
    }
    if config.strict_status_transitions {
        tracing::info!("strict status transitions enabled");
    }
    if config.admin_token == "changeme" {
        tracing::warn!("ADMIN_TOKEN is not set, using the default token");
    }

    let state = Arc::new(AppState::new(conn, config.clone()));
    let app = routes::app(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

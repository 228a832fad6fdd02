//! # Vitrine API Server
//!
//! ```bash
//! DATABASE_URL=postgresql://localhost/vitrine JWT_SECRET=... cargo run -p vitrine-api
//! ```

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vitrine_api::{
    app::{build_router, AppState},
    config::Config,
};
use vitrine_shared::db::{migrations, pool};

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "vitrine_api=debug,vitrine_shared=info,tower_http=debug".into());

    let json = std::env::var("LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    tracing::info!("Vitrine API v{} starting", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env()?;

    let mut db_config = pool::DatabaseConfig::new(config.database.url.clone());
    db_config.max_connections = config.database.max_connections;
    let db = pool::create_pool(db_config)
        .await
        .context("failed to connect to the database")?;

    if config.database.run_migrations {
        migrations::run_migrations(&db)
            .await
            .context("failed to run migrations")?;
    }

    tokio::fs::create_dir_all(&config.uploads.dir)
        .await
        .with_context(|| format!("failed to create upload dir {}", config.uploads.dir.display()))?;

    let bind_address = config.bind_address();
    let app = build_router(AppState::new(db.clone(), config));

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("failed to bind {bind_address}"))?;
    tracing::info!("Listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool::close_pool(db).await;
    Ok(())
}

use std::path::PathBuf;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hastane_core::config::{
    database_url_from_env_value, pool_size_from_env_value, port_from_env_value, resolve_views_dir,
};
use hastane_core::{HastaneConfig, PgExecutor};
use hastane_web::{build_router, load_views, AppState};

/// Main entry point for the hastane server
///
/// Compiles every view, builds the connection pool and serves the HTML routes.
/// Views are compiled before the listener is bound, so a broken or missing template stops the
/// process at startup.
///
/// # Environment Variables
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `PORT`: listening port (default: 3000)
/// - `DATABASE_POOL_SIZE`: maximum pooled connections (default: 10)
/// - `HASTANE_VIEWS_DIR`: template directory (default: `crates/web/views`)
///
/// # Errors
/// Returns an error if:
/// - the logging configuration cannot be initialised,
/// - configuration is missing or invalid,
/// - a view fails to compile or is missing,
/// - the listening address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("hastane=info".parse()?)
                .add_directive("hastane_core=info".parse()?)
                .add_directive("hastane_web=info".parse()?)
                .add_directive("tower_http=debug".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let views_dir = resolve_views_dir(std::env::var("HASTANE_VIEWS_DIR").ok().map(PathBuf::from))?;
    let cfg = HastaneConfig::new(
        database_url_from_env_value(std::env::var("DATABASE_URL").ok())?,
        port_from_env_value(std::env::var("PORT").ok())?,
        pool_size_from_env_value(std::env::var("DATABASE_POOL_SIZE").ok())?,
        views_dir,
    )?;

    let views = load_views(cfg.views_dir())?;
    tracing::info!(
        "++ Compiled {} views from {}",
        views.len(),
        cfg.views_dir().display()
    );

    let executor = PgExecutor::connect_lazy(&cfg)?;
    let app = build_router(AppState::new(executor, views));

    let addr = cfg.listen_addr();
    tracing::info!("++ Starting hastane on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

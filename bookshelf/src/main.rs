//! A GraphQL book catalogue filtered by example.
//!
//! Books are kept in SQLite (or in memory) and queried through `POST /graphql`; `GET /graphql`
//! serves GraphiQL. Configuration is read from the environment, see [`config::Config`].
use crate::config::{Config, LogFormat};
use anyhow::{Context as _, Result};
use axum::serve;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt as _, util::SubscriberInitExt as _};

pub(crate) mod app;
pub(crate) mod book_schema;
pub(crate) mod config;
pub(crate) mod db;
pub(crate) mod queries;
pub(crate) mod seed;

#[cfg(test)]
mod api_testing;

/// Install the global subscriber. `RUST_LOG` overrides the default filter.
fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("bookshelf=info,qbe=info,tower_http=info"));
    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Text => registry.with(fmt::layer()).init(),
        LogFormat::Json => registry.with(fmt::layer().json()).init(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing `.env` file is fine.
    let _env_file = dotenvy::dotenv().ok();
    let config = Config::from_env()?;
    init_tracing(config.log_format);
    info!(?config, "configuration loaded");

    let books = db::open(&config).await?;
    if config.seed {
        let _inserted = seed::seed(&books).await?;
    }

    let app = app::router(app::schema(books));
    let listener = TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("unable to bind {}", config.addr))?;
    info!("serving on http://{}/graphql", listener.local_addr()?);
    serve(listener, app).await.context("server error")
}

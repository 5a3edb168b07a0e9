//! Opening the catalogue on the configured store.
use crate::{
    book_schema::Book,
    config::{Config, StoreKind},
};
use anyhow::{Context as _, Result};
use qbe::{MemoryStore, Repository, SqliteStore};
use tracing::info;

/// Open the catalogue on the store named by `config`.
///
/// For SQLite, this connects to [`Config::database_url`] and creates the book table unless it
/// exists.
///
/// # Errors
///
/// Returns an error if the database cannot be opened or the table cannot be created.
pub(crate) async fn open(config: &Config) -> Result<Repository<Book>> {
    match config.store {
        StoreKind::Memory => {
            info!("keeping books in memory");
            Ok(Repository::new(MemoryStore::new()))
        },
        StoreKind::Sqlite => {
            let store = SqliteStore::<Book>::connect(&config.database_url)
                .await
                .with_context(|| format!("failed to connect to {}", config.database_url))?;
            store
                .migrate()
                .await
                .context("failed to create the book table")?;
            info!(url = %config.database_url, "keeping books in SQLite");
            Ok(Repository::new(store))
        },
    }
}

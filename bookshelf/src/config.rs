//! Service configuration, read from the environment.
use anyhow::{Context as _, Result, bail};
use std::{env, net::SocketAddr, str::FromStr};

/// Where books are kept.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum StoreKind {
    /// In process memory. Lost on exit.
    Memory,
    /// In the SQLite database at [`Config::database_url`].
    Sqlite,
}

impl FromStr for StoreKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "memory" => Ok(Self::Memory),
            "sqlite" => Ok(Self::Sqlite),
            other => bail!("unknown store `{other}`, expected `memory` or `sqlite`"),
        }
    }
}

/// Log output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum LogFormat {
    /// Human readable lines.
    Text,
    /// One JSON object per event.
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => bail!("unknown log format `{other}`, expected `text` or `json`"),
        }
    }
}

/// Service configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Config {
    /// Address to listen on. `BOOKSHELF_ADDR`.
    pub(crate) addr: SocketAddr,
    /// Store backend. `BOOKSHELF_STORE`.
    pub(crate) store: StoreKind,
    /// SQLite connection URL. `DATABASE_URL`.
    pub(crate) database_url: String,
    /// Insert the demo catalogue into an empty store. `BOOKSHELF_SEED`.
    pub(crate) seed: bool,
    /// Log output format. `BOOKSHELF_LOG_FORMAT`.
    pub(crate) log_format: LogFormat,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set to an invalid value.
    pub(crate) fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from a variable lookup. Unset variables take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set to an invalid value.
    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let addr = lookup("BOOKSHELF_ADDR")
            .as_deref()
            .unwrap_or("127.0.0.1:8081")
            .parse::<SocketAddr>()
            .context("invalid BOOKSHELF_ADDR")?;
        let store = lookup("BOOKSHELF_STORE")
            .as_deref()
            .unwrap_or("sqlite")
            .parse::<StoreKind>()
            .context("invalid BOOKSHELF_STORE")?;
        let database_url =
            lookup("DATABASE_URL").unwrap_or_else(|| "sqlite:bookshelf.db?mode=rwc".to_owned());
        let seed = match lookup("BOOKSHELF_SEED").as_deref() {
            None | Some("true" | "1") => true,
            Some("false" | "0") => false,
            Some(other) => bail!("invalid BOOKSHELF_SEED `{other}`, expected `true` or `false`"),
        };
        let log_format = lookup("BOOKSHELF_LOG_FORMAT")
            .as_deref()
            .unwrap_or("text")
            .parse::<LogFormat>()
            .context("invalid BOOKSHELF_LOG_FORMAT")?;

        Ok(Self {
            addr,
            store,
            database_url,
            seed,
            log_format,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config> {
        let vars = vars
            .iter()
            .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
            .collect::<HashMap<_, _>>();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let config = config(&[]).expect("defaults are valid");
        assert_eq!(config.addr, SocketAddr::from(([127, 0, 0, 1], 8081)));
        assert_eq!(config.store, StoreKind::Sqlite);
        assert_eq!(config.database_url, "sqlite:bookshelf.db?mode=rwc");
        assert!(config.seed);
        assert_eq!(config.log_format, LogFormat::Text);
    }

    #[test]
    fn overrides() {
        let config = config(&[
            ("BOOKSHELF_ADDR", "0.0.0.0:9000"),
            ("BOOKSHELF_STORE", "memory"),
            ("DATABASE_URL", "sqlite::memory:"),
            ("BOOKSHELF_SEED", "false"),
            ("BOOKSHELF_LOG_FORMAT", "json"),
        ])
        .expect("valid overrides");
        assert_eq!(config.addr.port(), 9000);
        assert_eq!(config.store, StoreKind::Memory);
        assert_eq!(config.database_url, "sqlite::memory:");
        assert!(!config.seed);
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn invalid_values_are_errors() {
        for (key, value) in [
            ("BOOKSHELF_ADDR", "localhost"),
            ("BOOKSHELF_STORE", "postgres"),
            ("BOOKSHELF_SEED", "yes"),
            ("BOOKSHELF_LOG_FORMAT", "xml"),
        ] {
            assert!(config(&[(key, value)]).is_err(), "{key}={value}");
        }
    }
}

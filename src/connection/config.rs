use std::env;
use std::time::Duration;

use crate::core::{Result, StoreError};

pub const DATABASE_URL_ENV: &str = "TALKSTORE_DATABASE_URL";

/// Database connection configuration
///
/// Accepts sqlx-style SQLite URLs: `sqlite::memory:`, `sqlite://talks.db`,
/// `sqlite:///var/lib/talkstore/talks.db`.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Connection URL
    pub url: String,

    /// Create the database file if it does not exist
    pub create_if_missing: bool,

    /// Enforce foreign keys (cascading deletes depend on this)
    pub foreign_keys: bool,

    /// How long a writer waits for a competing connection's lock
    pub busy_timeout: Duration,

    /// Apply embedded migrations right after connecting
    pub run_migrations: bool,
}

impl ConnectionConfig {
    /// Create a configuration for the given URL
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            create_if_missing: true,
            foreign_keys: true,
            busy_timeout: Duration::from_secs(5),
            run_migrations: true,
        }
    }

    /// Private in-memory database, mostly for tests
    pub fn in_memory() -> Self {
        Self::new("sqlite::memory:")
    }

    /// Set whether a missing database file is created
    pub fn create_if_missing(mut self, create: bool) -> Self {
        self.create_if_missing = create;
        self
    }

    /// Set foreign key enforcement
    pub fn foreign_keys(mut self, enabled: bool) -> Self {
        self.foreign_keys = enabled;
        self
    }

    /// Set the busy timeout
    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    /// Set whether migrations run on connect
    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    /// Parse from connection string
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let config = ConnectionConfig::from_url("sqlite://talks.db")?;
    /// ```
    pub fn from_url(url: &str) -> Result<Self> {
        if !url.starts_with("sqlite:") {
            return Err(StoreError::Config(format!(
                "URL must start with 'sqlite:', got '{}'",
                url
            )));
        }

        let config = Self::new(url);
        config.validate()?;
        Ok(config)
    }

    /// Read the URL from `TALKSTORE_DATABASE_URL`, defaulting to in-memory
    pub fn from_env() -> Result<Self> {
        match env::var(DATABASE_URL_ENV) {
            Ok(url) => Self::from_url(&url),
            Err(env::VarError::NotPresent) => Ok(Self::in_memory()),
            Err(err) => Err(StoreError::Config(format!("{}: {}", DATABASE_URL_ENV, err))),
        }
    }

    /// Convert to connection string
    pub fn to_url(&self) -> String {
        self.url.clone()
    }

    pub fn is_in_memory(&self) -> bool {
        self.url.contains(":memory:") || self.url.contains("mode=memory")
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(StoreError::Config("URL cannot be empty".to_string()));
        }

        if !self.foreign_keys {
            tracing::warn!(
                url = %self.url,
                "foreign keys disabled; dependent rows are not enforced"
            );
        }

        Ok(())
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self::in_memory()
    }
}

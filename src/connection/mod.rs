pub mod config;
mod codec;

use std::str::FromStr;

use async_trait::async_trait;
use sqlx::Connection as _;
use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection};
use tracing::{debug, info, trace};

use crate::core::{Result, StoreError, Value};
use crate::interface::DatabaseClient;
use crate::result::{ExecResult, QueryResult};
use codec::{bind_params, column_names, decode_row, is_insert};
use config::ConnectionConfig;

/// Schema for talks and their dependents, embedded at compile time.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConnectionState {
    Active,
    InTransaction,
}

/// SQLite connection handle
///
/// Owns exactly one `sqlx` connection, so `begin`/`commit`/`rollback` scope
/// every statement issued through this client in between.
pub struct SqliteClient {
    conn: SqliteConnection,
    state: ConnectionState,
}

impl SqliteClient {
    /// Connect using the given configuration, applying migrations if requested
    pub async fn connect(config: &ConnectionConfig) -> Result<Self> {
        config.validate()?;

        let options = SqliteConnectOptions::from_str(&config.url)?
            .create_if_missing(config.create_if_missing)
            .foreign_keys(config.foreign_keys)
            .busy_timeout(config.busy_timeout);

        let conn = SqliteConnection::connect_with(&options).await?;
        let mut client = Self {
            conn,
            state: ConnectionState::Active,
        };

        if config.run_migrations {
            client.migrate().await?;
        }

        info!(url = %config.to_url(), "connected to talk database");
        Ok(client)
    }

    /// Connect to a private in-memory database with the schema applied
    pub async fn in_memory() -> Result<Self> {
        Self::connect(&ConnectionConfig::in_memory()).await
    }

    /// Apply any pending migrations
    pub async fn migrate(&mut self) -> Result<()> {
        MIGRATOR.run(&mut self.conn).await?;
        debug!("talk schema migrations applied");
        Ok(())
    }

    /// Close the connection. An open transaction is discarded by SQLite.
    pub async fn close(self) -> Result<()> {
        if self.state == ConnectionState::InTransaction {
            debug!("closing connection with an open transaction");
        }
        self.conn.close().await?;
        Ok(())
    }

    async fn control(&mut self, statement: &str) -> Result<()> {
        trace!(statement, "transaction control");
        sqlx::query(statement).execute(&mut self.conn).await?;
        Ok(())
    }
}

#[async_trait]
impl DatabaseClient for SqliteClient {
    async fn query(&mut self, sql: &str, params: &[Value]) -> Result<QueryResult> {
        trace!(sql, params = params.len(), "query");
        let rows = bind_params(sql, params).fetch_all(&mut self.conn).await?;

        let columns = rows.first().map(column_names).unwrap_or_default();
        let rows = rows.iter().map(decode_row).collect::<Result<Vec<_>>>()?;

        Ok(QueryResult::new(columns, rows))
    }

    async fn execute(&mut self, sql: &str, params: &[Value]) -> Result<ExecResult> {
        trace!(sql, params = params.len(), "execute");
        let done = bind_params(sql, params).execute(&mut self.conn).await?;

        let last_insert_id = (is_insert(sql) && done.rows_affected() > 0)
            .then(|| done.last_insert_rowid());

        Ok(ExecResult::new(done.rows_affected(), last_insert_id))
    }

    async fn begin(&mut self) -> Result<()> {
        if self.state == ConnectionState::InTransaction {
            return Err(StoreError::Transaction("Transaction already active".into()));
        }

        self.control("BEGIN").await?;
        self.state = ConnectionState::InTransaction;
        Ok(())
    }

    async fn commit(&mut self) -> Result<()> {
        if self.state != ConnectionState::InTransaction {
            return Err(StoreError::Transaction("No active transaction".into()));
        }

        // Stays InTransaction on failure so the caller can still roll back.
        self.control("COMMIT").await?;
        self.state = ConnectionState::Active;
        Ok(())
    }

    async fn rollback(&mut self) -> Result<()> {
        if self.state != ConnectionState::InTransaction {
            return Ok(());
        }

        match self.control("ROLLBACK").await {
            Ok(()) => {}
            // SQLite already rolled back on its own (e.g. after SQLITE_FULL).
            Err(StoreError::Database(err))
                if err.to_string().contains("no transaction is active") => {}
            Err(err) => return Err(err),
        }

        self.state = ConnectionState::Active;
        Ok(())
    }

    fn is_in_transaction(&self) -> bool {
        self.state == ConnectionState::InTransaction
    }
}

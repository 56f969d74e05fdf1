use async_trait::async_trait;

use crate::core::{Result, Value};
use crate::result::{ExecResult, QueryResult};

/// The storage primitives every talk component is written against.
///
/// One client is one connection: a transaction opened with [`begin`](Self::begin)
/// covers every statement issued through the same client until it is committed
/// or rolled back. Parameters bind to positional `?` placeholders in order.
///
/// `SqliteClient` is the production implementation; `FaultInjectingClient`
/// wraps any client to force failures in tests.
#[async_trait]
pub trait DatabaseClient: Send {
    /// Run a statement that returns rows (SELECT).
    async fn query(&mut self, sql: &str, params: &[Value]) -> Result<QueryResult>;

    /// Run a statement that modifies data (INSERT, UPDATE, DELETE).
    async fn execute(&mut self, sql: &str, params: &[Value]) -> Result<ExecResult>;

    /// Open a transaction. Nested transactions are not supported.
    async fn begin(&mut self) -> Result<()>;

    /// Commit the active transaction.
    async fn commit(&mut self) -> Result<()>;

    /// Roll back the active transaction. A no-op when none is active.
    async fn rollback(&mut self) -> Result<()>;

    fn is_in_transaction(&self) -> bool;
}

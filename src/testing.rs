//! Test doubles for the storage seam
//!
//! Only compiled with the `testing` feature.

use async_trait::async_trait;

use crate::core::{Result, StoreError, Value};
use crate::interface::DatabaseClient;
use crate::result::{ExecResult, QueryResult};

#[derive(Debug, Clone)]
struct Fault {
    needle: String,
    kind: FaultKind,
    remaining: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FaultKind {
    Failure,
    Collision,
}

/// A statement slipped in ahead of the first statement matching `needle`,
/// as if another writer got there first.
#[derive(Debug, Clone)]
struct Interleaved {
    needle: String,
    sql: String,
    params: Vec<Value>,
}

/// Wraps a client and makes chosen statements fail.
///
/// A fault matches any statement whose SQL contains its needle. Failing
/// statements never reach the inner client. Every statement passed to
/// `query`/`execute` is recorded, including the failed ones. Interleaved
/// statements go straight to the inner client and are not recorded.
pub struct FaultInjectingClient<C> {
    inner: C,
    faults: Vec<Fault>,
    interleaved: Vec<Interleaved>,
    fail_commit: bool,
    statements: Vec<String>,
}

impl<C: DatabaseClient> FaultInjectingClient<C> {
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            faults: Vec::new(),
            interleaved: Vec::new(),
            fail_commit: false,
            statements: Vec::new(),
        }
    }

    /// Fail every matching statement with `StoreError::InjectedFault`.
    pub fn fail_on(mut self, needle: impl Into<String>) -> Self {
        self.push_fault(needle.into(), FaultKind::Failure, None);
        self
    }

    /// Fail matching statements as if a unique index rejected them.
    pub fn collide_on(mut self, needle: impl Into<String>) -> Self {
        self.push_fault(needle.into(), FaultKind::Collision, None);
        self
    }

    /// Like [`collide_on`](Self::collide_on), but only for the next `times` matches.
    pub fn collide_times(mut self, needle: impl Into<String>, times: usize) -> Self {
        self.push_fault(needle.into(), FaultKind::Collision, Some(times));
        self
    }

    /// Reject `commit` with `StoreError::InjectedFault`, leaving the
    /// transaction open on the inner client.
    pub fn fail_commit(mut self) -> Self {
        self.fail_commit = true;
        self
    }

    /// Run `sql` on the inner client once, right before the first statement
    /// containing `needle`.
    pub fn interleave_before(
        mut self,
        needle: impl Into<String>,
        sql: impl Into<String>,
        params: Vec<Value>,
    ) -> Self {
        self.interleaved.push(Interleaved {
            needle: needle.into(),
            sql: sql.into(),
            params,
        });
        self
    }

    pub fn clear_faults(&mut self) {
        self.faults.clear();
        self.interleaved.clear();
        self.fail_commit = false;
    }

    pub fn statements(&self) -> &[String] {
        &self.statements
    }

    pub fn count_matching(&self, needle: &str) -> usize {
        self.statements.iter().filter(|sql| sql.contains(needle)).count()
    }

    pub fn inner_mut(&mut self) -> &mut C {
        &mut self.inner
    }

    pub fn into_inner(self) -> C {
        self.inner
    }

    fn push_fault(&mut self, needle: String, kind: FaultKind, remaining: Option<usize>) {
        self.faults.push(Fault {
            needle,
            kind,
            remaining,
        });
    }

    async fn run_interleaved(&mut self, sql: &str) -> Result<()> {
        let Some(index) = self.interleaved.iter().position(|i| sql.contains(&i.needle)) else {
            return Ok(());
        };

        let statement = self.interleaved.remove(index);
        self.inner.execute(&statement.sql, &statement.params).await?;
        Ok(())
    }

    fn record(&mut self, sql: &str) -> Result<()> {
        self.statements.push(sql.to_string());

        let fault = self
            .faults
            .iter_mut()
            .find(|fault| sql.contains(&fault.needle) && fault.remaining != Some(0));

        let Some(fault) = fault else {
            return Ok(());
        };

        if let Some(remaining) = fault.remaining.as_mut() {
            *remaining -= 1;
        }

        match fault.kind {
            FaultKind::Failure => Err(StoreError::InjectedFault(sql.to_string())),
            FaultKind::Collision => Err(StoreError::ConstraintViolation(format!(
                "UNIQUE constraint failed (injected): {}",
                sql
            ))),
        }
    }
}

#[async_trait]
impl<C: DatabaseClient> DatabaseClient for FaultInjectingClient<C> {
    async fn query(&mut self, sql: &str, params: &[Value]) -> Result<QueryResult> {
        self.run_interleaved(sql).await?;
        self.record(sql)?;
        self.inner.query(sql, params).await
    }

    async fn execute(&mut self, sql: &str, params: &[Value]) -> Result<ExecResult> {
        self.run_interleaved(sql).await?;
        self.record(sql)?;
        self.inner.execute(sql, params).await
    }

    async fn begin(&mut self) -> Result<()> {
        self.inner.begin().await
    }

    async fn commit(&mut self) -> Result<()> {
        if self.fail_commit {
            return Err(StoreError::InjectedFault("COMMIT".to_string()));
        }
        self.inner.commit().await
    }

    async fn rollback(&mut self) -> Result<()> {
        self.inner.rollback().await
    }

    fn is_in_transaction(&self) -> bool {
        self.inner.is_in_transaction()
    }
}

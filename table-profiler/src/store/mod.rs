//! The Tabular Store boundary.
//!
//! A [`StoreClient`] executes a query string and returns a [`TabularResult`].
//! Failures never cross this boundary: a malformed query, a lost connection or
//! a missing connection all surface as an empty result, and the failure is
//! logged once.
//!
//! [`DataFusionStore`] is the shipped implementation. It exposes tables from
//! in-memory Arrow batches, CSV and Parquet files (and PostgreSQL tables with
//! the `postgres` feature) through a DataFusion session with
//! `information_schema` enabled.

use std::fmt::Debug;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::catalog::TypeOracle;

mod datafusion_store;
pub mod queries;
mod tabular;
mod value;

#[cfg(feature = "postgres")]
mod database;

pub use datafusion_store::{DataFusionStore, SourceLocation, StoreConfig, TableSource};
pub use tabular::TabularResult;
pub use value::{parse_datetime, unix_epoch, Value, DATETIME_FORMAT};

#[cfg(feature = "postgres")]
pub use database::PostgresConfig;

/// Executes query strings against the Tabular Store.
///
/// Implementations must never fail: on any error they return
/// [`TabularResult::empty`]. Callers therefore cannot tell an empty answer
/// from a failed query.
#[async_trait]
pub trait StoreClient: Debug + Send + Sync {
    /// Runs a single query and returns all of its rows.
    async fn execute(&self, query: &str) -> TabularResult;

    /// The data-type names this store reports in `information_schema.columns`.
    fn type_oracle(&self) -> TypeOracle {
        TypeOracle::postgres()
    }
}

/// Outcome of opening a store connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionStatus {
    /// Whether the connection is usable.
    pub status: bool,
    /// Human-readable description of the outcome.
    pub msg: String,
}

impl ConnectionStatus {
    pub fn connected(msg: impl Into<String>) -> Self {
        Self {
            status: true,
            msg: msg.into(),
        }
    }

    pub fn failed(msg: impl Into<String>) -> Self {
        Self {
            status: false,
            msg: msg.into(),
        }
    }
}

/// Counts query cursors that are currently open.
#[derive(Debug, Default)]
pub struct CursorTracker {
    open: AtomicUsize,
}

impl CursorTracker {
    /// Opens a cursor; it closes when the guard is dropped.
    pub fn acquire(&self) -> CursorGuard<'_> {
        self.open.fetch_add(1, Ordering::SeqCst);
        CursorGuard {
            tracker: self,
            opened_at: Instant::now(),
        }
    }

    pub fn open_cursors(&self) -> usize {
        self.open.load(Ordering::SeqCst)
    }
}

/// A scoped query cursor, released on every exit path.
#[derive(Debug)]
pub struct CursorGuard<'a> {
    tracker: &'a CursorTracker,
    opened_at: Instant,
}

impl Drop for CursorGuard<'_> {
    fn drop(&mut self) {
        self.tracker.open.fetch_sub(1, Ordering::SeqCst);
        trace!(
            elapsed_ms = self.opened_at.elapsed().as_millis() as u64,
            "Closed query cursor"
        );
    }
}

//! # table-profiler - Column profiling for relational tables
//!
//! `table-profiler` browses the schemas and tables of a relational store and
//! computes descriptive-statistics profiles for its numeric, text and
//! date/time columns: counts, central tendency, character classes, calendar
//! buckets, frequency tables and chart-ready histograms.
//!
//! ## Overview
//!
//! The store is reached through the [`StoreClient`](store::StoreClient)
//! trait, which executes a query string and returns a
//! [`TabularResult`](store::TabularResult). It never fails: a failed query
//! comes back as an empty result. [`DataFusionStore`](store::DataFusionStore)
//! is the shipped implementation and serves in-memory Arrow batches, CSV and
//! Parquet files, and (with the `postgres` feature) PostgreSQL tables.
//!
//! A [`TableProfile`](table::TableProfile) loads a table snapshot, classifies
//! its columns through an injected [`ColumnClassifier`](catalog::ColumnClassifier),
//! casts them to typed columns without losing nulls, and computes table-level
//! counts. Each column is then profiled on demand by the
//! [`ColumnProfiler`](profile::ColumnProfiler) for its kind.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use arrow::array::{Int64Array, StringArray};
//! use arrow::datatypes::{DataType, Field, Schema};
//! use arrow::record_batch::RecordBatch;
//! use table_profiler::prelude::*;
//!
//! # #[tokio::main]
//! # async fn main() -> table_profiler::Result<()> {
//! let schema = Arc::new(Schema::new(vec![
//!     Field::new("id", DataType::Int64, false),
//!     Field::new("city", DataType::Utf8, true),
//! ]));
//! let batch = RecordBatch::try_new(
//!     schema,
//!     vec![
//!         Arc::new(Int64Array::from(vec![1, 2, 3])),
//!         Arc::new(StringArray::from(vec![Some("Sydney"), None, Some("Perth")])),
//!     ],
//! )?;
//!
//! let mut store =
//!     DataFusionStore::new(StoreConfig::new().with_record_batch("public", "cities", batch));
//! let status = store.open_connection().await;
//! assert!(status.status, "{}", status.msg);
//!
//! let mut table = TableProfile::new(Arc::new(store), "public", "cities");
//! table.set_data().await?;
//! assert_eq!(table.summary_report().value("Number of Rows"), Some("3"));
//!
//! let city = table.profile_column("city").await?;
//! assert_eq!(city.get(Statistic::MissingCount), Some(&Value::Integer(1)));
//! # Ok(())
//! # }
//! ```
//!
//! ## Logging
//!
//! The crate emits `tracing` events and spans. Install a subscriber with
//! [`logging::setup::init_logging`] or your own.

pub mod catalog;
pub mod config;
pub mod error;
pub mod formatters;
pub mod logging;
pub mod prelude;
pub mod profile;
pub mod security;
pub mod store;
pub mod table;

#[cfg(test)]
mod test_fixtures;

pub use error::{ProfileError, Result};

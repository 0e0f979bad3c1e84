//! DataFusion-backed Tabular Store.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;
use async_trait::async_trait;
use datafusion::datasource::MemTable;
use datafusion::execution::context::SQLOptions;
use datafusion::prelude::{CsvReadOptions, ParquetReadOptions, SessionConfig, SessionContext};
use datafusion::sql::TableReference;
use tracing::{debug, info, instrument, warn};

use super::{ConnectionStatus, CursorTracker, StoreClient, TabularResult};
use crate::catalog::TypeOracle;
use crate::error::{ProfileError, Result};
use crate::logging::truncate_field;
use crate::security::SqlSecurity;

#[cfg(feature = "postgres")]
use super::database::PostgresConfig;

/// Where the rows of a registered table come from.
#[derive(Debug, Clone)]
pub enum SourceLocation {
    /// Arrow record batches held in memory.
    Memory {
        schema: SchemaRef,
        batches: Vec<RecordBatch>,
    },
    /// A CSV file; the schema is inferred when the connection opens.
    Csv {
        path: PathBuf,
        has_header: bool,
        delimiter: u8,
    },
    /// A Parquet file or directory.
    Parquet { path: PathBuf },
    /// A table in a remote PostgreSQL database.
    #[cfg(feature = "postgres")]
    Postgres {
        connection: PostgresConfig,
        remote_table: String,
    },
}

impl SourceLocation {
    fn source_type(&self) -> &'static str {
        match self {
            SourceLocation::Memory { .. } => "Memory",
            SourceLocation::Csv { .. } => "CSV",
            SourceLocation::Parquet { .. } => "Parquet",
            #[cfg(feature = "postgres")]
            SourceLocation::Postgres { .. } => "PostgreSQL",
        }
    }
}

/// A table exposed by the store under `schema.table`.
#[derive(Debug, Clone)]
pub struct TableSource {
    pub schema: String,
    pub table: String,
    pub location: SourceLocation,
}

/// The set of tables a [`DataFusionStore`] registers on connect.
///
/// # Examples
///
/// ```rust,no_run
/// use table_profiler::store::StoreConfig;
///
/// let config = StoreConfig::new()
///     .with_csv("sales", "orders", "data/orders.csv")
///     .with_parquet("sales", "customers", "data/customers.parquet");
/// assert_eq!(config.sources().len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct StoreConfig {
    sources: Vec<TableSource>,
}

impl StoreConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sources(&self) -> &[TableSource] {
        &self.sources
    }

    /// Adds a table source.
    pub fn with_source(mut self, source: TableSource) -> Self {
        self.sources.push(source);
        self
    }

    /// Adds an in-memory table with an explicit schema.
    pub fn with_memory_table(
        self,
        schema_name: impl Into<String>,
        table: impl Into<String>,
        schema: SchemaRef,
        batches: Vec<RecordBatch>,
    ) -> Self {
        self.with_source(TableSource {
            schema: schema_name.into(),
            table: table.into(),
            location: SourceLocation::Memory { schema, batches },
        })
    }

    /// Adds an in-memory table made of a single record batch.
    pub fn with_record_batch(
        self,
        schema_name: impl Into<String>,
        table: impl Into<String>,
        batch: RecordBatch,
    ) -> Self {
        let schema = batch.schema();
        self.with_memory_table(schema_name, table, schema, vec![batch])
    }

    /// Adds a comma-separated CSV file with a header row.
    pub fn with_csv(
        self,
        schema_name: impl Into<String>,
        table: impl Into<String>,
        path: impl Into<PathBuf>,
    ) -> Self {
        self.with_source(TableSource {
            schema: schema_name.into(),
            table: table.into(),
            location: SourceLocation::Csv {
                path: path.into(),
                has_header: true,
                delimiter: b',',
            },
        })
    }

    /// Adds a Parquet file or directory.
    pub fn with_parquet(
        self,
        schema_name: impl Into<String>,
        table: impl Into<String>,
        path: impl Into<PathBuf>,
    ) -> Self {
        self.with_source(TableSource {
            schema: schema_name.into(),
            table: table.into(),
            location: SourceLocation::Parquet { path: path.into() },
        })
    }

    /// Adds a remote PostgreSQL table.
    #[cfg(feature = "postgres")]
    pub fn with_postgres(
        self,
        schema_name: impl Into<String>,
        table: impl Into<String>,
        connection: PostgresConfig,
        remote_table: impl Into<String>,
    ) -> Self {
        self.with_source(TableSource {
            schema: schema_name.into(),
            table: table.into(),
            location: SourceLocation::Postgres {
                connection,
                remote_table: remote_table.into(),
            },
        })
    }
}

/// A Tabular Store backed by a DataFusion session.
///
/// The store holds at most one open session. Opening a connection closes the
/// previous one first; a failed open leaves the store disconnected, and
/// queries against a disconnected store return an empty result.
///
/// Queries run read-only: DDL and DML statements are rejected by the session
/// and therefore also yield an empty result.
pub struct DataFusionStore {
    config: StoreConfig,
    session: Option<SessionContext>,
    cursors: CursorTracker,
}

impl fmt::Debug for DataFusionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataFusionStore")
            .field("sources", &self.config.sources.len())
            .field("connected", &self.is_connected())
            .finish()
    }
}

impl DataFusionStore {
    /// Creates a disconnected store for the given sources.
    pub fn new(config: StoreConfig) -> Self {
        Self {
            config,
            session: None,
            cursors: CursorTracker::default(),
        }
    }

    /// Wraps a session the caller has already populated.
    ///
    /// The session should have `information_schema` enabled for table
    /// listing and column classification to work.
    pub fn from_context(ctx: SessionContext) -> Self {
        Self {
            config: StoreConfig::default(),
            session: Some(ctx),
            cursors: CursorTracker::default(),
        }
    }

    /// Opens a new session and registers every configured source.
    #[instrument(skip(self), fields(sources = self.config.sources.len()))]
    pub async fn open_connection(&mut self) -> ConnectionStatus {
        if self.session.is_some() {
            self.close_connection();
        }

        match self.build_session().await {
            Ok(ctx) => {
                self.session = Some(ctx);
                info!("Connection to store established");
                ConnectionStatus::connected(format!(
                    "Connection to store established ({} tables registered)",
                    self.config.sources.len()
                ))
            }
            Err(e) => {
                warn!(error = %e, "Connection to store failed");
                ConnectionStatus::failed(format!("Connection to store failed: {e}"))
            }
        }
    }

    /// Drops the current session, if any.
    pub fn close_connection(&mut self) {
        if self.session.take().is_some() {
            debug!("Closed store connection");
        }
    }

    pub fn is_connected(&self) -> bool {
        self.session.is_some()
    }

    /// Number of query cursors currently open; zero between queries.
    pub fn open_cursors(&self) -> usize {
        self.cursors.open_cursors()
    }

    async fn build_session(&self) -> Result<SessionContext> {
        let config = SessionConfig::new().with_information_schema(true);
        let ctx = SessionContext::new_with_config(config);
        for source in &self.config.sources {
            register_source(&ctx, source).await?;
        }
        Ok(ctx)
    }

    async fn run_query(ctx: &SessionContext, query: &str) -> Result<TabularResult> {
        let options = SQLOptions::new()
            .with_allow_ddl(false)
            .with_allow_dml(false);
        let df = ctx.sql_with_options(query, options).await?;
        let columns = df
            .schema()
            .fields()
            .iter()
            .map(|field| field.name().clone())
            .collect();
        let batches = df.collect().await?;
        TabularResult::from_batches(columns, &batches)
    }
}

#[async_trait]
impl StoreClient for DataFusionStore {
    #[instrument(skip(self, query), fields(query = %truncate_field(query, 256)))]
    async fn execute(&self, query: &str) -> TabularResult {
        let Some(ctx) = &self.session else {
            warn!("Query issued without an open connection");
            return TabularResult::empty();
        };

        let _cursor = self.cursors.acquire();
        match Self::run_query(ctx, query).await {
            Ok(result) => {
                debug!(rows = result.num_rows(), "Query completed");
                result
            }
            Err(e) => {
                warn!(error = %e, "Query failed, returning an empty result");
                TabularResult::empty()
            }
        }
    }

    fn type_oracle(&self) -> TypeOracle {
        TypeOracle::arrow()
    }
}

#[instrument(skip(ctx, source), fields(schema = %source.schema, table = %source.table, source_type = source.location.source_type()))]
async fn register_source(ctx: &SessionContext, source: &TableSource) -> Result<()> {
    let source_error = |e: &dyn fmt::Display| {
        ProfileError::data_source(
            source.location.source_type(),
            format!(
                "Failed to register table '{}.{}': {e}",
                source.schema, source.table
            ),
        )
    };

    let create_schema = format!(
        "CREATE SCHEMA IF NOT EXISTS {}",
        SqlSecurity::escape_identifier(&source.schema)?
    );
    ctx.sql(&create_schema).await?;
    SqlSecurity::validate_identifier(&source.table)?;

    let table_ref = TableReference::partial(source.schema.as_str(), source.table.as_str());
    match &source.location {
        SourceLocation::Memory { schema, batches } => {
            let table = MemTable::try_new(schema.clone(), vec![batches.clone()])?;
            ctx.register_table(table_ref, Arc::new(table))
                .map_err(|e| source_error(&e))?;
        }
        SourceLocation::Csv {
            path,
            has_header,
            delimiter,
        } => {
            ensure_exists(source, path).await?;
            let options = CsvReadOptions::new()
                .has_header(*has_header)
                .delimiter(*delimiter);
            ctx.register_csv(table_ref, path.to_string_lossy().to_string(), options)
                .await
                .map_err(|e| source_error(&e))?;
        }
        SourceLocation::Parquet { path } => {
            ensure_exists(source, path).await?;
            ctx.register_parquet(
                table_ref,
                path.to_string_lossy().to_string(),
                ParquetReadOptions::default(),
            )
            .await
            .map_err(|e| source_error(&e))?;
        }
        #[cfg(feature = "postgres")]
        SourceLocation::Postgres {
            connection,
            remote_table,
        } => {
            let provider = super::database::table_provider(connection, remote_table).await?;
            ctx.register_table(table_ref, provider)
                .map_err(|e| source_error(&e))?;
        }
    }

    debug!("Registered table source");
    Ok(())
}

/// File sources register lazily, so a missing path only surfaces here.
async fn ensure_exists(source: &TableSource, path: &Path) -> Result<()> {
    tokio::fs::metadata(path).await.map(|_| ()).map_err(|e| {
        ProfileError::data_source(
            source.location.source_type(),
            format!(
                "Failed to register table '{}.{}': cannot read '{}': {e}",
                source.schema,
                source.table,
                path.display()
            ),
        )
    })
}

//! Remote PostgreSQL tables exposed through `datafusion-table-providers`.

use std::collections::HashMap;
use std::sync::Arc;

use datafusion::catalog::TableProvider;
use datafusion::sql::TableReference;
use datafusion_table_providers::{
    postgres::PostgresTableFactory, sql::db_connection_pool::postgrespool::PostgresConnectionPool,
    util::secrets::to_secret_map,
};
use tracing::instrument;

use crate::error::{ProfileError, Result};
use crate::security::SecureString;

/// PostgreSQL connection parameters.
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub username: String,
    pub password: SecureString,
    pub sslmode: Option<String>,
}

impl PostgresConfig {
    /// Creates a configuration with SSL disabled.
    pub fn new(
        host: impl Into<String>,
        port: u16,
        database: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<SecureString>,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            database: database.into(),
            username: username.into(),
            password: password.into(),
            sslmode: Some("disable".to_string()),
        }
    }

    /// Sets the SSL mode passed to the connection pool.
    pub fn with_sslmode(mut self, sslmode: impl Into<String>) -> Self {
        self.sslmode = Some(sslmode.into());
        self
    }
}

/// Connects to PostgreSQL and creates a provider for `remote_table`.
#[instrument(skip(config), fields(host = %config.host, port = config.port, database = %config.database))]
pub(crate) async fn table_provider(
    config: &PostgresConfig,
    remote_table: &str,
) -> Result<Arc<dyn TableProvider>> {
    let mut params = HashMap::new();
    params.insert("host".to_string(), config.host.clone());
    params.insert("port".to_string(), config.port.to_string());
    params.insert("db".to_string(), config.database.clone());
    params.insert("user".to_string(), config.username.clone());
    params.insert("pass".to_string(), config.password.expose().to_string());
    if let Some(ssl) = &config.sslmode {
        params.insert("sslmode".to_string(), ssl.clone());
    }

    let pool = Arc::new(
        PostgresConnectionPool::new(to_secret_map(params))
            .await
            .map_err(|e| {
                ProfileError::data_source(
                    "PostgreSQL",
                    format!(
                        "Connection to server at {}, port {} failed: {e}",
                        config.host, config.port
                    ),
                )
            })?,
    );

    PostgresTableFactory::new(pool)
        .table_provider(TableReference::from(remote_table))
        .await
        .map_err(|e| {
            ProfileError::data_source(
                "PostgreSQL",
                format!("Failed to create table provider for '{remote_table}': {e}"),
            )
        })
}

//! Schema browsing and column classification.
//!
//! A column's [`ColumnKind`] is resolved once per table load through an
//! injected [`ColumnClassifier`]. The default [`StoreClassifier`] asks the
//! store's `information_schema` which columns carry numeric, text or date
//! types, using the store's [`TypeOracle`] to know what those type names are.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::error::Result;
use crate::security::SqlSecurity;
use crate::store::{queries, StoreClient, Value};

/// The profile variant a column belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Numeric,
    Text,
    Date,
    /// Anything the oracle does not recognise; never profiled.
    Other,
}

impl ColumnKind {
    /// The three kinds that have a column profile.
    pub const PROFILED: [ColumnKind; 3] = [ColumnKind::Numeric, ColumnKind::Text, ColumnKind::Date];

    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnKind::Numeric => "numeric",
            ColumnKind::Text => "text",
            ColumnKind::Date => "date",
            ColumnKind::Other => "other",
        }
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A set of data-type names, matched exactly or by prefix.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypePattern {
    pub exact: Vec<String>,
    pub prefixes: Vec<String>,
}

impl TypePattern {
    pub fn exact(names: &[&str]) -> Self {
        Self {
            exact: names.iter().map(|n| n.to_string()).collect(),
            prefixes: Vec::new(),
        }
    }

    pub fn with_prefixes(mut self, prefixes: &[&str]) -> Self {
        self.prefixes.extend(prefixes.iter().map(|p| p.to_string()));
        self
    }

    pub fn matches(&self, data_type: &str) -> bool {
        self.exact.iter().any(|name| name == data_type)
            || self.prefixes.iter().any(|p| data_type.starts_with(p.as_str()))
    }

    /// Renders a SQL predicate testing `column_expr` against the pattern.
    pub fn predicate(&self, column_expr: &str) -> String {
        let mut clauses = Vec::new();
        if !self.exact.is_empty() {
            let names: Vec<String> = self
                .exact
                .iter()
                .map(|n| SqlSecurity::quote_literal(n))
                .collect();
            clauses.push(format!("{column_expr} IN ({})", names.join(", ")));
        }
        for prefix in &self.prefixes {
            let escaped = prefix.replace('\'', "''");
            clauses.push(format!("{column_expr} LIKE '{escaped}%'"));
        }
        match clauses.len() {
            0 => "FALSE".to_string(),
            1 => clauses.remove(0),
            _ => format!("({})", clauses.join(" OR ")),
        }
    }
}

/// Maps a store's data-type names onto [`ColumnKind`]s.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeOracle {
    pub numeric: TypePattern,
    pub text: TypePattern,
    pub date: TypePattern,
}

impl TypeOracle {
    /// The PostgreSQL type lists used by existing deployments.
    ///
    /// `timestampz` is kept as spelled there; stored classifications depend
    /// on it.
    pub fn postgres() -> Self {
        Self {
            numeric: TypePattern::exact(&[
                "smallint",
                "integer",
                "bigint",
                "decimal",
                "numeric",
                "real",
                "double precision",
                "smallserial",
                "serial",
                "bigserial",
                "money",
            ]),
            text: TypePattern::exact(&["char", "varchar", "text", "character varying", "character"]),
            date: TypePattern::exact(&["date", "time", "timestamp", "timestampz", "timetz"]),
        }
    }

    /// Arrow type names, as DataFusion reports them in `information_schema`.
    pub fn arrow() -> Self {
        Self {
            numeric: TypePattern::exact(&[
                "Int8", "Int16", "Int32", "Int64", "UInt8", "UInt16", "UInt32", "UInt64",
                "Float16", "Float32", "Float64",
            ])
            .with_prefixes(&["Decimal"]),
            text: TypePattern::exact(&["Utf8", "LargeUtf8", "Utf8View"]),
            date: TypePattern::exact(&["Date32", "Date64"])
                .with_prefixes(&["Timestamp", "Time32", "Time64"]),
        }
    }

    pub fn pattern(&self, kind: ColumnKind) -> Option<&TypePattern> {
        match kind {
            ColumnKind::Numeric => Some(&self.numeric),
            ColumnKind::Text => Some(&self.text),
            ColumnKind::Date => Some(&self.date),
            ColumnKind::Other => None,
        }
    }

    pub fn kind_of(&self, data_type: &str) -> ColumnKind {
        ColumnKind::PROFILED
            .into_iter()
            .find(|kind| {
                self.pattern(*kind)
                    .is_some_and(|pattern| pattern.matches(data_type))
            })
            .unwrap_or(ColumnKind::Other)
    }

    /// SQL filter over `col.data_type` selecting columns of `kind`.
    pub fn predicate(&self, kind: ColumnKind) -> String {
        self.pattern(kind)
            .map(|pattern| pattern.predicate("col.data_type"))
            .unwrap_or_else(|| "FALSE".to_string())
    }
}

impl Default for TypeOracle {
    fn default() -> Self {
        Self::postgres()
    }
}

/// Column names of a table split by kind. A name appears in at most one list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnClassification {
    numeric: Vec<String>,
    text: Vec<String>,
    date: Vec<String>,
}

impl ColumnClassification {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a classification from three name lists.
    ///
    /// A name listed under several kinds keeps the first one, in
    /// numeric, text, date order.
    pub fn from_lists(numeric: Vec<String>, text: Vec<String>, date: Vec<String>) -> Self {
        let mut classification = Self::new();
        for (kind, names) in [
            (ColumnKind::Numeric, numeric),
            (ColumnKind::Text, text),
            (ColumnKind::Date, date),
        ] {
            for name in names {
                classification.insert(kind, name);
            }
        }
        classification
    }

    /// Adds a column under `kind`; returns self for chaining.
    pub fn with(mut self, kind: ColumnKind, name: impl Into<String>) -> Self {
        self.insert(kind, name.into());
        self
    }

    fn insert(&mut self, kind: ColumnKind, name: String) {
        let existing = self.kind_of(&name);
        if existing != ColumnKind::Other {
            if existing != kind {
                warn!(column = %name, kept = %existing, dropped = %kind, "Column classified twice");
            }
            return;
        }
        match kind {
            ColumnKind::Numeric => self.numeric.push(name),
            ColumnKind::Text => self.text.push(name),
            ColumnKind::Date => self.date.push(name),
            ColumnKind::Other => {}
        }
    }

    pub fn numeric(&self) -> &[String] {
        &self.numeric
    }

    pub fn text(&self) -> &[String] {
        &self.text
    }

    pub fn date(&self) -> &[String] {
        &self.date
    }

    pub fn names(&self, kind: ColumnKind) -> &[String] {
        match kind {
            ColumnKind::Numeric => &self.numeric,
            ColumnKind::Text => &self.text,
            ColumnKind::Date => &self.date,
            ColumnKind::Other => &[],
        }
    }

    pub fn kind_of(&self, column: &str) -> ColumnKind {
        ColumnKind::PROFILED
            .into_iter()
            .find(|kind| self.names(*kind).iter().any(|n| n == column))
            .unwrap_or(ColumnKind::Other)
    }

    pub fn is_empty(&self) -> bool {
        self.numeric.is_empty() && self.text.is_empty() && self.date.is_empty()
    }
}

/// Resolves the [`ColumnKind`] of every column in a table.
#[async_trait]
pub trait ColumnClassifier: Send + Sync + fmt::Debug {
    async fn classify(
        &self,
        store: &dyn StoreClient,
        schema: &str,
        table: &str,
    ) -> Result<ColumnClassification>;
}

/// Classifies columns with three `information_schema` queries.
#[derive(Debug, Clone, Copy, Default)]
pub struct StoreClassifier;

#[async_trait]
impl ColumnClassifier for StoreClassifier {
    #[instrument(skip(self, store))]
    async fn classify(
        &self,
        store: &dyn StoreClient,
        schema: &str,
        table: &str,
    ) -> Result<ColumnClassification> {
        let oracle = store.type_oracle();
        let mut lists = Vec::with_capacity(3);
        for kind in ColumnKind::PROFILED {
            let query = queries::columns_of_kind_query(schema, table, &oracle.predicate(kind))?;
            let result = store.execute(&query).await;
            lists.push(string_column(&result.column_values("column_name").unwrap_or_default()));
        }
        let date = lists.pop().unwrap_or_default();
        let text = lists.pop().unwrap_or_default();
        let numeric = lists.pop().unwrap_or_default();
        debug!(
            numeric = numeric.len(),
            text = text.len(),
            date = date.len(),
            "Classified columns"
        );
        Ok(ColumnClassification::from_lists(numeric, text, date))
    }
}

/// Returns a classification that was resolved ahead of time.
#[derive(Debug, Clone, Default)]
pub struct FixedClassifier {
    classification: ColumnClassification,
}

impl FixedClassifier {
    pub fn new(classification: ColumnClassification) -> Self {
        Self { classification }
    }
}

#[async_trait]
impl ColumnClassifier for FixedClassifier {
    async fn classify(
        &self,
        _store: &dyn StoreClient,
        _schema: &str,
        _table: &str,
    ) -> Result<ColumnClassification> {
        Ok(self.classification.clone())
    }
}

/// A `(schema, table)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QualifiedTable {
    pub schema: String,
    pub table: String,
}

impl fmt::Display for QualifiedTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.schema, self.table)
    }
}

/// Type metadata of one table column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub column_name: String,
    pub data_type: String,
    pub is_nullable: bool,
    pub character_maximum_length: Option<i64>,
    pub numeric_precision: Option<i64>,
    pub datetime_precision: Option<i64>,
    pub primary_key: bool,
}

/// Lists every table outside the internal schemas.
#[instrument(skip(store))]
pub async fn list_tables(store: &dyn StoreClient) -> Vec<QualifiedTable> {
    let result = store.execute(&queries::tables_list_query()).await;
    let mut tables: Vec<QualifiedTable> = (0..result.num_rows())
        .filter_map(|row| {
            let schema = result.value(row, "table_schema")?.as_str()?;
            let table = result.value(row, "table_name")?.as_str()?;
            Some(QualifiedTable {
                schema: schema.to_string(),
                table: table.to_string(),
            })
        })
        .collect();
    tables.sort();
    tables
}

/// Lists the primary-key columns of a table.
pub async fn primary_keys(store: &dyn StoreClient, schema: &str, table: &str) -> Result<Vec<String>> {
    let result = store
        .execute(&queries::primary_key_query(schema, table)?)
        .await;
    Ok(string_column(&result.column_values("column_name").unwrap_or_default()))
}

/// Lists the columns of a table with type metadata and primary-key flags.
#[instrument(skip(store))]
pub async fn describe_table(
    store: &dyn StoreClient,
    schema: &str,
    table: &str,
) -> Result<Vec<ColumnDescriptor>> {
    let result = store
        .execute(&queries::table_columns_query(schema, table)?)
        .await;
    let keys = primary_keys(store, schema, table).await?;

    let text = |row: usize, name: &str| {
        result
            .value(row, name)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };
    let number = |row: usize, name: &str| result.value(row, name).and_then(Value::as_i64);

    Ok((0..result.num_rows())
        .map(|row| {
            let column_name = text(row, "column_name");
            ColumnDescriptor {
                primary_key: keys.contains(&column_name),
                is_nullable: text(row, "is_nullable").eq_ignore_ascii_case("yes"),
                data_type: text(row, "data_type"),
                character_maximum_length: number(row, "character_maximum_length"),
                numeric_precision: number(row, "numeric_precision"),
                datetime_precision: number(row, "datetime_precision"),
                column_name,
            }
        })
        .collect())
}

fn string_column(values: &[Value]) -> Vec<String> {
    values
        .iter()
        .filter_map(|v| v.as_str().map(str::to_string))
        .collect()
}

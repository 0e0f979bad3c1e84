//! Table-level profiling: the loaded snapshot, column classification and
//! coercion, and table statistics.

use std::borrow::Cow;
use std::collections::HashSet;
use std::sync::Arc;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::catalog::{ColumnClassification, ColumnClassifier, ColumnKind, StoreClassifier};
use crate::config::{validate_preview_rows, MissingValuePolicy, ProfilerConfig};
use crate::error::{ProfileError, Result};
use crate::profile::{profiler_for, ColumnContext, ColumnIdentity, ColumnProfile, SummaryReport};
use crate::store::{parse_datetime, queries, unix_epoch, StoreClient, TabularResult, Value};

/// One column cast to the canonical type of its kind.
///
/// Nulls survive coercion; [`TypedColumn::sentinel_filled`] produces the
/// legacy display form with placeholders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypedColumn {
    name: String,
    kind: ColumnKind,
    values: Vec<Value>,
}

impl TypedColumn {
    /// Casts `raw` to the canonical type of `kind`.
    ///
    /// Numeric cells become integers when integral and floats otherwise;
    /// text cells become strings; date cells become date-times. A cell that
    /// cannot be cast fails the whole column.
    pub fn coerce(name: impl Into<String>, kind: ColumnKind, raw: &[Value]) -> Result<Self> {
        let name = name.into();
        let values = raw
            .iter()
            .map(|value| coerce_value(&name, kind, value))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { name, kind, values })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ColumnKind {
        self.kind
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn null_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_null()).count()
    }

    /// The values with nulls replaced by the kind's sentinel.
    pub fn sentinel_filled(&self) -> Vec<Value> {
        let sentinel = sentinel(self.kind);
        self.values
            .iter()
            .map(|v| if v.is_null() { sentinel.clone() } else { v.clone() })
            .collect()
    }

    /// The values a column profile borrows under `policy`.
    pub fn view(&self, policy: MissingValuePolicy) -> Cow<'_, [Value]> {
        match policy {
            MissingValuePolicy::Preserve => Cow::Borrowed(&self.values),
            MissingValuePolicy::SentinelFill => Cow::Owned(self.sentinel_filled()),
        }
    }
}

/// Placeholder for a missing cell: `0`, a single space, or the Unix epoch.
pub fn sentinel(kind: ColumnKind) -> Value {
    match kind {
        ColumnKind::Numeric => Value::Integer(0),
        ColumnKind::Text => Value::text(" "),
        ColumnKind::Date => Value::DateTime(unix_epoch()),
        ColumnKind::Other => Value::Null,
    }
}

fn coerce_value(column: &str, kind: ColumnKind, value: &Value) -> Result<Value> {
    if value.is_null() {
        return Ok(Value::Null);
    }
    let fail = || ProfileError::coercion(column, value, kind);
    match kind {
        ColumnKind::Numeric => match value {
            Value::Integer(_) => Ok(value.clone()),
            Value::Boolean(b) => Ok(Value::Integer(i64::from(*b))),
            Value::Float(f) => Ok(normalize_number(f.0)),
            Value::Text(text) => {
                let text = text.trim();
                text.parse::<i64>()
                    .map(Value::Integer)
                    .or_else(|_| text.parse::<f64>().map(normalize_number))
                    .map_err(|_| fail())
            }
            _ => Err(fail()),
        },
        ColumnKind::Text => match value {
            Value::Text(_) => Ok(value.clone()),
            other => Ok(Value::text(other.to_string())),
        },
        ColumnKind::Date => match value {
            Value::DateTime(_) => Ok(value.clone()),
            Value::Text(text) => parse_datetime(text).map(Value::DateTime).ok_or_else(fail),
            _ => Err(fail()),
        },
        ColumnKind::Other => Ok(value.clone()),
    }
}

fn normalize_number(n: f64) -> Value {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        Value::Integer(n as i64)
    } else {
        Value::float(n)
    }
}

/// Counts describing the loaded snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableStats {
    pub row_count: usize,
    pub column_count: usize,
    /// Rows equal, cell by cell, to an earlier row.
    pub duplicate_row_count: usize,
    /// Null cells across the whole snapshot.
    pub missing_cell_count: usize,
}

impl TableStats {
    /// Computes the counts from raw, uncoerced rows.
    pub fn from_snapshot(snapshot: &TabularResult) -> Self {
        let mut seen = HashSet::with_capacity(snapshot.num_rows());
        let duplicate_row_count = snapshot
            .rows()
            .iter()
            .filter(|row| !seen.insert(row.as_slice()))
            .count();
        let missing_cell_count = snapshot
            .rows()
            .iter()
            .flatten()
            .filter(|cell| cell.is_null())
            .count();
        Self {
            row_count: snapshot.num_rows(),
            column_count: snapshot.num_columns(),
            duplicate_row_count,
            missing_cell_count,
        }
    }
}

/// A table loaded from the Tabular Store and the statistics derived from it.
///
/// The raw snapshot is never modified: coercion produces separate
/// [`TypedColumn`]s, so missing-value counts do not depend on the order the
/// steps run in.
#[derive(Debug)]
pub struct TableProfile {
    store: Arc<dyn StoreClient>,
    classifier: Arc<dyn ColumnClassifier>,
    config: ProfilerConfig,
    schema: String,
    table: String,
    snapshot: Option<TabularResult>,
    classification: ColumnClassification,
    columns: Vec<TypedColumn>,
    stats: TableStats,
}

impl TableProfile {
    pub fn new(
        store: Arc<dyn StoreClient>,
        schema: impl Into<String>,
        table: impl Into<String>,
    ) -> Self {
        Self {
            store,
            classifier: Arc::new(StoreClassifier),
            config: ProfilerConfig::default(),
            schema: schema.into(),
            table: table.into(),
            snapshot: None,
            classification: ColumnClassification::default(),
            columns: Vec::new(),
            stats: TableStats::default(),
        }
    }

    pub fn with_config(mut self, config: ProfilerConfig) -> Self {
        self.config = config;
        self
    }

    /// Replaces the store-backed classifier.
    pub fn with_classifier(mut self, classifier: Arc<dyn ColumnClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    /// Fetches the full table content as the owned snapshot.
    ///
    /// Previously derived columns and statistics are discarded.
    #[instrument(skip(self), fields(schema = %self.schema, table = %self.table))]
    pub async fn load(&mut self) -> Result<()> {
        let query = queries::table_data_query(&self.schema, &self.table)?;
        let snapshot = self.store.execute(&query).await;
        debug!(
            rows = snapshot.num_rows(),
            columns = snapshot.num_columns(),
            "Loaded table snapshot"
        );
        self.snapshot = Some(snapshot);
        self.columns.clear();
        self.stats = TableStats::default();
        Ok(())
    }

    /// Resolves the column kinds through the configured classifier.
    pub async fn classify_columns(&mut self) -> Result<()> {
        self.classification = self
            .classifier
            .classify(self.store.as_ref(), &self.schema, &self.table)
            .await?;
        Ok(())
    }

    /// Builds a typed column for every classified column of the snapshot.
    pub fn coerce_columns(&mut self) -> Result<()> {
        let snapshot = self.loaded()?;
        let mut columns = Vec::new();
        for name in snapshot.columns() {
            let kind = self.classification.kind_of(name);
            if kind == ColumnKind::Other {
                continue;
            }
            let raw = snapshot.column_values(name).unwrap_or_default();
            columns.push(TypedColumn::coerce(name.clone(), kind, &raw)?);
        }
        self.columns = columns;
        Ok(())
    }

    pub fn compute_table_stats(&mut self) -> Result<()> {
        self.stats = TableStats::from_snapshot(self.loaded()?);
        Ok(())
    }

    /// Loads, classifies and coerces the table, then computes its statistics.
    #[instrument(skip(self), fields(schema = %self.schema, table = %self.table))]
    pub async fn set_data(&mut self) -> Result<()> {
        self.load().await?;
        self.compute_table_stats()?;
        self.classify_columns().await?;
        self.coerce_columns()?;
        info!(
            rows = self.stats.row_count,
            columns = self.stats.column_count,
            duplicates = self.stats.duplicate_row_count,
            missing = self.stats.missing_cell_count,
            "Profiled table"
        );
        Ok(())
    }

    pub fn summary_report(&self) -> SummaryReport {
        SummaryReport::new()
            .with_row("Name of Table", self.table.clone())
            .with_row("Number of Rows", self.stats.row_count.to_string())
            .with_row("Number of Columns", self.stats.column_count.to_string())
            .with_row(
                "Number of Duplicated Rows",
                self.stats.duplicate_row_count.to_string(),
            )
            .with_row(
                "Number of Rows with Missing Values",
                self.stats.missing_cell_count.to_string(),
            )
    }

    /// The first `n` display rows.
    pub fn head(&self, n: usize) -> Result<TabularResult> {
        Ok(self.display_snapshot()?.head(n))
    }

    /// The first [`ProfilerConfig::preview_rows`] display rows.
    ///
    /// The row count is the presentation-layer selection and must lie in
    /// [`PREVIEW_ROW_RANGE`](crate::config::PREVIEW_ROW_RANGE).
    pub fn preview(&self) -> Result<TabularResult> {
        validate_preview_rows(self.config.preview_rows)?;
        self.head(self.config.preview_rows)
    }

    /// The last `n` display rows.
    pub fn tail(&self, n: usize) -> Result<TabularResult> {
        Ok(self.display_snapshot()?.tail(n))
    }

    /// `n` display rows drawn uniformly at random without replacement.
    pub fn sample(&self, n: usize) -> Result<TabularResult> {
        self.sample_with(n, &mut rand::rng())
    }

    pub fn sample_with<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> Result<TabularResult> {
        let display = self.display_snapshot()?;
        if n > display.num_rows() {
            return Err(ProfileError::SampleTooLarge {
                requested: n,
                available: display.num_rows(),
            });
        }
        let indices = rand::seq::index::sample(rng, display.num_rows(), n);
        Ok(display.select_rows(indices))
    }

    /// Computes a fresh profile of one classified column.
    pub async fn profile_column(&self, column: &str) -> Result<ColumnProfile> {
        let snapshot = self.loaded()?;
        let kind = self.classification.kind_of(column);
        let profiler = profiler_for(kind).ok_or_else(|| {
            if snapshot.column_index(column).is_some() {
                ProfileError::UnsupportedColumn(column.to_string())
            } else {
                ProfileError::column_not_found(&self.table, column)
            }
        })?;
        let typed = self
            .typed_column(column)
            .ok_or_else(|| ProfileError::column_not_found(&self.table, column))?;

        let identity = ColumnIdentity::new(&self.schema, &self.table, column);
        let values = typed.view(self.config.missing_values);
        let ctx = ColumnContext::new(&identity, &values, self.store.as_ref(), &self.config);
        ColumnProfile::compute(profiler.as_ref(), &ctx).await
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn config(&self) -> &ProfilerConfig {
        &self.config
    }

    pub fn stats(&self) -> TableStats {
        self.stats
    }

    pub fn row_count(&self) -> usize {
        self.stats.row_count
    }

    pub fn column_count(&self) -> usize {
        self.stats.column_count
    }

    pub fn duplicate_row_count(&self) -> usize {
        self.stats.duplicate_row_count
    }

    pub fn missing_cell_count(&self) -> usize {
        self.stats.missing_cell_count
    }

    pub fn classification(&self) -> &ColumnClassification {
        &self.classification
    }

    pub fn numeric_columns(&self) -> &[String] {
        self.classification.numeric()
    }

    pub fn text_columns(&self) -> &[String] {
        self.classification.text()
    }

    pub fn date_columns(&self) -> &[String] {
        self.classification.date()
    }

    pub fn typed_column(&self, name: &str) -> Option<&TypedColumn> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// The raw snapshot, if loaded.
    pub fn snapshot(&self) -> Option<&TabularResult> {
        self.snapshot.as_ref()
    }

    fn loaded(&self) -> Result<&TabularResult> {
        self.snapshot
            .as_ref()
            .ok_or_else(|| ProfileError::NotLoaded(format!("{}.{}", self.schema, self.table)))
    }

    /// The snapshot with typed columns sentinel-filled, as shown to users.
    fn display_snapshot(&self) -> Result<TabularResult> {
        let mut display = self.loaded()?.clone();
        for column in &self.columns {
            if let Some(index) = display.column_index(&column.name) {
                display.replace_column(index, column.sentinel_filled());
            }
        }
        Ok(display)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::FixedClassifier;
    use crate::test_fixtures::CannedStore;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn people() -> TabularResult {
        let row = |id: i64, name: Option<&str>, score: Option<&str>| {
            vec![
                Value::Integer(id),
                Value::from_option(name),
                Value::from_option(score),
            ]
        };
        TabularResult::new(
            vec!["id".into(), "name".into(), "score".into()],
            vec![
                row(1, Some("ann"), Some("1.5")),
                row(2, None, Some("2")),
                row(1, Some("ann"), Some("1.5")),
                row(3, Some("bob"), None),
                row(4, Some("cy"), Some("4")),
                row(5, Some("di"), Some("5")),
            ],
        )
    }

    fn classifier() -> Arc<dyn ColumnClassifier> {
        Arc::new(FixedClassifier::new(
            ColumnClassification::new()
                .with(ColumnKind::Numeric, "id")
                .with(ColumnKind::Text, "name")
                .with(ColumnKind::Numeric, "score"),
        ))
    }

    async fn loaded() -> TableProfile {
        let store = CannedStore::new().respond("SELECT * FROM", people());
        let mut profile =
            TableProfile::new(Arc::new(store), "public", "people").with_classifier(classifier());
        profile.set_data().await.unwrap();
        profile
    }

    #[test]
    fn test_coerce_numeric_preserves_nulls() {
        let column = TypedColumn::coerce(
            "n",
            ColumnKind::Numeric,
            &[Value::text("3"), Value::text(" 2.5 "), Value::Null, Value::float(4.0)],
        )
        .unwrap();
        assert_eq!(
            column.values(),
            [Value::Integer(3), Value::float(2.5), Value::Null, Value::Integer(4)]
        );
        assert_eq!(column.null_count(), 1);
        assert_eq!(column.sentinel_filled()[2], Value::Integer(0));
    }

    #[test]
    fn test_coerce_residue_is_an_error() {
        let err = TypedColumn::coerce("n", ColumnKind::Numeric, &[Value::text("abc")]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Cannot coerce value 'abc' in column 'n' to numeric"
        );
        assert!(TypedColumn::coerce("d", ColumnKind::Date, &[Value::Integer(5)]).is_err());
    }

    #[test]
    fn test_coerce_text_and_date() {
        let text = TypedColumn::coerce("t", ColumnKind::Text, &[Value::Integer(42), Value::Null])
            .unwrap();
        assert_eq!(text.values()[0], Value::text("42"));
        assert_eq!(text.sentinel_filled()[1], Value::text(" "));

        let dates = TypedColumn::coerce(
            "d",
            ColumnKind::Date,
            &[Value::text("2020-02-29"), Value::Null],
        )
        .unwrap();
        assert_eq!(dates.values()[0].to_string(), "2020-02-29 00:00:00");
        assert_eq!(dates.view(MissingValuePolicy::SentinelFill)[1], Value::DateTime(unix_epoch()));
        assert!(dates.view(MissingValuePolicy::Preserve)[1].is_null());
    }

    #[tokio::test]
    async fn test_table_stats() {
        let profile = loaded().await;
        assert_eq!(profile.row_count(), 6);
        assert_eq!(profile.column_count(), 3);
        assert_eq!(profile.duplicate_row_count(), 1);
        assert_eq!(profile.missing_cell_count(), 2);
        assert_eq!(profile.numeric_columns(), ["id", "score"]);

        let report = profile.summary_report();
        assert_eq!(report.value("Name of Table"), Some("people"));
        assert_eq!(report.value("Number of Duplicated Rows"), Some("1"));
        assert_eq!(report.value("Number of Rows with Missing Values"), Some("2"));
    }

    #[tokio::test]
    async fn test_stats_independent_of_step_order() {
        let store = CannedStore::new().respond("SELECT * FROM", people());
        let mut profile =
            TableProfile::new(Arc::new(store), "public", "people").with_classifier(classifier());
        profile.load().await.unwrap();
        profile.classify_columns().await.unwrap();
        profile.coerce_columns().unwrap();
        profile.compute_table_stats().unwrap();
        assert_eq!(profile.missing_cell_count(), 2);
        assert_eq!(profile.duplicate_row_count(), 1);
    }

    #[tokio::test]
    async fn test_preview_rows_are_sentinel_filled() {
        let profile = loaded().await;
        let head = profile.head(5).unwrap();
        assert_eq!(head.num_rows(), 5);
        assert_eq!(head.value(1, "name"), Some(&Value::text(" ")));
        assert_eq!(head.value(0, "score"), Some(&Value::float(1.5)));

        let tail = profile.tail(5).unwrap();
        assert_eq!(tail.value(2, "score"), Some(&Value::Integer(0)));
        assert_eq!(profile.head(1).unwrap().num_rows(), 1);
        assert_eq!(profile.tail(51).unwrap().num_rows(), 6);
        assert_eq!(profile.preview().unwrap().num_rows(), 5);
    }

    #[tokio::test]
    async fn test_preview_rejects_out_of_range_selection() {
        let mut profile = loaded().await;
        profile.config.preview_rows = 4;
        assert!(matches!(
            profile.preview(),
            Err(ProfileError::Configuration(_))
        ));
        assert_eq!(profile.head(4).unwrap().num_rows(), 4);
    }

    #[tokio::test]
    async fn test_sample() {
        let profile = loaded().await;
        let mut rng = StdRng::seed_from_u64(7);
        let sample = profile.sample_with(5, &mut rng).unwrap();
        assert_eq!(sample.num_rows(), 5);

        let ids: HashSet<_> = sample.rows().iter().map(|r| r[1].clone()).collect();
        assert!(ids.len() >= 4);

        assert_eq!(profile.sample_with(6, &mut rng).unwrap().num_rows(), 6);
        let err = profile.sample(7).unwrap_err();
        assert!(matches!(
            err,
            ProfileError::SampleTooLarge {
                requested: 7,
                available: 6
            }
        ));
    }

    #[tokio::test]
    async fn test_profile_column_missing_values() {
        let profile = loaded().await;
        let score = profile.profile_column("score").await.unwrap();
        assert_eq!(score.summary_report().value("Number of Rows with Missing Values"), Some("1"));

        let mut legacy = loaded().await;
        legacy.config.missing_values = MissingValuePolicy::SentinelFill;
        let score = legacy.profile_column("score").await.unwrap();
        assert_eq!(score.summary_report().value("Number of Rows with Missing Values"), Some("0"));
        assert_eq!(score.summary_report().value("number of Rows with 0"), Some("1"));
    }

    #[tokio::test]
    async fn test_profile_column_errors() {
        let profile = loaded().await;
        assert!(matches!(
            profile.profile_column("nope").await,
            Err(ProfileError::ColumnNotFound { .. })
        ));

        let unloaded = TableProfile::new(Arc::new(CannedStore::new()), "public", "people");
        assert!(matches!(
            unloaded.profile_column("id").await,
            Err(ProfileError::NotLoaded(_))
        ));
        assert!(unloaded.head(5).is_err());
    }

    #[tokio::test]
    async fn test_failed_load_is_an_empty_table() {
        let mut profile = TableProfile::new(Arc::new(CannedStore::new()), "public", "people")
            .with_classifier(classifier());
        profile.set_data().await.unwrap();
        let report = profile.summary_report();
        assert_eq!(report.value("Number of Rows"), Some("0"));
        assert_eq!(report.value("Number of Duplicated Rows"), Some("0"));
        assert_eq!(report.value("Number of Rows with Missing Values"), Some("0"));
    }
}

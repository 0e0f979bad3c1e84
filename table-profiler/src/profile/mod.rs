//! Column profiling.
//!
//! Every column variant is described by a [`ColumnProfiler`]: an ordered
//! registry of statistics with their report labels, a way to compute each
//! one, and a chart. [`ColumnProfile::compute`] is the single orchestrator
//! that runs a registry against one column's values.
//!
//! Some statistics are computed locally from the borrowed values, others are
//! pushed to the Tabular Store where they are cheaper or more accurate. A
//! profile is produced only once all of its statistics have succeeded.
//!
//! ```rust,no_run
//! use table_profiler::prelude::*;
//! # async fn example(store: std::sync::Arc<dyn StoreClient>) -> table_profiler::Result<()> {
//! let mut table = TableProfile::new(store, "public", "orders");
//! table.set_data().await?;
//!
//! let profile = table.profile_column("amount").await?;
//! for row in profile.summary_report().rows() {
//!     println!("{}: {}", row.description, row.value);
//! }
//! # Ok(())
//! # }
//! ```

use std::collections::BTreeMap;
use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::catalog::ColumnKind;
use crate::config::ProfilerConfig;
use crate::error::{ProfileError, Result};
use crate::store::{StoreClient, Value};

mod date;
mod frequency;
mod numeric;
mod text;

pub use date::DateProfiler;
pub use frequency::{
    Bar, ChartSeries, FrequencyRow, FrequencyTable, Histogram, HistogramBucket,
};
pub use numeric::NumericProfiler;
pub use text::TextProfiler;

/// A named column statistic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Statistic {
    UniqueCount,
    MissingCount,
    ZeroCount,
    NegativeCount,
    Mean,
    StdDev,
    Min,
    Max,
    Median,
    EmptyCount,
    Mode,
    WhitespaceCount,
    LowercaseCount,
    UppercaseCount,
    AlphabeticCount,
    DigitCount,
    WeekendCount,
    WeekdayCount,
    FutureCount,
    #[serde(rename = "epoch_1900_count")]
    Epoch1900Count,
    #[serde(rename = "epoch_1970_count")]
    Epoch1970Count,
}

impl Statistic {
    pub fn name(&self) -> &'static str {
        match self {
            Statistic::UniqueCount => "unique_count",
            Statistic::MissingCount => "missing_count",
            Statistic::ZeroCount => "zero_count",
            Statistic::NegativeCount => "negative_count",
            Statistic::Mean => "mean",
            Statistic::StdDev => "std_dev",
            Statistic::Min => "min",
            Statistic::Max => "max",
            Statistic::Median => "median",
            Statistic::EmptyCount => "empty_count",
            Statistic::Mode => "mode",
            Statistic::WhitespaceCount => "whitespace_count",
            Statistic::LowercaseCount => "lowercase_count",
            Statistic::UppercaseCount => "uppercase_count",
            Statistic::AlphabeticCount => "alphabetic_count",
            Statistic::DigitCount => "digit_count",
            Statistic::WeekendCount => "weekend_count",
            Statistic::WeekdayCount => "weekday_count",
            Statistic::FutureCount => "future_count",
            Statistic::Epoch1900Count => "epoch_1900_count",
            Statistic::Epoch1970Count => "epoch_1970_count",
        }
    }
}

impl fmt::Display for Statistic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Where a column lives.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnIdentity {
    pub schema: String,
    pub table: String,
    pub column: String,
}

impl ColumnIdentity {
    pub fn new(
        schema: impl Into<String>,
        table: impl Into<String>,
        column: impl Into<String>,
    ) -> Self {
        Self {
            schema: schema.into(),
            table: table.into(),
            column: column.into(),
        }
    }
}

impl fmt::Display for ColumnIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.schema, self.table, self.column)
    }
}

/// Everything a statistic may read: the column's borrowed values and the
/// store for source-side aggregation.
#[derive(Clone, Copy)]
pub struct ColumnContext<'a> {
    pub identity: &'a ColumnIdentity,
    pub values: &'a [Value],
    pub store: &'a dyn StoreClient,
    pub config: &'a ProfilerConfig,
}

impl fmt::Debug for ColumnContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnContext")
            .field("identity", self.identity)
            .field("values", &self.values.len())
            .field("store", &self.store)
            .finish()
    }
}

impl<'a> ColumnContext<'a> {
    pub fn new(
        identity: &'a ColumnIdentity,
        values: &'a [Value],
        store: &'a dyn StoreClient,
        config: &'a ProfilerConfig,
    ) -> Self {
        Self {
            identity,
            values,
            store,
            config,
        }
    }

    pub(crate) fn non_null(&self) -> impl Iterator<Item = &'a Value> + 'a {
        self.values.iter().filter(|v| !v.is_null())
    }

    pub(crate) fn null_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_null()).count()
    }

    /// Runs a single-row aggregate query and returns its first cell.
    ///
    /// A failed query reads as [`Value::Null`].
    pub(crate) async fn scalar(&self, query: String) -> Value {
        self.store
            .execute(&query)
            .await
            .first_value()
            .cloned()
            .unwrap_or(Value::Null)
    }

    /// Runs a counting query; a failed query reads as zero.
    pub(crate) async fn source_count(&self, query: String) -> Value {
        let count = self.scalar(query).await.as_i64().unwrap_or(0);
        Value::Integer(count)
    }
}

/// A column variant's statistic registry and computation.
#[async_trait]
pub trait ColumnProfiler: Send + Sync + fmt::Debug {
    fn kind(&self) -> ColumnKind;

    /// Statistics with their report labels, in report order.
    ///
    /// A statistic may read any statistic listed before it.
    fn registry(&self) -> &'static [(Statistic, &'static str)];

    /// Computes one statistic. `computed` holds the statistics that precede
    /// it in the registry.
    async fn compute(
        &self,
        statistic: Statistic,
        ctx: &ColumnContext<'_>,
        computed: &BTreeMap<Statistic, Value>,
    ) -> Result<Value>;

    fn chart(&self, ctx: &ColumnContext<'_>) -> ChartSeries;
}

/// The profiler for a column kind; [`ColumnKind::Other`] has none.
pub fn profiler_for(kind: ColumnKind) -> Option<Box<dyn ColumnProfiler>> {
    match kind {
        ColumnKind::Numeric => Some(Box::new(NumericProfiler)),
        ColumnKind::Text => Some(Box::new(TextProfiler)),
        ColumnKind::Date => Some(Box::new(DateProfiler)),
        ColumnKind::Other => None,
    }
}

pub(crate) fn unsupported(statistic: Statistic, kind: ColumnKind) -> ProfileError {
    ProfileError::UnsupportedStatistic {
        statistic: statistic.to_string(),
        kind,
    }
}

/// One statistic of a computed profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticEntry {
    pub statistic: Statistic,
    pub label: String,
    pub value: Value,
}

/// The computed statistics of one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnProfile {
    identity: ColumnIdentity,
    kind: ColumnKind,
    entries: Vec<StatisticEntry>,
    frequency_table: FrequencyTable,
    chart: ChartSeries,
}

impl ColumnProfile {
    /// Computes every statistic `profiler` registers, then the frequency
    /// table and the chart.
    #[instrument(skip_all, fields(column = %ctx.identity, kind = %profiler.kind(), rows = ctx.values.len()))]
    pub async fn compute(profiler: &dyn ColumnProfiler, ctx: &ColumnContext<'_>) -> Result<Self> {
        let mut computed = BTreeMap::new();
        let mut entries = Vec::with_capacity(profiler.registry().len());

        for (statistic, label) in profiler.registry() {
            let value = profiler.compute(*statistic, ctx, &computed).await?;
            debug!(statistic = %statistic, value = %value, "Computed statistic");
            computed.insert(*statistic, value.clone());
            entries.push(StatisticEntry {
                statistic: *statistic,
                label: (*label).to_string(),
                value,
            });
        }

        Ok(Self {
            identity: ctx.identity.clone(),
            kind: profiler.kind(),
            entries,
            frequency_table: FrequencyTable::rank(ctx.values, ctx.config.frequency_limit),
            chart: profiler.chart(ctx),
        })
    }

    pub fn identity(&self) -> &ColumnIdentity {
        &self.identity
    }

    pub fn kind(&self) -> ColumnKind {
        self.kind
    }

    pub fn get(&self, statistic: Statistic) -> Option<&Value> {
        self.entries
            .iter()
            .find(|e| e.statistic == statistic)
            .map(|e| &e.value)
    }

    pub fn entries(&self) -> &[StatisticEntry] {
        &self.entries
    }

    /// Statistic name to value.
    pub fn statistics(&self) -> BTreeMap<&'static str, &Value> {
        self.entries
            .iter()
            .map(|e| (e.statistic.name(), &e.value))
            .collect()
    }

    /// Label/value pairs in the variant's report order.
    pub fn summary_report(&self) -> SummaryReport {
        self.entries
            .iter()
            .fold(SummaryReport::new(), |report, e| {
                report.with_row(e.label.clone(), e.value.to_string())
            })
    }

    pub fn frequency_table(&self) -> &FrequencyTable {
        &self.frequency_table
    }

    pub fn chart(&self) -> &ChartSeries {
        &self.chart
    }
}

/// One line of a summary report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRow {
    pub description: String,
    pub value: String,
}

/// Ordered description/value pairs ready for display.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryReport {
    rows: Vec<ReportRow>,
}

impl SummaryReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_row(mut self, description: impl Into<String>, value: impl Into<String>) -> Self {
        self.rows.push(ReportRow {
            description: description.into(),
            value: value.into(),
        });
        self
    }

    pub fn rows(&self) -> &[ReportRow] {
        &self.rows
    }

    /// The value shown for a description.
    pub fn value(&self, description: &str) -> Option<&str> {
        self.rows
            .iter()
            .find(|r| r.description == description)
            .map(|r| r.value.as_str())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

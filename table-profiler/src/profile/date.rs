//! Date and time column statistics.

use std::collections::{BTreeMap, HashSet};

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};

use super::{unsupported, ChartSeries, ColumnContext, ColumnProfiler, Histogram, Statistic};
use crate::catalog::ColumnKind;
use crate::error::Result;
use crate::store::{parse_datetime, queries, unix_epoch, Value};

const REGISTRY: &[(Statistic, &str)] = &[
    (Statistic::UniqueCount, "Number of Unique Values"),
    (Statistic::MissingCount, "Number of Rows with Missing Values"),
    (Statistic::WeekendCount, "Number of Weekend Dates"),
    (Statistic::WeekdayCount, "Number of Weekday Dates"),
    (Statistic::FutureCount, "Number of Dates in Future"),
    (Statistic::Epoch1900Count, "Number of Rows with 1900-01-01"),
    (Statistic::Epoch1970Count, "Number of Rows with 1970-01-01"),
    (Statistic::Min, "Minimum Value"),
    (Statistic::Max, "Maximum Value"),
];

/// Profiles date, time and timestamp columns.
///
/// "Future" is relative to [`ProfilerConfig::reference_time`](crate::config::ProfilerConfig::reference_time).
#[derive(Debug, Clone, Copy, Default)]
pub struct DateProfiler;

#[async_trait]
impl ColumnProfiler for DateProfiler {
    fn kind(&self) -> ColumnKind {
        ColumnKind::Date
    }

    fn registry(&self) -> &'static [(Statistic, &'static str)] {
        REGISTRY
    }

    async fn compute(
        &self,
        statistic: Statistic,
        ctx: &ColumnContext<'_>,
        computed: &BTreeMap<Statistic, Value>,
    ) -> Result<Value> {
        let id = ctx.identity;
        let value = match statistic {
            Statistic::UniqueCount => {
                Value::count(ctx.non_null().collect::<HashSet<_>>().len())
            }
            Statistic::MissingCount => Value::count(ctx.null_count()),
            Statistic::WeekendCount => {
                ctx.source_count(queries::weekend_count_query(&id.schema, &id.table, &id.column)?)
                    .await
            }
            Statistic::WeekdayCount => {
                let weekend = computed
                    .get(&Statistic::WeekendCount)
                    .and_then(Value::as_i64)
                    .unwrap_or(0);
                Value::Integer((ctx.values.len() as i64 - weekend).max(0))
            }
            Statistic::FutureCount => {
                let now = ctx.config.reference_time();
                Value::count(datetimes(ctx).filter(|dt| *dt > now).count())
            }
            Statistic::Epoch1900Count => {
                let day = NaiveDate::from_ymd_opt(1900, 1, 1).unwrap_or_default();
                ctx.source_count(queries::date_count_query(
                    &id.schema, &id.table, &id.column, day,
                )?)
                .await
            }
            Statistic::Epoch1970Count => {
                let epoch = unix_epoch();
                Value::count(datetimes(ctx).filter(|dt| *dt == epoch).count())
            }
            Statistic::Min => {
                let min = ctx
                    .scalar(queries::min_query(&id.schema, &id.table, &id.column)?)
                    .await;
                as_datetime(&min).map(Value::DateTime).unwrap_or(Value::Null)
            }
            Statistic::Max => datetimes(ctx).max().map(Value::DateTime).unwrap_or(Value::Null),
            other => return Err(unsupported(other, ColumnKind::Date)),
        };
        Ok(value)
    }

    fn chart(&self, ctx: &ColumnContext<'_>) -> ChartSeries {
        let seconds: Vec<f64> = datetimes(ctx)
            .map(|dt| dt.and_utc().timestamp() as f64)
            .collect();
        ChartSeries::Histogram(Histogram::bucket(
            ctx.identity.column.clone(),
            &seconds,
            ctx.config.max_bins,
        ))
    }
}

fn datetimes<'a>(ctx: &ColumnContext<'a>) -> impl Iterator<Item = NaiveDateTime> + 'a {
    ctx.non_null().filter_map(Value::as_datetime)
}

/// Reads a source-side date, which some stores return as text.
fn as_datetime(value: &Value) -> Option<NaiveDateTime> {
    match value {
        Value::Text(text) => parse_datetime(text),
        other => other.as_datetime(),
    }
}

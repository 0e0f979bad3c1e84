//! Numeric column statistics.

use std::collections::BTreeMap;

use async_trait::async_trait;

use super::{unsupported, ChartSeries, ColumnContext, ColumnProfiler, Histogram, Statistic};
use crate::catalog::ColumnKind;
use crate::error::Result;
use crate::store::{queries, Value};

const REGISTRY: &[(Statistic, &str)] = &[
    (Statistic::UniqueCount, "Number of Unique Values"),
    (Statistic::MissingCount, "Number of Rows with Missing Values"),
    (Statistic::ZeroCount, "number of Rows with 0"),
    (Statistic::NegativeCount, "number of Rows with Negative Values"),
    (Statistic::Mean, "Average Value"),
    (Statistic::StdDev, "Standard Deviation Value"),
    (Statistic::Min, "Minimum Value"),
    (Statistic::Max, "Maximum Value"),
    (Statistic::Median, "Median Value"),
];

/// Profiles integer and floating-point columns.
#[derive(Debug, Clone, Copy, Default)]
pub struct NumericProfiler;

#[async_trait]
impl ColumnProfiler for NumericProfiler {
    fn kind(&self) -> ColumnKind {
        ColumnKind::Numeric
    }

    fn registry(&self) -> &'static [(Statistic, &'static str)] {
        REGISTRY
    }

    async fn compute(
        &self,
        statistic: Statistic,
        ctx: &ColumnContext<'_>,
        _computed: &BTreeMap<Statistic, Value>,
    ) -> Result<Value> {
        let id = ctx.identity;
        let value = match statistic {
            Statistic::UniqueCount => {
                ctx.source_count(queries::distinct_count_query(&id.schema, &id.table, &id.column)?)
                    .await
            }
            Statistic::MissingCount => Value::count(ctx.null_count()),
            Statistic::ZeroCount => {
                Value::count(numbers(ctx).filter(|(n, _)| *n == 0.0).count())
            }
            Statistic::NegativeCount => {
                ctx.source_count(queries::negative_count_query(&id.schema, &id.table, &id.column)?)
                    .await
            }
            Statistic::Mean => mean(ctx),
            Statistic::StdDev => {
                let std_dev = ctx
                    .scalar(queries::std_dev_query(&id.schema, &id.table, &id.column)?)
                    .await;
                std_dev.as_f64().map(Value::float).unwrap_or(Value::Null)
            }
            Statistic::Min => numbers(ctx)
                .min_by(|a, b| a.0.total_cmp(&b.0))
                .map(|(_, v)| v.clone())
                .unwrap_or(Value::Null),
            Statistic::Max => numbers(ctx)
                .max_by(|a, b| a.0.total_cmp(&b.0))
                .map(|(_, v)| v.clone())
                .unwrap_or(Value::Null),
            Statistic::Median => median(ctx),
            other => return Err(unsupported(other, ColumnKind::Numeric)),
        };
        Ok(value)
    }

    fn chart(&self, ctx: &ColumnContext<'_>) -> ChartSeries {
        let values: Vec<f64> = numbers(ctx).map(|(n, _)| n).collect();
        ChartSeries::Histogram(Histogram::bucket(
            ctx.identity.column.clone(),
            &values,
            ctx.config.max_bins,
        ))
    }
}

/// Non-null numeric entries with their f64 reading.
fn numbers<'a>(ctx: &ColumnContext<'a>) -> impl Iterator<Item = (f64, &'a Value)> + 'a {
    ctx.non_null().filter_map(|v| v.as_f64().map(|n| (n, v)))
}

fn mean(ctx: &ColumnContext<'_>) -> Value {
    let (sum, count) = numbers(ctx).fold((0.0, 0usize), |(sum, count), (n, _)| (sum + n, count + 1));
    if count == 0 {
        Value::Null
    } else {
        Value::float(sum / count as f64)
    }
}

fn median(ctx: &ColumnContext<'_>) -> Value {
    let mut sorted: Vec<f64> = numbers(ctx).map(|(n, _)| n).collect();
    if sorted.is_empty() {
        return Value::Null;
    }
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    let median = if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    };
    Value::float(median)
}

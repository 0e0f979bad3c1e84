//! Value-count ranking and bucketed chart series.

use std::cmp::Reverse;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::store::Value;

/// One ranked value of a frequency table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrequencyRow {
    pub value: Value,
    pub occurrence: usize,
    /// Share of all non-null entries, including values cut by truncation.
    pub percentage: f64,
}

/// Distinct values ranked by descending occurrence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrequencyTable {
    rows: Vec<FrequencyRow>,
    distinct_count: usize,
    total_count: usize,
}

impl FrequencyTable {
    /// Ranks the non-null `values` and keeps the first `limit` rows.
    ///
    /// Equal counts are ordered by ascending value. Percentages are computed
    /// before truncation, so the kept rows may sum to less than 1.
    pub fn rank(values: &[Value], limit: usize) -> Self {
        let counts = value_counts(values);
        let total_count: usize = counts.iter().map(|(_, count)| count).sum();
        let distinct_count = counts.len();

        let rows = counts
            .into_iter()
            .take(limit)
            .map(|(value, occurrence)| FrequencyRow {
                value: value.clone(),
                occurrence,
                percentage: occurrence as f64 / total_count as f64,
            })
            .collect();

        Self {
            rows,
            distinct_count,
            total_count,
        }
    }

    pub fn rows(&self) -> &[FrequencyRow] {
        &self.rows
    }

    /// Distinct non-null values before truncation.
    pub fn distinct_count(&self) -> usize {
        self.distinct_count
    }

    /// Non-null entries ranked.
    pub fn total_count(&self) -> usize {
        self.total_count
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Counts non-null values, most frequent first, ties by ascending value.
pub(crate) fn value_counts(values: &[Value]) -> Vec<(&Value, usize)> {
    let mut counts: HashMap<&Value, usize> = HashMap::new();
    for value in values.iter().filter(|v| !v.is_null()) {
        *counts.entry(value).or_default() += 1;
    }
    let mut counts: Vec<(&Value, usize)> = counts.into_iter().collect();
    counts.sort_by_key(|(value, count)| (Reverse(*count), *value));
    counts
}

/// Represents a single bucket in a histogram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramBucket {
    /// Lower bound of the bucket (inclusive).
    pub lower_bound: f64,
    /// Upper bound of the bucket (exclusive, except for the last bucket).
    pub upper_bound: f64,
    pub count: u64,
}

impl HistogramBucket {
    pub fn new(lower_bound: f64, upper_bound: f64, count: u64) -> Self {
        Self {
            lower_bound,
            upper_bound,
            count,
        }
    }

    pub fn width(&self) -> f64 {
        self.upper_bound - self.lower_bound
    }

    pub fn midpoint(&self) -> f64 {
        (self.lower_bound + self.upper_bound) / 2.0
    }
}

/// Equal-width buckets spanning the observed range of a column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Histogram {
    /// Column the series is tagged with for chart rendering.
    pub column: String,
    pub buckets: Vec<HistogramBucket>,
}

impl Histogram {
    /// Tallies `values` into at most `max_bins` buckets over `[min, max]`.
    ///
    /// Non-finite values are ignored. A constant column yields one bucket.
    pub fn bucket(column: impl Into<String>, values: &[f64], max_bins: usize) -> Self {
        let column = column.into();
        let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        let Some((min, max)) = finite.iter().fold(None, |range, &v| match range {
            None => Some((v, v)),
            Some((lo, hi)) => Some((f64::min(lo, v), f64::max(hi, v))),
        }) else {
            return Self {
                column,
                buckets: Vec::new(),
            };
        };

        if min == max {
            return Self {
                column,
                buckets: vec![HistogramBucket::new(min, max, finite.len() as u64)],
            };
        }

        let bins = max_bins.max(1).min(finite.len());
        let width = (max - min) / bins as f64;
        let mut counts = vec![0u64; bins];
        for v in &finite {
            let index = (((v - min) / width).floor() as usize).min(bins - 1);
            counts[index] += 1;
        }

        let buckets = counts
            .into_iter()
            .enumerate()
            .map(|(i, count)| {
                let lower = min + width * i as f64;
                let upper = if i + 1 == bins {
                    max
                } else {
                    min + width * (i + 1) as f64
                };
                HistogramBucket::new(lower, upper, count)
            })
            .collect();

        Self { column, buckets }
    }

    pub fn total_count(&self) -> u64 {
        self.buckets.iter().map(|b| b.count).sum()
    }
}

/// One bar of a categorical chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub value: Value,
    pub count: usize,
}

/// Chart-ready series for a column profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChartSeries {
    Histogram(Histogram),
    Bars { column: String, bars: Vec<Bar> },
}

impl ChartSeries {
    /// Record count per distinct value, most frequent first.
    pub fn bars(column: impl Into<String>, values: &[Value]) -> Self {
        let bars = value_counts(values)
            .into_iter()
            .map(|(value, count)| Bar {
                value: value.clone(),
                count,
            })
            .collect();
        ChartSeries::Bars {
            column: column.into(),
            bars,
        }
    }

    pub fn column(&self) -> &str {
        match self {
            ChartSeries::Histogram(histogram) => &histogram.column,
            ChartSeries::Bars { column, .. } => column,
        }
    }
}

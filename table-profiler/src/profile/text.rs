//! Text column statistics.

use std::collections::{BTreeMap, HashSet};

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;

use super::{unsupported, ChartSeries, ColumnContext, ColumnProfiler, Statistic};
use crate::catalog::ColumnKind;
use crate::error::Result;
use crate::store::{queries, Value};

#[allow(clippy::expect_used)]
static LOWERCASE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[a-z]").expect("Hard-coded regex pattern should be valid"));
#[allow(clippy::expect_used)]
static UPPERCASE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Z]").expect("Hard-coded regex pattern should be valid"));

const REGISTRY: &[(Statistic, &str)] = &[
    (Statistic::UniqueCount, "Number of unique values"),
    (Statistic::MissingCount, "Number of missing values"),
    (Statistic::EmptyCount, "Number of Rows with empty string"),
    (Statistic::WhitespaceCount, "Number of Rows with only whitespaces"),
    (Statistic::LowercaseCount, "Number of Rows with only lowercases"),
    (Statistic::UppercaseCount, "Number of Rows with only uppercases"),
    (Statistic::AlphabeticCount, "Number of Rows with only alphabet"),
    (Statistic::DigitCount, "Number of Rows with only numbers as characters"),
    (Statistic::Mode, "The mode value"),
];

/// Profiles character columns.
///
/// The lowercase and uppercase counts match entries that *contain* such a
/// letter, whatever their labels say.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextProfiler;

#[async_trait]
impl ColumnProfiler for TextProfiler {
    fn kind(&self) -> ColumnKind {
        ColumnKind::Text
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
                Value::count(ctx.non_null().collect::<HashSet<_>>().len())
            }
            Statistic::MissingCount => {
                ctx.source_count(queries::null_count_query(&id.schema, &id.table, &id.column)?)
                    .await
            }
            Statistic::EmptyCount => count_text(ctx, str::is_empty),
            Statistic::WhitespaceCount => {
                count_text(ctx, |s| !s.is_empty() && s.chars().all(char::is_whitespace))
            }
            Statistic::LowercaseCount => count_text(ctx, |s| LOWERCASE.is_match(s)),
            Statistic::UppercaseCount => count_text(ctx, |s| UPPERCASE.is_match(s)),
            Statistic::AlphabeticCount => {
                ctx.source_count(queries::alphabetic_count_query(
                    &id.schema, &id.table, &id.column,
                )?)
                .await
            }
            Statistic::DigitCount => {
                count_text(ctx, |s| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()))
            }
            Statistic::Mode => {
                ctx.scalar(queries::mode_query(&id.schema, &id.table, &id.column)?)
                    .await
            }
            other => return Err(unsupported(other, ColumnKind::Text)),
        };
        Ok(value)
    }

    fn chart(&self, ctx: &ColumnContext<'_>) -> ChartSeries {
        ChartSeries::bars(ctx.identity.column.clone(), ctx.values)
    }
}

fn count_text(ctx: &ColumnContext<'_>, predicate: impl Fn(&str) -> bool) -> Value {
    Value::count(
        ctx.non_null()
            .filter_map(Value::as_str)
            .filter(|s| predicate(*s))
            .count(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProfilerConfig;
    use crate::profile::{ColumnIdentity, ColumnProfile};
    use crate::test_fixtures::{scalar, CannedStore};

    async fn profile(values: &[Option<&str>], store: CannedStore) -> ColumnProfile {
        let values: Vec<Value> = values.iter().map(|v| Value::from_option(*v)).collect();
        let identity = ColumnIdentity::new("public", "people", "name");
        let config = ProfilerConfig::default();
        let ctx = ColumnContext::new(&identity, &values, &store, &config);
        ColumnProfile::compute(&TextProfiler, &ctx).await.unwrap()
    }

    #[tokio::test]
    async fn test_character_classes() {
        let values = [Some("as"), Some("WE"), Some("asdf"), Some("tech"), Some("42")];
        let profile = profile(&values, CannedStore::new()).await;
        assert_eq!(profile.get(Statistic::LowercaseCount), Some(&Value::Integer(3)));
        assert_eq!(profile.get(Statistic::UppercaseCount), Some(&Value::Integer(1)));
        assert_eq!(profile.get(Statistic::DigitCount), Some(&Value::Integer(1)));
        assert_eq!(profile.get(Statistic::UniqueCount), Some(&Value::Integer(5)));
    }

    #[tokio::test]
    async fn test_empty_and_whitespace_are_distinct() {
        let values = [Some(""), Some("   "), Some("\t"), None, Some("x y")];
        let profile = profile(&values, CannedStore::new()).await;
        assert_eq!(profile.get(Statistic::EmptyCount), Some(&Value::Integer(1)));
        assert_eq!(profile.get(Statistic::WhitespaceCount), Some(&Value::Integer(2)));
        assert_eq!(profile.get(Statistic::DigitCount), Some(&Value::Integer(0)));
    }

    #[tokio::test]
    async fn test_source_side_statistics() {
        let store = CannedStore::new()
            .respond("IS NULL", scalar("row_count", 4i64))
            .respond("~*", scalar("row_count", 2i64))
            .respond("mode_value", scalar("mode_value", "Sydney"));
        let profile = profile(&[Some("Sydney"), None], store).await;

        let report = profile.summary_report();
        assert_eq!(report.value("Number of missing values"), Some("4"));
        assert_eq!(report.value("Number of Rows with only alphabet"), Some("2"));
        assert_eq!(report.value("The mode value"), Some("Sydney"));
        assert_eq!(report.rows()[0].description, "Number of unique values");
        assert_eq!(report.rows()[8].description, "The mode value");
    }

    #[tokio::test]
    async fn test_mode_of_failed_query_is_undefined() {
        let profile = profile(&[Some("a")], CannedStore::new()).await;
        assert_eq!(profile.get(Statistic::Mode), Some(&Value::Null));
        assert_eq!(profile.summary_report().value("The mode value"), Some("N/A"));
    }

    #[tokio::test]
    async fn test_chart_counts_values() {
        let profile = profile(&[Some("b"), Some("a"), Some("b")], CannedStore::new()).await;
        let ChartSeries::Bars { column, bars } = profile.chart() else {
            panic!("text columns chart as bars");
        };
        assert_eq!(column, "name");
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].count, 2);
    }
}

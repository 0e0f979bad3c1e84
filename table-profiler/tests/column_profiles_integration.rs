//! Integration tests for numeric, text and date column profiles computed
//! against an in-memory store.

mod common;

use chrono::NaiveDate;
use table_profiler::config::ProfilerConfig;
use table_profiler::formatters::{HumanFormatter, JsonFormatter, ReportFormatter};
use table_profiler::profile::{ChartSeries, ColumnProfile, Statistic};
use table_profiler::store::Value;
use table_profiler::table::TableProfile;

async fn profile(table: &str, column: &str) -> ColumnProfile {
    let config = ProfilerConfig::builder()
        .reference_time(
            NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
        )
        .build()
        .unwrap();
    let mut table = TableProfile::new(common::shared_store().await, common::SCHEMA, table)
        .with_config(config);
    table.set_data().await.unwrap();
    table.profile_column(column).await.unwrap()
}

fn as_f64(profile: &ColumnProfile, statistic: Statistic) -> f64 {
    profile.get(statistic).and_then(Value::as_f64).unwrap()
}

#[tokio::test]
async fn test_numeric_profile() {
    let profile = profile("measurements", "value").await;

    assert_eq!(as_f64(&profile, Statistic::Mean), 4.25);
    assert_eq!(profile.get(Statistic::Min), Some(&Value::Integer(1)));
    assert_eq!(profile.get(Statistic::Max), Some(&Value::Integer(8)));
    assert_eq!(as_f64(&profile, Statistic::Median), 4.5);
    assert_eq!(profile.get(Statistic::UniqueCount), Some(&Value::Integer(7)));
    assert_eq!(profile.get(Statistic::NegativeCount), Some(&Value::Integer(0)));
    assert_eq!(profile.get(Statistic::ZeroCount), Some(&Value::Integer(0)));
    assert!((as_f64(&profile, Statistic::StdDev) - 2.2520).abs() < 1e-3);

    let report = profile.summary_report();
    assert_eq!(report.len(), 9);
    assert_eq!(report.value("Average Value"), Some("4.25"));
    assert_eq!(report.value("Median Value"), Some("4.5"));
}

#[tokio::test]
async fn test_numeric_profile_with_nulls_and_negatives() {
    let profile = profile("people", "score").await;
    assert_eq!(profile.get(Statistic::MissingCount), Some(&Value::Integer(1)));
    assert_eq!(profile.get(Statistic::NegativeCount), Some(&Value::Integer(1)));
    assert_eq!(profile.get(Statistic::ZeroCount), Some(&Value::Integer(1)));
    assert_eq!(profile.get(Statistic::Min), Some(&Value::Integer(-2)));
    assert_eq!(profile.get(Statistic::Max), Some(&Value::float(7.25)));

    let ChartSeries::Histogram(histogram) = profile.chart() else {
        panic!("numeric columns chart as histograms");
    };
    assert_eq!(histogram.column, "score");
    assert_eq!(histogram.total_count(), 5);
}

#[tokio::test]
async fn test_text_profile() {
    let profile = profile("words", "word").await;

    assert_eq!(profile.get(Statistic::LowercaseCount), Some(&Value::Integer(3)));
    assert_eq!(profile.get(Statistic::UppercaseCount), Some(&Value::Integer(1)));
    assert_eq!(profile.get(Statistic::DigitCount), Some(&Value::Integer(1)));
    assert_eq!(profile.get(Statistic::AlphabeticCount), Some(&Value::Integer(4)));
    assert_eq!(profile.get(Statistic::UniqueCount), Some(&Value::Integer(5)));
    assert_eq!(profile.get(Statistic::MissingCount), Some(&Value::Integer(0)));
    // every value occurs once; ties resolve to the smallest
    assert_eq!(profile.get(Statistic::Mode), Some(&Value::text("42")));
}

#[tokio::test]
async fn test_text_profile_counts_source_nulls() {
    let profile = profile("people", "name").await;
    let report = profile.summary_report();
    assert_eq!(report.value("Number of missing values"), Some("1"));
    assert_eq!(report.value("Number of Rows with empty string"), Some("0"));
    assert_eq!(report.value("The mode value"), Some("ann"));
    assert_eq!(report.value("Number of unique values"), Some("4"));
}

#[tokio::test]
async fn test_date_profile() {
    let profile = profile("calendar", "day").await;

    assert_eq!(profile.get(Statistic::WeekendCount), Some(&Value::Integer(2)));
    assert_eq!(profile.get(Statistic::WeekdayCount), Some(&Value::Integer(5)));
    assert_eq!(profile.get(Statistic::FutureCount), Some(&Value::Integer(0)));
    assert_eq!(profile.get(Statistic::Epoch1900Count), Some(&Value::Integer(0)));

    let report = profile.summary_report();
    assert_eq!(report.value("Minimum Value"), Some("2023-07-03 00:00:00"));
    assert_eq!(report.value("Maximum Value"), Some("2023-07-09 00:00:00"));
    assert_eq!(report.value("Number of Unique Values"), Some("7"));
}

#[tokio::test]
async fn test_timestamp_profile() {
    let profile = profile("people", "joined").await;
    assert_eq!(profile.get(Statistic::FutureCount), Some(&Value::Integer(1)));
    // 1970-01-01 09:30 is not the epoch instant itself
    assert_eq!(profile.get(Statistic::Epoch1970Count), Some(&Value::Integer(0)));
    assert_eq!(profile.get(Statistic::UniqueCount), Some(&Value::Integer(5)));
}

#[tokio::test]
async fn test_unsigned_column_beyond_i64() {
    let profile = profile("readings", "n").await;
    assert_eq!(profile.get(Statistic::Min), Some(&Value::Integer(1)));
    assert_eq!(profile.get(Statistic::Max), Some(&Value::float(u64::MAX as f64)));
    assert_eq!(profile.get(Statistic::NegativeCount), Some(&Value::Integer(0)));
    assert_eq!(profile.get(Statistic::UniqueCount), Some(&Value::Integer(3)));
    assert_eq!(profile.get(Statistic::Median), Some(&Value::float(7.0)));
}

#[tokio::test]
async fn test_time_column_is_profiled_as_date() {
    let mut table = TableProfile::new(common::shared_store().await, common::SCHEMA, "readings");
    table.set_data().await.unwrap();
    assert_eq!(table.date_columns(), ["at"]);
    assert_eq!(table.numeric_columns(), ["n"]);

    let profile = table.profile_column("at").await.unwrap();
    let report = profile.summary_report();
    assert_eq!(report.value("Number of Unique Values"), Some("2"));
    assert_eq!(report.value("Number of Rows with Missing Values"), Some("1"));
    assert_eq!(report.value("Minimum Value"), Some("1970-01-01 01:00:00"));
    assert_eq!(report.value("Maximum Value"), Some("1970-01-01 13:30:00"));
    assert_eq!(profile.get(Statistic::Epoch1970Count), Some(&Value::Integer(0)));

    let top = &profile.frequency_table().rows()[0];
    assert_eq!(top.value.to_string(), "1970-01-01 01:00:00");
    assert_eq!(top.occurrence, 2);
}

#[tokio::test]
async fn test_frequency_table() {
    let profile = profile("pairs", "n").await;
    let table = profile.frequency_table();

    assert_eq!(table.rows().len(), 5);
    for (i, row) in table.rows().iter().enumerate() {
        assert_eq!(row.value, Value::Integer(i as i64 + 1));
        assert_eq!(row.occurrence, 2);
        assert!((row.percentage - 0.2).abs() < 1e-12);
    }
}

#[tokio::test]
async fn test_profiles_are_idempotent() {
    let mut table = TableProfile::new(common::shared_store().await, common::SCHEMA, "people");
    table.set_data().await.unwrap();

    for column in ["id", "name", "score"] {
        let first = table.profile_column(column).await.unwrap();
        let second = table.profile_column(column).await.unwrap();
        assert_eq!(first.summary_report(), second.summary_report());
        assert_eq!(first.frequency_table(), second.frequency_table());
    }
}

#[tokio::test]
async fn test_profile_formatting() {
    let profile = profile("measurements", "value").await;

    let human = HumanFormatter::new().format_profile(&profile).unwrap();
    assert!(human.contains("Average Value"));
    assert!(human.contains("occurrence"));

    let json = JsonFormatter::new().format_profile(&profile).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed["column"], "value");
    assert_eq!(parsed["kind"], "numeric");
    assert_eq!(parsed["summary"]["rows"].as_array().unwrap().len(), 9);
}

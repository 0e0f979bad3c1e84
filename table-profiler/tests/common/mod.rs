//! Shared fixtures: small tables served from an in-memory DataFusion store.

#![allow(dead_code)]

use std::sync::Arc;

use arrow::array::{
    ArrayRef, BooleanArray, Date32Array, Float64Array, Int64Array, StringArray,
    Time64MicrosecondArray, TimestampMillisecondArray, UInt64Array,
};
use arrow::datatypes::{Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::NaiveDate;
use table_profiler::store::{DataFusionStore, StoreConfig};

pub const SCHEMA: &str = "public";

/// Builds a record batch from named columns.
pub fn batch(columns: Vec<(&str, ArrayRef)>) -> RecordBatch {
    let fields: Vec<Field> = columns
        .iter()
        .map(|(name, array)| Field::new(*name, array.data_type().clone(), true))
        .collect();
    let arrays = columns.into_iter().map(|(_, array)| array).collect();
    RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays).unwrap()
}

/// Days since 1970-01-01, as stored in a `Date32` column.
pub fn days(y: i32, m: u32, d: u32) -> i32 {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
    (NaiveDate::from_ymd_opt(y, m, d).unwrap() - epoch).num_days() as i32
}

/// `value`: 1, 2, 3, 8, 5, 5, 4, 6
pub fn measurements() -> RecordBatch {
    batch(vec![(
        "value",
        Arc::new(Int64Array::from(vec![1, 2, 3, 8, 5, 5, 4, 6])) as ArrayRef,
    )])
}

/// `word`: as, WE, asdf, tech, 42
pub fn words() -> RecordBatch {
    batch(vec![(
        "word",
        Arc::new(StringArray::from(vec!["as", "WE", "asdf", "tech", "42"])) as ArrayRef,
    )])
}

/// `day`: one calendar week, Monday 2023-07-03 to Sunday 2023-07-09.
pub fn calendar() -> RecordBatch {
    let week: Vec<i32> = (3..=9).map(|d| days(2023, 7, d)).collect();
    batch(vec![("day", Arc::new(Date32Array::from(week)) as ArrayRef)])
}

/// `n`: 1 to 5, each twice.
pub fn pairs() -> RecordBatch {
    batch(vec![(
        "n",
        Arc::new(Int64Array::from(vec![1, 1, 2, 2, 3, 3, 4, 4, 5, 5])) as ArrayRef,
    )])
}

/// Mixed-type table with one duplicated row and two null cells.
pub fn people() -> RecordBatch {
    let joined = |y, m, d| {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
            .and_utc()
            .timestamp_millis()
    };
    batch(vec![
        (
            "id",
            Arc::new(Int64Array::from(vec![1, 2, 3, 1, 4, 5])) as ArrayRef,
        ),
        (
            "name",
            Arc::new(StringArray::from(vec![
                Some("ann"),
                None,
                Some("cy"),
                Some("ann"),
                Some("di"),
                Some("ed"),
            ])) as ArrayRef,
        ),
        (
            "score",
            Arc::new(Float64Array::from(vec![
                Some(1.5),
                Some(-2.0),
                Some(0.0),
                Some(1.5),
                None,
                Some(7.25),
            ])) as ArrayRef,
        ),
        (
            "joined",
            Arc::new(TimestampMillisecondArray::from(vec![
                joined(2021, 1, 2),
                joined(2021, 1, 4),
                joined(1970, 1, 1),
                joined(2021, 1, 2),
                joined(2022, 6, 5),
                joined(2099, 1, 1),
            ])) as ArrayRef,
        ),
        (
            "active",
            Arc::new(BooleanArray::from(vec![true, false, true, true, false, true])) as ArrayRef,
        ),
    ])
}

/// A table whose rows are all distinct and complete.
pub fn clean() -> RecordBatch {
    batch(vec![
        (
            "id",
            Arc::new(Int64Array::from(vec![1, 2, 3])) as ArrayRef,
        ),
        (
            "label",
            Arc::new(StringArray::from(vec!["x", "y", "z"])) as ArrayRef,
        ),
    ])
}

/// `n`: unsigned counts including `u64::MAX`; `at`: times of day with a null.
pub fn readings() -> RecordBatch {
    let hours = |h: f64| Some((h * 3_600_000_000.0) as i64);
    batch(vec![
        (
            "n",
            Arc::new(UInt64Array::from(vec![u64::MAX, 1, 7, 7])) as ArrayRef,
        ),
        (
            "at",
            Arc::new(Time64MicrosecondArray::from(vec![
                hours(1.0),
                hours(13.5),
                None,
                hours(1.0),
            ])) as ArrayRef,
        ),
    ])
}

/// Opens a store serving every fixture table under [`SCHEMA`].
pub async fn fixture_store() -> DataFusionStore {
    let config = StoreConfig::new()
        .with_record_batch(SCHEMA, "measurements", measurements())
        .with_record_batch(SCHEMA, "words", words())
        .with_record_batch(SCHEMA, "calendar", calendar())
        .with_record_batch(SCHEMA, "pairs", pairs())
        .with_record_batch(SCHEMA, "people", people())
        .with_record_batch(SCHEMA, "clean", clean())
        .with_record_batch(SCHEMA, "readings", readings());
    let mut store = DataFusionStore::new(config);
    let status = store.open_connection().await;
    assert!(status.status, "{}", status.msg);
    store
}

pub async fn shared_store() -> Arc<DataFusionStore> {
    Arc::new(fixture_store().await)
}

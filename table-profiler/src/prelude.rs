//! Prelude for commonly used types and traits in table-profiler.

pub use crate::catalog::{
    describe_table, list_tables, ColumnClassification, ColumnClassifier, ColumnKind,
    FixedClassifier, StoreClassifier, TypeOracle,
};
pub use crate::config::{MissingValuePolicy, ProfilerConfig};
pub use crate::error::{ProfileError, Result};
pub use crate::formatters::{FormatterConfig, ReportFormatter};
pub use crate::profile::{ColumnProfile, FrequencyTable, Statistic, SummaryReport};
pub use crate::store::{DataFusionStore, StoreClient, StoreConfig, TabularResult, Value};
pub use crate::table::TableProfile;

//! Profiler configuration.

use std::ops::RangeInclusive;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::{ProfileError, Result};

/// Row counts a caller may request for head/tail/sample previews.
pub const PREVIEW_ROW_RANGE: RangeInclusive<usize> = 5..=50;

/// What column profiles see in place of missing cells.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingValuePolicy {
    /// Keep nulls; missing-value statistics count them.
    #[default]
    Preserve,
    /// Replace nulls with `0`, `" "` or the Unix epoch before profiling.
    SentinelFill,
}

/// Settings shared by the table profile and every column profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfilerConfig {
    /// Rows kept in a displayed frequency table.
    pub frequency_limit: usize,
    /// Upper bound on histogram buckets.
    pub max_bins: usize,
    pub missing_values: MissingValuePolicy,
    /// Instant "future" dates are compared against; `None` means now.
    pub reference_time: Option<NaiveDateTime>,
    /// Default row count for head/tail/sample.
    pub preview_rows: usize,
}

impl Default for ProfilerConfig {
    fn default() -> Self {
        Self {
            frequency_limit: 20,
            max_bins: 50,
            missing_values: MissingValuePolicy::Preserve,
            reference_time: None,
            preview_rows: *PREVIEW_ROW_RANGE.start(),
        }
    }
}

impl ProfilerConfig {
    pub fn builder() -> ProfilerConfigBuilder {
        ProfilerConfigBuilder {
            config: Self::default(),
        }
    }

    /// Parses and validates a JSON configuration. Missing keys keep defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.frequency_limit == 0 {
            return Err(ProfileError::configuration(
                "frequency_limit must be at least 1",
            ));
        }
        if self.max_bins == 0 {
            return Err(ProfileError::configuration("max_bins must be at least 1"));
        }
        validate_preview_rows(self.preview_rows)
    }

    /// The reference instant, falling back to the current UTC time.
    pub fn reference_time(&self) -> NaiveDateTime {
        self.reference_time
            .unwrap_or_else(|| chrono::Utc::now().naive_utc())
    }
}

/// Rejects preview row counts outside [`PREVIEW_ROW_RANGE`].
pub fn validate_preview_rows(rows: usize) -> Result<()> {
    if PREVIEW_ROW_RANGE.contains(&rows) {
        Ok(())
    } else {
        Err(ProfileError::configuration(format!(
            "preview row count must be between {} and {}, got {rows}",
            PREVIEW_ROW_RANGE.start(),
            PREVIEW_ROW_RANGE.end()
        )))
    }
}

/// Builder for [`ProfilerConfig`].
#[derive(Debug, Clone)]
pub struct ProfilerConfigBuilder {
    config: ProfilerConfig,
}

impl ProfilerConfigBuilder {
    pub fn frequency_limit(mut self, limit: usize) -> Self {
        self.config.frequency_limit = limit;
        self
    }

    pub fn max_bins(mut self, bins: usize) -> Self {
        self.config.max_bins = bins;
        self
    }

    pub fn missing_values(mut self, policy: MissingValuePolicy) -> Self {
        self.config.missing_values = policy;
        self
    }

    pub fn reference_time(mut self, at: NaiveDateTime) -> Self {
        self.config.reference_time = Some(at);
        self
    }

    pub fn preview_rows(mut self, rows: usize) -> Self {
        self.config.preview_rows = rows;
        self
    }

    pub fn build(self) -> Result<ProfilerConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_defaults() {
        let config = ProfilerConfig::default();
        assert_eq!(config.frequency_limit, 20);
        assert_eq!(config.max_bins, 50);
        assert_eq!(config.missing_values, MissingValuePolicy::Preserve);
        assert_eq!(config.preview_rows, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let at = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        let config = ProfilerConfig::builder()
            .max_bins(10)
            .missing_values(MissingValuePolicy::SentinelFill)
            .reference_time(at)
            .preview_rows(50)
            .build()
            .unwrap();
        assert_eq!(config.max_bins, 10);
        assert_eq!(config.reference_time(), at);

        assert!(ProfilerConfig::builder().preview_rows(51).build().is_err());
        assert!(ProfilerConfig::builder().max_bins(0).build().is_err());
    }

    #[test]
    fn test_from_json_str() {
        let config = ProfilerConfig::from_json_str(
            r#"{"missing_values": "sentinel_fill", "reference_time": "2024-01-01T00:00:00"}"#,
        )
        .unwrap();
        assert_eq!(config.missing_values, MissingValuePolicy::SentinelFill);
        assert_eq!(config.frequency_limit, 20);
        assert!(config.reference_time.is_some());

        let err = ProfilerConfig::from_json_str(r#"{"preview_rows": 2}"#).unwrap_err();
        assert!(matches!(err, ProfileError::Configuration(_)));
        assert!(ProfilerConfig::from_json_str("not json").is_err());
    }
}

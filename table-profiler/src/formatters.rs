//! Rendering of profiling reports for the presentation layer.
//!
//! Formatters turn [`SummaryReport`]s, [`FrequencyTable`]s and whole
//! [`ColumnProfile`]s into text: aligned plain text for terminals, JSON for
//! programmatic consumers, or Markdown for documentation.
//!
//! # Examples
//!
//! ```rust
//! use table_profiler::formatters::{HumanFormatter, ReportFormatter};
//! use table_profiler::profile::SummaryReport;
//!
//! let report = SummaryReport::new()
//!     .with_row("Name of Table", "orders")
//!     .with_row("Number of Rows", "0");
//! let output = HumanFormatter::new().format_summary(&report).unwrap();
//! assert!(output.contains("Number of Rows  0"));
//! ```

use serde::Serialize;

use crate::error::Result;
use crate::profile::{ColumnProfile, FrequencyTable, SummaryReport};

/// Configuration options for formatting reports.
#[derive(Debug, Clone)]
pub struct FormatterConfig {
    /// Heading printed above a report
    pub title: Option<String>,
    /// Digits after the decimal point for frequency percentages
    pub percentage_precision: usize,
    /// Whether profile output includes the frequency table
    pub include_frequency: bool,
}

impl Default for FormatterConfig {
    fn default() -> Self {
        Self {
            title: None,
            percentage_precision: 2,
            include_frequency: true,
        }
    }
}

impl FormatterConfig {
    /// Creates a configuration showing only the summary.
    pub fn minimal() -> Self {
        Self {
            include_frequency: false,
            ..Self::default()
        }
    }

    /// Creates a configuration showing everything at full precision.
    pub fn detailed() -> Self {
        Self {
            percentage_precision: 4,
            ..Self::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_percentage_precision(mut self, digits: usize) -> Self {
        self.percentage_precision = digits;
        self
    }

    pub fn with_frequency(mut self, include: bool) -> Self {
        self.include_frequency = include;
        self
    }
}

/// Trait for formatting profiling reports.
pub trait ReportFormatter {
    /// Formats label/value pairs.
    fn format_summary(&self, report: &SummaryReport) -> Result<String>;

    /// Formats a ranked value/occurrence/percentage table.
    fn format_frequency(&self, table: &FrequencyTable) -> Result<String>;

    /// Formats a column profile: its summary, then its frequency table.
    fn format_profile(&self, profile: &ColumnProfile) -> Result<String> {
        let mut output = self.format_summary(&profile.summary_report())?;
        if self.config().include_frequency {
            output.push('\n');
            output.push_str(&self.format_frequency(profile.frequency_table())?);
        }
        Ok(output)
    }

    fn config(&self) -> &FormatterConfig;
}

/// Formats reports as JSON.
#[derive(Debug, Clone)]
pub struct JsonFormatter {
    config: FormatterConfig,
    pretty: bool,
}

impl JsonFormatter {
    pub fn new() -> Self {
        Self::with_config(FormatterConfig::default())
    }

    pub fn with_config(config: FormatterConfig) -> Self {
        Self {
            config,
            pretty: true,
        }
    }

    /// Sets whether to use pretty-printed JSON.
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    fn to_json<T: Serialize + ?Sized>(&self, value: &T) -> Result<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };
        Ok(json)
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportFormatter for JsonFormatter {
    fn format_summary(&self, report: &SummaryReport) -> Result<String> {
        self.to_json(report.rows())
    }

    fn format_frequency(&self, table: &FrequencyTable) -> Result<String> {
        self.to_json(table.rows())
    }

    /// The whole profile as one JSON document.
    fn format_profile(&self, profile: &ColumnProfile) -> Result<String> {
        #[derive(Serialize)]
        struct ProfileDocument<'a> {
            column: &'a str,
            kind: String,
            summary: SummaryReport,
            #[serde(skip_serializing_if = "Option::is_none")]
            frequency: Option<&'a FrequencyTable>,
        }

        self.to_json(&ProfileDocument {
            column: &profile.identity().column,
            kind: profile.kind().to_string(),
            summary: profile.summary_report(),
            frequency: self
                .config
                .include_frequency
                .then(|| profile.frequency_table()),
        })
    }

    fn config(&self) -> &FormatterConfig {
        &self.config
    }
}

/// Formats reports as aligned plain text for console output.
#[derive(Debug, Clone, Default)]
pub struct HumanFormatter {
    config: FormatterConfig,
}

impl HumanFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: FormatterConfig) -> Self {
        Self { config }
    }

    fn heading(&self, output: &mut String) {
        if let Some(title) = &self.config.title {
            output.push_str(title);
            output.push('\n');
            output.push_str(&"=".repeat(title.chars().count()));
            output.push('\n');
        }
    }
}

impl ReportFormatter for HumanFormatter {
    fn format_summary(&self, report: &SummaryReport) -> Result<String> {
        let mut output = String::new();
        self.heading(&mut output);
        let width = report
            .rows()
            .iter()
            .map(|r| r.description.chars().count())
            .max()
            .unwrap_or(0);
        for row in report.rows() {
            output.push_str(&format!("{:<width$}  {}\n", row.description, row.value));
        }
        Ok(output)
    }

    fn format_frequency(&self, table: &FrequencyTable) -> Result<String> {
        let precision = self.config.percentage_precision;
        let cells: Vec<[String; 3]> = table
            .rows()
            .iter()
            .map(|r| {
                [
                    r.value.to_string(),
                    r.occurrence.to_string(),
                    format!("{:.precision$}", r.percentage),
                ]
            })
            .collect();
        let header = ["value", "occurrence", "percentage"];
        let widths: Vec<usize> = (0..3)
            .map(|i| {
                cells
                    .iter()
                    .map(|c| c[i].chars().count())
                    .chain(std::iter::once(header[i].len()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let mut output = format!(
            "{:<w0$}  {:>w1$}  {:>w2$}\n",
            header[0],
            header[1],
            header[2],
            w0 = widths[0],
            w1 = widths[1],
            w2 = widths[2]
        );
        for [value, occurrence, percentage] in &cells {
            output.push_str(&format!(
                "{value:<w0$}  {occurrence:>w1$}  {percentage:>w2$}\n",
                w0 = widths[0],
                w1 = widths[1],
                w2 = widths[2]
            ));
        }
        if table.distinct_count() > table.rows().len() {
            output.push_str(&format!(
                "({} of {} distinct values shown)\n",
                table.rows().len(),
                table.distinct_count()
            ));
        }
        Ok(output)
    }

    fn config(&self) -> &FormatterConfig {
        &self.config
    }
}

/// Formats reports as Markdown tables.
#[derive(Debug, Clone)]
pub struct MarkdownFormatter {
    config: FormatterConfig,
    heading_level: u8,
}

impl MarkdownFormatter {
    pub fn new() -> Self {
        Self::with_config(FormatterConfig::default())
    }

    pub fn with_config(config: FormatterConfig) -> Self {
        Self {
            config,
            heading_level: 2,
        }
    }

    /// Sets the heading level (1-6) used for the title.
    pub fn with_heading_level(mut self, level: u8) -> Self {
        self.heading_level = level.clamp(1, 6);
        self
    }
}

impl Default for MarkdownFormatter {
    fn default() -> Self {
        Self::new()
    }
}

/// Escapes the characters that would break a Markdown table cell.
fn cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}

impl ReportFormatter for MarkdownFormatter {
    fn format_summary(&self, report: &SummaryReport) -> Result<String> {
        let mut output = String::new();
        if let Some(title) = &self.config.title {
            let h = "#".repeat(self.heading_level as usize);
            output.push_str(&format!("{h} {title}\n\n"));
        }
        output.push_str("| Description | Value |\n|-------------|-------|\n");
        for row in report.rows() {
            output.push_str(&format!("| {} | {} |\n", cell(&row.description), cell(&row.value)));
        }
        Ok(output)
    }

    fn format_frequency(&self, table: &FrequencyTable) -> Result<String> {
        let precision = self.config.percentage_precision;
        let mut output =
            String::from("| Value | Occurrence | Percentage |\n|-------|------------|------------|\n");
        for row in table.rows() {
            output.push_str(&format!(
                "| {} | {} | {:.precision$} |\n",
                cell(&row.value.to_string()),
                row.occurrence,
                row.percentage
            ));
        }
        Ok(output)
    }

    fn config(&self) -> &FormatterConfig {
        &self.config
    }
}

//! Row-oriented query results.

use arrow::array::ArrayRef;
use arrow::compute::cast;
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use serde::{Deserialize, Serialize};

use super::value::Value;
use crate::error::Result;

/// The result of a single query against the Tabular Store.
///
/// Rows keep the column order reported by the query metadata. An empty result
/// (zero rows, possibly zero columns) is a valid state and is also what the
/// store returns when a query fails.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TabularResult {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl TabularResult {
    /// Creates a result from column names and rows.
    ///
    /// Every row must have one cell per column.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        debug_assert!(rows.iter().all(|row| row.len() == columns.len()));
        Self { columns, rows }
    }

    /// The result with no columns and no rows.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a result from Arrow record batches sharing one schema.
    pub fn from_batches(columns: Vec<String>, batches: &[RecordBatch]) -> Result<Self> {
        let mut rows = Vec::with_capacity(batches.iter().map(|b| b.num_rows()).sum());
        for batch in batches {
            let arrays = batch
                .columns()
                .iter()
                .map(widen)
                .collect::<Result<Vec<_>>>()?;
            for row in 0..batch.num_rows() {
                let cells = arrays
                    .iter()
                    .map(|array| Value::from_array(array.as_ref(), row))
                    .collect::<Result<Vec<_>>>()?;
                rows.push(cells);
            }
        }
        Ok(Self { columns, rows })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// True when the result holds no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Copies out the cells of one column, in row order.
    pub fn column_values(&self, name: &str) -> Option<Vec<Value>> {
        let index = self.column_index(name)?;
        Some(self.rows.iter().map(|row| row[index].clone()).collect())
    }

    /// Returns the cell at `row` in the named column.
    pub fn value(&self, row: usize, name: &str) -> Option<&Value> {
        let index = self.column_index(name)?;
        self.rows.get(row).map(|r| &r[index])
    }

    /// Returns the first cell of the first row, used by single-value queries.
    pub fn first_value(&self) -> Option<&Value> {
        self.rows.first().and_then(|row| row.first())
    }

    /// Returns the first `n` rows.
    pub fn head(&self, n: usize) -> Self {
        self.select_rows(0..n.min(self.num_rows()))
    }

    /// Returns the last `n` rows.
    pub fn tail(&self, n: usize) -> Self {
        let start = self.num_rows().saturating_sub(n);
        self.select_rows(start..self.num_rows())
    }

    /// Returns the rows at the given indices, in the order given.
    pub fn select_rows(&self, indices: impl IntoIterator<Item = usize>) -> Self {
        let rows = indices
            .into_iter()
            .filter_map(|i| self.rows.get(i).cloned())
            .collect();
        Self {
            columns: self.columns.clone(),
            rows,
        }
    }

    /// Replaces the cells of one column; `values` must have one entry per row.
    pub(crate) fn replace_column(&mut self, index: usize, values: Vec<Value>) {
        for (row, value) in self.rows.iter_mut().zip(values) {
            row[index] = value;
        }
    }
}

/// Casts array types without a direct scalar mapping to Float64.
fn widen(column: &ArrayRef) -> Result<ArrayRef> {
    match column.data_type() {
        DataType::Float16 | DataType::Decimal256(_, _) => Ok(cast(column, &DataType::Float64)?),
        _ => Ok(column.clone()),
    }
}

//! Session tables loaded from delimited telemetry files
//!
//! A session table is a set of equally long, named columns. Column types are
//! inferred from the cells: numeric, boolean-like, or free text. Empty cells
//! (and `NaN`) are missing values, never parse errors.

use crate::error::{AnalysisError, Result};
use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Name of the one column every session table must carry
pub const TIMESTAMP: &str = "timestamp";

/// Typed cell storage for one column
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Numeric(Vec<Option<f64>>),
    Boolean(Vec<Option<bool>>),
    Text(Vec<Option<String>>),
}

impl ColumnData {
    fn len(&self) -> usize {
        match self {
            ColumnData::Numeric(v) => v.len(),
            ColumnData::Boolean(v) => v.len(),
            ColumnData::Text(v) => v.len(),
        }
    }
}

/// A named column of a session table
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    data: ColumnData,
}

impl Column {
    pub fn new(name: impl Into<String>, data: ColumnData) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    /// Numeric column with no missing values
    pub fn numeric(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self::new(
            name,
            ColumnData::Numeric(values.into_iter().map(Some).collect()),
        )
    }

    /// Boolean-like column with no missing values
    pub fn boolean(name: impl Into<String>, values: Vec<bool>) -> Self {
        Self::new(
            name,
            ColumnData::Boolean(values.into_iter().map(Some).collect()),
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data(&self) -> &ColumnData {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self.data, ColumnData::Numeric(_))
    }

    /// Numeric cells, or `None` for boolean and text columns
    pub fn numeric_values(&self) -> Option<&[Option<f64>]> {
        match &self.data {
            ColumnData::Numeric(v) => Some(v),
            _ => None,
        }
    }

    /// Cells as `f64` for correlation and plotting: booleans become 0/1,
    /// text columns yield `None`.
    pub fn as_f64(&self) -> Option<Vec<Option<f64>>> {
        match &self.data {
            ColumnData::Numeric(v) => Some(v.clone()),
            ColumnData::Boolean(v) => Some(
                v.iter()
                    .map(|b| b.map(|b| if b { 1.0 } else { 0.0 }))
                    .collect(),
            ),
            ColumnData::Text(_) => None,
        }
    }
}

/// One usage session: an ordered sequence of rows stored column-wise
#[derive(Debug, Clone, PartialEq)]
pub struct SessionTable {
    name: String,
    columns: Vec<Column>,
    rows: usize,
}

impl SessionTable {
    /// Build a table from already typed columns
    ///
    /// Fails when `timestamp` is absent or not numeric, when the table has
    /// no rows, or when column lengths disagree.
    pub fn from_columns(name: impl Into<String>, columns: Vec<Column>) -> Result<Self> {
        let ts = columns
            .iter()
            .find(|c| c.name == TIMESTAMP)
            .ok_or_else(|| AnalysisError::MissingColumn(TIMESTAMP.to_string()))?;
        if !ts.is_numeric() {
            return Err(AnalysisError::NonNumericColumn(TIMESTAMP.to_string()));
        }

        let rows = ts.len();
        if rows == 0 {
            return Err(AnalysisError::EmptyTable);
        }
        if let Some(bad) = columns.iter().find(|c| c.len() != rows) {
            return Err(AnalysisError::Parse(format!(
                "column '{}' has {} values, expected {}",
                bad.name,
                bad.len(),
                rows
            )));
        }

        Ok(Self {
            name: name.into(),
            columns,
            rows,
        })
    }

    /// Load a CSV file; the table is named after the file name
    pub fn from_path(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(AnalysisError::InputNotFound(path.to_path_buf()));
        }
        let file = File::open(path).map_err(|e| AnalysisError::Parse(e.to_string()))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self::from_reader(name, file)
    }

    /// Parse CSV data with a header row
    pub fn from_reader<R: Read>(name: impl Into<String>, reader: R) -> Result<Self> {
        let name = name.into();
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
        let mut seen = HashSet::new();
        for header in &headers {
            if !seen.insert(header.as_str()) {
                return Err(AnalysisError::Parse(format!(
                    "duplicate column '{}'",
                    header
                )));
            }
        }

        let mut cells: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
        for record in rdr.records() {
            let record = record?;
            for (column, field) in cells.iter_mut().zip(record.iter()) {
                column.push(field.to_string());
            }
        }

        let columns: Vec<Column> = headers
            .into_iter()
            .zip(cells)
            .map(|(header, raw)| infer_column(header, raw))
            .collect();

        let table = Self::from_columns(name, columns)?;
        debug!(
            table = %table.name,
            rows = table.rows,
            columns = table.columns.len(),
            "session table loaded"
        );
        Ok(table)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn row_count(&self) -> usize {
        self.rows
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Numeric cells of a column that the caller requires
    ///
    /// Reading an absent column is a usage error surfaced as
    /// [`AnalysisError::MissingColumn`]; callers gate optional reads on
    /// [`crate::metrics::MetricSet`] first.
    pub fn numeric(&self, name: &str) -> Result<&[Option<f64>]> {
        let column = self
            .column(name)
            .ok_or_else(|| AnalysisError::MissingColumn(name.to_string()))?;
        column
            .numeric_values()
            .ok_or_else(|| AnalysisError::NonNumericColumn(name.to_string()))
    }

    /// Timestamp cells, in file order
    pub fn timestamps(&self) -> &[Option<f64>] {
        self.column(TIMESTAMP)
            .and_then(Column::numeric_values)
            .unwrap_or(&[])
    }

    /// Smallest and largest timestamp, ignoring missing cells
    pub fn time_range(&self) -> Option<(f64, f64)> {
        self.timestamps()
            .iter()
            .flatten()
            .fold(None, |acc, &t| match acc {
                None => Some((t, t)),
                Some((lo, hi)) => Some((lo.min(t), hi.max(t))),
            })
    }

    /// Columns eligible for descriptive statistics and histograms
    pub fn numeric_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| c.is_numeric())
    }
}

fn parse_bool(cell: &str) -> Option<bool> {
    match cell {
        "true" | "True" | "TRUE" => Some(true),
        "false" | "False" | "FALSE" => Some(false),
        _ => None,
    }
}

fn parse_number(cell: &str) -> Option<Option<f64>> {
    let value: f64 = cell.parse().ok()?;
    Some(if value.is_nan() { None } else { Some(value) })
}

/// Parse every non-empty cell, or give up on the first failure
fn parse_all<T>(raw: &[String], parse: impl Fn(&str) -> Option<Option<T>>) -> Option<Vec<Option<T>>> {
    raw.iter()
        .map(|cell| if cell.is_empty() { Some(None) } else { parse(cell) })
        .collect()
}

fn infer_column(name: String, raw: Vec<String>) -> Column {
    if let Some(values) = parse_all(&raw, parse_number) {
        return Column::new(name, ColumnData::Numeric(values));
    }
    if let Some(values) = parse_all(&raw, |cell| parse_bool(cell).map(Some)) {
        return Column::new(name, ColumnData::Boolean(values));
    }
    let values = raw
        .into_iter()
        .map(|cell| if cell.is_empty() { None } else { Some(cell) })
        .collect();
    Column::new(name, ColumnData::Text(values))
}

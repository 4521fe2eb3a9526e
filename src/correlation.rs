//! Pairwise Pearson correlation across numeric columns
//!
//! Boolean-like columns take part as 0/1; text columns are excluded. Each
//! pair uses the rows where both cells are present. Columns without variance
//! produce `NaN` entries, including on the diagonal.

use crate::metrics::Metric;
use crate::stats::round_to;
use crate::table::SessionTable;
use serde::Serialize;

/// Decimal places shown in the correlation report
pub const CORRELATION_DECIMALS: i32 = 2;

/// Symmetric correlation matrix over a table's correlatable columns
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    columns: Vec<String>,
    values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn compute(table: &SessionTable) -> Self {
        let series: Vec<(String, Vec<Option<f64>>)> = table
            .columns()
            .iter()
            .filter_map(|c| c.as_f64().map(|v| (c.name().to_string(), v)))
            .collect();

        let n = series.len();
        let mut values = vec![vec![f64::NAN; n]; n];
        for i in 0..n {
            values[i][i] = if has_variance(&series[i].1) { 1.0 } else { f64::NAN };
            for j in (i + 1)..n {
                let r = pearson(&series[i].1, &series[j].1);
                values[i][j] = r;
                values[j][i] = r;
            }
        }

        Self {
            columns: series.into_iter().map(|(name, _)| name).collect(),
            values,
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    fn index_of(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    /// Entry for a column pair; `None` when either column is absent
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.index_of(a)?;
        let j = self.index_of(b)?;
        Some(self.values[i][j])
    }

    /// Row-major values in [`Self::columns`] order
    pub fn values(&self) -> &[Vec<f64>] {
        &self.values
    }

    pub fn rounded(&self, decimals: i32) -> Self {
        Self {
            columns: self.columns.clone(),
            values: self
                .values
                .iter()
                .map(|row| row.iter().map(|&v| round_to(v, decimals)).collect())
                .collect(),
        }
    }

    /// Narrowed view over the focus metrics this matrix carries
    ///
    /// Rows are sorted by column name, columns follow the focus order, and
    /// values are rounded to [`CORRELATION_DECIMALS`].
    pub fn focus_view(&self, focus: &[Metric]) -> FocusView {
        let columns: Vec<String> = focus
            .iter()
            .map(|m| m.column().to_string())
            .filter(|name| self.index_of(name).is_some())
            .collect();
        let mut rows = columns.clone();
        rows.sort();

        let values = rows
            .iter()
            .map(|row| {
                columns
                    .iter()
                    .map(|col| {
                        let v = self.get(row, col).unwrap_or(f64::NAN);
                        round_to(v, CORRELATION_DECIMALS)
                    })
                    .collect()
            })
            .collect();

        FocusView {
            rows,
            columns,
            values,
        }
    }
}

/// Correlation report restricted to the focus metrics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FocusView {
    pub rows: Vec<String>,
    pub columns: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

impl FocusView {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, row: &str, column: &str) -> Option<f64> {
        let i = self.rows.iter().position(|r| r == row)?;
        let j = self.columns.iter().position(|c| c == column)?;
        Some(self.values[i][j])
    }

    pub fn to_table_string(&self) -> String {
        if self.is_empty() {
            return "(no focus metrics available)\n".to_string();
        }
        let row_width = self.rows.iter().map(String::len).max().unwrap_or(0);
        let widths: Vec<usize> = self.columns.iter().map(|c| c.len().max(6)).collect();

        let mut out = format!("{:row_width$}", "", row_width = row_width);
        for (col, w) in self.columns.iter().zip(&widths) {
            out.push_str(&format!(" {:>w$}", col, w = w));
        }
        out.push('\n');

        for (row, values) in self.rows.iter().zip(&self.values) {
            out.push_str(&format!("{:row_width$}", row, row_width = row_width));
            for (v, w) in values.iter().zip(&widths) {
                out.push_str(&format!(" {:>w$.2}", v, w = w));
            }
            out.push('\n');
        }
        out
    }
}

fn has_variance(values: &[Option<f64>]) -> bool {
    let mut present = values.iter().flatten();
    match present.next() {
        Some(first) => present.any(|v| v != first),
        None => false,
    }
}

/// Pearson correlation over pairwise-complete rows
pub fn pearson(x: &[Option<f64>], y: &[Option<f64>]) -> f64 {
    let pairs: Vec<(f64, f64)> = x
        .iter()
        .zip(y)
        .filter_map(|(a, b)| Some(((*a)?, (*b)?)))
        .collect();
    if pairs.len() < 2 {
        return f64::NAN;
    }

    // exact zero-variance check; sums of a constant column need not cancel
    let (x0, y0) = pairs[0];
    if pairs.iter().all(|&(a, _)| a == x0) || pairs.iter().all(|&(_, b)| b == y0) {
        return f64::NAN;
    }

    let n = pairs.len() as f64;
    let mx = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let my = pairs.iter().map(|p| p.1).sum::<f64>() / n;

    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for &(a, b) in &pairs {
        let dx = a - mx;
        let dy = b - my;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    (sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::FOCUS_METRICS;
    use crate::table::{Column, ColumnData};

    fn sample_table() -> SessionTable {
        SessionTable::from_columns(
            "s.csv",
            vec![
                Column::numeric("timestamp", vec![0.0, 1.0, 2.0, 3.0]),
                Column::numeric("speed", vec![1.0, 2.0, 3.0, 4.0]),
                Column::numeric("acceleration", vec![8.0, 6.0, 4.0, 2.0]),
                Column::numeric("fatigue_index", vec![0.5, 0.5, 0.5, 0.5]),
                Column::new(
                    "note",
                    ColumnData::Text(vec![Some("a".into()), None, None, None]),
                ),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_perfect_positive_and_negative() {
        let m = CorrelationMatrix::compute(&sample_table());
        assert!((m.get("timestamp", "speed").unwrap() - 1.0).abs() < 1e-12);
        assert!((m.get("speed", "acceleration").unwrap() + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_text_columns_excluded() {
        let m = CorrelationMatrix::compute(&sample_table());
        assert_eq!(m.len(), 4);
        assert!(m.get("note", "speed").is_none());
    }

    #[test]
    fn test_zero_variance_is_nan_including_diagonal() {
        let m = CorrelationMatrix::compute(&sample_table());
        assert!(m.get("fatigue_index", "speed").unwrap().is_nan());
        assert!(m.get("fatigue_index", "fatigue_index").unwrap().is_nan());
        assert_eq!(m.get("speed", "speed"), Some(1.0));
    }

    #[test]
    fn test_matrix_is_symmetric() {
        let m = CorrelationMatrix::compute(&sample_table());
        for a in m.columns() {
            for b in m.columns() {
                let ab = m.get(a, b).unwrap();
                let ba = m.get(b, a).unwrap();
                assert!(ab == ba || (ab.is_nan() && ba.is_nan()));
            }
        }
    }

    #[test]
    fn test_pairwise_complete_rows() {
        let x = [Some(1.0), Some(2.0), None, Some(3.0)];
        let y = [Some(2.0), Some(4.0), Some(100.0), Some(6.0)];
        assert!((pearson(&x, &y) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_focus_view_rows_sorted_columns_in_focus_order() {
        let m = CorrelationMatrix::compute(&sample_table());
        let view = m.focus_view(&FOCUS_METRICS);
        assert_eq!(view.columns, vec!["speed", "acceleration", "fatigue_index"]);
        assert_eq!(view.rows, vec!["acceleration", "fatigue_index", "speed"]);
        assert_eq!(view.get("speed", "acceleration"), Some(-1.0));
    }

    #[test]
    fn test_focus_view_empty_for_minimal_table() {
        let table = SessionTable::from_columns(
            "s.csv",
            vec![Column::numeric("timestamp", vec![0.0, 1.0])],
        )
        .unwrap();
        let view = CorrelationMatrix::compute(&table).focus_view(&FOCUS_METRICS);
        assert!(view.is_empty());
        assert!(view.to_table_string().contains("no focus metrics"));
    }

    #[test]
    fn test_rounded_keeps_two_decimals() {
        let table = SessionTable::from_columns(
            "s.csv",
            vec![
                Column::numeric("timestamp", vec![0.0, 1.0, 2.0]),
                Column::numeric("speed", vec![1.0, 3.0, 2.0]),
            ],
        )
        .unwrap();
        let m = CorrelationMatrix::compute(&table).rounded(2);
        assert_eq!(m.get("timestamp", "speed"), Some(0.5));
    }
}

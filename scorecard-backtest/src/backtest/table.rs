//! Backtest result table.
//!
//! One row per threshold, in input order, with the columns listed in
//! [`BacktestTable::COLUMNS`].

use polars::prelude::*;
use serde::{Deserialize, Serialize};

use super::error::BacktestResult;
use super::threshold::ThresholdMetrics;

/// Per-threshold accepted/rejected statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BacktestTable {
    rows: Vec<ThresholdMetrics>,
}

impl BacktestTable {
    /// Column names, in display order.
    pub const COLUMNS: [&'static str; 11] = [
        "thr",
        "acc_n",
        "acc_n0",
        "acc_n1",
        "acc_rate0",
        "acc_rate1",
        "rej_n",
        "rej_n0",
        "rej_n1",
        "rej_rate0",
        "rej_rate1",
    ];

    pub fn new(rows: Vec<ThresholdMetrics>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[ThresholdMetrics] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ThresholdMetrics> {
        self.rows.iter()
    }

    pub fn thresholds(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.thr).collect()
    }

    pub fn acc_n(&self) -> Vec<usize> {
        self.rows.iter().map(|r| r.acc_n).collect()
    }

    pub fn acc_rate1(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.acc_rate1).collect()
    }

    pub fn rej_n(&self) -> Vec<usize> {
        self.rows.iter().map(|r| r.rej_n).collect()
    }

    pub fn rej_rate1(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.rej_rate1).collect()
    }

    /// Values of a column by name, with counts widened to `f64`.
    pub fn column(&self, name: &str) -> Option<Vec<f64>> {
        let pick: fn(&ThresholdMetrics) -> f64 = match name {
            "thr" => |r| r.thr,
            "acc_n" => |r| r.acc_n as f64,
            "acc_n0" => |r| r.acc_n0 as f64,
            "acc_n1" => |r| r.acc_n1 as f64,
            "acc_rate0" => |r| r.acc_rate0,
            "acc_rate1" => |r| r.acc_rate1,
            "rej_n" => |r| r.rej_n as f64,
            "rej_n0" => |r| r.rej_n0 as f64,
            "rej_n1" => |r| r.rej_n1 as f64,
            "rej_rate0" => |r| r.rej_rate0,
            "rej_rate1" => |r| r.rej_rate1,
            _ => return None,
        };
        Some(self.rows.iter().map(pick).collect())
    }

    /// Export the table as a polars `DataFrame`. Empty-group rates stay NaN.
    pub fn to_dataframe(&self) -> BacktestResult<DataFrame> {
        let counts = |f: fn(&ThresholdMetrics) -> usize| -> Vec<u64> {
            self.rows.iter().map(|r| f(r) as u64).collect()
        };
        let rates = |f: fn(&ThresholdMetrics) -> f64| -> Vec<f64> { self.rows.iter().map(f).collect() };

        let df = df!(
            "thr" => self.thresholds(),
            "acc_n" => counts(|r| r.acc_n),
            "acc_n0" => counts(|r| r.acc_n0),
            "acc_n1" => counts(|r| r.acc_n1),
            "acc_rate0" => rates(|r| r.acc_rate0),
            "acc_rate1" => rates(|r| r.acc_rate1),
            "rej_n" => counts(|r| r.rej_n),
            "rej_n0" => counts(|r| r.rej_n0),
            "rej_n1" => counts(|r| r.rej_n1),
            "rej_rate0" => rates(|r| r.rej_rate0),
            "rej_rate1" => rates(|r| r.rej_rate1)
        )?;
        Ok(df)
    }

    /// Generate a plain-text report. Rates of empty groups print as `-`.
    pub fn summary(&self) -> String {
        let mut out = format!(
            "Threshold Backtest\n\
             ==================\n\
             {:>8} | {:>8} {:>8} {:>8} | {:>8} {:>8} {:>8}\n",
            "thr", "acc_n", "acc_bad", "acc_br", "rej_n", "rej_bad", "rej_br"
        );
        for row in &self.rows {
            out.push_str(&format!(
                "{:>8.4} | {:>8} {:>8} {:>8} | {:>8} {:>8} {:>8}\n",
                row.thr,
                row.acc_n,
                row.acc_n1,
                format_rate(row.acc_rate1),
                row.rej_n,
                row.rej_n1,
                format_rate(row.rej_rate1),
            ));
        }
        out
    }
}

fn format_rate(rate: f64) -> String {
    if rate.is_nan() {
        "-".to_string()
    } else {
        format!("{:.2}%", rate * 100.0)
    }
}

impl<'a> IntoIterator for &'a BacktestTable {
    type Item = &'a ThresholdMetrics;
    type IntoIter = std::slice::Iter<'a, ThresholdMetrics>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backtest::backtest;

    fn sample() -> BacktestTable {
        backtest(&[0, 0, 1, 1], &[0.1, 0.4, 0.6, 0.9], &[0.05, 0.5, 0.95], true).unwrap()
    }

    #[test]
    fn test_column_lookup() {
        let table = sample();
        assert_eq!(table.column("acc_n").unwrap(), vec![0.0, 2.0, 4.0]);
        assert_eq!(table.column("thr").unwrap(), vec![0.05, 0.5, 0.95]);
        assert!(table.column("missing").is_none());
    }

    #[test]
    fn test_every_column_resolves() {
        let table = sample();
        for name in BacktestTable::COLUMNS {
            assert_eq!(table.column(name).map(|c| c.len()), Some(3), "{}", name);
        }
    }

    #[test]
    fn test_summary_marks_empty_groups() {
        let summary = sample().summary();
        assert!(summary.starts_with("Threshold Backtest"));
        assert!(summary.contains('-'));
        assert!(summary.contains("100.00%"));
        assert_eq!(summary.lines().count(), 3 + 3);
    }

    #[test]
    fn test_to_dataframe_shape() {
        let df = sample().to_dataframe().unwrap();
        assert_eq!(df.height(), 3);
        assert_eq!(df.width(), BacktestTable::COLUMNS.len());

        let names: Vec<String> = df.get_column_names().into_iter().map(|s| s.to_string()).collect();
        assert_eq!(names, BacktestTable::COLUMNS.to_vec());
    }

    #[test]
    fn test_empty_table() {
        let table = backtest(&[0, 1], &[0.2, 0.8], &[], true).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.to_dataframe().unwrap().height(), 0);
    }
}

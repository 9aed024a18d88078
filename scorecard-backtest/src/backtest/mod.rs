//! Threshold backtesting for binary classifiers.
//!
//! This module evaluates predicted probabilities against decision thresholds:
//! - Accepted/rejected split per threshold (strict comparison, ties rejected)
//! - Good/bad counts within each group
//! - Good/bad rates within each group (NaN for empty groups)
//! - Tabular export (text summary, polars DataFrame)

pub mod error;
pub mod table;
pub mod threshold;

pub use error::{BacktestError, BacktestResult};
pub use table::BacktestTable;
pub use threshold::{backtest, BacktestConfig, GroupStats, ThresholdBacktester, ThresholdMetrics};

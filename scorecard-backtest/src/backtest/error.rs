//! Errors raised by the threshold backtester.

use polars::prelude::PolarsError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BacktestError {
    #[error("Shape mismatch: {labels} labels but {probabilities} probabilities")]
    ShapeMismatch { labels: usize, probabilities: usize },

    #[error("Invalid label {value} at index {index} (expected 0 or 1)")]
    InvalidLabel { index: usize, value: u8 },

    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
}

pub type BacktestResult<T> = Result<T, BacktestError>;

pub mod backtest;
pub mod dates;

// Re-export commonly used types
pub use backtest::{
    backtest, BacktestConfig, BacktestError, BacktestTable, GroupStats, ThresholdBacktester,
    ThresholdMetrics,
};
pub use dates::{DateError, MonthBoundaryCalculator, DEFAULT_DATE_FORMAT};

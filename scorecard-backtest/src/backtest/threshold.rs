//! Threshold backtesting for binary risk models.
//!
//! For every decision threshold the scored population is split into an
//! accepted group and its complement, the rejected group. Each group is
//! summarised by its size, its good/bad counts and its good/bad rates.
//!
//! Acceptance uses a strict comparison in both directions:
//! - ascending risk (higher probability = riskier): accept when `p < t`
//! - descending risk: accept when `p > t`
//!
//! Ties (`p == t`) always fall into the rejected group.

use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, warn};

use super::error::{BacktestError, BacktestResult};
use super::table::BacktestTable;

/// Configuration for a threshold backtest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BacktestConfig {
    /// Higher probabilities indicate greater risk.
    #[serde(default = "default_true")]
    pub ascending_risk: bool,

    /// Reject labels other than 0 and 1 instead of trusting the caller.
    #[serde(default)]
    pub strict_labels: bool,
}

fn default_true() -> bool {
    true
}

/// NaN serializes as JSON `null`; read `null` back as NaN.
fn nan_from_null<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            ascending_risk: true,
            strict_labels: false,
        }
    }
}

/// Counts and rates for one population (accepted or rejected) at one threshold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroupStats {
    /// Observations in the group.
    pub n: usize,
    /// Good observations (label 0).
    pub n0: usize,
    /// Bad observations (label 1).
    pub n1: usize,
    /// Good rate, NaN for an empty group.
    #[serde(deserialize_with = "nan_from_null")]
    pub rate0: f64,
    /// Bad rate, NaN for an empty group.
    #[serde(deserialize_with = "nan_from_null")]
    pub rate1: f64,
}

impl GroupStats {
    /// Build group statistics from the group size and its bad count.
    ///
    /// `n1` is expected not to exceed `n`; a larger value clamps `n0` to 0.
    pub fn from_counts(n: usize, n1: usize) -> Self {
        let n0 = n.saturating_sub(n1);
        // 0 / 0 yields NaN, which marks the empty group.
        Self {
            n,
            n0,
            n1,
            rate0: n0 as f64 / n as f64,
            rate1: n1 as f64 / n as f64,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }
}

/// One row of the backtest table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdMetrics {
    #[serde(deserialize_with = "nan_from_null")]
    pub thr: f64,
    pub acc_n: usize,
    pub acc_n0: usize,
    pub acc_n1: usize,
    #[serde(deserialize_with = "nan_from_null")]
    pub acc_rate0: f64,
    #[serde(deserialize_with = "nan_from_null")]
    pub acc_rate1: f64,
    pub rej_n: usize,
    pub rej_n0: usize,
    pub rej_n1: usize,
    #[serde(deserialize_with = "nan_from_null")]
    pub rej_rate0: f64,
    #[serde(deserialize_with = "nan_from_null")]
    pub rej_rate1: f64,
}

impl ThresholdMetrics {
    pub fn new(thr: f64, accepted: GroupStats, rejected: GroupStats) -> Self {
        Self {
            thr,
            acc_n: accepted.n,
            acc_n0: accepted.n0,
            acc_n1: accepted.n1,
            acc_rate0: accepted.rate0,
            acc_rate1: accepted.rate1,
            rej_n: rejected.n,
            rej_n0: rejected.n0,
            rej_n1: rejected.n1,
            rej_rate0: rejected.rate0,
            rej_rate1: rejected.rate1,
        }
    }

    /// Statistics of the accepted population.
    pub fn accepted(&self) -> GroupStats {
        GroupStats {
            n: self.acc_n,
            n0: self.acc_n0,
            n1: self.acc_n1,
            rate0: self.acc_rate0,
            rate1: self.acc_rate1,
        }
    }

    /// Statistics of the rejected population.
    pub fn rejected(&self) -> GroupStats {
        GroupStats {
            n: self.rej_n,
            n0: self.rej_n0,
            n1: self.rej_n1,
            rate0: self.rej_rate0,
            rate1: self.rej_rate1,
        }
    }

    /// Total population at this threshold.
    pub fn total(&self) -> usize {
        self.acc_n + self.rej_n
    }
}

/// Splits a scored population into accepted/rejected groups per threshold.
#[derive(Debug, Clone, Default)]
pub struct ThresholdBacktester {
    config: BacktestConfig,
}

impl ThresholdBacktester {
    pub fn new(config: BacktestConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BacktestConfig {
        &self.config
    }

    /// Whether an observation with probability `p` is accepted at threshold `t`.
    pub fn is_accepted(&self, p: f64, t: f64) -> bool {
        if self.config.ascending_risk {
            p < t
        } else {
            p > t
        }
    }

    /// Backtest `probabilities` against every threshold in `thresholds`.
    ///
    /// `labels` and `probabilities` are aligned index for index; label 1 marks
    /// a bad observation. Rows of the returned table follow the order of
    /// `thresholds` exactly, duplicates included.
    pub fn run(
        &self,
        labels: &[u8],
        probabilities: &[f64],
        thresholds: &[f64],
    ) -> BacktestResult<BacktestTable> {
        if labels.len() != probabilities.len() {
            warn!(
                "Shape mismatch: {} labels vs {} probabilities",
                labels.len(),
                probabilities.len()
            );
            return Err(BacktestError::ShapeMismatch {
                labels: labels.len(),
                probabilities: probabilities.len(),
            });
        }

        if self.config.strict_labels {
            Self::validate_labels(labels)?;
        }

        debug!(
            "Backtesting {} observations against {} thresholds (ascending_risk={})",
            labels.len(),
            thresholds.len(),
            self.config.ascending_risk
        );

        let total = labels.len();
        let total_bad = labels.iter().filter(|&&y| y != 0).count();

        let rows = thresholds
            .iter()
            .map(|&thr| {
                let (acc_n, acc_n1) = self.count_accepted(labels, probabilities, thr);
                let accepted = GroupStats::from_counts(acc_n, acc_n1);
                let rejected = GroupStats::from_counts(total - acc_n, total_bad - acc_n1);
                ThresholdMetrics::new(thr, accepted, rejected)
            })
            .collect();

        Ok(BacktestTable::new(rows))
    }

    /// Count accepted observations and accepted bads at one threshold.
    fn count_accepted(&self, labels: &[u8], probabilities: &[f64], thr: f64) -> (usize, usize) {
        labels
            .iter()
            .zip(probabilities)
            .filter(|&(_, &p)| self.is_accepted(p, thr))
            .fold((0, 0), |(n, n1), (&y, _)| (n + 1, n1 + usize::from(y != 0)))
    }

    fn validate_labels(labels: &[u8]) -> BacktestResult<()> {
        match labels.iter().position(|&y| y > 1) {
            Some(index) => {
                warn!("Invalid label {} at index {}", labels[index], index);
                Err(BacktestError::InvalidLabel {
                    index,
                    value: labels[index],
                })
            }
            None => Ok(()),
        }
    }
}

/// Backtest with the default (non-strict) configuration.
pub fn backtest(
    labels: &[u8],
    probabilities: &[f64],
    thresholds: &[f64],
    ascending_risk: bool,
) -> BacktestResult<BacktestTable> {
    ThresholdBacktester::new(BacktestConfig {
        ascending_risk,
        ..BacktestConfig::default()
    })
    .run(labels, probabilities, thresholds)
}

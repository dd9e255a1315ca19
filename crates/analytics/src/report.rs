use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One point of a compounded return curve (0.05 == +5% since inception).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// Summary statistics for one daily return series.
///
/// This struct is the final output of the `AnalyticsEngine` and is produced
/// identically for the strategy and the benchmark.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceReport {
    pub observations: usize,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,

    // Returns
    /// Compounded: the last value of the cumulative curve.
    pub total_return: f64,
    /// Mean daily return x 252.
    pub annualized_return: f64,

    // Risk
    /// Population std of daily returns x sqrt(252).
    pub annualized_volatility: f64,
    pub sharpe_ratio: Option<f64>, // None when volatility is zero
    /// Largest peak-to-trough fall of the compounded equity, as a positive fraction.
    pub max_drawdown: f64,

    pub cumulative_curve: Vec<CurvePoint>,
}

impl PerformanceReport {
    /// The report of an empty series.
    pub fn new() -> Self {
        Self {
            observations: 0,
            start_date: None,
            end_date: None,
            total_return: 0.0,
            annualized_return: 0.0,
            annualized_volatility: 0.0,
            sharpe_ratio: None,
            max_drawdown: 0.0,
            cumulative_curve: Vec::new(),
        }
    }
}

impl Default for PerformanceReport {
    fn default() -> Self {
        Self::new()
    }
}

/// Strategy versus benchmark.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    pub strategy: PerformanceReport,
    pub benchmark: PerformanceReport,
    pub excess_total_return: f64,
    pub excess_annualized_return: f64,
    /// Dates present in both series; the active-return statistics use only these.
    pub common_days: usize,
    /// Annualized std of daily (strategy - benchmark) returns.
    pub tracking_error: f64,
    pub information_ratio: Option<f64>,
}

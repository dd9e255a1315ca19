use crate::error::AnalyticsError;
use crate::report::{Comparison, CurvePoint, PerformanceReport};
use core_types::stats::{mean, population_std, TRADING_DAYS_PER_YEAR, ZERO_STD};
use core_types::ReturnSeries;
use std::collections::BTreeMap;

/// Compounds daily returns: `prod(1 + r) - 1` at every date.
pub fn cumulative_curve(returns: &ReturnSeries) -> Vec<CurvePoint> {
    let mut growth = 1.0;
    returns
        .points()
        .iter()
        .map(|p| {
            growth *= 1.0 + p.value;
            CurvePoint {
                date: p.date,
                value: growth - 1.0,
            }
        })
        .collect()
}

fn max_drawdown(curve: &[CurvePoint]) -> f64 {
    let mut peak = 1.0_f64;
    let mut worst = 0.0_f64;
    for point in curve {
        let equity = 1.0 + point.value;
        peak = peak.max(equity);
        if peak > 0.0 {
            worst = worst.max((peak - equity) / peak);
        }
    }
    worst
}

fn sharpe(annualized_return: f64, annualized_volatility: f64) -> Option<f64> {
    (annualized_volatility > ZERO_STD).then(|| annualized_return / annualized_volatility)
}

/// A stateless calculator for deriving performance metrics from daily returns.
#[derive(Debug, Default)]
pub struct AnalyticsEngine {}

impl AnalyticsEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Summarizes one return series. Pure and deterministic; an empty series
    /// yields a zeroed report with an undefined Sharpe ratio.
    pub fn summarize(&self, returns: &ReturnSeries) -> PerformanceReport {
        let mut report = PerformanceReport::new();
        if returns.is_empty() {
            return report;
        }

        let values: Vec<f64> = returns.values().collect();
        let curve = cumulative_curve(returns);

        report.observations = values.len();
        report.start_date = returns.first_date();
        report.end_date = returns.last_date();
        report.total_return = curve.last().map_or(0.0, |p| p.value);
        report.annualized_return = mean(&values).unwrap_or(0.0) * TRADING_DAYS_PER_YEAR;
        report.annualized_volatility =
            population_std(&values).unwrap_or(0.0) * TRADING_DAYS_PER_YEAR.sqrt();
        report.sharpe_ratio = sharpe(report.annualized_return, report.annualized_volatility);
        report.max_drawdown = max_drawdown(&curve);
        report.cumulative_curve = curve;

        report
    }

    /// Summarizes both series and measures the strategy's active return on the
    /// dates they share.
    pub fn compare(
        &self,
        strategy: &ReturnSeries,
        benchmark: &ReturnSeries,
    ) -> Result<Comparison, AnalyticsError> {
        let bench_by_date: BTreeMap<_, _> = benchmark
            .points()
            .iter()
            .map(|p| (p.date, p.value))
            .collect();

        let active: Vec<f64> = strategy
            .points()
            .iter()
            .filter_map(|p| bench_by_date.get(&p.date).map(|b| p.value - b))
            .collect();

        if active.is_empty() {
            return Err(AnalyticsError::NoOverlap);
        }

        let strategy_report = self.summarize(strategy);
        let benchmark_report = self.summarize(benchmark);

        let active_return = mean(&active).unwrap_or(0.0) * TRADING_DAYS_PER_YEAR;
        let tracking_error = population_std(&active).unwrap_or(0.0) * TRADING_DAYS_PER_YEAR.sqrt();

        tracing::debug!(
            common_days = active.len(),
            tracking_error,
            "Strategy compared with benchmark"
        );

        Ok(Comparison {
            excess_total_return: strategy_report.total_return - benchmark_report.total_return,
            excess_annualized_return: strategy_report.annualized_return
                - benchmark_report.annualized_return,
            common_days: active.len(),
            tracking_error,
            information_ratio: sharpe(active_return, tracking_error),
            strategy: strategy_report,
            benchmark: benchmark_report,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use chrono::NaiveDate;
    use core_types::ReturnPoint;
    use proptest::prelude::*;

    fn series(values: &[f64]) -> ReturnSeries {
        let start = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
        ReturnSeries::new(
            values
                .iter()
                .enumerate()
                .map(|(i, &v)| ReturnPoint::new(start + chrono::Days::new(i as u64), v))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_cumulative_curve_compounds() {
        let curve = cumulative_curve(&series(&[0.01, 0.02, -0.01]));
        let values: Vec<f64> = curve.iter().map(|p| p.value).collect();

        assert_abs_diff_eq!(values[0], 0.0100, epsilon = 1e-4);
        assert_abs_diff_eq!(values[1], 0.0302, epsilon = 1e-4);
        assert_abs_diff_eq!(values[2], 0.0199, epsilon = 1e-4);
        assert_abs_diff_eq!(values[2], 1.01 * 1.02 * 0.99 - 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_summary_statistics() {
        let returns = series(&[0.01, 0.02, -0.01]);
        let report = AnalyticsEngine::new().summarize(&returns);

        let m: f64 = (0.01 + 0.02 - 0.01) / 3.0;
        let var = ((0.01 - m).powi(2) + (0.02 - m).powi(2) + (-0.01 - m).powi(2)) / 3.0;

        assert_eq!(report.observations, 3);
        assert_abs_diff_eq!(report.total_return, 1.01 * 1.02 * 0.99 - 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(report.annualized_return, m * 252.0, epsilon = 1e-12);
        assert_abs_diff_eq!(report.annualized_volatility, var.sqrt() * 252f64.sqrt(), epsilon = 1e-12);
        assert_abs_diff_eq!(
            report.sharpe_ratio.unwrap(),
            report.annualized_return / report.annualized_volatility,
            epsilon = 1e-12
        );
        assert_abs_diff_eq!(report.max_drawdown, 0.01, epsilon = 1e-12);
    }

    #[test]
    fn test_flat_series_has_undefined_sharpe() {
        let report = AnalyticsEngine::new().summarize(&series(&[0.0; 20]));
        assert_eq!(report.total_return, 0.0);
        assert_eq!(report.annualized_volatility, 0.0);
        assert!(report.sharpe_ratio.is_none());
    }

    #[test]
    fn test_empty_series() {
        let report = AnalyticsEngine::new().summarize(&ReturnSeries::empty());
        assert_eq!(report, PerformanceReport::new());
    }

    #[test]
    fn test_compare_uses_common_dates() {
        let strategy = series(&[0.02, 0.01, 0.00]);
        let benchmark = series(&[0.01, 0.01]);
        let cmp = AnalyticsEngine::new().compare(&strategy, &benchmark).unwrap();

        assert_eq!(cmp.common_days, 2);
        assert_abs_diff_eq!(
            cmp.excess_total_return,
            cmp.strategy.total_return - cmp.benchmark.total_return,
            epsilon = 1e-15
        );
        assert!(cmp.tracking_error > 0.0);
    }

    #[test]
    fn test_compare_without_overlap_fails() {
        let strategy = series(&[0.01]);
        let later = ReturnSeries::new(vec![ReturnPoint::new(
            NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
            0.01,
        )])
        .unwrap();
        assert_eq!(
            AnalyticsEngine::new().compare(&strategy, &later).unwrap_err(),
            AnalyticsError::NoOverlap
        );
    }

    proptest! {
        #[test]
        fn prop_report_curve_matches_recomputed_curve(values in prop::collection::vec(-0.1f64..0.1, 0..200)) {
            let returns = series(&values);
            let report = AnalyticsEngine::new().summarize(&returns);
            prop_assert_eq!(report.cumulative_curve, cumulative_curve(&returns));
        }
    }
}

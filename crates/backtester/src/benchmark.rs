use crate::error::BacktestError;
use chrono::{Days, NaiveDate};
use core_types::ReturnSeries;
use factors::period_returns;
use market_data::PriceRepository;

/// Calendar days fetched before `start` to find the close the first return is measured from.
const CARRY_LOOKBACK_DAYS: u64 = 14;

/// Daily close-to-close returns of a benchmark index on every day it traded in
/// `[start, end]`, the first one measured from the last close before `start`
/// (zero when there is none), as the engine books the strategy's own returns.
pub async fn load_benchmark_returns(
    repository: &dyn PriceRepository,
    benchmark: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<ReturnSeries, BacktestError> {
    let from = start
        .checked_sub_days(Days::new(CARRY_LOOKBACK_DAYS))
        .unwrap_or(NaiveDate::MIN);
    let prices = repository.get_prices(benchmark, from, end).await?;

    let calendar: Vec<NaiveDate> = prices.between(start, end).iter().map(|p| p.date).collect();
    let carry = prices.last_before(start).map(|p| p.close);
    let returns = period_returns(&prices, &calendar, carry)?;
    tracing::debug!(benchmark, days = returns.len(), "Benchmark returns loaded");
    Ok(returns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::{PricePoint, PriceSeries};
    use market_data::InMemoryPriceRepository;
    use rust_decimal_macros::dec;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 3, day).unwrap()
    }

    fn index(points: Vec<PricePoint>) -> InMemoryPriceRepository {
        InMemoryPriceRepository::new().with_series(PriceSeries::new("^NSEI", points).unwrap())
    }

    #[tokio::test]
    async fn test_benchmark_returns_start_from_prior_close() {
        let repo = index(vec![
            PricePoint::new(d(1), dec!(98)),
            PricePoint::new(d(2), dec!(100)),
            PricePoint::new(d(3), dec!(102)),
            PricePoint::new(d(6), dec!(99.96)),
        ]);

        let returns = load_benchmark_returns(&repo, "^NSEI", d(2), d(6)).await.unwrap();
        let dates: Vec<NaiveDate> = returns.dates().collect();
        assert_eq!(dates, vec![d(2), d(3), d(6)]);
        approx::assert_abs_diff_eq!(returns.points()[0].value, 100.0 / 98.0 - 1.0, epsilon = 1e-12);
        approx::assert_abs_diff_eq!(returns.points()[1].value, 0.02, epsilon = 1e-12);
        approx::assert_abs_diff_eq!(returns.points()[2].value, -0.02, epsilon = 1e-12);
    }

    #[tokio::test]
    async fn test_benchmark_without_prior_close_starts_at_zero() {
        let repo = index(vec![
            PricePoint::new(d(1), dec!(100)),
            PricePoint::new(d(2), dec!(102)),
        ]);

        let returns = load_benchmark_returns(&repo, "^NSEI", d(1), d(2)).await.unwrap();
        assert_eq!(returns.len(), 2);
        assert_eq!(returns.first_date(), Some(d(1)));
        approx::assert_abs_diff_eq!(returns.points()[0].value, 0.0);
        approx::assert_abs_diff_eq!(returns.points()[1].value, 0.02, epsilon = 1e-12);

        let missing = load_benchmark_returns(&repo, "UNKNOWN", d(1), d(2)).await;
        assert!(matches!(missing, Err(BacktestError::Data(_))));
    }
}

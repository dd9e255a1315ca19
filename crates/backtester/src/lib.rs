//! # Momn Backtester
//!
//! The rebalance loop of the momentum strategy.
//!
//! ## Architectural Principles
//!
//! - **Orchestration Only:** the engine owns the loop and the accumulating
//!   return series. Scoring lives in `factors`, weighting in `portfolio`, and
//!   prices come through the `PriceRepository` trait.
//! - **Recover, Warn, Continue:** a missing instrument or an unrankable universe
//!   becomes a [`PeriodWarning`] and the run carries on. Only an invalid request
//!   aborts.
//! - **Deterministic:** instruments are kept in ordered maps, so the same request
//!   against the same data produces an identical result.
//!
//! ## Public API
//!
//! - `BacktestEngine` / `BacktestRequest` / `EngineOptions`: run a backtest.
//! - `BacktestResult`, `PortfolioSnapshot`, `PeriodWarning`: its output.
//! - `rebalance_schedule` / `HoldingPeriod`: the period partition.
//! - `load_benchmark_returns`: the benchmark series for comparison.

pub mod benchmark;
pub mod error;
pub mod result;
pub mod schedule;

pub use benchmark::load_benchmark_returns;
pub use error::BacktestError;
pub use result::{BacktestResult, PeriodWarning, PortfolioSnapshot, WarningKind};
pub use schedule::{rebalance_schedule, HoldingPeriod};

use chrono::{Days, NaiveDate};
use core_types::{
    InstrumentId, Portfolio, PriceSeries, RankingMethod, RebalanceFrequency,
    ReturnPoint, ReturnSeries, WeightingKind,
};
use factors::{max_lookback_days, period_returns, simple_returns, FactorError, Ranker};
use futures::stream::{self, StreamExt};
use indicatif::ProgressStyle;
use market_data::{DataError, PriceRepository};
use portfolio::{create_weighting, WeightingScheme};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{Instrument, Span};
use tracing_indicatif::span_ext::IndicatifSpanExt;

/// What to backtest.
#[derive(Debug, Clone, PartialEq)]
pub struct BacktestRequest {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub frequency: RebalanceFrequency,
    pub universe: Vec<InstrumentId>,
    pub ranking_method: RankingMethod,
    pub top_n: usize,
    pub weighting: WeightingKind,
}

/// How the engine fetches and how long it may run.
#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Calendar days of price history fetched before each rebalance date.
    pub history_days: u64,
    /// Upper bound on in-flight repository calls.
    pub max_concurrency: usize,
    /// Checked between periods; `None` runs to the end date.
    pub time_budget: Option<Duration>,
    pub show_progress: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            history_days: 400,
            max_concurrency: 8,
            time_budget: None,
            show_progress: false,
        }
    }
}

/// The outcome of one holding period, merged into the run by the control loop.
struct PeriodOutcome {
    snapshot: PortfolioSnapshot,
    returns: ReturnSeries,
    warnings: Vec<PeriodWarning>,
}

/// The momentum backtest engine.
///
/// `Idle -> Ranking -> HoldingPeriod -> (Ranking | Done)`: at every rebalance
/// date the universe is fetched and ranked, the top instruments are weighted,
/// and the portfolio's daily returns are booked until the next rebalance date.
pub struct BacktestEngine {
    repository: Arc<dyn PriceRepository>,
    options: EngineOptions,
}

impl BacktestEngine {
    pub fn new(repository: Arc<dyn PriceRepository>, options: EngineOptions) -> Self {
        Self { repository, options }
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    fn validate(&self, request: &BacktestRequest) -> Result<(), BacktestError> {
        if request.start_date >= request.end_date {
            return Err(BacktestError::InvalidConfiguration(format!(
                "start date {} must be before end date {}",
                request.start_date, request.end_date
            )));
        }
        if request.universe.is_empty() {
            return Err(BacktestError::InvalidConfiguration(
                "the universe is empty".to_string(),
            ));
        }
        if self.options.max_concurrency == 0 {
            return Err(BacktestError::InvalidConfiguration(
                "max_concurrency must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Runs the backtest described by `request`.
    ///
    /// Fails only with [`BacktestError::InvalidConfiguration`] for a bad request;
    /// data problems are reported as warnings on the result.
    pub async fn run(&self, request: &BacktestRequest) -> Result<BacktestResult, BacktestError> {
        self.validate(request)?;

        let periods = rebalance_schedule(request.start_date, request.end_date, request.frequency)?;
        let universe: Vec<InstrumentId> = request
            .universe
            .iter()
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let ranker = Ranker::new(request.ranking_method);
        let weighting = create_weighting(request.weighting);

        // Rough calendar-day equivalent of the longest factor window.
        let needed_days = max_lookback_days(request.ranking_method) as u64 * 7 / 5;
        if self.options.history_days < needed_days {
            tracing::warn!(
                history_days = self.options.history_days,
                needed_days,
                "History lookback is shorter than the longest factor window; long factors will be undefined"
            );
        }

        tracing::info!(
            start = %request.start_date,
            end = %request.end_date,
            frequency = %request.frequency,
            method = %request.ranking_method,
            weighting = weighting.name(),
            instruments = universe.len(),
            periods = periods.len(),
            "Starting backtest"
        );

        // Progress is drawn on this span by the IndicatifLayer, when one is installed.
        let span = if self.options.show_progress {
            tracing::info_span!("backtest")
        } else {
            Span::none()
        };
        span.pb_set_style(
            &ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
                .progress_chars("=>-"),
        );
        span.pb_set_length(periods.len() as u64);

        let result = self
            .run_periods(&periods, &universe, request.top_n, &ranker, weighting.as_ref(), &span)
            .instrument(span.clone())
            .await?;

        tracing::info!(
            days = result.returns.len(),
            snapshots = result.snapshots.len(),
            warnings = result.warnings.len(),
            "Backtest finished"
        );

        Ok(result)
    }

    /// The control loop: one `run_period` per holding period until the end
    /// date or the time budget, whichever comes first.
    async fn run_periods(
        &self,
        periods: &[HoldingPeriod],
        universe: &[InstrumentId],
        top_n: usize,
        ranker: &Ranker,
        weighting: &dyn WeightingScheme,
        span: &Span,
    ) -> Result<BacktestResult, BacktestError> {
        let started = Instant::now();
        let mut result = BacktestResult::default();

        for period in periods {
            if let Some(budget) = self.options.time_budget {
                if started.elapsed() >= budget {
                    tracing::warn!(
                        at = %period.start,
                        completed = result.snapshots.len(),
                        "Time budget exhausted; returning partial result"
                    );
                    result.warnings.push(PeriodWarning {
                        period: *period,
                        instrument: None,
                        kind: WarningKind::BudgetExhausted,
                        message: format!(
                            "time budget of {:?} exhausted before the rebalance on {}",
                            budget, period.start
                        ),
                    });
                    break;
                }
            }

            let outcome = self.run_period(period, universe, top_n, ranker, weighting).await?;

            result.returns.append(outcome.returns)?;
            result.snapshots.push(outcome.snapshot);
            result.warnings.extend(outcome.warnings);
            span.pb_inc(1);
        }

        Ok(result)
    }

    /// Ranking then holding for a single period.
    async fn run_period(
        &self,
        period: &HoldingPeriod,
        universe: &[InstrumentId],
        top_n: usize,
        ranker: &Ranker,
        weighting: &dyn WeightingScheme,
    ) -> Result<PeriodOutcome, BacktestError> {
        let mut warnings = Vec::new();

        // --- 1. FETCH (concurrent, then barrier) ---
        let from = period
            .start
            .checked_sub_days(Days::new(self.options.history_days))
            .unwrap_or(NaiveDate::MIN);
        let to = period.last_day();
        let prices = self.fetch_universe(universe, from, to, period, &mut warnings).await;

        // --- 2. RANK ---
        let mut histories = BTreeMap::new();
        for (id, series) in &prices {
            match simple_returns(series) {
                Ok(returns) => {
                    histories.insert(id.clone(), returns);
                }
                Err(e) => warnings.push(data_warning(period, id, &e.to_string())),
            }
        }

        let ranked = match ranker.rank(period.start, &histories, top_n) {
            Ok(ranked) => ranked,
            Err(e) => {
                tracing::warn!(date = %period.start, error = %e, "Ranking failed; holding cash");
                warnings.push(PeriodWarning {
                    period: *period,
                    instrument: None,
                    kind: WarningKind::InsufficientUniverse,
                    message: e.to_string(),
                });
                Vec::new()
            }
        };

        // --- 3. CONSTRUCT ---
        let portfolio = weighting.construct(&ranked)?;
        tracing::debug!(date = %period.start, holdings = portfolio.len(), "Portfolio constructed");

        // --- 4. HOLD ---
        let calendar = trading_calendar(period, &prices);
        let returns = self.hold(period, &calendar, &portfolio, &prices, &mut warnings)?;

        Ok(PeriodOutcome {
            snapshot: PortfolioSnapshot {
                rebalance_date: period.start,
                period: *period,
                portfolio,
                ranked,
            },
            returns,
            warnings,
        })
    }

    async fn fetch_universe(
        &self,
        universe: &[InstrumentId],
        from: NaiveDate,
        to: NaiveDate,
        period: &HoldingPeriod,
        warnings: &mut Vec<PeriodWarning>,
    ) -> BTreeMap<InstrumentId, PriceSeries> {
        let fetched: Vec<(InstrumentId, Result<PriceSeries, DataError>)> =
            stream::iter(universe.iter().cloned())
                .map(|id| {
                    let repository = Arc::clone(&self.repository);
                    async move {
                        let prices = repository.get_prices(&id, from, to).await;
                        (id, prices)
                    }
                })
                .buffer_unordered(self.options.max_concurrency)
                .collect()
                .await;

        let mut prices = BTreeMap::new();
        let mut failures = Vec::new();
        for (id, outcome) in fetched {
            match outcome {
                Ok(series) => {
                    prices.insert(id, series);
                }
                Err(e) => failures.push((id, e)),
            }
        }

        // Completion order is arbitrary; warnings are reported by id.
        failures.sort_by(|a, b| a.0.cmp(&b.0));
        for (id, e) in failures {
            if !e.is_unavailable() {
                tracing::error!(instrument = %id, error = %e, "Price fetch failed");
            }
            warnings.push(data_warning(period, &id, &e.to_string()));
        }

        prices
    }

    /// Weight-sums the held instruments' daily returns over `calendar`.
    fn hold(
        &self,
        period: &HoldingPeriod,
        calendar: &[NaiveDate],
        portfolio: &Portfolio,
        prices: &BTreeMap<InstrumentId, PriceSeries>,
        warnings: &mut Vec<PeriodWarning>,
    ) -> Result<ReturnSeries, BacktestError> {
        let mut daily = vec![0.0; calendar.len()];

        for (id, &weight) in portfolio.weights() {
            if weight == 0.0 {
                continue;
            }
            let Some(series) = prices.get(id) else {
                warnings.push(data_warning(period, id, "no prices were fetched for a held instrument"));
                continue;
            };

            let carry = series.last_before(period.start).map(|p| p.close);
            match period_returns(series, calendar, carry) {
                Ok(returns) => {
                    for (slot, value) in daily.iter_mut().zip(returns.values()) {
                        *slot += weight * value;
                    }
                }
                Err(e @ FactorError::DataUnavailable { .. }) => {
                    warnings.push(data_warning(period, id, &e.to_string()));
                }
                Err(e) => return Err(e.into()),
            }
        }

        let points = calendar
            .iter()
            .zip(daily)
            .map(|(&date, value)| ReturnPoint::new(date, value))
            .collect();
        Ok(ReturnSeries::new(points)?)
    }
}

fn data_warning(period: &HoldingPeriod, instrument: &str, message: &str) -> PeriodWarning {
    tracing::warn!(
        instrument,
        period_start = %period.start,
        period_end = %period.end,
        "{}",
        message
    );
    PeriodWarning {
        period: *period,
        instrument: Some(instrument.to_string()),
        kind: WarningKind::DataUnavailable,
        message: message.to_string(),
    }
}

/// The union of dates any fetched instrument traded on inside the period,
/// falling back to weekdays when nothing traded.
fn trading_calendar(
    period: &HoldingPeriod,
    prices: &BTreeMap<InstrumentId, PriceSeries>,
) -> Vec<NaiveDate> {
    let dates: BTreeSet<NaiveDate> = prices
        .values()
        .flat_map(|s| s.between(period.start, period.last_day()))
        .map(|p| p.date)
        .collect();

    if dates.is_empty() {
        period.weekdays()
    } else {
        dates.into_iter().collect()
    }
}

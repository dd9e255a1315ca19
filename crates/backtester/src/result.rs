use crate::schedule::HoldingPeriod;
use chrono::NaiveDate;
use core_types::{InstrumentId, Portfolio, RankedInstrument, ReturnSeries};
use serde::Serialize;
use std::fmt;

/// What was held for one holding period and why.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioSnapshot {
    pub rebalance_date: NaiveDate,
    pub period: HoldingPeriod,
    pub portfolio: Portfolio,
    /// The top-N list the portfolio was built from; empty when ranking failed.
    pub ranked: Vec<RankedInstrument>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum WarningKind {
    DataUnavailable,
    InsufficientUniverse,
    BudgetExhausted,
}

impl fmt::Display for WarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WarningKind::DataUnavailable => write!(f, "DataUnavailable"),
            WarningKind::InsufficientUniverse => write!(f, "InsufficientUniverse"),
            WarningKind::BudgetExhausted => write!(f, "BudgetExhausted"),
        }
    }
}

/// A recoverable problem the engine worked around.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodWarning {
    pub period: HoldingPeriod,
    pub instrument: Option<InstrumentId>,
    pub kind: WarningKind,
    pub message: String,
}

/// The output of a backtest run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BacktestResult {
    /// Daily strategy returns, the holding periods stitched end to end.
    pub returns: ReturnSeries,
    /// One per rebalance date that was reached.
    pub snapshots: Vec<PortfolioSnapshot>,
    pub warnings: Vec<PeriodWarning>,
}

impl BacktestResult {
    pub fn warnings_of(&self, kind: WarningKind) -> impl Iterator<Item = &PeriodWarning> + '_ {
        self.warnings.iter().filter(move |w| w.kind == kind)
    }

    /// True when the time budget stopped the run before the end date.
    pub fn is_partial(&self) -> bool {
        self.warnings_of(WarningKind::BudgetExhausted).next().is_some()
    }
}

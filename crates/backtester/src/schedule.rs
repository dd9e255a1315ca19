use crate::error::BacktestError;
use chrono::{Datelike, Days, NaiveDate, Weekday};
use core_types::RebalanceFrequency;
use serde::Serialize;

/// The half-open window `[start, end)` one portfolio is held for.
///
/// The last period of a run also holds on `end`, so the periods of a schedule
/// cover the closed range `[start_date, end_date]` exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HoldingPeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub is_final: bool,
}

impl HoldingPeriod {
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && (date < self.end || (self.is_final && date == self.end))
    }

    /// The last calendar day inside the period.
    pub fn last_day(&self) -> NaiveDate {
        if self.is_final {
            self.end
        } else {
            self.end.pred_opt().unwrap_or(self.start)
        }
    }

    /// Monday to Friday inside the period; the calendar used when no instrument
    /// traded at all.
    pub fn weekdays(&self) -> Vec<NaiveDate> {
        self.start
            .iter_days()
            .take_while(|d| self.contains(*d))
            .filter(|d| !matches!(d.weekday(), Weekday::Sat | Weekday::Sun))
            .collect()
    }
}

/// Splits `[start, end]` into holding periods, one per rebalance date.
///
/// The `k`-th rebalance date is `start` plus `k` frequency steps (see
/// [`RebalanceFrequency::nth_rebalance`]), clamped to `end`, so a month-end
/// anchor stays on month ends instead of drifting to the 28th.
pub fn rebalance_schedule(
    start: NaiveDate,
    end: NaiveDate,
    frequency: RebalanceFrequency,
) -> Result<Vec<HoldingPeriod>, BacktestError> {
    if start >= end {
        return Err(BacktestError::InvalidConfiguration(format!(
            "start date {start} must be before end date {end}"
        )));
    }

    let mut periods = Vec::new();
    let mut current = start;
    let mut k = 1;
    while current < end {
        let next = frequency
            .nth_rebalance(start, k)
            .map_or(end, |d| d.min(end))
            // Never stall on a zero-length step.
            .max(current + Days::new(1));
        k += 1;
        periods.push(HoldingPeriod {
            start: current,
            end: next,
            is_final: next >= end,
        });
        current = next;
    }
    Ok(periods)
}

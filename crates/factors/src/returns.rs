//! The return calculator: turns adjusted closes into daily fractional returns.

use crate::error::FactorError;
use chrono::NaiveDate;
use core_types::{PriceSeries, ReturnPoint, ReturnSeries};
use rust_decimal::prelude::*;

fn to_f64(price: Decimal) -> Result<f64, FactorError> {
    price
        .to_f64()
        .ok_or_else(|| FactorError::Conversion(price.to_string()))
}

/// Close-to-close returns between consecutive observed points.
///
/// The first point has no prior price and is omitted, so the result is one
/// entry shorter than the input. Used for ranking history and benchmarks,
/// where there is no calendar to align against.
pub fn simple_returns(series: &PriceSeries) -> Result<ReturnSeries, FactorError> {
    let points = series.points();
    let mut out = Vec::with_capacity(points.len().saturating_sub(1));

    for w in points.windows(2) {
        let prev = to_f64(w[0].close)?;
        let curr = to_f64(w[1].close)?;
        out.push(ReturnPoint::new(w[1].date, curr / prev - 1.0));
    }

    Ok(ReturnSeries::new(out)?)
}

/// Calendar-aligned daily returns for one holding window.
///
/// `calendar` lists the expected trading days of the window in ascending order.
/// `carry` is the last close before the window, which keeps the first day of a
/// period continuous with the previous one.
///
/// - A day with a price and a known previous price returns `price / previous - 1`.
/// - A day without a price returns 0 and the previous price is kept, so the next
///   observed close books the whole move.
/// - The first observed price with no carry returns 0.
///
/// Fails with `DataUnavailable` only when the instrument has no price inside the window.
pub fn period_returns(
    series: &PriceSeries,
    calendar: &[NaiveDate],
    carry: Option<Decimal>,
) -> Result<ReturnSeries, FactorError> {
    let (Some(&start), Some(&end)) = (calendar.first(), calendar.last()) else {
        return Ok(ReturnSeries::empty());
    };

    let points = series.between(start, end);
    if points.is_empty() {
        return Err(FactorError::DataUnavailable {
            instrument: series.instrument().to_string(),
            start,
            end,
        });
    }

    let mut previous = carry.map(to_f64).transpose()?;
    let mut idx = 0;
    let mut out = Vec::with_capacity(calendar.len());

    for &date in calendar {
        // Off-calendar points are skipped without moving `previous`.
        while idx < points.len() && points[idx].date < date {
            idx += 1;
        }

        let value = match points.get(idx) {
            Some(point) if point.date == date => {
                let price = to_f64(point.close)?;
                idx += 1;
                let r = previous.map_or(0.0, |prev| price / prev - 1.0);
                previous = Some(price);
                r
            }
            _ => 0.0,
        };
        out.push(ReturnPoint::new(date, value));
    }

    Ok(ReturnSeries::new(out)?)
}

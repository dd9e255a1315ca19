use crate::error::CoreError;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Identifier of a tradable instrument, e.g. `"RELIANCE.NS"`.
pub type InstrumentId = String;

/// Tolerance used when checking that portfolio weights sum to one.
pub const WEIGHT_TOLERANCE: f64 = 1e-9;

/// One adjusted daily close.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct PricePoint {
    #[sqlx(rename = "trade_date")]
    pub date: NaiveDate,
    #[sqlx(rename = "adj_close")]
    pub close: Decimal,
}

impl PricePoint {
    pub fn new(date: NaiveDate, close: Decimal) -> Self {
        Self { date, close }
    }
}

/// An ordered, immutable series of adjusted closes for one instrument.
///
/// Dates are strictly increasing and every price is positive. The only way to
/// build one is [`PriceSeries::new`], which enforces both.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSeries {
    instrument: InstrumentId,
    points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn new(
        instrument: impl Into<InstrumentId>,
        points: Vec<PricePoint>,
    ) -> Result<Self, CoreError> {
        let instrument = instrument.into();

        for (i, point) in points.iter().enumerate() {
            if point.close <= Decimal::ZERO {
                return Err(CoreError::NonPositivePrice {
                    instrument,
                    date: point.date,
                });
            }
            if i > 0 && points[i - 1].date >= point.date {
                return Err(CoreError::UnorderedSeries {
                    instrument,
                    date: point.date,
                });
            }
        }

        Ok(Self { instrument, points })
    }

    pub fn instrument(&self) -> &str {
        &self.instrument
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }

    /// The close on exactly `date`, if the instrument traded that day.
    pub fn price_on(&self, date: NaiveDate) -> Option<Decimal> {
        self.points
            .binary_search_by_key(&date, |p| p.date)
            .ok()
            .map(|i| self.points[i].close)
    }

    /// The most recent close strictly before `date`.
    pub fn last_before(&self, date: NaiveDate) -> Option<PricePoint> {
        let idx = self.points.partition_point(|p| p.date < date);
        idx.checked_sub(1).map(|i| self.points[i])
    }

    /// Points dated strictly before `date`.
    pub fn before(&self, date: NaiveDate) -> &[PricePoint] {
        let idx = self.points.partition_point(|p| p.date < date);
        &self.points[..idx]
    }

    /// Points with `start <= date <= end`.
    pub fn between(&self, start: NaiveDate, end: NaiveDate) -> &[PricePoint] {
        let lo = self.points.partition_point(|p| p.date < start);
        let hi = self.points.partition_point(|p| p.date <= end);
        if lo >= hi { &[] } else { &self.points[lo..hi] }
    }
}

/// One daily fractional return (0.01 == +1%).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReturnPoint {
    pub date: NaiveDate,
    pub value: f64,
}

impl ReturnPoint {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

/// An ordered series of daily returns, strictly increasing by date.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReturnSeries {
    points: Vec<ReturnPoint>,
}

impl ReturnSeries {
    pub fn new(points: Vec<ReturnPoint>) -> Result<Self, CoreError> {
        if let Some(w) = points.windows(2).find(|w| w[0].date >= w[1].date) {
            return Err(CoreError::UnorderedSeries {
                instrument: "returns".to_string(),
                date: w[1].date,
            });
        }
        if let Some(p) = points.iter().find(|p| !p.value.is_finite()) {
            return Err(CoreError::Calculation(format!(
                "non-finite return on {}",
                p.date
            )));
        }
        Ok(Self { points })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn points(&self) -> &[ReturnPoint] {
        &self.points
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|p| p.value)
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.points.iter().map(|p| p.date)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }

    /// Returns dated strictly before `date`.
    pub fn before(&self, date: NaiveDate) -> &[ReturnPoint] {
        let idx = self.points.partition_point(|p| p.date < date);
        &self.points[..idx]
    }

    /// Appends a later series. Fails if `other` does not start after the current last date.
    pub fn append(&mut self, other: ReturnSeries) -> Result<(), CoreError> {
        if let (Some(last), Some(first)) = (self.last_date(), other.first_date()) {
            if first <= last {
                return Err(CoreError::UnorderedSeries {
                    instrument: "returns".to_string(),
                    date: first,
                });
            }
        }
        self.points.extend(other.points);
        Ok(())
    }
}

/// A ranked instrument and the composite score that placed it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedInstrument {
    pub instrument: InstrumentId,
    pub score: f64,
}

/// Target weights for one holding period.
///
/// Either empty (a cash position) or a set of non-negative weights summing to
/// one within [`WEIGHT_TOLERANCE`]. Ordered by instrument so iteration, and
/// therefore every weighted sum, is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Portfolio {
    weights: BTreeMap<InstrumentId, f64>,
}

impl Portfolio {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_weights(weights: BTreeMap<InstrumentId, f64>) -> Result<Self, CoreError> {
        if weights.is_empty() {
            return Ok(Self::empty());
        }
        if let Some((id, w)) = weights.iter().find(|(_, w)| !w.is_finite() || **w < 0.0) {
            return Err(CoreError::InvalidWeights(format!(
                "weight {} for '{}' is negative or not finite",
                w, id
            )));
        }
        let total: f64 = weights.values().sum();
        if (total - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(CoreError::InvalidWeights(format!(
                "weights sum to {}, expected 1.0",
                total
            )));
        }
        Ok(Self { weights })
    }

    pub fn weights(&self) -> &BTreeMap<InstrumentId, f64> {
        &self.weights
    }

    pub fn weight(&self, instrument: &str) -> Option<f64> {
        self.weights.get(instrument).copied()
    }

    pub fn instruments(&self) -> impl Iterator<Item = &InstrumentId> + '_ {
        self.weights.keys()
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn total_weight(&self) -> f64 {
        self.weights.values().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn sample_series() -> PriceSeries {
        PriceSeries::new(
            "AAA",
            vec![
                PricePoint::new(d(2023, 1, 2), dec!(100)),
                PricePoint::new(d(2023, 1, 3), dec!(101)),
                PricePoint::new(d(2023, 1, 5), dec!(99.5)),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_price_series_rejects_unordered_dates() {
        let err = PriceSeries::new(
            "AAA",
            vec![
                PricePoint::new(d(2023, 1, 3), dec!(100)),
                PricePoint::new(d(2023, 1, 3), dec!(101)),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::UnorderedSeries { .. }));
    }

    #[test]
    fn test_price_series_rejects_non_positive_price() {
        let err = PriceSeries::new("AAA", vec![PricePoint::new(d(2023, 1, 3), dec!(0))]).unwrap_err();
        assert!(matches!(err, CoreError::NonPositivePrice { .. }));
    }

    #[test]
    fn test_price_series_lookups() {
        let series = sample_series();
        assert_eq!(series.price_on(d(2023, 1, 3)), Some(dec!(101)));
        assert_eq!(series.price_on(d(2023, 1, 4)), None);
        assert_eq!(series.last_before(d(2023, 1, 5)).map(|p| p.close), Some(dec!(101)));
        assert!(series.last_before(d(2023, 1, 2)).is_none());
        assert_eq!(series.before(d(2023, 1, 4)).len(), 2);
        assert_eq!(series.between(d(2023, 1, 3), d(2023, 1, 5)).len(), 2);
        assert!(series.between(d(2023, 2, 1), d(2023, 1, 1)).is_empty());
    }

    #[test]
    fn test_return_series_append_requires_later_dates() {
        let mut a = ReturnSeries::new(vec![ReturnPoint::new(d(2023, 1, 2), 0.01)]).unwrap();
        let b = ReturnSeries::new(vec![ReturnPoint::new(d(2023, 1, 2), 0.02)]).unwrap();
        assert!(a.append(b).is_err());

        let c = ReturnSeries::new(vec![ReturnPoint::new(d(2023, 1, 3), 0.02)]).unwrap();
        a.append(c).unwrap();
        assert_eq!(a.len(), 2);
        assert_eq!(a.before(d(2023, 1, 3)).len(), 1);
    }

    #[test]
    fn test_portfolio_weight_validation() {
        let mut weights = BTreeMap::new();
        weights.insert("AAA".to_string(), 0.5);
        weights.insert("BBB".to_string(), 0.5);
        let portfolio = Portfolio::from_weights(weights.clone()).unwrap();
        approx::assert_abs_diff_eq!(portfolio.total_weight(), 1.0, epsilon = WEIGHT_TOLERANCE);

        weights.insert("CCC".to_string(), 0.5);
        assert!(Portfolio::from_weights(weights).is_err());

        let mut negative = BTreeMap::new();
        negative.insert("AAA".to_string(), 1.5);
        negative.insert("BBB".to_string(), -0.5);
        assert!(Portfolio::from_weights(negative).is_err());

        assert!(Portfolio::from_weights(BTreeMap::new()).unwrap().is_empty());
    }
}

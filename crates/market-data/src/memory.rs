use crate::repository::{slice_range, PriceRepository};
use crate::DataError;
use async_trait::async_trait;
use chrono::NaiveDate;
use core_types::PriceSeries;
use std::collections::HashMap;

/// A fixed, in-process price store. Deterministic, which makes it the natural
/// source for simulations driven from code and for tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPriceRepository {
    series: HashMap<String, PriceSeries>,
}

impl InMemoryPriceRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) the full history of one instrument.
    pub fn insert(&mut self, series: PriceSeries) {
        self.series.insert(series.instrument().to_string(), series);
    }

    pub fn with_series(mut self, series: PriceSeries) -> Self {
        self.insert(series);
        self
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

#[async_trait]
impl PriceRepository for InMemoryPriceRepository {
    async fn get_prices(
        &self,
        instrument: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries, DataError> {
        match self.series.get(instrument) {
            Some(series) => slice_range(series, start, end),
            None => Err(DataError::DataUnavailable {
                instrument: instrument.to_string(),
                start,
                end,
            }),
        }
    }
}

use crate::repository::{slice_range, PriceRepository};
use crate::DataError;
use async_trait::async_trait;
use chrono::NaiveDate;
use core_types::{PricePoint, PriceSeries};
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Reads `<dir>/<instrument>.json` files, each a JSON array of
/// `{ "date": "YYYY-MM-DD", "close": 123.45 }` records sorted by date.
///
/// A file is parsed once and kept in memory for the lifetime of the repository.
#[derive(Debug, Clone)]
pub struct JsonDirPriceRepository {
    dir: PathBuf,
    cache: Arc<RwLock<HashMap<String, Arc<PriceSeries>>>>,
}

impl JsonDirPriceRepository {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            cache: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Instrument ids for which a price file exists, sorted.
    pub async fn list_instruments(&self) -> Result<Vec<String>, DataError> {
        let mut entries = tokio::fs::read_dir(&self.dir).await.map_err(|source| DataError::Io {
            path: self.dir.display().to_string(),
            source,
        })?;

        let mut ids = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(|source| DataError::Io {
            path: self.dir.display().to_string(),
            source,
        })? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some("json") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    ids.push(stem.to_string());
                }
            }
        }
        ids.sort();
        Ok(ids)
    }

    /// The complete stored history of `instrument`, or `None` if it has no file.
    pub async fn load_full(&self, instrument: &str) -> Result<Option<Arc<PriceSeries>>, DataError> {
        if let Some(series) = self.cache.read().await.get(instrument) {
            return Ok(Some(Arc::clone(series)));
        }

        let path = self.dir.join(format!("{}.json", instrument));
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(DataError::Io {
                    path: path.display().to_string(),
                    source,
                })
            }
        };

        let points: Vec<PricePoint> = serde_json::from_slice(&bytes)?;
        let series = Arc::new(PriceSeries::new(instrument, points)?);
        tracing::debug!(instrument, points = series.len(), "Parsed price file");

        self.cache
            .write()
            .await
            .insert(instrument.to_string(), Arc::clone(&series));
        Ok(Some(series))
    }
}

#[async_trait]
impl PriceRepository for JsonDirPriceRepository {
    async fn get_prices(
        &self,
        instrument: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries, DataError> {
        match self.load_full(instrument).await? {
            Some(series) => slice_range(&series, start, end),
            None => Err(DataError::DataUnavailable {
                instrument: instrument.to_string(),
                start,
                end,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[tokio::test]
    async fn test_reads_and_slices_price_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("AAA.json"),
            r#"[
                {"date": "2023-01-02", "close": 100.0},
                {"date": "2023-01-03", "close": "101.5"},
                {"date": "2023-01-04", "close": 99}
            ]"#,
        )
        .unwrap();

        let repo = JsonDirPriceRepository::new(dir.path());
        let series = repo.get_prices("AAA", d(2023, 1, 3), d(2023, 1, 31)).await.unwrap();

        assert_eq!(series.len(), 2);
        assert_eq!(series.price_on(d(2023, 1, 3)), Some(dec!(101.5)));
        assert_eq!(repo.list_instruments().await.unwrap(), vec!["AAA".to_string()]);
    }

    #[tokio::test]
    async fn test_missing_file_or_empty_range_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("AAA.json"),
            r#"[{"date": "2023-01-02", "close": 100.0}]"#,
        )
        .unwrap();
        let repo = JsonDirPriceRepository::new(dir.path());

        let missing = repo.get_prices("ZZZ", d(2023, 1, 1), d(2023, 1, 31)).await;
        assert!(missing.unwrap_err().is_unavailable());

        let out_of_range = repo.get_prices("AAA", d(2024, 1, 1), d(2024, 1, 31)).await;
        assert!(out_of_range.unwrap_err().is_unavailable());
    }
}

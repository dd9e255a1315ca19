use crate::json_dir::JsonDirPriceRepository;
use crate::DataError;
use async_trait::async_trait;
use core_types::PriceSeries;
use futures::stream::{self, StreamExt};

/// A destination for complete price histories.
#[async_trait]
pub trait PriceWriter: Send + Sync {
    /// Upserts every point of `series` and returns the number of rows written.
    async fn save_prices(&self, series: &PriceSeries) -> Result<u64, DataError>;
}

/// What happened to one instrument file during an import.
#[derive(Debug)]
pub struct ImportOutcome {
    pub instrument: String,
    pub result: Result<u64, DataError>,
}

/// Copies every price file in `source` into `sink`, keeping at most
/// `max_concurrency` files in flight. Outcomes are sorted by instrument.
///
/// Failing to list the directory is an error; a failure on one file is
/// reported in its outcome and does not stop the others.
pub async fn import_dir(
    source: &JsonDirPriceRepository,
    sink: &dyn PriceWriter,
    max_concurrency: usize,
    on_done: impl Fn(&str) + Sync,
) -> Result<Vec<ImportOutcome>, DataError> {
    let instruments = source.list_instruments().await?;

    let mut outcomes: Vec<ImportOutcome> = stream::iter(instruments)
        .map(|instrument| {
            let on_done = &on_done;
            async move {
                let result = match source.load_full(&instrument).await {
                    Ok(Some(series)) => sink.save_prices(&series).await,
                    Ok(None) => Ok(0),
                    Err(e) => Err(e),
                };
                on_done(&instrument);
                ImportOutcome { instrument, result }
            }
        })
        .buffer_unordered(max_concurrency.max(1))
        .collect()
        .await;

    outcomes.sort_by(|a, b| a.instrument.cmp(&b.instrument));
    Ok(outcomes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[derive(Default)]
    struct CountingWriter {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
        rows: AtomicUsize,
    }

    #[async_trait]
    impl PriceWriter for CountingWriter {
        async fn save_prices(&self, series: &PriceSeries) -> Result<u64, DataError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(10)).await;
            self.rows.fetch_add(series.len(), Ordering::SeqCst);
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(series.len() as u64)
        }
    }

    fn write_files(dir: &std::path::Path, count: usize) {
        for i in 0..count {
            std::fs::write(
                dir.join(format!("I{i:02}.json")),
                r#"[
                    {"date": "2023-01-02", "close": 10.0},
                    {"date": "2023-01-03", "close": 11.0}
                ]"#,
            )
            .unwrap();
        }
    }

    #[tokio::test]
    async fn test_import_keeps_writes_within_concurrency_limit() {
        let dir = tempfile::tempdir().unwrap();
        write_files(dir.path(), 12);
        let source = JsonDirPriceRepository::new(dir.path());
        let sink = CountingWriter::default();
        let done = AtomicUsize::new(0);

        let outcomes = import_dir(&source, &sink, 3, |_| {
            done.fetch_add(1, Ordering::SeqCst);
        })
        .await
        .unwrap();

        assert_eq!(outcomes.len(), 12);
        assert!(outcomes.iter().all(|o| matches!(o.result, Ok(2))));
        assert_eq!(outcomes[0].instrument, "I00");
        assert_eq!(outcomes[11].instrument, "I11");
        assert_eq!(sink.rows.load(Ordering::SeqCst), 24);
        assert_eq!(done.load(Ordering::SeqCst), 12);
        let peak = sink.peak.load(Ordering::SeqCst);
        assert!(peak >= 1 && peak <= 3, "peak in-flight writes was {peak}");
    }

    #[tokio::test]
    async fn test_import_reports_bad_file_without_stopping() {
        let dir = tempfile::tempdir().unwrap();
        write_files(dir.path(), 2);
        std::fs::write(dir.path().join("BAD.json"), "not json").unwrap();
        let source = JsonDirPriceRepository::new(dir.path());
        let sink = CountingWriter::default();

        let outcomes = import_dir(&source, &sink, 0, |_| {}).await.unwrap();

        assert_eq!(outcomes.len(), 3);
        assert!(matches!(outcomes[0].result, Err(DataError::JsonError(_))));
        assert_eq!(outcomes[0].instrument, "BAD");
        assert_eq!(sink.rows.load(Ordering::SeqCst), 4);
    }
}

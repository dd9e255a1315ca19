use crate::import::PriceWriter;
use crate::DataError;
use async_trait::async_trait;
use chrono::NaiveDate;
use core_types::{PricePoint, PriceSeries};
use sqlx::postgres::PgPool;
use sqlx::{Postgres, QueryBuilder};

/// The single data-fetch contract the backtest engine consumes.
///
/// Implementations may hit a database, a file cache or a vendor API; the engine
/// does not care. Retrying transient failures is the implementation's job.
#[async_trait]
pub trait PriceRepository: Send + Sync {
    /// Adjusted daily closes for `instrument` with `start <= date <= end`.
    ///
    /// Fails with [`DataError::DataUnavailable`] when there are no points in the range.
    async fn get_prices(
        &self,
        instrument: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries, DataError>;
}

/// Slices a full series down to `[start, end]`, mapping an empty result to `DataUnavailable`.
pub(crate) fn slice_range(
    series: &PriceSeries,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<PriceSeries, DataError> {
    let points = series.between(start, end);
    if points.is_empty() {
        return Err(DataError::DataUnavailable {
            instrument: series.instrument().to_string(),
            start,
            end,
        });
    }
    Ok(PriceSeries::new(series.instrument(), points.to_vec())?)
}

/// The `DbPriceRepository` reads and writes the `daily_prices` table.
#[derive(Debug, Clone)]
pub struct DbPriceRepository {
    pool: PgPool,
}

impl DbPriceRepository {
    /// Creates a new `DbPriceRepository` with a shared database connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Rows per INSERT; three bind parameters each stays well under Postgres' 65535 limit.
const INSERT_BATCH_ROWS: usize = 1000;

#[async_trait]
impl PriceWriter for DbPriceRepository {
    /// Upserts every point of `series` inside one transaction, one multi-row
    /// statement per batch. Returns the number of rows written.
    async fn save_prices(&self, series: &PriceSeries) -> Result<u64, DataError> {
        let mut tx = self.pool.begin().await?;
        let mut written = 0;

        for batch in series.points().chunks(INSERT_BATCH_ROWS) {
            let mut query = QueryBuilder::<Postgres>::new(
                "INSERT INTO daily_prices (instrument_id, trade_date, adj_close) ",
            );
            query.push_values(batch, |mut row, point| {
                row.push_bind(series.instrument())
                    .push_bind(point.date)
                    .push_bind(point.close);
            });
            query.push(
                " ON CONFLICT (instrument_id, trade_date) DO UPDATE SET adj_close = EXCLUDED.adj_close",
            );

            let result = query.build().execute(&mut *tx).await?;
            written += result.rows_affected();
        }

        tx.commit().await?;
        tracing::debug!(instrument = series.instrument(), rows = written, "Saved prices");
        Ok(written)
    }
}

#[async_trait]
impl PriceRepository for DbPriceRepository {
    async fn get_prices(
        &self,
        instrument: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries, DataError> {
        let points = sqlx::query_as::<_, PricePoint>(
            r#"
            SELECT trade_date, adj_close
            FROM daily_prices
            WHERE instrument_id = $1 AND trade_date BETWEEN $2 AND $3
            ORDER BY trade_date ASC
            "#,
        )
        .bind(instrument)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        if points.is_empty() {
            return Err(DataError::DataUnavailable {
                instrument: instrument.to_string(),
                start,
                end,
            });
        }

        tracing::trace!(instrument, rows = points.len(), "Loaded prices from database");
        Ok(PriceSeries::new(instrument, points)?)
    }
}

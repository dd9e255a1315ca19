//! # Momn Market Data
//!
//! Adapters that supply adjusted daily closes to the backtest engine.
//!
//! ## Architectural Principles
//!
//! - **Layer 3 Adapter:** everything that touches storage lives here, behind the
//!   [`PriceRepository`] trait. The engine never sees SQL or file paths.
//! - **Asynchronous & Pooled:** database access goes through a shared `PgPool`, so
//!   the engine can fetch many instruments concurrently.
//!
//! ## Public API
//!
//! - `PriceRepository`: the fetch contract (`get_prices`).
//! - `DbPriceRepository`: the PostgreSQL `daily_prices` table, also a `PriceWriter`.
//! - `PriceWriter` / `import_dir`: bounded-concurrency copy of a JSON directory into a writer.
//! - `JsonDirPriceRepository`: a directory of per-instrument JSON files.
//! - `InMemoryPriceRepository`: a fixed in-process store.
//! - `connect` / `run_migrations`: pool setup for the database adapter.
//! - `DataError`: the errors returned from this crate.

pub mod connection;
pub mod error;
pub mod import;
pub mod json_dir;
pub mod memory;
pub mod repository;

pub use connection::{connect, run_migrations};
pub use error::DataError;
pub use import::{import_dir, ImportOutcome, PriceWriter};
pub use json_dir::JsonDirPriceRepository;
pub use memory::InMemoryPriceRepository;
pub use repository::{DbPriceRepository, PriceRepository};

//! # Momn Core Types
//!
//! Layer 0 of the workspace: the shared vocabulary every other crate speaks.
//! Price and return series, portfolios, ranked instruments and the small set of
//! enums that parameterise a backtest live here. Nothing in this crate performs
//! I/O.

pub mod enums;
pub mod error;
pub mod stats;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::{RankingMethod, RebalanceFrequency, WeightingKind};
pub use error::CoreError;
pub use structs::{
    InstrumentId, Portfolio, PricePoint, PriceSeries, RankedInstrument, ReturnPoint, ReturnSeries,
    WEIGHT_TOLERANCE,
};

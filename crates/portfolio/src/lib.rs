//! # Momn Portfolio Construction
//!
//! Turns a ranked instrument list into target weights for one holding period.
//!
//! ## Architectural Principles
//!
//! - **Weighting Abstraction:** the [`WeightingScheme`] trait lets the backtest
//!   engine stay agnostic about how weights are assigned. Equal weighting is the
//!   default; score weighting is a drop-in alternative.
//! - **Pure Calculation:** schemes never fetch data or hold state between periods.
//!
//! ## Public API
//!
//! - `WeightingScheme`: the trait every scheme implements.
//! - `EqualWeight`, `ScoreWeighted`: the concrete schemes.
//! - `create_weighting`: builds a scheme from a `WeightingKind`.
//! - `PortfolioError`: the errors returned from this crate.

pub mod error;
pub mod factory;
pub mod weighting;

pub use error::PortfolioError;
pub use factory::create_weighting;
pub use weighting::{EqualWeight, ScoreWeighted, WeightingScheme};

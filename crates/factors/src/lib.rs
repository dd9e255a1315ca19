//! # Momn Factors
//!
//! The ranking half of the momentum strategy: daily returns from prices,
//! trailing factor scores from returns, and a cross-sectional ranking from
//! factor scores.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** a pure logic crate. It has no knowledge of databases or
//!   files and depends only on `core-types`.
//! - **Method Agnostic Ranking:** the [`Ranker`] only sees a list of
//!   [`FactorKind`]s. Which kinds a [`RankingMethod`](core_types::RankingMethod)
//!   averages is decided in one place, [`factors_for`].
//!
//! ## Public API
//!
//! - `returns`: `simple_returns` and calendar-aligned `period_returns`.
//! - `scorer`: `zscore`, `sharpe`, `FactorKind`, `FactorScore`, `composite`.
//! - `Ranker` / `RankedUniverse`: composite scoring and top-N selection.
//! - `FactorError`: the errors returned from this crate.

pub mod error;
pub mod methods;
pub mod ranker;
pub mod returns;
pub mod scorer;

pub use error::FactorError;
pub use methods::{factors_for, max_lookback_days};
pub use ranker::{RankedUniverse, Ranker};
pub use returns::{period_returns, simple_returns};
pub use scorer::{FactorKind, FactorScore, Lookback};

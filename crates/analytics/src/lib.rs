//! # Momn Analytics Engine
//!
//! This crate turns daily return series into summary statistics. It acts as the
//! "unbiased judge" of a backtest: the strategy and its benchmark go through the
//! exact same calculation.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** a pure logic crate that depends only on `core-types`.
//! - **Stateless Calculation:** the `AnalyticsEngine` takes a `ReturnSeries` and
//!   produces a `PerformanceReport`. Same input, same output.
//!
//! ## Public API
//!
//! - `AnalyticsEngine`: `summarize` and `compare`.
//! - `PerformanceReport` / `Comparison`: the output structures.
//! - `AnalyticsError`: the errors returned from this crate.

// Declare the modules that constitute this crate.
pub mod engine;
pub mod error;
pub mod report;

// Re-export the key components to create a clean, public-facing API.
pub use engine::{cumulative_curve, AnalyticsEngine};
pub use error::AnalyticsError;
pub use report::{Comparison, CurvePoint, PerformanceReport};

//! # generalize
//!
//! Time series generalization for sensor data visualization.
//!
//! Charting a sensor series over a long time window means drawing far more points
//! than a screen can show. This crate reduces a series to a bounded number of
//! representative samples while keeping its visual shape.
//!
//! ## Features
//!
//! - **Douglas-Peucker**: drops samples whose perpendicular distance to the local
//!   trend line stays within a tolerance
//! - **Largest-Triangle-Three-Buckets**: keeps exactly `threshold` samples, one per
//!   bucket, chosen by triangle area
//! - **No-data aware**: missing measurements survive as explicit gaps instead of
//!   being interpolated away
//! - **Exact or fast arithmetic**: values are [`Decimal`](rust_decimal::Decimal) by
//!   default, `f64` on request
//!
//! ## Quick Start
//!
//! ```rust
//! use generalize::{GeneralizerEngine, GeneralizerOptions, Sample, Series, SeriesCollection};
//! use rust_decimal::Decimal;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let start = 1609459200000; // 2021-01-01 00:00:00 UTC
//! let samples = (0..10_000)
//!     .map(|i| Sample::new(start + i * 60_000, Decimal::new(i % 500, 1)))
//!     .collect();
//! let collection: SeriesCollection = [Series::new("temp", samples)].into_iter().collect();
//!
//! let options = GeneralizerOptions::new().with("threshold", "300");
//! let reduced = GeneralizerEngine::new().reduce_collection(&collection, "lttb", &options)?;
//!
//! let temp = reduced.get("temp").ok_or("missing series")?;
//! assert_eq!(temp.len(), 300);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! This crate does **not** load or store data. A data access layer hands out
//! [`SeriesCollection`]s through [`SeriesSource`]; [`GeneralizingSource`] wraps such
//! a source and generalizes on request.

#![deny(missing_docs)]
#![deny(clippy::all, clippy::pedantic)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod config;
pub mod engine;
pub mod error;
pub mod generalizer;
pub mod integration;
pub mod precision;
pub mod sample;
pub mod series;

pub use config::{DouglasPeuckerConfig, GeneralizationConfig, GeneralizerOptions, LttbConfig};
pub use engine::{GeneralizerEngine, GeneralizerEngineBuilder};
pub use error::GeneralizerError;
pub use generalizer::{DouglasPeucker, Generalizer, GeneralizerKind, LargestTriangleThreeBuckets};
pub use integration::{GeneralizingSource, SeriesSource};
pub use precision::Precision;
pub use sample::Sample;
pub use series::{Series, SeriesCollection, SeriesMetadata};

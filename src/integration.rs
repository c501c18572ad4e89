//! Integration with the data access layer.
//!
//! [`SeriesSource`] is the interface a data access layer implements to hand out
//! series for a request. [`GeneralizingSource`] wraps any source and generalizes
//! its output when the request asks for it.

use crate::config::GeneralizerOptions;
use crate::engine::GeneralizerEngine;
use crate::precision::Precision;
use crate::series::SeriesCollection;
use rust_decimal::Decimal;

/// A provider of series for a request.
///
/// Implementations return the requested series sorted by timestamp, restricted
/// to the requested window, with missing measurements marked as no-data samples.
///
/// # Example
///
/// ```
/// use generalize::{GeneralizerOptions, Sample, Series, SeriesCollection, SeriesSource};
///
/// struct Constant;
///
/// impl SeriesSource<f64> for Constant {
///     type Error = std::convert::Infallible;
///
///     fn series(&self, _options: &GeneralizerOptions) -> Result<SeriesCollection<f64>, Self::Error> {
///         let samples = (0..10).map(|i| Sample::new(i, 1.0)).collect();
///         Ok([Series::new("one", samples)].into_iter().collect())
///     }
/// }
/// ```
pub trait SeriesSource<V: Precision = Decimal> {
    /// Error raised when the series cannot be loaded.
    type Error;

    /// Loads the series selected by `options`.
    fn series(&self, options: &GeneralizerOptions) -> Result<SeriesCollection<V>, Self::Error>;
}

/// A source that generalizes the series of an inner source on request.
///
/// Generalization only happens if the `generalize` option is `true`. The
/// `generalizer` option selects the algorithm; without it the engine's default
/// generalizer is used. Generalization never fails the request: on error the
/// problem is logged and the series are returned as loaded.
#[derive(Debug, Clone)]
pub struct GeneralizingSource<S> {
    source: S,
    engine: GeneralizerEngine,
}

impl<S> GeneralizingSource<S> {
    /// Wraps `source` with a default engine.
    pub fn new(source: S) -> Self {
        Self::with_engine(source, GeneralizerEngine::new())
    }

    /// Wraps `source` with the given engine.
    pub fn with_engine(source: S, engine: GeneralizerEngine) -> Self {
        Self { source, engine }
    }

    /// The wrapped source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// The engine used for generalization.
    pub fn engine(&self) -> &GeneralizerEngine {
        &self.engine
    }

    /// Unwraps the inner source.
    pub fn into_inner(self) -> S {
        self.source
    }

    fn generalize<V: Precision>(
        &self,
        data: SeriesCollection<V>,
        options: &GeneralizerOptions,
    ) -> SeriesCollection<V> {
        match options.is_generalize() {
            Ok(true) => {}
            Ok(false) => return data,
            Err(_err) => {
                #[cfg(feature = "logging")]
                log::warn!("Ignoring generalize option: {_err}");
                return data;
            }
        }

        let generalized = match options.generalizer_name() {
            Some(name) => self.engine.reduce_collection(&data, name, options),
            None => self.engine.reduce_collection_default(&data, options),
        };
        match generalized {
            Ok(generalized) => generalized,
            Err(_err) => {
                #[cfg(feature = "logging")]
                log::error!(
                    "Could not generalize timeseries collection. Returning original data: {_err}"
                );
                data
            }
        }
    }
}

impl<V: Precision, S: SeriesSource<V>> SeriesSource<V> for GeneralizingSource<S> {
    type Error = S::Error;

    fn series(&self, options: &GeneralizerOptions) -> Result<SeriesCollection<V>, Self::Error> {
        let data = self.source.series(options)?;
        Ok(self.generalize(data, options))
    }
}

//! Applies one generalizer to every series of a collection.

use crate::config::{GeneralizationConfig, GeneralizerOptions};
use crate::error::GeneralizerError;
use crate::generalizer::GeneralizerKind;
use crate::precision::Precision;
use crate::series::{Series, SeriesCollection};
use std::thread;

/// Reduces whole collections with a selectable generalizer.
///
/// Series are reduced independently. Any failure aborts the call and no partial
/// result is returned.
///
/// # Example
///
/// ```
/// use generalize::{GeneralizerEngine, GeneralizerOptions, Sample, Series, SeriesCollection};
///
/// # fn main() -> Result<(), generalize::GeneralizerError> {
/// let samples = (0..1000).map(|i| Sample::new(i * 1000, (i % 17) as f64)).collect();
/// let collection: SeriesCollection<f64> = [Series::new("temp", samples)].into_iter().collect();
///
/// let engine = GeneralizerEngine::builder().parallelism(4).build();
/// let options = GeneralizerOptions::new().with("threshold", "100");
/// let reduced = engine.reduce_collection(&collection, "lttb", &options)?;
/// assert_eq!(reduced.get("temp").map(|s| s.len()), Some(100));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct GeneralizerEngine {
    default_generalizer: GeneralizerKind,
    parallelism: usize,
}

impl GeneralizerEngine {
    /// Creates an engine with default settings: LTTB, sequential.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Returns a builder for configuring an engine.
    pub fn builder() -> GeneralizerEngineBuilder {
        GeneralizerEngineBuilder::new()
    }

    /// Generalizer used when a request names none.
    pub fn default_generalizer(&self) -> GeneralizerKind {
        self.default_generalizer
    }

    /// Maximum number of threads used per collection.
    pub fn parallelism(&self) -> usize {
        self.parallelism
    }

    /// Reduces a single series.
    pub fn reduce_series<V: Precision>(
        &self,
        series: &Series<V>,
        config: &GeneralizationConfig,
    ) -> Result<Series<V>, GeneralizerError> {
        let reduced = config.reduce(series)?;
        #[cfg(feature = "logging")]
        log::debug!(
            "Generalized series '{}' with {}: {} --> {}",
            series.id(),
            config.kind(),
            series.len(),
            reduced.len()
        );
        Ok(reduced)
    }

    /// Reduces every series with the generalizer named `generalizer`, configured
    /// from `options`.
    ///
    /// Fails with [`GeneralizerError::UnknownGeneralizer`] for an unknown name.
    pub fn reduce_collection<V: Precision>(
        &self,
        collection: &SeriesCollection<V>,
        generalizer: &str,
        options: &GeneralizerOptions,
    ) -> Result<SeriesCollection<V>, GeneralizerError> {
        let kind = generalizer.parse::<GeneralizerKind>()?;
        let config = GeneralizationConfig::from_options(kind, options)?;
        self.reduce_collection_with(collection, &config)
    }

    /// Reduces every series with the engine's default generalizer.
    pub fn reduce_collection_default<V: Precision>(
        &self,
        collection: &SeriesCollection<V>,
        options: &GeneralizerOptions,
    ) -> Result<SeriesCollection<V>, GeneralizerError> {
        let config = GeneralizationConfig::from_options(self.default_generalizer, options)?;
        self.reduce_collection_with(collection, &config)
    }

    /// Reduces every series with an already validated configuration.
    pub fn reduce_collection_with<V: Precision>(
        &self,
        collection: &SeriesCollection<V>,
        config: &GeneralizationConfig,
    ) -> Result<SeriesCollection<V>, GeneralizerError> {
        let series: Vec<&Series<V>> = collection.iter().collect();
        let threads = self.parallelism.min(series.len());
        if threads <= 1 {
            return series
                .into_iter()
                .map(|s| self.reduce_series(s, config))
                .collect();
        }

        let chunk_size = series.len().div_ceil(threads);
        let chunks: Vec<Result<Vec<Series<V>>, GeneralizerError>> = thread::scope(|scope| {
            let handles: Vec<_> = series
                .chunks(chunk_size)
                .map(|chunk| {
                    scope.spawn(move || {
                        chunk
                            .iter()
                            .map(|s| self.reduce_series(s, config))
                            .collect::<Result<Vec<_>, _>>()
                    })
                })
                .collect();
            handles
                .into_iter()
                .map(|handle| {
                    handle
                        .join()
                        .unwrap_or_else(|payload| std::panic::resume_unwind(payload))
                })
                .collect()
        });

        let mut reduced = SeriesCollection::new();
        for chunk in chunks {
            for series in chunk? {
                reduced.insert(series);
            }
        }
        Ok(reduced)
    }
}

impl Default for GeneralizerEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for configuring a [`GeneralizerEngine`].
#[derive(Debug, Clone)]
pub struct GeneralizerEngineBuilder {
    default_generalizer: GeneralizerKind,
    parallelism: usize,
}

impl GeneralizerEngineBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            default_generalizer: GeneralizerKind::default(),
            parallelism: 1,
        }
    }

    /// Sets the generalizer used when a request names none.
    ///
    /// Default: LTTB
    #[must_use]
    pub fn default_generalizer(mut self, kind: GeneralizerKind) -> Self {
        self.default_generalizer = kind;
        self
    }

    /// Sets the maximum number of threads used to reduce one collection.
    ///
    /// Series are split into contiguous chunks, one per thread. `0` and `1` both
    /// reduce sequentially on the calling thread.
    ///
    /// Default: 1
    #[must_use]
    pub fn parallelism(mut self, threads: usize) -> Self {
        self.parallelism = threads.max(1);
        self
    }

    /// Builds the engine.
    pub fn build(self) -> GeneralizerEngine {
        GeneralizerEngine {
            default_generalizer: self.default_generalizer,
            parallelism: self.parallelism,
        }
    }
}

impl Default for GeneralizerEngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

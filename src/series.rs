//! Series and series collections, the unit of work passed through the engine.

use crate::precision::Precision;
use crate::sample::Sample;
use rust_decimal::Decimal;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::collections::btree_map;

/// Descriptive data attached to a series.
///
/// Generalizers never look at metadata; it travels unchanged from input to output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SeriesMetadata {
    /// Unit of measurement, e.g. `"°C"`.
    pub unit: Option<String>,
    /// Free-form properties supplied by the data access layer.
    pub properties: BTreeMap<String, String>,
}

impl SeriesMetadata {
    /// Creates metadata with only a unit set.
    pub fn with_unit(unit: impl Into<String>) -> Self {
        Self {
            unit: Some(unit.into()),
            properties: BTreeMap::new(),
        }
    }
}

/// An ordered sequence of samples belonging to one sensor series.
///
/// Samples must be sorted strictly ascending by timestamp. Producers are
/// responsible for sorting; the generalizers rely on it and do not re-sort.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series<V = Decimal> {
    id: String,
    samples: Vec<Sample<V>>,
    #[serde(default)]
    metadata: SeriesMetadata,
}

impl<V: Precision> Series<V> {
    /// Creates a series from already sorted samples.
    pub fn new(id: impl Into<String>, samples: Vec<Sample<V>>) -> Self {
        Self {
            id: id.into(),
            samples,
            metadata: SeriesMetadata::default(),
        }
    }

    /// Creates an empty series.
    pub fn empty(id: impl Into<String>) -> Self {
        Self::new(id, Vec::new())
    }

    /// Replaces the metadata of this series.
    #[must_use]
    pub fn with_metadata(mut self, metadata: SeriesMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Creates a series sharing this series' id and metadata but holding `samples`.
    pub fn derive(&self, samples: Vec<Sample<V>>) -> Self {
        Self {
            id: self.id.clone(),
            samples,
            metadata: self.metadata.clone(),
        }
    }

    /// Series identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Samples in timestamp order.
    pub fn samples(&self) -> &[Sample<V>] {
        &self.samples
    }

    /// Metadata attached to this series.
    pub fn metadata(&self) -> &SeriesMetadata {
        &self.metadata
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Returns true if the series holds no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// First sample, if any.
    pub fn first(&self) -> Option<&Sample<V>> {
        self.samples.first()
    }

    /// Last sample, if any.
    pub fn last(&self) -> Option<&Sample<V>> {
        self.samples.last()
    }

    /// Number of no-data samples.
    pub fn no_data_count(&self) -> usize {
        self.samples.iter().filter(|s| s.is_no_data()).count()
    }

    /// Returns true if timestamps are strictly ascending.
    pub fn is_strictly_ascending(&self) -> bool {
        self.samples
            .windows(2)
            .all(|pair| pair[0].timestamp() < pair[1].timestamp())
    }

    /// Consumes the series and returns its samples.
    pub fn into_samples(self) -> Vec<Sample<V>> {
        self.samples
    }
}

/// A set of series keyed by their identifier.
///
/// Keys are unique and always equal the id of the series stored under them.
/// Iteration follows key order; the order of samples inside each series is
/// always preserved.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SeriesCollection<V = Decimal> {
    series: BTreeMap<String, Series<V>>,
}

impl<V: Precision> SeriesCollection<V> {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self {
            series: BTreeMap::new(),
        }
    }

    /// Adds a series under its own id, returning any series it replaced.
    pub fn insert(&mut self, series: Series<V>) -> Option<Series<V>> {
        self.series.insert(series.id().to_string(), series)
    }

    /// Looks up a series by id.
    pub fn get(&self, id: &str) -> Option<&Series<V>> {
        self.series.get(id)
    }

    /// Returns true if a series with this id is present.
    pub fn contains(&self, id: &str) -> bool {
        self.series.contains_key(id)
    }

    /// Iterates over series ids.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(String::as_str)
    }

    /// Iterates over all series.
    pub fn iter(&self) -> btree_map::Values<'_, String, Series<V>> {
        self.series.values()
    }

    /// Number of series.
    pub fn len(&self) -> usize {
        self.series.len()
    }

    /// Returns true if the collection holds no series.
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Total number of samples over all series.
    pub fn sample_count(&self) -> usize {
        self.series.values().map(Series::len).sum()
    }
}

impl<V: Precision> Default for SeriesCollection<V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Deserializes from a map of id to series and rejects entries whose key
/// differs from the series id.
impl<'de, V: Precision + Deserialize<'de>> Deserialize<'de> for SeriesCollection<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let series = BTreeMap::<String, Series<V>>::deserialize(deserializer)?;
        if let Some((key, mismatched)) = series.iter().find(|(key, s)| key.as_str() != s.id()) {
            return Err(D::Error::custom(format!(
                "series key '{key}' does not match series id '{}'",
                mismatched.id()
            )));
        }
        Ok(Self { series })
    }
}

impl<V: Precision> FromIterator<Series<V>> for SeriesCollection<V> {
    fn from_iter<I: IntoIterator<Item = Series<V>>>(iter: I) -> Self {
        let mut collection = Self::new();
        for series in iter {
            collection.insert(series);
        }
        collection
    }
}

impl<V: Precision> IntoIterator for SeriesCollection<V> {
    type Item = Series<V>;
    type IntoIter = btree_map::IntoValues<String, Series<V>>;

    fn into_iter(self) -> Self::IntoIter {
        self.series.into_values()
    }
}

impl<'a, V: Precision> IntoIterator for &'a SeriesCollection<V> {
    type Item = &'a Series<V>;
    type IntoIter = btree_map::Values<'a, String, Series<V>>;

    fn into_iter(self) -> Self::IntoIter {
        self.series.values()
    }
}

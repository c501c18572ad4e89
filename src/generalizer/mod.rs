//! Generalization algorithms.
//!
//! Each algorithm implements [`Generalizer`]. The set of algorithms is closed:
//! [`GeneralizerKind`] names them and [`GeneralizationConfig`] carries the
//! configuration of exactly one, so dispatch is a plain `match`.

mod douglas_peucker;
mod lttb;

pub use douglas_peucker::DouglasPeucker;
pub use lttb::LargestTriangleThreeBuckets;

use crate::config::GeneralizationConfig;
use crate::error::GeneralizerError;
use crate::precision::Precision;
use crate::series::Series;
use std::fmt;
use std::str::FromStr;

/// A time series simplification algorithm.
///
/// Implementations are pure: they never modify their input and keep no state
/// between calls, so one instance can reduce many series, from many threads.
pub trait Generalizer {
    /// Human-readable algorithm name.
    fn name(&self) -> &'static str;

    /// Reduces `series` to its representative samples.
    ///
    /// The result keeps the id and metadata of the input. Series too small to
    /// simplify are returned unchanged.
    fn reduce<V: Precision>(&self, series: &Series<V>) -> Result<Series<V>, GeneralizerError>;
}

/// The available generalization algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GeneralizerKind {
    /// Recursive line simplification (Douglas-Peucker).
    DouglasPeucker,
    /// Bucket-based triangle area selection (LTTB).
    #[default]
    LargestTriangleThreeBuckets,
}

impl GeneralizerKind {
    /// Human-readable algorithm name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::DouglasPeucker => "Douglas-Peucker",
            Self::LargestTriangleThreeBuckets => "LargestTriangleThreeBuckets",
        }
    }

    /// Short name used in request options.
    pub fn short_name(&self) -> &'static str {
        match self {
            Self::DouglasPeucker => "dp",
            Self::LargestTriangleThreeBuckets => "lttb",
        }
    }
}

impl fmt::Display for GeneralizerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

impl FromStr for GeneralizerKind {
    type Err = GeneralizerError;

    /// Accepts short and long names, ignoring case, spaces, `-` and `_`.
    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let normalized: String = name
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .flat_map(char::to_lowercase)
            .collect();
        match normalized.as_str() {
            "dp" | "douglaspeucker" => Ok(Self::DouglasPeucker),
            "lttb" | "largesttrianglethreebuckets" => Ok(Self::LargestTriangleThreeBuckets),
            _ => Err(GeneralizerError::UnknownGeneralizer(name.to_string())),
        }
    }
}

impl GeneralizationConfig {
    /// Runs the configured algorithm on one series.
    pub fn reduce<V: Precision>(&self, series: &Series<V>) -> Result<Series<V>, GeneralizerError> {
        match self {
            Self::DouglasPeucker(config) => DouglasPeucker::new(config.clone()).reduce(series),
            Self::Lttb(config) => LargestTriangleThreeBuckets::new(config.clone()).reduce(series),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_str() {
        assert_eq!("dp".parse::<GeneralizerKind>().unwrap(), GeneralizerKind::DouglasPeucker);
        assert_eq!(
            "Douglas-Peucker".parse::<GeneralizerKind>().unwrap(),
            GeneralizerKind::DouglasPeucker
        );
        assert_eq!(
            "LTTB".parse::<GeneralizerKind>().unwrap(),
            GeneralizerKind::LargestTriangleThreeBuckets
        );
        assert_eq!(
            "LargestTriangleThreeBuckets".parse::<GeneralizerKind>().unwrap(),
            GeneralizerKind::LargestTriangleThreeBuckets
        );
    }

    #[test]
    fn test_kind_unknown() {
        match "spline".parse::<GeneralizerKind>() {
            Err(GeneralizerError::UnknownGeneralizer(name)) => assert_eq!(name, "spline"),
            other => panic!("Expected UnknownGeneralizer, got {other:?}"),
        }
    }

    #[test]
    fn test_kind_names_round_trip() {
        for kind in [
            GeneralizerKind::DouglasPeucker,
            GeneralizerKind::LargestTriangleThreeBuckets,
        ] {
            assert_eq!(kind.short_name().parse::<GeneralizerKind>().unwrap(), kind);
            assert_eq!(kind.name().parse::<GeneralizerKind>().unwrap(), kind);
            assert_eq!(kind.to_string(), kind.short_name());
        }
    }

    #[test]
    fn test_default_kind_is_lttb() {
        assert_eq!(
            GeneralizerKind::default(),
            GeneralizerKind::LargestTriangleThreeBuckets
        );
        assert_eq!(
            GeneralizationConfig::default().kind(),
            GeneralizerKind::LargestTriangleThreeBuckets
        );
    }
}

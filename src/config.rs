//! Generalizer configuration.
//!
//! Configuration arrives in one of two shapes:
//!
//! - [`GeneralizerOptions`]: loose request-level key/value strings. Keys are matched
//!   case-insensitively and ignore `_`/`-`, so `TOLERANCE_VALUE`, `toleranceValue`
//!   and `tolerance_value` all name the same option.
//! - [`GeneralizationConfig`]: a validated, typed configuration for exactly one
//!   algorithm. It can also be loaded with serde from a settings file.
//!
//! The two algorithms treat malformed options differently.
//! Douglas-Peucker rejects them with [`GeneralizerError::InvalidConfig`] and the
//! whole reduction is aborted. LTTB logs the problem and falls back to its default
//! for that option.

use crate::error::GeneralizerError;
use crate::generalizer::GeneralizerKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

/// Option key: whether the caller wants generalized data at all.
pub const GENERALIZE: &str = "generalize";
/// Option key: name of the generalizer to apply.
pub const GENERALIZER: &str = "generalizer";
/// Option key: Douglas-Peucker perpendicular distance cutoff.
pub const TOLERANCE_VALUE: &str = "toleranceValue";
/// Option key: Douglas-Peucker input size cap, `-1` for unlimited.
pub const MAX_ENTRIES: &str = "maxEntries";
/// Option key: Douglas-Peucker expected reduction rate (informational).
pub const REDUCTION_RATE: &str = "reductionRate";
/// Option key: LTTB target output size.
pub const THRESHOLD: &str = "threshold";
/// Option key: LTTB permissible no-data share or count per bucket.
pub const NO_DATA_GAP_THRESHOLD: &str = "noDataGapThreshold";

/// Default Douglas-Peucker tolerance, in value units.
pub const DEFAULT_TOLERANCE_VALUE: f64 = 0.1;
/// Default Douglas-Peucker reduction rate, meaning "no empirical value".
pub const DEFAULT_REDUCTION_RATE: i64 = -1;
/// Default LTTB output size.
pub const DEFAULT_THRESHOLD: usize = 200;
/// Default LTTB no-data gap threshold: 20% of a bucket.
pub const DEFAULT_NO_DATA_GAP_THRESHOLD: f64 = 0.2;

fn normalize_key(key: &str) -> String {
    key.chars()
        .filter(|c| *c != '_' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Request-level generalizer options as raw strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneralizerOptions {
    entries: BTreeMap<String, String>,
}

impl GeneralizerOptions {
    /// Creates an empty option set; every option takes its default.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an option, replacing any previous value under the same key.
    #[must_use]
    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Adds an option, returning the value it replaced.
    pub fn insert(&mut self, key: &str, value: impl Into<String>) -> Option<String> {
        self.entries.insert(normalize_key(key), value.into())
    }

    /// Looks up an option.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(&normalize_key(key)).map(String::as_str)
    }

    /// Returns true if the option is present.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(&normalize_key(key))
    }

    /// Parses an option, returning `Ok(None)` if it is absent.
    pub fn parse<T: FromStr>(&self, key: &str) -> Result<Option<T>, GeneralizerError> {
        match self.get(key) {
            None => Ok(None),
            Some(raw) => raw.trim().parse::<T>().map(Some).map_err(|_| {
                GeneralizerError::invalid_config(
                    key,
                    raw,
                    format!("expected {}", std::any::type_name::<T>()),
                )
            }),
        }
    }

    /// Whether the caller asked for generalized data. Defaults to `false`.
    pub fn is_generalize(&self) -> Result<bool, GeneralizerError> {
        match self.get(GENERALIZE) {
            None => Ok(false),
            Some(raw) if raw.trim().eq_ignore_ascii_case("true") => Ok(true),
            Some(raw) if raw.trim().eq_ignore_ascii_case("false") => Ok(false),
            Some(raw) => Err(GeneralizerError::invalid_config(
                GENERALIZE,
                raw,
                "expected 'true' or 'false'",
            )),
        }
    }

    /// Requested generalizer name, if any.
    pub fn generalizer_name(&self) -> Option<&str> {
        self.get(GENERALIZER)
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for GeneralizerOptions {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut options = Self::new();
        for (key, value) in iter {
            options.insert(key.as_ref(), value);
        }
        options
    }
}

/// Configuration of the Douglas-Peucker generalizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "DouglasPeuckerSettings", rename_all = "camelCase")]
pub struct DouglasPeuckerConfig {
    tolerance_value: f64,
    max_entries: Option<usize>,
    reduction_rate: i64,
}

impl DouglasPeuckerConfig {
    /// Creates a configuration with the given tolerance and no size cap.
    ///
    /// A tolerance of zero or below is accepted and turns the generalizer into
    /// the identity; only non-finite tolerances are rejected.
    pub fn new(tolerance_value: f64) -> Result<Self, GeneralizerError> {
        if !tolerance_value.is_finite() {
            return Err(GeneralizerError::invalid_config(
                TOLERANCE_VALUE,
                tolerance_value,
                "must be a finite number",
            ));
        }
        Ok(Self {
            tolerance_value,
            max_entries: None,
            reduction_rate: DEFAULT_REDUCTION_RATE,
        })
    }

    /// Caps the number of samples a series may hold.
    #[must_use]
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = Some(max_entries);
        self
    }

    /// Sets the informational reduction rate.
    #[must_use]
    pub fn with_reduction_rate(mut self, reduction_rate: i64) -> Self {
        self.reduction_rate = reduction_rate;
        self
    }

    /// Builds a configuration from request options.
    ///
    /// Any malformed option is an error.
    pub fn from_options(options: &GeneralizerOptions) -> Result<Self, GeneralizerError> {
        let max_entries = options.parse::<i64>(MAX_ENTRIES)?;
        let reduction_rate = options.parse::<i64>(REDUCTION_RATE)?;
        let tolerance_value = options.parse::<f64>(TOLERANCE_VALUE)?;

        let mut config = Self::new(tolerance_value.unwrap_or(DEFAULT_TOLERANCE_VALUE))?
            .with_reduction_rate(reduction_rate.unwrap_or(DEFAULT_REDUCTION_RATE));
        config.max_entries = max_entries_from_signed(max_entries.unwrap_or(-1))?;
        Ok(config)
    }

    /// Perpendicular distance cutoff, in value units.
    pub fn tolerance_value(&self) -> f64 {
        self.tolerance_value
    }

    /// Maximum accepted series length, `None` for unlimited.
    pub fn max_entries(&self) -> Option<usize> {
        self.max_entries
    }

    /// Expected reduction rate; `3` means one third of the input is expected to
    /// survive, `-1` means unknown. Never enforced.
    pub fn reduction_rate(&self) -> i64 {
        self.reduction_rate
    }
}

impl Default for DouglasPeuckerConfig {
    fn default() -> Self {
        Self {
            tolerance_value: DEFAULT_TOLERANCE_VALUE,
            max_entries: None,
            reduction_rate: DEFAULT_REDUCTION_RATE,
        }
    }
}

fn max_entries_from_signed(value: i64) -> Result<Option<usize>, GeneralizerError> {
    match value {
        -1 => Ok(None),
        v => usize::try_from(v).map(Some).map_err(|_| {
            GeneralizerError::invalid_config(MAX_ENTRIES, v, "must be -1 or a non-negative count")
        }),
    }
}

#[derive(Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct DouglasPeuckerSettings {
    tolerance_value: f64,
    max_entries: Option<i64>,
    reduction_rate: i64,
}

impl Default for DouglasPeuckerSettings {
    fn default() -> Self {
        Self {
            tolerance_value: DEFAULT_TOLERANCE_VALUE,
            max_entries: None,
            reduction_rate: DEFAULT_REDUCTION_RATE,
        }
    }
}

impl TryFrom<DouglasPeuckerSettings> for DouglasPeuckerConfig {
    type Error = GeneralizerError;

    fn try_from(settings: DouglasPeuckerSettings) -> Result<Self, Self::Error> {
        let mut config =
            Self::new(settings.tolerance_value)?.with_reduction_rate(settings.reduction_rate);
        config.max_entries = max_entries_from_signed(settings.max_entries.unwrap_or(-1))?;
        Ok(config)
    }
}

/// Configuration of the Largest-Triangle-Three-Buckets generalizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "LttbSettings", rename_all = "camelCase")]
pub struct LttbConfig {
    threshold: usize,
    no_data_gap_threshold: f64,
}

impl LttbConfig {
    /// Creates a configuration.
    ///
    /// `threshold` is the target output size: `0` disables generalization, any
    /// other value must be at least 2 so the first and last sample fit.
    /// `no_data_gap_threshold` up to `1.0` is a fraction of the bucket size, above
    /// `1.0` an absolute count of no-data samples tolerated per bucket.
    pub fn new(threshold: usize, no_data_gap_threshold: f64) -> Result<Self, GeneralizerError> {
        if threshold == 1 {
            return Err(GeneralizerError::invalid_config(
                THRESHOLD,
                threshold,
                "must be 0 or at least 2",
            ));
        }
        Ok(Self {
            threshold,
            no_data_gap_threshold: validate_gap_threshold(no_data_gap_threshold)?,
        })
    }

    /// Builds a configuration from request options.
    ///
    /// Malformed options are logged and replaced by their defaults.
    pub fn from_options(options: &GeneralizerOptions) -> Self {
        let threshold = or_default(
            parse_threshold(options).and_then(|t| match t {
                Some(1) => Err(GeneralizerError::invalid_config(
                    THRESHOLD,
                    1,
                    "must be 0 or at least 2",
                )),
                other => Ok(other),
            }),
            DEFAULT_THRESHOLD,
        );
        let no_data_gap_threshold = or_default(
            options
                .parse::<f64>(NO_DATA_GAP_THRESHOLD)
                .and_then(|t| t.map(validate_gap_threshold).transpose()),
            DEFAULT_NO_DATA_GAP_THRESHOLD,
        );
        Self {
            threshold,
            no_data_gap_threshold,
        }
    }

    /// Target output size, `0` when generalization is disabled.
    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Permissible no-data share (`<= 1.0`) or count (`> 1.0`) per bucket.
    pub fn no_data_gap_threshold(&self) -> f64 {
        self.no_data_gap_threshold
    }
}

impl Default for LttbConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            no_data_gap_threshold: DEFAULT_NO_DATA_GAP_THRESHOLD,
        }
    }
}

fn validate_gap_threshold(value: f64) -> Result<f64, GeneralizerError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(GeneralizerError::invalid_config(
            NO_DATA_GAP_THRESHOLD,
            value,
            "must be a finite, non-negative number",
        ))
    }
}

// Thresholds have historically been sent as decimals ("100.0").
fn parse_threshold(options: &GeneralizerOptions) -> Result<Option<usize>, GeneralizerError> {
    match options.parse::<usize>(THRESHOLD) {
        Ok(t) => Ok(t),
        Err(err) => {
            let Some(value) = options.parse::<f64>(THRESHOLD).ok().flatten() else {
                return Err(err);
            };
            if value.is_finite() && value >= 0.0 && value.fract() == 0.0 {
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                let threshold = value as usize;
                Ok(Some(threshold))
            } else {
                Err(err)
            }
        }
    }
}

fn or_default<T: Copy>(parsed: Result<Option<T>, GeneralizerError>, default: T) -> T {
    match parsed {
        Ok(value) => value.unwrap_or(default),
        Err(_err) => {
            #[cfg(feature = "logging")]
            log::error!("Error reading generalizer options! Using fallback: {_err}");
            default
        }
    }
}

#[derive(Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct LttbSettings {
    threshold: usize,
    no_data_gap_threshold: f64,
}

impl Default for LttbSettings {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            no_data_gap_threshold: DEFAULT_NO_DATA_GAP_THRESHOLD,
        }
    }
}

impl TryFrom<LttbSettings> for LttbConfig {
    type Error = GeneralizerError;

    fn try_from(settings: LttbSettings) -> Result<Self, Self::Error> {
        Self::new(settings.threshold, settings.no_data_gap_threshold)
    }
}

/// A validated configuration for one generalizer.
///
/// The variant decides which algorithm runs, so the algorithm choice is fixed
/// once the configuration has been parsed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "algorithm")]
pub enum GeneralizationConfig {
    /// Recursive line simplification.
    #[serde(rename = "dp", alias = "douglas-peucker")]
    DouglasPeucker(DouglasPeuckerConfig),
    /// Bucket-based triangle area selection.
    #[serde(rename = "lttb", alias = "largest-triangle-three-buckets")]
    Lttb(LttbConfig),
}

impl GeneralizationConfig {
    /// Builds the configuration of `kind` from request options.
    ///
    /// Only Douglas-Peucker can fail here; LTTB falls back to defaults.
    pub fn from_options(
        kind: GeneralizerKind,
        options: &GeneralizerOptions,
    ) -> Result<Self, GeneralizerError> {
        match kind {
            GeneralizerKind::DouglasPeucker => {
                DouglasPeuckerConfig::from_options(options).map(Self::DouglasPeucker)
            }
            GeneralizerKind::LargestTriangleThreeBuckets => {
                Ok(Self::Lttb(LttbConfig::from_options(options)))
            }
        }
    }

    /// The algorithm this configuration selects.
    pub fn kind(&self) -> GeneralizerKind {
        match self {
            Self::DouglasPeucker(_) => GeneralizerKind::DouglasPeucker,
            Self::Lttb(_) => GeneralizerKind::LargestTriangleThreeBuckets,
        }
    }
}

impl Default for GeneralizationConfig {
    fn default() -> Self {
        Self::Lttb(LttbConfig::default())
    }
}

impl From<DouglasPeuckerConfig> for GeneralizationConfig {
    fn from(config: DouglasPeuckerConfig) -> Self {
        Self::DouglasPeucker(config)
    }
}

impl From<LttbConfig> for GeneralizationConfig {
    fn from(config: LttbConfig) -> Self {
        Self::Lttb(config)
    }
}

//! Errors raised by configuration parsing and generalization.

use std::fmt;

/// Errors raised while configuring or running a generalizer.
///
/// Empty series and series below an algorithm's minimum size are not errors:
/// every generalizer returns them unchanged.
#[derive(Debug, Clone, PartialEq)]
pub enum GeneralizerError {
    /// A configuration option could not be parsed or is out of range.
    InvalidConfig {
        /// Name of the offending option.
        option: String,
        /// Raw value as supplied by the caller.
        value: String,
        /// Why the value was rejected.
        reason: String,
    },
    /// The input series holds more samples than the generalizer accepts.
    GeneralizationLimitExceeded {
        /// Number of samples in the rejected series.
        entries: usize,
        /// Configured maximum.
        max_entries: usize,
    },
    /// No generalizer is registered under this name.
    UnknownGeneralizer(String),
}

impl GeneralizerError {
    pub(crate) fn invalid_config(
        option: impl Into<String>,
        value: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        GeneralizerError::InvalidConfig {
            option: option.into(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for GeneralizerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeneralizerError::InvalidConfig {
                option,
                value,
                reason,
            } => {
                write!(f, "invalid value '{value}' for option '{option}': {reason}")
            }
            GeneralizerError::GeneralizationLimitExceeded {
                entries,
                max_entries,
            } => {
                write!(
                    f,
                    "maximum number of entries exceeded ({entries} > {max_entries})"
                )
            }
            GeneralizerError::UnknownGeneralizer(name) => {
                write!(f, "unknown generalizer '{name}'")
            }
        }
    }
}

impl std::error::Error for GeneralizerError {}

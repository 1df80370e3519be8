//! Error types shared by every policy.

use thiserror::Error;

/// Errors raised while configuring, merging or enforcing password policies.
///
/// The variants form a closed set so callers can tell configuration-time,
/// validation-time and merge-time failures apart without inspecting messages.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PolicyError {
    /// The policy configuration is malformed or contains unknown settings.
    #[error("{0}")]
    Configuration(String),
    /// The password does not satisfy a policy. The message is user-facing.
    #[error("{0}")]
    Validation(String),
    /// An unrecognised merge mode was requested.
    #[error("{0} is not a valid merge mode")]
    InvalidMergeMode(String),
    /// A dictionary language could not be loaded.
    #[error("{0}")]
    InvalidDictionaryLanguage(String),
}

impl PolicyError {
    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Returns `true` when the error is a plain password rejection.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

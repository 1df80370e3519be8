//! Length policy - checks password minimum length.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{PasswordPolicy, Validation};
use crate::error::PolicyError;
use crate::merge::MergeMode;
use crate::sources::Sources;

const DEFAULT_MIN_LENGTH: usize = 8;

/// Minimum number of characters a password must have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LengthConfig {
    pub min_length: usize,
}

impl Default for LengthConfig {
    fn default() -> Self {
        Self {
            min_length: DEFAULT_MIN_LENGTH,
        }
    }
}

impl LengthConfig {
    pub fn new(min_length: usize) -> Self {
        Self { min_length }
    }

    /// `null` selects the default, otherwise a non-negative integer is required.
    pub fn from_value(value: &Value) -> Result<Self, PolicyError> {
        match value {
            Value::Null => Ok(Self::default()),
            other => serde_json::from_value(other.clone())
                .map_err(|_| PolicyError::configuration("Invalid minimum password length provided")),
        }
    }
}

/// Ensures that a password meets minimum length requirements.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LengthPolicy {
    config: LengthConfig,
}

impl LengthPolicy {
    pub fn new(config: LengthConfig) -> Self {
        Self { config }
    }
}

impl PasswordPolicy for LengthPolicy {
    type Config = LengthConfig;

    fn from_config(config: Self::Config, _sources: &Sources) -> Result<Self, PolicyError> {
        Ok(Self::new(config))
    }

    fn config(&self) -> &Self::Config {
        &self.config
    }

    fn describe(&self) -> String {
        format!("Must be at least {} characters long.", self.config.min_length)
    }

    fn evaluate(&self, password: &SecretString) -> Result<Validation, PolicyError> {
        let entered = password.expose_secret().chars().count();
        if entered < self.config.min_length {
            return Ok(Validation::fail(format!(
                "Minimum length is set to {}, but {} characters were entered.",
                self.config.min_length, entered
            )));
        }
        Ok(Validation::pass())
    }

    fn merge(a: &Self::Config, b: &Self::Config, mode: MergeMode) -> Self::Config {
        match mode {
            MergeMode::Combine | MergeMode::Maximum => *a.max(b),
            MergeMode::Minimum => *a.min(b),
        }
    }
}

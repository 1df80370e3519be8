//! Common policy - rejects passwords found in a common password list.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{PasswordPolicy, Validation};
use crate::error::PolicyError;
use crate::merge::MergeMode;
use crate::sources::{
    load_password_list, password_list_file, PasswordList, Sources, DEFAULT_PASSWORD_LIST_TIER,
    PASSWORD_LIST_TIERS,
};

const INVALID_SET: &str = "Invalid common password set provided";

/// Size of the common password list to check against.
///
/// Serialized as the bare tier; deserializing rejects unknown tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct CommonConfig {
    pub tier: u32,
}

impl Default for CommonConfig {
    fn default() -> Self {
        Self {
            tier: DEFAULT_PASSWORD_LIST_TIER,
        }
    }
}

impl CommonConfig {
    pub fn new(tier: u32) -> Result<Self, PolicyError> {
        if !PASSWORD_LIST_TIERS.contains(&tier) {
            return Err(PolicyError::configuration(INVALID_SET));
        }
        Ok(Self { tier })
    }

    /// `null` selects the default tier, otherwise one of the known tiers.
    pub fn from_value(value: &Value) -> Result<Self, PolicyError> {
        match value {
            Value::Null => Ok(Self::default()),
            other => serde_json::from_value(other.clone())
                .map_err(|_| PolicyError::configuration(INVALID_SET)),
        }
    }
}

impl TryFrom<u32> for CommonConfig {
    type Error = PolicyError;

    fn try_from(tier: u32) -> Result<Self, Self::Error> {
        Self::new(tier)
    }
}

impl From<CommonConfig> for u32 {
    fn from(config: CommonConfig) -> Self {
        config.tier
    }
}

/// Ensures that a password is not commonly used.
#[derive(Debug, Clone)]
pub struct CommonPolicy {
    config: CommonConfig,
    passwords: Arc<PasswordList>,
}

impl CommonPolicy {
    /// Builds the policy around an already loaded list.
    pub fn with_list(config: CommonConfig, passwords: Arc<PasswordList>) -> Self {
        Self { config, passwords }
    }
}

impl PasswordPolicy for CommonPolicy {
    type Config = CommonConfig;

    fn from_config(config: Self::Config, sources: &Sources) -> Result<Self, PolicyError> {
        let path = password_list_file(sources.password_lists_dir(), config.tier);
        let passwords = load_password_list(&path).map_err(|_e| {
            #[cfg(feature = "tracing")]
            tracing::error!("Common password set {} unavailable: {}", config.tier, _e);
            PolicyError::configuration(INVALID_SET)
        })?;
        Ok(Self::with_list(config, passwords))
    }

    fn config(&self) -> &Self::Config {
        &self.config
    }

    fn describe(&self) -> String {
        format!("Must not be in the top {} common passwords.", self.config.tier)
    }

    fn evaluate(&self, password: &SecretString) -> Result<Validation, PolicyError> {
        if self.passwords.contains(password.expose_secret()) {
            return Ok(Validation::fail("A common password was entered."));
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

//! Password policies
//!
//! Each policy enforces one independent requirement and knows how to
//! describe it, validate a password against it and merge two of its
//! configurations.

mod character_class;
mod common;
mod dictionary;
mod length;

use std::fmt;
use std::str::FromStr;

use secrecy::SecretString;
use serde_json::Value;

use crate::error::PolicyError;
use crate::merge::MergeMode;
use crate::sources::Sources;

pub use character_class::{CharClass, CharacterClassConfig, CharacterClassPolicy, ClassCheck, ClassFlags};
pub use common::{CommonConfig, CommonPolicy};
pub use dictionary::{DictionaryConfig, DictionaryPolicy};
pub use length::{LengthConfig, LengthPolicy};

/// Result of checking a password against a single policy.
///
/// `message` is set when the password is rejected. Character class
/// policies also report which required classes were and were not entered.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Validation {
    pub message: Option<String>,
    pub matched_classes: Option<String>,
    pub missed_classes: Option<String>,
}

impl Validation {
    pub fn pass() -> Self {
        Self::default()
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn with_classes(mut self, matched: String, missed: String) -> Self {
        self.matched_classes = Some(matched);
        self.missed_classes = Some(missed);
        self
    }

    pub fn is_ok(&self) -> bool {
        self.message.is_none()
    }

    /// Turns a rejection into `PolicyError::Validation`.
    pub fn into_result(self) -> Result<(), PolicyError> {
        match self.message {
            Some(message) => Err(PolicyError::Validation(message)),
            None => Ok(()),
        }
    }
}

/// Common contract of every password policy.
pub trait PasswordPolicy: Sized {
    type Config: Clone + PartialEq + Default;

    /// Builds the policy, resolving any external data it needs.
    fn from_config(config: Self::Config, sources: &Sources) -> Result<Self, PolicyError>;

    fn config(&self) -> &Self::Config;

    /// Human-readable requirement.
    fn describe(&self) -> String;

    /// Checks the password. Rejections are reported in the returned
    /// `Validation`; errors are reserved for failures of the policy itself.
    fn evaluate(&self, password: &SecretString) -> Result<Validation, PolicyError>;

    /// Fails with `PolicyError::Validation` when the password is rejected.
    fn validate(&self, password: &SecretString) -> Result<(), PolicyError> {
        self.evaluate(password)?.into_result()
    }

    /// Reconciles two configurations of this policy.
    fn merge(a: &Self::Config, b: &Self::Config, mode: MergeMode) -> Self::Config;
}

/// The closed set of policy kinds a policy set can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PolicyKind {
    Length,
    Common,
    CharacterClass,
    Dictionary,
}

impl PolicyKind {
    pub const ALL: [PolicyKind; 4] = [
        PolicyKind::Length,
        PolicyKind::Common,
        PolicyKind::CharacterClass,
        PolicyKind::Dictionary,
    ];

    /// Registry name, as used for configuration keys and database columns.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Length => "LengthPolicy",
            Self::Common => "CommonPolicy",
            Self::CharacterClass => "CharacterClassPolicy",
            Self::Dictionary => "DictionaryPolicy",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PolicyKind {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| PolicyError::configuration(format!("Unknown policy {}", s)))
    }
}

/// A strongly-typed configuration for one policy kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyConfig {
    Length(LengthConfig),
    Common(CommonConfig),
    CharacterClass(CharacterClassConfig),
    Dictionary(DictionaryConfig),
}

impl PolicyConfig {
    /// Decodes a raw configuration value for `kind`.
    pub fn parse(kind: PolicyKind, value: &Value) -> Result<Self, PolicyError> {
        Ok(match kind {
            PolicyKind::Length => Self::Length(LengthConfig::from_value(value)?),
            PolicyKind::Common => Self::Common(CommonConfig::from_value(value)?),
            PolicyKind::CharacterClass => Self::CharacterClass(CharacterClassConfig::from_value(value)?),
            PolicyKind::Dictionary => Self::Dictionary(DictionaryConfig::from_value(value)?),
        })
    }

    pub fn kind(&self) -> PolicyKind {
        match self {
            Self::Length(_) => PolicyKind::Length,
            Self::Common(_) => PolicyKind::Common,
            Self::CharacterClass(_) => PolicyKind::CharacterClass,
            Self::Dictionary(_) => PolicyKind::Dictionary,
        }
    }

    /// Merges `other` into `self` using the merge rules of their policy.
    ///
    /// # Errors
    ///
    /// A configuration error when the two configurations belong to
    /// different policies.
    pub fn merge(&self, other: &Self, mode: MergeMode) -> Result<Self, PolicyError> {
        let merged = match (self, other) {
            (Self::Length(a), Self::Length(b)) => Self::Length(LengthPolicy::merge(a, b, mode)),
            (Self::Common(a), Self::Common(b)) => Self::Common(CommonPolicy::merge(a, b, mode)),
            (Self::CharacterClass(a), Self::CharacterClass(b)) => {
                Self::CharacterClass(CharacterClassPolicy::merge(a, b, mode))
            }
            (Self::Dictionary(a), Self::Dictionary(b)) => {
                Self::Dictionary(DictionaryPolicy::merge(a, b, mode))
            }
            (a, b) => {
                return Err(PolicyError::configuration(format!(
                    "Cannot merge {} configuration with {} configuration",
                    a.kind(),
                    b.kind()
                )));
            }
        };
        Ok(merged)
    }
}

/// A configured policy of any kind.
#[derive(Debug, Clone)]
pub enum Policy {
    Length(LengthPolicy),
    Common(CommonPolicy),
    CharacterClass(CharacterClassPolicy),
    Dictionary(DictionaryPolicy),
}

impl Policy {
    pub fn from_config(config: &PolicyConfig, sources: &Sources) -> Result<Self, PolicyError> {
        Ok(match config {
            PolicyConfig::Length(c) => Self::Length(LengthPolicy::from_config(*c, sources)?),
            PolicyConfig::Common(c) => Self::Common(CommonPolicy::from_config(*c, sources)?),
            PolicyConfig::CharacterClass(c) => {
                Self::CharacterClass(CharacterClassPolicy::from_config(*c, sources)?)
            }
            PolicyConfig::Dictionary(c) => {
                Self::Dictionary(DictionaryPolicy::from_config(c.clone(), sources)?)
            }
        })
    }

    pub fn kind(&self) -> PolicyKind {
        match self {
            Self::Length(_) => PolicyKind::Length,
            Self::Common(_) => PolicyKind::Common,
            Self::CharacterClass(_) => PolicyKind::CharacterClass,
            Self::Dictionary(_) => PolicyKind::Dictionary,
        }
    }

    /// The configuration the policy was built from.
    pub fn config(&self) -> PolicyConfig {
        match self {
            Self::Length(p) => PolicyConfig::Length(*p.config()),
            Self::Common(p) => PolicyConfig::Common(*p.config()),
            Self::CharacterClass(p) => PolicyConfig::CharacterClass(*p.config()),
            Self::Dictionary(p) => PolicyConfig::Dictionary(p.config().clone()),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Length(p) => p.describe(),
            Self::Common(p) => p.describe(),
            Self::CharacterClass(p) => p.describe(),
            Self::Dictionary(p) => p.describe(),
        }
    }

    pub fn evaluate(&self, password: &SecretString) -> Result<Validation, PolicyError> {
        match self {
            Self::Length(p) => p.evaluate(password),
            Self::Common(p) => p.evaluate(password),
            Self::CharacterClass(p) => p.evaluate(password),
            Self::Dictionary(p) => p.evaluate(password),
        }
    }

    pub fn validate(&self, password: &SecretString) -> Result<(), PolicyError> {
        self.evaluate(password)?.into_result()
    }
}

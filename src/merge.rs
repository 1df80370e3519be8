//! Merge modes used to reconcile two configurations of the same policy.

use std::fmt;
use std::str::FromStr;

use crate::error::PolicyError;

/// Strategy used when a configuration is added for a policy that is
/// already configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MergeMode {
    /// Union of both requirements.
    #[default]
    Combine,
    /// Keep the least restrictive configuration.
    Minimum,
    /// Keep the most restrictive configuration.
    Maximum,
}

impl MergeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Combine => "combine",
            Self::Minimum => "minimum",
            Self::Maximum => "maximum",
        }
    }
}

impl fmt::Display for MergeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MergeMode {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "combine" => Ok(Self::Combine),
            "minimum" => Ok(Self::Minimum),
            "maximum" => Ok(Self::Maximum),
            other => Err(PolicyError::InvalidMergeMode(other.to_string())),
        }
    }
}

//! Policy set - owns the configured policies and runs them.

use secrecy::SecretString;
use serde_json::Value;

use crate::error::PolicyError;
use crate::merge::MergeMode;
use crate::policies::{Policy, PolicyConfig, PolicyKind, Validation};
use crate::sources::Sources;

#[derive(Debug, Clone)]
struct Entry {
    config: PolicyConfig,
    policy: Policy,
}

/// One policy instance per policy kind, kept in insertion order.
///
/// Adding a configuration for a kind that is already present merges the two
/// configurations and rebuilds the policy from the merged one.
#[derive(Debug, Clone)]
pub struct PolicySet {
    entries: Vec<Entry>,
    sources: Sources,
}

impl Default for PolicySet {
    fn default() -> Self {
        Self::new()
    }
}

impl PolicySet {
    /// Empty set resolving external data from the environment.
    pub fn new() -> Self {
        Self::with_sources(Sources::from_env())
    }

    pub fn with_sources(sources: Sources) -> Self {
        Self {
            entries: Vec::new(),
            sources,
        }
    }

    /// Builds a set from `(policy name, configuration)` pairs.
    ///
    /// # Errors
    ///
    /// Unknown policy names and invalid configurations are rejected.
    pub fn from_config<I, K, V>(config: I, sources: Sources) -> Result<Self, PolicyError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        let mut set = Self::with_sources(sources);
        for (name, value) in config {
            let kind: PolicyKind = name.as_ref().parse()?;
            set.add_config(kind, value, MergeMode::Combine)?;
        }
        Ok(set)
    }

    /// Bulk initialization from tabular rows of `(column, value)` pairs.
    ///
    /// Columns that do not name a policy are skipped.
    pub fn init<R, C, K, V>(rows: R, mode: MergeMode, sources: Sources) -> Result<Self, PolicyError>
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        let mut set = Self::with_sources(sources);
        for row in rows {
            for (column, value) in row {
                let Some(kind) = PolicyKind::from_name(column.as_ref()) else {
                    continue;
                };
                set.add_config(kind, value, mode)?;
            }
        }
        Ok(set)
    }

    /// Adds a configuration, merging it with the existing one for `kind`.
    ///
    /// String values are first decoded as JSON; when that fails the string
    /// is handed to the policy unchanged.
    pub fn add_config<V: Into<Value>>(
        &mut self,
        kind: PolicyKind,
        config: V,
        mode: MergeMode,
    ) -> Result<&mut Self, PolicyError> {
        let value = decode_config(config.into());
        let incoming = PolicyConfig::parse(kind, &value)?;

        let config = match self.position(kind) {
            Some(index) => {
                let merged = self.entries[index].config.merge(&incoming, mode)?;
                #[cfg(feature = "tracing")]
                tracing::debug!("Merged {} configuration using {} mode", kind, mode);
                merged
            }
            None => incoming,
        };

        let policy = Policy::from_config(&config, &self.sources)?;
        let entry = Entry { config, policy };
        match self.position(kind) {
            Some(index) => self.entries[index] = entry,
            None => self.entries.push(entry),
        }
        Ok(self)
    }

    /// Adds an already built policy, replacing any policy of the same kind.
    ///
    /// Its configuration is retained for later merges.
    pub fn add_policy(&mut self, policy: Policy) -> &mut Self {
        let entry = Entry {
            config: policy.config(),
            policy,
        };
        match self.position(entry.policy.kind()) {
            Some(index) => self.entries[index] = entry,
            None => self.entries.push(entry),
        }
        self
    }

    /// Removes the policy for `kind`, if any.
    pub fn remove_config(&mut self, kind: PolicyKind) -> &mut Self {
        self.entries.retain(|entry| entry.policy.kind() != kind);
        self
    }

    /// Runs every policy in insertion order and fails on the first rejection.
    pub fn validate_password(&self, password: &SecretString) -> Result<(), PolicyError> {
        for (_, outcome) in self.outcomes(password) {
            outcome?.into_result()?;
        }
        Ok(())
    }

    /// Lazily evaluates each policy in insertion order.
    pub fn outcomes<'a>(
        &'a self,
        password: &'a SecretString,
    ) -> impl Iterator<Item = (PolicyKind, Result<Validation, PolicyError>)> + 'a {
        self.entries
            .iter()
            .map(move |entry| (entry.policy.kind(), entry.policy.evaluate(password)))
    }

    /// Configured policies in insertion order.
    pub fn policies(&self) -> impl Iterator<Item = &Policy> + '_ {
        self.entries.iter().map(|entry| &entry.policy)
    }

    /// Descriptions of every configured policy, in insertion order.
    pub fn descriptions(&self) -> Vec<String> {
        self.entries.iter().map(|entry| entry.policy.describe()).collect()
    }

    pub fn get(&self, kind: PolicyKind) -> Option<&Policy> {
        self.entry(kind).map(|entry| &entry.policy)
    }

    /// The configuration retained for future merges.
    pub fn config(&self, kind: PolicyKind) -> Option<&PolicyConfig> {
        self.entry(kind).map(|entry| &entry.config)
    }

    pub fn kinds(&self) -> impl Iterator<Item = PolicyKind> + '_ {
        self.entries.iter().map(|entry| entry.policy.kind())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, kind: PolicyKind) -> Option<usize> {
        self.entries.iter().position(|entry| entry.policy.kind() == kind)
    }

    fn entry(&self, kind: PolicyKind) -> Option<&Entry> {
        self.entries.iter().find(|entry| entry.policy.kind() == kind)
    }
}

/// Decodes JSON-encoded strings, passing anything else through.
fn decode_config(value: Value) -> Value {
    let Value::String(encoded) = &value else {
        return value;
    };
    match serde_json::from_str(encoded) {
        Ok(decoded) => decoded,
        Err(_e) => {
            #[cfg(feature = "tracing")]
            tracing::debug!("Configuration is not JSON, using it as-is: {}", _e);
            value
        }
    }
}

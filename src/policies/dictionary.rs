//! Dictionary policy - rejects passwords that are dictionary words.

use std::fmt;
use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{PasswordPolicy, Validation};
use crate::error::PolicyError;
use crate::merge::MergeMode;
use crate::sources::{Sources, SpellChecker};

const DEFAULT_DICTIONARY: &str = "EN";

/// Language codes of the dictionaries to check against.
///
/// Deserializes from a single code or a non-empty list of codes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Languages", into = "Vec<String>")]
pub struct DictionaryConfig {
    pub languages: Vec<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Languages {
    One(String),
    Many(Vec<String>),
}

impl Default for DictionaryConfig {
    fn default() -> Self {
        Self {
            languages: vec![DEFAULT_DICTIONARY.to_string()],
        }
    }
}

impl DictionaryConfig {
    pub fn new<I, S>(languages: I) -> Result<Self, PolicyError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let languages: Vec<String> = languages.into_iter().map(Into::into).collect();
        if languages.is_empty() {
            return Err(PolicyError::configuration("No dictionaries provided"));
        }
        Ok(Self { languages })
    }

    /// Accepts `null` (English), a single language code or an array of codes.
    pub fn from_value(value: &Value) -> Result<Self, PolicyError> {
        match value {
            Value::Null => Ok(Self::default()),
            other => serde_json::from_value::<Languages>(other.clone())
                .map_err(|_| PolicyError::configuration("Invalid dictionary provided"))
                .and_then(Self::try_from),
        }
    }
}

impl TryFrom<Languages> for DictionaryConfig {
    type Error = PolicyError;

    fn try_from(languages: Languages) -> Result<Self, Self::Error> {
        match languages {
            Languages::One(language) => Self::new([language]),
            Languages::Many(languages) => Self::new(languages),
        }
    }
}

impl From<DictionaryConfig> for Vec<String> {
    fn from(config: DictionaryConfig) -> Self {
        config.languages
    }
}

/// Ensures that a password is not in the dictionary.
///
/// When the spelling engine is unavailable the policy is not enforced and
/// every password passes.
#[derive(Clone)]
pub struct DictionaryPolicy {
    config: DictionaryConfig,
    checkers: Option<Vec<(String, Arc<dyn SpellChecker>)>>,
}

impl fmt::Debug for DictionaryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DictionaryPolicy")
            .field("config", &self.config)
            .field("enforced", &self.is_enforced())
            .finish()
    }
}

impl DictionaryPolicy {
    /// Builds the policy from checkers that are already loaded.
    ///
    /// Languages of `config` without a checker are reported when a password
    /// is validated.
    pub fn with_checkers<I, S>(config: DictionaryConfig, checkers: I) -> Self
    where
        I: IntoIterator<Item = (S, Arc<dyn SpellChecker>)>,
        S: Into<String>,
    {
        let checkers = checkers
            .into_iter()
            .map(|(language, checker)| (language.into(), checker))
            .collect();
        Self {
            config,
            checkers: Some(checkers),
        }
    }

    /// Whether a spelling engine backs this policy.
    pub fn is_enforced(&self) -> bool {
        self.checkers.is_some()
    }
}

fn loaded_checker<'a>(
    checkers: &'a [(String, Arc<dyn SpellChecker>)],
    language: &str,
) -> Result<&'a dyn SpellChecker, PolicyError> {
    checkers
        .iter()
        .find(|(loaded, _)| loaded == language)
        .map(|(_, checker)| &**checker)
        .ok_or_else(|| {
            PolicyError::InvalidDictionaryLanguage(format!(
                "A dictionary for {} has not been loaded",
                language
            ))
        })
}

impl PasswordPolicy for DictionaryPolicy {
    type Config = DictionaryConfig;

    fn from_config(config: Self::Config, sources: &Sources) -> Result<Self, PolicyError> {
        let provider = sources.dictionaries();
        if !provider.is_available() {
            #[cfg(feature = "tracing")]
            tracing::warn!("Dictionary Policy aborted as no spelling engine is available");
            return Ok(Self {
                config,
                checkers: None,
            });
        }

        let checkers = config
            .languages
            .iter()
            .map(|language| Ok((language.clone(), provider.load(language)?)))
            .collect::<Result<Vec<_>, PolicyError>>()?;

        Ok(Self {
            config,
            checkers: Some(checkers),
        })
    }

    fn config(&self) -> &Self::Config {
        &self.config
    }

    fn describe(&self) -> String {
        "Must not be based on a dictionary word.".to_string()
    }

    fn evaluate(&self, password: &SecretString) -> Result<Validation, PolicyError> {
        let Some(checkers) = &self.checkers else {
            #[cfg(feature = "tracing")]
            tracing::warn!("Dictionary Policy not enforced as no spelling engine is available");
            return Ok(Validation::pass());
        };

        let password = password.expose_secret();
        for language in &self.config.languages {
            if loaded_checker(checkers, language)?.is_known_word(password) {
                return Ok(Validation::fail("A dictionary based password was entered."));
            }
        }
        Ok(Validation::pass())
    }

    fn merge(a: &Self::Config, b: &Self::Config, mode: MergeMode) -> Self::Config {
        match mode {
            MergeMode::Combine => {
                let mut languages = a.languages.clone();
                for language in &b.languages {
                    if !languages.contains(language) {
                        languages.push(language.clone());
                    }
                }
                DictionaryConfig { languages }
            }
            MergeMode::Maximum => {
                if a.languages.len() >= b.languages.len() { a.clone() } else { b.clone() }
            }
            MergeMode::Minimum => {
                if a.languages.len() < b.languages.len() { a.clone() } else { b.clone() }
            }
        }
    }
}

//! Spell-checking collaborators used by the dictionary policy.

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::PolicyError;

/// Answers "is this a known word" for a single language.
pub trait SpellChecker: Send + Sync {
    fn is_known_word(&self, word: &str) -> bool;
}

/// Resolves language codes to spell checkers.
pub trait DictionaryProvider: Send + Sync {
    /// Whether the spelling engine exists at all. When it does not, the
    /// dictionary policy is not enforced.
    fn is_available(&self) -> bool;

    /// Loads the checker for `language`.
    ///
    /// # Errors
    ///
    /// `PolicyError::InvalidDictionaryLanguage` when no dictionary exists
    /// for the language.
    fn load(&self, language: &str) -> Result<Arc<dyn SpellChecker>, PolicyError>;
}

/// Case-insensitive in-memory word list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordList {
    words: HashSet<String>,
}

impl WordList {
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();
        Self { words }
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl SpellChecker for WordList {
    fn is_known_word(&self, word: &str) -> bool {
        self.words.contains(&word.to_lowercase())
    }
}

/// Reads one word list per language from `{dir}/{LANG}.txt`.
///
/// The engine counts as unavailable when `dir` does not exist.
#[derive(Debug, Clone)]
pub struct WordListDictionaries {
    dir: PathBuf,
}

impl WordListDictionaries {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn language_file(&self, language: &str) -> Option<PathBuf> {
        [language.to_string(), language.to_lowercase()]
            .into_iter()
            .map(|name| self.dir.join(format!("{}.txt", name)))
            .find(|path| path.is_file())
    }
}

impl DictionaryProvider for WordListDictionaries {
    fn is_available(&self) -> bool {
        self.dir.is_dir()
    }

    fn load(&self, language: &str) -> Result<Arc<dyn SpellChecker>, PolicyError> {
        let not_loaded =
            || PolicyError::InvalidDictionaryLanguage(format!("Could not load a dictionary for {}", language));

        let path = self.language_file(language).ok_or_else(not_loaded)?;
        let content = std::fs::read_to_string(&path).map_err(|_e| {
            #[cfg(feature = "tracing")]
            tracing::error!("Failed to read word list {:?}: {}", path, _e);
            not_loaded()
        })?;

        let list = WordList::from_words(content.lines());

        #[cfg(feature = "tracing")]
        tracing::info!("Dictionary {} loaded: {} words from {:?}", language, list.len(), path);

        Ok(Arc::new(list))
    }
}

/// Fixed set of in-memory dictionaries keyed by language code.
#[derive(Clone, Default)]
pub struct StaticDictionaries {
    languages: Vec<(String, Arc<WordList>)>,
}

impl StaticDictionaries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_language<I, S>(mut self, language: &str, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.languages
            .push((language.to_string(), Arc::new(WordList::from_words(words))));
        self
    }
}

impl fmt::Debug for StaticDictionaries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.languages.iter().map(|(lang, _)| lang))
            .finish()
    }
}

impl DictionaryProvider for StaticDictionaries {
    fn is_available(&self) -> bool {
        true
    }

    fn load(&self, language: &str) -> Result<Arc<dyn SpellChecker>, PolicyError> {
        self.languages
            .iter()
            .find(|(lang, _)| lang == language)
            .map(|(_, list)| Arc::clone(list) as Arc<dyn SpellChecker>)
            .ok_or_else(|| {
                PolicyError::InvalidDictionaryLanguage(format!(
                    "Could not load a dictionary for {}",
                    language
                ))
            })
    }
}

//! External data sources consulted by policies
//!
//! The common policy reads tiered password lists from disk and the
//! dictionary policy asks a spelling provider about words.

mod dictionary;
mod password_list;

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub use dictionary::{DictionaryProvider, SpellChecker, StaticDictionaries, WordList, WordListDictionaries};
pub use password_list::{
    load_password_list, password_list_file, PasswordList, PasswordListError,
    DEFAULT_PASSWORD_LIST_TIER, PASSWORD_LIST_TIERS,
};

#[cfg(test)]
pub(crate) use password_list::reset_password_lists_for_testing;

/// Environment variable overriding the password list directory.
pub const PASSWORD_LISTS_DIR_ENV: &str = "PWD_COMMON_PASSWORDS_DIR";

/// Environment variable overriding the word list directory.
pub const DICTIONARY_DIR_ENV: &str = "PWD_DICTIONARY_DIR";

/// Returns the directory holding the common password lists.
///
/// Priority:
/// 1. Environment variable `PWD_COMMON_PASSWORDS_DIR`
/// 2. Default path `./assets/common-passwords`
pub fn get_password_lists_dir() -> PathBuf {
    std::env::var(PASSWORD_LISTS_DIR_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("./assets/common-passwords"))
}

/// Returns the directory holding the per-language word lists.
///
/// Priority:
/// 1. Environment variable `PWD_DICTIONARY_DIR`
/// 2. Default path `./assets/dictionaries`
pub fn get_dictionary_dir() -> PathBuf {
    std::env::var(DICTIONARY_DIR_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("./assets/dictionaries"))
}

/// The collaborators a policy set hands to policies at construction time.
#[derive(Clone)]
pub struct Sources {
    password_lists: PathBuf,
    dictionaries: Arc<dyn DictionaryProvider>,
}

impl Sources {
    pub fn new<P: Into<PathBuf>>(password_lists: P, dictionaries: Arc<dyn DictionaryProvider>) -> Self {
        Self {
            password_lists: password_lists.into(),
            dictionaries,
        }
    }

    /// Resolves both directories from the environment.
    pub fn from_env() -> Self {
        Self::new(
            get_password_lists_dir(),
            Arc::new(WordListDictionaries::new(get_dictionary_dir())),
        )
    }

    pub fn password_lists_dir(&self) -> &Path {
        &self.password_lists
    }

    pub fn dictionaries(&self) -> &dyn DictionaryProvider {
        self.dictionaries.as_ref()
    }
}

impl Default for Sources {
    fn default() -> Self {
        Self::from_env()
    }
}

impl fmt::Debug for Sources {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sources")
            .field("password_lists", &self.password_lists)
            .field("dictionaries_available", &self.dictionaries.is_available())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    /// Helper to safely set env var in tests
    fn set_env(key: &str, value: &str) {
        // SAFETY: This is only for testing purposes in single-threaded test context
        unsafe { std::env::set_var(key, value); }
    }

    /// Helper to safely remove env var in tests
    fn remove_env(key: &str) {
        // SAFETY: This is only for testing purposes in single-threaded test context
        unsafe { std::env::remove_var(key); }
    }

    #[test]
    #[serial]
    fn test_default_dirs() {
        remove_env(PASSWORD_LISTS_DIR_ENV);
        remove_env(DICTIONARY_DIR_ENV);

        assert_eq!(get_password_lists_dir(), PathBuf::from("./assets/common-passwords"));
        assert_eq!(get_dictionary_dir(), PathBuf::from("./assets/dictionaries"));
    }

    #[test]
    #[serial]
    fn test_dirs_from_env() {
        set_env(PASSWORD_LISTS_DIR_ENV, "/custom/lists");
        set_env(DICTIONARY_DIR_ENV, "/nonexistent/custom/words");

        let sources = Sources::from_env();
        assert_eq!(sources.password_lists_dir(), Path::new("/custom/lists"));
        assert!(!sources.dictionaries().is_available());

        remove_env(PASSWORD_LISTS_DIR_ENV);
        remove_env(DICTIONARY_DIR_ENV);
    }
}

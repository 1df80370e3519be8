//! Common password lists
//!
//! Loads the tiered common-password files and answers exact-match queries.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use once_cell::sync::Lazy;
use thiserror::Error;

/// Password list sizes that ship as separate files.
pub const PASSWORD_LIST_TIERS: [u32; 6] = [100, 500, 1_000, 10_000, 100_000, 1_000_000];

/// Tier used when a common policy is configured without one.
pub const DEFAULT_PASSWORD_LIST_TIER: u32 = 10_000;

static PASSWORD_LISTS: Lazy<RwLock<HashMap<PathBuf, Arc<PasswordList>>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

#[derive(Error, Debug)]
pub enum PasswordListError {
    #[error("Password list file not found: {0}")]
    FileNotFound(PathBuf),
    #[error("Failed to read password list file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("Password list file is empty")]
    EmptyFile,
}

/// A line-delimited list of common passwords.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordList {
    entries: HashSet<String>,
}

impl PasswordList {
    /// Builds a list from in-memory entries. Entries are trimmed, blanks dropped.
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let entries = entries
            .into_iter()
            .map(|e| e.as_ref().trim().to_string())
            .filter(|e| !e.is_empty())
            .collect();
        Self { entries }
    }

    /// Exact match against a trimmed line of the list.
    pub fn contains(&self, password: &str) -> bool {
        self.entries.contains(password)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Returns the file holding the list for `tier` inside `dir`.
pub fn password_list_file(dir: &Path, tier: u32) -> PathBuf {
    dir.join(format!("10-million-password-list-top-{}.txt", tier))
}

/// Loads a password list from a specific file path.
///
/// Lists are cached by path for the lifetime of the process, so a second
/// call for the same file returns the already loaded list.
///
/// # Errors
///
/// Returns error if:
/// - File does not exist
/// - File cannot be read
/// - File is empty
pub fn load_password_list<P: AsRef<Path>>(path: P) -> Result<Arc<PasswordList>, PasswordListError> {
    let path = path.as_ref();

    {
        let guard = PASSWORD_LISTS.read().unwrap_or_else(|e| e.into_inner());
        if let Some(list) = guard.get(path) {
            return Ok(Arc::clone(list));
        }
    }

    if !path.exists() {
        #[cfg(feature = "tracing")]
        tracing::error!("Password list loading FAILED: FileNotFound {:?}", path);
        return Err(PasswordListError::FileNotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path)?;

    if content.trim().is_empty() {
        #[cfg(feature = "tracing")]
        tracing::error!("Password list loading FAILED: Empty file {:?}", path);
        return Err(PasswordListError::EmptyFile);
    }

    let list = Arc::new(PasswordList::from_entries(content.lines()));

    #[cfg(feature = "tracing")]
    tracing::info!("Password list loaded: {} passwords from {:?}", list.len(), path);

    let mut guard = PASSWORD_LISTS.write().unwrap_or_else(|e| e.into_inner());
    let cached = guard
        .entry(path.to_path_buf())
        .or_insert_with(|| Arc::clone(&list));
    Ok(Arc::clone(cached))
}

/// Drops every cached list.
#[cfg(test)]
pub fn reset_password_lists_for_testing() {
    let mut guard = PASSWORD_LISTS.write().unwrap_or_else(|e| e.into_inner());
    guard.clear();
}

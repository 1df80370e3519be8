//! Composable password policies
//!
//! This library validates passwords against a set of independent policies
//! (minimum length, character class diversity, common password lists,
//! dictionary words), describes the requirements in plain English and
//! merges configurations coming from several sources.
//!
//! # Features
//!
//! - `async` (default): Enables cancellable evaluation and channel delivery
//! - `tracing`: Enables logging via tracing crate
//!
//! # Environment Variables
//!
//! - `PWD_COMMON_PASSWORDS_DIR`: Directory holding the common password lists
//!   (default: `./assets/common-passwords`)
//! - `PWD_DICTIONARY_DIR`: Directory holding one word list per language
//!   (default: `./assets/dictionaries`)
//!
//! # Example
//!
//! ```rust,no_run
//! use pwd_policy::{MergeMode, PolicyKind, PolicySet};
//! use secrecy::SecretString;
//!
//! let mut policies = PolicySet::new();
//! policies
//!     .add_config(PolicyKind::Length, 10, MergeMode::Combine)?
//!     .add_config(PolicyKind::CharacterClass, r#"{"diversity":3}"#, MergeMode::Combine)?;
//!
//! for requirement in policies.descriptions() {
//!     println!("{}", requirement);
//! }
//!
//! let password = SecretString::new("MyP@ssw0rd!".to_string().into());
//! policies.validate_password(&password)?;
//! # Ok::<(), pwd_policy::PolicyError>(())
//! ```

// Internal modules
mod error;
mod evaluator;
mod merge;
mod policies;
mod policy_set;
mod sources;

// Public API
pub use error::PolicyError;
pub use evaluator::{evaluate_password, PolicyEvaluation, PolicyOutcome};
pub use merge::MergeMode;
pub use policies::{
    CharClass, CharacterClassConfig, CharacterClassPolicy, ClassCheck, ClassFlags, CommonConfig,
    CommonPolicy, DictionaryConfig, DictionaryPolicy, LengthConfig, LengthPolicy, PasswordPolicy,
    Policy, PolicyConfig, PolicyKind, Validation,
};
pub use policy_set::PolicySet;
pub use sources::{
    get_dictionary_dir, get_password_lists_dir, load_password_list, password_list_file,
    DictionaryProvider, PasswordList, PasswordListError, Sources, SpellChecker,
    StaticDictionaries, WordList, WordListDictionaries, DEFAULT_PASSWORD_LIST_TIER,
    DICTIONARY_DIR_ENV, PASSWORD_LISTS_DIR_ENV, PASSWORD_LIST_TIERS,
};

#[cfg(feature = "async")]
pub use evaluator::evaluate_password_tx;

//! Character class policy - requires a number of distinct character classes.

use once_cell::sync::Lazy;
use regex::Regex;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{PasswordPolicy, Validation};
use crate::error::PolicyError;
use crate::merge::MergeMode;
use crate::sources::Sources;

const INVALID_POLICY: &str = "Invalid character class policy provided";
const INVALID_SETTINGS: &str = "Character class policy contains invalid settings";

/// A category of characters counted towards password diversity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CharClass {
    Uppercase,
    Lowercase,
    Number,
    Symbol,
    Accented,
}

static CLASS_PATTERNS: Lazy<[Regex; 5]> = Lazy::new(|| {
    CharClass::ALL.map(|class| Regex::new(class.pattern()).expect("character class pattern is valid"))
});

impl CharClass {
    /// Every class, in the order they are evaluated and listed.
    pub const ALL: [CharClass; 5] = [
        CharClass::Uppercase,
        CharClass::Lowercase,
        CharClass::Number,
        CharClass::Symbol,
        CharClass::Accented,
    ];

    /// Configuration key of the class.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Uppercase => "uppercase",
            Self::Lowercase => "lowercase",
            Self::Number => "number",
            Self::Symbol => "symbol",
            Self::Accented => "accented",
        }
    }

    /// Noun phrase used in descriptions and messages.
    pub fn phrase(&self) -> &'static str {
        match self {
            Self::Uppercase => "an uppercase letter",
            Self::Lowercase => "a lowercase letter",
            Self::Number => "a number",
            Self::Symbol => "a symbol",
            Self::Accented => "an accented character",
        }
    }

    /// Looks a class up by its configuration key.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|class| class.name() == name)
    }

    fn pattern(&self) -> &'static str {
        match self {
            Self::Uppercase => "[A-Z]",
            Self::Lowercase => "[a-z]",
            Self::Number => "[0-9]",
            Self::Symbol => {
                r##"[!"#$%&'()*+,.:;<=>?@\[\^_`{|}~‘’“”•–—˜™›œ¡¢£¤¥¦§¨©ª«¬®¯°±²³´µ¶·¸¹º»¼½¾¿Æ×Þßæ÷þ\-/\] ]"##
            }
            Self::Accented => {
                "[šžŸÀÁÂÃÄÅÇÈÉÊËÌÍÎÏÐÑÒÓÔÕÖØÙÚÛÜÝàáâãäåçèéêëìíîïðñòóôõöøùúûüýÿ]"
            }
        }
    }

    /// Whether at least one character of `password` belongs to this class.
    pub fn is_present_in(&self, password: &str) -> bool {
        CLASS_PATTERNS[*self as usize].is_match(password)
    }
}

/// Which character classes are required.
///
/// Flags left out of a deserialized value keep their default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClassFlags {
    pub uppercase: bool,
    pub lowercase: bool,
    pub number: bool,
    pub symbol: bool,
    pub accented: bool,
}

impl Default for ClassFlags {
    fn default() -> Self {
        Self {
            uppercase: true,
            lowercase: true,
            number: true,
            symbol: false,
            accented: false,
        }
    }
}

impl ClassFlags {
    /// No class required.
    pub fn none() -> Self {
        Self {
            uppercase: false,
            lowercase: false,
            number: false,
            symbol: false,
            accented: false,
        }
    }

    /// Whether `class` is required.
    pub fn get(&self, class: CharClass) -> bool {
        match class {
            CharClass::Uppercase => self.uppercase,
            CharClass::Lowercase => self.lowercase,
            CharClass::Number => self.number,
            CharClass::Symbol => self.symbol,
            CharClass::Accented => self.accented,
        }
    }

    /// Marks `class` as required or not.
    pub fn set(&mut self, class: CharClass, required: bool) {
        let flag = match class {
            CharClass::Uppercase => &mut self.uppercase,
            CharClass::Lowercase => &mut self.lowercase,
            CharClass::Number => &mut self.number,
            CharClass::Symbol => &mut self.symbol,
            CharClass::Accented => &mut self.accented,
        };
        *flag = required;
    }

    /// Required classes in evaluation order.
    pub fn required(&self) -> impl Iterator<Item = CharClass> + '_ {
        CharClass::ALL.into_iter().filter(|class| self.get(*class))
    }

    /// Number of required classes.
    pub fn count(&self) -> usize {
        self.required().count()
    }

    /// Classes required by either side.
    pub fn union(&self, other: &Self) -> Self {
        let mut flags = Self::none();
        for class in CharClass::ALL {
            flags.set(class, self.get(class) || other.get(class));
        }
        flags
    }
}

/// Configuration of the character class policy.
///
/// `diversity` is the number of distinct required classes a password must
/// contain. When it equals the number of required classes every one of them
/// is mandatory, when lower any `diversity` of them will do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CharacterClassConfig {
    pub classes: ClassFlags,
    pub diversity: u32,
}

impl Default for CharacterClassConfig {
    fn default() -> Self {
        Self {
            classes: ClassFlags::default(),
            diversity: 3,
        }
    }
}

impl CharacterClassConfig {
    /// Applies a raw configuration on top of the defaults.
    ///
    /// Accepts `null` (defaults), an object with `classes` and/or `diversity`,
    /// or a JSON string encoding such an object.
    pub fn from_value(value: &Value) -> Result<Self, PolicyError> {
        match value {
            Value::Null => Ok(Self::default()),
            Value::String(encoded) => {
                let decoded: Value = serde_json::from_str(encoded)
                    .map_err(|_| PolicyError::configuration(INVALID_POLICY))?;
                match decoded {
                    Value::Object(_) | Value::Null => Self::from_value(&decoded),
                    _ => Err(PolicyError::configuration(INVALID_POLICY)),
                }
            }
            Value::Object(_) => serde_json::from_value(value.clone()).map_err(|_e| {
                #[cfg(feature = "tracing")]
                tracing::debug!("Rejected character class settings: {}", _e);
                PolicyError::configuration(INVALID_SETTINGS)
            }),
            _ => Err(PolicyError::configuration(INVALID_POLICY)),
        }
    }

    /// True when every required class is mandatory.
    pub fn requires_all(&self) -> bool {
        self.classes.count() == self.diversity as usize
    }
}

/// Outcome of matching a password against the configured classes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassCheck {
    found: Vec<CharClass>,
    missing: Vec<CharClass>,
}

impl ClassCheck {
    /// Required classes present in the password.
    pub fn found(&self) -> &[CharClass] {
        &self.found
    }

    /// Required classes absent from the password.
    pub fn missing(&self) -> &[CharClass] {
        &self.missing
    }

    pub fn matched_summary(&self) -> String {
        format!("You entered {}.", join_classes(&self.found, "and"))
    }

    pub fn missed_summary(&self) -> String {
        format!("You did not enter {}.", join_classes(&self.missing, "or"))
    }
}

/// Ensures a password contains enough different character classes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterClassPolicy {
    config: CharacterClassConfig,
    required_class_count: usize,
}

impl Default for CharacterClassPolicy {
    fn default() -> Self {
        Self::new(CharacterClassConfig::default())
    }
}

impl CharacterClassPolicy {
    pub fn new(config: CharacterClassConfig) -> Self {
        Self {
            required_class_count: config.classes.count(),
            config,
        }
    }

    /// Matches every class against the password without deciding pass/fail.
    pub fn check(&self, password: &str) -> ClassCheck {
        let (found, missing): (Vec<_>, Vec<_>) = self
            .config
            .classes
            .required()
            .partition(|class| class.is_present_in(password));
        ClassCheck { found, missing }
    }

    fn required_classes(&self, final_word: &str) -> String {
        let required: Vec<CharClass> = self.config.classes.required().collect();
        join_classes(&required, final_word)
    }

    fn strongest_or_weakest(
        a: &CharacterClassConfig,
        b: &CharacterClassConfig,
        strongest: bool,
    ) -> CharacterClassConfig {
        let (stronger, weaker) = if a.diversity != b.diversity {
            if a.diversity > b.diversity { (a, b) } else { (b, a) }
        } else if a.classes.count() > b.classes.count() {
            // equal diversity: fewer mandatory classes counts as stricter
            (b, a)
        } else {
            (a, b)
        };
        if strongest { *stronger } else { *weaker }
    }
}

impl PasswordPolicy for CharacterClassPolicy {
    type Config = CharacterClassConfig;

    fn from_config(config: Self::Config, _sources: &Sources) -> Result<Self, PolicyError> {
        Ok(Self::new(config))
    }

    fn config(&self) -> &Self::Config {
        &self.config
    }

    fn describe(&self) -> String {
        if self.required_class_count == self.config.diversity as usize {
            return format!("Must contain {}.", self.required_classes("and"));
        }
        format!(
            "Must contain at least {} of {}.",
            self.config.diversity,
            self.required_classes("or")
        )
    }

    fn evaluate(&self, password: &SecretString) -> Result<Validation, PolicyError> {
        let check = self.check(password.expose_secret());
        let found = check.found().len();
        let diversity = self.config.diversity as usize;

        let validation = if found >= diversity {
            Validation::pass()
        } else if self.required_class_count > diversity {
            Validation::fail(format!(
                "Your password must contain {} character types from {}, you provided {}.",
                diversity,
                self.required_classes("or"),
                found
            ))
        } else {
            Validation::fail(format!(
                "Your password must contain at least {}.",
                self.required_classes("and")
            ))
        };

        Ok(validation.with_classes(check.matched_summary(), check.missed_summary()))
    }

    fn merge(a: &Self::Config, b: &Self::Config, mode: MergeMode) -> Self::Config {
        if a == b {
            return *a;
        }
        match mode {
            MergeMode::Combine => {
                let classes = a.classes.union(&b.classes);
                let diversity = if a.requires_all() && b.requires_all() {
                    classes.count() as u32
                } else {
                    a.diversity.max(b.diversity)
                };
                CharacterClassConfig { classes, diversity }
            }
            MergeMode::Maximum => Self::strongest_or_weakest(a, b, true),
            MergeMode::Minimum => Self::strongest_or_weakest(a, b, false),
        }
    }
}

/// Joins class phrases with commas, using `final_word` before the last one.
fn join_classes(classes: &[CharClass], final_word: &str) -> String {
    let phrases: Vec<&str> = classes.iter().map(|class| class.phrase()).collect();
    join_phrases(&phrases, final_word)
}

pub(crate) fn join_phrases(phrases: &[&str], final_word: &str) -> String {
    match phrases.split_last() {
        None => String::new(),
        Some((last, [])) => last.to_string(),
        Some((last, rest)) => format!("{} {} {}", rest.join(", "), final_word, last),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::StaticDictionaries;
    use serde_json::json;
    use std::sync::Arc;

    const ALL_DEFAULT: &str =
        "Your password must contain at least an uppercase letter, a lowercase letter and a number.";
    const ALL_FULL: &str = "Your password must contain at least an uppercase letter, a lowercase letter, a number, a symbol and an accented character.";
    const ALL_JSON: &str =
        "Your password must contain at least an uppercase letter, a lowercase letter, a number and a symbol.";

    fn sources() -> Sources {
        Sources::new("/nonexistent", Arc::new(StaticDictionaries::new()))
    }

    fn policy(config: Value) -> CharacterClassPolicy {
        let config = CharacterClassConfig::from_value(&config).expect("config should parse");
        CharacterClassPolicy::from_config(config, &sources()).expect("policy should build")
    }

    fn secret(password: &str) -> SecretString {
        SecretString::new(password.to_string().into())
    }

    fn basic() -> Value {
        json!({
            "classes": {
                "uppercase": false,
                "lowercase": true,
                "number": false,
                "symbol": false,
                "accented": false
            },
            "diversity": 1
        })
    }

    fn full() -> Value {
        json!({
            "classes": {
                "uppercase": true,
                "lowercase": true,
                "number": true,
                "symbol": true,
                "accented": true
            },
            "diversity": 5
        })
    }

    fn partial() -> Value {
        json!({ "classes": { "symbol": true } })
    }

    fn encoded() -> Value {
        Value::String(r#"{"classes":{"symbol":true},"diversity":4}"#.to_string())
    }

    fn assert_accepts(policy: &CharacterClassPolicy, passwords: &[&str]) {
        for password in passwords {
            assert_eq!(
                policy.validate(&secret(password)),
                Ok(()),
                "expected {:?} to pass",
                password
            );
        }
    }

    fn assert_rejects(policy: &CharacterClassPolicy, cases: &[(&str, &str)]) {
        for (password, message) in cases {
            assert_eq!(
                policy.validate(&secret(password)),
                Err(PolicyError::Validation(message.to_string())),
                "unexpected outcome for {:?}",
                password
            );
        }
    }

    #[test]
    fn test_join_phrases() {
        assert_eq!(join_phrases(&[], "and"), "");
        assert_eq!(join_phrases(&["a"], "and"), "a");
        assert_eq!(join_phrases(&["a", "b"], "or"), "a or b");
        assert_eq!(join_phrases(&["a", "b", "c"], "and"), "a, b and c");
    }

    #[test]
    fn test_accented_is_not_uppercase() {
        assert!(CharClass::Accented.is_present_in("Ÿ"));
        assert!(!CharClass::Uppercase.is_present_in("Ÿ"));
        assert!(CharClass::Symbol.is_present_in("a b"));
        assert!(CharClass::Symbol.is_present_in("]"));
        assert!(CharClass::Symbol.is_present_in("-"));
        assert!(!CharClass::Symbol.is_present_in("Aa0é"));
    }

    #[test]
    fn test_rejects_invalid_policy() {
        for config in [json!(true), json!(3), json!(["uppercase"]), json!("not json")] {
            assert_eq!(
                CharacterClassConfig::from_value(&config),
                Err(PolicyError::Configuration(INVALID_POLICY.to_string()))
            );
        }
    }

    #[test]
    fn test_rejects_invalid_settings() {
        let configs = [
            json!({ "required": true }),
            json!({ "classes": { "ascii": true } }),
            json!({ "classes": { "symbol": "yes" } }),
            json!({ "classes": { "symbol": null } }),
            json!({ "diversity": -1 }),
            json!({ "diversity": 1.5 }),
        ];
        for config in configs {
            assert_eq!(
                CharacterClassConfig::from_value(&config),
                Err(PolicyError::Configuration(INVALID_SETTINGS.to_string())),
                "config {} should be rejected",
                config
            );
        }
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = CharacterClassConfig::from_value(&partial()).unwrap();
        assert_eq!(config.diversity, 3);
        assert_eq!(config.classes.count(), 4);
        assert!(config.classes.symbol);
        assert!(!config.classes.accented);
    }

    #[test]
    fn test_deserialize_fills_in_defaults() {
        let config: CharacterClassConfig = serde_json::from_value(partial()).unwrap();
        assert_eq!(config, CharacterClassConfig::from_value(&partial()).unwrap());
        assert_eq!(config.diversity, 3);
        assert_eq!(
            config.classes.required().map(|class| class.name()).collect::<Vec<_>>(),
            vec!["uppercase", "lowercase", "number", "symbol"]
        );

        let flags: ClassFlags = serde_json::from_value(json!({ "uppercase": false })).unwrap();
        assert!(!flags.get(CharClass::from_name("uppercase").unwrap()));
        assert_eq!(flags.count(), 2);

        assert!(serde_json::from_value::<ClassFlags>(json!({ "ascii": true })).is_err());
        assert!(serde_json::from_value::<CharacterClassConfig>(json!({ "required": 1 })).is_err());
    }

    #[test]
    fn test_works_with_no_configuration() {
        let policy = policy(Value::Null);
        assert_eq!(
            policy.describe(),
            "Must contain an uppercase letter, a lowercase letter and a number."
        );
        assert_accepts(&policy, &["Aa0", "Aa0#", "Aa0Ÿ", "Aa0#Ÿ"]);
        assert_rejects(
            &policy,
            &[
                ("A", ALL_DEFAULT),
                ("Ÿ", ALL_DEFAULT),
                ("Aa", ALL_DEFAULT),
                ("a0#", ALL_DEFAULT),
                ("AaŸ", ALL_DEFAULT),
                ("A0#Ÿ", ALL_DEFAULT),
            ],
        );
    }

    #[test]
    fn test_works_with_basic_configuration() {
        let policy = policy(basic());
        assert_eq!(policy.describe(), "Must contain a lowercase letter.");
        assert_accepts(&policy, &["a", "Aa", "a#", "aŸ", "Aa0#Ÿ"]);
        let message = "Your password must contain at least a lowercase letter.";
        assert_rejects(&policy, &[("A", message), ("0#", message), ("A0#Ÿ", message)]);
    }

    #[test]
    fn test_works_with_full_configuration() {
        let policy = policy(full());
        assert_eq!(
            policy.describe(),
            "Must contain an uppercase letter, a lowercase letter, a number, a symbol and an accented character."
        );
        assert_accepts(&policy, &["Aa0#Ÿ"]);
        assert_rejects(&policy, &[("Aa0#", ALL_FULL), ("a0#Ÿ", ALL_FULL), ("#", ALL_FULL)]);
    }

    #[test]
    fn test_works_with_partial_configuration() {
        let policy = policy(partial());
        assert_eq!(
            policy.describe(),
            "Must contain at least 3 of an uppercase letter, a lowercase letter, a number or a symbol."
        );
        assert_accepts(&policy, &["Aa0", "Aa#", "A0#", "a0#", "Aa0#", "A0#Ÿ"]);

        let cases = [("A", 1), ("Ÿ", 0), ("Aa", 2), ("aŸ", 1), ("0#Ÿ", 2)];
        for (password, provided) in cases {
            let message = format!(
                "Your password must contain 3 character types from an uppercase letter, a lowercase letter, a number or a symbol, you provided {}.",
                provided
            );
            assert_rejects(&policy, &[(password, message.as_str())]);
        }
    }

    #[test]
    fn test_works_with_encoded_configuration() {
        let policy = policy(encoded());
        assert_eq!(
            policy.describe(),
            "Must contain an uppercase letter, a lowercase letter, a number and a symbol."
        );
        assert_accepts(&policy, &["Aa0#", "Aa0#Ÿ"]);
        assert_rejects(&policy, &[("Aa0", ALL_JSON), ("Aa0Ÿ", ALL_JSON), ("a0#Ÿ", ALL_JSON)]);
    }

    #[test]
    fn test_reports_matched_and_missed_classes() {
        let policy = policy(partial());
        let validation = policy.evaluate(&secret("Aa")).unwrap();

        assert!(!validation.is_ok());
        assert_eq!(
            validation.matched_classes.as_deref(),
            Some("You entered an uppercase letter and a lowercase letter.")
        );
        assert_eq!(
            validation.missed_classes.as_deref(),
            Some("You did not enter a number or a symbol.")
        );
    }

    #[test]
    fn test_summaries_present_on_success() {
        let policy = policy(Value::Null);
        let validation = policy.evaluate(&secret("Aa0")).unwrap();

        assert!(validation.is_ok());
        assert_eq!(
            validation.matched_classes.as_deref(),
            Some("You entered an uppercase letter, a lowercase letter and a number.")
        );
        assert_eq!(validation.missed_classes.as_deref(), Some("You did not enter ."));
    }

    #[test]
    fn test_summaries_when_no_required_class_entered() {
        let strict = policy(Value::Null);
        let validation = strict.evaluate(&secret("#!é")).unwrap();

        assert!(!validation.is_ok());
        assert_eq!(validation.matched_classes.as_deref(), Some("You entered ."));
        assert_eq!(
            validation.missed_classes.as_deref(),
            Some("You did not enter an uppercase letter, a lowercase letter or a number.")
        );

        let lenient = policy(json!({ "diversity": 0 }));
        let validation = lenient.evaluate(&secret("#!é")).unwrap();
        assert!(validation.is_ok());
        assert_eq!(validation.matched_classes.as_deref(), Some("You entered ."));
    }

    #[test]
    fn test_zero_diversity_accepts_everything() {
        let policy = policy(json!({ "diversity": 0 }));
        assert_accepts(&policy, &["", "Ÿ", "#"]);
        assert_eq!(
            policy.describe(),
            "Must contain at least 0 of an uppercase letter, a lowercase letter or a number."
        );
    }

    #[test]
    fn test_merge_combine_over_default() {
        let a = CharacterClassConfig::default();
        let b = CharacterClassConfig::from_value(&encoded()).unwrap();

        let merged = CharacterClassPolicy::merge(&a, &b, MergeMode::Combine);
        assert_eq!(merged.classes.count(), 4);
        assert!(merged.classes.symbol);
        assert_eq!(merged.diversity, 4);
        assert_eq!(
            CharacterClassPolicy::new(merged).describe(),
            "Must contain an uppercase letter, a lowercase letter, a number and a symbol."
        );
    }

    #[test]
    fn test_merge_combine_keeps_all_semantics() {
        let a = CharacterClassConfig::from_value(&basic()).unwrap();
        let mut flags = ClassFlags::none();
        flags.symbol = true;
        flags.accented = true;
        let b = CharacterClassConfig { classes: flags, diversity: 2 };

        let ab = CharacterClassPolicy::merge(&a, &b, MergeMode::Combine);
        let ba = CharacterClassPolicy::merge(&b, &a, MergeMode::Combine);
        assert_eq!(ab.diversity, 3);
        assert_eq!(ab, ba);
    }

    #[test]
    fn test_merge_combine_some_mode_takes_max_diversity() {
        let a = CharacterClassConfig::from_value(&partial()).unwrap();
        let b = CharacterClassConfig::from_value(&basic()).unwrap();

        let merged = CharacterClassPolicy::merge(&a, &b, MergeMode::Combine);
        assert_eq!(merged.classes.count(), 4);
        assert_eq!(merged.diversity, 3);
    }

    #[test]
    fn test_merge_combine_is_idempotent() {
        let a = CharacterClassConfig::from_value(&partial()).unwrap();
        assert_eq!(CharacterClassPolicy::merge(&a, &a, MergeMode::Combine), a);
    }

    #[test]
    fn test_merge_maximum_prefers_higher_diversity() {
        let a = CharacterClassConfig::default();
        let b = CharacterClassConfig::from_value(&full()).unwrap();

        assert_eq!(CharacterClassPolicy::merge(&a, &b, MergeMode::Maximum), b);
        assert_eq!(CharacterClassPolicy::merge(&a, &b, MergeMode::Minimum), a);
    }

    #[test]
    fn test_merge_tie_prefers_fewer_classes_as_stronger() {
        let a = CharacterClassConfig::default();
        let b = CharacterClassConfig::from_value(&partial()).unwrap();
        assert_eq!(a.diversity, b.diversity);

        assert_eq!(CharacterClassPolicy::merge(&a, &b, MergeMode::Maximum), a);
        assert_eq!(CharacterClassPolicy::merge(&b, &a, MergeMode::Maximum), a);
        assert_eq!(CharacterClassPolicy::merge(&a, &b, MergeMode::Minimum), b);
        assert_eq!(CharacterClassPolicy::merge(&b, &a, MergeMode::Minimum), b);
    }

    #[test]
    fn test_merge_tie_with_equal_counts_is_complementary() {
        let a = CharacterClassConfig::default();
        let mut flags = ClassFlags::default();
        flags.number = false;
        flags.symbol = true;
        let b = CharacterClassConfig { classes: flags, diversity: 3 };

        let max = CharacterClassPolicy::merge(&a, &b, MergeMode::Maximum);
        let min = CharacterClassPolicy::merge(&a, &b, MergeMode::Minimum);
        assert_eq!(max, a);
        assert_eq!(min, b);
    }

    #[test]
    fn test_config_serializes_every_class() {
        let value = serde_json::to_value(CharacterClassConfig::default()).unwrap();
        assert_eq!(
            value,
            json!({
                "classes": {
                    "uppercase": true,
                    "lowercase": true,
                    "number": true,
                    "symbol": false,
                    "accented": false
                },
                "diversity": 3
            })
        );
    }
}

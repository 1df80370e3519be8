//! Password evaluator - reports the outcome of every policy at once.

use secrecy::SecretString;

#[cfg(feature = "async")]
use tokio::sync::mpsc;

#[cfg(feature = "async")]
use tokio_util::sync::CancellationToken;

use crate::error::PolicyError;
use crate::policies::{PolicyKind, Validation};
use crate::policy_set::PolicySet;

/// Outcome of a single policy within an evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyOutcome {
    pub policy: PolicyKind,
    pub validation: Validation,
}

/// Aggregated outcome of running every policy of a set.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PolicyEvaluation {
    pub outcomes: Vec<PolicyOutcome>,
    /// Set when a policy failed for a reason other than rejecting the password.
    pub error: Option<PolicyError>,
    pub cancelled: bool,
}

impl PolicyEvaluation {
    /// True when the evaluation ran to completion and no policy rejected the password.
    pub fn is_valid(&self) -> bool {
        !self.cancelled && self.error.is_none() && self.outcomes.iter().all(|o| o.validation.is_ok())
    }

    /// Messages of every rejecting policy, in policy order.
    pub fn reasons(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter_map(|o| o.validation.message.as_deref())
            .collect()
    }
}

/// Evaluates the password against every policy instead of stopping at the
/// first rejection.
///
/// # Arguments
/// * `set` - The configured policies
/// * `password` - The password to evaluate
/// * `token` - Optional cancellation token (async feature only)
pub fn evaluate_password(
    set: &PolicySet,
    password: &SecretString,
    #[cfg(feature = "async")] token: Option<CancellationToken>,
) -> PolicyEvaluation {
    let mut evaluation = PolicyEvaluation::default();

    for policy in set.policies() {
        // Check cancellation before each policy (async only)
        #[cfg(feature = "async")]
        {
            if let Some(ref t) = token {
                if t.is_cancelled() {
                    evaluation.cancelled = true;
                    break;
                }
            }
        }

        match policy.evaluate(password) {
            Ok(validation) => evaluation.outcomes.push(PolicyOutcome {
                policy: policy.kind(),
                validation,
            }),
            Err(e) => {
                #[cfg(feature = "tracing")]
                tracing::error!("Fatal error while evaluating {}: {}", policy.kind(), e);
                evaluation.error = Some(e);
                break;
            }
        }
    }

    evaluation
}

/// Delay before an evaluation starts, so bursts of keystrokes collapse.
#[cfg(feature = "async")]
const DEBOUNCE: std::time::Duration = std::time::Duration::from_millis(300);

/// Async version that sends the evaluation result via channel.
#[cfg(feature = "async")]
pub async fn evaluate_password_tx(
    set: &PolicySet,
    password: &SecretString,
    token: CancellationToken,
    tx: mpsc::Sender<PolicyEvaluation>,
) {
    #[cfg(feature = "tracing")]
    tracing::info!("evaluation is about to start...");

    tokio::time::sleep(DEBOUNCE).await;
    let evaluation = evaluate_password(set, password, Some(token));

    if let Err(_e) = tx.send(evaluation).await {
        #[cfg(feature = "tracing")]
        tracing::error!("Failed to send password evaluation result: {}", _e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge::MergeMode;
    use crate::policies::{DictionaryConfig, DictionaryPolicy, Policy};
    use crate::sources::{Sources, SpellChecker, StaticDictionaries, WordList};
    use serde_json::Value;
    use std::sync::Arc;

    fn policy_set() -> PolicySet {
        let provider = StaticDictionaries::new().with_language("EN", ["sunshine"]);
        let mut set = PolicySet::with_sources(Sources::new("/nonexistent", Arc::new(provider)));
        set.add_config(PolicyKind::Length, 10, MergeMode::Combine)
            .unwrap()
            .add_config(PolicyKind::CharacterClass, Value::Null, MergeMode::Combine)
            .unwrap()
            .add_config(PolicyKind::Dictionary, "EN", MergeMode::Combine)
            .unwrap();
        set
    }

    fn secret(password: &str) -> SecretString {
        SecretString::new(password.to_string().into())
    }

    fn evaluate(set: &PolicySet, password: &str) -> PolicyEvaluation {
        #[cfg(feature = "async")]
        let evaluation = evaluate_password(set, &secret(password), None);

        #[cfg(not(feature = "async"))]
        let evaluation = evaluate_password(set, &secret(password));

        evaluation
    }

    #[test]
    fn test_evaluate_reports_every_violation() {
        let evaluation = evaluate(&policy_set(), "sunshine");

        assert!(!evaluation.is_valid());
        assert_eq!(evaluation.outcomes.len(), 3);
        assert_eq!(
            evaluation.reasons(),
            vec![
                "Minimum length is set to 10, but 8 characters were entered.",
                "Your password must contain at least an uppercase letter, a lowercase letter and a number.",
                "A dictionary based password was entered.",
            ]
        );
    }

    #[test]
    fn test_evaluate_keeps_class_summaries() {
        let evaluation = evaluate(&policy_set(), "sunshine");
        let classes = &evaluation.outcomes[1];

        assert_eq!(classes.policy, PolicyKind::CharacterClass);
        assert_eq!(
            classes.validation.matched_classes.as_deref(),
            Some("You entered a lowercase letter.")
        );
        assert_eq!(
            classes.validation.missed_classes.as_deref(),
            Some("You did not enter an uppercase letter or a number.")
        );
    }

    #[test]
    fn test_evaluate_valid_password() {
        let evaluation = evaluate(&policy_set(), "Sunshine2024");

        assert!(evaluation.is_valid());
        assert!(evaluation.reasons().is_empty());
        assert!(evaluation.error.is_none());
    }

    #[test]
    fn test_evaluate_aborts_on_policy_error() {
        let english: Arc<dyn SpellChecker> = Arc::new(WordList::from_words(["sunshine"]));
        let dictionary = DictionaryPolicy::with_checkers(
            DictionaryConfig::new(["EN", "DE"]).unwrap(),
            [("EN", english)],
        );

        let mut set = PolicySet::with_sources(Sources::new(
            "/nonexistent",
            Arc::new(StaticDictionaries::new()),
        ));
        set.add_config(PolicyKind::Length, 10, MergeMode::Combine)
            .unwrap()
            .add_policy(Policy::Dictionary(dictionary))
            .add_config(PolicyKind::CharacterClass, Value::Null, MergeMode::Combine)
            .unwrap();

        let evaluation = evaluate(&set, "sunny");

        assert!(!evaluation.is_valid());
        assert!(!evaluation.cancelled);
        assert_eq!(
            evaluation.error,
            Some(PolicyError::InvalidDictionaryLanguage(
                "A dictionary for DE has not been loaded".to_string()
            ))
        );
        // policies after the failing one are not run
        assert_eq!(evaluation.outcomes.len(), 1);
        assert_eq!(evaluation.outcomes[0].policy, PolicyKind::Length);
    }

    #[test]
    fn test_evaluate_empty_set() {
        let set = PolicySet::with_sources(Sources::new(
            "/nonexistent",
            Arc::new(StaticDictionaries::new()),
        ));
        let evaluation = evaluate(&set, "");

        assert!(evaluation.is_valid());
        assert!(evaluation.outcomes.is_empty());
    }
}

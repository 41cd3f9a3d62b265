//! The envelope-level aggregate of all outcomes.

use crate::outcome::Outcome;
use serde::Serialize;

/// What happened to one envelope.
///
/// Outcomes are always listed in the order the matcher selected the
/// registrations, regardless of the order handlers completed in.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "result", content = "outcomes", rename_all = "snake_case")]
pub enum DispatchResult {
    /// Every matched registration succeeded.
    AllSucceeded(Vec<Outcome>),
    /// At least one matched registration failed. When none succeeded this
    /// holds only failures.
    PartialFailure(Vec<Outcome>),
    /// No registration matched the envelope.
    NoMatch,
}

impl DispatchResult {
    /// Fold per-registration outcomes into a result.
    ///
    /// An empty list means nothing matched and yields [`DispatchResult::NoMatch`].
    pub fn aggregate(outcomes: Vec<Outcome>) -> Self {
        if outcomes.is_empty() {
            DispatchResult::NoMatch
        } else if outcomes.iter().all(Outcome::is_success) {
            DispatchResult::AllSucceeded(outcomes)
        } else {
            DispatchResult::PartialFailure(outcomes)
        }
    }

    /// All outcomes, in match order. Empty for [`DispatchResult::NoMatch`].
    pub fn outcomes(&self) -> &[Outcome] {
        match self {
            DispatchResult::AllSucceeded(outcomes) | DispatchResult::PartialFailure(outcomes) => {
                outcomes
            }
            DispatchResult::NoMatch => &[],
        }
    }

    /// Take ownership of the outcomes.
    pub fn into_outcomes(self) -> Vec<Outcome> {
        match self {
            DispatchResult::AllSucceeded(outcomes) | DispatchResult::PartialFailure(outcomes) => {
                outcomes
            }
            DispatchResult::NoMatch => Vec::new(),
        }
    }

    /// Successful outcomes, in match order.
    pub fn successes(&self) -> impl Iterator<Item = &Outcome> {
        self.outcomes().iter().filter(|o| o.is_success())
    }

    /// Failed outcomes, in match order.
    pub fn failures(&self) -> impl Iterator<Item = &Outcome> {
        self.outcomes().iter().filter(|o| !o.is_success())
    }

    /// Whether every matched registration succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self, DispatchResult::AllSucceeded(_))
    }

    /// Whether no registration matched.
    pub fn is_no_match(&self) -> bool {
        matches!(self, DispatchResult::NoMatch)
    }

    /// Whether at least one matched registration failed.
    pub fn is_failure(&self) -> bool {
        matches!(self, DispatchResult::PartialFailure(_))
    }
}

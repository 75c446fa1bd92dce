//! Drill error types.
//!
//! Every public operation of the engine reports failure through [`DrillError`].
//! Store implementations map their backend errors into
//! [`DrillError::Persistence`] so callers can classify failures without
//! string matching.

use thiserror::Error;

use crate::model::LearnerId;

/// Errors that can occur while recording attempts or selecting questions.
#[derive(Debug, Error)]
pub enum DrillError {
    /// A required field was missing or malformed. Nothing was written.
    #[error("invalid input: {0}")]
    Validation(String),

    /// The learner id does not refer to a known learner.
    #[error("learner not found: {0}")]
    LearnerNotFound(LearnerId),

    /// Neither the candidate set nor the fallback universe has a fact to offer.
    #[error("all factors disabled")]
    Exhausted,

    /// The underlying store failed on read or write.
    #[error("persistence error: {0}")]
    Persistence(String),
}

impl DrillError {
    /// Returns `true` if repeating the same call can never succeed.
    ///
    /// Only store failures are transient. The engine itself never retries;
    /// this exists for callers deciding what to tell the learner.
    pub fn is_permanent(&self) -> bool {
        !matches!(self, DrillError::Persistence(_))
    }

    pub(crate) fn validation(message: impl Into<String>) -> Self {
        DrillError::Validation(message.into())
    }
}

/// Convenience alias used throughout the crate.
pub type DrillResult<T> = Result<T, DrillError>;

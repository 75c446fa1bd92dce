//! Core trait definitions for the durable store.
//!
//! The engine only ever appends to and scans the attempt log; aggregates are
//! computed from a scan on every query, so there is nothing to invalidate.
//! Implemented in memory by [`crate::memory::MemoryStore`] and on disk by
//! `factdrill-store`.

use crate::error::DrillResult;
use crate::model::{Attempt, DisabledFactors, Learner, LearnerId, NewAttempt};

// ---------------------------------------------------------------------------
// Attempt log
// ---------------------------------------------------------------------------

/// Append-only log of submitted answers.
///
/// There is no update or delete. An `append` either persists
/// exactly one row or fails with [`crate::error::DrillError::Persistence`].
pub trait AttemptLog: Send + Sync {
    /// Persist one attempt and return it with its assigned id.
    fn append(&self, attempt: NewAttempt) -> DrillResult<Attempt>;

    /// All attempts of one learner, oldest first.
    fn scan(&self, learner_id: LearnerId) -> DrillResult<Vec<Attempt>>;
}

// ---------------------------------------------------------------------------
// Learner directory
// ---------------------------------------------------------------------------

/// Learners and their per-learner disabled factors.
pub trait LearnerDirectory: Send + Sync {
    /// Create a learner. Names are unique; a clash is a validation error.
    fn create_learner(&self, name: &str, avatar: &str) -> DrillResult<Learner>;

    /// Look up a learner by id.
    fn learner(&self, id: LearnerId) -> DrillResult<Option<Learner>>;

    /// All learners, ordered by id.
    fn learners(&self) -> DrillResult<Vec<Learner>>;

    /// Change a learner's display attributes.
    fn update_learner(&self, id: LearnerId, name: &str, avatar: &str) -> DrillResult<Learner>;

    /// The learner's disabled factors.
    fn disabled_factors(&self, learner_id: LearnerId) -> DrillResult<DisabledFactors>;

    /// Insert or remove one disabled-factor membership.
    fn set_factor_disabled(
        &self,
        learner_id: LearnerId,
        factor: u8,
        disabled: bool,
    ) -> DrillResult<()>;
}

/// Everything the engine needs from a store.
pub trait DrillStore: AttemptLog + LearnerDirectory {}

impl<T: AttemptLog + LearnerDirectory> DrillStore for T {}

//! The drill engine: every operation the surrounding layer calls.
//!
//! The engine holds no learner state of its own. Each call resolves the
//! learner, scans what it needs from the store, and computes its answer.

use std::sync::Arc;

use chrono::Utc;

use crate::coverage;
use crate::error::{DrillError, DrillResult};
use crate::mastery::{self, FactGrid, PairStats, PairTiming};
use crate::model::{
    check_elapsed, check_factor, DisabledFactors, Fact, Learner, LearnerId, Mode, NewAttempt,
    RecordedAttempt, DEFAULT_AVATAR,
};
use crate::random::{RandomSource, SeededRandom};
use crate::selector::{self, Selection};
use crate::traits::DrillStore;

/// A snapshot of grid coverage for one learner.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Coverage {
    /// Size of the fact universe under the current disabled factors.
    pub universe: usize,
    /// Facts in the universe not yet attempted.
    pub unanswered: usize,
    /// Enabled facts with a wrong or slow attempt on record.
    pub problematic: usize,
}

/// The central drill engine.
pub struct DrillEngine {
    store: Arc<dyn DrillStore>,
    rng: Box<dyn RandomSource>,
}

impl DrillEngine {
    pub fn new(store: Arc<dyn DrillStore>, rng: Box<dyn RandomSource>) -> Self {
        Self { store, rng }
    }

    /// An engine drawing from OS entropy.
    pub fn with_entropy(store: Arc<dyn DrillStore>) -> Self {
        Self::new(store, Box::new(SeededRandom::from_entropy()))
    }

    /// An engine with a reproducible selection sequence.
    pub fn with_seed(store: Arc<dyn DrillStore>, seed: u64) -> Self {
        Self::new(store, Box::new(SeededRandom::seeded(seed)))
    }

    pub fn store(&self) -> &Arc<dyn DrillStore> {
        &self.store
    }

    // -- learners ----------------------------------------------------------

    /// Register a learner. The name is trimmed and must not be empty.
    pub fn create_learner(&self, name: &str, avatar: Option<&str>) -> DrillResult<Learner> {
        let (name, avatar) = learner_fields(name, avatar)?;
        let learner = self.store.create_learner(name, avatar)?;
        tracing::info!(learner = learner.id, name = %learner.name, "learner created");
        Ok(learner)
    }

    pub fn learners(&self) -> DrillResult<Vec<Learner>> {
        self.store.learners()
    }

    /// Fetch a learner or fail with [`DrillError::LearnerNotFound`].
    pub fn learner(&self, id: LearnerId) -> DrillResult<Learner> {
        self.store.learner(id)?.ok_or(DrillError::LearnerNotFound(id))
    }

    pub fn update_learner(
        &self,
        id: LearnerId,
        name: &str,
        avatar: Option<&str>,
    ) -> DrillResult<Learner> {
        let current = self.learner(id)?;
        let (name, avatar) = learner_fields(name, avatar.or(Some(current.avatar.as_str())))?;
        self.store.update_learner(id, name, avatar)
    }

    // -- attempts ----------------------------------------------------------

    /// Append one attempt. Correctness is decided here and frozen in the log.
    pub fn record_attempt(
        &self,
        learner_id: LearnerId,
        a: u8,
        b: u8,
        submitted_answer: u32,
        elapsed_ms: u64,
    ) -> DrillResult<RecordedAttempt> {
        let fact = Fact::checked(a, b)?;
        let elapsed_ms = check_elapsed(elapsed_ms)?;
        self.learner(learner_id)?;

        let attempt = NewAttempt::new(learner_id, fact, submitted_answer, elapsed_ms, Utc::now());
        let stored = self.store.append(attempt).inspect_err(|e| {
            tracing::error!(learner = learner_id, %fact, "failed to record attempt: {e}");
        })?;

        tracing::info!(
            learner = learner_id,
            %fact,
            correct = stored.is_correct,
            elapsed_ms,
            "attempt recorded"
        );
        Ok(RecordedAttempt {
            attempt_id: stored.id,
            is_correct: stored.is_correct,
        })
    }

    /// The next fact under `mode`, [`Selection::Complete`] when `all-remaining`
    /// has covered the grid, or [`DrillError::Exhausted`] when every factor is
    /// disabled.
    pub fn next_question(&mut self, learner_id: LearnerId, mode: Mode) -> DrillResult<Selection> {
        self.learner(learner_id)?;
        let disabled = self.store.disabled_factors(learner_id)?;
        let attempts = match mode {
            Mode::Random => Vec::new(),
            _ => self.store.scan(learner_id)?,
        };
        selector::select(mode, &attempts, &disabled, self.rng.as_mut())
    }

    // -- reads -------------------------------------------------------------

    /// Per ordered fact: attempts, correct count and average time.
    pub fn aggregate_stats(&self, learner_id: LearnerId) -> DrillResult<Vec<PairStats>> {
        self.learner(learner_id)?;
        Ok(mastery::aggregate(&self.store.scan(learner_id)?))
    }

    /// Timing of correct answers on `a × b` in either order, for a target time.
    pub fn pair_timing(&self, learner_id: LearnerId, a: u8, b: u8) -> DrillResult<Option<PairTiming>> {
        let fact = Fact::checked(a, b)?;
        self.learner(learner_id)?;
        Ok(mastery::pair_timing(&self.store.scan(learner_id)?, fact))
    }

    /// Symmetric mastery grid.
    pub fn fact_grid(&self, learner_id: LearnerId) -> DrillResult<FactGrid> {
        Ok(FactGrid::from_stats(&self.aggregate_stats(learner_id)?))
    }

    /// Unanswered facts in universe order.
    pub fn unanswered(&self, learner_id: LearnerId) -> DrillResult<Vec<Fact>> {
        self.learner(learner_id)?;
        let disabled = self.store.disabled_factors(learner_id)?;
        Ok(coverage::unanswered(&self.store.scan(learner_id)?, &disabled))
    }

    pub fn coverage(&self, learner_id: LearnerId) -> DrillResult<Coverage> {
        self.learner(learner_id)?;
        let disabled = self.store.disabled_factors(learner_id)?;
        let attempts = self.store.scan(learner_id)?;
        let k = disabled.enabled_factors().len();
        Ok(Coverage {
            universe: k * k,
            unanswered: coverage::unanswered(&attempts, &disabled).len(),
            problematic: coverage::problematic(&attempts, &disabled).len(),
        })
    }

    // -- disabled factors --------------------------------------------------

    pub fn list_disabled(&self, learner_id: LearnerId) -> DrillResult<DisabledFactors> {
        self.learner(learner_id)?;
        self.store.disabled_factors(learner_id)
    }

    /// Flip one factor in or out of the disabled set and return the new set.
    ///
    /// Read-then-write: two concurrent toggles of the same factor race, and
    /// the last writer wins.
    pub fn toggle_disabled(&self, learner_id: LearnerId, factor: u8) -> DrillResult<DisabledFactors> {
        let factor = check_factor(factor)?;
        let mut disabled = self.list_disabled(learner_id)?;
        let now_disabled = !disabled.contains(factor);
        self.store
            .set_factor_disabled(learner_id, factor, now_disabled)?;
        if now_disabled {
            disabled.insert(factor);
        } else {
            disabled.remove(factor);
        }
        tracing::info!(learner = learner_id, factor, disabled = now_disabled, "factor toggled");
        Ok(disabled)
    }
}

fn learner_fields<'a>(name: &'a str, avatar: Option<&'a str>) -> DrillResult<(&'a str, &'a str)> {
    let name = name.trim();
    if name.is_empty() {
        return Err(DrillError::Validation("name is required".into()));
    }
    let avatar = avatar
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .unwrap_or(DEFAULT_AVATAR);
    Ok((name, avatar))
}

//! In-memory store for tests and throwaway sessions.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;

use crate::error::{DrillError, DrillResult};
use crate::model::{Attempt, AttemptId, DisabledFactors, Learner, LearnerId, NewAttempt};
use crate::traits::{AttemptLog, LearnerDirectory};

#[derive(Default)]
struct Inner {
    learners: BTreeMap<LearnerId, Learner>,
    attempts: Vec<Attempt>,
    disabled: HashMap<LearnerId, DisabledFactors>,
    next_learner_id: LearnerId,
    next_attempt_id: AttemptId,
}

/// A [`crate::traits::DrillStore`] that keeps everything in process memory.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> DrillResult<MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|e| DrillError::Persistence(format!("store lock poisoned: {e}")))
    }
}

fn name_taken(inner: &Inner, name: &str, except: Option<LearnerId>) -> bool {
    inner
        .learners
        .values()
        .any(|l| l.name == name && Some(l.id) != except)
}

impl AttemptLog for MemoryStore {
    fn append(&self, attempt: NewAttempt) -> DrillResult<Attempt> {
        let mut inner = self.lock()?;
        inner.next_attempt_id += 1;
        let stored = attempt.into_attempt(inner.next_attempt_id);
        inner.attempts.push(stored.clone());
        Ok(stored)
    }

    fn scan(&self, learner_id: LearnerId) -> DrillResult<Vec<Attempt>> {
        let inner = self.lock()?;
        Ok(inner
            .attempts
            .iter()
            .filter(|a| a.learner_id == learner_id)
            .cloned()
            .collect())
    }
}

impl LearnerDirectory for MemoryStore {
    fn create_learner(&self, name: &str, avatar: &str) -> DrillResult<Learner> {
        let mut inner = self.lock()?;
        if name_taken(&inner, name, None) {
            return Err(DrillError::validation("learner name already taken"));
        }
        inner.next_learner_id += 1;
        let learner = Learner {
            id: inner.next_learner_id,
            name: name.to_string(),
            avatar: avatar.to_string(),
            created_at: Utc::now(),
        };
        inner.learners.insert(learner.id, learner.clone());
        Ok(learner)
    }

    fn learner(&self, id: LearnerId) -> DrillResult<Option<Learner>> {
        Ok(self.lock()?.learners.get(&id).cloned())
    }

    fn learners(&self) -> DrillResult<Vec<Learner>> {
        Ok(self.lock()?.learners.values().cloned().collect())
    }

    fn update_learner(&self, id: LearnerId, name: &str, avatar: &str) -> DrillResult<Learner> {
        let mut inner = self.lock()?;
        if name_taken(&inner, name, Some(id)) {
            return Err(DrillError::validation("learner name already taken"));
        }
        let learner = inner
            .learners
            .get_mut(&id)
            .ok_or(DrillError::LearnerNotFound(id))?;
        learner.name = name.to_string();
        learner.avatar = avatar.to_string();
        Ok(learner.clone())
    }

    fn disabled_factors(&self, learner_id: LearnerId) -> DrillResult<DisabledFactors> {
        Ok(self
            .lock()?
            .disabled
            .get(&learner_id)
            .cloned()
            .unwrap_or_default())
    }

    fn set_factor_disabled(
        &self,
        learner_id: LearnerId,
        factor: u8,
        disabled: bool,
    ) -> DrillResult<()> {
        let mut inner = self.lock()?;
        let set = inner.disabled.entry(learner_id).or_default();
        if disabled {
            set.insert(factor);
        } else {
            set.remove(factor);
        }
        Ok(())
    }
}

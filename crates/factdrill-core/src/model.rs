//! Core data model types for factdrill.
//!
//! Facts are stored in the order they were presented ([`Fact`]) but scored and
//! timed as unordered pairs ([`FactKey`]). The two types are kept apart on
//! purpose: grid coverage depends on order, mastery does not.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DrillError, DrillResult};

/// Largest factor that can appear in a fact.
pub const MAX_FACTOR: u8 = 10;

/// Number of distinct factors (`0..=MAX_FACTOR`).
pub const FACTOR_COUNT: usize = MAX_FACTOR as usize + 1;

/// Identifier of a learner in the store.
pub type LearnerId = i64;

/// Identifier of a recorded attempt.
pub type AttemptId = i64;

/// Longest answer time the log can hold; it is stored as a signed 64-bit integer.
pub const MAX_ELAPSED_MS: u64 = i64::MAX as u64;

/// Check that an answer time fits in the log.
pub fn check_elapsed(elapsed_ms: u64) -> DrillResult<u64> {
    if elapsed_ms > MAX_ELAPSED_MS {
        return Err(DrillError::Validation(format!(
            "elapsed time {elapsed_ms} ms exceeds {MAX_ELAPSED_MS} ms"
        )));
    }
    Ok(elapsed_ms)
}

/// Check that a factor lies in `0..=MAX_FACTOR`.
pub fn check_factor(factor: u8) -> DrillResult<u8> {
    if factor > MAX_FACTOR {
        return Err(DrillError::Validation(format!(
            "factor {factor} is outside 0..={MAX_FACTOR}"
        )));
    }
    Ok(factor)
}

/// An ordered pair of factors presented as the question "a × b = ?".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Fact {
    pub a: u8,
    pub b: u8,
}

impl Fact {
    pub fn new(a: u8, b: u8) -> Self {
        Self { a, b }
    }

    /// Build a fact, rejecting factors outside `0..=MAX_FACTOR`.
    pub fn checked(a: u8, b: u8) -> DrillResult<Self> {
        Ok(Self::new(check_factor(a)?, check_factor(b)?))
    }

    pub fn product(&self) -> u32 {
        u32::from(self.a) * u32::from(self.b)
    }

    /// The same fact with its factors swapped.
    pub fn flipped(&self) -> Self {
        Self::new(self.b, self.a)
    }

    /// The unordered key used for scoring and timing.
    pub fn key(&self) -> FactKey {
        FactKey::new(self.a, self.b)
    }

    /// Whether either factor is in the disabled set.
    pub fn touches(&self, disabled: &DisabledFactors) -> bool {
        disabled.contains(self.a) || disabled.contains(self.b)
    }
}

impl fmt::Display for Fact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} × {}", self.a, self.b)
    }
}

/// An unordered fact: `3 × 4` and `4 × 3` share one key.
///
/// Invariant: `low <= high`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FactKey {
    low: u8,
    high: u8,
}

impl FactKey {
    pub fn new(a: u8, b: u8) -> Self {
        Self {
            low: a.min(b),
            high: a.max(b),
        }
    }

    pub fn low(&self) -> u8 {
        self.low
    }

    pub fn high(&self) -> u8 {
        self.high
    }

    /// Whether a stored ordered fact is either ordering of this key.
    pub fn matches(&self, fact: Fact) -> bool {
        fact.key() == *self
    }
}

impl fmt::Display for FactKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}, {}}}", self.low, self.high)
    }
}

/// A learner and their display attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Learner {
    pub id: LearnerId,
    pub name: String,
    /// Avatar key understood by the presentation layer.
    pub avatar: String,
    pub created_at: DateTime<Utc>,
}

/// Avatar given to learners created without one.
pub const DEFAULT_AVATAR: &str = "smile";

/// An attempt that has not yet been written to the log.
///
/// `correct_answer` and `is_correct` are frozen here, at creation time, and
/// are never re-derived from the factors afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAttempt {
    pub learner_id: LearnerId,
    pub factor_a: u8,
    pub factor_b: u8,
    pub submitted_answer: u32,
    pub correct_answer: u32,
    pub is_correct: bool,
    pub elapsed_ms: u64,
    pub created_at: DateTime<Utc>,
}

impl NewAttempt {
    pub fn new(
        learner_id: LearnerId,
        fact: Fact,
        submitted_answer: u32,
        elapsed_ms: u64,
        created_at: DateTime<Utc>,
    ) -> Self {
        let correct_answer = fact.product();
        Self {
            learner_id,
            factor_a: fact.a,
            factor_b: fact.b,
            submitted_answer,
            correct_answer,
            is_correct: submitted_answer == correct_answer,
            elapsed_ms,
            created_at,
        }
    }

    /// Attach the id assigned by the store.
    pub fn into_attempt(self, id: AttemptId) -> Attempt {
        Attempt {
            id,
            learner_id: self.learner_id,
            factor_a: self.factor_a,
            factor_b: self.factor_b,
            submitted_answer: self.submitted_answer,
            correct_answer: self.correct_answer,
            is_correct: self.is_correct,
            elapsed_ms: self.elapsed_ms,
            created_at: self.created_at,
        }
    }
}

/// An immutable row of the attempt log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attempt {
    pub id: AttemptId,
    pub learner_id: LearnerId,
    pub factor_a: u8,
    pub factor_b: u8,
    pub submitted_answer: u32,
    pub correct_answer: u32,
    pub is_correct: bool,
    pub elapsed_ms: u64,
    pub created_at: DateTime<Utc>,
}

impl Attempt {
    /// The fact in the order it was presented.
    pub fn fact(&self) -> Fact {
        Fact::new(self.factor_a, self.factor_b)
    }
}

/// What the caller learns after recording an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedAttempt {
    pub attempt_id: AttemptId,
    pub is_correct: bool,
}

/// The set of factors a learner has switched off.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DisabledFactors(BTreeSet<u8>);

impl DisabledFactors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, factor: u8) -> bool {
        self.0.contains(&factor)
    }

    pub fn insert(&mut self, factor: u8) -> bool {
        self.0.insert(factor)
    }

    pub fn remove(&mut self, factor: u8) -> bool {
        self.0.remove(&factor)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        self.0.iter().copied()
    }

    /// Factors in `0..=MAX_FACTOR` that are still enabled, ascending.
    pub fn enabled_factors(&self) -> Vec<u8> {
        (0..=MAX_FACTOR).filter(|f| !self.contains(*f)).collect()
    }

    /// True when no factor is left to build a fact from.
    pub fn all_disabled(&self) -> bool {
        (0..=MAX_FACTOR).all(|f| self.contains(f))
    }
}

impl FromIterator<u8> for DisabledFactors {
    fn from_iter<I: IntoIterator<Item = u8>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Question selection policies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    /// Problematic facts first, then unanswered ones, then anything.
    #[default]
    Smart,
    /// The facts with the lowest mastery score.
    LowestScores,
    /// Every fact in the grid until none are left unanswered.
    AllRemaining,
    /// Uniform over enabled factors, ignoring history.
    Random,
}

impl Mode {
    pub const ALL: [Mode; 4] = [
        Mode::Smart,
        Mode::LowestScores,
        Mode::AllRemaining,
        Mode::Random,
    ];
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Smart => write!(f, "smart"),
            Mode::LowestScores => write!(f, "lowest-scores"),
            Mode::AllRemaining => write!(f, "all-remaining"),
            Mode::Random => write!(f, "random"),
        }
    }
}

impl FromStr for Mode {
    type Err = DrillError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "smart" => Ok(Mode::Smart),
            "lowest-scores" | "lowest" => Ok(Mode::LowestScores),
            "all-remaining" | "remaining" => Ok(Mode::AllRemaining),
            "random" => Ok(Mode::Random),
            other => Err(DrillError::Validation(format!("unknown mode: {other}"))),
        }
    }
}

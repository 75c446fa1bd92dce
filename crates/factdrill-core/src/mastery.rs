//! Per-fact mastery statistics derived from the attempt log.
//!
//! Nothing here is cached. Every function takes a full scan of one learner's
//! log and recomputes from scratch, so results always match the log exactly.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::{Attempt, Fact, FactKey};

/// Answers slower than this count as problematic, and a fact whose average
/// exceeds it is classified [`MasteryLevel::Slow`].
pub const SLOW_ANSWER_MS: u64 = 5000;

/// Accuracy below this is [`MasteryLevel::Struggling`].
const STRUGGLING_BELOW: f64 = 0.8;

/// Accuracy at or above this (and not slow) is [`MasteryLevel::Mastered`].
const MASTERED_FROM: f64 = 0.9;

/// Aggregate of all attempts on one ordered fact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairStats {
    pub a: u8,
    pub b: u8,
    pub attempts: u32,
    pub correct_count: u32,
    pub avg_time_ms: f64,
}

impl PairStats {
    pub fn fact(&self) -> Fact {
        Fact::new(self.a, self.b)
    }

    /// Mastery score `correct_count / attempts`, in `[0, 1]`.
    pub fn score(&self) -> f64 {
        if self.attempts == 0 {
            return 0.0;
        }
        f64::from(self.correct_count) / f64::from(self.attempts)
    }

    /// Compare scores exactly by cross-multiplying the ratios.
    pub fn cmp_score(&self, other: &PairStats) -> Ordering {
        let lhs = u64::from(self.correct_count) * u64::from(other.attempts);
        let rhs = u64::from(other.correct_count) * u64::from(self.attempts);
        lhs.cmp(&rhs)
    }
}

#[derive(Default)]
struct Accumulator {
    attempts: u32,
    correct: u32,
    total_ms: u128,
}

impl Accumulator {
    fn add(&mut self, attempt: &Attempt) {
        self.attempts += 1;
        self.correct += u32::from(attempt.is_correct);
        self.total_ms += u128::from(attempt.elapsed_ms);
    }

    fn avg_ms(&self) -> f64 {
        if self.attempts == 0 {
            return 0.0;
        }
        self.total_ms as f64 / f64::from(self.attempts)
    }
}

/// Group attempts by the ordered fact exactly as stored.
///
/// Results are sorted by `(a, b)`.
pub fn aggregate(attempts: &[Attempt]) -> Vec<PairStats> {
    let mut grouped: BTreeMap<Fact, Accumulator> = BTreeMap::new();
    for attempt in attempts {
        grouped.entry(attempt.fact()).or_default().add(attempt);
    }

    grouped
        .into_iter()
        .map(|(fact, acc)| PairStats {
            a: fact.a,
            b: fact.b,
            attempts: acc.attempts,
            correct_count: acc.correct,
            avg_time_ms: acc.avg_ms(),
        })
        .collect()
}

/// Historical timing of correct answers for one fact.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PairTiming {
    pub avg_time_ms: f64,
    pub best_time_ms: u64,
}

/// Timing over correct attempts on `fact` in either order.
///
/// `None` means there is no correct attempt yet, which is different from a
/// best time of zero.
pub fn pair_timing(attempts: &[Attempt], fact: Fact) -> Option<PairTiming> {
    let key = fact.key();
    let times: Vec<u64> = attempts
        .iter()
        .filter(|a| a.is_correct && key.matches(a.fact()))
        .map(|a| a.elapsed_ms)
        .collect();

    let best_time_ms = times.iter().copied().min()?;
    let total_ms: u128 = times.iter().map(|&t| u128::from(t)).sum();
    let avg_time_ms = total_ms as f64 / times.len() as f64;
    Some(PairTiming {
        avg_time_ms,
        best_time_ms,
    })
}

// ---------------------------------------------------------------------------
// Fact grid
// ---------------------------------------------------------------------------

/// How well a learner knows a fact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MasteryLevel {
    Unseen,
    Struggling,
    Slow,
    Progressing,
    Mastered,
}

impl MasteryLevel {
    /// Classify merged statistics for one fact.
    pub fn classify(accuracy: f64, avg_time_ms: f64) -> Self {
        if accuracy < STRUGGLING_BELOW {
            MasteryLevel::Struggling
        } else if avg_time_ms > SLOW_ANSWER_MS as f64 {
            MasteryLevel::Slow
        } else if accuracy >= MASTERED_FROM {
            MasteryLevel::Mastered
        } else {
            MasteryLevel::Progressing
        }
    }
}

impl fmt::Display for MasteryLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MasteryLevel::Unseen => write!(f, "unseen"),
            MasteryLevel::Struggling => write!(f, "struggling"),
            MasteryLevel::Slow => write!(f, "slow"),
            MasteryLevel::Progressing => write!(f, "progressing"),
            MasteryLevel::Mastered => write!(f, "mastered"),
        }
    }
}

/// Statistics for one unordered fact, merging both orderings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactCell {
    pub key: FactKey,
    pub attempts: u32,
    pub accuracy: f64,
    /// Attempt-weighted average over both orderings.
    pub avg_time_ms: f64,
    pub level: MasteryLevel,
}

/// Symmetric view of a learner's progress, one cell per unordered fact.
#[derive(Debug, Clone, Default)]
pub struct FactGrid {
    cells: BTreeMap<FactKey, FactCell>,
}

impl FactGrid {
    /// Merge ordered aggregates into unordered cells.
    pub fn from_stats(stats: &[PairStats]) -> Self {
        let mut merged: BTreeMap<FactKey, (u32, u32, f64)> = BTreeMap::new();
        for s in stats {
            let entry = merged.entry(s.fact().key()).or_default();
            entry.0 += s.attempts;
            entry.1 += s.correct_count;
            entry.2 += s.avg_time_ms * f64::from(s.attempts);
        }

        let cells = merged
            .into_iter()
            .filter(|(_, (attempts, _, _))| *attempts > 0)
            .map(|(key, (attempts, correct, weighted_ms))| {
                let accuracy = f64::from(correct) / f64::from(attempts);
                let avg_time_ms = weighted_ms / f64::from(attempts);
                let cell = FactCell {
                    key,
                    attempts,
                    accuracy,
                    avg_time_ms,
                    level: MasteryLevel::classify(accuracy, avg_time_ms),
                };
                (key, cell)
            })
            .collect();

        Self { cells }
    }

    /// The cell for `a × b` (same as `b × a`), if practiced.
    pub fn cell(&self, a: u8, b: u8) -> Option<&FactCell> {
        self.cells.get(&FactKey::new(a, b))
    }

    /// The mastery level of `a × b`; unpracticed facts are `Unseen`.
    pub fn level(&self, a: u8, b: u8) -> MasteryLevel {
        self.cell(a, b)
            .map(|c| c.level)
            .unwrap_or(MasteryLevel::Unseen)
    }

    pub fn cells(&self) -> impl Iterator<Item = &FactCell> {
        self.cells.values()
    }

    /// Number of practiced unordered facts at each level.
    pub fn level_counts(&self) -> BTreeMap<MasteryLevel, usize> {
        let mut counts = BTreeMap::new();
        for cell in self.cells.values() {
            *counts.entry(cell.level).or_insert(0) += 1;
        }
        counts
    }
}

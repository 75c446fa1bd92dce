//! Question selection policies.
//!
//! Each policy is a pure function of the learner's log, their disabled
//! factors, and an injected [`RandomSource`].

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::coverage::{problematic, unanswered};
use crate::error::{DrillError, DrillResult};
use crate::mastery::aggregate;
use crate::model::{Attempt, DisabledFactors, Fact, Mode};
use crate::random::RandomSource;

/// The outcome of asking for the next question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Selection {
    /// Ask this fact next.
    Fact(Fact),
    /// `all-remaining` has nothing left: every fact in the grid was answered.
    Complete,
}

impl Selection {
    pub fn fact(&self) -> Option<Fact> {
        match self {
            Selection::Fact(fact) => Some(*fact),
            Selection::Complete => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Smart cascade
// ---------------------------------------------------------------------------

type CandidateProvider = fn(&[Attempt], &DisabledFactors) -> Vec<Fact>;

/// One step of the smart cascade: taken when the shared draw is below
/// `below` and the provider yields at least one fact.
struct Tier {
    name: &'static str,
    below: f64,
    candidates: CandidateProvider,
}

/// Evaluated in order against a single draw. Probability mass of an empty
/// tier is not redistributed; the draw simply falls through to the next
/// tier, and finally to the independent draw.
const SMART_TIERS: [Tier; 2] = [
    Tier {
        name: "problematic",
        below: 0.4,
        candidates: problematic,
    },
    Tier {
        name: "unanswered",
        below: 0.7,
        candidates: unanswered,
    },
];

/// Select the next fact under `mode`.
pub fn select(
    mode: Mode,
    attempts: &[Attempt],
    disabled: &DisabledFactors,
    rng: &mut dyn RandomSource,
) -> DrillResult<Selection> {
    let selection = match mode {
        Mode::Smart => smart(attempts, disabled, rng).map(Selection::Fact),
        Mode::LowestScores => lowest_scores(attempts, disabled, rng).map(Selection::Fact),
        Mode::AllRemaining => all_remaining(attempts, disabled, rng),
        Mode::Random => independent_draw(disabled, rng).map(Selection::Fact),
    };

    match &selection {
        Ok(Selection::Fact(fact)) => tracing::debug!(%mode, %fact, "selected fact"),
        Ok(Selection::Complete) => tracing::debug!(%mode, "grid complete"),
        Err(DrillError::Exhausted) => tracing::warn!(%mode, "no fact to offer: all factors disabled"),
        Err(_) => {}
    }
    selection
}

fn smart(
    attempts: &[Attempt],
    disabled: &DisabledFactors,
    rng: &mut dyn RandomSource,
) -> DrillResult<Fact> {
    let r = rng.unit();
    for tier in &SMART_TIERS {
        if r >= tier.below {
            continue;
        }
        let candidates = (tier.candidates)(attempts, disabled);
        if let Some(fact) = pick(&candidates, rng) {
            tracing::debug!(
                tier = tier.name,
                draw = r,
                candidates = candidates.len(),
                "smart tier hit"
            );
            return Ok(fact);
        }
    }
    tracing::debug!(draw = r, "smart fell through to independent draw");
    independent_draw(disabled, rng)
}

fn lowest_scores(
    attempts: &[Attempt],
    disabled: &DisabledFactors,
    rng: &mut dyn RandomSource,
) -> DrillResult<Fact> {
    let trouble = problematic(attempts, disabled);
    if let Some(fact) = pick(&trouble, rng) {
        return Ok(fact);
    }

    let stats: Vec<_> = aggregate(attempts)
        .into_iter()
        .filter(|s| !s.fact().touches(disabled))
        .collect();
    let Some(lowest) = stats.iter().min_by(|x, y| x.cmp_score(y)) else {
        return independent_draw(disabled, rng);
    };

    let ties: Vec<Fact> = stats
        .iter()
        .filter(|s| s.cmp_score(lowest) == Ordering::Equal)
        .map(|s| s.fact())
        .collect();
    tracing::debug!(
        score = lowest.score(),
        ties = ties.len(),
        "lowest score candidates"
    );
    pick(&ties, rng).ok_or(DrillError::Exhausted)
}

fn all_remaining(
    attempts: &[Attempt],
    disabled: &DisabledFactors,
    rng: &mut dyn RandomSource,
) -> DrillResult<Selection> {
    if disabled.all_disabled() {
        return Err(DrillError::Exhausted);
    }
    let remaining = unanswered(attempts, disabled);
    Ok(pick(&remaining, rng)
        .map(Selection::Fact)
        .unwrap_or(Selection::Complete))
}

/// Draw each factor independently and uniformly from the enabled factors.
///
/// Self-pairs are exactly as likely as any other pair.
pub fn independent_draw(
    disabled: &DisabledFactors,
    rng: &mut dyn RandomSource,
) -> DrillResult<Fact> {
    let enabled = disabled.enabled_factors();
    if enabled.is_empty() {
        return Err(DrillError::Exhausted);
    }
    let a = enabled[rng.index(enabled.len())];
    let b = enabled[rng.index(enabled.len())];
    Ok(Fact::new(a, b))
}

fn pick(candidates: &[Fact], rng: &mut dyn RandomSource) -> Option<Fact> {
    if candidates.is_empty() {
        return None;
    }
    Some(candidates[rng.index(candidates.len())])
}

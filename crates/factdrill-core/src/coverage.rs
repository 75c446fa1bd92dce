//! Unanswered and problematic fact sets.
//!
//! Both sets work on ordered facts. Answering `3 × 4` does not cover `4 × 3`:
//! these sets track grid coverage, not fact mastery.

use std::collections::BTreeSet;

use crate::mastery::SLOW_ANSWER_MS;
use crate::model::{Attempt, DisabledFactors, Fact};
use crate::universe::fact_universe;

/// Distinct ordered facts that appear anywhere in the log.
pub fn answered_facts(attempts: &[Attempt]) -> BTreeSet<Fact> {
    attempts.iter().map(Attempt::fact).collect()
}

/// Facts in the universe with no attempt yet, in universe order.
pub fn unanswered(attempts: &[Attempt], disabled: &DisabledFactors) -> Vec<Fact> {
    let answered = answered_facts(attempts);
    fact_universe(disabled)
        .into_iter()
        .filter(|fact| !answered.contains(fact))
        .collect()
}

/// Whether a single attempt marks its fact as problematic.
pub fn is_problematic(attempt: &Attempt) -> bool {
    !attempt.is_correct || attempt.elapsed_ms > SLOW_ANSWER_MS
}

/// Distinct enabled facts with at least one wrong or slow attempt, sorted.
///
/// Any such attempt in the history counts; later good answers do not clear it.
pub fn problematic(attempts: &[Attempt], disabled: &DisabledFactors) -> Vec<Fact> {
    attempts
        .iter()
        .filter(|a| is_problematic(a))
        .map(Attempt::fact)
        .filter(|fact| !fact.touches(disabled))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

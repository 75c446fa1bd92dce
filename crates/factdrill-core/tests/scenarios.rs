//! End-to-end selection scenarios through the engine and an in-memory store.

use std::collections::HashMap;
use std::sync::Arc;

use factdrill_core::memory::MemoryStore;
use factdrill_core::random::{ScriptedRandom, SeededRandom};
use factdrill_core::{DrillEngine, DrillError, Fact, Mode, Selection};

fn engine_with(rng: impl factdrill_core::random::RandomSource + 'static) -> DrillEngine {
    DrillEngine::new(Arc::new(MemoryStore::new()), Box::new(rng))
}

#[test]
fn fresh_learner_all_remaining_offers_a_grid_fact() {
    let mut engine = engine_with(SeededRandom::seeded(2024));
    let learner = engine.create_learner("Fresh", None).unwrap();

    for _ in 0..50 {
        let selection = engine.next_question(learner.id, Mode::AllRemaining).unwrap();
        let fact = selection.fact().expect("a fresh grid is never complete");
        assert!(fact.a <= 10 && fact.b <= 10);
    }
}

#[test]
fn single_wrong_answer_is_asked_first_in_smart_mode() {
    let mut engine = engine_with(ScriptedRandom::new().with_units([0.1]));
    let learner = engine.create_learner("Wrong once", None).unwrap();
    let outcome = engine.record_attempt(learner.id, 3, 4, 7, 1500).unwrap();
    assert!(!outcome.is_correct);

    let selection = engine.next_question(learner.id, Mode::Smart).unwrap();
    assert_eq!(selection, Selection::Fact(Fact::new(3, 4)));
}

#[test]
fn perfect_grid_ties_are_chosen_uniformly() {
    let mut engine = engine_with(SeededRandom::seeded(99));
    let learner = engine.create_learner("Perfect", None).unwrap();
    for a in 0..=10u8 {
        for b in 0..=10u8 {
            let outcome = engine
                .record_attempt(learner.id, a, b, u32::from(a) * u32::from(b), 1200)
                .unwrap();
            assert!(outcome.is_correct);
        }
    }
    assert_eq!(
        engine.next_question(learner.id, Mode::AllRemaining).unwrap(),
        Selection::Complete
    );

    let trials = 24_200;
    let mut counts: HashMap<Fact, u32> = HashMap::new();
    for _ in 0..trials {
        let fact = engine
            .next_question(learner.id, Mode::LowestScores)
            .unwrap()
            .fact()
            .unwrap();
        *counts.entry(fact).or_default() += 1;
    }

    // Expected 200 per fact with a standard deviation near 14.
    assert_eq!(counts.len(), 121);
    for (fact, count) in &counts {
        assert!(
            (100..=300).contains(count),
            "{fact} chosen {count} times, expected about 200"
        );
    }
}

#[test]
fn all_disabled_exhausts_every_fallback_mode() {
    let mut engine = engine_with(SeededRandom::seeded(1));
    let learner = engine.create_learner("Nothing left", None).unwrap();
    engine.record_attempt(learner.id, 2, 2, 5, 1000).unwrap();
    for factor in 0..=10 {
        engine.toggle_disabled(learner.id, factor).unwrap();
    }

    for mode in [Mode::Smart, Mode::LowestScores, Mode::Random] {
        for _ in 0..20 {
            let result = engine.next_question(learner.id, mode);
            assert!(
                matches!(result, Err(DrillError::Exhausted)),
                "{mode} returned {result:?}"
            );
        }
    }
}

#[test]
fn smart_draw_is_not_renormalised_when_tiers_are_empty() {
    // Everything answered correctly and quickly: tiers one and two are empty,
    // so even r = 0.05 ends in the independent draw.
    let mut engine = engine_with(
        ScriptedRandom::new()
            .with_units([0.05])
            .with_indices([6, 6]),
    );
    let learner = engine.create_learner("Done", None).unwrap();
    for factor in 2..=10 {
        engine.toggle_disabled(learner.id, factor).unwrap();
    }
    for (a, b) in [(0u8, 0u8), (0, 1), (1, 0), (1, 1)] {
        engine.record_attempt(learner.id, a, b, u32::from(a) * u32::from(b), 800).unwrap();
    }

    // Enabled factors are [0, 1]; index 6 % 2 = 0 for both draws.
    let selection = engine.next_question(learner.id, Mode::Smart).unwrap();
    assert_eq!(selection, Selection::Fact(Fact::new(0, 0)));
}

#[test]
fn order_matters_for_coverage_but_not_timing() {
    let mut engine = engine_with(SeededRandom::seeded(8));
    let learner = engine.create_learner("Order", None).unwrap();
    for factor in 0..=10 {
        if factor != 3 && factor != 4 {
            engine.toggle_disabled(learner.id, factor).unwrap();
        }
    }
    engine.record_attempt(learner.id, 3, 4, 12, 1400).unwrap();

    let unanswered = engine.unanswered(learner.id).unwrap();
    assert_eq!(
        unanswered,
        vec![Fact::new(3, 3), Fact::new(4, 3), Fact::new(4, 4)]
    );
    assert_eq!(
        engine.pair_timing(learner.id, 4, 3).unwrap(),
        engine.pair_timing(learner.id, 3, 4).unwrap()
    );

    // Drain the grid: all-remaining keeps asking until complete.
    loop {
        match engine.next_question(learner.id, Mode::AllRemaining).unwrap() {
            Selection::Fact(fact) => {
                engine
                    .record_attempt(learner.id, fact.a, fact.b, fact.product(), 900)
                    .unwrap();
            }
            Selection::Complete => break,
        }
    }
    assert!(engine.unanswered(learner.id).unwrap().is_empty());
}

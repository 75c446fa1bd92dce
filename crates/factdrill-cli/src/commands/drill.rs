//! The `factdrill drill` command: an interactive practice loop.

use std::io::{self, BufRead, Write};
use std::path::Path;
use std::time::Instant;

use anyhow::Result;

use factdrill_core::model::{LearnerId, MAX_ELAPSED_MS};
use factdrill_core::{DrillEngine, Fact, Mode, Selection};

use super::Session;

pub fn execute(
    config: Option<&Path>,
    learner: i64,
    mode: Option<String>,
    count: Option<usize>,
) -> Result<()> {
    let mut session = Session::open(config)?;
    let mode = session.mode(mode.as_deref())?;
    let learner = session.engine.learner(learner)?;
    println!("Hi {}! Mode: {mode}. Type q to stop.", learner.name);

    let options = DrillOptions {
        learner: learner.id,
        mode,
        count,
        target_fallback_ms: session.config.target_time_fallback_ms,
    };
    let stdin = io::stdin();
    let summary = run(
        &mut session.engine,
        &options,
        &mut stdin.lock(),
        &mut io::stdout().lock(),
    )?;

    println!(
        "\n{} answered, {} correct, best streak {}",
        summary.answered, summary.correct, summary.best_streak
    );
    Ok(())
}

pub struct DrillOptions {
    pub learner: LearnerId,
    pub mode: Mode,
    pub count: Option<usize>,
    pub target_fallback_ms: u64,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct DrillSummary {
    pub answered: usize,
    pub correct: usize,
    pub best_streak: usize,
    pub completed_grid: bool,
}

/// Ask questions until input ends, `q` is typed, `count` answers are in, or
/// `all-remaining` runs out of facts.
pub fn run(
    engine: &mut DrillEngine,
    options: &DrillOptions,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> Result<DrillSummary> {
    let mut summary = DrillSummary::default();
    let mut streak = 0;
    let mut retry: Option<Fact> = None;
    let mut retrying = false;

    loop {
        if options.count.is_some_and(|limit| summary.answered >= limit) {
            break;
        }

        let fact = match retry.take() {
            Some(fact) => fact,
            None => match engine.next_question(options.learner, options.mode)? {
                Selection::Fact(fact) => {
                    retrying = false;
                    fact
                }
                Selection::Complete => {
                    writeln!(out, "Grid complete: every fact has been answered.")?;
                    summary.completed_grid = true;
                    break;
                }
            },
        };

        let target = match engine.pair_timing(options.learner, fact.a, fact.b)? {
            Some(timing) => format!("{:.0} ms", timing.avg_time_ms),
            None => format!("no data, aim for {} ms", options.target_fallback_ms),
        };
        write!(out, "{fact} = ?  (target: {target}) ")?;
        out.flush()?;

        let started = Instant::now();
        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            break;
        }
        let elapsed_ms = u64::try_from(started.elapsed().as_millis())
            .unwrap_or(MAX_ELAPSED_MS)
            .min(MAX_ELAPSED_MS);

        let line = line.trim();
        if line.eq_ignore_ascii_case("q") {
            break;
        }
        let Ok(answer) = line.parse::<u32>() else {
            writeln!(out, "Please type a number, or q to stop.")?;
            retry = Some(fact);
            continue;
        };

        let outcome = engine.record_attempt(options.learner, fact.a, fact.b, answer, elapsed_ms)?;
        summary.answered += 1;
        if outcome.is_correct {
            streak += 1;
            summary.correct += 1;
            summary.best_streak = summary.best_streak.max(streak);
            writeln!(out, "Correct! ({elapsed_ms} ms, streak {streak})")?;
        } else {
            streak = 0;
            writeln!(out, "Not quite: {fact} = {}", fact.product())?;
            if !retrying {
                retry = Some(fact);
                retrying = true;
            }
        }
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use factdrill_core::memory::MemoryStore;
    use factdrill_core::random::ScriptedRandom;
    use factdrill_core::traits::AttemptLog;

    fn engine_with_learner(rng: ScriptedRandom) -> (DrillEngine, LearnerId) {
        let engine = DrillEngine::new(Arc::new(MemoryStore::new()), Box::new(rng));
        let learner = engine.create_learner("Ada", None).unwrap();
        (engine, learner.id)
    }

    fn options(learner: LearnerId, mode: Mode, count: Option<usize>) -> DrillOptions {
        DrillOptions {
            learner,
            mode,
            count,
            target_fallback_ms: 5000,
        }
    }

    fn drill(engine: &mut DrillEngine, options: &DrillOptions, input: &str) -> (DrillSummary, String) {
        let mut out = Vec::new();
        let summary = run(engine, options, &mut input.as_bytes(), &mut out).unwrap();
        (summary, String::from_utf8(out).unwrap())
    }

    #[test]
    fn wrong_answer_is_asked_again_once() {
        // Random mode: 3 × 4 is drawn first, then 5 × 6.
        let rng = ScriptedRandom::new().with_indices([3, 4, 5, 6]);
        let (mut engine, learner) = engine_with_learner(rng);
        let (summary, out) = drill(&mut engine, &options(learner, Mode::Random, None), "11\n13\n30\n");

        assert_eq!(summary.answered, 3);
        assert_eq!(summary.correct, 1);
        assert_eq!(out.matches("3 × 4 = ?").count(), 2);
        assert!(out.contains("5 × 6 = ?"));

        let log = engine.store().scan(learner).unwrap();
        assert_eq!(log.len(), 3);
        assert_eq!(log[0].fact(), log[1].fact());
    }

    #[test]
    fn streak_and_count_limit() {
        let rng = ScriptedRandom::new().with_indices([2, 2, 2, 3, 9, 9]);
        let (mut engine, learner) = engine_with_learner(rng);
        let (summary, out) = drill(
            &mut engine,
            &options(learner, Mode::Random, Some(2)),
            "4\n6\n81\n",
        );
        assert_eq!(summary.answered, 2);
        assert_eq!(summary.best_streak, 2);
        assert!(out.contains("streak 2"));
        assert!(!out.contains("9 × 9"));
    }

    #[test]
    fn quit_and_garbage_input() {
        let rng = ScriptedRandom::new().with_indices([7, 7]);
        let (mut engine, learner) = engine_with_learner(rng);
        let (summary, out) = drill(&mut engine, &options(learner, Mode::Random, None), "seven\nq\n");
        assert_eq!(summary, DrillSummary::default());
        assert!(out.contains("Please type a number"));
        assert_eq!(out.matches("7 × 7 = ?").count(), 2);
        assert!(engine.store().scan(learner).unwrap().is_empty());
    }

    #[test]
    fn target_time_comes_from_correct_answers() {
        let rng = ScriptedRandom::new().with_indices([4, 6]);
        let (mut engine, learner) = engine_with_learner(rng);
        engine.record_attempt(learner, 6, 4, 24, 2000).unwrap();
        engine.record_attempt(learner, 4, 6, 24, 4000).unwrap();
        let (_, out) = drill(&mut engine, &options(learner, Mode::Random, None), "");
        assert!(out.contains("4 × 6 = ?  (target: 3000 ms)"));
    }

    #[test]
    fn all_remaining_stops_when_grid_complete() {
        let (mut engine, learner) = engine_with_learner(ScriptedRandom::new());
        for factor in 1..=10 {
            engine.toggle_disabled(learner, factor).unwrap();
        }
        let (summary, out) = drill(&mut engine, &options(learner, Mode::AllRemaining, None), "0\n");
        assert_eq!(summary.answered, 1);
        assert!(summary.completed_grid);
        assert!(out.contains("no data, aim for 5000 ms"));
        assert!(out.contains("Grid complete"));
    }

    #[test]
    fn exhaustion_is_an_error() {
        let (mut engine, learner) = engine_with_learner(ScriptedRandom::new());
        for factor in 0..=10 {
            engine.toggle_disabled(learner, factor).unwrap();
        }
        let mut out = Vec::new();
        let err = run(
            &mut engine,
            &options(learner, Mode::Smart, None),
            &mut "1\n".as_bytes(),
            &mut out,
        )
        .unwrap_err();
        assert!(err.to_string().contains("all factors disabled"));
    }
}

//! The `factdrill answer` command.

use std::path::Path;

use anyhow::Result;

use factdrill_core::Fact;

use super::Session;

pub fn execute(
    config: Option<&Path>,
    learner: i64,
    a: u8,
    b: u8,
    answer: u32,
    elapsed_ms: u64,
) -> Result<()> {
    let session = Session::open(config)?;
    let outcome = session
        .engine
        .record_attempt(learner, a, b, answer, elapsed_ms)?;

    if outcome.is_correct {
        println!("attempt {}: correct", outcome.attempt_id);
    } else {
        let fact = Fact::new(a, b);
        println!(
            "attempt {}: incorrect ({fact} = {})",
            outcome.attempt_id,
            fact.product()
        );
    }
    Ok(())
}

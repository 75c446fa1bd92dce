//! The `factdrill timing` command.

use std::path::Path;

use anyhow::Result;

use factdrill_core::Fact;

use super::Session;

pub fn execute(config: Option<&Path>, learner: i64, a: u8, b: u8) -> Result<()> {
    let session = Session::open(config)?;
    let fact = Fact::new(a, b);
    match session.engine.pair_timing(learner, a, b)? {
        Some(timing) => println!(
            "{fact}: average {:.0} ms, best {} ms",
            timing.avg_time_ms, timing.best_time_ms
        ),
        None => println!(
            "{fact}: no data (target {} ms)",
            session.config.target_time_fallback_ms
        ),
    }
    Ok(())
}

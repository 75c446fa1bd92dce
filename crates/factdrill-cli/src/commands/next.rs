//! The `factdrill next` command.

use std::path::Path;

use anyhow::Result;

use factdrill_core::Selection;

use super::Session;

pub fn execute(config: Option<&Path>, learner: i64, mode: Option<String>) -> Result<()> {
    let mut session = Session::open(config)?;
    let mode = session.mode(mode.as_deref())?;
    match session.engine.next_question(learner, mode)? {
        Selection::Fact(fact) => println!("{} {}", fact.a, fact.b),
        Selection::Complete => println!("complete"),
    }
    Ok(())
}

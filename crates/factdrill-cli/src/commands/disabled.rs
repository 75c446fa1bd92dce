//! The `factdrill disabled` commands.

use std::path::Path;

use anyhow::Result;

use factdrill_core::model::DisabledFactors;

use super::Session;

pub fn list(config: Option<&Path>, learner: i64) -> Result<()> {
    let session = Session::open(config)?;
    let disabled = session.engine.list_disabled(learner)?;
    println!("disabled: {}", describe(&disabled));
    Ok(())
}

pub fn toggle(config: Option<&Path>, learner: i64, factor: u8) -> Result<()> {
    let session = Session::open(config)?;
    let disabled = session.engine.toggle_disabled(learner, factor)?;
    let state = if disabled.contains(factor) {
        "disabled"
    } else {
        "enabled"
    };
    println!("factor {factor} {state}; disabled: {}", describe(&disabled));
    if disabled.all_disabled() {
        println!("warning: every factor is disabled, no questions can be asked");
    }
    Ok(())
}

fn describe(disabled: &DisabledFactors) -> String {
    if disabled.is_empty() {
        return "none".to_string();
    }
    disabled
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

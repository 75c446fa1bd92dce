//! The `factdrill learner` commands.

use std::path::Path;

use anyhow::Result;
use comfy_table::Table;

use super::Session;

pub fn add(config: Option<&Path>, name: String, avatar: Option<String>) -> Result<()> {
    let session = Session::open(config)?;
    let learner = session.engine.create_learner(&name, avatar.as_deref())?;
    println!(
        "Created learner {}: {} ({})",
        learner.id, learner.name, learner.avatar
    );
    Ok(())
}

pub fn list(config: Option<&Path>) -> Result<()> {
    let session = Session::open(config)?;
    let learners = session.engine.learners()?;
    if learners.is_empty() {
        println!("No learners yet.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "Name", "Avatar", "Since"]);
    for learner in &learners {
        table.add_row(vec![
            learner.id.to_string(),
            learner.name.clone(),
            learner.avatar.clone(),
            learner.created_at.format("%Y-%m-%d").to_string(),
        ]);
    }
    println!("{table}");
    Ok(())
}

pub fn rename(config: Option<&Path>, id: i64, name: String, avatar: Option<String>) -> Result<()> {
    let session = Session::open(config)?;
    let learner = session
        .engine
        .update_learner(id, &name, avatar.as_deref())?;
    println!(
        "Updated learner {}: {} ({})",
        learner.id, learner.name, learner.avatar
    );
    Ok(())
}

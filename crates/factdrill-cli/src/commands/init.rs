//! The `factdrill init` command.

use std::path::Path;

use anyhow::Result;

use factdrill_store::config::{write_sample_config, CONFIG_FILE_NAME};

pub fn execute() -> Result<()> {
    if write_sample_config(Path::new(CONFIG_FILE_NAME))? {
        println!("Created {CONFIG_FILE_NAME}");
    } else {
        println!("{CONFIG_FILE_NAME} already exists, skipping.");
    }

    println!("\nNext steps:");
    println!("  1. Run: factdrill learner add --name <name>");
    println!("  2. Run: factdrill drill --learner <id>");

    Ok(())
}

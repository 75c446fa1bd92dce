//! The `factdrill stats` command.

use std::path::Path;

use anyhow::Result;
use comfy_table::{CellAlignment, Table};

use factdrill_core::mastery::{FactGrid, MasteryLevel};
use factdrill_core::model::{DisabledFactors, MAX_FACTOR};

use super::Session;

pub fn execute(config: Option<&Path>, learner_id: i64, format: String) -> Result<()> {
    if !matches!(format.as_str(), "table" | "json") {
        anyhow::bail!("Unknown format: {format} (expected table or json)");
    }

    let session = Session::open(config)?;
    let engine = &session.engine;
    let learner = engine.learner(learner_id)?;
    let coverage = engine.coverage(learner_id)?;
    let disabled = engine.list_disabled(learner_id)?;
    let pairs = engine.aggregate_stats(learner_id)?;
    let grid = FactGrid::from_stats(&pairs);

    match format.as_str() {
        "json" => {
            let cells: Vec<_> = grid.cells().collect();
            let out = serde_json::json!({
                "learner": learner,
                "coverage": coverage,
                "disabled": disabled,
                "pairs": pairs,
                "grid": cells,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        _ => {
            // table
            println!(
                "{} (#{}): {} facts, {} unanswered, {} problematic",
                learner.name,
                learner.id,
                coverage.universe,
                coverage.unanswered,
                coverage.problematic
            );
            println!("{}", render_grid(&grid, &disabled));
            println!(
                "legend: {} mastered  {} progressing  {} slow  {} struggling  {} unseen  - disabled",
                mark(MasteryLevel::Mastered),
                mark(MasteryLevel::Progressing),
                mark(MasteryLevel::Slow),
                mark(MasteryLevel::Struggling),
                mark(MasteryLevel::Unseen),
            );

            let counts = grid.level_counts();
            if !counts.is_empty() {
                let summary: Vec<String> = counts
                    .iter()
                    .map(|(level, n)| format!("{level}: {n}"))
                    .collect();
                println!("{}", summary.join(", "));
            }
        }
    }
    Ok(())
}

fn mark(level: MasteryLevel) -> &'static str {
    match level {
        MasteryLevel::Unseen => ".",
        MasteryLevel::Struggling => "!",
        MasteryLevel::Slow => "~",
        MasteryLevel::Progressing => "+",
        MasteryLevel::Mastered => "*",
    }
}

fn render_grid(grid: &FactGrid, disabled: &DisabledFactors) -> Table {
    let mut table = Table::new();
    let mut header = vec!["×".to_string()];
    header.extend((0..=MAX_FACTOR).map(|b| b.to_string()));
    table.set_header(header);

    for a in 0..=MAX_FACTOR {
        let mut row = vec![a.to_string()];
        for b in 0..=MAX_FACTOR {
            let cell = if disabled.contains(a) || disabled.contains(b) {
                "-"
            } else {
                mark(grid.level(a, b))
            };
            row.push(cell.to_string());
        }
        table.add_row(row);
    }

    for column in table.column_iter_mut() {
        column.set_cell_alignment(CellAlignment::Center);
    }
    table
}

//! factdrill CLI: adaptive multiplication practice from the terminal.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "factdrill", version, about = "Adaptive multiplication fact trainer")]
struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a starter factdrill.toml
    Init,

    /// Manage learners
    Learner {
        #[command(subcommand)]
        action: LearnerAction,
    },

    /// Record one answered question
    Answer {
        #[arg(long)]
        learner: i64,

        /// First factor
        #[arg(long)]
        a: u8,

        /// Second factor
        #[arg(long)]
        b: u8,

        /// The submitted product
        #[arg(long)]
        answer: u32,

        /// Time taken to answer, in milliseconds
        #[arg(long)]
        elapsed_ms: u64,
    },

    /// Pick the next question
    Next {
        #[arg(long)]
        learner: i64,

        /// smart, lowest-scores, all-remaining or random
        #[arg(long)]
        mode: Option<String>,
    },

    /// Show per-fact statistics and the mastery grid
    Stats {
        #[arg(long)]
        learner: i64,

        /// Output format: table, json
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Show the target time for a fact
    Timing {
        #[arg(long)]
        learner: i64,

        #[arg(long)]
        a: u8,

        #[arg(long)]
        b: u8,
    },

    /// List or toggle disabled factors
    Disabled {
        #[command(subcommand)]
        action: DisabledAction,
    },

    /// Practice interactively
    Drill {
        #[arg(long)]
        learner: i64,

        /// smart, lowest-scores, all-remaining or random
        #[arg(long)]
        mode: Option<String>,

        /// Stop after this many answers
        #[arg(long)]
        count: Option<usize>,
    },
}

#[derive(Subcommand)]
enum LearnerAction {
    /// Register a learner
    Add {
        #[arg(long)]
        name: String,

        #[arg(long)]
        avatar: Option<String>,
    },

    /// List learners
    List,

    /// Change a learner's name and avatar
    Rename {
        #[arg(long)]
        id: i64,

        #[arg(long)]
        name: String,

        #[arg(long)]
        avatar: Option<String>,
    },
}

#[derive(Subcommand)]
enum DisabledAction {
    /// Show the disabled factors
    List {
        #[arg(long)]
        learner: i64,
    },

    /// Enable a disabled factor, or disable an enabled one
    Toggle {
        #[arg(long)]
        learner: i64,

        #[arg(long)]
        factor: u8,
    },
}

fn main() {
    let mut filter = tracing_subscriber::EnvFilter::from_default_env();
    if let Ok(directive) = "factdrill=info".parse::<tracing_subscriber::filter::Directive>() {
        filter = filter.add_directive(directive);
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.config.as_deref();

    let result = match cli.command {
        Commands::Init => commands::init::execute(),
        Commands::Learner { action } => match action {
            LearnerAction::Add { name, avatar } => commands::learner::add(config, name, avatar),
            LearnerAction::List => commands::learner::list(config),
            LearnerAction::Rename { id, name, avatar } => {
                commands::learner::rename(config, id, name, avatar)
            }
        },
        Commands::Answer {
            learner,
            a,
            b,
            answer,
            elapsed_ms,
        } => commands::answer::execute(config, learner, a, b, answer, elapsed_ms),
        Commands::Next { learner, mode } => commands::next::execute(config, learner, mode),
        Commands::Stats { learner, format } => commands::stats::execute(config, learner, format),
        Commands::Timing { learner, a, b } => commands::timing::execute(config, learner, a, b),
        Commands::Disabled { action } => match action {
            DisabledAction::List { learner } => commands::disabled::list(config, learner),
            DisabledAction::Toggle { learner, factor } => {
                commands::disabled::toggle(config, learner, factor)
            }
        },
        Commands::Drill {
            learner,
            mode,
            count,
        } => commands::drill::execute(config, learner, mode, count),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

//! Subcommand implementations.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;

use factdrill_core::{DrillEngine, Mode};
use factdrill_store::{load_config_from, open_store, DrillConfig};

pub mod answer;
pub mod disabled;
pub mod drill;
pub mod init;
pub mod learner;
pub mod next;
pub mod stats;
pub mod timing;

/// A loaded config and an engine over the configured database.
pub struct Session {
    pub config: DrillConfig,
    pub engine: DrillEngine,
}

impl Session {
    pub fn open(config_path: Option<&Path>) -> Result<Self> {
        let config = load_config_from(config_path)?;
        let store = Arc::new(open_store(&config)?);
        tracing::debug!(
            database = %config.database.display(),
            seeded = config.seed.is_some(),
            "session opened"
        );
        let engine = match config.seed {
            Some(seed) => DrillEngine::with_seed(store, seed),
            None => DrillEngine::with_entropy(store),
        };
        Ok(Self { config, engine })
    }

    /// `--mode` if given, otherwise the configured default.
    pub fn mode(&self, requested: Option<&str>) -> Result<Mode> {
        match requested {
            Some(m) => Ok(m.parse::<Mode>()?),
            None => Ok(self.config.default_mode),
        }
    }
}

//! factdrill-store: durable storage and configuration.
//!
//! Persists learners, the append-only attempt log and disabled factors in
//! SQLite, and loads the `factdrill.toml` configuration that decides which
//! database to open.

pub mod config;
pub mod sqlite;

pub use config::{load_config, load_config_from, open_store, DrillConfig};
pub use sqlite::SqliteStore;

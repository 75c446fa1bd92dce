//! Drill configuration and store factory.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use factdrill_core::mastery::SLOW_ANSWER_MS;
use factdrill_core::Mode;

use crate::sqlite::SqliteStore;

/// Name of the per-directory config file.
pub const CONFIG_FILE_NAME: &str = "factdrill.toml";

/// Sample written by `factdrill init`.
pub const SAMPLE_CONFIG: &str = r#"# factdrill configuration

# SQLite database holding learners, attempts and disabled factors.
# ${VAR} references are expanded from the environment.
database = "./factdrill.db"

# smart | lowest-scores | all-remaining | random
default_mode = "smart"

# Fixed seed for reproducible question order. Omit for fresh randomness.
# seed = 42

# Target time shown when a fact has no correct answers yet.
target_time_fallback_ms = 5000
"#;

/// Top-level factdrill configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrillConfig {
    /// Path of the SQLite database.
    #[serde(default = "default_database")]
    pub database: PathBuf,
    /// Mode used when a command does not pass `--mode`.
    #[serde(default)]
    pub default_mode: Mode,
    /// Seed for question selection.
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default = "default_target_time")]
    pub target_time_fallback_ms: u64,
}

fn default_database() -> PathBuf {
    PathBuf::from("./factdrill.db")
}
fn default_target_time() -> u64 {
    SLOW_ANSWER_MS
}

impl Default for DrillConfig {
    fn default() -> Self {
        Self {
            database: default_database(),
            default_mode: Mode::default(),
            seed: None,
            target_time_fallback_ms: default_target_time(),
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
///
/// Substituted values are not scanned again.
pub fn resolve_env_vars(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(end) = rest[start..].find('}') else {
            break;
        };
        let var_name = &rest[start + 2..start + end];
        result.push_str(&rest[..start]);
        result.push_str(&std::env::var(var_name).unwrap_or_default());
        rest = &rest[start + end + 1..];
    }
    result.push_str(rest);
    result
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `factdrill.toml` in the current directory
/// 2. `~/.config/factdrill/config.toml`
///
/// Environment variable overrides: `FACTDRILL_DB`, `FACTDRILL_SEED`.
pub fn load_config() -> Result<DrillConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<DrillConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from(CONFIG_FILE_NAME);
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|dir| dir.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            let config = toml::from_str::<DrillConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?;
            tracing::debug!("loaded config from {}", path.display());
            config
        }
        None => DrillConfig::default(),
    };

    apply_overrides(config, |name| std::env::var(name).ok())
}

/// Apply `FACTDRILL_*` overrides from `lookup`, then expand `${VAR}`s.
fn apply_overrides(
    mut config: DrillConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<DrillConfig> {
    if let Some(db) = lookup("FACTDRILL_DB") {
        config.database = PathBuf::from(db);
    }
    if let Some(seed) = lookup("FACTDRILL_SEED") {
        let seed = seed
            .trim()
            .parse::<u64>()
            .with_context(|| format!("FACTDRILL_SEED is not a number: {seed}"))?;
        config.seed = Some(seed);
    }

    config.database = PathBuf::from(resolve_env_vars(&config.database.to_string_lossy()));
    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("factdrill"))
}

/// Open the configured database, creating parent directories as needed.
pub fn open_store(config: &DrillConfig) -> Result<SqliteStore> {
    if let Some(parent) = config.database.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
    }
    SqliteStore::open(&config.database)
        .with_context(|| format!("failed to open database: {}", config.database.display()))
}

/// Write [`SAMPLE_CONFIG`] to `path`. Returns `false` when the file already exists.
pub fn write_sample_config(path: &Path) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    std::fs::write(path, SAMPLE_CONFIG)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn resolve_env_vars_basic() {
        std::env::set_var("_FACTDRILL_TEST_VAR", "hello");
        assert_eq!(resolve_env_vars("${_FACTDRILL_TEST_VAR}"), "hello");
        assert_eq!(
            resolve_env_vars("prefix_${_FACTDRILL_TEST_VAR}_suffix"),
            "prefix_hello_suffix"
        );
        assert_eq!(resolve_env_vars("no_close_${brace"), "no_close_${brace");
        std::env::remove_var("_FACTDRILL_TEST_VAR");
    }

    #[test]
    fn resolve_env_vars_does_not_rescan_values() {
        std::env::set_var("_FACTDRILL_SELF_REF", "${_FACTDRILL_SELF_REF}");
        std::env::set_var("_FACTDRILL_DIR", "/srv/${HOME}");
        assert_eq!(
            resolve_env_vars("${_FACTDRILL_SELF_REF}/x"),
            "${_FACTDRILL_SELF_REF}/x"
        );
        assert_eq!(
            resolve_env_vars("${_FACTDRILL_DIR}/${_FACTDRILL_UNSET_VAR}drill.db"),
            "/srv/${HOME}/drill.db"
        );
        std::env::remove_var("_FACTDRILL_SELF_REF");
        std::env::remove_var("_FACTDRILL_DIR");
    }

    #[test]
    fn default_config() {
        let config = DrillConfig::default();
        assert_eq!(config.database, PathBuf::from("./factdrill.db"));
        assert_eq!(config.default_mode, Mode::Smart);
        assert_eq!(config.seed, None);
        assert_eq!(config.target_time_fallback_ms, 5000);
    }

    #[test]
    fn parse_config() {
        let config: DrillConfig = toml::from_str(
            r#"
database = "/tmp/drill.db"
default_mode = "lowest-scores"
seed = 7
"#,
        )
        .unwrap();
        assert_eq!(config.database, PathBuf::from("/tmp/drill.db"));
        assert_eq!(config.default_mode, Mode::LowestScores);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.target_time_fallback_ms, 5000);
    }

    #[test]
    fn sample_config_parses_to_defaults() {
        let config: DrillConfig = toml::from_str(SAMPLE_CONFIG).unwrap();
        assert_eq!(config, DrillConfig::default());
    }

    #[test]
    fn unknown_mode_is_rejected() {
        assert!(toml::from_str::<DrillConfig>(r#"default_mode = "hardest""#).is_err());
    }

    #[test]
    fn env_overrides_apply() {
        let env: HashMap<&str, &str> =
            HashMap::from([("FACTDRILL_DB", "/data/kids.db"), ("FACTDRILL_SEED", " 99 ")]);
        let config = apply_overrides(DrillConfig::default(), |k| {
            env.get(k).map(|v| v.to_string())
        })
        .unwrap();
        assert_eq!(config.database, PathBuf::from("/data/kids.db"));
        assert_eq!(config.seed, Some(99));
    }

    #[test]
    fn bad_seed_override_fails() {
        let result = apply_overrides(DrillConfig::default(), |k| {
            (k == "FACTDRILL_SEED").then(|| "soon".to_string())
        });
        assert!(result.is_err());
    }

    #[test]
    fn explicit_path_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        let err = load_config_from(Some(&missing)).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }

    #[test]
    fn load_from_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("factdrill.toml");
        std::fs::write(&path, "default_mode = \"random\"\ntarget_time_fallback_ms = 3000\n").unwrap();
        let config = load_config_from(Some(&path)).unwrap();
        assert_eq!(config.default_mode, Mode::Random);
        assert_eq!(config.target_time_fallback_ms, 3000);
    }

    #[test]
    fn init_does_not_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        assert!(write_sample_config(&path).unwrap());
        std::fs::write(&path, "seed = 1\n").unwrap();
        assert!(!write_sample_config(&path).unwrap());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "seed = 1\n");
    }

    #[test]
    fn open_store_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let config = DrillConfig {
            database: dir.path().join("nested").join("drill.db"),
            ..DrillConfig::default()
        };
        open_store(&config).unwrap();
        assert!(config.database.exists());
    }
}

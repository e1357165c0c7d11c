//! Configuration management with layered hierarchy

use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::core::Project;

/// Table queried when no `signatures_table` is configured
pub const DEFAULT_SIGNATURES_TABLE: &str = "signatures";

/// Database file used when no `signatures_db` is configured
pub const DEFAULT_SIGNATURES_DB: &str = "signatures.db";

/// tcomp configuration with layered hierarchy
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// SQLite database holding the signatures table
    pub signatures_db: Option<PathBuf>,

    /// Name of the table holding signature names
    pub signatures_table: Option<String>,

    /// Default output format for records
    pub default_format: Option<String>,

    /// Last known manufacturing order keyed by machine number
    #[serde(deserialize_with = "deserialize_last_orders")]
    pub last_orders: BTreeMap<u32, String>,
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    pub fn load_for(project: Option<&Project>) -> Self {
        let mut config = Config::default();

        // 1. Global user config (~/.config/tcomp/config.yaml)
        if let Some(global_path) = Self::global_config_path() {
            if let Some(global) = Self::read_file(&global_path) {
                config.merge(global);
            }
        }

        // 2. Project config (.tcomp/config.yaml)
        if let Some(project) = project {
            if let Some(project_config) = Self::read_file(&project.config_dir().join("config.yaml")) {
                config.merge(project_config);
            }
        }

        // 3. Environment variables
        if let Ok(db) = std::env::var("TCOMP_SIGNATURES_DB") {
            config.signatures_db = Some(PathBuf::from(db));
        }
        if let Ok(table) = std::env::var("TCOMP_SIGNATURES_TABLE") {
            config.signatures_table = Some(table);
        }

        config
    }

    /// Get the path to the global config file
    pub fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "tcomp")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    fn read_file(path: &Path) -> Option<Config> {
        if !path.exists() {
            return None;
        }
        let contents = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "could not read config file");
                return None;
            }
        };
        if contents.trim().is_empty() {
            return None;
        }
        match serde_yml::from_str::<Config>(&contents) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring malformed config file");
                None
            }
        }
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        if other.signatures_db.is_some() {
            self.signatures_db = other.signatures_db;
        }
        if other.signatures_table.is_some() {
            self.signatures_table = other.signatures_table;
        }
        if other.default_format.is_some() {
            self.default_format = other.default_format;
        }
        self.last_orders.extend(other.last_orders);
    }

    /// Table queried for signature names
    pub fn signatures_table(&self) -> &str {
        self.signatures_table
            .as_deref()
            .unwrap_or(DEFAULT_SIGNATURES_TABLE)
    }

    /// Signature database path, resolved against the project root when relative
    pub fn signatures_db(&self, project: Option<&Project>) -> PathBuf {
        let path = self
            .signatures_db
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SIGNATURES_DB));
        match project {
            Some(project) => project.resolve(&path),
            None => path,
        }
    }
}

/// Machine keys may be written as YAML integers or as quoted strings
#[derive(Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(untagged)]
enum MachineKey {
    Number(u32),
    Signed(i64),
    Unsigned(u64),
    Text(String),
}

fn deserialize_last_orders<'de, D>(deserializer: D) -> Result<BTreeMap<u32, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<BTreeMap<MachineKey, String>>::deserialize(deserializer)?.unwrap_or_default();
    let mut orders = BTreeMap::new();
    for (key, order) in raw {
        let machine = match key {
            MachineKey::Number(n) => n,
            MachineKey::Signed(n) => {
                tracing::warn!(key = n, "ignoring last_orders entry with out-of-range machine");
                continue;
            }
            MachineKey::Unsigned(n) => {
                tracing::warn!(key = n, "ignoring last_orders entry with out-of-range machine");
                continue;
            }
            MachineKey::Text(text) => match text.trim().parse::<u32>() {
                Ok(n) => n,
                Err(_) => {
                    tracing::warn!(key = %text, "ignoring last_orders entry with non-numeric machine");
                    continue;
                }
            },
        };
        orders.insert(machine, order);
    }
    Ok(orders)
}

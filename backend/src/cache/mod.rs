//! Config Registry - Store and reuse mapping configurations
//!
//! Saves configurations to disk and matches them to CSV files by their columns.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::api::logs::log_warning;
use crate::error::{RegistryError, RegistryResult};
use crate::models::Config;
use crate::validation::load_config_json;

/// Directory where configurations are stored (relative to current dir)
pub const DEFAULT_REGISTRY_DIR: &str = ".csv2ttl/configs";

/// Environment variable overriding [`DEFAULT_REGISTRY_DIR`].
pub const REGISTRY_DIR_ENV: &str = "CSV2TTL_REGISTRY_DIR";

/// Minimum share of a stored configuration's columns a CSV must have.
const COMPATIBILITY_THRESHOLD: f64 = 0.5;

/// A stored configuration with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredConfig {
    /// Unique identifier
    pub id: String,
    /// Human-readable name
    pub name: String,
    /// The mapping configuration
    pub config: Config,
    /// CSV columns this configuration reads
    pub csv_columns: Vec<String>,
    /// Creation timestamp
    pub created_at: String,
    /// Last time this configuration was used
    pub last_used: Option<String>,
    /// Number of times used
    pub use_count: u32,
}

/// Registry for managing mapping configurations
pub struct ConfigRegistry {
    registry_dir: PathBuf,
    configs: HashMap<String, StoredConfig>,
}

impl ConfigRegistry {
    /// Open the registry in `$CSV2TTL_REGISTRY_DIR`, or the default directory.
    pub fn new() -> Self {
        let dir = std::env::var(REGISTRY_DIR_ENV).unwrap_or_else(|_| DEFAULT_REGISTRY_DIR.to_string());
        Self::with_dir(dir)
    }

    /// Open a registry in a custom directory
    pub fn with_dir(dir: impl AsRef<Path>) -> Self {
        let mut registry = Self {
            registry_dir: dir.as_ref().to_path_buf(),
            configs: HashMap::new(),
        };
        registry.load_all();
        registry
    }

    pub fn dir(&self) -> &Path {
        &self.registry_dir
    }

    /// Load every stored configuration; unreadable files are skipped.
    fn load_all(&mut self) {
        let entries = match fs::read_dir(&self.registry_dir) {
            Ok(e) => e,
            Err(_) => return,
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if !path.extension().is_some_and(|e| e == "json") {
                continue;
            }
            let parsed = fs::read_to_string(&path)
                .ok()
                .and_then(|content| serde_json::from_str::<StoredConfig>(&content).ok());
            match parsed {
                Some(stored) => {
                    self.configs.insert(stored.id.clone(), stored);
                }
                None => log_warning(format!("Skipping unreadable stored config {}", path.display())),
            }
        }
    }

    /// All stored configurations, most recent first
    pub fn list(&self) -> Vec<&StoredConfig> {
        let mut configs: Vec<_> = self.configs.values().collect();
        configs.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        configs
    }

    pub fn get(&self, id: &str) -> RegistryResult<&StoredConfig> {
        self.configs
            .get(id)
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))
    }

    pub fn len(&self) -> usize {
        self.configs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }

    /// Stored configurations matching `csv_columns`, best first.
    ///
    /// The score is the share of a stored configuration's columns present
    /// in `csv_columns`, compared case-insensitively. Only scores above one
    /// half are kept; ties go to the most used.
    pub fn find_compatible(&self, csv_columns: &[String]) -> Vec<(&StoredConfig, f64)> {
        let mut compatible: Vec<_> = self
            .configs
            .values()
            .filter_map(|c| {
                let score = compatibility(&c.csv_columns, csv_columns);
                (score > COMPATIBILITY_THRESHOLD).then_some((c, score))
            })
            .collect();

        compatible.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| b.0.use_count.cmp(&a.0.use_count))
                .then_with(|| a.0.id.cmp(&b.0.id))
        });

        compatible
    }

    /// Store `config` under `name`; the columns are the ones it reads.
    pub fn save(&mut self, config: Config, name: &str) -> RegistryResult<String> {
        fs::create_dir_all(&self.registry_dir)?;

        let id = self.generate_id(name);
        let stored = StoredConfig {
            id: id.clone(),
            name: name.to_string(),
            csv_columns: config.source_columns(),
            config,
            created_at: chrono::Utc::now().to_rfc3339(),
            last_used: None,
            use_count: 0,
        };

        self.write(&stored)?;
        self.configs.insert(id.clone(), stored);
        Ok(id)
    }

    /// Import a configuration JSON file.
    ///
    /// The name defaults to the file stem.
    pub fn import(&mut self, path: &Path, name: Option<&str>) -> RegistryResult<String> {
        let content = fs::read_to_string(path)?;
        let config = load_config_json(&content).map_err(|e| RegistryError::InvalidConfig(e.to_string()))?;

        let name = name.unwrap_or_else(|| {
            path.file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("imported")
        });

        self.save(config, name)
    }

    /// Record one use of a configuration
    pub fn touch(&mut self, id: &str) -> RegistryResult<()> {
        let stored = self
            .configs
            .get_mut(id)
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))?;
        stored.last_used = Some(chrono::Utc::now().to_rfc3339());
        stored.use_count += 1;

        let stored = stored.clone();
        self.write(&stored)
    }

    pub fn delete(&mut self, id: &str) -> RegistryResult<()> {
        if self.configs.remove(id).is_none() {
            return Err(RegistryError::NotFound(id.to_string()));
        }
        fs::remove_file(self.path_for(id))?;
        Ok(())
    }

    fn write(&self, stored: &StoredConfig) -> RegistryResult<()> {
        let content = serde_json::to_string_pretty(stored)?;
        fs::write(self.path_for(&stored.id), content)?;
        Ok(())
    }

    fn path_for(&self, id: &str) -> PathBuf {
        self.registry_dir.join(format!("{}.json", id))
    }

    /// Slug of the name plus a millisecond timestamp
    fn generate_id(&self, name: &str) -> String {
        let slug = slugify(name);
        let timestamp = chrono::Utc::now().timestamp_millis();

        let mut id = format!("{}-{}", slug, timestamp);
        let mut n = 1;
        while self.configs.contains_key(&id) {
            id = format!("{}-{}-{}", slug, timestamp, n);
            n += 1;
        }
        id
    }
}

impl Default for ConfigRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn slugify(name: &str) -> String {
    let slug = name
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '-' })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-");

    if slug.is_empty() {
        "config".to_string()
    } else {
        slug
    }
}

/// Share of `stored` columns present in `csv`, case-insensitive.
fn compatibility(stored: &[String], csv: &[String]) -> f64 {
    if stored.is_empty() {
        return 0.0;
    }

    let csv_lower: Vec<String> = csv.iter().map(|c| c.to_lowercase()).collect();
    let match_count = stored
        .iter()
        .filter(|col| csv_lower.contains(&col.to_lowercase()))
        .count();

    match_count as f64 / stored.len() as f64
}

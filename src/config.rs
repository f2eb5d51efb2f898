//! YAML configuration loading
//!
//! The file keeps the API settings at the top level and everything about the
//! batch itself under `search`:
//!
//! ```yaml
//! api_url: https://api.example.org/search
//! ret_max: 50
//! search:
//!   keywords: ["ai", "\"machine learning\""]
//!   years: [2020, 2023]
//!   levels:
//!     "1": ["https://www.site.org"]
//!   directory: ./data
//!   search_level: 1
//! ```

use crate::{
    error::{HarvestError, HarvestResult},
    types::{SearchConfiguration, YearRange},
};
use serde::{Deserialize, Deserializer};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

/// Environment variable naming the configuration file
pub const CONFIG_ENV_VAR: &str = "SEARCH_HARVEST_CONFIG";
/// Used when [`CONFIG_ENV_VAR`] is unset
pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";

const DEFAULT_RET_MAX: u32 = 50;
const DEFAULT_SEARCH_LEVEL: u8 = 3;

#[derive(Debug, Deserialize)]
struct ConfigFile {
    api_url: String,
    #[serde(default = "default_ret_max")]
    ret_max: u32,
    search: SearchSection,
}

#[derive(Debug, Deserialize)]
struct SearchSection {
    keywords: Vec<String>,
    #[serde(default)]
    years: Option<Vec<i32>>,
    #[serde(deserialize_with = "deserialize_levels")]
    levels: BTreeMap<u8, Vec<String>>,
    directory: PathBuf,
    #[serde(default = "default_search_level")]
    search_level: u8,
}

fn default_ret_max() -> u32 {
    DEFAULT_RET_MAX
}

fn default_search_level() -> u8 {
    DEFAULT_SEARCH_LEVEL
}

/// Level keys show up quoted (`"1":`) or bare (`1:`)
#[derive(Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(untagged)]
enum LevelKey {
    Number(u8),
    Text(String),
}

impl LevelKey {
    fn level(&self) -> Option<u8> {
        match self {
            LevelKey::Number(n) => Some(*n),
            LevelKey::Text(s) => s.trim().parse().ok(),
        }
    }
}

fn deserialize_levels<'de, D>(deserializer: D) -> Result<BTreeMap<u8, Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    HashMap::<LevelKey, Vec<String>>::deserialize(deserializer)?
        .into_iter()
        .map(|(key, sites)| match key.level() {
            Some(level) => Ok((level, sites)),
            None => Err(serde::de::Error::custom(format!(
                "invalid search level key {key:?}"
            ))),
        })
        .collect()
}

impl ConfigFile {
    fn into_configuration(self) -> HarvestResult<SearchConfiguration> {
        let years = match self.search.years.as_deref() {
            None => YearRange::default(),
            Some([init_year, end_year]) => YearRange::new(*init_year, *end_year),
            Some(other) => {
                return Err(HarvestError::ConfigError(format!(
                    "years must hold exactly two integers, got {}",
                    other.len()
                )))
            }
        };

        Ok(SearchConfiguration {
            api_url: self.api_url.trim().trim_end_matches('?').to_string(),
            ret_max: self.ret_max,
            keywords: self.search.keywords,
            years,
            levels: self.search.levels,
            output_directory: self.search.directory,
            search_level: self.search.search_level,
        })
    }
}

/// Parse configuration text
pub fn parse_config(text: &str) -> HarvestResult<SearchConfiguration> {
    let file: ConfigFile = serde_yaml::from_str(text)?;
    file.into_configuration()
}

/// Read and parse a configuration file
pub fn load_config(path: &Path) -> HarvestResult<SearchConfiguration> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        HarvestError::ConfigError(format!("Cannot read {}: {e}", path.display()))
    })?;

    log::debug!("Loaded configuration from {}", path.display());
    parse_config(&text)
}

/// Configuration path from the environment, or the default file name
pub fn config_path_from_env() -> PathBuf {
    std::env::var(CONFIG_ENV_VAR)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
}

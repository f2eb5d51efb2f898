//! Core types and traits for the harvester

use crate::error::{HarvestError, HarvestResult};
use crate::utils::http::short_site_name;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::ops::Range;
use std::path::PathBuf;
use std::str::FromStr;

/// Search levels accepted by the orchestrator
pub const VALID_SEARCH_LEVELS: [u8; 3] = [1, 2, 3];

/// Inclusive start, exclusive end year window.
///
/// `(0, 0)` means year filtering is disabled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct YearRange {
    pub init_year: i32,
    pub end_year: i32,
}

impl YearRange {
    pub fn new(init_year: i32, end_year: i32) -> Self {
        Self {
            init_year,
            end_year,
        }
    }

    /// Year filtering applies only when both bounds are non-zero
    pub fn is_enabled(&self) -> bool {
        self.init_year != 0 && self.end_year != 0
    }

    /// Years queried for each (website, keyword) pair, end year excluded.
    ///
    /// Empty when filtering is disabled.
    pub fn years(&self) -> Range<i32> {
        if self.is_enabled() {
            self.init_year..self.end_year
        } else {
            0..0
        }
    }

    /// Requests issued per (website, keyword) pair
    pub fn requests_per_pair(&self) -> u64 {
        if self.is_enabled() && self.end_year > self.init_year {
            (i64::from(self.end_year) - i64::from(self.init_year)) as u64
        } else {
            1
        }
    }
}

/// Everything a batch run needs, as loaded from the YAML file
#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfiguration {
    /// Base URL of the search API, without query string
    pub api_url: String,
    /// Value sent as `maxItems`
    pub ret_max: u32,
    /// Keywords in query order
    pub keywords: Vec<String>,
    /// Optional per-year repetition window
    pub years: YearRange,
    /// Website domains per search level
    pub levels: BTreeMap<u8, Vec<String>>,
    /// Directory the JSON files are written into
    pub output_directory: PathBuf,
    /// Level whose websites are queried
    pub search_level: u8,
}

impl SearchConfiguration {
    /// Check the run preconditions. Called before any request is issued.
    pub fn validate(&self) -> HarvestResult<()> {
        if !VALID_SEARCH_LEVELS.contains(&self.search_level) {
            return Err(HarvestError::ConfigError(format!(
                "Search level must be an integer between 1 and 3, got {}",
                self.search_level
            )));
        }

        // (0, 0) is how callers switch year filtering off
        let years_disabled = self.years.init_year == 0 && self.years.end_year == 0;
        if !years_disabled && self.years.end_year <= self.years.init_year {
            return Err(HarvestError::ConfigError(format!(
                "Final year must be greater than the initial year ({} <= {})",
                self.years.end_year, self.years.init_year
            )));
        }

        if !self.levels.contains_key(&self.search_level) {
            return Err(HarvestError::ConfigError(format!(
                "No websites configured for search level {}",
                self.search_level
            )));
        }

        url::Url::parse(&self.api_url).map_err(|e| {
            HarvestError::ConfigError(format!("Invalid API URL '{}': {e}", self.api_url))
        })?;

        // Output names are derived from the websites, so bad entries fail here
        for website in self.websites() {
            short_site_name(website).map_err(|e| HarvestError::ConfigError(e.to_string()))?;
        }

        Ok(())
    }

    /// Websites selected by the configured search level
    pub fn websites(&self) -> &[String] {
        self.levels
            .get(&self.search_level)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of requests a run issues, fallbacks excluded
    pub fn task_count(&self) -> u64 {
        (self.websites().len() as u64)
            .saturating_mul(self.keywords.len() as u64)
            .saturating_mul(self.years.requests_per_pair())
    }
}

/// One (website, keyword, year) combination of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTask {
    pub website: String,
    /// Keyword as written in the configuration
    pub query: String,
    /// `query` formatted for URL use
    pub keyword: String,
    pub year: Option<i32>,
}

/// File open mode for the persistence writer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WriteMode {
    /// Truncate and write (`"w"`)
    #[default]
    Write,
    /// Append to the end (`"a"`)
    Append,
}

impl FromStr for WriteMode {
    type Err = HarvestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "w" => Ok(WriteMode::Write),
            "a" => Ok(WriteMode::Append),
            other => Err(HarvestError::ModeError(format!(
                "'{other}' is not one of \"w\" or \"a\""
            ))),
        }
    }
}

impl fmt::Display for WriteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WriteMode::Write => write!(f, "w"),
            WriteMode::Append => write!(f, "a"),
        }
    }
}

/// Debug options for the harvester
#[derive(Debug, Clone, Default)]
pub struct DebugOptions {
    /// Enable verbose logging
    pub enabled: bool,
    /// Log request URLs
    pub log_requests: bool,
    /// Log response sizes and output paths
    pub log_responses: bool,
}

/// What a finished run did
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Requests sent, fallback attempts included
    pub requests: usize,
    /// Tasks that needed the re-encoded keyword retry
    pub fallbacks: usize,
    /// Files written, in task order
    pub files: Vec<PathBuf>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunReport {
    pub(crate) fn start() -> Self {
        let now = Utc::now();
        Self {
            requests: 0,
            fallbacks: 0,
            files: Vec::new(),
            started_at: now,
            finished_at: now,
        }
    }
}

/// Transport used to reach the search API
#[async_trait::async_trait]
pub trait SearchApi: Send + Sync + std::fmt::Debug {
    /// Name of the transport (for debugging/logging)
    fn name(&self) -> &str;

    /// GET the URL and return the response body
    async fn get(&self, url: &str) -> HarvestResult<String>;
}

//! # search-harvest
//!
//! Batch querying of a search API over the cross product of keywords, target
//! websites and (optionally) years. Every response is pretty-printed and saved
//! as `{keyword}_{year}_{site}.json` in the configured output directory.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use search_harvest::{config::load_config, json_search, HarvestOptions};
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config(Path::new("config.yaml"))?;
//!     let report = json_search(&config, HarvestOptions::default()).await?;
//!
//!     for file in &report.files {
//!         println!("{}", file.display());
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod executor;
pub mod keyword;
pub mod orchestrator;
pub mod persistence;
pub mod types;
pub mod utils;

// Re-export common types
pub use error::{HarvestError, HarvestResult as Result};
pub use executor::RequestExecutor;
pub use orchestrator::{plan_tasks, Harvester};
pub use types::{
    DebugOptions, RunReport, SearchApi, SearchConfiguration, SearchTask, WriteMode, YearRange,
};

use utils::http::HttpClient;

/// Per-run options that are not part of the YAML configuration
#[derive(Debug)]
pub struct HarvestOptions {
    /// Request timeout in milliseconds, used when `api` is not given
    pub timeout: Option<u64>,
    /// Debug options
    pub debug: Option<DebugOptions>,
    /// Transport override; a reqwest client is built when `None`
    pub api: Option<Box<dyn SearchApi>>,
}

impl Default for HarvestOptions {
    fn default() -> Self {
        Self {
            timeout: Some(error::DEFAULT_TIMEOUT_MS),
            debug: None,
            api: None,
        }
    }
}

/// Run a full batch for `config` and report what was written.
///
/// # Examples
///
/// ```rust,no_run
/// use search_harvest::{json_search, HarvestOptions, SearchConfiguration};
///
/// # async fn run(config: SearchConfiguration) -> search_harvest::Result<()> {
/// let report = json_search(&config, HarvestOptions::default()).await?;
/// println!("{} files written", report.files.len());
/// # Ok(())
/// # }
/// ```
pub async fn json_search(
    config: &SearchConfiguration,
    options: HarvestOptions,
) -> Result<RunReport> {
    use utils::debug;

    let api = options.api.unwrap_or_else(|| {
        let timeout = options.timeout.unwrap_or(error::DEFAULT_TIMEOUT_MS);
        Box::new(HttpClient::with_timeout(timeout)) as Box<dyn SearchApi>
    });

    debug::log(
        &options.debug,
        "Starting harvest",
        &format!(
            "transport: {}, api: {}, level: {}, keywords: {}",
            api.name(),
            config.api_url,
            config.search_level,
            config.keywords.len()
        ),
    );

    let executor = RequestExecutor::new(&config.api_url, api).with_debug(options.debug.clone());
    let result = Harvester::new(executor).run(config).await;

    match &result {
        Ok(report) => debug::log(
            &options.debug,
            "Harvest finished",
            &format!("{} requests, {} files", report.requests, report.files.len()),
        ),
        Err(error) => debug::log(&options.debug, "Harvest failed", &error.to_string()),
    }

    result
}

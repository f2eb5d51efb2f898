//! Request executor: URL construction, primary request with one re-encoded
//! retry, JSON re-serialisation, and hand-off to the persistence writer.

use crate::{
    error::{HarvestError, HarvestResult},
    keyword::fallback_keyword,
    persistence::save_file_data,
    types::{DebugOptions, SearchApi, SearchTask, WriteMode},
    utils::{debug, http::short_site_name},
};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Outcome of one executed task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutcome {
    /// Where the response was written
    pub path: PathBuf,
    /// Whether the re-encoded keyword retry was needed
    pub used_fallback: bool,
}

/// Execution context shared by every request of a run
#[derive(Debug)]
pub struct RequestExecutor {
    api_url: String,
    api: Box<dyn SearchApi>,
    debug: Option<DebugOptions>,
}

impl RequestExecutor {
    pub fn new(api_url: &str, api: Box<dyn SearchApi>) -> Self {
        Self {
            api_url: api_url.to_string(),
            api,
            debug: None,
        }
    }

    pub fn with_debug(mut self, debug: Option<DebugOptions>) -> Self {
        self.debug = debug;
        self
    }

    /// Build the request URL for a task with the given keyword segment
    pub fn build_url(&self, keyword: &str, website: &str, ret_max: u32, year: Option<i32>) -> String {
        build_request_url(&self.api_url, keyword, website, ret_max, year)
    }

    /// Fetch one task and write its response under `output_dir`
    pub async fn fetch(
        &self,
        task: &SearchTask,
        ret_max: u32,
        output_dir: &Path,
    ) -> HarvestResult<FetchOutcome> {
        let url = self.build_url(&task.keyword, &task.website, ret_max, task.year);
        debug::log_request(&self.debug, "GET", &url);

        let (body, used_fallback) = match self.api.get(&url).await {
            Ok(body) => (body, false),
            Err(error) if error.is_transport() => {
                let encoded = fallback_keyword(&task.query);
                let retry_url = self.build_url(&encoded, &task.website, ret_max, task.year);
                log::warn!("Request for '{}' failed ({error}), retrying as {retry_url}", task.query);
                debug::log_request(&self.debug, "GET (re-encoded keyword)", &retry_url);

                (self.api.get(&retry_url).await?, true)
            }
            Err(error) => return Err(error),
        };

        debug::log_response(
            &self.debug,
            &format!("{} bytes for {}", body.len(), task.keyword),
        );

        let document = pretty_json(&body)?;
        let path = output_dir.join(output_file_name(task)?);
        save_file_data(&document, &path, WriteMode::Write).await?;

        Ok(FetchOutcome {
            path,
            used_fallback,
        })
    }
}

/// `{api_url}?q=..&siteSearch=..&maxItems=..[&from=Y&to=Y+1]`, keyword inserted as given
pub fn build_request_url(
    api_url: &str,
    keyword: &str,
    website: &str,
    ret_max: u32,
    year: Option<i32>,
) -> String {
    let mut url = format!("{api_url}?q={keyword}&siteSearch={website}&maxItems={ret_max}");

    if let Some(year) = year {
        url.push_str(&format!("&from={year}&to={}", year + 1));
    }

    url
}

/// Re-serialise a JSON body with 4-space indentation
pub fn pretty_json(body: &str) -> HarvestResult<String> {
    let value: serde_json::Value = serde_json::from_str(body)?;

    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut serializer)?;

    String::from_utf8(buf).map_err(|e| HarvestError::ParseError(e.to_string()))
}

/// `{keyword}_{year}_{site}.json`, or `{keyword}_{site}.json` without a year
pub fn output_file_name(task: &SearchTask) -> HarvestResult<String> {
    let site = short_site_name(&task.website)?;
    Ok(match task.year {
        Some(year) => format!("{}_{year}_{site}.json", task.keyword),
        None => format!("{}_{site}.json", task.keyword),
    })
}

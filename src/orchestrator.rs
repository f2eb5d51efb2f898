//! Batch orchestration over websites, keywords and years
//!
//! Tasks are expanded website-major, then keyword in configured order, then
//! year ascending, and executed strictly one after another. The first task
//! whose fallback request also fails stops the whole run.

use crate::{
    error::HarvestResult,
    executor::RequestExecutor,
    keyword::format_keyword,
    types::{RunReport, SearchConfiguration, SearchTask, YearRange},
};
use chrono::Utc;

/// Validate the configuration and yield every task of the run in order.
///
/// Tasks are produced lazily, so a wide year window never has to fit in memory.
pub fn plan_tasks(
    config: &SearchConfiguration,
) -> HarvestResult<impl Iterator<Item = SearchTask> + '_> {
    config.validate()?;

    // Formatting happens once per keyword, not once per task
    let keywords: Vec<(&str, String)> = config
        .keywords
        .iter()
        .map(|k| (k.as_str(), format_keyword(k)))
        .collect();
    let years = config.years;

    let tasks = config.websites().iter().flat_map(move |website| {
        keywords.clone().into_iter().flat_map(move |(query, keyword)| {
            year_slots(years).map(move |year| SearchTask {
                website: website.clone(),
                query: query.to_string(),
                keyword: keyword.clone(),
                year,
            })
        })
    });

    Ok(tasks)
}

// One `None` slot when year filtering is off, otherwise each year
fn year_slots(years: YearRange) -> impl Iterator<Item = Option<i32>> {
    let unfiltered = (!years.is_enabled()).then_some(None);
    years.years().map(Some).chain(unfiltered)
}

fn progress_message(task: &SearchTask) -> String {
    format!("Searching for: {}", task.query)
}

/// Drives a [`RequestExecutor`] through every task of a configuration
#[derive(Debug)]
pub struct Harvester {
    executor: RequestExecutor,
}

impl Harvester {
    pub fn new(executor: RequestExecutor) -> Self {
        Self { executor }
    }

    /// Run the batch described by `config`.
    ///
    /// Validation failures are returned before any request is sent.
    pub async fn run(&self, config: &SearchConfiguration) -> HarvestResult<RunReport> {
        let tasks = plan_tasks(config)?;
        let mut report = RunReport::start();

        log::info!(
            "Harvesting {} task(s) from {} website(s) at level {}",
            config.task_count(),
            config.websites().len(),
            config.search_level
        );

        let mut current: Option<(String, String)> = None;
        for task in tasks {
            let pair_changed = current
                .as_ref()
                .map_or(true, |(website, query)| *website != task.website || *query != task.query);
            if pair_changed {
                log::info!("{}", progress_message(&task));
                current = Some((task.website.clone(), task.query.clone()));
            }

            let outcome = self
                .executor
                .fetch(&task, config.ret_max, &config.output_directory)
                .await?;

            report.requests += 1;
            if outcome.used_fallback {
                report.requests += 1;
                report.fallbacks += 1;
            }
            report.files.push(outcome.path);
        }

        report.finished_at = Utc::now();
        Ok(report)
    }
}

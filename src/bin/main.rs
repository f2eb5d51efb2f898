//! search-harvest CLI - batch search API harvesting driven by a YAML file
//!
//! Queries the configured API for every (website, keyword, year) combination
//! of the selected search level and stores each response as a JSON file.

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use search_harvest::{
    config::{config_path_from_env, load_config},
    executor::{build_request_url, output_file_name},
    json_search, plan_tasks,
    types::{DebugOptions, RunReport, SearchConfiguration, SearchTask},
    HarvestOptions,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "search-harvest")]
#[command(about = "Batch search API harvesting into JSON files")]
#[command(version)]
struct Cli {
    /// Path to the YAML configuration [default: $SEARCH_HARVEST_CONFIG, then config.yaml]
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Query every task and write the responses
    Run {
        /// Override the configured search level
        #[arg(short = 'l', long)]
        search_level: Option<u8>,

        /// Override the configured output directory
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Request timeout in milliseconds
        #[arg(short, long, default_value = "30000")]
        timeout_ms: u64,

        /// Enable debug output
        #[arg(short, long)]
        debug: bool,

        /// Report format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
    /// List the requests a run would make, without sending them
    Plan {
        /// Override the configured search level
        #[arg(short = 'l', long)]
        search_level: Option<u8>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
    /// Load and validate the configuration
    Validate,
}

#[derive(ValueEnum, Clone, Debug)]
enum OutputFormat {
    Table,
    Json,
    Simple,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config_path = cli.config.unwrap_or_else(config_path_from_env);
    let mut config = load_config(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;

    match cli.command {
        Commands::Run {
            search_level,
            output_dir,
            timeout_ms,
            debug,
            format,
        } => {
            if let Some(level) = search_level {
                config.search_level = level;
            }
            if let Some(dir) = output_dir {
                config.output_directory = dir;
            }
            handle_run(&config, timeout_ms, debug, &format).await?;
        }
        Commands::Plan {
            search_level,
            format,
        } => {
            if let Some(level) = search_level {
                config.search_level = level;
            }
            handle_plan(&config, &format)?;
        }
        Commands::Validate => {
            handle_validate(&config)?;
        }
    }

    Ok(())
}

async fn handle_run(
    config: &SearchConfiguration,
    timeout_ms: u64,
    debug: bool,
    format: &OutputFormat,
) -> anyhow::Result<()> {
    let options = HarvestOptions {
        timeout: Some(timeout_ms),
        debug: if debug {
            Some(DebugOptions {
                enabled: true,
                log_requests: true,
                log_responses: false,
            })
        } else {
            None
        },
        ..Default::default()
    };

    let report = json_search(config, options)
        .await
        .context("harvest aborted")?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Simple => {
            for path in &report.files {
                println!("{}", path.display());
            }
        }
        OutputFormat::Table => display_report(&report),
    }
    Ok(())
}

fn plan_row(config: &SearchConfiguration, task: &SearchTask) -> anyhow::Result<(String, PathBuf)> {
    let url = build_request_url(
        &config.api_url,
        &task.keyword,
        &task.website,
        config.ret_max,
        task.year,
    );
    let path = config.output_directory.join(output_file_name(task)?);
    Ok((url, path))
}

fn handle_plan(config: &SearchConfiguration, format: &OutputFormat) -> anyhow::Result<()> {
    let tasks = plan_tasks(config)?;

    match format {
        OutputFormat::Json => {
            let entries = tasks
                .map(|task| -> anyhow::Result<serde_json::Value> {
                    let (url, path) = plan_row(config, &task)?;
                    Ok(serde_json::json!({ "url": url, "output": path }))
                })
                .collect::<anyhow::Result<Vec<_>>>()?;
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
        OutputFormat::Simple => {
            for task in tasks {
                let (url, path) = plan_row(config, &task)?;
                println!("{url} -> {}", path.display());
            }
        }
        OutputFormat::Table => {
            println!(
                "{} {}",
                "Planned requests for level".bold(),
                config.search_level.to_string().bold().blue()
            );
            println!("{}", "─".repeat(80).dimmed());

            for (i, task) in tasks.enumerate() {
                let (url, path) = plan_row(config, &task)?;
                println!("{}. {}", (i + 1).to_string().bold(), url.blue().underline());
                println!("   {}", path.display().to_string().green());
            }

            println!();
            println!(
                "{} {}",
                "Total requests:".bold(),
                config.task_count().to_string().bold()
            );
        }
    }

    Ok(())
}

fn handle_validate(config: &SearchConfiguration) -> anyhow::Result<()> {
    config.validate()?;

    println!("{}", "Configuration is valid".bold().green());
    println!("  API URL: {}", config.api_url);
    println!("  Search level: {}", config.search_level);
    println!("  Websites: {}", config.websites().len());
    println!("  Keywords: {}", config.keywords.len());
    if config.years.is_enabled() {
        println!(
            "  Years: {}..{} (end excluded)",
            config.years.init_year, config.years.end_year
        );
    } else {
        println!("  Years: {}", "disabled".dimmed());
    }
    println!("  Output: {}", config.output_directory.display());

    Ok(())
}

fn display_report(report: &RunReport) {
    println!();
    println!("{}", "Harvest complete".bold().blue());
    println!("{}", "─".repeat(80).dimmed());
    println!("  Requests sent: {}", report.requests);
    println!("  Re-encoded retries: {}", report.fallbacks.to_string().yellow());
    println!("  Files written: {}", report.files.len().to_string().green());

    let elapsed = report.finished_at - report.started_at;
    println!("  Elapsed: {:.2}s", elapsed.num_milliseconds() as f64 / 1000.0);
}

// Copyright 2026 Hector Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

mod aggregate;
mod badges;
mod categorize;
mod cli;
mod config;
mod curate;
mod github;
mod metrics;
mod model;
mod output;
mod plan;
mod render;
mod score;
mod search;
#[cfg(test)]
mod testing;
mod text;

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context as _;
use anyhow::Result;
use clap::Parser;
use time::OffsetDateTime;
use tracing::Level;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

use crate::cli::AggregateArgs;
use crate::cli::BadgesArgs;
use crate::cli::Cli;
use crate::cli::Commands;
use crate::cli::RecategorizeArgs;
use crate::cli::ScanArgs;
use crate::github::GitHubClient;
use crate::output::JsonResponse;
use crate::output::StatsOut;
use crate::output::print_json;
use crate::search::RunMode;

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);
    match cli.command {
        Commands::Init { path } => cmd_init(path),
        Commands::Scan(args) => {
            let json = args.json;
            handle_result(cmd_scan(args), json)
        }
        Commands::Recategorize(args) => {
            let json = args.json;
            handle_result(cmd_recategorize(args), json)
        }
        Commands::Aggregate(args) => {
            let json = args.json;
            handle_result(cmd_aggregate(args), json)
        }
        Commands::Badges(args) => {
            let json = args.json;
            handle_result(cmd_badges(args), json)
        }
    }
}

fn init_logging(level: &str) {
    let parsed = parse_level(level);
    let default = LevelFilter::from_level(parsed.unwrap_or(Level::INFO));
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(default.into()));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
    if parsed.is_none() {
        tracing::warn!("unknown log level {level:?}; using info");
    }
}

/// Case-insensitive level name; also accepts `warning` and `critical`.
fn parse_level(level: &str) -> Option<Level> {
    match level.trim().to_ascii_lowercase().as_str() {
        "warning" => Some(Level::WARN),
        "critical" | "fatal" => Some(Level::ERROR),
        other => other.parse().ok(),
    }
}

fn handle_result(result: Result<()>, json: bool) -> Result<()> {
    match result {
        Ok(()) => Ok(()),
        Err(err) => {
            if json {
                let resp = JsonResponse::error("error", &format!("{err:#}"));
                print_json(&resp)?;
                std::process::exit(1);
            } else {
                Err(err)
            }
        }
    }
}

fn cmd_init(path: Option<PathBuf>) -> Result<()> {
    let root = path.unwrap_or_else(|| PathBuf::from("."));
    std::fs::create_dir_all(&root).with_context(|| format!("create dir {}", root.display()))?;

    let config_path = root.join("hector.toml");
    if config_path.exists() {
        anyhow::bail!("hector.toml already exists at {}", config_path.display());
    }
    config::write_config(&config_path, config::TEMPLATE)?;

    println!("Wrote starter config to {}", config_path.display());
    Ok(())
}

fn cmd_scan(args: ScanArgs) -> Result<()> {
    let started = Instant::now();
    let mut config = config::load_config(&args.config)?;
    if args.dry_run {
        config.dry_run = true;
    }
    if args.live {
        config.dry_run = false;
    }

    if config.dry_run {
        tracing::info!(
            "dry run: configuration {} is valid; skipping network access",
            args.config.display()
        );
        if args.json {
            let resp = JsonResponse::ok().with_stats(StatsOut {
                took_ms: started.elapsed().as_millis() as i64,
                dry_run: Some(true),
                ..Default::default()
            });
            print_json(&resp)?;
        } else {
            println!("Dry run: configuration is valid");
        }
        return Ok(());
    }

    let now = OffsetDateTime::now_utc();
    let strategies = plan::plan(&config.search);
    let queries = plan::expand(&config.search, &strategies, now.date());
    tracing::info!(
        "planned {} queries from {} strategies",
        queries.len(),
        strategies.len()
    );

    let token = config.token();
    let client = GitHubClient::new(token.unwrap_or_default())?;
    let outcome = search::execute(
        &client,
        &queries,
        &config.search.orgs,
        &config.search.users,
        args.limit,
        RunMode::Live,
        token,
    );
    tracing::info!(
        "collected {} repositories ({} requests, {} duplicates)",
        outcome.repos.len(),
        outcome.requests,
        outcome.duplicates
    );

    let report = curate::curate(&client, &outcome.repos, &config, now);
    let (file, latest) = config.output_paths(args.output.as_deref(), now.date());
    curate::write_outputs(&report.records, &config, &file, latest.as_deref())?;

    let mut warnings = outcome.warnings;
    warnings.extend(report.warnings);

    if args.json {
        let mut resp = JsonResponse::ok()
            .with_stats(StatsOut {
                took_ms: started.elapsed().as_millis() as i64,
                dry_run: Some(false),
                queries: Some(queries.len()),
                requests: Some(outcome.requests),
                candidates: Some(outcome.repos.len()),
                duplicates: Some(outcome.duplicates),
                skipped: Some(report.skipped),
                items: report.records.len(),
            })
            .with_output(&file);
        if let Some(latest) = &latest {
            resp = resp.with_output(latest);
        }
        print_json(&resp.with_warnings(warnings))?;
    } else {
        println!(
            "Wrote {} items to {}",
            report.records.len(),
            file.display()
        );
        for warn in warnings {
            eprintln!("warning: {warn}");
        }
    }
    Ok(())
}

fn cmd_recategorize(args: RecategorizeArgs) -> Result<()> {
    let started = Instant::now();
    let config = config::load_config(&args.config)?;
    let mut resp = JsonResponse::ok();
    let mut items = 0usize;
    for file in &args.files {
        let count = curate::recategorize_file(file, &config)?;
        items += count;
        if args.json {
            resp = resp.with_output(file);
        } else {
            println!("Processed {}: {count} items recategorized", file.display());
        }
    }

    if args.json {
        let resp = resp.with_stats(StatsOut {
            took_ms: started.elapsed().as_millis() as i64,
            items,
            ..Default::default()
        });
        print_json(&resp)?;
    }
    Ok(())
}

fn cmd_aggregate(args: AggregateArgs) -> Result<()> {
    let started = Instant::now();
    let output = args
        .output
        .unwrap_or_else(|| args.dir.join(format!("{}.md", args.prefix)));
    let report =
        aggregate::aggregate_latest(&args.dir, &output, &args.prefix, config::DEFAULT_TITLE)?;

    let mut warnings = Vec::new();
    match &report.source {
        Some(source) => tracing::info!(
            "copied {} to {}",
            source.display(),
            report.output.display()
        ),
        None => {
            let msg = format!(
                "no dated reports matching {}-YYYY-MM-DD.md in {}; wrote a stub",
                args.prefix,
                args.dir.display()
            );
            tracing::warn!("{msg}");
            warnings.push(msg);
        }
    }

    if args.json {
        let resp = JsonResponse::ok()
            .with_stats(StatsOut {
                took_ms: started.elapsed().as_millis() as i64,
                items: usize::from(report.source.is_some()),
                ..Default::default()
            })
            .with_output(&report.output)
            .with_warnings(warnings);
        print_json(&resp)?;
    } else {
        println!("Wrote {}", report.output.display());
    }
    Ok(())
}

fn cmd_badges(args: BadgesArgs) -> Result<()> {
    let started = Instant::now();
    let report = badges::generate(&args.input, &args.docs_dir)?;

    if args.json {
        let resp = JsonResponse::ok()
            .with_stats(StatsOut {
                took_ms: started.elapsed().as_millis() as i64,
                items: report.projects,
                ..Default::default()
            })
            .with_output(&args.docs_dir.join("badge.json"));
        print_json(&resp)?;
    } else {
        println!(
            "Wrote {} project badges to {}",
            report.projects,
            args.docs_dir.display()
        );
    }
    Ok(())
}

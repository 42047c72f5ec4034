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

//! Turns a declarative search config into concrete search query strings.

use time::Date;
use time::Duration;

use crate::config::DateWindow;
use crate::config::SearchConfig;
use crate::config::Strategy;
use crate::config::format_date;

/// Above this many topics each topic gets its own query instead of one
/// OR-clause, keeping queries under the platform's length limit.
pub const TOPIC_BATCH_THRESHOLD: usize = 8;

pub const DEFAULT_STRATEGY: &str = "default";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedQuery {
    pub strategy: String,
    pub query: String,
    pub sort: Option<String>,
    pub order: Option<String>,
}

/// Configured strategies, or one synthesized from the top-level settings.
pub fn plan(search: &SearchConfig) -> Vec<Strategy> {
    if !search.strategies.is_empty() {
        return search.strategies.clone();
    }
    let window = if positive(search.pushed_within_days).is_some() {
        DateWindow::PushedWithinDays
    } else if positive(search.created_within_days).is_some() {
        DateWindow::CreatedWithinDays
    } else {
        DateWindow::None
    };
    vec![Strategy {
        name: DEFAULT_STRATEGY.to_string(),
        sort: search.sort.clone(),
        order: search.order.clone(),
        window,
        days: None,
        query_extra: None,
    }]
}

/// Expands strategies into queries: strategy, then topic batch, then language.
pub fn expand(search: &SearchConfig, strategies: &[Strategy], today: Date) -> Vec<PlannedQuery> {
    let batches = topic_batches(search);
    let languages = clean(&search.languages);
    let mut queries = Vec::new();

    for strategy in strategies {
        let sort = strategy.sort.clone().or_else(|| search.sort.clone());
        let order = strategy.order.clone().or_else(|| search.order.clone());
        for batch in &batches {
            let mut parts = vec![base_query(search, batch)];
            if let Some(bound) = date_qualifier(search, strategy, today) {
                parts.push(bound);
            }
            if let Some(extra) = strategy.query_extra.as_deref().map(str::trim) {
                parts.push(extra.to_string());
            }
            let query = join_parts(&parts);

            if languages.is_empty() {
                queries.push(PlannedQuery {
                    strategy: strategy.name.clone(),
                    query,
                    sort: sort.clone(),
                    order: order.clone(),
                });
                continue;
            }
            for lang in &languages {
                queries.push(PlannedQuery {
                    strategy: strategy.name.clone(),
                    query: join_parts(&[query.clone(), language_qualifier(lang)]),
                    sort: sort.clone(),
                    order: order.clone(),
                });
            }
        }
    }
    queries
}

/// Free text, topic OR-clause, and fork/archive exclusions.
pub fn base_query(search: &SearchConfig, topics: &[String]) -> String {
    let text = search.query.trim();
    let mut parts = vec![text.to_string()];
    if !topics.is_empty() {
        let clause = topics
            .iter()
            .map(|t| format!("topic:{t}"))
            .collect::<Vec<_>>()
            .join(" OR ");
        parts.push(format!("({clause})"));
    }
    if search.exclude_forks && !text.contains("fork:") {
        parts.push("fork:false".to_string());
    }
    if search.exclude_archived && !text.contains("archived:") {
        parts.push("archived:false".to_string());
    }
    join_parts(&parts)
}

fn topic_batches(search: &SearchConfig) -> Vec<Vec<String>> {
    let topics = clean(&search.topics);
    if topics.is_empty() {
        return vec![Vec::new()];
    }
    if topics.len() > TOPIC_BATCH_THRESHOLD {
        return topics.into_iter().map(|t| vec![t]).collect();
    }
    vec![topics]
}

fn date_qualifier(search: &SearchConfig, strategy: &Strategy, today: Date) -> Option<String> {
    let (field, fallback) = match strategy.window {
        DateWindow::None => return None,
        DateWindow::PushedWithinDays => ("pushed", search.pushed_within_days),
        DateWindow::CreatedWithinDays => ("created", search.created_within_days),
    };
    let days = positive(strategy.days.or(fallback))?;
    let since = today.saturating_sub(Duration::days(i64::from(days)));
    Some(format!("{field}:>={}", format_date(since)))
}

fn language_qualifier(lang: &str) -> String {
    if lang.contains(char::is_whitespace) {
        format!("language:\"{lang}\"")
    } else {
        format!("language:{lang}")
    }
}

fn positive(days: Option<u32>) -> Option<u32> {
    days.filter(|d| *d > 0)
}

fn clean(items: &[String]) -> Vec<String> {
    items
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn join_parts(parts: &[String]) -> String {
    parts
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

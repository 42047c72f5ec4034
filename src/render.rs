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

//! Categorized Markdown report: rendering and parsing it back.

use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;
use anyhow::Result;

use crate::model::ResultRecord;
use crate::model::UNCATEGORIZED;

pub fn render_markdown<S: AsRef<str>>(
    records: &[ResultRecord],
    categories: &[S],
    title: &str,
) -> String {
    let mut sections = Sections::default();
    for category in categories {
        let name = category.as_ref().trim();
        if !name.is_empty() {
            sections.index_of(name);
        }
    }
    for record in records {
        if record.categories.is_empty() {
            sections.push(UNCATEGORIZED, record);
            continue;
        }
        for category in &record.categories {
            sections.push(category, record);
        }
    }

    let mut lines = vec![format!("# {title}"), String::new()];
    for (name, mut items) in sections.entries {
        if items.is_empty() {
            continue;
        }
        items.sort_by(|a, b| b.score.total_cmp(&a.score));
        lines.push(format!("## {name}"));
        for item in items {
            render_item(item, &mut lines);
        }
        lines.push(String::new());
    }

    let mut text = lines.join("\n").trim_end().to_string();
    text.push('\n');
    text
}

/// Sections in first-declared order.
#[derive(Default)]
struct Sections<'a> {
    entries: Vec<(String, Vec<&'a ResultRecord>)>,
    index: HashMap<String, usize>,
}

impl<'a> Sections<'a> {
    fn index_of(&mut self, name: &str) -> usize {
        if let Some(idx) = self.index.get(name) {
            return *idx;
        }
        self.entries.push((name.to_string(), Vec::new()));
        self.index.insert(name.to_string(), self.entries.len() - 1);
        self.entries.len() - 1
    }

    fn push(&mut self, name: &str, record: &'a ResultRecord) {
        let idx = self.index_of(name);
        self.entries[idx].1.push(record);
    }
}

fn render_item(item: &ResultRecord, lines: &mut Vec<String>) {
    lines.push(format!(
        "- **[{}]({})** (Score: {})",
        item.name,
        item.url,
        format_score(item.score)
    ));
    lines.push(format!(
        "  - License: {} | Stars: {} | Forks: {}",
        item.license, item.stars, item.forks
    ));

    let mut extra = Vec::new();
    if let Some(prs) = item.prs_open {
        extra.push(format!("PRs open: {prs}"));
    }
    if let Some(discussions) = item.has_discussions {
        extra.push(format!(
            "Discussions: {}",
            if discussions { "Yes" } else { "No" }
        ));
    }
    if let Some(contributors) = item.contributors_count {
        extra.push(format!("Contributors: {contributors}"));
    }
    if let Some(days) = item.days_since_push {
        extra.push(format!("Last push: {days} days ago"));
    }
    if !extra.is_empty() {
        lines.push(format!("  - {}", extra.join(" | ")));
    }

    let description = single_line(&item.description);
    if !description.is_empty() {
        lines.push(format!("  - Description: {description}"));
    }
}

/// Two decimals at most, always at least one.
pub fn format_score(score: f64) -> String {
    let rounded = (score * 100.0).round() / 100.0;
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    let text = rounded.to_string();
    if text.contains('.') || !rounded.is_finite() {
        text
    } else {
        format!("{text}.0")
    }
}

fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn write_report(path: &Path, text: &str) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create dir {}", parent.display()))?;
    }
    std::fs::write(path, text).with_context(|| format!("write {}", path.display()))
}

/// Parses report items back into records with empty categories.
///
/// An item listed under several sections yields one record per listing; see
/// [`merge_by_url`].
pub fn parse_report(text: &str) -> Vec<ResultRecord> {
    let mut records = Vec::new();
    let mut current: Option<ResultRecord> = None;

    for line in text.lines() {
        if line.starts_with("# ") || line.starts_with("## ") || line.trim().is_empty() {
            continue;
        }
        if let Some(record) = parse_header(line) {
            records.extend(current.replace(record));
            continue;
        }
        let Some(record) = current.as_mut() else {
            continue;
        };
        let Some(body) = line.trim().strip_prefix("- ") else {
            continue;
        };
        if let Some(desc) = body.strip_prefix("Description: ") {
            record.description = desc.trim().to_string();
            continue;
        }
        for part in body.split(" | ") {
            let Some((key, value)) = part.split_once(':') else {
                continue;
            };
            let value = value.trim();
            match key.trim() {
                "License" => record.license = value.to_string(),
                "Stars" => record.stars = value.parse().unwrap_or(0),
                "Forks" => record.forks = value.parse().unwrap_or(0),
                "PRs open" => record.prs_open = value.parse().ok(),
                "Discussions" => record.has_discussions = Some(value.starts_with("Yes")),
                "Contributors" => record.contributors_count = value.parse().ok(),
                "Last push" => {
                    record.days_since_push = value
                        .strip_suffix("days ago")
                        .and_then(|n| n.trim().parse().ok());
                }
                _ => {}
            }
        }
    }
    records.extend(current);
    records
}

fn parse_header(line: &str) -> Option<ResultRecord> {
    let rest = line.strip_prefix("- **[")?;
    let (name, rest) = rest.split_once("](")?;
    let (url, rest) = rest.split_once(")** (Score: ")?;
    let score = rest.trim_end().strip_suffix(')')?.trim().parse().ok()?;
    Some(ResultRecord {
        name: name.trim().to_string(),
        url: url.trim().to_string(),
        score,
        description: String::new(),
        categories: Vec::new(),
        license: String::new(),
        stars: 0,
        forks: 0,
        prs_open: None,
        has_discussions: None,
        contributors_count: None,
        days_since_push: None,
    })
}

/// Keeps the first record per URL (per name when the URL is empty).
pub fn merge_by_url(records: Vec<ResultRecord>) -> Vec<ResultRecord> {
    let mut seen = std::collections::HashSet::new();
    records
        .into_iter()
        .filter(|r| {
            let key = if r.url.is_empty() { &r.name } else { &r.url };
            seen.insert(key.clone())
        })
        .collect()
}

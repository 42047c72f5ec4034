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

//! Shields.io endpoint badges generated from a rendered report.

use std::path::Path;

use anyhow::Context;
use anyhow::Result;
use reqwest::Url;
use serde::Serialize;

use crate::model::ResultRecord;
use crate::render::merge_by_url;
use crate::render::parse_report;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Badge {
    pub schema_version: u8,
    pub label: String,
    pub message: String,
    pub color: String,
}

#[derive(Debug)]
pub struct BadgeReport {
    pub projects: usize,
}

pub fn color_for_score(score: f64) -> &'static str {
    match score {
        s if s >= 500.0 => "brightgreen",
        s if s >= 200.0 => "green",
        s if s >= 100.0 => "yellowgreen",
        s if s >= 50.0 => "yellow",
        s if s >= 10.0 => "orange",
        _ => "lightgrey",
    }
}

/// `owner__repo` for github.com URLs.
pub fn slug_from_url(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    if !parsed.host_str()?.eq_ignore_ascii_case("github.com") {
        return None;
    }
    let mut segments = parsed.path_segments()?.filter(|s| !s.is_empty());
    let owner = segments.next()?;
    let repo = segments.next()?;
    Some(format!("{owner}__{repo}"))
}

/// Replaces every run of characters outside `[A-Za-z0-9_]` with `_`.
pub fn slug_from_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_run = false;
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() || ch == '_' {
            out.push(ch);
            in_run = false;
        } else if !in_run {
            out.push('_');
            in_run = true;
        }
    }
    out
}

pub fn project_badge(record: &ResultRecord) -> Badge {
    Badge {
        schema_version: 1,
        label: "Hector Score".to_string(),
        message: format!("{:.2}", record.score),
        color: color_for_score(record.score).to_string(),
    }
}

pub fn summary_badge(projects: usize) -> Badge {
    Badge {
        schema_version: 1,
        label: "Hector".to_string(),
        message: format!("{projects} projects"),
        color: "blue".to_string(),
    }
}

/// Writes `badge.json`, `badges/<slug>.json` per project, and `.nojekyll`.
/// A missing report counts as zero projects.
pub fn generate(report: &Path, docs_dir: &Path) -> Result<BadgeReport> {
    let records = if report.exists() {
        let text = std::fs::read_to_string(report)
            .with_context(|| format!("read {}", report.display()))?;
        merge_by_url(parse_report(&text))
    } else {
        tracing::warn!("report {} not found; writing empty badges", report.display());
        Vec::new()
    };

    let badges_dir = docs_dir.join("badges");
    std::fs::create_dir_all(&badges_dir)
        .with_context(|| format!("create dir {}", badges_dir.display()))?;

    write_badge(&docs_dir.join("badge.json"), &summary_badge(records.len()))?;
    for record in &records {
        let slug = slug_from_url(&record.url).unwrap_or_else(|| slug_from_name(&record.name));
        write_badge(&badges_dir.join(format!("{slug}.json")), &project_badge(record))?;
    }
    let nojekyll = docs_dir.join(".nojekyll");
    std::fs::write(&nojekyll, "").with_context(|| format!("write {}", nojekyll.display()))?;

    Ok(BadgeReport {
        projects: records.len(),
    })
}

fn write_badge(path: &Path, badge: &Badge) -> Result<()> {
    let text = serde_json::to_string(badge)?;
    std::fs::write(path, text).with_context(|| format!("write {}", path.display()))
}

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

//! Shared domain types used across search, enrichment, scoring, and rendering.

use serde::Serialize;
use time::OffsetDateTime;

/// License identifier used when a repository has no detectable license.
pub const NO_LICENSE: &str = "none";

/// Section name for records that matched no category.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Stable identity of a repository within one scan.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RepoId {
    Id(u64),
    FullName(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CandidateRepository {
    pub id: RepoId,
    pub full_name: String,
    pub url: String,
    pub description: String,
    pub topics: Vec<String>,
    pub stars: u64,
    pub forks: u64,
    pub open_issues: u64,
    pub license: String,
    pub pushed_at: Option<OffsetDateTime>,
    pub has_discussions: Option<bool>,
}

impl CandidateRepository {
    /// Description with topics appended, the text the categorizer sees.
    pub fn description_with_topics(&self) -> String {
        if self.topics.is_empty() {
            return self.description.clone();
        }
        format!("{} {}", self.description, self.topics.join(" "))
            .trim()
            .to_string()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Metrics {
    pub prs_open: u64,
    pub has_discussions: bool,
    pub contributors_count: u64,
    /// `None` when the platform reported no last-push time.
    pub days_since_push: Option<i64>,
}

/// One rendered line item of the report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultRecord {
    pub name: String,
    pub url: String,
    pub score: f64,
    pub description: String,
    pub categories: Vec<String>,
    pub license: String,
    pub stars: u64,
    pub forks: u64,
    pub prs_open: Option<u64>,
    pub has_discussions: Option<bool>,
    pub contributors_count: Option<u64>,
    pub days_since_push: Option<i64>,
}

impl ResultRecord {
    pub fn new(repo: &CandidateRepository, score: f64, categories: Vec<String>) -> Self {
        Self {
            name: repo.full_name.clone(),
            url: repo.url.clone(),
            score,
            description: repo.description.clone(),
            categories,
            license: repo.license.clone(),
            stars: repo.stars,
            forks: repo.forks,
            prs_open: None,
            has_discussions: None,
            contributors_count: None,
            days_since_push: None,
        }
    }

    pub fn with_metrics(mut self, metrics: &Metrics) -> Self {
        self.prs_open = Some(metrics.prs_open);
        self.has_discussions = Some(metrics.has_discussions);
        self.contributors_count = Some(metrics.contributors_count);
        self.days_since_push = metrics.days_since_push;
        self
    }
}

#[cfg(test)]
pub(crate) fn sample_repo(id: u64, full_name: &str) -> CandidateRepository {
    CandidateRepository {
        id: RepoId::Id(id),
        full_name: full_name.to_string(),
        url: format!("https://github.com/{full_name}"),
        description: String::new(),
        topics: Vec::new(),
        stars: 0,
        forks: 0,
        open_issues: 0,
        license: NO_LICENSE.to_string(),
        pushed_at: None,
        has_discussions: None,
    }
}

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

//! Runs planned queries and org/user enumeration into one deduplicated,
//! budget-bounded candidate list.

use std::collections::HashSet;

use crate::github::Page;
use crate::github::PlatformError;
use crate::github::RepoSource;
use crate::model::CandidateRepository;
use crate::model::RepoId;
use crate::plan::PlannedQuery;

/// Whether the executor may touch the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Live,
    DryRun,
}

#[derive(Debug, Default)]
pub struct SearchOutcome {
    pub repos: Vec<CandidateRepository>,
    pub requests: usize,
    pub duplicates: usize,
    pub warnings: Vec<String>,
}

struct Accumulator {
    remaining: usize,
    seen: HashSet<RepoId>,
    outcome: SearchOutcome,
}

impl Accumulator {
    fn new(limit: usize) -> Self {
        Self {
            remaining: limit,
            seen: HashSet::new(),
            outcome: SearchOutcome::default(),
        }
    }

    fn exhausted(&self) -> bool {
        self.remaining == 0
    }

    fn offer(&mut self, repo: CandidateRepository) {
        if self.exhausted() {
            return;
        }
        if !self.seen.insert(repo.id.clone()) {
            self.outcome.duplicates += 1;
            return;
        }
        self.outcome.repos.push(repo);
        self.remaining -= 1;
    }

    /// Consumes one paginated source until it runs dry, fails, or the budget
    /// is spent. A failure skips the rest of this source only.
    fn drain(
        &mut self,
        label: &str,
        mut fetch: impl FnMut(u32) -> Result<Page<CandidateRepository>, PlatformError>,
    ) {
        let mut page = 1u32;
        while !self.exhausted() {
            self.outcome.requests += 1;
            let result = match fetch(page) {
                Ok(result) => result,
                Err(err) => {
                    tracing::warn!("skipping {label} at page {page}: {err}");
                    self.outcome
                        .warnings
                        .push(format!("{label} page {page}: {err}"));
                    return;
                }
            };
            if result.items.is_empty() {
                return;
            }
            for repo in result.items {
                self.offer(repo);
            }
            if !result.has_next {
                return;
            }
            page += 1;
        }
    }
}

/// Collects at most `limit` distinct repositories.
///
/// Dry runs and missing tokens return an empty outcome without calling
/// `source`.
pub fn execute(
    source: &dyn RepoSource,
    queries: &[PlannedQuery],
    orgs: &[String],
    users: &[String],
    limit: usize,
    mode: RunMode,
    token: Option<&str>,
) -> SearchOutcome {
    if mode == RunMode::DryRun {
        tracing::info!("dry run: skipping repository search");
        return SearchOutcome::default();
    }
    if token.is_none_or(|t| t.trim().is_empty()) {
        tracing::warn!("no GitHub token configured: skipping repository search");
        return SearchOutcome::default();
    }

    let mut acc = Accumulator::new(limit);

    for query in queries {
        if acc.exhausted() {
            break;
        }
        tracing::debug!("search ({}): {}", query.strategy, query.query);
        let label = format!("query '{}'", query.query);
        acc.drain(&label, |page| source.search_page(query, page));
    }

    for org in orgs.iter().map(|o| o.trim()).filter(|o| !o.is_empty()) {
        if acc.exhausted() {
            break;
        }
        tracing::debug!("enumerating org {org}");
        acc.drain(&format!("org '{org}'"), |page| source.org_repos_page(org, page));
    }

    for user in users.iter().map(|u| u.trim()).filter(|u| !u.is_empty()) {
        if acc.exhausted() {
            break;
        }
        tracing::debug!("enumerating user {user}");
        acc.drain(&format!("user '{user}'"), |page| {
            source.user_repos_page(user, page)
        });
    }

    tracing::info!(
        "search collected {} repositories ({} requests, {} duplicates)",
        acc.outcome.repos.len(),
        acc.outcome.requests,
        acc.outcome.duplicates
    );
    acc.outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeSource;

    fn query(text: &str) -> PlannedQuery {
        PlannedQuery {
            strategy: "default".into(),
            query: text.into(),
            sort: None,
            order: None,
        }
    }

    fn ids(outcome: &SearchOutcome) -> Vec<String> {
        outcome.repos.iter().map(|r| r.full_name.clone()).collect()
    }

    #[test]
    fn dry_run_and_missing_token_issue_no_requests() {
        let source = FakeSource::new().with_search("q", vec![vec![1, 2]]);
        let queries = [query("q")];

        let out = execute(&source, &queries, &[], &[], 10, RunMode::DryRun, Some("t"));
        assert!(out.repos.is_empty());
        let out = execute(&source, &queries, &[], &[], 10, RunMode::Live, None);
        assert!(out.repos.is_empty());
        let out = execute(&source, &queries, &[], &[], 10, RunMode::Live, Some("  "));
        assert!(out.repos.is_empty());
        assert_eq!(source.calls(), 0);
    }

    #[test]
    fn deduplicates_across_queries_orgs_and_users() {
        let source = FakeSource::new()
            .with_search("a", vec![vec![1, 2], vec![3]])
            .with_search("b", vec![vec![2, 4]])
            .with_org("acme", vec![vec![4, 5]])
            .with_user("jane", vec![vec![1, 6]]);
        let out = execute(
            &source,
            &[query("a"), query("b")],
            &["acme".into()],
            &["jane".into()],
            100,
            RunMode::Live,
            Some("token"),
        );
        assert_eq!(ids(&out), vec!["o/r1", "o/r2", "o/r3", "o/r4", "o/r5", "o/r6"]);
        assert_eq!(out.duplicates, 3);
    }

    #[test]
    fn stops_issuing_requests_once_budget_is_spent() {
        let source = FakeSource::new()
            .with_search("a", vec![vec![1, 2], vec![3, 4], vec![5, 6]])
            .with_search("b", vec![vec![7]])
            .with_org("acme", vec![vec![8]]);
        let out = execute(
            &source,
            &[query("a"), query("b")],
            &["acme".into()],
            &[],
            3,
            RunMode::Live,
            Some("token"),
        );
        assert_eq!(ids(&out), vec!["o/r1", "o/r2", "o/r3"]);
        // Two pages of "a", nothing else.
        assert_eq!(source.calls(), 2);
    }

    #[test]
    fn failing_query_is_skipped() {
        let source = FakeSource::new()
            .with_failing_search("broken")
            .with_search("ok", vec![vec![1]]);
        let out = execute(
            &source,
            &[query("broken"), query("ok")],
            &[],
            &[],
            10,
            RunMode::Live,
            Some("token"),
        );
        assert_eq!(ids(&out), vec!["o/r1"]);
        assert_eq!(out.warnings.len(), 1);
        assert!(out.warnings[0].contains("broken"));
    }

    #[test]
    fn never_exceeds_limit_or_repeats_identity() {
        let pages: Vec<Vec<u64>> = (0..5).map(|p| (p * 3..p * 3 + 5).collect()).collect();
        for limit in [0usize, 1, 4, 7, 50] {
            let source = FakeSource::new()
                .with_search("a", pages.clone())
                .with_search("b", pages.clone())
                .with_org("acme", pages.clone());
            let out = execute(
                &source,
                &[query("a"), query("b")],
                &["acme".into()],
                &[],
                limit,
                RunMode::Live,
                Some("token"),
            );
            assert!(out.repos.len() <= limit);
            let unique: HashSet<_> = out.repos.iter().map(|r| r.id.clone()).collect();
            assert_eq!(unique.len(), out.repos.len());
        }
    }

    #[test]
    fn zero_limit_issues_no_requests() {
        let source = FakeSource::new().with_search("a", vec![vec![1]]);
        let out = execute(&source, &[query("a")], &[], &[], 0, RunMode::Live, Some("t"));
        assert!(out.repos.is_empty());
        assert_eq!(source.calls(), 0);
    }
}

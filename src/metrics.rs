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

//! Best-effort activity metrics for a single repository.
//!
//! Every metric is fetched independently and falls back to its default on
//! failure. Listings are never paginated past the first page.

use time::OffsetDateTime;

use crate::github::Listing;
use crate::github::PlatformError;
use crate::github::RepoSource;
use crate::model::CandidateRepository;
use crate::model::Metrics;

pub fn collect(
    source: &dyn RepoSource,
    repo: &CandidateRepository,
    now: OffsetDateTime,
) -> Metrics {
    let prs_open = source
        .open_pull_requests(repo)
        .map(open_pull_request_count)
        .unwrap_or_else(|err| degraded(repo, "open pull requests", err, 0));
    let contributors_count = source
        .contributors(repo)
        .map(|listing| listing.first_page_len as u64)
        .unwrap_or_else(|err| degraded(repo, "contributors", err, 0));

    Metrics {
        prs_open,
        has_discussions: repo.has_discussions.unwrap_or(false),
        contributors_count,
        days_since_push: repo.pushed_at.map(|pushed| days_since(pushed, now)),
    }
}

/// Server total when reported, else the first page only.
fn open_pull_request_count(listing: Listing) -> u64 {
    listing
        .total_count
        .unwrap_or(listing.first_page_len as u64)
}

fn days_since(pushed: OffsetDateTime, now: OffsetDateTime) -> i64 {
    (now - pushed).whole_days()
}

fn degraded<T>(repo: &CandidateRepository, metric: &str, err: PlatformError, default: T) -> T {
    tracing::debug!("{}: {metric} unavailable: {err}", repo.full_name);
    default
}

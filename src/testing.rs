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

//! In-memory [`RepoSource`] for unit tests.

use std::cell::Cell;
use std::collections::HashMap;
use std::collections::HashSet;

use crate::github::Listing;
use crate::github::Page;
use crate::github::PlatformError;
use crate::github::RepoSource;
use crate::model::CandidateRepository;
use crate::model::sample_repo;
use crate::plan::PlannedQuery;

/// Repositories are generated from numeric ids as `o/r<id>`.
#[derive(Default)]
pub struct FakeSource {
    searches: HashMap<String, Vec<Vec<u64>>>,
    orgs: HashMap<String, Vec<Vec<u64>>>,
    users: HashMap<String, Vec<Vec<u64>>>,
    failing: HashSet<String>,
    pulls: Option<Listing>,
    contributors: Option<Listing>,
    calls: Cell<usize>,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, query: &str, pages: Vec<Vec<u64>>) -> Self {
        self.searches.insert(query.to_string(), pages);
        self
    }

    pub fn with_failing_search(mut self, query: &str) -> Self {
        self.failing.insert(query.to_string());
        self
    }

    pub fn with_org(mut self, org: &str, pages: Vec<Vec<u64>>) -> Self {
        self.orgs.insert(org.to_string(), pages);
        self
    }

    pub fn with_user(mut self, user: &str, pages: Vec<Vec<u64>>) -> Self {
        self.users.insert(user.to_string(), pages);
        self
    }

    pub fn with_pulls(mut self, listing: Listing) -> Self {
        self.pulls = Some(listing);
        self
    }

    pub fn with_contributors(mut self, listing: Listing) -> Self {
        self.contributors = Some(listing);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.get()
    }

    fn tick(&self) {
        self.calls.set(self.calls.get() + 1);
    }

    fn page(
        pages: Option<&Vec<Vec<u64>>>,
        page: u32,
    ) -> Result<Page<CandidateRepository>, PlatformError> {
        let pages = pages.ok_or_else(|| PlatformError::Api {
            status: 404,
            body: "Not Found".into(),
        })?;
        let idx = page as usize - 1;
        let items = pages
            .get(idx)
            .map(|ids| {
                ids.iter()
                    .map(|id| sample_repo(*id, &format!("o/r{id}")))
                    .collect()
            })
            .unwrap_or_default();
        Ok(Page {
            items,
            has_next: idx + 1 < pages.len(),
        })
    }

    fn listing(listing: Option<Listing>) -> Result<Listing, PlatformError> {
        listing.ok_or_else(|| PlatformError::Decode("no listing configured".into()))
    }
}

impl RepoSource for FakeSource {
    fn search_page(
        &self,
        query: &PlannedQuery,
        page: u32,
    ) -> Result<Page<CandidateRepository>, PlatformError> {
        self.tick();
        if self.failing.contains(&query.query) {
            return Err(PlatformError::Api {
                status: 422,
                body: "Validation Failed".into(),
            });
        }
        Self::page(self.searches.get(&query.query), page)
    }

    fn org_repos_page(
        &self,
        org: &str,
        page: u32,
    ) -> Result<Page<CandidateRepository>, PlatformError> {
        self.tick();
        Self::page(self.orgs.get(org), page)
    }

    fn user_repos_page(
        &self,
        user: &str,
        page: u32,
    ) -> Result<Page<CandidateRepository>, PlatformError> {
        self.tick();
        Self::page(self.users.get(user), page)
    }

    fn open_pull_requests(&self, _repo: &CandidateRepository) -> Result<Listing, PlatformError> {
        self.tick();
        Self::listing(self.pulls)
    }

    fn contributors(&self, _repo: &CandidateRepository) -> Result<Listing, PlatformError> {
        self.tick();
        Self::listing(self.contributors)
    }
}

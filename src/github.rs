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

//! GitHub REST client and the adapter from API payloads to
//! [`CandidateRepository`].

use std::time::Duration;

use reqwest::Url;
use reqwest::blocking::Client;
use reqwest::blocking::Response;
use reqwest::header::ACCEPT;
use reqwest::header::AUTHORIZATION;
use reqwest::header::LINK;
use serde::Deserialize;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::model::CandidateRepository;
use crate::model::NO_LICENSE;
use crate::model::RepoId;
use crate::plan::PlannedQuery;

const API_BASE: &str = "https://api.github.com";
const USER_AGENT: &str = concat!("hector/", env!("CARGO_PKG_VERSION"));
pub const PAGE_SIZE: usize = 50;
const LISTING_PAGE_SIZE: usize = 100;
/// With one item per page, the `rel="last"` page number is the item count.
const COUNT_PAGE_SIZE: usize = 1;
/// The search API never serves results past this offset.
const SEARCH_RESULT_CAP: usize = 1000;

#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("GitHub API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("unexpected GitHub payload: {0}")]
    Decode(String),

    #[error("invalid API base URL {0:?}")]
    BaseUrl(String),
}

/// One page of a paginated listing.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub has_next: bool,
}

/// First page of a listing plus the server's total, when it reports one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Listing {
    pub total_count: Option<u64>,
    pub first_page_len: usize,
}

/// Repository-hosting operations the scanner depends on. Pages are 1-based.
pub trait RepoSource {
    fn search_page(
        &self,
        query: &PlannedQuery,
        page: u32,
    ) -> Result<Page<CandidateRepository>, PlatformError>;

    fn org_repos_page(
        &self,
        org: &str,
        page: u32,
    ) -> Result<Page<CandidateRepository>, PlatformError>;

    fn user_repos_page(
        &self,
        user: &str,
        page: u32,
    ) -> Result<Page<CandidateRepository>, PlatformError>;

    fn open_pull_requests(&self, repo: &CandidateRepository) -> Result<Listing, PlatformError>;

    fn contributors(&self, repo: &CandidateRepository) -> Result<Listing, PlatformError>;
}

/// Account kind behind a repository listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Owner {
    Org,
    User,
}

impl Owner {
    fn segment(self) -> &'static str {
        match self {
            Owner::Org => "orgs",
            Owner::User => "users",
        }
    }

    /// `type` filter; the user endpoint only knows `all`, `owner`, `member`.
    fn type_filter(self) -> &'static str {
        match self {
            Owner::Org => "public",
            Owner::User => "owner",
        }
    }
}

pub struct GitHubClient {
    http: Client,
    base: Url,
    token: String,
}

impl GitHubClient {
    pub fn new(token: &str) -> Result<Self, PlatformError> {
        Self::with_base(API_BASE, token)
    }

    pub fn with_base(base: &str, token: &str) -> Result<Self, PlatformError> {
        let base = Url::parse(base).map_err(|_| PlatformError::BaseUrl(base.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(PlatformError::BaseUrl(base.to_string()));
        }
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            http,
            base,
            token: token.to_string(),
        })
    }

    /// Base URL extended by `segments`, each percent-encoded on its own.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn repo_endpoint(&self, repo: &CandidateRepository, tail: &str) -> Url {
        let mut segments = vec!["repos"];
        segments.extend(repo.full_name.split('/'));
        segments.push(tail);
        self.endpoint(&segments)
    }

    fn get(&self, url: Url, query: &[(&str, String)]) -> Result<Response, PlatformError> {
        tracing::debug!("GET {} {query:?}", url.path());
        let response = self
            .http
            .get(url)
            .query(query)
            .header(ACCEPT, "application/vnd.github+json")
            .header(AUTHORIZATION, format!("Bearer {}", self.token))
            .header("X-GitHub-Api-Version", "2022-11-28")
            .send()?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(PlatformError::Api {
                status: status.as_u16(),
                body: truncate(body.trim(), 300),
            });
        }
        Ok(response)
    }

    fn repo_listing(
        &self,
        owner: Owner,
        name: &str,
        page: u32,
    ) -> Result<Page<CandidateRepository>, PlatformError> {
        let query = [
            ("type", owner.type_filter().to_string()),
            ("per_page", PAGE_SIZE.to_string()),
            ("page", page.to_string()),
        ];
        let url = self.endpoint(&[owner.segment(), name, "repos"]);
        let response = self.get(url, &query)?;
        let has_next = has_next_page(&response);
        let repos: Vec<ApiRepository> = response
            .json()
            .map_err(|e| PlatformError::Decode(e.to_string()))?;
        Ok(Page {
            items: repos.into_iter().filter_map(to_candidate).collect(),
            has_next,
        })
    }

    fn first_page_listing(
        &self,
        url: Url,
        extra: &[(&str, String)],
        per_page: usize,
    ) -> Result<Listing, PlatformError> {
        let mut query = extra.to_vec();
        query.push(("per_page", per_page.to_string()));
        let response = self.get(url, &query)?;
        // Empty repositories answer 204 with no body.
        if response.status() == reqwest::StatusCode::NO_CONTENT {
            return Ok(Listing {
                total_count: Some(0),
                first_page_len: 0,
            });
        }
        let has_next = has_next_page(&response);
        let last_page = link_header(&response).and_then(link_last_page);
        let items: Vec<serde_json::Value> = response
            .json()
            .map_err(|e| PlatformError::Decode(e.to_string()))?;
        Ok(listing_from(items.len(), has_next, last_page, per_page))
    }
}

/// Exact total when the pages tell it: a single page, or one item per page
/// with a `rel="last"` link.
fn listing_from(len: usize, has_next: bool, last_page: Option<u64>, per_page: usize) -> Listing {
    let total_count = match last_page {
        Some(last) if per_page == 1 => Some(last),
        _ if !has_next => Some(len as u64),
        _ => None,
    };
    Listing {
        total_count,
        first_page_len: len,
    }
}

impl RepoSource for GitHubClient {
    fn search_page(
        &self,
        query: &PlannedQuery,
        page: u32,
    ) -> Result<Page<CandidateRepository>, PlatformError> {
        let mut params = vec![
            ("q", query.query.clone()),
            ("per_page", PAGE_SIZE.to_string()),
            ("page", page.to_string()),
        ];
        if let Some(sort) = &query.sort {
            params.push(("sort", sort.clone()));
        }
        if let Some(order) = &query.order {
            params.push(("order", order.clone()));
        }
        let response = self.get(self.endpoint(&["search", "repositories"]), &params)?;
        let has_next = has_next_page(&response);
        let body: SearchResponse = response
            .json()
            .map_err(|e| PlatformError::Decode(e.to_string()))?;
        let within_cap = (page as usize) * PAGE_SIZE < SEARCH_RESULT_CAP;
        Ok(Page {
            items: body.items.into_iter().filter_map(to_candidate).collect(),
            has_next: has_next && within_cap,
        })
    }

    fn org_repos_page(
        &self,
        org: &str,
        page: u32,
    ) -> Result<Page<CandidateRepository>, PlatformError> {
        self.repo_listing(Owner::Org, org, page)
    }

    fn user_repos_page(
        &self,
        user: &str,
        page: u32,
    ) -> Result<Page<CandidateRepository>, PlatformError> {
        self.repo_listing(Owner::User, user, page)
    }

    fn open_pull_requests(&self, repo: &CandidateRepository) -> Result<Listing, PlatformError> {
        self.first_page_listing(
            self.repo_endpoint(repo, "pulls"),
            &[("state", "open".to_string())],
            COUNT_PAGE_SIZE,
        )
    }

    fn contributors(&self, repo: &CandidateRepository) -> Result<Listing, PlatformError> {
        self.first_page_listing(
            self.repo_endpoint(repo, "contributors"),
            &[],
            LISTING_PAGE_SIZE,
        )
    }
}

fn link_header(response: &Response) -> Option<&str> {
    response.headers().get(LINK).and_then(|v| v.to_str().ok())
}

fn has_next_page(response: &Response) -> bool {
    link_header(response).is_some_and(link_has_next)
}

fn link_has_next(link: &str) -> bool {
    link.split(',')
        .any(|part| part.split(';').skip(1).any(|p| p.trim() == "rel=\"next\""))
}

/// `page` query value of the `rel="last"` target.
fn link_last_page(link: &str) -> Option<u64> {
    link.split(',').find_map(|part| {
        let mut pieces = part.split(';');
        let target = pieces.next()?.trim().trim_start_matches('<').trim_end_matches('>');
        if !pieces.any(|p| p.trim() == "rel=\"last\"") {
            return None;
        }
        let url = Url::parse(target).ok()?;
        url.query_pairs()
            .find(|(key, _)| key == "page")
            .and_then(|(_, value)| value.parse().ok())
    })
}

fn truncate(text: &str, max: usize) -> String {
    if text.len() <= max {
        return text.to_string();
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &text[..end])
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<ApiRepository>,
}

#[derive(Debug, Deserialize)]
struct ApiLicense {
    spdx_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiRepository {
    id: Option<u64>,
    full_name: Option<String>,
    name: Option<String>,
    html_url: Option<String>,
    description: Option<String>,
    #[serde(default)]
    topics: Vec<String>,
    stargazers_count: Option<u64>,
    forks_count: Option<u64>,
    open_issues_count: Option<u64>,
    license: Option<ApiLicense>,
    pushed_at: Option<String>,
    has_discussions: Option<bool>,
}

/// Maps an API repository into the internal type. Items with neither an id
/// nor a full name have no identity and are dropped.
pub(crate) fn to_candidate(api: ApiRepository) -> Option<CandidateRepository> {
    let full_name = api
        .full_name
        .clone()
        .filter(|n| !n.is_empty())
        .or_else(|| api.name.clone())
        .unwrap_or_else(|| "unknown".to_string());
    let id = match (api.id, api.full_name.filter(|n| !n.is_empty())) {
        (Some(id), _) => RepoId::Id(id),
        (None, Some(name)) => RepoId::FullName(name),
        (None, None) => return None,
    };
    let license = api
        .license
        .and_then(|l| l.spdx_id)
        .filter(|s| !s.is_empty() && s != "NOASSERTION")
        .unwrap_or_else(|| NO_LICENSE.to_string());
    let pushed_at = api
        .pushed_at
        .as_deref()
        .and_then(|s| OffsetDateTime::parse(s, &Rfc3339).ok());
    Some(CandidateRepository {
        id,
        url: api.html_url.unwrap_or_default(),
        full_name,
        description: api.description.unwrap_or_default(),
        topics: api.topics,
        stars: api.stargazers_count.unwrap_or(0),
        forks: api.forks_count.unwrap_or(0),
        open_issues: api.open_issues_count.unwrap_or(0),
        license,
        pushed_at,
        has_discussions: api.has_discussions,
    })
}

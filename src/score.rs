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

use crate::config::WEIGHT_CONTRIBUTORS;
use crate::config::WEIGHT_DISCUSSIONS;
use crate::config::WEIGHT_FORKS;
use crate::config::WEIGHT_OPEN_ISSUES;
use crate::config::WEIGHT_PRS;
use crate::config::WEIGHT_RECENCY;
use crate::config::WEIGHT_STARS;
use crate::config::WeightConfig;
use crate::model::CandidateRepository;
use crate::model::Metrics;
use crate::model::NO_LICENSE;

/// Days per unit of recency penalty.
const RECENCY_PERIOD_DAYS: f64 = 30.0;

/// Weighted linear score; absent metrics contribute nothing.
pub fn score_repository(
    repo: &CandidateRepository,
    weights: &WeightConfig,
    metrics: Option<&Metrics>,
) -> f64 {
    let mut terms = vec![
        (repo.stars as f64, weights.get(WEIGHT_STARS)),
        (repo.forks as f64, weights.get(WEIGHT_FORKS)),
        (repo.open_issues as f64, weights.get(WEIGHT_OPEN_ISSUES)),
    ];
    if let Some(m) = metrics {
        let recency = m
            .days_since_push
            .map(|days| -(days as f64) / RECENCY_PERIOD_DAYS)
            .unwrap_or(0.0);
        terms.extend([
            (m.prs_open as f64, weights.get(WEIGHT_PRS)),
            (
                if m.has_discussions { 1.0 } else { 0.0 },
                weights.get(WEIGHT_DISCUSSIONS),
            ),
            (m.contributors_count as f64, weights.get(WEIGHT_CONTRIBUTORS)),
            (recency, weights.get(WEIGHT_RECENCY)),
        ]);
    }

    let base: f64 = terms.into_iter().map(|(value, weight)| finite(value * weight)).sum();
    base + license_bonus(&repo.license, weights)
}

/// Exact license match, else the `none` entry, else zero.
pub fn license_bonus(license: &str, weights: &WeightConfig) -> f64 {
    let bonus = weights
        .license
        .get(license)
        .or_else(|| weights.license.get(NO_LICENSE))
        .copied()
        .unwrap_or(0.0);
    finite(bonus)
}

fn finite(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

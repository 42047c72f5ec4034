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

//! Per-candidate pass: enrich, score, categorize, and build report records.

use std::path::Path;

use anyhow::Context;
use anyhow::Result;
use time::OffsetDateTime;

use crate::categorize::CategoryKeywordMap;
use crate::categorize::categorize_repository;
use crate::categorize::categorize_with;
use crate::config::Config;
use crate::github::RepoSource;
use crate::metrics;
use crate::model::CandidateRepository;
use crate::model::ResultRecord;
use crate::model::UNCATEGORIZED;
use crate::render::merge_by_url;
use crate::render::parse_report;
use crate::render::render_markdown;
use crate::render::write_report;
use crate::score::score_repository;

#[derive(Debug, Default)]
pub struct CurateReport {
    pub records: Vec<ResultRecord>,
    pub skipped: usize,
    pub warnings: Vec<String>,
}

pub fn curate(
    source: &dyn RepoSource,
    repos: &[CandidateRepository],
    config: &Config,
    now: OffsetDateTime,
) -> CurateReport {
    let keywords = CategoryKeywordMap::defaults().merged(config.keyword_overrides());
    let mut report = CurateReport::default();
    for repo in repos {
        match build_record(source, repo, config, &keywords, now) {
            Ok(record) => report.records.push(record),
            Err(err) => {
                tracing::warn!("skipping repository {}: {err:#}", repo.full_name);
                report.skipped += 1;
                report.warnings.push(format!("{}: {err:#}", repo.full_name));
            }
        }
    }
    report
}

fn build_record(
    source: &dyn RepoSource,
    repo: &CandidateRepository,
    config: &Config,
    keywords: &CategoryKeywordMap,
    now: OffsetDateTime,
) -> Result<ResultRecord> {
    let metrics = metrics::collect(source, repo, now);
    let score = score_repository(repo, &config.weights, Some(&metrics));
    if !score.is_finite() {
        anyhow::bail!("score is not a finite number");
    }
    let categories = with_fallback(categorize_with(
        &repo.full_name,
        &repo.description_with_topics(),
        &config.output.categories,
        keywords,
    ));
    Ok(ResultRecord::new(repo, score, categories).with_metrics(&metrics))
}

fn with_fallback(mut categories: Vec<String>) -> Vec<String> {
    if categories.is_empty() {
        categories.push(UNCATEGORIZED.to_string());
    }
    categories
}

/// Renders `records` to `file` and, when given, to `latest` as well.
pub fn write_outputs(
    records: &[ResultRecord],
    config: &Config,
    file: &Path,
    latest: Option<&Path>,
) -> Result<()> {
    let text = render_markdown(records, &config.output.categories, config.title());
    if records.is_empty() {
        tracing::info!(
            "no repositories processed; writing an empty report stub to {}",
            file.display()
        );
    } else {
        tracing::info!("rendering {} results to {}", records.len(), file.display());
    }
    write_report(file, &text)?;
    if let Some(latest) = latest {
        tracing::info!("also updating latest index at {}", latest.display());
        write_report(latest, &text)?;
    }
    Ok(())
}

/// Re-runs categorization over an existing report and rewrites it in place.
/// Returns the number of distinct items.
pub fn recategorize_file(path: &Path, config: &Config) -> Result<usize> {
    let text = std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let mut records = merge_by_url(parse_report(&text));
    for record in &mut records {
        record.categories = with_fallback(categorize_repository(
            &record.name,
            &record.description,
            &config.output.categories,
            config.keyword_overrides(),
        ));
    }
    let rendered = render_markdown(&records, &config.output.categories, config.title());
    write_report(path, &rendered)?;
    Ok(records.len())
}

#[cfg(test)]
mod tests {
    use time::Duration;
    use time::macros::datetime;

    use super::*;
    use crate::config::parse_config;
    use crate::github::Listing;
    use crate::model::sample_repo;
    use crate::testing::FakeSource;

    const NOW: OffsetDateTime = datetime!(2024-06-30 00:00 UTC);

    fn config() -> Config {
        parse_config(
            r#"
[search]
query = "health"

[weights]
stars = 1.0
contributors = 1.0
recency_decay = 3.0

[weights.license]
MIT = 10.0
none = -5.0

[output]
file = "out.md"
categories = ["Telemedicine", "FHIR & Interoperability"]

[category_keywords]
Telemedicine = ["video visits"]
"#,
        )
        .expect("config")
    }

    #[test]
    fn builds_scored_categorized_records() {
        let source = FakeSource::new()
            .with_pulls(Listing {
                total_count: Some(2),
                first_page_len: 2,
            })
            .with_contributors(Listing {
                total_count: None,
                first_page_len: 4,
            });

        let mut tele = sample_repo(1, "acme/clinic");
        tele.description = "Video visits for small practices".into();
        tele.stars = 20;
        tele.license = "MIT".into();
        tele.pushed_at = Some(NOW - Duration::days(60));

        let mut fhir = sample_repo(2, "acme/bridge");
        fhir.topics = vec!["hl7".into()];

        let plain = sample_repo(3, "acme/misc");

        let report = curate(&source, &[tele, fhir, plain], &config(), NOW);
        assert_eq!(report.skipped, 0);
        let records = &report.records;
        assert_eq!(records.len(), 3);

        assert_eq!(records[0].categories, vec!["Telemedicine"]);
        // 20 stars + 4 contributors - 2 months * 3 + MIT 10
        assert!((records[0].score - 28.0).abs() < 1e-9, "{}", records[0].score);
        assert_eq!(records[0].prs_open, Some(2));
        assert_eq!(records[0].days_since_push, Some(60));

        assert_eq!(records[1].categories, vec!["FHIR & Interoperability"]);
        assert_eq!(records[1].days_since_push, None);
        assert_eq!(records[2].categories, vec![UNCATEGORIZED]);
    }

    #[test]
    fn non_finite_score_skips_only_that_candidate() {
        let mut config = config();
        config.weights.terms.insert("stars".into(), 1e308);
        config.weights.terms.insert("forks".into(), 1e308);

        let mut huge = sample_repo(1, "o/huge");
        huge.stars = 1;
        huge.forks = 1;
        let quiet = sample_repo(2, "o/quiet");

        let report = curate(&FakeSource::new(), &[huge, quiet], &config, NOW);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.records.len(), 1);
        assert_eq!(report.records[0].name, "o/quiet");
        assert_eq!(report.records[0].score, -5.0);
        assert_eq!(report.warnings, vec!["o/huge: score is not a finite number"]);
    }

    #[test]
    fn writes_primary_and_latest_reports() {
        let dir = tempfile::tempdir().expect("tempdir");
        let file = dir.path().join("result/dated.md");
        let latest = dir.path().join("latest/index.md");
        write_outputs(&[], &config(), &file, Some(&latest)).expect("write");
        let primary = std::fs::read_to_string(&file).expect("primary");
        assert_eq!(primary, "# Curated Healthcare Technology Tools\n");
        assert_eq!(std::fs::read_to_string(&latest).expect("latest"), primary);
    }

    #[test]
    fn recategorize_merges_duplicate_listings() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("report.md");
        std::fs::write(
            &path,
            "# Old\n\n## Uncategorized\n- **[a/tele](https://github.com/a/tele)** (Score: 5.0)\n  - License: MIT | Stars: 3 | Forks: 0\n  - Description: telehealth platform\n\n## Other\n- **[a/tele](https://github.com/a/tele)** (Score: 5.0)\n  - License: MIT | Stars: 3 | Forks: 0\n  - Description: telehealth platform\n",
        )
        .expect("write");

        let count = recategorize_file(&path, &config()).expect("recategorize");
        assert_eq!(count, 1);
        let text = std::fs::read_to_string(&path).expect("read");
        assert!(text.starts_with("# Curated Healthcare Technology Tools\n"));
        assert!(text.contains("## Telemedicine\n- **[a/tele]"));
        assert_eq!(text.matches("[a/tele]").count(), 1);
        assert!(!text.contains("## Other"));
    }
}

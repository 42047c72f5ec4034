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

use std::path::Path;
use std::path::PathBuf;

use anyhow::Context;
use anyhow::Result;
use time::Date;

use crate::config::parse_date;
use crate::render::write_report;

pub const DEFAULT_PREFIX: &str = "healthtech-tools";

#[derive(Debug)]
pub struct AggregateReport {
    pub source: Option<PathBuf>,
    pub output: PathBuf,
}

/// Newest `<prefix>-YYYY-MM-DD.md` in `dir`, by the date in its name.
pub fn find_latest_dated(dir: &Path, prefix: &str) -> Result<Option<PathBuf>> {
    if !dir.is_dir() {
        return Ok(None);
    }
    let mut newest: Option<(Date, PathBuf)> = None;
    for entry in std::fs::read_dir(dir).with_context(|| format!("read dir {}", dir.display()))? {
        let path = entry?.path();
        let Some(date) = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(|n| dated_name(n, prefix))
        else {
            continue;
        };
        if newest.as_ref().is_none_or(|(best, _)| date > *best) {
            newest = Some((date, path));
        }
    }
    Ok(newest.map(|(_, path)| path))
}

fn dated_name(file_name: &str, prefix: &str) -> Option<Date> {
    let stem = file_name.strip_suffix(".md")?;
    let date = stem.strip_prefix(prefix)?.strip_prefix('-')?;
    parse_date(date)
}

/// Copies the newest dated report to `output`, or writes a title-only stub.
pub fn aggregate_latest(
    dir: &Path,
    output: &Path,
    prefix: &str,
    title: &str,
) -> Result<AggregateReport> {
    std::fs::create_dir_all(dir).with_context(|| format!("create dir {}", dir.display()))?;
    let source = find_latest_dated(dir, prefix)?;
    match &source {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("read {}", path.display()))?;
            write_report(output, &text)?;
        }
        None => write_report(output, &format!("# {title}\n\n"))?,
    }
    Ok(AggregateReport {
        source,
        output: output.to_path_buf(),
    })
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn picks_newest_by_date_not_name_order() {
        let dir = tempdir().expect("tempdir");
        for (name, body) in [
            ("healthtech-tools-2024-01-31.md", "jan"),
            ("healthtech-tools-2024-02-01.md", "feb"),
            ("healthtech-tools-2024-13-01.md", "bad date"),
            ("healthtech-tools.md", "latest"),
            ("other-2025-01-01.md", "other prefix"),
        ] {
            std::fs::write(dir.path().join(name), body).expect("write");
        }
        let latest = find_latest_dated(dir.path(), DEFAULT_PREFIX).expect("scan");
        assert_eq!(
            latest,
            Some(dir.path().join("healthtech-tools-2024-02-01.md"))
        );

        let out = dir.path().join("healthtech-tools.md");
        let report = aggregate_latest(dir.path(), &out, DEFAULT_PREFIX, "T").expect("aggregate");
        assert!(report.source.is_some());
        assert_eq!(std::fs::read_to_string(&out).expect("read"), "feb");
    }

    #[test]
    fn writes_stub_when_nothing_dated() {
        let dir = tempdir().expect("tempdir");
        let target = dir.path().join("result");
        let out = target.join("healthtech-tools.md");
        let report = aggregate_latest(&target, &out, DEFAULT_PREFIX, "Curated").expect("aggregate");
        assert!(report.source.is_none());
        assert_eq!(std::fs::read_to_string(&out).expect("read"), "# Curated\n\n");
    }
}

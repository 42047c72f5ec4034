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

use std::collections::BTreeMap;
use std::path::Path;
use std::path::PathBuf;

use anyhow::Context;
use anyhow::Result;
use serde::Deserialize;
use serde::Serialize;
use time::Date;
use time::macros::format_description;

pub const TOKEN_ENV: &str = "GITHUB_TOKEN";
pub const DEFAULT_TITLE: &str = "Curated Healthcare Technology Tools";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub dry_run: bool,
    #[serde(default)]
    pub auth: AuthConfig,
    pub search: SearchConfig,
    pub weights: WeightConfig,
    pub output: OutputConfig,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub category_keywords: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(
        rename = "GITHUB_TOKEN",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub github_token: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub query: String,
    pub topics: Vec<String>,
    pub languages: Vec<String>,
    pub orgs: Vec<String>,
    pub users: Vec<String>,
    pub exclude_forks: bool,
    pub exclude_archived: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pushed_within_days: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_within_days: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub strategies: Vec<Strategy>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateWindow {
    #[default]
    None,
    PushedWithinDays,
    CreatedWithinDays,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Strategy {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<String>,
    #[serde(rename = "use")]
    pub window: DateWindow,
    /// Overrides the top-level day count for `window`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_extra: Option<String>,
}

pub const WEIGHT_STARS: &str = "stars";
pub const WEIGHT_FORKS: &str = "forks";
pub const WEIGHT_OPEN_ISSUES: &str = "open_issues";
pub const WEIGHT_PRS: &str = "prs";
pub const WEIGHT_DISCUSSIONS: &str = "discussions";
pub const WEIGHT_CONTRIBUTORS: &str = "contributors";
pub const WEIGHT_RECENCY: &str = "recency_decay";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WeightConfig {
    #[serde(default)]
    pub license: BTreeMap<String, f64>,
    #[serde(flatten)]
    pub terms: BTreeMap<String, f64>,
}

impl WeightConfig {
    /// Weight for a metric; missing weights are zero.
    pub fn get(&self, name: &str) -> f64 {
        self.terms.get(name).copied().unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub file: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest: Option<PathBuf>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub category_keywords: BTreeMap<String, Vec<String>>,
}

impl Config {
    pub fn token(&self) -> Option<&str> {
        self.auth
            .github_token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    /// Top-level `category_keywords`, falling back to the copy under `output`.
    pub fn keyword_overrides(&self) -> &BTreeMap<String, Vec<String>> {
        if self.category_keywords.is_empty() {
            &self.output.category_keywords
        } else {
            &self.category_keywords
        }
    }

    pub fn title(&self) -> &str {
        self.output.title.as_deref().unwrap_or(DEFAULT_TITLE)
    }

    /// Resolves the report path and the optional mirror path.
    ///
    /// `{date}` in `output.file` expands to `today`; an explicit override is
    /// used verbatim.
    pub fn output_paths(
        &self,
        cli_output: Option<&Path>,
        today: Date,
    ) -> (PathBuf, Option<PathBuf>) {
        let latest = self.output.latest.clone();
        if let Some(path) = cli_output {
            return (path.to_path_buf(), latest);
        }
        let file = self.output.file.replace("{date}", &format_date(today));
        (PathBuf::from(file), latest)
    }
}

pub fn format_date(date: Date) -> String {
    let fmt = format_description!("[year]-[month]-[day]");
    date.format(&fmt).unwrap_or_else(|_| date.to_string())
}

pub fn parse_date(text: &str) -> Option<Date> {
    let fmt = format_description!("[year]-[month]-[day]");
    Date::parse(text, &fmt).ok()
}

/// Reads, parses, injects the environment token, and validates.
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        anyhow::bail!("config file not found: {}", path.display());
    }
    let mut config = read_config(path)?;
    if let Ok(token) = std::env::var(TOKEN_ENV)
        && !token.trim().is_empty()
    {
        config.auth.github_token = Some(token);
    }
    Ok(config)
}

pub fn read_config(path: &Path) -> Result<Config> {
    let text = std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    parse_config(&text).with_context(|| format!("invalid config {}", path.display()))
}

pub fn parse_config(text: &str) -> Result<Config> {
    let value: toml::Table = toml::from_str(text).context("parse toml")?;
    let missing: Vec<&str> = ["search", "weights", "output"]
        .into_iter()
        .filter(|key| !value.contains_key(*key))
        .collect();
    if !missing.is_empty() {
        anyhow::bail!("missing required top-level keys: {}", missing.join(", "));
    }
    for key in ["search", "weights", "output"] {
        if !value.get(key).is_some_and(toml::Value::is_table) {
            anyhow::bail!("'{key}' must be a table");
        }
    }
    let config: Config = toml::Value::Table(value)
        .try_into()
        .context("decode config")?;
    validate_config(&config)?;
    Ok(config)
}

pub fn validate_config(config: &Config) -> Result<()> {
    if config.output.file.trim().is_empty() {
        anyhow::bail!("'output.file' must be provided");
    }
    for strategy in &config.search.strategies {
        if strategy.name.trim().is_empty() {
            anyhow::bail!("every search strategy needs a name");
        }
    }
    Ok(())
}

pub fn write_config(path: &Path, text: &str) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create dir {}", parent.display()))?;
    }
    std::fs::write(path, text).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

/// Starter config written by `hector init`.
pub const TEMPLATE: &str = r#"dry_run = false

[auth]
# Prefer the GITHUB_TOKEN environment variable over storing a token here.
# GITHUB_TOKEN = ""

[search]
query = "health"
topics = ["healthcare", "telemedicine", "fhir", "medical-imaging"]
languages = []
orgs = []
users = []
exclude_forks = true
exclude_archived = true
pushed_within_days = 365
sort = "stars"
order = "desc"

[weights]
stars = 0.1
forks = 0.2
open_issues = -0.05
prs = 0.5
discussions = 5.0
contributors = 0.5
recency_decay = 1.0

[weights.license]
"Apache-2.0" = 50.0
MIT = 40.0
"BSD-3-Clause" = 30.0
"GPL-3.0" = 10.0
none = -100.0

[output]
file = "result/healthtech-tools-{date}.md"
latest = "result/healthtech-tools.md"
categories = [
    "AI Diagnostics",
    "Telemedicine",
    "EHR & Clinical Systems",
    "Imaging & Radiology",
    "Wearables & Remote Monitoring",
    "Public Health & Epidemiology",
    "Genomics & Precision Medicine",
    "Mental Health",
    "Scheduling & Patient Portals",
    "NLP & Clinical Text",
    "FHIR & Interoperability",
    "Data Platforms & ETL",
]

[category_keywords]
"Telemedicine" = ["virtual visit"]
"#;

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use tempfile::tempdir;
    use time::macros::date;

    use super::*;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn with_token<T>(token: Option<&str>, f: impl FnOnce() -> T) -> T {
        let _guard = ENV_LOCK.lock().expect("env lock");
        let old = std::env::var(TOKEN_ENV).ok();
        match token {
            Some(val) => set_env_var(TOKEN_ENV, val),
            None => remove_env_var(TOKEN_ENV),
        }
        let result = f();
        match old {
            Some(val) => set_env_var(TOKEN_ENV, val),
            None => remove_env_var(TOKEN_ENV),
        }
        result
    }

    fn set_env_var(key: &str, value: impl AsRef<std::ffi::OsStr>) {
        unsafe {
            std::env::set_var(key, value);
        }
    }

    fn remove_env_var(key: &str) {
        unsafe {
            std::env::remove_var(key);
        }
    }

    const MINIMAL: &str = "[search]\nquery = \"test\"\n[weights]\nstars = 1\n[output]\nfile = \"out.md\"\n";

    #[test]
    fn load_injects_env_token() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("hector.toml");
        std::fs::write(&path, MINIMAL).expect("write config");

        let config = with_token(Some("dummy-token"), || load_config(&path)).expect("load");
        assert_eq!(config.search.query, "test");
        assert_eq!(config.output.file, "out.md");
        assert_eq!(config.token(), Some("dummy-token"));
        assert_eq!(config.weights.get(WEIGHT_STARS), 1.0);
        assert_eq!(config.weights.get(WEIGHT_FORKS), 0.0);
    }

    #[test]
    fn env_token_overrides_file_token() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("hector.toml");
        let text = format!("[auth]\nGITHUB_TOKEN = \"from-file\"\n{MINIMAL}");
        std::fs::write(&path, text).expect("write config");

        let config = with_token(None, || load_config(&path)).expect("load");
        assert_eq!(config.token(), Some("from-file"));
        let config = with_token(Some("from-env"), || load_config(&path)).expect("load");
        assert_eq!(config.token(), Some("from-env"));
    }

    #[test]
    fn missing_sections_are_reported() {
        let err = parse_config("[search]\nquery = \"x\"\n").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("weights") && msg.contains("output"), "{msg}");
    }

    #[test]
    fn wrong_section_type_is_rejected() {
        let err = parse_config("search = 3\n[weights]\n[output]\nfile = \"a.md\"\n").unwrap_err();
        assert!(err.to_string().contains("'search' must be a table"));
    }

    #[test]
    fn output_file_is_required() {
        let err = parse_config("[search]\n[weights]\n[output]\ncategories = []\n").unwrap_err();
        assert!(err.to_string().contains("output.file"));
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempdir().expect("tempdir");
        let err = load_config(&dir.path().join("nope.toml")).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }

    #[test]
    fn parses_strategies_and_license_weights() {
        let text = r#"
[search]
query = "health"
pushed_within_days = 30

[[search.strategies]]
name = "fresh"
sort = "updated"
use = "pushed_within_days"
days = 7
query_extra = "stars:>5"

[[search.strategies]]
name = "popular"
sort = "stars"
order = "desc"

[weights]
stars = 0.5
recency_decay = 2

[weights.license]
"Apache-2.0" = 50
none = -100

[output]
file = "out.md"

[output.category_keywords]
Telemedicine = ["virtual visit"]
"#;
        let config = parse_config(text).expect("parse");
        let strategies = &config.search.strategies;
        assert_eq!(strategies.len(), 2);
        assert_eq!(strategies[0].window, DateWindow::PushedWithinDays);
        assert_eq!(strategies[0].days, Some(7));
        assert_eq!(strategies[1].window, DateWindow::None);
        assert_eq!(config.weights.get(WEIGHT_RECENCY), 2.0);
        assert_eq!(config.weights.license.get("none"), Some(&-100.0));
        assert!(!config.weights.terms.contains_key("license"));
        assert_eq!(
            config.keyword_overrides().get("Telemedicine"),
            Some(&vec!["virtual visit".to_string()])
        );
    }

    #[test]
    fn output_paths_expand_date_and_honor_override() {
        let mut config = parse_config(MINIMAL).expect("parse");
        config.output.file = "result/tools-{date}.md".to_string();
        config.output.latest = Some(PathBuf::from("result/tools.md"));

        let (file, latest) = config.output_paths(None, date!(2024 - 03 - 07));
        assert_eq!(file, PathBuf::from("result/tools-2024-03-07.md"));
        assert_eq!(latest, Some(PathBuf::from("result/tools.md")));

        let (file, latest) = config.output_paths(Some(Path::new("x.md")), date!(2024 - 03 - 07));
        assert_eq!(file, PathBuf::from("x.md"));
        assert_eq!(latest, Some(PathBuf::from("result/tools.md")));
    }

    #[test]
    fn template_is_a_valid_config() {
        let config = parse_config(TEMPLATE).expect("template parses");
        assert_eq!(config.output.categories.len(), 12);
        assert!(config.token().is_none());
    }
}

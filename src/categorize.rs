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

//! Category assignment by label and synonym phrase matching.

use std::collections::BTreeMap;
use std::collections::HashSet;

use crate::text::contains_phrase;
use crate::text::normalize;

/// Built-in synonyms, chosen to keep the "Uncategorized" bucket small.
const DEFAULT_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "AI Diagnostics",
        &[
            "diagnostic",
            "diagnosis",
            "triage",
            "decision support",
            "cds",
            "cad",
        ],
    ),
    (
        "Telemedicine",
        &[
            "telemedicine",
            "telehealth",
            "virtual care",
            "telemed",
            "remote consult",
        ],
    ),
    (
        "EHR & Clinical Systems",
        &[
            "ehr",
            "emr",
            "electronic health record",
            "electronic medical record",
            "clinical system",
            "clinical workflow",
        ],
    ),
    (
        "Imaging & Radiology",
        &[
            "radiology",
            "medical imaging",
            "imaging",
            "dicom",
            "pacs",
            "ct",
            "mri",
            "xray",
            "x-ray",
            "ultrasound",
        ],
    ),
    (
        "Wearables & Remote Monitoring",
        &[
            "wearable",
            "wearables",
            "remote monitoring",
            "rpm",
            "smartwatch",
            "fitness tracker",
        ],
    ),
    (
        "Public Health & Epidemiology",
        &["public health", "epidemiology", "surveillance", "outbreak"],
    ),
    (
        "Genomics & Precision Medicine",
        &[
            "genomic",
            "genomics",
            "precision medicine",
            "vcf",
            "variant",
            "bioinformatics",
        ],
    ),
    (
        "Mental Health",
        &[
            "mental health",
            "psychiatry",
            "psychology",
            "therapy",
            "depression",
            "anxiety",
        ],
    ),
    (
        "Scheduling & Patient Portals",
        &[
            "scheduling",
            "appointment",
            "booking",
            "patient portal",
            "portal",
        ],
    ),
    (
        "NLP & Clinical Text",
        &[
            "nlp",
            "natural language",
            "clinical text",
            "de-identification",
            "deidentification",
            "ner",
            "clinical notes",
        ],
    ),
    (
        "FHIR & Interoperability",
        &[
            "fhir",
            "hl7",
            "interoperability",
            "ccd",
            "ccda",
            "smart on fhir",
            "smart-on-fhir",
        ],
    ),
    (
        "Data Platforms & ETL",
        &[
            "etl",
            "extract transform load",
            "data platform",
            "data pipeline",
            "warehouse",
            "lakehouse",
        ],
    ),
];

/// Category label to ordered, de-duplicated synonym list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryKeywordMap {
    entries: BTreeMap<String, Vec<String>>,
}

impl CategoryKeywordMap {
    pub fn defaults() -> Self {
        let entries = DEFAULT_KEYWORDS
            .iter()
            .map(|(label, synonyms)| {
                (
                    label.to_string(),
                    synonyms.iter().map(|s| s.to_string()).collect(),
                )
            })
            .collect();
        Self { entries }
    }

    /// Appends override synonyms after the existing ones for each category.
    ///
    /// Labels and synonyms are trimmed; empty ones are dropped. Each merged
    /// list keeps the first occurrence of every synonym.
    pub fn merged(mut self, overrides: &BTreeMap<String, Vec<String>>) -> Self {
        for (label, extra) in overrides {
            let label = label.trim();
            if label.is_empty() {
                continue;
            }
            let list = self.entries.entry(label.to_string()).or_default();
            let extra = extra
                .iter()
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .map(str::to_string);
            let combined: Vec<String> = list.drain(..).chain(extra).collect();
            *list = dedup_preserving_order(combined);
        }
        self
    }

    pub fn synonyms(&self, label: &str) -> &[String] {
        self.entries.get(label).map(Vec::as_slice).unwrap_or(&[])
    }
}

fn dedup_preserving_order(items: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}

/// Assigns category labels, in `categories` order, to a repository.
pub fn categorize_repository<S: AsRef<str>>(
    name: &str,
    description: &str,
    categories: &[S],
    overrides: &BTreeMap<String, Vec<String>>,
) -> Vec<String> {
    let keywords = CategoryKeywordMap::defaults().merged(overrides);
    categorize_with(name, description, categories, &keywords)
}

/// Same as [`categorize_repository`] with a prebuilt keyword map, so a scan
/// merges the map once instead of per repository.
pub fn categorize_with<S: AsRef<str>>(
    name: &str,
    description: &str,
    categories: &[S],
    keywords: &CategoryKeywordMap,
) -> Vec<String> {
    let haystack = normalize(&format!("{name} {description}"));
    let mut matched = Vec::new();
    for category in categories {
        let label = category.as_ref().trim();
        if label.is_empty() {
            continue;
        }
        if contains_phrase(label, &haystack)
            || keywords
                .synonyms(label)
                .iter()
                .any(|kw| contains_phrase(kw, &haystack))
        {
            matched.push(label.to_string());
        }
    }
    matched
}

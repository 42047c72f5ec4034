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

//! Text normalization and word-bounded phrase matching.

/// Lowercases, spells out `&`, blanks everything outside `[a-z0-9\s-]`, and
/// collapses whitespace.
pub fn normalize(text: &str) -> String {
    let lowered = text.to_lowercase().replace('&', " and ");
    let mut out = String::with_capacity(lowered.len());
    let mut pending_space = false;
    for ch in lowered.chars() {
        let keep = ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-';
        if keep {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.push(ch);
        } else {
            pending_space = true;
        }
    }
    out
}

fn tokens(normalized: &str) -> Vec<&str> {
    normalized
        .split([' ', '-'])
        .filter(|t| !t.is_empty())
        .collect()
}

/// Returns true when `phrase` occurs in `haystack` as a run of whole words.
///
/// `haystack` is expected to be normalized already. Words are separated by
/// spaces or hyphens on both sides, so "ai diagnostics" matches
/// "ai-diagnostics" but "ai" never matches inside "braid".
pub fn contains_phrase(phrase: &str, haystack: &str) -> bool {
    let phrase = normalize(phrase);
    let needle = tokens(&phrase);
    if needle.is_empty() {
        return false;
    }
    let hay = tokens(haystack);
    if needle.len() > hay.len() {
        return false;
    }
    hay.windows(needle.len()).any(|window| window == needle.as_slice())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_punctuation_and_collapses_space() {
        assert_eq!(
            normalize("  Hello, World!  R&D\tTools "),
            "hello world r and d tools"
        );
        assert_eq!(normalize("X-Ray / CT"), "x-ray ct");
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("!!!"), "");
    }

    #[test]
    fn normalize_output_alphabet() {
        let inputs = [
            "Ünïcödé & ümlauts",
            "tabs\t\tand\nnewlines",
            "--leading-hyphen",
            "MiXeD 123 CaSe???",
            "   ",
        ];
        for input in inputs {
            let out = normalize(input);
            assert!(
                out.chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == ' '),
                "unexpected char in {out:?}"
            );
            assert!(!out.starts_with(' ') && !out.ends_with(' '));
            assert!(!out.contains("  "));
        }
    }

    #[test]
    fn phrase_matches_across_case_and_hyphen() {
        assert!(contains_phrase(
            "AI Diagnostics",
            "awesome ai-diagnostics tool"
        ));
        assert!(contains_phrase("x-ray", "portable x-ray viewer"));
        assert!(contains_phrase("telemedicine", "telemedicine"));
    }

    #[test]
    fn phrase_requires_word_edges() {
        assert!(!contains_phrase("ai", "braid"));
        assert!(!contains_phrase("ct", "project tracker"));
        assert!(contains_phrase("ct", "ct scan"));
    }

    #[test]
    fn empty_phrase_never_matches() {
        assert!(!contains_phrase("", "anything"));
        assert!(!contains_phrase("  ?! ", "anything"));
    }
}

//! Dictionary expansion: `{letter}`/`{number}` placeholders, sharding

use std::path::Path;

use crate::error::{EnumError, Result};
use crate::types::Candidate;

const LETTER_ALPHABET: &str = "abcdefghijklmnopqrstuvwxyz-";
const NUMBER_ALPHABET: &str = "0123456789";

/// Read a dictionary file, skipping comment (`#`) and blank lines.
pub fn read_lines(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let contents = std::fs::read_to_string(&path)?;
    Ok(parse_lines(&contents))
}

fn parse_lines(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty() && !l.contains('#'))
        .map(|l| l.to_string())
        .collect()
}

/// Expand every line's `{letter}`/`{number}` placeholders, normalize dashes,
/// drop empties, dedup, and always append the apex sentinel `@`.
pub fn expand(lines: &[String]) -> Vec<Candidate> {
    let mut out = Vec::new();
    let mut seen = std::collections::HashSet::new();

    for line in lines {
        for expanded in expand_line(line) {
            let normalized = normalize_label(&expanded);
            if normalized.is_empty() {
                continue;
            }
            if seen.insert(normalized.clone()) {
                out.push(Candidate::label(normalized));
            }
        }
    }

    out.push(Candidate::apex());
    out
}

fn expand_line(line: &str) -> Vec<String> {
    let has_letter = line.contains("{letter}");
    let has_number = line.contains("{number}");

    if !has_letter && !has_number {
        return vec![line.to_string()];
    }

    let mut results = vec![line.to_string()];

    if has_letter {
        results = cartesian_substitute(&results, "{letter}", LETTER_ALPHABET);
    }
    if has_number {
        results = cartesian_substitute(&results, "{number}", NUMBER_ALPHABET);
    }

    results
}

/// Replace every occurrence of `placeholder` in each template with every symbol
/// of `alphabet`, one symbol per generated line (all occurrences on a line get
/// the same symbol).
fn cartesian_substitute(templates: &[String], placeholder: &str, alphabet: &str) -> Vec<String> {
    let mut out = Vec::new();
    for template in templates {
        if !template.contains(placeholder) {
            out.push(template.clone());
            continue;
        }
        for symbol in alphabet.chars() {
            out.push(template.replace(placeholder, &symbol.to_string()));
        }
    }
    out
}

fn normalize_label(label: &str) -> String {
    let collapsed = collapse_dashes(label.trim_matches('-'));
    collapsed
}

fn collapse_dashes(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_dash = false;
    for c in s.chars() {
        if c == '-' {
            if !prev_dash {
                out.push(c);
            }
            prev_dash = true;
        } else {
            out.push(c);
            prev_dash = false;
        }
    }
    out.trim_matches('-').to_string()
}

/// Return the `k`th of `n` contiguous, roughly-equal shards (1-indexed).
/// Shard size is `ceil(len / n)`. Concatenating shards `1..=n` reconstructs the
/// input set exactly (order preserved, no overlap).
pub fn shard(candidates: Vec<Candidate>, k: u32, n: u32) -> Result<Vec<Candidate>> {
    if n == 0 || k == 0 || k > n {
        return Err(EnumError::configuration(format!(
            "split {k}/{n} must satisfy 1 <= k <= n"
        )));
    }
    let len = candidates.len();
    let chunk = (len + n as usize - 1) / n as usize;
    let start = ((k - 1) as usize) * chunk;
    if start >= len {
        return Ok(Vec::new());
    }
    let end = (start + chunk).min(len);
    Ok(candidates[start..end].to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_lines_skips_comments_and_blanks() {
        let text = "www\n# comment\n\nmail\n";
        assert_eq!(parse_lines(text), vec!["www".to_string(), "mail".to_string()]);
    }

    #[test]
    fn expand_letter_placeholder_produces_27_variants() {
        let lines = vec!["a{letter}".to_string()];
        let expanded = expand(&lines);
        // 27 variants minus the one that normalizes to just "a" with dash dropped,
        // minus duplicates after collapsing; "a-" trims to "a", collides with plain "a".
        assert!(expanded.len() <= 28); // 27 + apex sentinel, allowing for collisions
        assert!(expanded.iter().any(|c| c.0 == "aa"));
        assert!(expanded.iter().any(|c| c.0 == "@"));
    }

    #[test]
    fn expand_is_idempotent_under_dedup() {
        let lines = vec!["www".to_string(), "www".to_string()];
        let expanded = expand(&lines);
        let www_count = expanded.iter().filter(|c| c.0 == "www").count();
        assert_eq!(www_count, 1);
    }

    #[test]
    fn normalize_label_collapses_and_trims_dashes() {
        assert_eq!(normalize_label("--a--b--"), "a-b");
        assert_eq!(normalize_label("---"), "");
    }

    #[test]
    fn shard_partitions_without_overlap() {
        let candidates: Vec<Candidate> = (0..10).map(|i| Candidate::label(i.to_string())).collect();
        let mut reconstructed = Vec::new();
        for k in 1..=3 {
            reconstructed.extend(shard(candidates.clone(), k, 3).unwrap());
        }
        assert_eq!(reconstructed, candidates);
    }

    #[test]
    fn shard_rejects_k_greater_than_n() {
        let candidates = vec![Candidate::label("a")];
        assert!(shard(candidates, 4, 3).is_err());
    }
}

//! Shared helpers for the end-to-end tests

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

/// Path of a fixture tree under tests/fixtures/
pub fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Load a fixture file from tests/fixtures/
pub fn load_fixture(name: &str) -> String {
    let path = fixture_path(name);
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("Failed to load fixture {}: {}", name, e))
}

/// Expectations written into a fixture as comments:
/// - ``// want `message` `` expects a diagnostic with that message on the line
/// - ``//want Name:`a,b` `` expects the fact exported for interface `Name`
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Expectations {
    /// (line, message), in source order
    pub diagnostics: Vec<(usize, String)>,
    /// (interface name, fact display form), in source order
    pub facts: Vec<(String, String)>,
}

pub fn expectations(source: &str) -> Expectations {
    let mut want = Expectations::default();
    for (i, line) in source.lines().enumerate() {
        let Some((_, comment)) = line.split_once("//") else {
            continue;
        };
        let Some(rest) = comment.trim_start().strip_prefix("want") else {
            continue;
        };
        let rest = rest.trim();
        if rest.starts_with('`') {
            for message in quoted(rest) {
                want.diagnostics.push((i + 1, message));
            }
        } else if let Some((name, value)) = rest.split_once(':') {
            if let Some(fact) = quoted(value).into_iter().next() {
                want.facts.push((name.trim().to_string(), fact));
            }
        }
    }
    want
}

/// Backtick-quoted strings, with `\.` unescaped to `.`
fn quoted(text: &str) -> Vec<String> {
    text.split('`')
        .skip(1)
        .step_by(2)
        .map(|s| s.replace("\\.", "."))
        .collect()
}

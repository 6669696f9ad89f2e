//! Single-unit fixtures with expectations written as `want` comments

mod common;

use common::{expectations, fixture_path, load_fixture};
use sumlint::ast::LineIndex;
use sumlint::facts::{FactStore, InMemoryFactStore};
use sumlint::AnalyzerConfig;
use sumlint_cli::driver::check_tree;

/// Analyze `tests/fixtures/analysis/<name>` as the unit `<name>` and
/// compare diagnostics and exported facts with its `want` comments
fn run_fixture(config: AnalyzerConfig, name: &str) {
    let relative = format!("analysis/{}/src.go", name);
    let source = load_fixture(&relative);
    let want = expectations(&source);

    let mut store = InMemoryFactStore::new(config.name.clone());
    let root = fixture_path(&format!("analysis/{}", name));
    let reports = check_tree(&config, &root, Some(name), &mut store)
        .unwrap_or_else(|e| panic!("{}: {}", name, e));
    assert_eq!(reports.len(), 1);

    let index = LineIndex::new(&source);
    let got: Vec<(usize, String)> = reports[0]
        .diagnostics
        .iter()
        .map(|d| (index.line_col(d.span.start).0, d.to_string()))
        .collect();
    assert_eq!(got, want.diagnostics, "diagnostics of {}", name);

    let facts: Vec<(String, String)> = store
        .facts()
        .unwrap()
        .into_iter()
        .map(|fact| (fact.interface.name.clone(), fact.to_string()))
        .collect();
    assert_eq!(facts, want.facts, "facts of {}", name);
}

#[test]
fn test_dflt() {
    run_fixture(AnalyzerConfig::sum(), "dflt");
}

#[test]
fn test_exhaustive() {
    run_fixture(AnalyzerConfig::sum(), "exhaustive");
}

#[test]
fn test_nonexhaustive() {
    run_fixture(AnalyzerConfig::sum(), "nonexhaustive");
}

#[test]
fn test_oneofdflt() {
    run_fixture(AnalyzerConfig::oneof(), "oneofdflt");
}

#[test]
fn test_expectations_parse() {
    let source = "type SumFoo interface { //want SumFoo:`p\\.A,p\\.B`\n\tswitch x.(type) { // want `one` `two`\n";
    let want = expectations(source);
    assert_eq!(want.facts, vec![("SumFoo".to_string(), "p.A,p.B".to_string())]);
    assert_eq!(
        want.diagnostics,
        vec![(2, "one".to_string()), (2, "two".to_string())]
    );
}

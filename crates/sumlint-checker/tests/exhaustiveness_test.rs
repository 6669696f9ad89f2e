//! Integration tests for type switch exhaustiveness across units

use sumlint_ast::LineIndex;
use sumlint_checker::{analyze, AnalysisResult, AnalyzerConfig};
use sumlint_facts::{FactStore, InMemoryFactStore, InterfaceId, RedbFactStore};
use sumlint_types::Universe;

/// Parse, type-check and analyze units in order with one shared store.
/// Returns `line:col: message` for every diagnostic, per unit.
fn run_units(
    config: &AnalyzerConfig,
    store: &mut dyn FactStore,
    units: &[(&str, &str)],
) -> Vec<Vec<String>> {
    let mut universe = Universe::new();
    let mut out = Vec::new();
    for (path, source) in units {
        let files = [sumlint_parser::parse(source).expect("parse failed")];
        let info = sumlint_types::check_package(&mut universe, path, &files).expect("check failed");
        let result = analyze(config, &universe, path, &files, &info, store).expect("analysis failed");
        out.push(render(source, &result));
    }
    out
}

fn render(source: &str, result: &AnalysisResult) -> Vec<String> {
    let index = LineIndex::new(source);
    result
        .diagnostics
        .iter()
        .map(|d| {
            let (line, col) = index.line_col(d.span.start);
            format!("{}:{}: {}", line, col, d)
        })
        .collect()
}

fn run_sum(units: &[(&str, &str)]) -> Vec<Vec<String>> {
    let mut store = InMemoryFactStore::new("sumlint");
    run_units(&AnalyzerConfig::sum(), &mut store, units)
}

const SUM_DECL: &str = r#"package pkg

type SumFoo interface {
	sumFoo()
}

type A struct{}

func (A) sumFoo() {}

type B struct{}

func (B) sumFoo() {}
"#;

fn with_decl(body: &str) -> String {
    format!("{}{}", SUM_DECL, body)
}

// === Single-unit scenarios ===

#[test]
fn test_missing_case_with_default() {
    let source = with_decl(
        r#"
func f(x SumFoo) {
	switch x.(type) {
	case A:
	default:
	}
}
"#,
    );
    let out = run_sum(&[("pkg", &source)]);
    assert_eq!(
        out[0],
        vec!["16:2: non-exhaustive type switch on SumFoo: missing cases for: pkg.B"]
    );
}

#[test]
fn test_all_cases_without_default() {
    let source = with_decl(
        r#"
func f(x SumFoo) {
	switch x.(type) {
	case A, B:
	}
}
"#,
    );
    let out = run_sum(&[("pkg", &source)]);
    assert_eq!(
        out[0],
        vec!["16:2: missing default case on SumFoo: code cannot handle nil interface"]
    );
}

#[test]
fn test_exhaustive_with_default_is_clean() {
    let source = with_decl(
        r#"
func f(x SumFoo) {
	switch v := x.(type) {
	case A:
		_ = v
	case *B:
	default:
	}
}
"#,
    );
    let out = run_sum(&[("pkg", &source)]);
    assert!(out[0].is_empty(), "unexpected diagnostics: {:?}", out[0]);
}

#[test]
fn test_both_diagnostics_in_order() {
    let source = with_decl(
        r#"
func f(x SumFoo) {
	switch x.(type) {
	}
}
"#,
    );
    let out = run_sum(&[("pkg", &source)]);
    assert_eq!(
        out[0],
        vec![
            "16:2: non-exhaustive type switch on SumFoo: missing cases for: pkg.A, pkg.B",
            "16:2: missing default case on SumFoo: code cannot handle nil interface",
        ]
    );
}

#[test]
fn test_value_pointer_collapse() {
    let source = r#"package pkg

type SumFoo interface{ sumFoo() }

type A struct{}

func (A) sumFoo() {}

type B struct{}

func (*B) sumFoo() {}

func f(x SumFoo) {
	switch x.(type) {
	case *A, B:
	default:
	}
}
"#;
    let out = run_sum(&[("pkg", source)]);
    assert!(out[0].is_empty(), "unexpected diagnostics: {:?}", out[0]);
}

#[test]
fn test_non_sum_interfaces_are_skipped() {
    let source = r#"package pkg

import "fmt"

type Foo interface{ foo() }

type A struct{}

func (A) foo() {}

func f(x Foo, s fmt.Stringer, e error, n int) {
	switch x.(type) {
	}
	switch s.(type) {
	}
	switch e.(type) {
	}
}
"#;
    let out = run_sum(&[("pkg", source)]);
    assert!(out[0].is_empty());
}

#[test]
fn test_sum_without_implementors_is_skipped() {
    let source = r#"package pkg

type SumNone interface{ sumNone() }

func f(x SumNone) {
	switch x.(type) {
	}
}
"#;
    let out = run_sum(&[("pkg", source)]);
    assert!(out[0].is_empty());
}

#[test]
fn test_deterministic_output() {
    let source = with_decl(
        r#"
type C struct{}

func (*C) sumFoo() {}

func f(x SumFoo) {
	switch x.(type) {
	case B:
	}
	switch x.(type) {
	case C:
	default:
	}
}
"#,
    );
    let first = run_sum(&[("pkg", &source)]);
    for _ in 0..5 {
        assert_eq!(run_sum(&[("pkg", &source)]), first);
    }
    assert_eq!(
        first[0][0],
        "20:2: non-exhaustive type switch on SumFoo: missing cases for: pkg.A, pkg.C"
    );
}

// === Cross-unit scenarios ===

const SUM_UNIT: &str = r#"package sum

type SumFoo interface {
	sumFoo()
}

type A struct{}

func (A) sumFoo() {}

type B struct{}

func (B) sumFoo() {}
"#;

const TEST_UNIT: &str = r#"package test

import "github.com/gomoni/sumlint/test/sum"

func good(x sum.SumFoo) {
	switch x.(type) {
	case sum.A, sum.B:
	default:
	}
}

func noDefault(x sum.SumFoo) {
	switch x.(type) {
	case sum.A, sum.B:
	}
}

func noB(x sum.SumFoo) {
	switch x.(type) {
	case sum.A:
	default:
	}
}
"#;

#[test]
fn test_cross_unit_facts() {
    let out = run_sum(&[
        ("github.com/gomoni/sumlint/test/sum", SUM_UNIT),
        ("github.com/gomoni/sumlint/test", TEST_UNIT),
    ]);
    assert!(out[0].is_empty());
    assert_eq!(
        out[1],
        vec![
            "13:2: missing default case on SumFoo: code cannot handle nil interface",
            "19:2: non-exhaustive type switch on SumFoo: missing cases for: github.com/gomoni/sumlint/test/sum.B",
        ]
    );
}

#[test]
fn test_cross_unit_equivalence() {
    let dispatch = r#"
func f(x SumFoo) {
	switch x.(type) {
	case A:
	}
}
"#;
    let single = run_sum(&[("pkg", &with_decl(dispatch))]);

    let consumer = r#"package q

import "pkg"

func f(x pkg.SumFoo) {
	switch x.(type) {
	case pkg.A:
	}
}
"#;
    let split = run_sum(&[("pkg", SUM_DECL), ("q", consumer)]);

    let messages = |lines: &[String]| -> Vec<String> {
        lines
            .iter()
            .map(|l| l.splitn(3, ':').nth(2).unwrap_or("").trim().to_string())
            .collect()
    };
    assert_eq!(messages(&single[0]), messages(&split[1]));
    assert_eq!(split[1].len(), 2);
}

#[test]
fn test_fact_exported_once_per_interface() {
    let mut store = InMemoryFactStore::new("sumlint");
    run_units(&AnalyzerConfig::sum(), &mut store, &[("pkg", SUM_DECL)]);
    let facts = store.facts().unwrap();
    assert_eq!(facts.len(), 1);
    assert_eq!(facts[0].to_string(), "pkg.A,pkg.B");
}

// === oneof ===

const ONE_OF_UNIT: &str = r#"package one_of

type Msg struct {
	Payload isMsg_Payload
}

type isMsg_Payload interface {
	isMsg_Payload()
}

func (m *Msg) GetPayload() isMsg_Payload {
	if m != nil {
		return m.Payload
	}
	return nil
}

type Msg_A struct {
	A string
}

type Msg_B struct {
	B int
}

func (*Msg_A) isMsg_Payload() {}

func (*Msg_B) isMsg_Payload() {}
"#;

const ONE_OF_TEST: &str = r#"package test

import "github.com/gomoni/sumlint/test/one_of"

type oneof struct{}

func (o oneof) good(msg *one_of.Msg) {
	switch msg.GetPayload().(type) {
	case *one_of.Msg_A:
	case *one_of.Msg_B:
	default:
	}
}

func (o oneof) nonDefault(msg *one_of.Msg) {
	switch msg.GetPayload().(type) {
	case *one_of.Msg_A:
	case *one_of.Msg_B:
	}
}

func (o oneof) noB(msg *one_of.Msg) {
	switch msg.GetPayload().(type) {
	case *one_of.Msg_A:
	default:
	}
}
"#;

#[test]
fn test_oneof_unexported_interface_imported_lazily() {
    let mut store = InMemoryFactStore::new("oneoflint");
    let out = run_units(
        &AnalyzerConfig::oneof(),
        &mut store,
        &[
            ("github.com/gomoni/sumlint/test/one_of", ONE_OF_UNIT),
            ("github.com/gomoni/sumlint/test", ONE_OF_TEST),
        ],
    );
    assert!(out[0].is_empty());
    assert_eq!(
        out[1],
        vec![
            "16:2: missing default case on isMsg_Payload: code cannot handle nil interface",
            "23:2: non-exhaustive type switch on isMsg_Payload: missing cases for: github.com/gomoni/sumlint/test/one_of.Msg_B",
        ]
    );
}

#[test]
fn test_sumlint_ignores_oneof_wrappers() {
    let out = run_sum(&[
        ("github.com/gomoni/sumlint/test/one_of", ONE_OF_UNIT),
        ("github.com/gomoni/sumlint/test", ONE_OF_TEST),
    ]);
    assert!(out.iter().all(Vec::is_empty));
}

#[test]
fn test_namespace_mismatch_is_an_error() {
    let mut universe = Universe::new();
    let files = [sumlint_parser::parse(SUM_DECL).unwrap()];
    let info = sumlint_types::check_package(&mut universe, "pkg", &files).unwrap();
    let mut store = InMemoryFactStore::new("oneoflint");
    let err = analyze(&AnalyzerConfig::sum(), &universe, "pkg", &files, &info, &mut store)
        .unwrap_err();
    assert!(err.to_string().contains("namespace oneoflint"));
}

// === Persistent facts ===

#[test]
fn test_facts_from_an_earlier_run() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("facts.redb");

    {
        let mut store = RedbFactStore::open(&db_path, "sumlint").unwrap();
        run_units(
            &AnalyzerConfig::sum(),
            &mut store,
            &[("github.com/gomoni/sumlint/test/sum", SUM_UNIT)],
        );
    }

    // A later run type-checks the producer again but only analyzes the consumer
    let mut store = RedbFactStore::open(&db_path, "sumlint").unwrap();
    let mut universe = Universe::new();
    let sum_files = [sumlint_parser::parse(SUM_UNIT).unwrap()];
    sumlint_types::check_package(&mut universe, "github.com/gomoni/sumlint/test/sum", &sum_files)
        .unwrap();
    let test_files = [sumlint_parser::parse(TEST_UNIT).unwrap()];
    let info =
        sumlint_types::check_package(&mut universe, "github.com/gomoni/sumlint/test", &test_files)
            .unwrap();
    let result = analyze(
        &AnalyzerConfig::sum(),
        &universe,
        "github.com/gomoni/sumlint/test",
        &test_files,
        &info,
        &mut store,
    )
    .unwrap();
    assert_eq!(result.diagnostics.len(), 2);
    assert_eq!(result.sites.len(), 3);
    assert!(store
        .import(&InterfaceId::new("github.com/gomoni/sumlint/test/sum", "SumFoo"))
        .unwrap()
        .is_some());
}

#[test]
fn test_reanalysis_replaces_earlier_facts() {
    let mut store = InMemoryFactStore::new("sumlint");
    run_units(&AnalyzerConfig::sum(), &mut store, &[("pkg", SUM_DECL)]);
    let id = InterfaceId::new("pkg", "SumFoo");
    assert!(store.import(&id).unwrap().is_some());

    // The same unit without implementors, reusing the store
    let without_variants = "package pkg\n\ntype SumFoo interface {\n\tsumFoo()\n}\n\nfunc f(x SumFoo) {\n\tswitch x.(type) {\n\tdefault:\n\t}\n}\n";
    let out = run_units(&AnalyzerConfig::sum(), &mut store, &[("pkg", without_variants)]);
    assert_eq!(out, vec![Vec::<String>::new()]);
    assert!(store.import(&id).unwrap().is_none());
}

//! Integration tests for the driver over temporary source trees

use std::fs;
use std::path::Path;

use sumlint_checker::AnalyzerConfig;
use sumlint_cli::driver::{check_tree, discover_units, module_path, DriverError};
use sumlint_cli::report::render_vet;
use sumlint_facts::{FactStore, InMemoryFactStore, RedbFactStore};
use tempfile::tempdir;

fn write(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

const SUM: &str = "package sum\n\ntype SumFoo interface{ sumFoo() }\n\ntype A struct{}\n\nfunc (A) sumFoo() {}\n\ntype B struct{}\n\nfunc (*B) sumFoo() {}\n";

const USE: &str = "package app\n\nimport \"example.com/m/sum\"\n\nfunc f(x sum.SumFoo) {\n\tswitch x.(type) {\n\tcase sum.A:\n\t}\n}\n";

fn tree(root: &Path) {
    write(root, "go.mod", "module example.com/m\n\ngo 1.22\n");
    write(root, "sum/sum.go", SUM);
    write(root, "app/app.go", USE);
    write(root, "app/app_test.go", "this is not parsed");
    write(root, "app/testdata/bad.go", "this is not parsed either");
    write(root, ".hidden/bad.go", "nor this");
}

#[test]
fn test_discovery_skips_tests_and_hidden_dirs() {
    let dir = tempdir().unwrap();
    tree(dir.path());
    assert_eq!(module_path(dir.path()).unwrap(), "example.com/m");
    let units = discover_units(dir.path(), "example.com/m").unwrap();
    let paths: Vec<_> = units.iter().map(|u| u.path.as_str()).collect();
    assert_eq!(paths, vec!["example.com/m/app", "example.com/m/sum"]);
    assert_eq!(units[0].files[0].display, "./app/app.go");
}

#[test]
fn test_check_tree_in_dependency_order() {
    let dir = tempdir().unwrap();
    tree(dir.path());
    let mut store = InMemoryFactStore::new("sumlint");
    let reports = check_tree(&AnalyzerConfig::sum(), dir.path(), None, &mut store).unwrap();

    let order: Vec<_> = reports.iter().map(|r| r.unit.as_str()).collect();
    assert_eq!(order, vec!["example.com/m/sum", "example.com/m/app"]);
    assert_eq!(
        render_vet(&reports),
        "# example.com/m/app\n\
         ./app/app.go:6:2: non-exhaustive type switch on SumFoo: missing cases for: example.com/m/sum.B\n\
         ./app/app.go:6:2: missing default case on SumFoo: code cannot handle nil interface\n"
    );
}

#[test]
fn test_module_override() {
    let dir = tempdir().unwrap();
    write(dir.path(), "sum/sum.go", SUM);
    write(
        dir.path(),
        "app/app.go",
        &USE.replace("example.com/m/sum", "other.org/x/sum"),
    );
    let mut store = InMemoryFactStore::new("sumlint");
    let reports =
        check_tree(&AnalyzerConfig::sum(), dir.path(), Some("other.org/x"), &mut store).unwrap();
    assert_eq!(reports.iter().filter(|r| !r.is_clean()).count(), 1);
}

#[test]
fn test_import_cycle_is_an_error() {
    let dir = tempdir().unwrap();
    write(dir.path(), "go.mod", "module m\n");
    write(dir.path(), "a/a.go", "package a\n\nimport \"m/b\"\n");
    write(dir.path(), "b/b.go", "package b\n\nimport \"m/a\"\n");
    let mut store = InMemoryFactStore::new("sumlint");
    let err = check_tree(&AnalyzerConfig::sum(), dir.path(), None, &mut store).unwrap_err();
    assert!(matches!(err, DriverError::ImportCycle(ref cycle) if cycle == "m/a -> m/b -> m/a"));
}

#[test]
fn test_parse_error_names_the_file() {
    let dir = tempdir().unwrap();
    write(dir.path(), "go.mod", "module m\n");
    write(dir.path(), "p/p.go", "package p\n\nfunc f( {\n");
    let mut store = InMemoryFactStore::new("sumlint");
    let err = check_tree(&AnalyzerConfig::sum(), dir.path(), None, &mut store).unwrap_err();
    assert!(matches!(err, DriverError::Parse { ref display, .. } if display == "./p/p.go"));
}

#[test]
fn test_mixed_package_names_are_an_error() {
    let dir = tempdir().unwrap();
    write(dir.path(), "go.mod", "module m\n");
    write(dir.path(), "p/a.go", "package a\n");
    write(dir.path(), "p/b.go", "package b\n");
    let mut store = InMemoryFactStore::new("sumlint");
    let err = check_tree(&AnalyzerConfig::sum(), dir.path(), None, &mut store).unwrap_err();
    assert!(matches!(err, DriverError::Type { ref unit, .. } if unit == "m/p"));
}

#[test]
fn test_empty_tree() {
    let dir = tempdir().unwrap();
    let mut store = InMemoryFactStore::new("sumlint");
    let err = check_tree(&AnalyzerConfig::sum(), dir.path(), Some("m"), &mut store).unwrap_err();
    assert!(matches!(err, DriverError::NoUnits(_)));
}

#[test]
fn test_persistent_facts() {
    let dir = tempdir().unwrap();
    tree(dir.path());
    let db = dir.path().join("target").join("facts.redb");
    {
        let mut store = RedbFactStore::open(&db, "sumlint").unwrap();
        check_tree(&AnalyzerConfig::sum(), dir.path(), None, &mut store).unwrap();
    }
    let store = RedbFactStore::open(&db, "sumlint").unwrap();
    let facts: Vec<_> = store.facts().unwrap().iter().map(ToString::to_string).collect();
    assert_eq!(facts, vec!["example.com/m/sum.A,example.com/m/sum.B"]);
}

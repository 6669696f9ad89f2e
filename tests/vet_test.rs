//! Whole-tree runs rendered the way `go vet` prints them

mod common;

use common::fixture_path;
use sumlint::facts::{FactStore, InMemoryFactStore, RedbFactStore};
use sumlint::AnalyzerConfig;
use sumlint_cli::driver::check_tree;
use sumlint_cli::report::render_vet;
use sumlint_cli::{run, Commands, Outcome};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn vet(config: AnalyzerConfig, fixture: &str) -> String {
    let mut store = InMemoryFactStore::new(config.name.clone());
    let reports = check_tree(&config, &fixture_path(fixture), None, &mut store)
        .unwrap_or_else(|e| panic!("{}: {}", fixture, e));
    render_vet(&reports)
}

#[test]
fn test_single_unit() {
    assert_eq!(
        vet(AnalyzerConfig::sum(), "single"),
        "# github.com/gomoni/sumlint/test\n\
         ./sum.go:23:2: missing default case on SumFoo: code cannot handle nil interface\n\
         ./sum.go:29:2: non-exhaustive type switch on SumFoo: missing cases for: github.com/gomoni/sumlint/test.B\n"
    );
}

#[test]
fn test_multi_unit_sumlint() {
    assert_eq!(
        vet(AnalyzerConfig::sum(), "multi"),
        "# github.com/gomoni/sumlint/test\n\
         ./sum.go:13:2: missing default case on SumFoo: code cannot handle nil interface\n\
         ./sum.go:19:2: non-exhaustive type switch on SumFoo: missing cases for: github.com/gomoni/sumlint/test/sum.B\n"
    );
}

#[test]
fn test_multi_unit_oneoflint() {
    assert_eq!(
        vet(AnalyzerConfig::oneof(), "multi"),
        "# github.com/gomoni/sumlint/test\n\
         ./oneof.go:16:2: missing default case on isMsg_Payload: code cannot handle nil interface\n\
         ./oneof.go:23:2: non-exhaustive type switch on isMsg_Payload: missing cases for: github.com/gomoni/sumlint/test/one_of.Msg_B\n"
    );
}

#[test]
fn test_repeated_runs_are_identical() {
    let first = vet(AnalyzerConfig::sum(), "multi");
    for _ in 0..5 {
        assert_eq!(vet(AnalyzerConfig::sum(), "multi"), first);
    }
}

#[test]
fn test_check_command_outcome() {
    let outcome = run(
        AnalyzerConfig::sum(),
        Commands::Check {
            root: fixture_path("single"),
            module: None,
            verbose: false,
            facts: None,
            pretty: false,
        },
    );
    assert_eq!(outcome, Outcome::Findings);

    let outcome = run(
        AnalyzerConfig::sum(),
        Commands::Check {
            root: fixture_path("analysis/exhaustive"),
            module: Some("exhaustive".to_string()),
            verbose: false,
            facts: None,
            pretty: false,
        },
    );
    assert_eq!(outcome, Outcome::Clean);
}

#[test]
fn test_check_command_failure() {
    let dir = TempDir::new().unwrap();
    let outcome = run(
        AnalyzerConfig::sum(),
        Commands::Check {
            root: dir.path().to_path_buf(),
            module: Some("m".to_string()),
            verbose: false,
            facts: None,
            pretty: false,
        },
    );
    assert_eq!(outcome, Outcome::Failed);
}

#[test]
fn test_persisted_facts_per_analyzer() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("facts.redb");

    for config in [AnalyzerConfig::sum(), AnalyzerConfig::oneof()] {
        let outcome = run(
            config,
            Commands::Check {
                root: fixture_path("multi"),
                module: None,
                verbose: false,
                facts: Some(db.clone()),
                pretty: false,
            },
        );
        assert_eq!(outcome, Outcome::Findings);
    }

    let sum = RedbFactStore::open(&db, "sumlint").unwrap();
    let facts: Vec<String> = sum.facts().unwrap().iter().map(|f| f.to_string()).collect();
    assert_eq!(
        facts,
        vec!["github.com/gomoni/sumlint/test/sum.A,github.com/gomoni/sumlint/test/sum.B"]
    );
    drop(sum);

    let oneof = RedbFactStore::open(&db, "oneoflint").unwrap();
    let facts = oneof.facts().unwrap();
    assert_eq!(facts.len(), 1);
    assert_eq!(facts[0].interface.name, "isMsg_Payload");
    assert_eq!(
        facts[0].to_string(),
        "github.com/gomoni/sumlint/test/one_of.Msg_A,github.com/gomoni/sumlint/test/one_of.Msg_B"
    );
    drop(oneof);

    let outcome = run(
        AnalyzerConfig::oneof(),
        Commands::Facts {
            facts: db,
            pretty: false,
        },
    );
    assert_eq!(outcome, Outcome::Clean);
}

fn check_with_db(root: &Path, db: &Path) -> Outcome {
    run(
        AnalyzerConfig::sum(),
        Commands::Check {
            root: root.to_path_buf(),
            module: Some("m".to_string()),
            verbose: false,
            facts: Some(db.to_path_buf()),
            pretty: false,
        },
    )
}

#[test]
fn test_removed_variants_do_not_outlive_their_unit() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("src");
    let db = dir.path().join("facts.redb");
    fs::create_dir_all(&root).unwrap();

    fs::write(
        root.join("a.go"),
        "package m\n\ntype SumFoo interface{ sumFoo() }\n\ntype A struct{}\n\nfunc (A) sumFoo() {}\n\ntype B struct{}\n\nfunc (B) sumFoo() {}\n\nfunc f(x SumFoo) {\n\tswitch x.(type) {\n\tcase A, B:\n\tdefault:\n\t}\n}\n",
    )
    .unwrap();
    assert_eq!(check_with_db(&root, &db), Outcome::Clean);

    // Both variants are gone; the switch keeps only its default arm
    fs::write(
        root.join("a.go"),
        "package m\n\ntype SumFoo interface{ sumFoo() }\n\nfunc f(x SumFoo) {\n\tswitch x.(type) {\n\tdefault:\n\t}\n}\n",
    )
    .unwrap();
    assert_eq!(check_with_db(&root, &db), Outcome::Clean);

    let store = RedbFactStore::open(&db, "sumlint").unwrap();
    assert!(store.facts().unwrap().is_empty());
}

#[test]
fn test_interface_that_stops_qualifying_drops_its_fact() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("src");
    let db = dir.path().join("facts.redb");
    fs::create_dir_all(root.join("sum")).unwrap();
    fs::create_dir_all(root.join("app")).unwrap();

    let decl = "package sum\n\ntype SumFoo interface{ sumFoo() }\n\ntype A struct{}\n\nfunc (A) sumFoo() {}\n";
    fs::write(root.join("sum/sum.go"), decl).unwrap();
    fs::write(
        root.join("app/app.go"),
        "package app\n\nimport \"m/sum\"\n\nfunc f(x sum.SumFoo) {\n\tswitch x.(type) {\n\tcase sum.A:\n\tdefault:\n\t}\n}\n",
    )
    .unwrap();
    assert_eq!(check_with_db(&root, &db), Outcome::Clean);

    // A second method makes SumFoo an ordinary interface
    fs::write(
        root.join("sum/sum.go"),
        decl.replace("{ sumFoo() }", "{\n\tsumFoo()\n\tString() string\n}")
            .replace("func (A) sumFoo() {}", "func (A) sumFoo() {}\n\nfunc (A) String() string { return \"a\" }"),
    )
    .unwrap();
    fs::write(
        root.join("app/app.go"),
        "package app\n\nimport \"m/sum\"\n\nfunc f(x sum.SumFoo) {\n\tswitch x.(type) {\n\tdefault:\n\t}\n}\n",
    )
    .unwrap();
    assert_eq!(check_with_db(&root, &db), Outcome::Clean);
}

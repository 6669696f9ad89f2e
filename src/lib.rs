//! sumlint - exhaustiveness checking for type switches over closed interfaces
//!
//! This is the root workspace crate that provides end-to-end tests.
//! The implementation lives in the workspace member crates:
//! - `sumlint-lexer`, `sumlint-parser`: source subset frontend
//! - `sumlint-types`: declarations, method sets and expression types
//! - `sumlint-facts`: implementor sets shared between units
//! - `sumlint-checker`: discovery, implementors and switch coverage
//! - `sumlint-cli`: the `sumlint` and `oneoflint` drivers

// Re-export main crates for convenience
pub use sumlint_ast as ast;
pub use sumlint_checker as checker;
pub use sumlint_facts as facts;
pub use sumlint_lexer as lexer;
pub use sumlint_parser as parser;
pub use sumlint_types as types;

pub use sumlint_checker::{analyze, AnalysisResult, AnalyzerConfig, Diagnostic};

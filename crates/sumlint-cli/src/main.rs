//! sumlint - exhaustive type switches over `Sum*` interfaces

use std::process::ExitCode;

use sumlint_checker::AnalyzerConfig;

fn main() -> ExitCode {
    sumlint_cli::main_with(AnalyzerConfig::sum())
}

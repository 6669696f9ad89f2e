//! oneoflint - exhaustive type switches over generated oneof wrappers

use std::process::ExitCode;

use sumlint_checker::AnalyzerConfig;

fn main() -> ExitCode {
    sumlint_cli::main_with(AnalyzerConfig::oneof())
}

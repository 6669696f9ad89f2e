//! Rendering diagnostics: vet-style lines or ariadne reports

use std::io;

use ariadne::{Color, Label, Report, ReportKind, Source};
use sumlint_ast::LineIndex;
use sumlint_parser::ParseError;

use crate::driver::UnitReport;

/// `# <unit>` followed by `./file.go:line:col: message` per diagnostic.
/// Clean units print nothing.
pub fn vet_lines(report: &UnitReport) -> Vec<String> {
    if report.is_clean() {
        return Vec::new();
    }
    let indexes: Vec<LineIndex> = report
        .files
        .iter()
        .map(|file| LineIndex::new(&file.source))
        .collect();

    let mut lines = vec![format!("# {}", report.unit)];
    for diagnostic in &report.diagnostics {
        let (Some(file), Some(index)) = (
            report.files.get(diagnostic.file),
            indexes.get(diagnostic.file),
        ) else {
            lines.push(diagnostic.to_string());
            continue;
        };
        let (line, col) = index.line_col(diagnostic.span.start);
        lines.push(format!("{}:{}:{}: {}", file.display, line, col, diagnostic));
    }
    lines
}

/// Vet output of a whole run, one line per entry
pub fn render_vet(reports: &[UnitReport]) -> String {
    let mut out = String::new();
    for line in reports.iter().flat_map(vet_lines) {
        out.push_str(&line);
        out.push('\n');
    }
    out
}

/// Print every diagnostic as an ariadne report on stderr
pub fn eprint_pretty(report: &UnitReport) -> io::Result<()> {
    for diagnostic in &report.diagnostics {
        let Some(file) = report.files.get(diagnostic.file) else {
            eprintln!("{}", diagnostic);
            continue;
        };
        let name = file.display.clone();
        let span = diagnostic.span;
        Report::build(ReportKind::Warning, name.clone(), span.start)
            .with_code(diagnostic.code())
            .with_message(diagnostic.message())
            .with_label(
                Label::new((name.clone(), span.start..span.end))
                    .with_message(diagnostic.label())
                    .with_color(Color::Yellow),
            )
            .finish()
            .eprint((name, Source::from(file.source.as_str())))?;
    }
    Ok(())
}

pub fn eprint_parse_error(display: &str, source: &str, error: &ParseError) -> io::Result<()> {
    let span = error.span();
    Report::build(ReportKind::Error, display.to_string(), span.start)
        .with_message(error.to_string())
        .with_label(
            Label::new((display.to_string(), span.start..span.end))
                .with_message(error.to_string())
                .with_color(Color::Red),
        )
        .finish()
        .eprint((display.to_string(), Source::from(source)))
}

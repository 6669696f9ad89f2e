//! Units of a source tree and the order they are analyzed in
//!
//! Every directory holding `.go` files is one unit. Units are analyzed so
//! that a unit always comes after the units it imports, which is what
//! makes facts exported by a producer visible to its consumers.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use sumlint_ast::SourceFile;
use sumlint_checker::{analyze, AnalyzerConfig, CheckError, Diagnostic};
use sumlint_facts::{FactError, FactStore};
use sumlint_parser::ParseError;
use sumlint_types::{check_package, TypeError, Universe};
use thiserror::Error;
use tracing::{debug, info};
use walkdir::{DirEntry, WalkDir};

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot walk source tree: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("{display}: {error}")]
    Parse {
        display: String,
        text: String,
        error: ParseError,
    },

    #[error("{unit}: {error}")]
    Type { unit: String, error: TypeError },

    #[error("import cycle not allowed: {0}")]
    ImportCycle(String),

    #[error("no Go source files under {}", .0.display())]
    NoUnits(PathBuf),

    #[error(transparent)]
    Facts(#[from] FactError),

    #[error(transparent)]
    Check(#[from] CheckError),
}

/// A source file of a unit
#[derive(Debug, Clone)]
pub struct UnitFile {
    pub path: PathBuf,
    /// Path relative to the tree root, as printed: `./dir/file.go`
    pub display: String,
    pub source: String,
}

/// One directory of source files, analyzed as a whole
#[derive(Debug, Clone)]
pub struct Unit {
    /// Import path: the module path joined with the relative directory
    pub path: String,
    pub files: Vec<UnitFile>,
    pub asts: Vec<SourceFile>,
}

impl Unit {
    /// Import paths used by any file of the unit
    pub fn imports(&self) -> BTreeSet<&str> {
        self.asts
            .iter()
            .flat_map(|file| file.imports.iter())
            .map(|import| import.path.as_str())
            .collect()
    }
}

/// Diagnostics of one analyzed unit, with the files they point into
#[derive(Debug, Clone)]
pub struct UnitReport {
    pub unit: String,
    pub files: Vec<UnitFile>,
    pub diagnostics: Vec<Diagnostic>,
}

impl UnitReport {
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// The module path of a tree: the `module` line of `go.mod` at its root,
/// otherwise the name of the root directory
pub fn module_path(root: &Path) -> Result<String, DriverError> {
    let go_mod = root.join("go.mod");
    if go_mod.is_file() {
        let text = read(&go_mod)?;
        if let Some(module) = parse_module_line(&text) {
            return Ok(module);
        }
    }
    let root = root.canonicalize().map_err(|source| DriverError::Io {
        path: root.to_path_buf(),
        source,
    })?;
    Ok(root
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default())
}

fn parse_module_line(go_mod: &str) -> Option<String> {
    go_mod.lines().find_map(|line| {
        let line = line.split("//").next().unwrap_or("").trim();
        let rest = line.strip_prefix("module")?;
        if !rest.starts_with(char::is_whitespace) {
            return None;
        }
        let module = rest.trim().trim_matches('"');
        (!module.is_empty()).then(|| module.to_string())
    })
}

fn read(path: &Path) -> Result<String, DriverError> {
    fs::read_to_string(path).map_err(|source| DriverError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn is_skipped_dir(entry: &DirEntry) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.') || name.starts_with('_') || name == "testdata"
}

fn is_source_file(entry: &DirEntry) -> bool {
    let name = entry.file_name().to_string_lossy();
    entry.file_type().is_file()
        && name.ends_with(".go")
        && !name.ends_with("_test.go")
        && !name.starts_with('.')
        && !name.starts_with('_')
}

fn slash_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Find and parse every unit under `root`, sorted by import path
pub fn discover_units(root: &Path, module: &str) -> Result<Vec<Unit>, DriverError> {
    let mut by_dir: BTreeMap<PathBuf, Vec<PathBuf>> = BTreeMap::new();
    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_skipped_dir(entry));
    for entry in walker {
        let entry = entry?;
        if !is_source_file(&entry) {
            continue;
        }
        let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
        let dir = relative.parent().map(Path::to_path_buf).unwrap_or_default();
        by_dir.entry(dir).or_default().push(entry.path().to_path_buf());
    }

    let mut units = Vec::with_capacity(by_dir.len());
    for (dir, paths) in by_dir {
        let unit_path = if dir.as_os_str().is_empty() {
            module.to_string()
        } else {
            format!("{}/{}", module, slash_path(&dir))
        };

        let mut files = Vec::with_capacity(paths.len());
        let mut asts = Vec::with_capacity(paths.len());
        for path in paths {
            let source = read(&path)?;
            let relative = path.strip_prefix(root).unwrap_or(&path);
            let display = format!("./{}", slash_path(relative));
            let ast = sumlint_parser::parse(&source).map_err(|error| DriverError::Parse {
                display: display.clone(),
                text: source.clone(),
                error,
            })?;
            asts.push(ast);
            files.push(UnitFile {
                path,
                display,
                source,
            });
        }
        debug!(unit = %unit_path, files = files.len(), "discovered unit");
        units.push(Unit {
            path: unit_path,
            files,
            asts,
        });
    }
    units.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(units)
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    InProgress,
    Done,
}

/// Depth-first topological sort over the imports between units
struct TopoSort<'a> {
    units: &'a [Unit],
    index: HashMap<&'a str, usize>,
    marks: Vec<Option<Mark>>,
    stack: Vec<usize>,
    order: Vec<usize>,
}

impl<'a> TopoSort<'a> {
    fn new(units: &'a [Unit]) -> Self {
        Self {
            units,
            index: units
                .iter()
                .enumerate()
                .map(|(i, unit)| (unit.path.as_str(), i))
                .collect(),
            marks: vec![None; units.len()],
            stack: Vec::new(),
            order: Vec::with_capacity(units.len()),
        }
    }

    fn visit(&mut self, i: usize) -> Result<(), DriverError> {
        match self.marks[i] {
            Some(Mark::Done) => return Ok(()),
            Some(Mark::InProgress) => {
                let start = self.stack.iter().position(|&j| j == i).unwrap_or(0);
                let mut cycle: Vec<&str> = self.stack[start..]
                    .iter()
                    .map(|&j| self.units[j].path.as_str())
                    .collect();
                cycle.push(self.units[i].path.as_str());
                return Err(DriverError::ImportCycle(cycle.join(" -> ")));
            }
            None => {}
        }

        self.marks[i] = Some(Mark::InProgress);
        self.stack.push(i);
        let units = self.units;
        for import in units[i].imports() {
            if let Some(&j) = self.index.get(import) {
                self.visit(j)?;
            }
        }
        self.stack.pop();
        self.marks[i] = Some(Mark::Done);
        self.order.push(i);
        Ok(())
    }
}

/// Order units so that every unit follows the units it imports
pub fn order_units(units: Vec<Unit>) -> Result<Vec<Unit>, DriverError> {
    let order = {
        let mut sort = TopoSort::new(&units);
        for i in 0..units.len() {
            sort.visit(i)?;
        }
        sort.order
    };

    let mut slots: Vec<Option<Unit>> = units.into_iter().map(Some).collect();
    Ok(order.into_iter().filter_map(|i| slots[i].take()).collect())
}

/// Analyze every unit under `root` in dependency order
pub fn check_tree(
    config: &AnalyzerConfig,
    root: &Path,
    module: Option<&str>,
    store: &mut dyn FactStore,
) -> Result<Vec<UnitReport>, DriverError> {
    let module = match module {
        Some(module) => module.to_string(),
        None => module_path(root)?,
    };
    let units = discover_units(root, &module)?;
    if units.is_empty() {
        return Err(DriverError::NoUnits(root.to_path_buf()));
    }
    let units = order_units(units)?;
    info!(module = %module, units = units.len(), "checking source tree");

    let mut universe = Universe::new();
    let mut reports = Vec::with_capacity(units.len());
    for unit in units {
        let info = check_package(&mut universe, &unit.path, &unit.asts).map_err(|error| {
            DriverError::Type {
                unit: unit.path.clone(),
                error,
            }
        })?;
        let result = analyze(config, &universe, &unit.path, &unit.asts, &info, &mut *store)?;
        debug!(
            unit = %unit.path,
            interfaces = result.interfaces.len(),
            sites = result.sites.len(),
            diagnostics = result.diagnostics.len(),
            "analyzed unit"
        );
        reports.push(UnitReport {
            unit: unit.path,
            files: unit.files,
            diagnostics: result.diagnostics,
        });
    }
    Ok(reports)
}

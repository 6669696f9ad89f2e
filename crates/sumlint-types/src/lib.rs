//! sumlint Types - type model for parsed units
//!
//! Resolves the declarations of a unit against the packages loaded so far,
//! attaches methods to their receiver types, and types the expressions of
//! every function body. The result is the read-only model the analyzers
//! consume: a `Universe` of packages with method sets, and a `TypeInfo`
//! mapping expressions and type expressions to their types.

mod body;
mod collect;
mod error;
mod info;
mod resolve;
mod scope;
mod types;
mod universe;

pub use error::*;
pub use info::*;
pub use types::*;
pub use universe::*;

use sumlint_ast::SourceFile;
use tracing::debug;

use crate::body::BodyChecker;
use crate::collect::collect_package;
use crate::resolve::UnitDecls;

/// Type-check the files of one unit and add its package to `universe`.
///
/// Imports resolve against packages already in the universe, so units must
/// be checked in dependency order. Imports of packages that were never
/// loaded are opaque.
pub fn check_package(
    universe: &mut Universe,
    path: &str,
    files: &[SourceFile],
) -> Result<TypeInfo, TypeError> {
    let decls = UnitDecls::collect(universe, path, files)?;
    let mut info = TypeInfo::new();

    let package = collect_package(universe, &decls, &mut info, files)?;
    debug!(
        unit = path,
        types = package.types.len(),
        funcs = package.funcs.len(),
        "collected package scope"
    );
    universe.insert(package);

    let inferred = BodyChecker::new(universe, &decls, &mut info).check(files)?;
    if let Some(package) = universe.package_mut(path) {
        package.vars.extend(inferred);
    }
    debug!(unit = path, exprs = info.expr_count(), "typed unit bodies");

    Ok(info)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sumlint_ast::{visit, Expr, ExprKind, StatementKind, TypeSwitchStmt};

    fn parse(source: &str) -> SourceFile {
        match sumlint_parser::parse(source) {
            Ok(file) => file,
            Err(err) => panic!("Failed to parse: {:?}", err),
        }
    }

    fn check(universe: &mut Universe, path: &str, source: &str) -> (SourceFile, TypeInfo) {
        let file = parse(source);
        let info = match check_package(universe, path, std::slice::from_ref(&file)) {
            Ok(info) => info,
            Err(err) => panic!("Failed to check: {:?}", err),
        };
        (file, info)
    }

    /// Subject type of every type switch in the file, in source order
    fn switch_subjects(file: &SourceFile, info: &TypeInfo) -> Vec<Option<Type>> {
        struct Collect<'a> {
            info: &'a TypeInfo,
            out: Vec<Option<Type>>,
        }
        impl visit::Visitor for Collect<'_> {
            fn visit_type_switch(&mut self, switch: &TypeSwitchStmt) {
                let subject = match &switch.guard.kind {
                    StatementKind::Expr(expr) => base(expr),
                    StatementKind::Define { values, .. } => values.first().and_then(base),
                    _ => None,
                };
                self.out
                    .push(subject.and_then(|e| self.info.type_of(0, e).cloned()));
                visit::walk_type_switch(self, switch);
            }
        }
        fn base(expr: &Expr) -> Option<&Expr> {
            match &expr.kind {
                ExprKind::TypeAssert { base, ty: None } => Some(base),
                _ => None,
            }
        }
        let mut collect = Collect {
            info,
            out: Vec::new(),
        };
        visit::walk_file(&mut collect, file);
        collect.out
    }

    fn named(package: &str, name: &str) -> Type {
        Type::Named(TypeName::new(package, name))
    }

    const SUM: &str = r#"
package sum

type SumFoo interface {
    sumFoo()
}

type A struct{}

func (A) sumFoo() {}

type B struct{ n int }

func (b *B) sumFoo() {}
"#;

    #[test]
    fn test_package_scope() {
        let mut universe = Universe::new();
        check(&mut universe, "example.com/sum", SUM);
        let package = universe.package("example.com/sum").expect("package");
        assert_eq!(package.name, "sum");
        assert_eq!(
            package.types.keys().cloned().collect::<Vec<_>>(),
            vec!["A", "B", "SumFoo"]
        );
        let b = &package.types["B"];
        assert!(b.methods[0].pointer_receiver);

        let iface = universe
            .interface_of(&named("example.com/sum", "SumFoo"))
            .cloned()
            .expect("interface");
        assert!(universe.implements(&named("example.com/sum", "A"), &iface));
        assert!(!universe.implements(&named("example.com/sum", "B"), &iface));
        assert!(universe.implements(&Type::pointer_to(named("example.com/sum", "B")), &iface));
    }

    #[test]
    fn test_switch_subject_types() {
        let mut universe = Universe::new();
        let (file, info) = check(
            &mut universe,
            "p",
            r#"
package p

type SumFoo interface{ sumFoo() }

type Box struct {
    Inner SumFoo
    items []SumFoo
    byKey map[string]SumFoo
}

func (b *Box) Get() SumFoo { return b.Inner }

func params(x SumFoo, p *SumFoo, box *Box) {
    switch x.(type) {
    }
    switch p.(type) {
    }
    switch box.Get().(type) {
    }
    switch v := box.Inner.(type) {
    default:
        _ = v
    }
    for _, item := range box.items {
        switch item.(type) {
        }
    }
    switch box.byKey["a"].(type) {
    }
    y := box.items[0]
    switch y.(type) {
    }
}
"#,
        );
        let iface = named("p", "SumFoo");
        assert_eq!(
            switch_subjects(&file, &info),
            vec![
                Some(iface.clone()),
                Some(Type::pointer_to(iface.clone())),
                Some(iface.clone()),
                Some(iface.clone()),
                Some(iface.clone()),
                Some(iface.clone()),
                Some(iface),
            ]
        );
        assert!(info.uses().any(|name| name.name == "SumFoo"));
    }

    #[test]
    fn test_cross_package_method_call() {
        let mut universe = Universe::new();
        check(
            &mut universe,
            "example.com/one_of",
            r#"
package one_of

type isMsg_Payload interface {
    isMsg_Payload()
}

type Msg struct {
    Payload isMsg_Payload
}

func (m *Msg) GetPayload() isMsg_Payload {
    if m != nil {
        return m.Payload
    }
    return nil
}

type Msg_A struct{ A string }

func (*Msg_A) isMsg_Payload() {}
"#,
        );
        let (file, info) = check(
            &mut universe,
            "example.com/test",
            r#"
package test

import "example.com/one_of"

func handle(msg *one_of.Msg) {
    switch msg.GetPayload().(type) {
    case *one_of.Msg_A:
    default:
    }
}
"#,
        );
        assert_eq!(
            switch_subjects(&file, &info),
            vec![Some(named("example.com/one_of", "isMsg_Payload"))]
        );
        assert!(info.uses().any(|n| n.name == "Msg_A"));
        assert!(!info.uses().any(|n| n.name == "isMsg_Payload"));
    }

    #[test]
    fn test_opaque_import() {
        let mut universe = Universe::new();
        let (file, info) = check(
            &mut universe,
            "p",
            "package p\n\nimport \"fmt\"\n\nfunc f(s fmt.Stringer) {\n\tswitch s.(type) {\n\t}\n}\n",
        );
        let subjects = switch_subjects(&file, &info);
        assert_eq!(subjects, vec![Some(named("fmt", "Stringer"))]);
        let opaque = named("fmt", "Stringer");
        assert!(!universe.is_interface(&opaque));
    }

    #[test]
    fn test_inferred_package_var() {
        let mut universe = Universe::new();
        check(
            &mut universe,
            "p",
            "package p\ntype A struct{}\nvar current = &A{}\nvar n, ok = lookup()\nfunc lookup() (int, bool) { return 0, false }\n",
        );
        let package = universe.package("p").expect("package");
        assert_eq!(package.vars.get("current"), Some(&Type::pointer_to(named("p", "A"))));
        assert_eq!(package.vars.get("ok"), Some(&Type::Basic(BasicKind::Bool)));
    }

    #[test]
    fn test_undefined_type_is_error() {
        let mut universe = Universe::new();
        let file = parse("package p\nfunc f(x Missing) {}\n");
        let err = check_package(&mut universe, "p", &[file]).unwrap_err();
        assert!(matches!(err, TypeError::UndefinedName { ref name, .. } if name == "Missing"));
    }

    #[test]
    fn test_duplicate_declaration() {
        let mut universe = Universe::new();
        let file = parse("package p\ntype A struct{}\nfunc A() {}\n");
        let err = check_package(&mut universe, "p", &[file]).unwrap_err();
        assert!(matches!(err, TypeError::DuplicateDecl { .. }));
    }

    #[test]
    fn test_invalid_receiver() {
        let mut universe = Universe::new();
        let file = parse("package p\ntype I interface{ m() }\nfunc (I) m() {}\n");
        let err = check_package(&mut universe, "p", &[file]).unwrap_err();
        assert!(matches!(err, TypeError::InvalidReceiver { .. }));
    }

    #[test]
    fn test_package_mismatch() {
        let mut universe = Universe::new();
        let files = [parse("package a\n"), parse("package b\n")];
        let err = check_package(&mut universe, "p", &files).unwrap_err();
        assert!(matches!(err, TypeError::PackageMismatch { .. }));
    }

    #[test]
    fn test_alias_resolves_to_target() {
        let mut universe = Universe::new();
        check(&mut universe, "example.com/sum", SUM);
        check(
            &mut universe,
            "q",
            "package q\nimport \"example.com/sum\"\ntype Foo = sum.SumFoo\n",
        );
        let package = universe.package("q").expect("package");
        assert_eq!(
            package.lookup_type("Foo"),
            Some(named("example.com/sum", "SumFoo"))
        );
    }
}

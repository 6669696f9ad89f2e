//! sumlint Parser - Recursive descent parser
//!
//! Parses Go source files into the `sumlint-ast` syntax tree.
//! Parsing notes:
//! - Statement separators come from the lexer's implicit semicolons
//! - `T {` inside an `if`/`for`/`switch` header opens the body, not a
//!   composite literal
//! - A switch whose guard is `x.(type)` is parsed as a type switch with
//!   type lists in its case clauses

mod error;
mod parser;

pub use error::*;
pub use parser::*;

use sumlint_ast::SourceFile;
use sumlint_lexer::tokenize;

/// Parse a source string into a SourceFile AST
pub fn parse(source: &str) -> Result<SourceFile, ParseError> {
    let tokens = tokenize(source);
    let mut parser = Parser::new(source, tokens);
    parser.parse_file()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sumlint_ast::*;

    fn parse_ok(source: &str) -> SourceFile {
        match parse(source) {
            Ok(file) => file,
            Err(err) => panic!("Failed to parse: {:?}", err),
        }
    }

    fn first_func_body(file: &SourceFile) -> &Block {
        file.funcs()
            .find_map(|f| f.body.as_ref())
            .expect("function with body")
    }

    #[test]
    fn test_parse_package_and_imports() {
        let file = parse_ok(
            r#"
package lint

import "fmt"

import (
    sum "github.com/gomoni/sumlint/test"
    "os"
)
"#,
        );
        assert_eq!(file.package.name, "lint");
        assert_eq!(file.imports.len(), 3);
        assert_eq!(file.imports[0].path, "fmt");
        assert_eq!(file.imports[1].alias.as_ref().map(|a| a.name.as_str()), Some("sum"));
        assert_eq!(file.imports[1].path, "github.com/gomoni/sumlint/test");
    }

    #[test]
    fn test_block_comments() {
        let file = parse_ok(
            "/*\n * Code generated by protoc-gen-go. DO NOT EDIT.\n */\n\npackage one_of\n\ntype isMsg_Payload interface { /* oneof */\n\tisMsg_Payload()\n}\n",
        );
        assert_eq!(file.package.name, "one_of");
        assert_eq!(file.type_specs().count(), 1);
    }

    #[test]
    fn test_parse_sum_interface() {
        let file = parse_ok(
            r#"
package sum

type SumFoo interface {
    sumFoo()
}

type A struct{}

func (A) sumFoo() {}

type B struct {
    name string
}

func (b *B) sumFoo() {}
"#,
        );
        let specs: Vec<_> = file.type_specs().collect();
        assert_eq!(specs.len(), 3);
        match &specs[0].ty.kind {
            TypeExprKind::Interface(elems) => {
                assert_eq!(elems.len(), 1);
                match &elems[0] {
                    InterfaceElem::Method { name, sig, .. } => {
                        assert_eq!(name.name, "sumFoo");
                        assert!(sig.params.is_empty());
                        assert!(sig.results.is_empty());
                    }
                    other => panic!("expected method, got {:?}", other),
                }
            }
            other => panic!("expected interface, got {:?}", other),
        }

        let methods: Vec<_> = file.funcs().collect();
        assert_eq!(methods.len(), 2);
        let recv = methods[1].receiver.as_ref().expect("receiver");
        assert!(matches!(recv.ty.kind, TypeExprKind::Pointer(_)));
        assert_eq!(recv.name.as_ref().map(|n| n.name.as_str()), Some("b"));
        assert!(methods[0].receiver.as_ref().is_some_and(|r| r.name.is_none()));
    }

    #[test]
    fn test_parse_grouped_params() {
        let file = parse_ok("package p\nfunc f(a, b int, s ...string) (n int, err error) { return }\n");
        let func = file.funcs().next().expect("func");
        let names: Vec<_> = func
            .sig
            .params
            .iter()
            .map(|p| p.name.as_ref().map(|n| n.name.clone()))
            .collect();
        assert_eq!(
            names,
            vec![Some("a".into()), Some("b".into()), Some("s".into())]
        );
        assert!(func.sig.params[2].variadic);
        assert_eq!(func.sig.results.len(), 2);
    }

    #[test]
    fn test_parse_unnamed_params() {
        let file = parse_ok("package p\nfunc f(int, fmt.Stringer) error { return nil }\n");
        let func = file.funcs().next().expect("func");
        assert!(func.sig.params.iter().all(|p| p.name.is_none()));
        assert!(matches!(
            func.sig.params[1].ty.kind,
            TypeExprKind::Qualified { .. }
        ));
        assert_eq!(func.sig.results.len(), 1);
    }

    #[test]
    fn test_parse_type_switch_forms() {
        let file = parse_ok(
            r#"
package p

func f(x SumFoo) {
    switch x.(type) {
    case A, *B:
    case nil:
    default:
    }
    switch v := x.(type) {
    case sum.A:
        _ = v
    }
    switch y := x; y.(type) {
    }
}
"#,
        );
        let body = first_func_body(&file);
        let switches: Vec<_> = body
            .statements
            .iter()
            .filter_map(|s| match &s.kind {
                StatementKind::TypeSwitch(ts) => Some(ts),
                _ => None,
            })
            .collect();
        assert_eq!(switches.len(), 3);

        let first = switches[0];
        assert_eq!(first.clauses.len(), 3);
        assert!(first.clauses[2].is_default());
        let types = first.clauses[0].types.as_ref().expect("types");
        assert!(matches!(types[1].kind, TypeExprKind::Pointer(_)));
        assert!(matches!(first.guard.kind, StatementKind::Expr(_)));

        assert!(matches!(switches[1].guard.kind, StatementKind::Define { .. }));
        assert!(switches[2].init.is_some());
    }

    #[test]
    fn test_parenthesized_guard_forms() {
        let file = parse_ok("package p\nfunc f(x T) {\n\tswitch (x).(type) {\n\t}\n}\n");
        let body = first_func_body(&file);
        assert!(matches!(body.statements[0].kind, StatementKind::TypeSwitch(_)));

        let err = parse("package p\nfunc f(x T) {\n\tswitch (x.(type)) {\n\t}\n}\n").unwrap_err();
        assert!(matches!(err, ParseError::InvalidExpression { .. }));
    }

    #[test]
    fn test_switch_keyword_span() {
        let source = "package p\nfunc f(x T) {\n\tswitch x.(type) {\n\t}\n}\n";
        let file = parse_ok(source);
        let body = first_func_body(&file);
        let StatementKind::TypeSwitch(ts) = &body.statements[0].kind else {
            panic!("expected type switch");
        };
        assert_eq!(&source[ts.keyword.start..ts.keyword.end], "switch");
        let index = LineIndex::new(source);
        assert_eq!(index.line_col(ts.keyword.start), (3, 2));
    }

    #[test]
    fn test_parse_expression_switch() {
        let file = parse_ok(
            "package p\nfunc f(n int) {\n\tswitch {\n\tcase n > 1:\n\tdefault:\n\t}\n}\n",
        );
        let body = first_func_body(&file);
        assert!(matches!(
            body.statements[0].kind,
            StatementKind::Switch { tag: None, .. }
        ));
    }

    #[test]
    fn test_composite_literal_in_header_is_body() {
        let file = parse_ok(
            r#"
package p

func f(xs []A) {
    for _, x := range xs {
        if x == nil {
        }
    }
    for i := 0; i < 10; i++ {
    }
    y := []A{A{}, {}}
    m := map[string]int{"a": 1}
    _, _ = y, m
}
"#,
        );
        let body = first_func_body(&file);
        assert!(matches!(body.statements[0].kind, StatementKind::Range { define: true, .. }));
        assert!(matches!(body.statements[1].kind, StatementKind::For { .. }));
        match &body.statements[2].kind {
            StatementKind::Define { values, .. } => match &values[0].kind {
                ExprKind::Composite { elements, ty } => {
                    assert!(ty.is_some());
                    assert_eq!(elements.len(), 2);
                }
                other => panic!("expected composite, got {:?}", other),
            },
            other => panic!("expected define, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_method_chain_and_func_lit() {
        let file = parse_ok(
            r#"
package p

var handler = func(m *Msg) {
    switch m.GetPayload().(type) {
    }
}
"#,
        );
        let DeclarationKind::Var(spec) = &file.declarations[0].kind else {
            panic!("expected var");
        };
        assert!(matches!(spec.values[0].kind, ExprKind::FuncLit { .. }));
    }

    #[test]
    fn test_binary_precedence() {
        let file = parse_ok("package p\nvar x = a || b && c == d + e * f\n");
        let DeclarationKind::Var(spec) = &file.declarations[0].kind else {
            panic!("expected var");
        };
        match &spec.values[0].kind {
            ExprKind::Binary { op, right, .. } => {
                assert_eq!(*op, BinaryOp::Or);
                assert!(matches!(right.kind, ExprKind::Binary { op: BinaryOp::And, .. }));
            }
            other => panic!("expected binary, got {:?}", other),
        }
    }

    #[test]
    fn test_local_var_group() {
        let file = parse_ok("package p\nfunc f() {\n\tvar (\n\t\ta int\n\t\tb = 2\n\t)\n}\n");
        let body = first_func_body(&file);
        assert_eq!(body.statements.len(), 2);
        assert!(body
            .statements
            .iter()
            .all(|s| matches!(s.kind, StatementKind::Var(_))));
    }

    #[test]
    fn test_struct_fields_and_embedding() {
        let file = parse_ok(
            "package p\ntype T struct {\n\tsync.Mutex\n\t*Base\n\ta, b int `json:\"a\"`\n}\n",
        );
        let spec = file.type_specs().next().expect("type");
        let TypeExprKind::Struct(fields) = &spec.ty.kind else {
            panic!("expected struct");
        };
        assert_eq!(fields.len(), 3);
        assert!(fields[0].is_embedded());
        assert!(fields[1].is_embedded());
        assert_eq!(fields[2].names.len(), 2);
        assert!(fields[2].tag.is_some());
    }

    #[test]
    fn test_alias_declaration() {
        let file = parse_ok("package p\ntype Alias = sum.SumFoo\n");
        let spec = file.type_specs().next().expect("type");
        assert!(spec.is_alias);
    }

    #[test]
    fn test_unsupported_generics() {
        let err = parse("package p\ntype List[T any] struct{}\n").unwrap_err();
        assert!(matches!(err, ParseError::Unsupported { .. }));
    }

    #[test]
    fn test_missing_brace_is_error() {
        let err = parse("package p\nfunc f() {\n").unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedEof { .. }));
    }

    #[test]
    fn test_ast_serializes() {
        let file = parse_ok("package p\ntype S interface{ sumS() }\n");
        let json = serde_json::to_string(&file).expect("serialize");
        assert!(json.contains("sumS"));
    }
}

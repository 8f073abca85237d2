//! # tsdual Parser
//!
//! Recursive descent parser for TypeScript modules. Expressions use
//! precedence climbing; type annotations are recognised structurally and
//! captured as source text.

use tsdual_ast::*;
use tsdual_lexer::{Lexer, Token, TokenKind};

// Module declarations
mod error;
mod parser;
mod expr;
mod stmt;
mod types;
mod decl;
mod pattern;
mod helpers;

// Re-export public types
pub use error::{ParseError, ParseResult};
pub use parser::Parser;

use helpers::parse_number_value;

/// Tokenizes and parses `source` as a module.
pub fn parse_source(source: &str, file_id: usize) -> Result<Program, Vec<ParseError>> {
    let tokens = Lexer::with_file_id(source, file_id).tokenize();
    Parser::with_source(tokens, source).parse_program()
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> Result<Program, Vec<ParseError>> {
        parse_source(source, 0)
    }

    fn first_stmt(program: &Program) -> &Stmt {
        match &program.items[0].value {
            ModuleItem::Stmt(stmt) => stmt,
            other => panic!("expected statement, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_variable_declaration() {
        let program = parse("let x: number = 42;").unwrap();
        assert_eq!(program.items.len(), 1);
        match first_stmt(&program) {
            Stmt::Decl(Decl::Var(decl)) => {
                assert_eq!(decl.kind, VarDeclKind::Let);
                let declarator = &decl.declarations[0];
                assert_eq!(declarator.type_annotation.as_ref().unwrap().value.text, "number");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_parse_function_declaration() {
        let source = "function add(a: number, b: number): number { return a + b; }";
        let program = parse(source).unwrap();
        match first_stmt(&program) {
            Stmt::Decl(Decl::Function(decl)) => {
                assert_eq!(decl.name.value.name, "add");
                assert_eq!(decl.function.params.len(), 2);
                assert!(decl.function.body.is_some());
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_parse_overload_signature_has_no_body() {
        let program = parse("function f(a: string): void;\nfunction f(a: any) {}").unwrap();
        assert_eq!(program.items.len(), 2);
        match first_stmt(&program) {
            Stmt::Decl(decl) => assert!(decl.is_type_only()),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_parse_arrow_function() {
        let program = parse("const add = (a: number, b: number): number => a + b;").unwrap();
        let Stmt::Decl(Decl::Var(decl)) = first_stmt(&program) else {
            panic!("expected variable declaration");
        };
        match &decl.declarations[0].init.as_ref().unwrap().value {
            Expr::Arrow { params, return_type, .. } => {
                assert_eq!(params.len(), 2);
                assert_eq!(return_type.as_ref().unwrap().value.text, "number");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_parenthesized_expression_is_not_arrow() {
        let program = parse("const x = (a + b) * c;").unwrap();
        let Stmt::Decl(Decl::Var(decl)) = first_stmt(&program) else {
            panic!("expected variable declaration");
        };
        assert!(matches!(
            decl.declarations[0].init.as_ref().unwrap().value,
            Expr::Binary { op: BinaryOp::Mul, .. }
        ));
    }

    #[test]
    fn test_parse_class_declaration() {
        let source = r#"
            class Point {
                x: number;
                static origin = new Point(0, 0);

                constructor(public y: number, private readonly z = 1) {
                    this.x = y;
                }

                get length(): number { return 0; }
            }
        "#;
        let program = parse(source).unwrap();
        let Stmt::Decl(Decl::Class(decl)) = first_stmt(&program) else {
            panic!("expected class");
        };
        assert_eq!(decl.class.members.len(), 4);
        match &decl.class.members[2] {
            ClassMember::Constructor { params, .. } => {
                assert!(params.iter().all(Param::is_parameter_property));
                assert_eq!(params[1].simple_name(), Some("z"));
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(
            decl.class.members[3],
            ClassMember::Method { kind: MethodKind::Getter, .. }
        ));
    }

    #[test]
    fn test_parse_class_implements_clause() {
        let class_of = |source: &str| -> Class {
            let program = parse(source).unwrap();
            match &program.items[0].value {
                ModuleItem::Stmt(Stmt::Decl(Decl::Class(decl))) => decl.class.clone(),
                ModuleItem::Export(ExportDecl::Decl(decl)) => match &decl.value {
                    Decl::Class(decl) => decl.class.clone(),
                    other => panic!("unexpected {:?}", other),
                },
                other => panic!("unexpected {:?}", other),
            }
        };

        assert_eq!(class_of("class C implements I {}").implements.len(), 1);

        let abstract_class = class_of("abstract class C implements I {}");
        assert!(abstract_class.is_abstract);
        assert_eq!(abstract_class.implements.len(), 1);

        let derived = class_of("class D extends B implements I, J {}");
        assert!(derived.extends.is_some());
        assert_eq!(derived.implements.len(), 2);

        let exported = class_of("export class E implements I { x = 1; }");
        assert_eq!(exported.implements.len(), 1);
        assert_eq!(exported.members.len(), 1);

        let program = parse("const K = class implements I {};").unwrap();
        let Stmt::Decl(Decl::Var(decl)) = first_stmt(&program) else {
            panic!("expected variable declaration");
        };
        match &decl.declarations[0].init.as_ref().unwrap().value {
            Expr::Class { name, class } => {
                assert!(name.is_none());
                assert_eq!(class.implements.len(), 1);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_parse_interface_declaration() {
        let source = "interface Shape<T> extends Base { area(): number; readonly name: T }";
        let program = parse(source).unwrap();
        match first_stmt(&program) {
            Stmt::Decl(Decl::Interface(decl)) => {
                assert_eq!(decl.name.value.name, "Shape");
                assert_eq!(decl.text, source);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_parse_import_export() {
        let source = r#"
            import def, { a, type B, c as d } from "./mod";
            import * as ns from "./ns";
            import type { T } from "./types";
            import fs = require("fs");
            export { a, d as e };
            export * from "./all";
            export * as group from "./group";
            export default def;
        "#;
        let program = parse(source).unwrap();
        assert_eq!(program.items.len(), 8);

        match &program.items[0].value {
            ModuleItem::Import(import) => {
                assert_eq!(import.source, "./mod");
                assert_eq!(import.specifiers.len(), 4);
                assert!(matches!(
                    &import.specifiers[2],
                    ImportSpecifier::Named { type_only: true, .. }
                ));
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(&program.items[2].value, ModuleItem::Import(i) if i.type_only));
        assert!(matches!(
            &program.items[3].value,
            ModuleItem::ImportEquals(ImportEqualsDecl {
                reference: ModuleReference::External(_),
                ..
            })
        ));
        assert!(matches!(
            &program.items[6].value,
            ModuleItem::Export(ExportDecl::All { as_name: Some(_), .. })
        ));
        assert!(matches!(&program.items[7].value, ModuleItem::Export(ExportDecl::Default(_))));
    }

    #[test]
    fn test_parse_anonymous_default_export() {
        let program = parse("export default function () { return 1; }").unwrap();
        match &program.items[0].value {
            ModuleItem::Export(ExportDecl::DefaultDecl { decl, anonymous }) => {
                assert!(*anonymous);
                assert!(matches!(&decl.value, Decl::Function(f) if f.name.value.name == "default_1"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_parse_export_assignment() {
        let program = parse("const x = 1;\nexport = x;").unwrap();
        assert!(matches!(
            &program.items[1].value,
            ModuleItem::Export(ExportDecl::Assignment(_))
        ));
    }

    #[test]
    fn test_parse_enum_and_namespace() {
        let source = r#"
            export const enum Flags { A = 1 << 0, B = 1 << 1, "C D" = A | B }
            export namespace Outer.Inner { export const x = 1; }
            declare module "ambient" { export const y: number; }
        "#;
        let program = parse(source).unwrap();
        match &program.items[0].value {
            ModuleItem::Export(ExportDecl::Decl(decl)) => match &decl.value {
                Decl::Enum(e) => {
                    assert!(e.is_const);
                    assert_eq!(e.members.len(), 3);
                    assert_eq!(e.members[2].name.value.name, "C D");
                }
                other => panic!("unexpected {:?}", other),
            },
            other => panic!("unexpected {:?}", other),
        }
        match &program.items[1].value {
            ModuleItem::Export(ExportDecl::Decl(decl)) => match &decl.value {
                Decl::Module(m) => {
                    assert!(matches!(m.body, Some(ModuleBody::Namespace(_))));
                    assert!(m.is_instantiated());
                }
                other => panic!("unexpected {:?}", other),
            },
            other => panic!("unexpected {:?}", other),
        }
        match &program.items[2].value {
            ModuleItem::Stmt(Stmt::Decl(decl)) => assert!(decl.is_type_only()),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_parse_control_flow() {
        let source = r#"
            for (let i = 0; i < 10; i++) { if (i % 2) continue; }
            for (const key in obj) {}
            for (const [k, v] of entries) {}
            for (x of xs) {}
            outer: while (true) { break outer; }
            do { n--; } while (n > 0)
            switch (n) { case 1: case 2: f(); break; default: g(); }
            try { risky(); } catch (e: unknown) { log(e); } finally { done(); }
        "#;
        let program = parse(source).unwrap();
        assert_eq!(program.items.len(), 8);
        assert!(matches!(
            &program.items[2].value,
            ModuleItem::Stmt(Stmt::ForOf { left: ForInLeft::VarDecl(_), .. })
        ));
        assert!(matches!(
            &program.items[3].value,
            ModuleItem::Stmt(Stmt::ForOf { left: ForInLeft::Pattern(_), .. })
        ));
    }

    #[test]
    fn test_parse_for_in_head_with_in_operator() {
        let program = parse("for (let i = ('a' in o) ? 1 : 0; i < 2; i++) {}").unwrap();
        assert!(matches!(first_stmt(&program), Stmt::For { .. }));
    }

    #[test]
    fn test_parse_optional_chaining() {
        let program = parse("a?.b?.[c]?.(d); e!.f;").unwrap();
        match first_stmt(&program) {
            Stmt::Expr(expr) => assert!(matches!(expr.value, Expr::OptionalCall { .. })),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_parse_generic_call_and_comparison() {
        let program = parse("const a = f<string>(x);\nconst b = x < y && y > z;").unwrap();
        let Stmt::Decl(Decl::Var(first)) = first_stmt(&program) else {
            panic!("expected declaration");
        };
        assert!(matches!(
            first.declarations[0].init.as_ref().unwrap().value,
            Expr::Call { type_args: Some(_), .. }
        ));
        let ModuleItem::Stmt(Stmt::Decl(Decl::Var(second))) = &program.items[1].value else {
            panic!("expected declaration");
        };
        assert!(matches!(
            second.declarations[0].init.as_ref().unwrap().value,
            Expr::Binary { op: BinaryOp::And, .. }
        ));
    }

    #[test]
    fn test_parse_nested_generic_type() {
        let program = parse("let m: Map<string, Array<number>> = new Map();").unwrap();
        let Stmt::Decl(Decl::Var(decl)) = first_stmt(&program) else {
            panic!("expected declaration");
        };
        assert_eq!(
            decl.declarations[0].type_annotation.as_ref().unwrap().value.text,
            "Map<string, Array<number>>"
        );
    }

    #[test]
    fn test_parse_satisfies_and_as_const() {
        let program = parse("const c = { a: 1 } satisfies Record<string, number>;\nconst d = [1] as const;").unwrap();
        let Stmt::Decl(Decl::Var(decl)) = first_stmt(&program) else {
            panic!("expected declaration");
        };
        assert!(matches!(
            decl.declarations[0].init.as_ref().unwrap().value,
            Expr::Satisfies { .. }
        ));
    }

    #[test]
    fn test_parse_templates_and_dynamic_import() {
        let source = "const s = tag`a${b}c${d}e`;\nconst m = import(`./${name}`);\nconst u = import.meta.url;";
        let program = parse(source).unwrap();
        assert_eq!(program.items.len(), 3);
        let ModuleItem::Stmt(Stmt::Decl(Decl::Var(decl))) = &program.items[1].value else {
            panic!("expected declaration");
        };
        assert!(matches!(
            decl.declarations[0].init.as_ref().unwrap().value,
            Expr::DynamicImport(_)
        ));
    }

    #[test]
    fn test_parse_object_literal_members() {
        let source = "const o = { a, b: 1, [k]: 2, ...rest, get g() { return 1; }, async *m() {}, 'q': 3 };";
        let program = parse(source).unwrap();
        let Stmt::Decl(Decl::Var(decl)) = first_stmt(&program) else {
            panic!("expected declaration");
        };
        match &decl.declarations[0].init.as_ref().unwrap().value {
            Expr::Object(properties) => assert_eq!(properties.len(), 7),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_parse_using_declaration() {
        let program = parse("using res = open();\nawait using conn = connect();").unwrap();
        assert!(matches!(
            first_stmt(&program),
            Stmt::Decl(Decl::Var(VarDecl { kind: VarDeclKind::Using, .. }))
        ));
        assert!(matches!(
            &program.items[1].value,
            ModuleItem::Stmt(Stmt::Decl(Decl::Var(VarDecl { kind: VarDeclKind::AwaitUsing, .. })))
        ));
    }

    #[test]
    fn test_parse_decorators() {
        let program = parse("@Component({ selector: 'x' })\nclass Widget { @Input() name: string; }").unwrap();
        let Stmt::Decl(Decl::Class(decl)) = first_stmt(&program) else {
            panic!("expected class");
        };
        assert_eq!(decl.class.decorators.len(), 1);
        assert_eq!(decl.class.members[0].decorators().len(), 1);
    }

    #[test]
    fn test_contextual_keywords_as_identifiers() {
        let source = "const type = 1;\nlet namespace = type + 1;\ndeclare(namespace);\nmodule.exports = 1;";
        let program = parse(source).unwrap();
        assert_eq!(program.items.len(), 4);
        assert!(matches!(
            &program.items[2].value,
            ModuleItem::Stmt(Stmt::Expr(Node { value: Expr::Call { .. }, .. }))
        ));
    }

    #[test]
    fn test_asi_return() {
        let program = parse("function f() {\n  return\n  1;\n}").unwrap();
        let Stmt::Decl(Decl::Function(decl)) = first_stmt(&program) else {
            panic!("expected function");
        };
        let body = decl.function.body.as_ref().unwrap();
        assert!(matches!(body.value.stmts[0].value, Stmt::Return(None)));
    }

    #[test]
    fn test_syntax_error_reports_code() {
        let errors = parse("const = ;").unwrap_err();
        assert_eq!(errors[0].code, 1003);

        let errors = parse("const s = 'open").unwrap_err();
        assert_eq!(errors[0].code, 1002);
    }
}

//! ES module lowering: import and export syntax is kept, TypeScript-only
//! parts of it are erased.

use std::collections::HashSet;

use tsdual_ast::factory::{expr_stmt, string, var_stmt};
use tsdual_ast::visit::VisitMut;
use tsdual_ast::*;

use crate::rename::NameUsage;
use crate::scan::ModuleScan;
use crate::strip::{hoisted_names, Stripper};
use crate::{EmitDiagnostic, LowerOptions, Lowered};

pub(crate) fn lower_es_module(program: Program, options: &LowerOptions) -> Lowered {
    let is_module = program.is_module();
    let scan = ModuleScan::new(&program.items);
    let mut stripper = Stripper::new(options);
    let mut declared = hoisted_names(program.items.iter().filter_map(|item| match &item.value {
        ModuleItem::Stmt(Stmt::Decl(decl)) => Some(decl),
        ModuleItem::Export(ExportDecl::Decl(decl)) => Some(&decl.value),
        _ => None,
    }));

    let mut lowered: Vec<Node<ModuleItem>> = Vec::new();
    for item in program.items {
        lower_item(item, &scan, &mut stripper, &mut declared, &mut lowered);
    }

    let usage = collect_usage(&lowered);
    let mut items: Vec<Node<ModuleItem>> = lowered
        .into_iter()
        .filter_map(|item| elide_unused(item, &usage))
        .collect();

    let keeps_module_syntax = items
        .iter()
        .any(|item| matches!(item.value, ModuleItem::Import(_) | ModuleItem::Export(_)));
    if is_module && !keeps_module_syntax {
        items.push(Node::synthetic(ModuleItem::Export(ExportDecl::Named {
            specifiers: Vec::new(),
            source: None,
            type_only: false,
        })));
    }
    if !is_module && options.always_strict {
        let has_directive = items.first().is_some_and(|item| {
            matches!(&item.value, ModuleItem::Stmt(stmt) if stmt.directive() == Some("use strict"))
        });
        if !has_directive {
            items.insert(0, factory::item(expr_stmt(string("use strict"))));
        }
    }

    Lowered {
        program: Program {
            items,
            span: program.span,
        },
        diagnostics: stripper.diagnostics,
    }
}

fn lower_item(
    item: Node<ModuleItem>,
    scan: &ModuleScan,
    stripper: &mut Stripper<'_>,
    declared: &mut HashSet<String>,
    out: &mut Vec<Node<ModuleItem>>,
) {
    let span = item.span;
    match item.value {
        ModuleItem::Import(import) => {
            if !import.type_only {
                out.push(Node::new(ModuleItem::Import(import), span));
            }
        }
        ModuleItem::ImportEquals(decl) => {
            if decl.type_only {
                return;
            }
            match decl.reference {
                ModuleReference::External(_) => stripper.diagnostics.push(EmitDiagnostic::new(
                    "Import assignment cannot be used when targeting ECMAScript modules. Consider using 'import * as ns from \"mod\"', 'import {a} from \"mod\"', 'import d from \"mod\"', or another module format instead.",
                    span,
                    1202,
                )),
                ModuleReference::Entity(mut entity) => {
                    stripper.visit_expr(&mut entity);
                    let stmt = var_stmt(VarDeclKind::Var, decl.name.value.name, Some(entity));
                    let item = if decl.is_export {
                        match stmt.value {
                            Stmt::Decl(var) => ModuleItem::Export(ExportDecl::Decl(Box::new(Node::new(var, span)))),
                            other => ModuleItem::Stmt(other),
                        }
                    } else {
                        ModuleItem::Stmt(stmt.value)
                    };
                    out.push(Node::new(item, span));
                }
            }
        }
        ModuleItem::Stmt(stmt) => {
            let mut stmts = Vec::new();
            stripper.lower_statement(Node::new(stmt, span), declared, &mut stmts);
            out.extend(stmts.into_iter().map(factory::item));
        }
        ModuleItem::Export(export) => lower_export(export, span, scan, stripper, declared, out),
    }
}

fn lower_export(
    export: ExportDecl,
    span: Span,
    scan: &ModuleScan,
    stripper: &mut Stripper<'_>,
    declared: &mut HashSet<String>,
    out: &mut Vec<Node<ModuleItem>>,
) {
    let export = match export {
        ExportDecl::Named { type_only: true, .. }
        | ExportDecl::All { type_only: true, .. }
        | ExportDecl::AsNamespace(_) => return,
        ExportDecl::Named {
            specifiers,
            source,
            type_only: false,
        } => {
            let had_specifiers = !specifiers.is_empty();
            let specifiers: Vec<ExportSpecifier> = specifiers
                .into_iter()
                .filter(|specifier| !specifier.type_only)
                .filter(|specifier| source.is_some() || !scan.is_type_only(&specifier.local.value.name))
                .collect();
            if had_specifiers && specifiers.is_empty() {
                return;
            }
            ExportDecl::Named {
                specifiers,
                source,
                type_only: false,
            }
        }
        ExportDecl::Default(mut expr) => {
            stripper.visit_expr(&mut expr);
            ExportDecl::Default(expr)
        }
        ExportDecl::DefaultDecl { decl, anonymous } => {
            let decl_span = decl.span;
            if decl.value.is_type_only() {
                return;
            }
            let mut stmts = Vec::new();
            stripper.lower_statement(Node::new(Stmt::Decl(decl.value), decl_span), declared, &mut stmts);
            for stmt in stmts {
                let item = match stmt.value {
                    Stmt::Decl(decl @ (Decl::Function(_) | Decl::Class(_))) => {
                        ModuleItem::Export(ExportDecl::DefaultDecl {
                            decl: Box::new(Node::new(decl, stmt.span)),
                            anonymous,
                        })
                    }
                    other => ModuleItem::Stmt(other),
                };
                out.push(Node::new(item, span));
            }
            return;
        }
        ExportDecl::Decl(decl) => {
            let decl_span = decl.span;
            if decl.value.is_type_only() {
                return;
            }
            let names = decl.value.declared_names();
            let mut stmts = Vec::new();
            stripper.lower_statement(Node::new(Stmt::Decl(decl.value), decl_span), declared, &mut stmts);
            // Enums and namespaces come back as `var E;` plus an IIFE; the
            // binding is what gets exported
            for stmt in stmts {
                let stmt_span = stmt.span;
                let item = match stmt.value {
                    Stmt::Decl(decl)
                        if matches!(decl, Decl::Var(_) | Decl::Function(_) | Decl::Class(_))
                            && decl.declared_names().iter().all(|name| names.contains(name)) =>
                    {
                        ModuleItem::Export(ExportDecl::Decl(Box::new(Node::new(decl, stmt_span))))
                    }
                    other => ModuleItem::Stmt(other),
                };
                out.push(Node::new(item, span));
            }
            return;
        }
        ExportDecl::Assignment(_) => {
            stripper.diagnostics.push(EmitDiagnostic::new(
                "Export assignment cannot be used when targeting ECMAScript modules. Consider using 'export default' or another module format instead.",
                span,
                1203,
            ));
            return;
        }
        all @ ExportDecl::All { .. } => all,
    };
    out.push(Node::new(ModuleItem::Export(export), span));
}

/// Every identifier still referenced after erasure, including locals named
/// by `export { ... }`.
fn collect_usage(items: &[Node<ModuleItem>]) -> NameUsage {
    let mut usage = NameUsage::default();
    for item in items {
        match &item.value {
            ModuleItem::Import(_) => {}
            ModuleItem::Export(ExportDecl::Named {
                specifiers,
                source: None,
                ..
            }) => {
                usage
                    .references
                    .extend(specifiers.iter().map(|specifier| specifier.local.value.name.clone()));
            }
            _ => usage.visit_module_item(&mut item.clone()),
        }
    }
    usage
}

/// Drops import specifiers nothing refers to, and imports left empty.
fn elide_unused(item: Node<ModuleItem>, usage: &NameUsage) -> Option<Node<ModuleItem>> {
    let span = item.span;
    let ModuleItem::Import(mut import) = item.value else {
        return Some(item);
    };
    if import.bare || import.specifiers.is_empty() {
        return Some(Node::new(ModuleItem::Import(import), span));
    }
    import.specifiers.retain(|specifier| {
        !matches!(specifier, ImportSpecifier::Named { type_only: true, .. })
            && usage.references.contains(specifier.local_name())
    });
    if import.specifiers.is_empty() {
        return None;
    }
    Some(Node::new(ModuleItem::Import(import), span))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::printer::print_program;
    use crate::{ModuleKind, ScriptTarget};
    use pretty_assertions::assert_eq;

    fn lower(source: &str) -> Lowered {
        let options = LowerOptions {
            module: ModuleKind::EsNext,
            target: ScriptTarget::Es2020,
            ..LowerOptions::default()
        };
        lower_es_module(tsdual_parser::parse_source(source, 0).unwrap(), &options)
    }

    fn output(source: &str) -> String {
        print_program(&lower(source).program)
    }

    #[test]
    fn test_unused_and_type_imports_are_elided() {
        assert_eq!(
            output("import { a, b, type C } from \"./m\";\nimport type { D } from \"./d\";\nimport \"./side\";\nexport const x: C = a;"),
            "import { a } from \"./m\";\nimport \"./side\";\nexport const x = a;\n"
        );
    }

    #[test]
    fn test_exported_enum_keeps_binding_export() {
        assert_eq!(
            output("export enum Color { Red, Green = \"g\" }"),
            "export var Color;\n(function (Color) {\n    Color[Color[\"Red\"] = 0] = \"Red\";\n    Color[\"Green\"] = \"g\";\n})(Color || (Color = {}));\n"
        );
    }

    #[test]
    fn test_type_only_exports_leave_empty_export() {
        assert_eq!(output("export interface I {}\nexport type T = number;"), "export {};\n");
    }

    #[test]
    fn test_export_specifiers_for_types_are_dropped() {
        assert_eq!(
            output("interface I {}\nconst v = 1;\nexport { I, v as w };"),
            "const v = 1;\nexport { v as w };\n"
        );
    }

    #[test]
    fn test_import_used_only_by_export_specifier_is_kept() {
        assert_eq!(
            output("import { a } from \"./a\";\nexport { a };"),
            "import { a } from \"./a\";\nexport { a };\n"
        );
    }

    #[test]
    fn test_anonymous_default_class() {
        assert_eq!(output("export default class { x = 1; }"), "export default class {\n    x = 1;\n}\n");
    }

    #[test]
    fn test_commonjs_only_syntax_is_reported() {
        let lowered = lower("import fs = require(\"fs\");\nexport = fs;");
        let codes: Vec<u32> = lowered.diagnostics.iter().map(|d| d.code).collect();
        assert_eq!(codes, vec![1202, 1203]);
    }
}

//! Splits `export enum E {}` into `enum E {}` plus `export { E };`.
//!
//! CommonJS output then exports the enum through a plain `exports.E = E;`
//! assignment, which the export hoister can replay after the root export
//! replaces the `exports` object.

use tsdual_ast::{
    Decl, ExportDecl, ExportSpecifier, ModuleBody, ModuleDecl, ModuleItem, Node, Program, Stmt,
};
use tsdual_toolchain::{TransformContext, Transformer};

pub fn split_enum_exports(program: &mut Program) {
    split_items(&mut program.items);
}

fn split_items(items: &mut Vec<Node<ModuleItem>>) {
    let mut out = Vec::with_capacity(items.len());
    for item in items.drain(..) {
        let span = item.span;
        match item.value {
            ModuleItem::Export(ExportDecl::Decl(decl)) => {
                let decl_span = decl.span;
                let exported = |decl: Decl| {
                    Node::new(
                        ModuleItem::Export(ExportDecl::Decl(Box::new(Node::new(decl, decl_span)))),
                        span,
                    )
                };
                match decl.value {
                    Decl::Enum(decl) => {
                        let name = decl.name.clone();
                        out.push(Node::new(ModuleItem::Stmt(Stmt::Decl(Decl::Enum(decl))), span));
                        out.push(Node::new(
                            ModuleItem::Export(ExportDecl::Named {
                                specifiers: vec![ExportSpecifier {
                                    local: name,
                                    exported: None,
                                    type_only: false,
                                }],
                                source: None,
                                type_only: false,
                            }),
                            span,
                        ));
                    }
                    Decl::Module(mut module) => {
                        split_namespace(&mut module);
                        out.push(exported(Decl::Module(module)));
                    }
                    other => out.push(exported(other)),
                }
            }
            ModuleItem::Stmt(Stmt::Decl(Decl::Module(mut module))) => {
                split_namespace(&mut module);
                out.push(Node::new(ModuleItem::Stmt(Stmt::Decl(Decl::Module(module))), span));
            }
            value => out.push(Node::new(value, span)),
        }
    }
    *items = out;
}

fn split_namespace(module: &mut ModuleDecl) {
    match &mut module.body {
        Some(ModuleBody::Block(items)) => split_items(items),
        Some(ModuleBody::Namespace(inner)) => split_namespace(&mut inner.value),
        None => {}
    }
}

/// [`split_enum_exports`] as a before-emit transformer.
#[derive(Debug, Clone, Copy, Default)]
pub struct SplitEnumExports;

impl Transformer for SplitEnumExports {
    fn name(&self) -> &'static str {
        "split-enum-exports"
    }

    fn transform(&self, program: &mut Program, _context: &TransformContext<'_>) {
        split_enum_exports(program);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tsdual_emit::{print_program, LowerOptions, ModuleKind, ScriptTarget};

    fn parse(source: &str) -> Program {
        tsdual_parser::parse_source(source, 0).unwrap()
    }

    fn split(source: &str) -> Program {
        let mut program = parse(source);
        split_enum_exports(&mut program);
        program
    }

    #[test]
    fn test_exported_enum_is_split() {
        let program = split("export enum Color { Red, Green = 4 }\nexport const x = 1;\n");
        assert_eq!(program.items.len(), 3);

        let Some(ModuleItem::Stmt(Stmt::Decl(Decl::Enum(decl)))) = program.items.first().map(|i| &i.value) else {
            panic!("expected a plain enum first, got {:?}", program.items[0].value);
        };
        assert_eq!(decl.name.value.name, "Color");
        assert_eq!(decl.members.len(), 2);

        match &program.items[1].value {
            ModuleItem::Export(ExportDecl::Named { specifiers, source: None, .. }) => {
                assert_eq!(specifiers.len(), 1);
                assert_eq!(specifiers[0].exported_name(), "Color");
            }
            other => panic!("expected export list, got {:?}", other),
        }
        assert!(matches!(program.items[2].value, ModuleItem::Export(ExportDecl::Decl(_))));
    }

    #[test]
    fn test_const_and_declare_modifiers_survive() {
        let program = split("export const enum A { X }\nexport declare enum B { Y }\n");
        let enums: Vec<(bool, bool)> = program
            .items
            .iter()
            .filter_map(|item| match &item.value {
                ModuleItem::Stmt(Stmt::Decl(Decl::Enum(e))) => Some((e.is_const, e.is_declare)),
                _ => None,
            })
            .collect();
        assert_eq!(enums, vec![(true, false), (false, true)]);
    }

    #[test]
    fn test_unexported_enums_and_other_items_untouched() {
        let source = "enum Local { A }\nexport function f() {}\nexport { Local };\n";
        assert_eq!(split(source), parse(source));
    }

    #[test]
    fn test_namespace_bodies_are_split() {
        let program = split("export namespace Outer { export namespace Inner { export enum E { A } } }");
        let output = print_program(&tsdual_emit::lower(
            program,
            &LowerOptions {
                module: ModuleKind::CommonJs,
                target: ScriptTarget::Es2020,
                ..LowerOptions::default()
            },
        ).program);
        assert!(output.contains("Inner.E = E;"), "{}", output);
    }

    #[test]
    fn test_commonjs_output_exports_by_assignment() {
        let program = split("export enum Level { Low, High }\n");
        let output = print_program(&tsdual_emit::lower(
            program,
            &LowerOptions {
                module: ModuleKind::CommonJs,
                target: ScriptTarget::Es2020,
                ..LowerOptions::default()
            },
        ).program);
        assert!(output.contains("})(Level || (Level = {}));\nexports.Level = Level;\n"), "{}", output);
    }
}

//! Namespace lowering, and the IIFE shape shared with enums.
//!
//! ```text
//! namespace N { export const x = 1; }
//! ```
//! becomes
//! ```text
//! var N;
//! (function (N) {
//!     N.x = 1;
//! })(N || (N = {}));
//! ```

use std::collections::HashSet;

use tsdual_ast::factory::{assign, binary, call, expr_stmt, ident, member, object, var_stmt};
use tsdual_ast::visit::VisitMut;
use tsdual_ast::*;

use crate::rename::Substitution;
use crate::strip::{hoisted_names, Stripper};

/// Where the object an IIFE populates is stored.
#[derive(Debug, Clone)]
pub(crate) enum Binding {
    /// `E || (E = {})`
    Local,
    /// `E || (exports.E = E = {})`, for top-level exports in CommonJS
    Exported(Node<Expr>),
    /// `E = N.E || (N.E = {})`, for exported members of namespace `N`
    Member(Node<Expr>),
}

impl Binding {
    fn argument(self, name: &str) -> Node<Expr> {
        let empty = || object(Vec::new());
        match self {
            Binding::Local => binary(ident(name), BinaryOp::Or, assign(ident(name), empty())),
            Binding::Exported(target) => binary(
                ident(name),
                BinaryOp::Or,
                assign(member(target, name), assign(ident(name), empty())),
            ),
            Binding::Member(parent) => assign(
                ident(name),
                binary(
                    member(parent.clone(), name),
                    BinaryOp::Or,
                    assign(member(parent, name), empty()),
                ),
            ),
        }
    }
}

/// `(function (name) { body })(argument);`
pub(crate) fn iife(name: &str, body: Vec<Node<Stmt>>, binding: Binding) -> Node<Stmt> {
    let function = Function {
        type_params: None,
        params: vec![Param::new(Node::synthetic(Pattern::ident(name)))],
        return_type: None,
        body: Some(Node::synthetic(BlockStmt { stmts: body })),
        is_async: false,
        is_generator: false,
    };
    let callee = Node::synthetic(Expr::Function {
        name: None,
        function: Box::new(function),
    });
    expr_stmt(call(callee, vec![binding.argument(name)]))
}

impl Stripper<'_> {
    pub(crate) fn lower_namespace_decl(
        &mut self,
        decl: ModuleDecl,
        binding: Binding,
        declared: &mut HashSet<String>,
    ) -> Vec<Node<Stmt>> {
        // String-named modules are always ambient
        let ModuleName::Ident(name) = &decl.name else {
            return Vec::new();
        };
        let name = name.value.name.clone();

        let declare_var = declared.insert(name.clone()).then(|| self.scope_keyword());
        self.enter();
        let body = match decl.body {
            Some(ModuleBody::Block(items)) => self.lower_namespace_items(&name, items),
            Some(ModuleBody::Namespace(inner)) if inner.value.is_instantiated() => {
                // `namespace A.B {}`: B is an exported member of A
                let mut inner_declared = HashSet::new();
                self.lower_namespace_decl(inner.value, Binding::Member(ident(&name)), &mut inner_declared)
            }
            _ => Vec::new(),
        };
        self.leave();

        let mut stmts = Vec::new();
        if let Some(kind) = declare_var {
            stmts.push(var_stmt(kind, &name, None));
        }
        stmts.push(iife(&name, body, binding));
        stmts
    }

    fn lower_namespace_items(&mut self, name: &str, items: Vec<Node<ModuleItem>>) -> Vec<Node<Stmt>> {
        let mut declared = hoisted_names(items.iter().filter_map(|item| match &item.value {
            ModuleItem::Stmt(Stmt::Decl(decl)) => Some(decl),
            ModuleItem::Export(ExportDecl::Decl(decl)) => Some(&decl.value),
            _ => None,
        }));
        let namespace = ident(name);
        let mut exported = Substitution::default();
        let mut out = Vec::new();

        for item in items {
            let span = item.span;
            match item.value {
                ModuleItem::Stmt(stmt) => self.lower_statement(Node::new(stmt, span), &mut declared, &mut out),
                ModuleItem::Export(ExportDecl::Decl(decl)) => {
                    let decl_span = decl.span;
                    match decl.value {
                        Decl::Var(var) if !var.is_declare => {
                            out.extend(self.lower_exported_var(var, &namespace, &mut exported, false));
                        }
                        Decl::Enum(decl) if !decl.is_declare => {
                            let binding = Binding::Member(namespace.clone());
                            out.extend(self.lower_enum_decl(&decl, binding, &mut declared));
                        }
                        Decl::Module(decl) if decl.is_instantiated() => {
                            let binding = Binding::Member(namespace.clone());
                            out.extend(self.lower_namespace_decl(decl, binding, &mut declared));
                        }
                        decl @ (Decl::Function(_) | Decl::Class(_)) if !decl.is_type_only() => {
                            let names = decl.declared_names();
                            self.lower_statement(Node::new(Stmt::Decl(decl), decl_span), &mut declared, &mut out);
                            for exported_name in names {
                                out.push(expr_stmt(assign(
                                    member(namespace.clone(), exported_name.clone()),
                                    ident(exported_name),
                                )));
                            }
                        }
                        _ => {}
                    }
                }
                ModuleItem::Export(ExportDecl::Named {
                    specifiers,
                    source: None,
                    type_only: false,
                }) => {
                    for specifier in specifiers.iter().filter(|specifier| !specifier.type_only) {
                        out.push(expr_stmt(assign(
                            member(namespace.clone(), specifier.exported_name()),
                            ident(specifier.local.value.name.clone()),
                        )));
                    }
                }
                ModuleItem::ImportEquals(decl) if !decl.type_only => {
                    if let ModuleReference::Entity(mut target) = decl.reference {
                        self.visit_expr(&mut target);
                        let alias = decl.name.value.name;
                        out.push(if decl.is_export {
                            expr_stmt(assign(member(namespace.clone(), alias), target))
                        } else {
                            var_stmt(VarDeclKind::Var, alias, Some(target))
                        });
                    }
                }
                _ => {}
            }
        }

        exported.apply_stmts(&mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::printer::print_program;
    use crate::{LowerOptions, ScriptTarget};
    use pretty_assertions::assert_eq;

    fn lower(source: &str) -> String {
        let options = LowerOptions {
            target: ScriptTarget::Es2020,
            ..LowerOptions::default()
        };
        let program = tsdual_parser::parse_source(source, 0).unwrap();
        let stmts = program
            .items
            .into_iter()
            .filter_map(|item| match item.value {
                ModuleItem::Stmt(stmt) => Some(Node::new(stmt, item.span)),
                _ => None,
            })
            .collect();
        let mut stripper = Stripper::new(&options);
        let stmts = stripper.lower_statements(stmts);
        print_program(&Program {
            items: stmts.into_iter().map(tsdual_ast::factory::item).collect(),
            span: Span::default(),
        })
    }

    #[test]
    fn test_exported_members_become_properties() {
        let output = lower("namespace N { export const x = 1; const y = x + 1; export function f() { return y; } }");
        assert_eq!(
            output,
            "var N;\n(function (N) {\n    N.x = 1;\n    const y = N.x + 1;\n    function f() {\n        return y;\n    }\n    N.f = f;\n})(N || (N = {}));\n"
        );
    }

    #[test]
    fn test_dotted_namespace_nests() {
        let output = lower("namespace A.B { export const c = 1; }");
        assert!(output.starts_with("var A;\n(function (A) {\n    let B;\n    (function (B) {\n        B.c = 1;\n"), "{}", output);
        assert!(output.contains("})(B = A.B || (A.B = {}));"), "{}", output);
        assert!(output.ends_with("})(A || (A = {}));\n"));
    }

    #[test]
    fn test_export_list_inside_namespace() {
        let output = lower("namespace N { const a = 1; export { a as b }; }");
        assert!(output.contains("    const a = 1;\n    N.b = a;\n"), "{}", output);
    }

    #[test]
    fn test_type_only_namespace_is_erased() {
        assert_eq!(lower("namespace T { export interface I {} export type U = number; }"), "");
    }

    #[test]
    fn test_exported_binding_argument() {
        let argument = Binding::Exported(ident("exports")).argument("E");
        assert_eq!(crate::printer::print_expr(&argument), "E || (exports.E = E = {})");
    }
}

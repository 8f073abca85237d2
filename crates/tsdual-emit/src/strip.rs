//! Erasure of TypeScript-only syntax.
//!
//! [`Stripper`] walks statement lists in place: type declarations vanish,
//! enums and namespaces become IIFEs, `as`/`satisfies`/`!` wrappers are
//! unwrapped and classes lose their TypeScript members. Module-level
//! `import`/`export` handling lives in the CommonJS and ESM lowerings,
//! which feed every other statement through here.

use std::collections::HashSet;

use tsdual_ast::factory::{assign, expr_stmt, ident, member};
use tsdual_ast::visit::{walk_class, walk_expr, walk_function, walk_stmt, VisitMut};
use tsdual_ast::*;

use crate::enums::lower_enum;
use crate::namespace::Binding;
use crate::rename::{Replacement, Substitution};
use crate::{EmitDiagnostic, LowerOptions, ScriptTarget};

pub(crate) struct Stripper<'a> {
    pub(crate) options: &'a LowerOptions,
    pub(crate) diagnostics: Vec<EmitDiagnostic>,
    /// Nesting below the module's top level.
    depth: usize,
}

impl<'a> Stripper<'a> {
    pub(crate) fn new(options: &'a LowerOptions) -> Self {
        Self {
            options,
            diagnostics: Vec::new(),
            depth: 0,
        }
    }

    /// Keyword for the binding an enum or namespace IIFE assigns to.
    pub(crate) fn scope_keyword(&self) -> VarDeclKind {
        if self.depth == 0 || self.options.target < ScriptTarget::Es2015 {
            VarDeclKind::Var
        } else {
            VarDeclKind::Let
        }
    }

    pub(crate) fn enter(&mut self) {
        self.depth += 1;
    }

    pub(crate) fn leave(&mut self) {
        self.depth -= 1;
    }

    pub(crate) fn lower_statements(&mut self, stmts: Vec<Node<Stmt>>) -> Vec<Node<Stmt>> {
        let mut declared = hoisted_names(stmts.iter().filter_map(|stmt| match &stmt.value {
            Stmt::Decl(decl) => Some(decl),
            _ => None,
        }));
        let mut out = Vec::with_capacity(stmts.len());
        for stmt in stmts {
            self.lower_statement(stmt, &mut declared, &mut out);
        }
        out
    }

    /// Lowers one statement into `out`. `declared` tracks names already
    /// bound in this scope so merged enums and namespaces reuse them.
    pub(crate) fn lower_statement(
        &mut self,
        stmt: Node<Stmt>,
        declared: &mut HashSet<String>,
        out: &mut Vec<Node<Stmt>>,
    ) {
        let span = stmt.span;
        match stmt.value {
            Stmt::Decl(Decl::Enum(decl)) if !decl.is_declare => {
                out.extend(self.lower_enum_decl(&decl, Binding::Local, declared));
            }
            Stmt::Decl(Decl::Module(decl)) if decl.is_instantiated() => {
                out.extend(self.lower_namespace_decl(decl, Binding::Local, declared));
            }
            Stmt::Decl(ref decl) if decl.is_type_only() => {}
            value => {
                let mut stmt = Node::new(value, span);
                self.visit_stmt(&mut stmt);
                out.push(stmt);
            }
        }
    }

    pub(crate) fn lower_enum_decl(
        &mut self,
        decl: &EnumDecl,
        binding: Binding,
        declared: &mut HashSet<String>,
    ) -> Vec<Node<Stmt>> {
        let declare_var = declared
            .insert(decl.name.value.name.clone())
            .then(|| self.scope_keyword());
        lower_enum(decl, binding, declare_var, &mut self.diagnostics)
    }

    /// Exported variables, as `target.x = init;` assignments. Simple names
    /// are registered in `exported` so later references read the property;
    /// destructured ones keep a local declaration and copy each binding.
    pub(crate) fn lower_exported_var(
        &mut self,
        mut decl: VarDecl,
        target: &Node<Expr>,
        exported: &mut Substitution,
        indirect_calls: bool,
    ) -> Vec<Node<Stmt>> {
        let mut stmts = Vec::new();
        let kind = decl.kind;
        for mut declarator in std::mem::take(&mut decl.declarations) {
            if let Some(init) = &mut declarator.init {
                self.visit_expr(init);
            }

            if let Pattern::Ident(name) = &declarator.pattern.value {
                let name = name.value.name.clone();
                let property = member(target.clone(), name.clone());
                let replacement = Replacement::new(property.clone());
                exported.insert(
                    name,
                    if indirect_calls {
                        replacement.indirect()
                    } else {
                        replacement
                    },
                );
                if let Some(init) = declarator.init {
                    stmts.push(Node::new(Stmt::Expr(assign(property, init)), declarator.pattern.span));
                }
                continue;
            }

            let names = {
                let mut names = Vec::new();
                declarator.pattern.value.collect_bound_names(&mut names);
                names
            };
            self.visit_pattern(&mut declarator.pattern);
            stmts.push(Node::synthetic(Stmt::Decl(Decl::Var(VarDecl {
                kind,
                declarations: vec![declarator],
                is_declare: false,
            }))));
            for name in names {
                stmts.push(expr_stmt(assign(member(target.clone(), name.clone()), ident(name))));
            }
        }
        stmts
    }
}

/// Function and class names of a scope, which later enum or namespace
/// declarations of the same name merge into.
pub(crate) fn hoisted_names<'d>(decls: impl IntoIterator<Item = &'d Decl>) -> HashSet<String> {
    decls
        .into_iter()
        .filter(|decl| matches!(decl, Decl::Function(_) | Decl::Class(_)) && !decl.is_type_only())
        .flat_map(Decl::declared_names)
        .collect()
}

impl VisitMut for Stripper<'_> {
    fn visit_block(&mut self, block: &mut BlockStmt) {
        self.enter();
        let stmts = std::mem::take(&mut block.stmts);
        block.stmts = self.lower_statements(stmts);
        self.leave();
    }

    fn visit_stmt(&mut self, stmt: &mut Node<Stmt>) {
        if let Stmt::Switch {
            discriminant,
            cases,
        } = &mut stmt.value
        {
            self.visit_expr(discriminant);
            self.enter();
            for case in cases {
                if let Some(test) = &mut case.test {
                    self.visit_expr(test);
                }
                let consequent = std::mem::take(&mut case.consequent);
                case.consequent = self.lower_statements(consequent);
            }
            self.leave();
            return;
        }
        walk_stmt(self, stmt);
    }

    fn visit_expr(&mut self, expr: &mut Node<Expr>) {
        loop {
            let inner = match &mut expr.value {
                Expr::TypeCast { expr: inner, .. }
                | Expr::Satisfies { expr: inner, .. }
                | Expr::NonNullAssertion(inner) => {
                    std::mem::replace(&mut **inner, Node::synthetic(Expr::This))
                }
                _ => break,
            };
            *expr = inner;
        }
        walk_expr(self, expr);
    }

    fn visit_function(&mut self, function: &mut Function) {
        function.params.retain(|param| !param.is_this_param());
        for param in &mut function.params {
            self.reject_decorators(&mut param.decorators);
        }
        walk_function(self, function);
    }

    fn visit_class(&mut self, class: &mut Class) {
        self.lower_class(class);
        walk_class(self, class);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::printer::print_program;
    use pretty_assertions::assert_eq;

    fn strip(source: &str) -> (String, Vec<EmitDiagnostic>) {
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
        let program = Program {
            items: stmts.into_iter().map(tsdual_ast::factory::item).collect(),
            span: Span::default(),
        };
        (print_program(&program), stripper.diagnostics)
    }

    #[test]
    fn test_type_declarations_vanish() {
        let (output, diagnostics) = strip(
            "interface I { a: number }\ntype T = string;\ndeclare const d: number;\ndeclare function g(): void;\nfunction f(a: number): void;\nfunction f(a: any) {}\nlet x = 1;",
        );
        assert!(diagnostics.is_empty());
        assert_eq!(output, "function f(a) { }\nlet x = 1;\n");
    }

    #[test]
    fn test_assertions_are_unwrapped() {
        let (output, _) = strip("const v = (<any>w).x as number; const y = z! satisfies Q;");
        assert_eq!(output, "const v = (w).x;\nconst y = z;\n");
    }

    #[test]
    fn test_nested_enum_uses_let() {
        let (output, _) = strip("function f() { enum E { A } return E.A; }");
        assert!(output.contains("    let E;\n    (function (E) {"), "{}", output);
    }

    #[test]
    fn test_enum_merges_with_function() {
        let (output, _) = strip("function E() {}\nnamespace E { export const x = 1; }");
        assert!(!output.contains("var E;"), "{}", output);
        assert!(output.contains("E.x = 1;"));
    }
}

//! Scope-aware identifier substitution.
//!
//! Module lowering turns references to imports and exported bindings into
//! property accesses (`a` -> `m_1.a`, `x` -> `exports.x`). A reference is
//! only rewritten when no enclosing function, block, catch clause or loop
//! head declares the same name.

use std::collections::{HashMap, HashSet};

use tsdual_ast::visit::{walk_block, walk_expr, walk_function, walk_param, walk_stmt, VisitMut};
use tsdual_ast::*;

#[derive(Debug, Clone)]
pub(crate) struct Replacement {
    expr: Node<Expr>,
    /// Calls go through `(0, m_1.f)(...)` so the callee gets no `this`.
    indirect_call: bool,
}

impl Replacement {
    pub(crate) fn new(expr: Node<Expr>) -> Self {
        Self {
            expr,
            indirect_call: false,
        }
    }

    pub(crate) fn indirect(mut self) -> Self {
        self.indirect_call = true;
        self
    }
}

#[derive(Debug, Default)]
pub(crate) struct Substitution {
    map: HashMap<String, Replacement>,
    scopes: Vec<HashSet<String>>,
}

impl Substitution {
    pub(crate) fn insert(&mut self, name: impl Into<String>, replacement: Replacement) {
        self.map.insert(name.into(), replacement);
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub(crate) fn apply_stmts(&mut self, stmts: &mut [Node<Stmt>]) {
        if self.is_empty() {
            return;
        }
        for stmt in stmts {
            self.visit_stmt(stmt);
        }
    }

    pub(crate) fn apply_expr(&mut self, expr: &mut Node<Expr>) {
        if !self.is_empty() {
            self.visit_expr(expr);
        }
    }

    fn lookup(&self, name: &str) -> Option<&Replacement> {
        if self.scopes.iter().any(|scope| scope.contains(name)) {
            return None;
        }
        self.map.get(name)
    }

    /// Only names that would otherwise be rewritten matter for shadowing.
    fn push_scope(&mut self, names: impl IntoIterator<Item = String>) {
        let scope = names
            .into_iter()
            .filter(|name| self.map.contains_key(name))
            .collect();
        self.scopes.push(scope);
    }

    fn pop_scope(&mut self) {
        self.scopes.pop();
    }

    fn visit_callee(&mut self, callee: &mut Node<Expr>) {
        if let Expr::Ident(ident) = &callee.value {
            if let Some(replacement) = self.lookup(&ident.name) {
                callee.value = if replacement.indirect_call {
                    Expr::Sequence(vec![tsdual_ast::factory::number(0.0), replacement.expr.clone()])
                } else {
                    replacement.expr.value.clone()
                };
                return;
            }
        }
        self.visit_expr(callee);
    }
}

impl VisitMut for Substitution {
    fn visit_expr(&mut self, expr: &mut Node<Expr>) {
        match &mut expr.value {
            Expr::Ident(ident) => {
                if let Some(replacement) = self.lookup(&ident.name) {
                    expr.value = replacement.expr.value.clone();
                }
            }
            Expr::Call { callee, args, .. } => {
                self.visit_callee(callee);
                for arg in args {
                    self.visit_expr(arg);
                }
            }
            Expr::TaggedTemplate { tag, exprs, .. } => {
                self.visit_callee(tag);
                for expr in exprs {
                    self.visit_expr(expr);
                }
            }
            Expr::Arrow { params, body, .. } => {
                let mut names = param_names(params);
                if let ArrowBody::Block(block) = body {
                    names.extend(var_names(&block.value.stmts));
                }
                self.push_scope(names);
                for param in params.iter_mut() {
                    walk_param(self, param);
                }
                match body {
                    ArrowBody::Expr(body) => self.visit_expr(body),
                    ArrowBody::Block(block) => self.visit_block(&mut block.value),
                }
                self.pop_scope();
            }
            Expr::Function { name, function } => {
                self.push_scope(name.iter().map(|n| n.value.name.clone()));
                self.visit_function(function);
                self.pop_scope();
            }
            Expr::Class { name, class } => {
                self.push_scope(name.iter().map(|n| n.value.name.clone()));
                self.visit_class(class);
                self.pop_scope();
            }
            _ => walk_expr(self, expr),
        }
    }

    fn visit_function(&mut self, function: &mut Function) {
        let mut names = param_names(&function.params);
        if let Some(body) = &function.body {
            names.extend(var_names(&body.value.stmts));
        }
        self.push_scope(names);
        walk_function(self, function);
        self.pop_scope();
    }

    fn visit_block(&mut self, block: &mut BlockStmt) {
        self.push_scope(lexical_names(&block.stmts));
        walk_block(self, block);
        self.pop_scope();
    }

    fn visit_stmt(&mut self, stmt: &mut Node<Stmt>) {
        let head_names = match &stmt.value {
            Stmt::For {
                init: Some(ForInit::VarDecl(decl)),
                ..
            }
            | Stmt::ForIn {
                left: ForInLeft::VarDecl(decl),
                ..
            }
            | Stmt::ForOf {
                left: ForInLeft::VarDecl(decl),
                ..
            } => Some(decl.bound_names()),
            _ => None,
        };
        if let Some(names) = head_names {
            self.push_scope(names);
            walk_stmt(self, stmt);
            self.pop_scope();
            return;
        }

        if let Stmt::Try {
            block,
            catch,
            finally,
        } = &mut stmt.value
        {
            self.visit_block(&mut block.value);
            if let Some(catch) = catch {
                let mut names = Vec::new();
                if let Some(param) = &catch.param {
                    param.value.collect_bound_names(&mut names);
                }
                self.push_scope(names);
                if let Some(param) = &mut catch.param {
                    self.visit_pattern(param);
                }
                self.visit_block(&mut catch.body.value);
                self.pop_scope();
            }
            if let Some(finally) = finally {
                self.visit_block(&mut finally.value);
            }
            return;
        }

        walk_stmt(self, stmt);
    }
}

fn param_names(params: &[Param]) -> Vec<String> {
    let mut names = Vec::new();
    for param in params {
        param.pattern.value.collect_bound_names(&mut names);
    }
    names
}

/// Names declared directly in a statement list.
pub(crate) fn lexical_names(stmts: &[Node<Stmt>]) -> Vec<String> {
    stmts
        .iter()
        .filter_map(|stmt| match &stmt.value {
            Stmt::Decl(decl) => Some(decl.declared_names()),
            _ => None,
        })
        .flatten()
        .collect()
}

/// `var` bindings anywhere in a function body, which are visible throughout
/// the function. Nested functions are not entered.
fn var_names(stmts: &[Node<Stmt>]) -> Vec<String> {
    let mut names = Vec::new();
    for stmt in stmts {
        collect_var_names(&stmt.value, &mut names);
    }
    names
}

fn collect_var_names(stmt: &Stmt, names: &mut Vec<String>) {
    let from_decl = |decl: &VarDecl, names: &mut Vec<String>| {
        if decl.kind == VarDeclKind::Var {
            names.extend(decl.bound_names());
        }
    };
    match stmt {
        Stmt::Decl(Decl::Var(decl)) => from_decl(decl, names),
        Stmt::If {
            then_stmt,
            else_stmt,
            ..
        } => {
            collect_var_names(&then_stmt.value, names);
            if let Some(else_stmt) = else_stmt {
                collect_var_names(&else_stmt.value, names);
            }
        }
        Stmt::For { init, body, .. } => {
            if let Some(ForInit::VarDecl(decl)) = init {
                from_decl(decl, names);
            }
            collect_var_names(&body.value, names);
        }
        Stmt::ForIn { left, body, .. } | Stmt::ForOf { left, body, .. } => {
            if let ForInLeft::VarDecl(decl) = left {
                from_decl(decl, names);
            }
            collect_var_names(&body.value, names);
        }
        Stmt::While { body, .. } | Stmt::DoWhile { body, .. } | Stmt::Labeled { stmt: body, .. } => {
            collect_var_names(&body.value, names)
        }
        Stmt::Block(block) => {
            for stmt in &block.stmts {
                collect_var_names(&stmt.value, names);
            }
        }
        Stmt::Try {
            block,
            catch,
            finally,
        } => {
            let blocks = std::iter::once(block)
                .chain(catch.as_ref().map(|c| &c.body))
                .chain(finally.as_ref());
            for block in blocks {
                for stmt in &block.value.stmts {
                    collect_var_names(&stmt.value, names);
                }
            }
        }
        Stmt::Switch { cases, .. } => {
            for stmt in cases.iter().flat_map(|case| &case.consequent) {
                collect_var_names(&stmt.value, names);
            }
        }
        _ => {}
    }
}

/// Identifiers read or written anywhere in the given statements, and every
/// name bound by a pattern.
#[derive(Debug, Default)]
pub(crate) struct NameUsage {
    pub references: HashSet<String>,
    pub bindings: HashSet<String>,
}

impl NameUsage {
    pub(crate) fn collect(stmts: &mut [Node<Stmt>]) -> Self {
        let mut usage = Self::default();
        for stmt in stmts {
            usage.visit_stmt(stmt);
        }
        usage
    }

    pub(crate) fn is_used(&self, name: &str) -> bool {
        self.references.contains(name) || self.bindings.contains(name)
    }
}

impl VisitMut for NameUsage {
    fn visit_expr(&mut self, expr: &mut Node<Expr>) {
        if let Expr::Ident(ident) = &expr.value {
            self.references.insert(ident.name.clone());
        }
        walk_expr(self, expr);
    }

    fn visit_pattern(&mut self, pattern: &mut Node<Pattern>) {
        if let Pattern::Ident(ident) = &pattern.value {
            self.bindings.insert(ident.value.name.clone());
        }
        tsdual_ast::visit::walk_pattern(self, pattern);
    }

    fn visit_decl(&mut self, decl: &mut Decl) {
        self.bindings.extend(decl.declared_names());
        tsdual_ast::visit::walk_decl(self, decl);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::printer::print_program;
    use tsdual_ast::factory;

    fn rewrite(source: &str, substitution: &mut Substitution) -> String {
        let program = tsdual_parser::parse_source(source, 0).unwrap();
        let mut stmts: Vec<Node<Stmt>> = program
            .items
            .into_iter()
            .filter_map(|item| match item.value {
                ModuleItem::Stmt(stmt) => Some(Node::new(stmt, item.span)),
                _ => None,
            })
            .collect();
        substitution.apply_stmts(&mut stmts);
        let program = Program {
            items: stmts.into_iter().map(factory::item).collect(),
            span: Span::default(),
        };
        print_program(&program)
    }

    fn imports() -> Substitution {
        let mut substitution = Substitution::default();
        substitution.insert("a", Replacement::new(factory::member_path("m_1.a")).indirect());
        substitution
    }

    #[test]
    fn test_rewrites_references_and_calls() {
        let output = rewrite("a(); b = a + 1; o = { a };", &mut imports());
        assert_eq!(output, "(0, m_1.a)();\nb = m_1.a + 1;\no = { a: m_1.a };\n");
    }

    #[test]
    fn test_respects_shadowing() {
        let output = rewrite(
            "function f(a) { return a; }\nconst g = () => { let a = 1; return a; };\nfor (const a of xs) use(a);\ntry {} catch (a) { a; }\nuse(a);",
            &mut imports(),
        );
        assert!(output.contains("return a;"));
        assert!(!output.contains("return m_1.a;"));
        assert!(output.contains("use(a);\n") && output.ends_with("use(m_1.a);\n"), "{}", output);
        assert!(output.contains("catch (a) {\n    a;\n}"));
    }

    #[test]
    fn test_var_hoisting_shadows() {
        let output = rewrite("function f() { if (x) { var a = 2; } return a; }", &mut imports());
        assert!(!output.contains("m_1"), "{}", output);
    }

    #[test]
    fn test_usage_collects_references() {
        let program = tsdual_parser::parse_source("const x = a + b.c; function f(d) {}", 0).unwrap();
        let mut stmts: Vec<Node<Stmt>> = program
            .items
            .into_iter()
            .filter_map(|item| match item.value {
                ModuleItem::Stmt(stmt) => Some(Node::new(stmt, item.span)),
                _ => None,
            })
            .collect();
        let usage = NameUsage::collect(&mut stmts);
        assert!(usage.references.contains("a"));
        assert!(usage.references.contains("b"));
        assert!(!usage.references.contains("c"));
        assert!(usage.bindings.contains("d"));
        assert!(usage.is_used("f"));
    }
}

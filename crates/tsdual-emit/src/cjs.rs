//! CommonJS module lowering.
//!
//! Imports become `require` calls bound to generated names (`m_1`) and
//! every reference to an imported binding reads through that object.
//! Exports are assignments to properties of `exports`; names that are
//! exported before they are initialized start out as `void 0` so the
//! export object has its final shape from the first statement.

use std::collections::{HashMap, HashSet};

use tsdual_ast::factory::{
    arrow, assign, boolean, call, define_property, expr_stmt, ident, index, member, member_path,
    object, string, var_stmt, void_zero,
};
use tsdual_ast::visit::{walk_expr, VisitMut};
use tsdual_ast::*;

use crate::helpers::{Helper, HelperSet};
use crate::namespace::Binding;
use crate::rename::{NameUsage, Replacement, Substitution};
use crate::scan::ModuleScan;
use crate::strip::Stripper;
use crate::{EmitDiagnostic, LowerOptions, Lowered, ScriptTarget};

pub(crate) fn lower_commonjs(program: Program, options: &LowerOptions) -> Lowered {
    let is_module = program.is_module();
    let scan = ModuleScan::new(&program.items);
    let mut lowering = CommonJs::new(options, scan);

    for item in program.items {
        lowering.lower_item(item);
    }
    let mut body = lowering.materialize_imports();

    let mut dynamic = DynamicImports {
        options,
        helpers: &mut lowering.helpers,
        diagnostics: &mut lowering.stripper.diagnostics,
    };
    for stmt in &mut body {
        dynamic.visit_stmt(stmt);
    }

    let mut stmts = Vec::new();
    if is_module || options.always_strict {
        if body.first().and_then(|stmt| stmt.value.directive()) == Some("use strict") {
            body.remove(0);
        }
        stmts.push(expr_stmt(string("use strict")));
    }
    stmts.extend(lowering.helpers.statements());
    if is_module && !lowering.has_export_assignment {
        let descriptor = object(vec![("value", boolean(true))]);
        stmts.push(expr_stmt(define_property(ident("exports"), "__esModule", descriptor)));
    }
    if let Some(prelude) = void_prelude(&lowering.prelude) {
        stmts.push(prelude);
    }
    for (exported, local) in &lowering.function_exports {
        stmts.push(expr_stmt(assign(exports_property(exported), ident(local.as_str()))));
    }
    stmts.extend(body);

    Lowered {
        program: Program {
            items: stmts.into_iter().map(factory::item).collect(),
            span: Span::default(),
        },
        diagnostics: lowering.stripper.diagnostics,
    }
}

/// Statements collected in source order; imports are resolved once every
/// reference is known so unused ones can be dropped.
enum Pending {
    Stmt(Node<Stmt>),
    Import(ImportDecl, Span),
    ImportEquals {
        name: String,
        init: Node<Expr>,
        is_export: bool,
        span: Span,
    },
}

struct CommonJs<'a> {
    stripper: Stripper<'a>,
    scan: ModuleScan,
    helpers: HelperSet,
    pending: Vec<Pending>,
    /// Exported variables, read through `exports`
    exported: Substitution,
    /// Names initialized to `void 0` up front
    prelude: Vec<String>,
    /// `exports.name = local;` for hoisted function declarations
    function_exports: Vec<(String, String)>,
    /// Enum and namespace names bound so far, for declaration merging
    declared: HashSet<String>,
    has_export_assignment: bool,
    placeholders: usize,
}

impl<'a> CommonJs<'a> {
    fn new(options: &'a LowerOptions, scan: ModuleScan) -> Self {
        Self {
            stripper: Stripper::new(options),
            scan,
            helpers: HelperSet::default(),
            pending: Vec::new(),
            exported: Substitution::default(),
            prelude: Vec::new(),
            function_exports: Vec::new(),
            declared: HashSet::new(),
            has_export_assignment: false,
            placeholders: 0,
        }
    }

    fn options(&self) -> &'a LowerOptions {
        self.stripper.options
    }

    fn binding_keyword(&self) -> VarDeclKind {
        self.options().target.binding_keyword()
    }

    fn push(&mut self, stmt: Node<Stmt>) {
        self.pending.push(Pending::Stmt(stmt));
    }

    fn push_all(&mut self, stmts: Vec<Node<Stmt>>) {
        self.pending.extend(stmts.into_iter().map(Pending::Stmt));
    }

    fn lower_item(&mut self, item: Node<ModuleItem>) {
        let span = item.span;
        match item.value {
            ModuleItem::Import(import) => {
                if !import.type_only {
                    self.pending.push(Pending::Import(import, span));
                }
            }
            ModuleItem::ImportEquals(decl) => {
                if decl.type_only {
                    return;
                }
                let init = match decl.reference {
                    ModuleReference::External(source) => require(&source),
                    ModuleReference::Entity(mut entity) => {
                        self.stripper.visit_expr(&mut entity);
                        entity
                    }
                };
                let name = decl.name.value.name;
                if decl.is_export {
                    self.prelude.push(name.clone());
                }
                self.pending.push(Pending::ImportEquals {
                    name: name.clone(),
                    init,
                    is_export: decl.is_export,
                    span,
                });
                self.export_locals(&[name], false);
            }
            ModuleItem::Export(export) => self.lower_export(export, span),
            ModuleItem::Stmt(stmt) => {
                let (names, is_function) = match &stmt {
                    Stmt::Decl(decl) if !decl.is_type_only() => {
                        (decl.declared_names(), matches!(decl, Decl::Function(_)))
                    }
                    _ => (Vec::new(), false),
                };
                let mut out = Vec::new();
                self.stripper
                    .lower_statement(Node::new(stmt, span), &mut self.declared, &mut out);
                self.push_all(out);
                self.export_locals(&names, is_function);
            }
        }
    }

    /// Emits the assignments for `export { local as name }` once `local`
    /// has been declared.
    fn export_locals(&mut self, locals: &[String], is_function: bool) {
        for local in locals {
            let Some(exported_names) = self.scan.local_exports.get(local).cloned() else {
                continue;
            };
            for exported in exported_names {
                if is_function {
                    self.function_exports.push((exported, local.clone()));
                } else {
                    self.prelude.push(exported.clone());
                    self.push(expr_stmt(assign(exports_property(&exported), ident(local.as_str()))));
                }
            }
        }
    }

    fn lower_export(&mut self, export: ExportDecl, span: Span) {
        match export {
            ExportDecl::Named {
                type_only: true, ..
            }
            | ExportDecl::All {
                type_only: true, ..
            }
            | ExportDecl::AsNamespace(_) => {}
            ExportDecl::Named {
                specifiers,
                source: None,
                ..
            } => {
                for specifier in specifiers.iter().filter(|s| !s.type_only) {
                    let local = specifier.local.value.name.as_str();
                    let exported = specifier.exported_name();
                    if self.scan.import_locals.contains(local) {
                        // Live binding: read the import on every access
                        self.push(reexport_getter(exported, ident(local)));
                    } else if !self.scan.value_names.contains(local) && !self.scan.is_type_only(local) {
                        self.prelude.push(exported.to_string());
                        self.push(expr_stmt(assign(exports_property(exported), ident(local))));
                    }
                }
            }
            ExportDecl::Named {
                specifiers,
                source: Some(source),
                ..
            } => {
                let specifiers: Vec<&ExportSpecifier> = specifiers.iter().filter(|s| !s.type_only).collect();
                if specifiers.is_empty() {
                    return;
                }
                let module_var = self.module_name_placeholder(&source);
                self.push(var_stmt(self.binding_keyword(), module_var.as_str(), Some(require(&source))));
                for specifier in specifiers {
                    let imported = specifier.local.value.name.as_str();
                    let value = if imported == "default" && self.options().es_module_interop {
                        self.helpers.require(Helper::ImportDefault);
                        let wrapped = call(ident(Helper::ImportDefault.name()), vec![ident(module_var.as_str())]);
                        member(wrapped, "default")
                    } else {
                        property(ident(module_var.as_str()), imported)
                    };
                    self.push(reexport_getter(specifier.exported_name(), value));
                }
            }
            ExportDecl::All {
                source,
                as_name: None,
                ..
            } => {
                self.helpers.require(Helper::ExportStar);
                let star = call(ident(Helper::ExportStar.name()), vec![require(&source), ident("exports")]);
                self.push(Node::new(Stmt::Expr(star), span));
            }
            ExportDecl::All {
                source,
                as_name: Some(name),
                ..
            } => {
                let name = name.value.name;
                let value = self.wrap_import_star(require(&source));
                self.prelude.push(name.clone());
                self.push(expr_stmt(assign(exports_property(&name), value)));
            }
            ExportDecl::Default(mut expr) => {
                self.stripper.visit_expr(&mut expr);
                self.push(Node::new(Stmt::Expr(assign(exports_property("default"), expr)), span));
            }
            ExportDecl::DefaultDecl { decl, .. } => {
                let decl_span = decl.span;
                match decl.value {
                    Decl::Function(function) if !function.is_declare && function.function.body.is_some() => {
                        let name = function.name.value.name.clone();
                        self.lower_decl(Decl::Function(function), decl_span);
                        self.function_exports.push(("default".to_string(), name));
                    }
                    Decl::Class(class) if !class.is_declare => {
                        let name = class.name.value.name.clone();
                        self.lower_decl(Decl::Class(class), decl_span);
                        self.push(expr_stmt(assign(exports_property("default"), ident(name))));
                    }
                    _ => {}
                }
            }
            ExportDecl::Decl(decl) => {
                let decl_span = decl.span;
                self.lower_exported_decl(decl.value, decl_span);
            }
            ExportDecl::Assignment(mut expr) => {
                self.stripper.visit_expr(&mut expr);
                self.has_export_assignment = true;
                self.push(Node::new(
                    Stmt::Expr(assign(member_path("module.exports"), expr)),
                    span,
                ));
            }
        }
    }

    fn lower_exported_decl(&mut self, decl: Decl, span: Span) {
        if decl.is_type_only() {
            return;
        }
        let names = decl.declared_names();
        match decl {
            Decl::Var(var) => {
                self.prelude.extend(names.iter().cloned());
                let stmts = self
                    .stripper
                    .lower_exported_var(var, &ident("exports"), &mut self.exported, true);
                self.push_all(stmts);
                self.export_locals(&names, false);
            }
            Decl::Function(function) => {
                let name = function.name.value.name.clone();
                self.lower_decl(Decl::Function(function), span);
                self.function_exports.push((name.clone(), name));
                self.export_locals(&names, true);
            }
            Decl::Class(class) => {
                let name = class.name.value.name.clone();
                self.prelude.push(name.clone());
                self.lower_decl(Decl::Class(class), span);
                self.push(expr_stmt(assign(exports_property(&name), ident(name.as_str()))));
                self.export_locals(&names, false);
            }
            Decl::Enum(decl) => {
                self.prelude.extend(names.iter().cloned());
                let binding = Binding::Exported(ident("exports"));
                let stmts = self.stripper.lower_enum_decl(&decl, binding, &mut self.declared);
                self.push_all(stmts);
                self.export_locals(&names, false);
            }
            Decl::Module(decl) => {
                self.prelude.extend(names.iter().cloned());
                let binding = Binding::Exported(ident("exports"));
                let stmts = self.stripper.lower_namespace_decl(decl, binding, &mut self.declared);
                self.push_all(stmts);
                self.export_locals(&names, false);
            }
            Decl::Interface(_) | Decl::TypeAlias(_) => {}
        }
    }

    fn lower_decl(&mut self, decl: Decl, span: Span) {
        let mut out = Vec::new();
        self.stripper
            .lower_statement(Node::new(Stmt::Decl(decl), span), &mut self.declared, &mut out);
        self.push_all(out);
    }

    fn wrap_import_star(&mut self, value: Node<Expr>) -> Node<Expr> {
        if self.options().es_module_interop {
            self.helpers.require(Helper::ImportStar);
            call(ident(Helper::ImportStar.name()), vec![value])
        } else {
            value
        }
    }

    /// Re-export bindings are named before every identifier in the file is
    /// known; a marker is recorded and the final name chosen later.
    fn module_name_placeholder(&mut self, source: &str) -> String {
        self.placeholders += 1;
        format!("{}{}:{}", PLACEHOLDER_PREFIX, self.placeholders, module_base_name(source))
    }

    /// Second pass: decides which imports survive, binds them, and rewrites
    /// references.
    fn materialize_imports(&mut self) -> Vec<Node<Stmt>> {
        let pending = std::mem::take(&mut self.pending);

        let mut usage = NameUsage::default();
        for entry in &pending {
            match entry {
                Pending::Stmt(stmt) => usage.visit_stmt(&mut stmt.clone()),
                Pending::ImportEquals { init, .. } => usage.visit_expr(&mut init.clone()),
                Pending::Import(..) => {}
            }
        }

        let mut names = ModuleNames::new(&usage, &self.scan);
        let mut imports = Substitution::default();
        let mut renamed_placeholders: HashMap<String, String> = HashMap::new();
        let mut body = Vec::new();

        for entry in pending {
            match entry {
                Pending::Stmt(stmt) => body.push(stmt),
                Pending::ImportEquals {
                    name,
                    init,
                    is_export,
                    span,
                } => {
                    let used = usage.references.contains(&name)
                        || self.scan.local_exports.contains_key(&name)
                        || is_export;
                    if !used {
                        continue;
                    }
                    let mut stmt = var_stmt(self.binding_keyword(), name.as_str(), Some(init));
                    stmt.span = span;
                    body.push(stmt);
                    if is_export {
                        body.push(expr_stmt(assign(exports_property(&name), ident(name.as_str()))));
                    }
                }
                Pending::Import(import, span) => {
                    if let Some(mut stmt) = self.bind_import(import, &usage, &mut names, &mut imports) {
                        stmt.span = span;
                        body.push(stmt);
                    }
                }
            }
        }

        // Re-export bindings get their final names now that every
        // identifier in the file is known
        let mut placeholders = Placeholders {
            names: &mut names,
            chosen: &mut renamed_placeholders,
        };
        for stmt in &mut body {
            placeholders.visit_stmt(stmt);
        }

        self.exported.apply_stmts(&mut body);
        imports.apply_stmts(&mut body);
        body
    }

    fn bind_import(
        &mut self,
        import: ImportDecl,
        usage: &NameUsage,
        names: &mut ModuleNames,
        imports: &mut Substitution,
    ) -> Option<Node<Stmt>> {
        let source = import.source;
        if import.bare || import.specifiers.is_empty() {
            return Some(expr_stmt(require(&source)));
        }

        let used: Vec<ImportSpecifier> = import
            .specifiers
            .into_iter()
            .filter(|specifier| !matches!(specifier, ImportSpecifier::Named { type_only: true, .. }))
            .filter(|specifier| usage.references.contains(specifier.local_name()))
            .collect();
        if used.is_empty() {
            return None;
        }

        let default_local = used.iter().find_map(|specifier| match specifier {
            ImportSpecifier::Default(local) => Some(local.value.name.clone()),
            _ => None,
        });
        let namespace_local = used.iter().find_map(|specifier| match specifier {
            ImportSpecifier::Namespace(local) => Some(local.value.name.clone()),
            _ => None,
        });
        let named: Vec<(String, String)> = used
            .iter()
            .filter_map(|specifier| match specifier {
                ImportSpecifier::Named { imported, .. } => {
                    Some((imported.value.name.clone(), specifier.local_name().to_string()))
                }
                _ => None,
            })
            .collect();

        let interop = self.options().es_module_interop;
        let (binding, init) = match &namespace_local {
            Some(namespace) => (namespace.clone(), self.wrap_import_star(require(&source))),
            None => {
                let binding = names.fresh(&source);
                let init = match (&default_local, named.is_empty()) {
                    (Some(_), true) if interop => {
                        self.helpers.require(Helper::ImportDefault);
                        call(ident(Helper::ImportDefault.name()), vec![require(&source)])
                    }
                    (Some(_), false) => self.wrap_import_star(require(&source)),
                    _ => require(&source),
                };
                (binding, init)
            }
        };

        if let Some(local) = default_local {
            imports.insert(local, Replacement::new(member(ident(binding.as_str()), "default")).indirect());
        }
        for (imported, local) in named {
            imports.insert(local, Replacement::new(property(ident(binding.as_str()), &imported)).indirect());
        }

        Some(var_stmt(self.binding_keyword(), binding, Some(init)))
    }
}

const PLACEHOLDER_PREFIX: &str = "\u{0}module:";

/// Generated `<name>_<n>` bindings that collide with nothing in the file.
struct ModuleNames {
    taken: HashSet<String>,
}

impl ModuleNames {
    fn new(usage: &NameUsage, scan: &ModuleScan) -> Self {
        let mut taken: HashSet<String> = usage.references.union(&usage.bindings).cloned().collect();
        taken.extend(scan.value_names.iter().cloned());
        taken.extend(scan.import_locals.iter().cloned());
        Self { taken }
    }

    fn fresh(&mut self, source: &str) -> String {
        self.fresh_from_base(&module_base_name(source))
    }

    fn fresh_from_base(&mut self, base: &str) -> String {
        let mut counter = 1;
        loop {
            let candidate = format!("{}_{}", base, counter);
            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
            counter += 1;
        }
    }
}

struct Placeholders<'n> {
    names: &'n mut ModuleNames,
    chosen: &'n mut HashMap<String, String>,
}

impl Placeholders<'_> {
    fn resolve(&mut self, name: &mut String) {
        let Some((_, base)) = name
            .strip_prefix(PLACEHOLDER_PREFIX)
            .and_then(|rest| rest.split_once(':'))
        else {
            return;
        };
        let base = base.to_string();
        let resolved = match self.chosen.get(name.as_str()) {
            Some(resolved) => resolved.clone(),
            None => {
                let fresh = self.names.fresh_from_base(&base);
                self.chosen.insert(name.clone(), fresh.clone());
                fresh
            }
        };
        *name = resolved;
    }
}

impl VisitMut for Placeholders<'_> {
    fn visit_expr(&mut self, expr: &mut Node<Expr>) {
        if let Expr::Ident(ident) = &mut expr.value {
            self.resolve(&mut ident.name);
        }
        walk_expr(self, expr);
    }

    fn visit_pattern(&mut self, pattern: &mut Node<Pattern>) {
        if let Pattern::Ident(ident) = &mut pattern.value {
            self.resolve(&mut ident.value.name);
        }
        tsdual_ast::visit::walk_pattern(self, pattern);
    }
}

/// `import("m")` becomes a deferred `require`; `import.meta` has no
/// CommonJS equivalent.
struct DynamicImports<'a> {
    options: &'a LowerOptions,
    helpers: &'a mut HelperSet,
    diagnostics: &'a mut Vec<EmitDiagnostic>,
}

impl VisitMut for DynamicImports<'_> {
    fn visit_expr(&mut self, expr: &mut Node<Expr>) {
        walk_expr(self, expr);

        match &mut expr.value {
            Expr::DynamicImport(argument) => {
                let argument = std::mem::replace(&mut **argument, void_zero());
                expr.value = self.deferred_require(argument).value;
            }
            Expr::MetaProperty { meta, property }
                if meta.value.name == "import" && property.value.name == "meta" =>
            {
                self.diagnostics.push(EmitDiagnostic::new(
                    "The 'import.meta' meta-property is only allowed when the '--module' option is 'es2020', 'es2022', 'esnext', 'system', 'node16', or 'nodenext'.",
                    expr.span,
                    1343,
                ));
            }
            _ => {}
        }
    }
}

impl DynamicImports<'_> {
    /// `Promise.resolve().then(() => require("m"))`, or with a computed
    /// specifier `Promise.resolve(`${x}`).then((s) => require(s))`.
    fn deferred_require(&mut self, argument: Node<Expr>) -> Node<Expr> {
        let is_literal = matches!(argument.value, Expr::Literal(Literal::String(_)));
        let (resolve_args, params, required) = if is_literal {
            (Vec::new(), Vec::new(), argument)
        } else {
            let template = Node::synthetic(Expr::Template {
                parts: vec![String::new(), String::new()],
                exprs: vec![argument],
            });
            (vec![template], vec!["s"], ident("s"))
        };

        let mut loaded = call(ident("require"), vec![required]);
        if self.options.es_module_interop {
            self.helpers.require(Helper::ImportStar);
            loaded = call(ident(Helper::ImportStar.name()), vec![loaded]);
        }

        let callback = if self.options.target >= ScriptTarget::Es2015 {
            arrow(&params, loaded)
        } else {
            function_returning(&params, loaded)
        };
        let resolved = call(member_path("Promise.resolve"), resolve_args);
        call(member(resolved, "then"), vec![callback])
    }
}

fn function_returning(params: &[&str], value: Node<Expr>) -> Node<Expr> {
    Node::synthetic(Expr::Function {
        name: None,
        function: Box::new(Function {
            type_params: None,
            params: params
                .iter()
                .map(|name| Param::new(Node::synthetic(Pattern::ident(*name))))
                .collect(),
            return_type: None,
            body: Some(Node::synthetic(BlockStmt {
                stmts: vec![Node::synthetic(Stmt::Return(Some(value)))],
            })),
            is_async: false,
            is_generator: false,
        }),
    })
}

/// `Object.defineProperty(exports, "name", { enumerable: true, get: function () { return value; } });`
fn reexport_getter(exported: &str, value: Node<Expr>) -> Node<Stmt> {
    let descriptor = object(vec![
        ("enumerable", boolean(true)),
        ("get", function_returning(&[], value)),
    ]);
    expr_stmt(define_property(ident("exports"), exported, descriptor))
}

/// `exports.x = exports.y = void 0;`, names chained in reverse order.
fn void_prelude(names: &[String]) -> Option<Node<Stmt>> {
    let mut seen = HashSet::new();
    let names: Vec<&String> = names
        .iter()
        .filter(|name| name.as_str() != "default" && seen.insert(name.as_str()))
        .collect();
    if names.is_empty() {
        return None;
    }
    let chain = names
        .into_iter()
        .fold(void_zero(), |value, name| assign(exports_property(name), value));
    Some(expr_stmt(chain))
}

fn require(source: &str) -> Node<Expr> {
    call(ident("require"), vec![string(source)])
}

fn exports_property(name: &str) -> Node<Expr> {
    property(ident("exports"), name)
}

/// `object.name`, or `object["name"]` when `name` is not an identifier.
fn property(object: Node<Expr>, name: &str) -> Node<Expr> {
    if is_identifier_name(name) {
        member(object, name)
    } else {
        index(object, string(name))
    }
}

fn is_identifier_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

/// `./lib/my-util.js` -> `my_util_js`; the last path segment with every
/// character that cannot appear in an identifier replaced.
pub(crate) fn module_base_name(source: &str) -> String {
    let segment = source
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(source);
    let mut base: String = segment
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' || c == '$' { c } else { '_' })
        .collect();
    if base.is_empty() || base.starts_with(|c: char| c.is_ascii_digit()) {
        base.insert(0, '_');
    }
    base
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::printer::print_program;
    use pretty_assertions::assert_eq;

    fn lower(source: &str, es_module_interop: bool) -> Lowered {
        let options = LowerOptions {
            target: ScriptTarget::Es2020,
            es_module_interop,
            ..LowerOptions::default()
        };
        let program = tsdual_parser::parse_source(source, 0).unwrap();
        lower_commonjs(program, &options)
    }

    fn output(source: &str) -> String {
        print_program(&lower(source, false).program)
    }

    const PROLOGUE: &str = "\"use strict\";\nObject.defineProperty(exports, \"__esModule\", { value: true });\n";

    #[test]
    fn test_default_export_literal() {
        assert_eq!(output("export default 42;"), format!("{}exports.default = 42;\n", PROLOGUE));
    }

    #[test]
    fn test_exported_variables_read_through_exports() {
        assert_eq!(
            output("export const a = 1;\nexport let b = compute();\nexport function f() { return a + b; }"),
            format!(
                "{}exports.b = exports.a = void 0;\nexports.f = f;\nexports.a = 1;\nexports.b = compute();\nfunction f() {{\n    return exports.a + exports.b;\n}}\n",
                PROLOGUE
            )
        );
    }

    #[test]
    fn test_named_imports_become_property_reads() {
        assert_eq!(
            output("import { add, unused } from \"./math\";\nimport type { T } from './types';\nconsole.log(add(1, 2));"),
            format!("{}const math_1 = require(\"./math\");\nconsole.log((0, math_1.add)(1, 2));\n", PROLOGUE)
        );
    }

    #[test]
    fn test_default_import_with_interop() {
        let lowered = lower("import fs from \"fs\";\nfs.readFileSync(\"x\");", true);
        let text = print_program(&lowered.program);
        assert!(text.contains("var __importDefault = "), "{}", text);
        assert!(text.contains("const fs_1 = __importDefault(require(\"fs\"));"), "{}", text);
        assert!(text.contains("fs_1.default.readFileSync(\"x\");"), "{}", text);
    }

    #[test]
    fn test_namespace_import() {
        let text = output("import * as path from \"path\";\npath.join(\"a\");");
        assert!(text.contains("const path = require(\"path\");\npath.join(\"a\");"), "{}", text);
    }

    #[test]
    fn test_local_export_specifier_follows_declaration() {
        assert_eq!(
            output("enum E { A }\nexport { E };"),
            format!(
                "{}exports.E = void 0;\nvar E;\n(function (E) {{\n    E[E[\"A\"] = 0] = \"A\";\n}})(E || (E = {{}}));\nexports.E = E;\n",
                PROLOGUE
            )
        );
    }

    #[test]
    fn test_directly_exported_enum_binds_through_exports() {
        let text = output("export enum E { A }");
        assert!(text.contains("})(E || (exports.E = E = {}));"), "{}", text);
    }

    #[test]
    fn test_reexports() {
        let text = output("export { a as b, default as c } from \"./m\";\nexport * from \"./n\";");
        assert!(text.contains("const m_1 = require(\"./m\");"), "{}", text);
        assert!(text.contains(
            "Object.defineProperty(exports, \"b\", { enumerable: true, get: function () { return m_1.a; } });"
        ));
        assert!(text.contains("__exportStar(require(\"./n\"), exports);"));
        assert!(text.contains("var __createBinding = "));
    }

    #[test]
    fn test_export_assignment_skips_es_module_marker() {
        let text = output("import x = require(\"./x\");\nexport = x;");
        assert_eq!(text, "\"use strict\";\nconst x = require(\"./x\");\nmodule.exports = x;\n");
    }

    #[test]
    fn test_dynamic_import() {
        let text = output("export const load = () => import(\"./lazy\");");
        assert!(
            text.contains("exports.load = () => Promise.resolve().then(() => require(\"./lazy\"));"),
            "{}",
            text
        );
    }

    #[test]
    fn test_anonymous_default_function() {
        let text = output("export default function () { return 1; }");
        assert!(text.contains("exports.default = default_1;\nfunction default_1() {"), "{}", text);
    }

    #[test]
    fn test_es5_uses_var() {
        let options = LowerOptions {
            target: ScriptTarget::Es5,
            ..LowerOptions::default()
        };
        let program = tsdual_parser::parse_source("import { a } from \"./a\";\na();", 0).unwrap();
        let text = print_program(&lower_commonjs(program, &options).program);
        assert!(text.contains("var a_1 = require(\"./a\");"), "{}", text);
    }

    #[test]
    fn test_import_meta_is_reported() {
        let lowered = lower("export const u = import.meta.url;", false);
        assert_eq!(lowered.diagnostics.iter().map(|d| d.code).collect::<Vec<_>>(), vec![1343]);
    }

    #[test]
    fn test_module_base_name() {
        assert_eq!(module_base_name("./lib/my-util.js"), "my_util_js");
        assert_eq!(module_base_name("@scope/pkg"), "pkg");
        assert_eq!(module_base_name("./1st"), "_1st");
    }
}

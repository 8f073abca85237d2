//! Makes a CommonJS module's default export its root export.
//!
//! For a module with `exports.default = value`, the rewrite adds
//! `module.exports = exports = value;` so `require()` returns the default
//! export itself, then replays every named export onto the new `exports`
//! object. Property definitions are routed through a small runtime
//! registry (`__tsu`) so they can be installed again after the swap:
//!
//! ```js
//! const __tsu = { cache: [], defineExport(name, def) { ... }, redefineExports() { ... } };
//! "use strict";
//! ...module body, with defineProperty calls recorded...
//! module.exports = exports = value;
//! Object.defineProperty(exports, "__esModule", { value: true });
//! __tsu.redefineExports();
//! exports.named = named;
//! exports.default = value;
//! ```

use std::collections::HashSet;

use tracing::debug;
use tsdual_ast::factory::{
    assign, call, expr_stmt, ident, item, member, member_path, object, string, var_stmt,
};
use tsdual_ast::visit::{walk_expr, walk_pattern, VisitMut};
use tsdual_ast::{
    AssignmentOp, BlockStmt, Expr, Function, Ident, Literal, MethodKind, ModuleItem, Node, ObjectProperty,
    Param, Pattern, Program, PropertyName, Stmt, UnaryOp, VarDeclKind,
};
use tsdual_toolchain::{ScriptTarget, TransformContext, Transformer};

const REGISTRY: &str = "__tsu";
const DEFAULT_BINDING: &str = "__defaultExport";

/// A top-level statement the hoister cares about.
enum ExportStatement {
    /// `Object.defineProperty(exports, "__esModule", ...)`
    EsModuleMarker,
    /// `Object.defineProperty(exports, "name", descriptor)`
    DefineProperty { name: String, descriptor: Node<Expr> },
    /// `exports.name = value`, `name` possibly `default`
    Assignment {
        name: String,
        target: Node<Expr>,
        value: Node<Expr>,
    },
}

/// What the module scope accumulated while its statements were rewritten.
///
/// Lowering only emits export bookkeeping at the top level, and only
/// top-level statements are rewritten, so the scope stack never grows past
/// the module scope and one accumulator stands in for it. Nested blocks and
/// functions are copied through untouched.
#[derive(Default)]
struct ModuleExports {
    intro: Vec<Node<ModuleItem>>,
    tail: Vec<Node<ModuleItem>>,
    collected: bool,
}

struct ExportHoister {
    target: ScriptTarget,
    keyword: VarDeclKind,
    taken: HashSet<String>,
    exports: ModuleExports,
}

/// Rewrites `program`, a module already lowered to CommonJS. Modules
/// without a top-level `exports.default = ...` are left as they are.
pub fn hoist_exports(program: &mut Program, target: ScriptTarget) {
    if !program.items.iter().any(is_default_export) {
        return;
    }

    let mut names = NameCollector::default();
    names.visit_program(program);

    let mut hoister = ExportHoister {
        target,
        keyword: target.binding_keyword(),
        taken: names.names,
        exports: ModuleExports::default(),
    };

    let mut body = Vec::with_capacity(program.items.len());
    for item in std::mem::take(&mut program.items) {
        hoister.rewrite(item, &mut body);
    }

    let exports = hoister.exports;
    if !exports.collected {
        program.items = body;
        return;
    }
    debug!(
        intro = exports.intro.len(),
        tail = exports.tail.len(),
        "hoisted default export to the module root"
    );

    let mut items = Vec::with_capacity(body.len() + exports.intro.len() + exports.tail.len() + 2);
    items.push(item(registry(hoister.target)));
    items.extend(body);
    items.extend(exports.intro);
    items.push(item(expr_stmt(call(member(ident(REGISTRY), "redefineExports"), Vec::new()))));
    items.extend(exports.tail);
    program.items = items;
}

impl ExportHoister {
    fn rewrite(&mut self, node: Node<ModuleItem>, out: &mut Vec<Node<ModuleItem>>) {
        let Some(statement) = classify(&node.value) else {
            out.push(node);
            return;
        };
        self.exports.collected = true;

        match statement {
            ExportStatement::EsModuleMarker => {
                self.exports.intro.push(node.clone());
                out.push(node);
            }
            ExportStatement::DefineProperty { name, descriptor } => {
                let record = call(
                    member(ident(REGISTRY), "defineExport"),
                    vec![string(name), descriptor],
                );
                out.push(Node::new(ModuleItem::Stmt(Stmt::Expr(record)), node.span));
            }
            ExportStatement::Assignment { name, target, value } => {
                let is_default = name == "default";
                let value = if is_hoistable(&value.value) {
                    out.push(node);
                    value
                } else {
                    let binding = if is_default {
                        self.fresh_name(DEFAULT_BINDING)
                    } else {
                        self.fresh_name(&format!("__export_{}", sanitize(&name)))
                    };
                    out.push(Node::new(
                        ModuleItem::Stmt(var_stmt(self.keyword, binding.clone(), Some(value)).value),
                        node.span,
                    ));
                    out.push(item(expr_stmt(assign(target.clone(), ident(binding.clone())))));
                    ident(binding)
                };

                if is_default {
                    // module.exports = exports = value;
                    let root = assign(member_path("module.exports"), assign(ident("exports"), value.clone()));
                    self.exports.intro.insert(0, item(expr_stmt(root)));
                }
                self.exports.tail.push(item(expr_stmt(assign(target, value))));
            }
        }
    }

    fn fresh_name(&mut self, base: &str) -> String {
        let mut name = base.to_string();
        let mut counter = 1;
        while self.taken.contains(&name) {
            name = format!("{}_{}", base, counter);
            counter += 1;
        }
        self.taken.insert(name.clone());
        name
    }
}

fn classify(item: &ModuleItem) -> Option<ExportStatement> {
    let ModuleItem::Stmt(Stmt::Expr(expr)) = item else {
        return None;
    };
    match &expr.value {
        Expr::Call { callee, args, .. }
            if callee.value.member_of("Object") == Some("defineProperty")
                && args.len() == 3
                && args[0].value.is_ident("exports") =>
        {
            let Expr::Literal(Literal::String(name)) = &args[1].value else {
                return None;
            };
            if name == "__esModule" {
                Some(ExportStatement::EsModuleMarker)
            } else {
                Some(ExportStatement::DefineProperty {
                    name: name.clone(),
                    descriptor: args[2].clone(),
                })
            }
        }
        Expr::Assignment {
            target,
            op: AssignmentOp::Assign,
            value,
        } => {
            let name = exports_property(&target.value)?;
            if is_void_chain(&value.value) {
                return None;
            }
            Some(ExportStatement::Assignment {
                name,
                target: (**target).clone(),
                value: (**value).clone(),
            })
        }
        _ => None,
    }
}

fn is_default_export(item: &Node<ModuleItem>) -> bool {
    matches!(
        classify(&item.value),
        Some(ExportStatement::Assignment { name, .. }) if name == "default"
    )
}

/// `exports.name` or `exports["name"]`.
fn exports_property(target: &Expr) -> Option<String> {
    match target {
        Expr::Member { object, property } if object.value.is_ident("exports") => {
            Some(property.value.name.clone())
        }
        Expr::Index { object, index } if object.value.is_ident("exports") => match &index.value {
            Expr::Literal(Literal::String(name)) => Some(name.clone()),
            _ => None,
        },
        _ => None,
    }
}

/// `void 0`, or `exports.a = exports.b = void 0`.
fn is_void_chain(value: &Expr) -> bool {
    match value {
        Expr::Unary {
            op: UnaryOp::Void,
            expr,
        } => matches!(expr.value, Expr::Literal(Literal::Number(n)) if n == 0.0),
        Expr::Assignment {
            target,
            op: AssignmentOp::Assign,
            value,
        } => exports_property(&target.value).is_some() && is_void_chain(&value.value),
        _ => false,
    }
}

/// Values that can be evaluated again at the end of the module.
fn is_hoistable(value: &Expr) -> bool {
    match value {
        Expr::Ident(_) => true,
        Expr::Literal(Literal::Null) => false,
        Expr::Literal(_) => true,
        Expr::Member { object, .. } => matches!(object.value, Expr::Ident(_)),
        _ => false,
    }
}

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '$' { c } else { '_' })
        .collect()
}

/// The `__tsu` object that records property exports until
/// `redefineExports()` installs them on the final `exports` object.
fn registry(target: ScriptTarget) -> Node<Stmt> {
    let this_cache = || member(Node::synthetic(Expr::This), "cache");
    let key = |name: &str| PropertyName::Ident(Node::synthetic(Ident::new(name)));
    let method = |name: &str, params: &[&str], stmts: Vec<Node<Stmt>>| {
        if target >= ScriptTarget::Es2015 {
            ObjectProperty::Method {
                key: key(name),
                kind: MethodKind::Method,
                function: function(params, stmts),
            }
        } else {
            ObjectProperty::Property {
                key: key(name),
                value: function_expr(params, stmts),
                shorthand: false,
            }
        }
    };

    // this.cache.push({ name: name, def: def });
    let push = expr_stmt(call(
        member(this_cache(), "push"),
        vec![object(vec![("name", ident("name")), ("def", ident("def"))])],
    ));
    // this.cache.forEach(function (entry) { Object.defineProperty(exports, entry.name, entry.def); });
    let install = expr_stmt(call(
        member_path("Object.defineProperty"),
        vec![
            ident("exports"),
            member(ident("entry"), "name"),
            member(ident("entry"), "def"),
        ],
    ));
    let replay = expr_stmt(call(
        member(this_cache(), "forEach"),
        vec![function_expr(&["entry"], vec![install])],
    ));
    let reset = expr_stmt(assign(this_cache(), Node::synthetic(Expr::Array(Vec::new()))));

    let registry = Node::synthetic(Expr::Object(vec![
        ObjectProperty::Property {
            key: key("cache"),
            value: Node::synthetic(Expr::Array(Vec::new())),
            shorthand: false,
        },
        method("defineExport", &["name", "def"], vec![push]),
        method("redefineExports", &[], vec![replay, reset]),
    ]));
    var_stmt(target.binding_keyword(), REGISTRY, Some(registry))
}

fn function_expr(params: &[&str], stmts: Vec<Node<Stmt>>) -> Node<Expr> {
    Node::synthetic(Expr::Function {
        name: None,
        function: Box::new(function(params, stmts)),
    })
}

fn function(params: &[&str], stmts: Vec<Node<Stmt>>) -> Function {
    Function {
        type_params: None,
        params: params
            .iter()
            .map(|name| Param::new(Node::synthetic(Pattern::ident(*name))))
            .collect(),
        return_type: None,
        body: Some(Node::synthetic(BlockStmt { stmts })),
        is_async: false,
        is_generator: false,
    }
}

/// Every identifier the module mentions, so synthesized bindings can avoid
/// them.
#[derive(Default)]
struct NameCollector {
    names: HashSet<String>,
}

impl VisitMut for NameCollector {
    fn visit_expr(&mut self, expr: &mut Node<Expr>) {
        if let Expr::Ident(ident) = &expr.value {
            self.names.insert(ident.name.clone());
        }
        walk_expr(self, expr);
    }

    fn visit_pattern(&mut self, pattern: &mut Node<Pattern>) {
        if let Pattern::Ident(ident) = &pattern.value {
            self.names.insert(ident.value.name.clone());
        }
        walk_pattern(self, pattern);
    }
}

/// [`hoist_exports`] as an after-emit transformer for CommonJS output.
#[derive(Debug, Clone, Copy, Default)]
pub struct HoistExports;

impl Transformer for HoistExports {
    fn name(&self) -> &'static str {
        "hoist-exports"
    }

    fn transform(&self, program: &mut Program, context: &TransformContext<'_>) {
        hoist_exports(program, context.options.target());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tsdual_emit::{lower, print_program, LowerOptions, ModuleKind};

    fn commonjs(source: &str, target: ScriptTarget) -> Program {
        let options = LowerOptions {
            module: ModuleKind::CommonJs,
            target,
            ..LowerOptions::default()
        };
        let mut program = tsdual_parser::parse_source(source, 0).unwrap();
        crate::split_enum_exports(&mut program);
        lower(program, &options).program
    }

    fn hoisted(source: &str, target: ScriptTarget) -> String {
        let mut program = commonjs(source, target);
        hoist_exports(&mut program, target);
        print_program(&program)
    }

    fn lines(output: &str) -> Vec<&str> {
        output.lines().collect()
    }

    #[test]
    fn test_literal_default_becomes_root_export() {
        let output = hoisted("export default 42;\n", ScriptTarget::Es2020);
        let lines = lines(&output);
        assert!(lines[0].starts_with("const __tsu = {"), "{}", output);
        assert_eq!(
            &lines[lines.len() - 5..],
            &[
                "exports.default = 42;",
                "module.exports = exports = 42;",
                "Object.defineProperty(exports, \"__esModule\", { value: true });",
                "__tsu.redefineExports();",
                "exports.default = 42;",
            ]
        );
    }

    #[test]
    fn test_tail_replays_named_exports_after_one_batch_install() {
        let source = "export const a = 1;\nexport function f() {}\nexport enum E { A }\nexport default f;\n";
        let output = hoisted(source, ScriptTarget::Es2020);
        let lines = lines(&output);

        let redefine = lines.iter().position(|l| *l == "__tsu.redefineExports();").unwrap();
        let root = lines.iter().position(|l| *l == "module.exports = exports = f;").unwrap();
        assert!(root < redefine);
        assert_eq!(lines.iter().filter(|l| l.trim() == "__tsu.redefineExports();").count(), 1);

        let tail: Vec<&str> = lines[redefine + 1..].to_vec();
        assert_eq!(tail.len(), 4, "{}", output);
        for expected in ["exports.a = 1;", "exports.f = f;", "exports.E = E;", "exports.default = f;"] {
            assert!(tail.contains(&expected), "missing {expected} in {tail:?}");
        }
        assert_eq!(tail.last(), Some(&"exports.default = f;"));
        // the void 0 initializer stays where it was and is not replayed
        assert!(lines.iter().any(|l| l.ends_with("= void 0;")));
    }

    #[test]
    fn test_computed_values_get_bindings() {
        let output = hoisted(
            "export const total = compute();\nexport default { total };\nfunction compute() { return 1; }\n",
            ScriptTarget::Es2020,
        );
        assert!(output.contains("const __export_total = compute();\nexports.total = __export_total;\n"), "{}", output);
        assert!(
            output.contains("const __defaultExport = { total: exports.total };\nexports.default = __defaultExport;\n"),
            "{}",
            output
        );
        assert!(output.contains("module.exports = exports = __defaultExport;\n"), "{}", output);
        assert!(output.ends_with("exports.total = __export_total;\nexports.default = __defaultExport;\n"), "{}", output);
    }

    #[test]
    fn test_es5_bindings_use_var_and_avoid_collisions() {
        let output = hoisted(
            "var __defaultExport = 1;\nexport default [__defaultExport];\n",
            ScriptTarget::Es5,
        );
        assert!(output.starts_with("var __tsu = {"), "{}", output);
        assert!(output.contains("var __defaultExport_1 = [__defaultExport];\n"), "{}", output);
        assert!(output.contains("    defineExport: function (name, def) {\n"), "{}", output);
        assert!(!output.contains("const "), "{}", output);
    }

    #[test]
    fn test_define_property_exports_are_recorded() {
        let output = hoisted("export { helper } from './helper';\nexport default 1;\n", ScriptTarget::Es2020);
        assert!(output.contains("__tsu.defineExport(\"helper\", {"), "{}", output);
        assert!(!output.contains("Object.defineProperty(exports, \"helper\""), "{}", output);
    }

    #[test]
    fn test_registry_shape() {
        let print = |target| {
            print_program(&Program {
                items: vec![item(registry(target))],
                span: Default::default(),
            })
        };
        let output = print(ScriptTarget::Es2020);
        assert_eq!(
            output,
            "const __tsu = {\n    cache: [],\n    defineExport(name, def) {\n        this.cache.push({ name: name, def: def });\n    },\n    redefineExports() {\n        this.cache.forEach(function (entry) {\n            Object.defineProperty(exports, entry.name, entry.def);\n        });\n        this.cache = [];\n    }\n};\n"
        );

        let es5 = print(ScriptTarget::Es5);
        assert!(es5.starts_with("var __tsu = {\n    cache: [],\n    defineExport: function (name, def) {\n"), "{}", es5);
    }

    #[test]
    fn test_modules_without_default_export_are_unchanged() {
        let before = commonjs("export const a = 1;\nexport function f() {}\n", ScriptTarget::Es2020);
        let mut after = before.clone();
        hoist_exports(&mut after, ScriptTarget::Es2020);
        assert_eq!(after, before);
    }

    #[test]
    fn test_nested_scopes_are_untouched() {
        let output = hoisted(
            "export default function main() { exports.inner = compute(); }\ndeclare function compute(): number;\n",
            ScriptTarget::Es2020,
        );
        assert!(output.contains("    exports.inner = compute();\n"), "{}", output);
        assert!(!output.contains("__export_inner"), "{}", output);

        // only the module scope feeds the replayed tail
        let lines = lines(&output);
        let redefine = lines.iter().position(|l| *l == "__tsu.redefineExports();").unwrap();
        assert!(lines[redefine + 1..].iter().all(|l| !l.contains("inner")), "{}", output);
        assert_eq!(lines.iter().filter(|l| l.contains("exports.inner")).count(), 1);
    }
}

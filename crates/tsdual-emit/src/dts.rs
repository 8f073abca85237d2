//! Declaration (`.d.ts`) output.
//!
//! Types are taken from annotations as written. Where an annotation is
//! missing the emitter infers only what is evident from syntax: literal
//! initializers, `new C()`, function expressions, and whether a function
//! body returns a value. Everything else is `any`.

use std::collections::HashSet;
use std::fmt::Write;

use tsdual_ast::*;

use crate::enums::{evaluate_enum, EnumValue};
use crate::printer::{format_number, print_expr, quote};

/// Renders the declaration file for `program`.
pub fn emit_declarations(program: &Program) -> String {
    let mut writer = DeclarationWriter::default();
    writer.items(&program.items, Context::TopLevel);

    let has_module_syntax = program
        .items
        .iter()
        .any(|item| matches!(item.value, ModuleItem::Import(_) | ModuleItem::Export(_) | ModuleItem::ImportEquals(_)));
    if program.is_module() && (writer.wrote_private || !has_module_syntax) && !writer.wrote_empty_export {
        writer.line("export {};");
    }
    writer.out
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Context {
    TopLevel,
    /// Inside `declare namespace` or `declare module`, already ambient
    Ambient,
}

#[derive(Default)]
struct DeclarationWriter {
    out: String,
    indent: usize,
    /// A non-exported declaration was written at the top level of a module
    wrote_private: bool,
    wrote_empty_export: bool,
}

impl DeclarationWriter {
    fn line(&mut self, text: &str) {
        for _ in 0..self.indent {
            self.out.push_str("    ");
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn items(&mut self, items: &[Node<ModuleItem>], context: Context) {
        let overloaded = overloaded_functions(items);
        let mut seen_implementation = HashSet::new();

        for item in items {
            match &item.value {
                ModuleItem::Import(import) => {
                    let text = import_text(import);
                    self.line(&text);
                }
                ModuleItem::ImportEquals(decl) => {
                    let reference = match &decl.reference {
                        ModuleReference::External(source) => format!("require({})", quote(source)),
                        ModuleReference::Entity(entity) => print_expr(entity),
                    };
                    let text = format!(
                        "{}import {}{} = {};",
                        if decl.is_export { "export " } else { "" },
                        if decl.type_only { "type " } else { "" },
                        decl.name.value.name,
                        reference
                    );
                    self.line(&text);
                }
                ModuleItem::Export(export) => self.export(export, context, &overloaded, &mut seen_implementation),
                ModuleItem::Stmt(Stmt::Decl(decl)) => {
                    if context == Context::Ambient && !is_global_or_module(decl) {
                        // Only exported namespace members are visible
                        continue;
                    }
                    if skip_overload_implementation(decl, &overloaded, &mut seen_implementation) {
                        continue;
                    }
                    let wrote = self.decl(decl, "", context);
                    if wrote && context == Context::TopLevel && !is_global_or_module(decl) {
                        self.wrote_private = true;
                    }
                }
                ModuleItem::Stmt(_) => {}
            }
        }
    }

    fn export(
        &mut self,
        export: &ExportDecl,
        context: Context,
        overloaded: &HashSet<String>,
        seen_implementation: &mut HashSet<String>,
    ) {
        match export {
            ExportDecl::Named {
                specifiers,
                source,
                type_only,
            } => {
                let list: Vec<String> = specifiers.iter().map(export_specifier_text).collect();
                let mut text = format!("export {}", if *type_only { "type " } else { "" });
                if list.is_empty() {
                    text.push_str("{}");
                    if source.is_none() {
                        self.wrote_empty_export = true;
                    }
                } else {
                    let _ = write!(text, "{{ {} }}", list.join(", "));
                }
                if let Some(source) = source {
                    let _ = write!(text, " from {}", quote(source));
                }
                text.push(';');
                self.line(&text);
            }
            ExportDecl::All {
                source,
                as_name,
                type_only,
            } => {
                let mut text = format!("export {}*", if *type_only { "type " } else { "" });
                if let Some(name) = as_name {
                    let _ = write!(text, " as {}", name.value.name);
                }
                let _ = write!(text, " from {};", quote(source));
                self.line(&text);
            }
            ExportDecl::Default(expr) => match &expr.value {
                Expr::Ident(ident) => self.line(&format!("export default {};", ident.name)),
                _ => {
                    let ty = infer_expr_type(expr, true).unwrap_or_else(|| "any".to_string());
                    let keyword = if context == Context::TopLevel { "declare " } else { "" };
                    self.line(&format!("{}const _default: {};", keyword, ty));
                    self.line("export default _default;");
                }
            },
            ExportDecl::DefaultDecl { decl, anonymous } => {
                if skip_overload_implementation(&decl.value, overloaded, seen_implementation) {
                    return;
                }
                match &decl.value {
                    Decl::Function(function) => {
                        let name = if *anonymous { "" } else { function.name.value.name.as_str() };
                        let text = format!("export default {};", function_signature("function", name, &function.function));
                        self.line(&text);
                    }
                    Decl::Class(class) => {
                        let name = if *anonymous { String::new() } else { class.name.value.name.clone() };
                        self.class(&name, &class.class, "export default ");
                    }
                    other => {
                        self.decl(other, "export ", context);
                        if let Some(name) = other.declared_names().first() {
                            self.line(&format!("export default {};", name));
                        }
                    }
                }
            }
            ExportDecl::Decl(decl) => {
                if !skip_overload_implementation(&decl.value, overloaded, seen_implementation) {
                    self.decl(&decl.value, "export ", context);
                }
            }
            ExportDecl::Assignment(expr) => self.line(&format!("export = {};", print_expr(expr))),
            ExportDecl::AsNamespace(name) => self.line(&format!("export as namespace {};", name.value.name)),
        }
    }

    /// Writes one declaration with `prefix` (`export ` or nothing). Returns
    /// whether anything was written.
    fn decl(&mut self, decl: &Decl, prefix: &str, context: Context) -> bool {
        let declare = if context == Context::TopLevel { "declare " } else { "" };
        match decl {
            Decl::Function(function) => {
                let signature = function_signature("function", &function.name.value.name, &function.function);
                self.line(&format!("{}{}{};", prefix, declare, signature));
            }
            Decl::Class(class) => {
                let keyword_prefix = format!("{}{}", prefix, declare);
                self.class(&class.name.value.name, &class.class, &keyword_prefix);
            }
            Decl::Interface(interface) => self.line(&format!("{}{}", prefix, interface.text)),
            Decl::TypeAlias(alias) => {
                let params = alias.type_params.as_ref().map_or("", |params| params.value.text.as_str());
                self.line(&format!(
                    "{}type {}{} = {};",
                    prefix, alias.name.value.name, params, alias.ty.value.text
                ));
            }
            Decl::Enum(decl) => self.enumeration(decl, &format!("{}{}", prefix, declare)),
            Decl::Var(var) => {
                let keyword = match var.kind {
                    VarDeclKind::Let => "let",
                    VarDeclKind::Var => "var",
                    VarDeclKind::Const | VarDeclKind::Using | VarDeclKind::AwaitUsing => "const",
                };
                let declarators: Vec<String> = var
                    .declarations
                    .iter()
                    .flat_map(|declarator| declarator_text(declarator, keyword == "const"))
                    .collect();
                if declarators.is_empty() {
                    return false;
                }
                self.line(&format!("{}{}{} {};", prefix, declare, keyword, declarators.join(", ")));
            }
            Decl::Module(module) => self.module(module, prefix, context),
        }
        true
    }

    fn module(&mut self, module: &ModuleDecl, prefix: &str, context: Context) {
        let declare = if context == Context::TopLevel { "declare " } else { "" };
        let (keyword, name) = match &module.name {
            ModuleName::Ident(ident) if module.is_global => ("", ident.value.name.clone()),
            ModuleName::Ident(ident) => ("namespace ", ident.value.name.clone()),
            ModuleName::String(name) => ("module ", quote(name)),
        };

        // `namespace A.B` stays dotted
        let mut name = name;
        let mut body = module.body.as_ref();
        while let Some(ModuleBody::Namespace(inner)) = body {
            if let ModuleName::Ident(ident) = &inner.value.name {
                name.push('.');
                name.push_str(&ident.value.name);
            }
            body = inner.value.body.as_ref();
        }

        match body {
            None => self.line(&format!("{}{}{}{};", prefix, declare, keyword, name)),
            Some(ModuleBody::Block(items)) => {
                self.line(&format!("{}{}{}{} {{", prefix, declare, keyword, name));
                self.indent += 1;
                self.items(items, Context::Ambient);
                self.indent -= 1;
                self.line("}");
            }
            Some(ModuleBody::Namespace(_)) => {}
        }
    }

    fn enumeration(&mut self, decl: &EnumDecl, prefix: &str) {
        let keyword = if decl.is_const { "const enum" } else { "enum" };
        self.line(&format!("{}{} {} {{", prefix, keyword, decl.name.value.name));
        self.indent += 1;
        let members: Vec<String> = match evaluate_enum(decl) {
            Ok(members) => members
                .iter()
                .map(|member| match &member.value {
                    Some(EnumValue::Number(value)) => format!("{} = {}", member.name, format_number(*value)),
                    Some(EnumValue::String(value)) => format!("{} = {}", member.name, quote(value)),
                    None => member.name.clone(),
                })
                .collect(),
            Err(_) => decl.members.iter().map(|member| member.name.value.name.clone()).collect(),
        };
        let count = members.len();
        for (position, member) in members.into_iter().enumerate() {
            let separator = if position + 1 < count { "," } else { "" };
            self.line(&format!("{}{}", member, separator));
        }
        self.indent -= 1;
        self.line("}");
    }

    fn class(&mut self, name: &str, class: &Class, prefix: &str) {
        let mut header = String::from(prefix);
        if class.is_abstract {
            header.push_str("abstract ");
        }
        header.push_str("class");
        if !name.is_empty() {
            header.push(' ');
            header.push_str(name);
        }
        if let Some(params) = &class.type_params {
            header.push_str(&params.value.text);
        }
        if let Some(extends) = &class.extends {
            let _ = write!(header, " extends {}", print_expr(&extends.base));
            if let Some(args) = &extends.type_args {
                header.push_str(&args.value.text);
            }
        }
        if !class.implements.is_empty() {
            let names: Vec<&str> = class.implements.iter().map(|ty| ty.value.text.as_str()).collect();
            let _ = write!(header, " implements {}", names.join(", "));
        }
        header.push_str(" {");
        self.line(&header);
        self.indent += 1;

        let has_private_names = class.members.iter().any(|member| match member {
            ClassMember::Property { name, .. } | ClassMember::Method { name, .. } => is_private_name(name),
            _ => false,
        });
        if has_private_names {
            self.line("#private;");
        }

        let overloaded = overloaded_methods(&class.members);
        let mut seen_implementation = HashSet::new();
        for member in &class.members {
            if let Some(text) = member_text(member, &overloaded, &mut seen_implementation) {
                for line in text {
                    self.line(&line);
                }
            }
        }

        self.indent -= 1;
        self.line("}");
    }
}

fn is_global_or_module(decl: &Decl) -> bool {
    matches!(decl, Decl::Module(module) if module.is_global || matches!(module.name, ModuleName::String(_)))
}

fn is_private_name(name: &PropertyName) -> bool {
    matches!(name, PropertyName::Ident(ident) if ident.value.name.starts_with('#'))
}

/// Functions declared with at least one bodiless overload signature.
fn overloaded_functions(items: &[Node<ModuleItem>]) -> HashSet<String> {
    items
        .iter()
        .filter_map(|item| match &item.value {
            ModuleItem::Stmt(Stmt::Decl(Decl::Function(function))) => Some(function),
            ModuleItem::Export(ExportDecl::Decl(decl)) | ModuleItem::Export(ExportDecl::DefaultDecl { decl, .. }) => {
                match &decl.value {
                    Decl::Function(function) => Some(function),
                    _ => None,
                }
            }
            _ => None,
        })
        .filter(|function| function.function.body.is_none() && !function.is_declare)
        .map(|function| function.name.value.name.clone())
        .collect()
}

/// The implementation after overload signatures is not part of the
/// declared surface.
fn skip_overload_implementation(decl: &Decl, overloaded: &HashSet<String>, seen: &mut HashSet<String>) -> bool {
    match decl {
        Decl::Function(function) if function.function.body.is_some() => {
            let name = &function.name.value.name;
            overloaded.contains(name) && seen.insert(name.clone())
        }
        _ => false,
    }
}

fn overloaded_methods(members: &[ClassMember]) -> HashSet<String> {
    members
        .iter()
        .filter_map(|member| match member {
            ClassMember::Method {
                name,
                function,
                is_abstract: false,
                ..
            } if function.body.is_none() => Some(property_name_text(name)),
            ClassMember::Constructor { body: None, .. } => Some("constructor".to_string()),
            _ => None,
        })
        .collect()
}

fn member_text(member: &ClassMember, overloaded: &HashSet<String>, seen: &mut HashSet<String>) -> Option<Vec<String>> {
    match member {
        ClassMember::Constructor { params, body, access } => {
            if body.is_some() && overloaded.contains("constructor") {
                return None;
            }
            let mut lines: Vec<String> = params
                .iter()
                .filter(|param| param.is_parameter_property())
                .filter_map(parameter_property_text)
                .collect();
            let access = access_text(*access);
            let params = if access.starts_with("private") {
                String::new()
            } else {
                params_text(params)
            };
            lines.push(format!("{}constructor({});", access, params));
            Some(lines)
        }
        ClassMember::Method {
            name,
            kind,
            function,
            access,
            is_static,
            is_abstract,
            is_optional,
            ..
        } => {
            let name_text = property_name_text(name);
            if function.body.is_some() && overloaded.contains(&name_text) && seen.insert(name_text.clone()) {
                return None;
            }
            if is_private_name(name) {
                return None;
            }
            let mut modifiers = access_text(*access).to_string();
            if *is_static {
                modifiers.push_str("static ");
            }
            if *is_abstract {
                modifiers.push_str("abstract ");
            }
            if matches!(access, Some(AccessModifier::Private)) {
                return Some(vec![format!("{}{};", modifiers, name_text)]);
            }
            let optional = if *is_optional { "?" } else { "" };
            let text = match kind {
                MethodKind::Getter => format!("{}get {}(): {};", modifiers, name_text, return_type(function)),
                MethodKind::Setter => format!("{}set {}({});", modifiers, name_text, params_text(&function.params)),
                MethodKind::Method => {
                    let signature = function_signature("", &format!("{}{}", name_text, optional), function);
                    format!("{}{};", modifiers, signature.trim_start())
                }
            };
            Some(vec![text])
        }
        ClassMember::Property {
            name,
            type_annotation,
            init,
            access,
            is_static,
            is_readonly,
            is_abstract,
            is_optional,
            ..
        } => {
            if is_private_name(name) {
                return None;
            }
            let mut modifiers = access_text(*access).to_string();
            if *is_static {
                modifiers.push_str("static ");
            }
            if *is_abstract {
                modifiers.push_str("abstract ");
            }
            if *is_readonly {
                modifiers.push_str("readonly ");
            }
            let name_text = property_name_text(name);
            let optional = if *is_optional { "?" } else { "" };
            if matches!(access, Some(AccessModifier::Private)) {
                return Some(vec![format!("{}{}{};", modifiers, name_text, optional)]);
            }
            let ty = type_annotation
                .as_ref()
                .map(|ty| ty.value.text.clone())
                .or_else(|| init.as_ref().and_then(|init| infer_expr_type(init, !is_readonly)))
                .unwrap_or_else(|| "any".to_string());
            Some(vec![format!("{}{}{}: {};", modifiers, name_text, optional, ty)])
        }
        ClassMember::IndexSignature { text, is_static } => {
            let text = text.trim_end_matches(';');
            Some(vec![format!("{}{};", if *is_static { "static " } else { "" }, text)])
        }
        ClassMember::StaticBlock(_) => None,
    }
}

fn parameter_property_text(param: &Param) -> Option<String> {
    let name = param.simple_name()?;
    let mut text = access_text(param.accessibility).to_string();
    if param.is_readonly {
        text.push_str("readonly ");
    }
    text.push_str(name);
    if param.optional {
        text.push('?');
    }
    if !matches!(param.accessibility, Some(AccessModifier::Private)) {
        let _ = write!(text, ": {}", param_type(param));
    }
    text.push(';');
    Some(text)
}

fn access_text(access: Option<AccessModifier>) -> &'static str {
    match access {
        Some(AccessModifier::Private) => "private ",
        Some(AccessModifier::Protected) => "protected ",
        Some(AccessModifier::Public) | None => "",
    }
}

fn function_signature(keyword: &str, name: &str, function: &Function) -> String {
    let mut text = String::from(keyword);
    if !name.is_empty() {
        if !text.is_empty() {
            text.push(' ');
        }
        text.push_str(name);
    } else if !text.is_empty() {
        text.push(' ');
    }
    if let Some(params) = &function.type_params {
        text.push_str(&params.value.text);
    }
    let _ = write!(text, "({}): {}", params_text(&function.params), return_type(function));
    text
}

fn params_text(params: &[Param]) -> String {
    params
        .iter()
        .map(|param| {
            let mut text = String::new();
            if param.is_rest {
                text.push_str("...");
            }
            text.push_str(&pattern_text(&param.pattern.value));
            let has_default = matches!(param.pattern.value, Pattern::Assignment { .. });
            if (param.optional || has_default) && !param.is_rest && !param.is_this_param() {
                text.push('?');
            }
            let _ = write!(text, ": {}", param_type(param));
            text
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn param_type(param: &Param) -> String {
    if let Some(ty) = &param.type_annotation {
        return ty.value.text.clone();
    }
    if param.is_rest {
        return "any[]".to_string();
    }
    match &param.pattern.value {
        Pattern::Assignment { default, .. } => infer_expr_type(default, true).unwrap_or_else(|| "any".to_string()),
        _ => "any".to_string(),
    }
}

/// Binding pattern without defaults, as declarations spell it.
fn pattern_text(pattern: &Pattern) -> String {
    match pattern {
        Pattern::Ident(ident) => ident.value.name.clone(),
        Pattern::Assignment { pattern, .. } => pattern_text(&pattern.value),
        Pattern::Array { elements, rest } => {
            let mut parts: Vec<String> = elements
                .iter()
                .map(|element| element.as_ref().map_or(String::new(), |element| pattern_text(&element.value)))
                .collect();
            if let Some(rest) = rest {
                parts.push(format!("...{}", pattern_text(&rest.value)));
            }
            format!("[{}]", parts.join(", "))
        }
        Pattern::Object { properties, rest } => {
            let mut parts: Vec<String> = properties
                .iter()
                .map(|property| {
                    if property.shorthand {
                        pattern_text(&property.value.value)
                    } else {
                        format!("{}: {}", property_name_text(&property.key), pattern_text(&property.value.value))
                    }
                })
                .collect();
            if let Some(rest) = rest {
                parts.push(format!("...{}", pattern_text(&rest.value)));
            }
            if parts.is_empty() {
                "{}".to_string()
            } else {
                format!("{{ {} }}", parts.join(", "))
            }
        }
    }
}

fn property_name_text(name: &PropertyName) -> String {
    match name {
        PropertyName::Ident(ident) => ident.value.name.clone(),
        PropertyName::String(value) => quote(value),
        PropertyName::Number(value) => format_number(*value),
        PropertyName::Computed(expr) => format!("[{}]", print_expr(expr)),
    }
}

fn return_type(function: &Function) -> String {
    if let Some(ty) = &function.return_type {
        return ty.value.text.clone();
    }
    let Some(body) = &function.body else {
        return "any".to_string();
    };
    if function.is_generator {
        return if function.is_async {
            "AsyncGenerator<any, any, any>".to_string()
        } else {
            "Generator<any, any, any>".to_string()
        };
    }
    let inner = if returns_value(&body.value.stmts) { "any" } else { "void" };
    if function.is_async {
        format!("Promise<{}>", inner)
    } else {
        inner.to_string()
    }
}

/// Whether a `return expr;` is reachable in this function body, not
/// counting nested functions.
fn returns_value(stmts: &[Node<Stmt>]) -> bool {
    stmts.iter().any(|stmt| stmt_returns_value(&stmt.value))
}

fn stmt_returns_value(stmt: &Stmt) -> bool {
    match stmt {
        Stmt::Return(value) => value.is_some(),
        Stmt::If {
            then_stmt, else_stmt, ..
        } => stmt_returns_value(&then_stmt.value) || else_stmt.as_ref().is_some_and(|s| stmt_returns_value(&s.value)),
        Stmt::For { body, .. }
        | Stmt::ForIn { body, .. }
        | Stmt::ForOf { body, .. }
        | Stmt::While { body, .. }
        | Stmt::DoWhile { body, .. } => stmt_returns_value(&body.value),
        Stmt::Labeled { stmt, .. } => stmt_returns_value(&stmt.value),
        Stmt::Block(block) => returns_value(&block.stmts),
        Stmt::Try { block, catch, finally } => {
            returns_value(&block.value.stmts)
                || catch.as_ref().is_some_and(|clause| returns_value(&clause.body.value.stmts))
                || finally.as_ref().is_some_and(|block| returns_value(&block.value.stmts))
        }
        Stmt::Switch { cases, .. } => cases.iter().any(|case| returns_value(&case.consequent)),
        _ => false,
    }
}

fn declarator_text(declarator: &VarDeclarator, is_const: bool) -> Vec<String> {
    let Pattern::Ident(ident) = &declarator.pattern.value else {
        let mut names = Vec::new();
        declarator.pattern.value.collect_bound_names(&mut names);
        return names.into_iter().map(|name| format!("{}: any", name)).collect();
    };
    let name = &ident.value.name;
    if let Some(ty) = &declarator.type_annotation {
        return vec![format!("{}: {}", name, ty.value.text)];
    }
    let Some(init) = &declarator.init else {
        return vec![format!("{}: any", name)];
    };
    if is_const {
        if let Some(literal) = literal_text(init) {
            return vec![format!("{} = {}", name, literal)];
        }
    }
    let ty = infer_expr_type(init, true).unwrap_or_else(|| "any".to_string());
    vec![format!("{}: {}", name, ty)]
}

/// Literal initializers a `const` keeps verbatim.
fn literal_text(expr: &Node<Expr>) -> Option<String> {
    match &expr.value {
        Expr::Literal(Literal::Number(value)) => Some(format_number(*value)),
        Expr::Literal(Literal::String(value)) => Some(quote(value)),
        Expr::Literal(Literal::Boolean(value)) => Some(value.to_string()),
        Expr::Literal(Literal::BigInt(digits)) => Some(format!("{}n", digits)),
        Expr::Unary {
            op: UnaryOp::Minus,
            expr: operand,
        } => match &operand.value {
            Expr::Literal(Literal::Number(value)) => Some(format!("-{}", format_number(*value))),
            _ => None,
        },
        Expr::Template { parts, exprs } if exprs.is_empty() => parts.first().map(|raw| quote(raw)),
        _ => None,
    }
}

/// The type evident from an expression's syntax. `widen` turns literal
/// types into their primitive.
fn infer_expr_type(expr: &Node<Expr>, widen: bool) -> Option<String> {
    let ty = match &expr.value {
        Expr::Literal(Literal::Number(_)) if widen => "number".to_string(),
        Expr::Literal(Literal::String(_)) if widen => "string".to_string(),
        Expr::Literal(Literal::Boolean(_)) if widen => "boolean".to_string(),
        Expr::Literal(Literal::BigInt(_)) if widen => "bigint".to_string(),
        Expr::Literal(Literal::Null) => "any".to_string(),
        Expr::Literal(Literal::RegExp { .. }) => "RegExp".to_string(),
        Expr::Literal(_) => return literal_text(expr),
        Expr::Template { .. } => "string".to_string(),
        Expr::Unary {
            op: UnaryOp::Minus,
            expr: operand,
        } if matches!(operand.value, Expr::Literal(Literal::Number(_))) => {
            if widen {
                "number".to_string()
            } else {
                return literal_text(expr);
            }
        }
        Expr::Unary { op: UnaryOp::Not, .. } => "boolean".to_string(),
        Expr::Unary { op: UnaryOp::TypeOf, .. } => "string".to_string(),
        Expr::Paren(inner) => return infer_expr_type(inner, widen),
        Expr::TypeCast { ty, .. } if ty.value.text != "const" => ty.value.text.clone(),
        Expr::Satisfies { expr: inner, .. } => return infer_expr_type(inner, widen),
        Expr::New { callee, type_args, .. } => match &callee.value {
            Expr::Ident(ident) => {
                format!("{}{}", ident.name, type_args.as_ref().map_or("", |args| args.value.text.as_str()))
            }
            _ => return None,
        },
        Expr::Arrow {
            type_params,
            params,
            return_type,
            body,
            is_async,
        } => {
            let returns = match return_type {
                Some(ty) => ty.value.text.clone(),
                None => {
                    let inner = match body {
                        ArrowBody::Expr(_) => "any",
                        ArrowBody::Block(block) if returns_value(&block.value.stmts) => "any",
                        ArrowBody::Block(_) => "void",
                    };
                    if *is_async {
                        format!("Promise<{}>", inner)
                    } else {
                        inner.to_string()
                    }
                }
            };
            format!(
                "{}({}) => {}",
                type_params.as_ref().map_or("", |params| params.value.text.as_str()),
                params_text(params),
                returns
            )
        }
        Expr::Function { function, .. } => {
            format!(
                "{}({}) => {}",
                function.type_params.as_ref().map_or("", |params| params.value.text.as_str()),
                params_text(&function.params),
                return_type(function)
            )
        }
        Expr::Array(_) => "any[]".to_string(),
        _ => return None,
    };
    Some(ty)
}

fn import_text(import: &ImportDecl) -> String {
    let source = quote(&import.source);
    if import.bare {
        return format!("import {};", source);
    }
    let mut parts = Vec::new();
    let mut named = Vec::new();
    for specifier in &import.specifiers {
        match specifier {
            ImportSpecifier::Default(local) => parts.push(local.value.name.clone()),
            ImportSpecifier::Namespace(local) => parts.push(format!("* as {}", local.value.name)),
            ImportSpecifier::Named {
                imported,
                local,
                type_only,
            } => {
                let mut text = String::new();
                if *type_only {
                    text.push_str("type ");
                }
                text.push_str(&imported.value.name);
                if let Some(local) = local {
                    if local.value.name != imported.value.name {
                        let _ = write!(text, " as {}", local.value.name);
                    }
                }
                named.push(text);
            }
        }
    }
    if !named.is_empty() || parts.is_empty() {
        parts.push(format!("{{ {} }}", named.join(", ")).replace("{  }", "{}"));
    }
    format!(
        "import {}{} from {};",
        if import.type_only { "type " } else { "" },
        parts.join(", "),
        source
    )
}

fn export_specifier_text(specifier: &ExportSpecifier) -> String {
    let mut text = String::new();
    if specifier.type_only {
        text.push_str("type ");
    }
    text.push_str(&specifier.local.value.name);
    let exported = specifier.exported_name();
    if exported != specifier.local.value.name {
        let _ = write!(text, " as {}", exported);
    }
    text
}

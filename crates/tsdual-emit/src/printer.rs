//! JavaScript source printer.
//!
//! Prints a lowered [`Program`] with four-space indentation and double
//! quoted strings. Parentheses are re-derived from operator precedence, so
//! passes may build trees without worrying about grouping. TypeScript-only
//! wrappers (`as`, `satisfies`, `!`) print as their operand.

use tsdual_ast::*;

const INDENT: &str = "    ";

/// Objects whose single-line rendering is longer than this break over lines.
const INLINE_OBJECT_WIDTH: usize = 80;

// Precedence levels; binary operators occupy 3..=14 (see BinaryOp::precedence)
const PREC_SEQUENCE: u8 = 0;
const PREC_ASSIGN: u8 = 1;
const PREC_CONDITIONAL: u8 = 2;
const PREC_UNARY: u8 = 15;
const PREC_POSTFIX: u8 = 16;
const PREC_CALL: u8 = 17;
const PREC_PRIMARY: u8 = 18;

/// Prints a whole program.
pub fn print_program(program: &Program) -> String {
    let mut printer = Printer::new();
    printer.print_program(program);
    printer.finish()
}

/// Prints a single expression, as used for `extends` clauses in
/// declaration output.
pub fn print_expr(expr: &Node<Expr>) -> String {
    let mut printer = Printer::new();
    printer.print_expr(expr, PREC_SEQUENCE);
    printer.finish()
}

pub struct Printer {
    out: String,
    indent: usize,
    /// Blocks with at most one statement stay on one line.
    inline: bool,
    /// Output offset where an expression statement begins; object literals,
    /// functions and classes printed exactly there need parentheses.
    statement_start: Option<usize>,
}

impl Default for Printer {
    fn default() -> Self {
        Self::new()
    }
}

impl Printer {
    pub fn new() -> Self {
        Self {
            out: String::new(),
            indent: 0,
            inline: false,
            statement_start: None,
        }
    }

    pub fn finish(self) -> String {
        self.out
    }

    fn write(&mut self, text: &str) {
        self.out.push_str(text);
    }

    fn write_indent(&mut self) {
        for _ in 0..self.indent {
            self.out.push_str(INDENT);
        }
    }

    fn newline(&mut self) {
        self.out.push('\n');
    }

    fn mark_statement_start(&mut self) {
        self.statement_start = Some(self.out.len());
    }

    fn at_statement_start(&self) -> bool {
        self.statement_start == Some(self.out.len())
    }

    // =========================================================================
    // Module items
    // =========================================================================

    pub fn print_program(&mut self, program: &Program) {
        for item in &program.items {
            self.print_module_item(item);
        }
    }

    fn print_module_item(&mut self, item: &Node<ModuleItem>) {
        match &item.value {
            ModuleItem::Stmt(stmt) => self.print_stmt(stmt),
            ModuleItem::Import(import) => {
                if import.type_only {
                    return;
                }
                self.write_indent();
                self.print_import(import);
                self.newline();
            }
            ModuleItem::Export(export) => {
                if is_erased_export(export) {
                    return;
                }
                self.write_indent();
                self.print_export(export);
                self.newline();
            }
            ModuleItem::ImportEquals(decl) => {
                if decl.type_only {
                    return;
                }
                self.write_indent();
                if decl.is_export {
                    self.write("export ");
                }
                self.write("import ");
                self.write(&decl.name.value.name);
                self.write(" = ");
                match &decl.reference {
                    ModuleReference::External(source) => {
                        self.write("require(");
                        self.write(&quote(source));
                        self.write(")");
                    }
                    ModuleReference::Entity(expr) => self.print_expr(expr, PREC_ASSIGN),
                }
                self.write(";");
                self.newline();
            }
        }
    }

    fn print_import(&mut self, import: &ImportDecl) {
        self.write("import ");
        if !import.bare {
            let mut wrote_clause = false;
            let mut named = Vec::new();
            for specifier in &import.specifiers {
                match specifier {
                    ImportSpecifier::Default(ident) => {
                        self.write(&ident.value.name);
                        wrote_clause = true;
                    }
                    ImportSpecifier::Namespace(ident) => {
                        if wrote_clause {
                            self.write(", ");
                        }
                        self.write("* as ");
                        self.write(&ident.value.name);
                        wrote_clause = true;
                    }
                    ImportSpecifier::Named {
                        imported,
                        local,
                        type_only,
                    } => {
                        if !type_only {
                            named.push(specifier_text(&imported.value.name, local.as_ref().map(|l| l.value.name.as_str())));
                        }
                    }
                }
            }
            if !named.is_empty() || !wrote_clause {
                if wrote_clause {
                    self.write(", ");
                }
                self.write(&braced_list(&named));
            }
            self.write(" from ");
        }
        self.write(&quote(&import.source));
        self.write(";");
    }

    fn print_export(&mut self, export: &ExportDecl) {
        match export {
            ExportDecl::Named {
                specifiers, source, ..
            } => {
                let names: Vec<String> = specifiers
                    .iter()
                    .filter(|spec| !spec.type_only)
                    .map(|spec| {
                        specifier_text(
                            &spec.local.value.name,
                            spec.exported.as_ref().map(|e| e.value.name.as_str()),
                        )
                    })
                    .collect();
                self.write("export ");
                self.write(&braced_list(&names));
                if let Some(source) = source {
                    self.write(" from ");
                    self.write(&quote(source));
                }
                self.write(";");
            }
            ExportDecl::Default(expr) => {
                self.write("export default ");
                self.mark_statement_start();
                self.print_expr(expr, PREC_ASSIGN);
                self.write(";");
            }
            ExportDecl::DefaultDecl { decl, anonymous } => {
                self.write("export default ");
                match &decl.value {
                    Decl::Function(f) => {
                        let name = (!anonymous).then_some(f.name.value.name.as_str());
                        self.print_function("function", name, &f.function);
                    }
                    Decl::Class(c) => {
                        let name = (!anonymous).then_some(c.name.value.name.as_str());
                        self.print_class(name, &c.class);
                    }
                    other => self.print_decl(other),
                }
            }
            ExportDecl::All { source, as_name, .. } => {
                self.write("export *");
                if let Some(name) = as_name {
                    self.write(" as ");
                    self.write(&name.value.name);
                }
                self.write(" from ");
                self.write(&quote(source));
                self.write(";");
            }
            ExportDecl::Decl(decl) => {
                self.write("export ");
                self.print_decl(&decl.value);
            }
            ExportDecl::Assignment(expr) => {
                self.write("export = ");
                self.print_expr(expr, PREC_ASSIGN);
                self.write(";");
            }
            ExportDecl::AsNamespace(_) => {}
        }
    }

    // =========================================================================
    // Statements
    // =========================================================================

    fn print_stmt(&mut self, stmt: &Stmt) {
        if is_erased_stmt(stmt) {
            return;
        }
        self.write_indent();
        self.print_stmt_inner(stmt);
        self.newline();
    }

    /// Prints a statement without leading indentation or trailing newline.
    fn print_stmt_inner(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Expr(expr) => {
                self.mark_statement_start();
                self.print_expr(expr, PREC_SEQUENCE);
                self.write(";");
            }
            Stmt::Decl(decl) => self.print_decl(decl),
            Stmt::Return(value) => {
                self.write("return");
                if let Some(value) = value {
                    self.write(" ");
                    self.print_expr(value, PREC_SEQUENCE);
                }
                self.write(";");
            }
            Stmt::If {
                condition,
                then_stmt,
                else_stmt,
            } => {
                self.write("if (");
                self.print_expr(condition, PREC_SEQUENCE);
                self.write(") ");
                self.print_body(&then_stmt.value);
                if let Some(else_stmt) = else_stmt {
                    self.newline();
                    self.write_indent();
                    self.write("else ");
                    self.print_body(&else_stmt.value);
                }
            }
            Stmt::For {
                init,
                condition,
                update,
                body,
            } => {
                self.write("for (");
                match init {
                    Some(ForInit::VarDecl(decl)) => self.print_var_decl(decl),
                    Some(ForInit::Expr(expr)) => self.print_expr(expr, PREC_SEQUENCE),
                    None => {}
                }
                self.write(";");
                if let Some(condition) = condition {
                    self.write(" ");
                    self.print_expr(condition, PREC_SEQUENCE);
                }
                self.write(";");
                if let Some(update) = update {
                    self.write(" ");
                    self.print_expr(update, PREC_SEQUENCE);
                }
                self.write(") ");
                self.print_body(&body.value);
            }
            Stmt::ForIn { left, right, body } => {
                self.write("for (");
                self.print_for_left(left);
                self.write(" in ");
                self.print_expr(right, PREC_SEQUENCE);
                self.write(") ");
                self.print_body(&body.value);
            }
            Stmt::ForOf {
                left,
                right,
                body,
                is_await,
            } => {
                self.write(if *is_await { "for await (" } else { "for (" });
                self.print_for_left(left);
                self.write(" of ");
                self.print_expr(right, PREC_ASSIGN);
                self.write(") ");
                self.print_body(&body.value);
            }
            Stmt::While { condition, body } => {
                self.write("while (");
                self.print_expr(condition, PREC_SEQUENCE);
                self.write(") ");
                self.print_body(&body.value);
            }
            Stmt::DoWhile { body, condition } => {
                self.write("do ");
                self.print_body(&body.value);
                self.write(" while (");
                self.print_expr(condition, PREC_SEQUENCE);
                self.write(");");
            }
            Stmt::Block(block) => self.print_block(&block.stmts),
            Stmt::Break(label) => {
                self.write("break");
                if let Some(label) = label {
                    self.write(" ");
                    self.write(&label.value.name);
                }
                self.write(";");
            }
            Stmt::Continue(label) => {
                self.write("continue");
                if let Some(label) = label {
                    self.write(" ");
                    self.write(&label.value.name);
                }
                self.write(";");
            }
            Stmt::Throw(expr) => {
                self.write("throw ");
                self.print_expr(expr, PREC_SEQUENCE);
                self.write(";");
            }
            Stmt::Try {
                block,
                catch,
                finally,
            } => {
                self.write("try ");
                self.print_block(&block.value.stmts);
                if let Some(catch) = catch {
                    self.newline();
                    self.write_indent();
                    self.write("catch ");
                    if let Some(param) = &catch.param {
                        self.write("(");
                        self.print_pattern(param);
                        self.write(") ");
                    }
                    self.print_block(&catch.body.value.stmts);
                }
                if let Some(finally) = finally {
                    self.newline();
                    self.write_indent();
                    self.write("finally ");
                    self.print_block(&finally.value.stmts);
                }
            }
            Stmt::Switch {
                discriminant,
                cases,
            } => {
                self.write("switch (");
                self.print_expr(discriminant, PREC_SEQUENCE);
                self.write(") {");
                self.newline();
                self.indent += 1;
                for case in cases {
                    self.write_indent();
                    match &case.test {
                        Some(test) => {
                            self.write("case ");
                            self.print_expr(test, PREC_SEQUENCE);
                            self.write(":");
                        }
                        None => self.write("default:"),
                    }
                    self.newline();
                    self.indent += 1;
                    for stmt in &case.consequent {
                        self.print_stmt(&stmt.value);
                    }
                    self.indent -= 1;
                }
                self.indent -= 1;
                self.write_indent();
                self.write("}");
            }
            Stmt::Labeled { label, stmt } => {
                self.write(&label.value.name);
                self.write(": ");
                self.print_stmt_inner(&stmt.value);
            }
            Stmt::Empty => self.write(";"),
            Stmt::Debugger => self.write("debugger;"),
        }
    }

    /// Body of `if`/loops: blocks open on the same line.
    fn print_body(&mut self, stmt: &Stmt) {
        self.print_stmt_inner(stmt);
    }

    fn print_for_left(&mut self, left: &ForInLeft) {
        match left {
            ForInLeft::VarDecl(decl) => self.print_var_decl(decl),
            ForInLeft::Pattern(pattern) => self.print_pattern(pattern),
        }
    }

    fn print_block(&mut self, stmts: &[Node<Stmt>]) {
        let visible: Vec<&Node<Stmt>> = stmts.iter().filter(|s| !is_erased_stmt(&s.value)).collect();
        if visible.is_empty() {
            self.write("{ }");
            return;
        }
        if self.inline && visible.len() == 1 {
            self.write("{ ");
            self.print_stmt_inner(&visible[0].value);
            self.write(" }");
            return;
        }
        self.write("{");
        self.newline();
        self.indent += 1;
        for stmt in visible {
            self.print_stmt(&stmt.value);
        }
        self.indent -= 1;
        self.write_indent();
        self.write("}");
    }

    // =========================================================================
    // Declarations
    // =========================================================================

    fn print_decl(&mut self, decl: &Decl) {
        match decl {
            Decl::Var(var) => {
                self.print_var_decl(var);
                self.write(";");
            }
            Decl::Function(f) => {
                self.print_function("function", Some(&f.name.value.name), &f.function)
            }
            Decl::Class(c) => self.print_class(Some(&c.name.value.name), &c.class),
            // Lowered away before printing
            Decl::Interface(_) | Decl::TypeAlias(_) | Decl::Enum(_) | Decl::Module(_) => {}
        }
    }

    fn print_var_decl(&mut self, decl: &VarDecl) {
        self.write(&decl.kind.to_string());
        self.write(" ");
        for (i, declarator) in decl.declarations.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.print_pattern(&declarator.pattern);
            if let Some(init) = &declarator.init {
                self.write(" = ");
                self.print_expr(init, PREC_ASSIGN);
            }
        }
    }

    /// `keyword` is `function` for declarations and expressions; methods
    /// pass an empty keyword.
    fn print_function(&mut self, keyword: &str, name: Option<&str>, function: &Function) {
        if function.is_async {
            self.write("async ");
        }
        self.write(keyword);
        if function.is_generator {
            self.write("*");
        }
        if let Some(name) = name {
            if !keyword.is_empty() {
                self.write(" ");
            }
            self.write(name);
        } else if !keyword.is_empty() {
            self.write(" ");
        }
        self.print_params(&function.params);
        self.write(" ");
        match &function.body {
            Some(body) => self.print_block(&body.value.stmts),
            None => self.write("{ }"),
        }
    }

    fn print_params(&mut self, params: &[Param]) {
        self.write("(");
        let mut first = true;
        for param in params.iter().filter(|p| !p.is_this_param()) {
            if !first {
                self.write(", ");
            }
            first = false;
            if param.is_rest {
                self.write("...");
            }
            self.print_pattern(&param.pattern);
        }
        self.write(")");
    }

    fn print_class(&mut self, name: Option<&str>, class: &Class) {
        self.write("class");
        if let Some(name) = name {
            self.write(" ");
            self.write(name);
        }
        if let Some(extends) = &class.extends {
            self.write(" extends ");
            self.print_expr(&extends.base, PREC_CALL);
        }
        self.write(" {");
        self.newline();
        self.indent += 1;
        let saved_inline = std::mem::replace(&mut self.inline, false);
        for member in &class.members {
            self.print_class_member(member);
        }
        self.inline = saved_inline;
        self.indent -= 1;
        self.write_indent();
        self.write("}");
    }

    fn print_class_member(&mut self, member: &ClassMember) {
        match member {
            ClassMember::Constructor { params, body, .. } => {
                let Some(body) = body else { return };
                self.write_indent();
                self.write("constructor");
                self.print_params(params);
                self.write(" ");
                self.print_block(&body.value.stmts);
                self.newline();
            }
            ClassMember::Method {
                name,
                kind,
                function,
                is_static,
                is_abstract,
                ..
            } => {
                if function.body.is_none() || *is_abstract {
                    return;
                }
                self.write_indent();
                if *is_static {
                    self.write("static ");
                }
                self.print_method(name, *kind, function);
                self.newline();
            }
            ClassMember::Property {
                name,
                init,
                is_static,
                is_abstract,
                is_declare,
                ..
            } => {
                if *is_abstract || *is_declare {
                    return;
                }
                self.write_indent();
                if *is_static {
                    self.write("static ");
                }
                self.print_property_name(name);
                if let Some(init) = init {
                    self.write(" = ");
                    self.print_expr(init, PREC_ASSIGN);
                }
                self.write(";");
                self.newline();
            }
            ClassMember::StaticBlock(block) => {
                self.write_indent();
                self.write("static ");
                self.print_block(&block.value.stmts);
                self.newline();
            }
            ClassMember::IndexSignature { .. } => {}
        }
    }

    fn print_method(&mut self, name: &PropertyName, kind: MethodKind, function: &Function) {
        match kind {
            MethodKind::Getter => self.write("get "),
            MethodKind::Setter => self.write("set "),
            MethodKind::Method => {
                if function.is_async {
                    self.write("async ");
                }
                if function.is_generator {
                    self.write("*");
                }
            }
        }
        self.print_property_name(name);
        self.print_params(&function.params);
        self.write(" ");
        match &function.body {
            Some(body) => self.print_block(&body.value.stmts),
            None => self.write("{ }"),
        }
    }

    fn print_property_name(&mut self, name: &PropertyName) {
        match name {
            PropertyName::Ident(ident) => self.write(&ident.value.name),
            PropertyName::String(s) => self.write(&quote(s)),
            PropertyName::Number(n) => self.write(&format_number(*n)),
            PropertyName::Computed(expr) => {
                self.write("[");
                self.print_expr(expr, PREC_ASSIGN);
                self.write("]");
            }
        }
    }

    // =========================================================================
    // Patterns
    // =========================================================================

    fn print_pattern(&mut self, pattern: &Node<Pattern>) {
        match &pattern.value {
            Pattern::Ident(ident) => self.write(&ident.value.name),
            Pattern::Array { elements, rest } => {
                self.write("[");
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        self.write(", ");
                    }
                    if let Some(element) = element {
                        self.print_pattern(element);
                    }
                }
                if elements.last().is_some_and(Option::is_none) && rest.is_none() {
                    self.write(",");
                }
                if let Some(rest) = rest {
                    if !elements.is_empty() {
                        self.write(", ");
                    }
                    self.write("...");
                    self.print_pattern(rest);
                }
                self.write("]");
            }
            Pattern::Object { properties, rest } => {
                if properties.is_empty() && rest.is_none() {
                    self.write("{}");
                    return;
                }
                self.write("{ ");
                for (i, property) in properties.iter().enumerate() {
                    if i > 0 {
                        self.write(", ");
                    }
                    if pattern_is_shorthand(&property.key, &property.value.value) {
                        self.print_pattern(&property.value);
                    } else {
                        self.print_property_name(&property.key);
                        self.write(": ");
                        self.print_pattern(&property.value);
                    }
                }
                if let Some(rest) = rest {
                    if !properties.is_empty() {
                        self.write(", ");
                    }
                    self.write("...");
                    self.print_pattern(rest);
                }
                self.write(" }");
            }
            Pattern::Assignment { pattern, default } => {
                self.print_pattern(pattern);
                self.write(" = ");
                self.print_expr(default, PREC_ASSIGN);
            }
        }
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    fn print_expr(&mut self, expr: &Node<Expr>, min_precedence: u8) {
        let value = strip_type_wrappers(&expr.value);
        if precedence(value) < min_precedence {
            self.write("(");
            self.print_expr_value(value);
            self.write(")");
        } else {
            self.print_expr_value(value);
        }
    }

    fn print_expr_value(&mut self, expr: &Expr) {
        let needs_statement_parens = self.at_statement_start()
            && matches!(expr, Expr::Object(_) | Expr::Function { .. } | Expr::Class { .. });
        if needs_statement_parens {
            self.write("(");
        }

        match expr {
            Expr::Literal(literal) => self.print_literal(literal),
            Expr::Ident(ident) => self.write(&ident.name),
            Expr::Binary { left, op, right } => {
                let prec = op.precedence();
                let (left_min, right_min) = if *op == BinaryOp::Pow {
                    (PREC_POSTFIX, prec)
                } else {
                    (prec, prec + 1)
                };
                self.print_expr(left, operand_precedence(*op, &left.value, left_min));
                self.write(" ");
                self.write(&op.to_string());
                self.write(" ");
                self.print_expr(right, operand_precedence(*op, &right.value, right_min));
            }
            Expr::Unary { op, expr: operand } => {
                if op.is_postfix() {
                    self.print_expr(operand, PREC_POSTFIX);
                    self.write(&op.to_string());
                } else {
                    self.write(&op.to_string());
                    if op.is_keyword() || needs_unary_space(*op, &operand.value) {
                        self.write(" ");
                    }
                    self.print_expr(operand, PREC_UNARY);
                }
            }
            Expr::Assignment { target, op, value } => {
                self.print_expr(target, PREC_POSTFIX);
                self.write(" ");
                self.write(&op.to_string());
                self.write(" ");
                self.print_expr(value, PREC_ASSIGN);
            }
            Expr::Call { callee, args, .. } => {
                self.print_expr(callee, PREC_CALL);
                self.print_arguments(args);
            }
            Expr::Member { object, property } => {
                self.print_member_object(object);
                self.write(".");
                self.write(&property.value.name);
            }
            Expr::Index { object, index } => {
                self.print_member_object(object);
                self.write("[");
                self.print_expr(index, PREC_SEQUENCE);
                self.write("]");
            }
            Expr::OptionalMember { object, property } => {
                self.print_expr(object, PREC_CALL);
                self.write("?.");
                self.write(&property.value.name);
            }
            Expr::OptionalIndex { object, index } => {
                self.print_expr(object, PREC_CALL);
                self.write("?.[");
                self.print_expr(index, PREC_SEQUENCE);
                self.write("]");
            }
            Expr::OptionalCall { callee, args } => {
                self.print_expr(callee, PREC_CALL);
                self.write("?.");
                self.print_arguments(args);
            }
            Expr::Array(elements) => {
                self.write("[");
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        self.write(", ");
                    }
                    if let Some(element) = element {
                        self.print_expr(element, PREC_ASSIGN);
                    }
                }
                if elements.last().is_some_and(Option::is_none) {
                    self.write(",");
                }
                self.write("]");
            }
            Expr::Object(properties) => self.print_object(properties),
            Expr::Arrow {
                params,
                body,
                is_async,
                ..
            } => {
                if *is_async {
                    self.write("async ");
                }
                self.print_params(params);
                self.write(" => ");
                match body {
                    ArrowBody::Expr(body) => {
                        self.mark_statement_start();
                        self.print_expr(body, PREC_ASSIGN);
                    }
                    ArrowBody::Block(block) => self.print_block(&block.value.stmts),
                }
            }
            Expr::Function { name, function } => {
                let name = name.as_ref().map(|n| n.value.name.as_str());
                self.print_function("function", name, function);
            }
            Expr::Class { name, class } => {
                let name = name.as_ref().map(|n| n.value.name.as_str());
                self.print_class(name, class);
            }
            Expr::Ternary {
                condition,
                then_expr,
                else_expr,
            } => {
                self.print_expr(condition, PREC_CONDITIONAL + 1);
                self.write(" ? ");
                self.print_expr(then_expr, PREC_ASSIGN);
                self.write(" : ");
                self.print_expr(else_expr, PREC_ASSIGN);
            }
            Expr::Template { parts, exprs } => self.print_template(parts, exprs),
            Expr::TaggedTemplate { tag, parts, exprs } => {
                self.print_expr(tag, PREC_CALL);
                self.print_template(parts, exprs);
            }
            Expr::New { callee, args, .. } => {
                self.write("new ");
                if contains_call(&callee.value) {
                    self.write("(");
                    self.print_expr(callee, PREC_SEQUENCE);
                    self.write(")");
                } else {
                    self.print_expr(callee, PREC_CALL);
                }
                self.print_arguments(args);
            }
            Expr::Await(operand) => {
                self.write("await ");
                self.print_expr(operand, PREC_UNARY);
            }
            Expr::Yield { argument, delegate } => {
                self.write("yield");
                if *delegate {
                    self.write("*");
                }
                if let Some(argument) = argument {
                    self.write(" ");
                    self.print_expr(argument, PREC_ASSIGN);
                }
            }
            Expr::Paren(inner) => {
                self.write("(");
                self.print_expr(inner, PREC_SEQUENCE);
                self.write(")");
            }
            Expr::This => self.write("this"),
            Expr::Super => self.write("super"),
            Expr::Sequence(exprs) => {
                for (i, expr) in exprs.iter().enumerate() {
                    if i > 0 {
                        self.write(", ");
                    }
                    self.print_expr(expr, PREC_ASSIGN);
                }
            }
            Expr::Spread(inner) => {
                self.write("...");
                self.print_expr(inner, PREC_ASSIGN);
            }
            Expr::MetaProperty { meta, property } => {
                self.write(&meta.value.name);
                self.write(".");
                self.write(&property.value.name);
            }
            Expr::DynamicImport(argument) => {
                self.write("import(");
                self.print_expr(argument, PREC_ASSIGN);
                self.write(")");
            }
            Expr::TypeCast { expr, .. } | Expr::Satisfies { expr, .. } | Expr::NonNullAssertion(expr) => {
                self.print_expr(expr, PREC_SEQUENCE)
            }
        }

        if needs_statement_parens {
            self.write(")");
        }
    }

    /// `1..toString()` is easy to get wrong; integer literals get parens.
    fn print_member_object(&mut self, object: &Node<Expr>) {
        if let Expr::Literal(Literal::Number(n)) = strip_type_wrappers(&object.value) {
            if n.fract() == 0.0 && *n >= 0.0 {
                self.write("(");
                self.write(&format_number(*n));
                self.write(")");
                return;
            }
        }
        self.print_expr(object, PREC_CALL);
    }

    fn print_arguments(&mut self, args: &[Node<Expr>]) {
        self.write("(");
        for (i, arg) in args.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.print_expr(arg, PREC_ASSIGN);
        }
        self.write(")");
    }

    fn print_template(&mut self, parts: &[String], exprs: &[Node<Expr>]) {
        self.write("`");
        for (i, part) in parts.iter().enumerate() {
            self.write(part);
            if let Some(expr) = exprs.get(i) {
                self.write("${");
                self.print_expr(expr, PREC_SEQUENCE);
                self.write("}");
            }
        }
        self.write("`");
    }

    fn print_literal(&mut self, literal: &Literal) {
        match literal {
            Literal::Number(n) => self.write(&format_number(*n)),
            Literal::String(s) => self.write(&quote(s)),
            Literal::Boolean(b) => self.write(if *b { "true" } else { "false" }),
            Literal::Null => self.write("null"),
            Literal::RegExp { pattern, flags } => {
                self.write("/");
                self.write(pattern);
                self.write("/");
                self.write(flags);
            }
            Literal::BigInt(digits) => {
                self.write(digits);
                self.write("n");
            }
        }
    }

    /// Short objects print on one line, anything longer or containing
    /// multi-statement functions breaks one property per line.
    fn print_object(&mut self, properties: &[ObjectProperty]) {
        if properties.is_empty() {
            self.write("{}");
            return;
        }

        let mut single_line = Printer {
            out: String::new(),
            indent: self.indent,
            inline: true,
            statement_start: None,
        };
        single_line.write("{ ");
        for (i, property) in properties.iter().enumerate() {
            if i > 0 {
                single_line.write(", ");
            }
            single_line.print_object_property(property);
        }
        single_line.write(" }");
        if !single_line.out.contains('\n') && single_line.out.len() <= INLINE_OBJECT_WIDTH {
            self.out.push_str(&single_line.out);
            return;
        }

        let saved_inline = std::mem::replace(&mut self.inline, false);
        self.write("{");
        self.newline();
        self.indent += 1;
        for (i, property) in properties.iter().enumerate() {
            self.write_indent();
            self.print_object_property(property);
            if i + 1 < properties.len() {
                self.write(",");
            }
            self.newline();
        }
        self.indent -= 1;
        self.write_indent();
        self.write("}");
        self.inline = saved_inline;
    }

    fn print_object_property(&mut self, property: &ObjectProperty) {
        match property {
            ObjectProperty::Property { key, value, shorthand } => {
                let shorthand = *shorthand
                    && matches!(
                        (key, strip_type_wrappers(&value.value)),
                        (PropertyName::Ident(k), Expr::Ident(v)) if k.value.name == v.name
                    );
                if shorthand {
                    self.print_property_name(key);
                } else {
                    self.print_property_name(key);
                    self.write(": ");
                    self.print_expr(value, PREC_ASSIGN);
                }
            }
            ObjectProperty::Method { key, kind, function } => self.print_method(key, *kind, function),
            ObjectProperty::Spread(expr) => {
                self.write("...");
                self.print_expr(expr, PREC_ASSIGN);
            }
        }
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn strip_type_wrappers(expr: &Expr) -> &Expr {
    match expr {
        Expr::TypeCast { expr, .. } | Expr::Satisfies { expr, .. } | Expr::NonNullAssertion(expr) => {
            strip_type_wrappers(&expr.value)
        }
        other => other,
    }
}

fn precedence(expr: &Expr) -> u8 {
    match strip_type_wrappers(expr) {
        Expr::Sequence(_) => PREC_SEQUENCE,
        Expr::Assignment { .. } | Expr::Arrow { .. } | Expr::Yield { .. } | Expr::Spread(_) => {
            PREC_ASSIGN
        }
        Expr::Ternary { .. } => PREC_CONDITIONAL,
        Expr::Binary { op, .. } => op.precedence(),
        Expr::Unary { op, .. } if op.is_postfix() => PREC_POSTFIX,
        Expr::Unary { .. } | Expr::Await(_) => PREC_UNARY,
        Expr::Literal(Literal::Number(n)) if n.is_sign_negative() => PREC_UNARY,
        Expr::Call { .. }
        | Expr::Member { .. }
        | Expr::Index { .. }
        | Expr::New { .. }
        | Expr::OptionalCall { .. }
        | Expr::OptionalIndex { .. }
        | Expr::OptionalMember { .. }
        | Expr::TaggedTemplate { .. }
        | Expr::DynamicImport(_)
        | Expr::MetaProperty { .. } => PREC_CALL,
        _ => PREC_PRIMARY,
    }
}

/// `a ?? b || c` is a syntax error; mixing `??` with `&&`/`||` needs parens.
fn operand_precedence(op: BinaryOp, operand: &Expr, min: u8) -> u8 {
    let Expr::Binary { op: inner, .. } = strip_type_wrappers(operand) else {
        return min;
    };
    let logical = |op: BinaryOp| matches!(op, BinaryOp::And | BinaryOp::Or);
    if (op == BinaryOp::NullishCoalesce && logical(*inner))
        || (logical(op) && *inner == BinaryOp::NullishCoalesce)
    {
        PREC_PRIMARY
    } else {
        min
    }
}

fn needs_unary_space(op: UnaryOp, operand: &Expr) -> bool {
    match (op, strip_type_wrappers(operand)) {
        (UnaryOp::Minus, Expr::Unary { op: UnaryOp::Minus | UnaryOp::PreDecrement, .. }) => true,
        (UnaryOp::Plus, Expr::Unary { op: UnaryOp::Plus | UnaryOp::PreIncrement, .. }) => true,
        (UnaryOp::Minus, Expr::Literal(Literal::Number(n))) => n.is_sign_negative(),
        _ => false,
    }
}

/// `new (f())()` must keep the callee's call grouped.
fn contains_call(expr: &Expr) -> bool {
    match strip_type_wrappers(expr) {
        Expr::Call { .. } | Expr::OptionalCall { .. } => true,
        Expr::Member { object, .. } | Expr::Index { object, .. } => contains_call(&object.value),
        _ => false,
    }
}

fn pattern_is_shorthand(key: &PropertyName, value: &Pattern) -> bool {
    let PropertyName::Ident(key) = key else {
        return false;
    };
    match value {
        Pattern::Ident(ident) => ident.value.name == key.value.name,
        Pattern::Assignment { pattern, .. } => {
            matches!(&pattern.value, Pattern::Ident(ident) if ident.value.name == key.value.name)
        }
        _ => false,
    }
}

fn specifier_text(name: &str, alias: Option<&str>) -> String {
    match alias {
        Some(alias) if alias != name => format!("{} as {}", name, alias),
        _ => name.to_string(),
    }
}

fn braced_list(names: &[String]) -> String {
    if names.is_empty() {
        "{}".to_string()
    } else {
        format!("{{ {} }}", names.join(", "))
    }
}

/// Statements that have no JavaScript form.
pub(crate) fn is_erased_stmt(stmt: &Stmt) -> bool {
    match stmt {
        Stmt::Decl(decl) => is_erased_decl(decl),
        _ => false,
    }
}

fn is_erased_decl(decl: &Decl) -> bool {
    decl.is_type_only() || matches!(decl, Decl::Enum(_) | Decl::Module(_))
}

fn is_erased_export(export: &ExportDecl) -> bool {
    match export {
        ExportDecl::Named {
            type_only,
            specifiers,
            ..
        } => *type_only || (!specifiers.is_empty() && specifiers.iter().all(|s| s.type_only)),
        ExportDecl::All { type_only, .. } => *type_only,
        ExportDecl::Decl(decl) => is_erased_decl(&decl.value),
        ExportDecl::DefaultDecl { decl, .. } => {
            matches!(decl.value, Decl::Interface(_)) || decl.value.is_type_only()
        }
        ExportDecl::AsNamespace(_) => true,
        _ => false,
    }
}

/// Double-quoted JavaScript string literal.
pub fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for ch in value.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04X}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if value.fract() == 0.0 && value.abs() < 1e21 {
        format!("{:.0}", value)
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tsdual_ast::factory;

    fn roundtrip(source: &str) -> String {
        let program = tsdual_parser::parse_source(source, 0).unwrap();
        print_program(&program)
    }

    #[test]
    fn test_statements_and_indentation() {
        let output = roundtrip("function f(a, b = 1, ...rest) { if (a) { return b; } else return 0; }");
        assert_eq!(
            output,
            "function f(a, b = 1, ...rest) {\n    if (a) {\n        return b;\n    }\n    else return 0;\n}\n"
        );
    }

    #[test]
    fn test_precedence_parentheses() {
        let left = factory::binary(factory::ident("a"), BinaryOp::Add, factory::ident("b"));
        let product = factory::binary(left, BinaryOp::Mul, factory::ident("c"));
        assert_eq!(print_expr(&product), "(a + b) * c");

        assert_eq!(roundtrip("x = (a, b);"), "x = (a, b);\n");
        assert_eq!(roundtrip("y = -(-z);"), "y = -(-z);\n");
        assert_eq!(roundtrip("y = a ?? (b || c);"), "y = a ?? (b || c);\n");
    }

    #[test]
    fn test_statement_start_needs_parens() {
        let object = factory::object(vec![("a", factory::number(1.0))]);
        let program = Program {
            items: vec![factory::item(factory::expr_stmt(factory::member(object, "a")))],
            span: Span::default(),
        };
        assert_eq!(print_program(&program), "({ a: 1 }).a;\n");
        assert_eq!(roundtrip("const f = () => ({ a: 1 });"), "const f = () => ({ a: 1 });\n");
    }

    #[test]
    fn test_sequence_callee() {
        let callee = Node::synthetic(Expr::Sequence(vec![
            factory::number(0.0),
            factory::member_path("m_1.f"),
        ]));
        let call = factory::call(callee, vec![factory::string("x")]);
        assert_eq!(print_expr(&call), "(0, m_1.f)(\"x\")");
    }

    #[test]
    fn test_objects_inline_and_multiline() {
        assert_eq!(roundtrip("const o = { a, b: 2 };"), "const o = { a, b: 2 };\n");
        let output = roundtrip("const o = { run() { a(); b(); } };");
        assert_eq!(
            output,
            "const o = {\n    run() {\n        a();\n        b();\n    }\n};\n"
        );
    }

    #[test]
    fn test_types_are_not_printed() {
        let output = roundtrip("let x: number = (y as any)!; function g<T>(this: Window, a?: T): void {}");
        assert_eq!(output, "let x = (y);\nfunction g(a) { }\n");
    }

    #[test]
    fn test_classes() {
        let output = roundtrip("class A extends B { static x = 1; #p = 2; m() { return this.#p; } }");
        assert_eq!(
            output,
            "class A extends B {\n    static x = 1;\n    #p = 2;\n    m() {\n        return this.#p;\n    }\n}\n"
        );
    }

    #[test]
    fn test_module_syntax() {
        let output = roundtrip("import d, { a as b, type T } from \"./m\"; export * as ns from './n'; export { b };");
        assert_eq!(
            output,
            "import d, { a as b } from \"./m\";\nexport * as ns from \"./n\";\nexport { b };\n"
        );
    }

    #[test]
    fn test_literals() {
        assert_eq!(quote("a\"b\n"), "\"a\\\"b\\n\"");
        assert_eq!(format_number(1.5), "1.5");
        assert_eq!(format_number(255.0), "255");
        assert_eq!(roundtrip("let t = `a${b}c`, r = /x+/g, n = 10n;"), "let t = `a${b}c`, r = /x+/g, n = 10n;\n");
    }
}

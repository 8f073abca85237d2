//! Mutable AST traversal.
//!
//! Implementors override the hooks they care about and call the matching
//! `walk_*` function to keep descending.

use super::*;

pub trait VisitMut {
    fn visit_program(&mut self, program: &mut Program) {
        walk_program(self, program);
    }

    fn visit_module_item(&mut self, item: &mut Node<ModuleItem>) {
        walk_module_item(self, item);
    }

    fn visit_stmt(&mut self, stmt: &mut Node<Stmt>) {
        walk_stmt(self, stmt);
    }

    fn visit_decl(&mut self, decl: &mut Decl) {
        walk_decl(self, decl);
    }

    fn visit_expr(&mut self, expr: &mut Node<Expr>) {
        walk_expr(self, expr);
    }

    fn visit_pattern(&mut self, pattern: &mut Node<Pattern>) {
        walk_pattern(self, pattern);
    }

    fn visit_function(&mut self, function: &mut Function) {
        walk_function(self, function);
    }

    fn visit_class(&mut self, class: &mut Class) {
        walk_class(self, class);
    }

    fn visit_block(&mut self, block: &mut BlockStmt) {
        walk_block(self, block);
    }

    fn visit_property_name(&mut self, name: &mut PropertyName) {
        if let PropertyName::Computed(expr) = name {
            self.visit_expr(expr);
        }
    }
}

pub fn walk_program<V: VisitMut + ?Sized>(v: &mut V, program: &mut Program) {
    for item in &mut program.items {
        v.visit_module_item(item);
    }
}

pub fn walk_module_item<V: VisitMut + ?Sized>(v: &mut V, item: &mut Node<ModuleItem>) {
    let span = item.span;
    match &mut item.value {
        ModuleItem::Import(_) => {}
        ModuleItem::Export(export) => match export {
            ExportDecl::Named { .. } | ExportDecl::All { .. } | ExportDecl::AsNamespace(_) => {}
            ExportDecl::Default(expr) | ExportDecl::Assignment(expr) => v.visit_expr(expr),
            ExportDecl::DefaultDecl { decl, .. } | ExportDecl::Decl(decl) => {
                v.visit_decl(&mut decl.value)
            }
        },
        ModuleItem::ImportEquals(decl) => {
            if let ModuleReference::Entity(expr) = &mut decl.reference {
                v.visit_expr(expr);
            }
        }
        ModuleItem::Stmt(stmt) => {
            // Statements are visited as nodes; borrow them out and back.
            let mut node = Node::new(std::mem::replace(stmt, Stmt::Empty), span);
            v.visit_stmt(&mut node);
            *stmt = node.value;
        }
    }
}

pub fn walk_stmt<V: VisitMut + ?Sized>(v: &mut V, stmt: &mut Node<Stmt>) {
    match &mut stmt.value {
        Stmt::Expr(expr) | Stmt::Throw(expr) => v.visit_expr(expr),
        Stmt::Decl(decl) => v.visit_decl(decl),
        Stmt::Return(expr) => {
            if let Some(expr) = expr {
                v.visit_expr(expr);
            }
        }
        Stmt::If {
            condition,
            then_stmt,
            else_stmt,
        } => {
            v.visit_expr(condition);
            v.visit_stmt(then_stmt);
            if let Some(else_stmt) = else_stmt {
                v.visit_stmt(else_stmt);
            }
        }
        Stmt::For {
            init,
            condition,
            update,
            body,
        } => {
            match init {
                Some(ForInit::VarDecl(decl)) => walk_var_decl(v, decl),
                Some(ForInit::Expr(expr)) => v.visit_expr(expr),
                None => {}
            }
            if let Some(condition) = condition {
                v.visit_expr(condition);
            }
            if let Some(update) = update {
                v.visit_expr(update);
            }
            v.visit_stmt(body);
        }
        Stmt::ForIn { left, right, body } | Stmt::ForOf { left, right, body, .. } => {
            match left {
                ForInLeft::VarDecl(decl) => walk_var_decl(v, decl),
                ForInLeft::Pattern(pattern) => v.visit_pattern(pattern),
            }
            v.visit_expr(right);
            v.visit_stmt(body);
        }
        Stmt::While { condition, body } | Stmt::DoWhile { body, condition } => {
            v.visit_expr(condition);
            v.visit_stmt(body);
        }
        Stmt::Block(block) => v.visit_block(block),
        Stmt::Try {
            block,
            catch,
            finally,
        } => {
            v.visit_block(&mut block.value);
            if let Some(catch) = catch {
                if let Some(param) = &mut catch.param {
                    v.visit_pattern(param);
                }
                v.visit_block(&mut catch.body.value);
            }
            if let Some(finally) = finally {
                v.visit_block(&mut finally.value);
            }
        }
        Stmt::Switch {
            discriminant,
            cases,
        } => {
            v.visit_expr(discriminant);
            for case in cases {
                if let Some(test) = &mut case.test {
                    v.visit_expr(test);
                }
                for stmt in &mut case.consequent {
                    v.visit_stmt(stmt);
                }
            }
        }
        Stmt::Labeled { stmt, .. } => v.visit_stmt(stmt),
        Stmt::Break(_) | Stmt::Continue(_) | Stmt::Empty | Stmt::Debugger => {}
    }
}

pub fn walk_var_decl<V: VisitMut + ?Sized>(v: &mut V, decl: &mut VarDecl) {
    for declarator in &mut decl.declarations {
        v.visit_pattern(&mut declarator.pattern);
        if let Some(init) = &mut declarator.init {
            v.visit_expr(init);
        }
    }
}

pub fn walk_decl<V: VisitMut + ?Sized>(v: &mut V, decl: &mut Decl) {
    match decl {
        Decl::Function(f) => v.visit_function(&mut f.function),
        Decl::Class(c) => v.visit_class(&mut c.class),
        Decl::Var(var) => walk_var_decl(v, var),
        Decl::Enum(e) => {
            for member in &mut e.members {
                if let Some(init) = &mut member.init {
                    v.visit_expr(init);
                }
            }
        }
        Decl::Module(m) => walk_module_decl(v, m),
        Decl::Interface(_) | Decl::TypeAlias(_) => {}
    }
}

pub fn walk_module_decl<V: VisitMut + ?Sized>(v: &mut V, module: &mut ModuleDecl) {
    match &mut module.body {
        Some(ModuleBody::Block(items)) => {
            for item in items {
                v.visit_module_item(item);
            }
        }
        Some(ModuleBody::Namespace(inner)) => walk_module_decl(v, &mut inner.value),
        None => {}
    }
}

pub fn walk_function<V: VisitMut + ?Sized>(v: &mut V, function: &mut Function) {
    for param in &mut function.params {
        walk_param(v, param);
    }
    if let Some(body) = &mut function.body {
        v.visit_block(&mut body.value);
    }
}

pub fn walk_param<V: VisitMut + ?Sized>(v: &mut V, param: &mut Param) {
    for decorator in &mut param.decorators {
        v.visit_expr(decorator);
    }
    v.visit_pattern(&mut param.pattern);
}

pub fn walk_class<V: VisitMut + ?Sized>(v: &mut V, class: &mut Class) {
    for decorator in &mut class.decorators {
        v.visit_expr(decorator);
    }
    if let Some(extends) = &mut class.extends {
        v.visit_expr(&mut extends.base);
    }
    for member in &mut class.members {
        match member {
            ClassMember::Constructor { params, body, .. } => {
                for param in params {
                    walk_param(v, param);
                }
                if let Some(body) = body {
                    v.visit_block(&mut body.value);
                }
            }
            ClassMember::Method {
                name,
                function,
                decorators,
                ..
            } => {
                for decorator in decorators {
                    v.visit_expr(decorator);
                }
                v.visit_property_name(name);
                v.visit_function(function);
            }
            ClassMember::Property {
                name,
                init,
                decorators,
                ..
            } => {
                for decorator in decorators {
                    v.visit_expr(decorator);
                }
                v.visit_property_name(name);
                if let Some(init) = init {
                    v.visit_expr(init);
                }
            }
            ClassMember::StaticBlock(block) => v.visit_block(&mut block.value),
            ClassMember::IndexSignature { .. } => {}
        }
    }
}

pub fn walk_block<V: VisitMut + ?Sized>(v: &mut V, block: &mut BlockStmt) {
    for stmt in &mut block.stmts {
        v.visit_stmt(stmt);
    }
}

pub fn walk_pattern<V: VisitMut + ?Sized>(v: &mut V, pattern: &mut Node<Pattern>) {
    match &mut pattern.value {
        Pattern::Ident(_) => {}
        Pattern::Array { elements, rest } => {
            for element in elements.iter_mut().flatten() {
                v.visit_pattern(element);
            }
            if let Some(rest) = rest {
                v.visit_pattern(rest);
            }
        }
        Pattern::Object { properties, rest } => {
            for property in properties {
                v.visit_property_name(&mut property.key);
                v.visit_pattern(&mut property.value);
            }
            if let Some(rest) = rest {
                v.visit_pattern(rest);
            }
        }
        Pattern::Assignment { pattern, default } => {
            v.visit_pattern(pattern);
            v.visit_expr(default);
        }
    }
}

pub fn walk_expr<V: VisitMut + ?Sized>(v: &mut V, expr: &mut Node<Expr>) {
    match &mut expr.value {
        Expr::Literal(_) | Expr::Ident(_) | Expr::This | Expr::Super | Expr::MetaProperty { .. } => {}
        Expr::Binary { left, right, .. } => {
            v.visit_expr(left);
            v.visit_expr(right);
        }
        Expr::Unary { expr, .. }
        | Expr::TypeCast { expr, .. }
        | Expr::Satisfies { expr, .. }
        | Expr::NonNullAssertion(expr)
        | Expr::Await(expr)
        | Expr::Paren(expr)
        | Expr::Spread(expr)
        | Expr::DynamicImport(expr) => v.visit_expr(expr),
        Expr::Assignment { target, value, .. } => {
            v.visit_expr(target);
            v.visit_expr(value);
        }
        Expr::Call { callee, args, .. }
        | Expr::New { callee, args, .. }
        | Expr::OptionalCall { callee, args } => {
            v.visit_expr(callee);
            for arg in args {
                v.visit_expr(arg);
            }
        }
        Expr::Member { object, .. } | Expr::OptionalMember { object, .. } => v.visit_expr(object),
        Expr::Index { object, index } | Expr::OptionalIndex { object, index } => {
            v.visit_expr(object);
            v.visit_expr(index);
        }
        Expr::Array(elements) => {
            for element in elements.iter_mut().flatten() {
                v.visit_expr(element);
            }
        }
        Expr::Object(properties) => {
            for property in properties {
                match property {
                    ObjectProperty::Property { key, value, .. } => {
                        v.visit_property_name(key);
                        v.visit_expr(value);
                    }
                    ObjectProperty::Method { key, function, .. } => {
                        v.visit_property_name(key);
                        v.visit_function(function);
                    }
                    ObjectProperty::Spread(expr) => v.visit_expr(expr),
                }
            }
        }
        Expr::Arrow { params, body, .. } => {
            for param in params {
                walk_param(v, param);
            }
            match body {
                ArrowBody::Expr(expr) => v.visit_expr(expr),
                ArrowBody::Block(block) => v.visit_block(&mut block.value),
            }
        }
        Expr::Function { function, .. } => v.visit_function(function),
        Expr::Class { class, .. } => v.visit_class(class),
        Expr::Ternary {
            condition,
            then_expr,
            else_expr,
        } => {
            v.visit_expr(condition);
            v.visit_expr(then_expr);
            v.visit_expr(else_expr);
        }
        Expr::Template { exprs, .. } => {
            for expr in exprs {
                v.visit_expr(expr);
            }
        }
        Expr::TaggedTemplate { tag, exprs, .. } => {
            v.visit_expr(tag);
            for expr in exprs {
                v.visit_expr(expr);
            }
        }
        Expr::Yield { argument, .. } => {
            if let Some(argument) = argument {
                v.visit_expr(argument);
            }
        }
        Expr::Sequence(exprs) => {
            for expr in exprs {
                v.visit_expr(expr);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory;

    struct DynamicImports(Vec<String>);

    impl VisitMut for DynamicImports {
        fn visit_expr(&mut self, expr: &mut Node<Expr>) {
            if let Expr::DynamicImport(arg) = &expr.value {
                if let Expr::Literal(Literal::String(s)) = &arg.value {
                    self.0.push(s.clone());
                }
            }
            walk_expr(self, expr);
        }
    }

    #[test]
    fn test_visits_nested_expressions() {
        let import = Node::synthetic(Expr::DynamicImport(Box::new(factory::string("./a"))));
        let arrow = factory::arrow(&[], import);
        let mut program = Program {
            items: vec![factory::item(factory::expr_stmt(factory::call(
                factory::ident("run"),
                vec![arrow],
            )))],
            span: Span::default(),
        };

        let mut visitor = DynamicImports(Vec::new());
        visitor.visit_program(&mut program);
        assert_eq!(visitor.0, vec!["./a".to_string()]);
    }
}

//! Class member erasure and parameter properties.

use tsdual_ast::factory::{assign, expr_stmt, ident, member};
use tsdual_ast::*;

use crate::strip::Stripper;
use crate::EmitDiagnostic;

impl Stripper<'_> {
    /// Drops members with no runtime meaning and turns parameter
    /// properties into assignments at the top of the constructor.
    pub(crate) fn lower_class(&mut self, class: &mut Class) {
        self.reject_decorators(&mut class.decorators);
        class.implements.clear();

        class.members.retain(|member| match member {
            ClassMember::Constructor { body, .. } => body.is_some(),
            ClassMember::Method {
                function,
                is_abstract,
                ..
            } => function.body.is_some() && !is_abstract,
            ClassMember::Property {
                name,
                init,
                is_abstract,
                is_declare,
                ..
            } => !is_abstract && !is_declare && (init.is_some() || is_private_name(name)),
            ClassMember::IndexSignature { .. } => false,
            ClassMember::StaticBlock(_) => true,
        });

        let has_super_class = class.extends.is_some();
        for member in &mut class.members {
            match member {
                ClassMember::Constructor { params, body, .. } => {
                    if let Some(body) = body {
                        let assignments = parameter_properties(params);
                        insert_after_super(&mut body.value.stmts, assignments, has_super_class);
                    }
                    for param in params.iter_mut() {
                        self.reject_decorators(&mut param.decorators);
                    }
                }
                ClassMember::Method { decorators, .. } | ClassMember::Property { decorators, .. } => {
                    self.reject_decorators(decorators);
                }
                _ => {}
            }
        }
    }

    pub(crate) fn reject_decorators(&mut self, decorators: &mut Vec<Node<Expr>>) {
        for decorator in decorators.drain(..) {
            self.diagnostics.push(EmitDiagnostic::new(
                "Decorators are not valid here.",
                decorator.span,
                1206,
            ));
        }
    }
}

fn is_private_name(name: &PropertyName) -> bool {
    matches!(name, PropertyName::Ident(ident) if ident.value.name.starts_with('#'))
}

/// `this.x = x;` for every parameter property, clearing the modifiers.
fn parameter_properties(params: &mut [Param]) -> Vec<Node<Stmt>> {
    let mut assignments = Vec::new();
    for param in params.iter_mut().filter(|param| param.is_parameter_property()) {
        param.accessibility = None;
        param.is_readonly = false;
        param.is_override = false;
        if let Some(name) = param.simple_name() {
            let this_property = member(Node::synthetic(Expr::This), name);
            assignments.push(expr_stmt(assign(this_property, ident(name))));
        }
    }
    assignments
}

/// Derived classes may not touch `this` before `super(...)` returns.
fn insert_after_super(stmts: &mut Vec<Node<Stmt>>, assignments: Vec<Node<Stmt>>, has_super_class: bool) {
    if assignments.is_empty() {
        return;
    }
    let position = if has_super_class {
        stmts
            .iter()
            .position(is_super_call)
            .map_or(0, |index| index + 1)
    } else {
        // Directives stay first
        stmts.iter().take_while(|stmt| stmt.value.directive().is_some()).count()
    };
    stmts.splice(position..position, assignments);
}

fn is_super_call(stmt: &Node<Stmt>) -> bool {
    matches!(
        &stmt.value,
        Stmt::Expr(Node { value: Expr::Call { callee, .. }, .. }) if matches!(callee.value, Expr::Super)
    )
}

#[cfg(test)]
mod tests {
    use crate::printer::print_program;
    use crate::strip::Stripper;
    use crate::LowerOptions;
    use pretty_assertions::assert_eq;
    use tsdual_ast::*;

    fn lower(source: &str) -> (String, Vec<u32>) {
        let options = LowerOptions::default();
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
        let codes = stripper.diagnostics.iter().map(|d| d.code).collect();
        let output = print_program(&Program {
            items: stmts.into_iter().map(tsdual_ast::factory::item).collect(),
            span: Span::default(),
        });
        (output, codes)
    }

    #[test]
    fn test_parameter_properties_follow_super() {
        let (output, _) = lower(
            "class B extends A { constructor(private readonly x: number, y: string) { super(y); log(); } }",
        );
        assert_eq!(
            output,
            "class B extends A {\n    constructor(x, y) {\n        super(y);\n        this.x = x;\n        log();\n    }\n}\n"
        );
    }

    #[test]
    fn test_type_only_members_are_dropped() {
        let (output, _) = lower(
            "abstract class C implements I { [k: string]: any; declare d: number; a: number; b = 1; #c; abstract m(): void; n(): void; n(x?: any) {} }",
        );
        assert_eq!(output, "class C {\n    b = 1;\n    #c;\n    n(x) { }\n}\n");
    }

    #[test]
    fn test_decorators_are_reported() {
        let (_, codes) = lower("@sealed class C { @log m() {} }");
        assert_eq!(codes, vec![1206, 1206]);
    }
}

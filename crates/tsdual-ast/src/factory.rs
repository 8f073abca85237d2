//! Constructors for synthesized nodes.
//!
//! Rewrite passes build small fragments (`exports.x = x;`,
//! `Object.defineProperty(...)`) far more often than they parse them, so the
//! common shapes live here. Every node gets a default span.

use super::*;

pub fn ident(name: impl Into<String>) -> Node<Expr> {
    Node::synthetic(Expr::ident(name))
}

pub fn ident_node(name: impl Into<String>) -> Node<Ident> {
    Node::synthetic(Ident::new(name))
}

pub fn member(object: Node<Expr>, property: impl Into<String>) -> Node<Expr> {
    Node::synthetic(Expr::Member {
        object: Box::new(object),
        property: ident_node(property),
    })
}

/// `a.b.c` from a dotted path.
pub fn member_path(path: &str) -> Node<Expr> {
    let mut parts = path.split('.');
    let first = parts.next().unwrap_or_default();
    parts.fold(ident(first), member)
}

pub fn index(object: Node<Expr>, index: Node<Expr>) -> Node<Expr> {
    Node::synthetic(Expr::Index {
        object: Box::new(object),
        index: Box::new(index),
    })
}

pub fn call(callee: Node<Expr>, args: Vec<Node<Expr>>) -> Node<Expr> {
    Node::synthetic(Expr::Call {
        callee: Box::new(callee),
        type_args: None,
        args,
    })
}

pub fn string(value: impl Into<String>) -> Node<Expr> {
    Node::synthetic(Expr::Literal(Literal::String(value.into())))
}

pub fn number(value: f64) -> Node<Expr> {
    Node::synthetic(Expr::Literal(Literal::Number(value)))
}

pub fn boolean(value: bool) -> Node<Expr> {
    Node::synthetic(Expr::Literal(Literal::Boolean(value)))
}

/// `void 0`
pub fn void_zero() -> Node<Expr> {
    Node::synthetic(Expr::Unary {
        op: UnaryOp::Void,
        expr: Box::new(number(0.0)),
    })
}

pub fn paren(expr: Node<Expr>) -> Node<Expr> {
    Node::synthetic(Expr::Paren(Box::new(expr)))
}

pub fn assign(target: Node<Expr>, value: Node<Expr>) -> Node<Expr> {
    Node::synthetic(Expr::Assignment {
        target: Box::new(target),
        op: AssignmentOp::Assign,
        value: Box::new(value),
    })
}

pub fn binary(left: Node<Expr>, op: BinaryOp, right: Node<Expr>) -> Node<Expr> {
    Node::synthetic(Expr::Binary {
        left: Box::new(left),
        op,
        right: Box::new(right),
    })
}

/// Object literal with plain `key: value` properties.
pub fn object(properties: Vec<(&str, Node<Expr>)>) -> Node<Expr> {
    Node::synthetic(Expr::Object(
        properties
            .into_iter()
            .map(|(key, value)| ObjectProperty::Property {
                key: PropertyName::Ident(ident_node(key)),
                value,
                shorthand: false,
            })
            .collect(),
    ))
}

/// `() => body` / `(a, b) => body`
pub fn arrow(params: &[&str], body: Node<Expr>) -> Node<Expr> {
    Node::synthetic(Expr::Arrow {
        type_params: None,
        params: params
            .iter()
            .map(|name| Param::new(Node::synthetic(Pattern::ident(*name))))
            .collect(),
        return_type: None,
        body: ArrowBody::Expr(Box::new(body)),
        is_async: false,
    })
}

pub fn expr_stmt(expr: Node<Expr>) -> Node<Stmt> {
    Node::synthetic(Stmt::Expr(expr))
}

pub fn var_stmt(kind: VarDeclKind, name: impl Into<String>, init: Option<Node<Expr>>) -> Node<Stmt> {
    Node::synthetic(Stmt::Decl(Decl::Var(VarDecl {
        kind,
        declarations: vec![VarDeclarator {
            pattern: Node::synthetic(Pattern::ident(name)),
            type_annotation: None,
            init,
            definite: false,
        }],
        is_declare: false,
    })))
}

pub fn item(stmt: Node<Stmt>) -> Node<ModuleItem> {
    Node::new(ModuleItem::Stmt(stmt.value), stmt.span)
}

/// `Object.defineProperty(target, "name", descriptor)`
pub fn define_property(target: Node<Expr>, name: &str, descriptor: Node<Expr>) -> Node<Expr> {
    call(
        member_path("Object.defineProperty"),
        vec![target, string(name), descriptor],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_path() {
        let expr = member_path("module.exports");
        assert_eq!(expr.value.member_of("module"), Some("exports"));
    }

    #[test]
    fn test_var_stmt_binds_name() {
        let stmt = var_stmt(VarDeclKind::Const, "m_1", None);
        match stmt.value {
            Stmt::Decl(decl) => assert_eq!(decl.declared_names(), vec!["m_1".to_string()]),
            other => panic!("expected declaration, got {:?}", other),
        }
    }
}

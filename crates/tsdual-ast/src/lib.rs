//! # tsdual AST
//!
//! Syntax tree shared by the TypeScript front-end and the JavaScript
//! emitters. Type annotations are kept as verbatim source slices
//! ([`TsType`]) since nothing downstream needs to reason about types;
//! the declaration emitter reprints them as written.

use std::fmt;

// =============================================================================
// Core Types (kept in lib.rs - used by all modules)
// =============================================================================

/// Source location information
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub file_id: usize,
}

impl Span {
    pub fn new(start: usize, end: usize, file_id: usize) -> Self {
        Self { start, end, file_id }
    }

    pub fn merge(&self, other: &Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
            file_id: self.file_id,
        }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// AST node wrapper that includes span information
#[derive(Debug, Clone, PartialEq)]
pub struct Node<T> {
    pub span: Span,
    pub value: T,
}

impl<T> Node<T> {
    pub fn new(value: T, span: Span) -> Self {
        Self { span, value }
    }

    /// Node created by a rewrite pass, with no source location.
    pub fn synthetic(value: T) -> Self {
        Self::new(value, Span::default())
    }
}

/// Identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ident {
    pub name: String,
}

impl Ident {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

// =============================================================================
// Module Declarations
// =============================================================================

pub mod factory;
pub mod decl;
pub mod expr;
pub mod module;
pub mod stmt;
pub mod types;
pub mod visit;

pub use decl::*;
pub use expr::*;
pub use module::*;
pub use stmt::*;
pub use types::*;

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn dummy_span() -> Span {
        Span::new(0, 0, 0)
    }

    #[test]
    fn test_span_merge() {
        let a = Span::new(4, 10, 1);
        let b = Span::new(2, 6, 1);
        let merged = a.merge(&b);
        assert_eq!(merged, Span::new(2, 10, 1));
        assert_eq!(merged.len(), 8);
    }

    #[test]
    fn test_expressions() {
        let literal = Expr::Literal(Literal::Number(42.0));
        assert!(matches!(literal, Expr::Literal(Literal::Number(n)) if n == 42.0));

        let ident = Expr::Ident(Ident::new("x"));
        assert!(matches!(ident, Expr::Ident(_)));
    }

    #[test]
    fn test_binary_op() {
        assert_eq!(format!("{}", BinaryOp::Add), "+");
        assert_eq!(format!("{}", BinaryOp::StrictEq), "===");
        assert_eq!(format!("{}", AssignmentOp::NullishAssign), "??=");
    }

    #[test]
    fn test_var_decl() {
        let decl = VarDecl {
            kind: VarDeclKind::Let,
            declarations: vec![VarDeclarator {
                pattern: Node::new(Pattern::Ident(Node::new(Ident::new("x"), dummy_span())), dummy_span()),
                type_annotation: None,
                init: Some(Node::new(Expr::Literal(Literal::Number(10.0)), dummy_span())),
                definite: false,
            }],
            is_declare: false,
        };

        assert_eq!(decl.kind, VarDeclKind::Let);
        assert_eq!(decl.declarations.len(), 1);
        assert_eq!(decl.bound_names(), vec!["x".to_string()]);
    }

    #[test]
    fn test_pattern_bound_names() {
        let pattern = Pattern::Object {
            properties: vec![
                ObjectPatternProperty {
                    key: PropertyName::Ident(Node::new(Ident::new("a"), dummy_span())),
                    value: Node::new(Pattern::Ident(Node::new(Ident::new("b"), dummy_span())), dummy_span()),
                    shorthand: false,
                },
            ],
            rest: Some(Box::new(Node::new(
                Pattern::Ident(Node::new(Ident::new("rest"), dummy_span())),
                dummy_span(),
            ))),
        };

        let mut names = Vec::new();
        pattern.collect_bound_names(&mut names);
        assert_eq!(names, vec!["b".to_string(), "rest".to_string()]);
    }

    #[test]
    fn test_enum_decl() {
        let decl = EnumDecl {
            name: Node::new(Ident::new("Color"), dummy_span()),
            members: vec![EnumMember {
                name: Node::new(Ident::new("Red"), dummy_span()),
                init: None,
            }],
            is_const: false,
            is_declare: false,
        };

        assert_eq!(decl.name.value.name, "Color");
        assert_eq!(decl.members.len(), 1);
    }
}

//! Expression definitions for the AST

use super::*;
use std::fmt;

/// Expression
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Literal values
    Literal(Literal),

    /// Identifier (private names keep their leading `#`)
    Ident(Ident),

    /// Binary operation: left op right
    Binary {
        left: Box<Node<Expr>>,
        op: BinaryOp,
        right: Box<Node<Expr>>,
    },

    /// Unary operation: op expr
    Unary {
        op: UnaryOp,
        expr: Box<Node<Expr>>,
    },

    /// Assignment: target = value
    Assignment {
        target: Box<Node<Expr>>,
        op: AssignmentOp,
        value: Box<Node<Expr>>,
    },

    /// Function call: callee(args)
    Call {
        callee: Box<Node<Expr>>,
        type_args: Option<Node<TsType>>,
        args: Vec<Node<Expr>>,
    },

    /// Member access: object.property
    Member {
        object: Box<Node<Expr>>,
        property: Node<Ident>,
    },

    /// Index access: object[index]
    Index {
        object: Box<Node<Expr>>,
        index: Box<Node<Expr>>,
    },

    /// Array literal: [elem1, elem2, ...]
    Array(Vec<Option<Node<Expr>>>),

    /// Object literal: { key1: value1, key2: value2 }
    Object(Vec<ObjectProperty>),

    /// Arrow function: (params) => body
    Arrow {
        type_params: Option<Node<TsType>>,
        params: Vec<Param>,
        return_type: Option<Node<TsType>>,
        body: ArrowBody,
        is_async: bool,
    },

    /// Function expression: function name?(params) { body }
    Function {
        name: Option<Node<Ident>>,
        function: Box<Function>,
    },

    /// Class expression: class name? { ... }
    Class {
        name: Option<Node<Ident>>,
        class: Box<Class>,
    },

    /// Ternary/conditional: condition ? then_expr : else_expr
    Ternary {
        condition: Box<Node<Expr>>,
        then_expr: Box<Node<Expr>>,
        else_expr: Box<Node<Expr>>,
    },

    /// Template literal: `hello ${expr}`; `parts` hold the raw text
    Template {
        parts: Vec<String>,
        exprs: Vec<Node<Expr>>,
    },

    /// Tagged template literal: tag`template`
    TaggedTemplate {
        tag: Box<Node<Expr>>,
        parts: Vec<String>,
        exprs: Vec<Node<Expr>>,
    },

    /// New expression: new Constructor(args)
    New {
        callee: Box<Node<Expr>>,
        type_args: Option<Node<TsType>>,
        args: Vec<Node<Expr>>,
    },

    /// Type cast: expr as Type, or <Type>expr
    TypeCast {
        expr: Box<Node<Expr>>,
        ty: Node<TsType>,
    },

    /// Satisfies expression: expr satisfies Type
    Satisfies {
        expr: Box<Node<Expr>>,
        ty: Node<TsType>,
    },

    /// Non-null assertion: expr!
    NonNullAssertion(Box<Node<Expr>>),

    /// Await expression: await expr
    Await(Box<Node<Expr>>),

    /// Yield expression: yield expr, yield* expr
    Yield {
        argument: Option<Box<Node<Expr>>>,
        delegate: bool,
    },

    /// Parenthesized expression
    Paren(Box<Node<Expr>>),

    /// This expression
    This,

    /// Super expression
    Super,

    /// Sequence expression: expr1, expr2, ...
    Sequence(Vec<Node<Expr>>),

    /// Spread expression: ...expr (in call args, array literals)
    Spread(Box<Node<Expr>>),

    /// Optional chaining call: expr?.(args)
    OptionalCall {
        callee: Box<Node<Expr>>,
        args: Vec<Node<Expr>>,
    },

    /// Optional chaining index: expr?.[index]
    OptionalIndex {
        object: Box<Node<Expr>>,
        index: Box<Node<Expr>>,
    },

    /// Optional chaining member: expr?.prop
    OptionalMember {
        object: Box<Node<Expr>>,
        property: Node<Ident>,
    },

    /// Meta property: new.target, import.meta
    MetaProperty {
        meta: Node<Ident>,
        property: Node<Ident>,
    },

    /// Dynamic import: import(specifier)
    DynamicImport(Box<Node<Expr>>),
}

impl Expr {
    pub fn ident(name: impl Into<String>) -> Self {
        Expr::Ident(Ident::new(name))
    }

    pub fn as_ident(&self) -> Option<&str> {
        match self {
            Expr::Ident(ident) => Some(&ident.name),
            _ => None,
        }
    }

    pub fn is_ident(&self, name: &str) -> bool {
        self.as_ident() == Some(name)
    }

    /// For `object.property` where `object` is the identifier `object_name`,
    /// returns the property name.
    pub fn member_of(&self, object_name: &str) -> Option<&str> {
        match self {
            Expr::Member { object, property } if object.value.is_ident(object_name) => {
                Some(&property.value.name)
            }
            _ => None,
        }
    }

    /// Looks through parentheses and TypeScript-only wrappers.
    pub fn unwrap_transparent(&self) -> &Expr {
        match self {
            Expr::Paren(inner)
            | Expr::TypeCast { expr: inner, .. }
            | Expr::Satisfies { expr: inner, .. }
            | Expr::NonNullAssertion(inner) => inner.value.unwrap_transparent(),
            other => other,
        }
    }
}

/// Literal values
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Number(f64),
    String(String),
    Boolean(bool),
    Null,
    RegExp { pattern: String, flags: String },
    BigInt(String),
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,

    // Comparison
    Eq,
    NotEq,
    StrictEq,
    StrictNotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,

    // Logical
    And,
    Or,
    NullishCoalesce,

    // Bitwise
    BitAnd,
    BitOr,
    BitXor,
    LeftShift,
    RightShift,
    UnsignedRightShift,

    // Other
    In,
    InstanceOf,
}

impl BinaryOp {
    /// Binding power, higher binds tighter.
    pub fn precedence(self) -> u8 {
        match self {
            BinaryOp::NullishCoalesce => 3,
            BinaryOp::Or => 4,
            BinaryOp::And => 5,
            BinaryOp::BitOr => 6,
            BinaryOp::BitXor => 7,
            BinaryOp::BitAnd => 8,
            BinaryOp::Eq | BinaryOp::NotEq | BinaryOp::StrictEq | BinaryOp::StrictNotEq => 9,
            BinaryOp::Lt
            | BinaryOp::LtEq
            | BinaryOp::Gt
            | BinaryOp::GtEq
            | BinaryOp::In
            | BinaryOp::InstanceOf => 10,
            BinaryOp::LeftShift | BinaryOp::RightShift | BinaryOp::UnsignedRightShift => 11,
            BinaryOp::Add | BinaryOp::Sub => 12,
            BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => 13,
            BinaryOp::Pow => 14,
        }
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Plus,
    Minus,
    Not,
    BitNot,
    TypeOf,
    Void,
    Delete,
    PreIncrement,
    PreDecrement,
    PostIncrement,
    PostDecrement,
}

impl UnaryOp {
    pub fn is_postfix(self) -> bool {
        matches!(self, UnaryOp::PostIncrement | UnaryOp::PostDecrement)
    }

    pub fn is_keyword(self) -> bool {
        matches!(self, UnaryOp::TypeOf | UnaryOp::Void | UnaryOp::Delete)
    }
}

/// Assignment operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssignmentOp {
    Assign,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
    ModAssign,
    PowAssign,
    LeftShiftAssign,
    RightShiftAssign,
    UnsignedRightShiftAssign,
    BitAndAssign,
    BitOrAssign,
    BitXorAssign,
    AndAssign,
    OrAssign,
    NullishAssign,
}

/// Arrow function body
#[derive(Debug, Clone, PartialEq)]
pub enum ArrowBody {
    Expr(Box<Node<Expr>>),
    Block(Node<BlockStmt>),
}

/// Accessor flavour of a method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MethodKind {
    Method,
    Getter,
    Setter,
}

/// Object property
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectProperty {
    Property {
        key: PropertyName,
        value: Node<Expr>,
        shorthand: bool,
    },
    Method {
        key: PropertyName,
        kind: MethodKind,
        function: Function,
    },
    Spread(Node<Expr>),
}

/// Property name
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyName {
    Ident(Node<Ident>),
    String(String),
    Number(f64),
    Computed(Box<Node<Expr>>),
}

impl PropertyName {
    /// Static name of the property, if it has one.
    pub fn static_name(&self) -> Option<String> {
        match self {
            PropertyName::Ident(ident) => Some(ident.value.name.clone()),
            PropertyName::String(s) => Some(s.clone()),
            PropertyName::Number(n) => Some(n.to_string()),
            PropertyName::Computed(_) => None,
        }
    }
}

// Display implementations

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Pow => "**",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::StrictEq => "===",
            BinaryOp::StrictNotEq => "!==",
            BinaryOp::Lt => "<",
            BinaryOp::LtEq => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::GtEq => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
            BinaryOp::NullishCoalesce => "??",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "^",
            BinaryOp::LeftShift => "<<",
            BinaryOp::RightShift => ">>",
            BinaryOp::UnsignedRightShift => ">>>",
            BinaryOp::In => "in",
            BinaryOp::InstanceOf => "instanceof",
        };
        write!(f, "{}", s)
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            UnaryOp::Plus => "+",
            UnaryOp::Minus => "-",
            UnaryOp::Not => "!",
            UnaryOp::BitNot => "~",
            UnaryOp::TypeOf => "typeof",
            UnaryOp::Void => "void",
            UnaryOp::Delete => "delete",
            UnaryOp::PreIncrement | UnaryOp::PostIncrement => "++",
            UnaryOp::PreDecrement | UnaryOp::PostDecrement => "--",
        };
        write!(f, "{}", s)
    }
}

impl fmt::Display for AssignmentOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AssignmentOp::Assign => "=",
            AssignmentOp::AddAssign => "+=",
            AssignmentOp::SubAssign => "-=",
            AssignmentOp::MulAssign => "*=",
            AssignmentOp::DivAssign => "/=",
            AssignmentOp::ModAssign => "%=",
            AssignmentOp::PowAssign => "**=",
            AssignmentOp::LeftShiftAssign => "<<=",
            AssignmentOp::RightShiftAssign => ">>=",
            AssignmentOp::UnsignedRightShiftAssign => ">>>=",
            AssignmentOp::BitAndAssign => "&=",
            AssignmentOp::BitOrAssign => "|=",
            AssignmentOp::BitXorAssign => "^=",
            AssignmentOp::AndAssign => "&&=",
            AssignmentOp::OrAssign => "||=",
            AssignmentOp::NullishAssign => "??=",
        };
        write!(f, "{}", s)
    }
}

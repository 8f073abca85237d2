//! Declaration definitions for the AST

use super::*;
use std::fmt;

/// Declaration
#[derive(Debug, Clone, PartialEq)]
pub enum Decl {
    /// Function declaration
    Function(FunctionDecl),

    /// Class declaration
    Class(ClassDecl),

    /// Interface declaration
    Interface(InterfaceDecl),

    /// Type alias declaration
    TypeAlias(TypeAliasDecl),

    /// Enum declaration
    Enum(EnumDecl),

    /// Module/namespace declaration
    Module(ModuleDecl),

    /// Variable declaration
    Var(VarDecl),
}

impl Decl {
    /// Declarations that produce no JavaScript at all.
    pub fn is_type_only(&self) -> bool {
        match self {
            Decl::Interface(_) | Decl::TypeAlias(_) => true,
            Decl::Function(f) => f.is_declare || f.function.body.is_none(),
            Decl::Class(c) => c.is_declare,
            Decl::Enum(e) => e.is_declare,
            Decl::Module(m) => m.is_declare || !m.is_instantiated(),
            Decl::Var(v) => v.is_declare,
        }
    }

    /// Names bound in the enclosing scope by this declaration.
    pub fn declared_names(&self) -> Vec<String> {
        match self {
            Decl::Function(f) => vec![f.name.value.name.clone()],
            Decl::Class(c) => vec![c.name.value.name.clone()],
            Decl::Interface(i) => vec![i.name.value.name.clone()],
            Decl::TypeAlias(t) => vec![t.name.value.name.clone()],
            Decl::Enum(e) => vec![e.name.value.name.clone()],
            Decl::Module(m) => match &m.name {
                ModuleName::Ident(ident) => vec![ident.value.name.clone()],
                ModuleName::String(_) => Vec::new(),
            },
            Decl::Var(v) => v.bound_names(),
        }
    }
}

/// Signature and body shared by function declarations, function
/// expressions and methods.
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub type_params: Option<Node<TsType>>,
    pub params: Vec<Param>,
    pub return_type: Option<Node<TsType>>,
    /// `None` for overload signatures and ambient functions
    pub body: Option<Node<BlockStmt>>,
    pub is_async: bool,
    pub is_generator: bool,
}

/// Function declaration
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    pub name: Node<Ident>,
    pub function: Function,
    pub is_declare: bool,
}

/// Function parameter
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    /// Binding pattern; defaults are wrapped in `Pattern::Assignment`
    pub pattern: Node<Pattern>,
    pub type_annotation: Option<Node<TsType>>,
    pub optional: bool,
    pub is_rest: bool,
    pub accessibility: Option<AccessModifier>,
    pub is_readonly: bool,
    pub is_override: bool,
    pub decorators: Vec<Node<Expr>>,
}

impl Param {
    pub fn new(pattern: Node<Pattern>) -> Self {
        Self {
            pattern,
            type_annotation: None,
            optional: false,
            is_rest: false,
            accessibility: None,
            is_readonly: false,
            is_override: false,
            decorators: Vec::new(),
        }
    }

    /// `constructor(private x: number)` and friends.
    pub fn is_parameter_property(&self) -> bool {
        self.accessibility.is_some() || self.is_readonly || self.is_override
    }

    /// The `this: T` pseudo-parameter, which is erased from output.
    pub fn is_this_param(&self) -> bool {
        matches!(&self.pattern.value, Pattern::Ident(ident) if ident.value.name == "this")
    }

    /// Name of a simple identifier binding, looking through a default value.
    pub fn simple_name(&self) -> Option<&str> {
        match &self.pattern.value {
            Pattern::Ident(ident) => Some(&ident.value.name),
            Pattern::Assignment { pattern, .. } => match &pattern.value {
                Pattern::Ident(ident) => Some(&ident.value.name),
                _ => None,
            },
            _ => None,
        }
    }
}

/// Class body and heritage, shared by declarations and expressions
#[derive(Debug, Clone, PartialEq)]
pub struct Class {
    pub type_params: Option<Node<TsType>>,
    pub extends: Option<ClassExtends>,
    pub implements: Vec<Node<TsType>>,
    pub members: Vec<ClassMember>,
    pub is_abstract: bool,
    pub decorators: Vec<Node<Expr>>,
}

/// Class declaration
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDecl {
    pub name: Node<Ident>,
    pub class: Class,
    pub is_declare: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassExtends {
    pub base: Box<Node<Expr>>,
    pub type_args: Option<Node<TsType>>,
}

/// Class member
#[derive(Debug, Clone, PartialEq)]
pub enum ClassMember {
    /// Constructor
    Constructor {
        params: Vec<Param>,
        body: Option<Node<BlockStmt>>,
        access: Option<AccessModifier>,
    },

    /// Method, getter or setter
    Method {
        name: PropertyName,
        kind: MethodKind,
        function: Function,
        access: Option<AccessModifier>,
        is_static: bool,
        is_abstract: bool,
        is_optional: bool,
        is_override: bool,
        decorators: Vec<Node<Expr>>,
    },

    /// Property/field
    Property {
        name: PropertyName,
        type_annotation: Option<Node<TsType>>,
        init: Option<Node<Expr>>,
        access: Option<AccessModifier>,
        is_static: bool,
        is_readonly: bool,
        is_abstract: bool,
        is_optional: bool,
        is_override: bool,
        is_declare: bool,
        definite: bool,
        decorators: Vec<Node<Expr>>,
    },

    /// Index signature, kept as written: `[key: string]: number`
    IndexSignature { text: String, is_static: bool },

    /// `static { ... }`
    StaticBlock(Node<BlockStmt>),
}

impl ClassMember {
    pub fn decorators(&self) -> &[Node<Expr>] {
        match self {
            ClassMember::Method { decorators, .. } | ClassMember::Property { decorators, .. } => {
                decorators
            }
            _ => &[],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessModifier {
    Public,
    Private,
    Protected,
}

/// Interface declaration; only declaration output needs it, so the body is
/// kept as source text from `interface` up to the closing brace.
#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceDecl {
    pub name: Node<Ident>,
    pub text: String,
    pub is_declare: bool,
}

/// Type alias declaration
#[derive(Debug, Clone, PartialEq)]
pub struct TypeAliasDecl {
    pub name: Node<Ident>,
    pub type_params: Option<Node<TsType>>,
    pub ty: Node<TsType>,
    pub is_declare: bool,
}

/// Enum declaration
#[derive(Debug, Clone, PartialEq)]
pub struct EnumDecl {
    pub name: Node<Ident>,
    pub members: Vec<EnumMember>,
    pub is_const: bool,
    pub is_declare: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumMember {
    /// Member name; quoted names are stored unquoted
    pub name: Node<Ident>,
    pub init: Option<Node<Expr>>,
}

/// Module/namespace declaration
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleDecl {
    pub name: ModuleName,
    /// `None` for shorthand ambient modules: `declare module "foo";`
    pub body: Option<ModuleBody>,
    pub is_declare: bool,
    /// `declare global { ... }`
    pub is_global: bool,
}

impl ModuleDecl {
    /// Whether the namespace has any runtime content.
    pub fn is_instantiated(&self) -> bool {
        if self.is_declare || self.is_global {
            return false;
        }
        match &self.body {
            None => false,
            Some(ModuleBody::Namespace(inner)) => inner.value.is_instantiated(),
            Some(ModuleBody::Block(items)) => items.iter().any(|item| match &item.value {
                ModuleItem::Stmt(Stmt::Decl(decl)) => !decl.is_type_only(),
                ModuleItem::Export(ExportDecl::Decl(decl)) => !decl.value.is_type_only(),
                ModuleItem::Stmt(_) => true,
                ModuleItem::ImportEquals(decl) => !decl.type_only,
                _ => false,
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ModuleName {
    Ident(Node<Ident>),
    String(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ModuleBody {
    Block(Vec<Node<ModuleItem>>),
    /// Dotted names: `namespace A.B { }` nests `B` inside `A`
    Namespace(Box<Node<ModuleDecl>>),
}

// Display implementations

impl fmt::Display for AccessModifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessModifier::Public => write!(f, "public"),
            AccessModifier::Private => write!(f, "private"),
            AccessModifier::Protected => write!(f, "protected"),
        }
    }
}

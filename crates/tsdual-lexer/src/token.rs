use tsdual_ast::Span;

/// Represents the different kinds of tokens in TypeScript.
///
/// Only reserved words get their own kind. Contextual keywords (`type`,
/// `from`, `as`, `declare`, `namespace`, `readonly`, ...) are lexed as
/// [`TokenKind::Identifier`] and recognised by the parser from their text,
/// since all of them are valid binding names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Reserved words
    Let,
    Const,
    Var,
    Function,
    Return,
    If,
    Else,
    For,
    While,
    Do,
    Break,
    Continue,
    Switch,
    Case,
    Default,
    Class,
    Extends,
    Implements,
    Interface,
    Enum,
    Import,
    Export,
    New,
    This,
    Super,
    Typeof,
    Instanceof,
    In,
    Void,
    Delete,
    Null,
    True,
    False,
    Await,
    Yield,
    Try,
    Catch,
    Finally,
    Throw,
    Debugger,
    With,

    // Literals
    NumberLiteral,
    StringLiteral,
    NoSubstitutionTemplate, // `text`
    TemplateHead,           // `text${
    TemplateMiddle,         // }text${
    TemplateTail,           // }text`
    RegexLiteral,
    BigIntLiteral,

    // Identifiers
    Identifier,
    PrivateName, // #name

    // Operators
    Plus,              // +
    Minus,             // -
    Star,              // *
    Slash,             // /
    Percent,           // %
    StarStar,          // **
    Eq,                // =
    EqEq,              // ==
    EqEqEq,            // ===
    BangEq,            // !=
    BangEqEq,          // !==
    Lt,                // <
    Gt,                // >
    LtEq,              // <=
    GtEq,              // >=
    AmpAmp,            // &&
    PipePipe,          // ||
    Bang,              // !
    Amp,               // &
    Pipe,              // |
    Caret,             // ^
    Tilde,             // ~
    LtLt,              // <<
    GtGt,              // >>
    GtGtGt,            // >>>
    PlusEq,            // +=
    MinusEq,           // -=
    StarEq,            // *=
    SlashEq,           // /=
    PercentEq,         // %=
    StarStarEq,        // **=
    AmpAmpEq,          // &&=
    PipePipeEq,        // ||=
    QuestionQuestionEq,// ??=
    LtLtEq,            // <<=
    GtGtEq,            // >>=
    GtGtGtEq,          // >>>=
    AmpEq,             // &=
    PipeEq,            // |=
    CaretEq,           // ^=
    QuestionQuestion,  // ??
    QuestionDot,       // ?.
    PlusPlus,          // ++
    MinusMinus,        // --
    FatArrow,          // =>
    DotDotDot,         // ...

    // Delimiters
    LParen,            // (
    RParen,            // )
    LBrace,            // {
    RBrace,            // }
    LBracket,          // [
    RBracket,          // ]
    Semicolon,         // ;
    Comma,             // ,
    Dot,               // .
    Colon,             // :
    Question,          // ?
    At,                // @

    // Special
    Eof,
    Error,
}

impl TokenKind {
    /// Reserved words, which are still valid as property names.
    pub fn is_keyword(self) -> bool {
        use TokenKind::*;
        matches!(
            self,
            Let | Const
                | Var
                | Function
                | Return
                | If
                | Else
                | For
                | While
                | Do
                | Break
                | Continue
                | Switch
                | Case
                | Default
                | Class
                | Extends
                | Implements
                | Interface
                | Enum
                | Import
                | Export
                | New
                | This
                | Super
                | Typeof
                | Instanceof
                | In
                | Void
                | Delete
                | Null
                | True
                | False
                | Await
                | Yield
                | Try
                | Catch
                | Finally
                | Throw
                | Debugger
                | With
        )
    }

    /// Whether a `/` following this token starts a regular expression.
    pub fn allows_regex_after(self) -> bool {
        use TokenKind::*;
        !matches!(
            self,
            Identifier
                | PrivateName
                | NumberLiteral
                | StringLiteral
                | BigIntLiteral
                | RegexLiteral
                | NoSubstitutionTemplate
                | TemplateTail
                | This
                | Super
                | Null
                | True
                | False
                | RParen
                | RBracket
                | RBrace
                | PlusPlus
                | MinusMinus
        )
    }
}

/// Represents a token with its kind, span, and value.
///
/// `value` is the cooked text for string literals, the raw text (without
/// delimiters) for template pieces, the full `/body/flags` for regular
/// expressions and the digits (separators removed) for numbers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    pub value: String,
    /// A line terminator precedes this token; drives automatic semicolon
    /// insertion and the restricted productions.
    pub newline_before: bool,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span, value: String) -> Self {
        Self {
            kind,
            span,
            value,
            newline_before: false,
        }
    }

    pub fn is_ident(&self, text: &str) -> bool {
        self.kind == TokenKind::Identifier && self.value == text
    }
}

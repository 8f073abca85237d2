//! Helper methods and utilities

use super::*;

/// Saved parser position for speculative parsing.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Checkpoint {
    current: usize,
    splits: usize,
    no_in: bool,
}

impl Parser {
    // =========================================================================
    // Names
    // =========================================================================

    pub(crate) fn is_binding_identifier(&self) -> bool {
        matches!(
            self.current_token().kind,
            TokenKind::Identifier | TokenKind::Await | TokenKind::Yield
        )
    }

    pub(crate) fn parse_binding_identifier(&mut self) -> ParseResult<Node<Ident>> {
        if !self.is_binding_identifier() {
            return Err(self.error("Identifier expected.", 1003));
        }
        let token = self.advance();
        Ok(Node::new(Ident::new(token.value.clone()), token.span))
    }

    /// Any identifier including reserved words, as allowed after `.`.
    pub(crate) fn parse_identifier_name(&mut self) -> ParseResult<Node<Ident>> {
        let token = self.current_token();
        let is_name = matches!(token.kind, TokenKind::Identifier | TokenKind::PrivateName)
            || token.kind.is_keyword();
        if !is_name {
            return Err(self.error("Identifier expected.", 1003));
        }
        let token = self.advance();
        Ok(Node::new(Ident::new(token.value.clone()), token.span))
    }

    /// Import/export specifier names may be string literals.
    pub(crate) fn parse_module_export_name(&mut self) -> ParseResult<Node<Ident>> {
        if self.check(TokenKind::StringLiteral) {
            let token = self.advance();
            return Ok(Node::new(Ident::new(token.value.clone()), token.span));
        }
        self.parse_identifier_name()
    }

    pub(crate) fn is_property_name_start(&self, offset: usize) -> bool {
        match self.peek(offset) {
            Some(token) => {
                matches!(
                    token.kind,
                    TokenKind::Identifier
                        | TokenKind::PrivateName
                        | TokenKind::StringLiteral
                        | TokenKind::NumberLiteral
                        | TokenKind::BigIntLiteral
                        | TokenKind::LBracket
                ) || token.kind.is_keyword()
            }
            None => false,
        }
    }

    pub(crate) fn parse_property_name(&mut self) -> ParseResult<PropertyName> {
        match self.current_token().kind {
            TokenKind::StringLiteral => {
                let value = self.advance().value.clone();
                Ok(PropertyName::String(value))
            }
            TokenKind::NumberLiteral => {
                let value = self.advance().value.clone();
                Ok(PropertyName::Number(parse_number_value(&value)))
            }
            TokenKind::BigIntLiteral => {
                let value = self.advance().value.clone();
                Ok(PropertyName::String(value))
            }
            TokenKind::LBracket => {
                self.advance();
                let saved = std::mem::replace(&mut self.no_in, false);
                let expr = self.parse_assignment_expression();
                self.no_in = saved;
                let expr = Box::new(expr?);
                self.consume(TokenKind::RBracket)?;
                Ok(PropertyName::Computed(expr))
            }
            _ => Ok(PropertyName::Ident(self.parse_identifier_name()?)),
        }
    }

    // =========================================================================
    // Operators
    // =========================================================================

    /// Binary operator at the current token, with its precedence.
    pub(crate) fn current_binary_operator(&self) -> Option<BinaryOp> {
        let op = match self.current_token().kind {
            TokenKind::Plus => BinaryOp::Add,
            TokenKind::Minus => BinaryOp::Sub,
            TokenKind::Star => BinaryOp::Mul,
            TokenKind::Slash => BinaryOp::Div,
            TokenKind::Percent => BinaryOp::Mod,
            TokenKind::StarStar => BinaryOp::Pow,
            TokenKind::EqEq => BinaryOp::Eq,
            TokenKind::BangEq => BinaryOp::NotEq,
            TokenKind::EqEqEq => BinaryOp::StrictEq,
            TokenKind::BangEqEq => BinaryOp::StrictNotEq,
            TokenKind::Lt => BinaryOp::Lt,
            TokenKind::LtEq => BinaryOp::LtEq,
            TokenKind::Gt => BinaryOp::Gt,
            TokenKind::GtEq => BinaryOp::GtEq,
            TokenKind::AmpAmp => BinaryOp::And,
            TokenKind::PipePipe => BinaryOp::Or,
            TokenKind::QuestionQuestion => BinaryOp::NullishCoalesce,
            TokenKind::Amp => BinaryOp::BitAnd,
            TokenKind::Pipe => BinaryOp::BitOr,
            TokenKind::Caret => BinaryOp::BitXor,
            TokenKind::LtLt => BinaryOp::LeftShift,
            TokenKind::GtGt => BinaryOp::RightShift,
            TokenKind::GtGtGt => BinaryOp::UnsignedRightShift,
            TokenKind::In if !self.no_in => BinaryOp::In,
            TokenKind::Instanceof => BinaryOp::InstanceOf,
            _ => return None,
        };
        Some(op)
    }

    pub(crate) fn current_assignment_operator(&self) -> Option<AssignmentOp> {
        let op = match self.current_token().kind {
            TokenKind::Eq => AssignmentOp::Assign,
            TokenKind::PlusEq => AssignmentOp::AddAssign,
            TokenKind::MinusEq => AssignmentOp::SubAssign,
            TokenKind::StarEq => AssignmentOp::MulAssign,
            TokenKind::SlashEq => AssignmentOp::DivAssign,
            TokenKind::PercentEq => AssignmentOp::ModAssign,
            TokenKind::StarStarEq => AssignmentOp::PowAssign,
            TokenKind::AmpAmpEq => AssignmentOp::AndAssign,
            TokenKind::PipePipeEq => AssignmentOp::OrAssign,
            TokenKind::QuestionQuestionEq => AssignmentOp::NullishAssign,
            TokenKind::LtLtEq => AssignmentOp::LeftShiftAssign,
            TokenKind::GtGtEq => AssignmentOp::RightShiftAssign,
            TokenKind::GtGtGtEq => AssignmentOp::UnsignedRightShiftAssign,
            TokenKind::AmpEq => AssignmentOp::BitAndAssign,
            TokenKind::PipeEq => AssignmentOp::BitOrAssign,
            TokenKind::CaretEq => AssignmentOp::BitXorAssign,
            _ => return None,
        };
        Some(op)
    }

    // =========================================================================
    // Utility Methods (Token Manipulation)
    // =========================================================================

    pub(crate) fn current_token(&self) -> &Token {
        &self.tokens[self.current.min(self.tokens.len() - 1)]
    }

    pub(crate) fn previous_token(&self) -> &Token {
        &self.tokens[(self.current.saturating_sub(1)).min(self.tokens.len() - 1)]
    }

    pub(crate) fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous_token()
    }

    pub(crate) fn check(&self, kind: TokenKind) -> bool {
        !self.is_at_end() && self.current_token().kind == kind
    }

    /// Current token is the contextual keyword `text`.
    pub(crate) fn check_ident(&self, text: &str) -> bool {
        self.current_token().is_ident(text)
    }

    pub(crate) fn peek(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.current + offset)
    }

    pub(crate) fn peek_kind(&self, offset: usize) -> Option<TokenKind> {
        self.peek(offset).map(|token| token.kind)
    }

    pub(crate) fn peek_is_ident(&self, offset: usize, text: &str) -> bool {
        self.peek(offset).map_or(false, |token| token.is_ident(text))
    }

    /// Token at `offset` is on the same line as the one before it.
    pub(crate) fn peek_same_line(&self, offset: usize) -> bool {
        self.peek(offset).map_or(false, |token| !token.newline_before)
    }

    pub(crate) fn is_at_end(&self) -> bool {
        self.current >= self.tokens.len() || self.current_token().kind == TokenKind::Eof
    }

    pub(crate) fn consume(&mut self, kind: TokenKind) -> ParseResult<&Token> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(ParseError::expected(describe(kind), self.current_token().span))
        }
    }

    pub(crate) fn expect_contextual(&mut self, text: &str) -> ParseResult<()> {
        if self.check_ident(text) {
            self.advance();
            Ok(())
        } else {
            Err(ParseError::expected(text, self.current_token().span))
        }
    }

    /// Automatic semicolon insertion: before `}`, at end of input, or after
    /// a line break.
    pub(crate) fn can_insert_semicolon(&self) -> bool {
        self.check(TokenKind::RBrace) || self.is_at_end() || self.current_token().newline_before
    }

    pub(crate) fn consume_semicolon(&mut self) -> ParseResult<()> {
        if self.check(TokenKind::Semicolon) {
            self.advance();
            Ok(())
        } else if self.can_insert_semicolon() {
            Ok(())
        } else {
            Err(ParseError::expected(";", self.current_token().span))
        }
    }

    pub(crate) fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            current: self.current,
            splits: self.splits.len(),
            no_in: self.no_in,
        }
    }

    pub(crate) fn rewind(&mut self, checkpoint: Checkpoint) {
        while self.splits.len() > checkpoint.splits {
            if let Some((index, original)) = self.splits.pop() {
                self.tokens.remove(index + 1);
                self.tokens[index] = original;
            }
        }
        self.current = checkpoint.current;
        self.no_in = checkpoint.no_in;
    }

    /// Runs `f` speculatively: on error the parser is rewound and `None`
    /// is returned.
    pub(crate) fn try_parse<T>(&mut self, f: impl FnOnce(&mut Self) -> ParseResult<T>) -> Option<T> {
        let checkpoint = self.checkpoint();
        match f(self) {
            Ok(value) => Some(value),
            Err(_) => {
                self.rewind(checkpoint);
                None
            }
        }
    }

    /// Splits `>>`, `>=`, `>>>` and friends so a type argument list can
    /// close on the leading `>`.
    pub(crate) fn split_greater_than(&mut self) {
        let token = self.current_token().clone();
        let rest = match token.kind {
            TokenKind::GtGt => TokenKind::Gt,
            TokenKind::GtGtGt => TokenKind::GtGt,
            TokenKind::GtEq => TokenKind::Eq,
            TokenKind::GtGtEq => TokenKind::GtEq,
            TokenKind::GtGtGtEq => TokenKind::GtGtEq,
            _ => return,
        };
        let split_at = token.span.start + 1;
        let mut first = Token::new(
            TokenKind::Gt,
            Span::new(token.span.start, split_at, token.span.file_id),
            ">".to_string(),
        );
        first.newline_before = token.newline_before;
        let second = Token::new(
            rest,
            Span::new(split_at, token.span.end, token.span.file_id),
            token.value[1..].to_string(),
        );

        let index = self.current;
        self.tokens[index] = first;
        self.tokens.insert(index + 1, second);
        self.splits.push((index, token));
    }

    /// Skips a bracketed group starting at the current `(`, `[` or `{`.
    pub(crate) fn skip_balanced(&mut self) -> ParseResult<()> {
        let mut depth = 0usize;
        loop {
            match self.current_token().kind {
                TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace | TokenKind::TemplateHead => {
                    depth += 1
                }
                TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace | TokenKind::TemplateTail => {
                    depth = depth.saturating_sub(1)
                }
                TokenKind::Eof => return Err(ParseError::expected("}", self.current_token().span)),
                _ => {}
            }
            self.advance();
            if depth == 0 {
                return Ok(());
            }
        }
    }

    /// Source text covered by tokens `start_index..self.current`.
    pub(crate) fn text_from(&self, start_index: usize) -> String {
        let end_index = self.current.min(self.tokens.len());
        if start_index >= end_index {
            return String::new();
        }
        let first = self.tokens[start_index].span;
        let last = self.tokens[end_index - 1].span;
        match &self.source {
            Some(source) if last.end <= source.len() && first.start <= last.end => {
                source[first.start..last.end].to_string()
            }
            _ => self.tokens[start_index..end_index]
                .iter()
                .map(|token| token.value.as_str())
                .collect::<Vec<_>>()
                .join(" "),
        }
    }

    pub(crate) fn error(&self, message: impl Into<String>, code: u32) -> ParseError {
        ParseError::new(message, self.current_token().span, code)
    }

    pub(crate) fn synchronize(&mut self) {
        self.advance();

        while !self.is_at_end() {
            if self.previous_token().kind == TokenKind::Semicolon {
                return;
            }

            match self.current_token().kind {
                TokenKind::Class
                | TokenKind::Function
                | TokenKind::Let
                | TokenKind::Const
                | TokenKind::Var
                | TokenKind::For
                | TokenKind::If
                | TokenKind::While
                | TokenKind::Return
                | TokenKind::Import
                | TokenKind::Export => return,
                _ => {}
            }

            self.advance();
        }
    }
}

/// Numeric value of a number token (separators already removed).
pub(crate) fn parse_number_value(text: &str) -> f64 {
    let radix = match text.get(..2) {
        Some("0x") | Some("0X") => 16,
        Some("0o") | Some("0O") => 8,
        Some("0b") | Some("0B") => 2,
        _ => return text.parse::<f64>().unwrap_or(f64::NAN),
    };
    text[2..]
        .chars()
        .filter_map(|c| c.to_digit(radix))
        .fold(0.0, |acc, digit| acc * radix as f64 + digit as f64)
}

/// Source spelling of a token kind, for "'x' expected." messages.
pub(crate) fn describe(kind: TokenKind) -> &'static str {
    match kind {
        TokenKind::LParen => "(",
        TokenKind::RParen => ")",
        TokenKind::LBrace => "{",
        TokenKind::RBrace => "}",
        TokenKind::LBracket => "[",
        TokenKind::RBracket => "]",
        TokenKind::Semicolon => ";",
        TokenKind::Comma => ",",
        TokenKind::Colon => ":",
        TokenKind::Dot => ".",
        TokenKind::Eq => "=",
        TokenKind::FatArrow => "=>",
        TokenKind::Lt => "<",
        TokenKind::Gt => ">",
        TokenKind::Question => "?",
        TokenKind::While => "while",
        TokenKind::Function => "function",
        TokenKind::Class => "class",
        TokenKind::Import => "import",
        TokenKind::StringLiteral => "string literal",
        TokenKind::Identifier => "identifier",
        TokenKind::TemplateTail => "`",
        _ => "token",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_number_value() {
        assert_eq!(parse_number_value("42"), 42.0);
        assert_eq!(parse_number_value("0x1A"), 26.0);
        assert_eq!(parse_number_value("0b1010"), 10.0);
        assert_eq!(parse_number_value("0o17"), 15.0);
        assert_eq!(parse_number_value("1e3"), 1000.0);
    }
}

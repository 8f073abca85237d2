//! Type annotation parsing
//!
//! Types are recognised structurally and kept as source text: nothing in
//! the pipeline inspects them beyond reprinting declarations.

use super::*;

impl Parser {
    pub(crate) fn parse_type(&mut self) -> ParseResult<Node<TsType>> {
        let start_index = self.current;
        let start = self.current_token().span;
        self.skip_type()?;
        let span = start.merge(&self.previous_token().span);
        Ok(Node::new(TsType::new(self.text_from(start_index)), span))
    }

    /// `: Type` if present.
    pub(crate) fn parse_type_annotation(&mut self) -> ParseResult<Option<Node<TsType>>> {
        if !self.check(TokenKind::Colon) {
            return Ok(None);
        }
        self.advance();
        Ok(Some(self.parse_type()?))
    }

    /// `<T, U extends X = Y>` including the angle brackets.
    pub(crate) fn parse_type_parameters(&mut self) -> ParseResult<Option<Node<TsType>>> {
        if !self.check(TokenKind::Lt) {
            return Ok(None);
        }
        let start_index = self.current;
        let start = self.current_token().span;
        self.skip_type_parameters()?;
        let span = start.merge(&self.previous_token().span);
        Ok(Some(Node::new(TsType::new(self.text_from(start_index)), span)))
    }

    /// `<A, B>` including the angle brackets.
    pub(crate) fn parse_type_arguments(&mut self) -> ParseResult<Node<TsType>> {
        let start_index = self.current;
        let start = self.current_token().span;
        self.skip_type_arguments()?;
        let span = start.merge(&self.previous_token().span);
        Ok(Node::new(TsType::new(self.text_from(start_index)), span))
    }

    pub(crate) fn skip_type(&mut self) -> ParseResult<()> {
        // Generic function type: <T>(x: T) => T
        if self.check(TokenKind::Lt) {
            self.skip_type_parameters()?;
            return self.skip_function_type_rest();
        }

        // Constructor type: new (...) => T, abstract new (...) => T
        if self.check(TokenKind::New)
            || (self.check_ident("abstract") && self.peek_kind(1) == Some(TokenKind::New))
        {
            if self.check_ident("abstract") {
                self.advance();
            }
            self.advance();
            if self.check(TokenKind::Lt) {
                self.skip_type_parameters()?;
            }
            return self.skip_function_type_rest();
        }

        self.skip_union_type()?;

        // Conditional type: A extends B ? C : D
        if self.check(TokenKind::Extends) && !self.current_token().newline_before {
            self.advance();
            self.skip_union_type()?;
            self.consume(TokenKind::Question)?;
            self.skip_type()?;
            self.consume(TokenKind::Colon)?;
            self.skip_type()?;
        }

        Ok(())
    }

    fn skip_function_type_rest(&mut self) -> ParseResult<()> {
        if !self.check(TokenKind::LParen) {
            return Err(ParseError::expected("(", self.current_token().span));
        }
        self.skip_balanced()?;
        self.consume(TokenKind::FatArrow)?;
        self.skip_type()
    }

    fn skip_union_type(&mut self) -> ParseResult<()> {
        if self.check(TokenKind::Pipe) {
            self.advance();
        }
        self.skip_intersection_type()?;
        while self.check(TokenKind::Pipe) {
            self.advance();
            self.skip_intersection_type()?;
        }
        Ok(())
    }

    fn skip_intersection_type(&mut self) -> ParseResult<()> {
        if self.check(TokenKind::Amp) {
            self.advance();
        }
        self.skip_type_operator()?;
        while self.check(TokenKind::Amp) {
            self.advance();
            self.skip_type_operator()?;
        }
        Ok(())
    }

    fn skip_type_operator(&mut self) -> ParseResult<()> {
        let is_operator = (self.check_ident("keyof")
            || self.check_ident("unique")
            || self.check_ident("readonly"))
            && self.is_type_start(1);
        if is_operator {
            self.advance();
            return self.skip_type_operator();
        }

        if self.check_ident("infer") && self.peek_kind(1) == Some(TokenKind::Identifier) {
            self.advance();
            self.advance();
            if self.check(TokenKind::Extends) {
                // `infer U extends X` unless it is really `... extends X ? A : B`
                self.try_parse(|p| {
                    p.advance();
                    p.skip_union_type()?;
                    if p.check(TokenKind::Question) {
                        Err(p.error("'?' not expected.", 1005))
                    } else {
                        Ok(())
                    }
                });
            }
            return Ok(());
        }

        self.skip_postfix_type()
    }

    fn skip_postfix_type(&mut self) -> ParseResult<()> {
        self.skip_primary_type()?;
        // T[] and T[K]
        while self.check(TokenKind::LBracket) && !self.current_token().newline_before {
            self.skip_balanced()?;
        }
        Ok(())
    }

    fn skip_primary_type(&mut self) -> ParseResult<()> {
        match self.current_token().kind {
            TokenKind::LParen => {
                self.skip_balanced()?;
                if self.check(TokenKind::FatArrow) {
                    self.advance();
                    self.skip_type()?;
                }
            }
            TokenKind::LBrace | TokenKind::LBracket => self.skip_balanced()?,
            TokenKind::StringLiteral
            | TokenKind::NumberLiteral
            | TokenKind::BigIntLiteral
            | TokenKind::NoSubstitutionTemplate
            | TokenKind::True
            | TokenKind::False
            | TokenKind::Null
            | TokenKind::Void => {
                self.advance();
            }
            TokenKind::This => {
                self.advance();
                self.skip_type_predicate()?;
            }
            TokenKind::Minus => {
                self.advance();
                if !matches!(
                    self.current_token().kind,
                    TokenKind::NumberLiteral | TokenKind::BigIntLiteral
                ) {
                    return Err(self.error("Type expected.", 1110));
                }
                self.advance();
            }
            TokenKind::TemplateHead => {
                self.advance();
                loop {
                    self.skip_type()?;
                    match self.current_token().kind {
                        TokenKind::TemplateMiddle => {
                            self.advance();
                        }
                        TokenKind::TemplateTail => {
                            self.advance();
                            break;
                        }
                        _ => return Err(ParseError::expected("`", self.current_token().span)),
                    }
                }
            }
            TokenKind::Typeof => {
                self.advance();
                if self.check(TokenKind::Import) {
                    self.skip_import_type()?;
                } else {
                    self.parse_identifier_name()?;
                    while self.check(TokenKind::Dot) {
                        self.advance();
                        self.parse_identifier_name()?;
                    }
                    self.skip_optional_type_arguments()?;
                }
            }
            TokenKind::Import => self.skip_import_type()?,
            TokenKind::Identifier => {
                if self.check_ident("asserts")
                    && matches!(self.peek_kind(1), Some(TokenKind::Identifier) | Some(TokenKind::This))
                    && self.peek_same_line(1)
                {
                    self.advance();
                    self.advance();
                    return self.skip_type_predicate();
                }
                self.advance();
                while self.check(TokenKind::Dot) {
                    self.advance();
                    self.parse_identifier_name()?;
                }
                self.skip_optional_type_arguments()?;
                self.skip_type_predicate()?;
            }
            _ => return Err(self.error("Type expected.", 1110)),
        }
        Ok(())
    }

    /// `x is T` after a parameter name in return position.
    fn skip_type_predicate(&mut self) -> ParseResult<()> {
        if self.check_ident("is") && !self.current_token().newline_before {
            self.advance();
            self.skip_type()?;
        }
        Ok(())
    }

    /// `import("m").Name<T>`
    fn skip_import_type(&mut self) -> ParseResult<()> {
        self.consume(TokenKind::Import)?;
        if !self.check(TokenKind::LParen) {
            return Err(ParseError::expected("(", self.current_token().span));
        }
        self.skip_balanced()?;
        while self.check(TokenKind::Dot) {
            self.advance();
            self.parse_identifier_name()?;
        }
        self.skip_optional_type_arguments()
    }

    fn skip_optional_type_arguments(&mut self) -> ParseResult<()> {
        if self.check(TokenKind::Lt) && !self.current_token().newline_before {
            self.skip_type_arguments()?;
        }
        Ok(())
    }

    pub(crate) fn skip_type_arguments(&mut self) -> ParseResult<()> {
        self.consume(TokenKind::Lt)?;
        loop {
            self.skip_type()?;
            if self.check(TokenKind::Comma) {
                self.advance();
            } else {
                break;
            }
        }
        self.split_greater_than();
        self.consume(TokenKind::Gt)?;
        Ok(())
    }

    fn skip_type_parameters(&mut self) -> ParseResult<()> {
        self.consume(TokenKind::Lt)?;
        while !self.check(TokenKind::Gt) && !self.is_at_end() {
            // const T, in T, out T
            while (self.check(TokenKind::Const) || self.check(TokenKind::In) || self.check_ident("out"))
                && self.peek_kind(1) == Some(TokenKind::Identifier)
            {
                self.advance();
            }
            self.parse_binding_identifier()?;
            if self.check(TokenKind::Extends) {
                self.advance();
                self.skip_type()?;
            }
            if self.check(TokenKind::Eq) {
                self.advance();
                self.skip_type()?;
            }
            self.split_greater_than();
            if !self.check(TokenKind::Gt) {
                self.consume(TokenKind::Comma)?;
            }
        }
        self.consume(TokenKind::Gt)?;
        Ok(())
    }

    /// Whether the token at `offset` can begin a type.
    fn is_type_start(&self, offset: usize) -> bool {
        matches!(
            self.peek_kind(offset),
            Some(TokenKind::Identifier)
                | Some(TokenKind::LParen)
                | Some(TokenKind::LBracket)
                | Some(TokenKind::LBrace)
                | Some(TokenKind::StringLiteral)
                | Some(TokenKind::NumberLiteral)
                | Some(TokenKind::Typeof)
                | Some(TokenKind::This)
                | Some(TokenKind::Void)
                | Some(TokenKind::Null)
                | Some(TokenKind::Import)
                | Some(TokenKind::NoSubstitutionTemplate)
                | Some(TokenKind::TemplateHead)
        )
    }
}

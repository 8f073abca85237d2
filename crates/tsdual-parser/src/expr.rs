//! Expression parsing

use super::*;

impl Parser {
    /// Expression including the comma operator.
    pub(crate) fn parse_expression(&mut self) -> ParseResult<Node<Expr>> {
        let start = self.current_token().span;
        let first = self.parse_assignment_expression()?;
        if !self.check(TokenKind::Comma) {
            return Ok(first);
        }

        let mut exprs = vec![first];
        while self.check(TokenKind::Comma) {
            self.advance();
            exprs.push(self.parse_assignment_expression()?);
        }
        let span = start.merge(&self.previous_token().span);
        Ok(Node::new(Expr::Sequence(exprs), span))
    }

    /// Parses with `in` re-enabled, for bracketed contexts inside a
    /// `for (...)` head.
    fn with_in_allowed<T>(&mut self, f: impl FnOnce(&mut Self) -> ParseResult<T>) -> ParseResult<T> {
        let saved = std::mem::replace(&mut self.no_in, false);
        let result = f(self);
        self.no_in = saved;
        result
    }

    pub(crate) fn parse_assignment_expression(&mut self) -> ParseResult<Node<Expr>> {
        if self.check(TokenKind::Yield) {
            return self.parse_yield_expression();
        }

        if let Some(arrow) = self.parse_arrow_function_if_present()? {
            return Ok(arrow);
        }

        let start = self.current_token().span;
        let left = self.parse_conditional_expression()?;

        if let Some(op) = self.current_assignment_operator() {
            self.advance();
            let value = self.parse_assignment_expression()?;
            let span = start.merge(&self.previous_token().span);
            return Ok(Node::new(
                Expr::Assignment {
                    target: Box::new(left),
                    op,
                    value: Box::new(value),
                },
                span,
            ));
        }

        Ok(left)
    }

    fn parse_yield_expression(&mut self) -> ParseResult<Node<Expr>> {
        let start = self.current_token().span;
        self.consume(TokenKind::Yield)?;

        let delegate = if self.check(TokenKind::Star) {
            self.advance();
            true
        } else {
            false
        };

        let has_argument = delegate
            || !(self.current_token().newline_before
                || matches!(
                    self.current_token().kind,
                    TokenKind::Semicolon
                        | TokenKind::RBrace
                        | TokenKind::RParen
                        | TokenKind::RBracket
                        | TokenKind::Colon
                        | TokenKind::Comma
                        | TokenKind::Eof
                ));
        let argument = if has_argument {
            Some(Box::new(self.parse_assignment_expression()?))
        } else {
            None
        };

        let span = start.merge(&self.previous_token().span);
        Ok(Node::new(Expr::Yield { argument, delegate }, span))
    }

    fn parse_conditional_expression(&mut self) -> ParseResult<Node<Expr>> {
        let start = self.current_token().span;
        let condition = self.parse_binary_expression(0)?;

        if !self.check(TokenKind::Question) {
            return Ok(condition);
        }
        self.advance();
        let then_expr = self.with_in_allowed(|p| p.parse_assignment_expression())?;
        self.consume(TokenKind::Colon)?;
        let else_expr = self.parse_assignment_expression()?;

        let span = start.merge(&self.previous_token().span);
        Ok(Node::new(
            Expr::Ternary {
                condition: Box::new(condition),
                then_expr: Box::new(then_expr),
                else_expr: Box::new(else_expr),
            },
            span,
        ))
    }

    /// Precedence climbing over binary operators and `as`/`satisfies`.
    fn parse_binary_expression(&mut self, min_precedence: u8) -> ParseResult<Node<Expr>> {
        let start = self.current_token().span;
        let mut left = self.parse_unary_expression()?;

        loop {
            // `as` and `satisfies` bind like relational operators
            let is_type_operator = (self.check_ident("as") || self.check_ident("satisfies"))
                && !self.current_token().newline_before;
            if is_type_operator {
                if BinaryOp::Lt.precedence() <= min_precedence {
                    break;
                }
                let is_satisfies = self.check_ident("satisfies");
                self.advance();
                let ty = if self.check(TokenKind::Const) {
                    let token = self.advance();
                    Node::new(TsType::new("const"), token.span)
                } else {
                    self.parse_type()?
                };
                let span = start.merge(&self.previous_token().span);
                let expr = Box::new(left);
                left = Node::new(
                    if is_satisfies {
                        Expr::Satisfies { expr, ty }
                    } else {
                        Expr::TypeCast { expr, ty }
                    },
                    span,
                );
                continue;
            }

            let Some(op) = self.current_binary_operator() else {
                break;
            };
            let precedence = op.precedence();
            if precedence <= min_precedence {
                break;
            }
            self.advance();

            // `**` is right-associative
            let right = if op == BinaryOp::Pow {
                self.parse_binary_expression(precedence - 1)?
            } else {
                self.parse_binary_expression(precedence)?
            };

            let span = start.merge(&self.previous_token().span);
            left = Node::new(
                Expr::Binary {
                    left: Box::new(left),
                    op,
                    right: Box::new(right),
                },
                span,
            );
        }

        Ok(left)
    }

    fn parse_unary_expression(&mut self) -> ParseResult<Node<Expr>> {
        let start = self.current_token().span;

        let op = match self.current_token().kind {
            TokenKind::Plus => Some(UnaryOp::Plus),
            TokenKind::Minus => Some(UnaryOp::Minus),
            TokenKind::Bang => Some(UnaryOp::Not),
            TokenKind::Tilde => Some(UnaryOp::BitNot),
            TokenKind::Typeof => Some(UnaryOp::TypeOf),
            TokenKind::Void => Some(UnaryOp::Void),
            TokenKind::Delete => Some(UnaryOp::Delete),
            TokenKind::PlusPlus => Some(UnaryOp::PreIncrement),
            TokenKind::MinusMinus => Some(UnaryOp::PreDecrement),
            _ => None,
        };

        let expr = if let Some(op) = op {
            self.advance();
            let expr = Box::new(self.parse_unary_expression()?);
            Expr::Unary { op, expr }
        } else if self.check(TokenKind::Await) {
            self.advance();
            Expr::Await(Box::new(self.parse_unary_expression()?))
        } else if self.check(TokenKind::Lt) {
            // Type assertion: <T>expr
            self.advance();
            let ty = self.parse_type()?;
            self.split_greater_than();
            self.consume(TokenKind::Gt)?;
            let expr = Box::new(self.parse_unary_expression()?);
            Expr::TypeCast { expr, ty }
        } else {
            return self.parse_postfix_expression();
        };

        let span = start.merge(&self.previous_token().span);
        Ok(Node::new(expr, span))
    }

    fn parse_postfix_expression(&mut self) -> ParseResult<Node<Expr>> {
        let start = self.current_token().span;
        let expr = self.parse_left_hand_side_expression()?;

        let op = match self.current_token().kind {
            TokenKind::PlusPlus if !self.current_token().newline_before => UnaryOp::PostIncrement,
            TokenKind::MinusMinus if !self.current_token().newline_before => UnaryOp::PostDecrement,
            _ => return Ok(expr),
        };
        self.advance();

        let span = start.merge(&self.previous_token().span);
        Ok(Node::new(
            Expr::Unary {
                op,
                expr: Box::new(expr),
            },
            span,
        ))
    }

    pub(crate) fn parse_left_hand_side_expression(&mut self) -> ParseResult<Node<Expr>> {
        let expr = if self.check(TokenKind::New) {
            self.parse_new_expression()?
        } else {
            self.parse_primary_expression()?
        };
        self.parse_call_tail(expr, true)
    }

    fn parse_new_expression(&mut self) -> ParseResult<Node<Expr>> {
        let start = self.current_token().span;
        let new_token = self.consume(TokenKind::New)?.clone();

        // new.target
        if self.check(TokenKind::Dot) {
            self.advance();
            let property = self.parse_identifier_name()?;
            let span = start.merge(&self.previous_token().span);
            return Ok(Node::new(
                Expr::MetaProperty {
                    meta: Node::new(Ident::new("new"), new_token.span),
                    property,
                },
                span,
            ));
        }

        let callee = if self.check(TokenKind::New) {
            self.parse_new_expression()?
        } else {
            self.parse_primary_expression()?
        };
        let callee = self.parse_call_tail(callee, false)?;

        let type_args = if self.check(TokenKind::Lt) {
            self.try_parse(|p| p.parse_type_arguments())
        } else {
            None
        };

        let args = if self.check(TokenKind::LParen) {
            self.parse_arguments()?
        } else {
            Vec::new()
        };

        let span = start.merge(&self.previous_token().span);
        Ok(Node::new(
            Expr::New {
                callee: Box::new(callee),
                type_args,
                args,
            },
            span,
        ))
    }

    /// Member accesses, calls, tagged templates and non-null assertions
    /// following `expr`. Calls are skipped for `new` callees.
    fn parse_call_tail(&mut self, mut expr: Node<Expr>, allow_call: bool) -> ParseResult<Node<Expr>> {
        let start = expr.span;

        loop {
            let kind = self.current_token().kind;
            let value = match kind {
                // Member access
                TokenKind::Dot => {
                    self.advance();
                    let property = self.parse_identifier_name()?;
                    Expr::Member {
                        object: Box::new(expr),
                        property,
                    }
                }

                // Optional chaining
                TokenKind::QuestionDot => {
                    self.advance();
                    if self.check(TokenKind::LParen) || self.check(TokenKind::Lt) {
                        if self.check(TokenKind::Lt) {
                            self.parse_type_arguments()?;
                        }
                        let args = self.parse_arguments()?;
                        Expr::OptionalCall {
                            callee: Box::new(expr),
                            args,
                        }
                    } else if self.check(TokenKind::LBracket) {
                        self.advance();
                        let index = Box::new(self.with_in_allowed(|p| p.parse_expression())?);
                        self.consume(TokenKind::RBracket)?;
                        Expr::OptionalIndex {
                            object: Box::new(expr),
                            index,
                        }
                    } else {
                        let property = self.parse_identifier_name()?;
                        Expr::OptionalMember {
                            object: Box::new(expr),
                            property,
                        }
                    }
                }

                // Index access
                TokenKind::LBracket => {
                    self.advance();
                    let index = Box::new(self.with_in_allowed(|p| p.parse_expression())?);
                    self.consume(TokenKind::RBracket)?;
                    Expr::Index {
                        object: Box::new(expr),
                        index,
                    }
                }

                // Non-null assertion: expr!
                TokenKind::Bang if !self.current_token().newline_before => {
                    self.advance();
                    Expr::NonNullAssertion(Box::new(expr))
                }

                // Tagged template
                TokenKind::NoSubstitutionTemplate | TokenKind::TemplateHead => {
                    let (parts, exprs) = self.parse_template_parts()?;
                    Expr::TaggedTemplate {
                        tag: Box::new(expr),
                        parts,
                        exprs,
                    }
                }

                // Function call
                TokenKind::LParen if allow_call => {
                    let args = self.parse_arguments()?;
                    Expr::Call {
                        callee: Box::new(expr),
                        type_args: None,
                        args,
                    }
                }

                // Call with explicit type arguments: f<T>(x)
                TokenKind::Lt if allow_call => {
                    let type_args = self.try_parse(|p| {
                        let type_args = p.parse_type_arguments()?;
                        if p.check(TokenKind::LParen) {
                            Ok(type_args)
                        } else {
                            Err(p.error("'(' expected.", 1005))
                        }
                    });
                    let Some(type_args) = type_args else {
                        break;
                    };
                    let args = self.parse_arguments()?;
                    Expr::Call {
                        callee: Box::new(expr),
                        type_args: Some(type_args),
                        args,
                    }
                }

                _ => break,
            };

            let span = start.merge(&self.previous_token().span);
            expr = Node::new(value, span);
        }

        Ok(expr)
    }

    pub(crate) fn parse_arguments(&mut self) -> ParseResult<Vec<Node<Expr>>> {
        self.consume(TokenKind::LParen)?;
        let mut args = Vec::new();

        self.with_in_allowed(|p| {
            while !p.check(TokenKind::RParen) && !p.is_at_end() {
                if p.check(TokenKind::DotDotDot) {
                    let spread_start = p.current_token().span;
                    p.advance();
                    let expr = p.parse_assignment_expression()?;
                    let spread_span = spread_start.merge(&expr.span);
                    args.push(Node::new(Expr::Spread(Box::new(expr)), spread_span));
                } else {
                    args.push(p.parse_assignment_expression()?);
                }
                if !p.check(TokenKind::RParen) {
                    p.consume(TokenKind::Comma)?;
                }
            }
            Ok(())
        })?;

        self.consume(TokenKind::RParen)?;
        Ok(args)
    }

    fn parse_template_parts(&mut self) -> ParseResult<(Vec<String>, Vec<Node<Expr>>)> {
        let head = self.advance().clone();
        let mut parts = vec![head.value];
        let mut exprs = Vec::new();

        if head.kind == TokenKind::NoSubstitutionTemplate {
            return Ok((parts, exprs));
        }

        loop {
            exprs.push(self.with_in_allowed(|p| p.parse_expression())?);
            match self.current_token().kind {
                TokenKind::TemplateMiddle => {
                    parts.push(self.advance().value.clone());
                }
                TokenKind::TemplateTail => {
                    parts.push(self.advance().value.clone());
                    break;
                }
                _ => return Err(ParseError::expected("}", self.current_token().span)),
            }
        }

        Ok((parts, exprs))
    }

    pub(crate) fn parse_primary_expression(&mut self) -> ParseResult<Node<Expr>> {
        let start = self.current_token().span;

        let expr = match self.current_token().kind {
            // Literals
            TokenKind::NumberLiteral => {
                let value = self.advance().value.clone();
                Expr::Literal(Literal::Number(parse_number_value(&value)))
            }
            TokenKind::BigIntLiteral => {
                let value = self.advance().value.clone();
                Expr::Literal(Literal::BigInt(value))
            }
            TokenKind::StringLiteral => {
                let value = self.advance().value.clone();
                Expr::Literal(Literal::String(value))
            }
            TokenKind::RegexLiteral => {
                let text = self.advance().value.clone();
                let close = text.rfind('/').unwrap_or(text.len());
                let pattern = text.get(1..close).unwrap_or_default().to_string();
                let flags = text.get(close + 1..).unwrap_or_default().to_string();
                Expr::Literal(Literal::RegExp { pattern, flags })
            }
            TokenKind::True => {
                self.advance();
                Expr::Literal(Literal::Boolean(true))
            }
            TokenKind::False => {
                self.advance();
                Expr::Literal(Literal::Boolean(false))
            }
            TokenKind::Null => {
                self.advance();
                Expr::Literal(Literal::Null)
            }

            // Template literal
            TokenKind::NoSubstitutionTemplate | TokenKind::TemplateHead => {
                let (parts, exprs) = self.parse_template_parts()?;
                Expr::Template { parts, exprs }
            }

            // async function expression
            TokenKind::Identifier
                if self.check_ident("async")
                    && self.peek_kind(1) == Some(TokenKind::Function)
                    && self.peek_same_line(1) =>
            {
                self.advance();
                return self.parse_function_expression(true, start);
            }

            // Identifiers
            TokenKind::Identifier | TokenKind::Await | TokenKind::Yield | TokenKind::PrivateName => {
                let name = self.advance().value.clone();
                Expr::Ident(Ident::new(name))
            }

            TokenKind::This => {
                self.advance();
                Expr::This
            }

            TokenKind::Super => {
                self.advance();
                Expr::Super
            }

            // Parenthesized expression
            TokenKind::LParen => {
                self.advance();
                let expr = self.with_in_allowed(|p| p.parse_expression())?;
                self.consume(TokenKind::RParen)?;
                Expr::Paren(Box::new(expr))
            }

            TokenKind::LBracket => self.with_in_allowed(|p| p.parse_array_literal())?,
            TokenKind::LBrace => self.with_in_allowed(|p| p.parse_object_literal())?,

            TokenKind::Function => return self.parse_function_expression(false, start),

            TokenKind::Class | TokenKind::At => {
                let decorators = self.parse_decorators()?;
                self.consume(TokenKind::Class)?;
                let name = if self.is_binding_identifier() {
                    Some(self.parse_binding_identifier()?)
                } else {
                    None
                };
                let mut class = self.parse_class_tail(false)?;
                class.decorators = decorators;
                Expr::Class {
                    name,
                    class: Box::new(class),
                }
            }

            // import(...) and import.meta
            TokenKind::Import => {
                let import_token = self.advance().clone();
                if self.check(TokenKind::Dot) {
                    self.advance();
                    let property = self.parse_identifier_name()?;
                    Expr::MetaProperty {
                        meta: Node::new(Ident::new("import"), import_token.span),
                        property,
                    }
                } else {
                    let mut args = self.parse_arguments()?;
                    if args.is_empty() {
                        return Err(self.error("Expression expected.", 1109));
                    }
                    // Import options (second argument) have no CommonJS
                    // equivalent and are dropped.
                    Expr::DynamicImport(Box::new(args.swap_remove(0)))
                }
            }

            _ => return Err(self.error("Expression expected.", 1109)),
        };

        let span = start.merge(&self.previous_token().span);
        Ok(Node::new(expr, span))
    }

    fn parse_array_literal(&mut self) -> ParseResult<Expr> {
        self.consume(TokenKind::LBracket)?;
        let mut elements = Vec::new();

        while !self.check(TokenKind::RBracket) && !self.is_at_end() {
            if self.check(TokenKind::Comma) {
                elements.push(None);
                self.advance();
                continue;
            }

            if self.check(TokenKind::DotDotDot) {
                let spread_start = self.current_token().span;
                self.advance();
                let expr = self.parse_assignment_expression()?;
                let span = spread_start.merge(&expr.span);
                elements.push(Some(Node::new(Expr::Spread(Box::new(expr)), span)));
            } else {
                elements.push(Some(self.parse_assignment_expression()?));
            }

            if !self.check(TokenKind::RBracket) {
                self.consume(TokenKind::Comma)?;
            }
        }

        self.consume(TokenKind::RBracket)?;
        Ok(Expr::Array(elements))
    }

    fn parse_object_literal(&mut self) -> ParseResult<Expr> {
        self.consume(TokenKind::LBrace)?;
        let mut properties = Vec::new();

        while !self.check(TokenKind::RBrace) && !self.is_at_end() {
            if self.check(TokenKind::DotDotDot) {
                self.advance();
                let expr = self.parse_assignment_expression()?;
                properties.push(ObjectProperty::Spread(expr));
            } else {
                properties.push(self.parse_object_member()?);
            }

            if !self.check(TokenKind::RBrace) {
                self.consume(TokenKind::Comma)?;
            }
        }

        self.consume(TokenKind::RBrace)?;
        Ok(Expr::Object(properties))
    }

    fn parse_object_member(&mut self) -> ParseResult<ObjectProperty> {
        let is_modifier_position = |p: &Self| {
            p.peek_same_line(1)
                && (p.is_property_name_start(1) || p.peek_kind(1) == Some(TokenKind::Star))
        };

        let is_async = self.check_ident("async") && is_modifier_position(self);
        if is_async {
            self.advance();
        }

        let is_generator = if self.check(TokenKind::Star) {
            self.advance();
            true
        } else {
            false
        };

        let mut kind = MethodKind::Method;
        if !is_async && !is_generator && self.is_property_name_start(1) {
            if self.check_ident("get") {
                kind = MethodKind::Getter;
                self.advance();
            } else if self.check_ident("set") {
                kind = MethodKind::Setter;
                self.advance();
            }
        }

        let key_token = self.current_token().clone();
        let key = self.parse_property_name()?;

        let is_method = kind != MethodKind::Method
            || is_async
            || is_generator
            || self.check(TokenKind::LParen)
            || self.check(TokenKind::Lt);
        if is_method {
            let function = self.parse_function_rest(is_async, is_generator, false)?;
            return Ok(ObjectProperty::Method {
                key,
                kind,
                function,
            });
        }

        if self.check(TokenKind::Colon) {
            self.advance();
            let value = self.parse_assignment_expression()?;
            return Ok(ObjectProperty::Property {
                key,
                value,
                shorthand: false,
            });
        }

        // Shorthand property, possibly with a destructuring default
        let PropertyName::Ident(ident) = &key else {
            return Err(ParseError::expected(":", self.current_token().span));
        };
        if key_token.kind != TokenKind::Identifier
            && !matches!(key_token.kind, TokenKind::Await | TokenKind::Yield)
        {
            return Err(ParseError::expected(":", self.current_token().span));
        }
        let mut value = Node::new(Expr::Ident(ident.value.clone()), ident.span);
        if self.check(TokenKind::Eq) {
            self.advance();
            let default = self.parse_assignment_expression()?;
            let span = value.span.merge(&default.span);
            value = Node::new(
                Expr::Assignment {
                    target: Box::new(value),
                    op: AssignmentOp::Assign,
                    value: Box::new(default),
                },
                span,
            );
        }

        Ok(ObjectProperty::Property {
            key,
            value,
            shorthand: true,
        })
    }

    fn parse_function_expression(&mut self, is_async: bool, start: Span) -> ParseResult<Node<Expr>> {
        self.consume(TokenKind::Function)?;

        let is_generator = if self.check(TokenKind::Star) {
            self.advance();
            true
        } else {
            false
        };

        let name = if self.is_binding_identifier() {
            Some(self.parse_binding_identifier()?)
        } else {
            None
        };

        let function = self.parse_function_rest(is_async, is_generator, false)?;

        let span = start.merge(&self.previous_token().span);
        Ok(Node::new(
            Expr::Function {
                name,
                function: Box::new(function),
            },
            span,
        ))
    }

    // =========================================================================
    // Arrow functions
    // =========================================================================

    fn parse_arrow_function_if_present(&mut self) -> ParseResult<Option<Node<Expr>>> {
        let start = self.current_token().span;

        let is_async = self.check_ident("async")
            && self.peek_same_line(1)
            && match self.peek_kind(1) {
                Some(TokenKind::Identifier) => self.peek_kind(2) == Some(TokenKind::FatArrow),
                Some(TokenKind::LParen) | Some(TokenKind::Lt) => self.looks_like_arrow(1),
                _ => false,
            };
        let offset = usize::from(is_async);

        // x => body
        if matches!(
            self.peek_kind(offset),
            Some(TokenKind::Identifier) | Some(TokenKind::Await) | Some(TokenKind::Yield)
        ) && self.peek_kind(offset + 1) == Some(TokenKind::FatArrow)
        {
            if is_async {
                self.advance();
            }
            let ident = self.parse_binding_identifier()?;
            let param = Param::new(Node::new(Pattern::Ident(ident.clone()), ident.span));
            self.consume(TokenKind::FatArrow)?;
            let body = self.parse_arrow_body()?;
            let span = start.merge(&self.previous_token().span);
            return Ok(Some(Node::new(
                Expr::Arrow {
                    type_params: None,
                    params: vec![param],
                    return_type: None,
                    body,
                    is_async,
                },
                span,
            )));
        }

        if !is_async && !self.looks_like_arrow(0) {
            return Ok(None);
        }

        let head = self.try_parse(|p| {
            if is_async {
                p.advance();
            }
            let type_params = p.parse_type_parameters()?;
            p.consume(TokenKind::LParen)?;
            let params = p.with_in_allowed(|p| p.parse_parameter_list())?;
            p.consume(TokenKind::RParen)?;
            let return_type = p.parse_type_annotation()?;
            if !p.check(TokenKind::FatArrow) || p.current_token().newline_before {
                return Err(ParseError::expected("=>", p.current_token().span));
            }
            p.advance();
            Ok((type_params, params, return_type))
        });

        let Some((type_params, params, return_type)) = head else {
            return Ok(None);
        };

        let body = self.parse_arrow_body()?;
        let span = start.merge(&self.previous_token().span);
        Ok(Some(Node::new(
            Expr::Arrow {
                type_params,
                params,
                return_type,
                body,
                is_async,
            },
            span,
        )))
    }

    /// Cheap lookahead: `(` whose matching `)` is followed by `=>` or `:`,
    /// or a `<` that may open type parameters.
    fn looks_like_arrow(&self, offset: usize) -> bool {
        match self.peek_kind(offset) {
            Some(TokenKind::Lt) => true,
            Some(TokenKind::LParen) => {
                let mut depth = 0usize;
                let mut index = self.current + offset;
                while let Some(token) = self.tokens.get(index) {
                    match token.kind {
                        TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace => depth += 1,
                        TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace => {
                            depth = depth.saturating_sub(1);
                            if depth == 0 {
                                return matches!(
                                    self.tokens.get(index + 1).map(|t| t.kind),
                                    Some(TokenKind::FatArrow) | Some(TokenKind::Colon)
                                );
                            }
                        }
                        TokenKind::Eof => return false,
                        _ => {}
                    }
                    index += 1;
                }
                false
            }
            _ => false,
        }
    }

    fn parse_arrow_body(&mut self) -> ParseResult<ArrowBody> {
        if self.check(TokenKind::LBrace) {
            Ok(ArrowBody::Block(self.with_in_allowed(|p| p.parse_block_statement())?))
        } else {
            Ok(ArrowBody::Expr(Box::new(self.parse_assignment_expression()?)))
        }
    }
}

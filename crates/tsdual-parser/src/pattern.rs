//! Binding patterns and parameters

use super::*;

impl Parser {
    /// Identifier, array or object binding pattern.
    pub(crate) fn parse_binding_pattern(&mut self) -> ParseResult<Node<Pattern>> {
        let start = self.current_token().span;

        let pattern = match self.current_token().kind {
            TokenKind::LBracket => self.parse_array_pattern()?,
            TokenKind::LBrace => self.parse_object_pattern()?,
            _ => Pattern::Ident(self.parse_binding_identifier()?),
        };

        let span = start.merge(&self.previous_token().span);
        Ok(Node::new(pattern, span))
    }

    /// A pattern optionally followed by `= default`.
    fn parse_binding_element(&mut self) -> ParseResult<Node<Pattern>> {
        let pattern = self.parse_binding_pattern()?;
        self.parse_pattern_default(pattern)
    }

    fn parse_pattern_default(&mut self, pattern: Node<Pattern>) -> ParseResult<Node<Pattern>> {
        if !self.check(TokenKind::Eq) {
            return Ok(pattern);
        }
        self.advance();
        let default = self.parse_assignment_expression()?;
        let span = pattern.span.merge(&default.span);
        Ok(Node::new(
            Pattern::Assignment {
                pattern: Box::new(pattern),
                default: Box::new(default),
            },
            span,
        ))
    }

    fn parse_array_pattern(&mut self) -> ParseResult<Pattern> {
        self.consume(TokenKind::LBracket)?;
        let mut elements = Vec::new();
        let mut rest = None;

        while !self.check(TokenKind::RBracket) && !self.is_at_end() {
            if self.check(TokenKind::Comma) {
                self.advance();
                elements.push(None);
                continue;
            }

            if self.check(TokenKind::DotDotDot) {
                self.advance();
                rest = Some(Box::new(self.parse_binding_pattern()?));
                break;
            }

            elements.push(Some(self.parse_binding_element()?));

            if !self.check(TokenKind::RBracket) {
                self.consume(TokenKind::Comma)?;
            }
        }

        self.consume(TokenKind::RBracket)?;
        Ok(Pattern::Array { elements, rest })
    }

    fn parse_object_pattern(&mut self) -> ParseResult<Pattern> {
        self.consume(TokenKind::LBrace)?;
        let mut properties = Vec::new();
        let mut rest = None;

        while !self.check(TokenKind::RBrace) && !self.is_at_end() {
            if self.check(TokenKind::DotDotDot) {
                self.advance();
                rest = Some(Box::new(self.parse_binding_pattern()?));
                break;
            }

            let key = self.parse_property_name()?;

            let property = if self.check(TokenKind::Colon) {
                self.advance();
                ObjectPatternProperty {
                    key,
                    value: self.parse_binding_element()?,
                    shorthand: false,
                }
            } else {
                let PropertyName::Ident(ident) = &key else {
                    return Err(ParseError::expected(":", self.current_token().span));
                };
                let binding = Node::new(Pattern::Ident(ident.clone()), ident.span);
                ObjectPatternProperty {
                    value: self.parse_pattern_default(binding)?,
                    key,
                    shorthand: true,
                }
            };
            properties.push(property);

            if !self.check(TokenKind::RBrace) {
                self.consume(TokenKind::Comma)?;
            }
        }

        self.consume(TokenKind::RBrace)?;
        Ok(Pattern::Object { properties, rest })
    }

    // =========================================================================
    // Parameters
    // =========================================================================

    /// Parameters up to (not including) the closing `)`.
    pub(crate) fn parse_parameter_list(&mut self) -> ParseResult<Vec<Param>> {
        let mut params = Vec::new();

        while !self.check(TokenKind::RParen) && !self.is_at_end() {
            params.push(self.parse_parameter()?);
            if !self.check(TokenKind::RParen) {
                self.consume(TokenKind::Comma)?;
            }
        }

        Ok(params)
    }

    fn parse_parameter(&mut self) -> ParseResult<Param> {
        let decorators = self.parse_decorators()?;

        let mut accessibility = None;
        let mut is_readonly = false;
        let mut is_override = false;

        // Parameter property modifiers
        loop {
            let next_is_binding = matches!(
                self.peek_kind(1),
                Some(TokenKind::Identifier)
                    | Some(TokenKind::LBrace)
                    | Some(TokenKind::LBracket)
                    | Some(TokenKind::Await)
                    | Some(TokenKind::Yield)
            );
            if !next_is_binding || self.current_token().kind != TokenKind::Identifier {
                break;
            }
            match self.current_token().value.as_str() {
                "public" => accessibility = Some(AccessModifier::Public),
                "private" => accessibility = Some(AccessModifier::Private),
                "protected" => accessibility = Some(AccessModifier::Protected),
                "readonly" => is_readonly = true,
                "override" => is_override = true,
                _ => break,
            }
            self.advance();
        }

        let is_rest = if self.check(TokenKind::DotDotDot) {
            self.advance();
            true
        } else {
            false
        };

        let pattern = if self.check(TokenKind::This) {
            let token = self.advance();
            Node::new(Pattern::Ident(Node::new(Ident::new("this"), token.span)), token.span)
        } else {
            self.parse_binding_pattern()?
        };

        let optional = if self.check(TokenKind::Question) {
            self.advance();
            true
        } else {
            false
        };

        let type_annotation = self.parse_type_annotation()?;
        let pattern = self.parse_pattern_default(pattern)?;

        Ok(Param {
            pattern,
            type_annotation,
            optional,
            is_rest,
            accessibility,
            is_readonly,
            is_override,
            decorators,
        })
    }

    // =========================================================================
    // Expression to pattern conversion
    // =========================================================================

    /// Reinterprets an already-parsed expression as an assignment target,
    /// as in `for ([a, b] of pairs)`.
    pub(crate) fn expr_to_pattern(&self, expr: Node<Expr>) -> ParseResult<Node<Pattern>> {
        let span = expr.span;
        let pattern = match expr.value {
            Expr::Ident(ident) => Pattern::Ident(Node::new(ident, span)),
            Expr::Paren(inner) => return self.expr_to_pattern(*inner),
            Expr::Assignment {
                target,
                op: AssignmentOp::Assign,
                value,
            } => Pattern::Assignment {
                pattern: Box::new(self.expr_to_pattern(*target)?),
                default: value,
            },
            Expr::Array(elements) => {
                let mut patterns = Vec::new();
                let mut rest = None;
                for element in elements {
                    match element {
                        None => patterns.push(None),
                        Some(Node {
                            value: Expr::Spread(inner),
                            ..
                        }) => rest = Some(Box::new(self.expr_to_pattern(*inner)?)),
                        Some(element) => patterns.push(Some(self.expr_to_pattern(element)?)),
                    }
                }
                Pattern::Array {
                    elements: patterns,
                    rest,
                }
            }
            Expr::Object(object_properties) => {
                let mut properties = Vec::new();
                let mut rest = None;
                for property in object_properties {
                    match property {
                        ObjectProperty::Property { key, value, shorthand } => {
                            properties.push(ObjectPatternProperty {
                                key,
                                value: self.expr_to_pattern(value)?,
                                shorthand,
                            });
                        }
                        ObjectProperty::Spread(inner) => {
                            rest = Some(Box::new(self.expr_to_pattern(inner)?));
                        }
                        ObjectProperty::Method { .. } => {
                            return Err(ParseError::new(
                                "Invalid destructuring assignment target.",
                                span,
                                2364,
                            ))
                        }
                    }
                }
                Pattern::Object { properties, rest }
            }
            _ => {
                return Err(ParseError::new(
                    "The left-hand side of a 'for...of' statement must be a variable or a property access.",
                    span,
                    2487,
                ))
            }
        };
        Ok(Node::new(pattern, span))
    }
}

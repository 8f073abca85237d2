//! Statement parsing

use super::*;

impl Parser {
    pub(crate) fn parse_statement(&mut self) -> ParseResult<Node<Stmt>> {
        let start = self.current_token().span;

        if self.is_start_of_declaration() {
            let decl = self.parse_declaration()?;
            return Ok(Node::new(Stmt::Decl(decl.value), decl.span));
        }

        let stmt = match self.current_token().kind {
            TokenKind::LBrace => Stmt::Block(self.parse_block_statement()?.value),
            TokenKind::If => self.parse_if_statement()?,
            TokenKind::For => self.parse_for_statement()?,
            TokenKind::While => self.parse_while_statement()?,
            TokenKind::Do => self.parse_do_while_statement()?,
            TokenKind::Switch => self.parse_switch_statement()?,
            TokenKind::Return => self.parse_return_statement()?,
            TokenKind::Break | TokenKind::Continue => self.parse_jump_statement()?,
            TokenKind::Throw => self.parse_throw_statement()?,
            TokenKind::Try => self.parse_try_statement()?,
            TokenKind::Debugger => {
                self.advance();
                self.consume_semicolon()?;
                Stmt::Debugger
            }
            TokenKind::Semicolon => {
                self.advance();
                Stmt::Empty
            }
            _ => {
                // Check for labeled statement
                if self.is_binding_identifier() && self.peek_kind(1) == Some(TokenKind::Colon) {
                    let label = self.parse_binding_identifier()?;
                    self.consume(TokenKind::Colon)?;
                    let stmt = Box::new(self.parse_statement()?);
                    Stmt::Labeled { label, stmt }
                } else {
                    let expr = self.parse_expression()?;
                    self.consume_semicolon()?;
                    Stmt::Expr(expr)
                }
            }
        };

        let span = start.merge(&self.previous_token().span);
        Ok(Node::new(stmt, span))
    }

    pub(crate) fn parse_block_statement(&mut self) -> ParseResult<Node<BlockStmt>> {
        let start = self.current_token().span;
        self.consume(TokenKind::LBrace)?;

        let mut stmts = Vec::new();

        while !self.check(TokenKind::RBrace) && !self.is_at_end() {
            stmts.push(self.parse_statement()?);
        }

        self.consume(TokenKind::RBrace)?;
        let span = start.merge(&self.previous_token().span);

        Ok(Node::new(BlockStmt { stmts }, span))
    }

    /// `var`/`let`/`const`/`using`/`await using` declarators, without the
    /// trailing semicolon so `for` heads can share it.
    pub(crate) fn parse_var_declaration(&mut self, is_declare: bool) -> ParseResult<VarDecl> {
        let kind = match self.current_token().kind {
            TokenKind::Const => VarDeclKind::Const,
            TokenKind::Let => VarDeclKind::Let,
            TokenKind::Var => VarDeclKind::Var,
            TokenKind::Identifier if self.check_ident("using") => VarDeclKind::Using,
            TokenKind::Await if self.peek_is_ident(1, "using") => {
                self.advance();
                VarDeclKind::AwaitUsing
            }
            _ => return Err(self.error("Variable declaration expected.", 1134)),
        };
        self.advance();

        let mut declarations = Vec::new();

        loop {
            let pattern = self.parse_binding_pattern()?;

            let definite = if self.check(TokenKind::Bang) {
                self.advance();
                true
            } else {
                false
            };
            let type_annotation = self.parse_type_annotation()?;

            let init = if self.check(TokenKind::Eq) {
                self.advance();
                Some(self.parse_assignment_expression()?)
            } else {
                None
            };

            declarations.push(VarDeclarator {
                pattern,
                type_annotation,
                init,
                definite,
            });

            if !self.check(TokenKind::Comma) {
                break;
            }
            self.advance();
        }

        Ok(VarDecl {
            kind,
            declarations,
            is_declare,
        })
    }

    fn parse_if_statement(&mut self) -> ParseResult<Stmt> {
        self.consume(TokenKind::If)?;
        self.consume(TokenKind::LParen)?;
        let condition = self.parse_expression()?;
        self.consume(TokenKind::RParen)?;

        let then_stmt = Box::new(self.parse_statement()?);
        let else_stmt = if self.check(TokenKind::Else) {
            self.advance();
            Some(Box::new(self.parse_statement()?))
        } else {
            None
        };

        Ok(Stmt::If {
            condition,
            then_stmt,
            else_stmt,
        })
    }

    fn parse_for_statement(&mut self) -> ParseResult<Stmt> {
        self.consume(TokenKind::For)?;

        let is_await = if self.check(TokenKind::Await) {
            self.advance();
            true
        } else {
            false
        };

        self.consume(TokenKind::LParen)?;

        let is_var_decl = matches!(
            self.current_token().kind,
            TokenKind::Var | TokenKind::Const
        ) || (self.check(TokenKind::Let)
            && matches!(
                self.peek_kind(1),
                Some(TokenKind::Identifier) | Some(TokenKind::LBracket) | Some(TokenKind::LBrace)
            ))
            || (self.check_ident("using")
                && self.peek_kind(1) == Some(TokenKind::Identifier)
                && !self.peek_is_ident(1, "of"))
            || (self.check(TokenKind::Await) && self.peek_is_ident(1, "using"));

        let saved_no_in = std::mem::replace(&mut self.no_in, true);
        let head = if self.check(TokenKind::Semicolon) {
            Ok(None)
        } else if is_var_decl {
            self.parse_var_declaration(false).map(|decl| Some(ForInit::VarDecl(decl)))
        } else {
            self.parse_expression().map(|expr| Some(ForInit::Expr(expr)))
        };
        self.no_in = saved_no_in;
        let init = head?;

        // for (x of y) / for (x in y)
        let is_of = self.check_ident("of");
        if is_of || self.check(TokenKind::In) {
            let left = match init {
                Some(ForInit::VarDecl(decl)) => ForInLeft::VarDecl(decl),
                Some(ForInit::Expr(expr)) => ForInLeft::Pattern(self.expr_to_pattern(expr)?),
                None => return Err(self.error("Variable declaration expected.", 1123)),
            };
            self.advance();

            let right = if is_of {
                self.parse_assignment_expression()?
            } else {
                self.parse_expression()?
            };
            self.consume(TokenKind::RParen)?;
            let body = Box::new(self.parse_statement()?);

            return Ok(if is_of {
                Stmt::ForOf {
                    left,
                    right,
                    body,
                    is_await,
                }
            } else {
                Stmt::ForIn { left, right, body }
            });
        }

        self.consume(TokenKind::Semicolon)?;

        let condition = if !self.check(TokenKind::Semicolon) {
            Some(self.parse_expression()?)
        } else {
            None
        };
        self.consume(TokenKind::Semicolon)?;

        let update = if !self.check(TokenKind::RParen) {
            Some(self.parse_expression()?)
        } else {
            None
        };
        self.consume(TokenKind::RParen)?;

        let body = Box::new(self.parse_statement()?);

        Ok(Stmt::For {
            init,
            condition,
            update,
            body,
        })
    }

    fn parse_while_statement(&mut self) -> ParseResult<Stmt> {
        self.consume(TokenKind::While)?;
        self.consume(TokenKind::LParen)?;
        let condition = self.parse_expression()?;
        self.consume(TokenKind::RParen)?;
        let body = Box::new(self.parse_statement()?);

        Ok(Stmt::While { condition, body })
    }

    fn parse_do_while_statement(&mut self) -> ParseResult<Stmt> {
        self.consume(TokenKind::Do)?;
        let body = Box::new(self.parse_statement()?);
        self.consume(TokenKind::While)?;
        self.consume(TokenKind::LParen)?;
        let condition = self.parse_expression()?;
        self.consume(TokenKind::RParen)?;

        // The semicolon after do-while is always optional
        if self.check(TokenKind::Semicolon) {
            self.advance();
        }

        Ok(Stmt::DoWhile { body, condition })
    }

    fn parse_switch_statement(&mut self) -> ParseResult<Stmt> {
        self.consume(TokenKind::Switch)?;
        self.consume(TokenKind::LParen)?;
        let discriminant = self.parse_expression()?;
        self.consume(TokenKind::RParen)?;
        self.consume(TokenKind::LBrace)?;

        let mut cases = Vec::new();

        while !self.check(TokenKind::RBrace) && !self.is_at_end() {
            let test = if self.check(TokenKind::Case) {
                self.advance();
                Some(self.parse_expression()?)
            } else if self.check(TokenKind::Default) {
                self.advance();
                None
            } else {
                return Err(ParseError::expected("case", self.current_token().span));
            };
            self.consume(TokenKind::Colon)?;

            let mut consequent = Vec::new();
            while !matches!(
                self.current_token().kind,
                TokenKind::Case | TokenKind::Default | TokenKind::RBrace | TokenKind::Eof
            ) {
                consequent.push(self.parse_statement()?);
            }

            cases.push(SwitchCase { test, consequent });
        }

        self.consume(TokenKind::RBrace)?;

        Ok(Stmt::Switch {
            discriminant,
            cases,
        })
    }

    fn parse_return_statement(&mut self) -> ParseResult<Stmt> {
        self.consume(TokenKind::Return)?;

        let value = if self.check(TokenKind::Semicolon) || self.can_insert_semicolon() {
            None
        } else {
            Some(self.parse_expression()?)
        };

        self.consume_semicolon()?;
        Ok(Stmt::Return(value))
    }

    fn parse_jump_statement(&mut self) -> ParseResult<Stmt> {
        let is_break = self.check(TokenKind::Break);
        self.advance();

        let label = if self.check(TokenKind::Identifier) && !self.current_token().newline_before {
            Some(self.parse_binding_identifier()?)
        } else {
            None
        };

        self.consume_semicolon()?;
        Ok(if is_break {
            Stmt::Break(label)
        } else {
            Stmt::Continue(label)
        })
    }

    fn parse_throw_statement(&mut self) -> ParseResult<Stmt> {
        self.consume(TokenKind::Throw)?;
        if self.current_token().newline_before {
            return Err(self.error("Line break not permitted here.", 1142));
        }
        let expr = self.parse_expression()?;
        self.consume_semicolon()?;
        Ok(Stmt::Throw(expr))
    }

    fn parse_try_statement(&mut self) -> ParseResult<Stmt> {
        self.consume(TokenKind::Try)?;
        let block = self.parse_block_statement()?;

        let catch = if self.check(TokenKind::Catch) {
            self.advance();
            let param = if self.check(TokenKind::LParen) {
                self.advance();
                let pattern = self.parse_binding_pattern()?;
                // catch (e: unknown)
                self.parse_type_annotation()?;
                self.consume(TokenKind::RParen)?;
                Some(pattern)
            } else {
                None
            };
            let body = self.parse_block_statement()?;
            Some(CatchClause { param, body })
        } else {
            None
        };

        let finally = if self.check(TokenKind::Finally) {
            self.advance();
            Some(self.parse_block_statement()?)
        } else {
            None
        };

        if catch.is_none() && finally.is_none() {
            return Err(self.error("'catch' or 'finally' expected.", 1472));
        }

        Ok(Stmt::Try {
            block,
            catch,
            finally,
        })
    }
}

//! Core Parser struct and main parsing methods

use super::*;

/// Recursive descent parser for TypeScript
pub struct Parser {
    pub(crate) tokens: Vec<Token>,
    pub(crate) current: usize,
    /// Source text, used to keep type annotations verbatim
    pub(crate) source: Option<String>,
    lexer_errors: Vec<ParseError>,
    /// Tokens rewritten by `split_greater_than`, restored on backtrack
    pub(crate) splits: Vec<(usize, Token)>,
    /// `in` is not a binary operator inside a `for (...)` head
    pub(crate) no_in: bool,
    anonymous_defaults: usize,
}

impl Parser {
    /// Creates a new parser from a token stream
    pub fn new(tokens: Vec<Token>) -> Self {
        let mut lexer_errors = Vec::new();
        let tokens: Vec<Token> = tokens
            .into_iter()
            .filter(|token| {
                if token.kind == TokenKind::Error {
                    lexer_errors.push(ParseError::from_lexer(&token.value, token.span));
                    false
                } else {
                    true
                }
            })
            .collect();
        let tokens = if tokens.is_empty() {
            vec![Token::new(TokenKind::Eof, Span::default(), String::new())]
        } else {
            tokens
        };

        Self {
            tokens,
            current: 0,
            source: None,
            lexer_errors,
            splits: Vec::new(),
            no_in: false,
            anonymous_defaults: 0,
        }
    }

    /// Creates a parser that can reproduce type annotations from `source`.
    pub fn with_source(tokens: Vec<Token>, source: impl Into<String>) -> Self {
        let mut parser = Self::new(tokens);
        parser.source = Some(source.into());
        parser
    }

    /// Parses a complete program
    pub fn parse_program(&mut self) -> Result<Program, Vec<ParseError>> {
        let start_span = self.current_token().span;
        let mut items = Vec::new();
        let mut errors = std::mem::take(&mut self.lexer_errors);

        while !self.is_at_end() {
            match self.parse_module_item() {
                Ok(item) => items.push(item),
                Err(err) => {
                    errors.push(err);
                    self.synchronize();
                }
            }
        }

        if errors.is_empty() {
            let end_span = items.last().map_or(start_span, |item: &Node<ModuleItem>| item.span);
            Ok(Program {
                items,
                span: start_span.merge(&end_span),
            })
        } else {
            Err(errors)
        }
    }

    // =========================================================================
    // Module Items
    // =========================================================================

    pub(crate) fn parse_module_item(&mut self) -> ParseResult<Node<ModuleItem>> {
        let start = self.current_token().span;

        let item = match self.current_token().kind {
            TokenKind::Import
                if !matches!(self.peek_kind(1), Some(TokenKind::LParen) | Some(TokenKind::Dot)) =>
            {
                self.parse_import_item()?
            }
            TokenKind::Export => self.parse_export_item()?,
            _ => ModuleItem::Stmt(self.parse_statement()?.value),
        };

        let span = start.merge(&self.previous_token().span);
        Ok(Node::new(item, span))
    }

    // =========================================================================
    // Import/Export
    // =========================================================================

    fn parse_import_item(&mut self) -> ParseResult<ModuleItem> {
        self.consume(TokenKind::Import)?;

        // Check for type-only import
        let type_only = if self.check_ident("type") && self.is_type_modifier_in_import() {
            self.advance();
            true
        } else {
            false
        };

        // import "module"
        if self.check(TokenKind::StringLiteral) {
            let source = self.advance().value.clone();
            self.skip_import_attributes();
            self.consume_semicolon()?;
            return Ok(ModuleItem::Import(ImportDecl {
                specifiers: Vec::new(),
                source,
                type_only,
                bare: true,
            }));
        }

        // import name = require("module") / import name = A.B
        if self.is_binding_identifier() && self.peek_kind(1) == Some(TokenKind::Eq) {
            let name = self.parse_binding_identifier()?;
            self.consume(TokenKind::Eq)?;
            let reference = self.parse_module_reference()?;
            self.consume_semicolon()?;
            return Ok(ModuleItem::ImportEquals(ImportEqualsDecl {
                name,
                reference,
                is_export: false,
                type_only,
            }));
        }

        let mut specifiers = Vec::new();

        // import defaultName from "module"
        let has_default = if self.check_ident("from") {
            self.peek_is_ident(1, "from")
        } else {
            self.is_binding_identifier()
        };
        if has_default {
            let name = self.parse_binding_identifier()?;
            specifiers.push(ImportSpecifier::Default(name));

            if self.check(TokenKind::Comma) {
                self.advance();
            }
        }

        // import * as name from "module"
        if self.check(TokenKind::Star) {
            self.advance();
            self.expect_contextual("as")?;
            let name = self.parse_binding_identifier()?;
            specifiers.push(ImportSpecifier::Namespace(name));
        }
        // import { a, b as c } from "module"
        else if self.check(TokenKind::LBrace) {
            self.advance();

            while !self.check(TokenKind::RBrace) && !self.is_at_end() {
                let spec_type_only = self.parse_specifier_type_modifier();

                let imported = self.parse_module_export_name()?;
                let local = if self.check_ident("as") {
                    self.advance();
                    Some(self.parse_binding_identifier()?)
                } else {
                    None
                };

                specifiers.push(ImportSpecifier::Named {
                    imported,
                    local,
                    type_only: spec_type_only,
                });

                if !self.check(TokenKind::RBrace) {
                    self.consume(TokenKind::Comma)?;
                }
            }

            self.consume(TokenKind::RBrace)?;
        }

        self.expect_contextual("from")?;
        let source = self.consume(TokenKind::StringLiteral)?.value.clone();
        self.skip_import_attributes();
        self.consume_semicolon()?;

        Ok(ModuleItem::Import(ImportDecl {
            specifiers,
            source,
            type_only,
            bare: false,
        }))
    }

    /// `type` right after `import` is a modifier unless it is itself the
    /// default import (`import type from "m"`, `import type, { a } from "m"`).
    fn is_type_modifier_in_import(&self) -> bool {
        match self.peek(1) {
            Some(token) if matches!(token.kind, TokenKind::LBrace | TokenKind::Star) => true,
            Some(token) if token.kind == TokenKind::Identifier => {
                token.value != "from" || self.peek_is_ident(2, "from")
            }
            _ => false,
        }
    }

    /// `{ type A }` marks a single specifier as type-only.
    fn parse_specifier_type_modifier(&mut self) -> bool {
        if !self.check_ident("type") {
            return false;
        }
        let is_modifier = match self.peek(1) {
            Some(next) if next.is_ident("as") => self.peek_is_ident(2, "as"),
            Some(next) => {
                next.kind == TokenKind::Identifier
                    || next.kind == TokenKind::StringLiteral
                    || next.kind.is_keyword()
            }
            None => false,
        };
        if is_modifier {
            self.advance();
        }
        is_modifier
    }

    fn parse_module_reference(&mut self) -> ParseResult<ModuleReference> {
        if self.check_ident("require") && self.peek_kind(1) == Some(TokenKind::LParen) {
            self.advance();
            self.consume(TokenKind::LParen)?;
            let source = self.consume(TokenKind::StringLiteral)?.value.clone();
            self.consume(TokenKind::RParen)?;
            return Ok(ModuleReference::External(source));
        }
        Ok(ModuleReference::Entity(self.parse_entity_name()?))
    }

    /// `A.B.C` as a member expression chain.
    pub(crate) fn parse_entity_name(&mut self) -> ParseResult<Node<Expr>> {
        let first = self.parse_binding_identifier()?;
        let mut expr = Node::new(Expr::Ident(first.value), first.span);
        while self.check(TokenKind::Dot) {
            self.advance();
            let property = self.parse_identifier_name()?;
            let span = expr.span.merge(&property.span);
            expr = Node::new(
                Expr::Member {
                    object: Box::new(expr),
                    property,
                },
                span,
            );
        }
        Ok(expr)
    }

    fn skip_import_attributes(&mut self) {
        let is_attributes = (self.check(TokenKind::With) || self.check_ident("assert"))
            && !self.current_token().newline_before
            && self.peek_kind(1) == Some(TokenKind::LBrace);
        if is_attributes {
            self.advance();
            // Balanced braces cannot fail to close before Eof
            let _ = self.skip_balanced();
        }
    }

    fn parse_export_item(&mut self) -> ParseResult<ModuleItem> {
        self.consume(TokenKind::Export)?;

        // export = expr
        if self.check(TokenKind::Eq) {
            self.advance();
            let expr = self.parse_assignment_expression()?;
            self.consume_semicolon()?;
            return Ok(ModuleItem::Export(ExportDecl::Assignment(expr)));
        }

        // export as namespace Name
        if self.check_ident("as") && self.peek_is_ident(1, "namespace") {
            self.advance();
            self.advance();
            let name = self.parse_binding_identifier()?;
            self.consume_semicolon()?;
            return Ok(ModuleItem::Export(ExportDecl::AsNamespace(name)));
        }

        // export import A = B.C
        if self.check(TokenKind::Import) {
            self.advance();
            let type_only = if self.check_ident("type") && self.peek_kind(2) == Some(TokenKind::Eq) {
                self.advance();
                true
            } else {
                false
            };
            let name = self.parse_binding_identifier()?;
            self.consume(TokenKind::Eq)?;
            let reference = self.parse_module_reference()?;
            self.consume_semicolon()?;
            return Ok(ModuleItem::ImportEquals(ImportEqualsDecl {
                name,
                reference,
                is_export: true,
                type_only,
            }));
        }

        // export type { ... } / export type * from "m"
        let type_only = if self.check_ident("type")
            && matches!(self.peek_kind(1), Some(TokenKind::LBrace) | Some(TokenKind::Star))
        {
            self.advance();
            true
        } else {
            false
        };

        // export default
        if self.check(TokenKind::Default) {
            self.advance();
            return self.parse_export_default().map(ModuleItem::Export);
        }

        // export * from "module"
        if self.check(TokenKind::Star) {
            self.advance();

            let as_name = if self.check_ident("as") {
                self.advance();
                Some(self.parse_module_export_name()?)
            } else {
                None
            };

            self.expect_contextual("from")?;
            let source = self.consume(TokenKind::StringLiteral)?.value.clone();
            self.skip_import_attributes();
            self.consume_semicolon()?;

            return Ok(ModuleItem::Export(ExportDecl::All {
                source,
                as_name,
                type_only,
            }));
        }

        // export { ... }
        if self.check(TokenKind::LBrace) {
            self.advance();
            let mut specifiers = Vec::new();

            while !self.check(TokenKind::RBrace) && !self.is_at_end() {
                let spec_type_only = self.parse_specifier_type_modifier();

                let local = self.parse_module_export_name()?;
                let exported = if self.check_ident("as") {
                    self.advance();
                    Some(self.parse_module_export_name()?)
                } else {
                    None
                };

                specifiers.push(ExportSpecifier {
                    local,
                    exported,
                    type_only: spec_type_only,
                });

                if !self.check(TokenKind::RBrace) {
                    self.consume(TokenKind::Comma)?;
                }
            }

            self.consume(TokenKind::RBrace)?;

            let source = if self.check_ident("from") {
                self.advance();
                let source = self.consume(TokenKind::StringLiteral)?.value.clone();
                self.skip_import_attributes();
                Some(source)
            } else {
                None
            };

            self.consume_semicolon()?;

            return Ok(ModuleItem::Export(ExportDecl::Named {
                specifiers,
                source,
                type_only,
            }));
        }

        // export declaration
        if !self.is_start_of_declaration() {
            return Err(ParseError::new(
                "Declaration expected.",
                self.current_token().span,
                1146,
            ));
        }
        let decl = self.parse_declaration()?;
        Ok(ModuleItem::Export(ExportDecl::Decl(Box::new(decl))))
    }

    fn parse_export_default(&mut self) -> ParseResult<ExportDecl> {
        let start = self.current_token().span;

        let is_function = self.check(TokenKind::Function)
            || (self.check_ident("async")
                && self.peek_kind(1) == Some(TokenKind::Function)
                && !self.peek(1).map_or(false, |t| t.newline_before));
        let is_class = self.check(TokenKind::Class)
            || self.check(TokenKind::At)
            || (self.check_ident("abstract") && self.peek_kind(1) == Some(TokenKind::Class));

        if is_function || is_class {
            let (decl, anonymous) = if is_function {
                let (decl, anonymous) = self.parse_function_declaration(false, true)?;
                (Decl::Function(decl), anonymous)
            } else {
                let decorators = self.parse_decorators()?;
                let (mut decl, anonymous) = self.parse_class_declaration(false, true)?;
                decl.class.decorators = decorators;
                (Decl::Class(decl), anonymous)
            };
            let span = start.merge(&self.previous_token().span);
            return Ok(ExportDecl::DefaultDecl {
                decl: Box::new(Node::new(decl, span)),
                anonymous,
            });
        }

        if self.check(TokenKind::Interface) {
            let decl = self.parse_interface_declaration(false)?;
            let span = start.merge(&self.previous_token().span);
            return Ok(ExportDecl::DefaultDecl {
                decl: Box::new(Node::new(Decl::Interface(decl), span)),
                anonymous: false,
            });
        }

        let expr = self.parse_assignment_expression()?;
        self.consume_semicolon()?;
        Ok(ExportDecl::Default(expr))
    }

    /// Name for an anonymous `export default function/class`.
    pub(crate) fn next_default_name(&mut self) -> String {
        self.anonymous_defaults += 1;
        format!("default_{}", self.anonymous_defaults)
    }
}

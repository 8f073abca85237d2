//! Declaration parsing

use super::*;

impl Parser {
    /// Whether the current token begins a declaration rather than an
    /// expression statement. Contextual keywords (`type`, `namespace`,
    /// `declare`, ...) only count when followed by what a declaration needs.
    pub(crate) fn is_start_of_declaration(&self) -> bool {
        let same_line_ident = |offset: usize| {
            self.peek_kind(offset) == Some(TokenKind::Identifier) && self.peek_same_line(offset)
        };

        match self.current_token().kind {
            TokenKind::Var | TokenKind::Const => true,
            TokenKind::Function | TokenKind::Class | TokenKind::Enum | TokenKind::At => true,
            TokenKind::Let => matches!(
                self.peek_kind(1),
                Some(TokenKind::Identifier)
                    | Some(TokenKind::LBracket)
                    | Some(TokenKind::LBrace)
                    | Some(TokenKind::Await)
                    | Some(TokenKind::Yield)
            ),
            TokenKind::Interface => same_line_ident(1),
            TokenKind::Await => self.peek_is_ident(1, "using") && same_line_ident(2),
            TokenKind::Identifier => {
                let token = self.current_token();
                match token.value.as_str() {
                    "async" => self.peek_kind(1) == Some(TokenKind::Function) && self.peek_same_line(1),
                    "abstract" => self.peek_kind(1) == Some(TokenKind::Class) && self.peek_same_line(1),
                    "type" => {
                        same_line_ident(1)
                            && matches!(self.peek_kind(2), Some(TokenKind::Eq) | Some(TokenKind::Lt))
                    }
                    "namespace" => same_line_ident(1),
                    "module" => {
                        self.peek_same_line(1)
                            && matches!(
                                self.peek_kind(1),
                                Some(TokenKind::Identifier) | Some(TokenKind::StringLiteral)
                            )
                    }
                    "global" => self.peek_kind(1) == Some(TokenKind::LBrace),
                    "using" => same_line_ident(1) && !self.peek_is_ident(1, "in"),
                    "declare" => {
                        self.peek_same_line(1)
                            && (matches!(
                                self.peek_kind(1),
                                Some(TokenKind::Var)
                                    | Some(TokenKind::Let)
                                    | Some(TokenKind::Const)
                                    | Some(TokenKind::Function)
                                    | Some(TokenKind::Class)
                                    | Some(TokenKind::Enum)
                                    | Some(TokenKind::Interface)
                            ) || ["abstract", "namespace", "module", "global", "type", "async"]
                                .iter()
                                .any(|keyword| self.peek_is_ident(1, keyword)))
                    }
                    _ => false,
                }
            }
            _ => false,
        }
    }

    pub(crate) fn parse_declaration(&mut self) -> ParseResult<Node<Decl>> {
        let start = self.current_token().span;

        let decorators = self.parse_decorators()?;

        // Handle 'declare' modifier
        let is_declare = if self.check_ident("declare") && self.peek_same_line(1) {
            self.advance();
            true
        } else {
            false
        };

        let decl = match self.current_token().kind {
            TokenKind::Function => Decl::Function(self.parse_function_declaration(is_declare, false)?.0),
            TokenKind::Class => {
                let (mut class_decl, _) = self.parse_class_declaration(is_declare, false)?;
                class_decl.class.decorators = decorators;
                Decl::Class(class_decl)
            }
            TokenKind::Interface => Decl::Interface(self.parse_interface_declaration(is_declare)?),
            TokenKind::Enum => Decl::Enum(self.parse_enum_declaration(is_declare, false)?),
            TokenKind::Const if self.peek_kind(1) == Some(TokenKind::Enum) => {
                self.advance();
                Decl::Enum(self.parse_enum_declaration(is_declare, true)?)
            }
            TokenKind::Const | TokenKind::Let | TokenKind::Var | TokenKind::Await => {
                let var_decl = self.parse_var_declaration(is_declare)?;
                self.consume_semicolon()?;
                Decl::Var(var_decl)
            }
            TokenKind::Identifier => match self.current_token().value.as_str() {
                "async" => Decl::Function(self.parse_function_declaration(is_declare, false)?.0),
                "abstract" => {
                    let (mut class_decl, _) = self.parse_class_declaration(is_declare, false)?;
                    class_decl.class.decorators = decorators;
                    Decl::Class(class_decl)
                }
                "type" => Decl::TypeAlias(self.parse_type_alias_declaration(is_declare)?),
                "namespace" | "module" | "global" => Decl::Module(self.parse_module_declaration(is_declare)?),
                "using" => {
                    let var_decl = self.parse_var_declaration(is_declare)?;
                    self.consume_semicolon()?;
                    Decl::Var(var_decl)
                }
                _ => return Err(self.error("Declaration expected.", 1146)),
            },
            _ => return Err(self.error("Declaration expected.", 1146)),
        };

        let span = start.merge(&self.previous_token().span);
        Ok(Node::new(decl, span))
    }

    /// Returns the declaration and whether its name was synthesized for an
    /// anonymous `export default function`.
    pub(crate) fn parse_function_declaration(
        &mut self,
        is_declare: bool,
        name_optional: bool,
    ) -> ParseResult<(FunctionDecl, bool)> {
        let is_async = if self.check_ident("async") {
            self.advance();
            true
        } else {
            false
        };

        self.consume(TokenKind::Function)?;

        let is_generator = if self.check(TokenKind::Star) {
            self.advance();
            true
        } else {
            false
        };

        let (name, anonymous) = self.parse_declaration_name(name_optional)?;
        let function = self.parse_function_rest(is_async, is_generator, true)?;

        Ok((
            FunctionDecl {
                name,
                function,
                is_declare,
            },
            anonymous,
        ))
    }

    fn parse_declaration_name(&mut self, name_optional: bool) -> ParseResult<(Node<Ident>, bool)> {
        let is_name = self.is_binding_identifier();
        if is_name {
            return Ok((self.parse_binding_identifier()?, false));
        }
        if name_optional {
            let span = self.current_token().span;
            let name = self.next_default_name();
            return Ok((Node::new(Ident::new(name), Span::new(span.start, span.start, span.file_id)), true));
        }
        Err(self.error("Identifier expected.", 1003))
    }

    /// Type parameters, parameter list, return type and body. Overload
    /// signatures and abstract members may omit the body.
    pub(crate) fn parse_function_rest(
        &mut self,
        is_async: bool,
        is_generator: bool,
        allow_missing_body: bool,
    ) -> ParseResult<Function> {
        let type_params = self.parse_type_parameters()?;

        self.consume(TokenKind::LParen)?;
        let params = self.parse_parameter_list()?;
        self.consume(TokenKind::RParen)?;

        let return_type = self.parse_type_annotation()?;

        let body = if self.check(TokenKind::LBrace) {
            Some(self.parse_block_statement()?)
        } else if allow_missing_body {
            self.consume_semicolon()?;
            None
        } else {
            return Err(ParseError::expected("{", self.current_token().span));
        };

        Ok(Function {
            type_params,
            params,
            return_type,
            body,
            is_async,
            is_generator,
        })
    }

    pub(crate) fn parse_class_declaration(
        &mut self,
        is_declare: bool,
        name_optional: bool,
    ) -> ParseResult<(ClassDecl, bool)> {
        let is_abstract = if self.check_ident("abstract") {
            self.advance();
            true
        } else {
            false
        };

        self.consume(TokenKind::Class)?;
        let (name, anonymous) = self.parse_declaration_name(name_optional)?;
        let class = self.parse_class_tail(is_abstract)?;

        Ok((
            ClassDecl {
                name,
                class,
                is_declare,
            },
            anonymous,
        ))
    }

    /// Everything after the class name: heritage clauses and the body.
    pub(crate) fn parse_class_tail(&mut self, is_abstract: bool) -> ParseResult<Class> {
        let type_params = self.parse_type_parameters()?;

        let extends = if self.check(TokenKind::Extends) {
            self.advance();
            let base = Box::new(self.parse_left_hand_side_expression()?);
            let type_args = if self.check(TokenKind::Lt) {
                Some(self.parse_type_arguments()?)
            } else {
                None
            };
            Some(ClassExtends { base, type_args })
        } else {
            None
        };

        let mut implements = Vec::new();
        if self.check(TokenKind::Implements) {
            self.advance();
            loop {
                implements.push(self.parse_type()?);
                if !self.check(TokenKind::Comma) {
                    break;
                }
                self.advance();
            }
        }

        self.consume(TokenKind::LBrace)?;

        let mut members = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.is_at_end() {
            if self.check(TokenKind::Semicolon) {
                self.advance();
                continue;
            }
            members.push(self.parse_class_member()?);
        }

        self.consume(TokenKind::RBrace)?;

        Ok(Class {
            type_params,
            extends,
            implements,
            members,
            is_abstract,
            decorators: Vec::new(),
        })
    }

    /// A modifier keyword is only a modifier when a member name follows it.
    fn is_class_modifier(&self) -> bool {
        const MODIFIERS: [&str; 9] = [
            "public",
            "private",
            "protected",
            "static",
            "readonly",
            "abstract",
            "override",
            "declare",
            "accessor",
        ];
        let token = self.current_token();
        if token.kind != TokenKind::Identifier {
            return false;
        }
        let is_keyword = MODIFIERS.contains(&token.value.as_str())
            || (token.value == "async" && self.peek_same_line(1));
        is_keyword
            && (self.is_property_name_start(1)
                || matches!(self.peek_kind(1), Some(TokenKind::Star) | Some(TokenKind::LBrace)))
    }

    pub(crate) fn parse_class_member(&mut self) -> ParseResult<ClassMember> {
        let decorators = self.parse_decorators()?;

        let mut access = None;
        let mut is_static = false;
        let mut is_readonly = false;
        let mut is_abstract = false;
        let mut is_override = false;
        let mut is_declare = false;
        let mut is_async = false;

        while self.is_class_modifier() {
            // static { ... }
            if self.check_ident("static") && self.peek_kind(1) == Some(TokenKind::LBrace) {
                self.advance();
                return Ok(ClassMember::StaticBlock(self.parse_block_statement()?));
            }
            if self.peek_kind(1) == Some(TokenKind::LBrace) {
                break;
            }

            match self.current_token().value.as_str() {
                "public" => access = Some(AccessModifier::Public),
                "private" => access = Some(AccessModifier::Private),
                "protected" => access = Some(AccessModifier::Protected),
                "static" => is_static = true,
                "readonly" => is_readonly = true,
                "abstract" => is_abstract = true,
                "override" => is_override = true,
                "declare" => is_declare = true,
                "async" => is_async = true,
                _ => {}
            }
            self.advance();
        }

        // Index signature: [key: string]: T;
        let is_index_signature = self.check(TokenKind::LBracket)
            && self.peek_kind(1) == Some(TokenKind::Identifier)
            && self.peek_kind(2) == Some(TokenKind::Colon);
        if is_index_signature {
            let start_index = self.current;
            self.skip_balanced()?;
            self.parse_type_annotation()?;
            let text = self.text_from(start_index);
            self.consume_semicolon()?;
            return Ok(ClassMember::IndexSignature { text, is_static });
        }

        // Constructor
        let is_constructor = (self.check_ident("constructor")
            || (self.check(TokenKind::StringLiteral) && self.current_token().value == "constructor"))
            && self.peek_kind(1) == Some(TokenKind::LParen)
            && !is_static;
        if is_constructor {
            self.advance();
            self.consume(TokenKind::LParen)?;
            let params = self.parse_parameter_list()?;
            self.consume(TokenKind::RParen)?;
            let body = if self.check(TokenKind::LBrace) {
                Some(self.parse_block_statement()?)
            } else {
                self.consume_semicolon()?;
                None
            };
            return Ok(ClassMember::Constructor { params, body, access });
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

        let name = self.parse_property_name()?;

        let is_optional = if self.check(TokenKind::Question) {
            self.advance();
            true
        } else {
            false
        };

        let is_method = kind != MethodKind::Method
            || is_generator
            || self.check(TokenKind::LParen)
            || self.check(TokenKind::Lt);
        if is_method {
            let function = self.parse_function_rest(is_async, is_generator, true)?;
            return Ok(ClassMember::Method {
                name,
                kind,
                function,
                access,
                is_static,
                is_abstract,
                is_optional,
                is_override,
                decorators,
            });
        }

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

        self.consume_semicolon()?;

        Ok(ClassMember::Property {
            name,
            type_annotation,
            init,
            access,
            is_static,
            is_readonly,
            is_abstract,
            is_optional,
            is_override,
            is_declare,
            definite,
            decorators,
        })
    }

    pub(crate) fn parse_decorators(&mut self) -> ParseResult<Vec<Node<Expr>>> {
        let mut decorators = Vec::new();

        while self.check(TokenKind::At) {
            self.advance();
            decorators.push(self.parse_left_hand_side_expression()?);
        }

        Ok(decorators)
    }

    /// Interfaces are kept as their declaration text.
    pub(crate) fn parse_interface_declaration(&mut self, is_declare: bool) -> ParseResult<InterfaceDecl> {
        let start_index = self.current;
        self.consume(TokenKind::Interface)?;
        let name = self.parse_binding_identifier()?;
        self.parse_type_parameters()?;

        if self.check(TokenKind::Extends) {
            self.advance();
            loop {
                self.parse_type()?;
                if !self.check(TokenKind::Comma) {
                    break;
                }
                self.advance();
            }
        }

        if !self.check(TokenKind::LBrace) {
            return Err(ParseError::expected("{", self.current_token().span));
        }
        self.skip_balanced()?;

        Ok(InterfaceDecl {
            name,
            text: self.text_from(start_index),
            is_declare,
        })
    }

    pub(crate) fn parse_type_alias_declaration(&mut self, is_declare: bool) -> ParseResult<TypeAliasDecl> {
        self.expect_contextual("type")?;
        let name = self.parse_binding_identifier()?;
        let type_params = self.parse_type_parameters()?;
        self.consume(TokenKind::Eq)?;
        let ty = self.parse_type()?;
        self.consume_semicolon()?;

        Ok(TypeAliasDecl {
            name,
            type_params,
            ty,
            is_declare,
        })
    }

    pub(crate) fn parse_enum_declaration(&mut self, is_declare: bool, is_const: bool) -> ParseResult<EnumDecl> {
        self.consume(TokenKind::Enum)?;
        let name = self.parse_binding_identifier()?;
        self.consume(TokenKind::LBrace)?;

        let mut members = Vec::new();

        while !self.check(TokenKind::RBrace) && !self.is_at_end() {
            let member_name = if self.check(TokenKind::StringLiteral) {
                let token = self.advance();
                Node::new(Ident::new(token.value.clone()), token.span)
            } else if self.check(TokenKind::NumberLiteral) {
                return Err(self.error("An enum member cannot have a numeric name.", 2452));
            } else {
                self.parse_identifier_name()?
            };

            let init = if self.check(TokenKind::Eq) {
                self.advance();
                Some(self.parse_assignment_expression()?)
            } else {
                None
            };

            members.push(EnumMember {
                name: member_name,
                init,
            });

            if !self.check(TokenKind::RBrace) {
                self.consume(TokenKind::Comma)?;
            }
        }

        self.consume(TokenKind::RBrace)?;

        Ok(EnumDecl {
            name,
            members,
            is_const,
            is_declare,
        })
    }

    /// `namespace A.B { }`, `module "m" { }` and `global { }`.
    pub(crate) fn parse_module_declaration(&mut self, is_declare: bool) -> ParseResult<ModuleDecl> {
        if self.check_ident("global") {
            let token = self.advance();
            let name = Node::new(Ident::new("global"), token.span);
            let body = Some(ModuleBody::Block(self.parse_module_block()?));
            return Ok(ModuleDecl {
                name: ModuleName::Ident(name),
                body,
                is_declare,
                is_global: true,
            });
        }

        // namespace / module keyword
        self.advance();

        if self.check(TokenKind::StringLiteral) {
            let name = self.advance().value.clone();
            let body = if self.check(TokenKind::LBrace) {
                Some(ModuleBody::Block(self.parse_module_block()?))
            } else {
                self.consume_semicolon()?;
                None
            };
            return Ok(ModuleDecl {
                name: ModuleName::String(name),
                body,
                is_declare,
                is_global: false,
            });
        }

        self.parse_namespace_rest(is_declare)
    }

    fn parse_namespace_rest(&mut self, is_declare: bool) -> ParseResult<ModuleDecl> {
        let name = self.parse_binding_identifier()?;

        let body = if self.check(TokenKind::Dot) {
            self.advance();
            let start = self.current_token().span;
            let inner = self.parse_namespace_rest(is_declare)?;
            let span = start.merge(&self.previous_token().span);
            ModuleBody::Namespace(Box::new(Node::new(inner, span)))
        } else {
            ModuleBody::Block(self.parse_module_block()?)
        };

        Ok(ModuleDecl {
            name: ModuleName::Ident(name),
            body: Some(body),
            is_declare,
            is_global: false,
        })
    }

    fn parse_module_block(&mut self) -> ParseResult<Vec<Node<ModuleItem>>> {
        self.consume(TokenKind::LBrace)?;

        let mut items = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.is_at_end() {
            items.push(self.parse_module_item()?);
        }

        self.consume(TokenKind::RBrace)?;
        Ok(items)
    }
}

use tsdual_ast::Span;
use crate::token::{Token, TokenKind};

/// The lexer/tokenizer for TypeScript.
pub struct Lexer<'a> {
    source: &'a str,
    chars: std::str::CharIndices<'a>,
    current_pos: usize,
    current_char: Option<char>,
    file_id: usize,
    /// Open `{` and `${`; `true` marks a template substitution.
    brace_stack: Vec<bool>,
    last_kind: Option<TokenKind>,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer from source code.
    pub fn new(source: &'a str) -> Self {
        Self::with_file_id(source, 0)
    }

    /// Creates a new lexer with a specific file ID.
    pub fn with_file_id(source: &'a str, file_id: usize) -> Self {
        let mut chars = source.char_indices();
        let current_char = chars.next().map(|(_, c)| c);
        let mut lexer = Self {
            source,
            chars,
            current_pos: 0,
            current_char,
            file_id,
            brace_stack: Vec::new(),
            last_kind: None,
        };
        if source.starts_with("#!") {
            while !matches!(lexer.current_char, None | Some('\n')) {
                lexer.advance();
            }
        }
        lexer
    }

    /// Tokenizes the entire source code and returns all tokens.
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        tokens
    }

    /// Gets the next token from the source.
    pub fn next_token(&mut self) -> Token {
        let newline_before = match self.skip_whitespace_and_comments() {
            Ok(newline) => newline,
            Err(error_token) => return error_token,
        };

        let mut token = self.scan_token();
        token.newline_before = newline_before;
        self.last_kind = Some(token.kind);
        token
    }

    fn scan_token(&mut self) -> Token {
        let start = self.current_pos;

        let Some(ch) = self.current_char else {
            return self.token(TokenKind::Eof, start, "");
        };

        match ch {
            // String literals
            '"' | '\'' => self.read_string_literal(ch),
            '`' => {
                self.advance();
                self.read_template(start, true)
            }

            // Numbers
            '0'..='9' => self.read_number(),

            // Identifiers
            'a'..='z' | 'A'..='Z' | '_' | '$' => self.read_identifier(),
            '#' => {
                self.advance();
                let name = self.read_identifier_text();
                if name.is_empty() {
                    self.token(TokenKind::Error, start, "Invalid character: #")
                } else {
                    self.token(TokenKind::PrivateName, start, format!("#{}", name))
                }
            }

            // Operators
            '+' => self.read_plus(),
            '-' => self.read_minus(),
            '*' => self.read_star(),
            '/' => {
                if self.last_kind.map_or(true, TokenKind::allows_regex_after) {
                    self.read_regex()
                } else {
                    self.read_slash()
                }
            }
            '%' => self.read_compound(TokenKind::Percent, TokenKind::PercentEq),
            '^' => self.read_compound(TokenKind::Caret, TokenKind::CaretEq),
            '=' => self.read_eq(),
            '!' => self.read_bang(),
            '<' => self.read_lt(),
            '>' => self.read_gt(),
            '&' => self.read_amp(),
            '|' => self.read_pipe(),
            '~' => self.single(TokenKind::Tilde),
            '?' => self.read_question(),
            '.' => self.read_dot(),

            // Delimiters
            '(' => self.single(TokenKind::LParen),
            ')' => self.single(TokenKind::RParen),
            '{' => {
                self.brace_stack.push(false);
                self.single(TokenKind::LBrace)
            }
            '}' => {
                if self.brace_stack.pop() == Some(true) {
                    self.advance();
                    self.read_template(start, false)
                } else {
                    self.single(TokenKind::RBrace)
                }
            }
            '[' => self.single(TokenKind::LBracket),
            ']' => self.single(TokenKind::RBracket),
            ';' => self.single(TokenKind::Semicolon),
            ',' => self.single(TokenKind::Comma),
            ':' => self.single(TokenKind::Colon),
            '@' => self.single(TokenKind::At),

            // Unicode identifiers
            _ if ch.is_alphabetic() => self.read_identifier(),

            // Error
            _ => {
                self.advance();
                self.token(TokenKind::Error, start, format!("Invalid character: {}", ch))
            }
        }
    }

    // Helper methods

    fn advance(&mut self) {
        if let Some((pos, ch)) = self.chars.next() {
            self.current_pos = pos;
            self.current_char = Some(ch);
        } else {
            self.current_pos = self.source.len();
            self.current_char = None;
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.clone().next().map(|(_, c)| c)
    }

    fn token(&self, kind: TokenKind, start: usize, value: impl Into<String>) -> Token {
        Token::new(kind, Span::new(start, self.current_pos, self.file_id), value.into())
    }

    fn single(&mut self, kind: TokenKind) -> Token {
        let start = self.current_pos;
        self.advance();
        let text = &self.source[start..self.current_pos];
        self.token(kind, start, text)
    }

    /// Consumes `=` after an operator character when present.
    fn read_compound(&mut self, plain: TokenKind, with_eq: TokenKind) -> Token {
        let start = self.current_pos;
        self.advance();
        let kind = if self.current_char == Some('=') {
            self.advance();
            with_eq
        } else {
            plain
        };
        let text = &self.source[start..self.current_pos];
        self.token(kind, start, text)
    }

    /// Skips trivia. Returns whether a line terminator was crossed, or an
    /// error token for an unterminated block comment.
    fn skip_whitespace_and_comments(&mut self) -> Result<bool, Token> {
        let mut newline = false;
        loop {
            match self.current_char {
                Some('\n') | Some('\u{2028}') | Some('\u{2029}') => {
                    newline = true;
                    self.advance();
                }
                Some(ch) if ch.is_whitespace() || ch == '\u{feff}' => {
                    self.advance();
                }
                Some('/') => {
                    if self.peek() == Some('/') {
                        self.skip_single_line_comment();
                    } else if self.peek() == Some('*') {
                        let start = self.current_pos;
                        match self.skip_multi_line_comment() {
                            Some(crossed_line) => newline |= crossed_line,
                            None => {
                                return Err(self.token(
                                    TokenKind::Error,
                                    start,
                                    "'*/' expected.",
                                ))
                            }
                        }
                    } else {
                        break;
                    }
                }
                _ => break,
            }
        }
        Ok(newline)
    }

    fn skip_single_line_comment(&mut self) {
        // Stop before the newline so it is seen as a line terminator.
        while let Some(ch) = self.current_char {
            if ch == '\n' {
                break;
            }
            self.advance();
        }
    }

    /// Returns `Some(contains_newline)` or `None` when unterminated.
    fn skip_multi_line_comment(&mut self) -> Option<bool> {
        // Skip /*
        self.advance();
        self.advance();

        let mut newline = false;
        while let Some(ch) = self.current_char {
            if ch == '*' && self.peek() == Some('/') {
                self.advance(); // *
                self.advance(); // /
                return Some(newline);
            }
            newline |= ch == '\n';
            self.advance();
        }
        None
    }

    fn read_string_literal(&mut self, quote: char) -> Token {
        let start = self.current_pos;
        self.advance(); // Skip opening quote

        let mut value = String::new();

        while let Some(ch) = self.current_char {
            if ch == quote {
                self.advance(); // Skip closing quote
                return self.token(TokenKind::StringLiteral, start, value);
            } else if ch == '\\' {
                self.advance();
                if let Some(escaped) = self.current_char {
                    match escaped {
                        'u' => {
                            self.advance();
                            value.push(self.read_unicode_escape());
                        }
                        'x' => {
                            self.advance();
                            value.push(self.read_hex_escape(2));
                        }
                        // Line continuation
                        '\r' => {
                            self.advance();
                            if self.current_char == Some('\n') {
                                self.advance();
                            }
                        }
                        '\n' => self.advance(),
                        _ => {
                            let unescaped = match escaped {
                                'n' => '\n',
                                'r' => '\r',
                                't' => '\t',
                                'b' => '\u{8}',
                                'f' => '\u{c}',
                                'v' => '\u{b}',
                                '0' => '\0',
                                _ => escaped,
                            };
                            value.push(unescaped);
                            self.advance();
                        }
                    }
                }
            } else if ch == '\n' {
                return self.token(TokenKind::Error, start, "Unterminated string literal.");
            } else {
                value.push(ch);
                self.advance();
            }
        }

        self.token(TokenKind::Error, start, "Unterminated string literal.")
    }

    /// `\u` has been consumed; handles both `XXXX` and `{X...}` forms.
    fn read_unicode_escape(&mut self) -> char {
        if self.current_char == Some('{') {
            self.advance();
            let mut code = 0u32;
            while let Some(digit) = self.current_char.and_then(|c| c.to_digit(16)) {
                code = code.saturating_mul(16).saturating_add(digit);
                self.advance();
            }
            if self.current_char == Some('}') {
                self.advance();
            }
            return char::from_u32(code).unwrap_or('\u{FFFD}');
        }
        self.read_hex_escape(4)
    }

    fn read_hex_escape(&mut self, digits: usize) -> char {
        let mut code = 0u32;
        for _ in 0..digits {
            match self.current_char.and_then(|c| c.to_digit(16)) {
                Some(digit) => {
                    code = code * 16 + digit;
                    self.advance();
                }
                None => break,
            }
        }
        char::from_u32(code).unwrap_or('\u{FFFD}')
    }

    /// Reads a template piece after its opening `` ` `` or `}`; the raw
    /// text is kept as written.
    fn read_template(&mut self, start: usize, is_first: bool) -> Token {
        let mut value = String::new();

        while let Some(ch) = self.current_char {
            match ch {
                '`' => {
                    self.advance();
                    let kind = if is_first {
                        TokenKind::NoSubstitutionTemplate
                    } else {
                        TokenKind::TemplateTail
                    };
                    return self.token(kind, start, value);
                }
                '$' if self.peek() == Some('{') => {
                    self.advance();
                    self.advance();
                    self.brace_stack.push(true);
                    let kind = if is_first {
                        TokenKind::TemplateHead
                    } else {
                        TokenKind::TemplateMiddle
                    };
                    return self.token(kind, start, value);
                }
                '\\' => {
                    value.push(ch);
                    self.advance();
                    if let Some(escaped) = self.current_char {
                        value.push(escaped);
                        self.advance();
                    }
                }
                _ => {
                    value.push(ch);
                    self.advance();
                }
            }
        }

        self.token(TokenKind::Error, start, "Unterminated template literal.")
    }

    fn read_regex(&mut self) -> Token {
        let start = self.current_pos;
        self.advance(); // Skip opening slash

        let mut in_class = false;
        loop {
            match self.current_char {
                None | Some('\n') => {
                    return self.token(
                        TokenKind::Error,
                        start,
                        "Unterminated regular expression literal.",
                    )
                }
                Some('\\') => {
                    self.advance();
                    self.advance();
                }
                Some('[') => {
                    in_class = true;
                    self.advance();
                }
                Some(']') => {
                    in_class = false;
                    self.advance();
                }
                Some('/') if !in_class => {
                    self.advance();
                    break;
                }
                Some(_) => self.advance(),
            }
        }

        // Flags
        while self.current_char.map_or(false, |c| c.is_ascii_alphabetic()) {
            self.advance();
        }

        let text = &self.source[start..self.current_pos];
        self.token(TokenKind::RegexLiteral, start, text)
    }

    fn read_digits(&mut self, value: &mut String, is_digit: impl Fn(char) -> bool) {
        while let Some(ch) = self.current_char {
            if is_digit(ch) || ch == '_' {
                if ch != '_' {
                    value.push(ch);
                }
                self.advance();
            } else {
                break;
            }
        }
    }

    fn read_number(&mut self) -> Token {
        let start = self.current_pos;

        // Check for special number formats
        if self.current_char == Some('0') {
            let radix = match self.peek() {
                Some('x') | Some('X') => Some(('x', 16)),
                Some('o') | Some('O') => Some(('o', 8)),
                Some('b') | Some('B') => Some(('b', 2)),
                _ => None,
            };
            if let Some((prefix, radix)) = radix {
                self.advance(); // 0
                self.advance(); // x, o or b
                let mut value = format!("0{}", prefix);
                self.read_digits(&mut value, |c| c.is_digit(radix));
                return self.finish_number(start, value);
            }
        }

        let mut value = String::new();

        // Read integer part
        self.read_digits(&mut value, |c| c.is_ascii_digit());

        // Check for decimal point
        if self.current_char == Some('.') {
            value.push('.');
            self.advance();
            self.read_digits(&mut value, |c| c.is_ascii_digit());
        }

        self.read_exponent(&mut value);
        self.finish_number(start, value)
    }

    fn read_exponent(&mut self, value: &mut String) {
        if matches!(self.current_char, Some('e') | Some('E')) {
            value.push('e');
            self.advance();

            if let Some(sign @ ('+' | '-')) = self.current_char {
                value.push(sign);
                self.advance();
            }

            self.read_digits(value, |c| c.is_ascii_digit());
        }
    }

    fn finish_number(&mut self, start: usize, value: String) -> Token {
        // Check for BigInt suffix
        if self.current_char == Some('n') {
            self.advance();
            return self.token(TokenKind::BigIntLiteral, start, value);
        }
        self.token(TokenKind::NumberLiteral, start, value)
    }

    fn read_identifier_text(&mut self) -> String {
        let mut value = String::new();
        while let Some(ch) = self.current_char {
            if ch.is_alphanumeric() || ch == '_' || ch == '$' || ch == '\u{200c}' || ch == '\u{200d}' {
                value.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        value
    }

    fn read_identifier(&mut self) -> Token {
        let start = self.current_pos;
        let value = self.read_identifier_text();

        let kind = match value.as_str() {
            "let" => TokenKind::Let,
            "const" => TokenKind::Const,
            "var" => TokenKind::Var,
            "function" => TokenKind::Function,
            "return" => TokenKind::Return,
            "if" => TokenKind::If,
            "else" => TokenKind::Else,
            "for" => TokenKind::For,
            "while" => TokenKind::While,
            "do" => TokenKind::Do,
            "break" => TokenKind::Break,
            "continue" => TokenKind::Continue,
            "switch" => TokenKind::Switch,
            "case" => TokenKind::Case,
            "default" => TokenKind::Default,
            "class" => TokenKind::Class,
            "extends" => TokenKind::Extends,
            "implements" => TokenKind::Implements,
            "interface" => TokenKind::Interface,
            "enum" => TokenKind::Enum,
            "import" => TokenKind::Import,
            "export" => TokenKind::Export,
            "new" => TokenKind::New,
            "this" => TokenKind::This,
            "super" => TokenKind::Super,
            "typeof" => TokenKind::Typeof,
            "instanceof" => TokenKind::Instanceof,
            "in" => TokenKind::In,
            "void" => TokenKind::Void,
            "delete" => TokenKind::Delete,
            "null" => TokenKind::Null,
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            "await" => TokenKind::Await,
            "yield" => TokenKind::Yield,
            "try" => TokenKind::Try,
            "catch" => TokenKind::Catch,
            "finally" => TokenKind::Finally,
            "throw" => TokenKind::Throw,
            "debugger" => TokenKind::Debugger,
            "with" => TokenKind::With,
            _ => TokenKind::Identifier,
        };

        self.token(kind, start, value)
    }

    fn read_plus(&mut self) -> Token {
        let start = self.current_pos;
        self.advance();

        match self.current_char {
            Some('+') => {
                self.advance();
                self.token(TokenKind::PlusPlus, start, "++")
            }
            Some('=') => {
                self.advance();
                self.token(TokenKind::PlusEq, start, "+=")
            }
            _ => self.token(TokenKind::Plus, start, "+"),
        }
    }

    fn read_minus(&mut self) -> Token {
        let start = self.current_pos;
        self.advance();

        match self.current_char {
            Some('-') => {
                self.advance();
                self.token(TokenKind::MinusMinus, start, "--")
            }
            Some('=') => {
                self.advance();
                self.token(TokenKind::MinusEq, start, "-=")
            }
            _ => self.token(TokenKind::Minus, start, "-"),
        }
    }

    fn read_star(&mut self) -> Token {
        let start = self.current_pos;
        self.advance();

        match self.current_char {
            Some('*') => {
                self.advance();
                if self.current_char == Some('=') {
                    self.advance();
                    self.token(TokenKind::StarStarEq, start, "**=")
                } else {
                    self.token(TokenKind::StarStar, start, "**")
                }
            }
            Some('=') => {
                self.advance();
                self.token(TokenKind::StarEq, start, "*=")
            }
            _ => self.token(TokenKind::Star, start, "*"),
        }
    }

    fn read_slash(&mut self) -> Token {
        self.read_compound(TokenKind::Slash, TokenKind::SlashEq)
    }

    fn read_eq(&mut self) -> Token {
        let start = self.current_pos;
        self.advance();

        match self.current_char {
            Some('=') => {
                self.advance();
                if self.current_char == Some('=') {
                    self.advance();
                    self.token(TokenKind::EqEqEq, start, "===")
                } else {
                    self.token(TokenKind::EqEq, start, "==")
                }
            }
            Some('>') => {
                self.advance();
                self.token(TokenKind::FatArrow, start, "=>")
            }
            _ => self.token(TokenKind::Eq, start, "="),
        }
    }

    fn read_bang(&mut self) -> Token {
        let start = self.current_pos;
        self.advance();

        if self.current_char == Some('=') {
            self.advance();
            if self.current_char == Some('=') {
                self.advance();
                self.token(TokenKind::BangEqEq, start, "!==")
            } else {
                self.token(TokenKind::BangEq, start, "!=")
            }
        } else {
            self.token(TokenKind::Bang, start, "!")
        }
    }

    fn read_lt(&mut self) -> Token {
        let start = self.current_pos;
        self.advance();

        match self.current_char {
            Some('<') => {
                self.advance();
                if self.current_char == Some('=') {
                    self.advance();
                    self.token(TokenKind::LtLtEq, start, "<<=")
                } else {
                    self.token(TokenKind::LtLt, start, "<<")
                }
            }
            Some('=') => {
                self.advance();
                self.token(TokenKind::LtEq, start, "<=")
            }
            _ => self.token(TokenKind::Lt, start, "<"),
        }
    }

    fn read_gt(&mut self) -> Token {
        let start = self.current_pos;
        self.advance();

        match self.current_char {
            Some('>') => {
                self.advance();
                match self.current_char {
                    Some('>') => {
                        self.advance();
                        if self.current_char == Some('=') {
                            self.advance();
                            self.token(TokenKind::GtGtGtEq, start, ">>>=")
                        } else {
                            self.token(TokenKind::GtGtGt, start, ">>>")
                        }
                    }
                    Some('=') => {
                        self.advance();
                        self.token(TokenKind::GtGtEq, start, ">>=")
                    }
                    _ => self.token(TokenKind::GtGt, start, ">>"),
                }
            }
            Some('=') => {
                self.advance();
                self.token(TokenKind::GtEq, start, ">=")
            }
            _ => self.token(TokenKind::Gt, start, ">"),
        }
    }

    fn read_amp(&mut self) -> Token {
        let start = self.current_pos;
        self.advance();

        match self.current_char {
            Some('&') => {
                self.advance();
                if self.current_char == Some('=') {
                    self.advance();
                    self.token(TokenKind::AmpAmpEq, start, "&&=")
                } else {
                    self.token(TokenKind::AmpAmp, start, "&&")
                }
            }
            Some('=') => {
                self.advance();
                self.token(TokenKind::AmpEq, start, "&=")
            }
            _ => self.token(TokenKind::Amp, start, "&"),
        }
    }

    fn read_pipe(&mut self) -> Token {
        let start = self.current_pos;
        self.advance();

        match self.current_char {
            Some('|') => {
                self.advance();
                if self.current_char == Some('=') {
                    self.advance();
                    self.token(TokenKind::PipePipeEq, start, "||=")
                } else {
                    self.token(TokenKind::PipePipe, start, "||")
                }
            }
            Some('=') => {
                self.advance();
                self.token(TokenKind::PipeEq, start, "|=")
            }
            _ => self.token(TokenKind::Pipe, start, "|"),
        }
    }

    fn read_question(&mut self) -> Token {
        let start = self.current_pos;
        self.advance();

        match self.current_char {
            Some('?') => {
                self.advance();
                if self.current_char == Some('=') {
                    self.advance();
                    self.token(TokenKind::QuestionQuestionEq, start, "??=")
                } else {
                    self.token(TokenKind::QuestionQuestion, start, "??")
                }
            }
            // `a?.5:b` is a conditional, not optional chaining
            Some('.') if !self.peek().map_or(false, |c| c.is_ascii_digit()) => {
                self.advance();
                self.token(TokenKind::QuestionDot, start, "?.")
            }
            _ => self.token(TokenKind::Question, start, "?"),
        }
    }

    fn read_dot(&mut self) -> Token {
        let start = self.current_pos;
        self.advance();

        if self.current_char == Some('.') && self.peek() == Some('.') {
            self.advance();
            self.advance();
            self.token(TokenKind::DotDotDot, start, "...")
        } else if self.current_char.map_or(false, |c| c.is_ascii_digit()) {
            // Number starting with dot (e.g., .5)
            let mut value = String::from("0.");
            self.read_digits(&mut value, |c| c.is_ascii_digit());
            self.read_exponent(&mut value);
            self.token(TokenKind::NumberLiteral, start, value)
        } else {
            self.token(TokenKind::Dot, start, ".")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::new(source).tokenize().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_keywords() {
        let source = "let const var function return if else delete";
        let mut lexer = Lexer::new(source);
        let tokens = lexer.tokenize();

        assert_eq!(tokens[0].kind, TokenKind::Let);
        assert_eq!(tokens[1].kind, TokenKind::Const);
        assert_eq!(tokens[2].kind, TokenKind::Var);
        assert_eq!(tokens[3].kind, TokenKind::Function);
        assert_eq!(tokens[4].kind, TokenKind::Return);
        assert_eq!(tokens[5].kind, TokenKind::If);
        assert_eq!(tokens[6].kind, TokenKind::Else);
        assert_eq!(tokens[7].kind, TokenKind::Delete);
    }

    #[test]
    fn test_contextual_keywords_are_identifiers() {
        let source = "type from as declare namespace readonly async of";
        let tokens = Lexer::new(source).tokenize();

        for token in &tokens[..8] {
            assert_eq!(token.kind, TokenKind::Identifier, "{}", token.value);
        }
        assert!(tokens[0].is_ident("type"));
    }

    #[test]
    fn test_numbers() {
        let source = "123 45.67 0x1A 0o77 0b1010 1_000_000 .5 1e3 42n";
        let mut lexer = Lexer::new(source);
        let tokens = lexer.tokenize();

        assert_eq!(tokens[0].kind, TokenKind::NumberLiteral);
        assert_eq!(tokens[0].value, "123");
        assert_eq!(tokens[1].value, "45.67");
        assert_eq!(tokens[2].value, "0x1A");
        assert_eq!(tokens[3].value, "0o77");
        assert_eq!(tokens[4].value, "0b1010");
        assert_eq!(tokens[5].value, "1000000");
        assert_eq!(tokens[6].value, "0.5");
        assert_eq!(tokens[7].value, "1e3");
        assert_eq!(tokens[8].kind, TokenKind::BigIntLiteral);
        assert_eq!(tokens[8].value, "42");
    }

    #[test]
    fn test_strings() {
        let source = r#""hello" 'wor\'ld' "\u{41}\x42""#;
        let mut lexer = Lexer::new(source);
        let tokens = lexer.tokenize();

        assert_eq!(tokens[0].kind, TokenKind::StringLiteral);
        assert_eq!(tokens[0].value, "hello");
        assert_eq!(tokens[1].value, "wor'ld");
        assert_eq!(tokens[2].value, "AB");
    }

    #[test]
    fn test_unterminated_string() {
        let tokens = Lexer::new("'abc\nx").tokenize();
        assert_eq!(tokens[0].kind, TokenKind::Error);
    }

    #[test]
    fn test_templates() {
        let tokens = Lexer::new("`a${x}b${ {y} }c` `plain`").tokenize();
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();

        assert_eq!(
            kinds,
            vec![
                TokenKind::TemplateHead,
                TokenKind::Identifier,
                TokenKind::TemplateMiddle,
                TokenKind::LBrace,
                TokenKind::Identifier,
                TokenKind::RBrace,
                TokenKind::TemplateTail,
                TokenKind::NoSubstitutionTemplate,
                TokenKind::Eof,
            ]
        );
        assert_eq!(tokens[0].value, "a");
        assert_eq!(tokens[2].value, "b");
        assert_eq!(tokens[6].value, "c");
        assert_eq!(tokens[7].value, "plain");
    }

    #[test]
    fn test_regex_versus_division() {
        let tokens = Lexer::new("x = /a[/]b/gi; y = a / b / c").tokenize();

        assert_eq!(tokens[2].kind, TokenKind::RegexLiteral);
        assert_eq!(tokens[2].value, "/a[/]b/gi");
        assert_eq!(
            kinds("a / b / c"),
            vec![
                TokenKind::Identifier,
                TokenKind::Slash,
                TokenKind::Identifier,
                TokenKind::Slash,
                TokenKind::Identifier,
                TokenKind::Eof,
            ]
        );
        assert_eq!(tokens[4].kind, TokenKind::Identifier);
    }

    #[test]
    fn test_operators() {
        let source = "+ - * % ** += -= === !== <= >= && || ?? ?.";
        let mut lexer = Lexer::new(source);
        let tokens = lexer.tokenize();

        assert_eq!(tokens[0].kind, TokenKind::Plus);
        assert_eq!(tokens[1].kind, TokenKind::Minus);
        assert_eq!(tokens[2].kind, TokenKind::Star);
        assert_eq!(tokens[3].kind, TokenKind::Percent);
        assert_eq!(tokens[4].kind, TokenKind::StarStar);
        assert_eq!(tokens[5].kind, TokenKind::PlusEq);
        assert_eq!(tokens[7].kind, TokenKind::EqEqEq);
        assert_eq!(tokens[8].kind, TokenKind::BangEqEq);
        assert_eq!(tokens[11].kind, TokenKind::AmpAmp);
        assert_eq!(tokens[13].kind, TokenKind::QuestionQuestion);
        assert_eq!(tokens[14].kind, TokenKind::QuestionDot);
        assert_eq!(kinds("a ?.5 : b")[1], TokenKind::Question);
    }

    #[test]
    fn test_compound_assignment() {
        let source = "a <<= b >>= c >>>= d &= e |= f ^= g ??= h";
        let tokens = Lexer::new(source).tokenize();

        assert_eq!(tokens[1].kind, TokenKind::LtLtEq);
        assert_eq!(tokens[3].kind, TokenKind::GtGtEq);
        assert_eq!(tokens[5].kind, TokenKind::GtGtGtEq);
        assert_eq!(tokens[7].kind, TokenKind::AmpEq);
        assert_eq!(tokens[9].kind, TokenKind::PipeEq);
        assert_eq!(tokens[11].kind, TokenKind::CaretEq);
        assert_eq!(tokens[13].kind, TokenKind::QuestionQuestionEq);
    }

    #[test]
    fn test_comments_and_newlines() {
        let source = r#"
            // Single line comment
            let x = 5
            /* Multi-line
               comment */ const y = 10;
        "#;
        let mut lexer = Lexer::new(source);
        let tokens = lexer.tokenize();

        assert_eq!(tokens[0].kind, TokenKind::Let);
        assert!(tokens[0].newline_before);
        assert_eq!(tokens[1].kind, TokenKind::Identifier);
        assert!(!tokens[1].newline_before);
        assert_eq!(tokens[4].kind, TokenKind::Const);
        assert!(tokens[4].newline_before);
    }

    #[test]
    fn test_private_names_and_hashbang() {
        let tokens = Lexer::new("#!/usr/bin/env node\nthis.#count").tokenize();

        assert_eq!(tokens[0].kind, TokenKind::This);
        assert_eq!(tokens[2].kind, TokenKind::PrivateName);
        assert_eq!(tokens[2].value, "#count");
    }
}

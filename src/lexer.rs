use crate::ast::tokens::{Token, TokenKind, is_type_keyword};

/// Lexer for Facet source text.
///
/// Tokenization never fails: characters the lexer does not recognize
/// become [`TokenKind::Symbol`] tokens so the parser can report a
/// contextual error with a position instead of the lexer guessing.
pub struct Lexer {
    input: Vec<char>,
    position: usize,
    line: u32,
    col: u32,
    /// Nesting depth across all bracket kinds, for comment detection.
    depth: usize,
    /// True until the first non-whitespace character of the current line.
    at_line_start: bool,
    /// Kind of the last significant (non-newline) token produced.
    prev: Option<TokenKind>,
}

/// Tokenize a whole document.
///
/// Consecutive newlines collapse to a single [`TokenKind::Newline`], no
/// trailing newline token is emitted, and the stream always ends with
/// exactly one [`TokenKind::Eof`].
pub fn tokenize(text: &str) -> Vec<Token> {
    let mut lexer = Lexer::new(text);
    let mut tokens: Vec<Token> = Vec::new();

    loop {
        let token = lexer.next_token();
        match token.kind {
            TokenKind::Newline => {
                if !matches!(tokens.last().map(|t| &t.kind), Some(TokenKind::Newline) | None) {
                    tokens.push(token);
                }
            }
            TokenKind::Eof => {
                if matches!(tokens.last().map(|t| &t.kind), Some(TokenKind::Newline)) {
                    tokens.pop();
                }
                tokens.push(token);
                return tokens;
            }
            _ => tokens.push(token),
        }
    }
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Lexer {
            input: input.chars().collect(),
            position: 0,
            line: 1,
            col: 1,
            depth: 0,
            at_line_start: true,
            prev: None,
        }
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_char(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    fn advance(&mut self) {
        if self.current_char() == Some('\n') {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        self.position += 1;
    }

    fn skip_inline_whitespace(&mut self) {
        while let Some(ch) = self.current_char() {
            if ch.is_whitespace() && ch != '\n' {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn skip_comment(&mut self) {
        while let Some(ch) = self.current_char() {
            if ch == '\n' {
                break;
            }
            self.advance();
        }
    }

    /// Identifiers may contain digits and underscores anywhere; this is
    /// also the path a numeral-then-letters form (`2fa`) takes.
    fn read_word(&mut self) -> String {
        let mut result = String::new();
        while let Some(ch) = self.current_char() {
            if ch.is_alphanumeric() || ch == '_' {
                result.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        result
    }

    fn read_string(&mut self, quote: char) -> String {
        let mut result = String::new();
        self.advance(); // consume opening quote

        while let Some(ch) = self.current_char() {
            match ch {
                c if c == quote => {
                    self.advance();
                    return result;
                }
                // An unterminated string ends at the line break; the
                // parser reports the structural problem.
                '\n' => return result,
                '\\' => {
                    self.advance();
                    match self.current_char() {
                        Some('n') => result.push('\n'),
                        Some('t') => result.push('\t'),
                        Some('r') => result.push('\r'),
                        Some('"') => result.push('"'),
                        Some('\'') => result.push('\''),
                        Some('\\') => result.push('\\'),
                        Some(other) => {
                            result.push('\\');
                            result.push(other);
                        }
                        None => return result,
                    }
                    self.advance();
                }
                _ => {
                    result.push(ch);
                    self.advance();
                }
            }
        }
        result
    }

    /// Reads a numeral. A numeral directly followed by letters or an
    /// underscore is one identifier, not a number plus a suffix.
    fn read_number_or_ident(&mut self) -> TokenKind {
        let mut text = String::new();
        let mut is_word = false;

        while let Some(ch) = self.current_char() {
            if ch.is_ascii_digit() {
                text.push(ch);
                self.advance();
            } else if ch == '.'
                && !is_word
                && !text.contains('.')
                && self.peek_char(1).is_some_and(|c| c.is_ascii_digit())
            {
                text.push(ch);
                self.advance();
            } else if ch.is_alphabetic() || ch == '_' {
                is_word = true;
                text.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        if is_word {
            TokenKind::Ident(text)
        } else {
            TokenKind::Num(text)
        }
    }

    /// A `#` after a colon followed by a 3- or 6-digit hex run is a
    /// color value, not a ref expression.
    fn try_read_color(&mut self) -> Option<String> {
        if !matches!(self.prev, Some(TokenKind::Op(':'))) {
            return None;
        }

        let mut run = 0;
        while self
            .peek_char(1 + run)
            .is_some_and(|c| c.is_ascii_hexdigit())
        {
            run += 1;
        }
        if run != 3 && run != 6 {
            return None;
        }
        // A longer word (`#3b82f6ff` or `#deadline`) is not a color.
        if self
            .peek_char(1 + run)
            .is_some_and(|c| c.is_alphanumeric() || c == '_')
        {
            return None;
        }

        let mut color = String::from("#");
        self.advance(); // consume '#'
        for _ in 0..run {
            if let Some(ch) = self.current_char() {
                color.push(ch);
            }
            self.advance();
        }
        Some(color)
    }

    pub fn next_token(&mut self) -> Token {
        self.skip_inline_whitespace();

        // Comments: '#' at the first non-whitespace column of a line,
        // outside any bracket context. Inside expressions the same
        // character is the ref operator.
        if self.at_line_start && self.depth == 0 && self.current_char() == Some('#') {
            self.skip_comment();
        }

        let line = self.line;
        let col = self.col;
        let kind = self.next_kind();

        match &kind {
            TokenKind::Newline => self.at_line_start = true,
            TokenKind::Eof => {}
            other => {
                self.at_line_start = false;
                self.prev = Some(other.clone());
            }
        }

        Token::new(kind, line, col)
    }

    fn next_kind(&mut self) -> TokenKind {
        match self.current_char() {
            None => TokenKind::Eof,
            Some('\n') => {
                self.advance();
                TokenKind::Newline
            }
            Some('@') => {
                self.advance();
                let word = self.read_word();
                TokenKind::AtKeyword(word)
            }
            Some('#') => {
                if let Some(color) = self.try_read_color() {
                    TokenKind::Str(color)
                } else {
                    self.advance();
                    TokenKind::Hash
                }
            }
            Some('"') => TokenKind::Str(self.read_string('"')),
            Some('\'') => TokenKind::Str(self.read_string('\'')),
            Some('{') => {
                self.depth += 1;
                self.advance();
                TokenKind::LBrace
            }
            Some('}') => {
                self.depth = self.depth.saturating_sub(1);
                self.advance();
                TokenKind::RBrace
            }
            Some('(') => {
                self.depth += 1;
                self.advance();
                TokenKind::LParen
            }
            Some(')') => {
                self.depth = self.depth.saturating_sub(1);
                self.advance();
                TokenKind::RParen
            }
            Some('[') => {
                self.depth += 1;
                self.advance();
                TokenKind::LBracket
            }
            Some(']') => {
                self.depth = self.depth.saturating_sub(1);
                self.advance();
                TokenKind::RBracket
            }
            Some(
                ch @ ('+' | '>' | '|' | ':' | '.' | '!' | '*' | '?' | '$' | '~' | '^' | '/' | ','
                | '-' | '='),
            ) => {
                self.advance();
                TokenKind::Op(ch)
            }
            Some(ch) if ch.is_alphabetic() || ch == '_' => {
                let word = self.read_word();
                match word.as_str() {
                    "true" => TokenKind::Bool(true),
                    "false" => TokenKind::Bool(false),
                    w if is_type_keyword(w) => TokenKind::TypeKeyword(word),
                    _ => TokenKind::Ident(word),
                }
            }
            Some(ch) if ch.is_ascii_digit() => self.read_number_or_ident(),
            Some(ch) => {
                self.advance();
                TokenKind::Symbol(ch)
            }
        }
    }
}

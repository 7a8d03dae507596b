/// A lexical token with its 1-based source position.
///
/// Positions are carried on every token so the parser can report
/// structural errors against the original source text.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: u32,
    pub col: u32,
}

impl Token {
    pub fn new(kind: TokenKind, line: u32, col: u32) -> Self {
        Token { kind, line, col }
    }

    /// True if this token ends a logical line (newline or end of input).
    pub fn is_terminator(&self) -> bool {
        matches!(self.kind, TokenKind::Newline | TokenKind::Eof)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// Block or scope keyword introduced by `@`
    ///
    /// # Examples
    /// ```text
    /// @app
    /// @state
    /// @page
    /// ```
    AtKeyword(String),

    /// Declared type keyword used in state fields, model fields, and
    /// handler-contract parameters
    ///
    /// # Examples
    /// ```text
    /// str
    /// int
    /// bool
    /// list
    /// ```
    TypeKeyword(String),

    /// Identifier: element names, field names, mutation names
    ///
    /// May contain digits and underscores anywhere after the first
    /// character; a numeral directly followed by letters also lexes as
    /// one identifier (`2fa`, `3col`).
    Ident(String),

    /// String literal, double- or single-quoted; also hex color values
    /// (`#3b82f6`) recognized after a colon
    Str(String),

    /// Numeric literal, raw lexeme preserved for byte-stable emission
    Num(String),

    /// Boolean literal (`true` / `false`)
    Bool(bool),

    /// The ref operator `#`
    ///
    /// Only produced inside expressions; at the start of a line with no
    /// open bracket the same character begins a comment instead.
    Hash,

    /// Single-character operator
    ///
    /// # Examples
    /// ```text
    /// + > | : . ! * ? $ ~ ^ / ,
    /// ```
    Op(char),

    /// Left brace opening a model body
    LBrace,

    /// Right brace
    RBrace,

    /// Left parenthesis for grouping or invoke arguments
    LParen,

    /// Right parenthesis
    RParen,

    /// Left bracket
    LBracket,

    /// Right bracket
    RBracket,

    /// One or more consecutive source newlines, collapsed
    Newline,

    /// Any character the lexer does not recognize
    ///
    /// The lexer never fails; the parser turns these into contextual
    /// errors.
    Symbol(char),

    /// End of input, always the final token
    Eof,
}

impl TokenKind {
    /// Identifier-like text of the token, if it has one.
    pub fn ident(&self) -> Option<&str> {
        match self {
            TokenKind::Ident(s) | TokenKind::AtKeyword(s) | TokenKind::TypeKeyword(s) => Some(s),
            _ => None,
        }
    }
}

/// Type keywords recognized by the lexer.
///
/// Anything else in type position is a plain identifier; the context
/// extractor decides what an unknown type means.
pub const TYPE_KEYWORDS: &[&str] = &[
    "str", "int", "bool", "float", "list", "obj", "date", "money", "text", "ref", "many", "enum",
];

pub fn is_type_keyword(word: &str) -> bool {
    TYPE_KEYWORDS.contains(&word)
}

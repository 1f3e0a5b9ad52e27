//! Tokenizer for the tag-based policy DSL.
//!
//! The lexer turns a document into a flat stream of [`Token`]s. It has two
//! modes: *content* (between tags) and *tag* (after `<name`, until `>` or
//! `/>`). Every token carries its byte span so the parser can slice raw
//! source text, which is how match patterns are captured verbatim.
//!
//! ```ignore
//! use warden_policy::lexer::{Lexer, TokenKind};
//!
//! let kinds: Vec<TokenKind> = Lexer::new("<id>p1</id>").map(|t| t.kind).collect();
//! assert_eq!(kinds[0], TokenKind::OpenTag("id".into()));
//! ```

use std::fmt;

// =============================================================================
// Tokens
// =============================================================================

/// Byte range of a token in the source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    /// Offset of the first byte.
    pub start: usize,
    /// Offset one past the last byte.
    pub end: usize,
}

impl Span {
    fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// Token categories produced by the lexer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// `<name`: start of an opening tag.
    OpenTag(String),
    /// `>` terminating an opening tag.
    TagEnd,
    /// `/>` terminating a self-closing tag.
    SelfClose,
    /// `</name>`.
    CloseTag(String),
    /// `name="value"` inside an opening tag; the value is unquoted.
    Attribute {
        /// Attribute name.
        name: String,
        /// Attribute value without quotes.
        value: String,
    },
    /// Quoted literal in content, quotes included.
    String(String),
    /// Content run that is a base-10 integer.
    Number(String),
    /// Any other content run, trimmed.
    Text(String),
    /// End of input.
    Eof,
    /// Lexing failed; the lexer yields `Eof` next.
    Error(String),
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OpenTag(name) => write!(f, "<{name}"),
            Self::TagEnd => write!(f, ">"),
            Self::SelfClose => write!(f, "/>"),
            Self::CloseTag(name) => write!(f, "</{name}>"),
            Self::Attribute { name, value } => write!(f, "{name}=\"{value}\""),
            Self::String(s) | Self::Number(s) | Self::Text(s) => write!(f, "{s}"),
            Self::Eof => write!(f, "EOF"),
            Self::Error(msg) => write!(f, "error: {msg}"),
        }
    }
}

/// A token with its position in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Token category and literal.
    pub kind: TokenKind,
    /// Source byte range.
    pub span: Span,
}

impl Token {
    fn new(kind: TokenKind, start: usize, end: usize) -> Self {
        Self {
            kind,
            span: Span::new(start, end),
        }
    }
}

// =============================================================================
// Lexer
// =============================================================================

/// Streaming lexer over a policy document.
///
/// Iteration ends after the first `Eof` token. An `Error` token is always
/// followed by `Eof`.
pub struct Lexer<'a> {
    src: &'a str,
    pos: usize,
    in_tag: bool,
    finished: bool,
}

impl<'a> Lexer<'a> {
    /// Create a lexer over `src`.
    #[must_use]
    pub fn new(src: &'a str) -> Self {
        Self {
            src,
            pos: 0,
            in_tag: false,
            finished: false,
        }
    }

    /// Produce the next token. Returns `Eof` forever once input is exhausted.
    pub fn next_token(&mut self) -> Token {
        if self.finished {
            return Token::new(TokenKind::Eof, self.src.len(), self.src.len());
        }
        let token = if self.in_tag {
            self.lex_tag()
        } else {
            self.lex_content()
        };
        if matches!(token.kind, TokenKind::Error(_) | TokenKind::Eof) {
            self.finished = true;
        }
        token
    }

    fn bytes(&self) -> &'a [u8] {
        self.src.as_bytes()
    }

    fn peek(&self) -> Option<u8> {
        self.bytes().get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.bytes().get(self.pos + offset).copied()
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    fn error(&mut self, start: usize, message: String) -> Token {
        Token::new(TokenKind::Error(message), start, self.pos)
    }

    fn eof(&self) -> Token {
        Token::new(TokenKind::Eof, self.src.len(), self.src.len())
    }

    fn read_ident(&mut self) -> &'a str {
        let start = self.pos;
        while self.peek().is_some_and(is_ident_char) {
            self.pos += 1;
        }
        &self.src[start..self.pos]
    }

    /// Reads a quoted literal starting at the current quote character.
    /// Returns the byte range including both quotes.
    fn read_quoted(&mut self) -> Result<Span, String> {
        let start = self.pos;
        let Some(quote) = self.peek() else {
            return Err(format!("expected quoted string at byte {start}"));
        };
        self.pos += 1;
        while let Some(b) = self.peek() {
            match b {
                b'\\' => self.pos += 2,
                b if b == quote => {
                    self.pos += 1;
                    return Ok(Span::new(start, self.pos));
                }
                _ => self.pos += 1,
            }
        }
        self.pos = self.src.len();
        Err(format!("unterminated string at byte {start}"))
    }

    fn lex_tag(&mut self) -> Token {
        self.skip_whitespace();
        let start = self.pos;
        let Some(b) = self.peek() else {
            return self.eof();
        };
        match b {
            b'>' => {
                self.pos += 1;
                self.in_tag = false;
                Token::new(TokenKind::TagEnd, start, self.pos)
            }
            b'/' if self.peek_at(1) == Some(b'>') => {
                self.pos += 2;
                self.in_tag = false;
                Token::new(TokenKind::SelfClose, start, self.pos)
            }
            b if is_ident_start(b) => self.lex_attribute(start),
            _ => {
                let c = self.src[start..].chars().next().unwrap_or('?');
                self.error(start, format!("unexpected character '{c}' in tag at byte {start}"))
            }
        }
    }

    fn lex_attribute(&mut self, start: usize) -> Token {
        let name = self.read_ident().to_string();
        self.skip_whitespace();
        if self.peek() != Some(b'=') {
            return self.error(start, format!("attribute '{name}' has no value at byte {start}"));
        }
        self.pos += 1;
        self.skip_whitespace();
        if !matches!(self.peek(), Some(b'"' | b'\'')) {
            return self.error(
                start,
                format!("attribute '{name}' value must be quoted at byte {}", self.pos),
            );
        }
        match self.read_quoted() {
            Ok(span) => {
                let value = self.src[span.start + 1..span.end - 1].to_string();
                Token::new(TokenKind::Attribute { name, value }, start, self.pos)
            }
            Err(message) => self.error(start, message),
        }
    }

    fn lex_content(&mut self) -> Token {
        loop {
            let start = self.pos;
            let Some(b) = self.peek() else {
                return self.eof();
            };

            if b == b'<' {
                if self.src[start..].starts_with("<!--") {
                    match self.src[start + 4..].find("-->") {
                        Some(offset) => {
                            self.pos = start + 4 + offset + 3;
                            continue;
                        }
                        None => {
                            self.pos = self.src.len();
                            return self
                                .error(start, format!("unterminated comment at byte {start}"));
                        }
                    }
                }
                if self.peek_at(1) == Some(b'/') {
                    return self.lex_close_tag(start);
                }
                if self.peek_at(1).is_some_and(is_ident_start) {
                    self.pos += 1;
                    let name = self.read_ident().to_string();
                    self.in_tag = true;
                    return Token::new(TokenKind::OpenTag(name), start, self.pos);
                }
            }

            if b == b'"' && self.quote_closes_before_markup() {
                return match self.read_quoted() {
                    Ok(span) => Token::new(
                        TokenKind::String(self.src[span.start..span.end].to_string()),
                        span.start,
                        span.end,
                    ),
                    Err(message) => self.error(start, message),
                };
            }

            // A `<` that does not start a tag is plain text, as is a quote
            // with no partner before the next markup.
            self.pos += 1;
            while let Some(b) = self.peek() {
                if b == b'"' || (b == b'<' && self.starts_markup()) {
                    break;
                }
                self.pos += 1;
            }

            let raw = &self.src[start..self.pos];
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                continue;
            }
            let kind = if trimmed.parse::<i64>().is_ok() {
                TokenKind::Number(trimmed.to_string())
            } else {
                TokenKind::Text(trimmed.to_string())
            };
            return Token::new(kind, start, self.pos);
        }
    }

    fn lex_close_tag(&mut self, start: usize) -> Token {
        self.pos += 2;
        let name = self.read_ident().to_string();
        if name.is_empty() {
            return self.error(start, format!("malformed close tag at byte {start}"));
        }
        self.skip_whitespace();
        if self.peek() != Some(b'>') {
            return self.error(start, format!("close tag </{name} is not terminated at byte {start}"));
        }
        self.pos += 1;
        Token::new(TokenKind::CloseTag(name), start, self.pos)
    }

    /// Whether the `<` at the current position opens a tag, close tag or comment.
    fn starts_markup(&self) -> bool {
        markup_at(self.src, self.pos)
    }

    /// Whether the quote at the current position is closed before the next
    /// tag, close tag, comment or end of input.
    fn quote_closes_before_markup(&self) -> bool {
        let bytes = self.src.as_bytes();
        let mut i = self.pos + 1;
        while let Some(&b) = bytes.get(i) {
            match b {
                b'\\' => i += 2,
                b'"' => return true,
                b'<' if markup_at(self.src, i) => return false,
                _ => i += 1,
            }
        }
        false
    }
}

fn markup_at(src: &str, pos: usize) -> bool {
    let bytes = src.as_bytes();
    match bytes.get(pos + 1) {
        Some(b'/') => true,
        Some(b'!') => src[pos..].starts_with("<!--"),
        Some(&b) => is_ident_start(b),
        None => false,
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if self.finished {
            return None;
        }
        Some(self.next_token())
    }
}

/// Tokenize a whole document. The result always ends with `Eof`.
#[must_use]
pub fn tokenize(src: &str) -> Vec<Token> {
    let mut tokens: Vec<Token> = Lexer::new(src).collect();
    if !matches!(tokens.last().map(|t| &t.kind), Some(TokenKind::Eof)) {
        tokens.push(Token::new(TokenKind::Eof, src.len(), src.len()));
    }
    tokens
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

fn is_ident_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-' | b':' | b'.')
}

// =============================================================================
// Tests
// =============================================================================

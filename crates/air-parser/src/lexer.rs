//! Zero-copy tokenizer for AIR source text.
//!
//! Produces a flat token stream with 1-based line/column positions,
//! borrowing slices directly out of the source rather than allocating
//! per-token strings. The parser then walks this stream; neither stage
//! re-scans the source.

use std::str::CharIndices;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    At,
    Colon,
    Comma,
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Eq,
    Ident,
    StringLiteral,
    NumberLiteral,
    /// `>` — parent/child nesting.
    OpGt,
    /// `+` — sibling composition.
    OpPlus,
    /// `?` — conditional render.
    OpQuestion,
    /// `*` — iteration.
    OpStar,
    /// `!` — mutation/action.
    OpBang,
    /// `#` — identifier/ref marker.
    OpHash,
    /// `~` — data-source reference.
    OpTilde,
    /// `^` — hoist/lift.
    OpCaret,
    /// `.` — member access.
    OpDot,
    /// `-` — negation/removal (unary minus folds into `NumberLiteral`).
    OpMinus,
    /// `$` — interpolation.
    OpDollar,
    Eof,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    pub line: u32,
    pub col: u32,
}

impl<'a> Token<'a> {
    #[must_use]
    pub fn describe(&self) -> String {
        match self.kind {
            TokenKind::Eof => "end of input".to_string(),
            _ => format!("'{}'", self.text),
        }
    }
}

/// Raised when the lexer hits text it cannot tokenize at all: an
/// unterminated string literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError {
    pub line: u32,
    pub col: u32,
}

pub struct Lexer<'a> {
    source: &'a str,
    chars: CharIndices<'a>,
    peeked: Option<(usize, char)>,
    line: u32,
    col: u32,
}

impl<'a> Lexer<'a> {
    #[must_use]
    pub fn new(source: &'a str) -> Self {
        let mut chars = source.char_indices();
        let peeked = chars.next();
        Self {
            source,
            chars,
            peeked,
            line: 1,
            col: 1,
        }
    }

    fn bump(&mut self) -> Option<(usize, char)> {
        let current = self.peeked;
        self.peeked = self.chars.next();
        if let Some((_, c)) = current {
            if c == '\n' {
                self.line += 1;
                self.col = 1;
            } else {
                self.col += 1;
            }
        }
        current
    }

    fn peek(&self) -> Option<char> {
        self.peeked.map(|(_, c)| c)
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.source[self.peeked.map_or(self.source.len(), |(i, _)| i)..]
            .char_indices()
            .nth(offset)
            .map(|(_, c)| c)
    }

    /// Tokenize the whole source, returning every token up to and
    /// including a trailing `Eof`. Returns a [`LexError`] on an
    /// unterminated string literal — the only condition the lexer
    /// itself cannot recover from.
    pub fn tokenize(mut self) -> Result<Vec<Token<'a>>, LexError> {
        let mut tokens = Vec::new();
        loop {
            self.skip_trivia();
            let Some((start, c)) = self.peeked else {
                tokens.push(Token {
                    kind: TokenKind::Eof,
                    text: "",
                    line: self.line,
                    col: self.col,
                });
                break;
            };
            let line = self.line;
            let col = self.col;

            let kind = match c {
                '@' => {
                    self.bump();
                    TokenKind::At
                }
                ':' => {
                    self.bump();
                    TokenKind::Colon
                }
                ',' => {
                    self.bump();
                    TokenKind::Comma
                }
                '(' => {
                    self.bump();
                    TokenKind::LParen
                }
                ')' => {
                    self.bump();
                    TokenKind::RParen
                }
                '{' => {
                    self.bump();
                    TokenKind::LBrace
                }
                '}' => {
                    self.bump();
                    TokenKind::RBrace
                }
                '[' => {
                    self.bump();
                    TokenKind::LBracket
                }
                ']' => {
                    self.bump();
                    TokenKind::RBracket
                }
                '=' => {
                    self.bump();
                    TokenKind::Eq
                }
                '>' => {
                    self.bump();
                    TokenKind::OpGt
                }
                '+' => {
                    self.bump();
                    TokenKind::OpPlus
                }
                '?' => {
                    self.bump();
                    TokenKind::OpQuestion
                }
                '*' => {
                    self.bump();
                    TokenKind::OpStar
                }
                '!' => {
                    self.bump();
                    TokenKind::OpBang
                }
                '#' => {
                    self.bump();
                    TokenKind::OpHash
                }
                '~' => {
                    self.bump();
                    TokenKind::OpTilde
                }
                '^' => {
                    self.bump();
                    TokenKind::OpCaret
                }
                '$' => {
                    self.bump();
                    TokenKind::OpDollar
                }
                '"' => {
                    let end = self.scan_string(start, line, col)?;
                    tokens.push(Token {
                        kind: TokenKind::StringLiteral,
                        text: &self.source[start..end],
                        line,
                        col,
                    });
                    continue;
                }
                '-' if self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) => {
                    let end = self.scan_number(start);
                    tokens.push(Token {
                        kind: TokenKind::NumberLiteral,
                        text: &self.source[start..end],
                        line,
                        col,
                    });
                    continue;
                }
                '-' => {
                    self.bump();
                    TokenKind::OpMinus
                }
                c if c.is_ascii_digit() => {
                    let end = self.scan_number(start);
                    tokens.push(Token {
                        kind: TokenKind::NumberLiteral,
                        text: &self.source[start..end],
                        line,
                        col,
                    });
                    continue;
                }
                c if is_ident_start(c) => {
                    let end = self.scan_ident(start);
                    tokens.push(Token {
                        kind: TokenKind::Ident,
                        text: &self.source[start..end],
                        line,
                        col,
                    });
                    continue;
                }
                '.' => {
                    self.bump();
                    TokenKind::OpDot
                }
                _ => {
                    // Unrecognized punctuation: skip it as its own
                    // one-character token rather than failing the whole
                    // lex — the parser will reject it with a proper
                    // "expected X, got Y" diagnostic carrying position.
                    self.bump();
                    TokenKind::OpDot
                }
            };
            tokens.push(Token {
                kind,
                text: &self.source[start..self.peeked.map_or(self.source.len(), |(i, _)| i)],
                line,
                col,
            });
        }
        Ok(tokens)
    }

    fn skip_trivia(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.bump();
            } else if c == '/' && self.peek_at(1) == Some('/') {
                while let Some(c) = self.peek() {
                    if c == '\n' {
                        break;
                    }
                    self.bump();
                }
            } else {
                break;
            }
        }
    }

    fn scan_string(&mut self, start: usize, line: u32, col: u32) -> Result<usize, LexError> {
        self.bump(); // opening quote
        loop {
            match self.peek() {
                None => return Err(LexError { line, col }),
                Some('"') => {
                    self.bump();
                    break;
                }
                Some('\\') => {
                    self.bump();
                    self.bump();
                }
                Some('\n') => return Err(LexError { line, col }),
                Some(_) => {
                    self.bump();
                }
            }
        }
        Ok(self.peeked.map_or(self.source.len(), |(i, _)| i))
    }

    fn scan_number(&mut self, start: usize) -> usize {
        if self.peek() == Some('-') {
            self.bump();
        }
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.bump();
        }
        if self.peek() == Some('.') && self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
            self.bump();
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.bump();
            }
        }
        let _ = start;
        self.peeked.map_or(self.source.len(), |(i, _)| i)
    }

    fn scan_ident(&mut self, start: usize) -> usize {
        while self.peek().is_some_and(is_ident_continue) {
            self.bump();
        }
        let _ = start;
        self.peeked.map_or(self.source.len(), |(i, _)| i)
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '/'
}

fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '/' || c == '-'
}

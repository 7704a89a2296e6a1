//! Tokenizer for Blaze source
//!
//! Produces a flat token stream with newlines preserved, since statement
//! and block boundaries are line sensitive: a `[` that ends a line opens a
//! block, and a `!` that is not glued to an operand ends a statement.

use crate::error::TranspileError;

/// Two-character operators, checked before single characters
const TWO_CHAR_OPS: &[&str] = &[
    "<-", "::", "==", "!=", "<=", ">=", "&&", "||", "+=", "-=", "*=", "/=", "%=", "++", "--",
    ":=", "<<", ">>",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Ident,
    Number,
    /// String, raw string or rune literal, quotes included
    Str,
    /// `// ...` comment, text without the trailing newline
    Comment,
    /// Operators and punctuation
    Symbol,
    /// Statement terminator `!`
    Terminator,
    Newline,
}

/// A token with source position information
#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    /// Line number (0-indexed)
    pub line: usize,
    /// Column number (0-indexed)
    pub column: usize,
    /// Whether horizontal whitespace preceded this token on its line
    pub space_before: bool,
}

impl Token {
    pub fn is(&self, kind: TokenKind, text: &str) -> bool {
        self.kind == kind && self.text == text
    }

    pub fn is_symbol(&self, text: &str) -> bool {
        self.is(TokenKind::Symbol, text)
    }

    pub fn is_keyword(&self, text: &str) -> bool {
        self.is(TokenKind::Ident, text)
    }
}

struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
    space_before: bool,
    tokens: Vec<Token>,
}

pub fn tokenize(source: &str) -> Result<Vec<Token>, TranspileError> {
    let mut lexer = Lexer {
        chars: source.chars().collect(),
        pos: 0,
        line: 0,
        column: 0,
        space_before: false,
        tokens: Vec::new(),
    };
    lexer.run()?;
    Ok(lexer.tokens)
}

impl Lexer {
    fn peek(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.chars.get(self.pos).copied()?;
        self.pos += 1;
        if ch == '\n' {
            self.line += 1;
            self.column = 0;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    fn push(&mut self, kind: TokenKind, text: String, line: usize, column: usize) {
        self.tokens.push(Token {
            kind,
            text,
            line,
            column,
            space_before: self.space_before,
        });
        self.space_before = false;
    }

    fn run(&mut self) -> Result<(), TranspileError> {
        while let Some(ch) = self.peek(0) {
            let (line, column) = (self.line, self.column);

            if ch == '\n' {
                self.bump();
                self.push(TokenKind::Newline, "\n".to_string(), line, column);
            } else if ch.is_whitespace() {
                self.bump();
                self.space_before = true;
            } else if ch == '/' && self.peek(1) == Some('/') {
                let mut text = String::new();
                while let Some(c) = self.peek(0) {
                    if c == '\n' {
                        break;
                    }
                    text.push(c);
                    self.bump();
                }
                self.push(TokenKind::Comment, text.trim_end().to_string(), line, column);
            } else if ch == '"' || ch == '\'' || ch == '`' {
                let text = self.string_literal(ch)?;
                self.push(TokenKind::Str, text, line, column);
            } else if ch.is_ascii_digit() {
                let mut text = String::new();
                while let Some(c) = self.peek(0) {
                    if c.is_alphanumeric() || c == '_' || c == '.' {
                        text.push(c);
                        self.bump();
                    } else {
                        break;
                    }
                }
                self.push(TokenKind::Number, text, line, column);
            } else if ch.is_alphabetic() || ch == '_' {
                let mut text = String::new();
                while let Some(c) = self.peek(0) {
                    if c.is_alphanumeric() || c == '_' {
                        text.push(c);
                        self.bump();
                    } else {
                        break;
                    }
                }
                self.push(TokenKind::Ident, text, line, column);
            } else if ch == '!' {
                self.bang(line, column);
            } else {
                let pair: String = [ch, self.peek(1).unwrap_or('\0')].iter().collect();
                if TWO_CHAR_OPS.contains(&pair.as_str()) {
                    self.bump();
                    self.bump();
                    self.push(TokenKind::Symbol, pair, line, column);
                } else {
                    self.bump();
                    self.push(TokenKind::Symbol, ch.to_string(), line, column);
                }
            }
        }
        Ok(())
    }

    /// `!=` is comparison, `!` glued to an operand is logical not,
    /// anything else terminates a statement. `!!` is a terminator
    /// followed by another `!`, never a double negation.
    fn bang(&mut self, line: usize, column: usize) {
        self.bump();
        match self.peek(0) {
            Some('=') => {
                self.bump();
                self.push(TokenKind::Symbol, "!=".to_string(), line, column);
            }
            Some(c) if c.is_alphanumeric() || c == '_' || c == '(' || c == '"' => {
                self.push(TokenKind::Symbol, "!".to_string(), line, column);
            }
            _ => self.push(TokenKind::Terminator, "!".to_string(), line, column),
        }
    }

    fn string_literal(&mut self, quote: char) -> Result<String, TranspileError> {
        let (line, column) = (self.line, self.column);
        let mut text = String::new();
        text.push(quote);
        self.bump();

        // Raw strings may span lines and have no escapes
        let raw = quote == '`';
        loop {
            let Some(c) = self.peek(0) else {
                return Err(TranspileError::syntax(
                    line,
                    column,
                    "unclosed string literal - missing closing quote",
                ));
            };
            if c == '\n' && !raw {
                return Err(TranspileError::syntax(
                    line,
                    column,
                    "unclosed string literal - missing closing quote",
                ));
            }
            text.push(c);
            self.bump();
            if c == '\\' && !raw {
                if let Some(escaped) = self.peek(0) {
                    text.push(escaped);
                    self.bump();
                }
            } else if c == quote {
                return Ok(text);
            }
        }
    }
}

//! Parser for Blaze syntax
//!
//! Syntax:
//! ```text
//! import net/http!
//! x <- 42!
//! let name = "Blaze"!
//! if x > 0 [
//!     println("positive")!
//! ] else [
//!     println("not positive")!
//! ]
//! func double(n int) int [
//!     return n * 2!
//! ]
//! try [
//!     response <- http::Get(url)!
//! ] catch err [
//!     println(err.Error())!
//! ]
//! ```

use crate::ast::{Expr, Function, Program, Statement};
use crate::error::TranspileError;
use crate::lexer::{Token, TokenKind, tokenize};

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    /// Tokenizer failure, reported by `parse`
    lex_error: Option<TranspileError>,
}

impl Parser {
    pub fn new(source: &str) -> Self {
        match tokenize(source) {
            Ok(tokens) => Parser {
                tokens,
                pos: 0,
                lex_error: None,
            },
            Err(e) => Parser {
                tokens: Vec::new(),
                pos: 0,
                lex_error: Some(e),
            },
        }
    }

    pub fn parse(&mut self) -> Result<Program, TranspileError> {
        if let Some(e) = self.lex_error.take() {
            return Err(e);
        }

        let mut program = Program::new();

        loop {
            self.skip_newlines();
            let Some(token) = self.peek() else {
                break;
            };

            if token.is_keyword("import") {
                let path = self.parse_import()?;
                program.add_import(path);
                continue;
            }

            if token.is_keyword("func") {
                let function = self.parse_function()?;
                program.functions.push(function);
                continue;
            }

            if token.is_symbol("]") {
                return Err(self.error_at(token, "unexpected `]` without an open block"));
            }

            let statement = self.parse_statement()?;
            program.statements.push(statement);
        }

        Ok(program)
    }

    /// `import net/http!` or `import "net/http"!`
    fn parse_import(&mut self) -> Result<String, TranspileError> {
        let keyword = self.advance_cloned()?;
        let tokens = self.statement_tokens(&keyword)?;

        let path = match tokens.as_slice() {
            [single] if single.kind == TokenKind::Str => {
                single.text.trim_matches(|c| c == '"' || c == '`').to_string()
            }
            _ => tokens.iter().map(|t| t.text.as_str()).collect(),
        };

        if path.is_empty() {
            return Err(self.error_at(&keyword, "expected a package path after `import`"));
        }
        Ok(path)
    }

    fn parse_function(&mut self) -> Result<Function, TranspileError> {
        let keyword = self.advance_cloned()?;
        let name = match self.advance() {
            Some(t) if t.kind == TokenKind::Ident => t.text.clone(),
            _ => return Err(self.error_at(&keyword, "expected function name after `func`")),
        };
        let signature = self.block_header(&keyword)?;
        let body = self.parse_block(&keyword)?;
        Ok(Function {
            name,
            signature,
            body,
        })
    }

    fn parse_statement(&mut self) -> Result<Statement, TranspileError> {
        let token = self.advance_cloned()?;

        if token.kind == TokenKind::Comment {
            return Ok(Statement::Comment(token.text));
        }

        if token.kind == TokenKind::Ident {
            match token.text.as_str() {
                "let" => return self.parse_let(&token),
                "return" => return Ok(Statement::Return(self.statement_tokens(&token)?)),
                "if" => return self.parse_if(&token),
                "for" => {
                    let header = self.block_header(&token)?;
                    let body = self.parse_block(&token)?;
                    return Ok(Statement::For { header, body });
                }
                "try" => return self.parse_try(&token),
                "else" => {
                    return Err(self.error_at(&token, "`else` without a preceding `if` block"));
                }
                "catch" => {
                    return Err(self.error_at(&token, "`catch` without a preceding `try` block"));
                }
                "func" => {
                    return Err(
                        self.error_at(&token, "`func` definitions are only allowed at top level")
                    );
                }
                "import" => {
                    return Err(self.error_at(&token, "`import` is only allowed at top level"));
                }
                _ => {}
            }
        }

        // Not a keyword: the token starts an expression statement
        self.pos -= 1;
        let tokens = self.statement_tokens(&token)?;

        match find_arrow(&tokens) {
            Some(0) => Err(self.error_at(&token, "expected a name before `<-`")),
            Some(i) if i + 1 == tokens.len() => {
                Err(self.error_at(&tokens[i], "expected a value after `<-`"))
            }
            Some(i) => Ok(Statement::Declare {
                targets: tokens[..i].to_vec(),
                value: tokens[i + 1..].to_vec(),
            }),
            None => Ok(Statement::Simple(tokens)),
        }
    }

    /// `let name = value!`
    fn parse_let(&mut self, keyword: &Token) -> Result<Statement, TranspileError> {
        let tokens = self.statement_tokens(keyword)?;
        let Some(eq) = tokens.iter().position(|t| t.is_symbol("=")) else {
            return Err(self.error_at(keyword, "expected `=` in `let` declaration"));
        };
        if eq == 0 {
            return Err(self.error_at(keyword, "expected a name after `let`"));
        }
        if eq + 1 == tokens.len() {
            return Err(self.error_at(&tokens[eq], "expected a value after `=`"));
        }
        Ok(Statement::Declare {
            targets: tokens[..eq].to_vec(),
            value: tokens[eq + 1..].to_vec(),
        })
    }

    fn parse_if(&mut self, keyword: &Token) -> Result<Statement, TranspileError> {
        let mut branches = Vec::new();
        let mut otherwise = None;

        let condition = self.block_header(keyword)?;
        if condition.is_empty() {
            return Err(self.error_at(keyword, "expected a condition after `if`"));
        }
        let body = self.parse_block(keyword)?;
        branches.push((condition, body));

        // `else` must follow the closing `]` on the same line
        while let Some(next) = self.peek().filter(|t| t.is_keyword("else")).cloned() {
            self.pos += 1;
            if let Some(if_token) = self.peek().filter(|t| t.is_keyword("if")).cloned() {
                self.pos += 1;
                let condition = self.block_header(&if_token)?;
                if condition.is_empty() {
                    return Err(self.error_at(&if_token, "expected a condition after `else if`"));
                }
                let body = self.parse_block(&if_token)?;
                branches.push((condition, body));
            } else {
                self.empty_block_header(&next)?;
                otherwise = Some(self.parse_block(&next)?);
                break;
            }
        }

        Ok(Statement::If {
            branches,
            otherwise,
        })
    }

    fn parse_try(&mut self, keyword: &Token) -> Result<Statement, TranspileError> {
        self.empty_block_header(keyword)?;
        let body = self.parse_block(keyword)?;

        let catch = match self.peek() {
            Some(t) if t.is_keyword("catch") => t.clone(),
            _ => return Err(self.error_at(keyword, "`try` block must be followed by `catch`")),
        };
        self.pos += 1;

        let error_name = match self.advance() {
            Some(t) if t.kind == TokenKind::Ident => t.text.clone(),
            _ => return Err(self.error_at(&catch, "expected an error name after `catch`")),
        };
        self.empty_block_header(&catch)?;
        let handler = self.parse_block(&catch)?;

        Ok(Statement::Try {
            body,
            error_name,
            handler,
        })
    }

    /// Parse statements up to and including the closing `]`.
    /// The opening `[` has already been consumed.
    fn parse_block(&mut self, opener: &Token) -> Result<Vec<Statement>, TranspileError> {
        let mut statements = Vec::new();
        loop {
            self.skip_newlines();
            match self.peek() {
                None => {
                    return Err(self.error_at(
                        opener,
                        format!("unclosed block opened by `{}`", opener.text),
                    ));
                }
                Some(t) if t.is_symbol("]") => {
                    self.pos += 1;
                    return Ok(statements);
                }
                Some(_) => statements.push(self.parse_statement()?),
            }
        }
    }

    /// Collect tokens up to the `[` that ends the line and opens a block.
    /// A `[` followed by anything else on the line is an index or a type.
    fn block_header(&mut self, opener: &Token) -> Result<Expr, TranspileError> {
        let mut header = Vec::new();
        let mut depth = 0usize;

        loop {
            let Some(token) = self.advance().cloned() else {
                return Err(self.expected_block(opener));
            };

            if depth == 0 && token.is_symbol("[") && self.at_line_end() {
                return Ok(header);
            }
            if depth == 0 && token.kind == TokenKind::Newline {
                return Err(self.expected_block(opener));
            }

            match token.kind {
                TokenKind::Newline | TokenKind::Comment => continue,
                TokenKind::Symbol if is_open(&token.text) => depth += 1,
                TokenKind::Symbol if is_close(&token.text) => depth = depth.saturating_sub(1),
                _ => {}
            }
            header.push(token);
        }
    }

    fn empty_block_header(&mut self, opener: &Token) -> Result<(), TranspileError> {
        let header = self.block_header(opener)?;
        match header.first() {
            Some(extra) => Err(self.error_at(
                extra,
                format!("unexpected `{}` after `{}`", extra.text, opener.text),
            )),
            None => Ok(()),
        }
    }

    /// Collect the tokens of one statement and consume its `!`.
    /// Newlines inside brackets continue the statement.
    fn statement_tokens(&mut self, start: &Token) -> Result<Expr, TranspileError> {
        let mut tokens = Vec::new();
        let mut depth = 0usize;

        loop {
            let token = match self.peek() {
                Some(t) => t.clone(),
                None => return Err(self.missing_terminator(start, tokens.last())),
            };

            match token.kind {
                TokenKind::Terminator if depth == 0 => {
                    self.pos += 1;
                    if tokens.is_empty() && !start.is_keyword("return") {
                        return Err(self.error_at(&token, "empty statement before `!`"));
                    }
                    return Ok(tokens);
                }
                TokenKind::Newline if depth == 0 => {
                    return Err(self.missing_terminator(start, tokens.last()));
                }
                TokenKind::Symbol if depth == 0 && token.text == "]" => {
                    return Err(self.missing_terminator(start, tokens.last()));
                }
                TokenKind::Newline | TokenKind::Comment => {}
                TokenKind::Symbol if is_open(&token.text) => {
                    depth += 1;
                    tokens.push(token);
                }
                TokenKind::Symbol if is_close(&token.text) => {
                    depth = depth.saturating_sub(1);
                    tokens.push(token);
                }
                _ => tokens.push(token),
            }
            self.pos += 1;
        }
    }

    fn at_line_end(&self) -> bool {
        matches!(
            self.peek().map(|t| t.kind),
            None | Some(TokenKind::Newline) | Some(TokenKind::Comment)
        )
    }

    fn skip_newlines(&mut self) {
        while self
            .peek()
            .is_some_and(|t| t.kind == TokenKind::Newline)
        {
            self.pos += 1;
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<&Token> {
        let token = self.tokens.get(self.pos);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn advance_cloned(&mut self) -> Result<Token, TranspileError> {
        self.advance()
            .cloned()
            .ok_or_else(|| TranspileError::syntax(0, 0, "unexpected end of input"))
    }

    fn error_at(&self, token: &Token, message: impl Into<String>) -> TranspileError {
        TranspileError::syntax(token.line, token.column, message)
    }

    fn expected_block(&self, opener: &Token) -> TranspileError {
        self.error_at(
            opener,
            format!("expected `[` at end of line to open `{}` block", opener.text),
        )
    }

    fn missing_terminator(&self, start: &Token, last: Option<&Token>) -> TranspileError {
        let at = last.unwrap_or(start);
        TranspileError::syntax(
            at.line,
            at.column + at.text.chars().count(),
            "missing `!` at end of statement",
        )
    }
}

fn is_open(text: &str) -> bool {
    matches!(text, "(" | "[" | "{")
}

fn is_close(text: &str) -> bool {
    matches!(text, ")" | "]" | "}")
}

/// Position of a top-level `<-` in a statement
fn find_arrow(tokens: &[Token]) -> Option<usize> {
    let mut depth = 0usize;
    for (i, token) in tokens.iter().enumerate() {
        if token.kind != TokenKind::Symbol {
            continue;
        }
        match token.text.as_str() {
            "<-" if depth == 0 => return Some(i),
            t if is_open(t) => depth += 1,
            t if is_close(t) => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    None
}

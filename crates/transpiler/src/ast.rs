//! Abstract Syntax Tree for Blaze
//!
//! Expressions are not parsed into trees: Blaze expressions are Go
//! expressions with a few spelling differences, so they are kept as token
//! runs and rewritten during code generation.

use crate::lexer::Token;

/// A run of expression tokens, rendered by the code generator
pub type Expr = Vec<Token>;

#[derive(Debug, Clone, Default)]
pub struct Program {
    /// Import paths in source order, duplicates removed
    pub imports: Vec<String>,
    /// Top-level `func` definitions
    pub functions: Vec<Function>,
    /// Statements outside any function, run from `main`
    pub statements: Vec<Statement>,
}

impl Program {
    pub fn new() -> Self {
        Program::default()
    }

    pub fn add_import(&mut self, path: String) {
        if !self.imports.contains(&path) {
            self.imports.push(path);
        }
    }

    pub fn find_function(&self, name: &str) -> Option<&Function> {
        self.functions.iter().find(|f| f.name == name)
    }
}

#[derive(Debug, Clone)]
pub struct Function {
    pub name: String,
    /// Everything between the name and the opening `[`: parameters and results
    pub signature: Expr,
    pub body: Vec<Statement>,
}

#[derive(Debug, Clone)]
pub enum Statement {
    Comment(String),

    /// `x <- value!`, `a, b <- value!` or `let x = value!`
    Declare { targets: Expr, value: Expr },

    /// Assignments, increments and calls, emitted verbatim
    Simple(Expr),

    Return(Expr),

    If {
        /// `if` and `else if` arms in order
        branches: Vec<(Expr, Vec<Statement>)>,
        otherwise: Option<Vec<Statement>>,
    },

    For { header: Expr, body: Vec<Statement> },

    /// `try [ ... ] catch err [ ... ]`
    Try {
        body: Vec<Statement>,
        error_name: String,
        handler: Vec<Statement>,
    },
}

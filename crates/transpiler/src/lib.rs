//! Blaze Transpiler Library
//!
//! Translates Blaze source into a single Go `package main` file.
//!
//! ```rust,ignore
//! use blaze_transpiler::Transpiler;
//!
//! let go = Transpiler::new("println(\"Hello, Blaze!\")!").transpile()?;
//! ```

pub mod ast;
pub mod codegen;
pub mod error;
pub mod lexer;
pub mod parser;

pub use ast::Program;
pub use codegen::CodeGen;
pub use error::TranspileError;
pub use parser::Parser;

/// A transpiler bound to one source text
#[derive(Debug, Clone)]
pub struct Transpiler {
    source: String,
}

impl Transpiler {
    pub fn new(source: impl Into<String>) -> Self {
        Transpiler {
            source: source.into(),
        }
    }

    /// Produce the Go program for this source
    pub fn transpile(&self) -> Result<String, TranspileError> {
        transpile(&self.source)
    }
}

/// Transpile Blaze source to Go source
pub fn transpile(source: &str) -> Result<String, TranspileError> {
    let mut parser = Parser::new(source);
    let program = parser.parse()?;

    let mut codegen = CodeGen::new();
    codegen.codegen_program(&program)
}

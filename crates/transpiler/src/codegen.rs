//! Go Code Generation via Text
//!
//! Emits a single `package main` file. Top-level `func` definitions become
//! Go functions; all other top-level statements go into `func main()`
//! unless the program defines `main` itself.
//!
//! # Try/Catch Strategy
//!
//! Go has no exceptions, so a `try` block becomes an immediately invoked
//! closure. Inside it every declaration whose value is a call is treated
//! as fallible:
//!
//! ```text
//! response <- http::Get(url)!      response, err := http.Get(url)
//!                             ==>  if err != nil {
//!                                      <catch body>
//!                                      return
//!                                  }
//! ```
//!
//! The `return` leaves the closure, skipping the rest of the try block.

use crate::ast::{Expr, Function, Program, Statement};
use crate::error::TranspileError;
use crate::lexer::{Token, TokenKind};
use std::fmt::Write as _;

/// Blaze print builtins and the `fmt` function each maps to
const PRINT_BUILTINS: &[(&str, &str)] = &[
    ("print", "fmt.Print"),
    ("println", "fmt.Println"),
    ("printf", "fmt.Printf"),
];

/// An enclosing `try` block: the error name and its catch body
struct TryFrame {
    error_name: String,
    handler: Vec<Statement>,
}

#[derive(Default)]
pub struct CodeGen {
    output: String,
    indent: usize,
    uses_fmt: bool,
    try_frames: Vec<TryFrame>,
}

impl CodeGen {
    pub fn new() -> Self {
        CodeGen::default()
    }

    /// Generate Go source for an entire program
    pub fn codegen_program(&mut self, program: &Program) -> Result<String, TranspileError> {
        let explicit_main = program.find_function("main").is_some();
        let loose_code = program
            .statements
            .iter()
            .find(|s| !matches!(s, Statement::Comment(_)));

        if explicit_main && loose_code.is_some() {
            return Err(TranspileError::syntax(
                0,
                0,
                "top-level statements cannot be combined with an explicit `func main`",
            ));
        }

        for function in &program.functions {
            self.codegen_function(function)?;
            writeln!(self.output)?;
        }

        if explicit_main {
            // Only comments can remain at top level; keep them above the functions
            let mut comments = String::new();
            for statement in &program.statements {
                if let Statement::Comment(text) = statement {
                    writeln!(comments, "{}", text)?;
                }
            }
            self.output.insert_str(0, &comments);
        } else {
            writeln!(self.output, "func main() {{")?;
            self.indent += 1;
            self.codegen_block(&program.statements)?;
            self.indent -= 1;
            writeln!(self.output, "}}")?;
        }

        // Assemble final Go source
        let mut imports: Vec<&str> = program.imports.iter().map(String::as_str).collect();
        if self.uses_fmt && !imports.contains(&"fmt") {
            imports.push("fmt");
        }
        imports.sort_unstable();

        let mut go = String::new();
        writeln!(go, "package main")?;
        writeln!(go)?;
        if !imports.is_empty() {
            writeln!(go, "import (")?;
            for import in imports {
                writeln!(go, "\t\"{}\"", import)?;
            }
            writeln!(go, ")")?;
            writeln!(go)?;
        }
        go.push_str(self.output.trim_end_matches('\n'));
        go.push('\n');
        Ok(go)
    }

    fn codegen_function(&mut self, function: &Function) -> Result<(), TranspileError> {
        let signature = self.render(&function.signature);
        let signature = if signature.is_empty() {
            "()".to_string()
        } else {
            signature
        };
        writeln!(self.output, "func {}{} {{", function.name, signature)?;
        self.indent += 1;
        self.codegen_block(&function.body)?;
        self.indent -= 1;
        writeln!(self.output, "}}")?;
        Ok(())
    }

    fn codegen_block(&mut self, statements: &[Statement]) -> Result<(), TranspileError> {
        for statement in statements {
            self.codegen_statement(statement)?;
        }
        Ok(())
    }

    fn codegen_statement(&mut self, statement: &Statement) -> Result<(), TranspileError> {
        match statement {
            Statement::Comment(text) => self.line(text),
            Statement::Declare { targets, value } => self.codegen_declare(targets, value),
            Statement::Simple(expr) => {
                let text = self.render(expr);
                self.line(&text)
            }
            Statement::Return(expr) => {
                if expr.is_empty() {
                    self.line("return")
                } else {
                    let text = format!("return {}", self.render(expr));
                    self.line(&text)
                }
            }
            Statement::If {
                branches,
                otherwise,
            } => {
                for (i, (condition, body)) in branches.iter().enumerate() {
                    let condition = self.render(condition);
                    if i == 0 {
                        self.line(&format!("if {} {{", condition))?;
                    } else {
                        self.line(&format!("}} else if {} {{", condition))?;
                    }
                    self.nested(body)?;
                }
                if let Some(body) = otherwise {
                    self.line("} else {")?;
                    self.nested(body)?;
                }
                self.line("}")
            }
            Statement::For { header, body } => {
                if header.is_empty() {
                    self.line("for {")?;
                } else {
                    let header = self.render(header);
                    self.line(&format!("for {} {{", header))?;
                }
                self.nested(body)?;
                self.line("}")
            }
            Statement::Try {
                body,
                error_name,
                handler,
            } => {
                self.line("func() {")?;
                self.try_frames.push(TryFrame {
                    error_name: error_name.clone(),
                    handler: handler.clone(),
                });
                let result = self.nested(body);
                self.try_frames.pop();
                result?;
                self.line("}()")
            }
        }
    }

    fn codegen_declare(&mut self, targets: &Expr, value: &Expr) -> Result<(), TranspileError> {
        let targets_text = self.render(targets);
        let value_text = self.render(value);

        let fallible = value.last().is_some_and(|t| t.is_symbol(")"));
        let frame = if fallible { self.try_frames.pop() } else { None };

        if let Some(frame) = frame {
            let result = self.codegen_checked_declare(&frame, &targets_text, &value_text);
            self.try_frames.push(frame);
            result
        } else {
            self.line(&format!("{} := {}", targets_text, value_text))
        }
    }

    /// Emit a declaration that routes a non-nil error to the catch body.
    /// The frame is popped while its handler is emitted, so a fallible call
    /// inside the handler is checked by the next enclosing `try` instead.
    fn codegen_checked_declare(
        &mut self,
        frame: &TryFrame,
        targets: &str,
        value: &str,
    ) -> Result<(), TranspileError> {
        let error_name = &frame.error_name;
        self.line(&format!("{}, {} := {}", targets, error_name, value))?;
        self.line(&format!("if {} != nil {{", error_name))?;
        self.indent += 1;
        self.codegen_block(&frame.handler)?;
        self.line("return")?;
        self.indent -= 1;
        self.line("}")
    }

    fn nested(&mut self, body: &[Statement]) -> Result<(), TranspileError> {
        self.indent += 1;
        let result = self.codegen_block(body);
        self.indent -= 1;
        result
    }

    fn line(&mut self, text: &str) -> Result<(), TranspileError> {
        for _ in 0..self.indent {
            self.output.push('\t');
        }
        writeln!(self.output, "{}", text)?;
        Ok(())
    }

    /// Render an expression, rewriting `::` paths and print builtins
    fn render(&mut self, expr: &[Token]) -> String {
        let mut out = String::new();
        for (i, token) in expr.iter().enumerate() {
            if i > 0 && token.space_before {
                out.push(' ');
            }

            if token.is_symbol("::") {
                out.push('.');
                continue;
            }

            if token.kind == TokenKind::Ident {
                let qualified = i > 0 && (expr[i - 1].is_symbol("::") || expr[i - 1].is_symbol("."));
                let called = expr.get(i + 1).is_some_and(|t| t.is_symbol("("));
                let builtin = PRINT_BUILTINS.iter().find(|(name, _)| *name == token.text);
                if let Some((_, go_name)) = builtin.filter(|_| called && !qualified) {
                    self.uses_fmt = true;
                    out.push_str(go_name);
                    continue;
                }
            }

            out.push_str(&token.text);
        }
        out
    }
}

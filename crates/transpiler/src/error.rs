//! Transpiler error types.

/// Error type for transpilation.
///
/// Syntax errors carry a 0-indexed position that is displayed 1-indexed.
/// Formatting errors come from writing Go source into the output buffer.
#[derive(Debug)]
pub enum TranspileError {
    Syntax {
        line: usize,
        column: usize,
        message: String,
    },
    Format(std::fmt::Error),
}

impl TranspileError {
    pub fn syntax(line: usize, column: usize, message: impl Into<String>) -> Self {
        TranspileError::Syntax {
            line,
            column,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for TranspileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TranspileError::Syntax {
                line,
                column,
                message,
            } => write!(f, "line {}, column {}: {}", line + 1, column + 1, message),
            TranspileError::Format(e) => write!(f, "Go generation error: {}", e),
        }
    }
}

impl std::error::Error for TranspileError {}

impl From<std::fmt::Error> for TranspileError {
    fn from(e: std::fmt::Error) -> Self {
        TranspileError::Format(e)
    }
}

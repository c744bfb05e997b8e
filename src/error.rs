use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("io error: {0}")]
    IO(#[from] std::io::Error),
    #[error("line {line}, column {column}: {reason}")]
    Lex {
        line: usize,
        column: usize,
        reason: String,
    },
    #[error("expected {expected}, found {found}")]
    MissingToken {
        expected: &'static str,
        found: String,
    },
    #[error("missing closing ')', found {found}")]
    UnbalancedParen { found: String },
    #[error("unexpected {found}")]
    UnexpectedToken { found: String },
    #[error("undefined variable: {name}")]
    UndefinedVariable { name: String },
    #[error("division by zero")]
    DivisionByZero,
    #[error("unsupported operand types for '{operator}': {left} and {right}")]
    TypeMismatch {
        operator: &'static str,
        left: &'static str,
        right: &'static str,
    },
    #[error("'{keyword}' is reserved but cannot be executed yet")]
    NotImplemented { keyword: &'static str },
    #[error("runtime error: {message}")]
    Runtime { message: String },
    #[error("{}", .messages.join("; "))]
    Aggregate { messages: Vec<String> },
}

pub type Result<T> = std::result::Result<T, Error>;

pub fn runtime_error<T>(message: impl Into<String>) -> Result<T> {
    Err(Error::Runtime {
        message: message.into(),
    })
}

// ABOUTME: Error types for evaluation failures in the Scheme interpreter
//! A flat error taxonomy: one enum, one variant per failure kind, each
//! carrying enough to build a useful top-level message. Everything below
//! `InputError` is propagated as `Result`; `InputError` is fatal and the
//! driver exits the process on it, matching the reference reader's
//! behavior of exiting immediately on an unprintable byte.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum EvalError {
    #[error("read error: {message}")]
    ReadError { message: String },

    #[error("syntax error: {message}")]
    SyntaxError { message: String },

    #[error("unbound variable: {name}")]
    UnboundVariable { name: String },

    #[error("type error: {message}")]
    TypeError { message: String },

    #[error("arity error: {function} expected {expected}, got {actual}")]
    ArityError {
        function: String,
        expected: String,
        actual: usize,
    },

    #[error("input error: unexpected byte 0x{byte:02x}")]
    InputError { byte: u8 },
}

impl EvalError {
    pub fn read<S: Into<String>>(message: S) -> Self {
        EvalError::ReadError {
            message: message.into(),
        }
    }

    pub fn syntax<S: Into<String>>(message: S) -> Self {
        EvalError::SyntaxError {
            message: message.into(),
        }
    }

    pub fn type_error<S: Into<String>>(message: S) -> Self {
        EvalError::TypeError {
            message: message.into(),
        }
    }

    pub fn arity<S: Into<String>>(function: S, expected: S, actual: usize) -> Self {
        EvalError::ArityError {
            function: function.into(),
            expected: expected.into(),
            actual,
        }
    }
}

use thiserror::Error;

use crate::header::HeaderError;

#[derive(Debug, Error)]
pub enum DavisError {
    #[error("I/O error: {0}")]
    Open(#[source] std::io::Error),
    #[error("file too short for header: need {needed} bytes, got {actual}")]
    HeaderTooShort { needed: usize, actual: usize },
    #[error("header parse error: {0}")]
    Header(#[from] HeaderError),
    #[error("unsupported {context}: {value}")]
    Unsupported { context: &'static str, value: i32 },
    #[error("truncated {context}: need {needed} bytes, got {actual}")]
    Truncated {
        context: &'static str,
        needed: usize,
        actual: usize,
    },
    #[error("corrupt {context}: {message}")]
    Corrupt {
        context: &'static str,
        message: String,
    },
    #[error("cannot allocate {bytes} bytes")]
    Allocation { bytes: usize },
}

use thiserror::Error;

/// The only failure a domain parse can produce.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid syntax at offset {offset}: {message}")]
pub struct SyntaxError {
    pub offset: usize,
    pub message: String,
}

impl SyntaxError {
    pub fn new(offset: usize, message: impl Into<String>) -> Self {
        Self {
            offset,
            message: message.into(),
        }
    }
}

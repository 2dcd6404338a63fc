// Error type shared by the document core, the persistence layer and settings.

use log::warn;
use std::fmt;

use crate::richtext::structured_document::BlockKey;

/// Result of an editing or persistence operation
pub type Result<T> = std::result::Result<T, EditError>;

/// Errors that can occur while editing, loading or saving a document
#[derive(Debug, Clone, PartialEq)]
pub enum EditError {
    /// Offsets outside the block's text, or an inverted range
    Range {
        block: BlockKey,
        start: usize,
        end: usize,
        len: usize,
    },
    /// The operation needs a collapsed selection but got a range
    InvalidSelection,
    /// No block with this key exists in the document
    UnknownBlock(BlockKey),
    /// Persisted data failed structural validation
    Format(String),
    /// The persistence medium failed to read or write
    Store(String),
}

impl EditError {
    pub fn format(message: impl Into<String>) -> Self {
        EditError::Format(message.into())
    }

    pub fn store(message: impl Into<String>) -> Self {
        EditError::Store(message.into())
    }
}

impl fmt::Display for EditError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditError::Range {
                block,
                start,
                end,
                len,
            } => write!(
                f,
                "range {}..{} is invalid for block {} of length {}",
                start, end, block, len
            ),
            EditError::InvalidSelection => write!(f, "operation requires a collapsed selection"),
            EditError::UnknownBlock(key) => write!(f, "no block with key {}", key),
            EditError::Format(msg) => write!(f, "invalid document format: {}", msg),
            EditError::Store(msg) => write!(f, "store failure: {}", msg),
        }
    }
}

impl std::error::Error for EditError {}

impl From<serde_json::Error> for EditError {
    fn from(err: serde_json::Error) -> Self {
        EditError::Format(err.to_string())
    }
}

/// Extension trait for graceful degradation on recoverable failures.
pub trait ResultExt<T> {
    /// Log the error at warning level and return `default` instead.
    fn unwrap_or_warn_default(self, default: T, context: &str) -> T;
}

impl<T> ResultExt<T> for Result<T> {
    fn unwrap_or_warn_default(self, default: T, context: &str) -> T {
        match self {
            Ok(value) => value,
            Err(err) => {
                warn!("{}: {}. Using default.", context, err);
                default
            }
        }
    }
}

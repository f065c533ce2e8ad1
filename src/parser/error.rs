//! Parse errors

use super::command::HandlerError;
use super::location::Location;

/// Error type for a parse call. Every variant aborts the parse.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// The input violates the command grammar
    #[error("Expected {expected} at {location}")]
    Syntax { expected: String, location: Location },

    /// The underlying reader failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A handler callback returned an error
    #[error("Handler failed at {location}: {source}")]
    Handler {
        #[source]
        source: HandlerError,
        location: Location,
    },

    #[error("Buffer size must be at least 1, got {size}")]
    InvalidBufferSize { size: usize },
}

impl ParseError {
    pub(crate) fn expected(expected: impl Into<String>, location: Location) -> Self {
        ParseError::Syntax {
            expected: expected.into(),
            location,
        }
    }

    /// Where the error was detected, if it is tied to a stream position
    pub fn location(&self) -> Option<Location> {
        match self {
            ParseError::Syntax { location, .. } | ParseError::Handler { location, .. } => {
                Some(*location)
            }
            ParseError::Io(_) | ParseError::InvalidBufferSize { .. } => None,
        }
    }

    /// Whether the error was caused by malformed input
    pub fn is_syntax(&self) -> bool {
        matches!(self, ParseError::Syntax { .. })
    }
}

// Error types for metadata parsing

use thiserror::Error;

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the parse entry points
#[derive(Debug, Error)]
pub enum Error {
    /// No parser could be resolved for the extension, MIME type or content
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// A parser rejected the input; the message is passed through as-is
    #[error("{0}")]
    Decode(String),

    /// The byte source failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Closing the tokenizer failed. `original` holds the failure that was
    /// being propagated when close was attempted, if any.
    #[error("Failed to release tokenizer: {source}{}", after_failure(.original))]
    ResourceRelease {
        #[source]
        source: std::io::Error,
        original: Option<Box<Error>>,
    },
}

fn after_failure(original: &Option<Box<Error>>) -> String {
    match original {
        Some(original) => format!(" (after: {})", original),
        None => String::new(),
    }
}

impl Error {
    /// Create a decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Error::Decode(message.into())
    }

    /// Create an unsupported-format error
    pub fn unsupported(what: impl Into<String>) -> Self {
        Error::UnsupportedFormat(what.into())
    }

    /// True for `UnsupportedFormat`
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Error::UnsupportedFormat(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_message_is_verbatim() {
        let err = Error::decode("Invalid FLAC preamble");
        assert_eq!(err.to_string(), "Invalid FLAC preamble");
    }

    #[test]
    fn test_unsupported_names_the_input() {
        let err = Error::unsupported("extension: .xyz");
        assert!(err.is_unsupported());
        assert!(err.to_string().contains(".xyz"));
    }

    #[test]
    fn test_release_keeps_original() {
        let err = Error::ResourceRelease {
            source: std::io::Error::other("close failed"),
            original: Some(Box::new(Error::decode("bad block"))),
        };
        assert_eq!(
            err.to_string(),
            "Failed to release tokenizer: close failed (after: bad block)"
        );
        match err {
            Error::ResourceRelease { original: Some(orig), .. } => {
                assert_eq!(orig.to_string(), "bad block")
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_release_without_original() {
        let err = Error::ResourceRelease {
            source: std::io::Error::other("close failed"),
            original: None,
        };
        assert_eq!(err.to_string(), "Failed to release tokenizer: close failed");
    }
}

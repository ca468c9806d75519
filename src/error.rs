//! Error types for the PDF library.
//!
//! Every fallible operation in the crate returns [`Result`]. Errors are never
//! turned into null values; the only tolerated failure is a `def` with a
//! non-name key inside the interpreter, which is logged and skipped.

use crate::object::ObjectRef;

/// Result type alias for PDF library operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during PDF processing.
#[derive(Debug, thiserror::Error)]
#[allow(clippy::enum_variant_names)]
pub enum Error {
    /// Malformed input at a byte offset (bad number, non-name dictionary key,
    /// unexpected keyword inside an object, nesting too deep)
    #[error("Syntax error at byte {offset}: {reason}")]
    Syntax {
        /// Byte offset where the error occurred
        offset: usize,
        /// Reason for the failure
        reason: String,
    },

    /// Input ended inside an object or where end of input is not allowed
    #[error("End of file reached unexpectedly")]
    UnexpectedEof,

    /// An indirect reference could not be resolved
    #[error("Cannot resolve {reference}: {reason}")]
    Reference {
        /// The reference being resolved
        reference: ObjectRef,
        /// Why resolution failed
        reason: String,
    },

    /// Interpreter program is neither a stream nor an array of streams
    #[error("Program must be a stream or an array of streams, found {0}")]
    NotStreamOrArray(&'static str),

    /// `currentdict` with no open dictionary
    #[error("currentdict: no open dictionary")]
    NoCurrentDict,

    /// `begin` applied to something that is not a dictionary
    #[error("begin: expected a dictionary, found {0}")]
    BeginOnNonDict(&'static str),

    /// `end` with no open dictionary
    #[error("end: no open dictionary")]
    UnbalancedEnd,

    /// `def` with no open dictionary
    #[error("def: no open dictionary")]
    DefWithoutOpenDict,

    /// Sequential reader asked for an offset other than its current position
    #[error("Non-sequential read: expected offset {expected}, got {actual}")]
    NonSequentialRead {
        /// Current position of the reader
        expected: u64,
        /// Requested offset
        actual: u64,
    },

    /// An object's resolution re-entered itself
    #[error("Cyclic reference detected: object {0}")]
    CyclicReference(ObjectRef),

    /// Recursion depth limit exceeded
    #[error("Recursion depth limit exceeded (max: {0})")]
    RecursionLimitExceeded(u32),

    /// Second push-back without an intervening read
    #[error("Push-back slot already occupied")]
    PushBackOccupied,

    /// Invalid PDF header (expected '%PDF-')
    #[error("Invalid PDF header: expected '%PDF-', found '{0}'")]
    InvalidHeader(String),

    /// Invalid cross-reference table
    #[error("Invalid cross-reference table")]
    InvalidXref,

    /// Invalid PDF structure
    #[error("Invalid PDF: {0}")]
    InvalidPdf(String),

    /// Object has wrong type
    #[error("Invalid object type: expected {expected}, found {found}")]
    InvalidObjectType {
        /// Expected object type
        expected: String,
        /// Actual object type found
        found: String,
    },

    /// Stream decoding error
    #[error("Stream decoding error: {0}")]
    Decode(String),

    /// Unsupported stream filter
    #[error("Unsupported filter: {0}")]
    UnsupportedFilter(String),

    /// Malformed CMap program
    #[error("CMap error: {0}")]
    CMap(String),

    /// Unsupported feature
    #[error("Unsupported feature: {0}")]
    Unsupported(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Shorthand for a [`Error::Syntax`] at `offset`.
    pub fn syntax(offset: usize, reason: impl Into<String>) -> Self {
        Error::Syntax {
            offset,
            reason: reason.into(),
        }
    }

    /// Shorthand for a [`Error::Reference`] on `reference`.
    pub fn reference(reference: ObjectRef, reason: impl Into<String>) -> Self {
        Error::Reference {
            reference,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syntax_error() {
        let err = Error::syntax(1234, "malformed number");
        let msg = format!("{}", err);
        assert!(msg.contains("1234"));
        assert!(msg.contains("malformed number"));
    }

    #[test]
    fn test_reference_error_names_object() {
        let err = Error::reference(ObjectRef::new(10, 0), "not in xref");
        let msg = format!("{}", err);
        assert!(msg.contains("10 0 R"));
        assert!(msg.contains("not in xref"));
    }

    #[test]
    fn test_cyclic_reference_error() {
        let err = Error::CyclicReference(ObjectRef::new(7, 0));
        assert!(format!("{}", err).contains("7 0 R"));
    }

    #[test]
    fn test_interpreter_errors() {
        assert!(format!("{}", Error::BeginOnNonDict("Integer")).contains("Integer"));
        assert!(format!("{}", Error::NotStreamOrArray("Name")).contains("Name"));
        assert!(format!("{}", Error::UnbalancedEnd).contains("end"));
        assert!(format!("{}", Error::DefWithoutOpenDict).contains("def"));
    }

    #[test]
    fn test_non_sequential_read_error() {
        let err = Error::NonSequentialRead {
            expected: 10,
            actual: 4,
        };
        let msg = format!("{}", err);
        assert!(msg.contains("10"));
        assert!(msg.contains('4'));
    }

    #[test]
    fn test_invalid_object_type_error() {
        let err = Error::InvalidObjectType {
            expected: "Dictionary".to_string(),
            found: "Array".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("Dictionary"));
        assert!(msg.contains("Array"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Error>();
    }
}

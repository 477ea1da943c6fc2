//! Error types for PLY reading and writing.
//!
//! Every failure aborts the current read or write call. Errors raised while
//! decoding carry enough position information to find the offending input:
//!
//! - **Header errors** carry the 1-based header line number and the line text
//! - **Ascii data errors** carry the 1-based line number in the file
//! - **Binary data errors** carry the byte offset from the start of the stream
//!
//! ## Error Categories
//!
//! - [`Error::HeaderSyntax`]: malformed magic, format, element or property line
//! - [`Error::UnexpectedEof`]: the stream ended before the header terminator,
//!   before the declared row count, or inside a binary segment
//! - [`Error::DataFormat`]: wrong token count, unparsable literal, or trailing
//!   data after the last declared element
//! - [`Error::InvalidElementName`], [`Error::InvalidPropertyName`],
//!   [`Error::InvalidType`], [`Error::SchemaMismatch`]: caller data that cannot
//!   be written
//!
//! ## Examples
//!
//! ```rust
//! use plyformat::{read_document, Error};
//!
//! let result = read_document("pl\nformat ascii 1.0\nend_header\n".as_bytes());
//! match result {
//!     Err(Error::HeaderSyntax { line, .. }) => assert_eq!(line, 1),
//!     other => panic!("unexpected result: {:?}", other),
//! }
//! ```

use std::fmt;
use std::io;
use thiserror::Error;

/// Where in the input an error was detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    /// 1-based line number (header and ascii data).
    Line(usize),
    /// Byte offset from the start of the stream (binary data).
    Offset(u64),
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Line(line) => write!(f, "line {}", line),
            Location::Offset(offset) => write!(f, "byte offset {}", offset),
        }
    }
}

/// Represents all possible errors that can occur while reading or writing PLY data.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// IO error during reading or writing
    #[error("IO error: {0}")]
    Io(String),

    /// Malformed header line
    #[error("Header syntax error at line {line}: {msg}\n  {context}")]
    HeaderSyntax {
        line: usize,
        msg: String,
        context: String,
    },

    /// The stream ended before the data it declared
    #[error("Unexpected end of input at {location}: expected {expected}")]
    UnexpectedEof { location: Location, expected: String },

    /// Malformed element data
    #[error("Data format error at {location}: {msg}")]
    DataFormat { location: Location, msg: String },

    /// Element name that is reserved or not a valid identifier
    #[error("Invalid element name '{0}'")]
    InvalidElementName(String),

    /// Property name that is duplicated or not a valid identifier
    #[error("Invalid property name '{0}'")]
    InvalidPropertyName(String),

    /// In-memory kind with no wire equivalent
    #[error("Invalid type for property '{property}': {msg}")]
    InvalidType { property: String, msg: String },

    /// Row shape that does not match the element's declarations
    #[error("Row {row} does not match the element schema: {msg}")]
    SchemaMismatch { row: usize, msg: String },
}

impl Error {
    /// Creates a header syntax error for the given header line.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use plyformat::Error;
    ///
    /// let err = Error::header_syntax(2, "unknown format", "format asci 1.0");
    /// assert!(err.to_string().contains("line 2"));
    /// assert!(err.to_string().contains("format asci 1.0"));
    /// ```
    pub fn header_syntax(line: usize, msg: &str, context: &str) -> Self {
        Error::HeaderSyntax {
            line,
            msg: msg.to_string(),
            context: context.to_string(),
        }
    }

    /// Creates an unexpected end-of-input error.
    pub fn unexpected_eof(location: Location, expected: &str) -> Self {
        Error::UnexpectedEof {
            location,
            expected: expected.to_string(),
        }
    }

    /// Creates a data format error.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use plyformat::{Error, Location};
    ///
    /// let err = Error::data_format(Location::Offset(12), "trailing data");
    /// assert!(err.to_string().contains("byte offset 12"));
    /// ```
    pub fn data_format<T: fmt::Display>(location: Location, msg: T) -> Self {
        Error::DataFormat {
            location,
            msg: msg.to_string(),
        }
    }

    /// Creates an invalid type error for a named property.
    pub fn invalid_type(property: &str, msg: &str) -> Self {
        Error::InvalidType {
            property: property.to_string(),
            msg: msg.to_string(),
        }
    }

    /// Creates a schema mismatch error for a row index.
    pub fn schema_mismatch<T: fmt::Display>(row: usize, msg: T) -> Self {
        Error::SchemaMismatch {
            row,
            msg: msg.to_string(),
        }
    }

    /// Creates an I/O error for failures of the underlying stream.
    pub fn io(msg: &str) -> Self {
        Error::Io(msg.to_string())
    }

    /// Returns `true` for [`Error::HeaderSyntax`].
    #[must_use]
    pub fn is_header_syntax(&self) -> bool {
        matches!(self, Error::HeaderSyntax { .. })
    }

    /// Returns `true` for [`Error::UnexpectedEof`].
    #[must_use]
    pub fn is_unexpected_eof(&self) -> bool {
        matches!(self, Error::UnexpectedEof { .. })
    }

    /// Returns `true` for [`Error::DataFormat`].
    #[must_use]
    pub fn is_data_format(&self) -> bool {
        matches!(self, Error::DataFormat { .. })
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

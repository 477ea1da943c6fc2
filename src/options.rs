//! Configuration options for writing PLY data.
//!
//! [`WriteOptions`] selects the data encoding, the header comments and how
//! floats are printed in ascii files.
//!
//! ## Examples
//!
//! ```rust
//! use plyformat::{Encoding, WriteOptions};
//!
//! // Binary little endian with a comment line
//! let options = WriteOptions::binary_little_endian().with_comment("made by hand");
//! assert_eq!(options.encoding, Encoding::BinaryLittleEndian);
//!
//! // Flags in the style of `binary=True, big_endian=True`
//! let options = WriteOptions::new().with_binary(true).with_big_endian(true);
//! assert_eq!(options.encoding, Encoding::BinaryBigEndian);
//!
//! // Ascii with lossless float output
//! let options = WriteOptions::ascii().with_float_precision(None);
//! ```

use crate::Encoding;

/// Significant digits used for ascii floats unless configured otherwise.
pub const DEFAULT_FLOAT_PRECISION: usize = 6;

/// Configuration options for PLY writing.
///
/// # Examples
///
/// ```rust
/// use plyformat::WriteOptions;
///
/// let options = WriteOptions::new();
/// assert!(!options.encoding.is_binary());
/// assert_eq!(options.float_precision, Some(6));
/// assert!(options.comments.is_empty());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct WriteOptions {
    pub encoding: Encoding,
    /// Free text; every non-empty line becomes a `comment` header line.
    pub comments: String,
    /// Significant digits for ascii floats (`%g` style). `None` writes the
    /// shortest text that reads back to the same value.
    pub float_precision: Option<usize>,
}

impl Default for WriteOptions {
    fn default() -> Self {
        WriteOptions {
            encoding: Encoding::Ascii,
            comments: String::new(),
            float_precision: Some(DEFAULT_FLOAT_PRECISION),
        }
    }
}

impl WriteOptions {
    /// Creates default options (ascii, no comments, 6 significant digits).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn ascii() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn binary_little_endian() -> Self {
        Self::default().with_encoding(Encoding::BinaryLittleEndian)
    }

    #[must_use]
    pub fn binary_big_endian() -> Self {
        Self::default().with_encoding(Encoding::BinaryBigEndian)
    }

    #[must_use]
    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Switches between ascii and binary, keeping the chosen byte order.
    #[must_use]
    pub fn with_binary(mut self, binary: bool) -> Self {
        self.encoding = match (binary, self.encoding) {
            (false, _) => Encoding::Ascii,
            (true, Encoding::BinaryBigEndian) => Encoding::BinaryBigEndian,
            (true, _) => Encoding::BinaryLittleEndian,
        };
        self
    }

    /// Selects the byte order. Has no effect on ascii output.
    #[must_use]
    pub fn with_big_endian(mut self, big_endian: bool) -> Self {
        if self.encoding.is_binary() {
            self.encoding = if big_endian {
                Encoding::BinaryBigEndian
            } else {
                Encoding::BinaryLittleEndian
            };
        }
        self
    }

    /// Replaces the comment text.
    #[must_use]
    pub fn with_comments(mut self, comments: impl Into<String>) -> Self {
        self.comments = comments.into();
        self
    }

    /// Appends one comment line.
    #[must_use]
    pub fn with_comment(mut self, line: &str) -> Self {
        if !self.comments.is_empty() && !self.comments.ends_with('\n') {
            self.comments.push('\n');
        }
        self.comments.push_str(line);
        self
    }

    /// Significant digits for ascii floats, `None` for the shortest exact text.
    ///
    /// Precisions above 17 are treated as 17, which already identifies every
    /// `f64`.
    #[must_use]
    pub fn with_float_precision(mut self, precision: Option<usize>) -> Self {
        self.float_precision = precision;
        self
    }

    /// The comment text split into header lines, empty lines dropped.
    pub fn comment_lines(&self) -> impl Iterator<Item = &str> + '_ {
        self.comments.lines().filter(|line| !line.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_and_byte_order_flags() {
        let a = WriteOptions::new().with_binary(true).with_big_endian(true);
        let b = WriteOptions::new().with_big_endian(true).with_binary(true);
        assert_eq!(a.encoding, Encoding::BinaryBigEndian);
        // byte order is ignored while the encoding is ascii
        assert_eq!(b.encoding, Encoding::BinaryLittleEndian);
        assert_eq!(
            WriteOptions::binary_big_endian().with_binary(false).encoding,
            Encoding::Ascii
        );
    }

    #[test]
    fn test_comment_lines() {
        let options = WriteOptions::new()
            .with_comment("first")
            .with_comment("second")
            .with_comments("a\n\nb\n");
        let lines: Vec<_> = options.comment_lines().collect();
        assert_eq!(lines, ["a", "b"]);

        let options = WriteOptions::new().with_comment("one").with_comment("two");
        assert_eq!(options.comments, "one\ntwo");
    }
}

//! PLY decoding.
//!
//! [`Reader`] drives one read over a buffered stream: the header first, then
//! every declared element in order, then a check that nothing follows the
//! last element.
//!
//! Most users should use [`read`](crate::read) or
//! [`read_document`](crate::read_document). The reader is useful to look at
//! the header before deciding to decode the data:
//!
//! ```rust
//! use plyformat::{Encoding, Reader};
//!
//! let ply = "ply\nformat ascii 1.0\nelement vertex 1\nproperty float x\nend_header\n2.5\n";
//! let mut reader = Reader::new(ply.as_bytes());
//! let header = reader.read_header().unwrap();
//! assert_eq!(header.encoding, Encoding::Ascii);
//! assert_eq!(header.elements[0].count, 1);
//!
//! let document = reader.read_document().unwrap();
//! assert_eq!(document.elements.get("vertex").unwrap().scalars::<f32>("x"), Some(vec![2.5]));
//! ```

use crate::error::Location;
use crate::{ascii, binary, header, Document, ElementMap, Encoding, Error, Header, Result};
use byteorder::{BigEndian, LittleEndian};
use std::io::{self, BufRead, Read};
use tracing::debug;

/// A buffered input stream that tracks line numbers and byte offsets.
pub(crate) struct Input<R> {
    inner: R,
    offset: u64,
    line: usize,
    raw: Vec<u8>,
}

impl<R: BufRead> Input<R> {
    pub(crate) fn new(inner: R) -> Self {
        Input {
            inner,
            offset: 0,
            line: 0,
            raw: Vec::new(),
        }
    }

    /// Number of the last line read, 1-based.
    pub(crate) fn line(&self) -> usize {
        self.line
    }

    /// Bytes consumed so far.
    pub(crate) fn offset(&self) -> u64 {
        self.offset
    }

    /// Reads one line into `line`, without its `\n` or `\r\n` terminator.
    ///
    /// Returns `false` at end of input. Invalid UTF-8 is replaced, so a bad
    /// line fails later as a syntax or data error rather than here.
    pub(crate) fn read_line(&mut self, line: &mut String) -> Result<bool> {
        self.raw.clear();
        let n = self.inner.read_until(b'\n', &mut self.raw)?;
        if n == 0 {
            return Ok(false);
        }
        self.offset += n as u64;
        self.line += 1;

        let mut bytes = self.raw.as_slice();
        if let Some(rest) = bytes.strip_suffix(b"\n") {
            bytes = rest;
        }
        if let Some(rest) = bytes.strip_suffix(b"\r") {
            bytes = rest;
        }
        line.clear();
        line.push_str(&String::from_utf8_lossy(bytes));
        Ok(true)
    }

    /// Fills `buf` completely or fails with [`Error::UnexpectedEof`].
    pub(crate) fn read_exact<F>(&mut self, buf: &mut [u8], expected: F) -> Result<()>
    where
        F: FnOnce() -> String,
    {
        match self.inner.read_exact(buf) {
            Ok(()) => {
                self.offset += buf.len() as u64;
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Err(Error::unexpected_eof(
                Location::Offset(self.offset),
                &expected(),
            )),
            Err(e) => Err(e.into()),
        }
    }

    /// Replaces the contents of `buf` with the next `len` bytes.
    ///
    /// Unlike [`Input::read_exact`] the buffer grows with the data actually
    /// read, so a corrupt length cannot trigger a huge allocation up front.
    pub(crate) fn read_to_vec<F>(&mut self, len: usize, buf: &mut Vec<u8>, expected: F) -> Result<()>
    where
        F: FnOnce() -> String,
    {
        buf.clear();
        let got = (&mut self.inner).take(len as u64).read_to_end(buf)?;
        self.offset += got as u64;
        if got < len {
            return Err(Error::unexpected_eof(
                Location::Offset(self.offset),
                &expected(),
            ));
        }
        Ok(())
    }

    /// Returns `true` if at least one more byte is available.
    pub(crate) fn has_remaining(&mut self) -> Result<bool> {
        Ok(!self.inner.fill_buf()?.is_empty())
    }
}

/// Reads a PLY document from a buffered stream.
pub struct Reader<R> {
    input: Input<R>,
    header: Option<Header>,
}

impl<R: BufRead> Reader<R> {
    pub fn new(inner: R) -> Self {
        Reader {
            input: Input::new(inner),
            header: None,
        }
    }

    /// Parses the header, or returns the one parsed by an earlier call.
    ///
    /// # Errors
    ///
    /// [`Error::HeaderSyntax`] for a malformed header line,
    /// [`Error::UnexpectedEof`] if the stream ends before `end_header`.
    pub fn read_header(&mut self) -> Result<&Header> {
        let header = self.take_header()?;
        Ok(self.header.insert(header))
    }

    fn take_header(&mut self) -> Result<Header> {
        if let Some(header) = self.header.take() {
            return Ok(header);
        }
        let header = header::parse_header(&mut self.input)?;
        debug!(
            encoding = %header.encoding,
            elements = header.elements.len(),
            comments = header.comments.len(),
            "parsed PLY header"
        );
        Ok(header)
    }

    /// Decodes the whole document.
    ///
    /// Every declared element is read in full, and the stream must end right
    /// after the last one.
    ///
    /// # Errors
    ///
    /// Any header error, plus [`Error::DataFormat`] and
    /// [`Error::UnexpectedEof`] for malformed or truncated element data and
    /// [`Error::DataFormat`] for data after the last element.
    pub fn read_document(mut self) -> Result<Document> {
        let header = self.take_header()?;

        let mut elements = ElementMap::with_capacity(header.elements.len());
        for schema in &header.elements {
            debug!(
                element = %schema.name,
                rows = schema.count,
                encoding = %header.encoding,
                "decoding element"
            );
            let element = match header.encoding {
                Encoding::Ascii => ascii::read_element(&mut self.input, schema)?,
                Encoding::BinaryLittleEndian => {
                    binary::read_element::<LittleEndian, _>(&mut self.input, schema)?
                }
                Encoding::BinaryBigEndian => {
                    binary::read_element::<BigEndian, _>(&mut self.input, schema)?
                }
            };
            elements.insert(schema.name.clone(), element);
        }
        self.expect_end(header.encoding)?;

        Ok(Document {
            comments: header.comments,
            elements,
        })
    }

    /// Rejects anything left after the last element. Ascii files may end
    /// with blank lines.
    fn expect_end(&mut self, encoding: Encoding) -> Result<()> {
        if encoding.is_binary() {
            if self.input.has_remaining()? {
                return Err(Error::data_format(
                    Location::Offset(self.input.offset()),
                    "unexpected bytes after the last element",
                ));
            }
            return Ok(());
        }

        let mut line = String::new();
        while self.input.read_line(&mut line)? {
            if !line.trim().is_empty() {
                return Err(Error::data_format(
                    Location::Line(self.input.line()),
                    format!("unexpected data after the last element: '{}'", line),
                ));
            }
        }
        Ok(())
    }
}

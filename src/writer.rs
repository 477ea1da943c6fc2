//! PLY encoding.
//!
//! [`Writer`] turns a [`Document`] into a header followed by the element data
//! in the encoding chosen by [`WriteOptions`].

use crate::schema::{is_identifier, ElementSchema};
use crate::{ascii, binary, header, Document, Encoding, Error, Header, Result, WriteOptions};
use byteorder::{BigEndian, LittleEndian};
use std::io::Write;
use tracing::debug;

/// Writes PLY documents to a byte sink.
///
/// # Examples
///
/// ```rust
/// use plyformat::{Document, Element, WriteOptions, Writer};
///
/// let mut document = Document::new().with_comment("one point");
/// document.push_element("vertex", Element::from_points(&[[1.0f32, 2.0, 3.0]])).unwrap();
///
/// let mut writer = Writer::new(Vec::new(), WriteOptions::ascii());
/// writer.write_document(&document).unwrap();
/// let text = String::from_utf8(writer.into_inner()).unwrap();
/// assert!(text.ends_with("end_header\n1 2 3\n"));
/// ```
pub struct Writer<W> {
    inner: W,
    options: WriteOptions,
}

impl<W: Write> Writer<W> {
    pub fn new(inner: W, options: WriteOptions) -> Self {
        Writer { inner, options }
    }

    #[must_use]
    pub fn options(&self) -> &WriteOptions {
        &self.options
    }

    /// Writes the header and every element of `document`, then flushes.
    ///
    /// Header comments are the document's own comments followed by the lines
    /// of [`WriteOptions::comments`].
    ///
    /// # Errors
    ///
    /// [`Error::InvalidElementName`] for an element name that is not an
    /// identifier, [`Error::InvalidType`] for a binary list longer than its
    /// count type allows, and [`Error::Io`] if the sink fails.
    pub fn write_document(&mut self, document: &Document) -> Result<()> {
        let header = self.header_for(document)?;
        header::write_header(&mut self.inner, &header)?;

        for (schema, element) in header.elements.iter().zip(document.elements.values()) {
            debug!(
                element = %schema.name,
                rows = schema.count,
                encoding = %header.encoding,
                "encoding element"
            );
            match header.encoding {
                Encoding::Ascii => {
                    ascii::write_element(&mut self.inner, element, self.options.float_precision)?
                }
                Encoding::BinaryLittleEndian => binary::write_element::<LittleEndian, _>(
                    &mut self.inner,
                    element,
                    &schema.properties,
                )?,
                Encoding::BinaryBigEndian => binary::write_element::<BigEndian, _>(
                    &mut self.inner,
                    element,
                    &schema.properties,
                )?,
            }
        }
        self.inner.flush()?;
        Ok(())
    }

    fn header_for(&self, document: &Document) -> Result<Header> {
        let elements = document
            .elements
            .iter()
            .map(|(name, element)| {
                if !is_identifier(name) {
                    return Err(Error::InvalidElementName(name.clone()));
                }
                Ok(ElementSchema {
                    name: name.clone(),
                    count: element.len(),
                    properties: element.resolved_properties(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let comments = document
            .comments
            .iter()
            .cloned()
            .chain(self.options.comment_lines().map(str::to_string))
            .collect();

        Ok(Header {
            encoding: self.options.encoding,
            comments,
            elements,
        })
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ply_row, Element, ElementMap, PropertyDecl, ScalarKind};

    fn document() -> Document {
        let mut elements = ElementMap::new();
        elements.insert(
            "edge",
            Element::new(
                vec![
                    PropertyDecl::scalar("a", ScalarKind::Int32),
                    PropertyDecl::scalar("b", ScalarKind::Int32),
                ],
                vec![ply_row![0, 1]],
            )
            .unwrap(),
        );
        Document {
            comments: vec!["from document".to_string()],
            elements,
        }
    }

    fn write(document: &Document, options: WriteOptions) -> Result<Vec<u8>> {
        let mut writer = Writer::new(Vec::new(), options);
        writer.write_document(document)?;
        Ok(writer.into_inner())
    }

    #[test]
    fn test_comment_order() {
        let bytes = write(&document(), WriteOptions::ascii().with_comments("first\nsecond")).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(
            text,
            "ply\nformat ascii 1.0\ncomment from document\ncomment first\ncomment second\n\
             element edge 1\nproperty int a\nproperty int b\nend_header\n0 1\n"
        );
    }

    #[test]
    fn test_binary_body() {
        let bytes = write(&document(), WriteOptions::binary_big_endian()).unwrap();
        assert!(bytes.ends_with(b"end_header\n\0\0\0\0\0\0\0\x01"));
    }

    #[test]
    fn test_invalid_element_name() {
        let mut document = document();
        document.elements.insert("two words", Element::default());
        let err = write(&document, WriteOptions::new()).unwrap_err();
        assert!(matches!(err, Error::InvalidElementName(name) if name == "two words"));
    }

    #[test]
    fn test_count_kind_follows_data() {
        let long: Vec<i32> = (0..256).collect();
        let faces = Element::from_index_lists(&[long]);
        let mut document = Document::new();
        document.push_element("face", faces).unwrap();
        let text = String::from_utf8(write(&document, WriteOptions::new()).unwrap()).unwrap();
        assert!(text.contains("property list ushort int vertex_index\n"));
    }
}

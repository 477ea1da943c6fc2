//! Header emission and parsing.
//!
//! The header is line oriented:
//!
//! ```text
//! ply
//! format binary_little_endian 1.0
//! comment anything
//! element vertex 8
//! property float x
//! property list uchar int vertex_index
//! end_header
//! ```
//!
//! `comment` lines may appear anywhere before `end_header`, including before
//! the magic line. Everything else follows the grammar
//!
//! ```text
//! header   := "ply" format element* "end_header"
//! format   := "format" ENCODING "1.0"
//! element  := "element" IDENT COUNT property*
//! property := "property" TYPE IDENT
//!           | "property" "list" TYPE TYPE IDENT
//! ```

use crate::error::Location;
use crate::reader::Input;
use crate::schema::{is_identifier, ElementSchema, Header, PropertyDecl};
use crate::{Encoding, Error, Result, ScalarKind};
use std::fmt::Write as _;
use std::io::{BufRead, Write};

const MAGIC: &str = "ply";
const VERSION: &str = "1.0";
const END_HEADER: &str = "end_header";

/// Writes `header` as text, every line terminated by `\n`.
///
/// Comment entries containing line breaks are split; empty lines are skipped.
pub fn write_header<W: Write>(writer: &mut W, header: &Header) -> Result<()> {
    let mut out = String::with_capacity(128);
    out.push_str(MAGIC);
    out.push('\n');
    out.push_str("format ");
    out.push_str(header.encoding.token());
    out.push(' ');
    out.push_str(VERSION);
    out.push('\n');

    for line in header
        .comments
        .iter()
        .flat_map(|comment| comment.lines())
        .filter(|line| !line.is_empty())
    {
        out.push_str("comment ");
        out.push_str(line);
        out.push('\n');
    }

    for element in &header.elements {
        let _ = writeln!(out, "element {} {}", element.name, element.count);
        for property in &element.properties {
            out.push_str(&property.to_string());
            out.push('\n');
        }
    }
    out.push_str(END_HEADER);
    out.push('\n');

    writer.write_all(out.as_bytes())?;
    Ok(())
}

/// Parses a header, leaving `input` positioned on the first data byte.
pub(crate) fn parse_header<R: BufRead>(input: &mut Input<R>) -> Result<Header> {
    HeaderParser {
        input,
        line: String::new(),
        comments: Vec::new(),
    }
    .parse()
}

struct HeaderParser<'a, R> {
    input: &'a mut Input<R>,
    line: String,
    comments: Vec<String>,
}

impl<R: BufRead> HeaderParser<'_, R> {
    fn parse(mut self) -> Result<Header> {
        self.next_line()?;
        if self.line != MAGIC {
            return Err(self.error("expected magic line 'ply'"));
        }

        self.next_line()?;
        let encoding = self.parse_format()?;

        let mut elements: Vec<ElementSchema> = Vec::new();
        loop {
            self.next_line()?;
            let tokens: Vec<&str> = self.line.split_whitespace().collect();
            match tokens.as_slice() {
                [END_HEADER] => break,
                ["element", ..] => {
                    let element = self.parse_element(&tokens, &elements)?;
                    elements.push(element);
                }
                ["property", ..] => {
                    let property = self.parse_property(&tokens)?;
                    let Some(element) = elements.last_mut() else {
                        return Err(self.error("property declared before any element"));
                    };
                    if element.property(&property.name).is_some() {
                        return Err(self.error(&format!(
                            "duplicate property '{}' in element '{}'",
                            property.name, element.name
                        )));
                    }
                    element.properties.push(property);
                }
                _ => return Err(self.error("expected 'element', 'property' or 'end_header'")),
            }
        }

        Ok(Header {
            encoding,
            comments: self.comments,
            elements,
        })
    }

    /// Advances to the next non-comment line.
    fn next_line(&mut self) -> Result<()> {
        loop {
            if !self.input.read_line(&mut self.line)? {
                return Err(Error::unexpected_eof(
                    Location::Line(self.input.line() + 1),
                    "'end_header'",
                ));
            }
            if self.line == "comment" {
                self.comments.push(String::new());
            } else if let Some(text) = self.line.strip_prefix("comment ") {
                self.comments.push(text.to_string());
            } else {
                return Ok(());
            }
        }
    }

    fn error(&self, msg: &str) -> Error {
        Error::header_syntax(self.input.line(), msg, &self.line)
    }

    fn parse_format(&self) -> Result<Encoding> {
        match self.line.split_whitespace().collect::<Vec<_>>().as_slice() {
            ["format", token, VERSION] => Encoding::from_token(token)
                .ok_or_else(|| self.error(&format!("unknown format '{}'", token))),
            ["format", _, version] => {
                Err(self.error(&format!("unsupported version '{}'", version)))
            }
            _ => Err(self.error("expected 'format <encoding> 1.0'")),
        }
    }

    fn parse_element(&self, tokens: &[&str], seen: &[ElementSchema]) -> Result<ElementSchema> {
        let [_, name, count] = tokens else {
            return Err(self.error("expected 'element <name> <count>'"));
        };
        let name = self.identifier(name)?;
        if seen.iter().any(|element| element.name == name) {
            return Err(self.error(&format!("duplicate element '{}'", name)));
        }
        let count = Some(*count)
            .filter(|digits| digits.bytes().all(|b| b.is_ascii_digit()))
            .and_then(|digits| digits.parse::<usize>().ok())
            .ok_or_else(|| self.error(&format!("invalid element count '{}'", count)))?;
        Ok(ElementSchema::new(name, count))
    }

    fn parse_property(&self, tokens: &[&str]) -> Result<PropertyDecl> {
        match tokens {
            [_, "list", count, item, name] => {
                let count = self.scalar_kind(count)?;
                if !count.is_unsigned_integer() {
                    return Err(self.error(&format!(
                        "list count type '{}' is not an unsigned integer",
                        count
                    )));
                }
                let item = self.scalar_kind(item)?;
                Ok(PropertyDecl::list(self.identifier(name)?, count, item))
            }
            [_, kind, name] => {
                let kind = self.scalar_kind(kind)?;
                Ok(PropertyDecl::scalar(self.identifier(name)?, kind))
            }
            _ => Err(self.error(
                "expected 'property <type> <name>' or 'property list <type> <type> <name>'",
            )),
        }
    }

    fn scalar_kind(&self, token: &str) -> Result<ScalarKind> {
        ScalarKind::from_token(token).ok_or_else(|| self.error(&format!("unknown type '{}'", token)))
    }

    fn identifier<'t>(&self, token: &'t str) -> Result<&'t str> {
        if is_identifier(token) {
            Ok(token)
        } else {
            Err(self.error(&format!("invalid name '{}'", token)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::PropertyKind;

    fn parse(text: &str) -> Result<Header> {
        parse_header(&mut Input::new(text.as_bytes()))
    }

    fn sample() -> Header {
        let mut vertex = ElementSchema::new("vertex", 3);
        vertex
            .properties
            .push(PropertyDecl::scalar("x", ScalarKind::Float32));
        let mut face = ElementSchema::new("face", 1);
        face.properties.push(PropertyDecl::list(
            "vertex_index",
            ScalarKind::UInt8,
            ScalarKind::Int32,
        ));
        Header {
            encoding: Encoding::BinaryBigEndian,
            comments: vec!["first".into(), "second\nthird".into(), String::new()],
            elements: vec![vertex, face],
        }
    }

    #[test]
    fn test_write_header_layout() {
        let mut out = Vec::new();
        write_header(&mut out, &sample()).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "ply\n\
             format binary_big_endian 1.0\n\
             comment first\n\
             comment second\n\
             comment third\n\
             element vertex 3\n\
             property float x\n\
             element face 1\n\
             property list uchar int vertex_index\n\
             end_header\n"
        );
    }

    #[test]
    fn test_parse_written_header() {
        let mut out = Vec::new();
        write_header(&mut out, &sample()).unwrap();
        let header = parse(std::str::from_utf8(&out).unwrap()).unwrap();
        assert_eq!(header.encoding, Encoding::BinaryBigEndian);
        assert_eq!(header.comments, ["first", "second", "third"]);
        assert_eq!(header.elements, sample().elements);
    }

    #[test]
    fn test_comments_anywhere() {
        let header = parse(
            "comment before magic\nply\ncomment\nformat ascii 1.0\nelement v 0\ncomment between\nproperty int a\nend_header\n",
        )
        .unwrap();
        assert_eq!(header.comments, ["before magic", "", "between"]);
        assert_eq!(
            header.elements[0].properties[0].kind,
            PropertyKind::Scalar(ScalarKind::Int32)
        );
    }

    #[test]
    fn test_position_stops_after_terminator() {
        let mut input = Input::new("ply\nformat ascii 1.0\nend_header\n1 2 3\n".as_bytes());
        parse_header(&mut input).unwrap();
        let mut line = String::new();
        assert!(input.read_line(&mut line).unwrap());
        assert_eq!(line, "1 2 3");
    }

    #[test]
    fn test_errors_carry_line_numbers() {
        let err = parse("ply\nformat ascii 1.0\nelement v 1\nproperty int 2a\nend_header\n").unwrap_err();
        match err {
            Error::HeaderSyntax { line, context, .. } => {
                assert_eq!(line, 4);
                assert_eq!(context, "property int 2a");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_syntax_errors() {
        let cases = [
            "pl\nformat ascii 1.0\nend_header\n",
            "ply\nFormat ascii 1.0\nend_header\n",
            "ply\nformat asci 1.0\nend_header\n",
            "ply\nformat ascii 2.0\nend_header\n",
            "ply\nformat ascii\nend_header\n",
            "ply\nformat ascii 1.0\nproperty int a\nend_header\n",
            "ply\nformat ascii 1.0\nelement v -1\nend_header\n",
            "ply\nformat ascii 1.0\nelement v x\nend_header\n",
            "ply\nformat ascii 1.0\nelement v\nend_header\n",
            "ply\nformat ascii 1.0\nelement v 1\nelement v 1\nend_header\n",
            "ply\nformat ascii 1.0\nelement v 1\nproperty int a\nproperty int a\nend_header\n",
            "ply\nformat ascii 1.0\nelement v 1\nprop int a\nend_header\n",
            "ply\nformat ascii 1.0\nelement v 1\nproperty decimal a\nend_header\n",
            "ply\nformat ascii 1.0\nelement v 1\nproperty lost uchar int a\nend_header\n",
            "ply\nformat ascii 1.0\nelement v 1\nproperty uchar int a\nend_header\n",
            "ply\nformat ascii 1.0\nelement v 1\nproperty list char int a\nend_header\n",
            "ply\nformat ascii 1.0\nelement v 1\nproperty list uchar number a\nend_header\n",
            "ply\nformat ascii 1.0\nelement v 1\n\nend_header\n",
            "ply\nformat ascii 1.0\ncomments x\nend_header\n",
            "ply\nformat ascii 1.0\nend_header extra\n",
            "ply\nformat ascii 1.0\nelement v +5\nend_header\n",
            "ply\nformat ascii 1.0\nelement v -1\nend_header\n",
        ];
        for case in cases {
            let err = parse(case).unwrap_err();
            assert!(err.is_header_syntax(), "{:?} gave {:?}", case, err);
        }
    }

    #[test]
    fn test_missing_terminator() {
        let err = parse("ply\nformat ascii 1.0\nelement v 0\n").unwrap_err();
        assert!(matches!(
            err,
            Error::UnexpectedEof { location: Location::Line(4), .. }
        ));
        assert!(parse("").unwrap_err().is_unexpected_eof());
    }
}

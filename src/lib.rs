//! # plyformat
//!
//! Reading and writing of PLY ("Polygon File Format") polygon meshes.
//!
//! ## What is PLY?
//!
//! A PLY file is a short text header that declares *elements* (tables such as
//! `vertex` or `face`), each with a row count and typed *properties*, followed
//! by the rows themselves. Rows are stored as ascii text or packed binary in
//! either byte order:
//!
//! ```text
//! ply
//! format ascii 1.0
//! comment a single triangle
//! element vertex 3
//! property float x
//! property float y
//! property float z
//! element face 1
//! property list uchar int vertex_index
//! end_header
//! 0 0 0
//! 1.5 0 0
//! 0.75 1 0
//! 3 0 1 2
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use plyformat::{read, write, ElementMap, WriteOptions};
//!
//! let vertices = vec![[0.0f32, 0.0, 0.0], [1.5, 0.0, 0.0], [0.75, 1.0, 0.0]];
//! let faces = vec![[0i32, 1, 2]];
//!
//! let mut buf = Vec::new();
//! write(&mut buf, vertices, faces, ElementMap::new(), &WriteOptions::binary_little_endian())
//!     .unwrap();
//!
//! let (vertex, face, others) = read(buf.as_slice()).unwrap();
//! assert_eq!(vertex.scalars::<f32>("x"), Some(vec![0.0, 1.5, 0.75]));
//! assert_eq!(face.lists::<i32>("vertex_index"), Some(vec![vec![0, 1, 2]]));
//! assert!(others.is_empty());
//! ```
//!
//! ### Extra elements
//!
//! Any element besides `vertex` and `face` travels in an [`ElementMap`], in
//! insertion order:
//!
//! ```rust
//! use plyformat::{from_bytes, to_bytes, Document, Element, WriteOptions};
//!
//! let mut document = Document::new().with_comment("wireframe");
//! document.push_element("vertex", Element::from_points(&[[0u8, 0, 0], [1, 1, 1]])).unwrap();
//! document
//!     .push_element("edge", Element::builder().scalar("a", [0i32]).scalar("b", [1i32]).build().unwrap())
//!     .unwrap();
//!
//! let bytes = to_bytes(&document, &WriteOptions::ascii()).unwrap();
//! assert_eq!(from_bytes(&bytes).unwrap(), document);
//! ```
//!
//! ## Types
//!
//! The eight PLY scalar types map to Rust primitives:
//!
//! | PLY      | Rust  | PLY      | Rust  |
//! |----------|-------|----------|-------|
//! | `char`   | `i8`  | `uchar`  | `u8`  |
//! | `short`  | `i16` | `ushort` | `u16` |
//! | `int`    | `i32` | `uint`   | `u32` |
//! | `float`  | `f32` | `double` | `f64` |
//!
//! `u64` and `i64` inputs are narrowed to 32 bits when converted, see
//! [`Scalar::narrow_u64`].
//!
//! ## Logging
//!
//! The codec emits [`tracing`] events: `debug` for headers and elements,
//! `trace` for batches and binary row layouts. Nothing is printed unless the
//! application installs a subscriber.

pub mod error;
pub mod macros;
pub mod map;
pub mod options;
pub mod schema;
pub mod types;
pub mod value;

mod ascii;
mod binary;
mod document;
mod header;
mod reader;
mod writer;

pub use document::{Document, Faces, Vertices, FACE, VERTEX};
pub use error::{Error, Location, Result};
pub use header::write_header;
pub use map::ElementMap;
pub use options::{WriteOptions, DEFAULT_FLOAT_PRECISION};
pub use reader::Reader;
pub use schema::{
    count_kind_for, infer_list_kinds, is_identifier, ElementSchema, Header, PropertyDecl,
    PropertyKind,
};
pub use types::{Encoding, Scalar, ScalarKind, ScalarType};
pub use value::{Element, ElementBuilder, Row, Value};
pub use writer::Writer;

use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::path::Path;

/// Writes a mesh: `vertex`, then `face`, then `other_elements` in order.
///
/// Vertices and faces can be given as elements or as plain tables, see
/// [`Vertices`] and [`Faces`].
///
/// # Examples
///
/// ```rust
/// use plyformat::{write, ElementMap, WriteOptions};
///
/// let mut buf = Vec::new();
/// let options = WriteOptions::ascii().with_comment("unit square");
/// write(
///     &mut buf,
///     vec![[0.0f64, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]],
///     vec![[0u32, 1, 2, 3]],
///     ElementMap::new(),
///     &options,
/// )
/// .unwrap();
/// assert!(String::from_utf8(buf).unwrap().contains("comment unit square\n"));
/// ```
///
/// # Errors
///
/// [`Error::InvalidElementName`] if `other_elements` uses `vertex`, `face` or
/// a non-identifier name, plus anything [`Writer::write_document`] reports.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn write<W: io::Write>(
    writer: W,
    vertices: impl Into<Vertices>,
    faces: impl Into<Faces>,
    other_elements: ElementMap,
    options: &WriteOptions,
) -> Result<()> {
    let document = Document::from_mesh(vertices.into(), faces.into(), other_elements)?;
    write_document(writer, &document, options)
}

/// Creates or truncates the file at `path` and writes a mesh to it.
///
/// # Errors
///
/// Same as [`write`], plus [`Error::Io`] if the file cannot be created.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn write_path<P: AsRef<Path>>(
    path: P,
    vertices: impl Into<Vertices>,
    faces: impl Into<Faces>,
    other_elements: ElementMap,
    options: &WriteOptions,
) -> Result<()> {
    let file = File::create(path)?;
    write(BufWriter::new(file), vertices, faces, other_elements, options)
}

/// Writes a whole [`Document`].
///
/// # Errors
///
/// See [`Writer::write_document`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn write_document<W: io::Write>(
    writer: W,
    document: &Document,
    options: &WriteOptions,
) -> Result<()> {
    Writer::new(writer, options.clone()).write_document(document)
}

/// Encodes a [`Document`] into a byte vector.
///
/// # Errors
///
/// See [`Writer::write_document`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_bytes(document: &Document, options: &WriteOptions) -> Result<Vec<u8>> {
    let mut writer = Writer::new(Vec::new(), options.clone());
    writer.write_document(document)?;
    Ok(writer.into_inner())
}

/// Reads a mesh, returning `(vertex, face, other_elements)`.
///
/// A file without a `vertex` or `face` element yields an empty default for
/// it, see [`Document::into_parts`]. Header comments are dropped; use
/// [`read_document`] to keep them.
///
/// # Errors
///
/// - [`Error::HeaderSyntax`] for a malformed header
/// - [`Error::DataFormat`] for malformed element data or data after the
///   last element
/// - [`Error::UnexpectedEof`] for truncated input
/// - [`Error::Io`] if the stream fails
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn read<R: io::Read>(reader: R) -> Result<(Element, Element, ElementMap)> {
    Ok(read_document(reader)?.into_parts())
}

/// Opens the file at `path` and reads a mesh from it.
///
/// # Errors
///
/// Same as [`read`], plus [`Error::Io`] if the file cannot be opened.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn read_path<P: AsRef<Path>>(path: P) -> Result<(Element, Element, ElementMap)> {
    read(File::open(path)?)
}

/// Reads a whole [`Document`], keeping comments and element order.
///
/// The encoding of the input is available from [`Reader::read_header`].
///
/// # Errors
///
/// Same as [`read`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn read_document<R: io::Read>(reader: R) -> Result<Document> {
    Reader::new(BufReader::new(reader)).read_document()
}

/// Decodes a [`Document`] from a byte slice.
///
/// # Errors
///
/// Same as [`read`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_bytes(bytes: &[u8]) -> Result<Document> {
    Reader::new(bytes).read_document()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cube() -> (Vec<[f64; 3]>, Vec<Vec<i32>>) {
        let vertices = [0.0, 1.0]
            .into_iter()
            .flat_map(|x| {
                [0.0, 1.0]
                    .into_iter()
                    .flat_map(move |y| [0.0, 1.0].into_iter().map(move |z| [x, y, z]))
            })
            .collect();
        let faces = vec![
            vec![0, 1, 3, 2],
            vec![4, 6, 7, 5],
            vec![0, 4, 5, 1],
            vec![2, 3, 7, 6],
            vec![0, 2, 6, 4],
            vec![1, 5, 7, 3],
        ];
        (vertices, faces)
    }

    #[test]
    fn test_write_read_all_encodings() {
        let (vertices, faces) = cube();
        for options in [
            WriteOptions::ascii(),
            WriteOptions::binary_little_endian(),
            WriteOptions::binary_big_endian(),
        ] {
            let mut buf = Vec::new();
            write(&mut buf, vertices.clone(), faces.clone(), ElementMap::new(), &options).unwrap();
            let (v, f, e) = read(buf.as_slice()).unwrap();
            let xs: Vec<f64> = vertices.iter().map(|p| p[0]).collect();
            assert_eq!(v.scalars::<f64>("x"), Some(xs));
            assert_eq!(f.lists::<i32>("vertex_index"), Some(faces.clone()));
            assert!(e.is_empty());
        }
    }

    #[test]
    fn test_reserved_other_element() {
        let mut others = ElementMap::new();
        others.insert("face", Element::default());
        let err = write(Vec::new(), Vertices::default(), Faces::default(), others, &WriteOptions::new())
            .unwrap_err();
        assert!(matches!(err, Error::InvalidElementName(name) if name == "face"));
    }

    #[test]
    fn test_empty_mesh() {
        let bytes = to_bytes(
            &Document::from_mesh(Vertices::default(), Faces::default(), ElementMap::new()).unwrap(),
            &WriteOptions::new(),
        )
        .unwrap();
        assert_eq!(
            String::from_utf8(bytes.clone()).unwrap(),
            "ply\nformat ascii 1.0\nelement vertex 0\nproperty double x\nproperty double y\n\
             property double z\nelement face 0\nproperty list uchar int vertex_index\nend_header\n"
        );
        let (v, f, _) = read(bytes.as_slice()).unwrap();
        assert!(v.is_empty() && f.is_empty());
    }

    #[test]
    fn test_missing_elements_get_defaults() {
        let (v, f, e) = read("ply\nformat ascii 1.0\nend_header\n".as_bytes()).unwrap();
        assert_eq!(v.properties().len(), 3);
        assert_eq!(f.properties().len(), 1);
        assert!(e.is_empty());
    }

    #[test]
    fn test_path_helpers() {
        let path = std::env::temp_dir().join(format!("plyformat-lib-{}.ply", std::process::id()));
        let (vertices, faces) = cube();
        write_path(&path, vertices, faces, ElementMap::new(), &WriteOptions::binary_little_endian())
            .unwrap();
        let (v, f, _) = read_path(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(v.len(), 8);
        assert_eq!(f.len(), 6);
    }
}

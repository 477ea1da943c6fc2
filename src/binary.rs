//! Binary element data.
//!
//! A row is the concatenation of its properties in declaration order, with no
//! padding: scalars take their natural width, lists are a count followed by
//! that many items. Byte order is chosen per call through
//! [`byteorder::ByteOrder`].
//!
//! Rows are described by a [`Layout`]: consecutive scalar properties are
//! grouped into one fixed-width segment so they can be read with a single
//! call, and each list property gets its own segment.

use crate::error::Location;
use crate::reader::Input;
use crate::schema::{ElementSchema, PropertyDecl, PropertyKind};
use crate::value::{Row, Value};
use crate::{Element, Error, Result, Scalar, ScalarKind};
use byteorder::ByteOrder;
use std::io::{BufRead, Write};
use tracing::trace;

/// Pending output is handed to the sink once it grows past this size.
const FLUSH_THRESHOLD: usize = 64 * 1024;

/// Rows of a pure-scalar element decoded per read call.
const ROW_BATCH: usize = 4096;

/// Largest row count accepted for an element without properties. Such rows
/// take no bytes, so the input cannot bound them.
const MAX_EMPTY_ROWS: usize = 1 << 20;

#[derive(Clone, Debug, PartialEq)]
enum Segment {
    /// A run of scalar properties, `width` bytes in total.
    Fixed {
        kinds: Vec<ScalarKind>,
        width: usize,
    },
    /// The list property at `index`.
    List {
        index: usize,
        count: ScalarKind,
        item: ScalarKind,
    },
}

/// The on-disk shape of one row.
#[derive(Clone, Debug, PartialEq)]
struct Layout {
    segments: Vec<Segment>,
}

impl Layout {
    fn new(properties: &[PropertyDecl]) -> Self {
        let mut segments: Vec<Segment> = Vec::new();
        for (index, decl) in properties.iter().enumerate() {
            match decl.kind {
                PropertyKind::Scalar(kind) => match segments.last_mut() {
                    Some(Segment::Fixed { kinds, width, .. }) => {
                        kinds.push(kind);
                        *width += kind.byte_width();
                    }
                    _ => segments.push(Segment::Fixed {
                        kinds: vec![kind],
                        width: kind.byte_width(),
                    }),
                },
                PropertyKind::List { count, item } => {
                    segments.push(Segment::List { index, count, item })
                }
            }
        }
        Layout { segments }
    }

    /// Row width in bytes, or `None` if any property is a list.
    fn fixed_row_width(&self) -> Option<usize> {
        self.segments.iter().try_fold(0, |total, segment| match segment {
            Segment::Fixed { width, .. } => Some(total + width),
            Segment::List { .. } => None,
        })
    }
}

/// Writes every row of `element` using the given declarations.
///
/// `properties` are the element's own declarations with list count kinds
/// fitted to the data.
///
/// # Errors
///
/// [`Error::InvalidType`] if a list is too long for its count type.
pub(crate) fn write_element<B: ByteOrder, W: Write>(
    writer: &mut W,
    element: &Element,
    properties: &[PropertyDecl],
) -> Result<()> {
    let mut buf = Vec::with_capacity(FLUSH_THRESHOLD.min(element.len() * 16 + 16));
    for row in element.rows() {
        for (decl, value) in properties.iter().zip(row) {
            match value {
                Value::Scalar(scalar) => scalar.pack::<B>(&mut buf),
                Value::List(items) => {
                    let PropertyKind::List { count, .. } = decl.kind else {
                        return Err(Error::invalid_type(&decl.name, "list value for a scalar property"));
                    };
                    let len = Scalar::from_count(count, items.len()).ok_or_else(|| {
                        Error::invalid_type(
                            &decl.name,
                            &format!("list of {} items does not fit a {} count", items.len(), count),
                        )
                    })?;
                    len.pack::<B>(&mut buf);
                    for item in items {
                        item.pack::<B>(&mut buf);
                    }
                }
            }
        }
        if buf.len() >= FLUSH_THRESHOLD {
            writer.write_all(&buf)?;
            buf.clear();
        }
    }
    writer.write_all(&buf)?;
    Ok(())
}

/// Reads `schema.count` rows in the byte order `B`.
///
/// # Errors
///
/// [`Error::UnexpectedEof`] if the input ends inside the element,
/// [`Error::DataFormat`] if a list count cannot be represented in memory.
pub(crate) fn read_element<B: ByteOrder, R: BufRead>(
    input: &mut Input<R>,
    schema: &ElementSchema,
) -> Result<Element> {
    let layout = Layout::new(&schema.properties);
    trace!(element = %schema.name, layout = ?layout, "binary row layout");

    let rows = match layout.fixed_row_width() {
        Some(width) => read_fixed_rows::<B, R>(input, schema, &layout, width)?,
        None => read_rows::<B, R>(input, schema, &layout)?,
    };
    Ok(Element::from_decoded(schema.properties.clone(), rows))
}

fn read_fixed_rows<B: ByteOrder, R: BufRead>(
    input: &mut Input<R>,
    schema: &ElementSchema,
    layout: &Layout,
    width: usize,
) -> Result<Vec<Row>> {
    if width == 0 {
        if schema.count > MAX_EMPTY_ROWS {
            return Err(Error::data_format(
                Location::Offset(input.offset()),
                format!(
                    "element '{}' has no properties but declares {} rows",
                    schema.name, schema.count
                ),
            ));
        }
        return Ok(vec![Row::new(); schema.count]);
    }
    let kinds: Vec<ScalarKind> = layout
        .segments
        .iter()
        .flat_map(|segment| match segment {
            Segment::Fixed { kinds, .. } => kinds.clone(),
            Segment::List { .. } => Vec::new(),
        })
        .collect();

    let mut rows: Vec<Row> = Vec::new();
    let mut chunk = Vec::new();
    while rows.len() < schema.count {
        let batch = (schema.count - rows.len()).min(ROW_BATCH);
        let done = rows.len();
        input.read_to_vec(batch * width, &mut chunk, || {
            format!("row {} of element '{}'", done, schema.name)
        })?;
        rows.reserve(batch);
        for bytes in chunk.chunks_exact(width) {
            rows.push(unpack_scalars::<B>(&kinds, bytes));
        }
    }
    Ok(rows)
}

fn read_rows<B: ByteOrder, R: BufRead>(
    input: &mut Input<R>,
    schema: &ElementSchema,
    layout: &Layout,
) -> Result<Vec<Row>> {
    let mut rows: Vec<Row> = Vec::with_capacity(schema.count.min(ROW_BATCH));
    let mut fixed = Vec::new();
    let mut items = Vec::new();
    let mut count_bytes = [0u8; 4];

    for index in 0..schema.count {
        let mut row = Row::with_capacity(schema.properties.len());
        for segment in &layout.segments {
            match segment {
                Segment::Fixed { kinds, width } => {
                    fixed.resize(*width, 0);
                    input.read_exact(&mut fixed, || {
                        format!("row {} of element '{}'", index, schema.name)
                    })?;
                    row.extend(unpack_scalars::<B>(kinds, &fixed));
                }
                Segment::List { index: property, count, item } => {
                    let name = &schema.properties[*property].name;
                    let count_bytes = &mut count_bytes[..count.byte_width()];
                    input.read_exact(count_bytes, || {
                        format!("length of list '{}' in row {}", name, index)
                    })?;
                    let offset = input.offset();
                    let len = Scalar::unpack::<B>(*count, count_bytes)
                        .to_count()
                        .ok_or_else(|| {
                            Error::data_format(
                                Location::Offset(offset),
                                format!("invalid length for list '{}'", name),
                            )
                        })?;
                    let size = len.checked_mul(item.byte_width()).ok_or_else(|| {
                        Error::data_format(
                            Location::Offset(offset),
                            format!("list '{}' of {} items is too large", name, len),
                        )
                    })?;
                    input.read_to_vec(size, &mut items, || {
                        format!("{} items of list '{}' in row {}", len, name, index)
                    })?;
                    let values = items
                        .chunks_exact(item.byte_width())
                        .map(|bytes| Scalar::unpack::<B>(*item, bytes))
                        .collect();
                    row.push(Value::List(values));
                }
            }
        }
        rows.push(row);
    }
    Ok(rows)
}

fn unpack_scalars<B: ByteOrder>(kinds: &[ScalarKind], bytes: &[u8]) -> Row {
    let mut offset = 0;
    kinds
        .iter()
        .map(|&kind| {
            let value = Scalar::unpack::<B>(kind, &bytes[offset..]);
            offset += kind.byte_width();
            Value::Scalar(value)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ply_row;
    use byteorder::{BigEndian, LittleEndian};

    fn decls() -> Vec<PropertyDecl> {
        vec![
            PropertyDecl::scalar("a", ScalarKind::UInt8),
            PropertyDecl::scalar("b", ScalarKind::Int16),
            PropertyDecl::list("l", ScalarKind::UInt8, ScalarKind::Int32),
            PropertyDecl::scalar("c", ScalarKind::Float32),
        ]
    }

    fn schema(count: usize, properties: Vec<PropertyDecl>) -> ElementSchema {
        ElementSchema {
            name: "e".to_string(),
            count,
            properties,
        }
    }

    #[test]
    fn test_layout_groups_scalars() {
        let layout = Layout::new(&decls());
        assert_eq!(
            layout.segments,
            vec![
                Segment::Fixed {
                    kinds: vec![ScalarKind::UInt8, ScalarKind::Int16],
                    width: 3
                },
                Segment::List {
                    index: 2,
                    count: ScalarKind::UInt8,
                    item: ScalarKind::Int32
                },
                Segment::Fixed {
                    kinds: vec![ScalarKind::Float32],
                    width: 4
                },
            ]
        );
        assert_eq!(layout.fixed_row_width(), None);
        assert_eq!(Layout::new(&decls()[..2]).fixed_row_width(), Some(3));
        assert_eq!(Layout::new(&[]).fixed_row_width(), Some(0));
    }

    #[test]
    fn test_write_exact_bytes() {
        let element = Element::new(decls(), vec![ply_row![1u8, (-2i16), [3i32], 0.5f32]]).unwrap();
        let mut le = Vec::new();
        write_element::<LittleEndian, _>(&mut le, &element, element.properties()).unwrap();
        assert_eq!(
            le,
            [1, 0xfe, 0xff, 1, 3, 0, 0, 0, 0, 0, 0, 0x3f]
        );

        let mut be = Vec::new();
        write_element::<BigEndian, _>(&mut be, &element, element.properties()).unwrap();
        assert_eq!(
            be,
            [1, 0xff, 0xfe, 1, 0, 0, 0, 3, 0x3f, 0, 0, 0]
        );
    }

    #[test]
    fn test_read_written_rows() {
        let element = Element::new(
            decls(),
            vec![
                ply_row![1u8, (-2i16), [3i32, 4i32], 0.5f32],
                ply_row![9u8, 7i16, [], (-1.5f32)],
            ],
        )
        .unwrap();
        let mut bytes = Vec::new();
        write_element::<BigEndian, _>(&mut bytes, &element, element.properties()).unwrap();
        let decoded =
            read_element::<BigEndian, _>(&mut Input::new(bytes.as_slice()), &element.schema("e")).unwrap();
        assert_eq!(decoded, element);
    }

    #[test]
    fn test_fixed_rows_across_batches() {
        let count = ROW_BATCH + 5;
        let values: Vec<u16> = (0..count as u16).collect();
        let element = Element::builder()
            .scalar("v", values.clone())
            .scalar("w", vec![1.25f64; count])
            .build()
            .unwrap();
        let mut bytes = Vec::new();
        write_element::<LittleEndian, _>(&mut bytes, &element, element.properties()).unwrap();
        assert_eq!(bytes.len(), count * 10);
        let decoded =
            read_element::<LittleEndian, _>(&mut Input::new(bytes.as_slice()), &element.schema("e"))
                .unwrap();
        assert_eq!(decoded.scalars::<u16>("v"), Some(values));
    }

    #[test]
    fn test_zero_width_rows() {
        let decoded =
            read_element::<LittleEndian, _>(&mut Input::new(&[][..]), &schema(3, vec![])).unwrap();
        assert_eq!(decoded.len(), 3);
    }

    #[test]
    fn test_zero_width_count_is_bounded() {
        let mut input = Input::new(&[][..]);
        let decoded =
            read_element::<LittleEndian, _>(&mut input, &schema(MAX_EMPTY_ROWS, vec![])).unwrap();
        assert_eq!(decoded.len(), MAX_EMPTY_ROWS);

        for count in [MAX_EMPTY_ROWS + 1, 1_000_000_000_000_000, usize::MAX] {
            let err = read_element::<LittleEndian, _>(&mut Input::new(&[][..]), &schema(count, vec![]))
                .unwrap_err();
            assert!(
                matches!(err, Error::DataFormat { location: Location::Offset(0), .. }),
                "{:?}",
                err
            );
        }
    }

    #[test]
    fn test_truncation_reports_offset() {
        let bytes = [1u8, 0, 0, 2, 5, 0, 0, 0];
        let err = read_element::<LittleEndian, _>(&mut Input::new(&bytes[..]), &schema(1, decls()))
            .unwrap_err();
        assert!(matches!(
            err,
            Error::UnexpectedEof { location: Location::Offset(8), .. }
        ));

        let err = read_element::<LittleEndian, _>(
            &mut Input::new(&[0u8; 5][..]),
            &schema(2, decls()[..2].to_vec()),
        )
        .unwrap_err();
        assert!(err.is_unexpected_eof());
    }

    #[test]
    fn test_huge_count_fails_without_allocating() {
        let decls = vec![PropertyDecl::list("l", ScalarKind::UInt32, ScalarKind::Float64)];
        let err = read_element::<BigEndian, _>(
            &mut Input::new(&[0xffu8, 0xff, 0xff, 0xff, 1, 2][..]),
            &schema(usize::MAX, decls),
        )
        .unwrap_err();
        assert!(err.is_unexpected_eof());
    }

    #[test]
    fn test_count_overflow_is_rejected() {
        let element = Element::from_decoded(
            vec![PropertyDecl::list("l", ScalarKind::UInt8, ScalarKind::UInt8)],
            vec![vec![Value::List(vec![Scalar::UInt8(0); 256])]],
        );
        let mut out = Vec::new();
        let err = write_element::<LittleEndian, _>(&mut out, &element, element.properties())
            .unwrap_err();
        assert!(matches!(err, Error::InvalidType { .. }));
    }
}

//! Ascii element data: one row per line, tokens separated by whitespace.
//!
//! A list is written as its length followed by its items, so the row
//! `x=1.5 vertex_index=[0, 1, 2]` becomes `1.5 3 0 1 2`.
//!
//! Elements without list properties take a batched path on both sides: the
//! writer renders up to [`ROW_BATCH`] rows into one buffer before handing it
//! to the sink, and the reader reserves storage batch by batch instead of
//! trusting the declared row count.

use crate::error::Location;
use crate::reader::Input;
use crate::schema::{ElementSchema, PropertyDecl, PropertyKind};
use crate::value::{Row, Value};
use crate::{Element, Error, Result, Scalar, ScalarKind};
use std::io::{BufRead, Write};
use tracing::trace;

/// Rows rendered or reserved per batch on the pure-scalar paths.
pub const ROW_BATCH: usize = 1024;

/// Writes every row of `element` as one text line.
pub(crate) fn write_element<W: Write>(
    writer: &mut W,
    element: &Element,
    precision: Option<usize>,
) -> Result<()> {
    if element.is_pure_scalar() {
        return write_scalar_rows(writer, element, precision);
    }

    let mut line = String::new();
    for row in element.rows() {
        line.clear();
        write_row(&mut line, row, precision);
        writer.write_all(line.as_bytes())?;
    }
    Ok(())
}

fn write_scalar_rows<W: Write>(
    writer: &mut W,
    element: &Element,
    precision: Option<usize>,
) -> Result<()> {
    let mut batch = String::new();
    for rows in element.rows().chunks(ROW_BATCH) {
        batch.clear();
        for row in rows {
            write_row(&mut batch, row, precision);
        }
        trace!(rows = rows.len(), bytes = batch.len(), "writing ascii batch");
        writer.write_all(batch.as_bytes())?;
    }
    Ok(())
}

fn write_row(out: &mut String, row: &Row, precision: Option<usize>) {
    let mut first = true;
    for value in row {
        if !first {
            out.push(' ');
        }
        first = false;
        write_value(out, value, precision);
    }
    out.push('\n');
}

fn write_value(out: &mut String, value: &Value, precision: Option<usize>) {
    match value {
        Value::Scalar(scalar) => scalar.write_ascii(out, precision),
        Value::List(items) => {
            out.push_str(&items.len().to_string());
            for item in items {
                out.push(' ');
                item.write_ascii(out, precision);
            }
        }
    }
}

/// Reads `schema.count` rows, one per line.
///
/// # Errors
///
/// [`Error::DataFormat`] for a token that does not parse as its declared
/// type, for missing or extra tokens on a line, and for running out of lines
/// in an element without lists. [`Error::UnexpectedEof`] if the input ends
/// inside an element with lists.
pub(crate) fn read_element<R: BufRead>(
    input: &mut Input<R>,
    schema: &ElementSchema,
) -> Result<Element> {
    let rows = if schema.is_pure_scalar() {
        read_scalar_rows(input, schema)?
    } else {
        read_rows(input, schema)?
    };
    Ok(Element::from_decoded(schema.properties.clone(), rows))
}

fn read_scalar_rows<R: BufRead>(input: &mut Input<R>, schema: &ElementSchema) -> Result<Vec<Row>> {
    let kinds: Vec<ScalarKind> = schema
        .properties
        .iter()
        .map(|p| p.kind.value_kind())
        .collect();

    let mut rows: Vec<Row> = Vec::new();
    let mut line = String::new();
    while rows.len() < schema.count {
        rows.reserve((schema.count - rows.len()).min(ROW_BATCH));
        let batch_end = (rows.len() + ROW_BATCH).min(schema.count);
        while rows.len() < batch_end {
            if !input.read_line(&mut line)? {
                return Err(Error::data_format(
                    Location::Line(input.line() + 1),
                    format!(
                        "element '{}' declares {} rows but the data ends after {}",
                        schema.name,
                        schema.count,
                        rows.len()
                    ),
                ));
            }
            let tokens: Vec<&str> = line.split_whitespace().collect();
            if tokens.len() != kinds.len() {
                return Err(Error::data_format(
                    Location::Line(input.line()),
                    format!(
                        "expected {} values for element '{}', found {}",
                        kinds.len(),
                        schema.name,
                        tokens.len()
                    ),
                ));
            }
            let row = kinds
                .iter()
                .zip(&tokens)
                .zip(&schema.properties)
                .map(|((&kind, token), decl)| {
                    parse_scalar(input.line(), kind, token, decl).map(Value::Scalar)
                })
                .collect::<Result<Row>>()?;
            rows.push(row);
        }
        trace!(element = %schema.name, rows = rows.len(), "read ascii batch");
    }
    Ok(rows)
}

fn read_rows<R: BufRead>(input: &mut Input<R>, schema: &ElementSchema) -> Result<Vec<Row>> {
    let mut rows: Vec<Row> = Vec::with_capacity(schema.count.min(ROW_BATCH));
    let mut line = String::new();
    for _ in 0..schema.count {
        if !input.read_line(&mut line)? {
            return Err(Error::unexpected_eof(
                Location::Line(input.line() + 1),
                &format!("a row of element '{}'", schema.name),
            ));
        }
        let number = input.line();
        let mut tokens = line.split_whitespace();
        let mut next = |decl: &PropertyDecl| {
            tokens.next().ok_or_else(|| {
                Error::data_format(
                    Location::Line(number),
                    format!("missing value for property '{}'", decl.name),
                )
            })
        };

        let mut row = Row::with_capacity(schema.properties.len());
        for decl in &schema.properties {
            let value = match decl.kind {
                PropertyKind::Scalar(kind) => {
                    Value::Scalar(parse_scalar(number, kind, next(decl)?, decl)?)
                }
                PropertyKind::List { count, item } => {
                    let len = parse_scalar(number, count, next(decl)?, decl)?
                        .to_count()
                        .ok_or_else(|| {
                            Error::data_format(
                                Location::Line(number),
                                format!("invalid list length for property '{}'", decl.name),
                            )
                        })?;
                    let items = (0..len)
                        .map(|_| parse_scalar(number, item, next(decl)?, decl))
                        .collect::<Result<Vec<Scalar>>>()?;
                    Value::List(items)
                }
            };
            row.push(value);
        }

        if let Some(extra) = tokens.next() {
            return Err(Error::data_format(
                Location::Line(number),
                format!(
                    "unexpected value '{}' after the last property of element '{}'",
                    extra, schema.name
                ),
            ));
        }
        rows.push(row);
    }
    Ok(rows)
}

fn parse_scalar(line: usize, kind: ScalarKind, token: &str, decl: &PropertyDecl) -> Result<Scalar> {
    kind.parse_ascii(token).ok_or_else(|| {
        Error::data_format(
            Location::Line(line),
            format!(
                "invalid {} value '{}' for property '{}'",
                kind, token, decl.name
            ),
        )
    })
}

//! In-memory element data.
//!
//! An [`Element`] is an ordered list of property declarations plus the rows
//! that follow them. Each [`Row`] holds one [`Value`] per property: a single
//! [`Scalar`] for scalar properties, a `Vec<Scalar>` for list properties.
//!
//! Elements are validated when they are built and are immutable afterwards.
//!
//! ## Building elements
//!
//! Row by row, with explicit declarations:
//!
//! ```rust
//! use plyformat::{ply_row, Element, PropertyDecl, ScalarKind};
//!
//! let edges = Element::new(
//!     vec![
//!         PropertyDecl::scalar("vertex1", ScalarKind::Int32),
//!         PropertyDecl::scalar("vertex2", ScalarKind::Int32),
//!     ],
//!     vec![ply_row![0, 1], ply_row![1, 2]],
//! )
//! .unwrap();
//! assert_eq!(edges.len(), 2);
//! ```
//!
//! Column by column:
//!
//! ```rust
//! use plyformat::Element;
//!
//! let vertices = Element::builder()
//!     .scalar("x", [0.0f32, 1.0, 0.5])
//!     .scalar("y", [0.0f32, 0.0, 1.0])
//!     .scalar("red", [255u8, 0, 0])
//!     .build()
//!     .unwrap();
//! assert_eq!(vertices.scalars::<u8>("red"), Some(vec![255, 0, 0]));
//! ```

use crate::schema::{infer_list_kinds, is_identifier, ElementSchema, PropertyDecl, PropertyKind};
use crate::types::{Scalar, ScalarKind, ScalarType};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// The value of one property in one row.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Scalar(Scalar),
    List(Vec<Scalar>),
}

impl Value {
    #[inline]
    #[must_use]
    pub fn as_scalar(&self) -> Option<Scalar> {
        match self {
            Value::Scalar(s) => Some(*s),
            Value::List(_) => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_list(&self) -> Option<&[Scalar]> {
        match self {
            Value::List(items) => Some(items),
            Value::Scalar(_) => None,
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_list(&self) -> bool {
        matches!(self, Value::List(_))
    }
}

impl From<Scalar> for Value {
    fn from(value: Scalar) -> Self {
        Value::Scalar(value)
    }
}

impl From<Vec<Scalar>> for Value {
    fn from(items: Vec<Scalar>) -> Self {
        Value::List(items)
    }
}

macro_rules! impl_value_from {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::Scalar(value.into_scalar())
                }
            }

            impl From<Vec<$ty>> for Value {
                fn from(items: Vec<$ty>) -> Self {
                    Value::List(items.into_iter().map(ScalarType::into_scalar).collect())
                }
            }
        )*
    };
}

impl_value_from!(f64, f32, u8, i8, u16, i16, u32, i32, u64, i64);

/// One row of an element: a value per declared property, in declaration order.
pub type Row = Vec<Value>;

/// A typed table of rows sharing one set of property declarations.
#[derive(Clone, Debug, PartialEq, Default, Serialize)]
pub struct Element {
    properties: Vec<PropertyDecl>,
    rows: Vec<Row>,
}

impl Element {
    /// Builds an element from declarations and rows, checking every row.
    ///
    /// List count kinds are recomputed from the longest list in each column,
    /// so the `count` given in a list declaration is only a placeholder.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidPropertyName`] for a duplicate or non-identifier name
    /// - [`Error::InvalidType`] for a value whose kind differs from its
    ///   declaration, or a list count kind that is not an unsigned integer
    /// - [`Error::SchemaMismatch`] for a row with the wrong arity, or a list
    ///   where a scalar is declared (and vice versa)
    pub fn new(properties: Vec<PropertyDecl>, rows: Vec<Row>) -> Result<Self> {
        validate_properties(&properties)?;
        for (index, row) in rows.iter().enumerate() {
            check_row(&properties, index, row)?;
        }
        let mut element = Element { properties, rows };
        element.resolve_list_counts();
        Ok(element)
    }

    /// An element with the given declarations and no rows.
    pub fn empty(properties: Vec<PropertyDecl>) -> Result<Self> {
        Element::new(properties, Vec::new())
    }

    /// Wraps decoded data. Rows are trusted to match the declarations.
    pub(crate) fn from_decoded(properties: Vec<PropertyDecl>, rows: Vec<Row>) -> Self {
        Element { properties, rows }
    }

    /// Builds an element with properties `x`, `y`, `z` from an N×3 table.
    ///
    /// ```rust
    /// use plyformat::{Element, ScalarKind, PropertyKind};
    ///
    /// let vertices = Element::from_points(&[[0.0, 0.0, 0.0], [1.5, 0.0, 0.0]]);
    /// assert_eq!(vertices.len(), 2);
    /// assert_eq!(vertices.properties()[0].kind, PropertyKind::Scalar(ScalarKind::Float64));
    /// ```
    #[must_use]
    pub fn from_points<T: ScalarType>(points: &[[T; 3]]) -> Self {
        let properties = ["x", "y", "z"]
            .into_iter()
            .map(|name| PropertyDecl::scalar(name, T::KIND))
            .collect();
        let rows = points
            .iter()
            .map(|point| {
                point
                    .iter()
                    .map(|&v| Value::Scalar(v.into_scalar()))
                    .collect()
            })
            .collect();
        Element { properties, rows }
    }

    /// Builds an element with a single list property `vertex_index`.
    ///
    /// ```rust
    /// use plyformat::{Element, ScalarKind, PropertyKind};
    ///
    /// let faces = Element::from_index_lists(&[vec![0u32, 1, 2], vec![2, 3, 0]]);
    /// assert_eq!(
    ///     faces.properties()[0].kind,
    ///     PropertyKind::List { count: ScalarKind::UInt8, item: ScalarKind::UInt32 }
    /// );
    /// ```
    #[must_use]
    pub fn from_index_lists<T, L>(lists: &[L]) -> Self
    where
        T: ScalarType,
        L: AsRef<[T]>,
    {
        let rows: Vec<Row> = lists
            .iter()
            .map(|list| {
                vec![Value::List(
                    list.as_ref().iter().map(|&v| v.into_scalar()).collect(),
                )]
            })
            .collect();
        let (count, item) = infer_list_kinds(rows.iter().filter_map(|row| row[0].as_list()));
        Element {
            properties: vec![PropertyDecl::list("vertex_index", count, item)],
            rows,
        }
    }

    /// Starts a column-oriented builder.
    #[must_use]
    pub fn builder() -> ElementBuilder {
        ElementBuilder::default()
    }

    #[must_use]
    pub fn properties(&self) -> &[PropertyDecl] {
        &self.properties
    }

    #[must_use]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    #[must_use]
    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn property(&self, name: &str) -> Option<&PropertyDecl> {
        self.properties.iter().find(|p| p.name == name)
    }

    #[must_use]
    pub fn property_index(&self, name: &str) -> Option<usize> {
        self.properties.iter().position(|p| p.name == name)
    }

    /// Returns `true` if no property is a list.
    #[must_use]
    pub fn is_pure_scalar(&self) -> bool {
        self.properties.iter().all(|p| !p.kind.is_list())
    }

    /// Iterates over one property's values, row by row.
    pub fn column(&self, name: &str) -> Option<impl Iterator<Item = &Value> + '_> {
        let index = self.property_index(name)?;
        Some(self.rows.iter().map(move |row| &row[index]))
    }

    /// Extracts a scalar column as `T`.
    ///
    /// Returns `None` if the property is missing, is a list, or holds a
    /// different kind than `T`.
    #[must_use]
    pub fn scalars<T: ScalarType>(&self, name: &str) -> Option<Vec<T>> {
        self.column(name)?
            .map(|value| value.as_scalar().and_then(T::from_scalar))
            .collect()
    }

    /// Extracts a list column as `Vec<T>` per row.
    ///
    /// ```rust
    /// use plyformat::Element;
    ///
    /// let faces = Element::from_index_lists(&[[0i32, 1, 2]]);
    /// assert_eq!(faces.lists::<i32>("vertex_index"), Some(vec![vec![0, 1, 2]]));
    /// assert_eq!(faces.lists::<u8>("vertex_index"), None);
    /// ```
    #[must_use]
    pub fn lists<T: ScalarType>(&self, name: &str) -> Option<Vec<Vec<T>>> {
        self.column(name)?
            .map(|value| {
                value
                    .as_list()?
                    .iter()
                    .map(|&item| T::from_scalar(item))
                    .collect()
            })
            .collect()
    }

    /// The header declaration for this element under `name`.
    #[must_use]
    pub fn schema(&self, name: &str) -> ElementSchema {
        ElementSchema {
            name: name.to_string(),
            count: self.rows.len(),
            properties: self.properties.clone(),
        }
    }

    /// Same declarations with list count kinds fitted to the data.
    pub(crate) fn resolved_properties(&self) -> Vec<PropertyDecl> {
        self.properties
            .iter()
            .enumerate()
            .map(|(index, decl)| match decl.kind {
                PropertyKind::Scalar(_) => decl.clone(),
                PropertyKind::List { item, .. } => {
                    let (count, _) = infer_list_kinds(
                        self.rows.iter().filter_map(|row| row[index].as_list()),
                    );
                    PropertyDecl::list(decl.name.clone(), count, item)
                }
            })
            .collect()
    }

    fn resolve_list_counts(&mut self) {
        self.properties = self.resolved_properties();
    }
}

fn validate_properties(properties: &[PropertyDecl]) -> Result<()> {
    let mut seen = HashSet::with_capacity(properties.len());
    for decl in properties {
        if !is_identifier(&decl.name) || !seen.insert(decl.name.as_str()) {
            return Err(Error::InvalidPropertyName(decl.name.clone()));
        }
        if let PropertyKind::List { count, .. } = decl.kind {
            if !count.is_unsigned_integer() {
                return Err(Error::invalid_type(
                    &decl.name,
                    &format!("list count type '{}' is not an unsigned integer", count),
                ));
            }
        }
    }
    Ok(())
}

fn check_row(properties: &[PropertyDecl], index: usize, row: &Row) -> Result<()> {
    if row.len() != properties.len() {
        return Err(Error::schema_mismatch(
            index,
            format!("expected {} values, found {}", properties.len(), row.len()),
        ));
    }
    for (decl, value) in properties.iter().zip(row) {
        match (decl.kind, value) {
            (PropertyKind::Scalar(kind), Value::Scalar(s)) => check_kind(&decl.name, kind, *s)?,
            (PropertyKind::List { item, .. }, Value::List(items)) => {
                for s in items {
                    check_kind(&decl.name, item, *s)?;
                }
            }
            (PropertyKind::Scalar(_), Value::List(_)) => {
                return Err(Error::schema_mismatch(
                    index,
                    format!("property '{}' is a scalar but a list was given", decl.name),
                ));
            }
            (PropertyKind::List { .. }, Value::Scalar(_)) => {
                return Err(Error::schema_mismatch(
                    index,
                    format!("property '{}' is a list but a scalar was given", decl.name),
                ));
            }
        }
    }
    Ok(())
}

fn check_kind(property: &str, expected: ScalarKind, value: Scalar) -> Result<()> {
    if value.kind() == expected {
        Ok(())
    } else {
        Err(Error::invalid_type(
            property,
            &format!("expected {}, found {}", expected, value.kind()),
        ))
    }
}

/// Column-oriented construction of an [`Element`].
///
/// Columns are added in property order and must all have the same length.
#[derive(Debug, Default)]
pub struct ElementBuilder {
    properties: Vec<PropertyDecl>,
    columns: Vec<Vec<Value>>,
}

impl ElementBuilder {
    /// Adds a scalar property of kind `T::KIND`.
    #[must_use]
    pub fn scalar<T, I>(mut self, name: impl Into<String>, values: I) -> Self
    where
        T: ScalarType,
        I: IntoIterator<Item = T>,
    {
        self.properties.push(PropertyDecl::scalar(name, T::KIND));
        self.columns.push(
            values
                .into_iter()
                .map(|v| Value::Scalar(v.into_scalar()))
                .collect(),
        );
        self
    }

    /// Adds a list property. Count and item kinds are inferred from the data;
    /// a column without any item gets item kind `Int32`.
    #[must_use]
    pub fn list<T, L, I>(mut self, name: impl Into<String>, lists: I) -> Self
    where
        T: ScalarType,
        L: IntoIterator<Item = T>,
        I: IntoIterator<Item = L>,
    {
        let column: Vec<Value> = lists
            .into_iter()
            .map(|list| Value::List(list.into_iter().map(ScalarType::into_scalar).collect()))
            .collect();
        let (count, item) = infer_list_kinds(column.iter().filter_map(Value::as_list));
        self.properties.push(PropertyDecl::list(name, count, item));
        self.columns.push(column);
        self
    }

    /// Transposes the columns into rows and validates the result.
    ///
    /// # Errors
    ///
    /// [`Error::SchemaMismatch`] if the columns differ in length, plus
    /// anything [`Element::new`] reports.
    pub fn build(self) -> Result<Element> {
        let len = self.columns.first().map_or(0, Vec::len);
        if let Some((decl, column)) = self
            .properties
            .iter()
            .zip(&self.columns)
            .find(|(_, column)| column.len() != len)
        {
            return Err(Error::schema_mismatch(
                len.min(column.len()),
                format!(
                    "column '{}' has {} rows, expected {}",
                    decl.name,
                    column.len(),
                    len
                ),
            ));
        }

        let mut columns: Vec<_> = self.columns.into_iter().map(Vec::into_iter).collect();
        let rows = (0..len)
            .map(|_| columns.iter_mut().filter_map(Iterator::next).collect())
            .collect();
        Element::new(self.properties, rows)
    }
}

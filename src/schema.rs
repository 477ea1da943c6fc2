//! The schema model: what a PLY header declares.
//!
//! A [`Header`] lists elements in file order. Each [`ElementSchema`] has a
//! name, a row count and an ordered list of [`PropertyDecl`]s. A property is
//! either a single scalar or a count-prefixed list of scalars, see
//! [`PropertyKind`].
//!
//! ```text
//! ply
//! format ascii 1.0
//! element vertex 8                      <- ElementSchema { name, count, .. }
//! property float x                      <- PropertyKind::Scalar(Float32)
//! element face 6
//! property list uchar int vertex_index  <- PropertyKind::List { count: UInt8, item: Int32 }
//! end_header
//! ```

use crate::types::{Encoding, Scalar, ScalarKind};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Returns `true` if `name` can be used as an element or property name.
///
/// Identifiers are non-empty, made of ASCII letters, digits and underscores,
/// and do not start with a digit.
///
/// # Examples
///
/// ```rust
/// use plyformat::is_identifier;
///
/// assert!(is_identifier("vertex_index"));
/// assert!(is_identifier("_x1"));
/// assert!(!is_identifier("1x"));
/// assert!(!is_identifier("red-channel"));
/// assert!(!is_identifier(""));
/// ```
#[must_use]
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

/// Whether a property holds one scalar or a list of scalars per row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PropertyKind {
    Scalar(ScalarKind),
    /// `count` is always one of the unsigned integer kinds.
    List { count: ScalarKind, item: ScalarKind },
}

impl PropertyKind {
    #[inline]
    #[must_use]
    pub const fn is_list(&self) -> bool {
        matches!(self, PropertyKind::List { .. })
    }

    /// The kind of the values stored: the scalar itself or the list items.
    #[must_use]
    pub const fn value_kind(&self) -> ScalarKind {
        match *self {
            PropertyKind::Scalar(kind) => kind,
            PropertyKind::List { item, .. } => item,
        }
    }
}

/// One named property of an element.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PropertyDecl {
    pub name: String,
    pub kind: PropertyKind,
}

impl PropertyDecl {
    /// Declares a scalar property.
    pub fn scalar(name: impl Into<String>, kind: ScalarKind) -> Self {
        PropertyDecl {
            name: name.into(),
            kind: PropertyKind::Scalar(kind),
        }
    }

    /// Declares a list property.
    ///
    /// When an element is built from rows the count kind is recomputed from
    /// the longest list, so `UInt8` is a fine placeholder.
    pub fn list(name: impl Into<String>, count: ScalarKind, item: ScalarKind) -> Self {
        PropertyDecl {
            name: name.into(),
            kind: PropertyKind::List { count, item },
        }
    }
}

impl fmt::Display for PropertyDecl {
    /// Formats the declaration as its header line.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            PropertyKind::Scalar(kind) => write!(f, "property {} {}", kind, self.name),
            PropertyKind::List { count, item } => {
                write!(f, "property list {} {} {}", count, item, self.name)
            }
        }
    }
}

/// An element declaration: name, row count and properties.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementSchema {
    pub name: String,
    pub count: usize,
    pub properties: Vec<PropertyDecl>,
}

impl ElementSchema {
    pub fn new(name: impl Into<String>, count: usize) -> Self {
        ElementSchema {
            name: name.into(),
            count,
            properties: Vec::new(),
        }
    }

    /// Returns `true` if no property is a list. Such elements have a fixed row width.
    #[must_use]
    pub fn is_pure_scalar(&self) -> bool {
        self.properties.iter().all(|p| !p.kind.is_list())
    }

    #[must_use]
    pub fn property(&self, name: &str) -> Option<&PropertyDecl> {
        self.properties.iter().find(|p| p.name == name)
    }
}

/// A parsed or to-be-written PLY header.
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Header {
    pub encoding: Encoding,
    /// Comment lines without the `comment ` prefix.
    pub comments: Vec<String>,
    pub elements: Vec<ElementSchema>,
}

impl Header {
    #[must_use]
    pub fn element(&self, name: &str) -> Option<&ElementSchema> {
        self.elements.iter().find(|e| e.name == name)
    }
}

/// Selects the narrowest count kind able to hold `max_len`.
///
/// # Examples
///
/// ```rust
/// use plyformat::{count_kind_for, ScalarKind};
///
/// assert_eq!(count_kind_for(255), ScalarKind::UInt8);
/// assert_eq!(count_kind_for(256), ScalarKind::UInt16);
/// assert_eq!(count_kind_for(65535), ScalarKind::UInt16);
/// assert_eq!(count_kind_for(65536), ScalarKind::UInt32);
/// ```
#[must_use]
pub fn count_kind_for(max_len: usize) -> ScalarKind {
    if max_len < 256 {
        ScalarKind::UInt8
    } else if max_len < 65536 {
        ScalarKind::UInt16
    } else {
        ScalarKind::UInt32
    }
}

/// Infers `(count, item)` kinds for a list column from its values.
///
/// The item kind is taken from the first item found; a column without any
/// item defaults to `Int32`. Item kinds are not checked for consistency here.
pub fn infer_list_kinds<'a, I>(lists: I) -> (ScalarKind, ScalarKind)
where
    I: IntoIterator<Item = &'a [Scalar]>,
{
    let mut max_len = 0;
    let mut item = None;
    for list in lists {
        max_len = max_len.max(list.len());
        if item.is_none() {
            item = list.first().map(Scalar::kind);
        }
    }
    (count_kind_for(max_len), item.unwrap_or(ScalarKind::Int32))
}

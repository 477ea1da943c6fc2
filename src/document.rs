//! A whole PLY file in memory.
//!
//! A [`Document`] is the header comments plus every element in file order.
//! Most meshes only have `vertex` and `face` elements; [`Vertices`] and
//! [`Faces`] are thin wrappers that let the top-level
//! [`write`](crate::write) accept plain coordinate and index tables as well
//! as prebuilt elements.

use crate::schema::{is_identifier, PropertyDecl};
use crate::types::{ScalarKind, ScalarType};
use crate::{Element, ElementMap, Error, Result};
use serde::Serialize;

/// Name of the element holding vertex data.
pub const VERTEX: &str = "vertex";
/// Name of the element holding face data.
pub const FACE: &str = "face";

/// Header comments and elements, in file order.
#[derive(Clone, Debug, PartialEq, Default, Serialize)]
pub struct Document {
    pub comments: Vec<String>,
    pub elements: ElementMap,
}

impl Document {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one comment line.
    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comments.push(comment.into());
        self
    }

    /// Appends an element after the existing ones.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidElementName`] if `name` is not an identifier or is
    /// already used.
    pub fn push_element(&mut self, name: impl Into<String>, element: Element) -> Result<()> {
        let name = name.into();
        if !is_identifier(&name) || self.elements.contains_key(&name) {
            return Err(Error::InvalidElementName(name));
        }
        self.elements.insert(name, element);
        Ok(())
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Element> {
        self.elements.get(name)
    }

    #[must_use]
    pub fn vertices(&self) -> Option<&Element> {
        self.get(VERTEX)
    }

    #[must_use]
    pub fn faces(&self) -> Option<&Element> {
        self.get(FACE)
    }

    /// Assembles a mesh document: `vertex`, then `face`, then `others` in
    /// their own order.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidElementName`] if `others` uses `vertex`, `face` or a
    /// name that is not an identifier.
    pub fn from_mesh(vertices: Vertices, faces: Faces, others: ElementMap) -> Result<Document> {
        let mut document = Document::new();
        document.push_element(VERTEX, vertices.0)?;
        document.push_element(FACE, faces.0)?;
        for (name, element) in others {
            document.push_element(name, element)?;
        }
        Ok(document)
    }

    /// Splits a mesh document into its vertex and face elements and the
    /// remaining ones.
    ///
    /// A missing `vertex` element becomes an empty `x`, `y`, `z` double
    /// table; a missing `face` element an empty `vertex_index` list of ints.
    #[must_use]
    pub fn into_parts(self) -> (Element, Element, ElementMap) {
        let mut elements = self.elements;
        let vertices = elements.remove(VERTEX).unwrap_or_else(|| Vertices::default().0);
        let faces = elements.remove(FACE).unwrap_or_else(|| Faces::default().0);
        (vertices, faces, elements)
    }
}

/// Vertex data for [`write`](crate::write).
///
/// Converts from an element, or from a table of `[x, y, z]` points:
///
/// ```rust
/// use plyformat::{PropertyKind, ScalarKind, Vertices};
///
/// let vertices = Vertices::from(vec![[0.0f32, 0.0, 0.0], [1.0, 0.0, 0.0]]);
/// let element = vertices.into_element();
/// assert_eq!(element.len(), 2);
/// assert_eq!(element.properties()[2].kind, PropertyKind::Scalar(ScalarKind::Float32));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Vertices(Element);

/// Face data for [`write`](crate::write).
///
/// Converts from an element, or from index lists of any length:
///
/// ```rust
/// use plyformat::Faces;
///
/// let quads = Faces::from(vec![[0u32, 1, 3, 2], [4, 6, 7, 5]]);
/// let mixed = Faces::from(vec![vec![0i32, 1, 2], vec![2, 3, 4, 5]]);
/// assert_eq!(quads.into_element().len(), 2);
/// assert_eq!(mixed.into_element().lists::<i32>("vertex_index").unwrap()[1].len(), 4);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Faces(Element);

impl Vertices {
    #[must_use]
    pub fn into_element(self) -> Element {
        self.0
    }
}

impl Faces {
    #[must_use]
    pub fn into_element(self) -> Element {
        self.0
    }
}

impl Default for Vertices {
    fn default() -> Self {
        let properties = ["x", "y", "z"]
            .into_iter()
            .map(|name| PropertyDecl::scalar(name, ScalarKind::Float64))
            .collect();
        Vertices(Element::from_decoded(properties, Vec::new()))
    }
}

impl Default for Faces {
    fn default() -> Self {
        Faces(Element::from_decoded(
            vec![PropertyDecl::list(
                "vertex_index",
                ScalarKind::UInt8,
                ScalarKind::Int32,
            )],
            Vec::new(),
        ))
    }
}

impl From<Element> for Vertices {
    fn from(element: Element) -> Self {
        Vertices(element)
    }
}

impl<T: ScalarType> From<Vec<[T; 3]>> for Vertices {
    fn from(points: Vec<[T; 3]>) -> Self {
        Vertices(Element::from_points(&points))
    }
}

impl<T: ScalarType> From<&[[T; 3]]> for Vertices {
    fn from(points: &[[T; 3]]) -> Self {
        Vertices(Element::from_points(points))
    }
}

impl From<Element> for Faces {
    fn from(element: Element) -> Self {
        Faces(element)
    }
}

impl<T: ScalarType> From<Vec<Vec<T>>> for Faces {
    fn from(lists: Vec<Vec<T>>) -> Self {
        Faces(Element::from_index_lists(&lists))
    }
}

impl<T: ScalarType> From<&[Vec<T>]> for Faces {
    fn from(lists: &[Vec<T>]) -> Self {
        Faces(Element::from_index_lists(lists))
    }
}

impl<T: ScalarType, const N: usize> From<Vec<[T; N]>> for Faces {
    fn from(lists: Vec<[T; N]>) -> Self {
        Faces(Element::from_index_lists(&lists))
    }
}

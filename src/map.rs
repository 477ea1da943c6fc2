//! Ordered map of element names to elements.
//!
//! [`ElementMap`] wraps an [`IndexMap`] so elements keep the order they were
//! inserted in. That order is the order they are declared in the header and
//! written in the data section.
//!
//! ## Examples
//!
//! ```rust
//! use plyformat::{Element, ElementMap};
//!
//! let mut map = ElementMap::new();
//! map.insert("edge", Element::from_index_lists(&[[0i32, 1]]));
//! map.insert("material", Element::default());
//!
//! let names: Vec<_> = map.keys().cloned().collect();
//! assert_eq!(names, vec!["edge", "material"]);
//! ```

use crate::Element;
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::HashMap;

/// An insertion-ordered map of element names to [`Element`]s.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct ElementMap(IndexMap<String, Element>);

impl ElementMap {
    #[must_use]
    pub fn new() -> Self {
        ElementMap(IndexMap::new())
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        ElementMap(IndexMap::with_capacity(capacity))
    }

    /// Inserts an element. If the name was already present, the old element
    /// is returned and the name keeps its original position.
    pub fn insert(&mut self, name: impl Into<String>, element: Element) -> Option<Element> {
        self.0.insert(name.into(), element)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Element> {
        self.0.get(name)
    }

    /// Removes an element, keeping the order of the remaining ones.
    pub fn remove(&mut self, name: &str) -> Option<Element> {
        self.0.shift_remove(name)
    }

    #[must_use]
    pub fn contains_key(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns an iterator over the names, in insertion order.
    pub fn keys(&self) -> indexmap::map::Keys<'_, String, Element> {
        self.0.keys()
    }

    /// Returns an iterator over the elements, in insertion order.
    pub fn values(&self) -> indexmap::map::Values<'_, String, Element> {
        self.0.values()
    }

    /// Returns an iterator over name/element pairs, in insertion order.
    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Element> {
        self.0.iter()
    }
}

impl From<HashMap<String, Element>> for ElementMap {
    fn from(map: HashMap<String, Element>) -> Self {
        ElementMap(map.into_iter().collect())
    }
}

impl IntoIterator for ElementMap {
    type Item = (String, Element);
    type IntoIter = indexmap::map::IntoIter<String, Element>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ElementMap {
    type Item = (&'a String, &'a Element);
    type IntoIter = indexmap::map::Iter<'a, String, Element>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<K: Into<String>> FromIterator<(K, Element)> for ElementMap {
    fn from_iter<T: IntoIterator<Item = (K, Element)>>(iter: T) -> Self {
        ElementMap(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/*!
Element arena with parent/child relationships.

Single owner of every element parsed from one dump. Parents are references
by [`ElementId`] into the same arena, never a second owning pointer.

## Invariants

1. **Document order**: elements are stored in the order the dump lists them,
   and `ElementId` is the arena index.
2. **Parents precede children**: a resolved parent always has a smaller id
   than its child, so ancestor walks terminate and no cycle can form.
3. **Bidirectional consistency**: `parent == Some(p)` exactly when the element
   appears in `p`'s `children`.
4. **Unknown parents are roots**: an element whose declared parent node id
   matches nothing keeps `parent == None`.
*/

use std::collections::HashMap;

use crate::types::{Element, ElementId, Screen};

/// A parsed hierarchy dump.
#[derive(Debug, Clone, Default)]
pub struct Hierarchy {
  elements: Vec<Element>,
  roots: Vec<ElementId>,
  screen: Screen,
}

impl Hierarchy {
  /// All elements in document order.
  pub fn elements(&self) -> &[Element] {
    &self.elements
  }

  pub fn iter(&self) -> std::slice::Iter<'_, Element> {
    self.elements.iter()
  }

  pub fn len(&self) -> usize {
    self.elements.len()
  }

  pub fn is_empty(&self) -> bool {
    self.elements.is_empty()
  }

  /// Screen extent covering every element.
  pub const fn screen(&self) -> Screen {
    self.screen
  }

  /// Elements without a resolved parent.
  pub fn roots(&self) -> impl Iterator<Item = &Element> {
    self.roots.iter().filter_map(|&id| self.get(id))
  }

  pub fn get(&self, id: ElementId) -> Option<&Element> {
    self.elements.get(id.index())
  }

  /// Resolved parent of an element.
  pub fn parent(&self, id: ElementId) -> Option<&Element> {
    self.get(id)?.parent.and_then(|p| self.get(p))
  }

  /// Children of an element in document order (empty if none or unknown id).
  pub fn children(&self, id: ElementId) -> impl Iterator<Item = &Element> {
    self
      .get(id)
      .map_or(&[][..], |e| e.children.as_slice())
      .iter()
      .filter_map(|&c| self.get(c))
  }

  /// Walk from the element's parent up to its root.
  pub fn ancestors(&self, id: ElementId) -> Ancestors<'_> {
    Ancestors {
      hierarchy: self,
      next: self.get(id).and_then(|e| e.parent),
    }
  }

  /// First element carrying this platform node id.
  pub fn find_by_node_id(&self, node_id: &str) -> Option<&Element> {
    self.elements.iter().find(|e| e.node_id == node_id)
  }

  /// First element whose text contains `needle`.
  pub fn find_by_text(&self, needle: &str) -> Option<&Element> {
    self
      .elements
      .iter()
      .find(|e| !e.text.is_empty() && e.text.contains(needle))
  }

  /// Check whether any element's text contains `needle`.
  pub fn contains_text(&self, needle: &str) -> bool {
    self.find_by_text(needle).is_some()
  }
}

impl<'a> IntoIterator for &'a Hierarchy {
  type Item = &'a Element;
  type IntoIter = std::slice::Iter<'a, Element>;

  fn into_iter(self) -> Self::IntoIter {
    self.elements.iter()
  }
}

/// Iterator over an element's ancestors, nearest first.
#[derive(Debug, Clone)]
pub struct Ancestors<'a> {
  hierarchy: &'a Hierarchy,
  next: Option<ElementId>,
}

impl<'a> Iterator for Ancestors<'a> {
  type Item = &'a Element;

  fn next(&mut self) -> Option<Self::Item> {
    let current = self.hierarchy.get(self.next?)?;
    self.next = current.parent;
    Some(current)
  }
}

/// Incremental construction of a [`Hierarchy`].
///
/// Elements are pushed in document order under the node currently being
/// expanded. [`HierarchyBuilder::finish`] resolves parents by node id.
#[derive(Debug, Default)]
pub struct HierarchyBuilder {
  elements: Vec<Element>,
}

impl HierarchyBuilder {
  pub fn new() -> Self {
    Self::default()
  }

  /// Append an element nested under `parent` (`None` for the document root).
  ///
  /// Records the parent's node id; the link itself is resolved in `finish`.
  pub fn push(&mut self, mut element: Element, parent: Option<ElementId>) -> ElementId {
    let id = ElementId(u32::try_from(self.elements.len()).unwrap_or(u32::MAX));
    element.id = id;
    element.parent = None;
    element.children.clear();
    element.parent_node_id = parent
      .and_then(|p| self.elements.get(p.index()))
      .map(|p| p.node_id.clone());
    self.elements.push(element);
    id
  }

  /// Resolve parent links and derive the screen extent.
  pub fn finish(self) -> Hierarchy {
    let mut elements = self.elements;

    // First occurrence wins so a parent always precedes its children.
    let mut by_node_id: HashMap<&str, ElementId> = HashMap::new();
    for element in &elements {
      by_node_id.entry(element.node_id.as_str()).or_insert(element.id);
    }

    let links: Vec<Option<ElementId>> = elements
      .iter()
      .map(|element| {
        let declared = element.parent_node_id.as_deref().filter(|p| !p.is_empty())?;
        let parent = by_node_id.get(declared).copied();
        match parent {
          Some(p) if p < element.id => Some(p),
          Some(p) => {
            log::debug!(
              "element {} declares parent {declared:?} resolving to later element {p}, treating as root",
              element.id
            );
            None
          }
          None => {
            log::trace!("element {} declares unknown parent {declared:?}", element.id);
            None
          }
        }
      })
      .collect();
    drop(by_node_id);

    let mut roots = Vec::new();
    for (index, link) in links.into_iter().enumerate() {
      let Some(child) = elements.get_mut(index) else {
        continue;
      };
      child.parent = link;
      let child_id = child.id;
      match link {
        Some(parent) => {
          if let Some(p) = elements.get_mut(parent.index()) {
            p.children.push(child_id);
          }
        }
        None => roots.push(child_id),
      }
    }

    let screen = Screen::covering(elements.iter().map(|e| &e.bounds));
    Hierarchy {
      elements,
      roots,
      screen,
    }
  }
}

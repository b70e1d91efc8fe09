/*!
Effective clickability.

Dumps often mark only a wrapper as clickable while the label or icon inside
it is what a user sees and taps. An element is effectively clickable when it
is clickable itself, or when an ancestor passes it the interaction:

- an ancestor of the same class that is clickable, or
- a clickable layout ancestor, for a text view whose text carries an action
  keyword or an image view with a description.
*/

use crate::config::EngineConfig;
use crate::hierarchy::Hierarchy;
use crate::types::Element;

/// Resolves inherited interactivity through the parent chain.
#[derive(Debug, Clone, Copy)]
pub struct ClickabilityResolver<'a> {
  hierarchy: &'a Hierarchy,
  config: &'a EngineConfig,
}

impl<'a> ClickabilityResolver<'a> {
  pub const fn new(hierarchy: &'a Hierarchy, config: &'a EngineConfig) -> Self {
    Self { hierarchy, config }
  }

  pub fn is_effectively_clickable(&self, element: &Element) -> bool {
    if element.clickable {
      return true;
    }
    self
      .hierarchy
      .ancestors(element.id)
      .filter(|ancestor| ancestor.clickable)
      .any(|ancestor| {
        ancestor.class_name == element.class_name
          || (ancestor.kind().is_layout() && self.promoted_by_layout(element))
      })
  }

  /// Whether a clickable layout ancestor lends its clickability to `element`.
  fn promoted_by_layout(&self, element: &Element) -> bool {
    let kind = element.kind();
    if kind.is_text_label() {
      self.has_action_keyword(element.trimmed_text())
    } else if kind.is_image() {
      element.has_description()
    } else {
      false
    }
  }

  fn has_action_keyword(&self, text: &str) -> bool {
    if text.is_empty() {
      return false;
    }
    let lower = text.to_lowercase();
    self
      .config
      .action_keywords
      .iter()
      .any(|keyword| lower.contains(&keyword.to_lowercase()))
  }

  /// Number of `elements` that are effectively clickable.
  pub fn count(&self, elements: &[&Element]) -> usize {
    elements
      .iter()
      .filter(|e| self.is_effectively_clickable(e))
      .count()
  }
}

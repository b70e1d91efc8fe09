/*! Element type representing one node of a parsed hierarchy dump. */

use super::{Bounds, ElementId};
use crate::widget::WidgetKind;
use std::sync::OnceLock;

/// A node of the UI hierarchy.
///
/// Structural fields are fixed once the hierarchy is built. The only derived
/// value is `visibility_percentage`, written at most once by the visibility
/// gate.
///
/// Parent linkage semantics:
/// - `parent_node_id=None` → root of the dump
/// - `parent_node_id=Some(_), parent=Some(id)` → parent resolved by node id
/// - `parent_node_id=Some(_), parent=None` → declared parent unknown; treated as a root
#[derive(Debug, Clone, Default)]
pub struct Element {
  pub id: ElementId,
  /// Platform node identifier (`source-node-id`), verbatim.
  pub node_id: String,
  /// Platform widget type (e.g. `android.widget.TextView`), verbatim.
  pub class_name: String,
  pub text: String,
  pub content_description: String,
  pub resource_id: String,
  pub bounds: Bounds,

  // === States ===
  pub visible_to_user: bool,
  pub important: bool,
  pub clickable: bool,

  // === Hierarchy ===
  /// Node id of the enclosing node as recorded in the dump.
  pub parent_node_id: Option<String>,
  /// Resolved parent. Lookup only; the hierarchy owns children top-down.
  pub parent: Option<ElementId>,
  /// Children in document order.
  pub children: Vec<ElementId>,

  visibility_percentage: OnceLock<f64>,
}

impl Element {
  /// Create a detached element. `id` and parent links are assigned when it
  /// is pushed into a [`HierarchyBuilder`](crate::HierarchyBuilder).
  pub fn new(class_name: impl Into<String>, bounds: Bounds) -> Self {
    Self {
      class_name: class_name.into(),
      bounds,
      ..Self::default()
    }
  }

  #[must_use]
  pub fn with_node_id(mut self, node_id: impl Into<String>) -> Self {
    self.node_id = node_id.into();
    self
  }

  #[must_use]
  pub fn with_text(mut self, text: impl Into<String>) -> Self {
    self.text = text.into();
    self
  }

  #[must_use]
  pub fn with_description(mut self, description: impl Into<String>) -> Self {
    self.content_description = description.into();
    self
  }

  #[must_use]
  pub fn with_resource_id(mut self, resource_id: impl Into<String>) -> Self {
    self.resource_id = resource_id.into();
    self
  }

  #[must_use]
  pub const fn visible(mut self, visible: bool) -> Self {
    self.visible_to_user = visible;
    self
  }

  #[must_use]
  pub const fn important(mut self, important: bool) -> Self {
    self.important = important;
    self
  }

  #[must_use]
  pub const fn clickable(mut self, clickable: bool) -> Self {
    self.clickable = clickable;
    self
  }

  /// Widget classification of `class_name`.
  pub fn kind(&self) -> WidgetKind {
    WidgetKind::from_class_name(&self.class_name)
  }

  /// Text with surrounding whitespace removed.
  pub fn trimmed_text(&self) -> &str {
    self.text.trim()
  }

  pub fn trimmed_description(&self) -> &str {
    self.content_description.trim()
  }

  /// Non-blank text.
  pub fn has_text(&self) -> bool {
    !self.trimmed_text().is_empty()
  }

  /// Non-blank content description.
  pub fn has_description(&self) -> bool {
    !self.trimmed_description().is_empty()
  }

  /// Raw text or description present, whitespace included.
  pub fn has_any_label(&self) -> bool {
    !self.text.is_empty() || !self.content_description.is_empty()
  }

  /// Percentage of the element on screen, once the visibility gate has run.
  pub fn visibility_percentage(&self) -> Option<f64> {
    self.visibility_percentage.get().copied()
  }

  /// Record the gate's visibility measurement. Later writes are ignored.
  pub(crate) fn record_visibility(&self, percentage: f64) {
    if self.visibility_percentage.set(percentage).is_err() {
      log::trace!("visibility for {} already recorded", self.id);
    }
  }

  /// Human-readable label: trimmed text, else description, else the trailing
  /// segment of the resource id, else the trailing segment of the class name.
  pub fn display_label(&self, max_chars: usize, class_max_chars: usize) -> String {
    if self.has_text() {
      return truncate_chars(self.trimmed_text(), max_chars);
    }
    if self.has_description() {
      return truncate_chars(self.trimmed_description(), max_chars);
    }
    if !self.resource_id.trim().is_empty() {
      let tail = self.resource_id.rsplit('/').next().unwrap_or_default();
      return truncate_chars(tail, max_chars);
    }
    let tail = self.class_name.rsplit('.').next().unwrap_or_default();
    truncate_chars(tail, class_max_chars)
  }
}

fn truncate_chars(s: &str, max_chars: usize) -> String {
  s.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  fn text_view() -> Element {
    Element::new("android.widget.TextView", Bounds::new(0, 0, 100, 40))
  }

  mod display_label {
    use super::*;

    #[test]
    fn prefers_trimmed_text() {
      let e = text_view().with_text("  确定  ").with_description("confirm");
      assert_eq!(e.display_label(20, 15), "确定");
    }

    #[test]
    fn falls_back_to_description() {
      let e = text_view().with_text("   ").with_description("返回");
      assert_eq!(e.display_label(20, 15), "返回");
    }

    #[test]
    fn falls_back_to_resource_id_tail() {
      let e = text_view().with_resource_id("com.example:id/search_box");
      assert_eq!(e.display_label(20, 15), "search_box");
    }

    #[test]
    fn falls_back_to_class_tail() {
      assert_eq!(text_view().display_label(20, 15), "TextView");
    }

    #[test]
    fn truncates_by_characters_not_bytes() {
      let e = text_view().with_text("请使用微信扫码支付请使用微信扫码支付请使用");
      assert_eq!(e.display_label(5, 15), "请使用微信");
    }
  }

  #[test]
  fn visibility_is_write_once() {
    let e = text_view();
    assert_eq!(e.visibility_percentage(), None);
    e.record_visibility(80.0);
    e.record_visibility(20.0);
    assert_eq!(e.visibility_percentage(), Some(80.0), "first write wins");
  }

  #[test]
  fn any_label_counts_whitespace() {
    assert!(text_view().with_text(" ").has_any_label());
    assert!(!text_view().with_text(" ").has_text());
  }
}

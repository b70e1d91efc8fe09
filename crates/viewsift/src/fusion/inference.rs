/*!
Content inference from hierarchy elements.

Derives content items (search boxes, inputs, buttons, labels, icons) straight
from visible elements, for use when no text recognizer ran or to fill what it
missed. Items are moved into screenshot coordinates and consolidated before
they are returned.
*/

use crate::config::FusionConfig;
use crate::fusion::classify::contains_any;
use crate::types::{AnnotatedContent, ContentSource, ContentType, Element};

const INPUT_ID_HINTS: &[&str] = &["search", "edit", "input"];
const BUTTON_SEARCH_KEYWORDS: &[&str] = &["搜索", "search", "查找"];
const BUTTON_ACTION_KEYWORDS: &[&str] = &["确定", "取消", "确认", "提交"];
const TEXT_SEARCH_KEYWORDS: &[&str] = &["搜索", "search", "查找", "输入"];

const SEARCH_PLACEHOLDER: &str = "搜索框";
const INPUT_PLACEHOLDER: &str = "输入框";
const BUTTON_PLACEHOLDER: &str = "按钮";

/// Infer content items from elements and consolidate overlapping ones.
pub fn infer_contents(elements: &[&Element], config: &FusionConfig) -> Vec<AnnotatedContent> {
  let inferred: Vec<AnnotatedContent> = elements
    .iter()
    .filter_map(|element| infer_one(element, config.inferred_offset_y))
    .collect();
  let count = inferred.len();
  let consolidated = consolidate(inferred, config.consolidation_overlap);
  log::debug!(
    "Inferred {count} content items from {} elements, {} after consolidation",
    elements.len(),
    consolidated.len()
  );
  consolidated
}

/// Infer at most one content item from an element.
pub fn infer_one(element: &Element, offset_y: i32) -> Option<AnnotatedContent> {
  let kind = element.kind();
  let resource_id = element.resource_id.to_lowercase();
  let text = element.trimmed_text();

  let (content_type, label, confidence) =
    if kind.is_text_input() || contains_any(&resource_id, INPUT_ID_HINTS) {
      if resource_id.contains("search") {
        (ContentType::SearchInput, or_placeholder(text, SEARCH_PLACEHOLDER), 0.9)
      } else {
        (ContentType::Input, or_placeholder(text, INPUT_PLACEHOLDER), 0.9)
      }
    } else if kind.is_button() || element.clickable {
      let label = if text.is_empty() {
        or_placeholder(element.trimmed_description(), BUTTON_PLACEHOLDER)
      } else {
        text.to_string()
      };
      let lower = text.to_lowercase();
      let content_type = if contains_any(&lower, BUTTON_SEARCH_KEYWORDS) {
        ContentType::SearchInput
      } else if contains_any(&lower, BUTTON_ACTION_KEYWORDS) {
        ContentType::ButtonText
      } else {
        ContentType::Button
      };
      (content_type, label, 0.8)
    } else if element.important && !text.is_empty() {
      let content_type = if contains_any(&text.to_lowercase(), TEXT_SEARCH_KEYWORDS) {
        ContentType::SearchInput
      } else {
        ContentType::Text
      };
      (content_type, text.to_string(), 0.8)
    } else if kind.is_image() && element.has_description() {
      (ContentType::Icon, element.trimmed_description().to_string(), 0.7)
    } else {
      return None;
    };

  Some(AnnotatedContent {
    content_type,
    text: label,
    confidence,
    bounds: element.bounds.shifted_y(-offset_y),
    source: ContentSource::Inferred,
    matched_element_id: Some(element.node_id.clone()),
    matched_class_name: Some(element.class_name.clone()),
    matched: true,
  })
}

fn or_placeholder(text: &str, placeholder: &str) -> String {
  if text.is_empty() {
    placeholder.to_string()
  } else {
    text.to_string()
  }
}

/// Merge items of the same type whose boxes overlap more than `threshold`.
///
/// Anchored on the earliest unmerged item. Each group keeps its most
/// confident member (earliest on ties) stretched over the union of the group.
pub fn consolidate(items: Vec<AnnotatedContent>, threshold: f64) -> Vec<AnnotatedContent> {
  let mut used = vec![false; items.len()];
  let mut result = Vec::with_capacity(items.len());

  for (i, anchor) in items.iter().enumerate() {
    if used.get(i).copied().unwrap_or(true) {
      continue;
    }
    let mut best = anchor;
    let mut bounds = anchor.bounds;
    for (j, other) in items.iter().enumerate().skip(i + 1) {
      let Some(slot) = used.get_mut(j) else {
        continue;
      };
      if *slot
        || other.content_type != anchor.content_type
        || anchor.bounds.overlap_ratio(&other.bounds) <= threshold
      {
        continue;
      }
      *slot = true;
      bounds = bounds.union(&other.bounds);
      if other.confidence > best.confidence {
        best = other;
      }
    }
    result.push(AnnotatedContent {
      bounds,
      ..best.clone()
    });
  }
  result
}

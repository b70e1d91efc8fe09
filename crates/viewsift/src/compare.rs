/*!
Comparison of two hierarchy dumps of (usually) the same app.
*/

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::config::{EngineConfig, PageKindRule};
use crate::hierarchy::Hierarchy;
use crate::types::Element;
use crate::widget::WidgetKind;

/// Kind reported when no rule matches.
pub const UNKNOWN_PAGE_KIND: &str = "unknown";

/// Page classification by keyword.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PageKind {
  pub kind: String,
  /// The keyword that decided it, if any rule matched.
  pub keyword: Option<String>,
}

impl PageKind {
  /// First rule whose keyword appears in the joined, lowercased element texts.
  pub fn identify(hierarchy: &Hierarchy, rules: &[PageKindRule]) -> Self {
    let joined = hierarchy
      .iter()
      .filter(|e| e.has_text())
      .map(|e| e.text.as_str())
      .collect::<Vec<_>>()
      .join(" ")
      .to_lowercase();

    rules
      .iter()
      .find(|rule| joined.contains(&rule.keyword.to_lowercase()))
      .map_or_else(Self::unknown, |rule| Self {
        kind: rule.kind.clone(),
        keyword: Some(rule.keyword.clone()),
      })
  }

  pub fn unknown() -> Self {
    Self {
      kind: UNKNOWN_PAGE_KIND.to_string(),
      keyword: None,
    }
  }

  pub const fn is_unknown(&self) -> bool {
    self.keyword.is_none()
  }
}

/// A count on each side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CountDiff {
  pub a: usize,
  pub b: usize,
  #[ts(type = "number")]
  pub delta: i64,
}

impl CountDiff {
  pub fn new(a: usize, b: usize) -> Self {
    let a_signed = i64::try_from(a).unwrap_or(i64::MAX);
    let b_signed = i64::try_from(b).unwrap_or(i64::MAX);
    Self {
      a,
      b,
      delta: b_signed.saturating_sub(a_signed),
    }
  }

  fn count(a: &Hierarchy, b: &Hierarchy, predicate: impl Fn(&Element) -> bool) -> Self {
    Self::new(
      a.iter().filter(|&e| predicate(e)).count(),
      b.iter().filter(|&e| predicate(e)).count(),
    )
  }
}

/// Web views on one side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct WebViewSummary {
  pub count: usize,
  pub visible_to_user: usize,
}

impl WebViewSummary {
  fn of(hierarchy: &Hierarchy) -> Self {
    let web_views: Vec<&Element> = hierarchy
      .iter()
      .filter(|e| e.kind() == WidgetKind::WebView)
      .collect();
    Self {
      count: web_views.len(),
      visible_to_user: web_views.iter().filter(|e| e.visible_to_user).count(),
    }
  }
}

/// Differences between dump `a` and dump `b`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PageDiff {
  pub total: CountDiff,
  pub visible_to_user: CountDiff,
  pub important: CountDiff,
  pub text: CountDiff,
  pub clickable: CountDiff,
  pub page_kind_a: PageKind,
  pub page_kind_b: PageKind,
  pub web_views_a: WebViewSummary,
  pub web_views_b: WebViewSummary,
  /// Trimmed texts on both sides, sorted.
  pub common_texts: Vec<String>,
  pub only_in_a: Vec<String>,
  pub only_in_b: Vec<String>,
  /// Labels of clickable elements, in document order.
  pub clickable_labels_a: Vec<String>,
  pub clickable_labels_b: Vec<String>,
}

impl PageDiff {
  pub fn between(a: &Hierarchy, b: &Hierarchy, config: &EngineConfig) -> Self {
    let texts_a = text_set(a);
    let texts_b = text_set(b);

    let diff = Self {
      total: CountDiff::new(a.len(), b.len()),
      visible_to_user: CountDiff::count(a, b, |e| e.visible_to_user),
      important: CountDiff::count(a, b, |e| e.important),
      text: CountDiff::count(a, b, Element::has_text),
      clickable: CountDiff::count(a, b, |e| e.clickable),
      page_kind_a: PageKind::identify(a, &config.page_kinds),
      page_kind_b: PageKind::identify(b, &config.page_kinds),
      web_views_a: WebViewSummary::of(a),
      web_views_b: WebViewSummary::of(b),
      common_texts: texts_a.intersection(&texts_b).cloned().collect(),
      only_in_a: texts_a.difference(&texts_b).cloned().collect(),
      only_in_b: texts_b.difference(&texts_a).cloned().collect(),
      clickable_labels_a: clickable_labels(a),
      clickable_labels_b: clickable_labels(b),
    };
    log::debug!(
      "Compared pages: {} vs {} ({} common texts)",
      diff.page_kind_a.kind,
      diff.page_kind_b.kind,
      diff.common_texts.len()
    );
    diff
  }

  pub fn page_kind_changed(&self) -> bool {
    self.page_kind_a.kind != self.page_kind_b.kind
  }
}

fn text_set(hierarchy: &Hierarchy) -> BTreeSet<String> {
  hierarchy
    .iter()
    .filter(|e| e.has_text())
    .map(|e| e.trimmed_text().to_string())
    .collect()
}

/// Text, else description, else class name.
fn clickable_labels(hierarchy: &Hierarchy) -> Vec<String> {
  hierarchy
    .iter()
    .filter(|e| e.clickable)
    .map(|e| {
      if !e.text.is_empty() {
        e.text.clone()
      } else if !e.content_description.is_empty() {
        e.content_description.clone()
      } else {
        e.class_name.clone()
      }
    })
    .collect()
}

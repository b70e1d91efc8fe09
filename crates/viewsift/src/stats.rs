/*!
Hierarchy statistics.
*/

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::types::{Element, Screen};
use crate::widget::looks_like_layout;

/// Share of an element on screen from which it counts as visible.
pub const STATS_VISIBLE_PERCENT: f64 = 80.0;

/// Counts over a set of elements.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct HierarchyStats {
  pub total: usize,
  /// Elements with a non-negative origin and a positive size.
  pub coordinate_elements: usize,
  /// Visibility buckets, over coordinate elements only.
  pub visible: usize,
  pub partially_visible: usize,
  pub invisible: usize,
  pub by_class: BTreeMap<String, usize>,
  pub interactive: usize,
  pub text: usize,
  pub layout: usize,
}

impl HierarchyStats {
  pub fn collect(elements: &[&Element], screen: Screen) -> Self {
    let mut stats = Self {
      total: elements.len(),
      ..Self::default()
    };
    for element in elements {
      let bounds = element.bounds;
      if bounds.left >= 0 && bounds.top >= 0 && bounds.width() > 0 && bounds.height() > 0 {
        stats.coordinate_elements += 1;

        let percentage = bounds.visibility_percentage(screen);
        if percentage >= STATS_VISIBLE_PERCENT {
          stats.visible += 1;
        } else if percentage > 0.0 {
          stats.partially_visible += 1;
        } else {
          stats.invisible += 1;
        }
      }

      *stats.by_class.entry(element.class_name.clone()).or_default() += 1;
      stats.interactive += usize::from(element.clickable);
      stats.text += usize::from(element.has_text());
      stats.layout += usize::from(looks_like_layout(&element.class_name));
    }
    stats
  }

  /// Most frequent classes, ties broken by name.
  pub fn top_classes(&self, n: usize) -> Vec<(&str, usize)> {
    let mut classes: Vec<(&str, usize)> = self
      .by_class
      .iter()
      .map(|(name, count)| (name.as_str(), *count))
      .collect();
    classes.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    classes.truncate(n);
    classes
  }
}

/*!
Visibility gate.

Decides whether an element is really drawn on screen: the platform flag,
minimum size, vertical placement, some sign of content, and finally the share
of its area inside the screen.
*/

use serde::Serialize;

use crate::config::EngineConfig;
use crate::hierarchy::Hierarchy;
use crate::types::{Element, Screen};

/// Outcome of the visibility gate for one element.
///
/// Checks run in declaration order; the first failing one is reported.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "check", rename_all = "snake_case")]
pub enum VisibilityCheck {
  /// Passed every check.
  Visible { percentage: f64 },
  /// Platform reports the element as not visible.
  NotVisibleToUser,
  /// Narrower or shorter than the minimum visible size.
  TooSmall,
  /// Entirely above the status bar or entirely below the screen.
  OutsideVerticalRange,
  /// No text, description, resource id, clickability or importance.
  NoContent,
  /// A generic container with nothing of its own to show.
  EmptyContainer,
  /// Not enough of the element lies on screen.
  BelowThreshold { percentage: f64 },
}

impl VisibilityCheck {
  pub const fn is_visible(&self) -> bool {
    matches!(self, Self::Visible { .. })
  }

  /// On-screen percentage, when the gate got far enough to measure it.
  pub const fn percentage(&self) -> Option<f64> {
    match *self {
      Self::Visible { percentage } | Self::BelowThreshold { percentage } => Some(percentage),
      Self::NotVisibleToUser
      | Self::TooSmall
      | Self::OutsideVerticalRange
      | Self::NoContent
      | Self::EmptyContainer => None,
    }
  }
}

/// Per-screen visibility gate.
#[derive(Debug, Clone, Copy)]
pub struct VisibilityGate<'a> {
  config: &'a EngineConfig,
  screen: Screen,
}

impl<'a> VisibilityGate<'a> {
  pub const fn new(config: &'a EngineConfig, screen: Screen) -> Self {
    Self { config, screen }
  }

  /// Run every check against one element. Pure; records nothing.
  pub fn check(&self, element: &Element) -> VisibilityCheck {
    let bounds = &element.bounds;

    if !element.visible_to_user {
      return VisibilityCheck::NotVisibleToUser;
    }
    if bounds.width() < self.config.min_visible_width || bounds.height() < self.config.min_visible_height {
      return VisibilityCheck::TooSmall;
    }
    if bounds.bottom < self.config.status_bar_height || bounds.top > self.screen.height {
      return VisibilityCheck::OutsideVerticalRange;
    }

    let has_content = element.has_text()
      || element.has_description()
      || !element.resource_id.trim().is_empty()
      || element.clickable
      || element.important;
    if !has_content {
      return VisibilityCheck::NoContent;
    }
    if element.kind().is_generic_container() && !(element.has_any_label() || element.clickable) {
      return VisibilityCheck::EmptyContainer;
    }

    let percentage = bounds.visibility_percentage(self.screen);
    if percentage >= self.config.visibility_threshold {
      VisibilityCheck::Visible { percentage }
    } else {
      VisibilityCheck::BelowThreshold { percentage }
    }
  }

  /// Elements that pass the gate, in document order.
  ///
  /// Records the measured percentage on every element that got far enough to
  /// be measured.
  pub fn filter<'h>(&self, hierarchy: &'h Hierarchy) -> Vec<&'h Element> {
    let visible: Vec<&Element> = hierarchy
      .iter()
      .filter(|element| {
        let check = self.check(element);
        if let Some(percentage) = check.percentage() {
          element.record_visibility(percentage);
        }
        log::trace!("{} {}: {check:?}", element.id, element.class_name);
        check.is_visible()
      })
      .collect();
    log::debug!(
      "Visibility gate kept {} of {} elements",
      visible.len(),
      hierarchy.len()
    );
    visible
  }
}

/// Why an invisible element might be missing from the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OffscreenReason {
  OffLeft,
  OffTop,
  OffRight,
  OffBottom,
  /// Text reports a failed location lookup.
  ErrorState,
  /// Resource id names an error component.
  ErrorComponent,
  /// Background task bar.
  Taskbar,
  /// Transient toast message.
  Toast,
}

/// Placement and semantic hints explaining why an element is hidden.
pub fn offscreen_reasons(element: &Element, screen: Screen) -> Vec<OffscreenReason> {
  let b = &element.bounds;
  let resource_id = element.resource_id.to_lowercase();
  [
    (b.left < 0, OffscreenReason::OffLeft),
    (b.top < 0, OffscreenReason::OffTop),
    (b.right > screen.width, OffscreenReason::OffRight),
    (b.bottom > screen.height, OffscreenReason::OffBottom),
    (element.text.contains("定位获取失败"), OffscreenReason::ErrorState),
    (
      element.resource_id.contains("错误") || resource_id.contains("error"),
      OffscreenReason::ErrorComponent,
    ),
    (resource_id.contains("taskbar"), OffscreenReason::Taskbar),
    (resource_id.contains("toast"), OffscreenReason::Toast),
  ]
  .into_iter()
  .filter_map(|(hit, reason)| hit.then_some(reason))
  .collect()
}

/// Share of the screen area above which an element counts as fully visible.
pub const FULLY_VISIBLE_PERCENT: f64 = 90.0;

/// An element the breakdown considers hidden, with hints.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HiddenElement {
  pub node_id: String,
  pub class_name: String,
  pub label: String,
  pub reasons: Vec<OffscreenReason>,
}

/// Every element bucketed by how much of it is on screen.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VisibilityBreakdown {
  pub fully_visible: usize,
  pub partially_visible: usize,
  pub hidden: Vec<HiddenElement>,
}

/// Bucket every element of a hierarchy, ignoring content heuristics.
pub fn visibility_breakdown(hierarchy: &Hierarchy, config: &EngineConfig) -> VisibilityBreakdown {
  let screen = hierarchy.screen();
  let mut breakdown = VisibilityBreakdown::default();
  for element in hierarchy {
    let percentage = if element.visible_to_user {
      element.bounds.visibility_percentage(screen)
    } else {
      0.0
    };
    if percentage >= FULLY_VISIBLE_PERCENT {
      breakdown.fully_visible += 1;
    } else if percentage > 0.0 {
      breakdown.partially_visible += 1;
    } else {
      breakdown.hidden.push(HiddenElement {
        node_id: element.node_id.clone(),
        class_name: element.class_name.clone(),
        label: element.display_label(config.label_max_chars, config.class_label_max_chars),
        reasons: offscreen_reasons(element, screen),
      });
    }
  }
  breakdown
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::hierarchy::HierarchyBuilder;
  use crate::types::Bounds;
  use crate::widget::class_name;

  const SCREEN: Screen = Screen::new(720, 1600);

  fn label(bounds: Bounds) -> Element {
    Element::new(class_name::TEXT_VIEW, bounds)
      .with_text("搜索")
      .visible(true)
  }

  mod check_tests {
    use super::*;

    fn check(element: &Element) -> VisibilityCheck {
      let config = EngineConfig::default();
      VisibilityGate::new(&config, SCREEN).check(element)
    }

    #[test]
    fn accepts_plain_label() {
      let result = check(&label(Bounds::new(10, 100, 110, 140)));
      assert_eq!(result, VisibilityCheck::Visible { percentage: 100.0 });
    }

    #[test]
    fn platform_flag_comes_first() {
      let e = label(Bounds::new(10, 100, 110, 140)).visible(false);
      assert_eq!(check(&e), VisibilityCheck::NotVisibleToUser);
    }

    #[test]
    fn minimum_size_is_inclusive() {
      assert!(check(&label(Bounds::new(10, 100, 13, 102))).is_visible(), "3x2 is enough");
      assert_eq!(check(&label(Bounds::new(10, 100, 12, 102))), VisibilityCheck::TooSmall);
      assert_eq!(check(&label(Bounds::new(10, 100, 13, 101))), VisibilityCheck::TooSmall);
    }

    #[test]
    fn rejects_status_bar_only() {
      assert_eq!(
        check(&label(Bounds::new(0, 0, 100, 35))),
        VisibilityCheck::OutsideVerticalRange
      );
      assert!(
        check(&label(Bounds::new(0, 0, 100, 36))).percentage().is_some(),
        "bottom exactly on the status bar edge still counts"
      );
    }

    #[test]
    fn rejects_below_screen() {
      assert_eq!(
        check(&label(Bounds::new(0, 1601, 100, 1700))),
        VisibilityCheck::OutsideVerticalRange
      );
    }

    #[test]
    fn requires_some_content() {
      let bare = Element::new(class_name::IMAGE_VIEW, Bounds::new(0, 100, 50, 150)).visible(true);
      assert_eq!(check(&bare), VisibilityCheck::NoContent);
      let with_id = bare.with_resource_id("com.app:id/logo");
      assert!(check(&with_id).is_visible(), "a resource id counts as content");
    }

    #[test]
    fn container_needs_its_own_content() {
      let container = Element::new(class_name::LINEAR_LAYOUT, Bounds::new(0, 100, 500, 300))
        .with_resource_id("com.app:id/row")
        .visible(true);
      assert_eq!(check(&container), VisibilityCheck::EmptyContainer);
      assert!(check(&container.clone().clickable(true)).is_visible());
    }

    #[test]
    fn container_with_whitespace_text_passes_container_rule() {
      let container = Element::new(class_name::VIEW_GROUP, Bounds::new(0, 100, 500, 300))
        .with_text(" ")
        .important(true)
        .visible(true);
      assert!(check(&container).is_visible(), "raw text counts for containers");
    }

    #[test]
    fn threshold_is_inclusive() {
      // Half above the top edge
      let e = label(Bounds::new(0, -100, 100, 100));
      assert_eq!(check(&e), VisibilityCheck::Visible { percentage: 50.0 });
      let e = label(Bounds::new(0, -101, 100, 99));
      assert!(matches!(check(&e), VisibilityCheck::BelowThreshold { .. }));
    }
  }

  #[test]
  fn filter_records_percentages() {
    let mut builder = HierarchyBuilder::new();
    let root = builder.push(
      Element::new(class_name::FRAME_LAYOUT, Bounds::new(0, 0, 720, 1600)).visible(true),
      None,
    );
    builder.push(label(Bounds::new(0, 100, 100, 200)).with_node_id("a"), Some(root));
    builder.push(label(Bounds::new(-80, 100, 20, 200)).with_node_id("b"), Some(root));
    let hierarchy = builder.finish();
    let config = EngineConfig::default();

    let kept = VisibilityGate::new(&config, hierarchy.screen()).filter(&hierarchy);
    let ids: Vec<_> = kept.iter().map(|e| e.node_id.as_str()).collect();
    assert_eq!(ids, vec!["a"]);

    let clipped = hierarchy.find_by_node_id("b").unwrap();
    assert_eq!(clipped.visibility_percentage(), Some(20.0), "measured even when rejected");
    assert_eq!(
      hierarchy.elements()[0].visibility_percentage(),
      None,
      "empty frame never reached measurement"
    );
  }

  mod offscreen_tests {
    use super::*;

    #[test]
    fn lists_every_direction() {
      let e = Element::new(class_name::VIEW, Bounds::new(-10, -10, 800, 1700));
      assert_eq!(
        offscreen_reasons(&e, SCREEN),
        vec![
          OffscreenReason::OffLeft,
          OffscreenReason::OffTop,
          OffscreenReason::OffRight,
          OffscreenReason::OffBottom,
        ]
      );
    }

    #[test]
    fn semantic_hints() {
      let e = Element::new(class_name::TEXT_VIEW, Bounds::new(0, 0, 10, 10))
        .with_text("定位获取失败")
        .with_resource_id("com.app:id/Toast_Error");
      assert_eq!(
        offscreen_reasons(&e, SCREEN),
        vec![
          OffscreenReason::ErrorState,
          OffscreenReason::ErrorComponent,
          OffscreenReason::Toast,
        ]
      );
    }
  }

  #[test]
  fn breakdown_buckets() {
    let mut builder = HierarchyBuilder::new();
    let root = builder.push(
      Element::new(class_name::FRAME_LAYOUT, Bounds::new(0, 0, 720, 1600)).visible(true),
      None,
    );
    builder.push(label(Bounds::new(-50, 0, 50, 100)), Some(root));
    builder.push(label(Bounds::new(0, 0, 100, 100)).visible(false), Some(root));
    let breakdown = visibility_breakdown(&builder.finish(), &EngineConfig::default());
    assert_eq!(breakdown.fully_visible, 1);
    assert_eq!(breakdown.partially_visible, 1);
    assert_eq!(breakdown.hidden.len(), 1);
    assert_eq!(breakdown.hidden[0].label, "搜索");
  }
}

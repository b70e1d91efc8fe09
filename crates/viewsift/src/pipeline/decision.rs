/*!
Annotation decisions.

Whether a visible element should be surfaced depends on the page. The mode is
picked once per hierarchy:

- [`PageMode::General`]: an ordered rule cascade, first match wins. The order
  encodes priority, so the rules live in one table ([`GENERAL_CASCADE`])
  rather than nested conditionals.
- [`PageMode::Modal`]: a closed allow-list. Only elements inside the modal
  region whose text carries one of the modal's key phrases are surfaced.
*/

use serde::Serialize;

use crate::config::{EngineConfig, ModalPage};
use crate::hierarchy::Hierarchy;
use crate::types::Element;
use crate::widget::WidgetKind;

/// How annotation decisions are made for a whole page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageMode<'a> {
  General,
  Modal(&'a ModalPage),
}

impl<'a> PageMode<'a> {
  /// Pick the mode for a page: the first configured modal whose indicator
  /// appears in any element's text, else general.
  pub fn detect(hierarchy: &Hierarchy, config: &'a EngineConfig) -> Self {
    config
      .modal_pages
      .iter()
      .find(|page| page.indicators.iter().any(|i| hierarchy.contains_text(i)))
      .map_or(Self::General, Self::Modal)
  }

  pub fn modal_name(&self) -> Option<&'a str> {
    match *self {
      Self::General => None,
      Self::Modal(page) => Some(page.name.as_str()),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
  Accept,
  Reject,
}

/// The rule that produced a [`Decision`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
  // === General cascade, in evaluation order ===
  FrameLayout,
  UnimportantContainer,
  EmptyTextLabel,
  UndescribedImage,
  ImportantWidget,
  Clickable,
  MeaningfulText,
  MeaningfulDescription,
  InteractiveWidget,
  BareView,
  TooSmall,
  NegativeLeft,
  ScrollHintOrBlank,
  StatusBar,
  BeyondContentHeight,
  DefaultDeny,

  // === Modal allow-list ===
  OutsideModalRegion,
  ModalKeyPhrase,
  NotModalKeyPhrase,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Decision {
  pub verdict: Verdict,
  pub rule: Rule,
}

impl Decision {
  pub const fn is_accept(&self) -> bool {
    matches!(self.verdict, Verdict::Accept)
  }
}

/// One step of the general cascade.
#[derive(Clone, Copy)]
pub struct CascadeRule {
  pub rule: Rule,
  pub verdict: Verdict,
  pub applies: fn(&Element, &EngineConfig) -> bool,
}

impl std::fmt::Debug for CascadeRule {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("CascadeRule")
      .field("rule", &self.rule)
      .field("verdict", &self.verdict)
      .finish_non_exhaustive()
  }
}

const fn accept(rule: Rule, applies: fn(&Element, &EngineConfig) -> bool) -> CascadeRule {
  CascadeRule {
    rule,
    verdict: Verdict::Accept,
    applies,
  }
}

const fn reject(rule: Rule, applies: fn(&Element, &EngineConfig) -> bool) -> CascadeRule {
  CascadeRule {
    rule,
    verdict: Verdict::Reject,
    applies,
  }
}

/// The general-mode cascade. First applicable rule decides.
pub const GENERAL_CASCADE: &[CascadeRule] = &[
  reject(Rule::FrameLayout, |e, _| e.kind() == WidgetKind::FrameLayout),
  reject(Rule::UnimportantContainer, |e, _| {
    e.kind().is_secondary_container() && !e.important
  }),
  reject(Rule::EmptyTextLabel, |e, _| {
    e.kind().is_text_label() && !e.has_text() && !e.has_description()
  }),
  reject(Rule::UndescribedImage, |e, _| e.kind().is_image() && !e.has_description()),
  accept(Rule::ImportantWidget, |e, _| {
    e.important && !e.kind().is_secondary_container()
  }),
  accept(Rule::Clickable, |e, _| e.clickable),
  accept(Rule::MeaningfulText, |e, _| e.trimmed_text().chars().count() >= 2),
  accept(Rule::MeaningfulDescription, |e, _| {
    e.trimmed_description().chars().count() >= 2
  }),
  accept(Rule::InteractiveWidget, |e, _| e.kind().is_always_meaningful()),
  reject(Rule::BareView, |e, _| e.kind() == WidgetKind::View),
  reject(Rule::TooSmall, |e, c| {
    e.bounds.width() < c.min_annotate_width || e.bounds.height() < c.min_annotate_height
  }),
  reject(Rule::NegativeLeft, |e, _| e.bounds.left < 0),
  reject(Rule::ScrollHintOrBlank, |e, c| {
    !e.text.is_empty() && (e.text.trim().is_empty() || c.scroll_hints.iter().any(|h| e.text.contains(h.as_str())))
  }),
  reject(Rule::StatusBar, |e, c| e.bounds.top < c.status_bar_height),
  reject(Rule::BeyondContentHeight, |e, c| {
    let adjusted = i64::from(e.bounds.top) - i64::from(c.status_bar_height);
    !(0..=c.max_content_height).contains(&adjusted)
  }),
];

/// Decides which visible elements get annotated.
#[derive(Debug, Clone, Copy)]
pub struct DecisionEngine<'a> {
  config: &'a EngineConfig,
  mode: PageMode<'a>,
}

impl<'a> DecisionEngine<'a> {
  pub const fn new(config: &'a EngineConfig, mode: PageMode<'a>) -> Self {
    Self { config, mode }
  }

  pub const fn mode(&self) -> PageMode<'a> {
    self.mode
  }

  pub fn decide(&self, element: &Element) -> Decision {
    match self.mode {
      PageMode::General => self.decide_general(element),
      PageMode::Modal(page) => decide_modal(page, element),
    }
  }

  fn decide_general(&self, element: &Element) -> Decision {
    GENERAL_CASCADE
      .iter()
      .find(|step| (step.applies)(element, self.config))
      .map_or(
        Decision {
          verdict: Verdict::Reject,
          rule: Rule::DefaultDeny,
        },
        |step| Decision {
          verdict: step.verdict,
          rule: step.rule,
        },
      )
  }

  /// Visible elements the engine accepts, order preserved.
  pub fn accepted<'h>(&self, visible: &[&'h Element]) -> Vec<&'h Element> {
    let accepted: Vec<&Element> = visible
      .iter()
      .copied()
      .filter(|element| {
        let decision = self.decide(element);
        log::trace!("{} {}: {decision:?}", element.id, element.class_name);
        decision.is_accept()
      })
      .collect();
    log::debug!(
      "Decision engine ({:?}) accepted {} of {} visible elements",
      self.mode.modal_name().unwrap_or("general"),
      accepted.len(),
      visible.len()
    );
    accepted
  }
}

fn decide_modal(page: &ModalPage, element: &Element) -> Decision {
  if !page.region.contains_with_margin(&element.bounds, page.margin) {
    return Decision {
      verdict: Verdict::Reject,
      rule: Rule::OutsideModalRegion,
    };
  }
  let matches_phrase = page.key_phrases.iter().any(|phrase| {
    element.text.contains(phrase.as_str()) || element.content_description.contains(phrase.as_str())
  });
  if matches_phrase {
    Decision {
      verdict: Verdict::Accept,
      rule: Rule::ModalKeyPhrase,
    }
  } else {
    Decision {
      verdict: Verdict::Reject,
      rule: Rule::NotModalKeyPhrase,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::hierarchy::HierarchyBuilder;
  use crate::types::Bounds;
  use crate::widget::class_name;

  fn general(element: &Element) -> Decision {
    let config = EngineConfig::default();
    DecisionEngine::new(&config, PageMode::General).decide(element)
  }

  fn at(class: &str) -> Element {
    Element::new(class, Bounds::new(20, 200, 220, 280)).visible(true)
  }

  mod general_cascade_tests {
    use super::*;

    #[test]
    fn frame_layout_always_rejected() {
      let e = at(class_name::FRAME_LAYOUT).important(true).clickable(true).with_text("确定");
      assert_eq!(general(&e).rule, Rule::FrameLayout, "rule 1 wins over everything");
    }

    #[test]
    fn unimportant_container_rejected_even_if_clickable() {
      let e = at(class_name::LINEAR_LAYOUT).clickable(true);
      assert_eq!(general(&e).rule, Rule::UnimportantContainer);
    }

    #[test]
    fn important_container_falls_through() {
      // Rule 5 excludes containers, so clickability decides
      let e = at(class_name::VIEW_GROUP).important(true).clickable(true);
      let decision = general(&e);
      assert!(decision.is_accept());
      assert_eq!(decision.rule, Rule::Clickable);
    }

    #[test]
    fn text_label_needs_text_or_description() {
      let e = at(class_name::TEXT_VIEW).important(true).with_text("  ");
      assert_eq!(general(&e).rule, Rule::EmptyTextLabel);
    }

    #[test]
    fn image_needs_description() {
      let e = at(class_name::IMAGE_VIEW).important(true).with_text("logo");
      assert_eq!(general(&e).rule, Rule::UndescribedImage);
    }

    #[test]
    fn important_widget_accepted() {
      let e = Element::new(class_name::BUTTON, Bounds::new(0, 0, 100, 100)).important(true);
      let decision = general(&e);
      assert_eq!(decision.verdict, Verdict::Accept);
      assert_eq!(decision.rule, Rule::ImportantWidget);
    }

    #[test]
    fn text_length_counts_characters() {
      assert_eq!(general(&at(class_name::TEXT_VIEW).with_text(" 确定 ")).rule, Rule::MeaningfulText);
      assert_eq!(
        general(&at("com.example.Badge").with_text("新")).rule,
        Rule::DefaultDeny,
        "one character is not enough"
      );
    }

    #[test]
    fn description_accepted() {
      let e = at(class_name::IMAGE_VIEW).with_description("返回");
      assert_eq!(general(&e).rule, Rule::MeaningfulDescription);
    }

    #[test]
    fn interactive_widget_accepted_without_content() {
      assert_eq!(general(&at(class_name::CHECK_BOX)).rule, Rule::InteractiveWidget);
      assert_eq!(general(&at(class_name::EDIT_TEXT)).rule, Rule::InteractiveWidget);
    }

    #[test]
    fn bare_view_rejected() {
      assert_eq!(general(&at(class_name::VIEW).with_text("x")).rule, Rule::BareView);
    }

    #[test]
    fn remaining_rules_reject_in_order() {
      let tiny = Element::new("com.example.Dot", Bounds::new(20, 200, 30, 205));
      assert_eq!(general(&tiny).rule, Rule::TooSmall);

      let left = Element::new("com.example.Card", Bounds::new(-5, 200, 100, 300));
      assert_eq!(general(&left).rule, Rule::NegativeLeft);

      // Longer hints were already accepted as meaningful text
      let hint = at("com.example.Pager").with_text(" ");
      assert_eq!(general(&hint).rule, Rule::ScrollHintOrBlank);

      let top = Element::new("com.example.Card", Bounds::new(0, 10, 100, 100));
      assert_eq!(general(&top).rule, Rule::StatusBar);

      let low = Element::new("com.example.Card", Bounds::new(0, 1200, 100, 1300));
      assert_eq!(general(&low).rule, Rule::BeyondContentHeight);

      assert_eq!(general(&at("com.example.Card")).rule, Rule::DefaultDeny);
    }

    #[test]
    fn content_height_is_configurable() {
      let config = EngineConfig::default().with_max_content_height(2000);
      let low = Element::new("com.example.Card", Bounds::new(0, 1200, 100, 1300));
      let decision = DecisionEngine::new(&config, PageMode::General).decide(&low);
      assert_eq!(decision.rule, Rule::DefaultDeny);
    }

    #[test]
    fn cascade_never_accepts_after_interactive_rule() {
      let first_late = GENERAL_CASCADE
        .iter()
        .position(|r| r.rule == Rule::BareView)
        .unwrap();
      assert!(
        GENERAL_CASCADE[first_late..].iter().all(|r| r.verdict == Verdict::Reject),
        "the tail of the cascade is reject-only"
      );
    }
  }

  mod modal_tests {
    use super::*;

    fn modal_hierarchy() -> Hierarchy {
      let mut builder = HierarchyBuilder::new();
      let root = builder.push(
        Element::new(class_name::FRAME_LAYOUT, Bounds::new(0, 0, 720, 1600)),
        None,
      );
      builder.push(
        Element::new(class_name::TEXT_VIEW, Bounds::new(200, 400, 480, 450)).with_text("请使用微信扫码支付"),
        Some(root),
      );
      builder.finish()
    }

    #[test]
    fn detects_modal_page() {
      let config = EngineConfig::default();
      let mode = PageMode::detect(&modal_hierarchy(), &config);
      assert_eq!(mode.modal_name(), Some("wechat_pay_qr"));
    }

    #[test]
    fn general_without_indicator() {
      let config = EngineConfig::default();
      let mut builder = HierarchyBuilder::new();
      builder.push(Element::new(class_name::TEXT_VIEW, Bounds::new(0, 0, 10, 10)).with_text("首页"), None);
      assert_eq!(PageMode::detect(&builder.finish(), &config), PageMode::General);
    }

    #[test]
    fn closed_allow_list() {
      let config = EngineConfig::default();
      let page = &config.modal_pages[0];
      let engine = DecisionEngine::new(&config, PageMode::Modal(page));

      let close = Element::new(class_name::IMAGE_VIEW, Bounds::new(440, 360, 490, 410)).with_description("关闭");
      assert_eq!(engine.decide(&close).rule, Rule::ModalKeyPhrase);

      let button = Element::new(class_name::BUTTON, Bounds::new(200, 700, 480, 780))
        .with_text("完成")
        .clickable(true)
        .important(true);
      assert_eq!(
        engine.decide(&button).rule,
        Rule::NotModalKeyPhrase,
        "clickable important widgets are still rejected"
      );

      let outside = Element::new(class_name::TEXT_VIEW, Bounds::new(0, 1000, 300, 1050)).with_text("关闭");
      assert_eq!(engine.decide(&outside).rule, Rule::OutsideModalRegion);
    }

    #[test]
    fn margin_is_honored() {
      let config = EngineConfig::default();
      let engine = DecisionEngine::new(&config, PageMode::Modal(&config.modal_pages[0]));
      let edge = Element::new(class_name::TEXT_VIEW, Bounds::new(163, 337, 519, 855)).with_text("关闭");
      assert!(engine.decide(&edge).is_accept(), "exactly on the margin");
      let beyond = Element::new(class_name::TEXT_VIEW, Bounds::new(162, 337, 519, 855)).with_text("关闭");
      assert!(!engine.decide(&beyond).is_accept());
    }
  }
}

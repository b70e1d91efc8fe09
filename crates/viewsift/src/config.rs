/*!
Engine configuration.

Every tunable constant the pipeline uses lives in [`EngineConfig`]. Defaults
reproduce the empirically tuned values for phone-sized portrait dumps.
Deserialization fills missing keys from the defaults, so a config file only
needs to name what it overrides:

```toml
visibility_threshold = 60.0
max_content_height = 2000

[occlusion]
concrete_under_container = 0.45
```
*/

use serde::{Deserialize, Serialize};

use crate::types::{Bounds, ViewsiftError, ViewsiftResult};

/// Height of the system status bar in pixels.
pub const DEFAULT_STATUS_BAR_HEIGHT: i32 = 36;
/// Minimum visible area, in percent, for an element to be kept.
pub const DEFAULT_VISIBILITY_THRESHOLD: f64 = 50.0;
/// Assumed maximum usable content height below the status bar.
pub const DEFAULT_MAX_CONTENT_HEIGHT: i64 = 1100;
/// Gap in pixels under which recognized text blocks are merged.
pub const DEFAULT_MERGE_DISTANCE: i64 = 20;

/// All tunable constants of the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
  // === Visibility gate ===
  pub status_bar_height: i32,
  /// Percent of an element's area that must lie on screen.
  pub visibility_threshold: f64,
  pub min_visible_width: i64,
  pub min_visible_height: i64,

  // === Decision cascade ===
  pub min_annotate_width: i64,
  pub min_annotate_height: i64,
  /// Largest status-bar-adjusted `top` still considered content.
  pub max_content_height: i64,
  /// Accessibility hint strings that only describe scrolling.
  pub scroll_hints: Vec<String>,
  /// Page profiles that switch the cascade into modal mode.
  pub modal_pages: Vec<ModalPage>,

  // === Clickability ===
  /// Labels that make a text view inside a clickable layout a real action.
  pub action_keywords: Vec<String>,

  pub occlusion: OcclusionConfig,
  pub fusion: FusionConfig,

  // === Output ===
  pub label_max_chars: usize,
  pub class_label_max_chars: usize,
  /// Ordered rules naming a page by its text; first match wins.
  pub page_kinds: Vec<PageKindRule>,
}

impl Default for EngineConfig {
  fn default() -> Self {
    Self {
      status_bar_height: DEFAULT_STATUS_BAR_HEIGHT,
      visibility_threshold: DEFAULT_VISIBILITY_THRESHOLD,
      min_visible_width: 3,
      min_visible_height: 2,
      min_annotate_width: 15,
      min_annotate_height: 8,
      max_content_height: DEFAULT_MAX_CONTENT_HEIGHT,
      scroll_hints: strings(&["可竖向滚动", "可横向滚动"]),
      modal_pages: vec![ModalPage::default()],
      action_keywords: strings(&[
        "确定", "取消", "确认", "提交", "登录", "注册", "返回", "关闭", "下一步", "完成",
        "删除", "编辑", "保存", "搜索", "查询", "手动定位", "更新定位", "重新加载", "刷新",
        "重试", "confirm", "cancel", "submit", "login", "back", "close", "next", "done",
        "delete", "edit", "save", "search", "retry", "refresh",
      ]),
      occlusion: OcclusionConfig::default(),
      fusion: FusionConfig::default(),
      label_max_chars: 20,
      class_label_max_chars: 15,
      page_kinds: vec![
        PageKindRule::new("选择收货地址", "address_selection"),
        PageKindRule::new("请使用微信扫码支付", "wechat_payment"),
        PageKindRule::new("订单", "order"),
        PageKindRule::new("购物车", "cart"),
        PageKindRule::new("首页", "home"),
      ],
    }
  }
}

impl EngineConfig {
  #[must_use]
  pub const fn with_status_bar_height(mut self, height: i32) -> Self {
    self.status_bar_height = height;
    self
  }

  #[must_use]
  pub const fn with_visibility_threshold(mut self, percent: f64) -> Self {
    self.visibility_threshold = percent;
    self
  }

  #[must_use]
  pub const fn with_max_content_height(mut self, height: i64) -> Self {
    self.max_content_height = height;
    self
  }

  #[must_use]
  pub const fn with_merge_distance(mut self, distance: i64) -> Self {
    self.fusion.merge_distance = distance;
    self
  }

  #[must_use]
  pub const fn with_inferred_offset_y(mut self, offset: i32) -> Self {
    self.fusion.inferred_offset_y = offset;
    self
  }

  #[must_use]
  pub fn with_modal_pages(mut self, pages: Vec<ModalPage>) -> Self {
    self.modal_pages = pages;
    self
  }

  /// Reject values the pipeline cannot work with.
  pub fn validate(&self) -> ViewsiftResult<()> {
    if self.status_bar_height < 0 {
      return Err(invalid("status_bar_height must not be negative"));
    }
    if !(0.0..=100.0).contains(&self.visibility_threshold) {
      return Err(invalid("visibility_threshold must be within [0, 100]"));
    }
    if self.min_visible_width < 0
      || self.min_visible_height < 0
      || self.min_annotate_width < 0
      || self.min_annotate_height < 0
    {
      return Err(invalid("minimum sizes must not be negative"));
    }
    if self.max_content_height < 0 {
      return Err(invalid("max_content_height must not be negative"));
    }
    self.occlusion.validate()?;
    self.fusion.validate()?;
    // An empty needle is contained in every text
    check_phrases("scroll_hints", &self.scroll_hints)?;
    check_phrases("action_keywords", &self.action_keywords)?;
    for page in &self.modal_pages {
      if page.indicators.is_empty() {
        return Err(invalid(format!("modal page {:?} has no indicators", page.name)));
      }
      if page.margin < 0 {
        return Err(invalid(format!("modal page {:?} has a negative margin", page.name)));
      }
      check_phrases(&format!("modal page {:?} indicators", page.name), &page.indicators)?;
      check_phrases(&format!("modal page {:?} key_phrases", page.name), &page.key_phrases)?;
    }
    for rule in &self.page_kinds {
      if rule.keyword.trim().is_empty() {
        return Err(invalid(format!("page kind {:?} has a blank keyword", rule.kind)));
      }
    }
    Ok(())
  }
}

/// Thresholds and bands used by the occlusion resolver.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcclusionConfig {
  /// Coverage above which any selected element hides a candidate.
  pub coverage: f64,
  /// Coverage above which an important layout hides a candidate.
  pub important_container: f64,
  /// Coverage above which a layout hides a concrete widget.
  pub concrete_under_container: f64,
  /// Coverage above which an important element hides a plain text label.
  pub label_under_important: f64,
  /// Important elements smaller than this get the best priority band.
  pub small_important_area: i64,
  /// Exclusive lower edge of the preferred area band.
  pub min_reasonable_area: i64,
  /// Exclusive upper edge of the preferred area band.
  pub max_reasonable_area: i64,
}

impl Default for OcclusionConfig {
  fn default() -> Self {
    Self {
      coverage: 0.5,
      important_container: 0.3,
      concrete_under_container: 0.4,
      label_under_important: 0.3,
      small_important_area: 50_000,
      min_reasonable_area: 100,
      max_reasonable_area: 100_000,
    }
  }
}

impl OcclusionConfig {
  fn validate(&self) -> ViewsiftResult<()> {
    for (name, value) in [
      ("occlusion.coverage", self.coverage),
      ("occlusion.important_container", self.important_container),
      ("occlusion.concrete_under_container", self.concrete_under_container),
      ("occlusion.label_under_important", self.label_under_important),
    ] {
      check_unit(name, value)?;
    }
    if self.min_reasonable_area > self.max_reasonable_area {
      return Err(invalid("occlusion.min_reasonable_area exceeds max_reasonable_area"));
    }
    Ok(())
  }
}

/// Weights and thresholds for text-recognition fusion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionConfig {
  pub overlap_weight: f64,
  pub text_weight: f64,
  /// Combined score a match must exceed.
  pub match_threshold: f64,
  /// Text score when a block matches an element's description.
  pub description_score: f64,
  /// Length ratio above which contained texts count as duplicates.
  pub duplicate_length_ratio: f64,
  pub duplicate_overlap: f64,
  pub duplicate_token_similarity: f64,
  /// Overlap above which inferred items of one type are consolidated.
  pub consolidation_overlap: f64,
  /// Gap in pixels under which recognized blocks are merged.
  pub merge_distance: i64,
  /// Vertical shift from hierarchy coordinates to screenshot coordinates.
  pub inferred_offset_y: i32,
}

impl Default for FusionConfig {
  fn default() -> Self {
    Self {
      overlap_weight: 0.6,
      text_weight: 0.4,
      match_threshold: 0.3,
      description_score: 0.8,
      duplicate_length_ratio: 0.8,
      duplicate_overlap: 0.7,
      duplicate_token_similarity: 0.6,
      consolidation_overlap: 0.7,
      merge_distance: DEFAULT_MERGE_DISTANCE,
      inferred_offset_y: DEFAULT_STATUS_BAR_HEIGHT,
    }
  }
}

impl FusionConfig {
  fn validate(&self) -> ViewsiftResult<()> {
    if self.overlap_weight < 0.0 || self.text_weight < 0.0 {
      return Err(invalid("fusion weights must not be negative"));
    }
    for (name, value) in [
      ("fusion.match_threshold", self.match_threshold),
      ("fusion.description_score", self.description_score),
      ("fusion.duplicate_length_ratio", self.duplicate_length_ratio),
      ("fusion.duplicate_overlap", self.duplicate_overlap),
      ("fusion.duplicate_token_similarity", self.duplicate_token_similarity),
      ("fusion.consolidation_overlap", self.consolidation_overlap),
    ] {
      check_unit(name, value)?;
    }
    if self.merge_distance < 0 {
      return Err(invalid("fusion.merge_distance must not be negative"));
    }
    Ok(())
  }
}

/// A page that, once detected, restricts annotation to a fixed region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModalPage {
  pub name: String,
  /// Any element text containing one of these switches the page to modal mode.
  pub indicators: Vec<String>,
  /// Screen region the modal occupies.
  pub region: Bounds,
  /// Slack in pixels around `region`.
  pub margin: i32,
  /// Only elements whose text or description contains one of these are kept.
  pub key_phrases: Vec<String>,
}

impl Default for ModalPage {
  /// The QR-code payment overlay.
  fn default() -> Self {
    let phrases = strings(&["请使用微信扫码支付", "关闭"]);
    Self {
      name: "wechat_pay_qr".to_string(),
      indicators: phrases.clone(),
      region: Bounds::new(183, 357, 499, 835),
      margin: 20,
      key_phrases: phrases,
    }
  }
}

/// Names a page when its joined text contains `keyword`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageKindRule {
  pub keyword: String,
  pub kind: String,
}

impl PageKindRule {
  pub fn new(keyword: impl Into<String>, kind: impl Into<String>) -> Self {
    Self {
      keyword: keyword.into(),
      kind: kind.into(),
    }
  }
}

fn strings(values: &[&str]) -> Vec<String> {
  values.iter().map(ToString::to_string).collect()
}

fn check_phrases(name: &str, phrases: &[String]) -> ViewsiftResult<()> {
  if phrases.iter().any(|p| p.trim().is_empty()) {
    Err(invalid(format!("{name} must not contain blank strings")))
  } else {
    Ok(())
  }
}

fn check_unit(name: &str, value: f64) -> ViewsiftResult<()> {
  if (0.0..=1.0).contains(&value) {
    Ok(())
  } else {
    Err(invalid(format!("{name} must be within [0, 1], got {value}")))
  }
}

fn invalid(reason: impl Into<String>) -> ViewsiftError {
  ViewsiftError::InvalidConfig(reason.into())
}

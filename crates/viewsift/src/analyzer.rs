/*!
Top-level analysis of one hierarchy dump.

```text
markup ─► parse_hierarchy ─► PageMode::detect
                           ─► VisibilityGate ─► DecisionEngine ─► resolve_occlusion ─► annotations
                                            └─► infer_contents ─┐
          recognized blocks ────────────────────────────────────┴─► fuse ─► contents
```

Each run owns its tree. An [`Analyzer`] holds nothing but its configuration,
so one instance can serve any number of threads.
*/

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::compare::PageKind;
use crate::config::EngineConfig;
use crate::fusion::{fuse, infer_contents};
use crate::parser::parse_hierarchy;
use crate::pipeline::{resolve_occlusion, ClickabilityResolver, DecisionEngine, PageMode, VisibilityGate};
use crate::stats::HierarchyStats;
use crate::types::{AnnotatedContent, Bounds, Element, Screen, TextBlock, ViewsiftResult};

/// One element selected for annotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Annotation {
  /// 1-based position in the final selection.
  pub rank: usize,
  pub node_id: String,
  pub class_name: String,
  pub label: String,
  pub bounds: Bounds,
  pub visibility_percentage: f64,
  pub clickable: bool,
  pub effectively_clickable: bool,
  pub important: bool,
}

/// Result of analyzing one dump.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Analysis {
  pub screen: Screen,
  pub page_kind: PageKind,
  /// Name of the modal profile the page matched, if any.
  pub modal: Option<String>,
  pub annotations: Vec<Annotation>,
  pub contents: Vec<AnnotatedContent>,
  /// Statistics over the elements that passed the visibility gate.
  pub stats: HierarchyStats,
  pub effectively_clickable_count: usize,
}

/// Runs the whole engine with one configuration.
#[derive(Debug, Clone, Default)]
pub struct Analyzer {
  config: EngineConfig,
}

impl Analyzer {
  /// Create an analyzer, rejecting an invalid configuration.
  pub fn new(config: EngineConfig) -> ViewsiftResult<Self> {
    config.validate()?;
    Ok(Self { config })
  }

  pub const fn config(&self) -> &EngineConfig {
    &self.config
  }

  /// Analyze one dump.
  ///
  /// With `blocks`, recognized text is fused with inferred content; without,
  /// contents are inferred from the hierarchy alone.
  pub fn analyze(&self, markup: &str, blocks: Option<&[TextBlock]>) -> ViewsiftResult<Analysis> {
    let config = &self.config;
    let hierarchy = parse_hierarchy(markup)?;
    let screen = hierarchy.screen();

    let mode = PageMode::detect(&hierarchy, config);
    let visible = VisibilityGate::new(config, screen).filter(&hierarchy);
    let accepted = DecisionEngine::new(config, mode).accepted(&visible);
    let selected = resolve_occlusion(&accepted, &config.occlusion);

    let resolver = ClickabilityResolver::new(&hierarchy, config);
    let annotations: Vec<Annotation> = selected
      .iter()
      .enumerate()
      .map(|(i, element)| self.annotation(i + 1, element, &resolver))
      .collect();
    let effectively_clickable_count = annotations.iter().filter(|a| a.effectively_clickable).count();

    let inferred = infer_contents(&visible, &config.fusion);
    let contents = fuse(blocks.unwrap_or_default(), inferred, &visible, &config.fusion);

    let analysis = Analysis {
      screen,
      page_kind: PageKind::identify(&hierarchy, &config.page_kinds),
      modal: mode.modal_name().map(str::to_string),
      annotations,
      contents,
      stats: HierarchyStats::collect(&visible, screen),
      effectively_clickable_count,
    };
    log::info!(
      "Analyzed {} elements on {}x{}: {} annotations, {} content items",
      hierarchy.len(),
      screen.width,
      screen.height,
      analysis.annotations.len(),
      analysis.contents.len()
    );
    Ok(analysis)
  }

  fn annotation(&self, rank: usize, element: &Element, resolver: &ClickabilityResolver<'_>) -> Annotation {
    Annotation {
      rank,
      node_id: element.node_id.clone(),
      class_name: element.class_name.clone(),
      label: element.display_label(self.config.label_max_chars, self.config.class_label_max_chars),
      bounds: element.bounds,
      visibility_percentage: element.visibility_percentage().unwrap_or_default(),
      clickable: element.clickable,
      effectively_clickable: resolver.is_effectively_clickable(element),
      important: element.important,
    }
  }

  /// Analyze independent dumps in parallel. Results keep input order.
  pub fn analyze_batch(&self, inputs: &[(String, Option<Vec<TextBlock>>)]) -> Vec<ViewsiftResult<Analysis>> {
    log::debug!("Analyzing batch of {} dumps", inputs.len());
    inputs
      .par_iter()
      .map(|(markup, blocks)| self.analyze(markup, blocks.as_deref()))
      .collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::types::ViewsiftError;

  const PAGE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<node source-node-id="1" class="android.widget.FrameLayout" bounds="0 0 720 1600" visible-to-user="true">
  <node source-node-id="2" class="android.widget.LinearLayout" bounds="0 200 720 320" visible-to-user="true" clickable="true">
    <node source-node-id="3" class="android.widget.TextView" bounds="40 220 200 300" visible-to-user="true" text="确定"/>
  </node>
  <node source-node-id="4" class="android.widget.EditText" bounds="40 400 680 480" visible-to-user="true" resource-id="com.shop:id/search_box"/>
</node>"#;

  #[test]
  fn analyzes_a_small_page() {
    let analysis = Analyzer::default().analyze(PAGE, None).unwrap();
    assert_eq!(analysis.screen, Screen::new(720, 1600));
    assert!(analysis.modal.is_none());

    let ids: Vec<&str> = analysis.annotations.iter().map(|a| a.node_id.as_str()).collect();
    assert!(ids.contains(&"3"), "label inside a clickable row is annotated: {ids:?}");
    let label = analysis.annotations.iter().find(|a| a.node_id == "3").unwrap();
    assert!(label.effectively_clickable, "确定 inherits the row's clickability");
    assert!(!label.clickable);
    assert_eq!(label.visibility_percentage, 100.0);

    let ranks: Vec<usize> = analysis.annotations.iter().map(|a| a.rank).collect();
    assert_eq!(ranks, (1..=analysis.annotations.len()).collect::<Vec<_>>());
    assert!(!analysis.contents.is_empty(), "inferred without recognized text");
  }

  #[test]
  fn invalid_config_is_rejected() {
    let config = EngineConfig::default().with_visibility_threshold(150.0);
    assert!(matches!(Analyzer::new(config), Err(ViewsiftError::InvalidConfig(_))));
  }

  #[test]
  fn blank_indicator_is_rejected_before_analysis() {
    let page = crate::config::ModalPage {
      indicators: vec![String::new()],
      ..crate::config::ModalPage::default()
    };
    let config = EngineConfig::default().with_modal_pages(vec![page]);
    assert!(matches!(Analyzer::new(config), Err(ViewsiftError::InvalidConfig(_))));
  }

  #[test]
  fn huge_modal_margin_is_analyzed() {
    let page = crate::config::ModalPage {
      indicators: vec!["确定".to_string()],
      margin: i32::MAX,
      ..crate::config::ModalPage::default()
    };
    let analyzer = Analyzer::new(EngineConfig::default().with_modal_pages(vec![page])).unwrap();
    let analysis = analyzer.analyze(PAGE, None).unwrap();
    assert_eq!(analysis.modal.as_deref(), Some("wechat_pay_qr"));
  }

  #[test]
  fn batch_keeps_order_and_errors() {
    let analyzer = Analyzer::default();
    let inputs = vec![
      (PAGE.to_string(), None),
      ("<node class=\"android.widget.FrameLayout\">".to_string(), None),
      (String::new(), None),
    ];
    let results = analyzer.analyze_batch(&inputs);
    assert_eq!(results.len(), 3);
    assert!(results[0].is_ok());
    assert!(matches!(results[1], Err(ViewsiftError::MalformedDocument { .. })));
    assert!(matches!(results[2], Err(ViewsiftError::EmptyDocument)));
  }
}

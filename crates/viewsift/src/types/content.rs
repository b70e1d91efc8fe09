/*! Recognized-text input and fused content records. */

use super::Bounds;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// A block of text found on the screenshot by an external recognizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TextBlock {
  pub text: String,
  /// Recognizer confidence in `[0, 1]`.
  pub confidence: f64,
  pub bounds: Bounds,
}

impl TextBlock {
  pub fn new(text: impl Into<String>, confidence: f64, bounds: Bounds) -> Self {
    Self {
      text: text.into(),
      confidence: confidence.clamp(0.0, 1.0),
      bounds,
    }
  }
}

/// Coarse tag describing what a piece of on-screen content is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum ContentType {
  SearchInput,
  Input,
  /// Clickable widget inferred from the hierarchy.
  Button,
  /// Text reading like an action verb ("确定", "submit", ...).
  ButtonText,
  LinkText,
  /// Image carrying a content description.
  Icon,
  Text,
}

/// Where an [`AnnotatedContent`] record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum ContentSource {
  /// External text recognizer.
  RecognizedText,
  /// Derived from hierarchy elements.
  Inferred,
}

/// One fused content item handed to the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AnnotatedContent {
  pub content_type: ContentType,
  pub text: String,
  pub confidence: f64,
  pub bounds: Bounds,
  pub source: ContentSource,
  /// `node_id` of the hierarchy element this item is tied to.
  pub matched_element_id: Option<String>,
  /// `class_name` of that element.
  pub matched_class_name: Option<String>,
  pub matched: bool,
}

impl AnnotatedContent {
  /// Unmatched record for a recognized block.
  pub fn recognized(content_type: ContentType, block: &TextBlock) -> Self {
    Self {
      content_type,
      text: block.text.clone(),
      confidence: block.confidence,
      bounds: block.bounds,
      source: ContentSource::RecognizedText,
      matched_element_id: None,
      matched_class_name: None,
      matched: false,
    }
  }

  /// Text lowercased and trimmed, the form used for comparisons.
  pub fn normalized_text(&self) -> String {
    self.text.trim().to_lowercase()
  }
}

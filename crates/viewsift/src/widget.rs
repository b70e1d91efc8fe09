/*!
Widget kinds.

Kinds describe what an element *is*, derived from the platform's free-form
class name. The class name itself is kept verbatim on the element; a kind is
only a lens the heuristics look through. Anything without a mapping is
[`WidgetKind::Other`].
*/

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Platform class-name constants.
pub mod class_name {
  // Layout containers
  pub const FRAME_LAYOUT: &str = "android.widget.FrameLayout";
  pub const LINEAR_LAYOUT: &str = "android.widget.LinearLayout";
  pub const RELATIVE_LAYOUT: &str = "android.widget.RelativeLayout";
  pub const VIEW_GROUP: &str = "android.view.ViewGroup";
  pub const VIEW: &str = "android.view.View";

  // Static content
  pub const TEXT_VIEW: &str = "android.widget.TextView";
  pub const IMAGE_VIEW: &str = "android.widget.ImageView";
  pub const WEB_VIEW: &str = "android.webkit.WebView";

  // Interactive
  pub const BUTTON: &str = "android.widget.Button";
  pub const EDIT_TEXT: &str = "android.widget.EditText";
  pub const AUTO_COMPLETE_TEXT_VIEW: &str = "android.widget.AutoCompleteTextView";
  pub const IMAGE_BUTTON: &str = "android.widget.ImageButton";
  pub const CHECK_BOX: &str = "android.widget.CheckBox";
  pub const RADIO_BUTTON: &str = "android.widget.RadioButton";
  pub const SPINNER: &str = "android.widget.Spinner";
  pub const TOGGLE_BUTTON: &str = "android.widget.ToggleButton";
}

/// Widget classification of a platform class name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS, Default)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum WidgetKind {
  // === Layout containers ===
  FrameLayout,
  LinearLayout,
  RelativeLayout,
  ViewGroup,
  /// Bare view with no semantics of its own.
  View,

  // === Static content ===
  TextView,
  ImageView,
  WebView,

  // === Interactive ===
  Button,
  EditText,
  AutoCompleteTextView,
  ImageButton,
  CheckBox,
  RadioButton,
  Spinner,
  ToggleButton,

  /// Class name with no mapping.
  #[default]
  Other,
}

impl WidgetKind {
  /// Classify a platform class name. Exact match only.
  pub fn from_class_name(name: &str) -> Self {
    match name {
      class_name::FRAME_LAYOUT => Self::FrameLayout,
      class_name::LINEAR_LAYOUT => Self::LinearLayout,
      class_name::RELATIVE_LAYOUT => Self::RelativeLayout,
      class_name::VIEW_GROUP => Self::ViewGroup,
      class_name::VIEW => Self::View,

      class_name::TEXT_VIEW => Self::TextView,
      class_name::IMAGE_VIEW => Self::ImageView,
      class_name::WEB_VIEW => Self::WebView,

      class_name::BUTTON => Self::Button,
      class_name::EDIT_TEXT => Self::EditText,
      class_name::AUTO_COMPLETE_TEXT_VIEW => Self::AutoCompleteTextView,
      class_name::IMAGE_BUTTON => Self::ImageButton,
      class_name::CHECK_BOX => Self::CheckBox,
      class_name::RADIO_BUTTON => Self::RadioButton,
      class_name::SPINNER => Self::Spinner,
      class_name::TOGGLE_BUTTON => Self::ToggleButton,

      _ => Self::Other,
    }
  }

  /// One of the three generic layout containers (frame, linear, relative).
  pub const fn is_layout(&self) -> bool {
    matches!(
      self,
      Self::FrameLayout | Self::LinearLayout | Self::RelativeLayout
    )
  }

  /// Layout containers plus the generic view group.
  ///
  /// These are presumed to be invisible glue unless they carry content.
  pub const fn is_generic_container(&self) -> bool {
    matches!(
      self,
      Self::FrameLayout | Self::LinearLayout | Self::RelativeLayout | Self::ViewGroup
    )
  }

  /// Containers that stay unannotated unless flagged important.
  pub const fn is_secondary_container(&self) -> bool {
    matches!(
      self,
      Self::LinearLayout | Self::RelativeLayout | Self::ViewGroup
    )
  }

  /// Interactive widgets worth surfacing even without text.
  pub const fn is_always_meaningful(&self) -> bool {
    matches!(
      self,
      Self::Button
        | Self::EditText
        | Self::ImageButton
        | Self::CheckBox
        | Self::RadioButton
        | Self::Spinner
        | Self::ToggleButton
    )
  }

  /// Concrete widgets that lose to a layout container drawn over them.
  pub const fn is_concrete(&self) -> bool {
    matches!(
      self,
      Self::Button | Self::EditText | Self::ImageButton | Self::TextView
    )
  }

  pub const fn is_text_label(&self) -> bool {
    matches!(self, Self::TextView)
  }

  pub const fn is_image(&self) -> bool {
    matches!(self, Self::ImageView)
  }

  pub const fn is_text_input(&self) -> bool {
    matches!(self, Self::EditText | Self::AutoCompleteTextView)
  }

  /// Button-like widgets used by content inference.
  pub const fn is_button(&self) -> bool {
    matches!(self, Self::Button | Self::ImageButton)
  }
}

/// Check whether a class name looks like a layout, by substring.
///
/// Looser than [`WidgetKind::is_layout`]; used for statistics over arbitrary
/// class names (custom layouts included).
pub fn looks_like_layout(class_name: &str) -> bool {
  let lower = class_name.to_lowercase();
  lower.contains("layout") || lower.contains("viewgroup")
}

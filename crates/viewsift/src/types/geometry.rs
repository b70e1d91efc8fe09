/*! Geometry types for screen-pixel rectangles. */

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Axis-aligned rectangle in screen pixels.
///
/// Always normalized: `left <= right` and `top <= bottom`. Construct through
/// [`Bounds::new`], which swaps inverted edges.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, TS)]
#[ts(export)]
pub struct Bounds {
  pub left: i32,
  pub top: i32,
  pub right: i32,
  pub bottom: i32,
}

/// Wire shape of [`Bounds`]; deserialization routes through `Bounds::new`.
#[derive(Deserialize)]
struct RawBounds {
  left: i32,
  top: i32,
  right: i32,
  bottom: i32,
}

impl<'de> Deserialize<'de> for Bounds {
  fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let raw = RawBounds::deserialize(deserializer)?;
    Ok(Self::new(raw.left, raw.top, raw.right, raw.bottom))
  }
}

impl Bounds {
  /// The degenerate rectangle used as the fallback for unparseable input.
  pub const ZERO: Self = Self {
    left: 0,
    top: 0,
    right: 0,
    bottom: 0,
  };

  /// Create bounds, swapping edges that arrive inverted.
  pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
    let (left, right) = if left > right {
      (right, left)
    } else {
      (left, right)
    };
    let (top, bottom) = if top > bottom {
      (bottom, top)
    } else {
      (top, bottom)
    };
    Self {
      left,
      top,
      right,
      bottom,
    }
  }

  pub const fn width(&self) -> i64 {
    self.right as i64 - self.left as i64
  }

  pub const fn height(&self) -> i64 {
    self.bottom as i64 - self.top as i64
  }

  /// Area in square pixels. Zero for degenerate rectangles.
  pub const fn area(&self) -> i64 {
    self.width() * self.height()
  }

  pub const fn is_empty(&self) -> bool {
    self.area() == 0
  }

  /// Overlapping region, if the rectangles share a non-empty area.
  ///
  /// Rectangles that only touch along an edge do not intersect.
  pub fn intersection(&self, other: &Self) -> Option<Self> {
    let left = self.left.max(other.left);
    let top = self.top.max(other.top);
    let right = self.right.min(other.right);
    let bottom = self.bottom.min(other.bottom);
    if right <= left || bottom <= top {
      return None;
    }
    Some(Self {
      left,
      top,
      right,
      bottom,
    })
  }

  /// Area shared with `other`, 0 if disjoint.
  pub fn intersection_area(&self, other: &Self) -> i64 {
    self.intersection(other).map_or(0, |r| r.area())
  }

  /// Smallest rectangle containing both.
  pub fn union(&self, other: &Self) -> Self {
    Self {
      left: self.left.min(other.left),
      top: self.top.min(other.top),
      right: self.right.max(other.right),
      bottom: self.bottom.max(other.bottom),
    }
  }

  /// Intersection area divided by the *smaller* of the two areas.
  ///
  /// Asymmetric in meaning: a small rectangle fully inside a large one scores
  /// 1.0 no matter how large the container is. Returns 0 when either area is 0
  /// or the rectangles are disjoint.
  #[allow(clippy::cast_precision_loss)]
  pub fn overlap_ratio(&self, other: &Self) -> f64 {
    let min_area = self.area().min(other.area());
    if min_area == 0 {
      return 0.0;
    }
    self.intersection_area(other) as f64 / min_area as f64
  }

  /// Fraction of *this* rectangle's area covered by `other`.
  #[allow(clippy::cast_precision_loss)]
  pub fn coverage_by(&self, other: &Self) -> f64 {
    let area = self.area();
    if area == 0 {
      return 0.0;
    }
    self.intersection_area(other) as f64 / area as f64
  }

  /// Percentage (0-100) of this rectangle lying inside `[0,w]×[0,h]`.
  #[allow(clippy::cast_precision_loss)]
  pub fn visibility_percentage(&self, screen: Screen) -> f64 {
    let area = self.area();
    if area == 0 {
      return 0.0;
    }
    let visible = self.intersection_area(&screen.bounds());
    visible as f64 / area as f64 * 100.0
  }

  /// Check whether `inner` lies within these bounds grown by `margin` on every side.
  pub fn contains_with_margin(&self, inner: &Self, margin: i32) -> bool {
    let margin = i64::from(margin);
    i64::from(inner.left) >= i64::from(self.left) - margin
      && i64::from(inner.top) >= i64::from(self.top) - margin
      && i64::from(inner.right) <= i64::from(self.right) + margin
      && i64::from(inner.bottom) <= i64::from(self.bottom) + margin
  }

  /// Horizontal and vertical gaps to `other` (0 on an axis where they overlap).
  pub fn gap_to(&self, other: &Self) -> (i64, i64) {
    let x_gap = i64::from(self.left.max(other.left)) - i64::from(self.right.min(other.right));
    let y_gap = i64::from(self.top.max(other.top)) - i64::from(self.bottom.min(other.bottom));
    (x_gap.max(0), y_gap.max(0))
  }

  /// Same rectangle moved vertically by `dy` pixels.
  pub const fn shifted_y(&self, dy: i32) -> Self {
    Self {
      left: self.left,
      top: self.top.saturating_add(dy),
      right: self.right,
      bottom: self.bottom.saturating_add(dy),
    }
  }
}

/// Screen extent derived from a hierarchy dump.
///
/// Dumps carry no authoritative screen size; the screen is the maximum
/// `right`/`bottom` seen across all parsed elements.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Screen {
  pub width: i32,
  pub height: i32,
}

impl Screen {
  pub const fn new(width: i32, height: i32) -> Self {
    Self { width, height }
  }

  /// Screen extent covering every rectangle in `bounds`.
  pub fn covering<'a>(bounds: impl IntoIterator<Item = &'a Bounds>) -> Self {
    bounds.into_iter().fold(Self::default(), |screen, b| Self {
      width: screen.width.max(b.right),
      height: screen.height.max(b.bottom),
    })
  }

  /// The screen as a rectangle anchored at the origin.
  pub const fn bounds(&self) -> Bounds {
    Bounds::new(0, 0, self.width, self.height)
  }
}

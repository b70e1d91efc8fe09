/*! Branded ID types for type-safe element references. */

use derive_more::{Display, From, Into};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Position of an element in its hierarchy's arena (document order).
///
/// Only meaningful together with the [`Hierarchy`](crate::Hierarchy) that
/// issued it. The platform's own node identifier is `Element::node_id`.
#[derive(
  Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS, Display,
  From, Into,
)]
#[ts(export)]
pub struct ElementId(pub u32);

impl ElementId {
  /// Arena slot for this id.
  pub const fn index(self) -> usize {
    self.0 as usize
  }
}

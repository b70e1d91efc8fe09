/*!
Element selection pipeline.

```text
Hierarchy ─► VisibilityGate ─► DecisionEngine ─► resolve_occlusion ─► annotations
                                                  ClickabilityResolver (per annotation)
```

Every stage borrows from the [`Hierarchy`](crate::Hierarchy) built by the
parser; none of them mutate structure.
*/

mod clickability;
mod decision;
mod occlusion;
mod visibility;

pub use clickability::ClickabilityResolver;
pub use decision::{CascadeRule, Decision, DecisionEngine, PageMode, Rule, Verdict, GENERAL_CASCADE};
pub use occlusion::{is_covered, priority_key, resolve_occlusion, PriorityKey};
pub use visibility::{
  offscreen_reasons, visibility_breakdown, HiddenElement, OffscreenReason, VisibilityBreakdown,
  VisibilityCheck, VisibilityGate, FULLY_VISIBLE_PERCENT,
};

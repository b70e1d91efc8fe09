/*!
Occlusion resolution.

Accepted elements are ranked by a priority key, then selected greedily: an
element is dropped when an already selected element covers it. Coverage is
always measured against the *candidate's* own area, so only elements ranked
earlier can hide later ones.
*/

use crate::config::OcclusionConfig;
use crate::types::Element;

/// Sort key for the greedy selection. Lower sorts first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PriorityKey {
  /// Sum of the band penalties.
  pub score: u8,
  /// Tie-break: smaller elements first.
  pub area: i64,
}

/// Priority of an element; see [`PriorityKey`].
pub fn priority_key(element: &Element, config: &OcclusionConfig) -> PriorityKey {
  let area = element.bounds.area();
  let kind = element.kind();

  let importance = match (element.important, area < config.small_important_area) {
    (true, true) => 0,
    (true, false) => 2,
    (false, _) => 4,
  };
  let interaction = u8::from(!element.clickable);
  let content = if element.has_any_label() { 0 } else { 2 };
  let layout = if kind.is_layout() { 3 } else { 0 };
  let size = if config.min_reasonable_area < area && area < config.max_reasonable_area {
    0
  } else if area < config.min_reasonable_area {
    2
  } else {
    1
  };

  PriorityKey {
    score: importance + interaction + content + layout + size,
    area,
  }
}

/// Check whether `selected`, already chosen, hides `candidate`.
pub fn is_covered(candidate: &Element, selected: &Element, config: &OcclusionConfig) -> bool {
  let coverage = candidate.bounds.coverage_by(&selected.bounds);
  if coverage <= 0.0 {
    return false;
  }
  let candidate_kind = candidate.kind();
  let selected_kind = selected.kind();

  coverage > config.coverage
    || (selected.important && selected_kind.is_layout() && coverage > config.important_container)
    || (candidate_kind.is_concrete()
      && selected_kind.is_layout()
      && coverage > config.concrete_under_container)
    || (!candidate.important
      && candidate_kind.is_text_label()
      && selected.important
      && coverage > config.label_under_important)
}

/// Keep the elements nothing ranked before them covers, in priority order.
pub fn resolve_occlusion<'h>(elements: &[&'h Element], config: &OcclusionConfig) -> Vec<&'h Element> {
  let mut ranked: Vec<(PriorityKey, &Element)> = elements
    .iter()
    .map(|&element| (priority_key(element, config), element))
    .collect();
  // Stable: equal keys keep document order
  ranked.sort_by_key(|(key, _)| *key);

  let mut selected: Vec<&Element> = Vec::with_capacity(ranked.len());
  for (_, candidate) in ranked {
    match selected.iter().find(|s| is_covered(candidate, s, config)) {
      Some(coverer) => log::trace!("{} covered by {}", candidate.id, coverer.id),
      None => selected.push(candidate),
    }
  }
  log::debug!(
    "Occlusion resolver kept {} of {} elements",
    selected.len(),
    elements.len()
  );
  selected
}

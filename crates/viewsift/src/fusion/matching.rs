/*!
Matching recognized text to elements, and duplicate suppression.
*/

use std::collections::HashSet;

use crate::config::FusionConfig;
use crate::types::{AnnotatedContent, Element};

/// How well recognized text agrees with an element's own labels, in `[0, 1]`.
///
/// - `1.0` when the text and the element's text contain one another,
/// - `description_score` for the same against the content description,
/// - else the fraction of the recognized words found in either label.
///
/// Empty labels never count as containment.
pub fn text_score(recognized: &str, element: &Element, description_score: f64) -> f64 {
  let recognized = recognized.trim().to_lowercase();
  if recognized.is_empty() {
    return 0.0;
  }
  let text = element.text.to_lowercase();
  let description = element.content_description.to_lowercase();

  if mutually_contains(&recognized, &text) {
    return 1.0;
  }
  if mutually_contains(&recognized, &description) {
    return description_score;
  }

  let recognized_words: HashSet<&str> = recognized.split_whitespace().collect();
  let element_words: HashSet<&str> = text
    .split_whitespace()
    .chain(description.split_whitespace())
    .collect();
  if element_words.is_empty() {
    return 0.0;
  }
  ratio(
    recognized_words.intersection(&element_words).count(),
    recognized_words.len(),
  )
}

fn mutually_contains(a: &str, b: &str) -> bool {
  !a.is_empty() && !b.is_empty() && (a.contains(b) || b.contains(a))
}

/// Combined geometric and textual score of a content item against an element.
pub fn match_score(content: &AnnotatedContent, element: &Element, config: &FusionConfig) -> f64 {
  let overlap = content.bounds.overlap_ratio(&element.bounds);
  let text = text_score(&content.text, element, config.description_score);
  overlap * config.overlap_weight + text * config.text_weight
}

/// Best-scoring element above the acceptance threshold. Earliest wins ties.
pub fn find_best_match<'h>(
  content: &AnnotatedContent,
  elements: &[&'h Element],
  config: &FusionConfig,
) -> Option<&'h Element> {
  let mut best: Option<(&Element, f64)> = None;
  for &element in elements {
    let score = match_score(content, element, config);
    let beats_best = best.map_or(true, |(_, best_score)| score > best_score);
    if score > config.match_threshold && beats_best {
      best = Some((element, score));
    }
  }
  best.map(|(element, _)| element)
}

/// Attach the best-matching element to a recognized item.
pub fn attach_match(content: &mut AnnotatedContent, elements: &[&Element], config: &FusionConfig) {
  match find_best_match(content, elements, config) {
    Some(element) => {
      content.matched = true;
      content.matched_element_id = Some(element.node_id.clone());
      content.matched_class_name = Some(element.class_name.clone());
    }
    None => {
      content.matched = false;
      content.matched_element_id = None;
      content.matched_class_name = None;
    }
  }
}

/// Check whether two content items describe the same thing.
///
/// Duplicates when the normalized texts are equal, when one contains the other
/// and their lengths are close, or when their boxes overlap heavily and they
/// share most words.
pub fn is_duplicate(a: &AnnotatedContent, b: &AnnotatedContent, config: &FusionConfig) -> bool {
  let t1 = a.normalized_text();
  let t2 = b.normalized_text();
  if t1 == t2 {
    return true;
  }

  if mutually_contains(&t1, &t2) {
    let (l1, l2) = (t1.chars().count(), t2.chars().count());
    if ratio(l1.min(l2), l1.max(l2)) > config.duplicate_length_ratio {
      return true;
    }
  }

  if a.bounds.overlap_ratio(&b.bounds) <= config.duplicate_overlap {
    return false;
  }
  token_similarity(&t1, &t2) > config.duplicate_token_similarity
}

/// Shared words over the larger word set.
fn token_similarity(a: &str, b: &str) -> f64 {
  let w1: HashSet<&str> = a.split_whitespace().collect();
  let w2: HashSet<&str> = b.split_whitespace().collect();
  ratio(w1.intersection(&w2).count(), w1.len().max(w2.len()))
}

#[allow(clippy::cast_precision_loss)]
fn ratio(numerator: usize, denominator: usize) -> f64 {
  if denominator == 0 {
    0.0
  } else {
    numerator as f64 / denominator as f64
  }
}

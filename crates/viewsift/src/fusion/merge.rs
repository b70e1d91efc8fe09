/*! Adjacency merge of recognized text blocks. */

use crate::types::{Bounds, TextBlock};

/// Merge blocks that sit close to one another.
///
/// Greedy and anchored: each unmerged block, in input order, absorbs every
/// later unmerged block whose horizontal *or* vertical gap to it is at most
/// `max_distance`. Absorbed texts are joined with a space, confidences
/// averaged, bounds unioned.
pub fn merge_nearby_blocks(blocks: &[TextBlock], max_distance: i64) -> Vec<TextBlock> {
  let mut used = vec![false; blocks.len()];
  let mut merged = Vec::with_capacity(blocks.len());

  for (i, anchor) in blocks.iter().enumerate() {
    if used.get(i).copied().unwrap_or(true) {
      continue;
    }
    let mut group = vec![anchor];
    for (j, other) in blocks.iter().enumerate().skip(i + 1) {
      let Some(slot) = used.get_mut(j) else {
        continue;
      };
      if *slot || !is_nearby(&anchor.bounds, &other.bounds, max_distance) {
        continue;
      }
      *slot = true;
      group.push(other);
    }
    merged.push(combine(&group));
  }

  if merged.len() != blocks.len() {
    log::debug!("Merged {} text blocks into {}", blocks.len(), merged.len());
  }
  merged
}

fn is_nearby(a: &Bounds, b: &Bounds, max_distance: i64) -> bool {
  let (x_gap, y_gap) = a.gap_to(b);
  x_gap <= max_distance || y_gap <= max_distance
}

#[allow(clippy::cast_precision_loss)]
fn combine(group: &[&TextBlock]) -> TextBlock {
  match group {
    [single] => (*single).clone(),
    _ => {
      let text = group
        .iter()
        .map(|b| b.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");
      let confidence = group.iter().map(|b| b.confidence).sum::<f64>() / group.len() as f64;
      let bounds = group
        .iter()
        .map(|b| b.bounds)
        .reduce(|acc, b| acc.union(&b))
        .unwrap_or_default();
      TextBlock::new(text, confidence, bounds)
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn block(text: &str, confidence: f64, left: i32, top: i32, right: i32, bottom: i32) -> TextBlock {
    TextBlock::new(text, confidence, Bounds::new(left, top, right, bottom))
  }

  #[test]
  fn merges_blocks_on_one_line() {
    let blocks = [
      block("选择", 0.9, 10, 100, 60, 130),
      block("收货地址", 0.7, 70, 100, 170, 130),
    ];
    let merged = merge_nearby_blocks(&blocks, 20);
    assert_eq!(merged.len(), 1);
    assert_eq!(merged[0].text, "选择 收货地址");
    assert!((merged[0].confidence - 0.8).abs() < 1e-9);
    assert_eq!(merged[0].bounds, Bounds::new(10, 100, 170, 130));
  }

  #[test]
  fn either_axis_is_enough() {
    // Same column, far apart vertically: x gap is 0
    let blocks = [block("a", 1.0, 0, 0, 50, 20), block("b", 1.0, 10, 900, 40, 920)];
    assert_eq!(merge_nearby_blocks(&blocks, 20).len(), 1);
  }

  #[test]
  fn distant_blocks_stay_apart() {
    let blocks = [block("a", 1.0, 0, 0, 50, 20), block("b", 1.0, 300, 300, 350, 320)];
    let merged = merge_nearby_blocks(&blocks, 20);
    assert_eq!(merged, blocks.to_vec());
  }

  #[test]
  fn anchor_not_chain() {
    // c is near b but not near the anchor a
    let blocks = [
      block("a", 1.0, 0, 0, 10, 10),
      block("b", 1.0, 25, 25, 35, 35),
      block("c", 1.0, 60, 60, 70, 70),
    ];
    let merged = merge_nearby_blocks(&blocks, 15);
    let texts: Vec<_> = merged.iter().map(|b| b.text.as_str()).collect();
    assert_eq!(texts, vec!["a b", "c"]);
  }

  #[test]
  fn empty_input() {
    assert!(merge_nearby_blocks(&[], 20).is_empty());
  }
}

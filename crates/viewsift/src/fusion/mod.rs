/*!
Text-recognition fusion.

Recognized blocks are classified and tied to the element that best explains
them; hierarchy-inferred items fill in whatever the recognizer did not report.

```text
TextBlock[] ─► classify_text ─► attach_match ─┐
                                              ├─► dedup ─► AnnotatedContent[]
Element[]   ─► infer_contents ────────────────┘
```
*/

mod classify;
mod inference;
mod matching;
mod merge;

pub use classify::{classify_text, BUTTON_KEYWORDS, INPUT_KEYWORDS, LINK_KEYWORDS, SEARCH_KEYWORDS};
pub use inference::{consolidate, infer_contents, infer_one};
pub use matching::{attach_match, find_best_match, is_duplicate, match_score, text_score};
pub use merge::merge_nearby_blocks;

use crate::config::FusionConfig;
use crate::types::{AnnotatedContent, Element, TextBlock, ViewsiftResult};

/// Read recognizer output: a JSON array of `{text, confidence, bounds}`.
pub fn blocks_from_json(json: &str) -> ViewsiftResult<Vec<TextBlock>> {
  let blocks: Vec<TextBlock> = serde_json::from_str(json)?;
  Ok(
    blocks
      .into_iter()
      .map(|b| TextBlock::new(b.text, b.confidence, b.bounds))
      .collect(),
  )
}

/// Fuse recognized blocks with inferred items.
///
/// Recognized items come first, in block order, each matched against
/// `elements`. Inferred items follow, minus any that duplicate a recognized
/// item.
pub fn fuse(
  blocks: &[TextBlock],
  inferred: Vec<AnnotatedContent>,
  elements: &[&Element],
  config: &FusionConfig,
) -> Vec<AnnotatedContent> {
  let mut contents: Vec<AnnotatedContent> = blocks
    .iter()
    .map(|block| {
      let mut item = AnnotatedContent::recognized(classify_text(&block.text), block);
      attach_match(&mut item, elements, config);
      log::trace!("recognized {:?} matched={}", item.text, item.matched);
      item
    })
    .collect();

  let recognized = contents.len();
  let matched = contents.iter().filter(|c| c.matched).count();
  let mut dropped = 0usize;
  for item in inferred {
    if contents
      .iter()
      .take(recognized)
      .any(|existing| is_duplicate(existing, &item, config))
    {
      dropped += 1;
    } else {
      contents.push(item);
    }
  }

  log::debug!(
    "Fused {recognized} recognized ({matched} matched) with {} inferred items, {dropped} duplicates dropped",
    contents.len() - recognized,
  );
  contents
}

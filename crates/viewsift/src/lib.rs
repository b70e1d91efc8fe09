/*!
VIEWSIFT - Visibility and occlusion sifting for UI hierarchy dumps

Decides which elements of an app's on-screen hierarchy are worth annotating
over a screenshot, and fuses externally recognized text with content inferred
from the hierarchy itself.

```ignore
use viewsift::{Analyzer, EngineConfig};

let analyzer = Analyzer::new(EngineConfig::default())?;
let markup = std::fs::read_to_string("dump.xml")?;
let blocks = viewsift::fusion::blocks_from_json(&std::fs::read_to_string("ocr.json")?)?;

let analysis = analyzer.analyze(&markup, Some(&blocks))?;
for annotation in &analysis.annotations {
    println!("{} {} {:?}", annotation.rank, annotation.label, annotation.bounds);
}
```

Lower-level stages are public too: [`parse_hierarchy`] builds the element
arena, [`pipeline`] holds the visibility gate, decision cascade, occlusion and
clickability resolvers, and [`fusion`] the text-recognition fusion.
*/

mod analyzer;
mod compare;
mod config;
mod hierarchy;
mod parser;
mod stats;

pub mod fusion;
pub mod pipeline;
pub mod widget;

mod types;
pub use types::*;

pub use analyzer::{Analysis, Annotation, Analyzer};
pub use compare::{CountDiff, PageDiff, PageKind, WebViewSummary, UNKNOWN_PAGE_KIND};
pub use config::{
  EngineConfig, FusionConfig, ModalPage, OcclusionConfig, PageKindRule, DEFAULT_MAX_CONTENT_HEIGHT,
  DEFAULT_MERGE_DISTANCE, DEFAULT_STATUS_BAR_HEIGHT, DEFAULT_VISIBILITY_THRESHOLD,
};
pub use hierarchy::{Ancestors, Hierarchy, HierarchyBuilder};
pub use parser::{parse_bounds, parse_flag, parse_hierarchy};
pub use stats::{HierarchyStats, STATS_VISIBLE_PERCENT};

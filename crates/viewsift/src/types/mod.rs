/*! Core types for viewsift.

Regenerate TypeScript bindings: `cargo test export_bindings`
*/

#![allow(missing_docs)]

mod content;
mod element;
mod error;
mod geometry;
mod ids;

pub use content::{AnnotatedContent, ContentSource, ContentType, TextBlock};
pub use element::Element;
pub use error::{ViewsiftError, ViewsiftResult};
pub use geometry::{Bounds, Screen};
pub use ids::ElementId;

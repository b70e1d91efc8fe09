/*! Error types for viewsift operations. */

/// Errors that can occur while analyzing a hierarchy dump.
///
/// Malformed attribute *values* (bounds, booleans) never surface here; they
/// degrade to safe defaults. Only documents that cannot be read as a tree at
/// all are fatal.
#[derive(Debug, thiserror::Error)]
pub enum ViewsiftError {
  #[error("Malformed hierarchy document at byte {position}: {reason}")]
  MalformedDocument { position: usize, reason: String },

  #[error("Hierarchy document has no root element")]
  EmptyDocument,

  #[error("Hierarchy document has more than one root element (second root at byte {position})")]
  MultipleRoots { position: usize },

  #[error("Invalid configuration: {0}")]
  InvalidConfig(String),

  #[error("Invalid text blocks: {0}")]
  InvalidTextBlocks(#[from] serde_json::Error),
}

/// Result type for viewsift operations.
pub type ViewsiftResult<T> = Result<T, ViewsiftError>;

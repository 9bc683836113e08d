use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub use crate::types::{LabelMap, SourceId};

/// One labeled image in a source's dataset.
///
/// `labels` is empty when the image has no sibling label file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabeledEntry {
    /// Source identity that owns the image.
    pub source: SourceId,
    /// Path of the materialized image file.
    pub file: PathBuf,
    /// Flat label mapping read from the sibling label file.
    #[serde(default)]
    pub labels: LabelMap,
}

impl LabeledEntry {
    /// Build an entry from its parts.
    pub fn new(source: impl Into<SourceId>, file: impl Into<PathBuf>, labels: LabelMap) -> Self {
        Self {
            source: source.into(),
            file: file.into(),
            labels,
        }
    }

    /// Image path.
    pub fn file(&self) -> &Path {
        &self.file
    }

    /// True if the entry carries at least one label.
    pub fn is_labeled(&self) -> bool {
        !self.labels.is_empty()
    }
}

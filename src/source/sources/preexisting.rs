use std::path::{Path, PathBuf};

use crate::config::CorpusConfig;
use crate::errors::CorpusError;
use crate::source::{Extractor, LifecyclePlan, SourceKind, SourceLayout};
use crate::types::SourceId;

/// Folder already materialized under `<root>/image/<folder_id>`.
///
/// The lifecycle skips staging, materialization, and cleanup for this
/// variant; calling those steps directly is a wiring bug.
#[derive(Clone, Debug)]
pub struct PreexistingSource {
    folder_id: PathBuf,
}

impl PreexistingSource {
    /// Source for the image folder named `folder_id`.
    pub fn new(folder_id: impl Into<SourceId>) -> Self {
        Self {
            folder_id: PathBuf::from(folder_id.into()),
        }
    }

    fn unreachable(&self, operation: &str) -> CorpusError {
        CorpusError::InvalidOperation {
            source_id: self.identity(),
            operation: format!("{operation} on an already-extracted folder"),
        }
    }
}

impl Extractor for PreexistingSource {
    fn origin(&self) -> &Path {
        &self.folder_id
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Preexisting
    }

    /// The folder name as-is; dots are part of the name, not an extension.
    fn identity(&self) -> SourceId {
        self.folder_id.to_string_lossy().into_owned()
    }

    fn plan(&self) -> LifecyclePlan {
        LifecyclePlan::Preexisting
    }

    fn stage(&self, _layout: &SourceLayout) -> Result<(), CorpusError> {
        Err(self.unreachable("stage"))
    }

    fn materialize_images(
        &self,
        _layout: &SourceLayout,
        _config: &CorpusConfig,
    ) -> Result<usize, CorpusError> {
        Err(self.unreachable("materialize_images"))
    }

    fn materialize_labels(&self, _layout: &SourceLayout) -> Result<(), CorpusError> {
        Err(self.unreachable("materialize_labels"))
    }
}

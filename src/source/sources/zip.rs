use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::errors::CorpusError;
use crate::source::{Extractor, SourceKind, SourceLayout};
use crate::tools::Toolchain;

/// Plain `.zip` archive of assets (resource packs and the like).
#[derive(Clone, Debug)]
pub struct ZipSource {
    origin: PathBuf,
    toolchain: Arc<Toolchain>,
}

impl ZipSource {
    /// Source for the archive at `origin`.
    pub fn new(origin: impl Into<PathBuf>, toolchain: Arc<Toolchain>) -> Self {
        Self {
            origin: origin.into(),
            toolchain,
        }
    }
}

impl Extractor for ZipSource {
    fn origin(&self) -> &Path {
        &self.origin
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Zip
    }

    fn stage(&self, layout: &SourceLayout) -> Result<(), CorpusError> {
        self.toolchain
            .extract_zip(&self.origin, layout.staging_dir())
            .map(|_| ())
    }
}

use std::path::Path;
use std::sync::{Arc, OnceLock};

use rand::Rng;

use crate::config::CorpusConfig;
use crate::data::LabeledEntry;
use crate::errors::CorpusError;
use crate::source::{Extractor, SourceKind, SourceLayout};

/// No-op source handed out for banned identities.
///
/// Exactly one instance exists per process. Every lifecycle step succeeds
/// without touching the filesystem and its dataset is permanently empty.
#[derive(Debug)]
pub struct NullSource {
    _private: (),
}

impl NullSource {
    /// The process-wide sentinel.
    pub fn shared() -> Arc<NullSource> {
        static SENTINEL: OnceLock<Arc<NullSource>> = OnceLock::new();
        Arc::clone(SENTINEL.get_or_init(|| Arc::new(NullSource { _private: () })))
    }

    /// Always 0.
    pub fn len(&self) -> usize {
        0
    }

    /// Always true.
    pub fn is_empty(&self) -> bool {
        true
    }

    /// Always empty.
    pub fn entries(&self) -> Vec<LabeledEntry> {
        Vec::new()
    }

    /// Always `None`.
    pub fn choose<R: Rng + ?Sized>(&self, _rng: &mut R) -> Option<LabeledEntry> {
        None
    }

    /// No-op.
    pub fn unload(&self) {}
}

impl Extractor for NullSource {
    fn origin(&self) -> &Path {
        Path::new("")
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Null
    }

    fn stage(&self, _layout: &SourceLayout) -> Result<(), CorpusError> {
        Ok(())
    }

    fn materialize_images(
        &self,
        _layout: &SourceLayout,
        _config: &CorpusConfig,
    ) -> Result<usize, CorpusError> {
        Ok(0)
    }

    fn materialize_labels(&self, _layout: &SourceLayout) -> Result<(), CorpusError> {
        Ok(())
    }
}

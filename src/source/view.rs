use std::path::{Path, PathBuf};

use rand::Rng;
use rand::seq::IndexedRandom;

use crate::data::LabeledEntry;
use crate::errors::CorpusError;
use crate::labels::entry_for_image;
use crate::transport::fs::list_files;
use crate::types::SourceId;

/// Dataset representation of one source.
///
/// A source starts `Empty`, holds an `Explicit` list right after enumeration
/// (used once to measure and publish its size), and is then unloaded to an
/// `Implicit` view that re-lists the image folder on every read.
#[derive(Clone, Debug, Default)]
pub enum DatasetView {
    /// Nothing enumerated yet.
    #[default]
    Empty,
    /// In-memory entries built during enumeration.
    Explicit(Vec<LabeledEntry>),
    /// Directory-backed view.
    Implicit(ImplicitView),
}

impl DatasetView {
    /// Number of entries currently visible through this view.
    pub fn len(&self) -> Result<usize, CorpusError> {
        match self {
            DatasetView::Empty => Ok(0),
            DatasetView::Explicit(entries) => Ok(entries.len()),
            DatasetView::Implicit(view) => Ok(view.list()?.len()),
        }
    }

    /// True when no entries are visible.
    pub fn is_empty(&self) -> Result<bool, CorpusError> {
        Ok(self.len()? == 0)
    }

    /// True once the view has been unloaded to its directory-backed form.
    pub fn is_implicit(&self) -> bool {
        matches!(self, DatasetView::Implicit(_))
    }

    /// All entries, in image path order.
    pub fn entries(&self) -> Result<Vec<LabeledEntry>, CorpusError> {
        match self {
            DatasetView::Empty => Ok(Vec::new()),
            DatasetView::Explicit(entries) => Ok(entries.clone()),
            DatasetView::Implicit(view) => view.entries(),
        }
    }

    /// One uniformly random entry, or `None` when the view is empty.
    pub fn choose<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
    ) -> Result<Option<LabeledEntry>, CorpusError> {
        match self {
            DatasetView::Empty => Ok(None),
            DatasetView::Explicit(entries) => Ok(entries.choose(rng).cloned()),
            DatasetView::Implicit(view) => view.choose(rng),
        }
    }
}

/// Directory-backed view over a source's image and label folders.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImplicitView {
    source_id: SourceId,
    image_dir: PathBuf,
    label_dir: PathBuf,
    label_extension: String,
}

impl ImplicitView {
    /// View over `image_dir`, pairing images with labels in `label_dir`.
    pub fn new(
        source_id: impl Into<SourceId>,
        image_dir: impl Into<PathBuf>,
        label_dir: impl Into<PathBuf>,
        label_extension: impl Into<String>,
    ) -> Self {
        Self {
            source_id: source_id.into(),
            image_dir: image_dir.into(),
            label_dir: label_dir.into(),
            label_extension: label_extension.into(),
        }
    }

    /// Image folder backing this view.
    pub fn image_dir(&self) -> &Path {
        &self.image_dir
    }

    /// Current image files, sorted.
    pub fn list(&self) -> Result<Vec<PathBuf>, CorpusError> {
        list_files(&self.image_dir)
    }

    /// Enumerate every image with its labels.
    pub fn entries(&self) -> Result<Vec<LabeledEntry>, CorpusError> {
        self.list()?
            .iter()
            .map(|image| self.entry(image))
            .collect()
    }

    /// Pick one image uniformly and load only its labels.
    pub fn choose<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
    ) -> Result<Option<LabeledEntry>, CorpusError> {
        let images = self.list()?;
        match images.choose(rng) {
            Some(image) => self.entry(image).map(Some),
            None => Ok(None),
        }
    }

    fn entry(&self, image: &Path) -> Result<LabeledEntry, CorpusError> {
        entry_for_image(&self.source_id, image, &self.label_dir, &self.label_extension)
    }
}

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::constants::layout::{IMAGE_DIR, LABEL_DIR, STAGING_DIR};

/// Image, label, and staging folders for one source under an output root.
///
/// Layout: `<root>/image/<id>`, `<root>/json/<id>`, `<root>/extract/<id>`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceLayout {
    root: PathBuf,
    image_dir: PathBuf,
    label_dir: PathBuf,
    staging_dir: PathBuf,
}

impl SourceLayout {
    /// Layout for `source_id` under `root`. Nothing is created on disk.
    pub fn scoped(root: impl Into<PathBuf>, source_id: &str) -> Self {
        let root = root.into();
        Self {
            image_dir: root.join(IMAGE_DIR).join(source_id),
            label_dir: root.join(LABEL_DIR).join(source_id),
            staging_dir: root.join(STAGING_DIR).join(source_id),
            root,
        }
    }

    /// Output root shared by every source.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Folder holding this source's materialized images.
    pub fn image_dir(&self) -> &Path {
        &self.image_dir
    }

    /// Folder holding this source's label files.
    pub fn label_dir(&self) -> &Path {
        &self.label_dir
    }

    /// Scratch folder populated by `Extractor::stage`.
    pub fn staging_dir(&self) -> &Path {
        &self.staging_dir
    }

    /// Create the shared `image`, `json`, and `extract` folders under the root.
    pub fn ensure_roots(&self) -> io::Result<()> {
        for name in [IMAGE_DIR, LABEL_DIR, STAGING_DIR] {
            fs::create_dir_all(self.root.join(name))?;
        }
        Ok(())
    }

    /// Create this source's image, label, and staging folders.
    pub fn create_scoped_dirs(&self) -> io::Result<()> {
        fs::create_dir_all(&self.image_dir)?;
        fs::create_dir_all(&self.label_dir)?;
        fs::create_dir_all(&self.staging_dir)?;
        Ok(())
    }
}

//! Data source interfaces and handles.
//!
//! Ownership model:
//! - `Extractor` is the variant-facing capability set (`stage`,
//!   `materialize_images`, `materialize_labels`) that the lifecycle drives.
//! - `Source` owns one identity's output folders, lifecycle state, and
//!   `DatasetView`; the registry shares admitted sources as `Arc<Source>`.
//! - `NullSource` is the single process-wide sentinel handed out for banned
//!   identities.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use rand::Rng;

use crate::config::CorpusConfig;
use crate::data::LabeledEntry;
use crate::errors::CorpusError;
use crate::transport::fs::copy_images_recursively;
use crate::types::SourceId;

/// Output folder layout scoped to one source identity.
pub mod layout;
/// Staging-to-enumeration lifecycle and the live `Source` handle.
pub mod lifecycle;
/// Concrete source variants and the banned-identity sentinel.
pub mod sources;
/// Explicit and directory-backed dataset representations.
pub mod view;

pub use layout::SourceLayout;
pub use lifecycle::{LifecycleState, Source};
pub use sources::minecraft::MinecraftSource;
pub use sources::null::NullSource;
pub use sources::preexisting::PreexistingSource;
pub use sources::terraria::TerrariaSource;
pub use sources::zip::ZipSource;
pub use view::{DatasetView, ImplicitView};

/// Derive a source identity from its origin: the last path component with its extension stripped.
pub fn source_identity(origin: &Path) -> SourceId {
    origin
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| origin.to_string_lossy().into_owned())
}

/// Which variant produced a source.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SourceKind {
    /// Minecraft release or `.jar` mod.
    Minecraft,
    /// Terraria install or `.tmod` mod.
    Terraria,
    /// Plain `.zip` archive of assets.
    Zip,
    /// Folder already present under the image output root.
    Preexisting,
    /// Sentinel for banned identities.
    Null,
    /// Caller-provided extractor.
    Custom,
}

impl SourceKind {
    /// Stable lowercase label for logs and reports.
    pub fn as_str(self) -> &'static str {
        match self {
            SourceKind::Minecraft => "minecraft",
            SourceKind::Terraria => "terraria",
            SourceKind::Zip => "zip",
            SourceKind::Preexisting => "preexisting",
            SourceKind::Null => "null",
            SourceKind::Custom => "custom",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which lifecycle stages a variant runs before enumeration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LifecyclePlan {
    /// Stage, materialize images and labels, then clean staging.
    Extract,
    /// Images already sit in the source's image folder; go straight to enumeration.
    Preexisting,
}

/// Capability set a source variant implements for the extraction lifecycle.
///
/// The lifecycle calls `stage`, `materialize_images`, and `materialize_labels`
/// in that order when `plan` is `LifecyclePlan::Extract`, and calls none of them
/// for `LifecyclePlan::Preexisting`.
pub trait Extractor: Send + Sync {
    /// Archive file or folder name the source is built from.
    fn origin(&self) -> &Path;

    /// Variant label.
    fn kind(&self) -> SourceKind;

    /// Deduplication key for this source.
    fn identity(&self) -> SourceId {
        source_identity(self.origin())
    }

    /// Lifecycle stages this variant needs.
    fn plan(&self) -> LifecyclePlan {
        LifecyclePlan::Extract
    }

    /// Populate `layout.staging_dir()` from the origin.
    fn stage(&self, layout: &SourceLayout) -> Result<(), CorpusError>;

    /// Copy staged images into `layout.image_dir()`. Returns the number copied.
    fn materialize_images(
        &self,
        layout: &SourceLayout,
        config: &CorpusConfig,
    ) -> Result<usize, CorpusError> {
        copy_images_recursively(
            layout.staging_dir(),
            layout.image_dir(),
            &config.image_extensions,
        )
    }

    /// Write label files into `layout.label_dir()`. May write nothing.
    fn materialize_labels(&self, _layout: &SourceLayout) -> Result<(), CorpusError> {
        Ok(())
    }
}

impl<T: Extractor + ?Sized> Extractor for Box<T> {
    fn origin(&self) -> &Path {
        (**self).origin()
    }

    fn kind(&self) -> SourceKind {
        (**self).kind()
    }

    fn identity(&self) -> SourceId {
        (**self).identity()
    }

    fn plan(&self) -> LifecyclePlan {
        (**self).plan()
    }

    fn stage(&self, layout: &SourceLayout) -> Result<(), CorpusError> {
        (**self).stage(layout)
    }

    fn materialize_images(
        &self,
        layout: &SourceLayout,
        config: &CorpusConfig,
    ) -> Result<usize, CorpusError> {
        (**self).materialize_images(layout, config)
    }

    fn materialize_labels(&self, layout: &SourceLayout) -> Result<(), CorpusError> {
        (**self).materialize_labels(layout)
    }
}

/// Shared handle to either a live source or the banned-identity sentinel.
#[derive(Clone, Debug)]
pub enum SourceHandle {
    /// Admitted source.
    Live(Arc<Source>),
    /// Process-wide sentinel; always empty.
    Sentinel(Arc<NullSource>),
}

impl SourceHandle {
    /// Identity of a live source; `None` for the sentinel.
    pub fn identity(&self) -> Option<&str> {
        match self {
            SourceHandle::Live(source) => Some(source.identity()),
            SourceHandle::Sentinel(_) => None,
        }
    }

    /// True for the sentinel handle.
    pub fn is_sentinel(&self) -> bool {
        matches!(self, SourceHandle::Sentinel(_))
    }

    /// Current number of entries (always 0 for the sentinel).
    pub fn len(&self) -> Result<usize, CorpusError> {
        match self {
            SourceHandle::Live(source) => source.len(),
            SourceHandle::Sentinel(null) => Ok(null.len()),
        }
    }

    /// True when the handle currently exposes no entries.
    pub fn is_empty(&self) -> Result<bool, CorpusError> {
        Ok(self.len()? == 0)
    }

    /// Read every entry from the current dataset view.
    pub fn entries(&self) -> Result<Vec<LabeledEntry>, CorpusError> {
        match self {
            SourceHandle::Live(source) => source.entries(),
            SourceHandle::Sentinel(null) => Ok(null.entries()),
        }
    }

    /// Draw one uniformly random entry.
    pub fn choose<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
    ) -> Result<Option<LabeledEntry>, CorpusError> {
        match self {
            SourceHandle::Live(source) => source.choose(rng),
            SourceHandle::Sentinel(null) => Ok(null.choose(rng)),
        }
    }

    /// True if both handles point at the same underlying object.
    pub fn ptr_eq(&self, other: &SourceHandle) -> bool {
        match (self, other) {
            (SourceHandle::Live(a), SourceHandle::Live(b)) => Arc::ptr_eq(a, b),
            (SourceHandle::Sentinel(a), SourceHandle::Sentinel(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn identity_strips_folders_and_extension() {
        assert_eq!(
            source_identity(Path::new("executables/CalamityMod.tmod")),
            "CalamityMod"
        );
        assert_eq!(source_identity(Path::new("Furfsky Reborn")), "Furfsky Reborn");
        assert_eq!(source_identity(Path::new("minecraft")), "minecraft");
        assert_eq!(
            source_identity(&PathBuf::from("packs").join("faithful.v2.zip")),
            "faithful.v2"
        );
    }

    #[test]
    fn sentinel_handles_compare_equal() {
        let a = SourceHandle::Sentinel(NullSource::shared());
        let b = SourceHandle::Sentinel(NullSource::shared());
        assert!(a.ptr_eq(&b));
        assert!(a.is_sentinel());
        assert_eq!(a.len().unwrap(), 0);
        assert!(a.entries().unwrap().is_empty());
        assert_eq!(a.identity(), None);
    }
}

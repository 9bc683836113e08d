//! Per-source extraction lifecycle.
//!
//! States advance strictly forward:
//! `Created -> Staged -> ImagesMaterialized -> LabelsMaterialized -> Cleaned
//! -> Enumerated -> {Admitted | Banned} -> Unloaded`.
//! Preexisting sources jump from `Created` straight to `Enumerated`.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, RwLock};

use rand::Rng;
use tracing::{debug, warn};

use crate::config::CorpusConfig;
use crate::data::LabeledEntry;
use crate::errors::CorpusError;
use crate::source::view::{DatasetView, ImplicitView};
use crate::source::{Extractor, LifecyclePlan, SourceKind, SourceLayout};
use crate::transport::fs::remove_dir_if_exists;
use crate::types::SourceId;

/// Lifecycle position of a source.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LifecycleState {
    /// Output folders exist; nothing staged yet.
    Created,
    /// Staging folder populated from the origin.
    Staged,
    /// Images copied out of staging.
    ImagesMaterialized,
    /// Label files written (possibly none).
    LabelsMaterialized,
    /// Staging folder released.
    Cleaned,
    /// Explicit entry list built and measured.
    Enumerated,
    /// Published to the registry's partition index.
    Admitted,
    /// Identity excluded for being too small.
    Banned,
    /// Explicit list dropped; reads go through the image folder.
    Unloaded,
}

impl LifecycleState {
    fn successors(self, plan: LifecyclePlan) -> &'static [LifecycleState] {
        use LifecycleState::*;
        match (self, plan) {
            (Created, LifecyclePlan::Extract) => &[Staged],
            (Created, LifecyclePlan::Preexisting) => &[Enumerated],
            (Staged, _) => &[ImagesMaterialized],
            (ImagesMaterialized, _) => &[LabelsMaterialized],
            (LabelsMaterialized, _) => &[Cleaned],
            (Cleaned, _) => &[Enumerated],
            (Enumerated, _) => &[Admitted, Banned],
            (Admitted, _) | (Banned, _) => &[Unloaded],
            (Unloaded, _) => &[],
        }
    }

    /// True if `next` directly follows `self` under `plan`.
    pub fn can_advance_to(self, next: LifecycleState, plan: LifecyclePlan) -> bool {
        self.successors(plan).contains(&next)
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Admission decision recorded on a source.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Admission {
    Admitted,
    Banned,
}

/// One data source: its folders, lifecycle state, and dataset view.
pub struct Source {
    identity: SourceId,
    kind: SourceKind,
    origin: PathBuf,
    plan: LifecyclePlan,
    layout: SourceLayout,
    label_extension: String,
    enumerated: usize,
    state: Mutex<LifecycleState>,
    view: RwLock<DatasetView>,
}

impl fmt::Debug for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Source")
            .field("identity", &self.identity)
            .field("kind", &self.kind)
            .field("origin", &self.origin)
            .field("enumerated", &self.enumerated)
            .field("state", &self.state())
            .finish()
    }
}

impl Source {
    fn new(extractor: &dyn Extractor, layout: SourceLayout, config: &CorpusConfig) -> Self {
        Self {
            identity: extractor.identity(),
            kind: extractor.kind(),
            origin: extractor.origin().to_path_buf(),
            plan: extractor.plan(),
            layout,
            label_extension: config.label_extension.clone(),
            enumerated: 0,
            state: Mutex::new(LifecycleState::Created),
            view: RwLock::new(DatasetView::Empty),
        }
    }

    /// Deduplication key.
    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Variant that produced this source.
    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    /// Archive file or folder name the source was built from.
    pub fn origin(&self) -> &Path {
        &self.origin
    }

    /// Output folders owned by this source.
    pub fn layout(&self) -> &SourceLayout {
        &self.layout
    }

    /// Current lifecycle state.
    pub fn state(&self) -> LifecycleState {
        *self.state.lock().expect("source state poisoned")
    }

    /// Entry count measured at enumeration; this is the size published to the partition index.
    pub fn enumerated_len(&self) -> usize {
        self.enumerated
    }

    /// Entries visible through the current view.
    pub fn len(&self) -> Result<usize, CorpusError> {
        self.view.read().expect("source view poisoned").len()
    }

    /// True when the current view has no entries.
    pub fn is_empty(&self) -> Result<bool, CorpusError> {
        Ok(self.len()? == 0)
    }

    /// True once the explicit entry list has been dropped.
    pub fn is_unloaded(&self) -> bool {
        self.view.read().expect("source view poisoned").is_implicit()
    }

    /// Read every entry from the current view.
    pub fn entries(&self) -> Result<Vec<LabeledEntry>, CorpusError> {
        self.view.read().expect("source view poisoned").entries()
    }

    /// Draw one uniformly random entry from the current view.
    pub fn choose<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
    ) -> Result<Option<LabeledEntry>, CorpusError> {
        self.view.read().expect("source view poisoned").choose(rng)
    }

    /// Drop the explicit entry list and switch to the directory-backed view.
    ///
    /// Only valid after an admission decision; repeated calls are no-ops.
    pub fn unload(&self) -> Result<(), CorpusError> {
        let mut state = self.state.lock().expect("source state poisoned");
        if *state == LifecycleState::Unloaded {
            return Ok(());
        }
        self.check_transition(*state, LifecycleState::Unloaded)?;
        let mut view = self.view.write().expect("source view poisoned");
        *view = DatasetView::Implicit(ImplicitView::new(
            self.identity.clone(),
            self.layout.image_dir(),
            self.layout.label_dir(),
            self.label_extension.clone(),
        ));
        *state = LifecycleState::Unloaded;
        debug!(source_id = %self.identity, "unloaded explicit dataset");
        Ok(())
    }

    /// Record the admission decision, then unload.
    pub(crate) fn conclude(&self, admission: Admission) -> Result<(), CorpusError> {
        let next = match admission {
            Admission::Admitted => LifecycleState::Admitted,
            Admission::Banned => LifecycleState::Banned,
        };
        self.advance(next)?;
        self.unload()
    }

    fn advance(&self, next: LifecycleState) -> Result<(), CorpusError> {
        let mut state = self.state.lock().expect("source state poisoned");
        self.check_transition(*state, next)?;
        *state = next;
        Ok(())
    }

    fn check_transition(
        &self,
        current: LifecycleState,
        next: LifecycleState,
    ) -> Result<(), CorpusError> {
        if current.can_advance_to(next, self.plan) {
            return Ok(());
        }
        Err(CorpusError::InvalidOperation {
            source_id: self.identity.clone(),
            operation: format!("lifecycle transition {current} -> {next}"),
        })
    }

    fn materialize(
        &self,
        extractor: &dyn Extractor,
        config: &CorpusConfig,
    ) -> Result<(), CorpusError> {
        extractor.stage(&self.layout)?;
        self.advance(LifecycleState::Staged)?;
        let copied = extractor.materialize_images(&self.layout, config)?;
        debug!(source_id = %self.identity, copied, "materialized images");
        self.advance(LifecycleState::ImagesMaterialized)?;
        extractor.materialize_labels(&self.layout)?;
        self.advance(LifecycleState::LabelsMaterialized)
    }

    fn enumerate(&mut self) -> Result<(), CorpusError> {
        let entries = ImplicitView::new(
            self.identity.clone(),
            self.layout.image_dir(),
            self.layout.label_dir(),
            self.label_extension.clone(),
        )
        .entries()?;
        self.enumerated = entries.len();
        *self.view.get_mut().expect("source view poisoned") = DatasetView::Explicit(entries);
        self.advance(LifecycleState::Enumerated)
    }
}

/// Scoped ownership of a staging folder.
///
/// The folder is removed exactly once, on `release` or on drop, unless
/// extraction output is preserved.
struct StagingGuard<'a> {
    source_id: &'a str,
    dir: &'a Path,
    preserve: bool,
    released: bool,
}

impl<'a> StagingGuard<'a> {
    fn acquire(source_id: &'a str, dir: &'a Path, preserve: bool) -> Self {
        Self {
            source_id,
            dir,
            preserve,
            released: false,
        }
    }

    fn release(mut self) {
        self.cleanup();
    }

    fn cleanup(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        if self.preserve {
            debug!(
                source_id = %self.source_id,
                path = %self.dir.display(),
                "preserving staging folder"
            );
            return;
        }
        if let Err(err) = remove_dir_if_exists(self.dir) {
            warn!(
                source_id = %self.source_id,
                path = %self.dir.display(),
                error = %err,
                "failed to remove staging folder"
            );
        }
    }
}

impl Drop for StagingGuard<'_> {
    fn drop(&mut self) {
        self.cleanup();
    }
}

/// Run every pre-admission stage for `extractor` and return the enumerated source.
///
/// Staging is released before any stage error propagates. The caller decides
/// admission and must call `Source::conclude`.
pub(crate) fn run(
    extractor: &dyn Extractor,
    layout: SourceLayout,
    config: &CorpusConfig,
) -> Result<Source, CorpusError> {
    let mut source = Source::new(extractor, layout, config);
    match source.plan {
        LifecyclePlan::Extract => {
            source.layout.create_scoped_dirs()?;
            let staging = StagingGuard::acquire(
                &source.identity,
                source.layout.staging_dir(),
                config.preserve_extraction,
            );
            let outcome = source.materialize(extractor, config);
            staging.release();
            outcome?;
            source.advance(LifecycleState::Cleaned)?;
        }
        LifecyclePlan::Preexisting => {
            if !source.layout.image_dir().is_dir() {
                return Err(CorpusError::SourceUnavailable {
                    source_id: source.identity.clone(),
                    reason: format!(
                        "image folder '{}' does not exist",
                        source.layout.image_dir().display()
                    ),
                });
            }
        }
    }
    source.enumerate()?;
    debug!(
        source_id = %source.identity,
        kind = %source.kind,
        size = source.enumerated,
        "enumerated source"
    );
    Ok(source)
}

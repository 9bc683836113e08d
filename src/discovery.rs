//! Batch discovery and import of many sources at once.

use std::path::Path;
use std::sync::Arc;

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::constants::layout::IMAGE_DIR;
use crate::constants::registry::IMPORT_SKIPPED_MSG;
use crate::errors::CorpusError;
use crate::registry::{Resolution, SourceRegistry};
use crate::source::{Extractor, MinecraftSource, PreexistingSource, TerrariaSource, ZipSource};
use crate::tools::Toolchain;
use crate::transport::fs::{list_files, list_subfolders, validate_folder};
use crate::types::SourceId;

/// Map every `.jar`, `.tmod`, and `.zip` file directly inside `folder` to its variant.
///
/// Other files are skipped. Results follow file-name order.
pub fn discover_archives(
    folder: &Path,
    toolchain: Arc<Toolchain>,
) -> Result<Vec<Box<dyn Extractor>>, CorpusError> {
    validate_folder(folder)?;
    let mut extractors: Vec<Box<dyn Extractor>> = Vec::new();
    for path in list_files(folder)? {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        let toolchain = Arc::clone(&toolchain);
        match extension.as_deref() {
            Some("jar") => extractors.push(Box::new(MinecraftSource::new(path, toolchain))),
            Some("tmod") => extractors.push(Box::new(TerrariaSource::new(path, toolchain))),
            Some("zip") => extractors.push(Box::new(ZipSource::new(path, toolchain))),
            _ => debug!(path = %path.display(), "ignoring non-archive file"),
        }
    }
    Ok(extractors)
}

/// One preexisting source per folder under `<output_root>/image`.
///
/// A missing image folder yields no sources.
pub fn discover_preexisting(output_root: &Path) -> Result<Vec<Box<dyn Extractor>>, CorpusError> {
    Ok(preexisting_folder_ids(output_root)?
        .into_iter()
        .map(|folder_id| Box::new(PreexistingSource::new(folder_id)) as Box<dyn Extractor>)
        .collect())
}

fn preexisting_folder_ids(output_root: &Path) -> Result<Vec<SourceId>, CorpusError> {
    let image_root = output_root.join(IMAGE_DIR);
    if !image_root.is_dir() {
        return Ok(Vec::new());
    }
    Ok(list_subfolders(&image_root)?
        .iter()
        .filter_map(|folder| folder.file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .collect())
}

/// A source that failed before admission.
#[derive(Debug)]
pub struct ImportFailure {
    /// Identity of the failing source.
    pub source_id: SourceId,
    /// Why it failed.
    pub error: CorpusError,
}

/// Per-identity outcome of `SourceRegistry::import_all`, in input order.
#[derive(Debug, Default)]
pub struct ImportReport {
    /// Newly admitted identities.
    pub created: Vec<SourceId>,
    /// Identities that were already active.
    pub existing: Vec<SourceId>,
    /// Identities that were already banned.
    pub banned: Vec<SourceId>,
    /// Identities banned by this import for being too small, with their size.
    pub rejected: Vec<(SourceId, usize)>,
    /// Sources whose lifecycle failed; they are unregistered and may be retried.
    pub failed: Vec<ImportFailure>,
}

impl ImportReport {
    /// Number of sources processed.
    pub fn len(&self) -> usize {
        self.created.len()
            + self.existing.len()
            + self.banned.len()
            + self.rejected.len()
            + self.failed.len()
    }

    /// True when nothing was processed.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn record(&mut self, source_id: SourceId, outcome: Result<Resolution, CorpusError>) {
        match outcome {
            Ok(Resolution::Created(_)) => self.created.push(source_id),
            Ok(Resolution::Existing(_)) => self.existing.push(source_id),
            Ok(Resolution::Banned(_)) => self.banned.push(source_id),
            Ok(Resolution::Rejected { size, .. }) => self.rejected.push((source_id, size)),
            Err(error) => self.failed.push(ImportFailure { source_id, error }),
        }
    }
}

impl SourceRegistry {
    /// Ban every folder already present under `<output_root>/image` so imports skip it.
    ///
    /// Active identities are left alone. Returns how many identities were newly banned.
    pub fn ban_preexisting(&self, output_root: &Path) -> Result<usize, CorpusError> {
        let mut banned = 0usize;
        for folder_id in preexisting_folder_ids(output_root)? {
            if self.is_active(&folder_id) {
                continue;
            }
            if self.ban(folder_id)? {
                banned += 1;
            }
        }
        debug!(root = %output_root.display(), banned, "banned preexisting folders");
        Ok(banned)
    }

    /// Resolve every extractor in parallel; a failing source is logged and skipped.
    ///
    /// Partition slots follow completion order, not input order.
    pub fn import_all<E>(&self, extractors: &[E], output_root: &Path) -> ImportReport
    where
        E: Extractor,
    {
        let outcomes: Vec<(SourceId, Result<Resolution, CorpusError>)> = extractors
            .par_iter()
            .map(|extractor| {
                let source_id = extractor.identity();
                let outcome = self.resolve(extractor, output_root);
                if let Err(err) = &outcome {
                    warn!(
                        source_id = %source_id,
                        origin = %extractor.origin().display(),
                        error = %err,
                        IMPORT_SKIPPED_MSG
                    );
                }
                (source_id, outcome)
            })
            .collect();

        let mut report = ImportReport::default();
        for (source_id, outcome) in outcomes {
            report.record(source_id, outcome);
        }
        info!(
            created = report.created.len(),
            existing = report.existing.len(),
            banned = report.banned.len(),
            rejected = report.rejected.len(),
            failed = report.failed.len(),
            total_size = self.total_size(),
            "import finished"
        );
        report
    }
}

//! Sibling label files and the process-wide missing-label warning.
//!
//! For an image `name.<ext>` in a source's image folder, the label file is
//! `name.<label_ext>` in the source's label folder and holds a flat JSON object
//! of string values.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::warn;

use crate::constants::labels::MISSING_LABEL_MSG;
use crate::data::LabeledEntry;
use crate::errors::CorpusError;
use crate::types::{LabelMap, SourceId};

static MISSING_LABEL_WARNED: AtomicBool = AtomicBool::new(false);

/// True once any source in this process has enumerated an image without a label file.
pub fn missing_label_warning_emitted() -> bool {
    MISSING_LABEL_WARNED.load(Ordering::Relaxed)
}

/// Path of the label file paired with `image` inside `label_dir`.
pub fn label_path_for(image: &Path, label_dir: &Path, label_extension: &str) -> PathBuf {
    let stem = image
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    label_dir.join(format!("{stem}.{label_extension}"))
}

/// Parse a flat string-to-string label file.
pub fn read_label_file(path: &Path, source_id: &SourceId) -> Result<LabelMap, CorpusError> {
    let raw = fs::read_to_string(path)?;
    serde_json::from_str(&raw).map_err(|err| CorpusError::SourceInconsistent {
        source_id: source_id.clone(),
        details: format!("label file '{}' is not a flat string map: {err}", path.display()),
    })
}

/// Pair an image with its labels, or with an empty mapping when no label file exists.
pub fn entry_for_image(
    source_id: &SourceId,
    image: &Path,
    label_dir: &Path,
    label_extension: &str,
) -> Result<LabeledEntry, CorpusError> {
    let label_path = label_path_for(image, label_dir, label_extension);
    let labels = if label_path.is_file() {
        read_label_file(&label_path, source_id)?
    } else {
        warn_missing_label(source_id, image);
        LabelMap::new()
    };
    Ok(LabeledEntry::new(source_id.clone(), image, labels))
}

fn warn_missing_label(source_id: &SourceId, image: &Path) {
    if MISSING_LABEL_WARNED.swap(true, Ordering::Relaxed) {
        return;
    }
    warn!(
        source_id = %source_id,
        path = %image.display(),
        MISSING_LABEL_MSG
    );
}

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use pixcorpus::{CorpusError, Extractor, SourceKind, SourceLayout};

/// Archive stand-in that writes `images` PNG files into nested staging folders.
pub struct FakeArchive {
    origin: PathBuf,
    images: usize,
    labeled: usize,
    fail_staging: bool,
    stage_delay: Option<Duration>,
    stage_calls: AtomicUsize,
}

impl FakeArchive {
    pub fn new(identity: &str, images: usize) -> Self {
        Self {
            origin: PathBuf::from(format!("executables/{identity}.zip")),
            images,
            labeled: 0,
            fail_staging: false,
            stage_delay: None,
            stage_calls: AtomicUsize::new(0),
        }
    }

    /// Write label files for the first `labeled` images.
    pub fn with_labels(mut self, labeled: usize) -> Self {
        self.labeled = labeled;
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail_staging = true;
        self
    }

    pub fn with_stage_delay(mut self, delay: Duration) -> Self {
        self.stage_delay = Some(delay);
        self
    }

    pub fn stage_calls(&self) -> usize {
        self.stage_calls.load(Ordering::SeqCst)
    }
}

pub fn image_name(idx: usize) -> String {
    format!("tile_{idx:03}.png")
}

impl Extractor for FakeArchive {
    fn origin(&self) -> &Path {
        &self.origin
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Custom
    }

    fn stage(&self, layout: &SourceLayout) -> Result<(), CorpusError> {
        self.stage_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.stage_delay {
            std::thread::sleep(delay);
        }
        let items = layout.staging_dir().join("assets").join("items");
        fs::create_dir_all(&items)?;
        for idx in 0..self.images {
            fs::write(items.join(image_name(idx)), format!("png {idx}"))?;
        }
        fs::write(items.join("items.lang"), b"item.tile=Tile")?;
        if self.fail_staging {
            return Err(CorpusError::SourceUnavailable {
                source_id: self.identity(),
                reason: "corrupt archive".to_string(),
            });
        }
        Ok(())
    }

    fn materialize_labels(&self, layout: &SourceLayout) -> Result<(), CorpusError> {
        for idx in 0..self.labeled {
            let stem = format!("tile_{idx:03}");
            fs::write(
                layout.label_dir().join(format!("{stem}.json")),
                format!(r#"{{"name": "{stem}", "rarity": "common"}}"#),
            )?;
        }
        Ok(())
    }
}

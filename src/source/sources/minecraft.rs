use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::constants::tools::MINECRAFT_ORIGIN;
use crate::errors::CorpusError;
use crate::source::{Extractor, SourceKind, SourceLayout};
use crate::tools::Toolchain;

/// Minecraft source: a `.jar` mod, or the full release when the origin is `minecraft`.
///
/// Labels are not produced yet; item metadata will land in the label folder later.
#[derive(Clone, Debug)]
pub struct MinecraftSource {
    origin: PathBuf,
    toolchain: Arc<Toolchain>,
}

impl MinecraftSource {
    /// Source for a mod jar path or the literal `minecraft` release origin.
    pub fn new(origin: impl Into<PathBuf>, toolchain: Arc<Toolchain>) -> Self {
        Self {
            origin: origin.into(),
            toolchain,
        }
    }

    /// Source for the full Minecraft release.
    pub fn release(toolchain: Arc<Toolchain>) -> Self {
        Self::new(MINECRAFT_ORIGIN, toolchain)
    }

    fn is_release(&self) -> bool {
        self.origin.as_os_str() == MINECRAFT_ORIGIN
    }
}

impl Extractor for MinecraftSource {
    fn origin(&self) -> &Path {
        &self.origin
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Minecraft
    }

    fn stage(&self, layout: &SourceLayout) -> Result<(), CorpusError> {
        let produced = if self.is_release() {
            self.toolchain.decompile_minecraft(layout.staging_dir())?
        } else {
            self.toolchain
                .decompile_jar(&self.origin, layout.staging_dir())?
        };
        debug!(origin = %self.origin.display(), produced, "staged minecraft source");
        Ok(())
    }
}

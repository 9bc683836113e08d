use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::constants::tools::TERRARIA_ORIGIN;
use crate::errors::CorpusError;
use crate::source::{Extractor, SourceKind, SourceLayout};
use crate::tools::Toolchain;
use crate::transport::fs::file_with_extension;

/// Terraria source: a `.tmod` mod, or the installed game when the origin is `terraria`.
#[derive(Clone, Debug)]
pub struct TerrariaSource {
    origin: PathBuf,
    toolchain: Arc<Toolchain>,
}

impl TerrariaSource {
    /// Source for a `.tmod` path or the literal `terraria` install origin.
    pub fn new(origin: impl Into<PathBuf>, toolchain: Arc<Toolchain>) -> Self {
        Self {
            origin: origin.into(),
            toolchain,
        }
    }

    /// Source for the installed game configured in the toolchain.
    pub fn install(toolchain: Arc<Toolchain>) -> Self {
        Self::new(TERRARIA_ORIGIN, toolchain)
    }

    fn is_install(&self) -> bool {
        self.origin.as_os_str() == TERRARIA_ORIGIN
    }

    fn stage_mod(&self, staging: &Path) -> Result<bool, CorpusError> {
        self.toolchain.decompile_tmod(&self.origin, staging)?;
        // A tmod holds exactly one compiled assembly next to its assets.
        let dll = file_with_extension(staging, "dll")?;
        self.toolchain.decompile_dll(&dll, staging)
    }
}

impl Extractor for TerrariaSource {
    fn origin(&self) -> &Path {
        &self.origin
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Terraria
    }

    fn stage(&self, layout: &SourceLayout) -> Result<(), CorpusError> {
        let produced = if self.is_install() {
            self.toolchain
                .extract_terraria_install(layout.staging_dir())?
        } else {
            self.stage_mod(layout.staging_dir())?
        };
        debug!(origin = %self.origin.display(), produced, "staged terraria source");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn install_origin_is_detected() {
        let toolchain = Arc::new(Toolchain::default());
        assert!(TerrariaSource::install(Arc::clone(&toolchain)).is_install());
        let tmod = TerrariaSource::new("mods/CalamityMod.tmod", toolchain);
        assert!(!tmod.is_install());
        assert_eq!(tmod.identity(), "CalamityMod");
    }
}

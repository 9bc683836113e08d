use std::path::PathBuf;

use crate::constants::layout::{DEFAULT_IMAGE_EXTENSIONS, DEFAULT_LABEL_EXTENSION};
use crate::constants::registry::MIN_DATASET_SIZE;
use crate::constants::tools::{DEFAULT_LIB_DIR, DEFAULT_MINECRAFT_VERSION, DEFAULT_TERRARIA_DIR};
use crate::errors::CorpusError;
use crate::types::Extension;

/// Top-level registry configuration.
#[derive(Clone, Debug)]
pub struct CorpusConfig {
    /// Minimum enumerated size for a source to be admitted; smaller sources are banned.
    pub min_dataset_size: usize,
    /// Keep per-source staging folders instead of removing them after materialization.
    pub preserve_extraction: bool,
    /// RNG seed for sampling; `None` draws a fresh seed per registry.
    pub seed: Option<u64>,
    /// File extensions recognized as images while copying out of staging.
    pub image_extensions: Vec<Extension>,
    /// Extension of sibling label files in the label folder.
    pub label_extension: Extension,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            min_dataset_size: MIN_DATASET_SIZE,
            preserve_extraction: false,
            seed: None,
            image_extensions: DEFAULT_IMAGE_EXTENSIONS
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
            label_extension: DEFAULT_LABEL_EXTENSION.to_string(),
        }
    }
}

impl CorpusConfig {
    /// Override the admission threshold.
    pub fn with_min_dataset_size(mut self, min_dataset_size: usize) -> Self {
        self.min_dataset_size = min_dataset_size;
        self
    }

    /// Keep or remove staging folders after materialization.
    pub fn with_preserve_extraction(mut self, preserve_extraction: bool) -> Self {
        self.preserve_extraction = preserve_extraction;
        self
    }

    /// Fix the sampling RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Replace the recognized image extensions (leading dots are stripped).
    pub fn with_image_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.image_extensions = extensions
            .into_iter()
            .map(|ext| ext.into().trim_start_matches('.').to_lowercase())
            .collect();
        self
    }

    /// Replace the label file extension (a leading dot is stripped).
    pub fn with_label_extension(mut self, extension: impl Into<String>) -> Self {
        self.label_extension = extension.into().trim_start_matches('.').to_lowercase();
        self
    }

    /// Reject configurations the registry cannot honor.
    pub fn validate(&self) -> Result<(), CorpusError> {
        if self.min_dataset_size == 0 {
            return Err(CorpusError::Configuration(
                "min_dataset_size must be at least 1".to_string(),
            ));
        }
        if self.image_extensions.is_empty() {
            return Err(CorpusError::Configuration(
                "at least one image extension is required".to_string(),
            ));
        }
        if self.label_extension.is_empty() {
            return Err(CorpusError::Configuration(
                "label extension must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Locations of the external decompilers used to stage archive sources.
#[derive(Clone, Debug)]
pub struct ToolchainConfig {
    /// Folder holding Vineflower, ILSpyCMD, TML.Patcher, TerrariaXNB2PNG and DecompilerMC.
    pub lib_dir: PathBuf,
    /// Java launcher used for Vineflower.
    pub java: PathBuf,
    /// Python interpreter used for DecompilerMC.
    pub python: PathBuf,
    /// Archive extractor used for `.zip` sources and Minecraft client jars.
    pub unzip: PathBuf,
    /// Terraria install folder containing `Terraria.exe` and `Content`.
    pub terraria_dir: PathBuf,
    /// Minecraft release decompiled for the `minecraft` origin.
    pub minecraft_version: String,
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            lib_dir: PathBuf::from(DEFAULT_LIB_DIR),
            java: PathBuf::from("java"),
            python: PathBuf::from("python"),
            unzip: PathBuf::from("unzip"),
            terraria_dir: PathBuf::from(DEFAULT_TERRARIA_DIR),
            minecraft_version: DEFAULT_MINECRAFT_VERSION.to_string(),
        }
    }
}

impl ToolchainConfig {
    /// Override the decompiler folder.
    pub fn with_lib_dir(mut self, lib_dir: impl Into<PathBuf>) -> Self {
        self.lib_dir = lib_dir.into();
        self
    }

    /// Override the Java launcher.
    pub fn with_java(mut self, java: impl Into<PathBuf>) -> Self {
        self.java = java.into();
        self
    }

    /// Override the Python interpreter.
    pub fn with_python(mut self, python: impl Into<PathBuf>) -> Self {
        self.python = python.into();
        self
    }

    /// Override the archive extractor.
    pub fn with_unzip(mut self, unzip: impl Into<PathBuf>) -> Self {
        self.unzip = unzip.into();
        self
    }

    /// Override the Terraria install folder.
    pub fn with_terraria_dir(mut self, terraria_dir: impl Into<PathBuf>) -> Self {
        self.terraria_dir = terraria_dir.into();
        self
    }

    /// Override the Minecraft release version.
    pub fn with_minecraft_version(mut self, version: impl Into<String>) -> Self {
        self.minecraft_version = version.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_admission_threshold() {
        let config = CorpusConfig::default();
        assert_eq!(config.min_dataset_size, 16);
        assert!(!config.preserve_extraction);
        assert_eq!(config.image_extensions, vec!["png".to_string()]);
        assert_eq!(config.label_extension, "json");
        config.validate().unwrap();
    }

    #[test]
    fn builders_normalize_extensions() {
        let config = CorpusConfig::default()
            .with_image_extensions([".PNG", "gif"])
            .with_label_extension(".JSON");
        assert_eq!(config.image_extensions, vec!["png", "gif"]);
        assert_eq!(config.label_extension, "json");
    }

    #[test]
    fn validate_rejects_zero_threshold() {
        let err = CorpusConfig::default()
            .with_min_dataset_size(0)
            .validate()
            .unwrap_err();
        assert!(matches!(err, CorpusError::Configuration(_)));
    }
}

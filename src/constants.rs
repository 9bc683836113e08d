/// Constants used by source admission and batch imports.
pub mod registry {
    /// Enumerated size below which a source is banned instead of admitted.
    pub const MIN_DATASET_SIZE: usize = 16;
    /// Log message used when a source is banned for being too small.
    pub const REJECTED_SOURCE_MSG: &str = "source below minimum dataset size; identity banned";
    /// Log message used when a batch import skips a failing source.
    pub const IMPORT_SKIPPED_MSG: &str = "skipping source that failed to import";
}

/// Constants used by the on-disk output layout.
pub mod layout {
    /// Folder under the output root holding materialized images.
    pub const IMAGE_DIR: &str = "image";
    /// Folder under the output root holding label files.
    pub const LABEL_DIR: &str = "json";
    /// Folder under the output root holding per-source staging output.
    pub const STAGING_DIR: &str = "extract";
    /// Extensions recognized as images unless configured otherwise.
    pub const DEFAULT_IMAGE_EXTENSIONS: [&str; 1] = ["png"];
    /// Label file extension unless configured otherwise.
    pub const DEFAULT_LABEL_EXTENSION: &str = "json";
}

/// Constants used by label enumeration.
pub mod labels {
    /// Warning emitted the first time any image has no sibling label file.
    pub const MISSING_LABEL_MSG: &str = "could not find a label file for an image; \
        this warning is only emitted once per process and unlabeled images get an empty mapping";
}

/// Constants used by external decompiler wrappers.
pub mod tools {
    /// Default folder holding the external decompilers, relative to the working directory.
    pub const DEFAULT_LIB_DIR: &str = "lib";
    /// Vineflower jar used to decompile Java archives.
    pub const VINEFLOWER_JAR: &str = "vineflower-1.11.1.jar";
    /// ILSpy command-line folder used to decompile .NET assemblies.
    pub const ILSPY_DIR: &str = "ILSpyCMD";
    /// ILSpy command-line binary inside `ILSPY_DIR`.
    pub const ILSPY_BIN: &str = "ilspycmd";
    /// TML.Patcher folder used to unpack `.tmod` archives.
    pub const TML_PATCHER_DIR: &str = "TML.Patcher";
    /// TML.Patcher executable inside `TML_PATCHER_DIR`.
    pub const TML_PATCHER_BIN: &str = "TML.Patcher.exe";
    /// Converter turning `.xnb` assets into `.png` files next to their inputs.
    pub const XNB_CONVERTER_BIN: &str = "TerrariaXNB2PNG";
    /// DecompilerMC checkout used for full Minecraft releases.
    pub const DECOMPILER_MC_DIR: &str = "DecompilerMC";
    /// Upper bound on the summed path length passed to one converter call.
    pub const XNB_BATCH_MAX_CHARS: usize = 28_000;
    /// Default Terraria install folder.
    pub const DEFAULT_TERRARIA_DIR: &str =
        r"C:\Program Files (x86)\Steam\steamapps\common\Terraria";
    /// Default Minecraft release decompiled for the `minecraft` origin.
    pub const DEFAULT_MINECRAFT_VERSION: &str = "latest";
    /// Origin name that selects the full Minecraft release pipeline.
    pub const MINECRAFT_ORIGIN: &str = "minecraft";
    /// Origin name that selects the installed Terraria pipeline.
    pub const TERRARIA_ORIGIN: &str = "terraria";
}

/// Constants used by registry test fixtures.
#[cfg(test)]
pub mod registry_tests {
    /// Primary source id used by registry unit tests.
    pub const PRIMARY_SOURCE_ID: &str = "source_a";
    /// Secondary source id used by registry unit tests.
    pub const SECONDARY_SOURCE_ID: &str = "source_c";
    /// Source id used for sub-threshold fixtures.
    pub const SMALL_SOURCE_ID: &str = "source_b";
}

//! Wrappers around the external decompilers that stage archive sources.
//!
//! Every wrapper validates its inputs, runs the tool to completion, maps a
//! non-zero exit to `CorpusError::ToolFailed`, and reports whether the output
//! folder ended up non-empty. None of these calls are time-bounded.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::{fs, io};

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::config::ToolchainConfig;
use crate::constants::tools::{
    DECOMPILER_MC_DIR, ILSPY_BIN, ILSPY_DIR, TERRARIA_ORIGIN, TML_PATCHER_BIN, TML_PATCHER_DIR,
    VINEFLOWER_JAR, XNB_BATCH_MAX_CHARS, XNB_CONVERTER_BIN,
};
use crate::errors::CorpusError;
use crate::transport::fs::{
    copy_dir_contents, copy_entity, file_with_extension, has_extension, is_empty_dir, move_file,
    remove_dir_if_exists, singleton_subfolder, validate_folder,
};

/// External decompilers resolved from a `ToolchainConfig`.
#[derive(Clone, Debug, Default)]
pub struct Toolchain {
    config: ToolchainConfig,
}

impl Toolchain {
    /// Wrap a toolchain configuration.
    pub fn new(config: ToolchainConfig) -> Self {
        Self { config }
    }

    /// Underlying configuration.
    pub fn config(&self) -> &ToolchainConfig {
        &self.config
    }

    fn lib_path(&self, parts: &[&str]) -> PathBuf {
        parts
            .iter()
            .fold(self.config.lib_dir.clone(), |path, part| path.join(part))
    }

    /// Decompile a Java archive with Vineflower into `out`.
    pub fn decompile_jar(&self, jar: &Path, out: &Path) -> Result<bool, CorpusError> {
        require_dir(out)?;
        require_file(jar)?;
        let mut cmd = Command::new(&self.config.java);
        cmd.arg("-jar")
            .arg(self.lib_path(&[VINEFLOWER_JAR]))
            .arg(jar)
            .arg(out);
        run_tool("vineflower", cmd)?;
        has_output(out)
    }

    /// Decompile a .NET assembly with ILSpy into `out`.
    pub fn decompile_dll(&self, dll: &Path, out: &Path) -> Result<bool, CorpusError> {
        require_dir(out)?;
        require_file(dll)?;
        let dll = fs::canonicalize(dll)?;
        let mut cmd = Command::new(self.lib_path(&[ILSPY_DIR, ILSPY_BIN]));
        cmd.args(["--nested-directories", "-p", "-o"])
            .arg(out)
            .arg(dll);
        run_tool(ILSPY_BIN, cmd)?;
        has_output(out)
    }

    /// Unpack a tModLoader `.tmod` archive into `out`.
    pub fn decompile_tmod(&self, tmod: &Path, out: &Path) -> Result<bool, CorpusError> {
        require_dir(out)?;
        require_file(tmod)?;
        let mut cmd = Command::new(self.lib_path(&[TML_PATCHER_DIR, TML_PATCHER_BIN]));
        cmd.arg("extract").arg(tmod).arg("-o").arg(out);
        run_tool("tml-patcher", cmd)?;
        has_output(out)
    }

    /// Unpack a `.zip` (or `.jar`) archive into `out`.
    pub fn extract_zip(&self, archive: &Path, out: &Path) -> Result<bool, CorpusError> {
        require_dir(out)?;
        require_file(archive)?;
        let mut cmd = Command::new(&self.config.unzip);
        cmd.args(["-o", "-q"]).arg(archive).arg("-d").arg(out);
        run_tool("unzip", cmd)?;
        has_output(out)
    }

    /// Convert every `.xnb` asset under `content` to `.png`, mirroring folders into `out`.
    ///
    /// Folders are converted in batches whose summed path length stays under
    /// the converter's command-line limit. A folder that converts nothing is
    /// logged and skipped.
    pub fn decompile_xnbs(&self, content: &Path, out: &Path) -> Result<bool, CorpusError> {
        require_dir(out)?;
        validate_folder(content)?;
        let xnb = ["xnb".to_string()];
        let mut any_converted = false;
        for folder in WalkDir::new(content)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_dir())
        {
            let folder = folder.path();
            let mut assets: Vec<PathBuf> = fs::read_dir(folder)?
                .filter_map(Result::ok)
                .map(|entry| entry.path())
                .filter(|path| path.is_file() && has_extension(path, &xnb))
                .collect();
            if assets.is_empty() {
                continue;
            }
            assets.sort();
            let rel = folder.strip_prefix(content).unwrap_or(Path::new(""));
            let target = out.join(rel);
            fs::create_dir_all(&target)?;
            debug!(folder = %folder.display(), assets = assets.len(), "converting xnb assets");
            let mut converted = 0usize;
            for batch in split_by_length(&assets, XNB_BATCH_MAX_CHARS) {
                let mut cmd = Command::new(self.lib_path(&[XNB_CONVERTER_BIN]));
                cmd.args(&batch);
                run_tool(XNB_CONVERTER_BIN, cmd)?;
                for asset in &batch {
                    let png = asset.with_extension("png");
                    if !png.is_file() {
                        continue;
                    }
                    if let Some(name) = png.file_name() {
                        move_file(&png, &target.join(name))?;
                        converted += 1;
                    }
                }
            }
            if converted == 0 {
                warn!(folder = %folder.display(), "could not convert xnb assets to png");
            } else {
                any_converted = true;
            }
        }
        Ok(any_converted)
    }

    /// Decompile a full Minecraft release with DecompilerMC, copying sources and assets into `out`.
    pub fn decompile_minecraft(&self, out: &Path) -> Result<bool, CorpusError> {
        require_dir(out)?;
        let mc_dir = self.lib_path(&[DECOMPILER_MC_DIR]);
        validate_folder(&mc_dir)?;
        let mut cmd = Command::new(&self.config.python);
        cmd.current_dir(&mc_dir)
            .arg("main.py")
            .args(["--mcversion", self.config.minecraft_version.as_str(), "-c", "-f"]);
        info!(version = %self.config.minecraft_version, "decompiling minecraft release");
        run_tool("decompiler-mc", cmd)?;

        let src = mc_dir.join("src");
        copy_dir_contents(&singleton_subfolder(&src)?, out)?;

        let versions = mc_dir.join("versions");
        let client_jar = file_with_extension(&singleton_subfolder(&versions)?, "jar")?;
        let unpacked = tempfile::tempdir()?;
        self.extract_zip(&client_jar, unpacked.path())?;
        copy_entity(&unpacked.path().join("assets"), out)?;

        for leftover in ["src", "mappings", "tmp", "versions"] {
            remove_dir_if_exists(&mc_dir.join(leftover))?;
        }
        has_output(out)
    }

    /// Copy the installed game to a scratch folder, then decompile its executable and assets into `out`.
    pub fn extract_terraria_install(&self, out: &Path) -> Result<bool, CorpusError> {
        require_dir(out)?;
        let install = &self.config.terraria_dir;
        let exe = install.join("Terraria.exe");
        let content = install.join("Content");
        if !exe.is_file() || !content.is_dir() {
            return Err(CorpusError::SourceUnavailable {
                source_id: TERRARIA_ORIGIN.to_string(),
                reason: format!(
                    "'{}' must contain Terraria.exe and a Content folder; \
                     point ToolchainConfig::terraria_dir at the install",
                    install.display()
                ),
            });
        }
        let scratch = tempfile::tempdir()?;
        copy_entity(&exe, scratch.path())?;
        copy_entity(&content, scratch.path())?;
        let decompiled = self.decompile_dll(&scratch.path().join("Terraria.exe"), out)?;
        let converted = self.decompile_xnbs(&scratch.path().join("Content"), out)?;
        Ok(decompiled || converted)
    }
}

/// Group paths into batches whose summed path length stays within `max_chars`.
///
/// A single path longer than the limit gets a batch of its own.
pub fn split_by_length(paths: &[PathBuf], max_chars: usize) -> Vec<Vec<PathBuf>> {
    let mut batches = Vec::new();
    let mut current: Vec<PathBuf> = Vec::new();
    let mut current_len = 0usize;
    for path in paths {
        let len = path.as_os_str().len();
        if !current.is_empty() && current_len + len > max_chars {
            batches.push(std::mem::take(&mut current));
            current_len = 0;
        }
        current.push(path.clone());
        current_len += len;
    }
    if !current.is_empty() {
        batches.push(current);
    }
    batches
}

fn run_tool(tool: &str, mut cmd: Command) -> Result<(), CorpusError> {
    debug!(tool, command = ?cmd, "running external tool");
    let status = cmd.status().map_err(|err| CorpusError::ToolFailed {
        tool: tool.to_string(),
        status: format!("could not be started: {err}"),
    })?;
    if !status.success() {
        return Err(CorpusError::ToolFailed {
            tool: tool.to_string(),
            status: status.to_string(),
        });
    }
    Ok(())
}

fn require_dir(dir: &Path) -> Result<(), CorpusError> {
    if dir.is_dir() {
        return Ok(());
    }
    Err(io::Error::new(
        io::ErrorKind::NotFound,
        format!("directory `{}` does not exist", dir.display()),
    )
    .into())
}

fn require_file(file: &Path) -> Result<(), CorpusError> {
    if file.is_file() {
        return Ok(());
    }
    Err(io::Error::new(
        io::ErrorKind::NotFound,
        format!("file `{}` does not exist", file.display()),
    )
    .into())
}

fn has_output(out: &Path) -> Result<bool, CorpusError> {
    Ok(!is_empty_dir(out)?)
}

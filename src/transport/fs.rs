use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::errors::CorpusError;

/// True if the path's extension matches one of `extensions` (case-insensitive).
pub fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            extensions
                .iter()
                .any(|candidate| ext.eq_ignore_ascii_case(candidate))
        })
        .unwrap_or(false)
}

/// True if the path looks like an image under the configured extensions.
pub fn is_image_file(path: &Path, extensions: &[String]) -> bool {
    has_extension(path, extensions)
}

/// Fail with `NotFound` unless `folder` exists and is a directory.
pub fn validate_folder(folder: &Path) -> Result<(), CorpusError> {
    if folder.is_dir() {
        return Ok(());
    }
    Err(io::Error::new(
        io::ErrorKind::NotFound,
        format!("could not find folder `{}`", folder.display()),
    )
    .into())
}

/// True if the directory has no entries at all.
pub fn is_empty_dir(dir: &Path) -> Result<bool, CorpusError> {
    Ok(fs::read_dir(dir)?.next().is_none())
}

/// Copy every image found anywhere under `top` into `dest`, flattening folders.
///
/// Later files overwrite earlier ones with the same file name; each overwrite
/// is logged at debug level. Returns the number of copies performed.
pub fn copy_images_recursively(
    top: &Path,
    dest: &Path,
    extensions: &[String],
) -> Result<usize, CorpusError> {
    validate_folder(top)?;
    validate_folder(dest)?;
    let mut copied = 0usize;
    let mut overwritten = 0usize;
    for entry in WalkDir::new(top)
        .follow_links(true)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
    {
        let path = entry.path();
        if !is_image_file(path, extensions) {
            continue;
        }
        let Some(name) = path.file_name() else {
            continue;
        };
        let target = dest.join(name);
        if target.exists() {
            overwritten += 1;
            debug!(
                from = %path.display(),
                to = %target.display(),
                "flattened image overwrites an existing file"
            );
        }
        fs::copy(path, &target)?;
        copied += 1;
    }
    debug!(
        from = %top.display(),
        to = %dest.display(),
        copied,
        overwritten,
        "copied staged images"
    );
    Ok(copied)
}

/// Regular files directly inside `dir`, sorted by path.
pub fn list_files(dir: &Path) -> Result<Vec<PathBuf>, CorpusError> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}

/// Subdirectories directly inside `dir`, sorted by path.
pub fn list_subfolders(dir: &Path) -> Result<Vec<PathBuf>, CorpusError> {
    let mut folders = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            folders.push(entry.path());
        }
    }
    folders.sort();
    Ok(folders)
}

/// The single file in `folder` with extension `extension`.
///
/// Fails when none or more than one match, since the choice would be ambiguous.
pub fn file_with_extension(folder: &Path, extension: &str) -> Result<PathBuf, CorpusError> {
    let wanted = [extension.trim_start_matches('.').to_string()];
    let mut matches: Vec<PathBuf> = list_files(folder)?
        .into_iter()
        .filter(|path| has_extension(path, &wanted))
        .collect();
    match matches.len() {
        1 => Ok(matches.remove(0)),
        0 => Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!(
                "could not find a file with extension `{extension}` in folder `{}`",
                folder.display()
            ),
        )
        .into()),
        count => Err(io::Error::other(format!(
            "found {count} files with extension `{extension}` in folder `{}`; \
             which one to use is ambiguous",
            folder.display()
        ))
        .into()),
    }
}

/// The single subfolder of `folder`.
pub fn singleton_subfolder(folder: &Path) -> Result<PathBuf, CorpusError> {
    let mut folders = list_subfolders(folder)?;
    match folders.len() {
        1 => Ok(folders.remove(0)),
        0 => Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("could not find a subfolder in folder `{}`", folder.display()),
        )
        .into()),
        count => Err(io::Error::other(format!(
            "found {count} subfolders in folder `{}`; which one to use is ambiguous",
            folder.display()
        ))
        .into()),
    }
}

/// Copy a file into `dest`, or a directory into `dest/<dir name>`.
pub fn copy_entity(entity: &Path, dest: &Path) -> Result<(), CorpusError> {
    let Some(name) = entity.file_name() else {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("`{}` has no file name", entity.display()),
        )
        .into());
    };
    if entity.is_dir() {
        copy_dir_contents(entity, &dest.join(name))
    } else if entity.is_file() {
        fs::copy(entity, dest.join(name))?;
        Ok(())
    } else {
        Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("could not find file or directory `{}`", entity.display()),
        )
        .into())
    }
}

/// Recursively copy the contents of `src` into `dest`, creating folders as needed.
pub fn copy_dir_contents(src: &Path, dest: &Path) -> Result<(), CorpusError> {
    validate_folder(src)?;
    fs::create_dir_all(dest)?;
    for entry in WalkDir::new(src)
        .min_depth(1)
        .into_iter()
        .filter_map(Result::ok)
    {
        let Ok(rel) = entry.path().strip_prefix(src) else {
            continue;
        };
        let target = dest.join(rel);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else if entry.file_type().is_file() {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

/// Move a file, falling back to copy + remove across filesystems.
pub fn move_file(from: &Path, to: &Path) -> Result<(), CorpusError> {
    if fs::rename(from, to).is_ok() {
        return Ok(());
    }
    fs::copy(from, to)?;
    fs::remove_file(from)?;
    Ok(())
}

/// Remove a directory tree, treating an already-missing directory as success.
pub fn remove_dir_if_exists(dir: &Path) -> Result<(), CorpusError> {
    match fs::remove_dir_all(dir) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn png() -> Vec<String> {
        vec!["png".to_string()]
    }

    #[test]
    fn image_recognition_ignores_case_and_other_extensions() {
        assert!(is_image_file(Path::new("a/b/tile.png"), &png()));
        assert!(is_image_file(Path::new("TILE.PNG"), &png()));
        assert!(!is_image_file(Path::new("tile.png.txt"), &png()));
        assert!(!is_image_file(Path::new("tile"), &png()));
    }

    #[test]
    fn copy_images_flattens_nested_folders() {
        let temp = tempdir().unwrap();
        let staging = temp.path().join("staging");
        let images = temp.path().join("images");
        fs::create_dir_all(staging.join("deep/er")).unwrap();
        fs::create_dir_all(&images).unwrap();
        fs::write(staging.join("top.png"), b"a").unwrap();
        fs::write(staging.join("deep/er/nested.png"), b"b").unwrap();
        fs::write(staging.join("deep/readme.txt"), b"c").unwrap();

        let copied = copy_images_recursively(&staging, &images, &png()).unwrap();
        assert_eq!(copied, 2);
        let names: Vec<String> = list_files(&images)
            .unwrap()
            .iter()
            .map(|path| path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["nested.png", "top.png"]);
    }

    #[test]
    fn copy_images_collapses_duplicate_names() {
        let temp = tempdir().unwrap();
        let staging = temp.path().join("staging");
        let images = temp.path().join("images");
        fs::create_dir_all(staging.join("blocks")).unwrap();
        fs::create_dir_all(staging.join("items")).unwrap();
        fs::create_dir_all(&images).unwrap();
        fs::write(staging.join("blocks/stone.png"), b"block").unwrap();
        fs::write(staging.join("items/stone.png"), b"item").unwrap();

        let copied = copy_images_recursively(&staging, &images, &png()).unwrap();
        assert_eq!(copied, 2);
        let files = list_files(&images).unwrap();
        assert_eq!(files, vec![images.join("stone.png")]);
        let kept = fs::read(&files[0]).unwrap();
        assert!(kept == b"block" || kept == b"item");
    }

    #[test]
    fn copy_images_requires_existing_folders() {
        let temp = tempdir().unwrap();
        let err = copy_images_recursively(&temp.path().join("missing"), temp.path(), &png())
            .unwrap_err();
        assert!(matches!(err, CorpusError::Io(ref inner) if inner.kind() == io::ErrorKind::NotFound));
    }

    #[test]
    fn file_with_extension_rejects_ambiguity() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        assert!(file_with_extension(root, ".dll").is_err());
        fs::write(root.join("Mod.dll"), b"x").unwrap();
        assert_eq!(
            file_with_extension(root, ".dll").unwrap(),
            root.join("Mod.dll")
        );
        fs::write(root.join("Other.dll"), b"y").unwrap();
        assert!(file_with_extension(root, "dll").is_err());
    }

    #[test]
    fn singleton_subfolder_requires_exactly_one() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        assert!(singleton_subfolder(root).is_err());
        fs::create_dir(root.join("1.21")).unwrap();
        assert_eq!(singleton_subfolder(root).unwrap(), root.join("1.21"));
        fs::create_dir(root.join("1.20")).unwrap();
        assert!(singleton_subfolder(root).is_err());
    }

    #[test]
    fn copy_entity_places_directories_under_their_name() {
        let temp = tempdir().unwrap();
        let src = temp.path().join("Content");
        let dest = temp.path().join("out");
        fs::create_dir_all(src.join("Images")).unwrap();
        fs::create_dir_all(&dest).unwrap();
        fs::write(src.join("Images/Item_1.xnb"), b"x").unwrap();
        fs::write(temp.path().join("Terraria.exe"), b"exe").unwrap();

        copy_entity(&src, &dest).unwrap();
        copy_entity(&temp.path().join("Terraria.exe"), &dest).unwrap();
        assert!(dest.join("Content/Images/Item_1.xnb").is_file());
        assert!(dest.join("Terraria.exe").is_file());
        assert!(copy_entity(&temp.path().join("nope"), &dest).is_err());
    }

    #[test]
    fn remove_dir_if_exists_tolerates_missing() {
        let temp = tempdir().unwrap();
        let dir = temp.path().join("gone");
        remove_dir_if_exists(&dir).unwrap();
        fs::create_dir_all(dir.join("inner")).unwrap();
        remove_dir_if_exists(&dir).unwrap();
        assert!(!dir.exists());
    }
}

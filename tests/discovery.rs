mod common;

use std::fs;
use std::sync::Arc;

use common::{FakeArchive, image_name};
use pixcorpus::{
    CorpusConfig, Extractor, PreexistingSource, Resolution, SourceRegistry, Toolchain,
    discover_archives, discover_preexisting,
};
use tempfile::tempdir;

fn seed_folder(root: &std::path::Path, name: &str, images: usize) {
    let folder = root.join("image").join(name);
    fs::create_dir_all(&folder).unwrap();
    for idx in 0..images {
        fs::write(folder.join(image_name(idx)), b"png").unwrap();
    }
}

#[test]
fn ban_preexisting_skips_previous_imports() {
    let root = tempdir().unwrap();
    seed_folder(root.path(), "old_pack", 20);
    seed_folder(root.path(), "older_pack", 20);
    let registry = SourceRegistry::new(CorpusConfig::default()).unwrap();

    assert_eq!(registry.ban_preexisting(root.path()).unwrap(), 2);
    assert_eq!(registry.ban_preexisting(root.path()).unwrap(), 0);

    let archive = FakeArchive::new("old_pack", 30);
    let resolution = registry.resolve(&archive, root.path()).unwrap();
    assert!(matches!(resolution, Resolution::Banned(_)));
    assert_eq!(archive.stage_calls(), 0);
    assert_eq!(registry.total_size(), 0);
}

#[test]
fn preexisting_folders_import_with_threshold() {
    let root = tempdir().unwrap();
    seed_folder(root.path(), "big", 20);
    seed_folder(root.path(), "tiny", 4);
    let registry = SourceRegistry::new(CorpusConfig::default()).unwrap();

    let folders = discover_preexisting(root.path()).unwrap();
    let report = registry.import_all(&folders, root.path());
    assert_eq!(report.created, vec!["big".to_string()]);
    assert_eq!(report.rejected, vec![("tiny".to_string(), 4)]);
    assert_eq!(registry.total_size(), 20);
    // Existing image folders are never deleted by a rejection.
    assert!(root.path().join("image/tiny").is_dir());
}

#[test]
fn ban_preexisting_leaves_active_sources_alone() {
    let root = tempdir().unwrap();
    let registry = SourceRegistry::new(CorpusConfig::default()).unwrap();
    registry
        .resolve(&FakeArchive::new("fresh", 16), root.path())
        .unwrap();
    assert_eq!(registry.ban_preexisting(root.path()).unwrap(), 0);
    assert!(registry.is_active("fresh"));
}

#[test]
fn archive_discovery_ignores_other_files() {
    let archives = tempdir().unwrap();
    fs::write(archives.path().join("CalamityMod.tmod"), b"tmod").unwrap();
    fs::write(archives.path().join("readme.md"), b"hi").unwrap();
    let found = discover_archives(archives.path(), Arc::new(Toolchain::default())).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].identity(), "CalamityMod");
}

#[test]
fn dotted_preexisting_folder_is_imported_under_its_full_name() {
    let root = tempdir().unwrap();
    seed_folder(root.path(), "Faithful 1.20", 16);
    let registry = SourceRegistry::new(CorpusConfig::default()).unwrap();

    let resolution = registry
        .resolve(&PreexistingSource::new("Faithful 1.20"), root.path())
        .unwrap();
    assert!(matches!(resolution, Resolution::Created(_)));
    assert_eq!(registry.identities(), vec!["Faithful 1.20".to_string()]);
    assert_eq!(registry.total_size(), 16);
}

#[test]
fn archive_output_folder_is_readable_as_preexisting() {
    let root = tempdir().unwrap();
    let first_run = SourceRegistry::new(CorpusConfig::default()).unwrap();
    first_run
        .resolve(&FakeArchive::new("faithful.v2", 20), root.path())
        .unwrap();
    assert!(root.path().join("image/faithful.v2").is_dir());

    let second_run = SourceRegistry::new(CorpusConfig::default()).unwrap();
    let folders = discover_preexisting(root.path()).unwrap();
    let report = second_run.import_all(&folders, root.path());
    assert!(report.failed.is_empty());
    assert_eq!(report.created, vec!["faithful.v2".to_string()]);
    assert_eq!(second_run.total_size(), 20);

    // Banning and resolving agree on the dotted key.
    let third_run = SourceRegistry::new(CorpusConfig::default()).unwrap();
    assert_eq!(third_run.ban_preexisting(root.path()).unwrap(), 1);
    assert!(third_run.is_banned("faithful.v2"));
    let resolution = third_run
        .resolve(&PreexistingSource::new("faithful.v2"), root.path())
        .unwrap();
    assert!(matches!(resolution, Resolution::Banned(_)));
}

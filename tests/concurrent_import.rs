mod common;

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use common::FakeArchive;
use pixcorpus::{CorpusConfig, Resolution, SourceRegistry};
use tempfile::tempdir;

#[test]
fn concurrent_resolves_of_one_identity_extract_once() {
    let root = tempdir().unwrap();
    let registry = Arc::new(SourceRegistry::new(CorpusConfig::default()).unwrap());
    let archive = Arc::new(FakeArchive::new("shared", 20).with_stage_delay(Duration::from_millis(50)));

    let handles: Vec<_> = (0..6)
        .map(|_| {
            let registry = Arc::clone(&registry);
            let archive = Arc::clone(&archive);
            let root = root.path().to_path_buf();
            thread::spawn(move || registry.resolve(archive.as_ref(), &root).unwrap())
        })
        .collect();
    let resolutions: Vec<Resolution> = handles
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .collect();

    assert_eq!(archive.stage_calls(), 1);
    let created = resolutions
        .iter()
        .filter(|resolution| matches!(resolution, Resolution::Created(_)))
        .count();
    assert_eq!(created, 1);
    let first = resolutions[0].handle();
    assert!(resolutions.iter().all(|resolution| resolution.handle().ptr_eq(&first)));
    assert_eq!(registry.partitions().as_slice(), &[0, 20]);
    assert_eq!(registry.stats().in_flight, 0);
}

#[test]
fn parallel_import_keeps_partitions_consistent() {
    let root = tempdir().unwrap();
    let registry = SourceRegistry::new(CorpusConfig::default().with_seed(5)).unwrap();
    let archives: Vec<FakeArchive> = (0..12)
        .map(|idx| FakeArchive::new(&format!("pack_{idx:02}"), 10 + idx * 2))
        .collect();
    let failing = FakeArchive::new("pack_broken", 30).failing();
    let mut all = archives;
    all.push(failing);

    let report = registry.import_all(&all, root.path());

    // Sizes 10..=32 step 2; 16 and above are admitted.
    let expected_total: usize = (0..12).map(|idx| 10 + idx * 2).filter(|&s| s >= 16).sum();
    assert_eq!(report.created.len(), 9);
    assert_eq!(report.rejected.len(), 3);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].source_id, "pack_broken");
    assert_eq!(report.len(), 13);
    assert_eq!(registry.total_size(), expected_total);

    let partitions = registry.partitions();
    let identities = registry.identities();
    assert_eq!(partitions.len(), identities.len());
    for (slot, identity) in identities.iter().enumerate() {
        let source = registry.get(identity).unwrap();
        assert_eq!(partitions.range(slot).unwrap().len(), source.enumerated_len());
    }

    let batch = registry.sample(expected_total).unwrap();
    assert_eq!(batch.len(), expected_total);
    assert!(batch.iter().all(|entry| registry.is_active(&entry.source)));
}

#[test]
fn sampling_runs_alongside_imports() {
    let root = tempdir().unwrap();
    let registry = Arc::new(SourceRegistry::new(CorpusConfig::default()).unwrap());
    registry
        .resolve(&FakeArchive::new("seed", 16), root.path())
        .unwrap();

    let importer = {
        let registry = Arc::clone(&registry);
        let root = root.path().to_path_buf();
        thread::spawn(move || {
            for idx in 0..8 {
                registry
                    .resolve(&FakeArchive::new(&format!("late_{idx}"), 16), &root)
                    .unwrap();
            }
        })
    };
    for _ in 0..20 {
        let total = registry.total_size();
        let batch = registry.sample(total.min(16)).unwrap();
        assert!(batch.iter().all(|entry| entry.file().is_file()));
    }
    importer.join().unwrap();
    assert_eq!(registry.total_size(), 16 * 9);
}

//! Kept in its own test binary so the process-wide warning flag starts unset.

mod common;

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use common::FakeArchive;
use pixcorpus::constants::labels::MISSING_LABEL_MSG;
use pixcorpus::labels::missing_label_warning_emitted;
use pixcorpus::{CorpusConfig, SourceRegistry};
use tempfile::tempdir;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

#[derive(Default)]
struct MatchesMissingLabel(bool);

impl Visit for MatchesMissingLabel {
    fn record_str(&mut self, _field: &Field, value: &str) {
        if value == MISSING_LABEL_MSG {
            self.0 = true;
        }
    }

    fn record_debug(&mut self, _field: &Field, value: &dyn fmt::Debug) {
        if format!("{value:?}") == MISSING_LABEL_MSG {
            self.0 = true;
        }
    }
}

struct MissingLabelCounter {
    hits: Arc<AtomicUsize>,
}

impl<S: Subscriber> Layer<S> for MissingLabelCounter {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = MatchesMissingLabel::default();
        event.record(&mut visitor);
        if visitor.0 {
            self.hits.fetch_add(1, Ordering::SeqCst);
        }
    }
}

#[test]
fn missing_label_warning_fires_once_across_sources() {
    let root = tempdir().unwrap();
    let registry = SourceRegistry::new(CorpusConfig::default()).unwrap();
    let hits = Arc::new(AtomicUsize::new(0));
    let subscriber = tracing_subscriber::registry().with(MissingLabelCounter {
        hits: Arc::clone(&hits),
    });

    tracing::subscriber::with_default(subscriber, || {
        registry
            .resolve(&FakeArchive::new("unlabeled_a", 16), root.path())
            .unwrap();
        registry
            .resolve(&FakeArchive::new("unlabeled_b", 20).with_labels(4), root.path())
            .unwrap();
        for identity in ["unlabeled_a", "unlabeled_b"] {
            registry.get(identity).unwrap().entries().unwrap();
        }
    });

    assert!(missing_label_warning_emitted());
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

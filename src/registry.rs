//! Deduplicating source registry.
//!
//! Every identity is in exactly one of three states: unregistered, active
//! (maps to an admitted `Source`), or banned. The active map, banned set, and
//! partition index are mutated together under one write lock, so partition
//! slots follow admission order ("first admitted wins the next slot") even
//! when different identities extract in parallel.

use indexmap::IndexMap;
use std::collections::HashSet;
use std::num::NonZeroUsize;
use std::path::Path;
use std::sync::{Arc, Condvar, Mutex, RwLock};

use tracing::{debug, info, warn};

use crate::config::CorpusConfig;
use crate::constants::registry::REJECTED_SOURCE_MSG;
use crate::data::LabeledEntry;
use crate::errors::CorpusError;
use crate::partition::PartitionIndex;
use crate::sampler::SamplingEngine;
use crate::source::lifecycle::{self, Admission};
use crate::source::{Extractor, NullSource, Source, SourceHandle, SourceLayout};
use crate::types::SourceId;

/// Outcome of `SourceRegistry::resolve`.
#[derive(Clone, Debug)]
pub enum Resolution {
    /// This call ran the lifecycle and admitted the source.
    Created(Arc<Source>),
    /// The identity was already active; nothing was extracted.
    Existing(Arc<Source>),
    /// This call ran the lifecycle but the source was too small; its identity is now banned.
    Rejected {
        /// Enumerated entry count.
        size: usize,
        /// Process-wide sentinel.
        sentinel: Arc<NullSource>,
    },
    /// The identity was already banned; nothing was extracted.
    Banned(Arc<NullSource>),
}

impl Resolution {
    /// Handle to the live source or the sentinel.
    pub fn handle(&self) -> SourceHandle {
        match self {
            Resolution::Created(source) | Resolution::Existing(source) => {
                SourceHandle::Live(Arc::clone(source))
            }
            Resolution::Rejected { sentinel, .. } | Resolution::Banned(sentinel) => {
                SourceHandle::Sentinel(Arc::clone(sentinel))
            }
        }
    }

    /// Live source, if the identity is active.
    pub fn source(&self) -> Option<&Arc<Source>> {
        match self {
            Resolution::Created(source) | Resolution::Existing(source) => Some(source),
            _ => None,
        }
    }

    /// True when the identity is active after this call.
    pub fn is_admitted(&self) -> bool {
        self.source().is_some()
    }
}

/// Point-in-time registry counters.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RegistryStats {
    /// Admitted sources.
    pub active: usize,
    /// Banned identities.
    pub banned: usize,
    /// Identities currently running their lifecycle.
    pub in_flight: usize,
    /// Sum of admitted source sizes.
    pub total_size: usize,
}

#[derive(Debug, Default)]
struct RegistryState {
    active: IndexMap<SourceId, Arc<Source>>,
    banned: HashSet<SourceId>,
    partitions: PartitionIndex,
}

/// Process-lifetime registry of data sources with uniform sampling over admitted ones.
///
/// Resolving the same identity twice never runs two extractions: a second
/// caller blocks until the first one's admission decision lands and then gets
/// `Existing` or `Banned`.
#[derive(Debug)]
pub struct SourceRegistry {
    config: CorpusConfig,
    state: RwLock<RegistryState>,
    in_flight: Mutex<HashSet<SourceId>>,
    settled: Condvar,
    sampler: SamplingEngine,
}

enum Claim {
    Settled(Resolution),
    Owned,
}

/// Releases an in-flight claim and wakes waiters, on success or failure.
struct InFlightGuard<'a> {
    registry: &'a SourceRegistry,
    identity: &'a str,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        let mut in_flight = self
            .registry
            .in_flight
            .lock()
            .expect("registry in-flight set poisoned");
        in_flight.remove(self.identity);
        self.registry.settled.notify_all();
    }
}

impl SourceRegistry {
    /// Create an empty registry.
    pub fn new(config: CorpusConfig) -> Result<Self, CorpusError> {
        config.validate()?;
        Ok(Self {
            sampler: SamplingEngine::new(config.seed),
            config,
            state: RwLock::new(RegistryState::default()),
            in_flight: Mutex::new(HashSet::new()),
            settled: Condvar::new(),
        })
    }

    /// Registry configuration.
    pub fn config(&self) -> &CorpusConfig {
        &self.config
    }

    /// Return the source for `extractor`'s identity, running its lifecycle on first request.
    ///
    /// Fails with `CorpusError::Configuration` before touching the filesystem
    /// when `output_root` does not exist. Lifecycle failures propagate and
    /// leave the identity unregistered.
    pub fn resolve(
        &self,
        extractor: &dyn Extractor,
        output_root: &Path,
    ) -> Result<Resolution, CorpusError> {
        if !output_root.is_dir() {
            return Err(CorpusError::Configuration(format!(
                "output root '{}' does not exist",
                output_root.display()
            )));
        }
        let identity = extractor.identity();
        if let Claim::Settled(resolution) = self.claim(&identity) {
            return Ok(resolution);
        }
        let _claim = InFlightGuard {
            registry: self,
            identity: &identity,
        };

        let layout = SourceLayout::scoped(output_root, &identity);
        layout.ensure_roots()?;
        let source = lifecycle::run(extractor, layout, &self.config)?;
        self.admit(source)
    }

    /// Settle `identity` from current state, or reserve it for this caller.
    fn claim(&self, identity: &str) -> Claim {
        let mut in_flight = self
            .in_flight
            .lock()
            .expect("registry in-flight set poisoned");
        loop {
            if let Some(resolution) = self.settled_resolution(identity) {
                return Claim::Settled(resolution);
            }
            if !in_flight.contains(identity) {
                in_flight.insert(identity.to_string());
                return Claim::Owned;
            }
            debug!(source_id = %identity, "waiting for in-flight resolve");
            in_flight = self
                .settled
                .wait(in_flight)
                .expect("registry in-flight set poisoned");
        }
    }

    fn settled_resolution(&self, identity: &str) -> Option<Resolution> {
        let state = self.state.read().expect("registry state poisoned");
        if state.banned.contains(identity) {
            return Some(Resolution::Banned(NullSource::shared()));
        }
        state
            .active
            .get(identity)
            .map(|source| Resolution::Existing(Arc::clone(source)))
    }

    fn admit(&self, source: Source) -> Result<Resolution, CorpusError> {
        let size = source.enumerated_len();
        let min = self.config.min_dataset_size;
        let mut state = self.state.write().expect("registry state poisoned");

        // A ban may have landed while the lifecycle was running.
        if state.banned.contains(source.identity()) {
            drop(state);
            source.conclude(Admission::Banned)?;
            debug!(source_id = %source.identity(), "identity banned during extraction");
            return Ok(Resolution::Banned(NullSource::shared()));
        }

        match NonZeroUsize::new(size).filter(|size| size.get() >= min) {
            Some(admitted) => {
                source.conclude(Admission::Admitted)?;
                let slot = state.partitions.push(admitted);
                let total_size = state.partitions.total();
                let source = Arc::new(source);
                state
                    .active
                    .insert(source.identity().to_string(), Arc::clone(&source));
                info!(
                    source_id = %source.identity(),
                    kind = %source.kind(),
                    size,
                    slot,
                    total_size,
                    "admitted source"
                );
                Ok(Resolution::Created(source))
            }
            None => {
                state.banned.insert(source.identity().to_string());
                drop(state);
                source.conclude(Admission::Banned)?;
                warn!(
                    source_id = %source.identity(),
                    size,
                    min_dataset_size = min,
                    REJECTED_SOURCE_MSG
                );
                Ok(Resolution::Rejected {
                    size,
                    sentinel: NullSource::shared(),
                })
            }
        }
    }

    /// Exclude `identity` permanently without constructing it.
    ///
    /// Returns whether the identity was newly banned. Banning an active
    /// identity fails with `CorpusError::InvalidOperation`. An identity that is
    /// mid-extraction resolves to `Banned` once its lifecycle finishes.
    pub fn ban(&self, identity: impl Into<SourceId>) -> Result<bool, CorpusError> {
        let identity = identity.into();
        let mut state = self.state.write().expect("registry state poisoned");
        if state.active.contains_key(&identity) {
            return Err(CorpusError::InvalidOperation {
                source_id: identity,
                operation: "ban an admitted source".to_string(),
            });
        }
        let inserted = state.banned.insert(identity.clone());
        if inserted {
            debug!(source_id = %identity, "banned identity");
        }
        Ok(inserted)
    }

    /// Draw `n` entries uniformly from every admitted source.
    pub fn sample(&self, n: usize) -> Result<Vec<LabeledEntry>, CorpusError> {
        let state = self.state.read().expect("registry state poisoned");
        self.sampler.sample(n, &state.partitions, &state.active)
    }

    /// Restart the sampling RNG from `seed`.
    pub fn reseed(&self, seed: u64) {
        self.sampler.reseed(seed);
    }

    /// Sum of admitted source sizes.
    pub fn total_size(&self) -> usize {
        self.state
            .read()
            .expect("registry state poisoned")
            .partitions
            .total()
    }

    /// Snapshot of the partition index.
    pub fn partitions(&self) -> PartitionIndex {
        self.state
            .read()
            .expect("registry state poisoned")
            .partitions
            .clone()
    }

    /// Number of admitted sources.
    pub fn active_len(&self) -> usize {
        self.state.read().expect("registry state poisoned").active.len()
    }

    /// Number of banned identities.
    pub fn banned_len(&self) -> usize {
        self.state.read().expect("registry state poisoned").banned.len()
    }

    /// True if `identity` is banned.
    pub fn is_banned(&self, identity: &str) -> bool {
        self.state
            .read()
            .expect("registry state poisoned")
            .banned
            .contains(identity)
    }

    /// True if `identity` is admitted.
    pub fn is_active(&self, identity: &str) -> bool {
        self.state
            .read()
            .expect("registry state poisoned")
            .active
            .contains_key(identity)
    }

    /// Admitted source for `identity`.
    pub fn get(&self, identity: &str) -> Option<Arc<Source>> {
        self.state
            .read()
            .expect("registry state poisoned")
            .active
            .get(identity)
            .cloned()
    }

    /// Admitted identities in partition order.
    pub fn identities(&self) -> Vec<SourceId> {
        self.state
            .read()
            .expect("registry state poisoned")
            .active
            .keys()
            .cloned()
            .collect()
    }

    /// Current counters.
    pub fn stats(&self) -> RegistryStats {
        let in_flight = self
            .in_flight
            .lock()
            .expect("registry in-flight set poisoned")
            .len();
        let state = self.state.read().expect("registry state poisoned");
        RegistryStats {
            active: state.active.len(),
            banned: state.banned.len(),
            in_flight,
            total_size: state.partitions.total(),
        }
    }

    /// Forget every admitted source and ban; files on disk are left alone.
    ///
    /// A fixed seed is re-applied so sampling restarts deterministically.
    pub fn reset(&self) {
        let mut state = self.state.write().expect("registry state poisoned");
        state.active.clear();
        state.banned.clear();
        state.partitions.clear();
        if let Some(seed) = self.config.seed {
            self.sampler.reseed(seed);
        }
        debug!("registry reset");
    }
}

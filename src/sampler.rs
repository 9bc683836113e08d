use indexmap::IndexMap;
use rand::seq::index;
use std::sync::{Arc, Mutex};

use crate::data::LabeledEntry;
use crate::errors::CorpusError;
use crate::partition::PartitionIndex;
use crate::source::Source;
use crate::types::SourceId;

#[derive(Debug, Clone)]
/// Small deterministic RNG used for reproducible sampling.
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    fn next_u64_internal(&mut self) -> u64 {
        let mut z = self.state.wrapping_add(0x9E3779B97F4A7C15);
        self.state = z;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
        z ^ (z >> 31)
    }
}

impl rand::RngCore for DeterministicRng {
    fn next_u32(&mut self) -> u32 {
        self.next_u64_internal() as u32
    }

    fn next_u64(&mut self) -> u64 {
        self.next_u64_internal()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        let mut offset = 0;
        while offset < dest.len() {
            let value = self.next_u64_internal();
            let bytes = value.to_le_bytes();
            let remaining = dest.len() - offset;
            let copy_len = remaining.min(bytes.len());
            dest[offset..offset + copy_len].copy_from_slice(&bytes[..copy_len]);
            offset += copy_len;
        }
    }
}

/// Uniform sampler over the union of admitted sources.
///
/// Each call draws `n` distinct global offsets from `[0, total)`, routes every
/// offset through the partition index to its owning source, then picks one
/// entry from that source independently. Distinct offsets do not imply
/// distinct entries.
#[derive(Debug)]
pub struct SamplingEngine {
    rng: Mutex<DeterministicRng>,
}

impl SamplingEngine {
    /// Engine seeded with `seed`, or from OS entropy when `None`.
    pub fn new(seed: Option<u64>) -> Self {
        Self {
            rng: Mutex::new(DeterministicRng::new(
                seed.unwrap_or_else(rand::random::<u64>),
            )),
        }
    }

    /// Restart the random stream from `seed`.
    pub fn reseed(&self, seed: u64) {
        *self.rng.lock().expect("sampler rng poisoned") = DeterministicRng::new(seed);
    }

    /// Draw `n` entries in draw order.
    ///
    /// `sources` must list admitted sources in partition-slot order.
    pub fn sample(
        &self,
        n: usize,
        partitions: &PartitionIndex,
        sources: &IndexMap<SourceId, Arc<Source>>,
    ) -> Result<Vec<LabeledEntry>, CorpusError> {
        let total = partitions.total();
        if n > total {
            return Err(CorpusError::SampleSize {
                requested: n,
                available: total,
            });
        }
        if partitions.len() != sources.len() {
            return Err(CorpusError::SourceInconsistent {
                source_id: "<registry>".into(),
                details: format!(
                    "{} partitions but {} admitted sources",
                    partitions.len(),
                    sources.len()
                ),
            });
        }
        let mut rng = self.rng.lock().expect("sampler rng poisoned");
        let offsets = index::sample(&mut *rng, total, n);
        let mut batch = Vec::with_capacity(n);
        for offset in offsets.iter() {
            let slot = partitions
                .locate(offset)
                .expect("sampled offsets lie below the partition total");
            let (source_id, source) = sources
                .get_index(slot)
                .expect("partition slots align with admitted sources");
            let entry = source.choose(&mut *rng)?.ok_or_else(|| {
                CorpusError::SourceInconsistent {
                    source_id: source_id.clone(),
                    details: format!(
                        "image folder '{}' no longer holds any entries",
                        source.layout().image_dir().display()
                    ),
                }
            })?;
            batch.push(entry);
        }
        Ok(batch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::RngCore;

    #[test]
    fn deterministic_rng_repeats_for_equal_seeds() {
        let mut a = DeterministicRng::new(7);
        let mut b = DeterministicRng::new(7);
        let first: Vec<u64> = (0..4).map(|_| a.next_u64()).collect();
        let second: Vec<u64> = (0..4).map(|_| b.next_u64()).collect();
        assert_eq!(first, second);
        assert_ne!(first[0], first[1]);
    }

    #[test]
    fn fill_bytes_covers_partial_words() {
        let mut rng = DeterministicRng::new(11);
        let mut buf = [0u8; 13];
        rng.fill_bytes(&mut buf);
        assert!(buf.iter().any(|&b| b != 0));
    }

    #[test]
    fn oversized_request_is_rejected() {
        let engine = SamplingEngine::new(Some(1));
        let err = engine
            .sample(1, &PartitionIndex::new(), &IndexMap::new())
            .unwrap_err();
        assert!(matches!(
            err,
            CorpusError::SampleSize {
                requested: 1,
                available: 0
            }
        ));
    }

    #[test]
    fn zero_draws_from_empty_index() {
        let engine = SamplingEngine::new(None);
        let batch = engine
            .sample(0, &PartitionIndex::new(), &IndexMap::new())
            .unwrap();
        assert!(batch.is_empty());
    }
}

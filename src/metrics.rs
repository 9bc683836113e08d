use indexmap::IndexMap;

use crate::data::LabeledEntry;
use crate::types::SourceId;

/// Per-source breakdown of a sampled batch.
#[derive(Clone, Debug, PartialEq)]
pub struct SampleComposition {
    /// Entries in the batch.
    pub total: usize,
    /// Entries carrying at least one label.
    pub labeled: usize,
    /// Fewest entries drawn from any represented source.
    pub min: usize,
    /// Most entries drawn from any represented source.
    pub max: usize,
    /// `max / min`; 1.0 means perfectly even.
    pub ratio: f64,
    /// Per-source shares, largest first.
    pub per_source: Vec<SourceShare>,
}

/// One source's share of a batch.
#[derive(Clone, Debug, PartialEq)]
pub struct SourceShare {
    /// Source identity.
    pub source: SourceId,
    /// Entries from this source.
    pub count: usize,
    /// `count / total`.
    pub share: f64,
}

/// Summarize which sources a batch came from. `None` for an empty batch.
pub fn sample_composition(batch: &[LabeledEntry]) -> Option<SampleComposition> {
    if batch.is_empty() {
        return None;
    }
    let mut counts: IndexMap<&str, usize> = IndexMap::new();
    for entry in batch {
        *counts.entry(entry.source.as_str()).or_default() += 1;
    }
    let total = batch.len();
    let min = *counts.values().min().expect("batch non-empty");
    let max = *counts.values().max().expect("batch non-empty");
    let mut per_source: Vec<SourceShare> = counts
        .into_iter()
        .map(|(source, count)| SourceShare {
            source: source.to_string(),
            count,
            share: count as f64 / total as f64,
        })
        .collect();
    per_source.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.source.cmp(&b.source)));
    Some(SampleComposition {
        total,
        labeled: batch.iter().filter(|entry| entry.is_labeled()).count(),
        min,
        max,
        ratio: max as f64 / min as f64,
        per_source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LabelMap;

    fn entry(source: &str, labeled: bool) -> LabeledEntry {
        let mut labels = LabelMap::new();
        if labeled {
            labels.insert("name".into(), "tile".into());
        }
        LabeledEntry::new(source, format!("{source}/tile.png"), labels)
    }

    #[test]
    fn empty_batch_has_no_composition() {
        assert!(sample_composition(&[]).is_none());
    }

    #[test]
    fn composition_reports_imbalance() {
        let batch = vec![
            entry("A", true),
            entry("B", false),
            entry("A", false),
            entry("C", false),
            entry("A", true),
            entry("B", false),
        ];
        let composition = sample_composition(&batch).expect("composition");
        assert_eq!(composition.total, 6);
        assert_eq!(composition.labeled, 2);
        assert_eq!(composition.min, 1);
        assert_eq!(composition.max, 3);
        assert!((composition.ratio - 3.0).abs() < 1e-9);
        let order: Vec<&str> = composition
            .per_source
            .iter()
            .map(|share| share.source.as_str())
            .collect();
        assert_eq!(order, vec!["A", "B", "C"]);
        assert!((composition.per_source[0].share - 0.5).abs() < 1e-9);
    }
}

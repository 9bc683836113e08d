#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

/// Registry and toolchain configuration types.
pub mod config;
/// Centralized constants used across the registry, layout, and tool wrappers.
pub mod constants;
/// Labeled entry type.
pub mod data;
/// Archive discovery and parallel batch import.
pub mod discovery;
/// Reusable example runners shared by downstream crates.
pub mod example_apps;
/// Sibling label file lookup and parsing.
pub mod labels;
/// Aggregate metrics helpers.
pub mod metrics;
/// Cumulative-size partition index.
pub mod partition;
/// Deduplicating source registry.
pub mod registry;
/// Uniform sampling across admitted sources.
pub mod sampler;
/// Source trait, lifecycle, and built-in sources.
pub mod source;
/// Wrappers around the external decompilers.
pub mod tools;
/// Input transports used by sources (filesystem today).
pub mod transport;
/// Shared type aliases.
pub mod types;

mod errors;

pub use config::{CorpusConfig, ToolchainConfig};
pub use data::LabeledEntry;
pub use discovery::{ImportFailure, ImportReport, discover_archives, discover_preexisting};
pub use errors::CorpusError;
pub use partition::PartitionIndex;
pub use registry::{RegistryStats, Resolution, SourceRegistry};
pub use sampler::SamplingEngine;
pub use source::{
    DatasetView, Extractor, LifecyclePlan, LifecycleState, MinecraftSource, NullSource,
    PreexistingSource, Source, SourceHandle, SourceKind, SourceLayout, TerrariaSource, ZipSource,
    source_identity,
};
pub use tools::Toolchain;
pub use types::{Extension, LabelMap, SourceId, ToolName};

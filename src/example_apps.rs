use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, error::ErrorKind};

use crate::config::{CorpusConfig, ToolchainConfig};
use crate::constants::registry::MIN_DATASET_SIZE;
use crate::data::LabeledEntry;
use crate::discovery::{ImportReport, discover_archives, discover_preexisting};
use crate::metrics::sample_composition;
use crate::registry::SourceRegistry;
use crate::tools::Toolchain;
use crate::{CorpusError, MinecraftSource, TerrariaSource};

#[derive(Debug, Parser)]
#[command(
    name = "import_corpus",
    disable_help_subcommand = true,
    about = "Import game-asset sources and sample labeled tiles",
    long_about = "Extract images from archives (and optionally already-extracted folders) into an output root, admit every source above the size threshold, then draw a uniform sample across all admitted sources.",
    after_help = "Folders already present under <OUTPUT>/image are skipped unless --import-preexisting is set."
)]
struct ImportCorpusCli {
    #[arg(
        long,
        value_name = "PATH",
        help = "Existing output root holding image/, json/, and extract/"
    )]
    output: PathBuf,
    #[arg(
        long,
        value_name = "PATH",
        help = "Folder of .jar, .tmod, and .zip archives to import"
    )]
    archives: Option<PathBuf>,
    #[arg(
        long = "import-preexisting",
        help = "Admit folders already present under <OUTPUT>/image instead of skipping them"
    )]
    import_preexisting: bool,
    #[arg(long, help = "Also decompile the installed Minecraft release")]
    minecraft: bool,
    #[arg(long, help = "Also extract the installed Terraria game")]
    terraria: bool,
    #[arg(
        long = "lib-dir",
        value_name = "PATH",
        help = "Folder holding the external decompilers"
    )]
    lib_dir: Option<PathBuf>,
    #[arg(
        long,
        value_parser = parse_positive_usize,
        default_value_t = 8,
        help = "Number of entries to sample after importing"
    )]
    sample: usize,
    #[arg(long, help = "Deterministic seed for sampling")]
    seed: Option<u64>,
    #[arg(
        long = "preserve-extraction",
        help = "Keep staging folders under <OUTPUT>/extract"
    )]
    preserve_extraction: bool,
    #[arg(
        long = "min-size",
        value_parser = parse_positive_usize,
        default_value_t = MIN_DATASET_SIZE,
        help = "Minimum image count for a source to be admitted"
    )]
    min_size: usize,
}

/// Run the import-and-sample demo with command-line style arguments (program name excluded).
pub fn run_import_demo<I>(args_iter: I) -> Result<(), Box<dyn Error>>
where
    I: Iterator<Item = String>,
{
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    let Some(cli) = parse_cli::<ImportCorpusCli, _>(
        std::iter::once("import_corpus".to_string()).chain(args_iter),
    )?
    else {
        return Ok(());
    };

    let mut config = CorpusConfig::default()
        .with_min_dataset_size(cli.min_size)
        .with_preserve_extraction(cli.preserve_extraction);
    if let Some(seed) = cli.seed {
        config = config.with_seed(seed);
    }
    let registry = SourceRegistry::new(config)?;

    let mut toolchain_config = ToolchainConfig::default();
    if let Some(lib_dir) = cli.lib_dir {
        toolchain_config = toolchain_config.with_lib_dir(lib_dir);
    }
    let toolchain = Arc::new(Toolchain::new(toolchain_config));

    if cli.import_preexisting {
        let folders = discover_preexisting(&cli.output)?;
        println!("Importing {} preexisting folder(s)", folders.len());
        print_report(&registry.import_all(&folders, &cli.output));
    } else {
        let banned = registry.ban_preexisting(&cli.output)?;
        println!("Skipping {banned} preexisting folder(s)");
    }

    let mut extractors = match &cli.archives {
        Some(folder) => discover_archives(folder, Arc::clone(&toolchain))?,
        None => Vec::new(),
    };
    if cli.minecraft {
        extractors.push(Box::new(MinecraftSource::release(Arc::clone(&toolchain))));
    }
    if cli.terraria {
        extractors.push(Box::new(TerrariaSource::install(Arc::clone(&toolchain))));
    }
    if !extractors.is_empty() {
        println!("Importing {} archive source(s)", extractors.len());
        print_report(&registry.import_all(&extractors, &cli.output));
    }

    let total = registry.total_size();
    println!(
        "Admitted {} source(s), {} banned, {} entries in total",
        registry.active_len(),
        registry.banned_len(),
        total
    );
    match registry.sample(cli.sample) {
        Ok(batch) => print_batch(&batch),
        Err(CorpusError::SampleSize {
            requested,
            available,
        }) => {
            eprintln!(
                "Cannot draw {requested} entries from {available} admitted entries. Import more sources or lower --sample."
            );
        }
        Err(err) => return Err(err.into()),
    }
    Ok(())
}

fn parse_positive_usize(raw: &str) -> Result<usize, String> {
    let parsed = raw
        .parse::<usize>()
        .map_err(|_| format!("Could not parse '{}' as a positive integer", raw))?;
    if parsed == 0 {
        return Err("value must be greater than zero".to_string());
    }
    Ok(parsed)
}

fn parse_cli<T, I>(args: I) -> Result<Option<T>, Box<dyn Error>>
where
    T: Parser,
    I: IntoIterator,
    I::Item: Into<std::ffi::OsString> + Clone,
{
    match T::try_parse_from(args) {
        Ok(cli) => Ok(Some(cli)),
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                err.print()?;
                Ok(None)
            }
            _ => Err(err.into()),
        },
    }
}

fn print_report(report: &ImportReport) {
    for source_id in &report.created {
        println!("admitted: {source_id}");
    }
    for (source_id, size) in &report.rejected {
        println!("rejected: {source_id} (only {size} images)");
    }
    for failure in &report.failed {
        println!("failed:   {} ({})", failure.source_id, failure.error);
    }
    println!(
        "created={} existing={} banned={} rejected={} failed={}",
        report.created.len(),
        report.existing.len(),
        report.banned.len(),
        report.rejected.len(),
        report.failed.len()
    );
}

fn print_batch(batch: &[LabeledEntry]) {
    println!("=== sample ===");
    for (idx, entry) in batch.iter().enumerate() {
        if entry.labels.is_empty() {
            println!("#{idx} [{}] {}", entry.source, entry.file().display());
        } else {
            let mut labels: Vec<_> = entry.labels.iter().collect();
            labels.sort();
            println!(
                "#{idx} [{}] {} {:?}",
                entry.source,
                entry.file().display(),
                labels
            );
        }
    }
    let Some(composition) = sample_composition(batch) else {
        return;
    };
    println!("--- by source ---");
    for share in &composition.per_source {
        println!(
            "{}: count={} share={:.2}",
            share.source, share.count, share.share
        );
    }
    println!(
        "skew: total={} labeled={} min={} max={} ratio={:.2}",
        composition.total,
        composition.labeled,
        composition.min,
        composition.max,
        composition.ratio
    );
}

//! CLI entry point for altre.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use indexmap::IndexMap;
use log::info;
use std::path::PathBuf;

use altre::classify::classify;
use altre::config::Config;
use altre::merge::{consensus_peaks, merge_close_peaks, merge_stats};
use altre::output::{write_bed, write_classification, write_collection};
use altre::parser::{parse_bed, parse_results, parse_tss_bed};
use altre::types::SourcePeaks;

/// Consensus regulatory regions and their categorical comparison.
#[derive(Parser, Debug)]
#[command(name = "altre")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Worker threads (0 = all logical CPUs)
    #[arg(short = 'j', long = "threads", default_value = "0", global = true)]
    threads: usize,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build consensus peaks of one sample from its replicates
    Consensus {
        /// Replicate BED files
        #[arg(short = 'b', long = "bed", required = true, num_args = 1..)]
        beds: Vec<PathBuf>,

        /// Replicates that must support a peak
        #[arg(short = 'm', long = "min-reps", default_value = "2")]
        min_reps: usize,

        /// Output BED file
        #[arg(short = 'o', long = "output")]
        output: PathBuf,
    },
    /// Merge peaks across samples and annotate them by nearest TSS
    Merge {
        /// Peak file of one replicate, as SAMPLE=PATH (repeatable)
        #[arg(short = 'p', long = "peaks", required = true, value_parser = parse_key_value)]
        peaks: Vec<(String, String)>,

        /// TSS BED file with gene names in the fourth column
        #[arg(short = 't', long = "tss")]
        tss: PathBuf,

        /// Maximum gap in bp across which peaks are merged
        #[arg(short = 'd', long = "merge-distance", default_value = "0")]
        merge_distance: i64,

        /// Maximum distance in bp to the nearest TSS for TSS-proximal regions
        #[arg(short = 'x', long = "tss-distance", default_value = "1500")]
        tss_distance: i64,

        /// Output TSV file
        #[arg(short = 'o', long = "output")]
        output: PathBuf,
    },
    /// Compare a reference sample against the others
    Compare {
        /// Results TSV with log2FoldChange, adjustedPValue (or padj), region and presence columns
        #[arg(short = 'r', long = "results")]
        results: PathBuf,

        /// Presence columns of one sample, as SAMPLE=COL1,COL2 (repeatable)
        #[arg(short = 's', long = "sample", required = true, value_parser = parse_key_value)]
        samples: Vec<(String, String)>,

        /// Reference sample name
        #[arg(short = 'R', long = "reference")]
        reference: String,

        /// log2 fold change above which a region is type-specific
        #[arg(long = "lfc-specific", default_value = "1.5")]
        lfc_specific: f64,

        /// log2 fold change at or below which a region may be shared
        #[arg(long = "lfc-shared", default_value = "1.2")]
        lfc_shared: f64,

        /// Adjusted p-value below which a type-specific call is significant
        #[arg(long = "padj-specific", default_value = "0.01")]
        padj_specific: f64,

        /// Adjusted p-value at or above which a region may be shared
        #[arg(long = "padj-shared", default_value = "0.05")]
        padj_shared: f64,

        /// Output TSV file
        #[arg(short = 'o', long = "output")]
        output: PathBuf,
    },
}

/// Split a `KEY=VALUE` argument.
fn parse_key_value(s: &str) -> std::result::Result<(String, String), String> {
    match s.split_once('=') {
        Some((k, v)) if !k.is_empty() && !v.is_empty() => Ok((k.to_string(), v.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{}'", s)),
    }
}

fn main() -> Result<()> {
    if std::env::var_os("RUST_LOG").is_none() {
        std::env::set_var("RUST_LOG", "info");
    }
    pretty_env_logger::init();

    let args = Args::parse();

    let mut config = Config::new();
    config.set_threads(args.threads);
    rayon::ThreadPoolBuilder::new()
        .num_threads(config.threads)
        .build_global()
        .context("Failed to configure the thread pool")?;

    match args.command {
        Command::Consensus {
            beds,
            min_reps,
            output,
        } => {
            config.min_replicates = min_reps;
            config.validate()?;

            let mut replicates = Vec::with_capacity(beds.len());
            for bed in &beds {
                if !bed.exists() {
                    bail!("BED file not found: {}", bed.display());
                }
                info!("Parsing BED file: {}", bed.display());
                replicates.push(parse_bed(bed)?);
            }

            let consensus = consensus_peaks(&replicates, config.min_replicates)?;
            info!("Writing {} consensus peaks to: {}", consensus.len(), output.display());
            write_bed(&output, &consensus)?;
        }
        Command::Merge {
            peaks,
            tss,
            merge_distance,
            tss_distance,
            output,
        } => {
            config.merge_distance = merge_distance;
            config.tss_distance = tss_distance;
            config.validate()?;

            if !tss.exists() {
                bail!("TSS file not found: {}", tss.display());
            }
            info!("Parsing TSS file: {}", tss.display());
            let tss = parse_tss_bed(&tss)?;

            let mut sources: Vec<SourcePeaks> = Vec::with_capacity(peaks.len());
            for (sample, path) in peaks {
                let path = PathBuf::from(path);
                if !path.exists() {
                    bail!("BED file not found: {}", path.display());
                }
                let replicate = sources.iter().filter(|s| s.sample == sample).count() + 1;
                info!("Parsing BED file: {} ({} replicate {})", path.display(), sample, replicate);
                let intervals = parse_bed(&path)?;
                sources.push(SourcePeaks::new(
                    format!("{}_{}", sample, replicate),
                    sample,
                    intervals,
                ));
            }

            info!("Merging peaks...");
            let merged =
                merge_close_peaks(&sources, &tss, config.tss_distance, config.merge_distance)?;
            let stats = merge_stats(&merged, &sources);
            info!(
                "{} input peaks merged into {} regions",
                stats.input_peaks, stats.merged_regions
            );
            for (name, n) in &stats.contributed {
                info!("{} contributes to {} regions", name, n);
            }

            info!("Writing output to: {}", output.display());
            write_collection(&output, &merged)?;
        }
        Command::Compare {
            results,
            samples,
            reference,
            lfc_specific,
            lfc_shared,
            padj_specific,
            padj_shared,
            output,
        } => {
            config.thresholds.type_specific_fold_change = lfc_specific;
            config.thresholds.shared_fold_change = lfc_shared;
            config.thresholds.type_specific_significance = padj_specific;
            config.thresholds.shared_significance = padj_shared;
            config.validate()?;

            if !results.exists() {
                bail!("Results file not found: {}", results.display());
            }

            let mut declared: IndexMap<String, Vec<String>> = IndexMap::new();
            for (sample, columns) in samples {
                declared
                    .entry(sample)
                    .or_default()
                    .extend(columns.split(',').map(|c| c.trim().to_string()));
            }

            info!("Parsing results file: {}", results.display());
            let table = parse_results(&results, declared)?;
            let comparison = classify(&table, &reference, &config.thresholds)?;

            info!("Writing output to: {}", output.display());
            write_classification(&output, &comparison)?;
        }
    }

    info!("Done!");
    Ok(())
}

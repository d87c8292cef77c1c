//! altre - Consensus regulatory regions and their categorical comparison.
//!
//! This library merges peaks called in several samples into consensus
//! regions, annotates the regions by proximity to transcription start sites,
//! and compares a reference sample against the others by differential
//! intensity and by peak presence.
//!
//! # Features
//!
//! - Parse BED peak and TSS files (with gzip support)
//! - Build per-sample consensus peaks from replicates
//! - Merge nearby peaks across samples, tracking which samples contributed
//! - Annotate regions as TSS-proximal or TSS-distal with the nearest gene
//! - Tabulate reference-specific, non-reference-specific and shared regions
//!
//! # Example
//!
//! ```ignore
//! use altre::merge::merge_close_peaks;
//! use altre::parser::{parse_bed, parse_tss_bed};
//! use altre::types::SourcePeaks;
//! use std::path::Path;
//!
//! let tss = parse_tss_bed(Path::new("tss.bed"))?;
//! let sources = vec![
//!     SourcePeaks::new("A549_1", "A549", parse_bed(Path::new("a549.bed"))?),
//!     SourcePeaks::new("SAEC_1", "SAEC", parse_bed(Path::new("saec.bed"))?),
//! ];
//! let merged = merge_close_peaks(&sources, &tss, 1500, 0)?;
//! ```

pub mod annotate;
pub mod classify;
pub mod config;
pub mod error;
pub mod index;
pub mod merge;
pub mod output;
pub mod parser;
pub mod types;

pub use annotate::annotate_tss;
pub use classify::{classify, ClassificationTable, Group, ResultsTable, Scope};
pub use config::{ClassifierThresholds, Config};
pub use error::{AltreError, Result};
pub use merge::{consensus_peaks, merge_close_peaks, merge_peaks};
pub use types::{
    AnnotatedInterval, AttrValue, Interval, IntervalCollection, RegionType, SourcePeaks,
    TssReference,
};

//! Configuration for altre runs.

use crate::error::{AltreError, Result};

/// Fold-change and significance cut-offs used by the region classifier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassifierThresholds {
    /// |log2FC| above which a region is type-specific.
    pub type_specific_fold_change: f64,
    /// |log2FC| at or below which a region may be shared.
    pub shared_fold_change: f64,
    /// Adjusted p-value below which a type-specific call is significant.
    pub type_specific_significance: f64,
    /// Adjusted p-value at or above which a region may be shared.
    pub shared_significance: f64,
}

impl Default for ClassifierThresholds {
    fn default() -> Self {
        ClassifierThresholds {
            type_specific_fold_change: 1.5,
            shared_fold_change: 1.2,
            type_specific_significance: 0.01,
            shared_significance: 0.05,
        }
    }
}

impl ClassifierThresholds {
    pub fn validate(&self) -> Result<()> {
        if !(self.type_specific_fold_change > 0.0) {
            return Err(AltreError::InvalidArgument(format!(
                "type-specific fold change must be positive, got {}",
                self.type_specific_fold_change
            )));
        }
        if !(self.shared_fold_change > 0.0) {
            return Err(AltreError::InvalidArgument(format!(
                "shared fold change must be positive, got {}",
                self.shared_fold_change
            )));
        }
        if self.shared_fold_change > self.type_specific_fold_change {
            return Err(AltreError::InvalidArgument(format!(
                "shared fold change ({}) exceeds type-specific fold change ({})",
                self.shared_fold_change, self.type_specific_fold_change
            )));
        }
        for (name, value) in [
            ("type-specific significance", self.type_specific_significance),
            ("shared significance", self.shared_significance),
        ] {
            if !(value > 0.0 && value <= 1.0) {
                return Err(AltreError::InvalidArgument(format!(
                    "{} must lie in (0, 1], got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

/// Run configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum gap in bp across which peaks are merged.
    pub merge_distance: i64,
    /// Maximum distance in bp from a TSS for a region to be TSS-proximal.
    pub tss_distance: i64,
    /// Replicates that must support a peak for it to enter the consensus.
    pub min_replicates: usize,
    pub thresholds: ClassifierThresholds,
    /// Worker threads for the rayon pool.
    pub threads: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            merge_distance: 0,
            tss_distance: 1500,
            min_replicates: 2,
            thresholds: ClassifierThresholds::default(),
            threads: num_cpus::get(),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the thread count; 0 selects the number of logical CPUs.
    pub fn set_threads(&mut self, threads: usize) {
        self.threads = if threads == 0 { num_cpus::get() } else { threads };
    }

    pub fn validate(&self) -> Result<()> {
        if self.merge_distance < 0 {
            return Err(AltreError::InvalidArgument(format!(
                "merge distance cannot be lower than 0 bps, got {}",
                self.merge_distance
            )));
        }
        if self.tss_distance < 0 {
            return Err(AltreError::InvalidArgument(format!(
                "TSS distance cannot be lower than 0 bps, got {}",
                self.tss_distance
            )));
        }
        if self.min_replicates == 0 {
            return Err(AltreError::InvalidArgument(
                "at least one replicate must support a consensus peak".to_string(),
            ));
        }
        self.thresholds.validate()
    }
}

//! Categorical comparison of regions between a reference and other samples.
//!
//! Regions are classified twice: by differential intensity (fold change and
//! adjusted p-value) and by peak presence. Each call is tallied per
//! TSS-distal, TSS-proximal and all regions.

use indexmap::IndexMap;
use log::{debug, info};
use std::fmt;

use crate::config::ClassifierThresholds;
use crate::error::{AltreError, Result};
use crate::types::{AnnotatedInterval, IntervalCollection, RegionType, REGION_COLUMN};

/// Column holding the log2 fold change (non-reference over reference).
pub const LOG2FC_COLUMN: &str = "log2FoldChange";
/// Column holding the adjusted p-value.
pub const PADJ_COLUMN: &str = "adjustedPValue";
/// DESeq2's name for the adjusted p-value, accepted when `PADJ_COLUMN` is absent.
pub const PADJ_ALIAS: &str = "padj";
/// Label of the shared group in table rows.
pub const SHARED_LABEL: &str = "shared";
/// Column labels of a classification table.
pub const AXIS_LABELS: [&str; 2] = ["intensity", "peak"];

/// Outcome group of a classified region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Group {
    NonReference,
    Reference,
    Shared,
}

impl Group {
    pub const ALL: [Group; 3] = [Group::NonReference, Group::Reference, Group::Shared];

    fn index(self) -> usize {
        match self {
            Group::NonReference => 0,
            Group::Reference => 1,
            Group::Shared => 2,
        }
    }
}

/// Region subset a count applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    Distal,
    Proximal,
    All,
}

impl Scope {
    pub const ALL: [Scope; 3] = [Scope::Distal, Scope::Proximal, Scope::All];

    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Distal => "TSS-dists",
            Scope::Proximal => "TSS-proxs",
            Scope::All => "all",
        }
    }

    fn index(self) -> usize {
        match self {
            Scope::Distal => 0,
            Scope::Proximal => 1,
            Scope::All => 2,
        }
    }
}

impl From<RegionType> for Scope {
    fn from(region: RegionType) -> Self {
        match region {
            RegionType::Distal => Scope::Distal,
            RegionType::Proximal => Scope::Proximal,
        }
    }
}

/// Classification axis, one table column each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Intensity,
    Peak,
}

impl Axis {
    fn index(self) -> usize {
        match self {
            Axis::Intensity => 0,
            Axis::Peak => 1,
        }
    }
}

/// Differential results for a set of regions.
///
/// `samples` maps each sample to the presence columns of its replicates.
#[derive(Debug, Clone)]
pub struct ResultsTable {
    regions: IntervalCollection,
    samples: IndexMap<String, Vec<String>>,
    padj_column: String,
}

impl ResultsTable {
    /// Validate that the required and declared presence columns exist.
    pub fn new(
        regions: IntervalCollection,
        samples: IndexMap<String, Vec<String>>,
    ) -> Result<Self> {
        for column in [LOG2FC_COLUMN, REGION_COLUMN] {
            if !regions.has_column(column) {
                return Err(AltreError::InvalidInput(format!(
                    "results table lacks the '{}' column",
                    column
                )));
            }
        }
        let padj_column = [PADJ_COLUMN, PADJ_ALIAS]
            .into_iter()
            .find(|c| regions.has_column(c))
            .ok_or_else(|| {
                AltreError::InvalidInput(format!(
                    "results table lacks the '{}' column",
                    PADJ_COLUMN
                ))
            })?
            .to_string();
        if samples.len() < 2 {
            return Err(AltreError::InvalidInput(format!(
                "at least two samples are needed for a comparison, got {}",
                samples.len()
            )));
        }
        for (sample, columns) in &samples {
            if columns.is_empty() {
                return Err(AltreError::InvalidInput(format!(
                    "sample '{}' declares no presence columns",
                    sample
                )));
            }
            if let Some(missing) = columns.iter().find(|c| !regions.has_column(c)) {
                return Err(AltreError::InvalidInput(format!(
                    "presence column '{}' of sample '{}' is not in the results table",
                    missing, sample
                )));
            }
        }
        Ok(ResultsTable {
            regions,
            samples,
            padj_column,
        })
    }

    pub fn regions(&self) -> &IntervalCollection {
        &self.regions
    }

    pub fn samples(&self) -> &IndexMap<String, Vec<String>> {
        &self.samples
    }

    /// Name of the adjusted p-value column this table is read through.
    pub fn padj_column(&self) -> &str {
        &self.padj_column
    }

    /// True when any replicate column of `sample` has a value in `row`.
    fn present(&self, row: &AnnotatedInterval, sample: &str) -> bool {
        self.samples
            .get(sample)
            .is_some_and(|cols| cols.iter().any(|c| row.get(c).is_present()))
    }
}

/// Counts of the three groups by three scopes, for both axes.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationTable {
    labels: [String; 3],
    counts: [[u64; 2]; 9],
}

impl ClassificationTable {
    fn new(nonreference: String, reference: String) -> Self {
        ClassificationTable {
            labels: [nonreference, reference, SHARED_LABEL.to_string()],
            counts: [[0; 2]; 9],
        }
    }

    fn row(group: Group, scope: Scope) -> usize {
        scope.index() * 3 + group.index()
    }

    fn add(&mut self, group: Group, scope: Option<Scope>, axis: Axis) {
        self.counts[Self::row(group, Scope::All)][axis.index()] += 1;
        if let Some(scope) = scope {
            self.counts[Self::row(group, scope)][axis.index()] += 1;
        }
    }

    pub fn get(&self, group: Group, scope: Scope, axis: Axis) -> u64 {
        self.counts[Self::row(group, scope)][axis.index()]
    }

    /// Display name of a group.
    pub fn group_label(&self, group: Group) -> &str {
        &self.labels[group.index()]
    }

    /// Row labels in table order: distal, proximal, then all, each by group.
    pub fn row_labels(&self) -> Vec<String> {
        Scope::ALL
            .iter()
            .flat_map(|scope| {
                Group::ALL
                    .iter()
                    .map(move |group| format!("{} {}", self.group_label(*group), scope.as_str()))
            })
            .collect()
    }

    /// Rows as `(label, intensity, peak)`.
    pub fn rows(&self) -> Vec<(String, u64, u64)> {
        self.row_labels()
            .into_iter()
            .zip(self.counts.iter())
            .map(|(label, c)| (label, c[0], c[1]))
            .collect()
    }

    /// Count addressed by row and column label.
    pub fn by_label(&self, row: &str, column: &str) -> Option<u64> {
        let r = self.row_labels().iter().position(|l| l == row)?;
        let c = AXIS_LABELS.iter().position(|l| *l == column)?;
        Some(self.counts[r][c])
    }
}

impl fmt::Display for ClassificationTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "category\t{}\t{}", AXIS_LABELS[0], AXIS_LABELS[1])?;
        for (label, intensity, peak) in self.rows() {
            writeln!(f, "{}\t{}\t{}", label, intensity, peak)?;
        }
        Ok(())
    }
}

/// Join non-reference sample names: `A`, `A and/or B`, `A, B and/or C`.
///
/// Leading punctuation and whitespace are stripped from the result.
pub fn nonreference_label<S: AsRef<str>>(names: &[S]) -> String {
    let label = match names {
        [] => String::new(),
        [only] => only.as_ref().to_string(),
        [head @ .., last] => {
            let head: Vec<&str> = head.iter().map(|s| s.as_ref()).collect();
            format!("{} and/or {}", head.join(", "), last.as_ref())
        }
    };
    label
        .trim_start_matches(|c: char| c.is_ascii_punctuation() || c.is_whitespace())
        .to_string()
}

/// Categorise a region by differential intensity.
///
/// A missing p-value can only make a region shared.
pub fn intensity_category(
    log2fc: Option<f64>,
    padj: Option<f64>,
    thresholds: &ClassifierThresholds,
) -> Option<Group> {
    let lfc = log2fc?;
    if let Some(p) = padj {
        if p < thresholds.type_specific_significance {
            if lfc < -thresholds.type_specific_fold_change {
                return Some(Group::Reference);
            }
            if lfc > thresholds.type_specific_fold_change {
                return Some(Group::NonReference);
            }
        }
    }
    let insignificant = padj.map_or(true, |p| p >= thresholds.shared_significance);
    if lfc.abs() <= thresholds.shared_fold_change && insignificant {
        return Some(Group::Shared);
    }
    None
}

/// Categorise a region by which side called a peak there.
pub fn presence_category(reference_present: bool, nonreference_present: bool) -> Option<Group> {
    match (reference_present, nonreference_present) {
        (false, true) => Some(Group::NonReference),
        (true, false) => Some(Group::Reference),
        (true, true) => Some(Group::Shared),
        (false, false) => None,
    }
}

/// Tabulate intensity and presence categories against `reference`.
///
/// # Errors
/// `InvalidInput` when `reference` is not a declared sample,
/// `InvalidArgument` when the thresholds are inconsistent.
pub fn classify(
    results: &ResultsTable,
    reference: &str,
    thresholds: &ClassifierThresholds,
) -> Result<ClassificationTable> {
    thresholds.validate()?;
    if !results.samples.contains_key(reference) {
        return Err(AltreError::InvalidInput(format!(
            "reference sample '{}' is not among the samples ({})",
            reference,
            results.samples.keys().cloned().collect::<Vec<_>>().join(", ")
        )));
    }

    let others: Vec<&str> = results
        .samples
        .keys()
        .map(String::as_str)
        .filter(|s| *s != reference)
        .collect();
    let mut table = ClassificationTable::new(nonreference_label(&others), reference.to_string());
    debug!(
        "Comparing '{}' against reference '{}'",
        table.group_label(Group::NonReference),
        reference
    );

    for row in results.regions.rows() {
        let scope = row
            .get(REGION_COLUMN)
            .as_text()
            .and_then(RegionType::from_str)
            .map(Scope::from);

        let log2fc = row.get(LOG2FC_COLUMN).as_f64();
        let padj = row.get(&results.padj_column).as_f64();
        if let Some(group) = intensity_category(log2fc, padj, thresholds) {
            table.add(group, scope, Axis::Intensity);
        }

        let reference_present = results.present(row, reference);
        let nonreference_present = others.iter().any(|s| results.present(row, s));
        if let Some(group) = presence_category(reference_present, nonreference_present) {
            table.add(group, scope, Axis::Peak);
        }
    }

    info!(
        "Classified {} regions: {} shared by intensity, {} shared by peak presence",
        results.regions.len(),
        table.get(Group::Shared, Scope::All, Axis::Intensity),
        table.get(Group::Shared, Scope::All, Axis::Peak)
    );
    Ok(table)
}

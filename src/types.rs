//! Core data structures for altre.
//!
//! This module contains the interval, attribute and collection types shared
//! by the merge, annotation and classification stages.

use indexmap::IndexMap;
use std::fmt;

use crate::error::{AltreError, Result};

/// Attribute column holding the nearest-TSS classification.
pub const REGION_COLUMN: &str = "region";
/// Attribute column holding the nearest gene identifier.
pub const CLOSEST_GENE_COLUMN: &str = "closestGene";
/// Attribute column holding the distance to the nearest TSS.
pub const DISTANCE_COLUMN: &str = "distanceToTSS";
/// Attribute column holding `end - start` of a merged interval.
pub const SIZE_COLUMN: &str = "size";
/// Attribute column of a TSS reference naming the gene.
pub const GENE_NAME_COLUMN: &str = "gene_name";

/// Classification of a region by proximity to its nearest TSS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegionType {
    Proximal,
    Distal,
}

impl RegionType {
    /// Parse region type from its label ("TSS-proximal" or "TSS-distal").
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "TSS-proximal" => Some(RegionType::Proximal),
            "TSS-distal" => Some(RegionType::Distal),
            _ => None,
        }
    }

    /// Convert region type to its label.
    pub fn as_str(&self) -> &'static str {
        match self {
            RegionType::Proximal => "TSS-proximal",
            RegionType::Distal => "TSS-distal",
        }
    }
}

impl fmt::Display for RegionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A genomic interval, 1-based with both ends inclusive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Interval {
    pub chrom: String,
    pub start: i64,
    pub end: i64,
}

impl Interval {
    /// Create a new interval, rejecting `start > end`.
    pub fn new(chrom: impl Into<String>, start: i64, end: i64) -> Result<Self> {
        let chrom = chrom.into();
        if start > end {
            return Err(AltreError::InvalidArgument(format!(
                "interval {}:{}-{} has start after end",
                chrom, start, end
            )));
        }
        Ok(Interval { chrom, start, end })
    }

    /// Number of bases covered (end - start + 1).
    pub fn length(&self) -> i64 {
        self.end - self.start + 1
    }

    /// Size as reported in merged output (end - start).
    pub fn size(&self) -> i64 {
        self.end - self.start
    }

    /// True when both intervals share at least one base.
    pub fn overlaps(&self, other: &Interval) -> bool {
        self.chrom == other.chrom && self.start <= other.end && other.start <= self.end
    }

    /// Number of bases strictly between two intervals.
    ///
    /// Overlapping and adjacent intervals are at distance 0. Intervals on
    /// different chromosomes have no distance.
    pub fn distance(&self, other: &Interval) -> Option<i64> {
        if self.chrom != other.chrom {
            return None;
        }
        let gap = if self.end < other.start {
            other.start - self.end - 1
        } else if other.end < self.start {
            self.start - other.end - 1
        } else {
            0
        };
        Some(gap.max(0))
    }

    /// Shift the start upstream by `up` and the end downstream by `down`.
    pub fn padded(&self, up: i64, down: i64) -> Interval {
        Interval {
            chrom: self.chrom.clone(),
            start: self.start - up,
            end: self.end + down,
        }
    }

    /// Get the interval ID (chrom_start_end).
    pub fn id(&self) -> String {
        format!("{}_{}_{}", self.chrom, self.start, self.end)
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}-{}", self.chrom, self.start, self.end)
    }
}

/// A single attribute value attached to an interval.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Text(String),
    Int(i64),
    Float(f64),
    Missing,
}

impl AttrValue {
    /// Parse a raw table cell. `NA` and empty cells are missing.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() || raw == "NA" {
            return AttrValue::Missing;
        }
        if let Ok(v) = raw.parse::<i64>() {
            return AttrValue::Int(v);
        }
        match raw.parse::<f64>() {
            Ok(v) if v.is_nan() => AttrValue::Missing,
            Ok(v) => AttrValue::Float(v),
            Err(_) => AttrValue::Text(raw.to_string()),
        }
    }

    pub fn is_present(&self) -> bool {
        !matches!(self, AttrValue::Missing)
    }

    /// Numeric view of the value; text and missing values have none.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttrValue::Int(v) => Some(*v as f64),
            AttrValue::Float(v) if !v.is_nan() => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttrValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Text(s) => write!(f, "{}", s),
            AttrValue::Int(v) => write!(f, "{}", v),
            AttrValue::Float(v) => write!(f, "{}", v),
            AttrValue::Missing => write!(f, "NA"),
        }
    }
}

/// An interval together with its named attributes, in column order.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatedInterval {
    pub interval: Interval,
    pub attrs: IndexMap<String, AttrValue>,
}

impl AnnotatedInterval {
    pub fn new(interval: Interval) -> Self {
        AnnotatedInterval {
            interval,
            attrs: IndexMap::new(),
        }
    }

    /// Builder-style attribute insertion.
    pub fn with_attr(mut self, name: impl Into<String>, value: AttrValue) -> Self {
        self.attrs.insert(name.into(), value);
        self
    }

    /// Attribute lookup; undeclared names read as missing.
    pub fn get(&self, name: &str) -> &AttrValue {
        self.attrs.get(name).unwrap_or(&AttrValue::Missing)
    }
}

/// An ordered set of annotated intervals sharing one attribute schema.
///
/// Every row carries exactly the declared columns, in declared order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct IntervalCollection {
    columns: Vec<String>,
    rows: Vec<AnnotatedInterval>,
}

impl IntervalCollection {
    /// Create a collection, validating every row against `columns`.
    pub fn new(columns: Vec<String>, rows: Vec<AnnotatedInterval>) -> Result<Self> {
        for (i, name) in columns.iter().enumerate() {
            if columns[..i].contains(name) {
                return Err(AltreError::SchemaMismatch(format!(
                    "column '{}' declared twice",
                    name
                )));
            }
        }
        for row in &rows {
            let aligned = row.attrs.len() == columns.len()
                && row.attrs.keys().zip(&columns).all(|(k, c)| k == c);
            if !aligned {
                return Err(AltreError::SchemaMismatch(format!(
                    "row {} has columns [{}], expected [{}]",
                    row.interval,
                    row.attrs.keys().cloned().collect::<Vec<_>>().join(", "),
                    columns.join(", ")
                )));
            }
        }
        Ok(IntervalCollection { columns, rows })
    }

    /// Collection without attributes.
    pub fn from_intervals(intervals: impl IntoIterator<Item = Interval>) -> Self {
        IntervalCollection {
            columns: Vec::new(),
            rows: intervals.into_iter().map(AnnotatedInterval::new).collect(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[AnnotatedInterval] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    pub fn intervals(&self) -> impl Iterator<Item = &Interval> {
        self.rows.iter().map(|r| &r.interval)
    }

    /// Return a new collection with `name` set to `values`.
    ///
    /// An existing column keeps its position; a new one is appended.
    pub fn with_column(&self, name: &str, values: Vec<AttrValue>) -> Result<Self> {
        if values.len() != self.rows.len() {
            return Err(AltreError::SchemaMismatch(format!(
                "column '{}' has {} values for {} rows",
                name,
                values.len(),
                self.rows.len()
            )));
        }
        let mut columns = self.columns.clone();
        if !self.has_column(name) {
            columns.push(name.to_string());
        }
        let rows = self
            .rows
            .iter()
            .zip(values)
            .map(|(row, value)| {
                let mut row = row.clone();
                row.attrs.insert(name.to_string(), value);
                row
            })
            .collect();
        Ok(IntervalCollection { columns, rows })
    }
}

/// Reference transcription start sites, each carrying a `gene_name`.
#[derive(Debug, Clone, PartialEq)]
pub struct TssReference {
    sites: IntervalCollection,
}

impl TssReference {
    /// Wrap a collection that declares a `gene_name` column.
    pub fn new(sites: IntervalCollection) -> Result<Self> {
        if !sites.has_column(GENE_NAME_COLUMN) {
            return Err(AltreError::InvalidInput(format!(
                "TSS reference lacks the '{}' column",
                GENE_NAME_COLUMN
            )));
        }
        Ok(TssReference { sites })
    }

    /// Build a reference from `(chrom, start, end, gene)` records.
    pub fn from_records<S: Into<String>>(records: Vec<(S, i64, i64, S)>) -> Result<Self> {
        let rows = records
            .into_iter()
            .map(|(chrom, start, end, gene)| {
                Ok(AnnotatedInterval::new(Interval::new(chrom, start, end)?)
                    .with_attr(GENE_NAME_COLUMN, AttrValue::Text(gene.into())))
            })
            .collect::<Result<Vec<_>>>()?;
        TssReference::new(IntervalCollection::new(
            vec![GENE_NAME_COLUMN.to_string()],
            rows,
        )?)
    }

    pub fn sites(&self) -> &IntervalCollection {
        &self.sites
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }
}

/// Peaks of one replicate of one sample.
#[derive(Debug, Clone, PartialEq)]
pub struct SourcePeaks {
    /// Identifier used as the presence column name after merging.
    pub name: String,
    /// Sample (cell or tissue type) the replicate belongs to.
    pub sample: String,
    pub intervals: IntervalCollection,
}

impl SourcePeaks {
    pub fn new(name: impl Into<String>, sample: impl Into<String>, intervals: IntervalCollection) -> Self {
        SourcePeaks {
            name: name.into(),
            sample: sample.into(),
            intervals,
        }
    }
}

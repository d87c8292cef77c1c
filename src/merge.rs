//! Merging of nearby peaks across samples into consensus intervals.
//!
//! Peaks are padded by half the merge distance, reduced to a non-overlapping
//! union, tagged with the sources that contributed to each union interval,
//! and finally shrunk back to the original coordinate scale.

use indexmap::IndexMap;
use log::{debug, info};
use rayon::prelude::*;

use crate::annotate::annotate_tss;
use crate::error::{AltreError, Result};
use crate::index::IntervalIndex;
use crate::types::{
    AnnotatedInterval, AttrValue, Interval, IntervalCollection, SourcePeaks, TssReference,
    CLOSEST_GENE_COLUMN, DISTANCE_COLUMN, REGION_COLUMN, SIZE_COLUMN,
};

/// Attribute column of a consensus collection counting supporting replicates.
pub const REPLICATES_COLUMN: &str = "replicates";

/// Split a merge distance into `(pad_up, pad_down)`.
///
/// Odd distances put the extra base upstream so that two peaks exactly
/// `merge_distance` bases apart become adjacent once padded.
pub fn padding(merge_distance: i64) -> Result<(i64, i64)> {
    if merge_distance < 0 {
        return Err(AltreError::InvalidArgument(format!(
            "merge distance cannot be lower than 0 bps, got {}",
            merge_distance
        )));
    }
    let half = merge_distance / 2;
    if merge_distance % 2 == 0 {
        Ok((half, half))
    } else {
        Ok((half + 1, half))
    }
}

/// Reduce intervals to their sorted union.
///
/// Overlapping and adjacent intervals collapse into one spanning their
/// minimum start and maximum end.
pub fn reduce<I>(intervals: I) -> Vec<Interval>
where
    I: IntoIterator<Item = Interval>,
{
    let mut sorted: Vec<Interval> = intervals.into_iter().collect();
    sorted.sort_by(|a, b| {
        a.chrom
            .cmp(&b.chrom)
            .then(a.start.cmp(&b.start))
            .then(a.end.cmp(&b.end))
    });

    let mut merged: Vec<Interval> = Vec::with_capacity(sorted.len());
    for interval in sorted {
        match merged.last_mut() {
            Some(last) if last.chrom == interval.chrom && interval.start <= last.end + 1 => {
                last.end = last.end.max(interval.end);
            }
            _ => merged.push(interval),
        }
    }
    merged
}

/// Presence markers of one source over the merged intervals.
///
/// A merged interval is marked with `name` when any of the source's padded
/// intervals overlaps it, and `Missing` otherwise.
fn presence_column(merged: &[Interval], name: &str, padded: &[Interval]) -> Vec<AttrValue> {
    let index = IntervalIndex::new(padded.iter().map(|iv| (iv.clone(), ())));
    merged
        .iter()
        .map(|iv| {
            if index.any_overlap(iv) {
                AttrValue::Text(name.to_string())
            } else {
                AttrValue::Missing
            }
        })
        .collect()
}

/// Merge peaks from several sources into tagged consensus intervals.
///
/// The output holds one presence column per source, named after the source,
/// followed by `size`. Rows are sorted by chromosome and start.
pub fn merge_peaks(sources: &[SourcePeaks], merge_distance: i64) -> Result<IntervalCollection> {
    let (pad_up, pad_down) = padding(merge_distance)?;
    debug!(
        "Padding peaks by {} bp upstream and {} bp downstream",
        pad_up, pad_down
    );

    let padded: Vec<Vec<Interval>> = sources
        .iter()
        .map(|s| s.intervals.intervals().map(|iv| iv.padded(pad_up, pad_down)).collect())
        .collect();

    let merged = reduce(padded.iter().flatten().cloned());

    let presence: Vec<Vec<AttrValue>> = sources
        .par_iter()
        .zip(padded.par_iter())
        .map(|(source, pad)| presence_column(&merged, &source.name, pad))
        .collect();

    let mut columns: Vec<String> = sources.iter().map(|s| s.name.clone()).collect();
    columns.push(SIZE_COLUMN.to_string());

    let rows = merged
        .iter()
        .enumerate()
        .map(|(i, iv)| {
            let interval = iv.padded(-pad_up, -pad_down);
            let size = interval.size();
            let mut row = AnnotatedInterval::new(interval);
            for (source, column) in sources.iter().zip(&presence) {
                row.attrs.insert(source.name.clone(), column[i].clone());
            }
            row.attrs.insert(SIZE_COLUMN.to_string(), AttrValue::Int(size));
            row
        })
        .collect();

    let collection = IntervalCollection::new(columns, rows)?;
    info!(
        "Merged {} peaks from {} sources into {} regions",
        padded.iter().map(Vec::len).sum::<usize>(),
        sources.len(),
        collection.len()
    );
    Ok(collection)
}

/// Merge peaks across sources and annotate the result by nearest TSS.
///
/// Annotation runs on the un-padded consensus coordinates.
pub fn merge_close_peaks(
    sources: &[SourcePeaks],
    tss: &TssReference,
    tss_distance: i64,
    merge_distance: i64,
) -> Result<IntervalCollection> {
    if tss.is_empty() {
        return Err(AltreError::EmptyReference);
    }
    let annotation_columns = [REGION_COLUMN, CLOSEST_GENE_COLUMN, DISTANCE_COLUMN];
    if let Some(source) = sources
        .iter()
        .find(|s| annotation_columns.contains(&s.name.as_str()))
    {
        return Err(AltreError::SchemaMismatch(format!(
            "source name '{}' clashes with an annotation column",
            source.name
        )));
    }
    let merged = merge_peaks(sources, merge_distance)?;
    annotate_tss(&merged, tss, tss_distance)
}

/// Consensus peaks of one sample.
///
/// Replicates are reduced together and a reduced interval is kept when at
/// least `min_replicates` replicates overlap it.
pub fn consensus_peaks(
    replicates: &[IntervalCollection],
    min_replicates: usize,
) -> Result<IntervalCollection> {
    if min_replicates == 0 || min_replicates > replicates.len() {
        return Err(AltreError::InvalidArgument(format!(
            "minimum replicate support must lie in 1..={}, got {}",
            replicates.len(),
            min_replicates
        )));
    }

    let union = reduce(replicates.iter().flat_map(|r| r.intervals().cloned()));
    let indexes: Vec<IntervalIndex<()>> = replicates
        .iter()
        .map(|r| IntervalIndex::new(r.intervals().map(|iv| (iv.clone(), ()))))
        .collect();

    let rows: Vec<AnnotatedInterval> = union
        .into_par_iter()
        .filter_map(|iv| {
            let support = indexes.iter().filter(|idx| idx.any_overlap(&iv)).count();
            (support >= min_replicates).then(|| {
                AnnotatedInterval::new(iv)
                    .with_attr(REPLICATES_COLUMN, AttrValue::Int(support as i64))
            })
        })
        .collect();

    debug!(
        "{} consensus peaks supported by at least {} of {} replicates",
        rows.len(),
        min_replicates,
        replicates.len()
    );
    IntervalCollection::new(vec![REPLICATES_COLUMN.to_string()], rows)
}

/// Presence columns grouped by sample, in first-seen order.
pub fn sample_columns(sources: &[SourcePeaks]) -> IndexMap<String, Vec<String>> {
    let mut samples: IndexMap<String, Vec<String>> = IndexMap::new();
    for source in sources {
        samples
            .entry(source.sample.clone())
            .or_default()
            .push(source.name.clone());
    }
    samples
}

/// Summary of a merge run.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeStats {
    pub input_peaks: usize,
    pub merged_regions: usize,
    /// Number of merged regions each source contributed to.
    pub contributed: IndexMap<String, usize>,
}

/// Tally how a merged collection relates to its sources.
pub fn merge_stats(merged: &IntervalCollection, sources: &[SourcePeaks]) -> MergeStats {
    let contributed = sources
        .iter()
        .map(|s| {
            let n = merged
                .rows()
                .iter()
                .filter(|r| r.get(&s.name).is_present())
                .count();
            (s.name.clone(), n)
        })
        .collect();
    MergeStats {
        input_peaks: sources.iter().map(|s| s.intervals.len()).sum(),
        merged_regions: merged.len(),
        contributed,
    }
}

//! Nearest-TSS annotation of genomic regions.
//!
//! Each region is assigned the gene of its nearest TSS, the distance to it,
//! and a TSS-proximal / TSS-distal label.

use log::{debug, warn};
use rayon::prelude::*;

use crate::error::{AltreError, Result};
use crate::index::IntervalIndex;
use crate::types::{
    AttrValue, IntervalCollection, RegionType, TssReference, CLOSEST_GENE_COLUMN,
    DISTANCE_COLUMN, GENE_NAME_COLUMN, REGION_COLUMN,
};

/// Classify a distance against the proximity threshold.
pub fn region_type(distance: Option<i64>, proximity: i64) -> RegionType {
    match distance {
        Some(d) if d <= proximity => RegionType::Proximal,
        _ => RegionType::Distal,
    }
}

/// Annotate every region with its nearest TSS.
///
/// Returns a new collection with `region`, `closestGene` and `distanceToTSS`
/// set. Regions on a chromosome without any TSS are TSS-distal with missing
/// gene and distance.
///
/// # Errors
/// `EmptyReference` when `tss` holds no sites, `InvalidArgument` when
/// `proximity` is negative.
pub fn annotate_tss(
    regions: &IntervalCollection,
    tss: &TssReference,
    proximity: i64,
) -> Result<IntervalCollection> {
    if tss.is_empty() {
        return Err(AltreError::EmptyReference);
    }
    if proximity < 0 {
        return Err(AltreError::InvalidArgument(format!(
            "TSS proximity threshold cannot be negative, got {}",
            proximity
        )));
    }

    let sites = tss.sites().rows();
    let index = IntervalIndex::new(
        sites
            .iter()
            .enumerate()
            .map(|(i, site)| (site.interval.clone(), i)),
    );
    debug!("Indexed {} TSS for annotation", index.len());

    let hits: Vec<Option<(usize, i64)>> = regions
        .rows()
        .par_iter()
        .map(|row| index.nearest(&row.interval).map(|(&i, d)| (i, d)))
        .collect();

    let mut unmatched: Vec<&str> = Vec::new();
    let mut region_values = Vec::with_capacity(hits.len());
    let mut gene_values = Vec::with_capacity(hits.len());
    let mut distance_values = Vec::with_capacity(hits.len());

    for (row, hit) in regions.rows().iter().zip(&hits) {
        let distance = hit.map(|(_, d)| d);
        region_values.push(AttrValue::Text(
            region_type(distance, proximity).as_str().to_string(),
        ));
        match hit {
            Some((i, d)) => {
                gene_values.push(sites[*i].get(GENE_NAME_COLUMN).clone());
                distance_values.push(AttrValue::Int(*d));
            }
            None => {
                let chrom = row.interval.chrom.as_str();
                if !unmatched.contains(&chrom) {
                    unmatched.push(chrom);
                }
                gene_values.push(AttrValue::Missing);
                distance_values.push(AttrValue::Missing);
            }
        }
    }
    for chrom in unmatched {
        warn!("{} not found in TSS reference; its regions are TSS-distal", chrom);
    }

    regions
        .with_column(REGION_COLUMN, region_values)?
        .with_column(CLOSEST_GENE_COLUMN, gene_values)?
        .with_column(DISTANCE_COLUMN, distance_values)
}

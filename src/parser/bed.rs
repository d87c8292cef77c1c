//! BED file parser with gzip support.
//!
//! BED coordinates are 0-based half-open; intervals are converted to the
//! 1-based closed convention on read.

use std::io::BufRead;
use std::path::Path;

use super::open_reader;
use crate::error::{AltreError, Result};
use crate::types::{
    AnnotatedInterval, AttrValue, Interval, IntervalCollection, TssReference, GENE_NAME_COLUMN,
};

/// Attribute column holding the optional BED name field.
pub const NAME_COLUMN: &str = "name";

struct BedRecord {
    interval: Interval,
    name: Option<String>,
}

/// Parse a BED file of peaks.
///
/// A `name` column is declared when any record has a fourth field.
pub fn parse_bed(path: &Path) -> Result<IntervalCollection> {
    let records = parse_bed_reader(open_reader(path)?)?;
    let named = records.iter().any(|r| r.name.is_some());
    if !named {
        return Ok(IntervalCollection::from_intervals(
            records.into_iter().map(|r| r.interval),
        ));
    }
    let rows = records
        .into_iter()
        .map(|r| {
            let name = r.name.map_or(AttrValue::Missing, AttrValue::Text);
            AnnotatedInterval::new(r.interval).with_attr(NAME_COLUMN, name)
        })
        .collect();
    IntervalCollection::new(vec![NAME_COLUMN.to_string()], rows)
}

/// Parse a BED file of TSS; the fourth field is the gene name.
pub fn parse_tss_bed(path: &Path) -> Result<TssReference> {
    let records = parse_bed_reader(open_reader(path)?)?;
    let rows = records
        .into_iter()
        .map(|r| match r.name {
            Some(gene) => Ok(AnnotatedInterval::new(r.interval)
                .with_attr(GENE_NAME_COLUMN, AttrValue::Text(gene))),
            None => Err(AltreError::InvalidInput(format!(
                "TSS record {} has no gene name",
                r.interval
            ))),
        })
        .collect::<Result<Vec<_>>>()?;
    TssReference::new(IntervalCollection::new(
        vec![GENE_NAME_COLUMN.to_string()],
        rows,
    )?)
}

/// Parse BED records from a reader.
fn parse_bed_reader<R: BufRead>(reader: R) -> Result<Vec<BedRecord>> {
    let mut records = Vec::new();

    for (i, line_result) in reader.lines().enumerate() {
        let line = line_result?;

        if line.is_empty() || line.starts_with('#') || line.starts_with("track") {
            continue;
        }

        let fields: Vec<&str> = line.split('\t').collect();

        // Need at least 3 columns: chrom, start, end
        if fields.len() < 3 {
            continue;
        }

        // Header lines fail to parse as integers
        let (Ok(start), Ok(end)) = (fields[1].parse::<i64>(), fields[2].parse::<i64>()) else {
            continue;
        };

        // Zero-length records (insertion points, TSS written as start == end)
        // cover the single base ending at `end`.
        let first = if start == end && end > 0 { end } else { start + 1 };
        let interval = Interval::new(fields[0], first, end).map_err(|e| AltreError::Parse {
            line: i + 1,
            message: e.to_string(),
        })?;
        let name = fields
            .get(3)
            .filter(|s| !s.is_empty() && **s != ".")
            .map(|s| s.to_string());

        records.push(BedRecord { interval, name });
    }

    Ok(records)
}

//! Output formatting for merged regions and classification tables.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::classify::ClassificationTable;
use crate::error::Result;
use crate::types::IntervalCollection;

/// Write an interval collection as a TSV with a header line.
///
/// Coordinates are 1-based closed; missing values are written as `NA`.
pub fn write_collection(path: &Path, collection: &IntervalCollection) -> Result<()> {
    let file = File::create(path)?;
    write_collection_to(BufWriter::new(file), collection)
}

pub fn write_collection_to<W: Write>(mut writer: W, collection: &IntervalCollection) -> Result<()> {
    write!(writer, "chr\tstart\tend")?;
    for column in collection.columns() {
        write!(writer, "\t{}", column)?;
    }
    writeln!(writer)?;

    for row in collection.rows() {
        let iv = &row.interval;
        write!(writer, "{}\t{}\t{}", iv.chrom, iv.start, iv.end)?;
        for value in row.attrs.values() {
            write!(writer, "\t{}", value)?;
        }
        writeln!(writer)?;
    }

    writer.flush()?;
    Ok(())
}

/// Write intervals as BED, converting back to 0-based half-open starts.
pub fn write_bed(path: &Path, collection: &IntervalCollection) -> Result<()> {
    write_bed_to(BufWriter::new(File::create(path)?), collection)
}

pub fn write_bed_to<W: Write>(mut writer: W, collection: &IntervalCollection) -> Result<()> {
    for iv in collection.intervals() {
        writeln!(writer, "{}\t{}\t{}", iv.chrom, iv.start - 1, iv.end)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write a classification table as a TSV.
pub fn write_classification(path: &Path, table: &ClassificationTable) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write!(writer, "{}", table)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AnnotatedInterval, AttrValue, Interval};

    #[test]
    fn test_write_collection() {
        let rows = vec![
            AnnotatedInterval::new(Interval::new("chr1", 100, 300).unwrap())
                .with_attr("A", AttrValue::Text("A".into()))
                .with_attr("B", AttrValue::Missing),
        ];
        let collection =
            IntervalCollection::new(vec!["A".to_string(), "B".to_string()], rows).unwrap();

        let mut buf = Vec::new();
        write_collection_to(&mut buf, &collection).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert_eq!(text, "chr\tstart\tend\tA\tB\nchr1\t100\t300\tA\tNA\n");
    }

    #[test]
    fn test_write_bed_restores_zero_based_start() {
        let collection =
            IntervalCollection::from_intervals(vec![Interval::new("chr2", 11, 40).unwrap()]);

        let mut buf = Vec::new();
        write_bed_to(&mut buf, &collection).unwrap();

        assert_eq!(String::from_utf8(buf).unwrap(), "chr2\t10\t40\n");
    }
}

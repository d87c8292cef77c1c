//! Parser for tab-separated interval tables with a header line.
//!
//! The first three columns are chromosome, start and end in 1-based closed
//! coordinates (as written by [`crate::output::write_collection`]); every
//! further column becomes a named attribute.

use indexmap::IndexMap;
use std::io::BufRead;
use std::path::Path;

use super::open_reader;
use crate::classify::ResultsTable;
use crate::error::{AltreError, Result};
use crate::types::{AnnotatedInterval, AttrValue, Interval, IntervalCollection};

/// Parse an interval table.
pub fn parse_table(path: &Path) -> Result<IntervalCollection> {
    parse_table_reader(open_reader(path)?)
}

/// Parse a differential results table.
///
/// `samples` maps each sample to its presence columns in the table.
pub fn parse_results(path: &Path, samples: IndexMap<String, Vec<String>>) -> Result<ResultsTable> {
    ResultsTable::new(parse_table(path)?, samples)
}

fn parse_table_reader<R: BufRead>(reader: R) -> Result<IntervalCollection> {
    let mut lines = reader.lines().enumerate();

    let header = loop {
        match lines.next() {
            Some((_, line)) => {
                let line = line?;
                if !line.trim().is_empty() {
                    break line;
                }
            }
            None => return Ok(IntervalCollection::default()),
        }
    };
    let header: Vec<&str> = header.split('\t').collect();
    if header.len() < 3 {
        return Err(AltreError::Parse {
            line: 1,
            message: "header needs chromosome, start and end columns".to_string(),
        });
    }
    let columns: Vec<String> = header[3..].iter().map(|s| s.to_string()).collect();

    let mut rows = Vec::new();
    for (i, line) in lines {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() != header.len() {
            return Err(AltreError::SchemaMismatch(format!(
                "line {} has {} fields, header declares {}",
                i + 1,
                fields.len(),
                header.len()
            )));
        }

        let coordinate = |field: &str| {
            field.parse::<i64>().map_err(|_| AltreError::Parse {
                line: i + 1,
                message: format!("'{}' is not a coordinate", field),
            })
        };
        let interval = Interval::new(fields[0], coordinate(fields[1])?, coordinate(fields[2])?)
            .map_err(|e| AltreError::Parse {
                line: i + 1,
                message: e.to_string(),
            })?;

        let mut row = AnnotatedInterval::new(interval);
        for (name, value) in columns.iter().zip(&fields[3..]) {
            row.attrs.insert(name.clone(), AttrValue::parse(value));
        }
        rows.push(row);
    }

    IntervalCollection::new(columns, rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::BufReader;

    const RESULTS: &str = "chr\tstart\tend\tlog2FoldChange\tpadj\tregion\tX_1\tY_1\n\
chr1\t100\t200\t2.5\t0.001\tTSS-distal\tX_1\tNA\n\
chr1\t500\t600\t0.1\tNA\tTSS-proximal\tX_1\tY_1\n";

    #[test]
    fn test_parse_table() {
        let table = parse_table_reader(BufReader::new(RESULTS.as_bytes())).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.columns().len(), 5);
        let row = &table.rows()[1];
        assert_eq!(row.interval, Interval::new("chr1", 500, 600).unwrap());
        assert_eq!(row.get("padj"), &AttrValue::Missing);
        assert_eq!(row.get("log2FoldChange"), &AttrValue::Float(0.1));
        assert_eq!(row.get("region"), &AttrValue::Text("TSS-proximal".into()));
    }

    #[test]
    fn test_ragged_row_is_schema_mismatch() {
        let content = "chr\tstart\tend\ta\tb\nchr1\t1\t2\t3\n";
        let err = parse_table_reader(BufReader::new(content.as_bytes()));
        assert!(matches!(err, Err(AltreError::SchemaMismatch(_))));
    }

    #[test]
    fn test_bad_coordinate() {
        let content = "chr\tstart\tend\nchr1\tx\t2\n";
        let err = parse_table_reader(BufReader::new(content.as_bytes()));
        assert!(matches!(err, Err(AltreError::Parse { line: 2, .. })));
    }

    #[test]
    fn test_empty_input() {
        let table = parse_table_reader(BufReader::new("".as_bytes())).unwrap();
        assert!(table.is_empty());
    }
}

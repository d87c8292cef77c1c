use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Write `content` to `name` inside `dir` and return the path.
fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

fn altre() -> Command {
    Command::new(env!("CARGO_BIN_EXE_altre"))
}

#[test]
fn test_merge_then_compare() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;

    // BED is 0-based: these are 1-based [100, 200], [195, 300] and [5001, 5100].
    let ref_bed = write_file(dir.path(), "ref.bed", "chr1\t99\t200\nchr1\t5000\t5100\n");
    let alt_bed = write_file(dir.path(), "alt.bed", "chr1\t194\t300\n");
    let tss_bed = write_file(dir.path(), "tss.bed", "chr1\t399\t400\tGENE1\t0\t+\n");
    let merged = dir.path().join("merged.tsv");

    altre()
        .arg("merge")
        .arg("-p")
        .arg(format!("ref={}", ref_bed.display()))
        .arg("-p")
        .arg(format!("alt={}", alt_bed.display()))
        .arg("-t")
        .arg(&tss_bed)
        .arg("-x")
        .arg("1500")
        .arg("-o")
        .arg(&merged)
        .assert()
        .success();

    let text = fs::read_to_string(&merged)?;
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines[0],
        "chr\tstart\tend\tref_1\talt_1\tsize\tregion\tclosestGene\tdistanceToTSS"
    );
    assert_eq!(
        lines[1],
        "chr1\t100\t300\tref_1\talt_1\t200\tTSS-proximal\tGENE1\t99"
    );
    assert_eq!(lines[2], "chr1\t5001\t5100\tref_1\tNA\t99\tTSS-distal\tGENE1\t4600");

    // Append stand-in differential statistics.
    let mut results = String::new();
    for (i, line) in lines.iter().enumerate() {
        let extra = match i {
            0 => "log2FoldChange\tadjustedPValue",
            1 => "0.2\tNA",
            _ => "-3.0\t0.0001",
        };
        results.push_str(&format!("{}\t{}\n", line, extra));
    }
    let results_path = write_file(dir.path(), "results.tsv", &results);
    let table = dir.path().join("table.tsv");

    altre()
        .arg("compare")
        .arg("-r")
        .arg(&results_path)
        .arg("-s")
        .arg("ref=ref_1")
        .arg("-s")
        .arg("alt=alt_1")
        .arg("-R")
        .arg("ref")
        .arg("-o")
        .arg(&table)
        .assert()
        .success();

    let table = fs::read_to_string(&table)?;
    assert!(table.starts_with("category\tintensity\tpeak\n"));
    assert!(table.contains("ref TSS-dists\t1\t1\n"));
    assert!(table.contains("shared TSS-proxs\t1\t1\n"));
    assert!(table.contains("alt all\t0\t0\n"));
    Ok(())
}

#[test]
fn test_consensus_writes_bed() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let r1 = write_file(dir.path(), "r1.bed", "chr1\t9\t20\nchr1\t99\t200\n");
    let r2 = write_file(dir.path(), "r2.bed", "chr1\t14\t30\n");
    let out = dir.path().join("consensus.bed");

    altre()
        .arg("consensus")
        .arg("-b")
        .arg(&r1)
        .arg(&r2)
        .arg("-m")
        .arg("2")
        .arg("-o")
        .arg(&out)
        .assert()
        .success();

    assert_eq!(fs::read_to_string(&out)?, "chr1\t9\t30\n");
    Ok(())
}

#[test]
fn test_negative_merge_distance_fails() {
    let dir = TempDir::new().unwrap();
    let bed = write_file(dir.path(), "a.bed", "chr1\t0\t10\n");
    let tss = write_file(dir.path(), "tss.bed", "chr1\t4\t5\tG\n");

    altre()
        .arg("merge")
        .arg("-p")
        .arg(format!("a={}", bed.display()))
        .arg("-t")
        .arg(&tss)
        .arg("--merge-distance=-5")
        .arg("-o")
        .arg(dir.path().join("out.tsv"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("merge distance"));
}

#[test]
fn test_unknown_reference_fails() {
    let dir = TempDir::new().unwrap();
    let results = write_file(
        dir.path(),
        "results.tsv",
        "chr\tstart\tend\tlog2FoldChange\tpadj\tregion\ta_1\tb_1\n\
chr1\t1\t10\t0.1\tNA\tTSS-distal\ta_1\tb_1\n",
    );

    altre()
        .arg("compare")
        .arg("-r")
        .arg(&results)
        .arg("-s")
        .arg("a=a_1")
        .arg("-s")
        .arg("b=b_1")
        .arg("-R")
        .arg("z")
        .arg("-o")
        .arg(dir.path().join("table.tsv"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("reference sample 'z'"));
}

#[test]
fn test_missing_peak_file_fails() {
    let dir = TempDir::new().unwrap();
    let tss = write_file(dir.path(), "tss.bed", "chr1\t4\t5\tG\n");

    altre()
        .arg("merge")
        .arg("-p")
        .arg("a=/nonexistent/peaks.bed")
        .arg("-t")
        .arg(&tss)
        .arg("-o")
        .arg(dir.path().join("out.tsv"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("BED file not found"));
}

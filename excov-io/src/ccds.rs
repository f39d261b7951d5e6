//! Conversion of CCDS database dumps into interval definitions.
//!
//! A CCDS row describes one transcript (`ccds_id`) of one gene with all of its exons packed
//! into a single column, `[s-e, s-e, ...]`. Conversion explodes those into one interval per
//! exon and merges exons shared between transcripts so each unique interval appears once,
//! carrying every transcript and gene it belongs to.
use std::collections::HashMap;
use std::io::BufRead;

use excov_core::models::{Interval, Strand};

use crate::error::{BedError, Result};

/// Only rows mentioning this status are converted.
pub const PUBLIC_STATUS: &str = "Public";

/// Contigs whose transcript and gene ids are prefixed with the contig name.
pub const SEX_CONTIGS: [&str; 2] = ["X", "Y"];

const CONTIG_COLUMN: usize = 0;
const GENE_COLUMN: usize = 2;
const CCDS_ID_COLUMN: usize = 4;
const STRAND_COLUMN: usize = 6;
const LOCATIONS_COLUMN: usize = 9;

///
/// Parse a packed exon list such as `[11-18, 25-30, 32-35]` into `(start, end)` pairs.
///
pub fn parse_locations(raw: &str, line_number: usize) -> Result<Vec<(u32, u32)>> {
    let inner = raw
        .trim()
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .ok_or_else(|| BedError::parse(line_number, format!("'{}' is not a [..] list", raw)))?;

    inner
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| {
            let (start, end) = item.split_once('-').ok_or_else(|| {
                BedError::parse(line_number, format!("'{}' is not a start-end pair", item))
            })?;
            let start = start.trim().parse::<u32>().map_err(|_| {
                BedError::parse(line_number, format!("'{}' is not an integer", start))
            })?;
            let end = end.trim().parse::<u32>().map_err(|_| {
                BedError::parse(line_number, format!("'{}' is not an integer", end))
            })?;
            Ok((start, end))
        })
        .collect()
}

fn sex_prefixed(contig: &str, id: &str) -> String {
    if SEX_CONTIGS.contains(&contig) {
        format!("{}-{}", contig, id)
    } else {
        id.to_string()
    }
}

///
/// Explode one (tab split) CCDS row into its exon intervals.
///
/// Exon coordinates are taken as BED-style positions, so each interval spans
/// `start + 1 ..= end` and is named `contig-start-end` from the raw values.
///
pub fn extract_intervals(fields: &[&str], line_number: usize) -> Result<Vec<Interval>> {
    if fields.len() <= LOCATIONS_COLUMN {
        return Err(BedError::parse(
            line_number,
            format!(
                "expected at least {} columns, found {}",
                LOCATIONS_COLUMN + 1,
                fields.len()
            ),
        ));
    }

    let contig = fields[CONTIG_COLUMN];
    let strand = fields[STRAND_COLUMN]
        .parse::<Strand>()
        .map_err(|source| BedError::Interval {
            line: line_number,
            source,
        })?;
    let transcript_id = sex_prefixed(contig, fields[CCDS_ID_COLUMN]);
    let gene_id = sex_prefixed(contig, fields[GENE_COLUMN]);

    parse_locations(fields[LOCATIONS_COLUMN], line_number)?
        .into_iter()
        .map(|(start, end)| {
            let name = format!("{}-{}-{}", contig, start, end);
            Interval::new(contig, start + 1, end, name)
                .map(|interval| {
                    interval
                        .with_strand(strand)
                        .with_score(Some("0".to_string()))
                        .with_parents(vec![transcript_id.clone()], vec![gene_id.clone()])
                })
                .map_err(|source| BedError::Interval {
                    line: line_number,
                    source,
                })
        })
        .collect()
}

/// Merge identical intervals of one contig and order them by start.
fn flush_contig(batch: Vec<Interval>, out: &mut Vec<Interval>) {
    let mut merged: Vec<Interval> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for interval in batch {
        match index.get(&interval.name) {
            Some(&i) => {
                let existing = &mut merged[i];
                existing.transcript_ids.extend(interval.transcript_ids);
                existing.gene_ids.extend(interval.gene_ids);
            }
            None => {
                index.insert(interval.name.clone(), merged.len());
                merged.push(interval);
            }
        }
    }

    merged.sort_by_key(|interval| interval.start);
    if let Some(first) = merged.first() {
        log::debug!("{} unique intervals on contig {}", merged.len(), first.contig);
    }
    out.extend(merged);
}

///
/// Convert a CCDS dump into interval definitions.
///
/// The dump is expected to be sorted by contig. Non-public rows and `#` comment lines are
/// skipped. Within each contig, intervals with the same coordinates are merged into one
/// by concatenating their transcript and gene ids, and the output is sorted by start.
///
/// # Arguments
/// - reader: the CCDS text, one transcript per row
///
pub fn convert_ccds<R: BufRead>(reader: R) -> Result<Vec<Interval>> {
    let mut out = Vec::new();
    let mut batch: Vec<Interval> = Vec::new();
    let mut current_contig: Option<String> = None;

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let line_number = i + 1;
        if line.starts_with('#') || !line.contains(PUBLIC_STATUS) {
            continue;
        }

        let fields: Vec<&str> = line.trim_end().split('\t').collect();
        let intervals = extract_intervals(&fields, line_number)?;

        if current_contig.as_deref() != Some(fields[CONTIG_COLUMN]) {
            flush_contig(std::mem::take(&mut batch), &mut out);
            current_contig = Some(fields[CONTIG_COLUMN].to_string());
        }
        batch.extend(intervals);
    }
    flush_contig(batch, &mut out);
    log::info!("converted {} CCDS intervals", out.len());

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Cursor;

    use pretty_assertions::assert_eq;
    use rstest::*;

    #[fixture]
    fn ccds_text() -> &'static str {
        "#chromosome\tnc_accession\tgene\tgene_id\tccds_id\tccds_status\tcds_strand\tcds_from\tcds_to\tcds_locations\tmatch_type\n\
         1\tNC_000001.10\tOR4F5\t79501\tCCDS30547.1\tPublic\t+\t69090\t70007\t[69090-70007]\tIdentical\n\
         1\tNC_000001.10\tSAMD11\t148398\tCCDS2.2\tPublic\t+\t861321\t879532\t[861321-861392, 865534-865715]\tIdentical\n\
         1\tNC_000001.10\tSAMD11\t148398\tCCDS3.1\tPublic\t+\t861321\t879532\t[861321-861392, 866418-866468]\tIdentical\n\
         1\tNC_000001.10\tNOC2L\t26155\tCCDS4.1\tWithdrawn\t-\t880073\t894619\t[880073-880179]\tIdentical\n\
         X\tNC_000023.10\tPLCXD1\t55344\tCCDS14119.1\tPublic\t+\t192990\t220022\t[192990-193060]\tIdentical\n"
    }

    #[rstest]
    fn test_parse_locations() {
        assert_eq!(
            parse_locations("[11-18, 25-30, 32-35]", 1).unwrap(),
            vec![(11, 18), (25, 30), (32, 35)]
        );
    }

    #[rstest]
    #[case("11-18")]
    #[case("[11:18]")]
    #[case("[11-x]")]
    fn test_parse_locations_rejects_malformed(#[case] raw: &str) {
        assert!(matches!(
            parse_locations(raw, 4),
            Err(BedError::Parse { line: 4, .. })
        ));
    }

    #[rstest]
    fn test_convert_skips_non_public_rows(ccds_text: &str) {
        let intervals = convert_ccds(Cursor::new(ccds_text)).unwrap();
        assert!(intervals.iter().all(|i| !i.gene_ids.contains(&"NOC2L".to_string())));
    }

    #[rstest]
    fn test_convert_merges_shared_exons(ccds_text: &str) {
        let intervals = convert_ccds(Cursor::new(ccds_text)).unwrap();
        let names: Vec<&str> = intervals.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "1-69090-70007",
                "1-861321-861392",
                "1-865534-865715",
                "1-866418-866468",
                "X-192990-193060",
            ]
        );

        let shared = &intervals[1];
        assert_eq!(shared.start, 861322);
        assert_eq!(shared.end, 861392);
        assert_eq!(shared.transcript_ids, vec!["CCDS2.2", "CCDS3.1"]);
        assert_eq!(shared.gene_ids, vec!["SAMD11", "SAMD11"]);
    }

    #[rstest]
    fn test_convert_prefixes_sex_contig_ids(ccds_text: &str) {
        let intervals = convert_ccds(Cursor::new(ccds_text)).unwrap();
        let last = intervals.last().unwrap();
        assert_eq!(last.transcript_ids, vec!["X-CCDS14119.1"]);
        assert_eq!(last.gene_ids, vec!["X-PLCXD1"]);
    }

    #[rstest]
    fn test_convert_rejects_short_rows() {
        let result = convert_ccds(Cursor::new("1\tNC\tGENE\t1\tCCDS1\tPublic\t+\n"));
        assert!(matches!(result, Err(BedError::Parse { line: 1, .. })));
    }
}

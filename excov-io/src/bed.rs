use std::io::{BufRead, Write};
use std::path::Path;

use excov_core::models::{Interval, Strand};
use excov_core::utils::{get_dynamic_writer, get_input_reader};

use crate::error::{BedError, Result};

/// Separator for lists of parent ids within one column.
pub const ID_DELIMITER: char = ',';

///
/// `true` for lines that carry no interval: blanks, comments and UCSC `track`/`browser` lines.
///
pub fn is_comment(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.is_empty()
        || trimmed.starts_with('#')
        || trimmed.starts_with("track")
        || trimmed.starts_with("browser")
}

fn split_ids(field: Option<&str>) -> Vec<String> {
    field
        .map(|ids| {
            ids.split(ID_DELIMITER)
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

fn non_empty(field: Option<&str>) -> Option<&str> {
    field.filter(|f| !f.is_empty() && *f != ".")
}

///
/// Parse one interval-definition row.
///
/// Columns: `contig start end [name [score [strand [transcript_ids [gene_ids]]]]]`, tab
/// separated, with BED-style 0-based half-open coordinates. The result is 1-based and
/// closed (`start + 1`, `end`).
///
/// # Arguments
/// - line: the raw row, without trailing newline
/// - line_number: 1-based line number, used in error messages
/// - contig_prefix: prepended to the contig name (e.g. `chr`)
///
pub fn parse_interval_line(line: &str, line_number: usize, contig_prefix: &str) -> Result<Interval> {
    let fields: Vec<&str> = line.trim_end_matches(['\r', '\n']).split('\t').collect();
    if fields.len() < 3 {
        return Err(BedError::parse(
            line_number,
            format!("expected at least 3 tab-separated columns, found {}", fields.len()),
        ));
    }

    let bed_start: u32 = fields[1].trim().parse().map_err(|_| {
        BedError::parse(line_number, format!("start '{}' is not an integer", fields[1]))
    })?;
    let bed_end: u32 = fields[2].trim().parse().map_err(|_| {
        BedError::parse(line_number, format!("end '{}' is not an integer", fields[2]))
    })?;

    let contig = format!("{}{}", contig_prefix, fields[0]);
    // 0-based half-open -> 1-based closed
    let start = bed_start.checked_add(1).ok_or_else(|| {
        BedError::parse(line_number, format!("start {} is out of range", bed_start))
    })?;
    let end = bed_end;

    let name = match non_empty(fields.get(3).copied()) {
        Some(name) => name.to_string(),
        None => format!("{}-{}-{}", contig, start, end),
    };
    let score = non_empty(fields.get(4).copied()).map(String::from);
    let strand = match fields.get(5) {
        Some(raw) => raw
            .trim()
            .parse::<Strand>()
            .map_err(|source| BedError::Interval {
                line: line_number,
                source,
            })?,
        None => Strand::Unknown,
    };

    let interval = Interval::new(contig, start, end, name)
        .map_err(|source| BedError::Interval {
            line: line_number,
            source,
        })?
        .with_score(score)
        .with_strand(strand)
        .with_parents(
            split_ids(fields.get(6).copied()),
            split_ids(fields.get(7).copied()),
        );

    Ok(interval)
}

///
/// Format an interval as an interval-definition row (0-based half-open coordinates).
///
pub fn interval_to_bed_line(interval: &Interval) -> String {
    format!(
        "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
        interval.contig,
        interval.start - 1,
        interval.end,
        interval.name,
        interval.score.as_deref().unwrap_or("0"),
        interval.strand,
        interval.transcript_ids.join(","),
        interval.gene_ids.join(","),
    )
}

///
/// Streaming reader of interval definitions.
///
/// Yields one [`Interval`] per data row, skipping comments. Parsing errors carry the
/// line number and do not stop the iterator, the caller decides whether to go on.
///
pub struct BedReader<R: BufRead> {
    lines: std::io::Lines<R>,
    line_number: usize,
    contig_prefix: String,
}

impl<R: BufRead> BedReader<R> {
    pub fn new(reader: R) -> Self {
        BedReader {
            lines: reader.lines(),
            line_number: 0,
            contig_prefix: String::new(),
        }
    }

    pub fn with_contig_prefix<P: Into<String>>(mut self, prefix: P) -> Self {
        self.contig_prefix = prefix.into();
        self
    }
}

impl BedReader<Box<dyn BufRead>> {
    /// Open a (possibly gzip'd) file, or stdin for `-`.
    pub fn from_path(path: &Path) -> Result<Self> {
        Ok(BedReader::new(get_input_reader(path)?))
    }
}

impl<R: BufRead> Iterator for BedReader<R> {
    type Item = Result<Interval>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(err) => return Some(Err(BedError::Io(err))),
            };
            self.line_number += 1;

            if is_comment(&line) {
                continue;
            }
            return Some(parse_interval_line(
                &line,
                self.line_number,
                &self.contig_prefix,
            ));
        }
    }
}

///
/// Read all intervals from a file, failing on the first malformed row.
///
pub fn read_intervals<P: AsRef<Path>>(path: P, contig_prefix: &str) -> Result<Vec<Interval>> {
    BedReader::from_path(path.as_ref())?
        .with_contig_prefix(contig_prefix)
        .collect()
}

pub trait BedWrite {
    ///
    /// Write intervals to any writer as interval-definition rows
    ///
    /// # Arguments
    /// - writer: destination
    fn write_bed_to<W: Write>(&self, writer: &mut W) -> std::io::Result<()>;

    ///
    /// Write data to disk as bed file (bed.gz if the path ends in `.gz`)
    ///
    /// # Arguments
    /// - path: the path to the file to dump to
    fn write_bed<T: AsRef<Path>>(&self, path: T) -> std::io::Result<()> {
        let mut writer = get_dynamic_writer(Some(path.as_ref()))?;
        self.write_bed_to(&mut writer)?;
        writer.flush()
    }
}

impl BedWrite for [Interval] {
    fn write_bed_to<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        for interval in self {
            writeln!(writer, "{}", interval_to_bed_line(interval))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Cursor;

    use excov_core::models::Span;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[fixture]
    fn bed_text() -> &'static str {
        "#contig\tstart\tend\tname\tscore\tstrand\ttranscripts\tgenes\n\
         track name=exons\n\
         1\t69089\t70008\t1-69090-70008\t0\t+\tCCDS30547.1\tOR4F5\n\
         \n\
         1\t367658\t368597\t1-367659-368597\t0\t+\tCCDS41220.1,CCDS41221.1\tOR4F29,OR4F16\n"
    }

    #[rstest]
    fn test_reader_skips_comments_and_converts_coordinates(bed_text: &str) {
        let intervals: Vec<Interval> = BedReader::new(Cursor::new(bed_text))
            .collect::<Result<_>>()
            .unwrap();

        assert_eq!(intervals.len(), 2);
        assert_eq!(intervals[0].contig, "1");
        assert_eq!(intervals[0].start, 69090);
        assert_eq!(intervals[0].end, 70008);
        assert_eq!(intervals[0].strand, Strand::Forward);
        assert_eq!(intervals[1].transcript_ids, vec!["CCDS41220.1", "CCDS41221.1"]);
        assert_eq!(intervals[1].gene_ids, vec!["OR4F29", "OR4F16"]);
    }

    #[rstest]
    fn test_reader_applies_contig_prefix(bed_text: &str) {
        let first = BedReader::new(Cursor::new(bed_text))
            .with_contig_prefix("chr")
            .next()
            .unwrap()
            .unwrap();
        assert_eq!(first.contig, "chr1");
    }

    #[rstest]
    fn test_minimal_row_gets_generated_name() {
        let interval = parse_interval_line("chrX\t9\t20", 1, "").unwrap();
        assert_eq!(interval.name, "chrX-10-20");
        assert_eq!(interval.length(), 11);
        assert!(interval.transcript_ids.is_empty());
    }

    #[rstest]
    #[case("chr1\t10", 3)]
    #[case("chr1\tten\t20", 4)]
    #[case("chr1\t10\tx", 5)]
    #[case("chr1\t4294967295\t4294967295", 6)]
    fn test_malformed_rows_report_line(#[case] line: &str, #[case] line_number: usize) {
        match parse_interval_line(line, line_number, "") {
            Err(BedError::Parse { line, .. }) => assert_eq!(line, line_number),
            other => panic!("expected a parse error, got {:?}", other),
        }
    }

    #[rstest]
    fn test_zero_length_row_is_rejected() {
        let result = parse_interval_line("chr1\t10\t10\tempty", 7, "");
        assert!(matches!(result, Err(BedError::Interval { line: 7, .. })));
    }

    #[rstest]
    fn test_invalid_strand_is_rejected() {
        let result = parse_interval_line("chr1\t10\t20\tx\t0\t*", 2, "");
        assert!(matches!(result, Err(BedError::Interval { line: 2, .. })));
    }

    #[rstest]
    fn test_write_then_read_keeps_intervals(bed_text: &str) {
        let intervals: Vec<Interval> = BedReader::new(Cursor::new(bed_text))
            .collect::<Result<_>>()
            .unwrap();

        let tempdir = tempfile::tempdir().unwrap();
        let path = tempdir.path().join("exons.bed.gz");
        intervals.write_bed(&path).unwrap();

        let reread = read_intervals(&path, "").unwrap();
        assert_eq!(reread, intervals);
    }

    #[rstest]
    fn test_bed_line_is_zero_based() {
        let interval = Interval::new("chr1", 1, 5, "e1").unwrap();
        assert_eq!(interval_to_bed_line(&interval), "chr1\t0\t5\te1\t0\t.\t\t");
    }
}

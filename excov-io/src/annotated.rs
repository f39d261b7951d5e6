use std::io::{BufRead, Write};
use std::path::Path;

use excov_core::models::{Annotation, MetricName};
use excov_core::utils::get_input_reader;

use crate::bed::{interval_to_bed_line, is_comment, parse_interval_line};
use crate::error::{BedError, Result};

/// Number of interval-definition columns in front of the metric columns.
pub const DEFINITION_COLUMNS: usize = 8;

const DEFINITION_HEADER: &str =
    "#contig\tstart\tend\tname\tscore\tstrand\ttranscript_ids\tgene_ids";

///
/// Header line naming every column, the metric columns in output order.
///
pub fn annotation_header(thresholds: &[u32]) -> String {
    let metrics: Vec<String> = MetricName::for_thresholds(thresholds)
        .iter()
        .map(|m| m.to_string())
        .collect();
    format!("{}\t{}", DEFINITION_HEADER, metrics.join("\t"))
}

///
/// Writes annotations as interval-definition rows followed by `mean_coverage` and one
/// `completeness_<t>` column per threshold.
///
/// The first threshold is the run's cutoff, so reading the file back restores
/// [`Annotation::completeness`] from the first completeness column.
///
pub struct AnnotationWriter<W: Write> {
    inner: W,
    thresholds: Vec<u32>,
    header_written: bool,
}

impl<W: Write> AnnotationWriter<W> {
    pub fn new(inner: W, thresholds: &[u32]) -> Self {
        AnnotationWriter {
            inner,
            thresholds: thresholds.to_vec(),
            header_written: false,
        }
    }

    pub fn write(&mut self, annotation: &Annotation) -> std::io::Result<()> {
        if !self.header_written {
            writeln!(self.inner, "{}", annotation_header(&self.thresholds))?;
            self.header_written = true;
        }

        write!(
            self.inner,
            "{}\t{}",
            interval_to_bed_line(&annotation.interval),
            annotation.coverage
        )?;
        for threshold in &self.thresholds {
            let value = annotation
                .levels
                .iter()
                .find(|(t, _)| t == threshold)
                .map(|(_, v)| *v)
                .ok_or_else(|| {
                    std::io::Error::other(format!(
                        "annotation for {} has no completeness at threshold {}",
                        annotation.interval.name, threshold
                    ))
                })?;
            write!(self.inner, "\t{}", value)?;
        }
        writeln!(self.inner)
    }

    /// Flush and hand back the underlying writer.
    pub fn finish(mut self) -> std::io::Result<W> {
        if !self.header_written {
            writeln!(self.inner, "{}", annotation_header(&self.thresholds))?;
        }
        self.inner.flush()?;
        Ok(self.inner)
    }
}

fn parse_header(line: &str) -> Result<Vec<u32>> {
    let columns: Vec<&str> = line.trim_end().split('\t').collect();
    if columns.len() < DEFINITION_COLUMNS + 2 {
        return Err(BedError::Header(line.to_string()));
    }

    let metrics = columns[DEFINITION_COLUMNS..]
        .iter()
        .map(|c| c.parse::<MetricName>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| BedError::Header(e.to_string()))?;

    if metrics[0] != MetricName::MeanCoverage {
        return Err(BedError::Header(format!(
            "first metric column must be {}, found {}",
            MetricName::MeanCoverage,
            metrics[0]
        )));
    }
    metrics[1..]
        .iter()
        .map(|m| match m {
            MetricName::Completeness(t) => Ok(*t),
            other => Err(BedError::Header(format!("unexpected metric column {}", other))),
        })
        .collect()
}

///
/// Reader for files produced by [`AnnotationWriter`].
///
pub struct AnnotationReader<R: BufRead> {
    lines: std::io::Lines<R>,
    line_number: usize,
    thresholds: Vec<u32>,
}

impl<R: BufRead> AnnotationReader<R> {
    ///
    /// Wrap a reader, consuming lines up to and including the metric header.
    ///
    pub fn new(reader: R) -> Result<Self> {
        let mut lines = reader.lines();
        let mut line_number = 0;
        loop {
            let line = lines
                .next()
                .ok_or_else(|| BedError::Header("empty input".to_string()))??;
            line_number += 1;
            if line.trim().is_empty() {
                continue;
            }
            if !line.starts_with('#') {
                return Err(BedError::Header(format!(
                    "expected a '#' header on line {}",
                    line_number
                )));
            }
            let thresholds = parse_header(&line)?;
            return Ok(AnnotationReader {
                lines,
                line_number,
                thresholds,
            });
        }
    }

    /// Completeness thresholds named in the header, in column order.
    pub fn thresholds(&self) -> &[u32] {
        &self.thresholds
    }

    fn parse_row(&self, line: &str) -> Result<Annotation> {
        let fields: Vec<&str> = line.trim_end_matches(['\r', '\n']).split('\t').collect();
        let expected = DEFINITION_COLUMNS + 1 + self.thresholds.len();
        if fields.len() != expected {
            return Err(BedError::parse(
                self.line_number,
                format!("expected {} columns, found {}", expected, fields.len()),
            ));
        }

        let interval = parse_interval_line(
            &fields[..DEFINITION_COLUMNS].join("\t"),
            self.line_number,
            "",
        )?;

        let mut values = Vec::with_capacity(expected - DEFINITION_COLUMNS);
        for raw in &fields[DEFINITION_COLUMNS..] {
            let value: f64 = raw.parse().map_err(|_| {
                BedError::parse(self.line_number, format!("'{}' is not a number", raw))
            })?;
            values.push(value);
        }

        let levels: Vec<(u32, f64)> = self
            .thresholds
            .iter()
            .copied()
            .zip(values[1..].iter().copied())
            .collect();

        Ok(Annotation {
            interval,
            coverage: values[0],
            completeness: levels[0].1,
            levels,
        })
    }
}

impl AnnotationReader<Box<dyn BufRead>> {
    pub fn from_path(path: &Path) -> Result<Self> {
        AnnotationReader::new(get_input_reader(path)?)
    }
}

impl<R: BufRead> Iterator for AnnotationReader<R> {
    type Item = Result<Annotation>;

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
            return Some(self.parse_row(&line));
        }
    }
}

use excov_core::models::{Level, Sample};
use rusqlite::params_from_iter;

use crate::error::Result;
use crate::store::{SqliteStore, row_to_sample, statistic_table};

/// Mean of one metric over all transcripts of a sample.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct MetricSummary {
    pub sample_id: String,
    pub metric: String,
    pub value: f64,
}

/// One metric of one gene in one sample.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct GeneMetric {
    pub gene_id: String,
    pub sample_id: String,
    pub metric: String,
    pub value: f64,
}

/// `column IN (?, ?, ...)`, or nothing for an empty filter.
fn in_clause(column: &str, values: &[String]) -> Option<String> {
    if values.is_empty() {
        return None;
    }
    let marks = vec!["?"; values.len()].join(", ");
    Some(format!("{} IN ({})", column, marks))
}

fn where_clause(conditions: &[Option<String>]) -> String {
    let conditions: Vec<&str> = conditions.iter().flatten().map(String::as_str).collect();
    if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    }
}

impl SqliteStore {
    ///
    /// Per sample, the mean of every transcript-level metric.
    ///
    /// # Arguments
    /// - sample_ids: restrict to these samples, all samples when empty
    ///
    pub fn mean_metrics(&self, sample_ids: &[String]) -> Result<Vec<MetricSummary>> {
        let sql = format!(
            "SELECT sample_id, metric, AVG(value) FROM {} {}
             GROUP BY sample_id, metric ORDER BY sample_id, metric",
            statistic_table(Level::Transcript),
            where_clause(&[in_clause("sample_id", sample_ids)]),
        );
        let mut select = self.connection().prepare(&sql)?;
        let rows = select
            .query_map(params_from_iter(sample_ids), |row| {
                Ok(MetricSummary {
                    sample_id: row.get(0)?,
                    metric: row.get(1)?,
                    value: row.get(2)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    ///
    /// Metric values of genes, per sample.
    ///
    /// # Arguments
    /// - gene_ids: restrict to these genes, all genes when empty
    /// - sample_ids: restrict to these samples, all samples when empty
    ///
    pub fn gene_metrics(&self, gene_ids: &[String], sample_ids: &[String]) -> Result<Vec<GeneMetric>> {
        let sql = format!(
            "SELECT entity_id, sample_id, metric, value FROM {} {}
             ORDER BY entity_id, sample_id, metric",
            statistic_table(Level::Gene),
            where_clause(&[
                in_clause("entity_id", gene_ids),
                in_clause("sample_id", sample_ids),
            ]),
        );
        let mut select = self.connection().prepare(&sql)?;
        let rows = select
            .query_map(params_from_iter(gene_ids.iter().chain(sample_ids)), |row| {
                Ok(GeneMetric {
                    gene_id: row.get(0)?,
                    sample_id: row.get(1)?,
                    metric: row.get(2)?,
                    value: row.get(3)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    ///
    /// Stored samples ordered by id, optionally only those of one group.
    ///
    pub fn samples(&self, group_id: Option<&str>) -> Result<Vec<Sample>> {
        let group: Vec<String> = group_id.map(str::to_string).into_iter().collect();
        let sql = format!(
            "SELECT id, group_id, source, cutoff, extension, created_at FROM sample {} ORDER BY id",
            where_clause(&[group_id.map(|_| "group_id = ?".to_string())]),
        );
        let mut select = self.connection().prepare(&sql)?;
        let samples = select
            .query_map(params_from_iter(&group), row_to_sample)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(samples)
    }
}

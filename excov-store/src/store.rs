use std::path::Path;

use rusqlite::{Connection, OptionalExtension, Transaction};

use excov_core::models::{Exon, Gene, Level, MetricName, Sample, Statistic, Strand, Transcript};

use crate::error::{Result, StoreError};

///
/// Persistence for elements, samples and their statistics.
///
/// `add_*` methods only queue rows. Nothing reaches storage before [`Store::save`], which
/// writes every queued row in one transaction, or none of them.
///
pub trait Store {
    fn add_gene(&mut self, gene: Gene);
    fn add_transcript(&mut self, transcript: Transcript);
    fn add_exon(&mut self, exon: Exon);
    /// Relate an exon to one of the transcripts it belongs to.
    fn add_relation(&mut self, exon_id: &str, transcript_id: &str);
    fn add_sample(&mut self, sample: Sample);
    ///
    /// Queue a sample that takes the place of any stored sample with the same id. The old
    /// sample and all of its statistics are deleted by the same [`Store::save`] that
    /// writes the new rows, so a failed save keeps the old sample.
    ///
    fn replace_sample(&mut self, sample: Sample);
    /// Queue statistic rows for one level of the hierarchy.
    fn add(&mut self, level: Level, statistics: Vec<Statistic>);

    ///
    /// Write all queued rows atomically. The queue is empty afterwards, whether or not
    /// the write succeeded.
    ///
    /// # Errors
    /// [`StoreError::Integrity`] if a row conflicts with an existing one, e.g. a second
    /// value for the same (sample, entity, metric).
    ///
    fn save(&mut self) -> Result<()>;

    /// Drop every queued row.
    fn discard(&mut self);

    fn genes(&self) -> Result<Vec<Gene>>;
    fn transcripts(&self) -> Result<Vec<Transcript>>;
    fn exons(&self) -> Result<Vec<Exon>>;
    /// All `(exon_id, transcript_id)` relations.
    fn relations(&self) -> Result<Vec<(String, String)>>;
    fn sample(&self, sample_id: &str) -> Result<Option<Sample>>;
    fn statistics(&self, level: Level, sample_id: &str) -> Result<Vec<Statistic>>;

    /// Delete a sample with all of its statistics. Returns `false` if it did not exist.
    fn delete_sample(&mut self, sample_id: &str) -> Result<bool>;
}

/// Table holding the statistics of one level.
pub fn statistic_table(level: Level) -> &'static str {
    match level {
        Level::Exon => "exon_statistic",
        Level::Transcript => "transcript_statistic",
        Level::Gene => "gene_statistic",
    }
}

const LEVELS: [Level; 3] = [Level::Exon, Level::Transcript, Level::Gene];

#[derive(Debug, Default)]
struct Pending {
    genes: Vec<Gene>,
    transcripts: Vec<Transcript>,
    exons: Vec<Exon>,
    relations: Vec<(String, String)>,
    samples: Vec<Sample>,
    replaced: Vec<String>,
    statistics: Vec<(Level, Statistic)>,
}

impl Pending {
    fn len(&self) -> usize {
        self.genes.len()
            + self.transcripts.len()
            + self.exons.len()
            + self.relations.len()
            + self.samples.len()
            + self.replaced.len()
            + self.statistics.len()
    }
}

///
/// [`Store`] backed by an SQLite database.
///
pub struct SqliteStore {
    connection: Connection,
    pending: Pending,
}

impl SqliteStore {
    ///
    /// Open (or create) a database file and make sure all tables exist.
    ///
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let connection = Connection::open(path)?;
        Self::from_connection(connection)
    }

    /// A private, in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(connection: Connection) -> Result<Self> {
        connection.execute_batch("PRAGMA foreign_keys = ON;")?;
        let store = SqliteStore {
            connection,
            pending: Pending::default(),
        };
        store.set_up()?;
        Ok(store)
    }

    pub(crate) fn connection(&self) -> &Connection {
        &self.connection
    }

    ///
    /// Create any missing tables.
    ///
    pub fn set_up(&self) -> Result<()> {
        self.connection.execute(
            "CREATE TABLE IF NOT EXISTS gene (
                id TEXT PRIMARY KEY,
                chromosome TEXT NOT NULL,
                start_pos INTEGER NOT NULL,
                end_pos INTEGER NOT NULL
            ) STRICT",
            (),
        )?;
        self.connection.execute(
            "CREATE TABLE IF NOT EXISTS transcript (
                id TEXT PRIMARY KEY,
                chromosome TEXT NOT NULL,
                gene_id TEXT NOT NULL REFERENCES gene(id),
                start_pos INTEGER NOT NULL,
                end_pos INTEGER NOT NULL
            ) STRICT",
            (),
        )?;
        self.connection.execute(
            "CREATE TABLE IF NOT EXISTS exon (
                id TEXT PRIMARY KEY,
                chromosome TEXT NOT NULL,
                start_pos INTEGER NOT NULL,
                end_pos INTEGER NOT NULL,
                strand TEXT NOT NULL
            ) STRICT",
            (),
        )?;
        self.connection.execute(
            "CREATE TABLE IF NOT EXISTS exon_transcript (
                exon_id TEXT NOT NULL REFERENCES exon(id),
                transcript_id TEXT NOT NULL REFERENCES transcript(id),
                PRIMARY KEY (exon_id, transcript_id)
            ) STRICT",
            (),
        )?;
        self.connection.execute(
            "CREATE TABLE IF NOT EXISTS sample (
                id TEXT PRIMARY KEY,
                group_id TEXT,
                source TEXT,
                cutoff INTEGER,
                extension INTEGER,
                created_at TEXT NOT NULL
            ) STRICT",
            (),
        )?;
        for level in LEVELS {
            self.connection.execute(
                &format!(
                    "CREATE TABLE IF NOT EXISTS {table} (
                        id INTEGER PRIMARY KEY,
                        metric TEXT NOT NULL,
                        value REAL NOT NULL,
                        sample_id TEXT NOT NULL REFERENCES sample(id) ON DELETE CASCADE,
                        entity_id TEXT NOT NULL REFERENCES {level}(id),
                        UNIQUE (sample_id, entity_id, metric)
                    ) STRICT",
                    table = statistic_table(level),
                    level = level,
                ),
                (),
            )?;
        }
        Ok(())
    }

    ///
    /// Drop every table, losing all data.
    ///
    pub fn tear_down(&self) -> Result<()> {
        let mut tables: Vec<&str> = LEVELS.iter().rev().map(|l| statistic_table(*l)).collect();
        tables.extend(["sample", "exon_transcript", "exon", "transcript", "gene"]);
        for table in tables {
            self.connection
                .execute(&format!("DROP TABLE IF EXISTS {}", table), ())?;
        }
        Ok(())
    }

    /// Drop and recreate all tables.
    pub fn reset(&mut self) -> Result<()> {
        self.discard();
        self.tear_down()?;
        self.set_up()
    }

    ///
    /// Delete every sample of a group with their statistics. Returns the number of samples.
    ///
    pub fn delete_group(&mut self, group_id: &str) -> Result<usize> {
        let deleted = self
            .connection
            .execute("DELETE FROM sample WHERE group_id = ?1", (group_id,))?;
        log::info!("deleted {} samples of group {}", deleted, group_id);
        Ok(deleted)
    }

    fn insert_pending(transaction: &Transaction, pending: &Pending) -> rusqlite::Result<()> {
        {
            let mut delete = transaction.prepare("DELETE FROM sample WHERE id = ?1")?;
            for sample_id in &pending.replaced {
                delete.execute((sample_id,))?;
            }
        }
        {
            let mut insert = transaction.prepare(
                "INSERT INTO gene(id, chromosome, start_pos, end_pos) VALUES (?1, ?2, ?3, ?4)",
            )?;
            for gene in &pending.genes {
                insert.execute((&gene.id, &gene.chromosome, gene.start, gene.end))?;
            }
        }
        {
            let mut insert = transaction.prepare(
                "INSERT INTO transcript(id, chromosome, gene_id, start_pos, end_pos)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for transcript in &pending.transcripts {
                insert.execute((
                    &transcript.id,
                    &transcript.chromosome,
                    &transcript.gene_id,
                    transcript.start,
                    transcript.end,
                ))?;
            }
        }
        {
            let mut insert = transaction.prepare(
                "INSERT INTO exon(id, chromosome, start_pos, end_pos, strand)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for exon in &pending.exons {
                insert.execute((
                    &exon.id,
                    &exon.chromosome,
                    exon.start,
                    exon.end,
                    exon.strand.to_string(),
                ))?;
            }
        }
        {
            let mut insert = transaction
                .prepare("INSERT INTO exon_transcript(exon_id, transcript_id) VALUES (?1, ?2)")?;
            for (exon_id, transcript_id) in &pending.relations {
                insert.execute((exon_id, transcript_id))?;
            }
        }
        {
            let mut insert = transaction.prepare(
                "INSERT INTO sample(id, group_id, source, cutoff, extension, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, COALESCE(?6, CURRENT_TIMESTAMP))",
            )?;
            for sample in &pending.samples {
                insert.execute((
                    &sample.id,
                    &sample.group_id,
                    &sample.source,
                    sample.cutoff,
                    sample.extension,
                    &sample.created_at,
                ))?;
            }
        }
        for level in LEVELS {
            let mut insert = transaction.prepare(&format!(
                "INSERT INTO {}(metric, value, sample_id, entity_id) VALUES (?1, ?2, ?3, ?4)",
                statistic_table(level)
            ))?;
            for (_, statistic) in pending.statistics.iter().filter(|(l, _)| *l == level) {
                insert.execute((
                    statistic.metric.to_string(),
                    statistic.value,
                    &statistic.sample_id,
                    &statistic.entity_id,
                ))?;
            }
        }
        Ok(())
    }
}

impl Store for SqliteStore {
    fn add_gene(&mut self, gene: Gene) {
        self.pending.genes.push(gene);
    }

    fn add_transcript(&mut self, transcript: Transcript) {
        self.pending.transcripts.push(transcript);
    }

    fn add_exon(&mut self, exon: Exon) {
        self.pending.exons.push(exon);
    }

    fn add_relation(&mut self, exon_id: &str, transcript_id: &str) {
        self.pending
            .relations
            .push((exon_id.to_string(), transcript_id.to_string()));
    }

    fn add_sample(&mut self, sample: Sample) {
        self.pending.samples.push(sample);
    }

    fn replace_sample(&mut self, sample: Sample) {
        self.pending.replaced.push(sample.id.clone());
        self.pending.samples.push(sample);
    }

    fn add(&mut self, level: Level, statistics: Vec<Statistic>) {
        self.pending
            .statistics
            .extend(statistics.into_iter().map(|s| (level, s)));
    }

    fn save(&mut self) -> Result<()> {
        let pending = std::mem::take(&mut self.pending);
        let rows = pending.len();
        if rows == 0 {
            return Ok(());
        }

        let transaction = self.connection.transaction()?;
        Self::insert_pending(&transaction, &pending).map_err(StoreError::from_sqlite)?;
        transaction.commit().map_err(StoreError::from_sqlite)?;
        log::debug!("committed {} rows", rows);
        Ok(())
    }

    fn discard(&mut self) {
        self.pending = Pending::default();
    }

    fn genes(&self) -> Result<Vec<Gene>> {
        let mut select = self
            .connection
            .prepare("SELECT id, chromosome, start_pos, end_pos FROM gene ORDER BY id")?;
        let genes = select
            .query_map((), |row| {
                Ok(Gene {
                    id: row.get(0)?,
                    chromosome: row.get(1)?,
                    start: row.get(2)?,
                    end: row.get(3)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(genes)
    }

    fn transcripts(&self) -> Result<Vec<Transcript>> {
        let mut select = self.connection.prepare(
            "SELECT id, chromosome, gene_id, start_pos, end_pos FROM transcript ORDER BY id",
        )?;
        let transcripts = select
            .query_map((), |row| {
                Ok(Transcript {
                    id: row.get(0)?,
                    chromosome: row.get(1)?,
                    gene_id: row.get(2)?,
                    start: row.get(3)?,
                    end: row.get(4)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(transcripts)
    }

    fn exons(&self) -> Result<Vec<Exon>> {
        let mut select = self.connection.prepare(
            "SELECT id, chromosome, start_pos, end_pos, strand FROM exon ORDER BY id",
        )?;
        let rows = select
            .query_map((), |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, u32>(2)?,
                    row.get::<_, u32>(3)?,
                    row.get::<_, String>(4)?,
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        rows.into_iter()
            .map(|(id, chromosome, start, end, strand)| -> Result<Exon> {
                Ok(Exon {
                    id,
                    chromosome,
                    start,
                    end,
                    strand: strand.parse::<Strand>()?,
                })
            })
            .collect()
    }

    fn relations(&self) -> Result<Vec<(String, String)>> {
        let mut select = self.connection.prepare(
            "SELECT exon_id, transcript_id FROM exon_transcript ORDER BY exon_id, transcript_id",
        )?;
        let relations = select
            .query_map((), |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(relations)
    }

    fn sample(&self, sample_id: &str) -> Result<Option<Sample>> {
        let sample = self
            .connection
            .query_row(
                "SELECT id, group_id, source, cutoff, extension, created_at
                 FROM sample WHERE id = ?1",
                (sample_id,),
                row_to_sample,
            )
            .optional()?;
        Ok(sample)
    }

    fn statistics(&self, level: Level, sample_id: &str) -> Result<Vec<Statistic>> {
        let mut select = self.connection.prepare(&format!(
            "SELECT metric, value, entity_id FROM {} WHERE sample_id = ?1 ORDER BY entity_id, metric",
            statistic_table(level)
        ))?;
        let rows = select
            .query_map((sample_id,), |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, f64>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        rows.into_iter()
            .map(|(metric, value, entity_id)| -> Result<Statistic> {
                Ok(Statistic::new(
                    metric.parse::<MetricName>()?,
                    value,
                    sample_id,
                    entity_id,
                ))
            })
            .collect()
    }

    fn delete_sample(&mut self, sample_id: &str) -> Result<bool> {
        let deleted = self
            .connection
            .execute("DELETE FROM sample WHERE id = ?1", (sample_id,))?;
        if deleted > 0 {
            log::info!("deleted sample {}", sample_id);
        }
        Ok(deleted > 0)
    }
}

pub(crate) fn row_to_sample(row: &rusqlite::Row) -> rusqlite::Result<Sample> {
    Ok(Sample {
        id: row.get(0)?,
        group_id: row.get(1)?,
        source: row.get(2)?,
        cutoff: row.get(3)?,
        extension: row.get(4)?,
        created_at: row.get(5)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    #[fixture]
    fn store() -> SqliteStore {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store.add_gene(Gene {
            id: "GENE1".into(),
            chromosome: "1".into(),
            start: 1,
            end: 40,
        });
        store.add_transcript(Transcript {
            id: "TX1".into(),
            chromosome: "1".into(),
            gene_id: "GENE1".into(),
            start: 1,
            end: 40,
        });
        store.add_exon(Exon {
            id: "1-1-10".into(),
            chromosome: "1".into(),
            start: 1,
            end: 10,
            strand: Strand::Forward,
        });
        store.add_relation("1-1-10", "TX1");
        store.save().unwrap();
        store
    }

    #[rstest]
    fn test_elements_round_trip(store: SqliteStore) {
        assert_eq!(store.genes().unwrap()[0].end, 40);
        assert_eq!(store.transcripts().unwrap()[0].gene_id, "GENE1");
        assert_eq!(store.exons().unwrap()[0].strand, Strand::Forward);
        assert_eq!(
            store.relations().unwrap(),
            vec![("1-1-10".to_string(), "TX1".to_string())]
        );
    }

    #[rstest]
    fn test_sample_gets_timestamp(mut store: SqliteStore) {
        let mut sample = Sample::new("s1");
        sample.group_id = Some("batch-1".into());
        sample.cutoff = Some(10);
        store.add_sample(sample);
        store.save().unwrap();

        let stored = store.sample("s1").unwrap().unwrap();
        assert_eq!(stored.group_id.as_deref(), Some("batch-1"));
        assert_eq!(stored.cutoff, Some(10));
        assert!(stored.created_at.is_some());
        assert!(store.sample("nope").unwrap().is_none());
    }

    #[rstest]
    fn test_duplicate_statistic_is_integrity_error(mut store: SqliteStore) {
        store.add_sample(Sample::new("s1"));
        store.save().unwrap();

        let row = Statistic::new(MetricName::MeanCoverage, 5.0, "s1", "TX1");
        store.add(Level::Transcript, vec![row.clone()]);
        store.save().unwrap();

        store.add(
            Level::Transcript,
            vec![
                Statistic::new(MetricName::Completeness(10), 1.0, "s1", "TX1"),
                row,
            ],
        );
        assert!(matches!(store.save(), Err(StoreError::Integrity(_))));
        // the whole batch was rolled back
        assert_eq!(store.statistics(Level::Transcript, "s1").unwrap().len(), 1);
    }

    #[rstest]
    fn test_statistics_need_known_entities(mut store: SqliteStore) {
        store.add_sample(Sample::new("s1"));
        store.add(
            Level::Exon,
            vec![Statistic::new(MetricName::MeanCoverage, 5.0, "s1", "unknown-exon")],
        );
        assert!(matches!(store.save(), Err(StoreError::Integrity(_))));
        assert!(store.sample("s1").unwrap().is_none());
    }

    #[rstest]
    fn test_delete_sample_cascades(mut store: SqliteStore) {
        store.add_sample(Sample::new("s1"));
        store.add(
            Level::Exon,
            vec![Statistic::new(MetricName::MeanCoverage, 5.0, "s1", "1-1-10")],
        );
        store.save().unwrap();

        assert!(store.delete_sample("s1").unwrap());
        assert!(store.statistics(Level::Exon, "s1").unwrap().is_empty());
        assert!(!store.delete_sample("s1").unwrap());
    }

    #[rstest]
    fn test_replace_sample_swaps_rows(mut store: SqliteStore) {
        store.add_sample(Sample::new("s1"));
        store.add(
            Level::Exon,
            vec![Statistic::new(MetricName::MeanCoverage, 5.0, "s1", "1-1-10")],
        );
        store.save().unwrap();

        let mut sample = Sample::new("s1");
        sample.cutoff = Some(20);
        store.replace_sample(sample);
        store.add(
            Level::Exon,
            vec![Statistic::new(MetricName::MeanCoverage, 9.0, "s1", "1-1-10")],
        );
        store.save().unwrap();

        assert_eq!(store.sample("s1").unwrap().unwrap().cutoff, Some(20));
        let stats = store.statistics(Level::Exon, "s1").unwrap();
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].value, 9.0);
    }

    #[rstest]
    fn test_failed_replace_keeps_old_sample(mut store: SqliteStore) {
        store.add_sample(Sample::new("s1"));
        store.add(
            Level::Exon,
            vec![Statistic::new(MetricName::MeanCoverage, 5.0, "s1", "1-1-10")],
        );
        store.save().unwrap();

        store.replace_sample(Sample::new("s1"));
        store.add(
            Level::Exon,
            vec![Statistic::new(MetricName::MeanCoverage, 9.0, "s1", "unknown-exon")],
        );
        assert!(matches!(store.save(), Err(StoreError::Integrity(_))));

        let stats = store.statistics(Level::Exon, "s1").unwrap();
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].value, 5.0);
    }

    #[rstest]
    fn test_delete_group(mut store: SqliteStore) {
        for (id, group) in [("a", "g1"), ("b", "g1"), ("c", "g2")] {
            let mut sample = Sample::new(id);
            sample.group_id = Some(group.into());
            store.add_sample(sample);
        }
        store.save().unwrap();

        assert_eq!(store.delete_group("g1").unwrap(), 2);
        assert!(store.sample("c").unwrap().is_some());
    }

    #[rstest]
    fn test_reset_clears_everything(mut store: SqliteStore) {
        store.reset().unwrap();
        assert!(store.genes().unwrap().is_empty());
    }

    #[rstest]
    fn test_discard_drops_pending(mut store: SqliteStore) {
        store.add_sample(Sample::new("s1"));
        store.discard();
        store.save().unwrap();
        assert!(store.sample("s1").unwrap().is_none());
    }

    #[rstest]
    fn test_open_file_database() {
        let tempdir = tempfile::tempdir().unwrap();
        let path = tempdir.path().join("coverage.sqlite3");
        {
            let mut store = SqliteStore::open(&path).unwrap();
            store.add_sample(Sample::new("s1"));
            store.save().unwrap();
        }
        let store = SqliteStore::open(&path).unwrap();
        assert!(store.sample("s1").unwrap().is_some());
    }
}

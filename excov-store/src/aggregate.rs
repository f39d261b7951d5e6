use std::collections::BTreeMap;

use fxhash::FxHashMap;

use excov_core::models::{Level, MetricName, Span, Statistic};

use crate::error::{Result, StoreError};
use crate::store::Store;

///
/// Child <-> parent index for one step of the exon -> transcript -> gene hierarchy,
/// together with the length of every child.
///
#[derive(Debug, Default)]
pub struct Hierarchy {
    parents: FxHashMap<String, Vec<String>>,
    children: FxHashMap<String, Vec<String>>,
    lengths: FxHashMap<String, u64>,
}

impl Hierarchy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `child`, spanning `length` bases, belongs to `parent`.
    pub fn insert(&mut self, child: &str, parent: &str, length: u64) {
        self.lengths.insert(child.to_string(), length);
        let parents = self.parents.entry(child.to_string()).or_default();
        if parents.iter().any(|p| p == parent) {
            return;
        }
        parents.push(parent.to_string());
        self.children
            .entry(parent.to_string())
            .or_default()
            .push(child.to_string());
    }

    ///
    /// Exons to the transcripts they belong to, from the stored relations.
    ///
    pub fn exon_to_transcript<S: Store + ?Sized>(store: &S) -> Result<Self> {
        let lengths: FxHashMap<String, u64> = store
            .exons()?
            .into_iter()
            .map(|exon| {
                let length = exon.length();
                (exon.id, length)
            })
            .collect();

        let mut hierarchy = Hierarchy::new();
        for (exon_id, transcript_id) in store.relations()? {
            let length = *lengths.get(&exon_id).ok_or_else(|| StoreError::NotFound {
                kind: "exon",
                id: exon_id.clone(),
            })?;
            hierarchy.insert(&exon_id, &transcript_id, length);
        }
        Ok(hierarchy)
    }

    ///
    /// Transcripts to their gene.
    ///
    pub fn transcript_to_gene<S: Store + ?Sized>(store: &S) -> Result<Self> {
        let mut hierarchy = Hierarchy::new();
        for transcript in store.transcripts()? {
            hierarchy.insert(&transcript.id, &transcript.gene_id, transcript.length());
        }
        Ok(hierarchy)
    }

    pub fn parents(&self, child: &str) -> &[String] {
        self.parents.get(child).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn children(&self, parent: &str) -> &[String] {
        self.children.get(parent).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn length(&self, child: &str) -> Option<u64> {
        self.lengths.get(child).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }
}

#[derive(Debug)]
struct Weighted {
    sum: f64,
    length: u64,
    children: usize,
    first: f64,
}

impl Weighted {
    fn new() -> Self {
        Weighted {
            sum: 0.0,
            length: 0,
            children: 0,
            first: 0.0,
        }
    }

    fn push(&mut self, value: f64, length: u64) {
        if self.children == 0 {
            self.first = value;
        }
        self.children += 1;
        self.sum += value * length as f64;
        self.length += length;
    }

    fn mean(&self) -> f64 {
        // a lone child keeps its exact value
        if self.children == 1 {
            self.first
        } else {
            self.sum / self.length as f64
        }
    }
}

///
/// Length-weighted mean of `(value, length)` pairs, `None` if there is nothing to average.
///
pub fn weighted_mean<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = (f64, u64)>,
{
    let mut weighted = Weighted::new();
    for (value, length) in values {
        weighted.push(value, length);
    }
    match weighted.children {
        0 => None,
        _ => Some(weighted.mean()),
    }
}

///
/// Aggregate child statistics one level up.
///
/// Every (parent, sample, metric) gets the mean of its children's values weighted by the
/// child lengths. Parents without any child statistic get no row. Statistics of children
/// the hierarchy does not know are skipped.
///
/// Output is ordered by parent, sample and metric.
///
pub fn aggregate_level(hierarchy: &Hierarchy, statistics: &[Statistic]) -> Vec<Statistic> {
    let mut groups: BTreeMap<(&str, &str, MetricName), Weighted> = BTreeMap::new();
    let mut orphans = 0;

    for statistic in statistics {
        let (parents, length) = match hierarchy.length(&statistic.entity_id) {
            Some(length) => (hierarchy.parents(&statistic.entity_id), length),
            None => {
                orphans += 1;
                continue;
            }
        };
        for parent in parents {
            groups
                .entry((parent.as_str(), statistic.sample_id.as_str(), statistic.metric))
                .or_insert_with(Weighted::new)
                .push(statistic.value, length);
        }
    }

    if orphans > 0 {
        log::debug!("skipped {} statistics without a parent", orphans);
    }

    groups
        .into_iter()
        .map(|((parent, sample_id, metric), weighted)| {
            Statistic::new(metric, weighted.mean(), sample_id, parent)
        })
        .collect()
}

/// Rows written by one aggregation run.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct AggregateSummary {
    pub sample_id: String,
    pub transcripts: usize,
    pub genes: usize,
}

///
/// Two-pass aggregation of stored exon statistics into transcripts and genes.
///
/// The hierarchy is read once, so one aggregator can serve many samples.
///
#[derive(Debug)]
pub struct Aggregator {
    exon_to_transcript: Hierarchy,
    transcript_to_gene: Hierarchy,
}

impl Aggregator {
    pub fn from_store<S: Store + ?Sized>(store: &S) -> Result<Self> {
        Ok(Aggregator {
            exon_to_transcript: Hierarchy::exon_to_transcript(store)?,
            transcript_to_gene: Hierarchy::transcript_to_gene(store)?,
        })
    }

    fn hierarchy(&self, level: Level) -> &Hierarchy {
        match level {
            Level::Gene => &self.transcript_to_gene,
            _ => &self.exon_to_transcript,
        }
    }

    ///
    /// Aggregate one level for a sample and commit it.
    ///
    /// The child rows are read from the store, so the previous pass must have been saved.
    ///
    fn aggregate_into<S: Store + ?Sized>(
        &self,
        store: &mut S,
        level: Level,
        sample_id: &str,
    ) -> Result<usize> {
        let Some(child) = level.child() else {
            return Ok(0);
        };
        let children = store.statistics(child, sample_id)?;
        let rows = aggregate_level(self.hierarchy(level), &children);
        let written = rows.len();
        log::debug!(
            "aggregated {} {} rows into {} {} rows for {}",
            children.len(),
            child,
            written,
            level,
            sample_id
        );
        store.add(level, rows);
        store.save()?;
        Ok(written)
    }

    ///
    /// Aggregate a loaded sample to transcripts, commit, then to genes, commit.
    ///
    /// # Errors
    /// - [`StoreError::NotFound`] if the sample is not in the store
    /// - [`StoreError::Integrity`] if the sample was already aggregated; the pass that
    ///   failed writes nothing
    ///
    pub fn aggregate_sample<S: Store + ?Sized>(
        &self,
        store: &mut S,
        sample_id: &str,
    ) -> Result<AggregateSummary> {
        if store.sample(sample_id)?.is_none() {
            return Err(StoreError::NotFound {
                kind: "sample",
                id: sample_id.to_string(),
            });
        }

        let transcripts = self.aggregate_into(store, Level::Transcript, sample_id)?;
        let genes = self.aggregate_into(store, Level::Gene, sample_id)?;
        log::info!(
            "sample {}: {} transcript and {} gene statistics",
            sample_id,
            transcripts,
            genes
        );

        Ok(AggregateSummary {
            sample_id: sample_id.to_string(),
            transcripts,
            genes,
        })
    }
}

///
/// Aggregate one sample, reading the hierarchy from the same store.
///
pub fn aggregate_sample<S: Store + ?Sized>(store: &mut S, sample_id: &str) -> Result<AggregateSummary> {
    Aggregator::from_store(store)?.aggregate_sample(store, sample_id)
}

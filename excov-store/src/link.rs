use fxhash::{FxHashMap, FxHashSet};

use excov_core::models::{Exon, Gene, Interval, Transcript};

use crate::error::{Result, StoreError};
use crate::store::Store;

///
/// Elements and relations derived from an interval-definition stream, ready to store.
///
#[derive(Debug, Default, PartialEq)]
pub struct LinkedElements {
    pub genes: Vec<Gene>,
    pub transcripts: Vec<Transcript>,
    pub exons: Vec<Exon>,
    /// `(exon_id, transcript_id)`
    pub relations: Vec<(String, String)>,
}

impl LinkedElements {
    /// Queue every element and relation on a store, without saving.
    pub fn add_to<S: Store + ?Sized>(self, store: &mut S) {
        for gene in self.genes {
            store.add_gene(gene);
        }
        for transcript in self.transcripts {
            store.add_transcript(transcript);
        }
        for exon in self.exons {
            store.add_exon(exon);
        }
        for (exon_id, transcript_id) in &self.relations {
            store.add_relation(exon_id, transcript_id);
        }
    }
}

fn widen(start: &mut u32, end: &mut u32, interval: &Interval) {
    *start = (*start).min(interval.start);
    *end = (*end).max(interval.end);
}

///
/// Build genes, transcripts, exons and exon-transcript relations from intervals.
///
/// Every interval becomes an exon named after the interval. Its transcript ids are paired
/// with its gene ids by position, or all with the single gene id when there is only one.
/// Genes and transcripts span all of their exons. Elements keep the order in which they
/// are first seen. Repeated exon names are merged.
///
/// # Errors
/// [`StoreError::Link`] when transcript and gene ids cannot be paired, or when a
/// transcript is claimed by two different genes.
///
pub fn link_intervals<I>(intervals: I) -> Result<LinkedElements>
where
    I: IntoIterator<Item = Interval>,
{
    let mut linked = LinkedElements::default();
    let mut gene_index: FxHashMap<String, usize> = FxHashMap::default();
    let mut transcript_index: FxHashMap<String, usize> = FxHashMap::default();
    let mut seen_exons: FxHashSet<String> = FxHashSet::default();
    let mut seen_relations: FxHashSet<(String, String)> = FxHashSet::default();

    for interval in intervals {
        let pairs = interval.parent_pairs().ok_or_else(|| StoreError::Link {
            exon: interval.name.clone(),
            reason: format!(
                "{} transcript ids cannot be paired with {} gene ids",
                interval.transcript_ids.len(),
                interval.gene_ids.len()
            ),
        })?;

        for (transcript_id, gene_id) in pairs {
            match gene_index.get(gene_id) {
                Some(&i) => {
                    let gene = &mut linked.genes[i];
                    widen(&mut gene.start, &mut gene.end, &interval);
                }
                None => {
                    gene_index.insert(gene_id.to_string(), linked.genes.len());
                    linked.genes.push(Gene {
                        id: gene_id.to_string(),
                        chromosome: interval.contig.clone(),
                        start: interval.start,
                        end: interval.end,
                    });
                }
            }

            match transcript_index.get(transcript_id) {
                Some(&i) => {
                    let transcript = &mut linked.transcripts[i];
                    if transcript.gene_id != gene_id {
                        return Err(StoreError::Link {
                            exon: interval.name.clone(),
                            reason: format!(
                                "transcript {} belongs to {}, not {}",
                                transcript_id, transcript.gene_id, gene_id
                            ),
                        });
                    }
                    widen(&mut transcript.start, &mut transcript.end, &interval);
                }
                None => {
                    transcript_index.insert(transcript_id.to_string(), linked.transcripts.len());
                    linked.transcripts.push(Transcript {
                        id: transcript_id.to_string(),
                        chromosome: interval.contig.clone(),
                        gene_id: gene_id.to_string(),
                        start: interval.start,
                        end: interval.end,
                    });
                }
            }

            let relation = (interval.name.clone(), transcript_id.to_string());
            if seen_relations.insert(relation.clone()) {
                linked.relations.push(relation);
            }
        }

        if seen_exons.insert(interval.name.clone()) {
            linked.exons.push(Exon {
                id: interval.name.clone(),
                chromosome: interval.contig.clone(),
                start: interval.start,
                end: interval.end,
                strand: interval.strand,
            });
        }
    }

    log::info!(
        "linked {} exons, {} transcripts and {} genes",
        linked.exons.len(),
        linked.transcripts.len(),
        linked.genes.len()
    );
    Ok(linked)
}

/// Row counts written by [`link`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct LinkSummary {
    pub genes: usize,
    pub transcripts: usize,
    pub exons: usize,
    pub relations: usize,
}

///
/// Link intervals and store the result in one transaction.
///
pub fn link<S, I>(store: &mut S, intervals: I) -> Result<LinkSummary>
where
    S: Store + ?Sized,
    I: IntoIterator<Item = Interval>,
{
    let linked = link_intervals(intervals)?;
    let summary = LinkSummary {
        genes: linked.genes.len(),
        transcripts: linked.transcripts.len(),
        exons: linked.exons.len(),
        relations: linked.relations.len(),
    };
    linked.add_to(store);
    store.save()?;
    Ok(summary)
}

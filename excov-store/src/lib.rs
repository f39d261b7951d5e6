//! # Persistence and aggregation for excov
//!
//! Genes, transcripts and exons are linked from an interval stream and stored once.
//! Every sample then adds exon statistics, which the [`Aggregator`] rolls up into
//! length-weighted transcript and gene statistics.
//!
//! ```
//! use excov_core::models::{Interval, Sample};
//! use excov_store::{SqliteStore, Store, link};
//!
//! let mut store = SqliteStore::open_in_memory().unwrap();
//! let exon = Interval::new("1", 101, 200, "1-100-200")
//!     .unwrap()
//!     .with_parents(vec!["TX1".into()], vec!["GENE1".into()]);
//! link(&mut store, vec![exon]).unwrap();
//!
//! store.add_sample(Sample::new("s1"));
//! store.save().unwrap();
//! assert_eq!(store.samples(None).unwrap().len(), 1);
//! ```
pub mod aggregate;
pub mod error;
pub mod link;
pub mod load;
pub mod query;
pub mod store;

pub use self::aggregate::{
    AggregateSummary, Aggregator, Hierarchy, aggregate_level, aggregate_sample, weighted_mean,
};
pub use self::error::{Result, StoreError};
pub use self::link::{LinkSummary, LinkedElements, link, link_intervals};
pub use self::load::load_sample;
pub use self::query::{GeneMetric, MetricSummary};
pub use self::store::{SqliteStore, Store, statistic_table};

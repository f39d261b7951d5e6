pub mod annotation;
pub mod elements;
pub mod interval;
pub mod metric;

// re-export for cleaner imports
pub use self::annotation::Annotation;
pub use self::elements::{Exon, Gene, Level, Sample, Statistic, Transcript};
pub use self::interval::{Interval, Span, Strand};
pub use self::metric::MetricName;
